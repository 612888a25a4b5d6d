use chrono::{SecondsFormat, Utc};
use minijinja::syntax::SyntaxConfig;
use minijinja::value::Rest;
use minijinja::{context, AutoEscape, Environment, UndefinedBehavior};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::schema::{FullSchema, Segment};

/// Templates whose name ends with this suffix are evaluated; others are copied.
pub const TEMPLATE_SUFFIX: &str = ".tpl";

/// Errors produced while preparing or evaluating a template.
#[derive(Debug)]
pub enum TemplateError {
    /// The schema could not be serialized for the template context.
    Context(serde_json::Error),
    /// The delimiter configuration was rejected.
    Syntax(minijinja::Error),
    /// Parsing or evaluating the named template failed.
    Render {
        template: String,
        source: minijinja::Error,
    },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::Context(e) => write!(f, "Failed to build template context: {e}"),
            TemplateError::Syntax(e) => write!(f, "Invalid template syntax configuration: {e}"),
            TemplateError::Render { template, source } => {
                write!(f, "Failed to render template {template}: {source}")
            }
        }
    }
}

impl std::error::Error for TemplateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TemplateError::Context(e) => Some(e),
            TemplateError::Syntax(e) => Some(e),
            TemplateError::Render { source, .. } => Some(source),
        }
    }
}

/// Data every template sees, bound as `t`.
///
/// Built once per run and shared read-only by all render tasks.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderContext {
    pub api_root: String,
    pub imports: Vec<String>,
    pub schema: FullSchema,
    /// Segment metadata keyed by segment name, without the name itself.
    pub segment_meta: BTreeMap<String, Map<String, Value>>,
    /// First line of every generated file, minus the comment marker.
    pub banner: String,
    /// `schema` as compact JSON.
    pub schema_json: String,
}

/// Banner text stamped with the current UTC time.
pub fn banner_now() -> String {
    format!(
        "auto-generated {}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

impl RenderContext {
    pub fn new(
        api_root: impl Into<String>,
        imports: Vec<String>,
        schema: FullSchema,
        segments: &[Segment],
    ) -> Result<Self, TemplateError> {
        let segment_meta = segments
            .iter()
            .filter_map(|segment| {
                let mut meta = segment.meta.clone()?;
                meta.remove("segmentName");
                Some((segment.segment_name.clone(), meta))
            })
            .collect();
        let schema_json = serde_json::to_string(&schema).map_err(TemplateError::Context)?;
        Ok(Self {
            api_root: api_root.into(),
            imports,
            schema,
            segment_meta,
            banner: banner_now(),
            schema_json,
        })
    }

    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }
}

fn ejs_syntax() -> Result<SyntaxConfig, TemplateError> {
    SyntaxConfig::builder()
        .block_delimiters("<%", "%>")
        .variable_delimiters("<%=", "%>")
        .comment_delimiters("<%#", "%>")
        .build()
        .map_err(TemplateError::Syntax)
}

fn join_path(parts: Rest<String>) -> String {
    parts
        .iter()
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Quote `value` as a Rust string literal.
fn rust_str(value: String) -> String {
    format!("{value:?}")
}

fn environment() -> Result<Environment<'static>, TemplateError> {
    let mut env = Environment::new();
    env.set_syntax(ejs_syntax()?);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.set_undefined_behavior(UndefinedBehavior::Chainable);
    env.add_function("join_path", join_path);
    env.add_filter("rust_str", rust_str);
    Ok(env)
}

/// Whether `template_path` is evaluated rather than copied verbatim.
pub fn is_template(template_path: &str) -> bool {
    template_path.ends_with(TEMPLATE_SUFFIX)
}

/// Render one template.
///
/// `<%= expr %>` prints, `<% stmt %>` controls flow, `<%# ... %>` is a
/// comment. Output depends only on the text and the context.
pub fn render(
    template_path: &str,
    text: &str,
    ctx: &RenderContext,
) -> Result<String, TemplateError> {
    if !is_template(template_path) {
        return Ok(text.to_string());
    }
    let env = environment()?;
    env.render_named_str(template_path, text, context! { t => ctx })
        .map_err(|source| TemplateError::Render {
            template: template_path.to_string(),
            source,
        })
}
