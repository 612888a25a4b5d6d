use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::render::TEMPLATE_SUFFIX;

/// File name used when a full-schema dump is requested without a name.
pub const DEFAULT_FULL_SCHEMA_FILE: &str = "full-schema.json";

/// Selection name that disables client emission.
pub const NO_TEMPLATES: &str = "none";

/// Built-in template used when nothing is selected.
pub const DEFAULT_TEMPLATE: &str = "ts";

/// Where, if anywhere, a full-schema JSON dump is written.
///
/// Configured as `false`, `true` (default file name) or a file name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FullSchemaRepr", into = "FullSchemaRepr")]
pub enum FullSchemaTarget {
    #[default]
    Disabled,
    Default,
    File(String),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FullSchemaRepr {
    Flag(bool),
    File(String),
}

impl From<FullSchemaRepr> for FullSchemaTarget {
    fn from(repr: FullSchemaRepr) -> Self {
        match repr {
            FullSchemaRepr::Flag(false) => FullSchemaTarget::Disabled,
            FullSchemaRepr::Flag(true) => FullSchemaTarget::Default,
            FullSchemaRepr::File(name) => FullSchemaTarget::File(name),
        }
    }
}

impl From<FullSchemaTarget> for FullSchemaRepr {
    fn from(target: FullSchemaTarget) -> Self {
        match target {
            FullSchemaTarget::Disabled => FullSchemaRepr::Flag(false),
            FullSchemaTarget::Default => FullSchemaRepr::Flag(true),
            FullSchemaTarget::File(name) => FullSchemaRepr::File(name),
        }
    }
}

impl FullSchemaTarget {
    /// File name of the dump, `None` when disabled.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            FullSchemaTarget::Disabled => None,
            FullSchemaTarget::Default => Some(DEFAULT_FULL_SCHEMA_FILE),
            FullSchemaTarget::File(name) => Some(name),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, FullSchemaTarget::Disabled)
    }
}

/// Where a template's text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Builtin(&'static str),
    Path(PathBuf),
}

impl TemplateSource {
    pub async fn read(&self) -> anyhow::Result<String> {
        match self {
            TemplateSource::Builtin(text) => Ok((*text).to_string()),
            TemplateSource::Path(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read template {}", path.display())),
        }
    }
}

/// One file to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    /// Selection name the file belongs to (`ts`, `py`, an override name).
    pub template_name: String,
    /// Template file name or path, used to decide whether it is evaluated.
    pub template_path: String,
    /// Output path relative to the output directory.
    pub out_path: PathBuf,
    pub full_schema: FullSchemaTarget,
    pub source: TemplateSource,
}

struct BuiltinFile {
    path: &'static str,
    text: &'static str,
}

struct BuiltinTemplate {
    name: &'static str,
    description: &'static str,
    files: &'static [BuiltinFile],
    full_schema: bool,
}

static BUILTIN_TEMPLATES: &[BuiltinTemplate] = &[
    BuiltinTemplate {
        name: "ts",
        description: "TypeScript fetch client (index.ts)",
        files: &[BuiltinFile {
            path: "index.ts.tpl",
            text: include_str!("../../templates/ts/index.ts.tpl"),
        }],
        full_schema: false,
    },
    BuiltinTemplate {
        name: "py",
        description: "Python client package (__init__.py + full-schema.json)",
        files: &[BuiltinFile {
            path: "__init__.py.tpl",
            text: include_str!("../../templates/py/__init__.py.tpl"),
        }],
        full_schema: true,
    },
    BuiltinTemplate {
        name: "rs",
        description: "Rust route constants (client.rs)",
        files: &[BuiltinFile {
            path: "client.rs.tpl",
            text: include_str!("../../templates/rs/client.rs.tpl"),
        }],
        full_schema: false,
    },
];

/// `(name, description)` of every built-in template.
pub fn builtin_templates() -> Vec<(&'static str, &'static str)> {
    BUILTIN_TEMPLATES
        .iter()
        .map(|t| (t.name, t.description))
        .collect()
}

/// A user template replacing or extending the built-in set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateOverride {
    /// Template file or directory of templates.
    pub path: PathBuf,
    #[serde(default)]
    pub full_schema: FullSchemaTarget,
}

impl TemplateOverride {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            full_schema: FullSchemaTarget::Disabled,
        }
    }
}

/// Which templates a run renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSelection {
    /// Names to render; empty means [`DEFAULT_TEMPLATE`], `["none"]` means nothing.
    pub names: Vec<String>,
    /// User templates by name; they take precedence over built-ins.
    pub overrides: BTreeMap<String, TemplateOverride>,
}

impl TemplateSelection {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            overrides: BTreeMap::new(),
        }
    }

    pub fn none() -> Self {
        Self::new([NO_TEMPLATES])
    }

    pub fn with_override(mut self, name: impl Into<String>, template: TemplateOverride) -> Self {
        self.overrides.insert(name.into(), template);
        self
    }

    /// Expand the selection into template files.
    ///
    /// Fails on unknown names, on `none` mixed with other names and when two
    /// templates would write the same output file.
    pub fn resolve(&self) -> anyhow::Result<Vec<TemplateFile>> {
        let names: Vec<&str> = if self.names.is_empty() {
            vec![DEFAULT_TEMPLATE]
        } else {
            self.names.iter().map(String::as_str).collect()
        };
        if names.contains(&NO_TEMPLATES) {
            if names.len() > 1 {
                bail!("Template \"{NO_TEMPLATES}\" cannot be combined with other templates");
            }
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for name in names {
            if let Some(user) = self.overrides.get(name) {
                files.extend(resolve_override(name, user)?);
            } else if let Some(builtin) = BUILTIN_TEMPLATES.iter().find(|t| t.name == name) {
                files.extend(resolve_builtin(builtin));
            } else {
                let known: Vec<&str> = BUILTIN_TEMPLATES
                    .iter()
                    .map(|t| t.name)
                    .chain(self.overrides.keys().map(String::as_str))
                    .collect();
                bail!("Unknown template \"{name}\". Available: {}", known.join(", "));
            }
        }

        for (i, file) in files.iter().enumerate() {
            if let Some(other) = files[..i].iter().find(|f| f.out_path == file.out_path) {
                bail!(
                    "Templates \"{}\" and \"{}\" both write {}",
                    other.template_name,
                    file.template_name,
                    file.out_path.display()
                );
            }
        }
        Ok(files)
    }
}

/// Output path for a template path: the `.tpl` suffix is dropped.
fn out_path_for(relative: &Path) -> PathBuf {
    let text = relative.to_string_lossy();
    match text.strip_suffix(TEMPLATE_SUFFIX) {
        Some(stripped) => PathBuf::from(stripped),
        None => relative.to_path_buf(),
    }
}

fn resolve_builtin(builtin: &BuiltinTemplate) -> Vec<TemplateFile> {
    let full_schema = if builtin.full_schema {
        FullSchemaTarget::Default
    } else {
        FullSchemaTarget::Disabled
    };
    builtin
        .files
        .iter()
        .map(|file| TemplateFile {
            template_name: builtin.name.to_string(),
            template_path: file.path.to_string(),
            out_path: out_path_for(Path::new(file.path)),
            full_schema: full_schema.clone(),
            source: TemplateSource::Builtin(file.text),
        })
        .collect()
}

fn resolve_override(name: &str, user: &TemplateOverride) -> anyhow::Result<Vec<TemplateFile>> {
    let meta = fs::metadata(&user.path)
        .with_context(|| format!("Template \"{name}\" not found at {}", user.path.display()))?;
    let relative_paths = if meta.is_dir() {
        collect_files(&user.path)?
    } else {
        let file_name = user
            .path
            .file_name()
            .with_context(|| format!("Template path {} has no file name", user.path.display()))?;
        vec![PathBuf::from(file_name)]
    };

    Ok(relative_paths
        .into_iter()
        .map(|relative| {
            let full = if meta.is_dir() {
                user.path.join(&relative)
            } else {
                user.path.clone()
            };
            TemplateFile {
                template_name: name.to_string(),
                template_path: full.to_string_lossy().into_owned(),
                out_path: out_path_for(&relative),
                full_schema: user.full_schema.clone(),
                source: TemplateSource::Path(full),
            }
        })
        .collect())
}

/// Every file below `root`, relative to it, in file-name order.
fn collect_files(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to list templates in {}", root.display()))?;
        if entry.file_type().is_dir() {
            continue;
        }
        files.push(entry.path().strip_prefix(root)?.to_path_buf());
    }
    Ok(files)
}
