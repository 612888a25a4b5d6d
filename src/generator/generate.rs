use anyhow::Context;
use futures::future::try_join_all;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::emitter::{
    create_parent_dirs, full_schema_destinations, read_existing, should_write, write_full_schema,
    write_output, RenderedOutput,
};
use super::format::format_output;
use super::render::{render, RenderContext};
use super::templates::{FullSchemaTarget, TemplateFile, TemplateSelection};
use crate::schema::{assemble_schema, FullSchema, Segment};

/// Settings of one generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub out_dir: PathBuf,
    pub api_root: String,
    pub imports: Vec<String>,
    /// Run-level full-schema dump in `out_dir`.
    pub full_schema: FullSchemaTarget,
    /// External formatter applied to rendered text before diffing.
    pub formatter: Option<Vec<String>>,
    /// Extra metadata merged into each segment's `meta`.
    pub segment_meta: BTreeMap<String, Map<String, Value>>,
    /// Report "up to date" at info instead of debug.
    pub force_log: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from(".rpcforge"),
            api_root: "/api".to_string(),
            imports: Vec::new(),
            full_schema: FullSchemaTarget::Disabled,
            formatter: None,
            segment_meta: BTreeMap::new(),
            force_log: false,
        }
    }
}

/// Outcome of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    /// Whether anything was written.
    pub written: bool,
    /// Output directory.
    pub path: PathBuf,
    /// Names of templates with at least one changed file, in resolution order.
    pub changed_templates: Vec<String>,
    pub elapsed: Duration,
}

fn merged_segments(segments: &[Segment], extra: &BTreeMap<String, Map<String, Value>>) -> Vec<Segment> {
    segments
        .iter()
        .map(|segment| {
            let Some(more) = extra.get(&segment.segment_name) else {
                return segment.clone();
            };
            let mut meta = segment.meta.clone().unwrap_or_default();
            for (k, v) in more {
                meta.insert(k.clone(), v.clone());
            }
            segment.clone().with_meta(meta)
        })
        .collect()
}

async fn render_one(
    template: TemplateFile,
    ctx: Arc<RenderContext>,
    out_dir: PathBuf,
    formatter: Option<Vec<String>>,
) -> anyhow::Result<RenderedOutput> {
    let source = template.source.read().await?;
    let mut text = render(&template.template_path, &source, &ctx)?;
    if let Some(command) = &formatter {
        text = format_output(command, &text).await?;
    }
    let out_path = out_dir.join(&template.out_path);
    let existing = read_existing(&out_path).await?;
    let needs_writing = should_write(existing.as_deref(), &text);
    debug!(
        template = %template.template_name,
        path = %out_path.display(),
        needs_writing,
        "Template rendered"
    );
    Ok(RenderedOutput {
        out_path,
        text,
        needs_writing,
        template_name: template.template_name,
    })
}

/// Render the selected templates for `segments` and write what changed.
///
/// Every segment must have an entry in `schema`; a missing one fails the run
/// before anything is read or written. Full-schema dumps are written on every
/// run that requests them. Generated files are written only when their
/// content, ignoring the banner line, differs from disk.
pub async fn generate(
    schema: &FullSchema,
    segments: &[Segment],
    selection: &TemplateSelection,
    options: &GenerateOptions,
) -> anyhow::Result<GenerateReport> {
    let started = Instant::now();
    let templates = selection.resolve()?;
    let assembled = assemble_schema(segments, schema)?;

    let segments = merged_segments(segments, &options.segment_meta);
    let ctx = Arc::new(RenderContext::new(
        options.api_root.clone(),
        options.imports.clone(),
        assembled.clone(),
        &segments,
    )?);

    let tasks = templates.iter().cloned().map(|template| {
        tokio::spawn(render_one(
            template,
            Arc::clone(&ctx),
            options.out_dir.clone(),
            options.formatter.clone(),
        ))
    });
    let rendered = try_join_all(tasks)
        .await?
        .into_iter()
        .collect::<anyhow::Result<Vec<_>>>()?;

    let schema_destinations = full_schema_destinations(&options.out_dir, &options.full_schema, &templates);
    let changed: Vec<RenderedOutput> = rendered.into_iter().filter(|r| r.needs_writing).collect();

    if changed.is_empty() && schema_destinations.is_empty() {
        if options.force_log {
            info!(path = %options.out_dir.display(), "Generated client is up to date");
        } else {
            debug!(path = %options.out_dir.display(), "Generated client is up to date");
        }
        return Ok(GenerateReport {
            written: false,
            path: options.out_dir.clone(),
            changed_templates: Vec::new(),
            elapsed: started.elapsed(),
        });
    }

    tokio::fs::create_dir_all(&options.out_dir)
        .await
        .with_context(|| format!("Failed to create {}", options.out_dir.display()))?;
    create_parent_dirs(
        schema_destinations
            .iter()
            .map(PathBuf::as_path)
            .chain(changed.iter().map(|o| o.out_path.as_path())),
    )
    .await?;
    write_full_schema(&assembled.emitted(), &schema_destinations).await?;

    let mut changed_templates: Vec<String> = Vec::new();
    for output in &changed {
        if !changed_templates.contains(&output.template_name) {
            changed_templates.push(output.template_name.clone());
        }
    }
    let writes = changed.into_iter().map(|output| {
        tokio::spawn(async move { write_output(&output).await })
    });
    try_join_all(writes)
        .await?
        .into_iter()
        .collect::<anyhow::Result<Vec<()>>>()?;

    let elapsed = started.elapsed();
    info!(
        path = %options.out_dir.display(),
        templates = ?changed_templates,
        schema_files = schema_destinations.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Client generated"
    );
    Ok(GenerateReport {
        written: true,
        path: options.out_dir.clone(),
        changed_templates,
        elapsed,
    })
}
