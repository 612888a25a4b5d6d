use anyhow::bail;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, warn};

use crate::config::GeneratorConfig;
use crate::generator::{builtin_templates, generate, FullSchemaTarget, GenerateReport};
use crate::schema::{check_schema, load_full_schema, print_issues, FullSchema, Segment};
use crate::watch::watch_schema;

/// Command-line interface for rpcforge
#[derive(Parser)]
#[command(name = "rpcforge-gen")]
#[command(about = "Generate RPC clients from a full schema", long_about = None)]
pub struct Cli {
    /// Log at debug level with source locations
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render client code from a full schema file
    Generate {
        /// Path to the full schema (JSON or YAML)
        #[arg(short, long)]
        schema: PathBuf,

        /// Generator config; defaults to rpcforge.toml next to the schema
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, env = "RPCFORGE_OUT_DIR")]
        out: Option<PathBuf>,

        /// Templates to render (comma-separated or repeated); `none` renders nothing
        #[arg(short, long, num_args = 1.., value_delimiter = ',')]
        template: Vec<String>,

        /// Write the full schema to the output directory, optionally under another name
        #[arg(long, num_args = 0..=1, value_name = "NAME")]
        full_schema: Option<Option<String>>,

        /// Only emit these segments (comma-separated or repeated)
        #[arg(long, num_args = 1.., value_delimiter = ',')]
        segment: Vec<String>,

        /// API root baked into generated clients
        #[arg(long, env = "RPCFORGE_API_ROOT")]
        api_root: Option<String>,

        /// Log "up to date" runs at info level
        #[arg(long, default_value_t = false)]
        force_log: bool,

        /// Regenerate whenever the schema file changes
        #[arg(short, long, default_value_t = false)]
        watch: bool,
    },
    /// List built-in templates
    Templates,
    /// Check a schema for declarations that fail at request time
    Check {
        /// Path to the full schema (JSON or YAML)
        #[arg(short, long)]
        schema: PathBuf,

        /// Exit with an error if any error-level issue is found
        #[arg(long, default_value_t = false)]
        fail_on_error: bool,
    },
}

/// Segments to emit: the named ones, or every segment in the schema.
pub(super) fn select_segments(schema: &FullSchema, names: &[String]) -> Vec<Segment> {
    if names.is_empty() {
        return Segment::from_schema(schema);
    }
    names
        .iter()
        .map(|name| {
            let mut segment = Segment::new(name.as_str());
            if let Some(entry) = schema.get(name) {
                segment.controllers = entry.controllers.keys().cloned().collect();
            }
            segment
        })
        .collect()
}

fn print_report(report: &GenerateReport) {
    if report.written {
        let templates = if report.changed_templates.is_empty() {
            "schema only".to_string()
        } else {
            report.changed_templates.join(", ")
        };
        println!(
            "✅ Generated {} in {} ({} ms)",
            templates,
            report.path.display(),
            report.elapsed.as_millis()
        );
    } else {
        println!("ℹ️  {} is up to date", report.path.display());
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_generate(
    schema_path: &Path,
    config_path: Option<&Path>,
    out: Option<PathBuf>,
    templates: Vec<String>,
    full_schema: Option<Option<String>>,
    segment_names: &[String],
    api_root: Option<String>,
    force_log: bool,
    watch: bool,
) -> anyhow::Result<()> {
    let mut config = GeneratorConfig::resolve(config_path, schema_path)?;
    if let Some(out) = out {
        config.out_dir = out;
    }
    if let Some(api_root) = api_root {
        config.api_root = api_root;
    }
    if !templates.is_empty() {
        config.templates = templates;
    }
    match full_schema {
        Some(Some(name)) => config.full_schema = FullSchemaTarget::File(name),
        Some(None) => config.full_schema = FullSchemaTarget::Default,
        None => {}
    }

    let selection = config.selection();
    let mut options = config.options();
    options.force_log = force_log;

    let schema = load_full_schema(schema_path)?;
    let segments = select_segments(&schema, segment_names);
    let report = generate(&schema, &segments, &selection, &options).await?;
    print_report(&report);

    if !watch {
        return Ok(());
    }

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let _watcher = watch_schema(schema_path, move |schema| {
        if tx.send(schema).is_err() {
            warn!("Schema update dropped, generator loop has stopped");
        }
    })?;
    println!("👀 Watching {} for changes", schema_path.display());

    while let Some(schema) = rx.recv().await {
        let segments = select_segments(&schema, segment_names);
        match generate(&schema, &segments, &selection, &options).await {
            Ok(report) => print_report(&report),
            Err(e) => error!(error = %format!("{e:#}"), "Generation failed"),
        }
    }
    Ok(())
}

fn run_check(schema_path: &Path, fail_on_error: bool) -> anyhow::Result<()> {
    let schema = load_full_schema(schema_path)?;
    for (name, segment) in schema.iter() {
        println!(
            "{name}: {} controller(s), {} handler(s){}",
            segment.controllers.len(),
            segment.handler_count(),
            if segment.emit_schema { "" } else { " (not emitted)" }
        );
    }
    let issues = check_schema(&schema);
    if issues.is_empty() {
        println!("✅ No issues found");
        return Ok(());
    }
    print_issues(&issues);
    let errors = issues.iter().filter(|i| i.kind == "Error").count();
    if fail_on_error && errors > 0 {
        bail!("{errors} error(s) found in {}", schema_path.display());
    }
    Ok(())
}

/// Execute a parsed command line.
///
/// # Errors
///
/// Returns an error if the schema or config cannot be loaded, a template is
/// unknown, a selected segment has no schema entry, writing fails, or
/// `check --fail-on-error` finds errors.
pub async fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            schema,
            config,
            out,
            template,
            full_schema,
            segment,
            api_root,
            force_log,
            watch,
        } => {
            run_generate(
                &schema,
                config.as_deref(),
                out,
                template,
                full_schema,
                &segment,
                api_root,
                force_log,
                watch,
            )
            .await
        }
        Commands::Templates => {
            for (name, description) in builtin_templates() {
                println!("{name:<6} {description}");
            }
            println!("{:<6} no client files (schema dumps only)", crate::generator::NO_TEMPLATES);
            Ok(())
        }
        Commands::Check {
            schema,
            fail_on_error,
        } => run_check(&schema, fail_on_error),
    }
}
