use anyhow::Context;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::templates::{FullSchemaTarget, TemplateFile};
use crate::schema::FullSchema;

/// A rendered file waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutput {
    pub out_path: PathBuf,
    pub text: String,
    pub needs_writing: bool,
    pub template_name: String,
}

/// Everything after the first line, trimmed.
fn without_banner(text: &str) -> &str {
    text.split_once('\n').map_or("", |(_, rest)| rest).trim()
}

/// Whether `rendered` differs from what is on disk.
///
/// The first line (the timestamped banner) and surrounding whitespace are
/// ignored. A missing file always needs writing.
pub fn should_write(existing: Option<&str>, rendered: &str) -> bool {
    match existing {
        None => true,
        Some(existing) => without_banner(existing) != without_banner(rendered),
    }
}

/// Current contents of `path`, `None` if it does not exist.
pub async fn read_existing(path: &Path) -> anyhow::Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

/// Deduplicated full-schema destinations for a run.
///
/// The run-level target resolves against `out_dir`; template targets resolve
/// against the directory of the template's output file.
pub fn full_schema_destinations(
    out_dir: &Path,
    run_target: &FullSchemaTarget,
    templates: &[TemplateFile],
) -> Vec<PathBuf> {
    let mut destinations: Vec<PathBuf> = Vec::new();
    let mut push = |path: PathBuf| {
        if !destinations.contains(&path) {
            destinations.push(path);
        }
    };
    if let Some(name) = run_target.file_name() {
        push(out_dir.join(name));
    }
    for template in templates {
        if let Some(name) = template.full_schema.file_name() {
            let dir = out_dir.join(template.out_path.parent().unwrap_or(Path::new("")));
            push(dir.join(name));
        }
    }
    destinations
}

/// Pretty-printed (2-space) schema JSON, as written to every destination.
pub fn full_schema_json(schema: &FullSchema) -> anyhow::Result<String> {
    serde_json::to_string_pretty(schema).context("Failed to serialize full schema")
}

/// Write the schema to every destination, whether or not it changed.
///
/// Destination directories must already exist, see [`create_parent_dirs`].
pub async fn write_full_schema(schema: &FullSchema, destinations: &[PathBuf]) -> anyhow::Result<()> {
    let json = full_schema_json(schema)?;
    for path in destinations {
        tokio::fs::write(path, &json)
            .await
            .with_context(|| format!("Failed to write full schema to {}", path.display()))?;
        debug!(path = %path.display(), "Full schema written");
    }
    Ok(())
}

/// Distinct parent directories of `paths`, sorted.
pub fn parent_dirs<'a>(paths: impl IntoIterator<Item = &'a Path>) -> BTreeSet<PathBuf> {
    paths
        .into_iter()
        .filter_map(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .collect()
}

/// Create each distinct parent directory of `paths` once.
pub async fn create_parent_dirs<'a>(paths: impl IntoIterator<Item = &'a Path>) -> anyhow::Result<()> {
    for dir in parent_dirs(paths) {
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    Ok(())
}

/// Write one rendered file into an existing directory.
pub async fn write_output(output: &RenderedOutput) -> anyhow::Result<()> {
    tokio::fs::write(&output.out_path, &output.text)
        .await
        .with_context(|| format!("Failed to write {}", output.out_path.display()))?;
    debug!(
        path = %output.out_path.display(),
        template = %output.template_name,
        "Generated file written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::templates::TemplateSource;

    fn template(out: &str, target: FullSchemaTarget) -> TemplateFile {
        TemplateFile {
            template_name: "t".into(),
            template_path: format!("{out}.tpl"),
            out_path: PathBuf::from(out),
            full_schema: target,
            source: TemplateSource::Builtin(""),
        }
    }

    #[test]
    fn test_banner_only_change_is_ignored() {
        let old = "// auto-generated 2024-01-01T00:00:00.000Z\nexport const a = 1;\n";
        let new = "// auto-generated 2025-06-01T12:00:00.000Z\nexport const a = 1;";
        assert!(!should_write(Some(old), new));
        assert!(should_write(Some(old), "// x\nexport const a = 2;\n"));
        assert!(should_write(None, new));
    }

    #[test]
    fn test_single_line_files_compare_empty() {
        assert!(!should_write(Some("// one"), "// two"));
    }

    #[test]
    fn test_destinations_are_deduplicated() {
        let out = Path::new("/out");
        let templates = vec![
            template("__init__.py", FullSchemaTarget::Default),
            template("client/index.ts", FullSchemaTarget::File("api.json".into())),
            template("other.py", FullSchemaTarget::Default),
            template("plain.ts", FullSchemaTarget::Disabled),
        ];
        let dests = full_schema_destinations(out, &FullSchemaTarget::Default, &templates);
        assert_eq!(
            dests,
            vec![
                PathBuf::from("/out/full-schema.json"),
                PathBuf::from("/out/client/api.json"),
            ]
        );
        assert!(full_schema_destinations(out, &FullSchemaTarget::Disabled, &[]).is_empty());
    }

    #[test]
    fn test_parent_dirs_are_distinct() {
        let paths = [
            PathBuf::from("/out/index.ts"),
            PathBuf::from("/out/nested/a.ts"),
            PathBuf::from("/out/full-schema.json"),
            PathBuf::from("/out/nested/b.ts"),
            PathBuf::from("bare.txt"),
        ];
        let dirs: Vec<_> = parent_dirs(paths.iter().map(PathBuf::as_path)).into_iter().collect();
        assert_eq!(dirs, vec![PathBuf::from("/out"), PathBuf::from("/out/nested")]);
    }
}
