use anyhow::Context;
use std::path::Path;
use tracing::{debug, info};

use super::types::FullSchema;

/// Load a full schema from a JSON or YAML file.
///
/// The format is picked from the extension (`.yaml`/`.yml` → YAML, anything
/// else → JSON). Segment and controller names omitted from the file are filled
/// in from their map keys.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse as a schema.
pub fn load_full_schema(path: impl AsRef<Path>) -> anyhow::Result<FullSchema> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file {}", path.display()))?;
    let mut schema = parse_full_schema(&text, is_yaml(path))
        .with_context(|| format!("Failed to parse schema file {}", path.display()))?;
    schema.normalize();
    info!(
        path = %path.display(),
        segments = schema.len(),
        "Loaded full schema"
    );
    Ok(schema)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Parse schema text in the given format.
pub fn parse_full_schema(text: &str, yaml: bool) -> anyhow::Result<FullSchema> {
    let schema: FullSchema = if yaml {
        serde_yaml::from_str(text)?
    } else {
        serde_json::from_str(text)?
    };
    debug!(segments = schema.len(), yaml, "Parsed full schema");
    Ok(schema)
}
