//! Generator configuration loaded from `rpcforge.toml`.
//!
//! ```toml
//! out_dir = "client"
//! api_root = "https://example.com/api"
//! imports = ["./fetcher"]
//! templates = ["ts", "py"]
//! full_schema = true            # or false, or "schema.json"
//! formatter = ["prettier", "--stdin-filepath", "index.ts"]
//!
//! [template_overrides.ts]
//! path = "templates/ts"
//! full_schema = "ts-schema.json"
//!
//! [segment_meta."foo/client"]
//! title = "Foo"
//! ```
//!
//! `RPCFORGE_OUT_DIR` and `RPCFORGE_API_ROOT` override the file.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::generator::{FullSchemaTarget, GenerateOptions, TemplateOverride, TemplateSelection};

/// Config file looked up next to the schema.
pub const CONFIG_FILE_NAME: &str = "rpcforge.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub out_dir: PathBuf,
    pub api_root: String,
    pub imports: Vec<String>,
    /// Default template selection; empty means the `ts` template.
    pub templates: Vec<String>,
    pub template_overrides: BTreeMap<String, TemplateOverride>,
    pub full_schema: FullSchemaTarget,
    /// Program and arguments receiving rendered text on stdin.
    pub formatter: Option<Vec<String>>,
    pub segment_meta: BTreeMap<String, Map<String, Value>>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let options = GenerateOptions::default();
        Self {
            out_dir: options.out_dir,
            api_root: options.api_root,
            imports: Vec::new(),
            templates: Vec::new(),
            template_overrides: BTreeMap::new(),
            full_schema: FullSchemaTarget::Disabled,
            formatter: None,
            segment_meta: BTreeMap::new(),
        }
    }
}

impl GeneratorConfig {
    /// Parse a config file; `Ok(None)` when it does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read generator config: {}", path.display()))?;
        let mut config: GeneratorConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse generator config: {}", path.display()))?;
        config.resolve_relative_to(path.parent().unwrap_or(Path::new("")));
        Ok(Some(config))
    }

    /// Resolve the config (explicit path, then next to the schema, then
    /// defaults) and apply environment overrides.
    pub fn resolve(explicit: Option<&Path>, schema_path: &Path) -> anyhow::Result<Self> {
        let mut config = match resolve_config_path(explicit, schema_path) {
            Some(path) => Self::load(&path)?.unwrap_or_default(),
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Template override paths are relative to the config file.
    fn resolve_relative_to(&mut self, base: &Path) {
        for template in self.template_overrides.values_mut() {
            if template.path.is_relative() {
                template.path = base.join(&template.path);
            }
        }
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(out_dir) = lookup("RPCFORGE_OUT_DIR").filter(|v| !v.is_empty()) {
            self.out_dir = PathBuf::from(out_dir);
        }
        if let Some(api_root) = lookup("RPCFORGE_API_ROOT").filter(|v| !v.is_empty()) {
            self.api_root = api_root;
        }
    }

    pub fn selection(&self) -> TemplateSelection {
        TemplateSelection {
            names: self.templates.clone(),
            overrides: self.template_overrides.clone(),
        }
    }

    pub fn options(&self) -> GenerateOptions {
        GenerateOptions {
            out_dir: self.out_dir.clone(),
            api_root: self.api_root.clone(),
            imports: self.imports.clone(),
            full_schema: self.full_schema.clone(),
            formatter: self.formatter.clone(),
            segment_meta: self.segment_meta.clone(),
            force_log: false,
        }
    }
}

/// `rpcforge.toml` in the schema's directory, if present.
pub fn auto_detect_config_path(schema_path: &Path) -> Option<PathBuf> {
    let config_path = schema_path.parent()?.join(CONFIG_FILE_NAME);
    config_path.exists().then_some(config_path)
}

/// Explicit path first, then auto-detection.
pub fn resolve_config_path(explicit: Option<&Path>, schema_path: &Path) -> Option<PathBuf> {
    match explicit {
        Some(path) if path.exists() => Some(path.to_path_buf()),
        _ => auto_detect_config_path(schema_path),
    }
}
