//! JSON Schema adapter for the validation middleware.
//!
//! Models are JSON Schema documents. Compiled validators are cached by the
//! SHA-256 of the model's canonical JSON text, so a model shared by many
//! handlers (or re-declared with identical content) compiles once.
//!
//! Failures list every violation as `"<message> (<path>)"`:
//!
//! ```text
//! Validation failed. Invalid body on server for POST /api/users. "x" is not of type "integer" (age), "name" is a required property
//! ```

use dashmap::DashMap;
use futures::future::{self, BoxFuture};
use jsonschema::Validator;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, error};

use super::error::HttpError;
use super::validator::{Validate, ValidationMeta};

/// Validates data against JSON Schema models.
#[derive(Clone)]
pub struct JsonSchemaValidator {
    cache: Arc<DashMap<String, Arc<Validator>>>,
    enabled: bool,
}

impl Default for JsonSchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonSchemaValidator {
    pub fn new() -> Self {
        Self::with_cache(true)
    }

    /// With `enabled = false` every call compiles its model again.
    pub fn with_cache(enabled: bool) -> Self {
        Self {
            cache: Arc::new(DashMap::new()),
            enabled,
        }
    }

    /// Number of compiled validators held.
    pub fn size(&self) -> usize {
        self.cache.len()
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    fn cache_key(model: &Value) -> String {
        let digest = Sha256::digest(model.to_string().as_bytes());
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    fn compile(model: &Value) -> Result<Validator, HttpError> {
        jsonschema::validator_for(model).map_err(|e| {
            error!(error = %e, "Failed to compile JSON Schema model");
            HttpError::configuration(format!("Invalid validation model: {e}"))
        })
    }

    fn compiled(&self, model: &Value) -> Result<Arc<Validator>, HttpError> {
        if !self.enabled {
            return Self::compile(model).map(Arc::new);
        }
        let key = Self::cache_key(model);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(Arc::clone(hit.value()));
        }
        let validator = Arc::new(Self::compile(model)?);
        // Another task may have compiled the same model meanwhile; keep the first.
        let cached = Arc::clone(
            self.cache
                .entry(key)
                .or_insert_with(|| Arc::clone(&validator))
                .value(),
        );
        debug!(cache_size = self.cache.len(), "JSON Schema model compiled and cached");
        Ok(cached)
    }

    /// Synchronous check used by the [`Validate`] impl.
    pub fn check(
        &self,
        data: &Value,
        model: &Value,
        meta: ValidationMeta<'_>,
    ) -> Result<(), HttpError> {
        let validator = self.compiled(model)?;
        let details: Vec<String> = validator
            .iter_errors(data)
            .map(|e| {
                let path = e.instance_path.to_string();
                let path = path.trim_start_matches('/');
                if path.is_empty() {
                    e.to_string()
                } else {
                    format!("{e} ({path})")
                }
            })
            .collect();
        if details.is_empty() {
            return Ok(());
        }
        Err(HttpError::validation(
            meta.validation_type,
            format!(
                "Validation failed. Invalid {} on server for {} {}. {}",
                meta.validation_type,
                meta.request.method,
                meta.request.url,
                details.join(", ")
            ),
        ))
    }
}

impl Validate for JsonSchemaValidator {
    fn validate<'a>(
        &'a self,
        data: &'a Value,
        model: &'a Value,
        meta: ValidationMeta<'a>,
    ) -> BoxFuture<'a, Result<Option<Value>, HttpError>> {
        Box::pin(future::ready(self.check(data, model, meta).map(|()| None)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{HttpMethod, ValidationType};
    use crate::validation::RequestInfo;
    use serde_json::json;

    fn info() -> RequestInfo {
        RequestInfo {
            method: HttpMethod::Post,
            url: "/api/users".into(),
        }
    }

    #[test]
    fn test_valid_data_passes() {
        let v = JsonSchemaValidator::new();
        let model = json!({"type": "object", "properties": {"age": {"type": "integer"}}});
        let info = info();
        assert!(v
            .check(&json!({"age": 3}), &model, ValidationMeta::new(ValidationType::Body, &info))
            .is_ok());
    }

    #[test]
    fn test_error_lists_every_failing_path() {
        let v = JsonSchemaValidator::new();
        let model = json!({
            "type": "object",
            "required": ["name"],
            "properties": {"age": {"type": "integer"}, "tags": {"type": "array", "items": {"type": "string"}}}
        });
        let info = info();
        let err = v
            .check(
                &json!({"age": "x", "tags": ["a", 1]}),
                &model,
                ValidationMeta::new(ValidationType::Body, &info),
            )
            .unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(err.validation_type(), Some(ValidationType::Body));
        let msg = err.message();
        assert!(msg.starts_with("Validation failed. Invalid body on server for POST /api/users."));
        assert!(msg.contains("(age)"));
        assert!(msg.contains("(tags/1)"));
        assert!(msg.contains("name"));
    }

    #[test]
    fn test_cache_reuses_compiled_model() {
        let v = JsonSchemaValidator::new();
        let model = json!({"type": "string"});
        let info = info();
        for _ in 0..3 {
            v.check(&json!("ok"), &model, ValidationMeta::new(ValidationType::Query, &info))
                .unwrap();
        }
        assert_eq!(v.size(), 1);
        v.check(
            &json!(1),
            &json!({"type": "integer"}),
            ValidationMeta::new(ValidationType::Query, &info),
        )
        .unwrap();
        assert_eq!(v.size(), 2);
    }

    #[test]
    fn test_disabled_cache_stays_empty() {
        let v = JsonSchemaValidator::with_cache(false);
        let info = info();
        v.check(&json!("ok"), &json!({"type": "string"}), ValidationMeta::new(ValidationType::Body, &info))
            .unwrap();
        assert_eq!(v.size(), 0);
    }

    #[test]
    fn test_invalid_model_is_configuration_error() {
        let v = JsonSchemaValidator::new();
        let info = info();
        let err = v
            .check(
                &json!(1),
                &json!({"type": "not-a-type"}),
                ValidationMeta::new(ValidationType::Body, &info),
            )
            .unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(err.status(), 500);
    }
}
