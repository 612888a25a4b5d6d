//! Client-side helpers shared by generated clients.
//!
//! - [`Endpoint::build`] turns a handler declaration plus call arguments into
//!   a request URL.
//! - [`encode_query`] serializes a JSON object as a bracket-notation query
//!   string (`filter[tags][0]=a`).
//! - [`validate_on_client`] runs the handler's `body` and `query` models
//!   before anything is sent.
//!
//! Failures that happen before a request reaches the network use the
//! [`HttpStatus::NULL`] status.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use tracing::debug;

use crate::schema::{HandlerSchema, ValidationType};
use crate::validation::{HttpError, HttpStatus, RequestInfo, Validate, ValidationMeta};

/// `:name` or `{name}` placeholders in a handler path.
static PATH_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)|\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .expect("Failed to compile path parameter regex")
});

fn param_name<'a>(caps: &'a Captures<'_>) -> &'a str {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str())
        .unwrap_or_default()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// A resolved request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub path: String,
    pub query: String,
}

impl Endpoint {
    /// Build the URL for a handler call.
    ///
    /// Parts are joined with single slashes. Every placeholder in `path` must
    /// have a value in `params`; values are URL-encoded. Unused params are
    /// ignored.
    pub fn build(
        api_root: &str,
        segment_name: &str,
        prefix: &str,
        path: &str,
        params: &Value,
        query: &Value,
    ) -> Result<Self, HttpError> {
        let missing: Vec<String> = PATH_PARAM
            .captures_iter(path)
            .map(|caps| param_name(&caps).to_string())
            .filter(|name| params.get(name).and_then(scalar_to_string).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(HttpError::client(format!(
                "Missing path parameters for {path}: {}",
                missing.join(", ")
            )));
        }

        let resolved = PATH_PARAM.replace_all(path, |caps: &Captures<'_>| {
            params
                .get(param_name(caps))
                .and_then(scalar_to_string)
                .map(|v| urlencoding::encode(&v).into_owned())
                .unwrap_or_default()
        });

        let root = api_root.trim_end_matches('/');
        let mut full = String::from(root);
        for part in [segment_name, prefix, &*resolved] {
            let part = part.trim_matches('/');
            if !part.is_empty() {
                full.push('/');
                full.push_str(part);
            }
        }
        if full.is_empty() {
            full.push('/');
        }

        Ok(Endpoint {
            path: full,
            query: encode_query(query),
        })
    }

    /// Path with the query string appended when there is one.
    pub fn url(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }
}

fn push_pairs(prefix: &str, value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, v) in map {
                let key = urlencoding::encode(key);
                let nested = if prefix.is_empty() {
                    key.into_owned()
                } else {
                    format!("{prefix}[{key}]")
                };
                push_pairs(&nested, v, out);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                push_pairs(&format!("{prefix}[{i}]"), v, out);
            }
        }
        scalar => {
            if let Some(s) = scalar_to_string(scalar) {
                out.push(format!("{prefix}={}", urlencoding::encode(&s)));
            }
        }
    }
}

/// Encode a JSON object as a query string using bracket notation.
///
/// `null` values are omitted. Anything other than an object encodes to an
/// empty string.
pub fn encode_query(query: &Value) -> String {
    if !query.is_object() {
        return String::new();
    }
    let mut pairs = Vec::new();
    push_pairs("", query, &mut pairs);
    pairs.join("&")
}

/// Check `body` and `query` against the handler's models before sending.
///
/// Validation failures keep their status; any other failure (for example a
/// model that does not compile) is reported with [`HttpStatus::NULL`].
pub async fn validate_on_client(
    handler: &HandlerSchema,
    body: &Value,
    query: &Value,
    validator: &dyn Validate,
    endpoint: &Endpoint,
) -> Result<(), HttpError> {
    let info = RequestInfo {
        method: handler.http_method,
        url: endpoint.url(),
    };
    for (ty, data) in [(ValidationType::Body, body), (ValidationType::Query, query)] {
        let Some(model) = handler.model(ty) else { continue };
        let verdict = validator
            .validate(data, model, ValidationMeta::new(ty, &info))
            .await;
        if let Err(e) = verdict {
            debug!(validation_type = %ty, url = %info.url, "Client-side validation failed");
            if e.validation_type().is_some() || e.status() == HttpStatus::NULL {
                return Err(e);
            }
            return Err(HttpError::client(e.message()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{HttpMethod, ValidationModels};
    use crate::validation::JsonSchemaValidator;
    use serde_json::json;

    #[test]
    fn test_build_substitutes_both_placeholder_styles() {
        let endpoint = Endpoint::build(
            "/api/",
            "foo/client",
            "users",
            ":id/posts/{slug}",
            &json!({"id": 42, "slug": "hello world"}),
            &Value::Null,
        )
        .unwrap();
        assert_eq!(endpoint.path, "/api/foo/client/users/42/posts/hello%20world");
        assert_eq!(endpoint.url(), endpoint.path);
    }

    #[test]
    fn test_missing_param_is_client_error() {
        let err = Endpoint::build("/api", "", "users", ":id", &json!({}), &Value::Null)
            .unwrap_err();
        assert_eq!(err.status(), HttpStatus::NULL);
        assert!(err.message().contains("id"));
    }

    #[test]
    fn test_query_uses_bracket_notation() {
        let query = json!({
            "q": "a&b",
            "filter": {"tags": ["x", "y"], "active": true},
            "skip": null
        });
        assert_eq!(
            encode_query(&query),
            "filter[active]=true&filter[tags][0]=x&filter[tags][1]=y&q=a%26b"
        );
        let endpoint = Endpoint::build("/api", "s", "", "list", &Value::Null, &json!({"page": 2}))
            .unwrap();
        assert_eq!(endpoint.url(), "/api/s/list?page=2");
    }

    #[tokio::test]
    async fn test_validate_on_client() {
        let mut models = ValidationModels::default();
        models.body = Some(json!({"type": "object", "required": ["name"]}));
        let handler = HandlerSchema::new(HttpMethod::Post, "users").with_validation(models);
        let endpoint = Endpoint::build("/api", "", "", "users", &Value::Null, &Value::Null).unwrap();
        let validator = JsonSchemaValidator::new();

        validate_on_client(&handler, &json!({"name": "a"}), &Value::Null, &validator, &endpoint)
            .await
            .unwrap();
        let err = validate_on_client(&handler, &json!({}), &Value::Null, &validator, &endpoint)
            .await
            .unwrap_err();
        assert_eq!(err.validation_type(), Some(ValidationType::Body));
    }

    #[tokio::test]
    async fn test_broken_model_maps_to_null_status() {
        let mut models = ValidationModels::default();
        models.query = Some(json!({"type": 12}));
        let handler = HandlerSchema::new(HttpMethod::Get, "users").with_validation(models);
        let endpoint = Endpoint::build("/api", "", "", "users", &Value::Null, &Value::Null).unwrap();
        let err = validate_on_client(
            &handler,
            &Value::Null,
            &json!({}),
            &JsonSchemaValidator::new(),
            &endpoint,
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), HttpStatus::NULL);
    }
}
