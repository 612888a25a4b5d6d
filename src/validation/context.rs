use serde_json::Value;

use crate::schema::{HttpMethod, ValidationType};

/// Method and URL of the call being validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub method: HttpMethod,
    pub url: String,
}

/// One request input with its parsed value and, once validated, the
/// (possibly transformed) instance returned by the validator.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    raw: Value,
    validated: Option<Value>,
}

impl Field {
    pub fn new(raw: Value) -> Self {
        Self {
            raw,
            validated: None,
        }
    }

    /// The value as parsed from the request.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The validated instance, or the raw value when no validator replaced it.
    pub fn get(&self) -> &Value {
        self.validated.as_ref().unwrap_or(&self.raw)
    }

    pub fn is_validated(&self) -> bool {
        self.validated.is_some()
    }

    pub(crate) fn set_validated(&mut self, value: Value) {
        self.validated = Some(value);
    }
}

/// Request view handed through the validation middleware to the handler.
///
/// Handlers read `params()`, `query()` and `body()` and get the post-validation
/// values; `raw_body()` still returns the body exactly as parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    info: RequestInfo,
    params: Field,
    query: Field,
    body: Field,
}

impl RequestContext {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            info: RequestInfo {
                method,
                url: url.into(),
            },
            params: Field::new(Value::Null),
            query: Field::new(Value::Null),
            body: Field::new(Value::Null),
        }
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Field::new(params);
        self
    }

    pub fn with_query(mut self, query: Value) -> Self {
        self.query = Field::new(query);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Field::new(body);
        self
    }

    pub fn info(&self) -> &RequestInfo {
        &self.info
    }

    pub fn method(&self) -> HttpMethod {
        self.info.method
    }

    pub fn url(&self) -> &str {
        &self.info.url
    }

    pub fn params(&self) -> &Value {
        self.params.get()
    }

    pub fn query(&self) -> &Value {
        self.query.get()
    }

    pub fn body(&self) -> &Value {
        self.body.get()
    }

    pub fn raw_body(&self) -> &Value {
        self.body.raw()
    }

    /// The input slot checked for `ty`; `None` for output-side types.
    pub fn field(&self, ty: ValidationType) -> Option<&Field> {
        match ty {
            ValidationType::Params => Some(&self.params),
            ValidationType::Query => Some(&self.query),
            ValidationType::Body => Some(&self.body),
            ValidationType::Output | ValidationType::Iteration => None,
        }
    }

    pub(crate) fn field_mut(&mut self, ty: ValidationType) -> Option<&mut Field> {
        match ty {
            ValidationType::Params => Some(&mut self.params),
            ValidationType::Query => Some(&mut self.query),
            ValidationType::Body => Some(&mut self.body),
            ValidationType::Output | ValidationType::Iteration => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validated_value_replaces_view_but_not_raw() {
        let mut ctx = RequestContext::new(HttpMethod::Post, "/api/users")
            .with_body(json!({"age": "42"}));
        ctx.field_mut(ValidationType::Body)
            .unwrap()
            .set_validated(json!({"age": 42}));
        assert_eq!(ctx.body(), &json!({"age": 42}));
        assert_eq!(ctx.raw_body(), &json!({"age": "42"}));
        assert!(ctx.field(ValidationType::Body).unwrap().is_validated());
    }

    #[test]
    fn test_output_types_have_no_field() {
        let ctx = RequestContext::new(HttpMethod::Get, "/");
        assert!(ctx.field(ValidationType::Output).is_none());
        assert!(ctx.field(ValidationType::Iteration).is_none());
        assert_eq!(ctx.query(), &Value::Null);
    }
}
