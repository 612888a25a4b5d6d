//! OpenAPI metadata attached to handlers.
//!
//! Handler `openapi` objects are additive: [`HandlerSchema::merge_openapi`]
//! deep-merges new keys into what is already there, and
//! [`HandlerSchema::with_error_response`] documents an error status whose
//! `message` enum grows with every call.

use serde_json::{json, Map, Value};

use crate::schema::HandlerSchema;

/// Component name referenced by documented error responses.
pub const ERROR_RESPONSE_COMPONENT: &str = "RpcErrorResponse";

/// Schema of the error body produced by [`crate::validation::HttpError::to_json`].
pub fn error_response_component() -> Value {
    json!({
        "type": "object",
        "properties": {
            "statusCode": { "type": "integer" },
            "message": { "type": "string" },
            "isError": { "type": "boolean", "const": true }
        },
        "required": ["statusCode", "message", "isError"]
    })
}

/// Deep-merge `extra` into `base`.
///
/// Objects merge key by key; any other value in `extra` replaces the one in
/// `base`.
pub fn merge_json(base: &mut Value, extra: Value) {
    match (base, extra) {
        (Value::Object(base), Value::Object(extra)) => {
            for (key, value) in extra {
                match base.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, extra) => *base = extra,
    }
}

fn message_enum(openapi: Option<&Value>, status: u16) -> Vec<Value> {
    openapi
        .and_then(|o| o.pointer(&format!(
            "/responses/{status}/content/application~1json/schema/allOf/1/properties/message/enum"
        )))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

impl HandlerSchema {
    /// Merge additional OpenAPI metadata into this handler.
    pub fn merge_openapi(&mut self, extra: Value) {
        match &mut self.openapi {
            Some(existing) => merge_json(existing, extra),
            None => self.openapi = Some(extra),
        }
    }

    /// Document an error response for `status`.
    ///
    /// Repeated calls for the same status keep earlier messages; the newest
    /// message comes first in the enum.
    pub fn with_error_response(mut self, status: u16, message: impl Into<String>) -> Self {
        let mut messages = vec![Value::String(message.into())];
        for previous in message_enum(self.openapi.as_ref(), status) {
            if !messages.contains(&previous) {
                messages.push(previous);
            }
        }
        let response = json!({
            "description": format!("{status} response"),
            "content": {
                "application/json": {
                    "schema": {
                        "allOf": [
                            { "$ref": format!("#/components/schemas/{ERROR_RESPONSE_COMPONENT}") },
                            {
                                "type": "object",
                                "properties": {
                                    "message": { "type": "string", "enum": messages },
                                    "statusCode": { "type": "integer", "enum": [status] }
                                }
                            }
                        ]
                    }
                }
            }
        });
        // Replaces the whole entry for this status.
        let openapi = self.openapi.get_or_insert_with(|| Value::Object(Map::new()));
        if !openapi.is_object() {
            *openapi = Value::Object(Map::new());
        }
        if let Value::Object(openapi) = openapi {
            let responses = openapi
                .entry("responses")
                .or_insert_with(|| Value::Object(Map::new()));
            if !responses.is_object() {
                *responses = Value::Object(Map::new());
            }
            if let Value::Object(responses) = responses {
                responses.insert(status.to_string(), response);
            }
        }
        self
    }
}
