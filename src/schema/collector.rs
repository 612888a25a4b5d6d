use serde_json::Value;
use tracing::{debug, warn};

use super::types::{ControllerSchema, FullSchema, HandlerSchema, HttpMethod, ValidationModels};

/// Externally visible schema of a validated handler.
///
/// Returned by [`crate::validation::wrap`] alongside the wrapped handler; the
/// models are already filtered by the schema-emission skip-list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandlerContribution {
    pub validation: ValidationModels,
    pub openapi: Option<Value>,
}

impl HandlerContribution {
    pub fn with_openapi(mut self, openapi: Value) -> Self {
        self.openapi = Some(openapi);
        self
    }
}

/// Explicit registry that assembles handler contributions into a [`FullSchema`].
///
/// Owned by whoever registers handlers; there is no process-wide state.
#[derive(Debug, Default)]
pub struct SchemaCollector {
    schema: FullSchema,
}

impl SchemaCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a controller and its path prefix within a segment.
    pub fn controller(
        &mut self,
        segment_name: &str,
        controller_name: &str,
        prefix: &str,
    ) -> &mut ControllerSchema {
        let segment = self.schema.entry(segment_name);
        let controller = segment
            .controllers
            .entry(controller_name.to_string())
            .or_insert_with(|| ControllerSchema {
                controller_name: controller_name.to_string(),
                ..ControllerSchema::default()
            });
        controller.prefix = prefix.to_string();
        controller
    }

    /// Register one handler under `segment → controller → key`.
    #[allow(clippy::too_many_arguments)]
    pub fn register(
        &mut self,
        segment_name: &str,
        controller_name: &str,
        handler_key: &str,
        http_method: HttpMethod,
        path: &str,
        contribution: &HandlerContribution,
    ) {
        let segment = self.schema.entry(segment_name);
        let controller = segment
            .controllers
            .entry(controller_name.to_string())
            .or_insert_with(|| ControllerSchema {
                controller_name: controller_name.to_string(),
                ..ControllerSchema::default()
            });
        let mut handler = HandlerSchema::new(http_method, path)
            .with_validation(contribution.validation.clone());
        handler.openapi = contribution.openapi.clone();
        if controller
            .handlers
            .insert(handler_key.to_string(), handler)
            .is_some()
        {
            warn!(
                segment = segment_name,
                controller = controller_name,
                handler = handler_key,
                "Handler registered twice, keeping the latest contribution"
            );
        } else {
            debug!(
                segment = segment_name,
                controller = controller_name,
                handler = handler_key,
                method = %http_method,
                path = path,
                "Handler schema registered"
            );
        }
    }

    pub fn set_emit_schema(&mut self, segment_name: &str, emit: bool) {
        self.schema.entry(segment_name).emit_schema = emit;
    }

    pub fn schema(&self) -> &FullSchema {
        &self.schema
    }

    pub fn finish(self) -> FullSchema {
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_builds_tree() {
        let mut collector = SchemaCollector::new();
        collector.controller("foo", "UserRPC", "users");
        let contribution = HandlerContribution {
            validation: ValidationModels {
                body: Some(json!({"type": "object"})),
                ..Default::default()
            },
            openapi: None,
        };
        collector.register("foo", "UserRPC", "createUser", HttpMethod::Post, "", &contribution);
        let schema = collector.finish();

        let controller = &schema.get("foo").unwrap().controllers["UserRPC"];
        assert_eq!(controller.prefix, "users");
        let handler = &controller.handlers["createUser"];
        assert_eq!(handler.http_method, HttpMethod::Post);
        assert_eq!(handler.validation.as_ref().unwrap().body, Some(json!({"type": "object"})));
    }

    #[test]
    fn test_empty_contribution_has_no_validation_key() {
        let mut collector = SchemaCollector::new();
        collector.register(
            "",
            "Ping",
            "ping",
            HttpMethod::Get,
            "ping",
            &HandlerContribution::default(),
        );
        let value = serde_json::to_value(collector.finish()).unwrap();
        assert!(value[""]["controllers"]["Ping"]["handlers"]["ping"]
            .get("validation")
            .is_none());
    }

    #[test]
    fn test_register_twice_keeps_latest() {
        let mut collector = SchemaCollector::new();
        let c = HandlerContribution::default();
        collector.register("s", "C", "h", HttpMethod::Get, "a", &c);
        collector.register("s", "C", "h", HttpMethod::Put, "b", &c);
        let schema = collector.finish();
        let h = &schema.get("s").unwrap().controllers["C"].handlers["h"];
        assert_eq!(h.http_method, HttpMethod::Put);
        assert_eq!(h.path, "b");
    }
}
