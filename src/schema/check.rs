use super::types::{FullSchema, ValidationType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    pub location: String,
    pub kind: String,
    pub message: String,
}

impl SchemaIssue {
    pub fn new(
        location: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        SchemaIssue {
            location: location.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Static checks over a loaded schema.
///
/// Reports handlers that would fail with a configuration error at request
/// time (both `output` and `iteration` declared) and models that are not JSON
/// objects.
pub fn check_schema(schema: &FullSchema) -> Vec<SchemaIssue> {
    let mut issues = Vec::new();
    for (segment, controller, key, handler) in schema.handlers() {
        let location = format!("{segment}/{controller}.{key}");
        let Some(models) = &handler.validation else {
            continue;
        };
        if models.has_conflicting_output() {
            issues.push(SchemaIssue::new(
                &location,
                "Error",
                "output and iteration models are mutually exclusive",
            ));
        }
        for ty in ValidationType::ALL {
            if let Some(model) = models.get(ty) {
                if !model.is_object() && !model.is_boolean() {
                    issues.push(SchemaIssue::new(
                        &location,
                        "Warning",
                        format!("{ty} model is not a JSON schema object"),
                    ));
                }
            }
        }
    }
    issues
}

pub fn print_issues(issues: &[SchemaIssue]) {
    eprintln!("\n❌ Schema check failed. {} issue(s) found:\n", issues.len());
    for issue in issues {
        eprintln!("[{}] {}: {}", issue.kind, issue.location, issue.message);
    }
    eprintln!("\nPlease fix the issues in your handler declarations before generating.\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{HandlerSchema, HttpMethod, SchemaCollector, HandlerContribution, ValidationModels};
    use serde_json::json;

    #[test]
    fn test_conflicting_output_reported() {
        let mut collector = SchemaCollector::new();
        let contribution = HandlerContribution {
            validation: ValidationModels {
                output: Some(json!({"type": "object"})),
                iteration: Some(json!({"type": "string"})),
                ..Default::default()
            },
            openapi: None,
        };
        collector.register("api", "Stream", "items", HttpMethod::Get, "", &contribution);
        let issues = check_schema(&collector.finish());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].location, "api/Stream.items");
        assert_eq!(issues[0].kind, "Error");
    }

    #[test]
    fn test_clean_schema_has_no_issues() {
        let mut schema = FullSchema::new();
        let segment = schema.entry("api");
        let controller = segment.controllers.entry("C".into()).or_default();
        controller.handlers.insert(
            "h".into(),
            HandlerSchema::new(HttpMethod::Get, "").with_validation(ValidationModels {
                query: Some(json!({"type": "object"})),
                ..Default::default()
            }),
        );
        assert!(check_schema(&schema).is_empty());
    }

    #[test]
    fn test_non_object_model_warns() {
        let mut schema = FullSchema::new();
        let controller = schema.entry("api").controllers.entry("C".into()).or_default();
        controller.handlers.insert(
            "h".into(),
            HandlerSchema::new(HttpMethod::Get, "").with_validation(ValidationModels {
                body: Some(json!("string")),
                ..Default::default()
            }),
        );
        let issues = check_schema(&schema);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, "Warning");
    }
}
