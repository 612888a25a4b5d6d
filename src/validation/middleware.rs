use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::context::RequestContext;
use super::error::HttpError;
use super::handler::{Handler, HandlerFuture, HandlerOutput};
use super::iteration::validate_iteration;
use super::validator::{Validate, ValidationMeta};
use crate::schema::{HandlerContribution, SkipList, SkipSetting, ValidationModels, ValidationType};

/// Request inputs in the order they are checked.
pub const REQUEST_VALIDATION_ORDER: [ValidationType; 3] = [
    ValidationType::Params,
    ValidationType::Query,
    ValidationType::Body,
];

/// Options controlling which checks run and which models are published.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOptions {
    #[serde(default)]
    pub skip_server_side_validation: SkipSetting,
    #[serde(default)]
    pub skip_schema_emission: SkipSetting,
    #[serde(default)]
    pub validate_every_iteration: bool,
}

/// A handler wrapped with layered validation.
///
/// Implements [`Handler`] itself, so it can be registered wherever the raw
/// handler could.
pub struct ValidatedHandler {
    models: Arc<ValidationModels>,
    validator: Arc<dyn Validate>,
    skip: SkipList,
    validate_every_iteration: bool,
    handle: Arc<dyn Handler>,
}

/// Wrap `handle` with validation of its inputs and output.
///
/// Per call, stopping at the first failure:
///
/// 1. Misconfiguration is rejected before anything else: `output` together
///    with `iteration`, or `validate_every_iteration` without `iteration`.
/// 2. `params`, `query`, `body` models (in that order) are checked against the
///    request; a transformed instance returned by the validator becomes the
///    value the handler sees, the raw value stays readable.
/// 3. The handler runs.
/// 4. `output` requires a non-empty JSON result and validates it.
/// 5. `iteration` requires a stream and wraps it so items are validated as
///    they are consumed.
///
/// Types listed in `skip_server_side_validation` are not checked. The returned
/// [`HandlerContribution`] carries the models minus `skip_schema_emission`
/// and is meant for a [`crate::schema::SchemaCollector`].
pub fn wrap<H, V>(
    models: ValidationModels,
    validator: V,
    options: &ValidationOptions,
    handle: H,
) -> (ValidatedHandler, HandlerContribution)
where
    H: Handler,
    V: Validate + 'static,
{
    let emission_skip = SkipList::resolve(&options.skip_schema_emission);
    let contribution = HandlerContribution {
        validation: models.without(&emission_skip),
        openapi: None,
    };
    let handler = ValidatedHandler {
        models: Arc::new(models),
        validator: Arc::new(validator),
        skip: SkipList::resolve(&options.skip_server_side_validation),
        validate_every_iteration: options.validate_every_iteration,
        handle: Arc::new(handle),
    };
    (handler, contribution)
}

impl ValidatedHandler {
    pub fn models(&self) -> &ValidationModels {
        &self.models
    }

    /// Model for `ty` if present and not skipped.
    fn active_model(models: &ValidationModels, skip: &SkipList, ty: ValidationType) -> Option<Value> {
        if skip.contains(ty) {
            return None;
        }
        models.get(ty).cloned()
    }
}

impl Handler for ValidatedHandler {
    fn call(&self, ctx: RequestContext) -> HandlerFuture {
        let models = Arc::clone(&self.models);
        let validator = Arc::clone(&self.validator);
        let skip = self.skip.clone();
        let validate_every = self.validate_every_iteration;
        let handle = Arc::clone(&self.handle);

        Box::pin(async move {
            // Misconfiguration fails every call, whatever the input.
            if models.has_conflicting_output() {
                return Err(HttpError::configuration(
                    "Output and iteration are mutually exclusive. You can't use them together.",
                ));
            }
            if validate_every && models.iteration.is_none() {
                return Err(HttpError::configuration(
                    "validateEveryIteration is set but iteration is not defined.",
                ));
            }

            let mut ctx = ctx;
            for ty in REQUEST_VALIDATION_ORDER {
                let Some(model) = models.get(ty) else { continue };
                if skip.contains(ty) {
                    continue;
                }
                let transformed = match ctx.field(ty) {
                    Some(field) => {
                        validator
                            .validate(field.raw(), model, ValidationMeta::new(ty, ctx.info()))
                            .await?
                    }
                    None => None,
                };
                if let (Some(value), Some(field)) = (transformed, ctx.field_mut(ty)) {
                    field.set_validated(value);
                }
                debug!(validation_type = %ty, url = %ctx.url(), "Request input validated");
            }

            let info = Arc::new(ctx.info().clone());
            let output = handle.call(ctx).await?;

            if let Some(model) = Self::active_model(&models, &skip, ValidationType::Output) {
                if output.is_empty() {
                    return Err(HttpError::configuration(
                        "Output is required. You probably forgot to return something from your handler.",
                    ));
                }
                let HandlerOutput::Json(data) = &output else {
                    return Err(HttpError::configuration(
                        "Output validation is defined but the handler returned a stream.",
                    ));
                };
                validator
                    .validate(data, &model, ValidationMeta::new(ValidationType::Output, &info))
                    .await?;
                return Ok(output);
            }

            if let Some(model) = Self::active_model(&models, &skip, ValidationType::Iteration) {
                let Some(source) = output.into_stream() else {
                    return Err(HttpError::configuration(
                        "Data is not a stream but iteration validation is defined.",
                    ));
                };
                return Ok(HandlerOutput::Stream(validate_iteration(
                    source,
                    Arc::new(model),
                    validator,
                    info,
                    validate_every,
                )));
            }

            Ok(output)
        })
    }
}
