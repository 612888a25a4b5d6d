use futures::future::{self, BoxFuture};
use serde_json::Value;

use super::context::RequestInfo;
use super::error::HttpError;
use crate::schema::ValidationType;

/// Metadata passed with every validation call.
#[derive(Debug, Clone, Copy)]
pub struct ValidationMeta<'a> {
    pub validation_type: ValidationType,
    pub request: &'a RequestInfo,
    /// Response status the data belongs to (set for streamed items).
    pub status: Option<u16>,
}

impl<'a> ValidationMeta<'a> {
    pub fn new(validation_type: ValidationType, request: &'a RequestInfo) -> Self {
        Self {
            validation_type,
            request,
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Validation library adapter.
///
/// Checks `data` against `model`. `Ok(Some(v))` replaces the data with a
/// normalized instance, `Ok(None)` keeps it, `Err` rejects the call.
pub trait Validate: Send + Sync {
    fn validate<'a>(
        &'a self,
        data: &'a Value,
        model: &'a Value,
        meta: ValidationMeta<'a>,
    ) -> BoxFuture<'a, Result<Option<Value>, HttpError>>;
}

/// [`Validate`] implementation backed by a synchronous closure.
pub struct FnValidator<F> {
    f: F,
}

/// Wrap a closure as a validator.
pub fn validator_fn<F>(f: F) -> FnValidator<F>
where
    F: Fn(&Value, &Value, ValidationMeta<'_>) -> Result<Option<Value>, HttpError> + Send + Sync,
{
    FnValidator { f }
}

impl<F> Validate for FnValidator<F>
where
    F: Fn(&Value, &Value, ValidationMeta<'_>) -> Result<Option<Value>, HttpError> + Send + Sync,
{
    fn validate<'a>(
        &'a self,
        data: &'a Value,
        model: &'a Value,
        meta: ValidationMeta<'a>,
    ) -> BoxFuture<'a, Result<Option<Value>, HttpError>> {
        Box::pin(future::ready((self.f)(data, model, meta)))
    }
}
