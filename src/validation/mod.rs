//! # Validation Module
//!
//! Runtime enforcement of a handler's validation models.
//!
//! [`wrap`] turns a raw [`Handler`] into a [`ValidatedHandler`] with the same
//! calling convention. Each call checks `params`, `query` and `body` in that
//! order, runs the handler, then checks `output` or re-validates streamed
//! items against `iteration`.
//!
//! The check itself is pluggable through [`Validate`]; [`JsonSchemaValidator`]
//! is the bundled JSON Schema implementation with a compiled-validator cache.
//!
//! All failures are [`HttpError`]s carrying an HTTP status.

mod context;
mod error;
mod handler;
mod iteration;
mod json_schema;
mod middleware;
mod validator;

pub use context::{Field, RequestContext, RequestInfo};
pub use error::{ErrorKind, HttpError, HttpStatus};
pub use handler::{Handler, HandlerFuture, HandlerOutput, ItemStream};
pub use iteration::validate_iteration;
pub use json_schema::JsonSchemaValidator;
pub use middleware::{wrap, ValidatedHandler, ValidationOptions, REQUEST_VALIDATION_ORDER};
pub use validator::{validator_fn, FnValidator, Validate, ValidationMeta};
