use futures::future::BoxFuture;
use futures::stream::BoxStream;
use serde_json::Value;
use std::fmt;
use std::future::Future;

use super::context::RequestContext;
use super::error::HttpError;

/// Lazily produced items of a streaming handler.
pub type ItemStream = BoxStream<'static, Result<Value, HttpError>>;

pub type HandlerFuture = BoxFuture<'static, Result<HandlerOutput, HttpError>>;

/// What a handler produced.
pub enum HandlerOutput {
    /// Nothing was returned.
    Empty,
    Json(Value),
    Stream(ItemStream),
}

impl HandlerOutput {
    /// No value: `Empty` or JSON `null`. Falsy JSON such as `0` is a value.
    pub fn is_empty(&self) -> bool {
        matches!(self, HandlerOutput::Empty | HandlerOutput::Json(Value::Null))
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, HandlerOutput::Stream(_))
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            HandlerOutput::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_stream(self) -> Option<ItemStream> {
        match self {
            HandlerOutput::Stream(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Debug for HandlerOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerOutput::Empty => f.write_str("Empty"),
            HandlerOutput::Json(v) => f.debug_tuple("Json").field(v).finish(),
            HandlerOutput::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<Value> for HandlerOutput {
    fn from(value: Value) -> Self {
        HandlerOutput::Json(value)
    }
}

/// An async route handler.
///
/// Implemented for any `Fn(RequestContext) -> impl Future<Output = Result<HandlerOutput, HttpError>>`,
/// and by [`super::ValidatedHandler`], which keeps the same calling convention.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, ctx: RequestContext) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HandlerOutput, HttpError>> + Send + 'static,
{
    fn call(&self, ctx: RequestContext) -> HandlerFuture {
        Box::pin(self(ctx))
    }
}
