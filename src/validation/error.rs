use http::StatusCode;
use serde_json::{json, Value};
use std::fmt;

use crate::schema::ValidationType;

/// Status codes used by validation and client-side failures.
pub struct HttpStatus;

impl HttpStatus {
    /// Sentinel for failures that never reached the network.
    pub const NULL: u16 = 0;
    pub const BAD_REQUEST: u16 = 400;
    pub const INTERNAL_SERVER_ERROR: u16 = 500;
}

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A model rejected the data.
    Validation(ValidationType),
    /// The handler or its validation setup is misconfigured.
    Configuration,
    /// Failed on the calling side before a request was sent.
    Client,
    /// Raised by a handler.
    Handler,
}

/// Request-scoped error carrying an HTTP-meaningful status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    status: u16,
    message: String,
    kind: ErrorKind,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        HttpError {
            status: status.as_u16(),
            message: message.into(),
            kind: ErrorKind::Handler,
        }
    }

    /// 400 for request inputs, 500 for data the handler produced.
    pub fn validation(ty: ValidationType, message: impl Into<String>) -> Self {
        let status = if ty.is_request_side() {
            HttpStatus::BAD_REQUEST
        } else {
            HttpStatus::INTERNAL_SERVER_ERROR
        };
        HttpError {
            status,
            message: message.into(),
            kind: ErrorKind::Validation(ty),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        HttpError {
            status: HttpStatus::INTERNAL_SERVER_ERROR,
            message: message.into(),
            kind: ErrorKind::Configuration,
        }
    }

    pub fn client(message: impl Into<String>) -> Self {
        HttpError {
            status: HttpStatus::NULL,
            message: message.into(),
            kind: ErrorKind::Client,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// `None` for the [`HttpStatus::NULL`] sentinel.
    pub fn status_code(&self) -> Option<StatusCode> {
        if self.status == HttpStatus::NULL {
            return None;
        }
        StatusCode::from_u16(self.status).ok()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn is_configuration(&self) -> bool {
        self.kind == ErrorKind::Configuration
    }

    pub fn validation_type(&self) -> Option<ValidationType> {
        match self.kind {
            ErrorKind::Validation(ty) => Some(ty),
            _ => None,
        }
    }

    /// Error response body sent to callers.
    pub fn to_json(&self) -> Value {
        json!({
            "statusCode": self.status,
            "message": self.message,
            "isError": true,
        })
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status, self.message)
    }
}

impl std::error::Error for HttpError {}
