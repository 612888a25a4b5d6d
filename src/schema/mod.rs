//! # Schema Module
//!
//! In-memory model of the API tree: segments contain controllers, controllers
//! contain handlers, handlers carry an HTTP method, a path and optional
//! validation models.
//!
//! ```text
//! FullSchema
//! └── "foo/client" → SegmentSchema { emit_schema }
//!     └── "UserRPC" → ControllerSchema { prefix }
//!         └── "getUser" → HandlerSchema { http_method, path, validation, openapi }
//! ```
//!
//! The tree serializes to the `full-schema.json` layout (camelCase keys).
//!
//! - [`assemble_schema`] picks the entries for the segments being emitted and
//!   fails with [`MissingSchemaError`] when one is absent.
//! - [`SchemaCollector`] gathers the contributions returned by
//!   [`crate::validation::wrap`] into a schema.
//! - [`load_full_schema`] reads a schema file (JSON or YAML).
//! - [`check_schema`] reports declarations that would fail at request time.

mod assemble;
mod check;
mod collector;
mod load;
mod types;

pub use assemble::*;
pub use check::*;
pub use collector::*;
pub use load::*;
pub use types::*;
