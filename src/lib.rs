//! # rpcforge
//!
//! **rpcforge** turns a tree of API handlers into two things:
//!
//! - a validation layer that wraps each async handler and checks its inputs
//!   (`params`, `query`, `body`) and its output (`output` for a single value,
//!   `iteration` for streamed items) against declared models, and
//! - a client generator that renders templates from the assembled schema
//!   and only rewrites files whose content actually changed.
//!
//! ## Architecture
//!
//! - **[`schema`]** - the segment → controller → handler tree, assembly and loading
//! - **[`validation`]** - the [`validation::wrap`] middleware, validators and errors
//! - **[`generator`]** - template resolution, rendering and incremental emission
//! - **[`stream`]** - JSON-lines encoding of streamed handler output
//! - **[`client`]** - URL building and pre-flight validation for generated clients
//! - **[`openapi`]** - per-handler OpenAPI fragments and error response entries
//! - **[`config`]** - `rpcforge.toml` loading and environment overrides
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`watch`]** - regenerate on schema file changes
//! - **[`cli`]** - the `rpcforge-gen` command line
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant CLI as rpcforge-gen
//!     participant Load as schema::load_full_schema
//!     participant Assemble as schema::assemble_schema
//!     participant Render as generator::render
//!     participant Emit as generator::emitter
//!     participant FS as File System
//!
//!     CLI->>Load: full-schema.json
//!     Load-->>CLI: FullSchema
//!     CLI->>Assemble: segments
//!     Assemble-->>CLI: FullSchema (selected segments)
//!     CLI->>Render: every resolved template (concurrently)
//!     Render-->>CLI: RenderedOutput
//!     CLI->>Emit: compare with files on disk (banner line ignored)
//!     alt nothing changed
//!         Emit-->>CLI: written = false
//!     else
//!         Emit->>FS: full schema dumps + changed files
//!         Emit-->>CLI: written = true
//!     end
//! ```
//!
//! ### Request Validation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Caller
//!     participant Wrapped as ValidatedHandler
//!     participant Validator as Validate
//!     participant Handler
//!
//!     Caller->>Wrapped: call(RequestContext)
//!     Wrapped->>Wrapped: reject output + iteration
//!     loop params, query, body
//!         Wrapped->>Validator: validate(raw, model)
//!         Validator-->>Wrapped: transformed instance
//!     end
//!     Wrapped->>Handler: call(ctx)
//!     Handler-->>Wrapped: HandlerOutput
//!     alt output model
//!         Wrapped->>Validator: validate(output)
//!     else iteration model
//!         Wrapped-->>Caller: stream validated as consumed
//!     end
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod generator;
pub mod logging;
pub mod openapi;
pub mod schema;
pub mod stream;
pub mod validation;
pub mod watch;
