//! # CLI Module
//!
//! Command-line front end of the `rpcforge-gen` binary.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Render client code from a full schema file:
//!
//! ```bash
//! rpcforge-gen generate --schema full-schema.json --out client --template ts,py
//! ```
//!
//! Options:
//! - `--schema <FILE>` - Full schema (JSON or YAML, required)
//! - `--config <FILE>` - Generator config (default: `rpcforge.toml` next to the schema)
//! - `--out <DIR>` - Output directory
//! - `--template <NAME>` - Templates to render (`ts`, `py`, `rs`, an override, or `none`)
//! - `--full-schema [NAME]` - Also dump the schema into the output directory
//! - `--segment <NAME>` - Restrict to these segments (default: all in the schema)
//! - `--watch` - Regenerate whenever the schema file changes
//!
//! ### `templates`
//!
//! List the built-in templates.
//!
//! ### `check`
//!
//! Load a schema and report declarations that would fail at request time:
//!
//! ```bash
//! rpcforge-gen check --schema full-schema.json --fail-on-error
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, Cli, Commands};
