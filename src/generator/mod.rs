//! # Generator Module
//!
//! Renders client code from a [`FullSchema`](crate::schema::FullSchema) and
//! writes only what changed.
//!
//! ## Pipeline
//!
//! ```text
//! segments + schema → assemble → render (per template, concurrent)
//!                             → format (optional) → diff → write
//! ```
//!
//! 1. **Resolve** - [`TemplateSelection::resolve`] expands names (`ts`, `py`,
//!    `rs`, user overrides, or `none`) into [`TemplateFile`]s.
//! 2. **Assemble** - every segment must have a schema entry or the run fails
//!    before touching the disk.
//! 3. **Render** - templates ending in `.tpl` are evaluated with EJS-style
//!    delimiters against a [`RenderContext`] bound as `t`:
//!
//!    ```text
//!    // <%= t.banner %>
//!    export const apiRoot = <%= t.apiRoot %>;
//!    <% for name, segment in t.schema|items %>...<% endfor %>
//!    ```
//!
//! 4. **Diff** - [`should_write`] ignores the first (banner) line.
//! 5. **Write** - changed files plus any requested `full-schema.json` dumps.
//!
//! ## Built-in templates
//!
//! | Name | Output | Full schema |
//! |------|--------|-------------|
//! | `ts` | `index.ts` | no |
//! | `py` | `__init__.py` | `full-schema.json` |
//! | `rs` | `client.rs` | no |

mod emitter;
mod format;
mod generate;
mod render;
mod templates;
#[cfg(test)]
mod tests;

pub use emitter::*;
pub use format::*;
pub use generate::*;
pub use render::*;
pub use templates::*;
