//! Re-run work when a schema file changes.
//!
//! [`watch_schema`] reloads the schema on every modify/create event and hands
//! the parsed tree to a callback. A file that fails to parse (for example
//! mid-write) is logged and skipped; the watcher keeps running.

use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::schema::{load_full_schema, FullSchema};

/// Watch `schema_path` and call `on_change` with each successfully reloaded
/// schema. Dropping the returned watcher stops watching.
pub fn watch_schema<P, F>(schema_path: P, mut on_change: F) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
    F: FnMut(FullSchema) + Send + 'static,
{
    let path: PathBuf = schema_path.as_ref().to_path_buf();
    let watch_path = path.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    return;
                }
                match load_full_schema(&watch_path) {
                    Ok(schema) => {
                        info!(
                            path = %watch_path.display(),
                            segments = schema.len(),
                            "Schema changed, regenerating"
                        );
                        on_change(schema);
                    }
                    Err(e) => error!(path = %watch_path.display(), error = %e, "Schema reload failed"),
                }
            }
            Err(e) => error!(error = %e, "Schema watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}
