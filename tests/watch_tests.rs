#![allow(clippy::unwrap_used, clippy::expect_used)]

use rpcforge::watch::watch_schema;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;

mod common;
use common::temp_files;

const SCHEMA_V1: &str = r#"{
  "main": {
    "controllers": {
      "TodoRPC": {
        "controllerName": "TodoRPC",
        "prefix": "todos",
        "handlers": { "list": { "httpMethod": "GET", "path": "" } }
      }
    }
  }
}"#;

const SCHEMA_V2: &str = r#"{
  "main": {
    "controllers": {
      "TodoRPC": {
        "controllerName": "TodoRPC",
        "prefix": "todos",
        "handlers": {
          "list": { "httpMethod": "GET", "path": "" },
          "create": { "httpMethod": "POST", "path": "" }
        }
      }
    }
  }
}"#;

#[test]
fn test_watch_schema_reload() {
    let dir = tempdir().unwrap();
    let path = temp_files::write(dir.path(), "full-schema.json", SCHEMA_V1);

    let updates: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
    let updates_clone = Arc::clone(&updates);
    let watcher = watch_schema(&path, move |schema| {
        updates_clone.lock().unwrap().push(schema.handlers().count());
    })
    .expect("watch_schema");

    // allow watcher thread to start
    std::thread::sleep(Duration::from_millis(100));

    std::fs::write(&path, SCHEMA_V2).unwrap();

    for _ in 0..40 {
        if updates.lock().unwrap().contains(&2) {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    assert!(updates.lock().unwrap().contains(&2));
    drop(watcher);
}

#[test]
fn test_unparseable_schema_is_skipped() {
    let dir = tempdir().unwrap();
    let path = temp_files::write(dir.path(), "full-schema.json", SCHEMA_V1);

    let updates: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
    let updates_clone = Arc::clone(&updates);
    let watcher = watch_schema(&path, move |schema| {
        updates_clone.lock().unwrap().push(schema.handlers().count());
    })
    .expect("watch_schema");

    std::thread::sleep(Duration::from_millis(100));
    std::fs::write(&path, "{ not json").unwrap();
    std::thread::sleep(Duration::from_millis(300));
    assert!(updates.lock().unwrap().is_empty());

    std::fs::write(&path, SCHEMA_V2).unwrap();
    for _ in 0..40 {
        if updates.lock().unwrap().contains(&2) {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    assert!(updates.lock().unwrap().contains(&2));
    drop(watcher);
}
