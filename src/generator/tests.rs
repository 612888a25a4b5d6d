#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::schema::{ControllerSchema, FullSchema, HandlerSchema, HttpMethod, Segment, SegmentSchema};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn schema() -> FullSchema {
    let mut segment = SegmentSchema::new("main");
    let mut controller = ControllerSchema {
        controller_name: "TodoRPC".into(),
        prefix: "todos".into(),
        ..Default::default()
    };
    controller
        .handlers
        .insert("list".into(), HandlerSchema::new(HttpMethod::Get, ""));
    segment.controllers.insert("TodoRPC".into(), controller);
    [segment].into_iter().collect()
}

fn write_template(dir: &Path, name: &str, text: &str) -> TemplateSelection {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    TemplateSelection::new(["custom"]).with_override("custom", TemplateOverride::new(path))
}

fn options(out: &Path) -> GenerateOptions {
    GenerateOptions {
        out_dir: out.to_path_buf(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_missing_segment_writes_nothing() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    let segments = vec![Segment::new("main"), Segment::new("admin")];
    let mut opts = options(&out);
    opts.full_schema = FullSchemaTarget::Default;
    let err = generate(&schema(), &segments, &TemplateSelection::default(), &opts)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("admin"));
    assert!(!out.exists());
}

#[tokio::test]
async fn test_none_selection_still_writes_schema() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    let mut opts = options(&out);
    opts.full_schema = FullSchemaTarget::Default;
    let report = generate(&schema(), &[Segment::new("main")], &TemplateSelection::none(), &opts)
        .await
        .unwrap();
    assert!(report.written);
    assert!(report.changed_templates.is_empty());
    assert!(out.join("full-schema.json").is_file());
    assert_eq!(fs::read_dir(&out).unwrap().count(), 1);
}

#[tokio::test]
async fn test_segment_meta_reaches_templates() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    let selection = write_template(
        dir.path(),
        "meta.txt.tpl",
        "# <%= t.banner %>\n<%= t.segmentMeta.main.title %> <%= t.segmentMeta.main.version %>\n",
    );
    let mut opts = options(&out);
    opts.segment_meta.insert(
        "main".into(),
        json!({"version": 2}).as_object().unwrap().clone(),
    );
    let meta = json!({"title": "Todos"}).as_object().unwrap().clone();
    generate(&schema(), &[Segment::new("main").with_meta(meta)], &selection, &opts)
        .await
        .unwrap();
    let text = fs::read_to_string(out.join("meta.txt")).unwrap();
    assert_eq!(text.lines().nth(1), Some("Todos 2"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_formatter_runs_before_diff() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    let selection = write_template(dir.path(), "shout.txt.tpl", "// <%= t.banner %>\nhello\n");
    let mut opts = options(&out);
    opts.formatter = Some(vec!["tr".into(), "a-z".into(), "A-Z".into()]);

    let first = generate(&schema(), &[Segment::new("main")], &selection, &opts)
        .await
        .unwrap();
    assert!(first.written);
    let text = fs::read_to_string(out.join("shout.txt")).unwrap();
    assert!(text.ends_with("HELLO\n"));

    let second = generate(&schema(), &[Segment::new("main")], &selection, &opts)
        .await
        .unwrap();
    assert!(!second.written);
}

#[tokio::test]
async fn test_render_error_aborts_run() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    let selection = write_template(dir.path(), "bad.ts.tpl", "<% if %>");
    let err = generate(&schema(), &[Segment::new("main")], &selection, &options(&out))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("bad.ts.tpl"));
    assert!(!out.exists());
}

#[tokio::test]
async fn test_builtin_python_writes_schema_next_to_package() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("py_client");
    let report = generate(
        &schema(),
        &[Segment::new("main")],
        &TemplateSelection::new(["py"]),
        &options(&out),
    )
    .await
    .unwrap();
    assert_eq!(report.changed_templates, vec!["py".to_string()]);
    let init = fs::read_to_string(out.join("__init__.py")).unwrap();
    assert!(init.starts_with("# auto-generated "));
    assert!(init.contains("class TodoRPC:"));
    assert!(init.contains("def list("));
    let dumped: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("full-schema.json")).unwrap()).unwrap();
    assert_eq!(dumped["main"]["controllers"]["TodoRPC"]["prefix"], json!("todos"));
}

#[tokio::test]
async fn test_builtin_rust_client_quotes_schema_with_refs() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("rs_client");
    let mut schema = schema();
    let controller = schema
        .get_mut("main")
        .unwrap()
        .controllers
        .get_mut("TodoRPC")
        .unwrap();
    let list = controller.handlers.remove("list").unwrap();
    controller.handlers.insert(
        "list".into(),
        list.with_error_response(400, "Bad \"quoted\" input"),
    );

    generate(
        &schema,
        &[Segment::new("main")],
        &TemplateSelection::new(["rs"]),
        &options(&out),
    )
    .await
    .unwrap();

    let client = fs::read_to_string(out.join("client.rs")).unwrap();
    assert!(!client.contains("r#\""));
    let literal = client
        .lines()
        .find_map(|line| line.strip_prefix("pub const SCHEMA_JSON: &str = "))
        .and_then(|rest| rest.strip_suffix(';'))
        .unwrap();
    let embedded: String = serde_json::from_str(literal).unwrap();
    let embedded: serde_json::Value = serde_json::from_str(&embedded).unwrap();
    assert_eq!(embedded, serde_json::to_value(&schema).unwrap());
    assert!(literal.contains("#/components/schemas/RpcErrorResponse"));
    assert!(client.contains("pub const API_ROOT: &str = \"/api\";"));
    assert!(client.contains("        method: \"GET\","));
}
