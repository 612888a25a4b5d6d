#![allow(dead_code)]

pub mod fixtures {
    use rpcforge::schema::{
        ControllerSchema, FullSchema, HandlerSchema, HttpMethod, SegmentSchema, ValidationModels,
    };
    use serde_json::json;

    /// Two segments: `foo` with a user controller, `foo/client` with a post
    /// controller that streams.
    pub fn sample_schema() -> FullSchema {
        let mut users = ControllerSchema {
            controller_name: "UserRPC".into(),
            prefix: "users".into(),
            ..Default::default()
        };
        users.handlers.insert(
            "getUser".into(),
            HandlerSchema::new(HttpMethod::Get, ":id").with_validation(ValidationModels {
                params: Some(json!({
                    "type": "object",
                    "properties": { "id": { "type": "string" } },
                    "required": ["id"]
                })),
                ..Default::default()
            }),
        );
        users.handlers.insert(
            "createUser".into(),
            HandlerSchema::new(HttpMethod::Post, "").with_validation(ValidationModels {
                body: Some(json!({
                    "type": "object",
                    "properties": { "name": { "type": "string" } },
                    "required": ["name"]
                })),
                ..Default::default()
            }),
        );
        let mut foo = SegmentSchema::new("foo");
        foo.controllers.insert("UserRPC".into(), users);

        let mut posts = ControllerSchema {
            controller_name: "PostRPC".into(),
            prefix: "posts".into(),
            ..Default::default()
        };
        posts.handlers.insert(
            "streamPosts".into(),
            HandlerSchema::new(HttpMethod::Get, "stream").with_validation(ValidationModels {
                iteration: Some(json!({ "type": "object" })),
                ..Default::default()
            }),
        );
        let mut client = SegmentSchema::new("foo/client");
        client.controllers.insert("PostRPC".into(), posts);

        [foo, client].into_iter().collect()
    }
}

pub mod temp_files {
    use std::fs;
    use std::path::{Path, PathBuf};
    use walkdir::WalkDir;

    /// Write `content` under `dir` and return the full path.
    pub fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Every file under `dir`, relative and in file-name order.
    pub fn list_files(dir: &Path) -> Vec<String> {
        WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .map(Result::unwrap)
            .filter(|entry| !entry.file_type().is_dir())
            .map(|entry| {
                entry
                    .path()
                    .strip_prefix(dir)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }
}
