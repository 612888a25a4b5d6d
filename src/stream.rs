//! # JSON-Lines Streaming
//!
//! Wire encoding for streaming handlers: each item is one JSON document on its
//! own line. An error ends the stream with a final abort line:
//!
//! ```text
//! {"id":1}
//! {"id":2}
//! {"isError":true,"reason":"[400] Validation failed. ..."}
//! ```
//!
//! - [`json_lines`] encodes an [`ItemStream`] into lines.
//! - [`channel`] creates a push-style producer whose receiving half is an
//!   [`ItemStream`], so handlers can feed items from another task.
//!
//! ```rust
//! use rpcforge::stream;
//! use serde_json::json;
//!
//! let (sender, items) = stream::channel();
//! sender.send(json!({"n": 1}));
//! sender.close();
//! # drop(items);
//! ```

use futures::channel::mpsc;
use futures::stream::{self, BoxStream, StreamExt};
use serde_json::{json, Value};
use tracing::warn;

use crate::validation::{HttpError, ItemStream};

/// Content type of a JSON-lines response.
pub const JSON_LINES_CONTENT_TYPE: &str = "application/jsonl";

/// Abort line written when a stream ends with an error.
pub fn abort_line(reason: &str) -> String {
    json!({ "isError": true, "reason": reason }).to_string()
}

/// Encode items as newline-terminated JSON lines.
///
/// The first `Err` is written as an abort line and ends the output.
pub fn json_lines(items: ItemStream) -> BoxStream<'static, String> {
    stream::unfold(Some(items), |state| async move {
        let mut items = state?;
        match items.next().await? {
            Ok(value) => Some((format!("{value}\n"), Some(items))),
            Err(e) => {
                warn!(status = e.status(), error = %e, "Stream aborted");
                Some((format!("{}\n", abort_line(&e.to_string())), None))
            }
        }
    })
    .boxed()
}

/// Drain a stream into one JSON-lines body.
pub async fn collect_json_lines(items: ItemStream) -> String {
    json_lines(items).collect::<Vec<_>>().await.concat()
}

/// Producer half of a streaming response.
///
/// Clone it to push items from several tasks.
#[derive(Clone)]
pub struct StreamSender {
    tx: mpsc::UnboundedSender<Result<Value, HttpError>>,
}

impl StreamSender {
    /// Queue an item. Returns `false` once the consumer is gone.
    pub fn send(&self, value: Value) -> bool {
        self.tx.unbounded_send(Ok(value)).is_ok()
    }

    /// Queue an error; the consumer sees it as the last item.
    pub fn throw(&self, error: HttpError) -> bool {
        let alive = self.tx.unbounded_send(Err(error)).is_ok();
        self.tx.close_channel();
        alive
    }

    /// End the stream for every clone of this sender.
    pub fn close(&self) {
        self.tx.close_channel();
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Create a push-style item stream.
pub fn channel() -> (StreamSender, ItemStream) {
    let (tx, rx) = mpsc::unbounded();
    (StreamSender { tx }, rx.boxed())
}
