use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::context::RequestInfo;
use super::handler::ItemStream;
use super::validator::{Validate, ValidationMeta};
use crate::schema::ValidationType;

/// Status reported to the validator for streamed items.
const ITERATION_STATUS: u16 = 200;

struct IterationState {
    source: ItemStream,
    model: Arc<Value>,
    validator: Arc<dyn Validate>,
    info: Arc<RequestInfo>,
    validate_every: bool,
    index: usize,
    done: bool,
}

/// Re-validate a handler's item stream as it is consumed.
///
/// The first item (or every item when `validate_every` is set) is checked
/// against `model` before it is yielded. A rejected item is yielded as `Err`
/// and ends the stream; the source is never polled again. Errors produced by
/// the source pass through the same way.
///
/// The returned stream owns `source`: dropping it drops the source.
pub fn validate_iteration(
    source: ItemStream,
    model: Arc<Value>,
    validator: Arc<dyn Validate>,
    info: Arc<RequestInfo>,
    validate_every: bool,
) -> ItemStream {
    let state = IterationState {
        source,
        model,
        validator,
        info,
        validate_every,
        index: 0,
        done: false,
    };
    stream::unfold(state, |mut st| async move {
        if st.done {
            return None;
        }
        let item = match st.source.next().await {
            None => return None,
            Some(Err(e)) => {
                st.done = true;
                return Some((Err(e), st));
            }
            Some(Ok(item)) => item,
        };
        let index = st.index;
        st.index += 1;
        if st.validate_every || index == 0 {
            let validator = Arc::clone(&st.validator);
            let model = Arc::clone(&st.model);
            let info = Arc::clone(&st.info);
            let meta = ValidationMeta::new(ValidationType::Iteration, &info)
                .with_status(ITERATION_STATUS);
            let verdict = validator.validate(&item, &model, meta).await;
            if let Err(e) = verdict {
                debug!(index, url = %info.url, "Streamed item rejected");
                st.done = true;
                return Some((Err(e), st));
            }
        }
        Some((Ok(item), st))
    })
    .boxed()
}
