//! Element-wise stream normalization.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::{FusedStream, Stream};
use serde_json::Value as JsonValue;

use crate::compat::finish_reason::{normalize_finish_reason, normalize_finish_reason_value};
use crate::core::{PartStream, SdkError};
use crate::types::{FinishReason, StreamPart};

const TRACE_PREFIX: &str = "[V2_COMPAT]";

/// Rewrite the `finishReason` of a single part, whatever its type.
///
/// Parts never carry `steps`, so this is the single-level rule only.
pub fn normalize_stream_part(mut part: StreamPart) -> StreamPart {
    match &mut part {
        StreamPart::Finish(p) | StreamPart::FinishStep(p) => {
            if !p.finish_reason.is_unified() {
                p.finish_reason = FinishReason::Unified(normalize_finish_reason(&p.finish_reason));
            }
        }
        other => {
            if let Some(reason) = other.extra_mut().get_mut("finishReason") {
                if !reason.is_string() {
                    *reason = JsonValue::String(normalize_finish_reason_value(reason));
                }
            }
        }
    }
    part
}

/// Pull-based adapter over an upstream [`PartStream`].
///
/// Each poll polls the upstream once and maps the element it yields; nothing
/// is read ahead. The upstream is dropped, which is how it gets cancelled,
/// exactly once: on [`cancel`](Self::cancel), on the first error, on
/// completion, or when this stream is dropped. Polling after that yields
/// `None`.
///
/// `poll_next` takes `Pin<&mut Self>`, so there is only ever one consumer.
pub struct V2CompatStream {
    upstream: Option<PartStream>,
}

impl V2CompatStream {
    pub fn new(upstream: PartStream) -> Self {
        Self {
            upstream: Some(upstream),
        }
    }

    /// Stop producing parts and cancel the upstream. Idempotent, and a no-op
    /// once the stream has already terminated.
    pub fn cancel(&mut self) {
        if let Some(upstream) = self.upstream.take() {
            tracing::debug!("{}: cancelling upstream stream", TRACE_PREFIX);
            drop(upstream);
        }
    }

    pub fn into_part_stream(self) -> PartStream {
        Box::pin(self)
    }
}

impl Stream for V2CompatStream {
    type Item = Result<StreamPart, SdkError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let Some(upstream) = self.upstream.as_mut() else {
            return Poll::Ready(None);
        };
        match upstream.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(part))) => Poll::Ready(Some(Ok(normalize_stream_part(part)))),
            Poll::Ready(Some(Err(err))) => {
                tracing::debug!("{}: upstream stream failed: {}", TRACE_PREFIX, err);
                self.upstream = None;
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                self.upstream = None;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.upstream {
            Some(upstream) => upstream.size_hint(),
            None => (0, Some(0)),
        }
    }
}

impl FusedStream for V2CompatStream {
    fn is_terminated(&self) -> bool {
        self.upstream.is_none()
    }
}
