//! Streaming chat assembly.
//!
//! The backend answers `/chat/stream` with UTF-8 text framed as
//! newline-separated blocks; any line starting with `data:` carries a JSON
//! record with a `type` discriminant. Only `content` and `sources` matter
//! here; everything else the service emits (session ids, status pings) is
//! ignored. Chunks are consumed strictly in arrival order by one sequential
//! read loop, and at most one assistant message materializes per call.

use crate::api::client::{ApiClient, SendMessageRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::types::{ChatMessage, Role, Source, display_time_now, next_message_id};
use futures::StreamExt;
use serde_json::Value;
use tracing::warn;

/// One decoded record from a `data:`-prefixed line.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamEvent {
    Content(String),
    Sources(Vec<Source>),
}

/// Extract the payload of an SSE-framed line. A single space after the
/// colon is framing, not payload; any other character in that position
/// belongs to the payload.
pub fn split_sse_payload(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("data:")?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Decode one payload. Unknown discriminants come back as `None` quietly;
/// malformed JSON is logged and skipped so a bad line never kills the
/// stream.
pub fn parse_stream_event(payload: &str) -> Option<StreamEvent> {
    let record: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "skipping malformed stream line");
            return None;
        }
    };
    match record.get("type").and_then(Value::as_str) {
        Some("content") => record
            .get("content")
            .and_then(Value::as_str)
            .map(|fragment| StreamEvent::Content(fragment.to_string())),
        Some("sources") => {
            let raw = record.get("sources")?.clone();
            match serde_json::from_value::<Vec<Source>>(raw) {
                Ok(list) => Some(StreamEvent::Sources(list)),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable sources event");
                    None
                }
            }
        }
        _ => None,
    }
}

/// Carries partial lines across chunk boundaries; tolerates CRLF.
///
/// Buffers raw bytes and splits on `\n` before any UTF-8 conversion, so a
/// multibyte character broken across two chunks reassembles intact.
#[derive(Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }
}

/// What the transcript should do with the in-flight assistant turn.
#[derive(Clone, Debug, PartialEq)]
pub enum TranscriptUpdate {
    /// First content fragment arrived: append this message to the transcript.
    Begin(ChatMessage),
    /// Rewrite the same message with the accumulated state.
    Revise {
        content: String,
        sources: Option<Vec<Source>>,
    },
}

/// Folds stream events into one assistant turn. The message materializes on
/// the first `content` fragment; a `sources` list arriving earlier is
/// buffered and attached then, one arriving later replaces the buffered set.
/// A stream that only ever sends sources produces no message at all.
#[derive(Default)]
pub struct MessageAssembler {
    content: String,
    sources: Option<Vec<Source>>,
    started: bool,
}

impl MessageAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: StreamEvent) -> Option<TranscriptUpdate> {
        match event {
            StreamEvent::Content(fragment) => {
                self.content.push_str(&fragment);
                if self.started {
                    Some(self.revision())
                } else {
                    self.started = true;
                    Some(TranscriptUpdate::Begin(ChatMessage {
                        id: next_message_id(),
                        role: Role::Assistant,
                        content: self.content.clone(),
                        timestamp: display_time_now(),
                        sources: self.sources.clone(),
                    }))
                }
            }
            StreamEvent::Sources(list) => {
                self.sources = Some(list);
                if self.started { Some(self.revision()) } else { None }
            }
        }
    }

    fn revision(&self) -> TranscriptUpdate {
        TranscriptUpdate::Revise {
            content: self.content.clone(),
            sources: self.sources.clone(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn has_message(&self) -> bool {
        self.started
    }
}

/// Final accumulated state of one streaming exchange, for callers that
/// persist the finished turn.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamOutcome {
    pub content: String,
    pub sources: Option<Vec<Source>>,
}

/// Drive one streaming chat call to completion, invoking `on_update` as the
/// assistant turn grows. Transport errors and non-success statuses surface
/// as one error; whatever was already folded in stays applied.
pub async fn stream_chat(
    client: &ApiClient,
    request: &SendMessageRequest,
    mut on_update: impl FnMut(TranscriptUpdate),
) -> ApiResult<StreamOutcome> {
    let response = client.open_chat_stream(request).await?;

    let mut lines = LineBuffer::default();
    let mut assembler = MessageAssembler::new();
    let mut body = response.bytes_stream();
    while let Some(item) = body.next().await {
        let bytes = item.map_err(ApiError::from)?;
        for line in lines.push(&bytes) {
            let Some(payload) = split_sse_payload(&line) else {
                continue;
            };
            if payload.trim().is_empty() {
                continue;
            }
            if let Some(event) = parse_stream_event(payload)
                && let Some(update) = assembler.apply(event)
            {
                on_update(update);
            }
        }
    }

    Ok(StreamOutcome {
        content: assembler.content,
        sources: assembler.sources,
    })
}
