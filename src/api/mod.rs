/// Remote service access for Youth Compass.
///
/// - `client` - request building, authentication header, lenient decoding
/// - `stream` - line-oriented SSE assembly for the chat endpoint
/// - `error` - the error taxonomy every call site reports from
pub mod client;
pub mod error;
pub mod stream;

pub use client::{ApiClient, SendMessageRequest, USER_ID_HEADER};
pub use error::{ApiError, ApiResult};
pub use stream::{MessageAssembler, StreamEvent, StreamOutcome, TranscriptUpdate, stream_chat};
