//! Byte stream to display chunk pipeline.
//!
//! Reassembled lines are classified and normalized synchronously as they
//! arrive; lines that yield no text are skipped without affecting order.

use bytes::Bytes;
use futures::future;
use futures::stream::{Stream, StreamExt};

use crate::client::ClientError;
use crate::frame::{classify, Frame};
use crate::reassembler::ByteStreamExt;

/// Display text for one line, if the line carries any.
///
/// # Example
/// ```
/// use agent_stream::stream::line_to_chunk;
///
/// assert_eq!(line_to_chunk("9:{\"content\":\"Hello\"}").as_deref(), Some("Hello\n"));
/// assert_eq!(line_to_chunk("0:\"Partial word\"").as_deref(), Some("Partial word"));
/// assert_eq!(line_to_chunk(""), None);
/// ```
pub fn line_to_chunk(line: &str) -> Option<String> {
    classify(line).and_then(Frame::into_chunk)
}

/// Turn a response body into display chunks, in line order.
///
/// A read error is passed through as the last item.
pub fn normalized_chunks<S, E>(byte_stream: S) -> impl Stream<Item = Result<String, ClientError>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send,
    E: Into<ClientError> + Send,
{
    byte_stream.lines().filter_map(|line| {
        future::ready(match line {
            Ok(line) => line_to_chunk(&line).map(Ok),
            Err(e) => Some(Err(e)),
        })
    })
}
