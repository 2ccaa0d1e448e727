//! Reassembly of newline-delimited frames from a raw byte stream.
//!
//! The agent streams `prefix:payload` frames, one per line:
//! ```text
//! f:{"messageId":"msg-1"}
//! 0:"It is "
//! 0:"sunny"
//! e:{"finishReason":"stop"}
//! ```
//! Network reads cut this text at arbitrary byte offsets, including inside a
//! multi-byte code point. [`Reassembler`] carries the undecoded tail between
//! reads and hands back complete lines in order.

use std::borrow::Cow;
use std::collections::VecDeque;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::client::ClientError;

/// One network read: a byte buffer plus an end-of-stream flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkEvent {
    pub bytes: Bytes,
    pub is_final: bool,
}

impl ChunkEvent {
    /// A read in the middle of the stream.
    pub fn data(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            is_final: false,
        }
    }

    /// End of stream with no further bytes.
    pub fn end() -> Self {
        Self {
            bytes: Bytes::new(),
            is_final: true,
        }
    }
}

/// Buffer remainder for one response body.
///
/// Each step takes the state by value and returns the next state with the lines
/// completed by that read, so a step can be tested in isolation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reassembler {
    /// Decoded text after the last newline seen.
    remainder: String,
    /// Bytes of a code point that has not fully arrived yet.
    partial: Vec<u8>,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoded text that is still waiting for its newline.
    pub fn remainder(&self) -> &str {
        &self.remainder
    }

    /// Feed one read and collect the lines it completes.
    ///
    /// On the final event a non-empty remainder is flushed as a last line even
    /// without a trailing newline.
    pub fn process(mut self, event: ChunkEvent) -> (Self, Vec<String>) {
        decode_utf8(
            &mut self.remainder,
            &mut self.partial,
            &event.bytes,
            event.is_final,
        );

        let mut lines = Vec::new();
        if let Some(last) = self.remainder.rfind('\n') {
            let rest = self.remainder.split_off(last + 1);
            let complete = std::mem::replace(&mut self.remainder, rest);
            lines.extend(complete[..last].split('\n').map(str::to_owned));
        }

        if event.is_final && !self.remainder.is_empty() {
            lines.push(std::mem::take(&mut self.remainder));
        }

        (self, lines)
    }
}

/// Streaming UTF-8 decode of `bytes` onto `out`.
///
/// An incomplete sequence at the end is parked in `partial` unless the read is
/// final. Invalid sequences become U+FFFD and decoding carries on.
fn decode_utf8(out: &mut String, partial: &mut Vec<u8>, bytes: &[u8], is_final: bool) {
    let input: Cow<[u8]> = if partial.is_empty() {
        Cow::Borrowed(bytes)
    } else {
        let mut joined = std::mem::take(partial);
        joined.extend_from_slice(bytes);
        Cow::Owned(joined)
    };

    let mut rest: &[u8] = &input;
    loop {
        match std::str::from_utf8(rest) {
            Ok(text) => {
                out.push_str(text);
                return;
            }
            Err(e) => {
                let (valid, tail) = rest.split_at(e.valid_up_to());
                out.push_str(&String::from_utf8_lossy(valid));
                match e.error_len() {
                    Some(len) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        rest = &tail[len..];
                    }
                    None if is_final => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        return;
                    }
                    None => {
                        partial.extend_from_slice(tail);
                        return;
                    }
                }
            }
        }
    }
}

/// Extension trait turning a byte stream into a stream of complete lines.
///
/// Implemented for any `Stream<Item = Result<Bytes, E>>`, which covers
/// `reqwest::Response::bytes_stream()`.
///
/// # Example
/// ```ignore
/// use agent_stream::reassembler::ByteStreamExt;
///
/// let mut lines = response.bytes_stream().lines();
/// while let Some(line) = lines.next().await {
///     println!("frame: {}", line?);
/// }
/// ```
pub trait ByteStreamExt {
    /// Lines in arrival order. A read error is yielded once and ends the stream.
    fn lines(self) -> impl Stream<Item = Result<String, ClientError>> + Send;
}

impl<S, E> ByteStreamExt for S
where
    S: Stream<Item = Result<Bytes, E>> + Send,
    E: Into<ClientError> + Send,
{
    fn lines(self) -> impl Stream<Item = Result<String, ClientError>> + Send {
        stream::unfold(
            (Box::pin(self), Reassembler::new(), VecDeque::new(), false),
            |(mut byte_stream, mut reassembler, mut ready, mut stream_ended)| async move {
                loop {
                    if let Some(line) = ready.pop_front() {
                        return Some((Ok(line), (byte_stream, reassembler, ready, stream_ended)));
                    }

                    if stream_ended {
                        return None;
                    }

                    let event = match byte_stream.next().await {
                        Some(Ok(chunk)) => ChunkEvent::data(chunk),
                        Some(Err(e)) => {
                            stream_ended = true;
                            return Some((
                                Err(e.into()),
                                (byte_stream, reassembler, ready, stream_ended),
                            ));
                        }
                        None => {
                            stream_ended = true;
                            ChunkEvent::end()
                        }
                    };

                    let (next, lines) = reassembler.process(event);
                    reassembler = next;
                    ready.extend(lines);
                }
            },
        )
    }
}
