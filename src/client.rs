//! Streaming client trait, turn orchestration and error types.

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use thiserror::Error;
use tracing::{debug, warn};

use crate::fallback::SimulatedResponder;
use crate::model::{last_user_message, Message, StreamOutcome};
use crate::options::StreamOptions;

/// Returned by [`StreamingClient::request_full_response`] when nothing was produced.
pub const NO_RESPONSE: &str = "No response from agent";

/// Errors that can occur while talking to the agent.
///
/// These never reach the caller of [`StreamingClient::stream_chat`]; they decide
/// between the live answer, the simulated one and a silent stop.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Stream cancelled")]
    StreamCancelled,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Display-ready chunks of one live response, in arrival order.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String, ClientError>> + Send>>;

/// A client for a streaming chat agent.
///
/// Implementors provide the live call; the provided methods add cancellation and
/// the simulated fallback on top of it.
///
/// # Required Methods
/// - `request_stream`: open one live call and return its chunk stream
/// - `responder`: the fallback used when the live call fails
///
/// # Provided Methods
/// - `stream_chat`: drive one turn, invoking a callback per chunk
/// - `request_full_response`: one-shot convenience returning the whole answer
///
/// # Example
/// ```rust,ignore
/// let client = WeatherAgentClient::default();
/// let options = StreamOptions::new("thread-1");
/// let outcome = client
///     .stream_chat(vec![Message::user("Weather in Paris?")], options, |chunk| print!("{chunk}"))
///     .await;
/// ```
#[async_trait]
pub trait StreamingClient: Send + Sync {
    /// Send the conversation and return the response as a chunk stream.
    ///
    /// Connection failures and non-success statuses are returned as errors;
    /// read failures appear as an `Err` item in the stream.
    async fn request_stream(
        &self,
        history: Vec<Message>,
        thread_id: &str,
    ) -> Result<ChunkStream, ClientError>;

    /// Responder used when the live call cannot produce an answer.
    fn responder(&self) -> &SimulatedResponder;

    /// Run one conversation turn, calling `on_chunk` once per chunk in order.
    ///
    /// - Cancellation stops delivery immediately and never triggers the fallback.
    /// - A failure before any chunk was delivered switches to the simulated
    ///   answer for the last user message.
    /// - A failure after chunks were delivered ends the turn as
    ///   [`StreamOutcome::Interrupted`], so the answer is not mixed with a simulated one.
    /// - A successful but empty response is a valid empty answer.
    async fn stream_chat<F>(
        &self,
        history: Vec<Message>,
        options: StreamOptions,
        mut on_chunk: F,
    ) -> StreamOutcome
    where
        F: FnMut(&str) + Send,
    {
        let StreamOptions { thread_id, cancel } = options;
        let prompt = last_user_message(&history).to_string();

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(%thread_id, "turn cancelled before response");
                return StreamOutcome::Cancelled { chunks: 0 };
            }
            opened = self.request_stream(history, &thread_id) => opened,
        };

        let reason = match opened {
            Ok(mut chunks) => {
                let mut delivered = 0;
                loop {
                    let next = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => None,
                        next = chunks.next() => Some(next),
                    };

                    match next {
                        None | Some(Some(Err(ClientError::StreamCancelled))) => {
                            debug!(%thread_id, delivered, "turn cancelled mid-stream");
                            return StreamOutcome::Cancelled { chunks: delivered };
                        }
                        Some(Some(Ok(chunk))) => {
                            on_chunk(&chunk);
                            delivered += 1;
                        }
                        Some(Some(Err(e))) if delivered > 0 => {
                            warn!(%thread_id, delivered, error = %e, "stream interrupted");
                            return StreamOutcome::Interrupted {
                                chunks: delivered,
                                reason: e.to_string(),
                            };
                        }
                        Some(Some(Err(e))) => break e.to_string(),
                        Some(None) => {
                            debug!(%thread_id, delivered, "stream complete");
                            return StreamOutcome::Completed { chunks: delivered };
                        }
                    }
                }
            }
            Err(ClientError::StreamCancelled) => {
                return StreamOutcome::Cancelled { chunks: 0 };
            }
            Err(e) => e.to_string(),
        };

        warn!(%thread_id, %reason, "agent unavailable, using simulated response");
        on_chunk(&self.responder().respond(&prompt));
        StreamOutcome::Fallback { reason }
    }

    /// Send a single user message and return the concatenated answer.
    ///
    /// Returns [`NO_RESPONSE`] when the turn produced no text.
    async fn request_full_response(&self, message: &str, thread_id: &str) -> String {
        let mut full = String::new();
        self.stream_chat(
            vec![Message::user(message)],
            StreamOptions::new(thread_id),
            |chunk| full.push_str(chunk),
        )
        .await;

        if full.is_empty() {
            NO_RESPONSE.to_string()
        } else {
            full
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::sync::Mutex;
    use tokio_util::sync::CancellationToken;

    /// Scripted client: either fails to connect or replays fixed stream items.
    struct ScriptedClient {
        script: Mutex<Option<Result<Vec<Result<String, ClientError>>, ClientError>>>,
        pending_after_items: bool,
        responder: SimulatedResponder,
    }

    impl ScriptedClient {
        fn items(items: Vec<Result<String, ClientError>>) -> Self {
            Self {
                script: Mutex::new(Some(Ok(items))),
                pending_after_items: false,
                responder: SimulatedResponder::seeded(7),
            }
        }

        fn failing(error: ClientError) -> Self {
            Self {
                script: Mutex::new(Some(Err(error))),
                pending_after_items: false,
                responder: SimulatedResponder::seeded(7),
            }
        }

        fn hanging_after(items: Vec<Result<String, ClientError>>) -> Self {
            Self {
                pending_after_items: true,
                ..Self::items(items)
            }
        }
    }

    #[async_trait]
    impl StreamingClient for ScriptedClient {
        async fn request_stream(
            &self,
            _history: Vec<Message>,
            _thread_id: &str,
        ) -> Result<ChunkStream, ClientError> {
            let script = self.script.lock().unwrap().take().expect("called once");
            let items = script?;
            if self.pending_after_items {
                Ok(Box::pin(stream::iter(items).chain(stream::pending())))
            } else {
                Ok(Box::pin(stream::iter(items)))
            }
        }

        fn responder(&self) -> &SimulatedResponder {
            &self.responder
        }
    }

    fn weather_history() -> Vec<Message> {
        vec![Message::user("what's the weather in Tokyo?")]
    }

    async fn run(client: &ScriptedClient, options: StreamOptions) -> (StreamOutcome, Vec<String>) {
        let mut seen = Vec::new();
        let outcome = client
            .stream_chat(weather_history(), options, |chunk| seen.push(chunk.to_string()))
            .await;
        (outcome, seen)
    }

    #[tokio::test]
    async fn test_chunks_delivered_in_order() {
        let client = ScriptedClient::items(vec![Ok("a".into()), Ok("b".into()), Ok("a".into())]);
        let (outcome, seen) = run(&client, StreamOptions::new("t")).await;
        assert_eq!(outcome, StreamOutcome::Completed { chunks: 3 });
        assert_eq!(seen, vec!["a", "b", "a"]);
    }

    #[tokio::test]
    async fn test_empty_success_does_not_fall_back() {
        let client = ScriptedClient::items(vec![]);
        let (outcome, seen) = run(&client, StreamOptions::new("t")).await;
        assert_eq!(outcome, StreamOutcome::Completed { chunks: 0 });
        assert!(seen.is_empty());
    }

    #[tokio::test]
    async fn test_connect_failure_falls_back() {
        let client = ScriptedClient::failing(ClientError::Status {
            status: 503,
            body: "busy".into(),
        });
        let (outcome, seen) = run(&client, StreamOptions::new("t")).await;
        assert!(matches!(outcome, StreamOutcome::Fallback { ref reason } if reason.contains("503")));
        assert_eq!(outcome.chunks(), 1);
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("Tokyo"));
        assert!(seen[0].contains("Temperature"));
    }

    #[tokio::test]
    async fn test_error_before_first_chunk_falls_back() {
        let client = ScriptedClient::items(vec![Err(ClientError::Config("boom".into()))]);
        let (outcome, seen) = run(&client, StreamOptions::new("t")).await;
        assert!(matches!(outcome, StreamOutcome::Fallback { .. }));
        assert_eq!(seen.len(), 1);
    }

    #[tokio::test]
    async fn test_error_after_chunks_interrupts_without_fallback() {
        let client = ScriptedClient::items(vec![
            Ok("partial ".into()),
            Err(ClientError::Config("reset".into())),
            Ok("never".into()),
        ]);
        let (outcome, seen) = run(&client, StreamOptions::new("t")).await;
        assert_eq!(
            outcome,
            StreamOutcome::Interrupted {
                chunks: 1,
                reason: "Configuration error: reset".into()
            }
        );
        assert_eq!(seen, vec!["partial "]);
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let client = ScriptedClient::failing(ClientError::Config("unreachable".into()));
        let token = CancellationToken::new();
        token.cancel();
        let (outcome, seen) = run(&client, StreamOptions::new("t").with_cancel(token)).await;
        assert_eq!(outcome, StreamOutcome::Cancelled { chunks: 0 });
        assert!(seen.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_mid_stream_stops_without_fallback() {
        let client = ScriptedClient::hanging_after(vec![Ok("one".into())]);
        let token = CancellationToken::new();
        let options = StreamOptions::new("t").with_cancel(token.clone());

        let mut seen = Vec::new();
        let outcome = client
            .stream_chat(weather_history(), options, |chunk| {
                seen.push(chunk.to_string());
                token.cancel();
            })
            .await;

        assert_eq!(outcome, StreamOutcome::Cancelled { chunks: 1 });
        assert_eq!(seen, vec!["one"]);
    }

    #[tokio::test]
    async fn test_cancelled_item_is_not_a_failure() {
        let client = ScriptedClient::items(vec![Err(ClientError::StreamCancelled)]);
        let (outcome, seen) = run(&client, StreamOptions::new("t")).await;
        assert_eq!(outcome, StreamOutcome::Cancelled { chunks: 0 });
        assert!(seen.is_empty());
    }

    #[tokio::test]
    async fn test_request_full_response() {
        let client = ScriptedClient::items(vec![Ok("Hello".into()), Ok(" there\n".into())]);
        assert_eq!(client.request_full_response("hi", "t").await, "Hello there\n");

        let client = ScriptedClient::items(vec![]);
        assert_eq!(client.request_full_response("hi", "t").await, NO_RESPONSE);
    }
}
