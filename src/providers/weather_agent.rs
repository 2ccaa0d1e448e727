//! HTTP client for the hosted weather agent.
//!
//! Posts the conversation to the agent's `/stream` endpoint and reads the
//! newline-delimited `prefix:payload` body as it arrives.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::Response;
use tracing::debug;

use crate::client::{ChunkStream, ClientError, StreamingClient};
use crate::fallback::SimulatedResponder;
use crate::http::{add_extra_headers, build_http_client};
use crate::model::{AgentRequest, Message};
use crate::options::{RunOptions, TransportOptions};
use crate::stream::normalized_chunks;

/// Header the agent host expects from playground clients.
pub const PLAYGROUND_HEADER: &str = "x-mastra-dev-playground";

/// Most bytes of an error body kept in [`ClientError::Status`].
const ERROR_BODY_LIMIT: usize = 512;

/// How long a failed response may take to produce its first body bytes.
const ERROR_BODY_WAIT: Duration = Duration::from_millis(500);

/// Weather agent client using HTTP transport.
#[derive(Debug, Default)]
pub struct WeatherAgentClient {
    run_options: RunOptions,
    transport_options: TransportOptions,
    responder: SimulatedResponder,
}

impl WeatherAgentClient {
    pub fn new(run_options: RunOptions, transport_options: TransportOptions) -> Self {
        Self {
            run_options,
            transport_options,
            responder: SimulatedResponder::new(),
        }
    }

    /// Replace the fallback responder.
    pub fn with_responder(mut self, responder: SimulatedResponder) -> Self {
        self.responder = responder;
        self
    }

    pub fn run_options(&self) -> &RunOptions {
        &self.run_options
    }

    pub fn transport_options(&self) -> &TransportOptions {
        &self.transport_options
    }
}

#[async_trait]
impl StreamingClient for WeatherAgentClient {
    async fn request_stream(
        &self,
        history: Vec<Message>,
        thread_id: &str,
    ) -> Result<ChunkStream, ClientError> {
        let endpoint = self.transport_options.endpoint();
        let url = reqwest::Url::parse(endpoint)
            .map_err(|e| ClientError::Config(format!("invalid endpoint {endpoint}: {e}")))?;

        let request_body = AgentRequest::new(history, thread_id, &self.run_options);
        let http_client = build_http_client(&self.transport_options)?;

        let mut req = http_client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(PLAYGROUND_HEADER, "true");

        req = add_extra_headers(req, &self.transport_options.extra_headers);

        debug!(
            endpoint,
            thread_id,
            messages = request_body.messages.len(),
            "posting conversation to agent"
        );
        let response = req.json(&request_body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = error_excerpt(response).await;
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(Box::pin(normalized_chunks(response.bytes_stream())))
    }

    fn responder(&self) -> &SimulatedResponder {
        &self.responder
    }
}

/// First bytes of an error body, or nothing if the body stalls.
///
/// The status alone already decides the fallback; the excerpt only annotates the
/// reason, so it never waits for the rest of the body.
async fn error_excerpt(response: Response) -> String {
    let mut body = response.bytes_stream();
    match tokio::time::timeout(ERROR_BODY_WAIT, body.next()).await {
        Ok(Some(Ok(bytes))) => {
            let end = bytes.len().min(ERROR_BODY_LIMIT);
            String::from_utf8_lossy(&bytes[..end]).trim().to_string()
        }
        Ok(Some(Err(e))) => {
            debug!(error = %e, "error body unreadable");
            String::new()
        }
        Ok(None) => String::new(),
        Err(_) => {
            debug!("error body stalled");
            String::new()
        }
    }
}
