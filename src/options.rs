//! Options for the agent run and the HTTP transport.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Default streaming endpoint of the hosted weather agent.
pub const DEFAULT_ENDPOINT: &str =
    "https://millions-screeching-vultur.mastra.cloud/api/agents/weatherAgent/stream";

const DEFAULT_AGENT_ID: &str = "weatherAgent";

/// Environment variable overriding the endpoint in [`TransportOptions::from_env`].
pub const ENDPOINT_ENV: &str = "WEATHER_AGENT_URL";

/// Environment variable holding an HTTP proxy URL.
pub const PROXY_ENV: &str = "WEATHER_AGENT_PROXY";

/// Execution parameters sent with every agent call.
///
/// # Example
/// ```rust
/// use agent_stream::options::RunOptions;
///
/// let options = RunOptions::default().with_temperature(0.2).with_max_steps(3);
/// assert_eq!(options.max_retries, 2);
/// assert_eq!(options.max_steps, 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunOptions {
    /// Run identifier reported to the agent
    pub run_id: String,

    /// Resource the conversation is stored under on the agent side
    pub resource_id: String,

    /// Retry budget the agent may spend on its own tool calls
    pub max_retries: u32,

    /// Step budget for the agent loop
    pub max_steps: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Top-p (nucleus) sampling parameter
    pub top_p: f32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            run_id: DEFAULT_AGENT_ID.to_string(),
            resource_id: DEFAULT_AGENT_ID.to_string(),
            max_retries: 2,
            max_steps: 5,
            temperature: 0.5,
            top_p: 1.0,
        }
    }
}

impl RunOptions {
    /// Set the run identifier.
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    /// Set the resource identifier.
    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = resource_id.into();
        self
    }

    /// Set the retry budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the step budget.
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Set the temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set top-p sampling parameter.
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    /// Streaming endpoint; [`DEFAULT_ENDPOINT`] when unset
    pub endpoint: Option<String>,

    /// Connect timeout. The body read is never timed out; use cancellation instead.
    pub timeout: Option<Duration>,

    /// HTTP proxy URL
    pub proxy: Option<String>,

    /// Additional HTTP headers to include in requests
    pub extra_headers: Option<HashMap<String, String>>,
}

impl TransportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from `WEATHER_AGENT_URL` and `WEATHER_AGENT_PROXY`.
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var(ENDPOINT_ENV).ok().filter(|s| !s.is_empty()),
            proxy: std::env::var(PROXY_ENV).ok().filter(|s| !s.is_empty()),
            ..Self::default()
        }
    }

    /// Endpoint the request is posted to.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    /// Set the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the connect timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the proxy URL.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Add a single extra header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }
}

/// Per-call options for [`crate::client::StreamingClient::stream_chat`].
#[derive(Debug, Clone, Default)]
pub struct StreamOptions {
    /// Conversation thread the turn belongs to
    pub thread_id: String,

    /// Fires to abort the in-flight call
    pub cancel: CancellationToken,
}

impl StreamOptions {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            cancel: CancellationToken::new(),
        }
    }

    /// Use an existing cancellation token.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}
