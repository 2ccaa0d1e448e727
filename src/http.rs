//! Transport setup for posting conversations to the agent.
//!
//! A fresh [`Client`] is built per turn from [`TransportOptions`], so changed
//! settings take effect on the next message.

use reqwest::{Client, Proxy, RequestBuilder};
use std::collections::HashMap;
use tracing::warn;

use crate::client::ClientError;
use crate::options::TransportOptions;

/// Client for one agent turn.
///
/// `timeout` bounds connection setup only. The agent keeps the response open
/// while it runs tools, and that body must not be cut off mid-answer.
///
/// An unusable proxy (for example a malformed `WEATHER_AGENT_PROXY`) is a
/// [`ClientError::Config`], which sends the turn to the simulated answer.
pub fn build_http_client(transport_options: &TransportOptions) -> Result<Client, ClientError> {
    let mut builder = Client::builder();

    if let Some(timeout) = transport_options.timeout {
        builder = builder.connect_timeout(timeout);
    }

    if let Some(proxy_url) = &transport_options.proxy {
        let proxy = Proxy::all(proxy_url).map_err(|e| {
            warn!(proxy = %proxy_url, error = %e, "rejecting agent proxy");
            ClientError::Config(format!("invalid proxy {proxy_url}: {e}"))
        })?;
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

/// Apply caller-supplied headers after the agent's own, so they can override them.
pub fn add_extra_headers(
    mut request: RequestBuilder,
    extra_headers: &Option<HashMap<String, String>>,
) -> RequestBuilder {
    if let Some(headers) = extra_headers {
        for (key, value) in headers {
            request = request.header(key, value);
        }
    }
    request
}
