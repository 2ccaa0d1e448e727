//! # agent-stream - streaming client for a hosted weather agent
//!
//! Sends a conversation to a remote agent and turns its streamed response into
//! display-ready text chunks as they arrive.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Reassembly of newline-delimited frames across arbitrary network reads
//! - Ordered, table-driven extraction of text from heterogeneous JSON payloads
//! - Cooperative cancellation via `CancellationToken`
//! - Simulated fallback answer when the agent is unreachable
//!
//! ## Architecture
//!
//! The pipeline runs leaves first:
//!
//! 1. **`reassembler`**: raw bytes to complete lines
//! 2. **`frame`**: one line to a classified `Frame`
//! 3. **`normalize`**: JSON payload to display text
//! 4. **`client`**: drives a turn, handles cancellation and fallback
//!
//! ## Example
//! ```no_run
//! use agent_stream::client::StreamingClient;
//! use agent_stream::model::Message;
//! use agent_stream::options::{RunOptions, StreamOptions, TransportOptions};
//! use agent_stream::providers::WeatherAgentClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = WeatherAgentClient::new(RunOptions::default(), TransportOptions::from_env());
//!
//!     let history = vec![Message::user("What's the weather in Paris?")];
//!     let outcome = client
//!         .stream_chat(history, StreamOptions::new("thread-1"), |chunk| print!("{chunk}"))
//!         .await;
//!
//!     println!("\n{:?}", outcome);
//! }
//! ```

pub mod client;
pub mod fallback;
pub mod frame;
pub mod http;
pub mod model;
pub mod normalize;
pub mod options;
pub mod providers;
pub mod reassembler;
pub mod stream;

// Re-exports for convenience
pub use client::{ClientError, StreamingClient, NO_RESPONSE};
pub use frame::Frame;
pub use model::{Message, Role, StreamOutcome};
pub use providers::WeatherAgentClient;
