//! Interactive weather chat over the streaming agent.
//!
//! Run with:
//! ```bash
//! export WEATHER_AGENT_URL="http://localhost:4111/api/agents/weatherAgent/stream"  # optional
//! RUST_LOG=agent_stream=debug cargo run --example weather_chat
//! ```
//!
//! Press Ctrl-C while an answer is streaming to stop it.

use std::io::Write;

use agent_stream::client::StreamingClient;
use agent_stream::model::{Message, StreamOutcome};
use agent_stream::options::{RunOptions, StreamOptions, TransportOptions};
use agent_stream::providers::WeatherAgentClient;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let client = WeatherAgentClient::new(RunOptions::default(), TransportOptions::from_env());
    let thread_id = format!("cli-{}", std::process::id());
    let mut history: Vec<Message> = Vec::new();

    println!("Ask about the weather (empty line to quit).\n");
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = input.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            break;
        }
        history.push(Message::user(line));

        // Ctrl-C only cancels the current turn
        let cancel = CancellationToken::new();
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };

        let mut answer = String::new();
        let options = StreamOptions::new(thread_id.clone()).with_cancel(cancel);
        let outcome = client
            .stream_chat(history.clone(), options, |chunk| {
                print!("{chunk}");
                let _ = std::io::stdout().flush();
                answer.push_str(chunk);
            })
            .await;
        watcher.abort();

        match &outcome {
            StreamOutcome::Completed { .. } => {}
            StreamOutcome::Cancelled { .. } => println!("\n[stopped]"),
            StreamOutcome::Fallback { reason } => println!("\n[simulated answer: {reason}]"),
            StreamOutcome::Interrupted { reason, .. } => println!("\n[interrupted: {reason}]"),
        }
        println!("\n");

        if !answer.is_empty() {
            history.push(Message::assistant(answer));
        }
    }

    Ok(())
}
