//! Conversation and wire models for the weather-agent streaming endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::options::RunOptions;

/// Role of the message sender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in a conversation.
///
/// Serializes as `{"role": "user", "content": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Content of the most recent user message, or an empty string when there is none.
pub fn last_user_message(history: &[Message]) -> &str {
    history
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .unwrap_or_default()
}

/// Request body posted to the agent's `/stream` endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRequest {
    pub messages: Vec<Message>,
    pub run_id: String,
    pub max_retries: u32,
    pub max_steps: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub runtime_context: Map<String, Value>,
    pub thread_id: String,
    pub resource_id: String,
}

impl AgentRequest {
    pub fn new(messages: Vec<Message>, thread_id: impl Into<String>, run: &RunOptions) -> Self {
        Self {
            messages,
            run_id: run.run_id.clone(),
            max_retries: run.max_retries,
            max_steps: run.max_steps,
            temperature: run.temperature,
            top_p: run.top_p,
            runtime_context: Map::new(),
            thread_id: thread_id.into(),
            resource_id: run.resource_id.clone(),
        }
    }
}

/// How a single `stream_chat` turn ended.
///
/// None of these is an error from the caller's point of view; the variants let the
/// collaborator decide how to label the finished message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The live stream ran to completion. Zero chunks is a valid, empty answer.
    Completed { chunks: usize },
    /// The caller cancelled; no further chunks were delivered.
    Cancelled { chunks: usize },
    /// The live call failed before producing output and the simulated answer was delivered.
    Fallback { reason: String },
    /// The live stream failed after some chunks had already been delivered.
    Interrupted { chunks: usize, reason: String },
}

impl StreamOutcome {
    /// Number of chunks handed to the callback during the turn.
    pub fn chunks(&self) -> usize {
        match self {
            StreamOutcome::Completed { chunks }
            | StreamOutcome::Cancelled { chunks }
            | StreamOutcome::Interrupted { chunks, .. } => *chunks,
            StreamOutcome::Fallback { .. } => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_camel_case() {
        let history = vec![Message::user("hi"), Message::assistant("hello")];
        let request = AgentRequest::new(history, "42", &RunOptions::default());
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            json!({
                "messages": [
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "hello"}
                ],
                "runId": "weatherAgent",
                "maxRetries": 2,
                "maxSteps": 5,
                "temperature": 0.5,
                "topP": 1.0,
                "runtimeContext": {},
                "threadId": "42",
                "resourceId": "weatherAgent"
            })
        );
    }

    #[test]
    fn test_last_user_message() {
        let history = vec![
            Message::user("first"),
            Message::assistant("reply"),
            Message::user("second"),
            Message::assistant("partial"),
        ];
        assert_eq!(last_user_message(&history), "second");
        assert_eq!(last_user_message(&[Message::assistant("only")]), "");
        assert_eq!(last_user_message(&[]), "");
    }
}
