//! Extraction of display text from JSON payloads of varying shape.
//!
//! The agent mixes several payload shapes on one stream (tool-call notices,
//! message envelopes, chat-completion style deltas). [`RULES`] lists the shapes
//! in precedence order; the first rule whose predicate holds decides the
//! output, even when its extractor then yields nothing.

use serde_json::Value;
use tracing::debug;

/// Tool identifiers that produce a status line instead of raw output.
pub const KNOWN_TOOLS: &[&str] = &["weatherTool"];

/// Top-level fields scanned, in order, by the last-resort rule.
pub const FALLBACK_FIELDS: &[&str] = &["content", "text", "message", "response", "data", "body"];

/// Payload shape recognised by a [`Rule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    ToolCall,
    MessageWithId,
    BareString,
    ContentOrText,
    Delta,
    ChoiceDelta,
    MessageContent,
    Response,
    Text,
    StringField,
}

/// A predicate/extractor pair.
#[derive(Clone, Copy)]
pub struct Rule {
    pub shape: Shape,
    pub matches: fn(&Value) -> bool,
    pub extract: fn(&Value) -> Option<String>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("shape", &self.shape).finish()
    }
}

/// Normalization rules in precedence order.
pub const RULES: &[Rule] = &[
    Rule {
        shape: Shape::ToolCall,
        matches: is_tool_call,
        extract: tool_call_status,
    },
    Rule {
        shape: Shape::MessageWithId,
        matches: |v| field(v, "messageId").is_some(),
        extract: |v| {
            ["content", "text", "message"]
                .into_iter()
                .find_map(|key| field(v, key))
                .map(line)
        },
    },
    Rule {
        shape: Shape::BareString,
        matches: Value::is_string,
        extract: |v| v.as_str().map(str::to_owned),
    },
    Rule {
        shape: Shape::ContentOrText,
        matches: |v| field(v, "content").or_else(|| field(v, "text")).is_some(),
        extract: |v| field(v, "content").or_else(|| field(v, "text")).map(line),
    },
    Rule {
        shape: Shape::Delta,
        matches: |v| path(v, &["delta", "content"]).is_some(),
        extract: |v| path(v, &["delta", "content"]).map(display),
    },
    Rule {
        shape: Shape::ChoiceDelta,
        matches: |v| choice_delta(v).is_some(),
        extract: |v| choice_delta(v).map(display),
    },
    Rule {
        shape: Shape::MessageContent,
        matches: |v| path(v, &["message", "content"]).is_some(),
        extract: |v| path(v, &["message", "content"]).map(line),
    },
    Rule {
        shape: Shape::Response,
        matches: |v| field(v, "response").is_some(),
        extract: |v| field(v, "response").map(line),
    },
    Rule {
        shape: Shape::Text,
        matches: |v| field(v, "text").is_some(),
        extract: |v| field(v, "text").map(line),
    },
    Rule {
        shape: Shape::StringField,
        matches: |v| string_field(v).is_some(),
        extract: |v| string_field(v).map(|s| format!("{s}\n")),
    },
];

/// The rule that claims `payload`, if any.
pub fn matching_rule(payload: &Value) -> Option<&'static Rule> {
    RULES.iter().find(|rule| (rule.matches)(payload))
}

/// Display text for a payload. Unrecognised shapes yield `None`.
///
/// # Example
/// ```
/// use agent_stream::normalize::normalize;
/// use serde_json::json;
///
/// assert_eq!(normalize(&json!({"content": "Hello"})).as_deref(), Some("Hello\n"));
/// assert_eq!(normalize(&json!({"delta": {"content": "He"}})).as_deref(), Some("He"));
/// assert_eq!(normalize(&json!({"finishReason": "stop"})), None);
/// ```
pub fn normalize(payload: &Value) -> Option<String> {
    if field(payload, "toolCallId").is_some() || field(payload, "messageId").is_some() {
        debug!(payload = %payload, "agent event");
    }

    let rule = matching_rule(payload)?;
    (rule.extract)(payload)
}

fn is_tool_call(v: &Value) -> bool {
    field(v, "toolCallId").is_some()
        && v.get("toolName")
            .and_then(Value::as_str)
            .is_some_and(|name| KNOWN_TOOLS.contains(&name))
        && path(v, &["args", "location"]).is_some()
}

fn tool_call_status(v: &Value) -> Option<String> {
    path(v, &["args", "location"])
        .map(|location| format!("🌤️ Getting weather information for {}...\n\n", display(location)))
}

fn choice_delta(v: &Value) -> Option<&Value> {
    let content = v.get("choices")?.get(0)?.get("delta")?.get("content")?;
    is_present(content).then_some(content)
}

fn string_field(v: &Value) -> Option<&str> {
    FALLBACK_FIELDS
        .iter()
        .filter_map(|key| field(v, key))
        .find_map(Value::as_str)
}

/// A top-level field holding a meaningful value.
fn field<'a>(v: &'a Value, key: &str) -> Option<&'a Value> {
    v.get(key).filter(|value| is_present(value))
}

/// A nested object field holding a meaningful value.
fn path<'a>(v: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .try_fold(v, |node, key| node.get(*key))
        .filter(|value| is_present(value))
}

/// Null, `false`, zero and the empty string count as absent.
fn is_present(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Strings as-is, anything else as compact JSON.
fn display(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn line(v: &Value) -> String {
    display(v) + "\n"
}
