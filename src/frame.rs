//! Classification of a single `prefix:payload` line.

use serde_json::Value;

use crate::normalize::normalize;

/// Classified content of one line.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A quoted payload decoded as a JSON string literal (a text delta).
    StringLiteral(String),
    /// Text that is displayed exactly as received.
    RawText(String),
    /// A JSON object or array payload.
    JsonPayload(Value),
    /// Text that could not be decoded; displayed trimmed, as its own line.
    Unparseable(String),
}

impl Frame {
    /// Display text for this frame, if any.
    pub fn into_chunk(self) -> Option<String> {
        match self {
            Frame::StringLiteral(text) | Frame::RawText(text) => Some(text),
            Frame::Unparseable(text) => Some(text + "\n"),
            Frame::JsonPayload(value) => normalize(&value),
        }
    }
}

/// Classify one line. Blank lines produce no frame.
///
/// Decoding failures never error; they degrade to one of two text frames:
///
/// | Input | Frame | Rendered |
/// |-------|-------|----------|
/// | no prefix (no colon, or a colon in first position) | [`Frame::Unparseable`] of the trimmed line | trimmed text + `\n` |
/// | `{`/`[` payload that fails to parse | [`Frame::Unparseable`] of the trimmed payload | trimmed text + `\n` |
/// | quoted payload that fails to decode | [`Frame::RawText`] of the payload | verbatim |
/// | any other payload that is not `{`/`[` | [`Frame::RawText`] of the payload | verbatim |
///
/// So a colon-less line or a broken object is `Unparseable`, not `RawText`;
/// the variant carries the line break that text is shown with.
///
/// # Example
/// ```
/// use agent_stream::frame::{classify, Frame};
///
/// assert_eq!(
///     classify("0:\"Hello\""),
///     Some(Frame::StringLiteral("Hello".to_string()))
/// );
/// assert_eq!(classify("   "), None);
/// ```
pub fn classify(line: &str) -> Option<Frame> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.trim().is_empty() {
        return None;
    }

    let payload = match line.find(':') {
        Some(index) if index > 0 => &line[index + 1..],
        _ => return Some(Frame::Unparseable(line.trim().to_string())),
    };

    if payload.len() >= 2 && payload.starts_with('"') && payload.ends_with('"') {
        return Some(match serde_json::from_str::<String>(payload) {
            Ok(text) => Frame::StringLiteral(text),
            Err(_) => Frame::RawText(payload.to_string()),
        });
    }

    if !payload.starts_with('{') && !payload.starts_with('[') {
        return Some(Frame::RawText(payload.to_string()));
    }

    match serde_json::from_str::<Value>(payload) {
        Ok(value) => Some(Frame::JsonPayload(value)),
        Err(_) => {
            let trimmed = payload.trim();
            (!trimmed.is_empty()).then(|| Frame::Unparseable(trimmed.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_lines_are_skipped() {
        assert_eq!(classify(""), None);
        assert_eq!(classify(" \t "), None);
        assert_eq!(classify("\r"), None);
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(
            classify("0:\"Partial word\""),
            Some(Frame::StringLiteral("Partial word".into()))
        );
        assert_eq!(
            classify("0:\"line\\nbreak \\u00e9\""),
            Some(Frame::StringLiteral("line\nbreak \u{e9}".into()))
        );
    }

    #[test]
    fn test_bad_string_literal_is_raw() {
        assert_eq!(
            classify("0:\"a\" \"b\""),
            Some(Frame::RawText("\"a\" \"b\"".into()))
        );
        assert_eq!(classify("0:\""), Some(Frame::RawText("\"".into())));
    }

    #[test]
    fn test_non_json_payload_is_raw_and_untrimmed() {
        assert_eq!(classify("g: hello "), Some(Frame::RawText(" hello ".into())));
        assert_eq!(classify("x:"), Some(Frame::RawText(String::new())));
    }

    #[test]
    fn test_json_payload() {
        assert_eq!(
            classify("9:{\"content\":\"Hello\"}"),
            Some(Frame::JsonPayload(json!({"content": "Hello"})))
        );
        assert_eq!(
            classify("2:[{\"a\":1}]"),
            Some(Frame::JsonPayload(json!([{"a": 1}])))
        );
    }

    #[test]
    fn test_broken_json_is_unparseable() {
        assert_eq!(
            classify("9:{\"content\": \"Hel "),
            Some(Frame::Unparseable("{\"content\": \"Hel".into()))
        );
    }

    #[test]
    fn test_line_without_prefix() {
        assert_eq!(
            classify("  just text  "),
            Some(Frame::Unparseable("just text".into()))
        );
        assert_eq!(
            classify(":leading colon"),
            Some(Frame::Unparseable(":leading colon".into()))
        );
    }

    #[test]
    fn test_degraded_lines_render() {
        let render = |line: &str| classify(line).and_then(Frame::into_chunk);
        assert_eq!(render("  just text  ").as_deref(), Some("just text\n"));
        assert_eq!(render("3:{oops ").as_deref(), Some("{oops\n"));
        assert_eq!(render("0:\"a\" \"b\"").as_deref(), Some("\"a\" \"b\""));
        assert_eq!(render("g: hello ").as_deref(), Some(" hello "));
    }

    #[test]
    fn test_prefix_ends_at_first_colon() {
        assert_eq!(
            classify("0:\"a:b\""),
            Some(Frame::StringLiteral("a:b".into()))
        );
    }

    #[test]
    fn test_crlf_is_tolerated() {
        assert_eq!(
            classify("0:\"Hi\"\r"),
            Some(Frame::StringLiteral("Hi".into()))
        );
    }

    #[test]
    fn test_classify_is_deterministic() {
        let lines = ["0:\"x\"", "9:{\"text\":\"y\"}", "junk", "3:{oops"];
        for line in lines {
            assert_eq!(classify(line), classify(line));
        }
    }

    #[test]
    fn test_into_chunk() {
        assert_eq!(
            Frame::StringLiteral("Partial word".into()).into_chunk().as_deref(),
            Some("Partial word")
        );
        assert_eq!(Frame::RawText("raw".into()).into_chunk().as_deref(), Some("raw"));
        assert_eq!(
            Frame::Unparseable("oops".into()).into_chunk().as_deref(),
            Some("oops\n")
        );
        assert_eq!(
            Frame::JsonPayload(json!({"content": "Hello"})).into_chunk().as_deref(),
            Some("Hello\n")
        );
        assert_eq!(Frame::JsonPayload(json!({"finishReason": "stop"})).into_chunk(), None);
    }
}
