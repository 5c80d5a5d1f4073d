use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum TurnRole {
    User,
    Assistant,
    Tool,
    System,
}

/// One message of a conversation as sent by the chat client.
///
/// `content` is usually a string; tool turns may carry structured JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Turn {
    pub role: TurnRole,
    #[ts(type = "unknown")]
    pub content: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub tool_call_id: Option<String>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: serde_json::Value::String(text.into()),
            tool_call_id: None,
        }
    }

    /// Content flattened to text; structured content is re-encoded as JSON.
    pub fn text(&self) -> String {
        match &self.content {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Client to server frame on the chat socket
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClientMessage {
    #[serde(default)]
    pub messages: Vec<Turn>,
}

/// Server to client frame on the chat socket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export)]
pub enum EventFrame {
    Error { message: String },
    MessageResponse { message: String },
    ToolCallOutput { message: String },
    /// End of turn. The text already went out as deltas, so `message` is always null.
    FinalOutput { message: Option<String> },
}

impl EventFrame {
    pub fn error(message: impl Into<String>) -> Self {
        EventFrame::Error {
            message: message.into(),
        }
    }

    pub fn final_output() -> Self {
        EventFrame::FinalOutput { message: None }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EventFrame::Error { .. } => "error",
            EventFrame::MessageResponse { .. } => "message_response",
            EventFrame::ToolCallOutput { .. } => "tool_call_output",
            EventFrame::FinalOutput { .. } => "final_output",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_final_output_serializes_null_message() {
        let value = serde_json::to_value(EventFrame::final_output()).unwrap();
        assert_eq!(value, json!({"type": "final_output", "message": null}));
    }

    #[test]
    fn test_frame_tags() {
        let frame = EventFrame::MessageResponse {
            message: "Hel".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&frame).unwrap(),
            json!({"type": "message_response", "message": "Hel"})
        );
        assert_eq!(
            serde_json::to_value(EventFrame::error("Messages cannot be empty")).unwrap(),
            json!({"type": "error", "message": "Messages cannot be empty"})
        );
    }

    #[test]
    fn test_client_message_defaults_to_empty() {
        let msg: ClientMessage = serde_json::from_str("{}").unwrap();
        assert!(msg.messages.is_empty());
    }

    #[test]
    fn test_turn_with_structured_content() {
        let msg: ClientMessage = serde_json::from_value(json!({
            "messages": [
                {"role": "user", "content": "list my notes"},
                {"role": "tool", "content": {"data": []}, "tool_call_id": "call_1"}
            ]
        }))
        .unwrap();
        assert_eq!(msg.messages[0], Turn::user("list my notes"));
        assert_eq!(msg.messages[1].role, TurnRole::Tool);
        assert_eq!(msg.messages[1].text(), r#"{"data":[]}"#);
        assert_eq!(msg.messages[1].tool_call_id.as_deref(), Some("call_1"));
    }
}
