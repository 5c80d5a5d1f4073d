use super::types::OpenAIToolCallDelta;
use crate::{error::LlmError, tools::ToolCall};
use std::collections::BTreeMap;

/// `data` of the event that closes an OpenAI completion stream
pub const DONE_MARKER: &str = "[DONE]";

#[derive(Debug, Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

/// Reassembles tool calls from indexed stream fragments.
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    calls: BTreeMap<u32, PartialToolCall>,
}

impl ToolCallAccumulator {
    pub fn apply(&mut self, deltas: Vec<OpenAIToolCallDelta>) {
        for delta in deltas {
            let entry = self.calls.entry(delta.index).or_default();
            if let Some(id) = delta.id {
                entry.id = id;
            }
            if let Some(function) = delta.function {
                if let Some(name) = function.name {
                    entry.name.push_str(&name);
                }
                if let Some(arguments) = function.arguments {
                    entry.arguments.push_str(&arguments);
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Complete calls in index order. Empty arguments decode as `{}`.
    pub fn finish(self) -> Result<Vec<ToolCall>, LlmError> {
        self.calls
            .into_values()
            .map(|call| {
                let raw = if call.arguments.trim().is_empty() {
                    "{}"
                } else {
                    call.arguments.as_str()
                };
                let arguments = serde_json::from_str(raw).map_err(|e| {
                    LlmError::ToolArgumentParse {
                        tool_name: call.name.clone(),
                        source: e,
                    }
                })?;
                Ok(ToolCall::new(call.id, call.name, arguments))
            })
            .collect()
    }
}
