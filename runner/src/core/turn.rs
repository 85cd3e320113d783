//! Per-turn contract between the runner and the model collaborator.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::agent::Agent;

/// An auxiliary action reported by a turn, with the value it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    pub result: Value,
}

impl ToolCall {
    pub fn new(tool: impl Into<String>, result: impl Into<Value>) -> Self {
        Self {
            tool: tool.into(),
            result: result.into(),
        }
    }

    /// `Tool <tool> returned: <result>`; strings are written raw, other values as JSON.
    pub fn summary(&self) -> String {
        match &self.result {
            Value::String(text) => format!("Tool {} returned: {}", self.tool, text),
            other => format!("Tool {} returned: {}", self.tool, other),
        }
    }
}

/// Structured outcome of one agent turn.
///
/// A result may carry a handoff and tool calls at the same time; the runner
/// decides precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnResult {
    /// Final text for this turn.
    pub content: Option<String>,
    /// Name of the agent that should take over, if any.
    pub handoff: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl TurnResult {
    /// A terminal turn carrying only `content`.
    pub fn content(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn handoff(target: impl Into<String>) -> Self {
        Self {
            handoff: Some(target.into()),
            ..Self::default()
        }
    }

    pub fn tools(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::default()
        }
    }
}

/// Everything a collaborator sees for a single invocation.
#[derive(Debug, Clone)]
pub struct Turn<'a> {
    pub agent: &'a Agent,
    /// Resolved handoff targets of `agent`, in declared order.
    pub handoffs: Vec<&'a Agent>,
    pub input: &'a str,
    /// 1-indexed iteration within the current run.
    pub iteration: u32,
}
