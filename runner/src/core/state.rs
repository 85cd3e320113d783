//! Explicit state machine for the handoff/tool-call loop.
//!
//! The runner owns I/O (invoking collaborators, recording the trace); this
//! module only decides what happens next given the current state and the
//! latest turn result.

use crate::core::turn::{ToolCall, TurnResult};

/// Loop state for a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    /// `agent` will be invoked next with `input`; `iterations` turns have run.
    Running {
        agent: String,
        input: String,
        iterations: u32,
    },
    /// A turn produced final content.
    Succeeded { agent: String, response: String },
    /// The iteration cap was reached; `agent` is the agent that would run next.
    Exhausted { agent: String },
}

impl LoopState {
    /// Initial state. A zero cap is exhausted before any turn runs.
    pub fn start(agent: impl Into<String>, input: impl Into<String>, max_iterations: u32) -> Self {
        let agent = agent.into();
        if max_iterations == 0 {
            return Self::Exhausted { agent };
        }
        Self::Running {
            agent,
            input: input.into(),
            iterations: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running { .. })
    }

    pub fn agent(&self) -> &str {
        match self {
            Self::Running { agent, .. }
            | Self::Succeeded { agent, .. }
            | Self::Exhausted { agent } => agent,
        }
    }
}

/// Apply one turn result to a running state.
///
/// Precedence: a handoff wins (input carried over, tool calls dropped), then
/// tool calls (same agent, synthesized input), otherwise the turn is terminal.
/// Terminal states are returned unchanged.
pub fn transition(state: LoopState, result: &TurnResult, max_iterations: u32) -> LoopState {
    let (agent, input, iterations) = match state {
        LoopState::Running {
            agent,
            input,
            iterations,
        } => (agent, input, iterations.saturating_add(1)),
        terminal => return terminal,
    };

    let (agent, input) = if let Some(target) = &result.handoff {
        (target.clone(), input)
    } else if !result.tool_calls.is_empty() {
        (agent, tool_followup_input(&result.tool_calls))
    } else {
        return LoopState::Succeeded {
            agent,
            response: result.content.clone().unwrap_or_default(),
        };
    };

    if iterations >= max_iterations {
        return LoopState::Exhausted { agent };
    }
    LoopState::Running {
        agent,
        input,
        iterations,
    }
}

/// Fold tool results into the next input for the same agent.
pub fn tool_followup_input(tool_calls: &[ToolCall]) -> String {
    let summaries: Vec<String> = tool_calls.iter().map(ToolCall::summary).collect();
    format!(
        "The following tools were used: {}. Please continue.",
        summaries.join(" ")
    )
}
