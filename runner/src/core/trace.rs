//! Execution trace and final run result.

use serde::{Deserialize, Serialize};

use crate::core::turn::TurnResult;

/// Response returned when the iteration cap is hit without a terminal turn.
pub const EXHAUSTION_MESSAGE: &str =
    "Maximum number of agent iterations reached without resolution.";

/// One turn of a run: who ran, on what input, and what they produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub agent: String,
    pub input: String,
    pub output: TurnResult,
}

/// Final outcome of a run, successful or exhausted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Agent active when the run concluded.
    pub agent: String,
    pub response: String,
    pub execution_trace: Vec<TraceEntry>,
    /// Known only to the run that produced this result; not persisted.
    #[serde(skip)]
    exhausted: bool,
}

impl RunResult {
    /// A run that ended on a content-only turn.
    pub fn resolved(
        agent: impl Into<String>,
        response: impl Into<String>,
        execution_trace: Vec<TraceEntry>,
    ) -> Self {
        Self {
            agent: agent.into(),
            response: response.into(),
            execution_trace,
            exhausted: false,
        }
    }

    /// A run that hit its iteration cap; `response` is [`EXHAUSTION_MESSAGE`].
    pub fn exhausted(agent: impl Into<String>, execution_trace: Vec<TraceEntry>) -> Self {
        Self {
            agent: agent.into(),
            response: EXHAUSTION_MESSAGE.to_string(),
            execution_trace,
            exhausted: true,
        }
    }

    /// True only for results built by [`RunResult::exhausted`]. A resolved run
    /// whose content happens to equal the exhaustion message is not exhausted,
    /// and results read back from disk never are.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
