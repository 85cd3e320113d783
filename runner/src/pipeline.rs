//! Waterfall development pipeline.
//!
//! Each call to [`waterfall`] returns a fresh, owned graph; there is no
//! process-wide agent state.

use anyhow::Result;

use crate::core::agent::Agent;
use crate::core::graph::AgentGraph;

pub const DEMAND_ANALYST: &str = "demand_analyst";
pub const ARCHITECT: &str = "architect";
pub const PROGRAMMER: &str = "programmer";
pub const QUALITY_ASSURANCE: &str = "quality_assurance";

/// Agent that development runs start from.
pub const ENTRY_AGENT: &str = DEMAND_ANALYST;

const DEMAND_ANALYST_PROMPT: &str = include_str!("prompts/demand_analyst.md");
const ARCHITECT_PROMPT: &str = include_str!("prompts/architect.md");
const PROGRAMMER_PROMPT: &str = include_str!("prompts/programmer.md");
const QUALITY_ASSURANCE_PROMPT: &str = include_str!("prompts/quality_assurance.md");

/// Build the waterfall graph: quality_assurance → programmer → architect → demand_analyst.
pub fn waterfall() -> Result<AgentGraph> {
    AgentGraph::new(vec![
        Agent::new(DEMAND_ANALYST, "analyze user demand", DEMAND_ANALYST_PROMPT),
        Agent::new(ARCHITECT, "create software architecture", ARCHITECT_PROMPT)
            .with_handoffs([DEMAND_ANALYST]),
        Agent::new(PROGRAMMER, "implement software", PROGRAMMER_PROMPT)
            .with_handoffs([ARCHITECT]),
        Agent::new(
            QUALITY_ASSURANCE,
            "assure software quality",
            QUALITY_ASSURANCE_PROMPT,
        )
        .with_handoffs([PROGRAMMER]),
    ])
}
