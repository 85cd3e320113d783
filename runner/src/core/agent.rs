//! Immutable agent descriptors.

use serde::Serialize;

/// A named, instructed participant in a pipeline.
///
/// Agents are assembled once and never mutated afterwards. Handoff targets are
/// referenced by name and resolved through an [`AgentGraph`], so cyclic
/// topologies need no shared ownership.
///
/// [`AgentGraph`]: crate::core::graph::AgentGraph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agent {
    name: String,
    purpose: String,
    instructions: String,
    handoffs: Vec<String>,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        purpose: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            purpose: purpose.into(),
            instructions: instructions.into(),
            handoffs: Vec::new(),
        }
    }

    /// Declare the agents this agent may delegate to, in preference order.
    pub fn with_handoffs<I, S>(mut self, handoffs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.handoffs = handoffs.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn handoffs(&self) -> &[String] {
        &self.handoffs
    }

    /// True if `target` is one of the declared handoff names.
    pub fn may_hand_off_to(&self, target: &str) -> bool {
        self.handoffs.iter().any(|name| name == target)
    }
}
