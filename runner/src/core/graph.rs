//! Validated set of agents and their handoff relationships.

use std::collections::{HashMap, HashSet};

use anyhow::{Result, bail};

use crate::core::agent::Agent;

/// An immutable agent topology, indexed by name.
///
/// The graph may contain cycles; termination is the runner's concern.
#[derive(Debug, Clone)]
pub struct AgentGraph {
    agents: Vec<Agent>,
    index: HashMap<String, usize>,
}

impl AgentGraph {
    /// Build a graph, rejecting it if any invariant from [`validate_graph`] fails.
    pub fn new(agents: Vec<Agent>) -> Result<Self> {
        let errors = validate_graph(&agents);
        if !errors.is_empty() {
            bail!("invalid agent graph:\n- {}", errors.join("\n- "));
        }
        let index = agents
            .iter()
            .enumerate()
            .map(|(idx, agent)| (agent.name().to_string(), idx))
            .collect();
        Ok(Self { agents, index })
    }

    pub fn get(&self, name: &str) -> Option<&Agent> {
        self.index.get(name).map(|&idx| &self.agents[idx])
    }

    /// Agents in assembly order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Resolve the declared handoff targets of `agent`, in declared order.
    pub fn handoff_targets(&self, agent: &Agent) -> Vec<&Agent> {
        agent
            .handoffs()
            .iter()
            .filter_map(|name| self.get(name))
            .collect()
    }
}

/// Check graph invariants:
/// - Names are non-empty and unique
/// - No agent declares the same handoff twice
/// - Every handoff target exists in the graph
pub fn validate_graph(agents: &[Agent]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();
    for agent in agents {
        if agent.name().trim().is_empty() {
            errors.push("agent name must be non-empty".to_string());
        }
        if !names.insert(agent.name()) {
            errors.push(format!("duplicate agent name '{}'", agent.name()));
        }
    }

    for agent in agents {
        let mut declared = HashSet::new();
        for target in agent.handoffs() {
            if !declared.insert(target.as_str()) {
                errors.push(format!(
                    "{}: handoff '{}' declared more than once",
                    agent.name(),
                    target
                ));
            }
            if !names.contains(target.as_str()) {
                errors.push(format!(
                    "{}: handoff target '{}' is not in the graph",
                    agent.name(),
                    target
                ));
            }
        }
    }

    errors
}
