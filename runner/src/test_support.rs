//! Test-only helpers: scripted collaborators and small agent graphs.

use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::{Result, anyhow};

use crate::core::agent::Agent;
use crate::core::graph::AgentGraph;
use crate::core::turn::{Turn, TurnResult};
use crate::io::collaborator::Collaborator;

/// A turn as observed by a [`ScriptedCollaborator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTurn {
    pub agent: String,
    pub input: String,
    pub iteration: u32,
}

/// Collaborator that replays queued turn results in order.
///
/// Errors once the queue is empty, which doubles as a collaborator failure.
pub struct ScriptedCollaborator {
    queue: RefCell<VecDeque<TurnResult>>,
    recorded: RefCell<Vec<RecordedTurn>>,
}

impl ScriptedCollaborator {
    pub fn new(results: Vec<TurnResult>) -> Self {
        Self {
            queue: RefCell::new(results.into()),
            recorded: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.recorded.borrow().len()
    }

    pub fn recorded(&self) -> Vec<RecordedTurn> {
        self.recorded.borrow().clone()
    }
}

impl Collaborator for ScriptedCollaborator {
    fn process(&self, turn: &Turn<'_>) -> Result<TurnResult> {
        self.recorded.borrow_mut().push(RecordedTurn {
            agent: turn.agent.name().to_string(),
            input: turn.input.to_string(),
            iteration: turn.iteration,
        });
        self.queue
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("scripted collaborator has no more turns"))
    }
}

/// Agent with deterministic purpose and instructions derived from `name`.
pub fn agent(name: &str) -> Agent {
    Agent::new(name, format!("{name} purpose"), format!("{name} instructions"))
}

/// Linear graph where each agent may hand off to the next one.
pub fn chain(names: &[&str]) -> AgentGraph {
    let agents = names
        .iter()
        .enumerate()
        .map(|(idx, name)| agent(name).with_handoffs(names.get(idx + 1).copied()))
        .collect();
    AgentGraph::new(agents).expect("chain graph is valid")
}

/// Two agents that hand off to each other.
pub fn cycle(a: &str, b: &str) -> AgentGraph {
    AgentGraph::new(vec![agent(a).with_handoffs([b]), agent(b).with_handoffs([a])])
        .expect("cycle graph is valid")
}
