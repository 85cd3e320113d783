//! The handoff/tool-call control loop.
//!
//! [`Runner`] invokes one agent at a time through a [`Collaborator`], records
//! every turn, and lets [`transition`] decide whether to hand off, fold tool
//! results into a follow-up input, or stop. The loop is bounded by
//! `max_iterations` so cyclic handoff graphs and endless tool requests still
//! terminate.

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::core::agent::Agent;
use crate::core::graph::AgentGraph;
use crate::core::state::{LoopState, transition};
use crate::core::trace::{RunResult, TraceEntry};
use crate::core::turn::{Turn, TurnResult};
use crate::io::collaborator::Collaborator;

/// Iteration cap used when the caller does not choose one.
pub const DEFAULT_MAX_ITERATIONS: u32 = 5;

/// A turn asked for a handoff the runner refuses to follow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandoffError {
    #[error("agent '{from}' handed off to unknown agent '{to}'")]
    UnknownAgent { from: String, to: String },

    #[error("agent '{from}' handed off to '{to}', which it does not declare")]
    Undeclared { from: String, to: String },
}

/// Knobs that do not change per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Reject handoffs outside the current agent's declared set.
    pub strict_handoffs: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            strict_handoffs: true,
        }
    }
}

/// Drives runs over a fixed agent graph.
///
/// Holds no per-run state: each call to [`Runner::run`] owns its own loop
/// state and trace, so one runner can serve independent runs.
pub struct Runner<'a, C: Collaborator> {
    graph: &'a AgentGraph,
    collaborator: &'a C,
    options: RunOptions,
}

impl<'a, C: Collaborator> Runner<'a, C> {
    pub fn new(graph: &'a AgentGraph, collaborator: &'a C) -> Self {
        Self {
            graph,
            collaborator,
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Run from `starting_agent` with `input` for at most `max_iterations` turns.
    ///
    /// Exhaustion is an ordinary result. Collaborator failures and refused
    /// handoffs are errors and discard the partial trace.
    pub fn run(&self, starting_agent: &str, input: &str, max_iterations: u32) -> Result<RunResult> {
        self.run_with(starting_agent, input, max_iterations, |_| {})
    }

    /// Like [`Runner::run`], calling `on_turn` after each recorded turn.
    #[instrument(skip_all, fields(starting_agent = %starting_agent, max_iterations = max_iterations))]
    pub fn run_with<F: FnMut(&TraceEntry)>(
        &self,
        starting_agent: &str,
        input: &str,
        max_iterations: u32,
        mut on_turn: F,
    ) -> Result<RunResult> {
        let start = self
            .graph
            .get(starting_agent)
            .with_context(|| format!("unknown starting agent '{starting_agent}'"))?;

        let mut state = LoopState::start(start.name(), input, max_iterations);
        let mut trace: Vec<TraceEntry> = Vec::new();

        let result = loop {
            let (agent, input, iteration) = match &state {
                LoopState::Running {
                    agent,
                    input,
                    iterations,
                } => (agent, input, iterations + 1),
                LoopState::Succeeded { agent, response } => {
                    info!(agent = %agent, turns = trace.len(), "run resolved");
                    break RunResult::resolved(agent.clone(), response.clone(), trace);
                }
                LoopState::Exhausted { agent } => {
                    warn!(agent = %agent, turns = trace.len(), "run exhausted iteration cap");
                    break RunResult::exhausted(agent.clone(), trace);
                }
            };

            let current = self
                .graph
                .get(agent)
                .with_context(|| format!("agent '{agent}' missing from graph"))?;
            let turn = Turn {
                agent: current,
                handoffs: self.graph.handoff_targets(current),
                input: input.as_str(),
                iteration,
            };

            debug!(agent = %agent, iteration, "invoking agent");
            let result = self
                .collaborator
                .process(&turn)
                .with_context(|| format!("agent '{agent}' failed on turn {iteration}"))?;
            self.check_handoff(current, &result)?;

            let entry = TraceEntry {
                agent: agent.clone(),
                input: input.clone(),
                output: result,
            };
            on_turn(&entry);
            state = transition(state, &entry.output, max_iterations);
            trace.push(entry);
        };

        Ok(result)
    }

    fn check_handoff(&self, current: &Agent, result: &TurnResult) -> Result<()> {
        let Some(target) = result.handoff.as_deref() else {
            return Ok(());
        };
        if self.graph.get(target).is_none() {
            return Err(HandoffError::UnknownAgent {
                from: current.name().to_string(),
                to: target.to_string(),
            }
            .into());
        }
        if !current.may_hand_off_to(target) {
            if self.options.strict_handoffs {
                return Err(HandoffError::Undeclared {
                    from: current.name().to_string(),
                    to: target.to_string(),
                }
                .into());
            }
            warn!(from = current.name(), to = target, "following undeclared handoff");
        }
        Ok(())
    }
}
