//! Prompt rendering for collaborator turns.

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use serde::Serialize;

use crate::core::agent::Agent;
use crate::core::turn::Turn;

const TURN_TEMPLATE: &str = include_str!("prompts/turn.md");

#[derive(Debug, Serialize)]
struct AgentContext<'a> {
    name: &'a str,
    purpose: &'a str,
    instructions: &'a str,
}

impl<'a> From<&'a Agent> for AgentContext<'a> {
    fn from(agent: &'a Agent) -> Self {
        Self {
            name: agent.name(),
            purpose: agent.purpose(),
            instructions: agent.instructions().trim(),
        }
    }
}

/// Template engine wrapper around minijinja.
pub struct PromptRenderer {
    env: Environment<'static>,
}

impl PromptRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("turn", TURN_TEMPLATE)
            .context("load turn template")?;
        Ok(Self { env })
    }

    /// Render the full prompt for one turn.
    pub fn render_turn(&self, turn: &Turn<'_>) -> Result<String> {
        let handoffs: Vec<AgentContext<'_>> =
            turn.handoffs.iter().map(|&agent| agent.into()).collect();
        let template = self.env.get_template("turn")?;
        let rendered = template
            .render(context! {
                agent => AgentContext::from(turn.agent),
                handoffs => handoffs,
                iteration => turn.iteration,
                input => turn.input,
            })
            .with_context(|| format!("render prompt for {}", turn.agent.name()))?;
        Ok(rendered)
    }
}
