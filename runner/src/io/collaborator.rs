//! Model collaborator abstraction.
//!
//! The [`Collaborator`] trait decouples the runner loop from whatever actually
//! produces a turn (a language model behind a CLI, a scripted test double, a
//! closure). [`CommandCollaborator`] spawns a configured command per turn.

use std::process::Command;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::Draft;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::core::turn::{Turn, TurnResult};
use crate::io::config::RunnerConfig;
use crate::io::process::run_with_timeout;
use crate::io::prompt::PromptRenderer;

const TURN_RESULT_SCHEMA: &str = include_str!("../../schemas/turn_result.schema.json");

/// Produces the result of one agent turn.
///
/// Implementations should only return handoffs the agent declared; the runner
/// enforces this when strict handoffs are enabled. Errors are collaborator
/// failures and abort the run.
pub trait Collaborator {
    fn process(&self, turn: &Turn<'_>) -> Result<TurnResult>;
}

impl<F> Collaborator for F
where
    F: Fn(&Turn<'_>) -> Result<TurnResult>,
{
    fn process(&self, turn: &Turn<'_>) -> Result<TurnResult> {
        self(turn)
    }
}

/// Collaborator that pipes a rendered prompt into an external command and
/// parses the turn result from its stdout.
pub struct CommandCollaborator {
    command: Vec<String>,
    timeout: Duration,
    output_limit_bytes: usize,
    renderer: PromptRenderer,
}

impl CommandCollaborator {
    pub fn new(command: Vec<String>, timeout: Duration, output_limit_bytes: usize) -> Result<Self> {
        if command.first().is_none_or(|program| program.trim().is_empty()) {
            bail!("collaborator command must be non-empty");
        }
        Ok(Self {
            command,
            timeout,
            output_limit_bytes,
            renderer: PromptRenderer::new()?,
        })
    }

    pub fn from_config(cfg: &RunnerConfig) -> Result<Self> {
        Self::new(
            cfg.collaborator.command.clone(),
            Duration::from_secs(cfg.turn_timeout_secs),
            cfg.output_limit_bytes,
        )
    }
}

impl Collaborator for CommandCollaborator {
    #[instrument(skip_all, fields(agent = turn.agent.name(), iteration = turn.iteration))]
    fn process(&self, turn: &Turn<'_>) -> Result<TurnResult> {
        let prompt = self.renderer.render_turn(turn)?;
        let mut cmd = Command::new(&self.command[0]);
        cmd.args(&self.command[1..]);
        info!(program = %self.command[0], prompt_bytes = prompt.len(), "invoking collaborator");

        let output = run_with_timeout(
            cmd,
            Some(prompt.as_bytes()),
            self.timeout,
            self.output_limit_bytes,
        )
        .with_context(|| format!("run collaborator {}", self.command[0]))?;

        if output.timed_out {
            warn!(timeout_secs = self.timeout.as_secs(), "collaborator timed out");
            bail!("collaborator timed out after {:?}", self.timeout);
        }
        if !output.status.success() {
            warn!(exit_code = ?output.status.code(), "collaborator failed");
            bail!(
                "collaborator failed with status {:?}: {}",
                output.status.code(),
                output.stderr_excerpt()
            );
        }

        let stdout = String::from_utf8(output.stdout).context("collaborator stdout is not UTF-8")?;
        let result = parse_turn_result(&stdout)?;
        debug!(
            handoff = ?result.handoff,
            tool_calls = result.tool_calls.len(),
            has_content = result.content.is_some(),
            "parsed turn result"
        );
        Ok(result)
    }
}

/// Extract, validate, and decode a turn result from raw collaborator output.
///
/// Uses the last fenced `json` block if there is one, otherwise the span from
/// the first `{` to the last `}`.
pub fn parse_turn_result(raw: &str) -> Result<TurnResult> {
    let payload = extract_json(raw).ok_or_else(|| anyhow!("no JSON object in collaborator output"))?;
    let value: Value = serde_json::from_str(payload).context("parse turn result json")?;
    validate_schema(&value)?;
    serde_json::from_value(value).context("decode turn result")
}

fn extract_json(raw: &str) -> Option<&str> {
    static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("fence regex is valid")
    });

    if let Some(caps) = FENCE_RE.captures_iter(raw).last() {
        return caps.get(1).map(|m| m.as_str());
    }
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

fn validate_schema(instance: &Value) -> Result<()> {
    let schema: Value =
        serde_json::from_str(TURN_RESULT_SCHEMA).context("parse turn result schema")?;
    let compiled = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .context("compile turn result schema")?;
    let messages: Vec<String> = compiled
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        bail!("turn result violates schema:\n- {}", messages.join("\n- "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::agent::Agent;
    use crate::core::turn::ToolCall;

    #[test]
    fn parses_bare_json() {
        let result = parse_turn_result(r#"{"content":"done","handoff":null,"tool_calls":[]}"#)
            .expect("parse");
        assert_eq!(result, TurnResult::content("done"));
    }

    #[test]
    fn prefers_last_fenced_block() {
        let raw = "thinking...\n```json\n{\"content\":\"draft\"}\n```\nrevised:\n```json\n{\"handoff\":\"architect\"}\n```\n";
        let result = parse_turn_result(raw).expect("parse");
        assert_eq!(result, TurnResult::handoff("architect"));
    }

    #[test]
    fn falls_back_to_outer_braces() {
        let raw = "Here you go: {\"tool_calls\":[{\"tool\":\"lint\",\"result\":{\"warnings\":0}}]} bye";
        let result = parse_turn_result(raw).expect("parse");
        assert_eq!(
            result.tool_calls,
            vec![ToolCall::new("lint", serde_json::json!({"warnings": 0}))]
        );
    }

    #[test]
    fn rejects_schema_violations() {
        let err = parse_turn_result(r#"{"content":"x","extra":true}"#).unwrap_err();
        assert!(err.to_string().contains("violates schema"));

        let err = parse_turn_result(r#"{"tool_calls":[{"tool":"lint"}]}"#).unwrap_err();
        assert!(err.to_string().contains("violates schema"));
    }

    #[test]
    fn rejects_output_without_json() {
        let err = parse_turn_result("I could not decide.").unwrap_err();
        assert!(err.to_string().contains("no JSON object"));
    }

    #[test]
    fn functions_are_collaborators() {
        fn shout(turn: &Turn<'_>) -> Result<TurnResult> {
            Ok(TurnResult::content(turn.input.to_uppercase()))
        }

        let agent = Agent::new("a", "", "");
        let result = shout
            .process(&Turn {
                agent: &agent,
                handoffs: Vec::new(),
                input: "hi",
                iteration: 1,
            })
            .expect("process");
        assert_eq!(result.content.as_deref(), Some("HI"));
    }

    #[test]
    fn new_rejects_empty_command() {
        assert!(CommandCollaborator::new(Vec::new(), Duration::from_secs(1), 10).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn command_collaborator_reads_turn_from_stdout() {
        let collaborator = CommandCollaborator::new(
            vec![
                "sh".to_string(),
                "-c".to_string(),
                r#"cat >/dev/null; printf '{"content":"shipped","handoff":null,"tool_calls":[]}'"#
                    .to_string(),
            ],
            Duration::from_secs(10),
            10_000,
        )
        .expect("collaborator");
        let agent = Agent::new("programmer", "implement software", "Write code.");

        let result = collaborator
            .process(&Turn {
                agent: &agent,
                handoffs: Vec::new(),
                input: "build it",
                iteration: 1,
            })
            .expect("process");
        assert_eq!(result, TurnResult::content("shipped"));
    }

    #[cfg(unix)]
    #[test]
    fn command_collaborator_surfaces_non_zero_exit() {
        let collaborator = CommandCollaborator::new(
            vec![
                "sh".to_string(),
                "-c".to_string(),
                "cat >/dev/null; echo boom >&2; exit 3".to_string(),
            ],
            Duration::from_secs(10),
            10_000,
        )
        .expect("collaborator");
        let agent = Agent::new("programmer", "", "");

        let err = collaborator
            .process(&Turn {
                agent: &agent,
                handoffs: Vec::new(),
                input: "build it",
                iteration: 1,
            })
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Some(3)"));
        assert!(message.contains("boom"));
    }
}
