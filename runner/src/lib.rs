//! Agent handoff runner.
//!
//! A request is transformed into a final result by a sequence of agents:
//! control passes from one agent to another (handoff), and an agent may report
//! tool results that are folded back into its next input. The crate enforces a
//! strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (agent graph, turn results, the
//!   loop state machine). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config, child processes, prompt
//!   rendering, output files).
//!
//! Orchestration modules ([`runner`], [`pipeline`], [`dev`]) coordinate core
//! logic with I/O to implement CLI commands.

pub mod core;
pub mod dev;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod pipeline;
pub mod runner;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
