//! Stable exit codes for agilemind CLI commands.

/// Command succeeded; for `dev`, the run resolved with final content.
pub const OK: i32 = 0;
/// Command failed: invalid config, collaborator failure, refused handoff, I/O error.
pub const INVALID: i32 = 1;
/// `dev` hit the iteration cap without resolution (output is still written).
pub const EXHAUSTED: i32 = 2;
