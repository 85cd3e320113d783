//! Deterministic, pure logic shared by the runner.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! agent descriptors and turn results and return deterministic outputs
//! suitable for tests.

pub mod agent;
pub mod graph;
pub mod state;
pub mod trace;
pub mod turn;
