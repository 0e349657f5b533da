// ABOUTME: Library root for redeploy - exposes the sequencer and its seams for testing.
// ABOUTME: The main binary is in main.rs.

pub mod compose;
pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod exec;
pub mod inspect;
pub mod output;
pub mod probe;
