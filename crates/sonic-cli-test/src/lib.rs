//! Test infrastructure for SONiC configuration CLI utilities
//!
//! Provides:
//! - In-memory CONFIG_DB ([`MemoryConfigDb`])
//! - Scripted command execution ([`ScriptedRunner`])
//! - Captured console output ([`SharedBuffer`])
//! - CONFIG_DB fixtures for common tables
//! - Verification helpers for database state and executed commands

pub mod fixtures;
mod memory_db;
mod output;
mod runner;
mod verification;

pub use fixtures::*;
pub use memory_db::MemoryConfigDb;
pub use output::SharedBuffer;
pub use runner::ScriptedRunner;
pub use verification::*;
