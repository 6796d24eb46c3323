//! Syslog configuration CLI for SONiC
//!
//! Implements `config syslog`: remote syslog servers with source address
//! and VRF validation, host and container rate limits, the containercfgd
//! rate limit feature, and per-module log levels.

pub mod cli;
pub mod config;
mod commands;
mod error;
pub mod features;
pub mod logging;
pub mod netstate;
mod syslog_mgr;
mod tables;
mod types;
pub mod validators;

pub use commands::*;
pub use error::{Field, Result, SyslogError, ValidationError};
pub use netstate::{IpInspector, NetworkInspector, NetworkSnapshot};
pub use syslog_mgr::SyslogMgr;
pub use tables::*;
pub use types::*;
