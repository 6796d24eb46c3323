//! Common infrastructure for SONiC configuration CLI utilities.
//!
//! This crate provides shared functionality for the Rust `config`
//! sub-utilities:
//!
//! - [`shell`]: External command execution from argument vectors
//! - [`db`]: The [`ConfigDb`] abstraction and per-namespace [`DbClients`]
//! - [`redis_db`]: Redis-backed CONFIG_DB client
//! - [`db_config`]: `database_config.json` / `database_global.json` parsing
//! - [`platform`]: Multi-ASIC topology detection
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```ignore
//! use sonic_cli_common::shell::{self, argv};
//! use sonic_cli_common::{CommandRunner, SonicResult, SystemRunner};
//!
//! async fn restart_rsyslog() -> SonicResult<()> {
//!     let cmd = argv(["systemctl", "restart", "rsyslog-config"]);
//!     shell::check(&cmd, SystemRunner.run(&cmd).await?)?;
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod db_config;
pub mod error;
pub mod platform;
pub mod redis_db;
pub mod shell;

// Re-export commonly used items at crate root
pub use db::{ConfigDb, DbClients, FieldValue, FieldValues, FieldValuesExt, Table};
pub use db_config::{DbConfig, GlobalDbConfig};
pub use error::{SonicError, SonicResult};
pub use platform::{Platform, PlatformPaths, DEFAULT_NAMESPACE};
pub use redis_db::RedisConfigDb;
pub use shell::{CommandRunner, ExecResult, SystemRunner};
