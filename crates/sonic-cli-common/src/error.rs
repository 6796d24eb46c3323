//! Error types for SONiC CLI infrastructure.
//!
//! This module defines the error types shared by the configuration CLI
//! crates. All errors implement `std::error::Error` via `thiserror`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for common CLI operations.
pub type SonicResult<T> = Result<T, SonicError>;

/// Errors raised by the shared shell, database and platform helpers.
#[derive(Debug, Error)]
pub enum SonicError {
    /// Failed to launch an external command (spawn error).
    #[error("Failed to execute command '{command}': {source}")]
    ShellExec {
        /// The command that failed to launch.
        command: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// External command returned non-zero exit code.
    #[error("Command failed: '{command}' (exit code {exit_code}): {output}")]
    ShellCommandFailed {
        /// The command that failed.
        command: String,
        /// The exit code.
        exit_code: i32,
        /// Combined stdout/stderr output.
        output: String,
    },

    /// Redis/database operation failed.
    #[error("Database operation failed: {operation}: {message}")]
    Database {
        /// The operation that failed (e.g., "hgetall", "keys", "connect").
        operation: String,
        /// Error message.
        message: String,
    },

    /// SONiC database configuration file is missing or malformed.
    #[error("Invalid database config '{}': {message}", path.display())]
    DbConfig {
        /// The offending file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Internal error (unexpected state).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl SonicError {
    /// Creates a database error.
    pub fn database(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Database {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates a database configuration error.
    pub fn db_config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::DbConfig {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<redis::RedisError> for SonicError {
    fn from(err: redis::RedisError) -> Self {
        Self::Database {
            operation: "redis".to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error() {
        let err = SonicError::database("hgetall", "Connection refused");
        assert_eq!(
            err.to_string(),
            "Database operation failed: hgetall: Connection refused"
        );
    }

    #[test]
    fn test_shell_command_failed() {
        let err = SonicError::ShellCommandFailed {
            command: "systemctl restart rsyslog-config".to_string(),
            exit_code: 5,
            output: "Unit not found".to_string(),
        };
        assert!(err.to_string().contains("systemctl restart"));
        assert!(err.to_string().contains("exit code 5"));
    }

    #[test]
    fn test_db_config_error() {
        let err = SonicError::db_config("/var/run/redis/sonic-db/database_config.json", "missing");
        assert_eq!(
            err.to_string(),
            "Invalid database config '/var/run/redis/sonic-db/database_config.json': missing"
        );
    }

    #[test]
    fn test_internal_error() {
        assert_eq!(
            SonicError::internal("bug").to_string(),
            "Internal error: bug"
        );
    }
}
