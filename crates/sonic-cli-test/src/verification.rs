//! Verification helpers for testing CLI handlers
//!
//! Provides assertion helpers to verify CONFIG_DB state and command execution

use sonic_cli_common::FieldValuesExt;
use thiserror::Error;

use crate::{MemoryConfigDb, ScriptedRunner};

/// Verification error types
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Expected key '{key}' not found in CONFIG_DB")]
    KeyNotFound { key: String },

    #[error("Expected field '{field}' not found in key '{key}'")]
    FieldNotFound { key: String, field: String },

    #[error("Value mismatch for {key}:{field}: expected '{expected}', got '{actual}'")]
    ValueMismatch {
        key: String,
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Expected {expected} {what}, found {actual}")]
    CountMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// CONFIG_DB verification helper
pub struct DbVerifier<'a> {
    db: &'a MemoryConfigDb,
}

impl<'a> DbVerifier<'a> {
    /// Create a new CONFIG_DB verifier
    pub fn new(db: &'a MemoryConfigDb) -> Self {
        Self { db }
    }

    /// Verify that a row exists
    pub fn assert_key_exists(&self, table: &str, key: &str) -> VerifyResult<()> {
        match self.db.entry(table, key) {
            Some(_) => Ok(()),
            None => Err(VerificationError::KeyNotFound {
                key: format!("{}|{}", table, key),
            }),
        }
    }

    /// Verify that a row does not exist
    pub fn assert_key_not_exists(&self, table: &str, key: &str) -> VerifyResult<()> {
        match self.db.entry(table, key) {
            Some(_) => Err(VerificationError::ValueMismatch {
                key: format!("{}|{}", table, key),
                field: "exists".to_string(),
                expected: "false".to_string(),
                actual: "true".to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Verify that a row field has a specific value
    pub fn assert_field_value(
        &self,
        table: &str,
        key: &str,
        field: &str,
        expected: &str,
    ) -> VerifyResult<()> {
        let full_key = format!("{}|{}", table, key);
        let row = self
            .db
            .entry(table, key)
            .ok_or_else(|| VerificationError::KeyNotFound {
                key: full_key.clone(),
            })?;

        match row.get_field(field) {
            None => Err(VerificationError::FieldNotFound {
                key: full_key,
                field: field.to_string(),
            }),
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => Err(VerificationError::ValueMismatch {
                key: full_key,
                field: field.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
            }),
        }
    }

    /// Verify that a row field is absent
    pub fn assert_field_absent(&self, table: &str, key: &str, field: &str) -> VerifyResult<()> {
        let full_key = format!("{}|{}", table, key);
        let row = self
            .db
            .entry(table, key)
            .ok_or_else(|| VerificationError::KeyNotFound {
                key: full_key.clone(),
            })?;
        match row.get_field(field) {
            None => Ok(()),
            Some(actual) => Err(VerificationError::ValueMismatch {
                key: full_key,
                field: field.to_string(),
                expected: "<absent>".to_string(),
                actual: actual.to_string(),
            }),
        }
    }
}

/// Command execution verifier
pub struct CommandVerifier {
    captured_commands: Vec<String>,
}

impl CommandVerifier {
    /// Create a verifier from the commands a [`ScriptedRunner`] has seen
    pub fn from_runner(runner: &ScriptedRunner) -> Self {
        Self::new(runner.command_lines())
    }

    /// Create a new command verifier
    pub fn new(captured_commands: Vec<String>) -> Self {
        Self { captured_commands }
    }

    /// Verify that a specific command was executed
    pub fn assert_command_executed(&self, expected: &str) -> VerifyResult<()> {
        if self
            .captured_commands
            .iter()
            .any(|cmd| cmd.contains(expected))
        {
            Ok(())
        } else {
            Err(VerificationError::ValueMismatch {
                key: "command_list".to_string(),
                field: "executed".to_string(),
                expected: expected.to_string(),
                actual: format!("{:?}", self.captured_commands),
            })
        }
    }

    /// Verify that a command was NOT executed
    pub fn assert_command_not_executed(&self, expected: &str) -> VerifyResult<()> {
        if self
            .captured_commands
            .iter()
            .any(|cmd| cmd.contains(expected))
        {
            Err(VerificationError::ValueMismatch {
                key: "command_list".to_string(),
                field: "not_executed".to_string(),
                expected: "not present".to_string(),
                actual: expected.to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Verify the number of commands executed
    pub fn assert_command_count(&self, expected: usize) -> VerifyResult<()> {
        let actual = self.captured_commands.len();
        if actual != expected {
            Err(VerificationError::CountMismatch {
                what: "commands".to_string(),
                expected,
                actual,
            })
        } else {
            Ok(())
        }
    }

    /// Get all captured commands
    pub fn captured_commands(&self) -> &[String] {
        &self.captured_commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syslog_fixtures;

    #[test]
    fn test_command_verifier() {
        let commands = vec![
            "systemctl reset-failed rsyslog-config rsyslog".to_string(),
            "systemctl restart rsyslog-config".to_string(),
        ];

        let verifier = CommandVerifier::new(commands);

        assert!(verifier.assert_command_executed("restart rsyslog-config").is_ok());
        assert!(verifier.assert_command_not_executed("docker").is_ok());
        assert!(verifier.assert_command_count(2).is_ok());

        assert!(verifier.assert_command_count(3).is_err());
        assert!(verifier.assert_command_executed("nonexistent").is_err());
    }

    #[test]
    fn test_db_verifier() {
        let db = MemoryConfigDb::new().with_changes([
            syslog_fixtures::server("10.0.0.5").with_field("port", "514"),
        ]);
        let verifier = DbVerifier::new(&db);

        assert!(verifier.assert_key_exists("SYSLOG_SERVER", "10.0.0.5").is_ok());
        assert!(verifier.assert_key_not_exists("SYSLOG_SERVER", "10.0.0.6").is_ok());
        assert!(verifier
            .assert_field_value("SYSLOG_SERVER", "10.0.0.5", "port", "514")
            .is_ok());
        assert!(verifier
            .assert_field_value("SYSLOG_SERVER", "10.0.0.5", "port", "515")
            .is_err());
        assert!(verifier
            .assert_field_absent("SYSLOG_SERVER", "10.0.0.5", "vrf")
            .is_ok());
    }
}
