//! Test fixtures for common CONFIG_DB content
//!
//! Provides reusable rows for the tables the syslog CLI reads and writes

use sonic_cli_common::FieldValues;

/// Configuration change operation type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOp {
    /// SET operation (add or replace)
    Set,
    /// DEL operation (delete)
    Del,
}

/// Represents a CONFIG_DB change
#[derive(Debug, Clone)]
pub struct ConfigChange {
    /// Table name (e.g., "FEATURE", "VRF", "SYSLOG_SERVER")
    pub table: String,
    /// Key within the table
    pub key: String,
    /// Operation type
    pub op: ConfigOp,
    /// Field-value pairs (for SET operations), in insertion order
    pub fields: FieldValues,
}

impl ConfigChange {
    /// Create a SET operation
    pub fn set(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            key: key.into(),
            op: ConfigOp::Set,
            fields: Vec::new(),
        }
    }

    /// Create a DEL operation
    pub fn del(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            key: key.into(),
            op: ConfigOp::Del,
            fields: Vec::new(),
        }
    }

    /// Add a field to a SET operation
    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((field.into(), value.into()));
        self
    }
}

/// FEATURE table fixtures
pub mod feature_fixtures {
    use super::*;

    fn flag(value: bool) -> &'static str {
        if value {
            "True"
        } else {
            "False"
        }
    }

    /// Feature row with explicit scope flags and rate-limit support
    pub fn feature(name: &str, global: bool, per_asic: bool, rate_limit: bool) -> ConfigChange {
        ConfigChange::set("FEATURE", name)
            .with_field("state", "enabled")
            .with_field("has_global_scope", flag(global))
            .with_field("has_per_asic_scope", flag(per_asic))
            .with_field("support_syslog_rate_limit", flag(rate_limit))
    }

    /// Host-only feature supporting rate limiting (e.g. `snmp`)
    pub fn global_feature(name: &str) -> ConfigChange {
        feature(name, true, false, true)
    }

    /// Per-ASIC-only feature supporting rate limiting (e.g. `bgp`)
    pub fn per_asic_feature(name: &str) -> ConfigChange {
        feature(name, false, true, true)
    }

    /// Feature present in both scopes (e.g. `database`)
    pub fn dual_scope_feature(name: &str) -> ConfigChange {
        feature(name, true, true, true)
    }

    /// Feature without syslog rate-limit support
    pub fn unsupported_feature(name: &str) -> ConfigChange {
        feature(name, true, false, false)
    }
}

/// SYSLOG_SERVER, VRF, MGMT_VRF_CONFIG and LOGGER fixtures
pub mod syslog_fixtures {
    use super::*;

    /// Remote syslog server without options
    pub fn server(ip: &str) -> ConfigChange {
        ConfigChange::set("SYSLOG_SERVER", ip)
    }

    /// Data-plane VRF
    pub fn data_vrf(name: &str) -> ConfigChange {
        ConfigChange::set("VRF", name)
    }

    /// Management VRF global switch
    pub fn mgmt_vrf(enabled: bool) -> ConfigChange {
        ConfigChange::set("MGMT_VRF_CONFIG", "vrf_global")
            .with_field("mgmtVrfEnabled", if enabled { "true" } else { "false" })
    }

    /// Logger row, optionally requiring a SIGHUP to reload
    pub fn logger(identifier: &str, level: &str, manual_refresh: bool) -> ConfigChange {
        let change = ConfigChange::set("LOGGER", identifier)
            .with_field("LOGLEVEL", level)
            .with_field("LOGOUTPUT", "SYSLOG");
        if manual_refresh {
            change.with_field("require_manual_refresh", "true")
        } else {
            change
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonic_cli_common::FieldValuesExt;

    #[test]
    fn test_config_change_set() {
        let change = ConfigChange::set("SYSLOG_SERVER", "10.0.0.5")
            .with_field("port", "514")
            .with_field("vrf", "default");

        assert_eq!(change.op, ConfigOp::Set);
        assert_eq!(change.table, "SYSLOG_SERVER");
        assert_eq!(change.key, "10.0.0.5");
        assert_eq!(change.fields.len(), 2);
        assert_eq!(change.fields.get_field("port"), Some("514"));
    }

    #[test]
    fn test_config_change_del() {
        let change = ConfigChange::del("VRF", "Vrf_data");

        assert_eq!(change.op, ConfigOp::Del);
        assert!(change.fields.is_empty());
        assert_eq!(change.table, "VRF");
    }

    #[test]
    fn test_feature_fixtures() {
        let bgp = feature_fixtures::per_asic_feature("bgp");
        assert!(!bgp.fields.is_true("has_global_scope"));
        assert!(bgp.fields.is_true("has_per_asic_scope"));
        assert!(bgp.fields.is_true("support_syslog_rate_limit"));

        let pmon = feature_fixtures::unsupported_feature("pmon");
        assert!(!pmon.fields.is_true("support_syslog_rate_limit"));
    }

    #[test]
    fn test_syslog_fixtures() {
        let mgmt = syslog_fixtures::mgmt_vrf(true);
        assert_eq!(mgmt.fields.get_field("mgmtVrfEnabled"), Some("true"));

        let logger = syslog_fixtures::logger("orchagent", "NOTICE", true);
        assert!(logger.fields.is_true("require_manual_refresh"));
        let logger = syslog_fixtures::logger("orchagent", "NOTICE", false);
        assert!(!logger.fields.has_field("require_manual_refresh"));
    }
}
