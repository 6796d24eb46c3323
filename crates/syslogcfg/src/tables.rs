//! Database table name constants for the syslog CLI

// CONFIG_DB tables
/// Remote syslog server table in CONFIG_DB
pub const CFG_SYSLOG_SERVER_TABLE_NAME: &str = "SYSLOG_SERVER";

/// Host syslog settings table in CONFIG_DB
pub const CFG_SYSLOG_CONFIG_TABLE_NAME: &str = "SYSLOG_CONFIG";

/// Per-container syslog settings table in CONFIG_DB
pub const CFG_SYSLOG_CONFIG_FEATURE_TABLE_NAME: &str = "SYSLOG_CONFIG_FEATURE";

/// Data-plane VRF table in CONFIG_DB
pub const CFG_VRF_TABLE_NAME: &str = "VRF";

/// Management VRF configuration table in CONFIG_DB
pub const CFG_MGMT_VRF_CONFIG_TABLE_NAME: &str = "MGMT_VRF_CONFIG";

/// Feature (container) table in CONFIG_DB
pub const CFG_FEATURE_TABLE_NAME: &str = "FEATURE";

/// Per-module log level table in CONFIG_DB
pub const CFG_LOGGER_TABLE_NAME: &str = "LOGGER";

// Well-known keys
/// Key of the host row in SYSLOG_CONFIG
pub const SYSLOG_CONFIG_GLOBAL_KEY: &str = "GLOBAL";

/// Key of the global row in MGMT_VRF_CONFIG
pub const MGMT_VRF_GLOBAL_KEY: &str = "vrf_global";

/// Field names used in CONFIG_DB
pub mod fields {
    /// Syslog source IP address
    pub const SOURCE: &str = "source";

    /// Syslog server UDP port
    pub const PORT: &str = "port";

    /// Syslog VRF device
    pub const VRF: &str = "vrf";

    /// Management VRF enabled field
    pub const MGMT_VRF_ENABLED: &str = "mgmtVrfEnabled";

    /// Rate limit interval in seconds
    pub const RATE_LIMIT_INTERVAL: &str = "rate_limit_interval";

    /// Rate limit burst in messages
    pub const RATE_LIMIT_BURST: &str = "rate_limit_burst";

    /// Feature supports syslog rate limiting
    pub const SUPPORT_RATE_LIMIT: &str = "support_syslog_rate_limit";

    /// Feature runs a host (global) instance
    pub const HAS_GLOBAL_SCOPE: &str = "has_global_scope";

    /// Feature runs one instance per ASIC
    pub const HAS_PER_ASIC_SCOPE: &str = "has_per_asic_scope";

    /// Logger level
    pub const LOGLEVEL: &str = "LOGLEVEL";

    /// Logger needs a SIGHUP to pick up a new level
    pub const REQUIRE_MANUAL_REFRESH: &str = "require_manual_refresh";
}
