//! Type definitions for the syslog CLI

use std::fmt;
use std::net::IpAddr;

use clap::ValueEnum;
use sonic_cli_common::{FieldValues, FieldValuesExt};

use crate::tables::fields;

/// VRF name that is always accepted and never looked up in Linux
pub const DEFAULT_VRF: &str = "default";

/// Management VRF name
pub const MGMT_VRF: &str = "mgmt";

/// Namespace argument selecting the host (global) scope
pub const DEFAULT_NAMESPACE_ARG: &str = "default";

/// Largest accepted rate limit interval or burst
pub const RATE_LIMIT_MAX: u32 = 2_147_483_647;

/// Shown in audit messages for options that were not given
const NOT_AVAILABLE: &str = "N/A";

/// Remote syslog server entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyslogServer {
    /// Server address; its text form is the CONFIG_DB key
    pub server: IpAddr,
    /// Source address for outgoing messages
    pub source: Option<IpAddr>,
    /// UDP port
    pub port: Option<u16>,
    /// VRF used to reach the server
    pub vrf: Option<String>,
}

impl SyslogServer {
    /// Create an entry without options
    pub fn new(server: IpAddr) -> Self {
        Self {
            server,
            source: None,
            port: None,
            vrf: None,
        }
    }

    /// CONFIG_DB key
    pub fn key(&self) -> String {
        self.server.to_string()
    }

    /// Row written to SYSLOG_SERVER; only given options are stored
    pub fn to_field_values(&self) -> FieldValues {
        let mut fvs = FieldValues::new();
        if let Some(source) = &self.source {
            fvs.push((fields::SOURCE.to_string(), source.to_string()));
        }
        if let Some(port) = self.port {
            fvs.push((fields::PORT.to_string(), port.to_string()));
        }
        if let Some(vrf) = &self.vrf {
            fvs.push((fields::VRF.to_string(), vrf.clone()));
        }
        fvs
    }

    /// `server=..,source=..,port=..,vrf=..` with `N/A` for absent options
    pub fn describe(&self) -> String {
        format!(
            "server={},source={},port={},vrf={}",
            self.server,
            self.source
                .map(|s| s.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            self.port
                .map(|p| p.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            self.vrf.as_deref().unwrap_or(NOT_AVAILABLE),
        )
    }
}

/// Syslog rate limit settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimit {
    /// Interval in seconds
    pub interval: Option<u32>,
    /// Messages allowed per interval
    pub burst: Option<u32>,
}

impl RateLimit {
    pub fn new(interval: Option<u32>, burst: Option<u32>) -> Self {
        Self { interval, burst }
    }

    /// True when at least one value is given
    pub fn is_set(&self) -> bool {
        self.interval.is_some() || self.burst.is_some()
    }

    /// Fields merged into the target row
    pub fn to_field_values(&self) -> FieldValues {
        let mut fvs = FieldValues::new();
        if let Some(interval) = self.interval {
            fvs.push((fields::RATE_LIMIT_INTERVAL.to_string(), interval.to_string()));
        }
        if let Some(burst) = self.burst {
            fvs.push((fields::RATE_LIMIT_BURST.to_string(), burst.to_string()));
        }
        fvs
    }

    pub fn describe(&self) -> String {
        format!(
            "interval={},burst={}",
            self.interval
                .map(|i| i.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            self.burst
                .map(|b| b.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        )
    }
}

/// Log level accepted by `syslog level`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    #[value(name = "DEBUG")]
    Debug,
    #[value(name = "INFO")]
    Info,
    #[value(name = "NOTICE")]
    Notice,
    #[value(name = "WARN")]
    Warn,
    #[value(name = "ERROR")]
    Error,
}

impl LogLevel {
    /// Value stored in `LOGGER|<id>` `LOGLEVEL`
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Notice => "NOTICE",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feature scope a service instance runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Host instance (`bgp`)
    Global,
    /// One instance per ASIC (`bgp0`, `bgp1`)
    PerAsic,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => f.write_str("global"),
            Scope::PerAsic => f.write_str("per-ASIC"),
        }
    }
}

/// Namespaces a rate-limit command applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceScope {
    /// No `-n`: every namespace
    All,
    /// `-n default`: host only
    Default,
    /// `-n asicN`
    Asic(u32),
}

/// FEATURE row flags relevant to rate limiting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureDescriptor {
    pub name: String,
    pub has_global_scope: bool,
    pub has_per_asic_scope: bool,
    pub support_rate_limit: bool,
}

impl FeatureDescriptor {
    /// Build from a FEATURE row; missing flags read as false
    pub fn from_row(name: impl Into<String>, row: &FieldValues) -> Self {
        Self {
            name: name.into(),
            has_global_scope: row.is_true(fields::HAS_GLOBAL_SCOPE),
            has_per_asic_scope: row.is_true(fields::HAS_PER_ASIC_SCOPE),
            support_rate_limit: row.is_true(fields::SUPPORT_RATE_LIMIT),
        }
    }

    /// True if the feature has an instance in `scope`
    pub fn in_scope(&self, scope: Scope) -> bool {
        match scope {
            Scope::Global => self.has_global_scope,
            Scope::PerAsic => self.has_per_asic_scope,
        }
    }
}

/// `rate-limit-feature` action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureAction {
    Enable,
    Disable,
}

impl FeatureAction {
    /// Progress verb (`Enabling`)
    pub fn progressive(&self) -> &'static str {
        match self {
            FeatureAction::Enable => "Enabling",
            FeatureAction::Disable => "Disabling",
        }
    }

    /// Completion verb (`Enabled`)
    pub fn past(&self) -> &'static str {
        match self {
            FeatureAction::Enable => "Enabled",
            FeatureAction::Disable => "Disabled",
        }
    }

    /// Imperative (`Enable`) used in failure messages
    pub fn imperative(&self) -> &'static str {
        match self {
            FeatureAction::Enable => "Enable",
            FeatureAction::Disable => "Disable",
        }
    }
}

/// Arguments of `syslog level`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRequest {
    pub identifier: String,
    pub level: LogLevel,
    pub container: Option<String>,
    pub program: Option<String>,
    pub pid: Option<u32>,
    pub namespace: Option<String>,
}

impl LevelRequest {
    pub fn new(identifier: impl Into<String>, level: LogLevel) -> Self {
        Self {
            identifier: identifier.into(),
            level,
            container: None,
            program: None,
            pid: None,
            namespace: None,
        }
    }

    /// True when the target process should be signalled
    pub fn wants_signal(&self) -> bool {
        self.program.is_some() || self.pid.is_some()
    }
}
