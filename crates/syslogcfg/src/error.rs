//! Error types for the syslog CLI
//!
//! Validation failures are plain values describing the offending parameter
//! and value; their `Display` output is the operator-facing message.

use std::fmt;
use std::net::IpAddr;

use sonic_cli_common::SonicError;
use thiserror::Error;

use crate::types::Scope;

/// Command-line parameter a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ServerIpAddress,
    Source,
    Port,
    Vrf,
    ServiceName,
    Namespace,
    Interval,
    Burst,
    Container,
    Program,
    Pid,
}

impl Field {
    /// Parameter as shown in usage messages.
    pub fn hint(&self) -> &'static str {
        match self {
            Field::ServerIpAddress => "'SERVER_IP_ADDRESS'",
            Field::Source => "'-s' / '--source'",
            Field::Port => "'-p' / '--port'",
            Field::Vrf => "'-r' / '--vrf'",
            Field::ServiceName => "'SERVICE_NAME'",
            Field::Namespace => "'-n' / '--namespace'",
            Field::Interval => "'-i' / '--interval'",
            Field::Burst => "'-b' / '--burst'",
            Field::Container => "'--container'",
            Field::Program => "'--program'",
            Field::Pid => "'--pid'",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hint())
    }
}

fn quoted(choices: &[String]) -> String {
    choices
        .iter()
        .map(|c| format!("'{}'", c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// User input rejected before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid value for {field}: '{value}' does not appear to be an IPv4 or IPv6 address")]
    InvalidIpAddress { field: Field, value: String },

    #[error("Invalid value for {}: {server} is a valid syslog server", Field::ServerIpAddress)]
    ServerExists { server: IpAddr },

    #[error("Invalid value for {}: {server} is not a valid syslog server", Field::ServerIpAddress)]
    ServerNotFound { server: IpAddr },

    #[error("Invalid value for {}: {address} is a loopback/multicast/link-local IP address", Field::Source)]
    InvalidSourceScope { address: IpAddr },

    #[error(
        "Invalid value for {} / {}: {server} / {address} IP address family mismatch",
        Field::ServerIpAddress,
        Field::Source
    )]
    FamilyMismatch { server: IpAddr, address: IpAddr },

    #[error("Invalid value for {}: '{value}' is not one of {}.", Field::Vrf, quoted(.choices))]
    InvalidVrfChoice { value: String, choices: Vec<String> },

    #[error("Invalid value for {}: mgmt VRF is not enabled", Field::Vrf)]
    MgmtVrfDisabled,

    #[error("Invalid value for {}: {vrf} VRF doesn't exist in Linux", Field::Vrf)]
    VrfNotFoundInLinux { vrf: String },

    #[error("Invalid value for {}: {address} IP doesn't exist in Linux {vrf} VRF", Field::Source)]
    AddressNotInVrf { address: IpAddr, vrf: String },

    #[error("Invalid value for {}: {address} IP doesn't exist in Linux default VRF", Field::Source)]
    AddressNotInDefaultVrf { address: IpAddr },

    #[error("Either interval or burst must be configured")]
    RateLimitUnset,

    #[error("Invalid service name {service}, please choose from: {}", .choices.join(","))]
    UnknownService { service: String, choices: Vec<String> },

    #[error(
        "Invalid service name {service} for {scope} scope, please choose from: {}",
        .choices.join(",")
    )]
    ServiceNotInScope {
        service: String,
        scope: Scope,
        choices: Vec<String>,
    },

    #[error("Invalid value for {}: '{value}' is not one of {}.", Field::Namespace, quoted(.choices))]
    InvalidNamespace { value: String, choices: Vec<String> },

    #[error("--program must be specified with --container")]
    ProgramWithoutContainer,

    #[error("--container must be specified with --pid or --program")]
    ContainerWithoutTarget,
}

impl ValidationError {
    /// Parameter holding the offending value, when there is a single one.
    pub fn field(&self) -> Option<Field> {
        match self {
            ValidationError::InvalidIpAddress { field, .. } => Some(*field),
            ValidationError::ServerExists { .. } | ValidationError::ServerNotFound { .. } => {
                Some(Field::ServerIpAddress)
            }
            ValidationError::InvalidSourceScope { .. }
            | ValidationError::FamilyMismatch { .. }
            | ValidationError::AddressNotInVrf { .. }
            | ValidationError::AddressNotInDefaultVrf { .. } => Some(Field::Source),
            ValidationError::InvalidVrfChoice { .. }
            | ValidationError::MgmtVrfDisabled
            | ValidationError::VrfNotFoundInLinux { .. } => Some(Field::Vrf),
            ValidationError::UnknownService { .. }
            | ValidationError::ServiceNotInScope { .. } => Some(Field::ServiceName),
            ValidationError::InvalidNamespace { .. } => Some(Field::Namespace),
            ValidationError::ProgramWithoutContainer => Some(Field::Program),
            ValidationError::ContainerWithoutTarget => Some(Field::Container),
            ValidationError::RateLimitUnset => None,
        }
    }

    /// Offending value as typed by the operator, if any.
    pub fn value(&self) -> Option<String> {
        match self {
            ValidationError::InvalidIpAddress { value, .. }
            | ValidationError::InvalidVrfChoice { value, .. }
            | ValidationError::InvalidNamespace { value, .. } => Some(value.clone()),
            ValidationError::ServerExists { server } | ValidationError::ServerNotFound { server } => {
                Some(server.to_string())
            }
            ValidationError::InvalidSourceScope { address }
            | ValidationError::FamilyMismatch { address, .. }
            | ValidationError::AddressNotInVrf { address, .. }
            | ValidationError::AddressNotInDefaultVrf { address } => Some(address.to_string()),
            ValidationError::VrfNotFoundInLinux { vrf } => Some(vrf.clone()),
            ValidationError::MgmtVrfDisabled => Some("mgmt".to_string()),
            ValidationError::UnknownService { service, .. }
            | ValidationError::ServiceNotInScope { service, .. } => Some(service.clone()),
            ValidationError::RateLimitUnset
            | ValidationError::ProgramWithoutContainer
            | ValidationError::ContainerWithoutTarget => None,
        }
    }

    /// True for malformed invocations; false for requests naming
    /// something the switch does not offer.
    pub fn is_usage_error(&self) -> bool {
        !matches!(
            self,
            ValidationError::UnknownService { .. } | ValidationError::ServiceNotInScope { .. }
        )
    }
}

/// Errors surfaced by syslog CLI commands.
#[derive(Debug, Error)]
pub enum SyslogError {
    /// Rejected user input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Linux network state could not be read.
    #[error("Failed to query network state with '{command}': {message}")]
    SystemQuery { command: String, message: String },

    /// Log level signal could not be delivered.
    #[error("Failed: {output}")]
    SignalFailed { output: String },

    /// Database or process failure.
    #[error(transparent)]
    Sonic(#[from] SonicError),
}

impl SyslogError {
    /// Creates a network-state query error.
    pub fn system_query(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SystemQuery {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Process exit code for this failure (2 for usage errors).
    pub fn exit_code(&self) -> u8 {
        match self {
            SyslogError::Validation(err) if err.is_usage_error() => 2,
            _ => 1,
        }
    }
}

/// Result type for syslog CLI operations
pub type Result<T> = std::result::Result<T, SyslogError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_invalid_ip_message() {
        let err = ValidationError::InvalidIpAddress {
            field: Field::Source,
            value: "10.0.0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for '-s' / '--source': '10.0.0' does not appear to be an IPv4 or IPv6 address"
        );
        assert_eq!(err.field(), Some(Field::Source));
        assert_eq!(err.value().as_deref(), Some("10.0.0"));
    }

    #[test]
    fn test_family_mismatch_message() {
        let err = ValidationError::FamilyMismatch {
            server: ip("10.0.0.5"),
            address: ip("fc00::1"),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for 'SERVER_IP_ADDRESS' / '-s' / '--source': 10.0.0.5 / fc00::1 IP address family mismatch"
        );
    }

    #[test]
    fn test_vrf_choice_message() {
        let err = ValidationError::InvalidVrfChoice {
            value: "Vrf_bad".to_string(),
            choices: vec!["default".to_string(), "Vrf_data".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for '-r' / '--vrf': 'Vrf_bad' is not one of 'default', 'Vrf_data'."
        );
        assert_eq!(err.field(), Some(Field::Vrf));
    }

    #[test]
    fn test_address_not_in_vrf_message() {
        let err = ValidationError::AddressNotInVrf {
            address: ip("10.0.0.2"),
            vrf: "Vrf_data".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for '-s' / '--source': 10.0.0.2 IP doesn't exist in Linux Vrf_data VRF"
        );
    }

    #[test]
    fn test_unknown_service_message() {
        let err = ValidationError::UnknownService {
            service: "foo".to_string(),
            choices: vec!["bgp".to_string(), "swss".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid service name foo, please choose from: bgp,swss"
        );
        assert!(!err.is_usage_error());
    }

    #[test]
    fn test_service_not_in_scope_message() {
        let err = ValidationError::ServiceNotInScope {
            service: "snmp".to_string(),
            scope: Scope::PerAsic,
            choices: vec!["bgp".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid service name snmp for per-ASIC scope, please choose from: bgp"
        );
    }

    #[test]
    fn test_exit_codes() {
        let usage: SyslogError = ValidationError::RateLimitUnset.into();
        assert_eq!(usage.exit_code(), 2);

        let service: SyslogError = ValidationError::UnknownService {
            service: "pmon".to_string(),
            choices: vec!["bgp".to_string()],
        }
        .into();
        assert_eq!(service.exit_code(), 1);

        let system = SyslogError::system_query("ip --json vrf show", "exit code 1");
        assert_eq!(system.exit_code(), 1);
        assert_eq!(
            system.to_string(),
            "Failed to query network state with 'ip --json vrf show': exit code 1"
        );
    }

    #[test]
    fn test_signal_failed_message() {
        let err = SyslogError::SignalFailed {
            output: "kill: (4242) - No such process".to_string(),
        };
        assert_eq!(err.to_string(), "Failed: kill: (4242) - No such process");
    }
}
