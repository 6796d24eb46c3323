//! Input validation for syslog commands
//!
//! The checks themselves are pure functions returning [`ValidationError`];
//! the async wrappers only gather the CONFIG_DB and Linux state they need.

use std::net::IpAddr;

use sonic_cli_common::{ConfigDb, FieldValuesExt, Platform, SonicResult};
use tracing::debug;

use crate::error::{Field, Result, ValidationError};
use crate::netstate::{NetworkInspector, NetworkSnapshot};
use crate::tables::{
    fields, CFG_MGMT_VRF_CONFIG_TABLE_NAME, CFG_SYSLOG_SERVER_TABLE_NAME, CFG_VRF_TABLE_NAME,
    MGMT_VRF_GLOBAL_KEY,
};
use crate::types::{NamespaceScope, RateLimit, DEFAULT_NAMESPACE_ARG, DEFAULT_VRF, MGMT_VRF};

/// Parses an IPv4 or IPv6 address given for `field`.
pub fn parse_ip(field: Field, value: &str) -> std::result::Result<IpAddr, ValidationError> {
    value
        .trim()
        .parse::<IpAddr>()
        .map_err(|_| ValidationError::InvalidIpAddress {
            field,
            value: value.to_string(),
        })
}

fn is_link_local(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => v4.is_link_local(),
        IpAddr::V6(v6) => (v6.segments()[0] & 0xffc0) == 0xfe80,
    }
}

/// Checks a source address against the server it will talk to.
pub fn validate_source(server: IpAddr, source: IpAddr) -> std::result::Result<(), ValidationError> {
    if source.is_loopback() || source.is_multicast() || is_link_local(&source) {
        return Err(ValidationError::InvalidSourceScope { address: source });
    }
    if server.is_ipv4() != source.is_ipv4() {
        return Err(ValidationError::FamilyMismatch {
            server,
            address: source,
        });
    }
    Ok(())
}

/// Checks that at least one rate limit value is given.
pub fn validate_rate_limit(limit: &RateLimit) -> std::result::Result<(), ValidationError> {
    if limit.is_set() {
        Ok(())
    } else {
        Err(ValidationError::RateLimitUnset)
    }
}

/// VRF names CONFIG_DB allows as a syslog VRF
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VrfChoices {
    pub mgmt_vrf_enabled: bool,
    pub data_vrfs: Vec<String>,
}

impl VrfChoices {
    pub fn new(mgmt_vrf_enabled: bool, data_vrfs: Vec<String>) -> Self {
        Self {
            mgmt_vrf_enabled,
            data_vrfs,
        }
    }

    /// Reads the management VRF switch and the VRF table.
    pub async fn load<D: ConfigDb + ?Sized>(db: &D) -> SonicResult<Self> {
        let mgmt_vrf_enabled = mgmt_vrf_enabled(db).await?;
        let data_vrfs = db.get_keys(CFG_VRF_TABLE_NAME).await?;
        Ok(Self::new(mgmt_vrf_enabled, data_vrfs))
    }

    /// Accepted values in display order.
    pub fn choices(&self) -> Vec<String> {
        let mut choices = vec![DEFAULT_VRF.to_string()];
        if self.mgmt_vrf_enabled {
            choices.push(MGMT_VRF.to_string());
        }
        choices.extend(self.data_vrfs.iter().cloned());
        choices
    }

    /// Checks `vrf` is one of the accepted values.
    pub fn validate(&self, vrf: &str) -> std::result::Result<(), ValidationError> {
        let choices = self.choices();
        if choices.iter().any(|c| c == vrf) {
            return Ok(());
        }
        if vrf == MGMT_VRF {
            return Err(ValidationError::MgmtVrfDisabled);
        }
        Err(ValidationError::InvalidVrfChoice {
            value: vrf.to_string(),
            choices,
        })
    }
}

/// Reads `MGMT_VRF_CONFIG|vrf_global` `mgmtVrfEnabled`.
pub async fn mgmt_vrf_enabled<D: ConfigDb + ?Sized>(db: &D) -> SonicResult<bool> {
    let entry = db
        .get_entry(CFG_MGMT_VRF_CONFIG_TABLE_NAME, MGMT_VRF_GLOBAL_KEY)
        .await?;
    Ok(entry.is_true(fields::MGMT_VRF_ENABLED))
}

/// Checks `source` and `vrf` against a captured network state.
///
/// Interfaces in the default VRF are all interfaces except VRF devices and
/// members of any VRF, including `mgmt`.
pub fn validate_source_in_vrf(
    snapshot: &NetworkSnapshot,
    source: Option<IpAddr>,
    vrf: Option<&str>,
) -> std::result::Result<(), ValidationError> {
    match vrf {
        Some(vrf) if vrf != DEFAULT_VRF => {
            if !snapshot.vrf_devices.contains(vrf) {
                return Err(ValidationError::VrfNotFoundInLinux {
                    vrf: vrf.to_string(),
                });
            }
            if let Some(address) = source {
                if !snapshot.vrf_addresses(vrf).contains(&address) {
                    return Err(ValidationError::AddressNotInVrf {
                        address,
                        vrf: vrf.to_string(),
                    });
                }
            }
        }
        _ => {
            if let Some(address) = source {
                if !snapshot.default_vrf_addresses().contains(&address) {
                    return Err(ValidationError::AddressNotInDefaultVrf { address });
                }
            }
        }
    }
    Ok(())
}

/// Checks `source` and `vrf` against live Linux state.
///
/// Nothing is queried when both are absent.
pub async fn check_source_in_vrf<N: NetworkInspector + ?Sized>(
    inspector: &N,
    source: Option<IpAddr>,
    vrf: Option<&str>,
) -> Result<()> {
    if source.is_none() && vrf.is_none() {
        return Ok(());
    }
    let snapshot = NetworkSnapshot::capture(inspector).await?;
    debug!(
        vrfs = snapshot.vrf_devices.len(),
        interfaces = snapshot.interface_addresses.len(),
        "Captured network state"
    );
    validate_source_in_vrf(&snapshot, source, vrf)?;
    Ok(())
}

/// Full `add` option check: address family, VRF choice, then Linux state.
pub async fn validate_server_options<N: NetworkInspector + ?Sized>(
    choices: &VrfChoices,
    inspector: &N,
    server: IpAddr,
    source: Option<IpAddr>,
    vrf: Option<&str>,
) -> Result<()> {
    if let Some(source) = source {
        validate_source(server, source)?;
    }
    if let Some(vrf) = vrf {
        choices.validate(vrf)?;
    }
    check_source_in_vrf(inspector, source, vrf).await
}

/// Checks whether `server` is (or is not) a configured syslog server.
pub async fn check_server<D: ConfigDb + ?Sized>(
    db: &D,
    server: IpAddr,
    should_exist: bool,
) -> Result<()> {
    let key = server.to_string();
    let exists = db
        .get_keys(CFG_SYSLOG_SERVER_TABLE_NAME)
        .await?
        .iter()
        .any(|k| *k == key);

    match (exists, should_exist) {
        (true, false) => Err(ValidationError::ServerExists { server }.into()),
        (false, true) => Err(ValidationError::ServerNotFound { server }.into()),
        _ => Ok(()),
    }
}

/// ASIC namespaces only exist on multi-ASIC platforms.
fn asic_namespace_id(namespace: &str, platform: &Platform) -> Option<u32> {
    if platform.is_multi_asic() {
        platform.asic_id(namespace)
    } else {
        None
    }
}

/// Parses `-n` for the rate-limit commands: ASIC namespaces or `default`.
pub fn parse_namespace_scope(
    namespace: Option<&str>,
    platform: &Platform,
) -> std::result::Result<NamespaceScope, ValidationError> {
    let Some(namespace) = namespace else {
        return Ok(NamespaceScope::All);
    };
    if namespace == DEFAULT_NAMESPACE_ARG {
        return Ok(NamespaceScope::Default);
    }
    match asic_namespace_id(namespace, platform) {
        Some(id) => Ok(NamespaceScope::Asic(id)),
        None => {
            let mut choices = platform.namespaces();
            choices.push(DEFAULT_NAMESPACE_ARG.to_string());
            Err(ValidationError::InvalidNamespace {
                value: namespace.to_string(),
                choices,
            })
        }
    }
}

/// Parses `-n` for `level`: ASIC namespaces only.
pub fn parse_asic_namespace(
    namespace: &str,
    platform: &Platform,
) -> std::result::Result<u32, ValidationError> {
    asic_namespace_id(namespace, platform).ok_or_else(|| ValidationError::InvalidNamespace {
        value: namespace.to_string(),
        choices: platform.namespaces(),
    })
}
