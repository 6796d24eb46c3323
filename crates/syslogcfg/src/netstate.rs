//! Linux network state as reported by `ip --json`
//!
//! Every query runs one `ip` invocation and nothing is cached between calls.
//! [`NetworkSnapshot`] holds the result of all three queries and can stand
//! in for a live inspector.

use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sonic_cli_common::shell::{argv, command_line, IP_CMD};
use sonic_cli_common::CommandRunner;
use tracing::{debug, instrument};

use crate::error::{Result, SyslogError};

/// VRF device name to member interface names
pub type VrfMembers = BTreeMap<String, Vec<String>>;

/// Interface name to configured addresses
pub type InterfaceAddresses = BTreeMap<String, Vec<IpAddr>>;

/// Read-only view of Linux VRF and address configuration.
#[async_trait]
pub trait NetworkInspector: Send + Sync {
    /// Names of all VRF devices.
    async fn list_vrf_devices(&self) -> Result<BTreeSet<String>>;

    /// Member interfaces of each VRF in `vrfs`.
    async fn list_vrf_members(&self, vrfs: &BTreeSet<String>) -> Result<VrfMembers>;

    /// IPv4 and IPv6 addresses of every interface.
    async fn list_interface_addresses(&self) -> Result<InterfaceAddresses>;
}

#[derive(Debug, Deserialize)]
struct VrfEntry {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LinkEntry {
    ifname: Option<String>,
    #[serde(default)]
    addr_info: Vec<AddrInfo>,
}

#[derive(Debug, Deserialize)]
struct AddrInfo {
    local: Option<String>,
}

/// [`NetworkInspector`] running the `ip` utility
#[derive(Debug, Clone)]
pub struct IpInspector<R> {
    runner: R,
}

impl<R: CommandRunner> IpInspector<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Runs `ip --json <args>` and decodes its array output.
    async fn query<T: DeserializeOwned>(&self, args: &[&str]) -> Result<Vec<T>> {
        let cmd = argv([IP_CMD, "--json"].iter().chain(args.iter()).copied());
        let cmd_str = command_line(&cmd);

        let result = self
            .runner
            .run(&cmd)
            .await
            .map_err(|e| SyslogError::system_query(&cmd_str, e.to_string()))?;
        if !result.success() {
            return Err(SyslogError::system_query(
                &cmd_str,
                format!("exit code {}: {}", result.exit_code, result.combined_output()),
            ));
        }

        let stdout = result.stdout.trim();
        if stdout.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(stdout).map_err(|e| SyslogError::system_query(&cmd_str, e.to_string()))
    }
}

#[async_trait]
impl<R: CommandRunner> NetworkInspector for IpInspector<R> {
    #[instrument(skip(self))]
    async fn list_vrf_devices(&self) -> Result<BTreeSet<String>> {
        let entries: Vec<VrfEntry> = self.query(&["vrf", "show"]).await?;
        Ok(entries.into_iter().filter_map(|e| e.name).collect())
    }

    #[instrument(skip(self))]
    async fn list_vrf_members(&self, vrfs: &BTreeSet<String>) -> Result<VrfMembers> {
        let mut members = VrfMembers::new();
        for vrf in vrfs {
            let entries: Vec<LinkEntry> = self.query(&["link", "show", "vrf", vrf]).await?;
            members.insert(
                vrf.clone(),
                entries.into_iter().filter_map(|e| e.ifname).collect(),
            );
        }
        Ok(members)
    }

    #[instrument(skip(self))]
    async fn list_interface_addresses(&self) -> Result<InterfaceAddresses> {
        let entries: Vec<LinkEntry> = self.query(&["address", "show"]).await?;
        let mut addresses = InterfaceAddresses::new();
        for entry in entries {
            let Some(ifname) = entry.ifname else {
                continue;
            };
            let list = addresses.entry(ifname.clone()).or_default();
            for local in entry.addr_info.into_iter().filter_map(|a| a.local) {
                match local.parse::<IpAddr>() {
                    Ok(addr) => list.push(addr),
                    Err(_) => debug!(ifname = %ifname, address = %local, "Skipping unparseable address"),
                }
            }
        }
        Ok(addresses)
    }
}

/// Captured VRF and address state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkSnapshot {
    pub vrf_devices: BTreeSet<String>,
    pub vrf_members: VrfMembers,
    pub interface_addresses: InterfaceAddresses,
}

impl NetworkSnapshot {
    /// Queries all three views from `inspector`.
    pub async fn capture<N: NetworkInspector + ?Sized>(inspector: &N) -> Result<Self> {
        let vrf_devices = inspector.list_vrf_devices().await?;
        let vrf_members = inspector.list_vrf_members(&vrf_devices).await?;
        let interface_addresses = inspector.list_interface_addresses().await?;
        Ok(Self {
            vrf_devices,
            vrf_members,
            interface_addresses,
        })
    }

    /// Adds a VRF device with its members.
    pub fn with_vrf<I, S>(mut self, vrf: &str, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vrf_devices.insert(vrf.to_string());
        self.vrf_members
            .insert(vrf.to_string(), members.into_iter().map(Into::into).collect());
        self
    }

    /// Adds addresses to an interface.
    pub fn with_addresses<I>(mut self, ifname: &str, addresses: I) -> Self
    where
        I: IntoIterator<Item = IpAddr>,
    {
        self.interface_addresses
            .entry(ifname.to_string())
            .or_default()
            .extend(addresses);
        self
    }

    /// Addresses of the members of `vrf`.
    pub fn vrf_addresses(&self, vrf: &str) -> BTreeSet<IpAddr> {
        let Some(members) = self.vrf_members.get(vrf) else {
            return BTreeSet::new();
        };
        self.interface_addresses
            .iter()
            .filter(|(ifname, _)| members.contains(ifname))
            .flat_map(|(_, addrs)| addrs.iter().copied())
            .collect()
    }

    /// Addresses of interfaces that are neither VRF devices nor VRF members.
    pub fn default_vrf_addresses(&self) -> BTreeSet<IpAddr> {
        let excluded: BTreeSet<&str> = self
            .vrf_devices
            .iter()
            .map(String::as_str)
            .chain(self.vrf_members.values().flatten().map(String::as_str))
            .collect();
        self.interface_addresses
            .iter()
            .filter(|(ifname, _)| !excluded.contains(ifname.as_str()))
            .flat_map(|(_, addrs)| addrs.iter().copied())
            .collect()
    }
}

#[async_trait]
impl NetworkInspector for NetworkSnapshot {
    async fn list_vrf_devices(&self) -> Result<BTreeSet<String>> {
        Ok(self.vrf_devices.clone())
    }

    async fn list_vrf_members(&self, vrfs: &BTreeSet<String>) -> Result<VrfMembers> {
        Ok(vrfs
            .iter()
            .map(|vrf| {
                let members = self.vrf_members.get(vrf).cloned().unwrap_or_default();
                (vrf.clone(), members)
            })
            .collect())
    }

    async fn list_interface_addresses(&self) -> Result<InterfaceAddresses> {
        Ok(self.interface_addresses.clone())
    }
}
