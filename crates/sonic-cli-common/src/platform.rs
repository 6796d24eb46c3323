//! Multi-ASIC platform topology.
//!
//! A multi-ASIC SONiC system runs one set of per-ASIC containers and one
//! CONFIG_DB per ASIC namespace (`asic0`, `asic1`, ...) next to the host
//! (default) namespace.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{SonicError, SonicResult};

/// Name of the host namespace as used for database clients.
pub const DEFAULT_NAMESPACE: &str = "";

/// Prefix of every ASIC namespace name.
pub const ASIC_NAME_PREFIX: &str = "asic";

/// Default location of the ONIE/Aboot machine description.
pub const DEFAULT_MACHINE_CONF: &str = "/host/machine.conf";

/// Default root of the per-platform device directories.
pub const DEFAULT_DEVICE_DIR: &str = "/usr/share/sonic/device";

/// Environment variable that overrides platform detection.
pub const PLATFORM_ENV: &str = "PLATFORM";

const ASIC_CONF_FILE: &str = "asic.conf";
const NUM_ASIC_KEY: &str = "NUM_ASIC";
const PLATFORM_KEYS: [&str; 2] = ["onie_platform", "aboot_platform"];

/// Files consulted during platform detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformPaths {
    /// `machine.conf` holding `onie_platform=` or `aboot_platform=`.
    pub machine_conf: PathBuf,
    /// Directory containing `<platform>/asic.conf`.
    pub device_dir: PathBuf,
}

impl Default for PlatformPaths {
    fn default() -> Self {
        Self {
            machine_conf: PathBuf::from(DEFAULT_MACHINE_CONF),
            device_dir: PathBuf::from(DEFAULT_DEVICE_DIR),
        }
    }
}

/// ASIC topology of the running switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    num_asics: u32,
}

impl Platform {
    /// Creates a topology with `num_asics` ASICs (at least one).
    pub fn new(num_asics: u32) -> Self {
        Self {
            num_asics: num_asics.max(1),
        }
    }

    /// A single-ASIC platform.
    pub fn single_asic() -> Self {
        Self::new(1)
    }

    /// Detects the topology from the platform's `asic.conf`.
    ///
    /// `platform` overrides the `machine.conf` lookup. Missing files mean
    /// a single-ASIC platform; an unparseable `NUM_ASIC` is an error.
    pub fn detect(paths: &PlatformPaths, platform: Option<&str>) -> SonicResult<Self> {
        let platform = match platform {
            Some(name) => Some(name.to_string()),
            None => read_platform_name(&paths.machine_conf),
        };

        let Some(platform) = platform else {
            debug!("Platform name unknown, assuming single ASIC");
            return Ok(Self::single_asic());
        };

        let asic_conf = paths.device_dir.join(&platform).join(ASIC_CONF_FILE);
        let num_asics = match fs::read_to_string(&asic_conf) {
            Ok(contents) => parse_num_asics(&asic_conf, &contents)?,
            Err(_) => 1,
        };

        debug!(platform = %platform, num_asics, "Detected platform topology");
        Ok(Self::new(num_asics))
    }

    /// Number of ASICs.
    pub fn num_asics(&self) -> u32 {
        self.num_asics
    }

    /// Returns true on platforms with more than one ASIC.
    pub fn is_multi_asic(&self) -> bool {
        self.num_asics > 1
    }

    /// ASIC namespace names; empty on single-ASIC platforms.
    pub fn namespaces(&self) -> Vec<String> {
        if !self.is_multi_asic() {
            return Vec::new();
        }
        (0..self.num_asics).map(namespace_name).collect()
    }

    /// Resolves an ASIC namespace name to its ASIC index.
    pub fn asic_id(&self, namespace: &str) -> Option<u32> {
        asic_id_from_name(namespace)
            .filter(|id| *id < self.num_asics && namespace == namespace_name(*id))
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::single_asic()
    }
}

/// Namespace name of ASIC `asic_id`.
pub fn namespace_name(asic_id: u32) -> String {
    format!("{}{}", ASIC_NAME_PREFIX, asic_id)
}

/// Parses the ASIC index out of an `asicN` namespace name.
pub fn asic_id_from_name(namespace: &str) -> Option<u32> {
    let digits = namespace.strip_prefix(ASIC_NAME_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Name of the instance of container `service` running on ASIC `asic_id`.
pub fn container_name(service: &str, asic_id: u32) -> String {
    format!("{}{}", service, asic_id)
}

fn read_platform_name(machine_conf: &Path) -> Option<String> {
    let contents = fs::read_to_string(machine_conf).ok()?;
    contents.lines().find_map(|line| {
        let (key, value) = line.split_once('=')?;
        PLATFORM_KEYS
            .contains(&key.trim())
            .then(|| value.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

fn parse_num_asics(path: &Path, contents: &str) -> SonicResult<u32> {
    for line in contents.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case(NUM_ASIC_KEY) {
            return value.trim().parse().map_err(|_| {
                SonicError::internal(format!(
                    "{}: invalid {} value '{}'",
                    path.display(),
                    NUM_ASIC_KEY,
                    value.trim()
                ))
            });
        }
    }
    Ok(1)
}
