//! Runtime settings: database and platform file locations
//!
//! Every setting has a hidden command line flag and an environment
//! variable, so tests and non-standard images can point the CLI at other
//! files without affecting normal usage.

use std::path::PathBuf;

use clap::Args;
use sonic_cli_common::db_config::{DEFAULT_DB_CONFIG, DEFAULT_DB_GLOBAL_CONFIG};
use sonic_cli_common::platform::{DEFAULT_DEVICE_DIR, DEFAULT_MACHINE_CONF, PLATFORM_ENV};
use sonic_cli_common::{
    DbClients, DbConfig, GlobalDbConfig, Platform, PlatformPaths, RedisConfigDb, SonicError,
    SonicResult, DEFAULT_NAMESPACE,
};
use tracing::debug;

/// File locations used to reach CONFIG_DB and detect the platform
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct Settings {
    /// Host namespace database_config.json
    #[arg(long, global = true, hide = true, env = "SONIC_DB_CONFIG", default_value = DEFAULT_DB_CONFIG)]
    pub db_config: PathBuf,

    /// Multi-ASIC database_global.json
    #[arg(long, global = true, hide = true, env = "SONIC_DB_GLOBAL_CONFIG", default_value = DEFAULT_DB_GLOBAL_CONFIG)]
    pub db_global_config: PathBuf,

    /// machine.conf naming the platform
    #[arg(long, global = true, hide = true, env = "SONIC_MACHINE_CONF", default_value = DEFAULT_MACHINE_CONF)]
    pub machine_conf: PathBuf,

    /// Root of the per-platform device directories
    #[arg(long, global = true, hide = true, env = "SONIC_DEVICE_DIR", default_value = DEFAULT_DEVICE_DIR)]
    pub device_dir: PathBuf,

    /// Platform name, overriding machine.conf
    #[arg(long, global = true, hide = true, env = PLATFORM_ENV)]
    pub platform: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_config: PathBuf::from(DEFAULT_DB_CONFIG),
            db_global_config: PathBuf::from(DEFAULT_DB_GLOBAL_CONFIG),
            machine_conf: PathBuf::from(DEFAULT_MACHINE_CONF),
            device_dir: PathBuf::from(DEFAULT_DEVICE_DIR),
            platform: None,
        }
    }
}

impl Settings {
    pub fn platform_paths(&self) -> PlatformPaths {
        PlatformPaths {
            machine_conf: self.machine_conf.clone(),
            device_dir: self.device_dir.clone(),
        }
    }

    /// Detect the ASIC topology
    pub fn detect_platform(&self) -> SonicResult<Platform> {
        Platform::detect(&self.platform_paths(), self.platform.as_deref())
    }

    /// Per-namespace database configuration for `platform`
    ///
    /// Single-ASIC platforms only use the host file. On multi-ASIC
    /// platforms every ASIC namespace must be listed in the global file;
    /// the host namespace falls back to the host file.
    pub fn load_db_configs(&self, platform: &Platform) -> SonicResult<Vec<(String, DbConfig)>> {
        if !platform.is_multi_asic() {
            return Ok(vec![(
                DEFAULT_NAMESPACE.to_string(),
                DbConfig::load(&self.db_config)?,
            )]);
        }

        let global = GlobalDbConfig::load(&self.db_global_config)?;
        let host = match global.namespace(DEFAULT_NAMESPACE) {
            Some(config) => config.clone(),
            None => DbConfig::load(&self.db_config)?,
        };

        let mut configs = vec![(DEFAULT_NAMESPACE.to_string(), host)];
        for ns in platform.namespaces() {
            let config = global.namespace(&ns).cloned().ok_or_else(|| {
                SonicError::db_config(
                    &self.db_global_config,
                    format!("namespace {} is not listed", ns),
                )
            })?;
            configs.push((ns, config));
        }
        Ok(configs)
    }

    /// Connect to CONFIG_DB in every namespace of `platform`
    pub async fn connect(&self, platform: &Platform) -> SonicResult<DbClients<RedisConfigDb>> {
        let mut configs = self.load_db_configs(platform)?.into_iter();
        let Some((host_ns, host_config)) = configs.next() else {
            return Err(SonicError::internal("no host database configuration"));
        };

        let mut dbs = DbClients::new(RedisConfigDb::connect(&host_config, &host_ns).await?);
        for (ns, config) in configs {
            let db = RedisConfigDb::connect(&config, &ns).await?;
            dbs.insert(ns, db);
        }
        debug!(namespaces = dbs.len(), "Connected to CONFIG_DB");
        Ok(dbs)
    }
}
