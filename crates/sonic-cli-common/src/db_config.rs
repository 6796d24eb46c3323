//! SONiC database configuration files.
//!
//! Every namespace has a `database_config.json` describing its Redis
//! instances and logical databases. Multi-ASIC systems additionally ship a
//! `database_global.json` that includes one per-namespace file:
//!
//! ```json
//! {
//!   "INCLUDES": [
//!     { "include": "../../redis/sonic-db/database_config.json" },
//!     { "namespace": "asic0", "include": "../../redis0/sonic-db/database_config.json" }
//!   ],
//!   "VERSION": "1.0"
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{SonicError, SonicResult};
use crate::platform::DEFAULT_NAMESPACE;

/// Default `database_config.json` of the host namespace.
pub const DEFAULT_DB_CONFIG: &str = "/var/run/redis/sonic-db/database_config.json";

/// Default `database_global.json` on multi-ASIC systems.
pub const DEFAULT_DB_GLOBAL_CONFIG: &str = "/var/run/redis/sonic-db/database_global.json";

/// Logical name of the configuration database.
pub const CONFIG_DB: &str = "CONFIG_DB";

/// Redis instance description.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RedisInstance {
    /// TCP host name.
    pub hostname: String,
    /// TCP port.
    pub port: u16,
    /// Optional unix socket path.
    #[serde(default)]
    pub unix_socket_path: Option<String>,
}

/// Logical database description.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseInfo {
    /// Redis database index.
    pub id: i64,
    /// Separator between table name and key.
    pub separator: String,
    /// Name of the hosting [`RedisInstance`].
    pub instance: String,
}

/// Parsed `database_config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DbConfig {
    /// Redis instances by name.
    #[serde(rename = "INSTANCES")]
    pub instances: HashMap<String, RedisInstance>,
    /// Logical databases by name.
    #[serde(rename = "DATABASES")]
    pub databases: HashMap<String, DatabaseInfo>,
}

/// Connection parameters resolved for one logical database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbEndpoint {
    /// Redis connection URL.
    pub url: String,
    /// Table/key separator.
    pub separator: String,
}

impl DbConfig {
    /// Loads and parses a `database_config.json` file.
    pub fn load(path: &Path) -> SonicResult<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| SonicError::db_config(path, e.to_string()))?;
        Self::parse(path, &contents)
    }

    fn parse(path: &Path, contents: &str) -> SonicResult<Self> {
        serde_json::from_str(contents).map_err(|e| SonicError::db_config(path, e.to_string()))
    }

    /// Resolves the endpoint of logical database `db_name`.
    ///
    /// The unix socket is preferred when it exists on this host.
    pub fn endpoint(&self, db_name: &str) -> SonicResult<DbEndpoint> {
        let db = self
            .databases
            .get(db_name)
            .ok_or_else(|| SonicError::database("resolve", format!("unknown database {}", db_name)))?;
        let instance = self.instances.get(&db.instance).ok_or_else(|| {
            SonicError::database(
                "resolve",
                format!("unknown redis instance {} for {}", db.instance, db_name),
            )
        })?;

        let url = match instance.unix_socket_path.as_deref() {
            Some(socket) if Path::new(socket).exists() => {
                format!("redis+unix://{}?db={}", socket, db.id)
            }
            _ => format!("redis://{}:{}/{}", instance.hostname, instance.port, db.id),
        };

        Ok(DbEndpoint {
            url,
            separator: db.separator.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GlobalDbConfigFile {
    #[serde(rename = "INCLUDES")]
    includes: Vec<GlobalInclude>,
}

#[derive(Debug, Deserialize)]
struct GlobalInclude {
    #[serde(default)]
    namespace: Option<String>,
    include: String,
}

/// Per-namespace database configuration of a multi-ASIC system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalDbConfig {
    namespaces: Vec<(String, DbConfig)>,
}

impl GlobalDbConfig {
    /// Loads `database_global.json` and every file it includes.
    ///
    /// Include paths are relative to the directory of `path`.
    pub fn load(path: &Path) -> SonicResult<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| SonicError::db_config(path, e.to_string()))?;
        let file: GlobalDbConfigFile = serde_json::from_str(&contents)
            .map_err(|e| SonicError::db_config(path, e.to_string()))?;

        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut namespaces = Vec::with_capacity(file.includes.len());
        for include in file.includes {
            let include_path: PathBuf = base.join(&include.include);
            let namespace = include
                .namespace
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
            namespaces.push((namespace, DbConfig::load(&include_path)?));
        }

        Ok(Self { namespaces })
    }

    /// Wraps a single host-namespace configuration.
    pub fn single(config: DbConfig) -> Self {
        Self {
            namespaces: vec![(DEFAULT_NAMESPACE.to_string(), config)],
        }
    }

    /// Returns the configuration of `namespace`.
    pub fn namespace(&self, namespace: &str) -> Option<&DbConfig> {
        self.namespaces
            .iter()
            .find(|(ns, _)| ns == namespace)
            .map(|(_, cfg)| cfg)
    }

    /// Iterates over `(namespace, config)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DbConfig)> {
        self.namespaces.iter().map(|(ns, cfg)| (ns.as_str(), cfg))
    }
}
