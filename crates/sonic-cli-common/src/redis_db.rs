//! Redis-backed [`ConfigDb`] implementation.
//!
//! CONFIG_DB rows are Redis hashes named `<TABLE><sep><key>`. Rows without
//! fields are stored with the placeholder field `NULL`, which is hidden on
//! read, matching the SONiC `ConfigDBConnector` conventions.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::db::{ConfigDb, FieldValues, Table};
use crate::db_config::{DbConfig, CONFIG_DB};
use crate::error::{SonicError, SonicResult};

const NULL_FIELD: &str = "NULL";

/// CONFIG_DB client for one namespace.
#[derive(Clone)]
pub struct RedisConfigDb {
    conn: ConnectionManager,
    separator: String,
    namespace: String,
}

impl std::fmt::Debug for RedisConfigDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisConfigDb")
            .field("separator", &self.separator)
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl RedisConfigDb {
    /// Connects to CONFIG_DB as described by `config`.
    #[instrument(skip(config))]
    pub async fn connect(config: &DbConfig, namespace: &str) -> SonicResult<Self> {
        let endpoint = config.endpoint(CONFIG_DB)?;
        debug!(url = %endpoint.url, "Connecting to CONFIG_DB");

        let client = Client::open(endpoint.url.as_str())?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| SonicError::database("connect", e.to_string()))?;

        Ok(Self {
            conn,
            separator: endpoint.separator,
            namespace: namespace.to_string(),
        })
    }

    /// Namespace this client is bound to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn hash_key(&self, table: &str, key: &str) -> String {
        format!("{}{}{}", table, self.separator, key)
    }

    fn table_prefix(&self, table: &str) -> String {
        format!("{}{}", table, self.separator)
    }

    async fn read_row(&self, hash_key: &str) -> SonicResult<FieldValues> {
        let mut conn = self.conn.clone();
        let raw: HashMap<String, String> = conn.hgetall(hash_key).await?;
        let mut row: FieldValues = raw
            .into_iter()
            .filter(|(field, _)| field != NULL_FIELD)
            .collect();
        row.sort();
        Ok(row)
    }
}

#[async_trait]
impl ConfigDb for RedisConfigDb {
    async fn get_keys(&self, table: &str) -> SonicResult<Vec<String>> {
        let prefix = self.table_prefix(table);
        let mut conn = self.conn.clone();
        let hash_keys: Vec<String> = conn.keys(format!("{}*", prefix)).await?;

        let mut keys: Vec<String> = hash_keys
            .into_iter()
            .filter_map(|k| k.strip_prefix(&prefix).map(str::to_string))
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn get_entry(&self, table: &str, key: &str) -> SonicResult<FieldValues> {
        self.read_row(&self.hash_key(table, key)).await
    }

    async fn get_table(&self, table: &str) -> SonicResult<Table> {
        let mut rows = Vec::new();
        for key in self.get_keys(table).await? {
            let row = self.read_row(&self.hash_key(table, &key)).await?;
            rows.push((key, row));
        }
        Ok(rows)
    }

    #[instrument(skip(self, data), fields(namespace = %self.namespace))]
    async fn set_entry(
        &self,
        table: &str,
        key: &str,
        data: Option<&FieldValues>,
    ) -> SonicResult<()> {
        let hash_key = self.hash_key(table, key);
        let mut conn = self.conn.clone();

        let Some(data) = data else {
            debug!(key = %hash_key, "Deleting entry");
            let _: () = conn.del(&hash_key).await?;
            return Ok(());
        };

        let existing = self.read_row(&hash_key).await?;
        let stale: Vec<&str> = existing
            .iter()
            .map(|(f, _)| f.as_str())
            .filter(|f| !data.iter().any(|(d, _)| d == f))
            .collect();

        if data.is_empty() {
            let _: () = conn.hset(&hash_key, NULL_FIELD, NULL_FIELD).await?;
        } else {
            let _: () = conn.hset_multiple(&hash_key, data.as_slice()).await?;
            let _: () = conn.hdel(&hash_key, NULL_FIELD).await?;
        }
        if !stale.is_empty() {
            let _: () = conn.hdel(&hash_key, stale).await?;
        }

        debug!(key = %hash_key, fields = data.len(), "Set entry");
        Ok(())
    }

    #[instrument(skip(self, data), fields(namespace = %self.namespace))]
    async fn mod_entry(&self, table: &str, key: &str, data: &FieldValues) -> SonicResult<()> {
        if data.is_empty() {
            return Ok(());
        }
        let hash_key = self.hash_key(table, key);
        let mut conn = self.conn.clone();
        let _: () = conn.hset_multiple(&hash_key, data.as_slice()).await?;
        let _: () = conn.hdel(&hash_key, NULL_FIELD).await?;
        debug!(key = %hash_key, fields = data.len(), "Modified entry");
        Ok(())
    }
}
