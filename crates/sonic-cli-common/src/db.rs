//! CONFIG_DB access abstractions.
//!
//! [`ConfigDb`] mirrors the small subset of the SONiC `ConfigDBConnector`
//! API the CLI utilities need. Rows are ordered field/value vectors and
//! tables keep the order in which the backend reports their keys.

use async_trait::async_trait;

use crate::error::SonicResult;
use crate::platform::DEFAULT_NAMESPACE;

/// Key-value tuple representing a field and its value.
pub type FieldValue = (String, String);

/// Collection of field-value pairs for a table entry.
pub type FieldValues = Vec<FieldValue>;

/// A whole table: `(key, row)` pairs in backend order.
pub type Table = Vec<(String, FieldValues)>;

/// Helper trait for working with field-value collections.
pub trait FieldValuesExt {
    /// Gets the value for a field, if present.
    fn get_field(&self, field: &str) -> Option<&str>;

    /// Checks if a field exists.
    fn has_field(&self, field: &str) -> bool;

    /// Returns true if the field holds `"true"` in any letter case.
    fn is_true(&self, field: &str) -> bool {
        self.get_field(field)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }
}

impl FieldValuesExt for FieldValues {
    fn get_field(&self, field: &str) -> Option<&str> {
        self.iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v.as_str())
    }

    fn has_field(&self, field: &str) -> bool {
        self.iter().any(|(f, _)| f == field)
    }
}

/// Builds a FieldValues collection from key-value pairs.
#[macro_export]
macro_rules! field_values {
    ($($field:expr => $value:expr),* $(,)?) => {
        vec![
            $(($field.to_string(), $value.to_string()),)*
        ]
    };
}

/// Configuration database operations consumed by the CLI utilities.
#[async_trait]
pub trait ConfigDb: Send + Sync {
    /// Lists the keys of `table`.
    async fn get_keys(&self, table: &str) -> SonicResult<Vec<String>>;

    /// Reads one row; a missing row is an empty collection.
    async fn get_entry(&self, table: &str, key: &str) -> SonicResult<FieldValues>;

    /// Reads every row of `table`.
    async fn get_table(&self, table: &str) -> SonicResult<Table>;

    /// Replaces a row with `data`, or deletes it when `data` is `None`.
    async fn set_entry(&self, table: &str, key: &str, data: Option<&FieldValues>)
        -> SonicResult<()>;

    /// Merges `data` into a row, creating it if needed.
    async fn mod_entry(&self, table: &str, key: &str, data: &FieldValues) -> SonicResult<()>;
}

/// CONFIG_DB clients indexed by namespace.
///
/// The default namespace (`""`) is always present and always first; ASIC
/// namespaces follow in the order they were added.
#[derive(Debug, Clone)]
pub struct DbClients<D> {
    clients: Vec<(String, D)>,
}

impl<D> DbClients<D> {
    /// Creates the collection with the default-namespace client.
    pub fn new(default_db: D) -> Self {
        Self {
            clients: vec![(DEFAULT_NAMESPACE.to_string(), default_db)],
        }
    }

    /// Adds (or replaces) the client for an ASIC namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>, db: D) -> Self {
        self.insert(namespace, db);
        self
    }

    /// Adds (or replaces) the client for an ASIC namespace.
    pub fn insert(&mut self, namespace: impl Into<String>, db: D) {
        let namespace = namespace.into();
        match self.clients.iter_mut().find(|(ns, _)| *ns == namespace) {
            Some((_, existing)) => *existing = db,
            None => self.clients.push((namespace, db)),
        }
    }

    /// Returns the default-namespace client.
    pub fn default_db(&self) -> &D {
        &self.clients[0].1
    }

    /// Returns the client for `namespace`.
    pub fn get(&self, namespace: &str) -> Option<&D> {
        self.clients
            .iter()
            .find(|(ns, _)| ns == namespace)
            .map(|(_, db)| db)
    }

    /// Iterates over `(namespace, client)` pairs, default namespace first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &D)> {
        self.clients.iter().map(|(ns, db)| (ns.as_str(), db))
    }

    /// Returns the number of namespaces with a client.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Always false: the default namespace is mandatory.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
