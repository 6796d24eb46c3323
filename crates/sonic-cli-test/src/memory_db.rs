//! In-memory CONFIG_DB
//!
//! Clones share state, so a test can hand one clone to the code under test
//! and inspect the other afterwards.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use sonic_cli_common::{ConfigDb, FieldValues, SonicError, SonicResult, Table};

use crate::fixtures::ConfigChange;

#[derive(Debug, Default)]
struct State {
    /// Table name -> rows, both in insertion order
    tables: Vec<(String, Table)>,
    /// When set, every write fails with this message
    write_error: Option<String>,
}

impl State {
    fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|(t, _)| t == name).map(|(_, rows)| rows)
    }

    fn table_mut(&mut self, name: &str) -> &mut Table {
        if let Some(idx) = self.tables.iter().position(|(t, _)| t == name) {
            return &mut self.tables[idx].1;
        }
        self.tables.push((name.to_string(), Vec::new()));
        let last = self.tables.len() - 1;
        &mut self.tables[last].1
    }

    fn check_writable(&self) -> SonicResult<()> {
        match &self.write_error {
            Some(message) => Err(SonicError::database("write", message.clone())),
            None => Ok(()),
        }
    }
}

/// In-memory [`ConfigDb`] preserving insertion order of tables and keys.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigDb {
    state: Arc<Mutex<State>>,
}

impl MemoryConfigDb {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one row, replacing any existing row with the same key
    pub fn with_entry<I, K, V>(self, table: &str, key: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let row: FieldValues = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.put(table, key, row);
        self
    }

    /// Apply a fixture change (SET replaces the row, DEL removes it)
    pub fn apply(&self, change: &ConfigChange) {
        match change.op {
            crate::fixtures::ConfigOp::Set => {
                self.put(&change.table, &change.key, change.fields.clone())
            }
            crate::fixtures::ConfigOp::Del => self.remove(&change.table, &change.key),
        }
    }

    /// Apply several fixture changes in order
    pub fn with_changes<I>(self, changes: I) -> Self
    where
        I: IntoIterator<Item = ConfigChange>,
    {
        for change in changes {
            self.apply(&change);
        }
        self
    }

    /// Make every subsequent write fail with `message`
    pub fn fail_writes(&self, message: impl Into<String>) {
        self.state.lock().write_error = Some(message.into());
    }

    /// Snapshot of one row
    pub fn entry(&self, table: &str, key: &str) -> Option<FieldValues> {
        let state = self.state.lock();
        state
            .table(table)
            .and_then(|rows| rows.iter().find(|(k, _)| k == key))
            .map(|(_, fvs)| fvs.clone())
    }

    /// Snapshot of the keys of one table
    pub fn keys(&self, table: &str) -> Vec<String> {
        let state = self.state.lock();
        state
            .table(table)
            .map(|rows| rows.iter().map(|(k, _)| k.clone()).collect())
            .unwrap_or_default()
    }

    fn put(&self, table: &str, key: &str, row: FieldValues) {
        let mut state = self.state.lock();
        let rows = state.table_mut(table);
        match rows.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = row,
            None => rows.push((key.to_string(), row)),
        }
    }

    fn remove(&self, table: &str, key: &str) {
        let mut state = self.state.lock();
        state.table_mut(table).retain(|(k, _)| k != key);
    }
}

#[async_trait]
impl ConfigDb for MemoryConfigDb {
    async fn get_keys(&self, table: &str) -> SonicResult<Vec<String>> {
        Ok(self.keys(table))
    }

    async fn get_entry(&self, table: &str, key: &str) -> SonicResult<FieldValues> {
        Ok(self.entry(table, key).unwrap_or_default())
    }

    async fn get_table(&self, table: &str) -> SonicResult<Table> {
        let state = self.state.lock();
        Ok(state.table(table).cloned().unwrap_or_default())
    }

    async fn set_entry(
        &self,
        table: &str,
        key: &str,
        data: Option<&FieldValues>,
    ) -> SonicResult<()> {
        self.state.lock().check_writable()?;
        match data {
            Some(row) => self.put(table, key, row.clone()),
            None => self.remove(table, key),
        }
        Ok(())
    }

    async fn mod_entry(&self, table: &str, key: &str, data: &FieldValues) -> SonicResult<()> {
        let mut state = self.state.lock();
        state.check_writable()?;
        let rows = state.table_mut(table);
        let row = match rows.iter_mut().position(|(k, _)| k == key) {
            Some(idx) => &mut rows[idx].1,
            None => {
                rows.push((key.to_string(), Vec::new()));
                let last = rows.len() - 1;
                &mut rows[last].1
            }
        };
        for (field, value) in data {
            match row.iter_mut().find(|(f, _)| f == field) {
                Some((_, existing)) => *existing = value.clone(),
                None => row.push((field.clone(), value.clone())),
            }
        }
        Ok(())
    }
}
