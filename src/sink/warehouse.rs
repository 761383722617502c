use super::Sink;
use crate::operation::UpsertInstruction;
use crate::schema::TableDescriptor;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// One destination table held in memory.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct WarehouseTable {
    descriptor: TableDescriptor,
    /// Encoded primary key -> row
    rows: BTreeMap<String, Map<String, Value>>,
}

/// In-memory destination keyed by primary key.
///
/// Upserts with a key already present replace the stored row
/// (last write wins), so duplicate keys within a sync collapse to one row.
/// Used by the debug entrypoint to show what a real destination would hold.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WarehouseSink {
    tables: BTreeMap<String, WarehouseTable>,
}

impl WarehouseSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the declared tables.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Rows of `table` ordered by primary key. Empty if the table is unknown.
    pub fn rows(&self, table: &str) -> Vec<&Map<String, Value>> {
        self.tables
            .get(table)
            .map(|t| t.rows.values().collect())
            .unwrap_or_default()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, |t| t.rows.len())
    }

    /// Save the warehouse to `path` as pretty JSON.
    ///
    /// Writes to a `.tmp` sibling first, fsyncs, then renames over `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize warehouse to JSON")?;

        let tmp_path = path.with_extension("tmp");
        {
            let mut tmp_file =
                File::create(&tmp_path).context("Failed to create temporary warehouse file")?;
            tmp_file
                .write_all(json.as_bytes())
                .context("Failed to write warehouse data")?;
            tmp_file
                .sync_all()
                .context("Failed to sync warehouse file to disk")?;
        }

        fs::rename(&tmp_path, path).context("Failed to rename temporary warehouse file")?;
        Ok(())
    }

    /// Load a warehouse previously written by [`WarehouseSink::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read warehouse file {}", path.display()))?;
        serde_json::from_str(&json).context("Failed to deserialize warehouse JSON")
    }
}

impl Sink for WarehouseSink {
    fn declare(&mut self, tables: &[TableDescriptor]) -> Result<()> {
        for descriptor in tables {
            descriptor
                .validate()
                .with_context(|| format!("Invalid descriptor for table '{}'", descriptor.table))?;

            // Redeclaring keeps existing rows, as a destination table would.
            self.tables
                .entry(descriptor.table.clone())
                .and_modify(|t| t.descriptor = descriptor.clone())
                .or_insert_with(|| WarehouseTable {
                    descriptor: descriptor.clone(),
                    rows: BTreeMap::new(),
                });
        }
        Ok(())
    }

    fn upsert(&mut self, instruction: UpsertInstruction) -> Result<()> {
        let table = self
            .tables
            .get_mut(&instruction.table)
            .ok_or_else(|| anyhow!("Table '{}' was not declared", instruction.table))?;

        let key = instruction.key(&table.descriptor);
        let replaced = table.rows.insert(key, instruction.data).is_some();
        debug!(table = %instruction.table, replaced, "Row upserted");
        Ok(())
    }
}
