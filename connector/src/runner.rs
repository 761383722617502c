//! One-shot sync runner.
//!
//! Plays the host side for a single sync: declares the connector's tables
//! into a sink, drives `update`, validates every instruction against the
//! declared schema and writes it.

use crate::Connector;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fleetsync::{Configuration, Sink, State};
use futures::TryStreamExt;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{error, info};
use uuid::Uuid;

/// Outcome of a completed sync.
#[derive(Clone, Debug, Serialize)]
pub struct SyncSummary {
    /// UUIDv7 identifying this sync in logs
    pub sync_id: String,
    pub connector: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Rows upserted per table
    pub rows_upserted: BTreeMap<String, u64>,
}

impl SyncSummary {
    pub fn total_rows(&self) -> u64 {
        self.rows_upserted.values().sum()
    }
}

/// Runs one sync of `connector` into `sink`.
///
/// Stops at the first error. Rows written before the error stay in the sink.
pub async fn run_sync(
    connector: &dyn Connector,
    configuration: &Configuration,
    state: &State,
    sink: &mut dyn Sink,
) -> Result<SyncSummary> {
    let sync_id = Uuid::now_v7().to_string();
    let started_at = Utc::now();
    let mut rows_upserted: BTreeMap<String, u64> = BTreeMap::new();

    info!(
        sync_id = %sync_id,
        connector = %connector.name(),
        full_sync = state.is_empty(),
        "Sync starting"
    );

    let result = drive(connector, configuration, state, sink, &mut rows_upserted).await;

    let summary = SyncSummary {
        sync_id,
        connector: connector.name().to_string(),
        started_at,
        finished_at: Utc::now(),
        rows_upserted,
    };

    match result {
        Ok(()) => {
            info!(
                sync_id = %summary.sync_id,
                connector = %summary.connector,
                total_rows = summary.total_rows(),
                "Sync complete"
            );
            Ok(summary)
        }
        Err(e) => {
            error!(
                sync_id = %summary.sync_id,
                connector = %summary.connector,
                rows_written = summary.total_rows(),
                error = %e,
                "Sync failed"
            );
            Err(e)
        }
    }
}

async fn drive(
    connector: &dyn Connector,
    configuration: &Configuration,
    state: &State,
    sink: &mut dyn Sink,
    rows_upserted: &mut BTreeMap<String, u64>,
) -> Result<()> {
    let tables = connector.schema(configuration);
    for table in &tables {
        table
            .validate()
            .with_context(|| format!("Connector declared an invalid table '{}'", table.table))?;
        rows_upserted.insert(table.table.clone(), 0);
    }
    sink.declare(&tables).context("Failed to declare tables")?;

    let mut operations = connector
        .update(configuration, state)
        .await
        .context("Failed to start connector update")?;

    while let Some(instruction) = operations.try_next().await? {
        instruction
            .validate_against(&tables)
            .context("Connector emitted an invalid upsert")?;

        let table = instruction.table.clone();
        sink.upsert(instruction)
            .with_context(|| format!("Failed to upsert into '{}'", table))?;
        *rows_upserted.entry(table).or_insert(0) += 1;
    }

    Ok(())
}

/// Paths used by the debug entrypoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// Connector configuration JSON
    pub configuration_path: PathBuf,
    /// Prior state JSON; empty state when unset
    pub state_path: Option<PathBuf>,
    /// Where the resulting warehouse is written
    pub warehouse_path: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            configuration_path: PathBuf::from("configuration.json"),
            state_path: None,
            warehouse_path: PathBuf::from("warehouse.json"),
        }
    }
}

impl RunnerConfig {
    /// Build from env vars, falling back to defaults.
    ///
    /// - `FLEETWISE_CONFIGURATION` (default `configuration.json`)
    /// - `FLEETWISE_STATE` (optional)
    /// - `FLEETWISE_WAREHOUSE` (default `warehouse.json`)
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Some(v) = non_empty_env("FLEETWISE_CONFIGURATION") {
            cfg.configuration_path = PathBuf::from(v);
        }
        if let Some(v) = non_empty_env("FLEETWISE_STATE") {
            cfg.state_path = Some(PathBuf::from(v));
        }
        if let Some(v) = non_empty_env("FLEETWISE_WAREHOUSE") {
            cfg.warehouse_path = PathBuf::from(v);
        }

        cfg
    }

    /// Load the connector configuration and prior state.
    pub fn load_inputs(&self) -> Result<(Configuration, State)> {
        let configuration = Configuration::load(&self.configuration_path)?;
        let state = match &self.state_path {
            Some(path) => State::load(path)?,
            None => State::new(),
        };
        Ok((configuration, state))
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
