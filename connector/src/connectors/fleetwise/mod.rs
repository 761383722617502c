pub mod api;
pub mod config;
pub mod transformer;

use crate::{Connector, OperationStream};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fleetsync::{Configuration, State, TableDescriptor, UpsertInstruction};
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use tracing::{debug, info};

use self::api::{FleetWiseClient, VehicleSource};
use self::config::FleetWiseConfig;
use self::transformer::{row_to_upsert, summary_to_row, vehicles_table, VehicleRow, TABLE};

/// FleetWise connector: lists vehicles from AWS IoT FleetWise and upserts
/// one `vehicles` row per vehicle.
///
/// Every sync is a full sync; prior state is ignored.
pub struct VehiclesConnector {
    endpoint_url: Option<String>,
}

impl VehiclesConnector {
    /// Create a connector using the regional FleetWise endpoint.
    pub fn new() -> Self {
        Self { endpoint_url: None }
    }

    /// Create a connector with a custom API endpoint (for testing).
    pub fn with_endpoint_url(endpoint_url: String) -> Self {
        Self {
            endpoint_url: Some(endpoint_url),
        }
    }
}

impl Default for VehiclesConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for VehiclesConnector {
    fn name(&self) -> &str {
        "fleetwise"
    }

    fn schema(&self, _configuration: &Configuration) -> Vec<TableDescriptor> {
        vec![vehicles_table()]
    }

    async fn update(
        &self,
        configuration: &Configuration,
        state: &State,
    ) -> Result<OperationStream> {
        let config = FleetWiseConfig::from_configuration(configuration)
            .context("Invalid FleetWise connector configuration")?;

        if !state.is_empty() {
            debug!(keys = state.len(), "Ignoring prior state, running full sync");
        }

        let client = FleetWiseClient::connect(&config, self.endpoint_url.as_deref()).await;
        info!(region = %config.region, "API client configured");

        Ok(vehicle_upserts(client))
    }
}

/// Stream the `vehicles` upserts for everything `source` lists.
///
/// Pages are fetched as the stream is polled, following continuation tokens
/// until the listing is exhausted. Each page is mapped in full before its
/// first row is yielded, so a bad summary stops the sync before any row of
/// its page reaches the host. Upstream order is preserved.
pub fn vehicle_upserts<S>(source: S) -> OperationStream
where
    S: VehicleSource + 'static,
{
    let cursor = ListingCursor {
        source,
        rows: VecDeque::new(),
        next_token: None,
        pages: 0,
        emitted: 0,
        exhausted: false,
    };
    stream::try_unfold(cursor, ListingCursor::<S>::advance).boxed()
}

/// Position within one ListVehicles listing.
struct ListingCursor<S> {
    source: S,
    /// Mapped rows of the current page not yet yielded
    rows: VecDeque<VehicleRow>,
    next_token: Option<String>,
    pages: u32,
    emitted: u64,
    exhausted: bool,
}

impl<S: VehicleSource> ListingCursor<S> {
    async fn advance(mut self) -> Result<Option<(UpsertInstruction, Self)>> {
        loop {
            if let Some(row) = self.rows.pop_front() {
                self.emitted += 1;
                return Ok(Some((row_to_upsert(row), self)));
            }

            if self.exhausted {
                info!(table = TABLE, total_rows = self.emitted, "Upsert data complete");
                info!(table = TABLE, "End table");
                return Ok(None);
            }

            if self.pages == 0 {
                info!(table = TABLE, "Start table");
            }

            let page = self
                .source
                .list_vehicles(self.next_token.take())
                .await
                .context("Failed to list vehicles")?;
            self.pages += 1;
            info!(
                page = self.pages,
                vehicles = page.summaries.len(),
                "List vehicles call complete"
            );

            let rows = page
                .summaries
                .into_iter()
                .map(summary_to_row)
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("Failed to build rows from page {}", self.pages))?;
            debug!(page = self.pages, rows = rows.len(), "Building rows complete");

            self.rows.extend(rows);
            self.exhausted = page.next_token.is_none();
            self.next_token = page.next_token;
        }
    }
}
