use anyhow::{Context, Result};
use fleetsync::WarehouseSink;
use fleetwise_connector::registry::find_connector;
use fleetwise_connector::{run_sync, RunnerConfig};
use tracing::info;

/// Debug entrypoint: runs one sync of the FleetWise connector into a local
/// warehouse file.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleetwise_connector=info".into()),
        )
        .init();

    let runner_config = RunnerConfig::from_env();
    info!(
        configuration = %runner_config.configuration_path.display(),
        warehouse = %runner_config.warehouse_path.display(),
        "Configuration loaded"
    );

    let (configuration, state) = runner_config.load_inputs()?;

    let connector = find_connector("fleetwise").context("fleetwise connector not registered")?;

    // Rows written before a failure are kept, as a real destination would.
    let mut warehouse = if runner_config.warehouse_path.exists() {
        WarehouseSink::load(&runner_config.warehouse_path)?
    } else {
        WarehouseSink::new()
    };

    let result = run_sync(connector.as_ref(), &configuration, &state, &mut warehouse).await;

    warehouse
        .save(&runner_config.warehouse_path)
        .context("Failed to save warehouse")?;

    let summary = result?;
    for (table, rows) in &summary.rows_upserted {
        info!(
            table = %table,
            rows = rows,
            stored = warehouse.row_count(table),
            "Table synced"
        );
    }

    Ok(())
}
