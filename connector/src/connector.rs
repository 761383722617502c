use crate::types::OperationStream;
use anyhow::Result;
use async_trait::async_trait;
use fleetsync::{Configuration, State, TableDescriptor};

/// Connector interface for sources synced into a destination.
///
/// Connectors are stateless between syncs: the host passes the configuration
/// and the prior state in, and owns every write.
///
/// # Lifecycle
/// 1. Host calls `schema(configuration)` once to learn the table shapes
/// 2. Host calls `update(configuration, state)` once per sync
/// 3. Connector returns a stream of upsert instructions
/// 4. Host validates each instruction and writes it to its sink
///
/// # Example
/// ```no_run
/// use anyhow::Result;
/// use async_trait::async_trait;
/// use fleetsync::{ColumnType, Configuration, State, TableDescriptor};
/// use fleetwise_connector::{Connector, OperationStream};
/// use futures::stream::{self, StreamExt};
///
/// struct HelloConnector;
///
/// #[async_trait]
/// impl Connector for HelloConnector {
///     fn name(&self) -> &str {
///         "hello"
///     }
///
///     fn schema(&self, _configuration: &Configuration) -> Vec<TableDescriptor> {
///         vec![TableDescriptor::new("hello", &["message"])
///             .with_column("message", ColumnType::String)]
///     }
///
///     async fn update(
///         &self,
///         _configuration: &Configuration,
///         _state: &State,
///     ) -> Result<OperationStream> {
///         Ok(stream::empty().boxed())
///     }
/// }
/// ```
#[async_trait]
pub trait Connector: Send + Sync {
    /// Returns the unique identifier for this connector.
    ///
    /// Lowercase alphanumeric (e.g., "fleetwise"). Used for registry lookup
    /// and logging.
    fn name(&self) -> &str;

    /// Declares the destination tables this connector writes.
    ///
    /// Must be pure: same configuration, same descriptors.
    fn schema(&self, configuration: &Configuration) -> Vec<TableDescriptor>;

    /// Starts one sync and returns its upsert instructions.
    ///
    /// Configuration problems are returned as `Err` before any network call.
    /// Once the stream is returned, each item is produced on demand; an `Err`
    /// item ends the sync and nothing follows it.
    ///
    /// # Arguments
    /// * `configuration` - Secrets and settings from `configuration.json`
    /// * `state` - Checkpointed state from the prior sync (empty on full sync)
    async fn update(&self, configuration: &Configuration, state: &State)
        -> Result<OperationStream>;
}
