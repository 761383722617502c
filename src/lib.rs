//! Host-side contract shared by connectors and destinations.
//!
//! A connector declares its tables ([`TableDescriptor`]) and yields
//! [`UpsertInstruction`]s; the host validates them and hands them to a
//! [`Sink`].

// Connector configuration and prior sync state
pub mod config;
pub mod state;

// Table descriptors and destination column types
pub mod schema;

// Upsert instructions and their validation
pub mod operation;

// Write targets
pub mod sink;

pub use config::Configuration;
pub use operation::{OperationError, UpsertInstruction};
pub use schema::{ColumnType, SchemaError, TableDescriptor};
pub use sink::{Sink, WarehouseSink};
pub use state::State;
