//! FleetWise connector - Interface, registry and runner for sync connectors.
//!
//! This crate defines the interface a connector implements and ships the
//! AWS IoT FleetWise vehicles connector. Connectors read an external API and
//! yield upsert instructions; the host decides where the rows go.
//!
//! # Architecture
//!
//! ```text
//! AWS IoT FleetWise (ListVehicles)
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │       Connector (implements trait)       │
//! │  - Declare table schema                  │
//! │  - List vehicles, map to rows            │
//! │  - Stream upsert instructions            │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │       Runner (host side)                 │
//! │  - Validate schema and upserts           │
//! │  - Write to a Sink                       │
//! └─────────────────────────────────────────┘
//!          ↓
//!       Destination
//! ```
//!
//! # Core Types
//!
//! - [`Connector`] - Trait that all connectors must implement
//! - [`OperationStream`] - Lazy stream of upserts returned by `update`
//! - [`run_sync`] - Drives one sync into a [`fleetsync::Sink`]
//! - [`VehiclesConnector`] - The FleetWise vehicles connector

mod connector;
mod types;
pub mod connectors;
pub mod registry;
pub mod runner;

pub use connector::Connector;
pub use connectors::fleetwise::VehiclesConnector;
pub use runner::{run_sync, RunnerConfig, SyncSummary};
pub use types::OperationStream;
