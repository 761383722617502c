//! Destinations for upsert instructions.
//!
//! A connector never writes anywhere itself: it yields [`UpsertInstruction`]s
//! and the host hands each one to a [`Sink`]. The sink owns the write
//! semantics (key reconciliation, durability).

use crate::operation::UpsertInstruction;
use crate::schema::TableDescriptor;
use anyhow::Result;

mod warehouse;

pub use warehouse::WarehouseSink;

/// Destination-agnostic write target.
pub trait Sink: Send {
    /// Declares the tables upcoming upserts will target.
    ///
    /// Called once per sync, before the first `upsert`.
    fn declare(&mut self, tables: &[TableDescriptor]) -> Result<()>;

    /// Inserts the row, or replaces the existing row with the same primary key.
    fn upsert(&mut self, instruction: UpsertInstruction) -> Result<()>;
}
