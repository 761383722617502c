use chrono::{DateTime, SecondsFormat, Utc};
use fleetsync::{ColumnType, TableDescriptor, UpsertInstruction};
use serde_json::{Map, Value};
use std::fmt;

use super::api::VehicleSummary;

pub const TABLE: &str = "vehicles";

/// Destination shape of the `vehicles` table.
///
/// `decorder_manifest_arn` is spelled as existing destinations expect it.
pub fn vehicles_table() -> TableDescriptor {
    TableDescriptor::new(TABLE, &["vehicle_name"])
        .with_column("vehicle_name", ColumnType::String)
        .with_column("arn", ColumnType::String)
        .with_column("created", ColumnType::UtcDatetime)
        .with_column("updated", ColumnType::UtcDatetime)
        .with_column("model_manifest_arn", ColumnType::String)
        .with_column("decorder_manifest_arn", ColumnType::String)
        .with_column("attributes", ColumnType::String)
}

/// One row of the `vehicles` table.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleRow {
    pub vehicle_name: String,
    pub arn: String,
    pub created: String,
    pub updated: String,
    pub model_manifest_arn: String,
    pub decorder_manifest_arn: String,
    pub attributes: String,
}

/// A vehicle summary could not be mapped to a row.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingError {
    /// Upstream field name (camelCase, as FleetWise spells it)
    MissingField(&'static str),
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingError::MissingField(field) => {
                write!(f, "vehicle summary is missing field '{}'", field)
            }
        }
    }
}

impl std::error::Error for MappingError {}

/// Transform a FleetWise vehicle summary into a `vehicles` row.
///
/// Strings are copied as-is, timestamps rendered as ISO-8601, attributes
/// string-encoded. Any absent field fails the whole row.
pub fn summary_to_row(summary: VehicleSummary) -> Result<VehicleRow, MappingError> {
    Ok(VehicleRow {
        vehicle_name: field(summary.vehicle_name, "vehicleName")?,
        arn: field(summary.arn, "arn")?,
        created: render_timestamp(&field(summary.creation_time, "creationTime")?),
        updated: render_timestamp(&field(
            summary.last_modification_time,
            "lastModificationTime",
        )?),
        model_manifest_arn: field(summary.model_manifest_arn, "modelManifestArn")?,
        decorder_manifest_arn: field(summary.decoder_manifest_arn, "decoderManifestArn")?,
        attributes: encode_attributes(&field(summary.attributes, "attributes")?),
    })
}

/// Wrap a row as an upsert into the `vehicles` table.
pub fn row_to_upsert(row: VehicleRow) -> UpsertInstruction {
    let mut data = Map::new();
    data.insert("vehicle_name".to_string(), Value::String(row.vehicle_name));
    data.insert("arn".to_string(), Value::String(row.arn));
    data.insert("created".to_string(), Value::String(row.created));
    data.insert("updated".to_string(), Value::String(row.updated));
    data.insert(
        "model_manifest_arn".to_string(),
        Value::String(row.model_manifest_arn),
    );
    data.insert(
        "decorder_manifest_arn".to_string(),
        Value::String(row.decorder_manifest_arn),
    );
    data.insert("attributes".to_string(), Value::String(row.attributes));
    UpsertInstruction::new(TABLE, data)
}

/// ISO-8601 with an explicit `+00:00` offset.
///
/// Whole seconds print no fraction. Any sub-second part prints as exactly six
/// microsecond digits, truncating nanoseconds
/// (`2026-02-17T12:00:00+00:00`, `2026-02-17T12:00:00.250000+00:00`).
pub fn render_timestamp(timestamp: &DateTime<Utc>) -> String {
    let format = if timestamp.timestamp_subsec_nanos() == 0 {
        SecondsFormat::Secs
    } else {
        SecondsFormat::Micros
    };
    timestamp.to_rfc3339_opts(format, false)
}

/// String attributes pass through; anything else becomes compact JSON with
/// object keys sorted, so the same attributes always encode the same way.
pub fn encode_attributes(attributes: &Value) -> String {
    match attributes {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn field<T>(value: Option<T>, name: &'static str) -> Result<T, MappingError> {
    value.ok_or(MappingError::MissingField(name))
}
