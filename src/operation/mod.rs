use crate::schema::TableDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;


/// Insert-or-update of one destination row, identified by its primary key.
///
/// Connectors yield these from `update`; the host performs the write.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpsertInstruction {
    /// Destination table name
    pub table: String,

    /// Column name to value
    pub data: Map<String, Value>,
}

impl UpsertInstruction {
    pub fn new(table: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            table: table.into(),
            data,
        }
    }

    /// Checks this instruction against the declared tables.
    ///
    /// Rules:
    /// - Target table must be declared
    /// - Every primary key column must be present and non-null
    /// - No columns outside the declaration
    ///
    /// Returns the matching descriptor on success.
    pub fn validate_against<'a>(
        &self,
        tables: &'a [TableDescriptor],
    ) -> Result<&'a TableDescriptor, OperationError> {
        let descriptor = tables
            .iter()
            .find(|t| t.table == self.table)
            .ok_or_else(|| OperationError::UndeclaredTable(self.table.clone()))?;

        for column in &descriptor.primary_key {
            match self.data.get(column) {
                None | Some(Value::Null) => {
                    return Err(OperationError::MissingPrimaryKey {
                        table: self.table.clone(),
                        column: column.clone(),
                    })
                }
                Some(_) => {}
            }
        }

        if let Some(column) = self
            .data
            .keys()
            .find(|c| !descriptor.columns.contains_key(c.as_str()))
        {
            return Err(OperationError::UndeclaredColumn {
                table: self.table.clone(),
                column: column.clone(),
            });
        }

        Ok(descriptor)
    }

    /// Primary key values of this row, in declaration order.
    ///
    /// Encoded as a JSON array string so composite keys compare as one value.
    pub fn key(&self, descriptor: &TableDescriptor) -> String {
        let values: Vec<Value> = descriptor
            .primary_key
            .iter()
            .map(|c| self.data.get(c).cloned().unwrap_or(Value::Null))
            .collect();
        Value::Array(values).to_string()
    }
}

/// Validation errors for UpsertInstruction
#[derive(Debug, Clone, PartialEq)]
pub enum OperationError {
    UndeclaredTable(String),
    MissingPrimaryKey { table: String, column: String },
    UndeclaredColumn { table: String, column: String },
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationError::UndeclaredTable(table) => {
                write!(f, "upsert targets undeclared table '{}'", table)
            }
            OperationError::MissingPrimaryKey { table, column } => {
                write!(
                    f,
                    "upsert into '{}' is missing primary key column '{}'",
                    table, column
                )
            }
            OperationError::UndeclaredColumn { table, column } => {
                write!(
                    f,
                    "upsert into '{}' carries undeclared column '{}'",
                    table, column
                )
            }
        }
    }
}

impl std::error::Error for OperationError {}
