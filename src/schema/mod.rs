use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;


/// Destination column type tags understood by the host framework.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    Boolean,
    Short,
    Int,
    Long,
    Decimal,
    Float,
    Double,
    NaiveDate,
    NaiveDatetime,
    UtcDatetime,
    Binary,
    Xml,
    String,
    Json,
}

impl ColumnType {
    /// Returns the wire tag for this type (e.g. `"UTC_DATETIME"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Short => "SHORT",
            ColumnType::Int => "INT",
            ColumnType::Long => "LONG",
            ColumnType::Decimal => "DECIMAL",
            ColumnType::Float => "FLOAT",
            ColumnType::Double => "DOUBLE",
            ColumnType::NaiveDate => "NAIVE_DATE",
            ColumnType::NaiveDatetime => "NAIVE_DATETIME",
            ColumnType::UtcDatetime => "UTC_DATETIME",
            ColumnType::Binary => "BINARY",
            ColumnType::Xml => "XML",
            ColumnType::String => "STRING",
            ColumnType::Json => "JSON",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of one destination table, declared by a connector once per sync.
///
/// Serializes to the host framework's descriptor format:
///
/// ```json
/// {
///   "table": "vehicles",
///   "primary_key": ["vehicle_name"],
///   "columns": { "vehicle_name": "STRING", "created": "UTC_DATETIME" }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Destination table name
    pub table: String,

    /// Column(s) identifying a row; upserts with the same key replace each other
    pub primary_key: Vec<String>,

    /// Declared columns and their destination types
    pub columns: BTreeMap<String, ColumnType>,
}

impl TableDescriptor {
    /// Creates a descriptor with no columns.
    pub fn new(table: impl Into<String>, primary_key: &[&str]) -> Self {
        Self {
            table: table.into(),
            primary_key: primary_key.iter().map(|c| c.to_string()).collect(),
            columns: BTreeMap::new(),
        }
    }

    /// Adds a column declaration.
    pub fn with_column(mut self, name: &str, column_type: ColumnType) -> Self {
        self.columns.insert(name.to_string(), column_type);
        self
    }

    /// Checks the descriptor is usable by a destination.
    ///
    /// Rules:
    /// - Table name is non-empty
    /// - Primary key has at least one column
    /// - Every primary key column is declared in `columns`
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.table.is_empty() {
            return Err(SchemaError::MissingTableName);
        }
        if self.primary_key.is_empty() {
            return Err(SchemaError::MissingPrimaryKey(self.table.clone()));
        }
        for column in &self.primary_key {
            if !self.columns.contains_key(column) {
                return Err(SchemaError::UndeclaredKeyColumn {
                    table: self.table.clone(),
                    column: column.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Validation errors for TableDescriptor
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    MissingTableName,
    MissingPrimaryKey(String),
    UndeclaredKeyColumn { table: String, column: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::MissingTableName => write!(f, "table name is required"),
            SchemaError::MissingPrimaryKey(table) => {
                write!(f, "table '{}' must declare a primary key", table)
            }
            SchemaError::UndeclaredKeyColumn { table, column } => {
                write!(
                    f,
                    "primary key column '{}' is not declared in table '{}'",
                    column, table
                )
            }
        }
    }
}

impl std::error::Error for SchemaError {}
