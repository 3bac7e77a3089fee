use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use retl_core::{normalize_row, Document, SourceValue};
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{Column, Row, TypeInfo};
use tracing::warn;

// Postgres reports this name for expressions without an alias
const ANONYMOUS_COLUMN: &str = "?column?";

/// How a column is turned into a [`SourceValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Json,
    Bytes,
    TimestampTz,
    Timestamp,
    Date,
    Time,
    Uuid,
    /// Everything else (NUMERIC, INTERVAL, INET, arrays, enums, ...) keeps
    /// the server's text rendering
    Text,
}

impl ColumnKind {
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name {
            "BOOL" => ColumnKind::Bool,
            "INT2" => ColumnKind::Int2,
            "INT4" => ColumnKind::Int4,
            "INT8" => ColumnKind::Int8,
            "FLOAT4" => ColumnKind::Float4,
            "FLOAT8" => ColumnKind::Float8,
            "JSON" | "JSONB" => ColumnKind::Json,
            "BYTEA" => ColumnKind::Bytes,
            "TIMESTAMPTZ" => ColumnKind::TimestampTz,
            "TIMESTAMP" => ColumnKind::Timestamp,
            "DATE" => ColumnKind::Date,
            "TIME" => ColumnKind::Time,
            "UUID" => ColumnKind::Uuid,
            _ => ColumnKind::Text,
        }
    }
}

fn get<'r, T>(row: &'r PgRow, index: usize) -> Result<Option<T>, sqlx::Error>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get::<Option<T>, _>(index)
}

/// Decode one column by its Postgres type name.
///
/// Rows must come from the simple query protocol so every value arrives in
/// text format; unmapped types are then returned as that text.
pub fn column_value(row: &PgRow, index: usize, type_name: &str) -> SourceValue {
    let decoded = match ColumnKind::from_type_name(type_name) {
        ColumnKind::Bool => get::<bool>(row, index).map(|v| v.map(SourceValue::Bool)),
        ColumnKind::Int2 => get::<i16>(row, index).map(|v| v.map(|i| SourceValue::Int(i.into()))),
        ColumnKind::Int4 => get::<i32>(row, index).map(|v| v.map(|i| SourceValue::Int(i.into()))),
        ColumnKind::Int8 => get::<i64>(row, index).map(|v| v.map(SourceValue::Int)),
        ColumnKind::Float4 => {
            get::<f32>(row, index).map(|v| v.map(|f| SourceValue::Float(f.into())))
        }
        ColumnKind::Float8 => get::<f64>(row, index).map(|v| v.map(SourceValue::Float)),
        ColumnKind::Json => get::<Value>(row, index).map(|v| v.map(SourceValue::Json)),
        ColumnKind::Bytes => get::<Vec<u8>>(row, index).map(|v| v.map(SourceValue::Bytes)),
        ColumnKind::TimestampTz => get::<DateTime<Utc>>(row, index)
            .map(|v| v.map(|t| SourceValue::Text(t.to_rfc3339()))),
        ColumnKind::Timestamp => get::<NaiveDateTime>(row, index)
            .map(|v| v.map(|t| SourceValue::Text(t.to_string()))),
        ColumnKind::Date => {
            get::<NaiveDate>(row, index).map(|v| v.map(|d| SourceValue::Text(d.to_string())))
        }
        ColumnKind::Time => {
            get::<NaiveTime>(row, index).map(|v| v.map(|t| SourceValue::Text(t.to_string())))
        }
        ColumnKind::Uuid => get::<uuid::Uuid>(row, index)
            .map(|v| v.map(|u| SourceValue::Text(u.to_string()))),
        // String only type-checks against the text types, the raw text is what we want here
        ColumnKind::Text => row
            .try_get_unchecked::<Option<String>, _>(index)
            .map(|v| v.map(SourceValue::Text)),
    };

    match decoded {
        Ok(Some(value)) => value,
        Ok(None) => SourceValue::Null,
        Err(e) => {
            warn!(
                "Cannot decode column {} of type {}: {}",
                index, type_name, e
            );
            SourceValue::Null
        }
    }
}

/// Normalize a result row, keeping column order
pub fn row_to_document(row: &PgRow) -> Document {
    normalize_row(row.columns().iter().map(|column| {
        let name = match column.name() {
            "" | ANONYMOUS_COLUMN => None,
            name => Some(name.to_string()),
        };
        let value = column_value(row, column.ordinal(), column.type_info().name());
        (name, value)
    }))
}
