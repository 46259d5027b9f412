//! Result decoding.
//!
//! Maps a column's declared type name plus the driver-extracted raw value to
//! the string cell callers see. Only integer, date/time and character types
//! decode; anything else yields an absent cell rather than an error, and the
//! remaining cells of the row are unaffected.

use crate::core::db::driver::{Column, RawValue};

/// Timestamp cells render in this fixed shape, e.g. "2024-06-01 13:37:00.5".
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// The three families of column types the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Timestamp,
    Text,
}

/// Classifies a declared column type name.
///
/// Matching is case-insensitive so both the SQL-style names ("INT",
/// "DATETIME", "VARCHAR") and the wire-level PostgreSQL names ("int4",
/// "timestamp", "varchar") resolve. Returns `None` for any other type; those
/// columns decode to absent cells.
pub fn column_kind(type_name: &str) -> Option<ColumnKind> {
    match type_name.to_ascii_lowercase().as_str() {
        "int" | "integer" | "int2" | "int4" | "int8" | "smallint" | "bigint" => {
            Some(ColumnKind::Integer)
        }
        "datetime" | "timestamp" | "timestamptz" => Some(ColumnKind::Timestamp),
        "char" | "bpchar" | "varchar" | "text" => Some(ColumnKind::Text),
        _ => None,
    }
}

/// Decodes one raw value under the given column kind.
///
/// SQL NULL and kind/value mismatches decode to `None`.
pub fn decode_value(kind: ColumnKind, value: &RawValue) -> Option<String> {
    match (kind, value) {
        (ColumnKind::Integer, RawValue::Int(i)) => Some(i.to_string()),
        (ColumnKind::Timestamp, RawValue::Timestamp(ts)) => {
            Some(ts.format(TIMESTAMP_FORMAT).to_string())
        }
        (ColumnKind::Text, RawValue::Text(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Decodes one raw row into cells, one per column, preserving column order.
pub fn decode_row(columns: &[Column], raw: &[RawValue]) -> Vec<Option<String>> {
    columns
        .iter()
        .zip(raw.iter())
        .map(|(column, value)| {
            column_kind(&column.type_name).and_then(|kind| decode_value(kind, value))
        })
        .collect()
}
