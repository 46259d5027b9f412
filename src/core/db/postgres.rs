//! PostgreSQL driver backend.
//!
//! Wraps the blocking `postgres` crate behind the `Driver`/`Connection`
//! capability traits. Statements are prepared before execution so column
//! metadata is available even for empty result sets.

use chrono::{DateTime, NaiveDateTime, Utc};
use postgres::types::Type;
use postgres::{NoTls, Row};
use tracing::debug;

use crate::core::db::driver::{Column, Connection, Driver, RawTable, RawValue};
use crate::core::{RequeryError, Result};

/// Driver capability backed by the blocking `postgres` client.
pub struct PostgresDriver;

impl Driver for PostgresDriver {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn open(&self, url: &str, user: &str, password: &str) -> Result<Box<dyn Connection>> {
        let mut config = url
            .parse::<postgres::Config>()
            .map_err(|e| RequeryError::Connection(format!("invalid target '{}': {}", url, e)))?;
        config.user(user).password(password);

        let client = config
            .connect(NoTls)
            .map_err(|e| RequeryError::Connection(e.to_string()))?;

        Ok(Box::new(PostgresConnection { client }))
    }
}

struct PostgresConnection {
    client: postgres::Client,
}

impl Connection for PostgresConnection {
    fn execute(&mut self, sql: &str) -> Result<RawTable> {
        let statement = self
            .client
            .prepare(sql)
            .map_err(|e| RequeryError::Query(e.to_string()))?;

        let columns: Vec<Column> = statement
            .columns()
            .iter()
            .map(|c| Column::new(c.name(), c.type_().name()))
            .collect();

        let rows = self
            .client
            .query(&statement, &[])
            .map_err(|e| RequeryError::Query(e.to_string()))?;

        let mut raw_rows = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut cells = Vec::with_capacity(columns.len());
            for (idx, column) in row.columns().iter().enumerate() {
                cells.push(extract_value(row, idx, column.type_()));
            }
            raw_rows.push(cells);
        }

        Ok(RawTable {
            columns,
            rows: raw_rows,
        })
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.client
            .close()
            .map_err(|e| RequeryError::Close(e.to_string()))
    }
}

/// Extracts one cell into the neutral raw form, keyed by the wire type.
///
/// Types outside the integer/float/timestamp/text families come back as
/// `Unsupported`; the decoder turns those into absent cells.
fn extract_value(row: &Row, idx: usize, ty: &Type) -> RawValue {
    let extracted = if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(idx)
            .map(|v| v.map(|i| RawValue::Int(i64::from(i))))
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(idx)
            .map(|v| v.map(|i| RawValue::Int(i64::from(i))))
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(idx)
            .map(|v| v.map(RawValue::Int))
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(idx)
            .map(|v| v.map(|f| RawValue::Float(f64::from(f))))
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(idx)
            .map(|v| v.map(RawValue::Float))
    } else if *ty == Type::TIMESTAMP {
        row.try_get::<_, Option<NaiveDateTime>>(idx)
            .map(|v| v.map(RawValue::Timestamp))
    } else if *ty == Type::TIMESTAMPTZ {
        row.try_get::<_, Option<DateTime<Utc>>>(idx)
            .map(|v| v.map(|ts| RawValue::Timestamp(ts.naive_utc())))
    } else if *ty == Type::BPCHAR || *ty == Type::VARCHAR || *ty == Type::TEXT {
        row.try_get::<_, Option<String>>(idx)
            .map(|v| v.map(RawValue::Text))
    } else {
        return RawValue::Unsupported;
    };

    match extracted {
        Ok(Some(value)) => value,
        Ok(None) => RawValue::Null,
        Err(e) => {
            debug!("Failed to extract column {} ({}): {}", idx, ty.name(), e);
            RawValue::Unsupported
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_name() {
        assert_eq!(PostgresDriver.name(), "postgres");
    }

    #[test]
    fn test_open_rejects_malformed_target() {
        let result = PostgresDriver.open("not a target url", "u", "p");
        match result {
            Err(RequeryError::Connection(msg)) => assert!(msg.contains("invalid target")),
            _ => panic!("Expected a connection error"),
        }
    }
}
