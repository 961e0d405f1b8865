//! PostgreSQL reads.
//!
//! Columns with a native Rust mapping are decoded directly. Everything else
//! (dates, numerics, uuids, arrays, ...) is cast to text in the SELECT so the
//! sidecar gets the server's canonical rendering.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Number, Value};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::{quote_ident, Column, RecordQuery};
use crate::error_handling::SourceError;
use crate::export::Record;

/// How a column is pulled out of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PgKind {
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Bool,
    Text,
    Bytea,
    /// Cast to text, then parsed as JSON
    Json,
    /// Cast to text
    Cast,
}

fn resolve(data_type: &str) -> PgKind {
    match data_type {
        "smallint" => PgKind::Int2,
        "integer" => PgKind::Int4,
        "bigint" => PgKind::Int8,
        "real" => PgKind::Float4,
        "double precision" => PgKind::Float8,
        "boolean" => PgKind::Bool,
        "text" | "character varying" | "character" | "name" => PgKind::Text,
        "bytea" => PgKind::Bytea,
        "json" | "jsonb" => PgKind::Json,
        _ => PgKind::Cast,
    }
}

fn needs_cast(kind: PgKind) -> bool {
    matches!(kind, PgKind::Json | PgKind::Cast)
}

pub(super) async fn discover_columns(pool: &PgPool, table: &str) -> Result<Vec<Column>, SourceError> {
    let (schema, name) = match table.split_once('.') {
        Some((schema, name)) => (Some(schema), name),
        None => (None, table),
    };

    let rows = sqlx::query(
        "SELECT column_name::text, data_type::text \
         FROM information_schema.columns \
         WHERE table_name = $1 AND table_schema = COALESCE($2, current_schema()) \
         ORDER BY ordinal_position",
    )
    .bind(name)
    .bind(schema)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(Column {
                name: row.try_get(0)?,
                data_type: row.try_get::<String, _>(1)?.to_lowercase(),
            })
        })
        .collect()
}

/// Builds the SELECT for `columns`, casting non-native types to text.
pub(super) fn build_select(query: &RecordQuery, columns: &[Column]) -> String {
    let projection = columns
        .iter()
        .map(|column| {
            let quoted = quote_ident(&column.name);
            if needs_cast(resolve(&column.data_type)) {
                format!("{quoted}::text AS {quoted}")
            } else {
                quoted
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!("SELECT {} FROM {}", projection, quote_ident(&query.table));
    if query.only.is_some() {
        sql.push_str(&format!(" WHERE {}::text = $1", quote_ident(&query.id_column)));
    }
    sql
}

pub(super) async fn fetch_records(
    pool: &PgPool,
    query: &RecordQuery,
    columns: &[Column],
) -> Result<Vec<Record>, SourceError> {
    let sql = build_select(query, columns);
    let mut select = sqlx::query(&sql);
    if let Some(only) = &query.only {
        select = select.bind(only.as_str());
    }
    let rows = select.fetch_all(pool).await?;

    rows.iter()
        .map(|row| row_to_record(row, columns, &query.image_column))
        .collect()
}

fn row_to_record(row: &PgRow, columns: &[Column], image_column: &str) -> Result<Record, SourceError> {
    let mut record = Record::new();
    for (idx, column) in columns.iter().enumerate() {
        let kind = resolve(&column.data_type);
        let value = if kind == PgKind::Bytea && column.name == image_column {
            // Payload stored as bytes of base64 text
            read_image_bytes(row, idx).map_err(|e| value_error(column, e))?
        } else {
            read_value(row, idx, kind).map_err(|e| value_error(column, e))?
        };
        record.insert(column.name.clone(), value);
    }
    Ok(record)
}

fn value_error(column: &Column, e: sqlx::Error) -> SourceError {
    SourceError::ValueError {
        column: column.name.clone(),
        message: e.to_string(),
    }
}

fn read_value(row: &PgRow, idx: usize, kind: PgKind) -> Result<Value, sqlx::Error> {
    let value = match kind {
        PgKind::Int2 => row.try_get::<Option<i16>, _>(idx)?.map(Value::from),
        PgKind::Int4 => row.try_get::<Option<i32>, _>(idx)?.map(Value::from),
        PgKind::Int8 => row.try_get::<Option<i64>, _>(idx)?.map(Value::from),
        PgKind::Float4 => row
            .try_get::<Option<f32>, _>(idx)?
            .and_then(|f| Number::from_f64(f64::from(f)))
            .map(Value::Number),
        PgKind::Float8 => row
            .try_get::<Option<f64>, _>(idx)?
            .and_then(Number::from_f64)
            .map(Value::Number),
        PgKind::Bool => row.try_get::<Option<bool>, _>(idx)?.map(Value::Bool),
        PgKind::Text | PgKind::Cast => row.try_get::<Option<String>, _>(idx)?.map(Value::String),
        PgKind::Bytea => row
            .try_get::<Option<Vec<u8>>, _>(idx)?
            .map(|bytes| Value::String(STANDARD.encode(bytes))),
        PgKind::Json => row
            .try_get::<Option<String>, _>(idx)?
            .map(|text| serde_json::from_str(&text).unwrap_or(Value::String(text))),
    };
    Ok(value.unwrap_or(Value::Null))
}

/// A bytea image column holds the base64 text; non-UTF-8 contents read as null.
fn read_image_bytes(row: &PgRow, idx: usize) -> Result<Value, sqlx::Error> {
    Ok(row
        .try_get::<Option<Vec<u8>>, _>(idx)?
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .map_or(Value::Null, Value::String))
}
