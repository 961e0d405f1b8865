//! SQLite reads.
//!
//! SQLite columns have no enforced type, so values are decoded by the storage
//! class of each individual value.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Number, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool, TypeInfo, ValueRef};

use super::{quote_ident, Column, RecordQuery};
use crate::error_handling::SourceError;
use crate::export::Record;

pub(super) async fn discover_columns(
    pool: &SqlitePool,
    table: &str,
) -> Result<Vec<Column>, SourceError> {
    let rows = sqlx::query("SELECT name, type FROM pragma_table_info(?) ORDER BY cid")
        .bind(table)
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| {
            Ok(Column {
                name: row.try_get("name")?,
                data_type: row.try_get::<String, _>("type")?.to_lowercase(),
            })
        })
        .collect()
}

pub(super) fn build_select(query: &RecordQuery, columns: &[Column]) -> String {
    let projection = columns
        .iter()
        .map(|column| quote_ident(&column.name))
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!("SELECT {} FROM {}", projection, quote_ident(&query.table));
    if query.only.is_some() {
        sql.push_str(&format!(
            " WHERE CAST({} AS TEXT) = ?",
            quote_ident(&query.id_column)
        ));
    }
    sql
}

pub(super) async fn fetch_records(
    pool: &SqlitePool,
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

fn row_to_record(
    row: &SqliteRow,
    columns: &[Column],
    image_column: &str,
) -> Result<Record, SourceError> {
    let mut record = Record::new();
    for (idx, column) in columns.iter().enumerate() {
        let value = read_value(row, idx, column.name == image_column).map_err(|e| {
            SourceError::ValueError {
                column: column.name.clone(),
                message: e.to_string(),
            }
        })?;
        record.insert(column.name.clone(), value);
    }
    Ok(record)
}

fn read_value(row: &SqliteRow, idx: usize, is_image: bool) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let storage_class = raw.type_info().name().to_string();

    let value = match storage_class.as_str() {
        "INTEGER" => Value::from(row.try_get::<i64, _>(idx)?),
        "REAL" => Number::from_f64(row.try_get::<f64, _>(idx)?).map_or(Value::Null, Value::Number),
        "BLOB" if is_image => {
            // Payload stored as bytes of base64 text
            let bytes = row.try_get::<Vec<u8>, _>(idx)?;
            String::from_utf8(bytes).map_or(Value::Null, Value::String)
        }
        "BLOB" => Value::String(STANDARD.encode(row.try_get::<Vec<u8>, _>(idx)?)),
        _ => Value::String(row.try_get::<String, _>(idx)?),
    };
    Ok(value)
}
