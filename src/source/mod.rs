//! Record source.
//!
//! Reads the export table from PostgreSQL or SQLite into memory. The source is
//! connected explicitly, read once, and closed before any record is written.

mod postgres;
mod sqlite;

use std::str::FromStr;
use std::time::Duration;

use log::{debug, info};
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{PgPool, SqlitePool};

use crate::config::{redact_url, SOURCE_CONNECT_TIMEOUT_SECS, SOURCE_MAX_CONNECTIONS};
use crate::error_handling::SourceError;
use crate::export::Record;

/// A column of the source table as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Declared type, lower-cased (`information_schema.columns.data_type` or
    /// the SQLite declared type)
    pub data_type: String,
}

/// What to read from the source.
#[derive(Debug, Clone)]
pub struct RecordQuery {
    /// Table name, optionally schema-qualified (`schema.table`)
    pub table: String,
    pub id_column: String,
    pub image_column: String,
    /// Restrict the read to one identifier
    pub only: Option<String>,
}

/// Connected record source.
pub enum RecordSource {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

impl RecordSource {
    /// Connects to the database named by `url`.
    ///
    /// `postgres://` and `postgresql://` URLs open a PostgreSQL pool; `sqlite:`
    /// URLs open the database read-only.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::UnsupportedScheme` for other URLs and
    /// `SourceError::SqlError` if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, SourceError> {
        let timeout = Duration::from_secs(SOURCE_CONNECT_TIMEOUT_SECS);
        let source = if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            let pool = PgPoolOptions::new()
                .max_connections(SOURCE_MAX_CONNECTIONS)
                .acquire_timeout(timeout)
                .connect(url)
                .await?;
            RecordSource::Postgres(pool)
        } else if url.starts_with("sqlite:") {
            let options = SqliteConnectOptions::from_str(url)?.read_only(true);
            let pool = SqlitePoolOptions::new()
                .max_connections(SOURCE_MAX_CONNECTIONS)
                .acquire_timeout(timeout)
                .connect_with(options)
                .await?;
            RecordSource::Sqlite(pool)
        } else {
            let scheme = url.split(':').next().unwrap_or_default();
            return Err(SourceError::UnsupportedScheme(scheme.to_string()));
        };
        info!("Connected to source {}", redact_url(url));
        Ok(source)
    }

    /// Lists the columns of `table` in declaration order.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::TableNotFound` if the table has no columns, or
    /// `SourceError::SqlError` if the catalog query fails.
    pub async fn discover_columns(&self, table: &str) -> Result<Vec<Column>, SourceError> {
        let columns = match self {
            RecordSource::Postgres(pool) => postgres::discover_columns(pool, table).await?,
            RecordSource::Sqlite(pool) => sqlite::discover_columns(pool, table).await?,
        };
        if columns.is_empty() {
            return Err(SourceError::TableNotFound(table.to_string()));
        }
        debug!(
            "Table '{}' has columns: {}",
            table,
            columns
                .iter()
                .map(|c| format!("{} ({})", c.name, c.data_type))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(columns)
    }

    /// Reads every row matching `query`, in the order the database returns them.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::ColumnNotFound` if the id or image column is
    /// missing, or any error from discovery and the select itself.
    pub async fn fetch_records(&self, query: &RecordQuery) -> Result<Vec<Record>, SourceError> {
        let columns = self.discover_columns(&query.table).await?;
        for required in [&query.id_column, &query.image_column] {
            if !columns.iter().any(|c| &c.name == required) {
                return Err(SourceError::ColumnNotFound {
                    table: query.table.clone(),
                    column: required.clone(),
                });
            }
        }

        match self {
            RecordSource::Postgres(pool) => postgres::fetch_records(pool, query, &columns).await,
            RecordSource::Sqlite(pool) => sqlite::fetch_records(pool, query, &columns).await,
        }
    }

    /// Closes the pool, waiting for its connections to shut down.
    pub async fn close(self) {
        match self {
            RecordSource::Postgres(pool) => pool.close().await,
            RecordSource::Sqlite(pool) => pool.close().await,
        }
        debug!("Source connection closed");
    }
}

/// Quotes an identifier for use in SQL, keeping a `schema.table` split.
///
/// Embedded double quotes are doubled.
pub fn quote_ident(name: &str) -> String {
    name.split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn sqlite_source(dir: &TempDir) -> RecordSource {
        let path = dir.path().join("source.db");
        let url = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&url).await.unwrap();
        sqlx::query(
            "CREATE TABLE people (identif TEXT, image TEXT, name TEXT, age INTEGER, \
             height REAL, photo_raw BLOB)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO people VALUES ('A1', '/9g=', 'Jo', 41, 1.75, x'0102')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO people VALUES ('B2', NULL, 'Kim', NULL, NULL, NULL)")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;

        RecordSource::connect(&format!("sqlite:{}", path.display()))
            .await
            .unwrap()
    }

    fn people_query() -> RecordQuery {
        RecordQuery {
            table: "people".to_string(),
            id_column: "identif".to_string(),
            image_column: "image".to_string(),
            only: None,
        }
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("identif"), "\"identif\"");
        assert_eq!(quote_ident("public.people"), "\"public\".\"people\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[tokio::test]
    async fn test_connect_rejects_unknown_scheme() {
        let result = RecordSource::connect("mysql://localhost/db").await;
        assert!(matches!(result, Err(SourceError::UnsupportedScheme(ref s)) if s == "mysql"));
    }

    #[tokio::test]
    async fn test_sqlite_discover_columns_in_order() {
        let dir = TempDir::new().unwrap();
        let source = sqlite_source(&dir).await;
        let columns = source.discover_columns("people").await.unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["identif", "image", "name", "age", "height", "photo_raw"]
        );
        assert_eq!(columns[3].data_type, "integer");
        source.close().await;
    }

    #[tokio::test]
    async fn test_sqlite_missing_table() {
        let dir = TempDir::new().unwrap();
        let source = sqlite_source(&dir).await;
        let result = source.discover_columns("nobody").await;
        assert!(matches!(result, Err(SourceError::TableNotFound(_))));
        source.close().await;
    }

    #[tokio::test]
    async fn test_sqlite_missing_image_column() {
        let dir = TempDir::new().unwrap();
        let source = sqlite_source(&dir).await;
        let query = RecordQuery {
            image_column: "portrait".to_string(),
            ..people_query()
        };
        let result = source.fetch_records(&query).await;
        assert!(matches!(
            result,
            Err(SourceError::ColumnNotFound { ref column, .. }) if column == "portrait"
        ));
        source.close().await;
    }

    #[tokio::test]
    async fn test_sqlite_fetch_records_by_storage_class() {
        let dir = TempDir::new().unwrap();
        let source = sqlite_source(&dir).await;
        let records = source.fetch_records(&people_query()).await.unwrap();
        source.close().await;

        assert_eq!(records.len(), 2);
        let first = &records[0];
        assert_eq!(first.get("identif"), Some(&serde_json::json!("A1")));
        assert_eq!(first.get("age"), Some(&serde_json::json!(41)));
        assert_eq!(first.get("height"), Some(&serde_json::json!(1.75)));
        assert_eq!(first.get("photo_raw"), Some(&serde_json::json!("AQI=")));
        assert_eq!(records[1].get("image"), Some(&serde_json::Value::Null));
    }

    #[tokio::test]
    async fn test_sqlite_fetch_only_one_identifier() {
        let dir = TempDir::new().unwrap();
        let source = sqlite_source(&dir).await;
        let query = RecordQuery {
            only: Some("B2".to_string()),
            ..people_query()
        };
        let records = source.fetch_records(&query).await.unwrap();
        source.close().await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("name"), Some(&serde_json::json!("Kim")));
    }
}
