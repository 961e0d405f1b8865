// Shared test helpers for source database setup and export configuration.
//
// Included by the integration tests via `#[path = "helpers.rs"]`.

use std::path::{Path, PathBuf};

use sqlx::SqlitePool;
use tempfile::TempDir;

use record_export::Config;

/// One source row: identifier, image payload, name, middle name.
pub type Row<'a> = (&'a str, Option<&'a str>, &'a str, Option<&'a str>);

/// Scratch space for one test: a SQLite source file and an export directory.
pub struct Fixture {
    pub dir: TempDir,
    pub db_path: PathBuf,
    pub base_dir: PathBuf,
}

impl Fixture {
    /// Creates the fixture and a `zzz_export_ud_w_passport` table holding `rows`.
    pub async fn with_rows(rows: &[Row<'_>]) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = dir.path().join("source.db");
        let base_dir = dir.path().join("export");

        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path.display()))
            .await
            .expect("Failed to create source database");
        sqlx::query(
            "CREATE TABLE zzz_export_ud_w_passport (\
                 identif TEXT, image TEXT, name TEXT, middle_name TEXT)",
        )
        .execute(&pool)
        .await
        .expect("Failed to create table");

        for (identif, image, name, middle_name) in rows {
            sqlx::query("INSERT INTO zzz_export_ud_w_passport VALUES (?, ?, ?, ?)")
                .bind(*identif)
                .bind(*image)
                .bind(*name)
                .bind(*middle_name)
                .execute(&pool)
                .await
                .expect("Failed to insert row");
        }
        pool.close().await;

        Fixture {
            dir,
            db_path,
            base_dir,
        }
    }

    /// Configuration reading this fixture's database into its export directory.
    pub fn config(&self) -> Config {
        Config {
            database_url: format!("sqlite:{}", self.db_path.display()),
            base_dir: self.base_dir.clone(),
            ..Default::default()
        }
    }

    /// Path of a file inside a record directory.
    pub fn artifact(&self, identifier: &str, file: &str) -> PathBuf {
        self.base_dir.join(identifier).join(file)
    }
}

/// Parses a `personal_data.json` file.
#[allow(dead_code)] // Not every test file reads sidecars
pub fn read_sidecar(path: &Path) -> serde_json::Value {
    let bytes = std::fs::read(path).expect("Failed to read sidecar");
    serde_json::from_slice(&bytes).expect("Sidecar is not valid JSON")
}

/// Lists the record directories under `base_dir`, sorted.
#[allow(dead_code)]
pub fn record_dirs(base_dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(base_dir)
        .expect("Failed to list export directory")
        .map(|entry| {
            entry
                .expect("Failed to read directory entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}
