use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use itr_core::{
    Regime, RepositoryError, ReturnRepository, TaxSlab, UserInputDocument, UserInputKey,
};
use serde_json::{Map, Value};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::debug;

use crate::decimal::{decimal_to_f64, get_decimal, get_optional_decimal};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connects to `database_url` (a sqlx SQLite URL). In-memory databases
    /// are held on a single connection so every query sees the same data.
    pub async fn new(database_url: &str) -> Result<Self> {
        let max_connections = if database_url.contains(":memory:") {
            1
        } else {
            5
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            debug!(seed = %path.display(), "seed file applied");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn stored_revision(
        &self,
        key: &UserInputKey,
    ) -> Result<Option<i64>, RepositoryError> {
        let row = sqlx::query(
            "SELECT revision FROM user_input_document
             WHERE owner_id = ? AND assessment_period = ?",
        )
        .bind(&key.owner_id)
        .bind(&key.assessment_period)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        row.map(|row| {
            row.try_get("revision")
                .map_err(|e| RepositoryError::Database(e.to_string()))
        })
        .transpose()
    }
}

fn row_to_tax_slab(row: &SqliteRow) -> Result<TaxSlab, RepositoryError> {
    Ok(TaxSlab {
        up_to: get_optional_decimal(row, "upper_bound")?,
        rate: get_decimal(row, "rate")?,
    })
}

fn row_to_user_input(row: &SqliteRow) -> Result<UserInputDocument, RepositoryError> {
    let data: String = row
        .try_get("data")
        .map_err(|e| RepositoryError::Database(e.to_string()))?;
    let sections: Map<String, Value> = serde_json::from_str(&data)
        .map_err(|e| RepositoryError::Database(format!("Failed to parse document data: {}", e)))?;
    let schema_version: i64 = row
        .try_get("schema_version")
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

    Ok(UserInputDocument {
        owner_id: row
            .try_get("owner_id")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        assessment_period: row
            .try_get("assessment_period")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        schema_version: u32::try_from(schema_version).map_err(|_| {
            RepositoryError::Database(format!("Invalid schema_version {}", schema_version))
        })?,
        revision: row
            .try_get("revision")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        sections,
        updated_at: Some(
            row.try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(|e| RepositoryError::Database(format!("Failed to get updated_at: {}", e)))?,
        ),
    })
}

fn sections_to_json(document: &UserInputDocument) -> Result<String, RepositoryError> {
    serde_json::to_string(&document.sections)
        .map_err(|e| RepositoryError::Database(format!("Failed to encode document data: {}", e)))
}

const SELECT_USER_INPUT: &str = "SELECT owner_id, assessment_period, schema_version, revision, data, updated_at
     FROM user_input_document";

#[async_trait]
impl ReturnRepository for SqliteRepository {
    async fn list_assessment_years(&self) -> Result<Vec<String>, RepositoryError> {
        let rows = sqlx::query("SELECT assessment_year FROM assessment_year ORDER BY assessment_year DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter()
            .map(|row| {
                row.try_get("assessment_year")
                    .map_err(|e| RepositoryError::Database(e.to_string()))
            })
            .collect()
    }

    async fn get_tax_slabs(
        &self,
        assessment_year: &str,
        regime: Regime,
    ) -> Result<Vec<TaxSlab>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT upper_bound, rate
             FROM tax_slabs
             WHERE assessment_year = ? AND regime = ?
             ORDER BY upper_bound IS NULL, upper_bound",
        )
        .bind(assessment_year)
        .bind(regime.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_tax_slab).collect()
    }

    async fn insert_tax_slab(
        &self,
        assessment_year: &str,
        regime: Regime,
        slab: &TaxSlab,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT OR IGNORE INTO assessment_year (assessment_year) VALUES (?)")
            .bind(assessment_year)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        sqlx::query(
            "INSERT INTO tax_slabs (assessment_year, regime, upper_bound, rate)
             VALUES (?, ?, ?, ?)",
        )
        .bind(assessment_year)
        .bind(regime.as_str())
        .bind(slab.up_to.map(decimal_to_f64))
        .bind(decimal_to_f64(slab.rate))
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(())
    }

    async fn delete_tax_slabs(
        &self,
        assessment_year: &str,
        regime: Regime,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM tax_slabs WHERE assessment_year = ? AND regime = ?")
            .bind(assessment_year)
            .bind(regime.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(())
    }

    async fn get_user_input(
        &self,
        key: &UserInputKey,
    ) -> Result<UserInputDocument, RepositoryError> {
        let row = sqlx::query(&format!(
            "{SELECT_USER_INPUT} WHERE owner_id = ? AND assessment_period = ?"
        ))
        .bind(&key.owner_id)
        .bind(&key.assessment_period)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        row_to_user_input(&row)
    }

    async fn get_or_create_user_input(
        &self,
        key: &UserInputKey,
    ) -> Result<UserInputDocument, RepositoryError> {
        let empty = UserInputDocument::empty(key);
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT OR IGNORE INTO user_input_document (
                owner_id, assessment_period, schema_version, revision, data, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&empty.owner_id)
        .bind(&empty.assessment_period)
        .bind(i64::from(empty.schema_version))
        .bind(empty.revision)
        .bind(sections_to_json(&empty)?)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() > 0 {
            debug!(
                owner_id = %key.owner_id,
                assessment_period = %key.assessment_period,
                "created empty user input document"
            );
        }

        self.get_user_input(key).await
    }

    async fn save_user_input(
        &self,
        document: &UserInputDocument,
    ) -> Result<UserInputDocument, RepositoryError> {
        let key = document.key();

        let result = sqlx::query(
            "UPDATE user_input_document SET
                data = ?, schema_version = ?, revision = revision + 1, updated_at = ?
             WHERE owner_id = ? AND assessment_period = ? AND revision = ?",
        )
        .bind(sections_to_json(document)?)
        .bind(i64::from(document.schema_version))
        .bind(Utc::now())
        .bind(&key.owner_id)
        .bind(&key.assessment_period)
        .bind(document.revision)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(match self.stored_revision(&key).await? {
                Some(actual) => RepositoryError::Conflict {
                    expected: document.revision,
                    actual,
                },
                None => RepositoryError::NotFound,
            });
        }

        self.get_user_input(&key).await
    }

    async fn delete_user_input(
        &self,
        key: &UserInputKey,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM user_input_document WHERE owner_id = ? AND assessment_period = ?",
        )
        .bind(&key.owner_id)
        .bind(&key.assessment_period)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_user_inputs(
        &self,
        owner_id: &str,
    ) -> Result<Vec<UserInputDocument>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{SELECT_USER_INPUT} WHERE owner_id = ? ORDER BY assessment_period DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_user_input).collect()
    }
}
