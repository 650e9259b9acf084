use std::path::PathBuf;

use async_trait::async_trait;
use itr_core::db::{DbConfig, RepositoryError, RepositoryFactory, ReturnRepository};
use tracing::info;

use crate::repository::SqliteRepository;

/// Resolve the seeds directory at runtime.
///
/// Resolution order:
/// 1. **`ITR_DB_SQLITE_SEEDS_DIR`** if set.
/// 2. **`./seeds`** if it exists in the current working directory.
/// 3. **`$CARGO_MANIFEST_DIR/seeds`** as a last resort.
fn seeds_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ITR_DB_SQLITE_SEEDS_DIR") {
        return PathBuf::from(dir);
    }
    let cwd_seeds = PathBuf::from("./seeds");
    if cwd_seeds.is_dir() {
        return cwd_seeds;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("seeds")
}

/// Maps a config connection string to a sqlx URL. Bare paths are created
/// on first use.
fn database_url(connection_string: &str) -> String {
    match connection_string {
        ":memory:" => "sqlite::memory:".to_string(),
        s if s.starts_with("sqlite:") => s.to_string(),
        path => format!("sqlite:{}?mode=rwc", path),
    }
}

/// [`RepositoryFactory`] for SQLite.
///
/// ```rust,no_run
/// use itr_core::db::RepositoryRegistry;
/// use itr_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Opens the database, runs migrations and applies the seed files.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn ReturnRepository>, RepositoryError> {
        let url = database_url(&config.connection_string);
        let repo = SqliteRepository::new(&url)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{:#}", e)))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{:#}", e)))?;
        repo.run_seeds(&seeds_dir())
            .await
            .map_err(|e| RepositoryError::Database(format!("{:#}", e)))?;

        info!(url = %url, "sqlite repository ready");
        Ok(Box::new(repo))
    }
}
