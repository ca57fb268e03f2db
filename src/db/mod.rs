use std::time::Duration;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub mod properties;
pub mod users;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

pub async fn init() -> anyhow::Result<SqlitePool> {
	let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;

	let pool = SqlitePoolOptions::new()
		.max_connections(10)
		.min_connections(1)
		.acquire_timeout(Duration::from_secs(10))
		.connect(&database_url)
		.await
		.context("failed to connect to database")?;

	MIGRATOR
		.run(&pool)
		.await
		.context("failed to run migrations")?;

	Ok(pool)
}

/// Open (creating if needed) a SQLite file and apply migrations.
pub async fn open_file(path: &std::path::Path) -> anyhow::Result<SqlitePool> {
	let opts = SqliteConnectOptions::new()
		.filename(path)
		.create_if_missing(true);
	let pool = SqlitePool::connect_with(opts)
		.await
		.with_context(|| format!("failed to open {}", path.display()))?;

	MIGRATOR
		.run(&pool)
		.await
		.context("failed to run migrations")?;

	Ok(pool)
}
