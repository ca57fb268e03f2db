use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use estate_admin::db::{self, properties, users};
use estate_admin::models::property::{demo_catalog, Property};
use estate_admin::query::{self, Criteria};

#[derive(Parser, Debug)]
#[command(author, version, about = "estate-admin maintenance tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply pending migrations
    MigrateRun,
    /// Show migration status against the current database
    MigrateStatus,
    /// Create an ADMIN account (no-op when the email exists)
    CreateAdmin {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "ADMIN_PASSWORD")]
        password: String,
    },
    /// Insert the demo listings that are not present yet
    SeedDemo,
    /// Filter listings offline and print the matches
    Filter {
        /// JSON array of listings; the demo catalogue when omitted
        #[arg(long)]
        file: Option<PathBuf>,
        /// Criteria as a JSON object, e.g. '{"search":"casa","maxPrice":300000}'
        #[arg(long, default_value = "{}")]
        criteria: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Try to load env from CWD, then the crate-local `.env`.
    if dotenv().is_err() {
        let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(crate_env);
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::MigrateRun => {
            let pool = get_pool().await?;
            db::MIGRATOR.run(&pool).await?;
            println!("Migrations applied");
        }
        Commands::MigrateStatus => {
            let pool = get_pool().await?;
            print_status(&pool).await?;
        }
        Commands::CreateAdmin { name, email, password } => {
            let pool = get_pool().await?;
            db::MIGRATOR.run(&pool).await?;
            let admin = users::ensure_admin(&pool, &name, &email, &password).await?;
            println!("Admin ready: {} ({})", admin.email, admin.id);
        }
        Commands::SeedDemo => {
            let pool = get_pool().await?;
            db::MIGRATOR.run(&pool).await?;
            for listing in demo_catalog() {
                if properties::title_exists(&pool, &listing.title).await? {
                    println!("Skipped {} (already present)", listing.title);
                    continue;
                }
                let property = properties::insert(&pool, &listing).await?;
                println!("Inserted {} {}", property.id, property.title);
            }
        }
        Commands::Filter { file, criteria } => {
            let catalog = load_catalog(file)?;
            let matched = filter_catalog(&catalog, &criteria)?;

            println!("{:<28} {:<24} {:>10} {}", "Title", "Location", "Price", "Type");
            for property in &matched {
                println!(
                    "{:<28} {:<24} {:>10} {}",
                    property.title, property.location, property.price, property.property_type
                );
            }
            println!("{} of {} listings", matched.len(), catalog.len());
        }
    }

    Ok(())
}

fn filter_catalog(catalog: &[Property], criteria: &str) -> anyhow::Result<Vec<Property>> {
    let criteria: serde_json::Value = serde_json::from_str(criteria).context("criteria must be a JSON object")?;
    Ok(query::filter(catalog, &Criteria::from_json(criteria)))
}

fn load_catalog(file: Option<PathBuf>) -> anyhow::Result<Vec<Property>> {
    match file {
        Some(path) => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| format!("{} is not a listing array", path.display()))
        }
        None => {
            let now = Utc::now();
            Ok(demo_catalog()
                .into_iter()
                .map(|listing| listing.into_property(Uuid::new_v4(), now))
                .collect())
        }
    }
}

async fn get_pool() -> anyhow::Result<SqlitePool> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to database")
}

async fn print_status(pool: &SqlitePool) -> anyhow::Result<()> {
    // If the migrations table doesn't exist, nothing is applied yet
    let has_table = sqlx::query("SELECT name FROM sqlite_master WHERE type='table' AND name='_sqlx_migrations'")
        .fetch_optional(pool)
        .await?
        .is_some();
    let applied_versions: HashSet<i64> = if has_table {
        let rows = sqlx::query("SELECT version FROM _sqlx_migrations WHERE success = 1")
            .fetch_all(pool)
            .await?;
        rows.iter().filter_map(|row| row.try_get::<i64, _>("version").ok()).collect()
    } else {
        HashSet::new()
    };

    println!("{:<8} {:<20} {}", "Status", "Version", "Name");
    for migration in db::MIGRATOR.iter() {
        let status = if applied_versions.contains(&migration.version) { "applied" } else { "pending" };
        let desc = migration.description.trim();
        let name = if desc.is_empty() { "unknown" } else { desc };
        println!("{:<8} {:<20} {}", status, migration.version, name);
    }

    Ok(())
}
