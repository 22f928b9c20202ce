use anyhow::Result;
use axum::Router;
use services::{gallery_service::GalleryService, storage_service::StorageService};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{fs, io::ErrorKind, path::Path, str::FromStr, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;
mod state;
mod tasks;

#[cfg(test)]
mod tests;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub gallery: GalleryService,
    pub storage: StorageService,
    pub site_name: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + task flags ---
    let (cfg, task_flags) = config::AppConfig::from_env_and_args()?;

    tracing::info!("Starting portfolio with config: {:?}", cfg);

    // --- Ensure storage directory exists ---
    if !Path::new(&cfg.storage_dir).exists() {
        fs::create_dir_all(&cfg.storage_dir)?;
        tracing::info!("Created storage directory at {}", cfg.storage_dir);
    }

    // --- Initialize SQLite connection ---
    let db_path = cfg
        .database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("file:");
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }

    let db: Arc<SqlitePool> = Arc::new(connect_db(&cfg.database_url).await?);

    // --- Batch-task mode: run requested tasks and exit ---
    if task_flags.any() {
        if task_flags.migrate {
            run_migrations(&db).await?;
            tracing::info!("Database migration complete.");
        }
        if task_flags.migrate_tags {
            let report = tasks::migrate_tags::run(&db).await?;
            tracing::info!(
                scanned = report.scanned,
                migrated = report.migrated,
                failed = report.failed,
                "Tag migration complete."
            );
        }
        if task_flags.sweep_orphans {
            let storage = StorageService::new(cfg.storage_dir.clone(), cfg.public_url.clone());
            let report =
                tasks::sweep_orphans::run(&db, &storage, tasks::sweep_orphans::DEFAULT_MIN_AGE)
                    .await?;
            tracing::info!(
                scanned = report.scanned,
                removed = report.removed,
                kept_young = report.kept_young,
                "Orphan sweep complete."
            );
        }
        return Ok(());
    }

    // --- Initialize core services ---
    let app_state = AppState {
        gallery: GalleryService::new(db.clone()),
        storage: StorageService::new(cfg.storage_dir.clone(), cfg.public_url.clone()),
        site_name: cfg.site_name.clone(),
    };

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(app_state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Open the SQLite pool, creating the database file on first run.
/// The driver refuses to create missing files unless asked.
pub(crate) async fn connect_db(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Apply the embedded schema, statement by statement.
pub(crate) async fn run_migrations(db: &SqlitePool) -> Result<()> {
    let sql = include_str!("../migrations/0001_init.sql");
    let statements = sql
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    tracing::info!("Running {} migration statements...", statements.len());

    for stmt in statements {
        tracing::debug!("Executing migration SQL: {}", stmt);
        sqlx::query(stmt).execute(db).await?;
    }

    Ok(())
}
