use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use url::Url;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments; CLI wins.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub storage_dir: String,
    pub public_url: Url,
    pub site_name: String,
}

/// Batch-task flags. When any is set the process runs the requested tasks
/// and exits instead of serving.
#[derive(Debug, Clone, Copy)]
pub struct TaskFlags {
    pub migrate: bool,
    pub migrate_tags: bool,
    pub sweep_orphans: bool,
}

impl TaskFlags {
    pub fn any(&self) -> bool {
        self.migrate || self.migrate_tags || self.sweep_orphans
    }
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Art portfolio gallery API")]
pub struct Args {
    /// Host to bind to (overrides PORTFOLIO_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PORTFOLIO_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides PORTFOLIO_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Directory where image payloads are stored (overrides PORTFOLIO_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Public base URL for served media (overrides PORTFOLIO_PUBLIC_URL)
    #[arg(long)]
    pub public_url: Option<String>,

    /// Display name for the site (overrides PORTFOLIO_SITE_NAME)
    #[arg(long)]
    pub site_name: Option<String>,

    /// Apply the database schema and exit
    #[arg(long)]
    pub migrate: bool,

    /// Migrate legacy single-tag records to tag lists and exit
    #[arg(long)]
    pub migrate_tags: bool,

    /// Remove stored files no image record references and exit
    #[arg(long)]
    pub sweep_orphans: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and task flags.
    ///
    /// Storage settings have no defaults: a missing storage directory or
    /// public URL fails here, before anything binds or connects.
    pub fn from_env_and_args() -> Result<(Self, TaskFlags)> {
        let args = Args::parse();

        let env_host = env::var("PORTFOLIO_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("PORTFOLIO_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing PORTFOLIO_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading PORTFOLIO_PORT"),
        };
        let env_db = env::var("PORTFOLIO_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/portfolio.db".into());

        let storage_dir = args
            .storage_dir
            .or_else(|| env::var("PORTFOLIO_STORAGE_DIR").ok())
            .context("PORTFOLIO_STORAGE_DIR is required (image storage directory)")?;

        let public_url_raw = args
            .public_url
            .or_else(|| env::var("PORTFOLIO_PUBLIC_URL").ok())
            .context("PORTFOLIO_PUBLIC_URL is required (public base URL for media)")?;
        let public_url = Url::parse(&public_url_raw)
            .with_context(|| format!("parsing PORTFOLIO_PUBLIC_URL value `{}`", public_url_raw))?;

        let site_name = args
            .site_name
            .or_else(|| env::var("PORTFOLIO_SITE_NAME").ok())
            .unwrap_or_else(|| "Portfolio".into());

        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            storage_dir,
            public_url,
            site_name,
        };

        let tasks = TaskFlags {
            migrate: args.migrate,
            migrate_tags: args.migrate_tags,
            sweep_orphans: args.sweep_orphans,
        };

        Ok((cfg, tasks))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
