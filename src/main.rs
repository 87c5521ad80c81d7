//! audit-resolver binary.
//!
//! Reads an obfuscated audit log, resolves every opaque identifier against
//! the primary database, and writes the readable reconstruction.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use audit_resolver::{resolve_log_file, PgLookupStore, ResolverConfig, RowResolver};

#[derive(Parser)]
#[command(name = "audit-resolver")]
#[command(about = "Resolve opaque ids in an obfuscated audit log into readable names")]
struct Args {
    /// Obfuscated audit log to read
    input: PathBuf,

    /// Resolved output file to write
    output: PathBuf,

    /// Optional YAML configuration file
    #[arg(long, short = 'c')]
    config: Option<String>,

    /// Postgres connection string (falls back to DATABASE_URL, then config)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "audit_resolver=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ResolverConfig::from_file(path)
            .with_context(|| format!("loading configuration from {path}"))?,
        None => ResolverConfig::default(),
    };

    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .or_else(|| config.database_url.clone())
        .context("no database URL: pass --database-url, set DATABASE_URL, or add database_url to the config file")?;

    let store = Arc::new(
        PgLookupStore::connect(&database_url)
            .await
            .context("connecting to the audit database")?,
    );
    let server_version = store
        .server_version()
        .await
        .context("querying server version")?;
    tracing::info!(server = %server_version, "connected");

    let resolver = RowResolver::new(store.clone(), config.join_delimiter.clone());
    let stats = resolve_log_file(
        &resolver,
        &args.input,
        &args.output,
        config.delimiter_byte()?,
    )
    .await?;
    tracing::info!(rows = stats.rows, "run complete");

    store.close().await;
    Ok(())
}
