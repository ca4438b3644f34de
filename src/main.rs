use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use std::{fs, io::ErrorKind, path::Path, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use wedding_gallery::{
    AppState, app,
    config::AppConfig,
    services::{
        clock::SystemClock,
        resources::{DiskResources, MemoryResources, ResourceStore},
        slot_store::{MemorySlotStore, SlotStore, SqliteSlotStore},
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting wedding-gallery with config: {:?}", cfg);

    // --- Storage backends ---
    let (slots, resources): (Arc<dyn SlotStore>, Arc<dyn ResourceStore>) = if cfg.in_memory {
        if migrate {
            anyhow::bail!("--migrate has nothing to do with in-memory storage");
        }
        tracing::info!("Using in-memory photo slot and resources");
        (
            Arc::new(MemorySlotStore::new()),
            Arc::new(MemoryResources::new()),
        )
    } else {
        if !Path::new(&cfg.storage_dir).exists() {
            fs::create_dir_all(&cfg.storage_dir)?;
            tracing::info!("Created storage directory at {}", cfg.storage_dir);
        }

        let slots = connect_sqlite(&cfg.database_url).await?;
        slots.migrate().await?;
        if migrate {
            tracing::info!("Database migration complete.");
            return Ok(()); // exit after migration
        }

        (
            Arc::new(slots),
            Arc::new(DiskResources::new(cfg.storage_dir.clone())),
        )
    };

    // --- Gallery session ---
    let state = AppState::new(slots, resources, Arc::new(SystemClock), cfg.timings);
    let _listener = state.start();

    let router = app(state, cfg.max_upload_bytes);

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

    tracing::info!("Gallery listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;

    Ok(())
}

/// Open the SQLite database behind `db_url`, creating its file and parent
/// directory when missing.
async fn connect_sqlite(db_url: &str) -> Result<SqliteSlotStore> {
    tracing::debug!("Connecting using raw URL => {}", db_url);

    // Extract the local file path SQLx will use
    let db_path = db_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("file:");
    let db_path_obj = Path::new(db_path);

    if let Some(parent) = db_path_obj.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }

    match fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(db_path)
    {
        Ok(_) => tracing::debug!("Database file {} is ready", db_path),
        Err(e) => tracing::warn!("Failed to open database file manually: {}", e),
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    Ok(SqliteSlotStore::new(Arc::new(pool)))
}
