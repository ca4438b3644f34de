use anyhow::{Context, Result};
use clap::Parser;
use std::{env, fmt::Display, str::FromStr, time::Duration};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub database_url: String,
    /// Keep photos and resources in memory instead of SQLite + disk.
    pub in_memory: bool,
    pub timings: GalleryTimings,
    pub max_upload_bytes: usize,
}

/// Simulated latencies of the gallery session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GalleryTimings {
    /// Delay between upload progress steps.
    pub step_delay: Duration,
    /// Artificial fetch latency of a gallery load.
    pub load_delay: Duration,
    /// How long a settled upload batch stays visible.
    pub clear_delay: Duration,
}

impl Default for GalleryTimings {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_millis(200),
            load_delay: Duration::from_millis(1000),
            clear_delay: Duration::from_millis(2000),
        }
    }
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Wedding photo gallery")]
pub struct Args {
    /// Host to bind to (overrides WEDDING_GALLERY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides WEDDING_GALLERY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory for uploaded image bytes (overrides WEDDING_GALLERY_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Database URL (overrides WEDDING_GALLERY_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Keep everything in memory (overrides WEDDING_GALLERY_IN_MEMORY)
    #[arg(long)]
    pub memory: bool,

    /// Milliseconds between upload progress steps (overrides WEDDING_GALLERY_STEP_DELAY_MS)
    #[arg(long)]
    pub step_delay_ms: Option<u64>,

    /// Milliseconds of simulated gallery load latency (overrides WEDDING_GALLERY_LOAD_DELAY_MS)
    #[arg(long)]
    pub load_delay_ms: Option<u64>,

    /// Milliseconds a settled upload batch stays visible (overrides WEDDING_GALLERY_CLEAR_DELAY_MS)
    #[arg(long)]
    pub clear_delay_ms: Option<u64>,

    /// Maximum request body size for uploads (overrides WEDDING_GALLERY_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let migrate = args.migrate;
        Ok((Self::from_args(args)?, migrate))
    }

    /// Merge already-parsed arguments over the environment and defaults.
    pub fn from_args(args: Args) -> Result<Self> {
        // --- Environment fallback ---
        let env_host = env::var("WEDDING_GALLERY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = env_parse("WEDDING_GALLERY_PORT", 3000u16)?;
        let env_storage =
            env::var("WEDDING_GALLERY_STORAGE_DIR").unwrap_or_else(|_| "./data/uploads".into());
        let env_db = env::var("WEDDING_GALLERY_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/meta/gallery.db".into());
        let env_memory = env_parse("WEDDING_GALLERY_IN_MEMORY", false)?;

        let defaults = GalleryTimings::default();
        let step_ms = match args.step_delay_ms {
            Some(ms) => ms,
            None => env_parse("WEDDING_GALLERY_STEP_DELAY_MS", millis(defaults.step_delay))?,
        };
        let load_ms = match args.load_delay_ms {
            Some(ms) => ms,
            None => env_parse("WEDDING_GALLERY_LOAD_DELAY_MS", millis(defaults.load_delay))?,
        };
        let clear_ms = match args.clear_delay_ms {
            Some(ms) => ms,
            None => env_parse("WEDDING_GALLERY_CLEAR_DELAY_MS", millis(defaults.clear_delay))?,
        };
        let max_upload_bytes = match args.max_upload_bytes {
            Some(bytes) => bytes,
            None => env_parse("WEDDING_GALLERY_MAX_UPLOAD_BYTES", 25 * 1024 * 1024usize)?,
        };

        // --- Merge ---
        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            database_url: args.database_url.unwrap_or(env_db),
            in_memory: args.memory || env_memory,
            timings: GalleryTimings {
                step_delay: Duration::from_millis(step_ms),
                load_delay: Duration::from_millis(load_ms),
                clear_delay: Duration::from_millis(clear_ms),
            },
            max_upload_bytes,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn millis(duration: Duration) -> u64 {
    duration.as_millis() as u64
}

/// Read and parse an environment variable, falling back to `default` when unset.
fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|err| anyhow::anyhow!("{}", err))
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_defaults() {
        let args = Args::try_parse_from([
            "wedding-gallery",
            "--port",
            "8080",
            "--memory",
            "--step-delay-ms",
            "5",
        ])
        .unwrap();
        let cfg = AppConfig::from_args(args).unwrap();
        assert_eq!(cfg.port, 8080);
        assert!(cfg.in_memory);
        assert_eq!(cfg.timings.step_delay, Duration::from_millis(5));
        assert_eq!(cfg.addr(), format!("{}:8080", cfg.host));
    }

    #[test]
    fn default_timings_match_the_gallery_pacing() {
        let timings = GalleryTimings::default();
        assert_eq!(timings.step_delay, Duration::from_millis(200));
        assert_eq!(timings.load_delay, Duration::from_secs(1));
        assert_eq!(timings.clear_delay, Duration::from_secs(2));
    }

    #[test]
    fn migrate_flag_parses() {
        let args = Args::try_parse_from(["wedding-gallery", "--migrate"]).unwrap();
        assert!(args.migrate);
    }
}
