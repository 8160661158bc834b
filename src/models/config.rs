use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::forms::listing::DeliveryDefaults;

/// Configuration options of the catalog service.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// Path of the SQLite database file.
    pub database_url: String,
    /// Directory receiving uploaded product pictures.
    pub upload_path: PathBuf,
    /// Glob passed to Tera, e.g. `templates/**/*`.
    pub templates_dir: String,
    /// Secret for the session and flash cookies, at least 64 bytes.
    pub secret: String,
    /// Number of passes used by the replicated listings.
    pub replicate_count: usize,
    /// Batch size of the paced listing.
    pub paced_batch_size: usize,
    /// Delay inserted before every element of the paced listing.
    pub paced_delay_ms: u64,
    /// Elements per flushed chunk in the chunked listing.
    pub chunk_size: usize,
    /// Seconds an untouched product draft is kept before it is dropped.
    pub draft_idle_secs: u64,
}

impl ServerConfig {
    /// Loads `config/default.yaml`, an optional `config/local.yaml` and
    /// `APP__*` environment overrides, in that order.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("address", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("database_url", "app.db")?
            .set_default("upload_path", "./uploads")?
            .set_default("templates_dir", "templates/**/*")?
            .set_default("replicate_count", 500)?
            .set_default("paced_batch_size", 2)?
            .set_default("paced_delay_ms", 1000)?
            .set_default("chunk_size", 64)?
            .set_default("draft_idle_secs", 1800)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn paced_delay(&self) -> Duration {
        Duration::from_millis(self.paced_delay_ms)
    }

    /// Fallbacks for listing requests that omit delivery parameters.
    /// Zero sizes are raised to one.
    pub fn delivery_defaults(&self) -> DeliveryDefaults {
        DeliveryDefaults {
            replicate_count: self.replicate_count,
            batch_size: NonZeroUsize::new(self.paced_batch_size).unwrap_or(NonZeroUsize::MIN),
            delay: self.paced_delay(),
        }
    }

    pub fn draft_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.draft_idle_secs)
    }

    pub fn chunk_size(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.chunk_size).unwrap_or(NonZeroUsize::MIN)
    }
}
