use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::store::StoreTimings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    File,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "memory" => Ok(StorageBackend::Memory),
            other => bail!("Unknown storage backend '{other}' (expected 'file' or 'memory')"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub storage_backend: StorageBackend,
    pub storage_dir: PathBuf,
    pub autosave_delay_ms: u64,
    pub saved_status_ms: u64,
    /// Writing aids are disabled when unset.
    pub anthropic_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            storage_backend: parse_env("STORAGE_BACKEND", StorageBackend::File)?,
            storage_dir: std::env::var("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            autosave_delay_ms: parse_env("AUTOSAVE_DELAY_MS", 1500)?,
            saved_status_ms: parse_env("SAVED_STATUS_MS", 2000)?,
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
        })
    }

    pub fn store_timings(&self) -> StoreTimings {
        StoreTimings {
            autosave_delay: Duration::from_millis(self.autosave_delay_ms),
            saved_display: Duration::from_millis(self.saved_status_ms),
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_parses_case_insensitively() {
        assert_eq!("File".parse::<StorageBackend>().unwrap(), StorageBackend::File);
        assert_eq!(" memory ".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("redis".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u64 = parse_env("RESUME_API_TEST_SURELY_UNSET", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_store_timings_from_millis() {
        let config = Config {
            port: 8080,
            rust_log: "info".to_string(),
            storage_backend: StorageBackend::Memory,
            storage_dir: PathBuf::from("./data"),
            autosave_delay_ms: 1500,
            saved_status_ms: 2000,
            anthropic_api_key: None,
        };
        let timings = config.store_timings();
        assert_eq!(timings.autosave_delay, Duration::from_millis(1500));
        assert_eq!(timings.saved_display, Duration::from_millis(2000));
    }
}
