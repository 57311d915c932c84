//! Runtime configuration from environment variables.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_DB_PATH: &str = ".biblecloud_db";
pub const DEFAULT_CATALOG_PATH: &str = "static/bible_chapters.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: String,
    pub db_path: PathBuf,
    pub catalog_path: PathBuf,
    /// Session signing secret. `None` means a random one per process.
    pub secret: Option<Vec<u8>>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            addr: non_empty("BIBLECLOUD_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            db_path: PathBuf::from(
                non_empty("BIBLECLOUD_DB").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            ),
            catalog_path: PathBuf::from(
                non_empty("BIBLECLOUD_CATALOG").unwrap_or_else(|| DEFAULT_CATALOG_PATH.to_string()),
            ),
            secret: non_empty("BIBLECLOUD_SECRET").map(String::into_bytes),
        }
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(mut self, addr: Option<String>, db: Option<String>, catalog: Option<String>) -> Self {
        if let Some(addr) = addr {
            self.addr = addr;
        }
        if let Some(db) = db {
            self.db_path = PathBuf::from(db);
        }
        if let Some(catalog) = catalog {
            self.catalog_path = PathBuf::from(catalog);
        }
        self
    }
}
