use std::path::PathBuf;

use anyhow::{Context, Result};
use kirana_core::SEED_ROWS;

const DEFAULT_EXPORT_DIR: &str = "exports";
const DEFAULT_BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    pub http_addr: String,
    pub export_dir: PathBuf,
    pub body_limit_bytes: usize,
    pub seed_rows: usize,
}

impl ServiceConfig {
    pub fn from_env(default_http_addr: &str) -> Result<Self> {
        Self::from_lookup(default_http_addr, |key| std::env::var(key).ok())
    }

    pub fn from_lookup(
        default_http_addr: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let http_addr = lookup("HTTP_ADDR").unwrap_or_else(|| default_http_addr.to_string());
        let export_dir = lookup("EXPORT_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR));
        let body_limit_bytes = match lookup("BODY_LIMIT_BYTES") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("BODY_LIMIT_BYTES must be a byte count, got '{raw}'"))?,
            None => DEFAULT_BODY_LIMIT_BYTES,
        };
        let seed_rows = match lookup("SEED_ROWS") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("SEED_ROWS must be a row count, got '{raw}'"))?
                .max(1),
            None => SEED_ROWS,
        };

        Ok(Self {
            http_addr,
            export_dir,
            body_limit_bytes,
            seed_rows,
        })
    }
}
