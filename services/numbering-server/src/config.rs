use std::net::SocketAddr;

use anyhow::{Context, Result};
use chrono::FixedOffset;

use crate::db::DbConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub log_level: String,
    pub dev_mode: bool,
    /// UTC offset, in minutes, used to derive the (year, month) period of a
    /// scope. Pinned per deployment so every instance agrees on the period
    /// regardless of its local clock.
    pub period_utc_offset_minutes: i32,
    pub database: DbConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let listen_addr = std::env::var("DOCNUM_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()?;

        let log_level = std::env::var("DOCNUM_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let dev_mode = std::env::var("DOCNUM_DEV")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        let period_utc_offset_minutes = std::env::var("DOCNUM_PERIOD_UTC_OFFSET_MINUTES")
            .ok()
            .map(|s| s.parse())
            .transpose()
            .context("DOCNUM_PERIOD_UTC_OFFSET_MINUTES must be an integer")?
            .unwrap_or(0);

        let database = DbConfig::from_env();

        let config = Self {
            listen_addr,
            log_level,
            dev_mode,
            period_utc_offset_minutes,
            database,
        };
        config.period_offset()?;

        Ok(config)
    }

    /// The configured period offset as a chrono type.
    pub fn period_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.period_utc_offset_minutes * 60).with_context(|| {
            format!(
                "DOCNUM_PERIOD_UTC_OFFSET_MINUTES out of range: {}",
                self.period_utc_offset_minutes
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_offset_rejects_out_of_range_values() {
        let config = Config {
            listen_addr: "127.0.0.1:8080".parse().unwrap(),
            log_level: "info".to_string(),
            dev_mode: true,
            period_utc_offset_minutes: 24 * 60,
            database: DbConfig::default(),
        };
        assert!(config.period_offset().is_err());
    }

    #[test]
    fn period_offset_accepts_warsaw_winter_time() {
        let config = Config {
            listen_addr: "127.0.0.1:8080".parse().unwrap(),
            log_level: "info".to_string(),
            dev_mode: true,
            period_utc_offset_minutes: 60,
            database: DbConfig::default(),
        };
        assert!(config.period_offset().is_ok());
    }
}
