//! Configuration loading from TOML.
//!
//! Reads `config.toml` (or the path in `BANCA_CONFIG`) and deserializes it
//! into strongly-typed structs. Every section is optional and falls back to
//! its defaults.

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fs;

use crate::display::MoneyFormat;
use crate::engine::parse_stake;

/// Default config file path, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub session: SessionConfig,
    pub display: MoneyFormat,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    pub name: String,
    /// Stake pre-filled for new players. Empty means "no default".
    pub base_bet: String,
    /// Quick-pick base bet values offered to the table.
    pub bet_presets: Vec<Decimal>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "Mesa".to_string(),
            base_bet: String::new(),
            bet_presets: vec![dec!(1), dec!(2), dec!(5), dec!(10)],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the table could never use.
    pub fn validate(&self) -> Result<()> {
        let base = self.session.base_bet.trim();
        if !base.is_empty() && parse_stake(base).is_none() {
            bail!("session.base_bet must be a positive amount, got {base:?}");
        }
        if let Some(bad) = self.session.bet_presets.iter().find(|p| **p <= Decimal::ZERO) {
            bail!("session.bet_presets must be positive, got {bad}");
        }
        if self.display.currency_symbol.trim().is_empty() {
            bail!("display.currency_symbol cannot be empty");
        }
        Ok(())
    }
}
