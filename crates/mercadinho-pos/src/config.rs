//! # POS Configuration
//!
//! Configuration management for the POS service.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MERCADINHO_DB_PATH=/var/lib/mercadinho/pos.db                      │
//! │     MERCADINHO_RECEIPT_DIR=/var/spool/cupons                           │
//! │     MERCADINHO_REFRESH_SECS=60                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/mercadinho-pos/pos.toml (Linux)                          │
//! │     ~/Library/Application Support/br.mercadinho.mercadinho-pos/        │
//! │         pos.toml (macOS)                                               │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     Store header for the printed coupon, 40-column receipts,           │
//! │     5-minute dashboard refresh                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # pos.toml
//! [store]
//! name = "MINI MERCADINHOS"
//! cnpj = "00.000.000/0001-00"
//! address = "Rua Exemplo, 123 - Cidade - Estado"
//! phone = "CEP: 12345-678 - Tel: (11) 1234-5678"
//!
//! [database]
//! path = "mercadinho.db"
//!
//! [receipt]
//! width = 40
//! output_dir = "cupons"
//!
//! [dashboard]
//! refresh_secs = 300
//! top_n = 5
//!
//! [inventory]
//! low_stock_threshold = 10
//! restock_top_up = 10
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use mercadinho_core::{Quantity, DASHBOARD_TOP_N, LOW_STOCK_THRESHOLD, RESTOCK_TOP_UP};

// =============================================================================
// Config Error
// =============================================================================

/// Errors raised while loading, saving or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    LoadFailed(String),

    /// Failed to write the config file.
    #[error("Failed to save config: {0}")]
    SaveFailed(String),

    /// Configuration is present but nonsensical.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::SaveFailed(err.to_string())
    }
}

/// Result type alias for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Store Identity
// =============================================================================

/// The four header lines printed at the top of every coupon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreInfo {
    /// Store display name (first, largest line of the coupon).
    #[serde(default = "default_store_name")]
    pub name: String,

    /// CNPJ shown as `CNPJ: <value>` on the coupon.
    #[serde(default = "default_cnpj")]
    pub cnpj: String,

    /// Street address line.
    #[serde(default = "default_address")]
    pub address: String,

    /// Postal code and phone line, printed as-is.
    #[serde(default = "default_phone")]
    pub phone: String,
}

fn default_store_name() -> String {
    "MINI MERCADINHOS".to_string()
}

fn default_cnpj() -> String {
    "00.000.000/0001-00".to_string()
}

fn default_address() -> String {
    "Rua Exemplo, 123 - Cidade - Estado".to_string()
}

fn default_phone() -> String {
    "CEP: 12345-678 - Tel: (11) 1234-5678".to_string()
}

impl Default for StoreInfo {
    fn default() -> Self {
        StoreInfo {
            name: default_store_name(),
            cnpj: default_cnpj(),
            address: default_address(),
            phone: default_phone(),
        }
    }
}

// =============================================================================
// Database Settings
// =============================================================================

/// Where the SQLite state store lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("mercadinho.db"))
        .unwrap_or_else(|| PathBuf::from("mercadinho.db"))
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
        }
    }
}

// =============================================================================
// Receipt Settings
// =============================================================================

/// Coupon rendering and output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptSettings {
    /// Coupon width in characters. Thermal paper defaults to 40 columns.
    #[serde(default = "default_receipt_width")]
    pub width: usize,

    /// Directory where `cupom_fiscal_<number>.txt` files are written.
    #[serde(default = "default_receipt_dir")]
    pub output_dir: PathBuf,
}

fn default_receipt_width() -> usize {
    40
}

fn default_receipt_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("cupons"))
        .unwrap_or_else(|| PathBuf::from("cupons"))
}

impl Default for ReceiptSettings {
    fn default() -> Self {
        ReceiptSettings {
            width: default_receipt_width(),
            output_dir: default_receipt_dir(),
        }
    }
}

// =============================================================================
// Dashboard Settings
// =============================================================================

/// Background dashboard refresher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSettings {
    /// Seconds between automatic snapshot refreshes.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,

    /// How many rows the ranked lists show (top products, low stock).
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_refresh_secs() -> u64 {
    300
}

fn default_top_n() -> usize {
    DASHBOARD_TOP_N
}

impl Default for DashboardSettings {
    fn default() -> Self {
        DashboardSettings {
            refresh_secs: default_refresh_secs(),
            top_n: default_top_n(),
        }
    }
}

// =============================================================================
// Inventory Settings
// =============================================================================

/// Stock alert thresholds, in whole units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySettings {
    /// Stock at or below this level counts as running low.
    #[serde(default = "default_low_stock")]
    pub low_stock_threshold: i64,

    /// Extra buffer a restock suggestion adds on top of the threshold.
    #[serde(default = "default_top_up")]
    pub restock_top_up: i64,
}

fn default_low_stock() -> i64 {
    LOW_STOCK_THRESHOLD.units()
}

fn default_top_up() -> i64 {
    RESTOCK_TOP_UP.units()
}

impl Default for InventorySettings {
    fn default() -> Self {
        InventorySettings {
            low_stock_threshold: default_low_stock(),
            restock_top_up: default_top_up(),
        }
    }
}

// =============================================================================
// Main POS Configuration
// =============================================================================

/// Complete POS service configuration.
///
/// ## Example Config File
/// ```toml
/// [store]
/// name = "MINI MERCADINHOS"
/// cnpj = "00.000.000/0001-00"
///
/// [database]
/// path = "mercadinho.db"
///
/// [receipt]
/// width = 40
/// output_dir = "cupons"
///
/// [dashboard]
/// refresh_secs = 300
/// top_n = 5
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PosConfig {
    /// Store identity printed on every coupon.
    #[serde(default)]
    pub store: StoreInfo,

    /// Database location.
    #[serde(default)]
    pub database: DatabaseSettings,

    /// Receipt rendering and output.
    #[serde(default)]
    pub receipt: ReceiptSettings,

    /// Dashboard refresher behavior.
    #[serde(default)]
    pub dashboard: DashboardSettings,

    /// Stock alert thresholds.
    #[serde(default)]
    pub inventory: InventorySettings,
}

impl PosConfig {
    /// Creates a config with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (pos.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading POS config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if the load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load POS config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::SaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        info!(?path, "POS config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.name.trim().is_empty() {
            return Err(ConfigError::Invalid("store name must not be blank".into()));
        }

        if self.receipt.width == 0 {
            return Err(ConfigError::Invalid(
                "receipt width must be greater than 0".into(),
            ));
        }

        if self.dashboard.top_n == 0 {
            return Err(ConfigError::Invalid(
                "dashboard top_n must be greater than 0".into(),
            ));
        }

        // A zero interval would spin the refresher loop.
        if self.dashboard.refresh_secs == 0 {
            return Err(ConfigError::Invalid(
                "dashboard refresh_secs must be greater than 0".into(),
            ));
        }

        if self.inventory.low_stock_threshold < 0 || self.inventory.restock_top_up < 0 {
            return Err(ConfigError::Invalid(
                "inventory thresholds must not be negative".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("MERCADINHO_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(dir) = std::env::var("MERCADINHO_RECEIPT_DIR") {
            debug!(dir = %dir, "Overriding receipt directory from environment");
            self.receipt.output_dir = PathBuf::from(dir);
        }

        if let Ok(secs) = std::env::var("MERCADINHO_REFRESH_SECS") {
            match secs.parse::<u64>() {
                Ok(parsed) => {
                    debug!(secs = parsed, "Overriding refresh interval from environment");
                    self.dashboard.refresh_secs = parsed;
                }
                Err(_) => warn!(secs = %secs, "Ignoring non-numeric MERCADINHO_REFRESH_SECS"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("pos.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Dashboard refresh interval as a `Duration`.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.dashboard.refresh_secs)
    }

    /// Low-stock threshold as a quantity.
    pub fn low_stock_threshold(&self) -> Quantity {
        Quantity::from_units(self.inventory.low_stock_threshold)
    }

    /// Restock top-up as a quantity.
    pub fn restock_top_up(&self) -> Quantity {
        Quantity::from_units(self.inventory.restock_top_up)
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("br", "mercadinho", "mercadinho-pos")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PosConfig::default();
        assert_eq!(config.store.name, "MINI MERCADINHOS");
        assert_eq!(config.store.cnpj, "00.000.000/0001-00");
        assert_eq!(config.receipt.width, 40);
        assert_eq!(config.dashboard.refresh_secs, 300);
        assert_eq!(config.dashboard.top_n, 5);
        assert_eq!(config.low_stock_threshold(), Quantity::from_units(10));
        assert_eq!(config.restock_top_up(), Quantity::from_units(10));
    }

    #[test]
    fn test_config_validation() {
        let mut config = PosConfig::default();
        assert!(config.validate().is_ok());

        config.receipt.width = 0;
        assert!(config.validate().is_err());

        config.receipt.width = 40;
        config.store.name = "   ".to_string();
        assert!(config.validate().is_err());

        config.store.name = "Mercadinho da Ana".to_string();
        config.dashboard.top_n = 0;
        assert!(config.validate().is_err());

        config.dashboard.top_n = 5;
        config.dashboard.refresh_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PosConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[receipt]"));

        let parsed: PosConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.store.name, config.store.name);
        assert_eq!(parsed.receipt.width, config.receipt.width);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let parsed: PosConfig = toml::from_str(
            r#"
            [store]
            name = "Mercadinho do Zé"

            [dashboard]
            refresh_secs = 60
            "#,
        )
        .unwrap();

        assert_eq!(parsed.store.name, "Mercadinho do Zé");
        assert_eq!(parsed.store.cnpj, "00.000.000/0001-00");
        assert_eq!(parsed.dashboard.refresh_secs, 60);
        assert_eq!(parsed.dashboard.top_n, 5);
        assert_eq!(parsed.receipt.width, 40);
    }

    #[test]
    fn test_refresh_interval() {
        let mut config = PosConfig::default();
        config.dashboard.refresh_secs = 60;
        assert_eq!(config.refresh_interval(), Duration::from_secs(60));
    }
}
