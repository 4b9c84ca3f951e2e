//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Pricing defaults.
    #[serde(default)]
    pub pricing: PricingConfig,
    /// Inventory defaults.
    #[serde(default)]
    pub inventory: InventoryConfig,
    /// Authorization defaults.
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Which store backs the repositories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// PostgreSQL through SeaORM.
    #[default]
    Postgres,
    /// Process-local tables, lost on restart.
    Memory,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Store implementation to use.
    #[serde(default)]
    pub backend: StoreBackend,
    /// Database connection URL. Required for the postgres backend.
    #[serde(default)]
    pub url: Option<String>,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    28_800 // one shift
}

/// Pricing defaults applied when a document does not carry its own values.
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    /// Tax percent applied when a document leaves it unset.
    #[serde(default = "default_tax_percent")]
    pub default_tax_percent: Decimal,
    /// Symbol appended to formatted amounts.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            default_tax_percent: default_tax_percent(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

fn default_tax_percent() -> Decimal {
    Decimal::from(14)
}

fn default_currency_symbol() -> String {
    "ج.م".to_string()
}

/// Inventory defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryConfig {
    /// Quantity at or below which a part without its own minimum is low.
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i32,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: default_low_stock_threshold(),
        }
    }
}

fn default_low_stock_threshold() -> i32 {
    5
}

/// Authorization defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Role assumed for tokens that carry none. Unset means such tokens are
    /// refused.
    #[serde(default)]
    pub default_role: Option<String>,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("HIVEDRIVE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
