//! Application settings loaded from config.toml
//!
//! Every section is optional; a missing file yields [`AppConfig::default`]. The
//! `[[products]]` and `[[coupons]]` tables seed a fresh development database.

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Order workflow policy
    #[serde(default)]
    pub orders: OrderPolicy,
    /// Products to seed when missing
    #[serde(default)]
    pub products: Vec<ProductSeed>,
    /// Coupons to seed when missing
    #[serde(default)]
    pub coupons: Vec<CouponSeed>,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `"0.0.0.0:8000"`
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".to_string()
}

/// Knobs for the order status machine
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OrderPolicy {
    /// Give the coupon use back when an order is rejected
    #[serde(default = "default_true")]
    pub release_coupon_on_reject: bool,
}

impl Default for OrderPolicy {
    fn default() -> Self {
        Self {
            release_coupon_on_reject: true,
        }
    }
}

const fn default_true() -> bool {
    true
}

/// A catalog product to seed
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSeed {
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
}

/// A coupon to seed
#[derive(Debug, Clone, Deserialize)]
pub struct CouponSeed {
    pub code: String,
    /// `"percentage"` or `"fixed"`
    pub discount_type: crate::entities::coupon::DiscountType,
    pub value: Decimal,
    pub expiry_date: DateTime<Utc>,
    #[serde(default = "default_usage_limit")]
    pub usage_limit: i32,
    #[serde(default)]
    pub min_purchase_amount: Decimal,
}

const fn default_usage_limit() -> i32 {
    1
}

/// Parses configuration from a TOML string.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from a TOML file. A missing file yields the defaults.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No configuration file at {:?}, using defaults", path);
        return Ok(AppConfig::default());
    }

    debug!("Loading configuration from {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;
    parse_config(&contents)
}

/// Loads configuration from `STOREFRONT_CONFIG`, or ./config.toml when unset.
pub fn load_default_config() -> Result<AppConfig> {
    let path =
        std::env::var("STOREFRONT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config(path)
}
