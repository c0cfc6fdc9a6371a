//! Seeds development catalog data from config.toml.
//!
//! Entries that already exist (products by name, coupons by code) are skipped, so
//! seeding can run on every startup.

use crate::{
    config::settings::AppConfig,
    core::{
        auth::Actor,
        coupon::{self, NewCoupon},
        product,
    },
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tracing::{debug, info, instrument, warn};

/// Identity used for writes made by the application itself.
const SYSTEM_ACTOR: Actor = Actor::admin(0);

/// Inserts configured products and coupons that are missing from the database.
///
/// Returns the number of rows created.
#[instrument(skip(db, config))]
pub async fn seed_catalog(db: &DatabaseConnection, config: &AppConfig) -> Result<usize> {
    info!(
        "Seeding catalog: {} products, {} coupons configured",
        config.products.len(),
        config.coupons.len()
    );
    let mut created = 0;

    for seed in &config.products {
        if product::get_product_by_name(db, seed.name.trim()).await?.is_some() {
            debug!("Product '{}' already exists, skipping", seed.name);
            continue;
        }
        product::create_product(db, seed.name.clone(), seed.price, seed.stock).await?;
        created += 1;
    }

    for seed in &config.coupons {
        if coupon::find_by_code(db, &seed.code).await?.is_some() {
            debug!("Coupon '{}' already exists, skipping", seed.code);
            continue;
        }
        let new = NewCoupon {
            code: seed.code.clone(),
            discount_type: seed.discount_type,
            value: seed.value,
            expiry_date: seed.expiry_date,
            usage_limit: seed.usage_limit,
            min_purchase_amount: seed.min_purchase_amount,
            active: true,
        };
        if let Err(e) = coupon::create_coupon(db, &SYSTEM_ACTOR, new).await {
            warn!("Skipping coupon '{}': {}", seed.code, e);
            continue;
        }
        created += 1;
    }

    info!("Seeding complete, {} rows created", created);
    Ok(created)
}
