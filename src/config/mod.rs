/// Database configuration and connection management
pub mod database;

/// Application settings and development seed data loaded from config.toml
pub mod settings;

/// Startup seeding of products and coupons
pub mod seed;
