//! Database configuration module for the storefront backend.
//!
//! This module handles database connection setup and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema, including foreign keys and unique constraints, always matches the Rust
//! models without hand-written SQL.

use crate::entities::{AuditLog, Coupon, Order, OrderItem, OrderSequence, Product};
use crate::errors::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/storefront.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable,
/// falling back to a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Pooled connections to a file-backed database
const FILE_POOL_CONNECTIONS: u32 = 5;

/// Establishes a connection to the database at `database_url`.
///
/// An in-memory `SQLite` database only exists per connection, so it is pinned to a single
/// pooled connection. File databases get a real pool; writers queue on `SQLite`'s busy
/// timeout and every write transaction opens with its guarded `UPDATE`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_string());
    if database_url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    } else {
        options.max_connections(FILE_POOL_CONNECTIONS);
    }
    options.sqlx_logging(false);

    debug!("Connecting to database at {}", database_url);
    Database::connect(options).await.map_err(Into::into)
}

/// Creates all tables that do not exist yet.
///
/// Parents are created before children so foreign keys resolve: products and coupons,
/// then orders, then order items and audit logs.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut statements = vec![
        schema.create_table_from_entity(Product),
        schema.create_table_from_entity(Coupon),
        schema.create_table_from_entity(Order),
        schema.create_table_from_entity(OrderItem),
        schema.create_table_from_entity(AuditLog),
        schema.create_table_from_entity(OrderSequence),
    ];

    for statement in &mut statements {
        statement.if_not_exists();
        db.execute(builder.build(statement)).await?;
    }

    info!("Database tables ensured");
    Ok(())
}
