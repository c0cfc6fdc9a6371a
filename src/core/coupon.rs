//! Coupon engine - Eligibility checks, discount calculation and redemption.
//!
//! Discount arithmetic is done in `Decimal` and percentage discounts are rounded to cents
//! half-up (`MidpointAwayFromZero`). Redemption and release are single conditional
//! `UPDATE` statements so concurrent checkouts cannot push `used_count` past `usage_limit`.

use crate::{
    core::auth::Actor,
    entities::{
        Coupon, Money,
        coupon::{self, DiscountKind, DiscountType},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Checks whether `coupon` can be redeemed at `now`.
///
/// The checks run in a fixed order: active flag, expiry, then usage limit.
pub fn validate(coupon: &coupon::Model, now: DateTime<Utc>) -> Result<()> {
    if !coupon.active {
        return Err(Error::CouponInactive);
    }
    if now > coupon.expiry_date {
        return Err(Error::CouponExpired);
    }
    if coupon.used_count >= coupon.usage_limit {
        return Err(Error::CouponLimitReached);
    }
    Ok(())
}

/// Discount `coupon` grants on `amount`.
///
/// Returns zero below the coupon's minimum purchase amount. Callers that must refuse such
/// purchases outright check the minimum themselves. The result never exceeds `amount`.
#[must_use]
pub fn calculate_discount(coupon: &coupon::Model, amount: Decimal) -> Decimal {
    if amount <= Decimal::ZERO || coupon.min_purchase_amount > amount {
        return Decimal::ZERO;
    }

    let discount = match coupon.discount_kind() {
        DiscountKind::Percentage(rate) => (amount * rate / Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        DiscountKind::Fixed(value) => value,
    };

    discount.max(Decimal::ZERO).min(amount)
}

/// Validity of a coupon rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CouponStatus {
    pub valid: bool,
    pub message: String,
}

/// [`validate`] as a `{valid, message}` pair.
#[must_use]
pub fn status(coupon: &coupon::Model, now: DateTime<Utc>) -> CouponStatus {
    match validate(coupon, now) {
        Ok(()) => CouponStatus {
            valid: true,
            message: "Valid".to_string(),
        },
        Err(e) => CouponStatus {
            valid: false,
            message: e.to_string(),
        },
    }
}

/// Normalises a user-entered code to its stored form.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Looks a coupon up by code, case-insensitively.
pub async fn find_by_code<C>(db: &C, code: &str) -> Result<Option<coupon::Model>>
where
    C: ConnectionTrait,
{
    Coupon::find()
        .filter(coupon::Column::Code.eq(normalize_code(code)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Consumes one use of the coupon.
///
/// Runs `UPDATE coupons SET used_count = used_count + 1 WHERE id = ? AND used_count <
/// usage_limit`; if no row matches the limit was reached, possibly by a concurrent checkout.
#[instrument(skip(db))]
pub async fn redeem<C>(db: &C, coupon_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Coupon::update_many()
        .col_expr(
            coupon::Column::UsedCount,
            Expr::col(coupon::Column::UsedCount).add(1),
        )
        .col_expr(coupon::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(coupon::Column::Id.eq(coupon_id))
        .filter(Expr::col(coupon::Column::UsedCount).lt(Expr::col(coupon::Column::UsageLimit)))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        debug!("Coupon {} could not be redeemed", coupon_id);
        return Err(Error::CouponLimitReached);
    }
    Ok(())
}

/// Gives back one use of the coupon. `used_count` never drops below zero.
#[instrument(skip(db))]
pub async fn release<C>(db: &C, coupon_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Coupon::update_many()
        .col_expr(
            coupon::Column::UsedCount,
            Expr::col(coupon::Column::UsedCount).sub(1),
        )
        .col_expr(coupon::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(coupon::Column::Id.eq(coupon_id))
        .filter(coupon::Column::UsedCount.gt(0))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        debug!("Coupon {} had no use to release", coupon_id);
    }
    Ok(())
}

/// Input for [`create_coupon`]
#[derive(Debug, Clone, Deserialize)]
pub struct NewCoupon {
    pub code: String,
    pub discount_type: DiscountType,
    pub value: Decimal,
    pub expiry_date: DateTime<Utc>,
    pub usage_limit: i32,
    #[serde(default)]
    pub min_purchase_amount: Decimal,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

/// Partial update for [`update_coupon`]. Absent fields keep their stored value.
///
/// `used_count` is not a field: it only moves through redemption and release.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CouponUpdate {
    pub code: Option<String>,
    pub discount_type: Option<DiscountType>,
    pub value: Option<Decimal>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
    pub min_purchase_amount: Option<Decimal>,
    pub active: Option<bool>,
}

/// Validated coupon terms ready to store
struct Terms {
    code: String,
    value: Money,
    min_purchase_amount: Money,
}

fn validate_terms(
    code: &str,
    discount_type: DiscountType,
    value: Decimal,
    usage_limit: i32,
    min_purchase_amount: Decimal,
) -> Result<Terms> {
    let code = normalize_code(code);
    if code.is_empty() {
        return Err(Error::validation("code", "Coupon code cannot be empty"));
    }
    let value = Money::parse_input("value", value)?;
    if discount_type == DiscountType::Percentage
        && (value <= Decimal::ZERO || value > Decimal::ONE_HUNDRED)
    {
        return Err(Error::validation(
            "value",
            "Percentage must be greater than 0 and at most 100",
        ));
    }
    if usage_limit < 1 {
        return Err(Error::validation(
            "usage_limit",
            "Usage limit must be at least 1",
        ));
    }
    let min_purchase_amount = Money::parse_input("min_purchase_amount", min_purchase_amount)?;
    Ok(Terms {
        code,
        value,
        min_purchase_amount,
    })
}

async fn ensure_code_free(db: &DatabaseConnection, code: &str, except: Option<i64>) -> Result<()> {
    let taken = find_by_code(db, code)
        .await?
        .is_some_and(|existing| Some(existing.id) != except);
    if taken {
        return Err(Error::validation(
            "code",
            format!("Coupon {code} already exists"),
        ));
    }
    Ok(())
}

/// Creates a coupon. Admin only; the code is stored trimmed and uppercased.
#[instrument(skip(db, new), fields(code = %new.code))]
pub async fn create_coupon(
    db: &DatabaseConnection,
    actor: &Actor,
    new: NewCoupon,
) -> Result<coupon::Model> {
    actor.require_admin("manage coupons")?;
    let terms = validate_terms(
        &new.code,
        new.discount_type,
        new.value,
        new.usage_limit,
        new.min_purchase_amount,
    )?;
    ensure_code_free(db, &terms.code, None).await?;

    let now = Utc::now();
    let coupon = coupon::ActiveModel {
        code: Set(terms.code),
        discount_type: Set(new.discount_type),
        value: Set(terms.value),
        expiry_date: Set(new.expiry_date),
        usage_limit: Set(new.usage_limit),
        used_count: Set(0),
        active: Set(new.active),
        min_purchase_amount: Set(terms.min_purchase_amount),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = coupon.insert(db).await?;
    info!("Created coupon {} ({:?})", created.code, created.discount_type);
    Ok(created)
}

/// A coupon as shown to admins, with its current redeemability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CouponView {
    /// Stored coupon row, flattened into the JSON object
    #[serde(flatten)]
    pub coupon: coupon::Model,
    /// [`status`] at the time of the request
    pub is_valid_status: CouponStatus,
}

impl CouponView {
    /// Evaluates `coupon` at `now`.
    #[must_use]
    pub fn at(coupon: coupon::Model, now: DateTime<Utc>) -> Self {
        let is_valid_status = status(&coupon, now);
        Self {
            coupon,
            is_valid_status,
        }
    }
}

async fn find_by_id(db: &DatabaseConnection, coupon_id: i64) -> Result<coupon::Model> {
    Coupon::find_by_id(coupon_id)
        .one(db)
        .await?
        .ok_or(Error::CouponNotFound { coupon_id })
}

/// Every coupon, newest first. Admin only.
pub async fn list_coupons(db: &DatabaseConnection, actor: &Actor) -> Result<Vec<CouponView>> {
    actor.require_admin("manage coupons")?;
    let now = Utc::now();
    let coupons = Coupon::find()
        .order_by_desc(coupon::Column::CreatedAt)
        .order_by_desc(coupon::Column::Id)
        .all(db)
        .await?;
    Ok(coupons
        .into_iter()
        .map(|coupon| CouponView::at(coupon, now))
        .collect())
}

/// One coupon by id. Admin only.
pub async fn get_coupon(
    db: &DatabaseConnection,
    actor: &Actor,
    coupon_id: i64,
) -> Result<CouponView> {
    actor.require_admin("manage coupons")?;
    Ok(CouponView::at(find_by_id(db, coupon_id).await?, Utc::now()))
}

/// Applies a partial update, re-validating the merged terms. Admin only.
///
/// The usage limit cannot be lowered below the uses already consumed.
#[instrument(skip(db, update))]
pub async fn update_coupon(
    db: &DatabaseConnection,
    actor: &Actor,
    coupon_id: i64,
    update: CouponUpdate,
) -> Result<CouponView> {
    actor.require_admin("manage coupons")?;
    let existing = find_by_id(db, coupon_id).await?;

    let discount_type = update.discount_type.unwrap_or(existing.discount_type);
    let usage_limit = update.usage_limit.unwrap_or(existing.usage_limit);
    let terms = validate_terms(
        update.code.as_deref().unwrap_or(&existing.code),
        discount_type,
        update.value.unwrap_or_else(|| existing.value.amount()),
        usage_limit,
        update
            .min_purchase_amount
            .unwrap_or_else(|| existing.min_purchase_amount.amount()),
    )?;
    if usage_limit < existing.used_count {
        return Err(Error::validation(
            "usage_limit",
            format!(
                "Usage limit cannot be below the {} uses already redeemed",
                existing.used_count
            ),
        ));
    }
    if terms.code != existing.code {
        ensure_code_free(db, &terms.code, Some(coupon_id)).await?;
    }

    let mut coupon: coupon::ActiveModel = existing.into();
    coupon.code = Set(terms.code);
    coupon.discount_type = Set(discount_type);
    coupon.value = Set(terms.value);
    coupon.usage_limit = Set(usage_limit);
    coupon.min_purchase_amount = Set(terms.min_purchase_amount);
    if let Some(expiry_date) = update.expiry_date {
        coupon.expiry_date = Set(expiry_date);
    }
    if let Some(active) = update.active {
        coupon.active = Set(active);
    }
    coupon.updated_at = Set(Utc::now());

    let updated = coupon.update(db).await?;
    info!(
        "Updated coupon {} (active={}, limit={})",
        updated.code, updated.active, updated.usage_limit
    );
    Ok(CouponView::at(updated, Utc::now()))
}

/// Deletes a coupon. Orders that used it keep their amounts and lose the link. Admin only.
#[instrument(skip(db))]
pub async fn delete_coupon(db: &DatabaseConnection, actor: &Actor, coupon_id: i64) -> Result<()> {
    actor.require_admin("manage coupons")?;
    let result = Coupon::delete_by_id(coupon_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::CouponNotFound { coupon_id });
    }
    info!("Deleted coupon {}", coupon_id);
    Ok(())
}

/// Result of checking a code against a purchase amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CouponQuote {
    pub valid: bool,
    pub code: String,
    pub discount: Decimal,
    pub final_amount: Decimal,
    pub coupon_type: DiscountType,
    pub coupon_value: Decimal,
}

/// Checks `code` against `amount` without redeeming it.
///
/// Fails the same way checkout would: unknown code, ineligible coupon, or an amount below
/// the minimum purchase.
pub async fn quote(
    db: &DatabaseConnection,
    code: &str,
    amount: Decimal,
    now: DateTime<Utc>,
) -> Result<CouponQuote> {
    let amount = Money::parse_input("amount", amount)?.amount();

    let coupon = find_by_code(db, code)
        .await?
        .ok_or_else(|| Error::InvalidCoupon {
            code: normalize_code(code),
        })?;
    validate(&coupon, now)?;

    if coupon.min_purchase_amount > amount {
        return Err(Error::BelowMinimumPurchase {
            required: coupon.min_purchase_amount.amount(),
        });
    }

    let discount = calculate_discount(&coupon, amount);
    Ok(CouponQuote {
        valid: true,
        code: coupon.code,
        discount,
        final_amount: amount - discount,
        coupon_type: coupon.discount_type,
        coupon_value: coupon.value.amount(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{Order, order::OrderStatus};
    use crate::test_utils::*;
    use chrono::Duration;

    fn coupon_model(discount_type: DiscountType, value: Decimal, min: Decimal) -> coupon::Model {
        let now = Utc::now();
        coupon::Model {
            id: 1,
            code: "TEST".to_string(),
            discount_type,
            value: Money::from_decimal(value),
            expiry_date: now + Duration::days(30),
            usage_limit: 5,
            used_count: 0,
            active: true,
            min_purchase_amount: Money::from_decimal(min),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_validate_checks_in_order() {
        let now = Utc::now();
        let mut coupon = coupon_model(DiscountType::Fixed, Decimal::TEN, Decimal::ZERO);
        assert!(validate(&coupon, now).is_ok());

        coupon.used_count = 5;
        assert!(matches!(validate(&coupon, now), Err(Error::CouponLimitReached)));

        coupon.expiry_date = now - Duration::seconds(1);
        assert!(matches!(validate(&coupon, now), Err(Error::CouponExpired)));

        coupon.active = false;
        assert!(matches!(validate(&coupon, now), Err(Error::CouponInactive)));
    }

    #[test]
    fn test_validate_expiry_is_inclusive() {
        let coupon = coupon_model(DiscountType::Fixed, Decimal::TEN, Decimal::ZERO);
        assert!(validate(&coupon, coupon.expiry_date).is_ok());
    }

    #[test]
    fn test_percentage_discount() {
        let coupon = coupon_model(
            DiscountType::Percentage,
            Decimal::TEN,
            Decimal::new(10000, 2),
        );
        let discount = calculate_discount(&coupon, Decimal::new(25000, 2));
        assert_eq!(discount, Decimal::new(2500, 2));
    }

    #[test]
    fn test_percentage_discount_rounds_half_up() {
        // 12.5% of 0.20 = 0.025
        let coupon = coupon_model(DiscountType::Percentage, Decimal::new(125, 1), Decimal::ZERO);
        assert_eq!(
            calculate_discount(&coupon, Decimal::new(20, 2)),
            Decimal::new(3, 2)
        );
    }

    #[test]
    fn test_fixed_discount_clamps_to_amount() {
        let coupon = coupon_model(DiscountType::Fixed, Decimal::new(500, 0), Decimal::ZERO);
        let discount = calculate_discount(&coupon, Decimal::new(30000, 2));
        assert_eq!(discount, Decimal::new(30000, 2));
    }

    #[test]
    fn test_discount_zero_below_minimum() {
        let coupon = coupon_model(
            DiscountType::Percentage,
            Decimal::TEN,
            Decimal::new(10000, 2),
        );
        assert_eq!(
            calculate_discount(&coupon, Decimal::new(9999, 2)),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_discount_never_exceeds_amount() {
        let amounts = [
            Decimal::ZERO,
            Decimal::new(1, 2),
            Decimal::new(4999, 2),
            Decimal::new(100_000, 2),
        ];
        let coupons = [
            coupon_model(DiscountType::Percentage, Decimal::ONE_HUNDRED, Decimal::ZERO),
            coupon_model(DiscountType::Percentage, Decimal::new(333, 1), Decimal::ZERO),
            coupon_model(DiscountType::Fixed, Decimal::new(75, 0), Decimal::ZERO),
            coupon_model(DiscountType::Fixed, Decimal::ZERO, Decimal::ZERO),
        ];
        for coupon in &coupons {
            for amount in amounts {
                let discount = calculate_discount(coupon, amount);
                assert!(discount <= amount, "{discount} > {amount} for {coupon:?}");
                assert!(discount >= Decimal::ZERO);
            }
        }
    }

    #[test]
    fn test_status_message() {
        let mut coupon = coupon_model(DiscountType::Fixed, Decimal::TEN, Decimal::ZERO);
        assert_eq!(
            status(&coupon, Utc::now()),
            CouponStatus {
                valid: true,
                message: "Valid".to_string()
            }
        );
        coupon.active = false;
        let inactive = status(&coupon, Utc::now());
        assert!(!inactive.valid);
        assert_eq!(inactive.message, "Coupon is inactive");
    }

    #[tokio::test]
    async fn test_create_coupon_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = Actor::admin(1);
        let base = NewCoupon {
            code: "SAVE".to_string(),
            discount_type: DiscountType::Percentage,
            value: Decimal::new(150, 0),
            expiry_date: Utc::now() + Duration::days(1),
            usage_limit: 1,
            min_purchase_amount: Decimal::ZERO,
            active: true,
        };

        let err = create_coupon(&db, &admin, base.clone()).await.unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "value"));

        let err = create_coupon(
            &db,
            &admin,
            NewCoupon {
                value: Decimal::TEN,
                usage_limit: 0,
                ..base.clone()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "usage_limit"));

        let err = create_coupon(
            &db,
            &admin,
            NewCoupon {
                discount_type: DiscountType::Fixed,
                value: Decimal::new(10_005, 3),
                ..base.clone()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "value"));

        let err = create_coupon(&db, &Actor::customer(2), base)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));

        // Every rejection happened before anything was written
        assert!(Coupon::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_coupon_normalizes_code() -> Result<()> {
        let db = setup_test_db().await?;
        let coupon = create_test_coupon(&db, "  timket15 ", DiscountType::Percentage, Decimal::new(15, 0)).await?;
        assert_eq!(coupon.code, "TIMKET15");
        assert_eq!(coupon.used_count, 0);

        let found = find_by_code(&db, "Timket15").await?.unwrap();
        assert_eq!(found.id, coupon.id);

        let duplicate =
            create_test_coupon(&db, "TIMKET15", DiscountType::Fixed, Decimal::TEN).await;
        assert!(matches!(duplicate, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_amounts_round_trip_exactly() -> Result<()> {
        let db = setup_test_db().await?;
        let coupon = create_custom_coupon(
            &db,
            "EXACT",
            DiscountType::Fixed,
            Decimal::new(9_999_999_999, 2),
            1,
            Decimal::new(1_234_567_801, 2),
        )
        .await?;

        let stored = Coupon::find_by_id(coupon.id).one(&db).await?.unwrap();
        assert_eq!(stored.value, Decimal::new(9_999_999_999, 2));
        assert_eq!(stored.min_purchase_amount.to_string(), "12345678.01");
        Ok(())
    }

    #[tokio::test]
    async fn test_redeem_stops_at_usage_limit() -> Result<()> {
        let db = setup_test_db().await?;
        let coupon = create_test_coupon(&db, "ONCE", DiscountType::Fixed, Decimal::TEN).await?;

        redeem(&db, coupon.id).await?;
        let second = redeem(&db, coupon.id).await;
        assert!(matches!(second, Err(Error::CouponLimitReached)));

        let stored = Coupon::find_by_id(coupon.id).one(&db).await?.unwrap();
        assert_eq!(stored.used_count, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_interleaved_redemptions_single_use() -> Result<()> {
        let db = setup_test_db().await?;
        let coupon = create_test_coupon(&db, "RACE", DiscountType::Fixed, Decimal::TEN).await?;

        let (first, second) = tokio::join!(redeem(&db, coupon.id), redeem(&db, coupon.id));
        assert_eq!(
            [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(),
            1
        );

        let stored = Coupon::find_by_id(coupon.id).one(&db).await?.unwrap();
        assert_eq!(stored.used_count, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_release_never_goes_negative() -> Result<()> {
        let db = setup_test_db().await?;
        let coupon = create_test_coupon(&db, "BACK", DiscountType::Fixed, Decimal::TEN).await?;

        redeem(&db, coupon.id).await?;
        release(&db, coupon.id).await?;
        release(&db, coupon.id).await?;

        let stored = Coupon::find_by_id(coupon.id).one(&db).await?.unwrap();
        assert_eq!(stored.used_count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_deactivated_coupon_is_refused() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = Actor::admin(1);
        let coupon = create_test_coupon(&db, "PAUSE", DiscountType::Fixed, Decimal::TEN).await?;

        let view = get_coupon(&db, &admin, coupon.id).await?;
        assert!(view.is_valid_status.valid);

        let paused = update_coupon(
            &db,
            &admin,
            coupon.id,
            CouponUpdate {
                active: Some(false),
                ..Default::default()
            },
        )
        .await?;
        assert!(!paused.coupon.active);
        assert_eq!(
            paused.is_valid_status,
            CouponStatus {
                valid: false,
                message: "Coupon is inactive".to_string()
            }
        );
        assert_eq!(paused.coupon.value, Decimal::TEN);
        assert_eq!(paused.coupon.used_count, 0);

        let quoted = quote(&db, "PAUSE", Decimal::ONE_HUNDRED, Utc::now()).await;
        assert!(matches!(quoted, Err(Error::CouponInactive)));

        let listed = list_coupons(&db, &admin).await?;
        assert_eq!(listed.len(), 1);
        assert!(!listed[0].is_valid_status.valid);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_coupon_rules() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = Actor::admin(1);
        let coupon =
            create_custom_coupon(&db, "MULTI", DiscountType::Fixed, Decimal::TEN, 3, Decimal::ZERO)
                .await?;
        create_test_coupon(&db, "OTHER", DiscountType::Fixed, Decimal::TEN).await?;
        redeem(&db, coupon.id).await?;
        redeem(&db, coupon.id).await?;

        let err = update_coupon(
            &db,
            &admin,
            coupon.id,
            CouponUpdate {
                usage_limit: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "usage_limit"));

        let err = update_coupon(
            &db,
            &admin,
            coupon.id,
            CouponUpdate {
                code: Some("other".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "code"));

        let err = update_coupon(
            &db,
            &admin,
            coupon.id,
            CouponUpdate {
                discount_type: Some(DiscountType::Percentage),
                value: Some(Decimal::new(120, 0)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "value"));

        let renamed = update_coupon(
            &db,
            &admin,
            coupon.id,
            CouponUpdate {
                code: Some(" multi5 ".to_string()),
                usage_limit: Some(5),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(renamed.coupon.code, "MULTI5");
        assert_eq!(renamed.coupon.usage_limit, 5);
        assert_eq!(renamed.coupon.used_count, 2);

        let err = update_coupon(&db, &Actor::customer(4), coupon.id, CouponUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden { .. }));

        let missing = update_coupon(&db, &admin, 999, CouponUpdate::default()).await;
        assert!(matches!(missing, Err(Error::CouponNotFound { coupon_id: 999 })));
        Ok(())
    }

    #[test]
    fn test_update_rejects_used_count() {
        let parsed: std::result::Result<CouponUpdate, _> =
            serde_json::from_str(r#"{"active": false, "used_count": 0}"#);
        assert!(parsed.is_err());
    }

    #[tokio::test]
    async fn test_delete_coupon_keeps_orders() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = Actor::admin(1);
        let product = create_test_product(&db, "Kaba Cape", Decimal::ONE_HUNDRED, 5).await?;
        let coupon = create_test_coupon(&db, "GONE", DiscountType::Fixed, Decimal::TEN).await?;
        let placed = place_test_order_with_coupon(&db, 3, product.id, 1, "GONE").await?;

        delete_coupon(&db, &admin, coupon.id).await?;
        assert!(find_by_code(&db, "GONE").await?.is_none());

        let order = Order::find_by_id(placed.order.id).one(&db).await?.unwrap();
        assert_eq!(order.coupon_id, None);
        assert_eq!(order.discount_amount, Decimal::TEN);
        assert_eq!(order.status, OrderStatus::Pending);

        let again = delete_coupon(&db, &admin, coupon.id).await;
        assert!(matches!(again, Err(Error::CouponNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_quote() -> Result<()> {
        let db = setup_test_db().await?;
        create_custom_coupon(
            &db,
            "TENOFF",
            DiscountType::Percentage,
            Decimal::TEN,
            5,
            Decimal::new(10000, 2),
        )
        .await?;

        let quoted = quote(&db, "tenoff", Decimal::new(25000, 2), Utc::now()).await?;
        assert!(quoted.valid);
        assert_eq!(quoted.code, "TENOFF");
        assert_eq!(quoted.discount, Decimal::new(2500, 2));
        assert_eq!(quoted.final_amount, Decimal::new(22500, 2));

        let below = quote(&db, "TENOFF", Decimal::new(5000, 2), Utc::now()).await;
        assert!(matches!(
            below,
            Err(Error::BelowMinimumPurchase { required }) if required == Decimal::new(10000, 2)
        ));

        let unknown = quote(&db, "NOPE", Decimal::TEN, Utc::now()).await;
        assert!(matches!(unknown, Err(Error::InvalidCoupon { ref code }) if code == "NOPE"));

        let fractional = quote(&db, "TENOFF", Decimal::new(250_005, 3), Utc::now()).await;
        assert!(matches!(fractional, Err(Error::Validation { ref field, .. }) if field == "amount"));

        let huge = quote(&db, "TENOFF", Decimal::MAX, Utc::now()).await;
        assert!(matches!(huge, Err(Error::Validation { ref field, .. }) if field == "amount"));
        Ok(())
    }
}
