//! Database operations for the `delivery_zones` table.
//!
//! Zones are vendor-scoped. "Removal" is always a soft delete
//! (`is_active = FALSE`); an upsert on the same (vendor, city, province) key
//! reactivates the row and overwrites its price instead of duplicating it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `delivery_zones` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeliveryZoneRow {
    pub id: i64,
    pub vendor_id: i64,
    pub city: String,
    pub province: String,
    pub price: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for zone writes: one priced (city, province) for a vendor.
#[derive(Debug, Clone)]
pub struct NewDeliveryZone {
    pub city: String,
    pub province: String,
    pub price: Decimal,
}

fn validate_zone_input(city: &str, province: &str, price: Decimal) -> Result<(), DbError> {
    if city.trim().is_empty() {
        return Err(DbError::Validation("city must be non-empty".to_string()));
    }
    if province.trim().is_empty() {
        return Err(DbError::Validation(
            "province must be non-empty".to_string(),
        ));
    }
    if price.is_sign_negative() {
        return Err(DbError::Validation(format!(
            "price must be non-negative, got {price}"
        )));
    }
    Ok(())
}

/// List a vendor's active zones, ordered by city then province ascending.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_zones(
    pool: &PgPool,
    vendor_id: i64,
) -> Result<Vec<DeliveryZoneRow>, DbError> {
    let rows = sqlx::query_as::<_, DeliveryZoneRow>(
        "SELECT id, vendor_id, city, province, price, is_active, created_at, updated_at \
         FROM delivery_zones \
         WHERE vendor_id = $1 AND is_active = TRUE \
         ORDER BY city ASC, province ASC",
    )
    .bind(vendor_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetch the active zone matching the given city/province exactly.
///
/// Literal, case-sensitive string equality on the stored values — this is the
/// cheap first tier of price resolution. Normalized/fuzzy lookups go through
/// the matcher and land here with canonical names.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_active_zone(
    pool: &PgPool,
    vendor_id: i64,
    city: &str,
    province: &str,
) -> Result<Option<DeliveryZoneRow>, DbError> {
    let row = sqlx::query_as::<_, DeliveryZoneRow>(
        "SELECT id, vendor_id, city, province, price, is_active, created_at, updated_at \
         FROM delivery_zones \
         WHERE vendor_id = $1 AND city = $2 AND province = $3 AND is_active = TRUE",
    )
    .bind(vendor_id)
    .bind(city)
    .bind(province)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Create a zone or reactivate/update the existing (vendor, city, province) row.
///
/// Idempotent: repeating the same call leaves one active zone with that price.
///
/// # Errors
///
/// Returns [`DbError::Validation`] for empty city/province or negative price,
/// [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_zone(
    pool: &PgPool,
    vendor_id: i64,
    city: &str,
    province: &str,
    price: Decimal,
) -> Result<DeliveryZoneRow, DbError> {
    validate_zone_input(city, province, price)?;

    let row = sqlx::query_as::<_, DeliveryZoneRow>(
        "INSERT INTO delivery_zones (vendor_id, city, province, price, is_active) \
         VALUES ($1, $2, $3, $4, TRUE) \
         ON CONFLICT (vendor_id, city, province) DO UPDATE SET \
             price      = EXCLUDED.price, \
             is_active  = TRUE, \
             updated_at = NOW() \
         RETURNING id, vendor_id, city, province, price, is_active, created_at, updated_at",
    )
    .bind(vendor_id)
    .bind(city)
    .bind(province)
    .bind(price)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Replace a vendor's full zone set in one transaction.
///
/// Deactivates every currently-active zone for the vendor, then upserts each
/// supplied zone as active. Zones omitted from the input end up inactive —
/// full-replace semantics, not a merge. Readers observe either the pre-write
/// or post-write state, never an intermediate one.
///
/// All inputs are validated before any write is issued.
///
/// # Errors
///
/// Returns [`DbError::Validation`] if any zone has an empty city/province or
/// a negative price, [`DbError::Sqlx`] if any statement fails (the
/// transaction rolls back).
pub async fn replace_all_zones(
    pool: &PgPool,
    vendor_id: i64,
    zones: &[NewDeliveryZone],
) -> Result<Vec<DeliveryZoneRow>, DbError> {
    for zone in zones {
        validate_zone_input(&zone.city, &zone.province, zone.price)?;
    }

    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE delivery_zones \
         SET is_active = FALSE, updated_at = NOW() \
         WHERE vendor_id = $1 AND is_active = TRUE",
    )
    .bind(vendor_id)
    .execute(&mut *tx)
    .await?;

    let mut rows = Vec::with_capacity(zones.len());
    for zone in zones {
        let row = sqlx::query_as::<_, DeliveryZoneRow>(
            "INSERT INTO delivery_zones (vendor_id, city, province, price, is_active) \
             VALUES ($1, $2, $3, $4, TRUE) \
             ON CONFLICT (vendor_id, city, province) DO UPDATE SET \
                 price      = EXCLUDED.price, \
                 is_active  = TRUE, \
                 updated_at = NOW() \
             RETURNING id, vendor_id, city, province, price, is_active, created_at, updated_at",
        )
        .bind(vendor_id)
        .bind(&zone.city)
        .bind(&zone.province)
        .bind(zone.price)
        .fetch_one(&mut *tx)
        .await?;
        rows.push(row);
    }

    tx.commit().await?;

    Ok(rows)
}

/// Soft-delete a zone by id, scoped to its owning vendor.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no active zone with that id belongs to
/// the vendor, [`DbError::Sqlx`] if the update fails.
pub async fn deactivate_zone(pool: &PgPool, vendor_id: i64, zone_id: i64) -> Result<(), DbError> {
    let rows_affected = sqlx::query(
        "UPDATE delivery_zones \
         SET is_active = FALSE, updated_at = NOW() \
         WHERE id = $1 AND vendor_id = $2 AND is_active = TRUE",
    )
    .bind(zone_id)
    .bind(vendor_id)
    .execute(pool)
    .await?
    .rows_affected();

    if rows_affected == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
