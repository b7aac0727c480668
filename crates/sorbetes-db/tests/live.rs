//! Live integration tests for sorbetes-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/sorbetes-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use rust_decimal::Decimal;
use sorbetes_db::{
    deactivate_zone, get_active_zone, list_active_zones, replace_all_zones, upsert_zone, DbError,
    NewDeliveryZone,
};

fn zone(city: &str, province: &str, price: i64) -> NewDeliveryZone {
    NewDeliveryZone {
        city: city.to_string(),
        province: province.to_string(),
        price: Decimal::new(price, 0),
    }
}

// ---------------------------------------------------------------------------
// upsert_zone
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_creates_active_zone(pool: sqlx::PgPool) {
    let row = upsert_zone(&pool, 1, "Makati City", "Metro Manila", Decimal::new(100, 0))
        .await
        .expect("upsert");

    assert_eq!(row.vendor_id, 1);
    assert_eq!(row.city, "Makati City");
    assert_eq!(row.province, "Metro Manila");
    assert_eq!(row.price, Decimal::new(100, 0));
    assert!(row.is_active);
}

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_is_idempotent(pool: sqlx::PgPool) {
    let first = upsert_zone(&pool, 1, "Makati City", "Metro Manila", Decimal::new(100, 0))
        .await
        .expect("first upsert");
    let second = upsert_zone(&pool, 1, "Makati City", "Metro Manila", Decimal::new(100, 0))
        .await
        .expect("second upsert");

    assert_eq!(first.id, second.id, "same key must reuse the row");

    let zones = list_active_zones(&pool, 1).await.expect("list");
    assert_eq!(zones.len(), 1, "exactly one active zone for the key");
    assert_eq!(zones[0].price, Decimal::new(100, 0));
}

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_overwrites_price_on_existing_key(pool: sqlx::PgPool) {
    upsert_zone(&pool, 1, "Cebu City", "Cebu", Decimal::new(80, 0))
        .await
        .expect("create");
    let updated = upsert_zone(&pool, 1, "Cebu City", "Cebu", Decimal::new(95, 0))
        .await
        .expect("update");

    assert_eq!(updated.price, Decimal::new(95, 0));
    let zones = list_active_zones(&pool, 1).await.expect("list");
    assert_eq!(zones.len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_reactivates_soft_deleted_zone(pool: sqlx::PgPool) {
    let row = upsert_zone(&pool, 1, "Cebu City", "Cebu", Decimal::new(80, 0))
        .await
        .expect("create");
    deactivate_zone(&pool, 1, row.id).await.expect("deactivate");
    assert!(list_active_zones(&pool, 1).await.expect("list").is_empty());

    let revived = upsert_zone(&pool, 1, "Cebu City", "Cebu", Decimal::new(90, 0))
        .await
        .expect("reactivate");
    assert_eq!(revived.id, row.id, "reactivation reuses the historical row");
    assert!(revived.is_active);
    assert_eq!(revived.price, Decimal::new(90, 0));
}

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_rejects_negative_price(pool: sqlx::PgPool) {
    let result = upsert_zone(&pool, 1, "Cebu City", "Cebu", Decimal::new(-5, 0)).await;
    assert!(matches!(result, Err(DbError::Validation(_))));
}

// ---------------------------------------------------------------------------
// replace_all_zones
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn replace_with_empty_set_deactivates_everything(pool: sqlx::PgPool) {
    upsert_zone(&pool, 1, "Cebu City", "Cebu", Decimal::new(80, 0))
        .await
        .expect("seed");
    upsert_zone(&pool, 1, "Makati City", "Metro Manila", Decimal::new(100, 0))
        .await
        .expect("seed");

    replace_all_zones(&pool, 1, &[]).await.expect("replace");

    assert!(list_active_zones(&pool, 1).await.expect("list").is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn replace_leaves_exactly_the_supplied_zones_active(pool: sqlx::PgPool) {
    upsert_zone(&pool, 1, "Cebu City", "Cebu", Decimal::new(80, 0))
        .await
        .expect("seed");
    upsert_zone(&pool, 1, "Makati City", "Metro Manila", Decimal::new(100, 0))
        .await
        .expect("seed");

    let new_set = [
        zone("Davao City", "Davao del Sur", 120),
        zone("Cebu City", "Cebu", 85),
    ];
    replace_all_zones(&pool, 1, &new_set).await.expect("replace");

    let zones = list_active_zones(&pool, 1).await.expect("list");
    assert_eq!(zones.len(), 2);
    // Ordered city ASC, province ASC.
    assert_eq!(zones[0].city, "Cebu City");
    assert_eq!(zones[0].price, Decimal::new(85, 0));
    assert_eq!(zones[1].city, "Davao City");
    assert_eq!(zones[1].price, Decimal::new(120, 0));
}

#[sqlx::test(migrations = "../../migrations")]
async fn replace_validates_before_touching_anything(pool: sqlx::PgPool) {
    upsert_zone(&pool, 1, "Cebu City", "Cebu", Decimal::new(80, 0))
        .await
        .expect("seed");

    let bad_set = [
        zone("Davao City", "Davao del Sur", 120),
        zone("", "Cebu", 85), // invalid: empty city
    ];
    let result = replace_all_zones(&pool, 1, &bad_set).await;
    assert!(matches!(result, Err(DbError::Validation(_))));

    // The pre-write state is fully intact.
    let zones = list_active_zones(&pool, 1).await.expect("list");
    assert_eq!(zones.len(), 1);
    assert_eq!(zones[0].city, "Cebu City");
    assert_eq!(zones[0].price, Decimal::new(80, 0));
}

#[sqlx::test(migrations = "../../migrations")]
async fn replace_is_scoped_to_one_vendor(pool: sqlx::PgPool) {
    upsert_zone(&pool, 1, "Cebu City", "Cebu", Decimal::new(80, 0))
        .await
        .expect("seed vendor 1");
    upsert_zone(&pool, 2, "Cebu City", "Cebu", Decimal::new(70, 0))
        .await
        .expect("seed vendor 2");

    replace_all_zones(&pool, 1, &[]).await.expect("replace");

    assert!(list_active_zones(&pool, 1).await.expect("list 1").is_empty());
    assert_eq!(list_active_zones(&pool, 2).await.expect("list 2").len(), 1);
}

// ---------------------------------------------------------------------------
// deactivate_zone / get_active_zone
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn deactivate_unknown_zone_is_not_found(pool: sqlx::PgPool) {
    let result = deactivate_zone(&pool, 1, 999_999).await;
    assert!(matches!(result, Err(DbError::NotFound)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn deactivate_is_scoped_to_owning_vendor(pool: sqlx::PgPool) {
    let row = upsert_zone(&pool, 1, "Cebu City", "Cebu", Decimal::new(80, 0))
        .await
        .expect("seed");

    // Another vendor cannot soft-delete vendor 1's zone.
    let result = deactivate_zone(&pool, 2, row.id).await;
    assert!(matches!(result, Err(DbError::NotFound)));
    assert_eq!(list_active_zones(&pool, 1).await.expect("list").len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn get_active_zone_is_literal_and_case_sensitive(pool: sqlx::PgPool) {
    upsert_zone(&pool, 1, "Cebu City", "Cebu", Decimal::new(80, 0))
        .await
        .expect("seed");

    let hit = get_active_zone(&pool, 1, "Cebu City", "Cebu")
        .await
        .expect("query");
    assert!(hit.is_some());

    let miss = get_active_zone(&pool, 1, "cebu city", "cebu")
        .await
        .expect("query");
    assert!(miss.is_none(), "lowercase literal must not match");
}

#[sqlx::test(migrations = "../../migrations")]
async fn get_active_zone_ignores_inactive_rows(pool: sqlx::PgPool) {
    let row = upsert_zone(&pool, 1, "Cebu City", "Cebu", Decimal::new(80, 0))
        .await
        .expect("seed");
    deactivate_zone(&pool, 1, row.id).await.expect("deactivate");

    let miss = get_active_zone(&pool, 1, "Cebu City", "Cebu")
        .await
        .expect("query");
    assert!(miss.is_none());
}
