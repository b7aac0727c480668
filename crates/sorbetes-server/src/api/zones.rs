use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sorbetes_db::{DeliveryZoneRow, NewDeliveryZone};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct ZoneItem {
    pub id: i64,
    pub vendor_id: i64,
    pub city: String,
    pub province: String,
    pub price: Decimal,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<DeliveryZoneRow> for ZoneItem {
    fn from(row: DeliveryZoneRow) -> Self {
        Self {
            id: row.id,
            vendor_id: row.vendor_id,
            city: row.city,
            province: row.province,
            price: row.price,
            is_active: row.is_active,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ZoneInput {
    pub city: String,
    pub province: String,
    pub price: Decimal,
}

#[derive(Debug, Deserialize)]
pub(super) struct ReplaceZonesRequest {
    pub zones: Vec<ZoneInput>,
}

#[derive(Debug, Serialize)]
pub(super) struct ZoneDeleted {
    pub id: i64,
}

pub(super) async fn list_zones(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(vendor_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<ZoneItem>>>, ApiError> {
    let rows = sorbetes_db::list_active_zones(&state.pool, vendor_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(ZoneItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Replace a vendor's zone list wholesale. The supplied set becomes the
/// vendor's entire active coverage; previously active zones not present in
/// it are deactivated, not deleted.
pub(super) async fn replace_zones(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(vendor_id): Path<i64>,
    Json(body): Json<ReplaceZonesRequest>,
) -> Result<Json<ApiResponse<Vec<ZoneItem>>>, ApiError> {
    let zones: Vec<NewDeliveryZone> = body
        .zones
        .into_iter()
        .map(|z| NewDeliveryZone {
            city: z.city,
            province: z.province,
            price: z.price,
        })
        .collect();

    let rows = sorbetes_db::replace_all_zones(&state.pool, vendor_id, &zones)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(vendor_id, zone_count = rows.len(), "replaced delivery zones");

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(ZoneItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn upsert_zone(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(vendor_id): Path<i64>,
    Json(body): Json<ZoneInput>,
) -> Result<Json<ApiResponse<ZoneItem>>, ApiError> {
    let row = sorbetes_db::upsert_zone(&state.pool, vendor_id, &body.city, &body.province, body.price)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: ZoneItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn remove_zone(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((vendor_id, zone_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<ZoneDeleted>>, ApiError> {
    sorbetes_db::deactivate_zone(&state.pool, vendor_id, zone_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: ZoneDeleted { id: zone_id },
        meta: ResponseMeta::new(req_id.0),
    }))
}
