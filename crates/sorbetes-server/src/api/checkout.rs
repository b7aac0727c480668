use axum::{extract::State, Extension, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sorbetes_delivery::VendorFeeOutcome;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct CartItem {
    pub product_id: i64,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub(super) struct CartVendor {
    pub vendor_id: i64,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DeliveryFeesRequest {
    pub city: String,
    pub province: String,
    pub vendors: Vec<CartVendor>,
}

#[derive(Debug, Serialize)]
pub(super) struct VendorFeeItem {
    pub vendor_id: i64,
    pub fee: Decimal,
    pub resolution: &'static str,
    pub timed_out: bool,
    pub errored: bool,
}

impl From<VendorFeeOutcome> for VendorFeeItem {
    fn from(outcome: VendorFeeOutcome) -> Self {
        Self {
            vendor_id: outcome.vendor_id,
            fee: outcome.fee,
            resolution: outcome.kind.as_str(),
            timed_out: outcome.timed_out,
            errored: outcome.errored,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct DeliveryFeesData {
    pub fees: Vec<VendorFeeItem>,
    pub total: Decimal,
}

/// Checkout fee aggregation: one concurrent resolution per distinct vendor
/// in the cart. A vendor that cannot be resolved in time contributes a zero
/// fee with `resolution: "degraded"` rather than failing the checkout.
pub(super) async fn resolve_delivery_fees(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<DeliveryFeesRequest>,
) -> Result<Json<ApiResponse<DeliveryFeesData>>, ApiError> {
    if body.vendors.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "cart must contain at least one vendor",
        ));
    }
    if body.city.trim().is_empty() || body.province.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "city and province must be non-empty",
        ));
    }
    if body.vendors.iter().any(|v| v.items.is_empty()) {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "every vendor in the cart must have at least one item",
        ));
    }

    let vendor_ids: Vec<i64> = body.vendors.iter().map(|v| v.vendor_id).collect();

    let fees = sorbetes_delivery::resolve_cart_fees(
        &state.pool,
        &state.resolver,
        &vendor_ids,
        &body.city,
        &body.province,
        state.resolve_timeout,
    )
    .await;

    tracing::info!(
        vendor_count = fees.outcomes.len(),
        total = %fees.total,
        "resolved cart delivery fees"
    );

    Ok(Json(ApiResponse {
        data: DeliveryFeesData {
            total: fees.total,
            fees: fees.outcomes.into_iter().map(VendorFeeItem::from).collect(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
