use axum::{
    extract::{Query, State},
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sorbetes_geo::{MatchKind, MatchResult};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct PriceQuery {
    pub vendor_id: i64,
    pub city: String,
    pub province: String,
}

#[derive(Debug, Serialize)]
pub(super) struct PriceData {
    pub vendor_id: i64,
    pub available: bool,
    pub resolution: &'static str,
    pub price: Decimal,
    pub matched_city: Option<String>,
    pub matched_province: Option<String>,
    pub suggestions: Vec<String>,
}

fn require_non_blank(
    req_id: &str,
    field: &str,
    value: &str,
) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::new(
            req_id.to_string(),
            "validation_error",
            format!("{field} must be non-empty"),
        ));
    }
    Ok(())
}

/// Storefront price lookup: what does this vendor charge to deliver here?
///
/// "No coverage" is a 200 with `available: false`, not an error; the
/// suggestions let the storefront offer corrections.
pub(super) async fn get_price(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PriceQuery>,
) -> Result<Json<ApiResponse<PriceData>>, ApiError> {
    require_non_blank(&req_id.0, "city", &query.city)?;
    require_non_blank(&req_id.0, "province", &query.province)?;

    let quote = state
        .resolver
        .resolve_price(&state.pool, query.vendor_id, &query.city, &query.province)
        .await
        .map_err(|e| match e {
            sorbetes_delivery::ResolveError::Db(db) => map_db_error(req_id.0.clone(), &db),
        })?;

    Ok(Json(ApiResponse {
        data: PriceData {
            vendor_id: query.vendor_id,
            available: quote.is_deliverable(),
            resolution: quote.kind.as_str(),
            price: quote.price,
            matched_city: quote.matched_city,
            matched_province: quote.matched_province,
            suggestions: quote.suggestions,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct ValidateAddressRequest {
    pub city: String,
    pub province: String,
}

#[derive(Debug, Serialize)]
pub(super) struct FieldValidation {
    pub input: String,
    pub matched: bool,
    pub match_kind: &'static str,
    pub canonical: Option<String>,
    pub score: Option<f64>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ValidateAddressData {
    pub city: FieldValidation,
    pub province: FieldValidation,
    /// True when either field needed correction, i.e. neither input was an
    /// exact variant of its canonical name.
    pub has_corrections: bool,
}

fn field_validation(input: String, result: MatchResult) -> FieldValidation {
    FieldValidation {
        input,
        matched: result.is_match(),
        match_kind: result.kind.as_str(),
        canonical: result.canonical,
        score: result.score,
        suggestions: result.suggestions,
    }
}

/// Gazetteer-only address check; never touches the zone store, so it works
/// the same for every vendor.
pub(super) async fn validate_address(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ValidateAddressRequest>,
) -> Result<Json<ApiResponse<ValidateAddressData>>, ApiError> {
    require_non_blank(&req_id.0, "city", &body.city)?;
    require_non_blank(&req_id.0, "province", &body.province)?;

    let matcher = state.resolver.matcher();
    let city_match = matcher.match_city(&body.city);
    let province_match = matcher.match_province(&body.province);

    let has_corrections =
        city_match.kind != MatchKind::Exact || province_match.kind != MatchKind::Exact;

    Ok(Json(ApiResponse {
        data: ValidateAddressData {
            city: field_validation(body.city, city_match),
            province: field_validation(body.province, province_match),
            has_corrections,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
