//! Per-vendor delivery price resolution.

use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::PgPool;

use sorbetes_geo::{MatchResult, Matcher};

use crate::error::ResolveError;

/// How a price (or its absence) was arrived at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionKind {
    /// Literal active-zone hit on the raw input strings.
    Exact,
    /// Zone found at the gazetteer-corrected canonical location.
    Fuzzy,
    /// No match and/or no active zone: delivery unavailable, price 0.
    None,
    /// Produced only by the checkout fan-out when a per-vendor call timed
    /// out or errored; the fee defaults to 0.
    Degraded,
}

impl ResolutionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResolutionKind::Exact => "exact",
            ResolutionKind::Fuzzy => "fuzzy",
            ResolutionKind::None => "none",
            ResolutionKind::Degraded => "degraded",
        }
    }
}

/// Outcome of resolving one vendor's delivery price for one location.
#[derive(Debug, Clone)]
pub struct PriceQuote {
    pub kind: ResolutionKind,
    /// 0 for both "free delivery" and "delivery unavailable"; `kind`
    /// disambiguates.
    pub price: Decimal,
    pub matched_city: Option<String>,
    pub matched_province: Option<String>,
    /// Canonical corrections. Populated on `Fuzzy` (so the caller can surface
    /// "did you mean X?" even on success) and on `None`.
    pub suggestions: Vec<String>,
}

impl PriceQuote {
    #[must_use]
    pub fn is_deliverable(&self) -> bool {
        matches!(self.kind, ResolutionKind::Exact | ResolutionKind::Fuzzy)
    }
}

/// Resolves vendor delivery prices against the zone store, with
/// gazetteer-backed correction of free-text input.
///
/// Holds only the immutable matcher; safe to share across concurrent
/// resolution calls.
#[derive(Debug, Clone)]
pub struct PriceResolver {
    matcher: Arc<Matcher>,
}

impl PriceResolver {
    #[must_use]
    pub fn new(matcher: Arc<Matcher>) -> Self {
        Self { matcher }
    }

    #[must_use]
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Resolve what `vendor_id` charges to deliver to (`city`, `province`).
    ///
    /// Two-tier lookup, short-circuiting on first success:
    ///
    /// 1. Literal active-zone lookup on the raw, unnormalized inputs
    ///    (case-sensitive, suffix-sensitive) → `Exact`.
    /// 2. Independent gazetteer matches for city and province; if both
    ///    resolve, an active-zone lookup at the canonical pair → `Fuzzy`.
    ///
    /// Anything else is the `None` outcome with price 0 and per-field
    /// suggestions. The tier-1/tier-2 asymmetry is intentional: a zone
    /// stored as "Quezon City" exact-matches only that literal string and
    /// reaches "quezon city" or "QC" input via the gazetteer.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] on storage failure. "Delivery unavailable"
    /// is a normal return value, never an error.
    pub async fn resolve_price(
        &self,
        pool: &PgPool,
        vendor_id: i64,
        city: &str,
        province: &str,
    ) -> Result<PriceQuote, ResolveError> {
        if let Some(zone) = sorbetes_db::get_active_zone(pool, vendor_id, city, province).await? {
            return Ok(PriceQuote {
                kind: ResolutionKind::Exact,
                price: zone.price,
                matched_city: Some(zone.city),
                matched_province: Some(zone.province),
                suggestions: Vec::new(),
            });
        }

        let city_match = self.matcher.match_city(city);
        let province_match = self.matcher.match_province(province);

        if let (Some(canonical_city), Some(canonical_province)) =
            (&city_match.canonical, &province_match.canonical)
        {
            if let Some(zone) =
                sorbetes_db::get_active_zone(pool, vendor_id, canonical_city, canonical_province)
                    .await?
            {
                tracing::debug!(
                    vendor_id,
                    input_city = city,
                    input_province = province,
                    matched_city = %zone.city,
                    matched_province = %zone.province,
                    "fuzzy-resolved delivery zone"
                );
                return Ok(PriceQuote {
                    kind: ResolutionKind::Fuzzy,
                    price: zone.price,
                    suggestions: vec![format!("{}, {}", zone.city, zone.province)],
                    matched_city: Some(zone.city),
                    matched_province: Some(zone.province),
                });
            }
        }

        Ok(PriceQuote {
            kind: ResolutionKind::None,
            price: Decimal::ZERO,
            matched_city: None,
            matched_province: None,
            suggestions: unavailable_suggestions(&city_match, &province_match),
        })
    }
}

/// Build the suggestion list for a delivery-unavailable outcome.
///
/// Matched fields contribute their canonical name; unmatched fields
/// contribute their ranked suggestions (or the generic fallback). Duplicates
/// are dropped preserving first position.
fn unavailable_suggestions(
    city_match: &MatchResult,
    province_match: &MatchResult,
) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();

    for result in [city_match, province_match] {
        if let Some(canonical) = &result.canonical {
            if seen.insert(canonical.clone()) {
                out.push(canonical.clone());
            }
        } else {
            for suggestion in &result.suggestions {
                if seen.insert(suggestion.clone()) {
                    out.push(suggestion.clone());
                }
            }
        }
    }

    out
}
