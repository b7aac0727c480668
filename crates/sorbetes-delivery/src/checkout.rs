//! Cart checkout fan-out: concurrent per-vendor fee resolution.

use std::collections::HashSet;
use std::future::Future;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::ResolveError;
use crate::resolver::{PriceQuote, PriceResolver, ResolutionKind};

/// Settled outcome of one per-vendor resolution during fan-out.
///
/// `timed_out` and `errored` both normalize to `fee = 0` /
/// [`ResolutionKind::Degraded`] for aggregation, but stay distinguishable
/// here and in the logs.
#[derive(Debug, Clone)]
pub struct VendorFeeOutcome {
    pub vendor_id: i64,
    pub fee: Decimal,
    pub kind: ResolutionKind,
    pub timed_out: bool,
    pub errored: bool,
    pub elapsed: Duration,
}

/// Per-vendor fee mapping plus the cart total.
#[derive(Debug, Clone)]
pub struct CartFees {
    /// One settled outcome per distinct vendor, ordered by vendor id.
    pub outcomes: Vec<VendorFeeOutcome>,
    /// Sum of all per-vendor fees; independent of completion order.
    pub total: Decimal,
}

impl CartFees {
    #[must_use]
    pub fn fee_for(&self, vendor_id: i64) -> Option<Decimal> {
        self.outcomes
            .iter()
            .find(|o| o.vendor_id == vendor_id)
            .map(|o| o.fee)
    }
}

/// Resolve delivery fees for every distinct vendor in a cart, concurrently.
///
/// Generic over the per-vendor resolution future so degradation paths are
/// testable without a live store; [`resolve_cart_fees`] is the pool-backed
/// entry point. Each call is bounded by `per_call_timeout`; a timeout or
/// resolution error substitutes a zero fee for that vendor instead of
/// failing the checkout. The aggregator waits for every call to settle —
/// one vendor's failure never cancels its siblings, since each fee is
/// independent and all are needed for the cart total.
pub async fn resolve_cart_delivery_fees<F, Fut>(
    vendor_ids: &[i64],
    per_call_timeout: Duration,
    resolve: F,
) -> CartFees
where
    F: Fn(i64) -> Fut,
    Fut: Future<Output = Result<PriceQuote, ResolveError>>,
{
    let mut seen = HashSet::new();
    let distinct: Vec<i64> = vendor_ids
        .iter()
        .copied()
        .filter(|v| seen.insert(*v))
        .collect();

    let concurrency = distinct.len().max(1);

    let mut outcomes: Vec<VendorFeeOutcome> = stream::iter(distinct)
        .map(|vendor_id| {
            let fut = resolve(vendor_id);
            async move {
                let started = Instant::now();
                let settled = tokio::time::timeout(per_call_timeout, fut).await;
                let elapsed = started.elapsed();
                match settled {
                    Ok(Ok(quote)) => VendorFeeOutcome {
                        vendor_id,
                        fee: quote.price,
                        kind: quote.kind,
                        timed_out: false,
                        errored: false,
                        elapsed,
                    },
                    Ok(Err(error)) => {
                        tracing::warn!(
                            vendor_id,
                            error = %error,
                            elapsed_ms = elapsed.as_millis() as u64,
                            "vendor fee resolution failed; defaulting fee to zero"
                        );
                        VendorFeeOutcome {
                            vendor_id,
                            fee: Decimal::ZERO,
                            kind: ResolutionKind::Degraded,
                            timed_out: false,
                            errored: true,
                            elapsed,
                        }
                    }
                    Err(_) => {
                        tracing::warn!(
                            vendor_id,
                            timeout_ms = per_call_timeout.as_millis() as u64,
                            "vendor fee resolution timed out; defaulting fee to zero"
                        );
                        VendorFeeOutcome {
                            vendor_id,
                            fee: Decimal::ZERO,
                            kind: ResolutionKind::Degraded,
                            timed_out: true,
                            errored: false,
                            elapsed,
                        }
                    }
                }
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    // Completion order is nondeterministic; fix the output order so callers
    // and logs are stable.
    outcomes.sort_by_key(|o| o.vendor_id);

    let total = outcomes.iter().map(|o| o.fee).sum();

    CartFees { outcomes, total }
}

/// Pool-backed cart fan-out: one [`PriceResolver::resolve_price`] call per
/// distinct vendor against the same delivery location.
pub async fn resolve_cart_fees(
    pool: &PgPool,
    resolver: &PriceResolver,
    vendor_ids: &[i64],
    city: &str,
    province: &str,
    per_call_timeout: Duration,
) -> CartFees {
    resolve_cart_delivery_fees(vendor_ids, per_call_timeout, |vendor_id| {
        resolver.resolve_price(pool, vendor_id, city, province)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(price: i64, kind: ResolutionKind) -> PriceQuote {
        PriceQuote {
            kind,
            price: Decimal::new(price, 0),
            matched_city: None,
            matched_province: None,
            suggestions: Vec::new(),
        }
    }

    #[tokio::test]
    async fn sums_fees_across_vendors() {
        let fees = resolve_cart_delivery_fees(&[1, 2, 3], Duration::from_secs(1), |v| async move {
            Ok(quote(v * 10, ResolutionKind::Exact))
        })
        .await;

        assert_eq!(fees.fee_for(1), Some(Decimal::new(10, 0)));
        assert_eq!(fees.fee_for(2), Some(Decimal::new(20, 0)));
        assert_eq!(fees.fee_for(3), Some(Decimal::new(30, 0)));
        assert_eq!(fees.total, Decimal::new(60, 0));
    }

    #[tokio::test]
    async fn duplicate_vendor_ids_resolve_once() {
        let fees = resolve_cart_delivery_fees(&[5, 5, 5], Duration::from_secs(1), |_| async {
            Ok(quote(40, ResolutionKind::Exact))
        })
        .await;

        assert_eq!(fees.outcomes.len(), 1);
        assert_eq!(fees.total, Decimal::new(40, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_vendor_defaults_to_zero_without_failing_cart() {
        let fees = resolve_cart_delivery_fees(&[1, 2], Duration::from_millis(100), |v| async move {
            if v == 2 {
                // Never resolves within the per-call timeout.
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            Ok(quote(50, ResolutionKind::Exact))
        })
        .await;

        assert_eq!(fees.fee_for(1), Some(Decimal::new(50, 0)));
        assert_eq!(fees.fee_for(2), Some(Decimal::ZERO));
        assert_eq!(fees.total, Decimal::new(50, 0));

        let slow = fees.outcomes.iter().find(|o| o.vendor_id == 2).unwrap();
        assert!(slow.timed_out);
        assert!(!slow.errored);
        assert_eq!(slow.kind, ResolutionKind::Degraded);
    }

    #[tokio::test]
    async fn errored_vendor_defaults_to_zero_and_stays_distinguishable() {
        let fees = resolve_cart_delivery_fees(&[1, 2], Duration::from_secs(1), |v| async move {
            if v == 2 {
                Err(ResolveError::Db(sorbetes_db::DbError::NotFound))
            } else {
                Ok(quote(75, ResolutionKind::Fuzzy))
            }
        })
        .await;

        assert_eq!(fees.total, Decimal::new(75, 0));
        let failed = fees.outcomes.iter().find(|o| o.vendor_id == 2).unwrap();
        assert!(failed.errored);
        assert!(!failed.timed_out);
        assert_eq!(failed.kind, ResolutionKind::Degraded);
    }

    #[tokio::test]
    async fn none_outcome_is_not_degraded() {
        let fees = resolve_cart_delivery_fees(&[9], Duration::from_secs(1), |_| async {
            Ok(quote(0, ResolutionKind::None))
        })
        .await;

        let outcome = &fees.outcomes[0];
        assert_eq!(outcome.kind, ResolutionKind::None);
        assert!(!outcome.timed_out);
        assert!(!outcome.errored);
        assert_eq!(fees.total, Decimal::ZERO);
    }

    #[tokio::test]
    async fn singleton_fan_out_matches_direct_resolution() {
        let direct = quote(120, ResolutionKind::Exact);
        let direct_price = direct.price;

        let fees = resolve_cart_delivery_fees(&[7], Duration::from_secs(1), |_| {
            let q = direct.clone();
            async move { Ok(q) }
        })
        .await;

        assert_eq!(fees.outcomes.len(), 1);
        assert_eq!(fees.fee_for(7), Some(direct_price));
        assert_eq!(fees.total, direct_price);
    }

    #[tokio::test]
    async fn empty_cart_yields_zero_total() {
        let fees = resolve_cart_delivery_fees(&[], Duration::from_secs(1), |_| async {
            Ok(quote(10, ResolutionKind::Exact))
        })
        .await;

        assert!(fees.outcomes.is_empty());
        assert_eq!(fees.total, Decimal::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn all_calls_settle_even_when_one_times_out() {
        // Three vendors: one fast, one slow-but-within-timeout, one past it.
        let fees = resolve_cart_delivery_fees(&[1, 2, 3], Duration::from_millis(500), |v| {
            async move {
                match v {
                    1 => {}
                    2 => tokio::time::sleep(Duration::from_millis(200)).await,
                    _ => tokio::time::sleep(Duration::from_secs(10)).await,
                }
                Ok(quote(v * 10, ResolutionKind::Exact))
            }
        })
        .await;

        assert_eq!(fees.outcomes.len(), 3);
        assert_eq!(fees.fee_for(1), Some(Decimal::new(10, 0)));
        assert_eq!(fees.fee_for(2), Some(Decimal::new(20, 0)));
        assert_eq!(fees.fee_for(3), Some(Decimal::ZERO));
        assert_eq!(fees.total, Decimal::new(30, 0));
    }
}
