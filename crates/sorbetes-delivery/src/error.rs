use thiserror::Error;

/// Failures of a single price resolution.
///
/// "No delivery to this location" is NOT an error — it is the
/// [`ResolutionKind::None`](crate::resolver::ResolutionKind) outcome. This
/// type covers transport/storage failures only, which propagate to direct
/// callers and are downgraded to a zero fee only inside the checkout fan-out.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Db(#[from] sorbetes_db::DbError),
}
