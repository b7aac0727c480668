//! Delivery-price resolution for vendor zones.
//!
//! [`resolver`] answers "what does vendor V charge to deliver to this
//! city/province" for one vendor, combining a literal zone lookup with
//! gazetteer-backed fuzzy correction. [`checkout`] fans that resolution out
//! concurrently across every vendor in a multi-vendor cart, degrading
//! per-vendor failures to a zero fee instead of failing the checkout.

pub mod checkout;
pub mod error;
pub mod resolver;

pub use checkout::{resolve_cart_delivery_fees, resolve_cart_fees, CartFees, VendorFeeOutcome};
pub use error::ResolveError;
pub use resolver::{PriceQuote, PriceResolver, ResolutionKind};
