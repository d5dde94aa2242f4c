//! Static lookup tables consumed by the service handlers.
//!
//! These are data, not logic: plain functions over `match` tables so they
//! stay allocation-free and trivially testable.

pub mod countries;
pub mod currency;
