//! Rust client library for the Surtidor fuel-discount promotions API.
//!
//! This crate is a typed client for a hosted PostgREST-style data
//! service listing fuel-purchase discounts. It provides:
//!
//! - [`query`]: the filter/search/sort composer ([`query::DiscountQuery`])
//!   with an in-memory fallback evaluator;
//! - [`state`]: a reducer over the listing view's state, including the
//!   request-sequencing guard against stale responses;
//! - [`cooldown`] and [`storage`]: the persisted submission gates;
//! - [`client`] and [`surtidor`]: low- and high-level clients (async
//!   and blocking variants behind the `async`/`blocking` features).

pub mod cooldown;
pub mod error;
pub mod models;
pub mod query;
pub mod state;
pub mod storage;

#[cfg(any(feature = "async", feature = "blocking"))]
pub mod client;
#[cfg(any(feature = "async", feature = "blocking"))]
pub mod surtidor;
