//! Store API access
//!
//! This module wraps the external sneaker-store REST API behind the
//! `CatalogApi` trait, and exposes the order and user collaborators that have
//! no live endpoint yet as injectable sources.

pub mod errors;
pub mod client;
pub mod batch;
pub mod sources;

#[cfg(test)]
pub mod test_support;

pub use errors::{FetchCause, FetchError};
pub use client::{ApiClient, CatalogApi, endpoints};
pub use batch::{submit_variants, VariantBatchReport};
pub use sources::{FixtureOrders, FixtureUsers, OrderSource, UserSource};
