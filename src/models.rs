//! Data models for the Surtidor data-service entities.
//!
//! This module contains strongly-typed representations of the service's
//! rows, newtype ID wrappers, enumeration types for constrained values,
//! and the draft/payload pairs for the two write paths (recommendations
//! and error reports).

pub mod days;

mod discount;
mod enums;
mod ids;
mod recommendation;
mod report;

pub use discount::Discount;
pub use enums::{
    ALL_BRANDS, Frequency, FuelBrand, ParseBrandError, ParseFrequencyError, RecommendationStatus,
};
pub use ids::{DiscountId, RecommendationId, ReportId};
pub use recommendation::{MAX_REIMBURSEMENT, NewRecommendation, RecommendationDraft};
pub use report::{ErrorReportDraft, NewErrorReport, normalize_evidence_url};
