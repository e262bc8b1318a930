//! Discount recommendation draft and insert payload.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::days::EVERY_DAY;
use crate::models::{Frequency, FuelBrand, RecommendationStatus};
use crate::query::SelectionSet;

/// Application-defined ceiling for a recommended reimbursement limit,
/// in pesos.
pub const MAX_REIMBURSEMENT: u32 = 1_000_000;

/// A recommendation form in progress.
///
/// Field setters mirror the submission form's input handlers: the
/// percentage field only ever holds digits and rejects edits that would
/// push it above 100, and the reimbursement field strips grouping
/// separators. [`RecommendationDraft::validate`] converts a complete
/// draft into the insert payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationDraft {
    /// Selected brands (first selected wins on submit).
    brands: SelectionSet,
    /// Selected days; the every-day sentinel is exclusive.
    days: SelectionSet,
    /// Payment method free text.
    card_method: String,
    /// Raw percentage field contents (digits only).
    discount: String,
    /// Raw reimbursement field contents (digits only).
    reimbursement_limit: String,
    /// Whether the discount has no reimbursement cap.
    unlimited: bool,
    /// Selected usage frequency.
    frequency: Option<Frequency>,
    /// Optional source link.
    source_url: String,
}

impl RecommendationDraft {
    /// Creates an empty draft.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles a brand selection.
    #[inline]
    pub fn toggle_brand(&mut self, brand: FuelBrand) {
        self.brands = self.brands.toggle(brand.as_str());
    }

    /// Toggles a day selection, keeping the every-day sentinel
    /// exclusive with concrete days.
    #[inline]
    pub fn toggle_day(&mut self, day: &str) {
        self.days = self.days.toggle_exclusive(day, EVERY_DAY);
    }

    /// Replaces the payment method text.
    #[inline]
    pub fn set_card_method<T: Into<String>>(&mut self, value: T) {
        self.card_method = value.into();
    }

    /// Applies an edit to the percentage field.
    ///
    /// Non-digit characters are stripped; if the remaining digits parse
    /// above 100 the edit is rejected and the previous contents are
    /// kept, so the stored value never exceeds 100.
    pub fn set_discount(&mut self, raw: &str) {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            self.discount = digits;
            return;
        }
        match digits.parse::<u32>() {
            Ok(value) if value <= 100 => self.discount = digits,
            Ok(_) | Err(_) => {}
        }
    }

    /// Applies an edit to the reimbursement field, stripping every
    /// non-digit character (so `"10,000"` becomes `"10000"`).
    pub fn set_reimbursement(&mut self, raw: &str) {
        self.reimbursement_limit = raw.chars().filter(char::is_ascii_digit).collect();
    }

    /// Marks the recommendation as having no reimbursement cap.
    #[inline]
    pub fn set_unlimited(&mut self, unlimited: bool) {
        self.unlimited = unlimited;
    }

    /// Selects the usage frequency.
    #[inline]
    pub fn set_frequency(&mut self, frequency: Frequency) {
        self.frequency = Some(frequency);
    }

    /// Replaces the source URL text.
    #[inline]
    pub fn set_source_url<T: Into<String>>(&mut self, value: T) {
        self.source_url = value.into();
    }

    /// Returns the current percentage field contents.
    #[inline]
    #[must_use]
    pub fn discount(&self) -> &str {
        &self.discount
    }

    /// Returns the current reimbursement field contents.
    #[inline]
    #[must_use]
    pub fn reimbursement(&self) -> &str {
        &self.reimbursement_limit
    }

    /// Returns the selected brands.
    #[inline]
    #[must_use]
    pub const fn brands(&self) -> &SelectionSet {
        &self.brands
    }

    /// Returns the selected days.
    #[inline]
    #[must_use]
    pub const fn days(&self) -> &SelectionSet {
        &self.days
    }

    /// Validates the draft and builds the insert payload.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when a required field is empty,
    /// the percentage is out of range, or the reimbursement limit
    /// exceeds [`MAX_REIMBURSEMENT`].
    pub fn validate(&self) -> Result<NewRecommendation, ValidationError> {
        let brand = self
            .brands
            .iter()
            .next()
            .and_then(|raw| raw.parse::<FuelBrand>().ok())
            .ok_or(ValidationError::MissingField("fuel_brand"))?;
        if self.days.is_empty() {
            return Err(ValidationError::MissingField("day"));
        }
        if self.card_method.trim().is_empty() {
            return Err(ValidationError::MissingField("card_method"));
        }
        let frequency = self
            .frequency
            .ok_or(ValidationError::MissingField("frequency"))?;

        if self.discount.is_empty() {
            return Err(ValidationError::MissingField("discount"));
        }
        let percentage = self
            .discount
            .parse::<u32>()
            .map_err(|_| ValidationError::MissingField("discount"))?;
        if percentage > 100 {
            return Err(ValidationError::PercentageOutOfRange(percentage));
        }

        let reimbursement_limit = if self.unlimited {
            None
        } else {
            if self.reimbursement_limit.is_empty() {
                return Err(ValidationError::MissingField("reimbursement_limit"));
            }
            let value = self
                .reimbursement_limit
                .parse::<u64>()
                .unwrap_or(u64::MAX);
            if value > u64::from(MAX_REIMBURSEMENT) {
                return Err(ValidationError::ReimbursementTooLarge {
                    value,
                    max: MAX_REIMBURSEMENT,
                });
            }
            Some(u32::try_from(value).unwrap_or(MAX_REIMBURSEMENT))
        };

        let source_url = if self.source_url.trim().is_empty() {
            None
        } else {
            Some(self.source_url.trim().to_owned())
        };

        Ok(NewRecommendation {
            fuel_brand: brand,
            days: self.days.iter().map(ToOwned::to_owned).collect(),
            payment_method: self.card_method.trim().to_owned(),
            discount_percentage: u8::try_from(percentage).unwrap_or(100),
            reimbursement_limit,
            frequency,
            source_url,
            status: RecommendationStatus::Pending,
        })
    }
}

/// Insert payload for the `recommended_discounts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecommendation {
    /// First selected brand.
    pub fuel_brand: FuelBrand,
    /// Days the discount applies to.
    pub days: Vec<String>,
    /// Payment method free text.
    pub payment_method: String,
    /// Discount percentage within `[0, 100]`.
    pub discount_percentage: u8,
    /// Reimbursement cap; `None` means no limit.
    pub reimbursement_limit: Option<u32>,
    /// Usage frequency.
    pub frequency: Frequency,
    /// Optional source link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Always submitted as pending for moderation.
    pub status: RecommendationStatus,
}
