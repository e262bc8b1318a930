//! Error-report draft and insert payload.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ValidationError;
use crate::models::{DiscountId, Frequency};

/// An error report form in progress, targeting one published discount.
///
/// The discontinued flag and the per-field error flags are mutually
/// exclusive: marking the discount discontinued clears every field flag
/// and suggested correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReportDraft {
    /// The discount being reported.
    discount_id: DiscountId,
    /// The discount no longer exists.
    is_discontinued: bool,
    /// The day descriptor is wrong.
    days_error: bool,
    /// The percentage is wrong.
    discount_error: bool,
    /// The reimbursement limit is wrong.
    reimbursement_error: bool,
    /// The frequency is wrong.
    frequency_error: bool,
    /// Suggested corrected days.
    suggested_days: Vec<String>,
    /// Suggested corrected percentage.
    suggested_discount: Option<u8>,
    /// Suggested corrected reimbursement limit.
    suggested_reimbursement: Option<u32>,
    /// Suggested corrected frequency.
    suggested_frequency: Option<Frequency>,
    /// Raw evidence URL field contents.
    evidence_url: String,
    /// Free-text comment.
    comments: String,
}

impl ErrorReportDraft {
    /// Creates an empty report draft for the given discount.
    #[inline]
    #[must_use]
    pub const fn new(discount_id: DiscountId) -> Self {
        Self {
            discount_id,
            is_discontinued: false,
            days_error: false,
            discount_error: false,
            reimbursement_error: false,
            frequency_error: false,
            suggested_days: Vec::new(),
            suggested_discount: None,
            suggested_reimbursement: None,
            suggested_frequency: None,
            evidence_url: String::new(),
            comments: String::new(),
        }
    }

    /// Sets or clears the discontinued flag.
    ///
    /// Setting it clears every field-error flag and suggested value.
    pub fn set_discontinued(&mut self, discontinued: bool) {
        self.is_discontinued = discontinued;
        if discontinued {
            self.days_error = false;
            self.discount_error = false;
            self.reimbursement_error = false;
            self.frequency_error = false;
            self.suggested_days.clear();
            self.suggested_discount = None;
            self.suggested_reimbursement = None;
            self.suggested_frequency = None;
        }
    }

    /// Flags the day descriptor as wrong.
    #[inline]
    pub fn set_days_error(&mut self, flagged: bool) {
        self.days_error = flagged;
    }

    /// Flags the percentage as wrong.
    #[inline]
    pub fn set_discount_error(&mut self, flagged: bool) {
        self.discount_error = flagged;
    }

    /// Flags the reimbursement limit as wrong.
    #[inline]
    pub fn set_reimbursement_error(&mut self, flagged: bool) {
        self.reimbursement_error = flagged;
    }

    /// Flags the frequency as wrong.
    #[inline]
    pub fn set_frequency_error(&mut self, flagged: bool) {
        self.frequency_error = flagged;
    }

    /// Toggles a day in the suggested correction list.
    pub fn toggle_suggested_day(&mut self, day: &str) {
        if let Some(pos) = self.suggested_days.iter().position(|d| d == day) {
            drop(self.suggested_days.remove(pos));
        } else {
            self.suggested_days.push(day.to_owned());
        }
    }

    /// Suggests a corrected percentage.
    #[inline]
    pub fn suggest_discount(&mut self, percentage: u8) {
        self.suggested_discount = Some(percentage);
    }

    /// Suggests a corrected reimbursement limit.
    #[inline]
    pub fn suggest_reimbursement(&mut self, limit: u32) {
        self.suggested_reimbursement = Some(limit);
    }

    /// Suggests a corrected frequency.
    #[inline]
    pub fn suggest_frequency(&mut self, frequency: Frequency) {
        self.suggested_frequency = Some(frequency);
    }

    /// Replaces the evidence URL field contents.
    #[inline]
    pub fn set_evidence_url<T: Into<String>>(&mut self, value: T) {
        self.evidence_url = value.into();
    }

    /// Replaces the comment text.
    #[inline]
    pub fn set_comments<T: Into<String>>(&mut self, value: T) {
        self.comments = value.into();
    }

    /// Returns `true` while the discontinued flag is set.
    #[inline]
    #[must_use]
    pub const fn is_discontinued(&self) -> bool {
        self.is_discontinued
    }

    /// Returns `true` if any field-error flag is set.
    #[inline]
    #[must_use]
    pub const fn has_field_errors(&self) -> bool {
        self.days_error || self.discount_error || self.reimbursement_error || self.frequency_error
    }

    /// Validates the draft and builds the insert payload.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when neither a field error nor
    /// discontinued is selected, a suggested percentage is out of
    /// range, or the evidence URL is missing or malformed.
    pub fn validate(&self) -> Result<NewErrorReport, ValidationError> {
        if !self.is_discontinued && !self.has_field_errors() {
            return Err(ValidationError::NoErrorSelected);
        }
        if let Some(suggested) = self.suggested_discount
            && suggested > 100
        {
            return Err(ValidationError::PercentageOutOfRange(u32::from(suggested)));
        }
        let evidence_url = normalize_evidence_url(&self.evidence_url)?;

        let comments = if self.comments.trim().is_empty() {
            None
        } else {
            Some(self.comments.trim().to_owned())
        };

        Ok(NewErrorReport {
            discount_id: self.discount_id.clone(),
            is_discontinued: self.is_discontinued,
            days_error: self.days_error,
            discount_error: self.discount_error,
            reimbursement_error: self.reimbursement_error,
            frequency_error: self.frequency_error,
            suggested_days: self.suggested_days.clone(),
            suggested_discount: self.suggested_discount,
            suggested_reimbursement: self.suggested_reimbursement,
            suggested_frequency: self.suggested_frequency,
            evidence_url,
            comments,
        })
    }
}

/// Normalizes an evidence link, prefixing `https://` when the input has
/// no scheme, and returns the parsed URL as a string.
///
/// # Errors
///
/// Returns [`ValidationError::MissingField`] for empty input and
/// [`ValidationError::InvalidEvidenceUrl`] when the input does not
/// parse as a URL even after prefixing.
pub fn normalize_evidence_url(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField("evidence_url"));
    }
    let parsed = match Url::parse(trimmed) {
        Ok(parsed) => Ok(parsed),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{trimmed}")),
        Err(err) => Err(err),
    };
    match parsed {
        Ok(parsed) => Ok(String::from(parsed)),
        Err(_err) => Err(ValidationError::InvalidEvidenceUrl(trimmed.to_owned())),
    }
}

/// Insert payload for the `errores_reportados` table.
///
/// Column names are the deployed table's Spanish names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewErrorReport {
    /// The reported discount.
    #[serde(rename = "id_descuento")]
    pub discount_id: DiscountId,
    /// The discount no longer exists.
    #[serde(rename = "esta_discontinuado")]
    pub is_discontinued: bool,
    /// The day descriptor is wrong.
    #[serde(rename = "error_dias")]
    pub days_error: bool,
    /// The percentage is wrong.
    #[serde(rename = "error_descuento")]
    pub discount_error: bool,
    /// The reimbursement limit is wrong.
    #[serde(rename = "error_reintegro")]
    pub reimbursement_error: bool,
    /// The frequency is wrong.
    #[serde(rename = "error_frecuencia")]
    pub frequency_error: bool,
    /// Suggested corrected days.
    #[serde(rename = "dias_sugeridos")]
    pub suggested_days: Vec<String>,
    /// Suggested corrected percentage.
    #[serde(rename = "descuento_sugerido")]
    pub suggested_discount: Option<u8>,
    /// Suggested corrected reimbursement limit.
    #[serde(rename = "reintegro_sugerido")]
    pub suggested_reimbursement: Option<u32>,
    /// Suggested corrected frequency.
    #[serde(rename = "frecuencia_sugerida")]
    pub suggested_frequency: Option<Frequency>,
    /// Normalized evidence link.
    #[serde(rename = "url_evidencia")]
    pub evidence_url: String,
    /// Free-text comment.
    #[serde(rename = "comentarios")]
    pub comments: Option<String>,
}
