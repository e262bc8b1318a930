//! Enumeration types for constrained backend values.

use serde::{Deserialize, Serialize};

/// Fuel brand a discount applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelBrand {
    /// YPF stations.
    #[serde(rename = "YPF")]
    Ypf,
    /// Shell stations.
    #[serde(rename = "SHELL")]
    Shell,
    /// Axion stations.
    #[serde(rename = "AXION")]
    Axion,
    /// Valid at more than one brand.
    Multiple,
}

/// All selectable brands, in display order.
pub const ALL_BRANDS: [FuelBrand; 4] = [
    FuelBrand::Ypf,
    FuelBrand::Shell,
    FuelBrand::Axion,
    FuelBrand::Multiple,
];

impl FuelBrand {
    /// Returns the canonical backend value for this brand.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ypf => "YPF",
            Self::Shell => "SHELL",
            Self::Axion => "AXION",
            Self::Multiple => "Multiple",
        }
    }
}

impl core::fmt::Display for FuelBrand {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized brand name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fuel brand: {input}")]
pub struct ParseBrandError {
    /// The unrecognized input.
    pub input: String,
}

impl core::str::FromStr for FuelBrand {
    type Err = ParseBrandError;

    /// Parses a brand name case-insensitively.
    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "YPF" => Ok(Self::Ypf),
            "SHELL" => Ok(Self::Shell),
            "AXION" => Ok(Self::Axion),
            "MULTIPLE" => Ok(Self::Multiple),
            _ => Err(ParseBrandError {
                input: s.to_owned(),
            }),
        }
    }
}

/// How often a discount can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Usable once per week.
    Weekly,
    /// Usable once per month.
    Monthly,
}

impl Frequency {
    /// Returns the canonical backend value for this frequency.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl core::fmt::Display for Frequency {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized frequency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown frequency: {input}")]
pub struct ParseFrequencyError {
    /// The unrecognized input.
    pub input: String,
}

impl core::str::FromStr for Frequency {
    type Err = ParseFrequencyError;

    /// Parses a frequency name case-insensitively.
    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(ParseFrequencyError {
                input: s.to_owned(),
            }),
        }
    }
}

/// Moderation state of a submitted recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationStatus {
    /// Waiting for moderation.
    Pending,
    /// Accepted and published.
    Approved,
    /// Rejected by moderation.
    Rejected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuel_brand_serde_uppercase() {
        let json = serde_json::to_string(&FuelBrand::Ypf).unwrap();
        assert_eq!(json, r#""YPF""#);
        let back: FuelBrand = serde_json::from_str(r#""SHELL""#).unwrap();
        assert_eq!(back, FuelBrand::Shell);
    }

    #[test]
    fn fuel_brand_multiple_keeps_mixed_case() {
        let json = serde_json::to_string(&FuelBrand::Multiple).unwrap();
        assert_eq!(json, r#""Multiple""#);
    }

    #[test]
    fn fuel_brand_all_variants_roundtrip() {
        for brand in ALL_BRANDS {
            let json = serde_json::to_string(&brand).unwrap();
            let back: FuelBrand = serde_json::from_str(&json).unwrap();
            assert_eq!(back, brand);
        }
    }

    #[test]
    fn fuel_brand_parse_case_insensitive() {
        assert_eq!("ypf".parse::<FuelBrand>().unwrap(), FuelBrand::Ypf);
        assert_eq!("Axion".parse::<FuelBrand>().unwrap(), FuelBrand::Axion);
        assert_eq!(
            "multiple".parse::<FuelBrand>().unwrap(),
            FuelBrand::Multiple
        );
        assert!("esso".parse::<FuelBrand>().is_err());
    }

    #[test]
    fn frequency_serde_lowercase() {
        let json = serde_json::to_string(&Frequency::Weekly).unwrap();
        assert_eq!(json, r#""weekly""#);
        let back: Frequency = serde_json::from_str(r#""monthly""#).unwrap();
        assert_eq!(back, Frequency::Monthly);
    }

    #[test]
    fn frequency_parse() {
        assert_eq!("Weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert!("daily".parse::<Frequency>().is_err());
    }

    #[test]
    fn status_serde_roundtrip() {
        let variants = [
            (RecommendationStatus::Pending, r#""pending""#),
            (RecommendationStatus::Approved, r#""approved""#),
            (RecommendationStatus::Rejected, r#""rejected""#),
        ];
        for (variant, expected_json) in variants {
            let json = serde_json::to_string(&variant).unwrap();
            assert_eq!(json, expected_json);
            let back: RecommendationStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, variant);
        }
    }

    #[test]
    fn invalid_brand_fails_deserialization() {
        let result = serde_json::from_str::<FuelBrand>(r#""ESSO""#);
        assert!(result.is_err());
    }
}
