//! Published discount model.

use serde::{Deserialize, Serialize};

use super::{DiscountId, Frequency, FuelBrand};

/// A published fuel-purchase discount.
///
/// Read-only from the application's point of view — rows are created
/// and mutated by the data service's moderation flow only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    /// Unique identifier (UUID).
    pub id: DiscountId,
    /// Fuel brand the discount applies to.
    pub fuel_brand: FuelBrand,
    /// Day descriptor: a single day, a composite string, or the
    /// every-day sentinel.
    pub day: String,
    /// Payment method required to obtain the discount (free text).
    pub card_method: String,
    /// Discount percentage, always within `[0, 100]`.
    pub discount: u8,
    /// Reimbursement cap in pesos; `None` means no limit.
    pub reimbursement_limit: Option<u32>,
    /// How often the discount can be used.
    pub frequency: Frequency,
    /// Link to the promotion's source, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_row() {
        let json = r#"{
            "id": "a1b2c3d4-0000-0000-0000-000000000001",
            "fuel_brand": "YPF",
            "day": "Lunes",
            "card_method": "Visa crédito",
            "discount": 15,
            "reimbursement_limit": 6000,
            "frequency": "weekly",
            "source_url": "https://www.ypf.com/promos"
        }"#;
        let discount: Discount = serde_json::from_str(json).unwrap();
        assert_eq!(discount.fuel_brand, FuelBrand::Ypf);
        assert_eq!(discount.day, "Lunes");
        assert_eq!(discount.discount, 15);
        assert_eq!(discount.reimbursement_limit, Some(6000));
        assert_eq!(discount.frequency, Frequency::Weekly);
    }

    #[test]
    fn deserialize_unlimited_reimbursement() {
        let json = r#"{
            "id": "a1b2c3d4-0000-0000-0000-000000000002",
            "fuel_brand": "Multiple",
            "day": "Todos los días",
            "card_method": "Modo",
            "discount": 10,
            "reimbursement_limit": null,
            "frequency": "monthly"
        }"#;
        let discount: Discount = serde_json::from_str(json).unwrap();
        assert_eq!(discount.fuel_brand, FuelBrand::Multiple);
        assert!(discount.reimbursement_limit.is_none());
        assert!(discount.source_url.is_none());
    }

    #[test]
    fn serialize_roundtrip() {
        let discount = Discount {
            id: DiscountId::new("d-1".to_owned()),
            fuel_brand: FuelBrand::Shell,
            day: "S\u{e1}bado".to_owned(),
            card_method: "Mastercard d\u{e9}bito".to_owned(),
            discount: 25,
            reimbursement_limit: None,
            frequency: Frequency::Monthly,
            source_url: None,
        };
        let json = serde_json::to_string(&discount).unwrap();
        let back: Discount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, discount);
    }

    #[test]
    fn absent_source_url_is_omitted() {
        let discount = Discount {
            id: DiscountId::new("d-2".to_owned()),
            fuel_brand: FuelBrand::Axion,
            day: "Martes".to_owned(),
            card_method: "Visa".to_owned(),
            discount: 5,
            reimbursement_limit: Some(4000),
            frequency: Frequency::Weekly,
            source_url: None,
        };
        let json = serde_json::to_value(&discount).unwrap();
        assert!(json.get("source_url").is_none());
    }
}
