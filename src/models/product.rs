//! Product (inbound inventory) model.

use serde::{Deserialize, Serialize};

use super::{FieldValue, ProductField, Record};

/// The product being put away.
///
/// Only `sku_id` and `merchant_id` are mandatory. Absent optional
/// attributes read as missing: they fail `exists` and every numeric or
/// membership comparison.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Product {
    pub sku_id: String,
    pub merchant_id: String,
    #[serde(default)]
    pub pack_type: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub abc_code: Option<String>,
    #[serde(default)]
    pub is_oversized: Option<bool>,
    #[serde(default)]
    pub hazmat_class: Option<String>,
    #[serde(default)]
    pub temp_zone: Option<String>,
    #[serde(default)]
    pub inventory_status: Option<String>,
    #[serde(default)]
    pub is_lot_controlled: Option<bool>,
    #[serde(default)]
    pub lot_id: Option<String>,
}

impl Product {
    /// Creates a product with only identity attributes set.
    pub fn new(sku_id: impl Into<String>, merchant_id: impl Into<String>) -> Self {
        Self {
            sku_id: sku_id.into(),
            merchant_id: merchant_id.into(),
            ..Default::default()
        }
    }

    pub fn with_pack_type(mut self, pack_type: impl Into<String>) -> Self {
        self.pack_type = Some(pack_type.into());
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_abc_code(mut self, abc_code: impl Into<String>) -> Self {
        self.abc_code = Some(abc_code.into());
        self
    }

    pub fn with_oversized(mut self, oversized: bool) -> Self {
        self.is_oversized = Some(oversized);
        self
    }

    pub fn with_hazmat_class(mut self, class: impl Into<String>) -> Self {
        self.hazmat_class = Some(class.into());
        self
    }

    pub fn with_temp_zone(mut self, temp_zone: impl Into<String>) -> Self {
        self.temp_zone = Some(temp_zone.into());
        self
    }

    pub fn with_inventory_status(mut self, status: impl Into<String>) -> Self {
        self.inventory_status = Some(status.into());
        self
    }

    /// Marks the product lot controlled and sets its lot.
    pub fn with_lot(mut self, lot_id: impl Into<String>) -> Self {
        self.is_lot_controlled = Some(true);
        self.lot_id = Some(lot_id.into());
        self
    }
}

impl Record for Product {
    type Field = ProductField;

    fn field(&self, field: &ProductField) -> FieldValue {
        match field {
            ProductField::SkuId => self.sku_id.as_str().into(),
            ProductField::MerchantId => self.merchant_id.as_str().into(),
            ProductField::PackType => self.pack_type.as_deref().into(),
            ProductField::Weight => self.weight.into(),
            ProductField::AbcCode => self.abc_code.as_deref().into(),
            ProductField::IsOversized => self.is_oversized.into(),
            ProductField::HazmatClass => self.hazmat_class.as_deref().into(),
            ProductField::TempZone => self.temp_zone.as_deref().into(),
            ProductField::InventoryStatus => self.inventory_status.as_deref().into(),
            ProductField::IsLotControlled => self.is_lot_controlled.into(),
            ProductField::LotId => self.lot_id.as_deref().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_builder() {
        let p = Product::new("TEST-FROZEN-001", "FoodCo")
            .with_pack_type("CASE")
            .with_weight(10.0)
            .with_abc_code("B")
            .with_temp_zone("FROZEN")
            .with_lot("LOT-2026-01-15");

        assert_eq!(p.sku_id, "TEST-FROZEN-001");
        assert_eq!(p.is_lot_controlled, Some(true));
        assert_eq!(p.lot_id.as_deref(), Some("LOT-2026-01-15"));
    }

    #[test]
    fn test_absent_attribute_reads_missing() {
        let p = Product::new("S1", "M1");
        assert_eq!(p.field(&ProductField::Weight), FieldValue::Missing);
        assert_eq!(p.field(&ProductField::LotId), FieldValue::Missing);
        assert_eq!(p.field(&ProductField::SkuId), FieldValue::from("S1"));
    }

    #[test]
    fn test_deserialize_with_null_lot() {
        let p: Product = serde_json::from_str(
            r#"{ "sku_id": "TEST-HEAVY-001", "merchant_id": "Pact", "weight": 50,
                 "abc_code": "C", "is_oversized": true, "lot_id": null }"#,
        )
        .unwrap();
        assert_eq!(p.weight, Some(50.0));
        assert_eq!(p.is_oversized, Some(true));
        assert!(p.lot_id.is_none());
    }
}
