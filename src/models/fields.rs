//! Typed field identifiers for products and locations.
//!
//! Criteria name fields through closed enums instead of free-form strings,
//! so an unknown field is rejected when a rule is authored or loaded, not
//! silently ignored while a putaway runs.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{FieldValue, Operator};

/// An entity whose attributes can be read by field identifier.
pub trait Record {
    /// Field identifier enum for this entity kind.
    type Field;

    /// Reads one attribute.
    fn field(&self, field: &Self::Field) -> FieldValue;
}

/// Authoring metadata for a field identifier.
pub trait RuleField: Copy + fmt::Debug + fmt::Display {
    /// Configuration identifier (e.g. `"zone_id"`).
    fn name(&self) -> &'static str;

    /// Operators offered for this field when authoring rules.
    ///
    /// `exists` is accepted for every field in addition to these.
    fn allowed_operators(&self) -> &'static [Operator];

    /// Whether the field holds a number.
    fn is_numeric(&self) -> bool;

    /// Whether constraints may use this field with the `exclude` action.
    fn supports_exclude(&self) -> bool {
        true
    }
}

const EQ_ONLY: &[Operator] = &[Operator::Eq];
const EQ_NE: &[Operator] = &[Operator::Eq, Operator::Ne];
const EQ_NE_IN: &[Operator] = &[Operator::Eq, Operator::Ne, Operator::In];
const EQ_IN: &[Operator] = &[Operator::Eq, Operator::In];
const IN_ONLY: &[Operator] = &[Operator::In];
const NUMERIC_RANGE: &[Operator] = &[
    Operator::Gt,
    Operator::Ge,
    Operator::Lt,
    Operator::Le,
    Operator::Between,
];
const NUMERIC_FULL: &[Operator] = &[
    Operator::Eq,
    Operator::Ne,
    Operator::Gt,
    Operator::Ge,
    Operator::Lt,
    Operator::Le,
    Operator::Between,
];
const LEVEL_OPS: &[Operator] = &[Operator::Eq, Operator::Le, Operator::Ge, Operator::Between];

/// Product attributes usable in product criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductField {
    SkuId,
    MerchantId,
    PackType,
    Weight,
    AbcCode,
    IsOversized,
    HazmatClass,
    TempZone,
    InventoryStatus,
    IsLotControlled,
    LotId,
}

impl RuleField for ProductField {
    fn name(&self) -> &'static str {
        match self {
            ProductField::SkuId => "sku_id",
            ProductField::MerchantId => "merchant_id",
            ProductField::PackType => "pack_type",
            ProductField::Weight => "weight",
            ProductField::AbcCode => "abc_code",
            ProductField::IsOversized => "is_oversized",
            ProductField::HazmatClass => "hazmat_class",
            ProductField::TempZone => "temp_zone",
            ProductField::InventoryStatus => "inventory_status",
            ProductField::IsLotControlled => "is_lot_controlled",
            ProductField::LotId => "lot_id",
        }
    }

    fn allowed_operators(&self) -> &'static [Operator] {
        match self {
            ProductField::MerchantId => EQ_NE_IN,
            ProductField::SkuId => EQ_IN,
            ProductField::Weight => NUMERIC_RANGE,
            ProductField::HazmatClass => EQ_NE,
            ProductField::LotId => EQ_NE_IN,
            ProductField::PackType
            | ProductField::AbcCode
            | ProductField::IsOversized
            | ProductField::TempZone
            | ProductField::InventoryStatus
            | ProductField::IsLotControlled => EQ_ONLY,
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, ProductField::Weight)
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Location attributes usable in location criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationField {
    Id,
    ZoneId,
    LocationGroupId,
    StorageType,
    LocationLevel,
    BinStatus,
    TempZone,
    SingleMerchantOnly,
    AisleId,
    DistanceShipping,
    BinCapacity,
    UtilizationPercent,
}

impl RuleField for LocationField {
    fn name(&self) -> &'static str {
        match self {
            LocationField::Id => "id",
            LocationField::ZoneId => "zone_id",
            LocationField::LocationGroupId => "location_group_id",
            LocationField::StorageType => "storage_type",
            LocationField::LocationLevel => "location_level",
            LocationField::BinStatus => "bin_status",
            LocationField::TempZone => "temp_zone",
            LocationField::SingleMerchantOnly => "single_merchant_only",
            LocationField::AisleId => "aisle_id",
            LocationField::DistanceShipping => "distance_shipping",
            LocationField::BinCapacity => "bin_capacity",
            LocationField::UtilizationPercent => "utilization_percent",
        }
    }

    fn allowed_operators(&self) -> &'static [Operator] {
        match self {
            LocationField::ZoneId | LocationField::LocationGroupId => IN_ONLY,
            LocationField::Id | LocationField::AisleId => EQ_IN,
            LocationField::LocationLevel => LEVEL_OPS,
            LocationField::StorageType
            | LocationField::BinStatus
            | LocationField::TempZone
            | LocationField::SingleMerchantOnly => EQ_ONLY,
            LocationField::DistanceShipping
            | LocationField::BinCapacity
            | LocationField::UtilizationPercent => NUMERIC_FULL,
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(
            self,
            LocationField::LocationLevel
                | LocationField::DistanceShipping
                | LocationField::BinCapacity
                | LocationField::UtilizationPercent
        )
    }

    fn supports_exclude(&self) -> bool {
        !matches!(
            self,
            LocationField::BinStatus | LocationField::SingleMerchantOnly
        )
    }
}

impl fmt::Display for LocationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
