//! Storage location model.
//!
//! A location is a physical bin, shelf slot, rack position, or floor
//! spot. The engine only reads locations: the universe passed to a
//! putaway call is a snapshot, and occupancy changes happen elsewhere.

use serde::{Deserialize, Serialize};

use super::{FieldValue, LocationField, Record, Scalar};

/// Occupancy state of a bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BinStatus {
    Empty,
    Partial,
    Full,
}

impl BinStatus {
    /// Configuration identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinStatus::Empty => "EMPTY",
            BinStatus::Partial => "PARTIAL",
            BinStatus::Full => "FULL",
        }
    }
}

/// One inventory line already stored in a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub merchant_id: String,
    pub sku_id: String,
    #[serde(default)]
    pub lot_id: Option<String>,
    pub quantity: u32,
}

impl ContentItem {
    /// Creates a content line without lot tracking.
    pub fn new(merchant_id: impl Into<String>, sku_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            sku_id: sku_id.into(),
            lot_id: None,
            quantity,
        }
    }

    /// Sets the lot.
    pub fn with_lot(mut self, lot_id: impl Into<String>) -> Self {
        self.lot_id = Some(lot_id.into());
        self
    }
}

/// A storage location candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Unique location identifier (e.g. `"BIN-001"`).
    pub id: String,
    /// Zone the location belongs to.
    pub zone_id: String,
    /// Location groups (multi-valued).
    #[serde(default)]
    pub location_group_id: Vec<String>,
    /// Storage medium (`BIN`, `SHELF`, `RACK`, `FLOOR`).
    pub storage_type: String,
    /// Vertical level, 1 = floor.
    pub location_level: i32,
    /// Occupancy state.
    pub bin_status: BinStatus,
    /// Temperature zone (`AMBIENT`, `CHILLED`, `FROZEN`).
    pub temp_zone: String,
    /// Aisle identifier.
    pub aisle_id: String,
    /// Travel distance to the shipping dock.
    pub distance_shipping: f64,
    /// Nominal capacity.
    pub bin_capacity: f64,
    /// Fill level, 0-100.
    pub utilization_percent: f64,
    /// Whether the location may only hold a single merchant's inventory.
    #[serde(default)]
    pub single_merchant_only: bool,
    /// Locked locations never receive putaways.
    #[serde(default)]
    pub locked: bool,
    /// Inventory currently stored.
    #[serde(default)]
    pub current_contents: Vec<ContentItem>,
}

impl Location {
    /// Creates an empty ambient shelf location at level 1.
    pub fn new(id: impl Into<String>, zone_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            zone_id: zone_id.into(),
            location_group_id: Vec::new(),
            storage_type: "SHELF".to_string(),
            location_level: 1,
            bin_status: BinStatus::Empty,
            temp_zone: "AMBIENT".to_string(),
            aisle_id: String::new(),
            distance_shipping: 0.0,
            bin_capacity: 1.0,
            utilization_percent: 0.0,
            single_merchant_only: false,
            locked: false,
            current_contents: Vec::new(),
        }
    }

    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.location_group_id.push(group_id.into());
        self
    }

    pub fn with_storage_type(mut self, storage_type: impl Into<String>) -> Self {
        self.storage_type = storage_type.into();
        self
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.location_level = level;
        self
    }

    pub fn with_status(mut self, status: BinStatus) -> Self {
        self.bin_status = status;
        self
    }

    pub fn with_temp_zone(mut self, temp_zone: impl Into<String>) -> Self {
        self.temp_zone = temp_zone.into();
        self
    }

    pub fn with_aisle(mut self, aisle_id: impl Into<String>) -> Self {
        self.aisle_id = aisle_id.into();
        self
    }

    pub fn with_distance(mut self, distance_shipping: f64) -> Self {
        self.distance_shipping = distance_shipping;
        self
    }

    pub fn with_capacity(mut self, bin_capacity: f64) -> Self {
        self.bin_capacity = bin_capacity;
        self
    }

    pub fn with_utilization(mut self, percent: f64) -> Self {
        self.utilization_percent = percent;
        self
    }

    pub fn single_merchant(mut self) -> Self {
        self.single_merchant_only = true;
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn with_content(mut self, item: ContentItem) -> Self {
        self.current_contents.push(item);
        self
    }

    /// Whether the location can receive a putaway at all (not FULL, not locked).
    pub fn is_assignable(&self) -> bool {
        self.bin_status != BinStatus::Full && !self.locked
    }

    /// Whether the location has room for a cart-consolidation put.
    pub fn has_spare_capacity(&self, threshold_percent: f64) -> bool {
        self.bin_status != BinStatus::Full && self.utilization_percent < threshold_percent
    }

    /// Whether any stored line carries the given lot.
    pub fn holds_lot(&self, lot_id: &str) -> bool {
        self.current_contents
            .iter()
            .any(|c| c.lot_id.as_deref() == Some(lot_id))
    }

    pub fn holds_sku(&self, sku_id: &str) -> bool {
        self.current_contents.iter().any(|c| c.sku_id == sku_id)
    }

    pub fn holds_merchant(&self, merchant_id: &str) -> bool {
        self.current_contents
            .iter()
            .any(|c| c.merchant_id == merchant_id)
    }

    /// Number of stored lines belonging to a merchant.
    pub fn merchant_line_count(&self, merchant_id: &str) -> usize {
        self.current_contents
            .iter()
            .filter(|c| c.merchant_id == merchant_id)
            .count()
    }
}

impl Record for Location {
    type Field = LocationField;

    fn field(&self, field: &LocationField) -> FieldValue {
        match field {
            LocationField::Id => self.id.as_str().into(),
            LocationField::ZoneId => self.zone_id.as_str().into(),
            LocationField::LocationGroupId => FieldValue::List(
                self.location_group_id
                    .iter()
                    .map(|g| Scalar::from(g.as_str()))
                    .collect(),
            ),
            LocationField::StorageType => self.storage_type.as_str().into(),
            LocationField::LocationLevel => self.location_level.into(),
            LocationField::BinStatus => self.bin_status.as_str().into(),
            LocationField::TempZone => self.temp_zone.as_str().into(),
            LocationField::SingleMerchantOnly => self.single_merchant_only.into(),
            LocationField::AisleId => self.aisle_id.as_str().into(),
            LocationField::DistanceShipping => self.distance_shipping.into(),
            LocationField::BinCapacity => self.bin_capacity.into(),
            LocationField::UtilizationPercent => self.utilization_percent.into(),
        }
    }
}
