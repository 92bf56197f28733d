//! Sort configuration for preferences.
//!
//! The canonical form is an ordered list of sort keys: the first key is
//! the primary sort and each later key only breaks ties left by the keys
//! before it. Rule sets authored with the older two-slot
//! `{ "primary": …, "secondary": … }` object are accepted on input and
//! converted to a list of at most two keys; output is always the list form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

/// A ranking strategy for candidate locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortStrategy {
    /// Bins already holding the product's lot first.
    ExpiryAffinity,
    /// Bins already holding the product's SKU first.
    SkuMatch,
    /// Bins already holding the product's merchant first.
    MerchantAffinity,
    /// Fullest bins first (top-off).
    BinUtilizationDesc,
    /// Emptiest bins first (spread).
    BinUtilizationAsc,
    /// Closest to the shipping dock first.
    DistanceShipping,
    /// Bins with the most lines of the product's merchant first.
    ClusterMerchant,
    /// Lowest level first.
    LocationLevelAsc,
    /// Smallest bins first.
    BinCapacityAsc,
    /// Nearest to the cart's last put location first.
    ProximityLastLocation,
    /// Blank or unrecognized identifier. Never changes the order.
    #[serde(other)]
    Unknown,
}

impl SortStrategy {
    /// All strategies, in configuration order.
    pub const ALL: [SortStrategy; 10] = [
        SortStrategy::ExpiryAffinity,
        SortStrategy::SkuMatch,
        SortStrategy::MerchantAffinity,
        SortStrategy::BinUtilizationDesc,
        SortStrategy::BinUtilizationAsc,
        SortStrategy::DistanceShipping,
        SortStrategy::ClusterMerchant,
        SortStrategy::LocationLevelAsc,
        SortStrategy::BinCapacityAsc,
        SortStrategy::ProximityLastLocation,
    ];

    /// Configuration identifier.
    pub fn name(&self) -> &'static str {
        match self {
            SortStrategy::ExpiryAffinity => "expiry_affinity",
            SortStrategy::SkuMatch => "sku_match",
            SortStrategy::MerchantAffinity => "merchant_affinity",
            SortStrategy::BinUtilizationDesc => "bin_utilization_desc",
            SortStrategy::BinUtilizationAsc => "bin_utilization_asc",
            SortStrategy::DistanceShipping => "distance_shipping",
            SortStrategy::ClusterMerchant => "cluster_merchant",
            SortStrategy::LocationLevelAsc => "location_level_asc",
            SortStrategy::BinCapacityAsc => "bin_capacity_asc",
            SortStrategy::ProximityLastLocation => "proximity_last_location",
            SortStrategy::Unknown => "unknown",
        }
    }

    /// Short description shown next to the strategy in rule editors.
    pub fn description(&self) -> &'static str {
        match self {
            SortStrategy::ExpiryAffinity => "Prioritize Same Lot/Expiry",
            SortStrategy::SkuMatch => "Prioritize Same SKU",
            SortStrategy::MerchantAffinity => "Prioritize Same Merchant",
            SortStrategy::BinUtilizationDesc => "Fill Most Full (Top-off)",
            SortStrategy::BinUtilizationAsc => "Fill Least Full (Spread)",
            SortStrategy::DistanceShipping => "Closest to Shipping Dock",
            SortStrategy::ClusterMerchant => "Cluster by Merchant",
            SortStrategy::LocationLevelAsc => "Fill Bottom Levels First",
            SortStrategy::BinCapacityAsc => "Smallest Bin First",
            SortStrategy::ProximityLastLocation => "Closest to Last Put Location",
            SortStrategy::Unknown => "Not configured",
        }
    }

    /// Direction the strategy sorts in when none is given.
    pub fn natural_direction(&self) -> Direction {
        match self {
            SortStrategy::ExpiryAffinity
            | SortStrategy::SkuMatch
            | SortStrategy::MerchantAffinity
            | SortStrategy::BinUtilizationDesc
            | SortStrategy::ClusterMerchant => Direction::Desc,
            SortStrategy::BinUtilizationAsc
            | SortStrategy::DistanceShipping
            | SortStrategy::LocationLevelAsc
            | SortStrategy::BinCapacityAsc
            | SortStrategy::ProximityLastLocation
            | SortStrategy::Unknown => Direction::Asc,
        }
    }

    pub fn is_known(&self) -> bool {
        *self != SortStrategy::Unknown
    }

    /// Whether the identifier itself fixes the direction, so an explicit
    /// direction on the key is ignored.
    pub fn has_fixed_direction(&self) -> bool {
        matches!(
            self,
            SortStrategy::BinUtilizationDesc
                | SortStrategy::BinUtilizationAsc
                | SortStrategy::LocationLevelAsc
                | SortStrategy::BinCapacityAsc
        )
    }
}

impl fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One step of a sort pipeline.
///
/// Deserializes from a bare strategy name (`"distance_shipping"`) or an
/// object with `strategy` (alias `field`) and optional `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SortKeyRepr")]
pub struct SortKey {
    pub strategy: SortStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SortKeyRepr {
    Name(SortStrategy),
    Object {
        #[serde(alias = "field")]
        strategy: SortStrategy,
        #[serde(default)]
        direction: Option<Direction>,
    },
}

impl From<SortKeyRepr> for SortKey {
    fn from(repr: SortKeyRepr) -> Self {
        match repr {
            SortKeyRepr::Name(strategy) => SortKey::new(strategy),
            SortKeyRepr::Object {
                strategy,
                direction,
            } => SortKey {
                strategy,
                direction,
            },
        }
    }
}

impl SortKey {
    /// A key sorting in the strategy's natural direction.
    pub fn new(strategy: SortStrategy) -> Self {
        Self {
            strategy,
            direction: None,
        }
    }

    /// A key with an explicit direction.
    pub fn with_direction(strategy: SortStrategy, direction: Direction) -> Self {
        Self {
            strategy,
            direction: Some(direction),
        }
    }

    /// Direction actually applied when sorting.
    pub fn effective_direction(&self) -> Direction {
        if self.strategy.has_fixed_direction() {
            return self.strategy.natural_direction();
        }
        self.direction
            .unwrap_or_else(|| self.strategy.natural_direction())
    }
}

impl From<SortStrategy> for SortKey {
    fn from(strategy: SortStrategy) -> Self {
        SortKey::new(strategy)
    }
}

/// Ordered sort pipeline of a preference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OrderByRepr", into = "Vec<SortKey>")]
pub struct OrderBy {
    keys: Vec<SortKey>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OrderByRepr {
    List(Vec<SortKey>),
    Pair {
        #[serde(default)]
        primary: Option<SortKey>,
        #[serde(default)]
        secondary: Option<SortKey>,
    },
}

impl From<OrderByRepr> for OrderBy {
    fn from(repr: OrderByRepr) -> Self {
        match repr {
            OrderByRepr::List(keys) => OrderBy { keys },
            OrderByRepr::Pair { primary, secondary } => OrderBy::pair(primary, secondary),
        }
    }
}

impl From<OrderBy> for Vec<SortKey> {
    fn from(order_by: OrderBy) -> Self {
        order_by.keys
    }
}

impl OrderBy {
    /// No sorting: candidates keep their stored order.
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds a pipeline from keys in priority order.
    pub fn keys(keys: impl IntoIterator<Item = impl Into<SortKey>>) -> Self {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Two-slot form. A missing or blank primary leaves the secondary
    /// unused, as in rule sets that configured only the second slot.
    pub fn pair(primary: Option<SortKey>, secondary: Option<SortKey>) -> Self {
        let keys = match primary {
            Some(p) if p.strategy.is_known() => std::iter::once(p).chain(secondary).collect(),
            _ => Vec::new(),
        };
        Self { keys }
    }

    /// Appends a tie-breaking key.
    pub fn then(mut self, key: impl Into<SortKey>) -> Self {
        self.keys.push(key.into());
        self
    }

    pub fn as_slice(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether any key names a known strategy.
    pub fn sorts(&self) -> bool {
        self.keys.iter().any(|k| k.strategy.is_known())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// First key of the pipeline.
    pub fn primary(&self) -> Option<&SortKey> {
        self.keys.first()
    }

    /// Second key of the pipeline.
    pub fn secondary(&self) -> Option<&SortKey> {
        self.keys.get(1)
    }

    /// Human-readable pipeline, e.g. `"expiry_affinity (desc), distance_shipping (asc)"`.
    pub fn describe(&self) -> String {
        self.keys
            .iter()
            .map(|k| {
                let dir = match k.effective_direction() {
                    Direction::Asc => "asc",
                    Direction::Desc => "desc",
                };
                format!("{} ({dir})", k.strategy)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_form() {
        let order: OrderBy =
            serde_json::from_str(r#"["expiry_affinity", "bin_utilization_desc"]"#).unwrap();
        assert_eq!(order.len(), 2);
        assert_eq!(order.primary().unwrap().strategy, SortStrategy::ExpiryAffinity);
        assert_eq!(
            order.secondary().unwrap().strategy,
            SortStrategy::BinUtilizationDesc
        );
    }

    #[test]
    fn test_legacy_pair_form() {
        let order: OrderBy = serde_json::from_str(
            r#"{ "primary": { "field": "distance_shipping", "direction": "asc" }, "secondary": null }"#,
        )
        .unwrap();
        assert_eq!(order.len(), 1);
        assert_eq!(order.primary().unwrap().direction, Some(Direction::Asc));

        let empty: OrderBy =
            serde_json::from_str(r#"{ "primary": null, "secondary": null }"#).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_serializes_as_list() {
        let order = OrderBy::keys([SortStrategy::DistanceShipping]).then(SortKey::with_direction(
            SortStrategy::MerchantAffinity,
            Direction::Asc,
        ));
        let json = serde_json::to_string(&order).unwrap();
        assert_eq!(
            json,
            r#"[{"strategy":"distance_shipping"},{"strategy":"merchant_affinity","direction":"asc"}]"#
        );
        let back: OrderBy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, order);
    }

    #[test]
    fn test_fixed_direction_ignores_override() {
        let key = SortKey::with_direction(SortStrategy::BinCapacityAsc, Direction::Desc);
        assert_eq!(key.effective_direction(), Direction::Asc);
        let key = SortKey::with_direction(SortStrategy::DistanceShipping, Direction::Desc);
        assert_eq!(key.effective_direction(), Direction::Desc);
        assert_eq!(
            SortKey::new(SortStrategy::SkuMatch).effective_direction(),
            Direction::Desc
        );
    }

    #[test]
    fn test_strategy_names() {
        for s in SortStrategy::ALL {
            let json = serde_json::to_string(&s).unwrap();
            assert_eq!(json, format!("\"{}\"", s.name()));
        }
    }

    #[test]
    fn test_blank_strategy_slot() {
        let order: OrderBy =
            serde_json::from_str(r#"[{"field":"distance_shipping"},{"field":""}]"#).unwrap();
        assert_eq!(order.len(), 2);
        assert_eq!(order.secondary().unwrap().strategy, SortStrategy::Unknown);
        assert!(order.sorts());

        let blank: OrderBy = serde_json::from_str(r#"[{"field":""}, "no_such_strategy"]"#).unwrap();
        assert!(!blank.sorts());

        let pair: OrderBy = serde_json::from_str(
            r#"{ "primary": { "field": "" }, "secondary": { "field": "sku_match" } }"#,
        )
        .unwrap();
        assert!(pair.is_empty());
    }

    #[test]
    fn test_describe() {
        let order = OrderBy::keys([SortStrategy::ExpiryAffinity, SortStrategy::DistanceShipping]);
        assert_eq!(
            order.describe(),
            "expiry_affinity (desc), distance_shipping (asc)"
        );
    }
}
