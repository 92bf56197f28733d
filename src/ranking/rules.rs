//! Built-in ranking rules, one per sort strategy.
//!
//! # Categories
//!
//! - **Affinity**: same lot, same SKU, same merchant, merchant clustering
//! - **Space**: utilization (both directions), bin capacity
//! - **Travel**: dock distance, level, proximity to the cart's last put
//!
//! # Score Convention
//! All rules return lower scores for preferred locations in their natural
//! direction.

use super::{RankScore, RankingContext, RankingRule};
use crate::models::{Location, SortStrategy};

/// Cost added to the proximity score when a candidate is in a different
/// aisle from the cart's last put location.
pub const AISLE_CHANGE_PENALTY: f64 = 10.0;

/// Returns the rule implementing a strategy.
pub fn rule_for(strategy: SortStrategy) -> &'static dyn RankingRule {
    match strategy {
        SortStrategy::ExpiryAffinity => &ExpiryAffinity,
        SortStrategy::SkuMatch => &SkuMatch,
        SortStrategy::MerchantAffinity => &MerchantAffinity,
        SortStrategy::BinUtilizationDesc => &BinUtilizationDesc,
        SortStrategy::BinUtilizationAsc => &BinUtilizationAsc,
        SortStrategy::DistanceShipping => &DistanceShipping,
        SortStrategy::ClusterMerchant => &ClusterMerchant,
        SortStrategy::LocationLevelAsc => &LocationLevelAsc,
        SortStrategy::BinCapacityAsc => &BinCapacityAsc,
        SortStrategy::ProximityLastLocation => &ProximityLastLocation,
        SortStrategy::Unknown => &Unconfigured,
    }
}

fn flag(hit: bool) -> RankScore {
    if hit {
        -1.0
    } else {
        0.0
    }
}

// ======================== Affinity rules ========================

/// Same lot first (FEFO integrity).
///
/// A product without a lot has no affinity to any bin.
#[derive(Debug, Clone, Copy)]
pub struct ExpiryAffinity;

impl RankingRule for ExpiryAffinity {
    fn strategy(&self) -> SortStrategy {
        SortStrategy::ExpiryAffinity
    }

    fn evaluate(&self, location: &Location, context: &RankingContext<'_>) -> RankScore {
        match context.product.lot_id.as_deref() {
            Some(lot) => flag(location.holds_lot(lot)),
            None => 0.0,
        }
    }
}

/// Same SKU first (consolidation).
#[derive(Debug, Clone, Copy)]
pub struct SkuMatch;

impl RankingRule for SkuMatch {
    fn strategy(&self) -> SortStrategy {
        SortStrategy::SkuMatch
    }

    fn evaluate(&self, location: &Location, context: &RankingContext<'_>) -> RankScore {
        flag(location.holds_sku(&context.product.sku_id))
    }
}

/// Same merchant first.
#[derive(Debug, Clone, Copy)]
pub struct MerchantAffinity;

impl RankingRule for MerchantAffinity {
    fn strategy(&self) -> SortStrategy {
        SortStrategy::MerchantAffinity
    }

    fn evaluate(&self, location: &Location, context: &RankingContext<'_>) -> RankScore {
        flag(location.holds_merchant(&context.product.merchant_id))
    }
}

/// Most same-merchant lines first.
#[derive(Debug, Clone, Copy)]
pub struct ClusterMerchant;

impl RankingRule for ClusterMerchant {
    fn strategy(&self) -> SortStrategy {
        SortStrategy::ClusterMerchant
    }

    fn evaluate(&self, location: &Location, context: &RankingContext<'_>) -> RankScore {
        -(location.merchant_line_count(&context.product.merchant_id) as f64)
    }
}

// ======================== Space rules ========================

/// Fullest bin first (top-off).
#[derive(Debug, Clone, Copy)]
pub struct BinUtilizationDesc;

impl RankingRule for BinUtilizationDesc {
    fn strategy(&self) -> SortStrategy {
        SortStrategy::BinUtilizationDesc
    }

    fn evaluate(&self, location: &Location, _context: &RankingContext<'_>) -> RankScore {
        -location.utilization_percent
    }
}

/// Emptiest bin first (spread).
#[derive(Debug, Clone, Copy)]
pub struct BinUtilizationAsc;

impl RankingRule for BinUtilizationAsc {
    fn strategy(&self) -> SortStrategy {
        SortStrategy::BinUtilizationAsc
    }

    fn evaluate(&self, location: &Location, _context: &RankingContext<'_>) -> RankScore {
        location.utilization_percent
    }
}

/// Smallest bin first.
#[derive(Debug, Clone, Copy)]
pub struct BinCapacityAsc;

impl RankingRule for BinCapacityAsc {
    fn strategy(&self) -> SortStrategy {
        SortStrategy::BinCapacityAsc
    }

    fn evaluate(&self, location: &Location, _context: &RankingContext<'_>) -> RankScore {
        location.bin_capacity
    }
}

// ======================== Travel rules ========================

/// Closest to the shipping dock first.
#[derive(Debug, Clone, Copy)]
pub struct DistanceShipping;

impl RankingRule for DistanceShipping {
    fn strategy(&self) -> SortStrategy {
        SortStrategy::DistanceShipping
    }

    fn evaluate(&self, location: &Location, _context: &RankingContext<'_>) -> RankScore {
        location.distance_shipping
    }
}

/// Lowest level first (ergonomics, safety).
#[derive(Debug, Clone, Copy)]
pub struct LocationLevelAsc;

impl RankingRule for LocationLevelAsc {
    fn strategy(&self) -> SortStrategy {
        SortStrategy::LocationLevelAsc
    }

    fn evaluate(&self, location: &Location, _context: &RankingContext<'_>) -> RankScore {
        f64::from(location.location_level)
    }
}

/// Nearest to the cart's last put location first.
///
/// Distance = |Δ dock distance| + |Δ level|, plus [`AISLE_CHANGE_PENALTY`]
/// when the aisles differ. Without a last put location every candidate
/// scores 0 and the rule leaves ordering to the next one.
#[derive(Debug, Clone, Copy)]
pub struct ProximityLastLocation;

impl RankingRule for ProximityLastLocation {
    fn strategy(&self) -> SortStrategy {
        SortStrategy::ProximityLastLocation
    }

    fn evaluate(&self, location: &Location, context: &RankingContext<'_>) -> RankScore {
        let Some(anchor) = context.last_put_location else {
            return 0.0;
        };
        let along = (location.distance_shipping - anchor.distance_shipping).abs();
        let vertical = f64::from((location.location_level - anchor.location_level).abs());
        let aisle = if location.aisle_id == anchor.aisle_id {
            0.0
        } else {
            AISLE_CHANGE_PENALTY
        };
        along + vertical + aisle
    }
}

/// Stand-in for a blank or unrecognized strategy: every candidate ties.
#[derive(Debug, Clone, Copy)]
pub struct Unconfigured;

impl RankingRule for Unconfigured {
    fn strategy(&self) -> SortStrategy {
        SortStrategy::Unknown
    }

    fn evaluate(&self, _location: &Location, _context: &RankingContext<'_>) -> RankScore {
        0.0
    }
}
