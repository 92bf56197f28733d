//! Phase 2: ranked preferences.
//!
//! Preferences are tried in ascending priority. Each one that applies to
//! the product scopes the candidates with its location criteria, ranks
//! them with its sort pipeline and takes the top one. A preference that
//! finds nothing falls through to the next.

use tracing::debug;

use super::PutawayRequest;
use crate::config::EngineConfig;
use crate::criteria::matches;
use crate::defects::RuleTraceEntry;
use crate::models::{ExecutionTrace, Location, Phase, Preference, TraceEntry, TraceKind};
use crate::ranking::{RankingContext, RankingEngine};

/// Failure reason when no preference is enabled and in scope.
pub const NO_ACTIVE_PREFERENCES: &str = "No active preferences configured";

/// Failure reason when every preference fell through.
pub const PREFERENCES_EXHAUSTED: &str = "All preferences exhausted (Fall-through complete)";

/// What one preference did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceEvaluation {
    pub rule_id: String,
    pub rule_name: String,
    pub priority: u32,
    pub product_matched: bool,
    /// Locations matching the preference's location criteria.
    pub candidate_count: usize,
}

impl From<&PreferenceEvaluation> for RuleTraceEntry {
    fn from(e: &PreferenceEvaluation) -> Self {
        RuleTraceEntry::preference(
            e.rule_id.clone(),
            e.rule_name.clone(),
            e.priority,
            e.product_matched,
            e.candidate_count,
        )
    }
}

/// The winning location and rule.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub location: &'a Location,
    pub preference: &'a Preference,
    pub via_cart_consolidation: bool,
}

/// Outcome of the preference phase.
#[derive(Debug, Clone)]
pub struct PreferencePhase<'a> {
    pub selection: Result<Selection<'a>, &'static str>,
    /// One entry per preference tried, in priority order.
    pub evaluations: Vec<PreferenceEvaluation>,
}

impl<'a> PreferencePhase<'a> {
    pub fn selected(&self) -> Option<&Selection<'a>> {
        self.selection.as_ref().ok()
    }

    pub fn failure_reason(&self) -> Option<&'static str> {
        self.selection.err()
    }
}

/// Tries preferences against the post-constraint `locations`.
///
/// `last_put` is the cart's last put location resolved against the full
/// location universe; it anchors `proximity_last_location` even when the
/// bin itself is no longer a candidate.
pub fn rank_and_select<'a>(
    request: &PutawayRequest,
    locations: &[&'a Location],
    preferences: &'a [Preference],
    last_put: Option<&Location>,
    config: &EngineConfig,
    trace: &mut ExecutionTrace,
) -> PreferencePhase<'a> {
    trace.push(TraceEntry::new(
        Phase::Preferences,
        TraceKind::Info,
        format!("Phase 2: Preferences ({} candidates)", locations.len()),
    ));

    let mut active: Vec<&'a Preference> = preferences
        .iter()
        .filter(|p| p.is_active_for(request.transaction_type))
        .collect();
    active.sort_by_key(|p| p.priority);

    if active.is_empty() {
        trace.push(TraceEntry::new(
            Phase::Preferences,
            TraceKind::Fail,
            "No active preferences defined",
        ));
        return PreferencePhase {
            selection: Err(NO_ACTIVE_PREFERENCES),
            evaluations: Vec::new(),
        };
    }

    let product = &request.product;
    let context = RankingContext::new(product).with_last_put_location(last_put);
    let mut evaluations = Vec::with_capacity(active.len());

    for preference in active {
        trace.push(
            TraceEntry::new(
                Phase::Preferences,
                TraceKind::Attempt,
                format!("Checking preference #{}", preference.priority),
            )
            .for_rule(&preference.id, &preference.name)
            .with_priority(preference.priority),
        );

        let mut evaluation = PreferenceEvaluation {
            rule_id: preference.id.clone(),
            rule_name: preference.name.clone(),
            priority: preference.priority,
            product_matched: false,
            candidate_count: 0,
        };

        if !matches(&preference.product_criteria, product) {
            trace.push(
                TraceEntry::new(
                    Phase::Preferences,
                    TraceKind::Skip,
                    "Product criteria mismatch - skipped",
                )
                .for_rule(&preference.id, &preference.name),
            );
            evaluations.push(evaluation);
            continue;
        }
        evaluation.product_matched = true;

        if preference.cart_consolidation {
            if let Some(last_id) = request.cart.last_put_location.as_deref() {
                let leader = locations.iter().copied().find(|l| l.id == last_id);
                match leader {
                    Some(loc) if loc.has_spare_capacity(config.capacity_threshold_percent) => {
                        trace.push(
                            TraceEntry::new(
                                Phase::Preferences,
                                TraceKind::Success,
                                format!("Follow the Leader: Selected {} (Last Put Location)", loc.id),
                            )
                            .for_rule(&preference.id, &preference.name)
                            .detail("locationId", loc.id.as_str())
                            .detail("cartId", request.cart.cart_id.clone()),
                        );
                        evaluation.candidate_count = 1;
                        evaluations.push(evaluation);
                        return PreferencePhase {
                            selection: Ok(Selection {
                                location: loc,
                                preference,
                                via_cart_consolidation: true,
                            }),
                            evaluations,
                        };
                    }
                    _ => trace.push(
                        TraceEntry::new(
                            Phase::Preferences,
                            TraceKind::Info,
                            "Last Put Location unavailable or full - falling back to normal logic",
                        )
                        .for_rule(&preference.id, &preference.name),
                    ),
                }
            }
        }

        let mut candidates: Vec<&'a Location> = locations
            .iter()
            .copied()
            .filter(|loc| matches(&preference.location_criteria, *loc))
            .collect();
        evaluation.candidate_count = candidates.len();
        evaluations.push(evaluation);

        if candidates.is_empty() {
            trace.push(
                TraceEntry::new(
                    Phase::Preferences,
                    TraceKind::Fail,
                    "Scope found 0 candidates - fall through to next preference",
                )
                .for_rule(&preference.id, &preference.name),
            );
            continue;
        }

        trace.push(
            TraceEntry::new(
                Phase::Preferences,
                TraceKind::Info,
                format!("Found {} candidates matching scope", candidates.len()),
            )
            .for_rule(&preference.id, &preference.name)
            .detail("candidateCount", candidates.len()),
        );

        if preference.order_by.sorts() {
            let engine = RankingEngine::from_order_by(&preference.order_by)
                .with_epsilon(config.score_epsilon);
            candidates = engine.sort(&candidates, &context);

            let top: Vec<&str> = candidates
                .iter()
                .take(config.trace_top_candidates)
                .map(|c| c.id.as_str())
                .collect();
            let mut entry = TraceEntry::new(
                Phase::Preferences,
                TraceKind::Info,
                format!("Sorted by {}", preference.order_by.describe()),
            )
            .for_rule(&preference.id, &preference.name)
            .detail("topCandidates", top);
            if let Some(primary) = preference.order_by.primary() {
                entry = entry.detail("primarySort", primary.strategy.name());
            }
            if let Some(secondary) = preference.order_by.secondary() {
                entry = entry.detail("secondarySort", secondary.strategy.name());
            }
            trace.push(entry);
        }

        let selected = candidates[0];
        debug!(
            target: "putaway::preferences",
            rule_id = %preference.id,
            location_id = %selected.id,
            candidates = candidates.len(),
            "Preference selected location"
        );
        trace.push(
            TraceEntry::new(
                Phase::Preferences,
                TraceKind::Success,
                format!("Selected {}", selected.id),
            )
            .for_rule(&preference.id, &preference.name)
            .detail("locationId", selected.id.as_str())
            .detail("zone", selected.zone_id.as_str())
            .detail("level", selected.location_level),
        );

        return PreferencePhase {
            selection: Ok(Selection {
                location: selected,
                preference,
                via_cart_consolidation: false,
            }),
            evaluations,
        };
    }

    trace.push(TraceEntry::new(
        Phase::Preferences,
        TraceKind::Fail,
        "All preferences exhausted with no matches",
    ));

    PreferencePhase {
        selection: Err(PREFERENCES_EXHAUSTED),
        evaluations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BinStatus, CartContext, ContentItem, Criterion, LocationField, OrderBy, Product,
        ProductField, SortStrategy, TransactionType,
    };

    fn locations() -> Vec<Location> {
        vec![
            Location::new("BIN-001", "Zone_A_Golden")
                .with_aisle("A1")
                .with_distance(10.0)
                .with_utilization(40.0)
                .with_status(BinStatus::Partial),
            Location::new("BIN-002", "Zone_A_Golden")
                .with_aisle("A1")
                .with_distance(10.0)
                .with_utilization(70.0)
                .with_status(BinStatus::Partial)
                .with_content(ContentItem::new("Nike", "SKU-105", 4)),
            Location::new("BIN-003", "Zone_B_Standard")
                .with_aisle("B1")
                .with_distance(35.0),
            Location::new("BIN-004", "Zone_B_Standard")
                .with_aisle("B2")
                .with_distance(50.0)
                .with_utilization(96.0)
                .with_status(BinStatus::Partial),
        ]
    }

    fn request() -> PutawayRequest {
        PutawayRequest::new(Product::new("SKU-105", "Nike"), TransactionType::InboundPo)
    }

    fn run<'a>(
        req: &PutawayRequest,
        locs: &'a [Location],
        prefs: &'a [Preference],
        trace: &mut ExecutionTrace,
    ) -> PreferencePhase<'a> {
        let refs: Vec<&Location> = locs.iter().collect();
        let last = req
            .cart
            .last_put_location
            .as_deref()
            .and_then(|id| locs.iter().find(|l| l.id == id));
        rank_and_select(req, &refs, prefs, last, &EngineConfig::default(), trace)
    }

    #[test]
    fn test_no_active_preferences() {
        let locs = locations();
        let prefs = vec![Preference::new("p1", "Off", 1).disabled()];
        let mut trace = ExecutionTrace::new();
        let phase = run(&request(), &locs, &prefs, &mut trace);
        assert_eq!(phase.failure_reason(), Some(NO_ACTIVE_PREFERENCES));
        assert!(phase.evaluations.is_empty());
    }

    #[test]
    fn test_first_match_wins_with_fall_through() {
        let locs = locations();
        let prefs = vec![
            Preference::new("p1", "Freezer", 1)
                .on_location(Criterion::eq(LocationField::ZoneId, "Zone_Frozen")),
            Preference::new("p2", "Standard", 2)
                .on_location(Criterion::eq(LocationField::ZoneId, "Zone_B_Standard"))
                .with_order_by(OrderBy::keys([SortStrategy::DistanceShipping])),
        ];
        let mut trace = ExecutionTrace::new();
        let phase = run(&request(), &locs, &prefs, &mut trace);
        let sel = phase.selected().unwrap();
        assert_eq!(sel.preference.id, "p2");
        assert_eq!(sel.location.id, "BIN-003");
        assert_eq!(phase.evaluations[0].candidate_count, 0);
        assert!(trace
            .for_rule("p1")
            .any(|e| e.kind == TraceKind::Fail));
    }

    #[test]
    fn test_priority_order_not_list_order() {
        let locs = locations();
        let prefs = vec![
            Preference::new("p2", "Second", 2),
            Preference::new("p1", "First", 1)
                .on_location(Criterion::eq(LocationField::ZoneId, "Zone_B_Standard")),
        ];
        let mut trace = ExecutionTrace::new();
        let phase = run(&request(), &locs, &prefs, &mut trace);
        assert_eq!(phase.selected().unwrap().preference.id, "p1");
    }

    #[test]
    fn test_product_mismatch_skips() {
        let locs = locations();
        let prefs = vec![
            Preference::new("p1", "Hazmat", 1)
                .when_product(Criterion::exists(ProductField::HazmatClass)),
            Preference::new("p2", "Anything", 2),
        ];
        let mut trace = ExecutionTrace::new();
        let phase = run(&request(), &locs, &prefs, &mut trace);
        assert_eq!(phase.selected().unwrap().preference.id, "p2");
        assert!(!phase.evaluations[0].product_matched);
    }

    #[test]
    fn test_exhausted() {
        let locs = locations();
        let prefs = vec![Preference::new("p1", "Freezer", 1)
            .on_location(Criterion::eq(LocationField::ZoneId, "Zone_Frozen"))];
        let mut trace = ExecutionTrace::new();
        let phase = run(&request(), &locs, &prefs, &mut trace);
        assert_eq!(phase.failure_reason(), Some(PREFERENCES_EXHAUSTED));
        assert_eq!(trace.last().unwrap().kind, TraceKind::Fail);
    }

    #[test]
    fn test_tie_break_by_id() {
        let locs = locations();
        let prefs = vec![Preference::new("p1", "Closest", 1)
            .with_order_by(OrderBy::keys([SortStrategy::DistanceShipping]))];
        let mut trace = ExecutionTrace::new();
        let phase = run(&request(), &locs, &prefs, &mut trace);
        assert_eq!(phase.selected().unwrap().location.id, "BIN-001");
        let sort = trace
            .entries()
            .iter()
            .find(|e| e.message.starts_with("Sorted by"))
            .unwrap();
        assert_eq!(
            sort.details["topCandidates"],
            serde_json::json!(["BIN-001", "BIN-002", "BIN-003"])
        );
        assert_eq!(sort.details["primarySort"], "distance_shipping");
    }

    #[test]
    fn test_secondary_sort() {
        let locs = locations();
        let prefs = vec![Preference::new("p1", "Consolidate", 1)
            .with_order_by(OrderBy::keys([SortStrategy::SkuMatch, SortStrategy::DistanceShipping]))];
        let mut trace = ExecutionTrace::new();
        let phase = run(&request(), &locs, &prefs, &mut trace);
        assert_eq!(phase.selected().unwrap().location.id, "BIN-002");
    }

    #[test]
    fn test_blank_sort_slot_keeps_stored_order() {
        let mut locs = locations();
        locs.reverse();
        let order: OrderBy = serde_json::from_str(r#"[{"field":""}]"#).unwrap();
        let prefs = vec![Preference::new("p1", "Unsorted", 1).with_order_by(order)];
        let mut trace = ExecutionTrace::new();
        let phase = run(&request(), &locs, &prefs, &mut trace);
        assert_eq!(phase.selected().unwrap().location.id, "BIN-004");
        assert!(!trace.entries().iter().any(|e| e.message.starts_with("Sorted by")));
    }

    #[test]
    fn test_cart_consolidation_precedence() {
        let locs = locations();
        let prefs = vec![
            Preference::new("p1", "Follow the Leader", 1).with_cart_consolidation(),
            Preference::new("p2", "Closest", 2)
                .with_order_by(OrderBy::keys([SortStrategy::DistanceShipping])),
        ];
        let req = request().with_cart(CartContext::new("CART-1").with_last_put("BIN-003"));
        let mut trace = ExecutionTrace::new();
        let phase = run(&req, &locs, &prefs, &mut trace);
        let sel = phase.selected().unwrap();
        assert_eq!(sel.location.id, "BIN-003");
        assert!(sel.via_cart_consolidation);
        assert_eq!(sel.preference.id, "p1");
    }

    #[test]
    fn test_cart_consolidation_full_falls_back_in_same_preference() {
        let locs = locations();
        let prefs = vec![Preference::new("p1", "Follow the Leader", 1)
            .with_cart_consolidation()
            .with_order_by(OrderBy::keys([SortStrategy::DistanceShipping]))];
        // BIN-004 is at 96% utilization.
        let req = request().with_cart(CartContext::new("CART-1").with_last_put("BIN-004"));
        let mut trace = ExecutionTrace::new();
        let phase = run(&req, &locs, &prefs, &mut trace);
        let sel = phase.selected().unwrap();
        assert_eq!(sel.preference.id, "p1");
        assert_eq!(sel.location.id, "BIN-001");
        assert!(!sel.via_cart_consolidation);
        assert!(trace
            .entries()
            .iter()
            .any(|e| e.message.starts_with("Last Put Location unavailable")));
    }

    #[test]
    fn test_proximity_uses_last_put() {
        let locs = locations();
        let prefs = vec![Preference::new("p1", "Near Last", 1)
            .on_location(Criterion::eq(LocationField::ZoneId, "Zone_B_Standard"))
            .with_order_by(OrderBy::keys([SortStrategy::ProximityLastLocation]))];
        let req = request().with_cart(CartContext::new("CART-1").with_last_put("BIN-001"));
        let mut trace = ExecutionTrace::new();
        let phase = run(&req, &locs, &prefs, &mut trace);
        // BIN-003: 25 + 10 = 35; BIN-004: 40 + 10 = 50.
        assert_eq!(phase.selected().unwrap().location.id, "BIN-003");
    }
}
