//! Phase 1: hard constraints.
//!
//! Every active constraint whose product criteria match narrows the working
//! set: `limit_to` keeps the matching locations, `exclude` drops them. The
//! result is the intersection of all of them, so evaluation order only
//! shows in the trace and in where the loop stops once nothing is left.

use tracing::debug;

use crate::criteria::matches;
use crate::defects::RuleTraceEntry;
use crate::models::{
    Constraint, ExecutionTrace, Location, Phase, Product, RuleAction, TraceEntry, TraceKind,
    TransactionType,
};

/// Failure reason when the constraints leave nothing.
pub const NO_VALID_LOCATIONS: &str = "No valid locations after Hard Constraints";

/// What one constraint did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintEvaluation {
    pub rule_id: String,
    pub rule_name: String,
    pub action: RuleAction,
    pub product_matched: bool,
    pub locations_before: usize,
    pub locations_after: usize,
}

impl ConstraintEvaluation {
    pub fn eliminated(&self) -> usize {
        self.locations_before - self.locations_after
    }
}

impl From<&ConstraintEvaluation> for RuleTraceEntry {
    fn from(e: &ConstraintEvaluation) -> Self {
        RuleTraceEntry::constraint(
            e.rule_id.clone(),
            e.rule_name.clone(),
            e.product_matched,
            e.locations_before,
            e.locations_after,
        )
    }
}

/// Outcome of the constraint phase.
#[derive(Debug, Clone)]
pub struct ConstraintPhase<'a> {
    /// Surviving locations, in input order.
    pub valid_locations: Vec<&'a Location>,
    /// One entry per constraint evaluated, in evaluation order.
    pub evaluations: Vec<ConstraintEvaluation>,
}

impl ConstraintPhase<'_> {
    pub fn is_failure(&self) -> bool {
        self.valid_locations.is_empty()
    }

    pub fn failure_reason(&self) -> Option<&'static str> {
        self.is_failure().then_some(NO_VALID_LOCATIONS)
    }

    /// Evaluations of constraints that applied to the product.
    pub fn applied(&self) -> impl Iterator<Item = &ConstraintEvaluation> {
        self.evaluations.iter().filter(|e| e.product_matched)
    }
}

/// Applies the active, in-scope constraints to `locations`.
///
/// Constraints run in stored order. Once the working set is empty the loop
/// stops; later constraints are neither evaluated nor traced.
pub fn apply_constraints<'a>(
    product: &Product,
    transaction_type: TransactionType,
    locations: &[&'a Location],
    constraints: &[Constraint],
    trace: &mut ExecutionTrace,
) -> ConstraintPhase<'a> {
    trace.push(TraceEntry::new(
        Phase::Constraints,
        TraceKind::Info,
        format!("Phase 1: Hard Constraints ({} candidates)", locations.len()),
    ));

    let active: Vec<&Constraint> = constraints
        .iter()
        .filter(|c| c.is_active_for(transaction_type))
        .collect();

    if active.is_empty() {
        trace.push(TraceEntry::new(
            Phase::Constraints,
            TraceKind::Info,
            "No active constraints - all locations remain valid",
        ));
    }

    let mut valid: Vec<&'a Location> = locations.to_vec();
    let mut evaluations = Vec::with_capacity(active.len());

    for constraint in active {
        if !matches(&constraint.product_criteria, product) {
            trace.push(
                TraceEntry::new(
                    Phase::Constraints,
                    TraceKind::Skip,
                    "Product criteria mismatch - skipped",
                )
                .for_rule(&constraint.id, &constraint.name),
            );
            evaluations.push(ConstraintEvaluation {
                rule_id: constraint.id.clone(),
                rule_name: constraint.name.clone(),
                action: constraint.action,
                product_matched: false,
                locations_before: valid.len(),
                locations_after: valid.len(),
            });
            continue;
        }

        let before = valid.len();
        valid.retain(|loc| {
            let hit = matches(&constraint.location_criteria, *loc);
            match constraint.action {
                RuleAction::LimitTo => hit,
                RuleAction::Exclude => !hit,
            }
        });
        let after = valid.len();

        debug!(
            target: "putaway::constraints",
            rule_id = %constraint.id,
            action = %constraint.action,
            before,
            after,
            "Constraint applied"
        );
        trace.push(
            TraceEntry::new(
                Phase::Constraints,
                TraceKind::Filter,
                format!("Applied {}", constraint.action),
            )
            .for_rule(&constraint.id, &constraint.name)
            .detail("action", constraint.action.as_str())
            .detail("before", before)
            .detail("after", after)
            .detail("dropped", before - after),
        );
        evaluations.push(ConstraintEvaluation {
            rule_id: constraint.id.clone(),
            rule_name: constraint.name.clone(),
            action: constraint.action,
            product_matched: true,
            locations_before: before,
            locations_after: after,
        });

        if valid.is_empty() {
            break;
        }
    }

    trace.push(
        TraceEntry::new(
            Phase::Constraints,
            TraceKind::Info,
            format!("Phase 1 complete: {} valid locations remaining", valid.len()),
        )
        .detail("remaining", valid.len()),
    );

    ConstraintPhase {
        valid_locations: valid,
        evaluations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BinStatus, Criterion, LocationField, ProductField};
    use proptest::prelude::*;

    fn universe() -> Vec<Location> {
        (1..=8)
            .map(|i| {
                Location::new(format!("BIN-{i:03}"), if i <= 4 { "Zone_A" } else { "Zone_B" })
                    .with_level((i % 4) + 1)
                    .with_status(if i % 2 == 0 {
                        BinStatus::Partial
                    } else {
                        BinStatus::Empty
                    })
            })
            .collect()
    }

    fn heavy() -> Product {
        Product::new("TEST-HEAVY-001", "Pact").with_weight(50.0)
    }

    fn ids(phase: &ConstraintPhase<'_>) -> Vec<String> {
        phase.valid_locations.iter().map(|l| l.id.clone()).collect()
    }

    #[test]
    fn test_limit_to() {
        let locs = universe();
        let refs: Vec<&Location> = locs.iter().collect();
        let c = Constraint::limit_to("c1", "Heavy Item Safety")
            .when_product(Criterion::gt(ProductField::Weight, 20.0))
            .on_location(Criterion::le(LocationField::LocationLevel, 2.0));
        let mut trace = ExecutionTrace::new();
        let phase = apply_constraints(&heavy(), TransactionType::InboundPo, &refs, &[c], &mut trace);

        assert!(!phase.is_failure());
        assert!(phase.valid_locations.iter().all(|l| l.location_level <= 2));
        assert_eq!(phase.evaluations[0].locations_before, 8);
        assert_eq!(phase.evaluations[0].locations_after, 4);
        let filter = trace.for_rule("c1").next().unwrap();
        assert_eq!(filter.kind, TraceKind::Filter);
        assert_eq!(filter.details["dropped"], 4);
    }

    #[test]
    fn test_exclude() {
        let locs = universe();
        let refs: Vec<&Location> = locs.iter().collect();
        let c = Constraint::exclude("c1", "No Zone B")
            .on_location(Criterion::eq(LocationField::ZoneId, "Zone_B"));
        let mut trace = ExecutionTrace::new();
        let phase = apply_constraints(&heavy(), TransactionType::InboundPo, &refs, &[c], &mut trace);
        assert_eq!(ids(&phase), vec!["BIN-001", "BIN-002", "BIN-003", "BIN-004"]);
    }

    #[test]
    fn test_product_mismatch_skips() {
        let locs = universe();
        let refs: Vec<&Location> = locs.iter().collect();
        let c = Constraint::limit_to("c1", "Hazmat Cage")
            .when_product(Criterion::eq(ProductField::HazmatClass, "CLASS_3"))
            .on_location(Criterion::eq(LocationField::ZoneId, "Zone_Hazmat"));
        let mut trace = ExecutionTrace::new();
        let phase = apply_constraints(&heavy(), TransactionType::InboundPo, &refs, &[c], &mut trace);
        assert_eq!(phase.valid_locations.len(), 8);
        assert!(!phase.evaluations[0].product_matched);
        assert_eq!(phase.applied().count(), 0);
        assert_eq!(trace.for_rule("c1").next().unwrap().kind, TraceKind::Skip);
    }

    #[test]
    fn test_disabled_and_out_of_scope_ignored() {
        let locs = universe();
        let refs: Vec<&Location> = locs.iter().collect();
        let none = Criterion::eq(LocationField::ZoneId, "Nowhere");
        let constraints = vec![
            Constraint::limit_to("off", "Off").on_location(none.clone()).disabled(),
            Constraint::limit_to("returns", "Returns Only")
                .with_scope([TransactionType::CustomerReturn])
                .on_location(none),
        ];
        let mut trace = ExecutionTrace::new();
        let phase = apply_constraints(
            &heavy(),
            TransactionType::InboundPo,
            &refs,
            &constraints,
            &mut trace,
        );
        assert_eq!(phase.valid_locations.len(), 8);
        assert!(phase.evaluations.is_empty());
        assert!(trace
            .entries()
            .iter()
            .any(|e| e.message.starts_with("No active constraints")));
    }

    #[test]
    fn test_early_exit_stops_evaluation() {
        let locs = universe();
        let refs: Vec<&Location> = locs.iter().collect();
        let constraints = vec![
            Constraint::limit_to("c1", "Deep Freeze Only")
                .on_location(Criterion::is_in(LocationField::ZoneId, ["Zone_Deep_Freeze"])),
            Constraint::exclude("c2", "No Level 4")
                .on_location(Criterion::eq(LocationField::LocationLevel, 4)),
        ];
        let mut trace = ExecutionTrace::new();
        let phase = apply_constraints(
            &heavy(),
            TransactionType::InboundPo,
            &refs,
            &constraints,
            &mut trace,
        );
        assert!(phase.is_failure());
        assert_eq!(phase.failure_reason(), Some(NO_VALID_LOCATIONS));
        assert_eq!(phase.evaluations.len(), 1);
        assert_eq!(trace.for_rule("c2").count(), 0);
    }

    #[test]
    fn test_rule_trace_conversion() {
        let e = ConstraintEvaluation {
            rule_id: "c1".into(),
            rule_name: "Heavy".into(),
            action: RuleAction::LimitTo,
            product_matched: true,
            locations_before: 10,
            locations_after: 3,
        };
        let entry = RuleTraceEntry::from(&e);
        assert_eq!(entry.eliminated_count, Some(7));
        assert_eq!(e.eliminated(), 7);
    }

    proptest! {
        #[test]
        fn prop_limit_to_order_irrelevant(
            levels in proptest::collection::vec(1i32..=5, 1..5),
            rotate in 0usize..5,
        ) {
            let locs = universe();
            let refs: Vec<&Location> = locs.iter().collect();
            let constraints: Vec<Constraint> = levels
                .iter()
                .enumerate()
                .map(|(i, lvl)| {
                    Constraint::limit_to(format!("c{i}"), format!("Level <= {lvl}"))
                        .on_location(Criterion::le(LocationField::LocationLevel, f64::from(*lvl)))
                })
                .collect();
            let mut rotated = constraints.clone();
            let k = rotate % rotated.len();
            rotated.rotate_left(k);
            rotated.reverse();

            let mut t1 = ExecutionTrace::new();
            let mut t2 = ExecutionTrace::new();
            let a = apply_constraints(&heavy(), TransactionType::InboundPo, &refs, &constraints, &mut t1);
            let b = apply_constraints(&heavy(), TransactionType::InboundPo, &refs, &rotated, &mut t2);
            prop_assert_eq!(ids(&a), ids(&b));
        }
    }
}
