//! Putaway orchestration.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::constraints::apply_constraints;
use super::preferences::rank_and_select;
use super::{PutawayOutcome, PutawayRequest, PutawayResult, StowerOverride};
use crate::config::EngineConfig;
use crate::defects::{
    DefectFilter, DefectRecord, DefectSink, DefectStats, FailurePoint, NullDefectSink,
    RuleTraceEntry,
};
use crate::error::Result;
use crate::models::{ExecutionTrace, Location, Phase, RuleSet, TraceEntry, TraceKind};

/// Runs the two-phase funnel and reports failures to a defect sink.
///
/// # Algorithm
/// 1. Drop FULL and locked locations from the universe.
/// 2. Apply hard constraints; an empty result is a `PHASE_1` failure.
/// 3. Try preferences in priority order; no selection is a `PHASE_2` failure.
///
/// Each call returns a complete trace whatever the outcome.
///
/// # Example
/// ```
/// use u_putaway::models::{Location, Preference, Product, RuleSet, TransactionType};
/// use u_putaway::putaway::{PutawayExecutor, PutawayRequest};
///
/// let rules = RuleSet::new().with_preference(Preference::new("p1", "Anywhere", 1));
/// let locations = vec![Location::new("BIN-001", "Zone_A")];
/// let request = PutawayRequest::new(Product::new("SKU-1", "Nike"), TransactionType::InboundPo);
///
/// let result = PutawayExecutor::new().execute(&request, &locations, &rules);
/// assert_eq!(result.assigned_location().unwrap().id, "BIN-001");
/// ```
#[derive(Debug, Clone)]
pub struct PutawayExecutor<S = NullDefectSink> {
    config: EngineConfig,
    sink: S,
}

impl PutawayExecutor<NullDefectSink> {
    /// An executor that discards defect records.
    pub fn new() -> Self {
        Self::with_sink(NullDefectSink)
    }
}

impl Default for PutawayExecutor<NullDefectSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: DefectSink> PutawayExecutor<S> {
    /// An executor writing defects to `sink`.
    pub fn with_sink(sink: S) -> Self {
        Self {
            config: EngineConfig::default(),
            sink,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Decides a location for one product.
    pub fn execute(
        &self,
        request: &PutawayRequest,
        locations: &[Location],
        rules: &RuleSet,
    ) -> PutawayResult {
        let mut trace = ExecutionTrace::new();
        let product = &request.product;

        trace.push(
            TraceEntry::new(
                Phase::Setup,
                TraceKind::Info,
                format!("Starting putaway for {}", product.sku_id),
            )
            .detail("transactionType", request.transaction_type.as_str())
            .detail("initialCandidates", locations.len())
            .detail("cartId", request.cart.cart_id.clone()),
        );

        let assignable: Vec<&Location> = locations.iter().filter(|l| l.is_assignable()).collect();
        trace.push(
            TraceEntry::new(
                Phase::Setup,
                TraceKind::Info,
                format!(
                    "After filtering FULL/locked bins: {} candidates",
                    assignable.len()
                ),
            )
            .detail("filtered", locations.len() - assignable.len()),
        );

        let phase1 = apply_constraints(
            product,
            request.transaction_type,
            &assignable,
            &rules.constraints,
            &mut trace,
        );
        let constraint_trace: Vec<RuleTraceEntry> =
            phase1.applied().map(RuleTraceEntry::from).collect();

        if let Some(reason) = phase1.failure_reason() {
            info!(
                target: "putaway::executor",
                sku_id = %product.sku_id,
                transaction_type = %request.transaction_type,
                reason,
                "Putaway failed in constraints"
            );
            let defect_id = self.log_failure(DefectRecord::zero_locations(
                product.sku_id.clone(),
                request.transaction_type,
                FailurePoint::Phase1,
                constraint_trace,
            ));
            return PutawayResult {
                product_id: product.sku_id.clone(),
                transaction_type: request.transaction_type,
                outcome: PutawayOutcome::Failed {
                    failure_point: FailurePoint::Phase1,
                    reason: reason.to_string(),
                },
                valid_locations: Vec::new(),
                trace,
                defect_id,
            };
        }

        let valid_ids: Vec<String> = phase1
            .valid_locations
            .iter()
            .map(|l| l.id.clone())
            .collect();

        // Anchor for proximity ranking, looked up before any filtering.
        let last_put = request
            .cart
            .last_put_location
            .as_deref()
            .and_then(|id| locations.iter().find(|l| l.id == id));

        let phase2 = rank_and_select(
            request,
            &phase1.valid_locations,
            &rules.preferences,
            last_put,
            &self.config,
            &mut trace,
        );

        match phase2.selection {
            Ok(selection) => {
                info!(
                    target: "putaway::executor",
                    sku_id = %product.sku_id,
                    location_id = %selection.location.id,
                    preference_id = %selection.preference.id,
                    via_cart = selection.via_cart_consolidation,
                    "Putaway assigned"
                );
                PutawayResult {
                    product_id: product.sku_id.clone(),
                    transaction_type: request.transaction_type,
                    outcome: PutawayOutcome::Assigned {
                        location: selection.location.clone(),
                        winning_preference: selection.preference.clone(),
                        via_cart_consolidation: selection.via_cart_consolidation,
                    },
                    valid_locations: valid_ids,
                    trace,
                    defect_id: None,
                }
            }
            Err(reason) => {
                info!(
                    target: "putaway::executor",
                    sku_id = %product.sku_id,
                    transaction_type = %request.transaction_type,
                    candidates = valid_ids.len(),
                    reason,
                    "Putaway failed in preferences"
                );
                let mut rule_trace = constraint_trace;
                rule_trace.extend(phase2.evaluations.iter().map(RuleTraceEntry::from));
                let defect_id = self.log_failure(
                    DefectRecord::zero_locations(
                        product.sku_id.clone(),
                        request.transaction_type,
                        FailurePoint::Phase2,
                        rule_trace,
                    )
                    .with_valid_locations(valid_ids.clone()),
                );
                PutawayResult {
                    product_id: product.sku_id.clone(),
                    transaction_type: request.transaction_type,
                    outcome: PutawayOutcome::Failed {
                        failure_point: FailurePoint::Phase2,
                        reason: reason.to_string(),
                    },
                    valid_locations: valid_ids,
                    trace,
                    defect_id,
                }
            }
        }
    }

    /// Records a stower putting the product somewhere other than recommended.
    ///
    /// Returns `Ok(None)` when the actual location is the recommended one.
    /// A failed result has no recommendation, so any location is an override.
    pub fn record_override(
        &self,
        result: &PutawayResult,
        stower_override: StowerOverride,
    ) -> Result<Option<DefectRecord>> {
        let recommended = result.assigned_location().map(|l| l.id.clone());
        if recommended.as_deref() == Some(stower_override.actual_location.as_str()) {
            debug!(
                target: "putaway::executor",
                location_id = %stower_override.actual_location,
                "Stower followed recommendation"
            );
            return Ok(None);
        }

        let record = DefectRecord::stower_override(
            result.product_id.clone(),
            result.transaction_type,
            stower_override.reason,
            stower_override.actual_location,
        )
        .with_recommended(recommended)
        .with_stower(stower_override.stower_id)
        .with_note(stower_override.note)
        .with_valid_locations(result.valid_locations.clone())
        .with_winning_preference(result.winning_preference().map(|p| p.id.clone()));

        self.sink.append(record.clone())?;
        info!(
            target: "putaway::executor",
            product_id = %record.product_id,
            reason = %stower_override.reason,
            "Stower override recorded"
        );
        Ok(Some(record))
    }

    /// Defects logged within the configured retention window before `now`.
    pub fn recent_defects(&self, now: DateTime<Utc>) -> Result<Vec<DefectRecord>> {
        let window = DefectFilter::within_retention(self.config.defect_retention_days, now);
        self.sink.query(&window)
    }

    /// Summary counts over [`recent_defects`](Self::recent_defects).
    pub fn defect_stats(&self, now: DateTime<Utc>) -> Result<DefectStats> {
        Ok(DefectStats::calculate(&self.recent_defects(now)?))
    }

    // A sink failure never changes the decision already made.
    fn log_failure(&self, record: DefectRecord) -> Option<Uuid> {
        if !self.config.log_defects {
            return None;
        }
        let id = record.defect_id;
        match self.sink.append(record) {
            Ok(()) => Some(id),
            Err(e) => {
                warn!(target: "putaway::executor", error = %e, "Failed to log defect");
                None
            }
        }
    }
}
