//! Static rule conflict detection.
//!
//! Proves, ahead of any putaway, whether enabled constraints can ever leave
//! a location for the products they apply to. Preferences are not analyzed:
//! a preference that finds nothing falls through to the next one, so it
//! cannot dead-end a putaway on its own.
//!
//! # Conflict Types
//!
//! - **Self**: a constraint's location criteria match no location in the
//!   universe while some sampled product matches its product criteria.
//! - **Inter-rule**: two constraints apply to a common product, and the
//!   locations each one allows (honoring its action, against the full
//!   universe) do not intersect.
//!
//! Detection is recomputed on every call; cost is O(R² · L) for R
//! constraints and L locations.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::EngineConfig;
use crate::criteria::matches;
use crate::models::{Constraint, Location, Product, RuleAction, RuleSet};

/// How serious a conflict is. Every detected conflict dead-ends a putaway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
}

/// A detected conflict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Conflict {
    /// One constraint can never select a location.
    #[serde(rename = "self")]
    SelfConflict {
        rule_id: String,
        rule_name: String,
        severity: Severity,
        affected_product_count: usize,
        affected_product_examples: Vec<String>,
        message: String,
        details: serde_json::Value,
    },
    /// Two constraints leave no common location.
    #[serde(rename = "inter-rule")]
    InterRule {
        rule_ids: [String; 2],
        rule_names: [String; 2],
        severity: Severity,
        affected_product_count: usize,
        affected_product_examples: Vec<String>,
        message: String,
        details: serde_json::Value,
    },
}

impl Conflict {
    /// IDs of the rules involved.
    pub fn rule_ids(&self) -> Vec<&str> {
        match self {
            Conflict::SelfConflict { rule_id, .. } => vec![rule_id.as_str()],
            Conflict::InterRule { rule_ids, .. } => rule_ids.iter().map(String::as_str).collect(),
        }
    }

    pub fn involves(&self, rule_id: &str) -> bool {
        self.rule_ids().contains(&rule_id)
    }

    pub fn severity(&self) -> Severity {
        match self {
            Conflict::SelfConflict { severity, .. } | Conflict::InterRule { severity, .. } => {
                *severity
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Conflict::SelfConflict { message, .. } | Conflict::InterRule { message, .. } => message,
        }
    }

    pub fn affected_product_count(&self) -> usize {
        match self {
            Conflict::SelfConflict {
                affected_product_count,
                ..
            }
            | Conflict::InterRule {
                affected_product_count,
                ..
            } => *affected_product_count,
        }
    }
}

/// Result of an analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub self_conflicts: Vec<Conflict>,
    pub inter_rule_conflicts: Vec<Conflict>,
}

impl ConflictReport {
    pub fn is_empty(&self) -> bool {
        self.self_conflicts.is_empty() && self.inter_rule_conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.self_conflicts.len() + self.inter_rule_conflicts.len()
    }

    /// All conflicts, self conflicts first.
    pub fn iter(&self) -> impl Iterator<Item = &Conflict> {
        self.self_conflicts
            .iter()
            .chain(self.inter_rule_conflicts.iter())
    }

    /// Conflicts involving a rule.
    pub fn conflicts_for_rule(&self, rule_id: &str) -> Vec<&Conflict> {
        self.iter().filter(|c| c.involves(rule_id)).collect()
    }

    /// Keeps only conflicts whose rules all exist in `rules` and are enabled.
    pub fn production_impact(&self, rules: &RuleSet) -> ConflictReport {
        let live = |c: &&Conflict| c.rule_ids().iter().all(|id| rules.is_rule_enabled(id));
        ConflictReport {
            self_conflicts: self.self_conflicts.iter().filter(live).cloned().collect(),
            inter_rule_conflicts: self
                .inter_rule_conflicts
                .iter()
                .filter(live)
                .cloned()
                .collect(),
        }
    }
}

/// Conflict analyzer.
///
/// # Example
/// ```
/// use u_putaway::conflicts::ConflictAnalyzer;
/// use u_putaway::models::{Constraint, Criterion, Location, LocationField, Product};
///
/// let rule = Constraint::limit_to("c1", "Deep Freeze")
///     .on_location(Criterion::is_in(LocationField::ZoneId, ["Zone_Deep_Freeze"]));
/// let locations = vec![Location::new("BIN-001", "Zone_A")];
/// let products = vec![Product::new("SKU-1", "Nike")];
///
/// let report = ConflictAnalyzer::new().analyze(&[rule], &locations, &products);
/// assert_eq!(report.self_conflicts.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ConflictAnalyzer {
    example_limit: usize,
}

impl ConflictAnalyzer {
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            example_limit: config.conflict_example_limit,
        }
    }

    /// Runs self and inter-rule detection over the constraints.
    pub fn analyze(
        &self,
        constraints: &[Constraint],
        locations: &[Location],
        products: &[Product],
    ) -> ConflictReport {
        let enabled: Vec<&Constraint> = constraints.iter().filter(|c| c.enabled).collect();

        let self_conflicts: Vec<Conflict> = enabled
            .iter()
            .filter_map(|c| self.detect_self_conflict(c, locations, products))
            .collect();

        let mut inter_rule_conflicts = Vec::new();
        for (i, a) in enabled.iter().enumerate() {
            for b in &enabled[i + 1..] {
                if let Some(conflict) = self.detect_inter_rule_conflict(a, b, locations, products) {
                    inter_rule_conflicts.push(conflict);
                }
            }
        }

        debug!(
            target: "putaway::conflicts",
            constraints = enabled.len(),
            locations = locations.len(),
            products = products.len(),
            self_conflicts = self_conflicts.len(),
            inter_rule_conflicts = inter_rule_conflicts.len(),
            "Conflict analysis complete"
        );

        ConflictReport {
            self_conflicts,
            inter_rule_conflicts,
        }
    }

    fn detect_self_conflict(
        &self,
        rule: &Constraint,
        locations: &[Location],
        products: &[Product],
    ) -> Option<Conflict> {
        if locations
            .iter()
            .any(|loc| matches(&rule.location_criteria, loc))
        {
            return None;
        }

        let affected: Vec<&Product> = products
            .iter()
            .filter(|p| matches(&rule.product_criteria, *p))
            .collect();
        if affected.is_empty() {
            return None;
        }

        Some(Conflict::SelfConflict {
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            severity: Severity::Error,
            affected_product_count: affected.len(),
            affected_product_examples: self.examples(&affected),
            message: format!(
                "Rule \"{}\" has location criteria that match zero locations",
                rule.name
            ),
            details: json!({
                "locationCriteria": rule.location_criteria,
                "productCriteria": rule.product_criteria,
            }),
        })
    }

    fn detect_inter_rule_conflict(
        &self,
        a: &Constraint,
        b: &Constraint,
        locations: &[Location],
        products: &[Product],
    ) -> Option<Conflict> {
        let shared: Vec<&Product> = products
            .iter()
            .filter(|p| matches(&a.product_criteria, *p) && matches(&b.product_criteria, *p))
            .collect();
        if shared.is_empty() {
            return None;
        }

        let allowed_a = allowed_locations(a, locations);
        let allowed_b = allowed_locations(b, locations);
        if allowed_a.intersection(&allowed_b).next().is_some() {
            return None;
        }

        Some(Conflict::InterRule {
            rule_ids: [a.id.clone(), b.id.clone()],
            rule_names: [a.name.clone(), b.name.clone()],
            severity: Severity::Error,
            affected_product_count: shared.len(),
            affected_product_examples: self.examples(&shared),
            message: format!(
                "Rules \"{}\" and \"{}\" have zero location overlap for {} product(s)",
                a.name,
                b.name,
                shared.len()
            ),
            details: json!({
                "ruleA": rule_details(a),
                "ruleB": rule_details(b),
            }),
        })
    }

    fn examples(&self, products: &[&Product]) -> Vec<String> {
        products
            .iter()
            .take(self.example_limit)
            .map(|p| p.sku_id.clone())
            .collect()
    }
}

impl Default for ConflictAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs [`ConflictAnalyzer::analyze`] with default settings.
pub fn analyze(constraints: &[Constraint], locations: &[Location], products: &[Product]) -> ConflictReport {
    ConflictAnalyzer::new().analyze(constraints, locations, products)
}

/// Analyzes a rule set and keeps only conflicts among enabled rules.
pub fn production_impact(rules: &RuleSet, locations: &[Location], products: &[Product]) -> ConflictReport {
    analyze(&rules.constraints, locations, products).production_impact(rules)
}

// Location IDs a constraint alone would leave from the full universe.
fn allowed_locations<'a>(rule: &Constraint, locations: &'a [Location]) -> HashSet<&'a str> {
    locations
        .iter()
        .filter(|loc| {
            let hit = matches(&rule.location_criteria, *loc);
            match rule.action {
                RuleAction::LimitTo => hit,
                RuleAction::Exclude => !hit,
            }
        })
        .map(|loc| loc.id.as_str())
        .collect()
}

fn rule_details(rule: &Constraint) -> serde_json::Value {
    json!({
        "name": rule.name,
        "action": rule.action,
        "locationCriteria": rule.location_criteria,
        "productCriteria": rule.product_criteria,
    })
}
