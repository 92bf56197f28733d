//! Defect record shape.
//!
//! Field names and enumeration strings are read by external log consumers
//! and exports, so they are fixed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::{Phase, TransactionType};

/// Kind of defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefectType {
    /// The engine found no location.
    ZeroLocations,
    /// A stower put the product somewhere other than the recommendation.
    StowerOverride,
}

impl DefectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefectType::ZeroLocations => "ZERO_LOCATIONS",
            DefectType::StowerOverride => "STOWER_OVERRIDE",
        }
    }
}

impl fmt::Display for DefectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Funnel stage where a zero-location putaway ran dry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailurePoint {
    /// Hard constraints eliminated every location.
    #[serde(rename = "PHASE_1")]
    Phase1,
    /// Constraints passed but no preference selected a location.
    #[serde(rename = "PHASE_2")]
    Phase2,
}

impl FailurePoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePoint::Phase1 => "PHASE_1",
            FailurePoint::Phase2 => "PHASE_2",
        }
    }

    /// Human-readable stage name.
    pub fn label(&self) -> &'static str {
        match self {
            FailurePoint::Phase1 => "Phase 1 - Hard Constraints",
            FailurePoint::Phase2 => "Phase 2 - Preferences",
        }
    }
}

/// Why a stower deviated from the recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverrideReason {
    LocationFull,
    LocationDamaged,
    ProximityPreference,
    BatchConsolidation,
    Other,
}

impl OverrideReason {
    /// All reason codes, in display order.
    pub const ALL: [OverrideReason; 5] = [
        OverrideReason::LocationFull,
        OverrideReason::LocationDamaged,
        OverrideReason::ProximityPreference,
        OverrideReason::BatchConsolidation,
        OverrideReason::Other,
    ];

    /// Reason code.
    pub fn code(&self) -> &'static str {
        match self {
            OverrideReason::LocationFull => "LOCATION_FULL",
            OverrideReason::LocationDamaged => "LOCATION_DAMAGED",
            OverrideReason::ProximityPreference => "PROXIMITY_PREFERENCE",
            OverrideReason::BatchConsolidation => "BATCH_CONSOLIDATION",
            OverrideReason::Other => "OTHER",
        }
    }

    /// Text shown to stowers when picking a reason.
    pub fn label(&self) -> &'static str {
        match self {
            OverrideReason::LocationFull => "Recommended location is full",
            OverrideReason::LocationDamaged => "Recommended location is damaged",
            OverrideReason::ProximityPreference => "Chosen location is closer",
            OverrideReason::BatchConsolidation => "Consolidating with existing batch",
            OverrideReason::Other => "Other reason",
        }
    }
}

impl fmt::Display for OverrideReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Kind of rule named in a rule trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleType {
    #[serde(rename = "Hard Constraint")]
    HardConstraint,
    #[serde(rename = "Preference")]
    Preference,
}

/// How one rule affected a failed putaway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTraceEntry {
    pub phase: Phase,
    pub rule_id: String,
    pub rule_name: String,
    pub rule_type: RuleType,
    pub product_matched: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations_before: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations_after: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eliminated_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_count: Option<usize>,
}

impl RuleTraceEntry {
    /// Entry for a hard constraint that narrowed `before` to `after`.
    pub fn constraint(
        rule_id: impl Into<String>,
        rule_name: impl Into<String>,
        product_matched: bool,
        before: usize,
        after: usize,
    ) -> Self {
        Self {
            phase: Phase::Constraints,
            rule_id: rule_id.into(),
            rule_name: rule_name.into(),
            rule_type: RuleType::HardConstraint,
            product_matched,
            priority: None,
            locations_before: Some(before),
            locations_after: Some(after),
            eliminated_count: Some(before.saturating_sub(after)),
            candidate_count: None,
        }
    }

    /// Entry for a preference that was tried.
    pub fn preference(
        rule_id: impl Into<String>,
        rule_name: impl Into<String>,
        priority: u32,
        product_matched: bool,
        candidate_count: usize,
    ) -> Self {
        Self {
            phase: Phase::Preferences,
            rule_id: rule_id.into(),
            rule_name: rule_name.into(),
            rule_type: RuleType::Preference,
            product_matched,
            priority: Some(priority),
            locations_before: None,
            locations_after: None,
            eliminated_count: None,
            candidate_count: Some(candidate_count),
        }
    }
}

/// A logged putaway defect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectRecord {
    pub defect_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub defect_type: DefectType,
    pub product_id: String,
    pub transaction_type: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_point: Option<FailurePoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_trace: Option<Vec<RuleTraceEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stower_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_reason: Option<OverrideReason>,
    /// Stower's note, or the reason label when none was given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_reason_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_locations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_preference: Option<String>,
}

impl DefectRecord {
    fn base(
        defect_type: DefectType,
        product_id: impl Into<String>,
        transaction_type: TransactionType,
    ) -> Self {
        Self {
            defect_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            defect_type,
            product_id: product_id.into(),
            transaction_type,
            failure_point: None,
            rule_trace: None,
            stower_id: None,
            override_reason: None,
            override_reason_text: None,
            recommended_location: None,
            actual_location: None,
            valid_locations: None,
            winning_preference: None,
        }
    }

    /// A putaway that found no location.
    pub fn zero_locations(
        product_id: impl Into<String>,
        transaction_type: TransactionType,
        failure_point: FailurePoint,
        rule_trace: Vec<RuleTraceEntry>,
    ) -> Self {
        let mut record = Self::base(DefectType::ZeroLocations, product_id, transaction_type);
        record.failure_point = Some(failure_point);
        record.rule_trace = Some(rule_trace);
        record
    }

    /// A stower override of a recommendation.
    pub fn stower_override(
        product_id: impl Into<String>,
        transaction_type: TransactionType,
        reason: OverrideReason,
        actual_location: impl Into<String>,
    ) -> Self {
        let mut record = Self::base(DefectType::StowerOverride, product_id, transaction_type);
        record.override_reason = Some(reason);
        record.override_reason_text = Some(reason.label().to_string());
        record.actual_location = Some(actual_location.into());
        record
    }

    pub fn with_valid_locations(mut self, ids: Vec<String>) -> Self {
        self.valid_locations = Some(ids);
        self
    }

    pub fn with_recommended(mut self, location_id: Option<String>) -> Self {
        self.recommended_location = location_id;
        self
    }

    pub fn with_stower(mut self, stower_id: Option<String>) -> Self {
        self.stower_id = stower_id;
        self
    }

    /// Replaces the reason text with the stower's note, if any.
    pub fn with_note(mut self, note: Option<String>) -> Self {
        if let Some(note) = note.filter(|n| !n.trim().is_empty()) {
            self.override_reason_text = Some(note);
        }
        self
    }

    pub fn with_winning_preference(mut self, preference_id: Option<String>) -> Self {
        self.winning_preference = preference_id;
        self
    }

    /// Overrides the timestamp (imports, tests).
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
