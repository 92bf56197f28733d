//! Putaway request and result types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defects::{FailurePoint, OverrideReason};
use crate::models::{CartContext, ExecutionTrace, Location, Preference, Product, TransactionType};

/// Input for one putaway decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutawayRequest {
    pub product: Product,
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub cart: CartContext,
}

impl PutawayRequest {
    /// A request outside any cart.
    pub fn new(product: Product, transaction_type: TransactionType) -> Self {
        Self {
            product,
            transaction_type,
            cart: CartContext::none(),
        }
    }

    pub fn with_cart(mut self, cart: CartContext) -> Self {
        self.cart = cart;
        self
    }
}

/// How a putaway ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PutawayOutcome {
    /// A location was selected.
    Assigned {
        location: Location,
        winning_preference: Preference,
        /// Selected through cart consolidation rather than ranking.
        via_cart_consolidation: bool,
    },
    /// No location could be selected.
    Failed {
        failure_point: FailurePoint,
        reason: String,
    },
}

/// Decision plus its full trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutawayResult {
    pub product_id: String,
    pub transaction_type: TransactionType,
    pub outcome: PutawayOutcome,
    /// IDs of the locations that survived the hard constraints.
    pub valid_locations: Vec<String>,
    pub trace: ExecutionTrace,
    /// ID of the defect logged for a failure, if one was stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defect_id: Option<Uuid>,
}

impl PutawayResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, PutawayOutcome::Assigned { .. })
    }

    pub fn assigned_location(&self) -> Option<&Location> {
        match &self.outcome {
            PutawayOutcome::Assigned { location, .. } => Some(location),
            PutawayOutcome::Failed { .. } => None,
        }
    }

    pub fn winning_preference(&self) -> Option<&Preference> {
        match &self.outcome {
            PutawayOutcome::Assigned {
                winning_preference, ..
            } => Some(winning_preference),
            PutawayOutcome::Failed { .. } => None,
        }
    }

    pub fn failure_point(&self) -> Option<FailurePoint> {
        match &self.outcome {
            PutawayOutcome::Failed { failure_point, .. } => Some(*failure_point),
            PutawayOutcome::Assigned { .. } => None,
        }
    }

    /// Human-readable failure reason.
    pub fn failure_reason(&self) -> Option<&str> {
        match &self.outcome {
            PutawayOutcome::Failed { reason, .. } => Some(reason),
            PutawayOutcome::Assigned { .. } => None,
        }
    }
}

/// A stower's deviation from the recommended location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StowerOverride {
    pub actual_location: String,
    pub reason: OverrideReason,
    #[serde(default)]
    pub stower_id: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl StowerOverride {
    pub fn new(actual_location: impl Into<String>, reason: OverrideReason) -> Self {
        Self {
            actual_location: actual_location.into(),
            reason,
            stower_id: None,
            note: None,
        }
    }

    pub fn by_stower(mut self, stower_id: impl Into<String>) -> Self {
        self.stower_id = Some(stower_id.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}
