//! Putaway rules: hard constraints and ranked preferences.
//!
//! Constraints narrow the candidate set (all applicable constraints must
//! hold). Preferences are tried in priority order and the first one that
//! yields a candidate decides the location.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Criterion, LocationField, OrderBy, ProductField};

/// Warehouse transaction that triggered a putaway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Scope wildcard: a rule scoped to `Any` applies to every transaction.
    #[serde(rename = "Any")]
    Any,
    #[serde(rename = "Inbound PO")]
    InboundPo,
    #[serde(rename = "Replenishment")]
    Replenishment,
    #[serde(rename = "Customer Return")]
    CustomerReturn,
    #[serde(rename = "Inventory Transfer")]
    InventoryTransfer,
}

impl TransactionType {
    /// Configuration identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Any => "Any",
            TransactionType::InboundPo => "Inbound PO",
            TransactionType::Replenishment => "Replenishment",
            TransactionType::CustomerReturn => "Customer Return",
            TransactionType::InventoryTransfer => "Inventory Transfer",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a rule scope covers a transaction type.
///
/// An empty scope covers everything.
pub fn in_scope(scope: &[TransactionType], transaction_type: TransactionType) -> bool {
    scope.is_empty()
        || scope
            .iter()
            .any(|t| *t == TransactionType::Any || *t == transaction_type)
}

/// What a constraint does with the locations its criteria select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    /// Whitelist: keep only matching locations.
    LimitTo,
    /// Blacklist: remove matching locations.
    Exclude,
}

impl RuleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleAction::LimitTo => "limit_to",
            RuleAction::Exclude => "exclude",
        }
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hard constraint (Phase 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    #[serde(default)]
    pub scope: Vec<TransactionType>,
    #[serde(default)]
    pub product_criteria: Vec<Criterion<ProductField>>,
    #[serde(default)]
    pub location_criteria: Vec<Criterion<LocationField>>,
    pub action: RuleAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Constraint {
    /// Creates an enabled constraint scoped to every transaction type.
    pub fn new(id: impl Into<String>, name: impl Into<String>, action: RuleAction) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            enabled: true,
            scope: vec![TransactionType::Any],
            product_criteria: Vec::new(),
            location_criteria: Vec::new(),
            action,
            created_at: None,
            updated_at: None,
        }
    }

    /// Whitelist constraint.
    pub fn limit_to(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, RuleAction::LimitTo)
    }

    /// Blacklist constraint.
    pub fn exclude(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, RuleAction::Exclude)
    }

    pub fn with_scope(mut self, scope: impl IntoIterator<Item = TransactionType>) -> Self {
        self.scope = scope.into_iter().collect();
        self
    }

    pub fn when_product(mut self, criterion: Criterion<ProductField>) -> Self {
        self.product_criteria.push(criterion);
        self
    }

    pub fn on_location(mut self, criterion: Criterion<LocationField>) -> Self {
        self.location_criteria.push(criterion);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Enabled and scoped to the transaction type.
    pub fn is_active_for(&self, transaction_type: TransactionType) -> bool {
        self.enabled && in_scope(&self.scope, transaction_type)
    }
}

/// A ranked preference (Phase 2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preference {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    /// 1-based rank; lower is tried first.
    pub priority: u32,
    #[serde(default)]
    pub scope: Vec<TransactionType>,
    #[serde(default)]
    pub product_criteria: Vec<Criterion<ProductField>>,
    #[serde(default)]
    pub location_criteria: Vec<Criterion<LocationField>>,
    /// Prefer the cart's last put location while it has room.
    #[serde(default)]
    pub cart_consolidation: bool,
    #[serde(default)]
    pub order_by: OrderBy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Preference {
    /// Creates an enabled preference scoped to every transaction type.
    pub fn new(id: impl Into<String>, name: impl Into<String>, priority: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            enabled: true,
            priority,
            scope: vec![TransactionType::Any],
            product_criteria: Vec::new(),
            location_criteria: Vec::new(),
            cart_consolidation: false,
            order_by: OrderBy::none(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_scope(mut self, scope: impl IntoIterator<Item = TransactionType>) -> Self {
        self.scope = scope.into_iter().collect();
        self
    }

    pub fn when_product(mut self, criterion: Criterion<ProductField>) -> Self {
        self.product_criteria.push(criterion);
        self
    }

    pub fn on_location(mut self, criterion: Criterion<LocationField>) -> Self {
        self.location_criteria.push(criterion);
        self
    }

    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn with_cart_consolidation(mut self) -> Self {
        self.cart_consolidation = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Enabled and scoped to the transaction type.
    pub fn is_active_for(&self, transaction_type: TransactionType) -> bool {
        self.enabled && in_scope(&self.scope, transaction_type)
    }
}
