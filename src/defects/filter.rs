//! Defect log queries.

use chrono::{DateTime, Duration, Utc};

use super::{DefectRecord, DefectType};
use crate::models::TransactionType;

/// Conjunctive filter over defect records. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefectFilter {
    pub defect_type: Option<DefectType>,
    pub product_id: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub stower_id: Option<String>,
    /// Inclusive lower bound.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound.
    pub end: Option<DateTime<Utc>>,
}

impl DefectFilter {
    /// Matches every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Records from the last `days` days before `now`.
    pub fn within_retention(days: i64, now: DateTime<Utc>) -> Self {
        Self::default().since(now - Duration::days(days))
    }

    pub fn of_type(mut self, defect_type: DefectType) -> Self {
        self.defect_type = Some(defect_type);
        self
    }

    pub fn for_product(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    pub fn for_transaction(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = Some(transaction_type);
        self
    }

    pub fn by_stower(mut self, stower_id: impl Into<String>) -> Self {
        self.stower_id = Some(stower_id.into());
        self
    }

    pub fn since(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn until(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    /// Whether a record passes every set condition.
    pub fn matches(&self, record: &DefectRecord) -> bool {
        if self.defect_type.is_some_and(|t| t != record.defect_type) {
            return false;
        }
        if self
            .product_id
            .as_deref()
            .is_some_and(|p| p != record.product_id)
        {
            return false;
        }
        if self
            .transaction_type
            .is_some_and(|t| t != record.transaction_type)
        {
            return false;
        }
        if let Some(stower) = self.stower_id.as_deref() {
            if record.stower_id.as_deref() != Some(stower) {
                return false;
            }
        }
        if self.start.is_some_and(|s| record.timestamp < s) {
            return false;
        }
        if self.end.is_some_and(|e| record.timestamp > e) {
            return false;
        }
        true
    }

    /// Records passing the filter, in input order.
    pub fn apply<'a>(&self, records: &'a [DefectRecord]) -> Vec<&'a DefectRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}
