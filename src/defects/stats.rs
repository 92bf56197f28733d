//! Defect summary metrics.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total | Records in the window |
//! | Zero locations | Putaways that found no location, split by failure point |
//! | Overrides | Stower deviations, split by reason |
//! | Override share | Overrides / total |

use std::collections::HashMap;

use super::{DefectRecord, DefectType, FailurePoint, OverrideReason};

/// Counts over a set of defect records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefectStats {
    pub total: usize,
    pub zero_locations: usize,
    pub phase_1_failures: usize,
    pub phase_2_failures: usize,
    pub stower_overrides: usize,
    /// Overrides per reason code.
    pub overrides_by_reason: HashMap<OverrideReason, usize>,
    /// Defects per product.
    pub by_product: HashMap<String, usize>,
}

impl DefectStats {
    /// Computes counts from records.
    pub fn calculate<'a>(records: impl IntoIterator<Item = &'a DefectRecord>) -> Self {
        let mut stats = Self::default();

        for record in records {
            stats.total += 1;
            *stats.by_product.entry(record.product_id.clone()).or_insert(0) += 1;

            match record.defect_type {
                DefectType::ZeroLocations => {
                    stats.zero_locations += 1;
                    match record.failure_point {
                        Some(FailurePoint::Phase1) => stats.phase_1_failures += 1,
                        Some(FailurePoint::Phase2) => stats.phase_2_failures += 1,
                        None => {}
                    }
                }
                DefectType::StowerOverride => {
                    stats.stower_overrides += 1;
                    if let Some(reason) = record.override_reason {
                        *stats.overrides_by_reason.entry(reason).or_insert(0) += 1;
                    }
                }
            }
        }

        stats
    }

    /// Fraction of defects that are overrides (0.0..1.0).
    pub fn override_share(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.stower_overrides as f64 / self.total as f64
        }
    }

    /// Product with the most defects; ties go to the smallest ID.
    pub fn worst_product(&self) -> Option<(&str, usize)> {
        self.by_product
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(id, n)| (id.as_str(), *n))
    }
}
