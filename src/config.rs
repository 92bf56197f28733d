//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Tunables for execution, analysis and defect reporting.
///
/// # Examples
///
/// ```
/// use u_putaway::EngineConfig;
///
/// let config = EngineConfig::default()
///     .with_capacity_threshold(90.0)
///     .with_trace_top_candidates(5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// A bin with utilization at or above this percentage has no spare
    /// capacity for cart consolidation.
    pub capacity_threshold_percent: f64,

    /// Number of top-ranked candidate IDs recorded in the sort trace entry.
    pub trace_top_candidates: usize,

    /// Number of affected product examples attached to a conflict.
    pub conflict_example_limit: usize,

    /// Look-back window for retention queries on the defect log.
    pub defect_retention_days: i64,

    /// Two sort scores closer than this compare equal.
    pub score_epsilon: f64,

    /// Whether the executor appends defect records for failures.
    pub log_defects: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capacity_threshold_percent: 95.0,
            trace_top_candidates: 3,
            conflict_example_limit: 3,
            defect_retention_days: 90,
            score_epsilon: 1e-9,
            log_defects: true,
        }
    }
}

impl EngineConfig {
    pub fn with_capacity_threshold(mut self, percent: f64) -> Self {
        self.capacity_threshold_percent = percent;
        self
    }

    pub fn with_trace_top_candidates(mut self, n: usize) -> Self {
        self.trace_top_candidates = n;
        self
    }

    pub fn with_conflict_example_limit(mut self, n: usize) -> Self {
        self.conflict_example_limit = n;
        self
    }

    pub fn with_defect_retention_days(mut self, days: i64) -> Self {
        self.defect_retention_days = days;
        self
    }

    pub fn with_score_epsilon(mut self, epsilon: f64) -> Self {
        self.score_epsilon = epsilon;
        self
    }

    pub fn with_defect_logging(mut self, enabled: bool) -> Self {
        self.log_defects = enabled;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=100.0).contains(&self.capacity_threshold_percent) {
            return Err(format!(
                "capacity_threshold_percent must be in [0, 100], got {}",
                self.capacity_threshold_percent
            ));
        }
        if self.defect_retention_days <= 0 {
            return Err("defect_retention_days must be positive".into());
        }
        if !self.score_epsilon.is_finite() || self.score_epsilon < 0.0 {
            return Err("score_epsilon must be a finite non-negative number".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.capacity_threshold_percent - 95.0).abs() < 1e-10);
        assert_eq!(config.conflict_example_limit, 3);
    }

    #[test]
    fn test_rejects_threshold_out_of_range() {
        let config = EngineConfig::default().with_capacity_threshold(120.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_positive_retention() {
        let config = EngineConfig::default().with_defect_retention_days(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "trace_top_candidates": 5 }"#).unwrap();
        assert_eq!(config.trace_top_candidates, 5);
        assert_eq!(config.defect_retention_days, 90);
        assert!(config.log_defects);
    }
}
