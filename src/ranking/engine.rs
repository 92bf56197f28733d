//! Ranking engine for preference sort pipelines.
//!
//! Chains ranking rules sequentially and breaks remaining ties with a
//! final deterministic strategy.

use std::cmp::Ordering;

use super::rules::rule_for;
use super::{RankScore, RankingContext, RankingRule};
use crate::models::{Direction, Location, OrderBy};

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreaker {
    /// Deterministic by location ID (lexicographic, default).
    #[default]
    ById,
    /// Keep the input order.
    Stable,
}

#[derive(Clone, Copy)]
struct DirectedRule {
    rule: &'static dyn RankingRule,
    direction: Direction,
}

/// A sequential rule engine for location ranking.
///
/// # Example
/// ```
/// use u_putaway::models::{Direction, SortStrategy};
/// use u_putaway::ranking::{RankingEngine, TieBreaker};
///
/// let engine = RankingEngine::new()
///     .with_rule(SortStrategy::SkuMatch, Direction::Desc)
///     .with_rule(SortStrategy::DistanceShipping, Direction::Asc)
///     .with_final_tie_breaker(TieBreaker::ById);
/// assert_eq!(engine.len(), 2);
/// ```
#[derive(Clone)]
pub struct RankingEngine {
    rules: Vec<DirectedRule>,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl RankingEngine {
    /// Creates an empty engine. With no rules every candidate ties and the
    /// final tie-breaker decides.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            tie_breaker: TieBreaker::ById,
            epsilon: 1e-9,
        }
    }

    /// Builds the engine for a preference's sort pipeline.
    pub fn from_order_by(order_by: &OrderBy) -> Self {
        order_by
            .as_slice()
            .iter()
            .fold(Self::new(), |engine, key| {
                engine.with_rule(key.strategy, key.effective_direction())
            })
    }

    /// Appends a rule for a strategy in the given direction.
    pub fn with_rule(mut self, strategy: crate::models::SortStrategy, direction: Direction) -> Self {
        self.rules.push(DirectedRule {
            rule: rule_for(strategy),
            direction,
        });
        self
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Sets the tolerance under which two scores count as tied.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Number of chained rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Sorts locations by preference (most preferred first).
    ///
    /// Returns indices into the original slice.
    pub fn sort_indices(&self, locations: &[&Location], context: &RankingContext<'_>) -> Vec<usize> {
        if locations.is_empty() {
            return Vec::new();
        }

        // Scores are computed once per location, not once per comparison.
        let scores: Vec<Vec<RankScore>> = locations
            .iter()
            .map(|loc| self.evaluate(loc, context))
            .collect();

        let mut indices: Vec<usize> = (0..locations.len()).collect();
        indices.sort_by(|&a, &b| {
            self.compare_sequential(&scores[a], &scores[b])
                .then_with(|| self.break_tie(locations[a], locations[b]))
        });
        indices
    }

    /// Returns the locations in preference order.
    pub fn sort<'a>(
        &self,
        locations: &[&'a Location],
        context: &RankingContext<'_>,
    ) -> Vec<&'a Location> {
        self.sort_indices(locations, context)
            .into_iter()
            .map(|i| locations[i])
            .collect()
    }

    /// Returns the index of the most preferred location.
    pub fn select_best(&self, locations: &[&Location], context: &RankingContext<'_>) -> Option<usize> {
        self.sort_indices(locations, context).first().copied()
    }

    /// Evaluates a single location and returns the directed score of each rule.
    pub fn evaluate(&self, location: &Location, context: &RankingContext<'_>) -> Vec<RankScore> {
        self.rules
            .iter()
            .map(|dr| dr.rule.evaluate_directed(location, context, dr.direction))
            .collect()
    }

    // Scores are snapped to epsilon-wide buckets so that "equal within
    // epsilon" stays transitive and the sort sees a total order.
    fn compare_sequential(&self, a: &[RankScore], b: &[RankScore]) -> Ordering {
        for (score_a, score_b) in a.iter().zip(b) {
            let ord = self.bucket(*score_a).total_cmp(&self.bucket(*score_b));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    fn bucket(&self, score: RankScore) -> f64 {
        if self.epsilon > 0.0 {
            // +0.0 folds -0.0 into the zero bucket
            (score / self.epsilon).round() + 0.0
        } else {
            score + 0.0
        }
    }

    fn break_tie(&self, a: &Location, b: &Location) -> Ordering {
        match self.tie_breaker {
            TieBreaker::ById => a.id.cmp(&b.id),
            TieBreaker::Stable => Ordering::Equal,
        }
    }
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RankingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingEngine")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| format!("{}({:?})", r.rule.strategy(), r.direction))
                    .collect::<Vec<_>>(),
            )
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentItem, Product, SortKey, SortStrategy};

    fn ids<'a>(locations: &[&'a Location], indices: &[usize]) -> Vec<&'a str> {
        indices.iter().map(|&i| locations[i].id.as_str()).collect()
    }

    #[test]
    fn test_distance_ordering() {
        let locs = [
            Location::new("far", "Z").with_distance(90.0),
            Location::new("near", "Z").with_distance(10.0),
            Location::new("mid", "Z").with_distance(40.0),
        ];
        let refs: Vec<&Location> = locs.iter().collect();
        let product = Product::new("S", "M");
        let ctx = RankingContext::new(&product);
        let engine = RankingEngine::from_order_by(&OrderBy::keys([SortStrategy::DistanceShipping]));

        let indices = engine.sort_indices(&refs, &ctx);
        assert_eq!(ids(&refs, &indices), vec!["near", "mid", "far"]);
    }

    #[test]
    fn test_sequential_with_tie_breaker() {
        let locs = [
            Location::new("A", "Z")
                .with_distance(50.0)
                .with_content(ContentItem::new("Nike", "SKU-1", 1)),
            Location::new("B", "Z")
                .with_distance(10.0)
                .with_content(ContentItem::new("Nike", "SKU-1", 1)),
            Location::new("C", "Z").with_distance(5.0),
        ];
        let refs: Vec<&Location> = locs.iter().collect();
        let product = Product::new("SKU-1", "Nike");
        let ctx = RankingContext::new(&product);
        let engine = RankingEngine::from_order_by(&OrderBy::keys([
            SortStrategy::SkuMatch,
            SortStrategy::DistanceShipping,
        ]));

        // SKU match ties A and B, distance breaks it; C loses on SKU.
        let indices = engine.sort_indices(&refs, &ctx);
        assert_eq!(ids(&refs, &indices), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_explicit_direction() {
        let locs = [
            Location::new("near", "Z").with_distance(10.0),
            Location::new("far", "Z").with_distance(90.0),
        ];
        let refs: Vec<&Location> = locs.iter().collect();
        let product = Product::new("S", "M");
        let ctx = RankingContext::new(&product);
        let order = OrderBy::keys([SortKey::with_direction(
            SortStrategy::DistanceShipping,
            Direction::Desc,
        )]);
        let engine = RankingEngine::from_order_by(&order);
        assert_eq!(engine.select_best(&refs, &ctx), Some(1));
    }

    #[test]
    fn test_by_id_tie_breaker() {
        let locs = [
            Location::new("BIN-002", "Z").with_distance(10.0),
            Location::new("BIN-001", "Z").with_distance(10.0),
        ];
        let refs: Vec<&Location> = locs.iter().collect();
        let product = Product::new("S", "M");
        let ctx = RankingContext::new(&product);
        let engine = RankingEngine::from_order_by(&OrderBy::keys([SortStrategy::DistanceShipping]));
        assert_eq!(engine.select_best(&refs, &ctx), Some(1));

        let stable = engine.with_final_tie_breaker(TieBreaker::Stable);
        assert_eq!(stable.select_best(&refs, &ctx), Some(0));
    }

    #[test]
    fn test_no_keys_orders_by_id() {
        let locs = [Location::new("C", "Z"), Location::new("A", "Z"), Location::new("B", "Z")];
        let refs: Vec<&Location> = locs.iter().collect();
        let product = Product::new("S", "M");
        let ctx = RankingContext::new(&product);
        let engine = RankingEngine::from_order_by(&OrderBy::none());
        assert!(engine.is_empty());
        let sorted: Vec<&str> = engine.sort(&refs, &ctx).iter().map(|l| l.id.as_str()).collect();
        assert_eq!(sorted, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_epsilon_ties() {
        let locs = [
            Location::new("B", "Z").with_utilization(50.0),
            Location::new("A", "Z").with_utilization(50.0 + 1e-12),
        ];
        let refs: Vec<&Location> = locs.iter().collect();
        let product = Product::new("S", "M");
        let ctx = RankingContext::new(&product);
        let engine = RankingEngine::from_order_by(&OrderBy::keys([SortStrategy::BinUtilizationDesc]));
        assert_eq!(engine.select_best(&refs, &ctx), Some(1));
    }

    #[test]
    fn test_near_equal_chain_is_deterministic() {
        // Neighbours sit within epsilon of each other, the ends do not.
        let locs = [
            Location::new("C", "Z").with_utilization(50.0 + 8e-10),
            Location::new("A", "Z").with_utilization(50.0),
            Location::new("D", "Z").with_utilization(50.0 + 1.2e-9),
            Location::new("B", "Z").with_utilization(50.0 + 4e-10),
        ];
        let product = Product::new("S", "M");
        let ctx = RankingContext::new(&product);
        let engine = RankingEngine::from_order_by(&OrderBy::keys([SortStrategy::BinUtilizationDesc]));

        let forward: Vec<&Location> = locs.iter().collect();
        let reversed: Vec<&Location> = locs.iter().rev().collect();
        let a: Vec<&str> = engine.sort(&forward, &ctx).iter().map(|l| l.id.as_str()).collect();
        let b: Vec<&str> = engine.sort(&reversed, &ctx).iter().map(|l| l.id.as_str()).collect();
        assert_eq!(a, b);

        // Each comparison agrees with the final order.
        let scores: Vec<Vec<RankScore>> = a
            .iter()
            .map(|id| {
                let loc = locs.iter().find(|l| l.id == *id).unwrap();
                engine.evaluate(loc, &ctx)
            })
            .collect();
        for i in 0..scores.len() {
            for j in i + 1..scores.len() {
                assert_ne!(engine.compare_sequential(&scores[i], &scores[j]), Ordering::Greater);
            }
        }
    }

    #[test]
    fn test_negative_zero_ties_zero() {
        let engine = RankingEngine::new();
        assert_eq!(engine.compare_sequential(&[-0.0], &[0.0]), Ordering::Equal);
        assert_eq!(engine.compare_sequential(&[-1e-12], &[1e-12]), Ordering::Equal);
        assert_eq!(engine.compare_sequential(&[1.0], &[2.0]), Ordering::Less);
    }

    #[test]
    fn test_empty_locations() {
        let product = Product::new("S", "M");
        let ctx = RankingContext::new(&product);
        let engine = RankingEngine::from_order_by(&OrderBy::keys([SortStrategy::SkuMatch]));
        assert!(engine.sort_indices(&[], &ctx).is_empty());
        assert!(engine.select_best(&[], &ctx).is_none());
    }

    #[test]
    fn test_evaluate_scores() {
        let loc = Location::new("L", "Z").with_distance(30.0).with_utilization(40.0);
        let product = Product::new("S", "M");
        let ctx = RankingContext::new(&product);
        let engine = RankingEngine::new()
            .with_rule(SortStrategy::DistanceShipping, Direction::Asc)
            .with_rule(SortStrategy::BinUtilizationDesc, Direction::Desc);

        let scores = engine.evaluate(&loc, &ctx);
        assert_eq!(scores.len(), 2);
        assert!((scores[0] - 30.0).abs() < 1e-10);
        assert!((scores[1] + 40.0).abs() < 1e-10);
    }
}
