//! Location ranking for preferences.
//!
//! Each [`SortStrategy`](crate::models::SortStrategy) maps to a
//! [`RankingRule`] that scores a candidate location, and a
//! [`RankingEngine`] chains rules sequentially: a later rule is consulted
//! only when every earlier rule ties. Locations still tied after the last
//! rule are ordered by ascending ID.
//!
//! # Usage
//!
//! ```
//! use u_putaway::models::{Location, OrderBy, Product, SortStrategy};
//! use u_putaway::ranking::{RankingEngine, RankingContext};
//!
//! let locations = vec![
//!     Location::new("BIN-002", "Z").with_distance(30.0),
//!     Location::new("BIN-001", "Z").with_distance(10.0),
//! ];
//! let product = Product::new("SKU-1", "Nike");
//! let engine = RankingEngine::from_order_by(&OrderBy::keys([SortStrategy::DistanceShipping]));
//! let context = RankingContext::new(&product);
//! let refs: Vec<&Location> = locations.iter().collect();
//! assert_eq!(engine.select_best(&refs, &context), Some(1));
//! ```

mod context;
mod engine;
pub mod rules;

pub use context::RankingContext;
pub use engine::{RankingEngine, TieBreaker};

use crate::models::{Direction, Location, SortStrategy};
use std::fmt::Debug;

/// Score returned by a ranking rule.
///
/// Lower scores = preferred (selected first).
pub type RankScore = f64;

/// A rule that scores a candidate location.
///
/// # Score Convention
/// **Lower score = preferred.** A rule whose natural direction is
/// descending (e.g. "same SKU first") returns negated values.
pub trait RankingRule: Send + Sync + Debug {
    /// Strategy this rule implements.
    fn strategy(&self) -> SortStrategy;

    /// Scores a location in the rule's natural direction.
    fn evaluate(&self, location: &Location, context: &RankingContext<'_>) -> RankScore;

    /// Scores a location in the requested direction.
    fn evaluate_directed(
        &self,
        location: &Location,
        context: &RankingContext<'_>,
        direction: Direction,
    ) -> RankScore {
        let score = self.evaluate(location, context);
        if direction == self.strategy().natural_direction() {
            score
        } else {
            -score
        }
    }
}
