//! Putaway domain models.
//!
//! Provides the data types the engine reads: products, locations, rules,
//! criteria, cart context and the execution trace it writes.
//!
//! # Domain Mappings
//!
//! | u-putaway | Meaning |
//! |-----------|---------|
//! | Product | Inbound inventory to be stored |
//! | Location | Candidate bin / slot |
//! | Constraint | Hard rule: whitelist or blacklist locations |
//! | Preference | Ranked rule: scope candidates, sort, pick the top |
//! | RuleSet | Snapshot of all rules |

mod cart;
mod criterion;
mod fields;
mod location;
mod order_by;
mod product;
mod rule;
mod rule_set;
mod trace;
mod value;

pub use cart::CartContext;
pub use criterion::{Criterion, Operator};
pub use fields::{LocationField, ProductField, Record, RuleField};
pub use location::{BinStatus, ContentItem, Location};
pub use order_by::{Direction, OrderBy, SortKey, SortStrategy};
pub use product::Product;
pub use rule::{in_scope, Constraint, Preference, RuleAction, TransactionType};
pub use rule_set::{MoveDirection, RuleSet};
pub use trace::{ExecutionTrace, Phase, TraceEntry, TraceKind};
pub use value::{CriterionValue, FieldValue, Scalar};
