//! Warehouse putaway rule engine.
//!
//! Decides where incoming inventory is stored by running an ordered set of
//! business rules against a product and a universe of candidate locations,
//! and statically checks whether the configured rules can ever succeed.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Product`, `Location`, `Criterion`,
//!   `Constraint`, `Preference`, `RuleSet`, `OrderBy`, `ExecutionTrace`
//! - **`criteria`**: Conjunctive field/operator/value matching
//! - **`putaway`**: The two-phase funnel (hard constraints, then ranked
//!   preferences) and its executor
//! - **`ranking`**: Sort strategies and sequential tie-breaking
//! - **`conflicts`**: Self and inter-rule conflict analysis
//! - **`defects`**: Failure and stower-override records, filters, CSV export
//! - **`repository`**: Load/save of rule set snapshots
//! - **`validation`**: Rule authoring checks (duplicate IDs, operators, priorities)
//!
//! # Quick Start
//!
//! ```
//! use u_putaway::models::{
//!     Constraint, Criterion, Location, LocationField, OrderBy, Preference, Product,
//!     ProductField, RuleSet, SortStrategy, TransactionType,
//! };
//! use u_putaway::{PutawayExecutor, PutawayRequest};
//!
//! let rules = RuleSet::new()
//!     .with_constraint(
//!         Constraint::limit_to("c1", "Heavy Item Safety")
//!             .when_product(Criterion::gt(ProductField::Weight, 20.0))
//!             .on_location(Criterion::le(LocationField::LocationLevel, 2.0)),
//!     )
//!     .with_preference(
//!         Preference::new("p1", "Closest To Shipping", 1)
//!             .with_order_by(OrderBy::keys([SortStrategy::DistanceShipping])),
//!     );
//!
//! let locations = vec![
//!     Location::new("BIN-001", "Zone_A").with_level(4).with_distance(5.0),
//!     Location::new("BIN-002", "Zone_A").with_level(1).with_distance(20.0),
//!     Location::new("BIN-003", "Zone_A").with_level(2).with_distance(12.0),
//! ];
//! let product = Product::new("SKU-1", "Pact").with_weight(50.0).with_abc_code("C");
//! let request = PutawayRequest::new(product, TransactionType::InboundPo);
//!
//! let result = PutawayExecutor::new().execute(&request, &locations, &rules);
//! assert_eq!(result.assigned_location().map(|l| l.id.as_str()), Some("BIN-003"));
//! ```
//!
//! # Error Model
//!
//! A putaway that finds no location is a normal result carrying a failure
//! point and a full trace, never an `Err`. [`Error`] covers I/O, rule-set
//! editing and defect sink failures only.

pub mod config;
pub mod conflicts;
pub mod criteria;
pub mod defects;
pub mod error;
pub mod models;
pub mod putaway;
pub mod ranking;
pub mod repository;
pub mod validation;

pub use config::EngineConfig;
pub use conflicts::{ConflictAnalyzer, ConflictReport};
pub use defects::{DefectRecord, DefectSink, InMemoryDefectLog};
pub use error::{Error, Result};
pub use putaway::{PutawayExecutor, PutawayOutcome, PutawayRequest, PutawayResult, StowerOverride};
pub use repository::{InMemoryRuleSetRepository, JsonFileRuleSetRepository, RuleSetRepository};
