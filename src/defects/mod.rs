//! Defect log: failed putaways and stower overrides.
//!
//! The executor writes a [`DefectRecord`] whenever a putaway ends without a
//! location, and [`record_override`](crate::putaway::PutawayExecutor::record_override)
//! writes one when a stower deviates from a recommendation. Records go to a
//! [`DefectSink`]; the log is append-only.
//!
//! # Components
//!
//! - [`DefectSink`]: storage seam, with [`InMemoryDefectLog`] and [`NullDefectSink`]
//! - [`DefectFilter`]: field and date-range queries, retention window
//! - [`DefectStats`]: summary counts
//! - [`csv`]: export

pub mod csv;
mod filter;
mod record;
mod sink;
mod stats;

pub use filter::DefectFilter;
pub use record::{DefectRecord, DefectType, FailurePoint, OverrideReason, RuleTraceEntry, RuleType};
pub use sink::{DefectSink, InMemoryDefectLog, NullDefectSink};
pub use stats::DefectStats;
