//! The two-phase putaway funnel.
//!
//! # Phases
//!
//! - **Phase 1** ([`apply_constraints`]): hard constraints filter the
//!   candidate locations (AND)
//! - **Phase 2** ([`rank_and_select`]): preferences are tried in priority
//!   order and the first one yielding a candidate wins (OR with fall-through)
//!
//! [`PutawayExecutor`] runs both phases, writes the execution trace and
//! logs a defect when no location is found.

mod constraints;
mod executor;
mod preferences;
mod result;

pub use constraints::{apply_constraints, ConstraintEvaluation, ConstraintPhase, NO_VALID_LOCATIONS};
pub use executor::PutawayExecutor;
pub use preferences::{
    rank_and_select, PreferenceEvaluation, PreferencePhase, Selection, NO_ACTIVE_PREFERENCES,
    PREFERENCES_EXHAUSTED,
};
pub use result::{PutawayOutcome, PutawayRequest, PutawayResult, StowerOverride};
