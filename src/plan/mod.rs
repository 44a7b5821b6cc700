//! Consolidation planning.
//!
//! Turns a [`crate::duplicates::DuplicateReport`] and a
//! [`crate::cascade::CascadeOrder`] into a [`ConsolidationPlan`]: one
//! canonical file per group, the files that lose their copies, and the merged
//! last-wins declaration set.
//!
//! - [`artifact`] - the serialized plan
//! - [`overrides`] - operator-supplied canonical overrides
//! - [`planner`] - canonical choice and cascade-ordered merging

pub mod artifact;
pub mod overrides;
pub mod planner;

pub use artifact::{CanonicalSource, ConsolidationPlan, PlanItem};
pub use overrides::{OverrideMap, OverrideRule};
pub use planner::Planner;
