//! Comparison of two matched trees.
//!
//! [`compare`] walks the matched pairs and records every observation as a
//! [`ComparisonEvent`]. Events are raw: order and cardinality noise is
//! included, and deciding what counts as a difference is left to the
//! [`report`](crate::report) module.

mod engine;
mod event;

pub use engine::compare;
pub use event::{ComparisonEvent, ComparisonKind, Location, Outcome, Target};
