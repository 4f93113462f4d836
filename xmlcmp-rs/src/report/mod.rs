//! Classification of comparison events and the difference report.
//!
//! [`classify`] drops everything that is not a real difference and renders
//! the rest into [`DifferenceRecord`]s; [`ComparisonResult`] folds them into
//! an ordered list.

mod classifier;
mod result;

pub use classifier::classify;
pub use result::{ComparisonResult, DifferenceCategory, DifferenceRecord};
