//! Score types for representing solution quality
//!
//! Scores are used to compare solutions and guide the optimization process.
//! All score types are immutable and implement arithmetic operations.
//!
//! Every score carries an init score: the negated number of genuine variable
//! slots that are still unassigned. A score is only comparable on its levels
//! once both sides are fully initialized.

#[macro_use]
mod macros;
mod hard_soft;
mod simple;
mod traits;


pub use hard_soft::HardSoftScore;
pub use simple::SimpleScore;
pub use traits::Score;
