//! Moves: reversible edits of the working solution.
//!
//! A move edits the working solution only through the score director's
//! mutation hooks and returns the move that undoes it.

mod change;
mod list_assign;
mod traits;


pub use change::ChangeMove;
pub use list_assign::{ListAssignMove, ListUnassignMove, ListVariableAccess};
pub use traits::Move;
