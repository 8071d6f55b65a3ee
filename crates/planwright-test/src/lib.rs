//! Shared test fixtures for Planwright crates.
//!
//! This crate provides data types, descriptors and pure functions for testing.
//! It does NOT depend on `planwright-scoring` to avoid circular dependencies;
//! score calculators are assembled from the pure functions by the tests.
//!
//! - [`nqueens`] - N-Queens problem with a single basic variable
//! - [`schedule`] - Task scheduling with a dependent shadow variable chain
//! - [`routing`] - Vehicle routing with a list variable and an inverse shadow
//! - [`init_test_logging`] - tracing output for tests
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! planwright-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```ignore
//! use planwright_test::nqueens::{calculate_conflicts, nqueens_descriptor, NQueensSolution};
//! use planwright_test::schedule::{schedule_descriptor, Schedule};
//! ```

pub mod nqueens;
pub mod routing;
pub mod schedule;

mod logging;

pub use logging::init_test_logging;

// Re-export commonly used types at crate root for convenience
pub use nqueens::{NQueensSolution, Queen};
pub use routing::{Customer, Routing, Vehicle};
pub use schedule::{Room, Schedule, Task};
