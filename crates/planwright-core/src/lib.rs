//! Planwright Core - Core types and traits for planning and scoring
//!
//! This crate provides the fundamental abstractions for Planwright:
//! - Score types carrying an init score
//! - Domain traits and handles for addressing entities and facts
//! - Descriptor types for runtime metadata, including the shadow variable graph
//! - Variable listener notification support
//! - The working-object lookup

pub mod constraint;
pub mod domain;
pub mod error;
pub mod score;

pub use constraint::ConstraintRef;
pub use domain::{
    EntityHandle, FactHandle, ObjectHandle, PlanningIdValue, PlanningSolution, VariableId,
};
pub use error::{PlanwrightError, Result};
pub use score::{HardSoftScore, Score, SimpleScore};
