//! Constraint validation for a bracket and its schedule.

pub mod models;
pub mod validator;

pub use models::{Violation, ViolationKind};
pub use validator::validate;
