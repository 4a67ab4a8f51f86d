//! Match ordering and time-slot assignment.
//!
//! Every schedule is a total order over a bracket's matches that respects
//! feed dependencies. When [`Constraints`] carry a [`TimeGrid`], matches that
//! need to be played are also given a (slot, venue) pair.
//!
//! ## Example
//!
//! ```
//! use tourney::bracket::{BuildOptions, Format, build_bracket};
//! use tourney::config::SchedulerConfig;
//! use tourney::roster::Participant;
//! use tourney::schedule::{Constraints, TimeGrid, schedule_bracket};
//!
//! let roster: Vec<_> = (1..=4)
//!     .map(|i| Participant::new(&format!("p{i}"), &format!("Player {i}")))
//!     .collect();
//! let bracket = build_bracket(Format::SingleElimination, &roster, &BuildOptions::default()).unwrap();
//!
//! let constraints = Constraints {
//!     time_grid: Some(TimeGrid::new(3)),
//!     ..Default::default()
//! };
//! let schedule = schedule_bracket(&bracket, &constraints, &SchedulerConfig::default()).unwrap();
//! assert_eq!(schedule.slots_used(), 3);
//! ```

pub mod models;
pub mod scheduler;

pub use models::{Constraints, DEFAULT_VENUE, Schedule, ScheduledMatch, TimeGrid, TimeSlot, Venue};
pub use scheduler::{schedule_bracket, topological_order};
