//! Result recording and bracket progression.
//!
//! This module implements:
//! - Result recording with optimistic concurrency on per-match versions
//! - Automatic re-derivation of downstream slots, byes and the grand final reset
//! - Explicit overrides with an audit trail
//! - Champion, pending-match and standings queries
//! - An async in-memory store that notifies observers of accepted results
//!
//! ## Example
//!
//! ```
//! use tourney::advancement::{ResultSubmission, record_result};
//! use tourney::bracket::{BuildOptions, Format, MatchId, build_bracket};
//! use tourney::roster::Participant;
//!
//! let roster = vec![Participant::new("a", "Alpha"), Participant::new("b", "Bravo")];
//! let mut bracket = build_bracket(Format::SingleElimination, &roster, &BuildOptions::default()).unwrap();
//!
//! record_result(&mut bracket, ResultSubmission::new(MatchId(1), "b", 0).with_scores(1, 3)).unwrap();
//! assert_eq!(bracket.champion().map(|id| id.as_str()), Some("b"));
//! ```

pub mod engine;
pub mod models;
pub mod store;

pub use engine::{override_result, record_result};
pub use models::{ResultSubmission, Standing};
pub use store::{BracketId, BracketStore, ResultObserver};
