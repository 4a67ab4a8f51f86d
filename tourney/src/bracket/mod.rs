//! Bracket construction for single elimination, double elimination and
//! round robin.
//!
//! A bracket is an arena of [`Match`] records addressed by [`MatchId`]. Slots
//! that depend on earlier results carry a [`Feed`] edge (winner or loser of
//! another match), so double elimination's cross links form a DAG rather
//! than a tree. Arena order is always a valid topological order.
//!
//! ## Example
//!
//! ```
//! use tourney::bracket::{BuildOptions, Format, Section, build_bracket};
//! use tourney::roster::Participant;
//!
//! let roster: Vec<_> = ["a", "b", "c", "d"]
//!     .iter()
//!     .map(|id| Participant::new(id, &id.to_uppercase()))
//!     .collect();
//!
//! let bracket = build_bracket(Format::DoubleElimination, &roster, &BuildOptions::default()).unwrap();
//! assert_eq!(bracket.matches_in(Section::Losers).count(), 2);
//! ```

pub mod builder;
pub mod double_elimination;
pub mod models;
mod propagation;
pub mod round_robin;
pub mod seeding;
pub mod single_elimination;

pub use builder::{
    BracketBuilder, BuildBracket, BuildOptions, build_bracket, build_bracket_from_label,
};
pub use models::{
    Bracket, Feed, Format, Match, MatchId, MatchResult, MatchStatus, OverrideRecord, PairingBan,
    Resolution, Round, Section, Slot,
};
