//! # Tourney
//!
//! Deterministic tournament bracket construction, scheduling and advancement.
//!
//! A frozen roster goes in; a bracket, a dependency-consistent schedule and a
//! list of constraint violations come out. Results are then recorded against
//! a versioned bracket that re-derives every downstream slot on each change.
//!
//! ## Formats
//!
//! - **Single elimination**: power-of-two field, byes for the top seeds
//! - **Double elimination**: winners and losers brackets, grand final with a
//!   conditional reset
//! - **Round robin**: circle method, one bye per round for odd rosters
//!
//! ## Core Modules
//!
//! - [`roster`]: participant normalization and seeding
//! - [`bracket`]: bracket models and per-format builders
//! - [`schedule`]: dependency order and time-slot assignment
//! - [`validation`]: constraint checks over a bracket and its schedule
//! - [`advancement`]: result recording, overrides, standings and the async store
//! - [`pipeline`]: one-call generation of a whole tournament
//!
//! ## Example
//!
//! ```
//! use tourney::{Format, Participant, SchedulerConfig, TournamentRequest, generate};
//!
//! let roster = ["a", "b", "c", "d"]
//!     .iter()
//!     .map(|id| Participant::new(id, &id.to_uppercase()))
//!     .collect();
//! let request = TournamentRequest::new("Friday Cup", Format::SingleElimination, roster);
//!
//! let generated = generate(&request, &SchedulerConfig::default()).unwrap();
//! assert_eq!(generated.bracket.matches().len(), 3);
//! assert!(generated.violations.is_empty());
//! ```

/// Result recording and bracket progression.
pub mod advancement;
pub use advancement::{BracketStore, ResultObserver, ResultSubmission, Standing, record_result};

/// Bracket models and builders.
pub mod bracket;
pub use bracket::{
    Bracket, BuildOptions, Format, Match, MatchId, PairingBan, Resolution, Section, Slot,
    build_bracket,
};

/// Engine configuration.
pub mod config;
pub use config::SchedulerConfig;

pub mod errors;
pub use errors::{BracketError, BracketResult};

pub mod fingerprint;
pub use fingerprint::fingerprint;

/// Tournament generation pipeline.
pub mod pipeline;
pub use pipeline::{GeneratedTournament, TournamentRequest, generate};

/// Participant roster handling.
pub mod roster;
pub use roster::{Participant, ParticipantId, SeedingPolicy};

/// Match ordering and time-slot assignment.
pub mod schedule;
pub use schedule::{Constraints, Schedule, TimeGrid, Venue, schedule_bracket};

/// Constraint validation.
pub mod validation;
pub use validation::{Violation, validate};
