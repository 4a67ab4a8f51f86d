//! Error types shared by every bracket component.

use thiserror::Error;

use crate::bracket::models::MatchId;
use crate::roster::models::ParticipantId;

/// Bracket errors
#[derive(Debug, Error)]
pub enum BracketError {
    /// Roster is empty, too small, or carries malformed entries
    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    /// Seeds are not a permutation of 1..N
    #[error("Invalid seeding: {0}")]
    InvalidSeeding(String),

    /// Format label not recognised
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Roster below the minimum for the builder being run
    #[error("Roster too small for {format}: need {needed}, have {current}")]
    RosterTooSmall {
        format: String,
        needed: usize,
        current: usize,
    },

    /// No feasible time-slot assignment within the search budget
    #[error("Scheduling conflict: {0}")]
    SchedulingConflict(String),

    /// Match does not exist in this bracket
    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    /// One of the match slots is still waiting on an earlier match
    #[error("Match {0} is not ready: both slots must hold participants")]
    MatchNotReady(MatchId),

    /// Result already recorded; corrections go through an explicit override
    #[error("Match {0} already has a result")]
    AlreadyResolved(MatchId),

    /// Submission was prepared against an outdated bracket version
    #[error("Concurrent modification: expected version {expected}, match changed at {changed_at} (bracket at {current})")]
    ConcurrentModification {
        expected: u64,
        changed_at: u64,
        current: u64,
    },

    /// Reported winner does not occupy either slot
    #[error("Participant {winner} is not playing in match {match_id}")]
    InvalidWinner {
        match_id: MatchId,
        winner: ParticipantId,
    },

    /// Override would invalidate a result that was already played downstream
    #[error("Cannot override match {match_id}: dependent match {dependent} was already played")]
    OverrideBlocked {
        match_id: MatchId,
        dependent: MatchId,
    },

    /// Bracket not held by the store
    #[error("Bracket not found: {0}")]
    BracketNotFound(u64),

    /// Fingerprint encoding failed
    #[error("Encoding error: {0}")]
    Encode(#[from] bincode::error::EncodeError),
}

impl BracketError {
    /// Get a message that is safe to show to end users
    ///
    /// Version numbers and encoding internals are an implementation detail of
    /// the engine, so they are replaced by a retry hint.
    pub fn client_message(&self) -> String {
        match self {
            BracketError::ConcurrentModification { .. } => {
                "The bracket changed since it was loaded, reload and try again".to_string()
            }
            BracketError::Encode(_) => "Internal error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Whether the caller may succeed by reloading the bracket and resubmitting
    pub fn is_stale(&self) -> bool {
        matches!(self, BracketError::ConcurrentModification { .. })
    }
}

/// Result type for bracket operations
pub type BracketResult<T> = Result<T, BracketError>;
