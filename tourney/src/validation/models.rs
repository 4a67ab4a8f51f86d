//! Constraint violation models.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bracket::models::MatchId;
use crate::roster::models::ParticipantId;

/// Kind of violation, used for grouping in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Pairing,
    Venue,
    Participant,
    Ordering,
    Coverage,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::Pairing => write!(f, "pairing"),
            ViolationKind::Venue => write!(f, "venue"),
            ViolationKind::Participant => write!(f, "participant"),
            ViolationKind::Ordering => write!(f, "ordering"),
            ViolationKind::Coverage => write!(f, "coverage"),
        }
    }
}

/// A single broken constraint found in a bracket and its schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "detail")]
pub enum Violation {
    /// Banned pair meets in round 1
    BannedPairing {
        match_id: MatchId,
        a: ParticipantId,
        b: ParticipantId,
    },

    /// Match placed on a venue during one of its blocked slots
    VenueUnavailable {
        match_id: MatchId,
        venue: String,
        slot: u32,
    },

    /// Two matches share a (slot, venue)
    VenueDoubleBooked {
        venue: String,
        slot: u32,
        first: MatchId,
        second: MatchId,
    },

    /// Schedule names a venue the constraints do not define
    UnknownVenue { match_id: MatchId, venue: String },

    /// Participant plays two matches in the same slot
    ParticipantDoubleBooked {
        participant: ParticipantId,
        slot: u32,
        first: MatchId,
        second: MatchId,
    },

    /// Fewer free slots than required between two of a participant's matches
    InsufficientRest {
        participant: ParticipantId,
        first: MatchId,
        second: MatchId,
        rest: u32,
        required: u32,
    },

    /// Match ordered (or slotted) no later than a match it depends on
    DependencyOrder {
        match_id: MatchId,
        dependency: MatchId,
    },

    /// Bracket match absent from the schedule
    UnscheduledMatch(MatchId),

    /// Schedule entry naming a match the bracket does not have
    UnknownMatch(MatchId),

    /// Match listed more than once in the schedule
    DuplicateEntry(MatchId),

    /// Roster member never placed where they should be
    MissingParticipant(ParticipantId),

    /// Roster member placed more than once where they should appear once
    DuplicateParticipant(ParticipantId),

    /// Participant in the bracket who is not on the roster
    UnknownParticipant(ParticipantId),
}

impl Violation {
    pub fn kind(&self) -> ViolationKind {
        match self {
            Violation::BannedPairing { .. } => ViolationKind::Pairing,
            Violation::VenueUnavailable { .. }
            | Violation::VenueDoubleBooked { .. }
            | Violation::UnknownVenue { .. } => ViolationKind::Venue,
            Violation::ParticipantDoubleBooked { .. } | Violation::InsufficientRest { .. } => {
                ViolationKind::Participant
            }
            Violation::DependencyOrder { .. } => ViolationKind::Ordering,
            Violation::UnscheduledMatch(_)
            | Violation::UnknownMatch(_)
            | Violation::DuplicateEntry(_)
            | Violation::MissingParticipant(_)
            | Violation::DuplicateParticipant(_)
            | Violation::UnknownParticipant(_) => ViolationKind::Coverage,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::BannedPairing { match_id, a, b } => {
                write!(f, "{match_id}: {a} and {b} must not meet in round 1")
            }
            Violation::VenueUnavailable {
                match_id,
                venue,
                slot,
            } => write!(f, "{match_id}: venue {venue} is unavailable in slot {slot}"),
            Violation::VenueDoubleBooked {
                venue,
                slot,
                first,
                second,
            } => write!(f, "venue {venue} hosts {first} and {second} in slot {slot}"),
            Violation::UnknownVenue { match_id, venue } => {
                write!(f, "{match_id}: unknown venue {venue}")
            }
            Violation::ParticipantDoubleBooked {
                participant,
                slot,
                first,
                second,
            } => write!(f, "{participant} plays {first} and {second} in slot {slot}"),
            Violation::InsufficientRest {
                participant,
                first,
                second,
                rest,
                required,
            } => write!(
                f,
                "{participant} rests {rest} slot(s) between {first} and {second}, needs {required}"
            ),
            Violation::DependencyOrder {
                match_id,
                dependency,
            } => write!(f, "{match_id} is scheduled before {dependency}, which feeds it"),
            Violation::UnscheduledMatch(id) => write!(f, "{id} is missing from the schedule"),
            Violation::UnknownMatch(id) => write!(f, "schedule lists unknown match {id}"),
            Violation::DuplicateEntry(id) => write!(f, "{id} is scheduled more than once"),
            Violation::MissingParticipant(id) => write!(f, "{id} is not placed in the bracket"),
            Violation::DuplicateParticipant(id) => write!(f, "{id} is placed more than once"),
            Violation::UnknownParticipant(id) => write!(f, "{id} is not on the roster"),
        }
    }
}
