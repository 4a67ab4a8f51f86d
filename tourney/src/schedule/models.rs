//! Scheduling constraints and schedule models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bracket::models::{MatchId, PairingBan};

/// Venue id used when a time grid is given without venues
pub const DEFAULT_VENUE: &str = "main";

/// A place where one match can be played per time slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    pub id: String,
    /// Slot indices at which the venue cannot host a match
    #[serde(default)]
    pub unavailable: Vec<u32>,
}

impl Venue {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            unavailable: Vec::new(),
        }
    }

    pub fn unavailable_at(mut self, slots: &[u32]) -> Self {
        self.unavailable.extend_from_slice(slots);
        self
    }

    pub fn is_available(&self, slot: u32) -> bool {
        !self.unavailable.contains(&slot)
    }
}

/// Discrete time slots available to the event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeGrid {
    /// Number of slots (slot indices are 0..slots)
    pub slots: u32,
    /// Wall-clock start of slot 0
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    /// Slot length; falls back to the scheduler config
    #[serde(default)]
    pub slot_minutes: Option<u32>,
}

impl TimeGrid {
    pub fn new(slots: u32) -> Self {
        Self {
            slots,
            start: None,
            slot_minutes: None,
        }
    }

    pub fn starting_at(mut self, start: DateTime<Utc>, slot_minutes: u32) -> Self {
        self.start = Some(start);
        self.slot_minutes = Some(slot_minutes);
        self
    }
}

/// Structured constraint set supplied with a tournament
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraints {
    /// Pairs that must not meet in round 1
    #[serde(default)]
    pub pairing_bans: Vec<PairingBan>,
    #[serde(default)]
    pub venues: Vec<Venue>,
    /// Without a grid only a sequence order is produced
    #[serde(default)]
    pub time_grid: Option<TimeGrid>,
    /// Free slots a participant needs between two of their matches
    #[serde(default)]
    pub min_rest_slots: u32,
}

impl Constraints {
    /// Venues to schedule on; one default venue when none are configured
    pub fn effective_venues(&self) -> Vec<Venue> {
        if self.venues.is_empty() {
            vec![Venue::new(DEFAULT_VENUE)]
        } else {
            self.venues.clone()
        }
    }

    pub fn venue(&self, id: &str) -> Option<Venue> {
        self.effective_venues().into_iter().find(|venue| venue.id == id)
    }
}

/// Time slot and venue given to a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub index: u32,
    pub venue: String,
    pub starts_at: Option<DateTime<Utc>>,
}

/// One entry of the schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMatch {
    /// Position in the total order (0-indexed)
    pub sequence: usize,
    pub match_id: MatchId,
    /// None for matches resolved without play, or when no grid was given
    pub slot: Option<TimeSlot>,
}

/// Total order over a bracket's matches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub entries: Vec<ScheduledMatch>,
    /// Bracket version the schedule was computed from
    pub bracket_version: u64,
}

impl Schedule {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledMatch> {
        self.entries.iter()
    }

    /// Sequence position of a match
    pub fn position_of(&self, id: MatchId) -> Option<usize> {
        self.entries
            .iter()
            .find(|entry| entry.match_id == id)
            .map(|entry| entry.sequence)
    }

    pub fn slot_of(&self, id: MatchId) -> Option<&TimeSlot> {
        self.entries
            .iter()
            .find(|entry| entry.match_id == id)
            .and_then(|entry| entry.slot.as_ref())
    }

    /// Number of distinct time slots in use
    pub fn slots_used(&self) -> usize {
        let mut used: Vec<u32> = self
            .entries
            .iter()
            .filter_map(|entry| entry.slot.as_ref().map(|slot| slot.index))
            .collect();
        used.sort_unstable();
        used.dedup();
        used.len()
    }
}
