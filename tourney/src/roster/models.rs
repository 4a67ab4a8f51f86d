//! Participant and roster data models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable participant identifier supplied by the registration layer.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A registered player or team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Unique identifier
    pub id: ParticipantId,
    /// Name shown on the bracket
    pub display_name: String,
    /// Requested seed (1 = strongest)
    #[serde(default)]
    pub seed: Option<u32>,
    /// In-game handle collected at registration
    #[serde(default)]
    pub in_game_id: Option<String>,
}

impl Participant {
    /// Create an unseeded participant
    pub fn new(id: &str, display_name: &str) -> Self {
        Self {
            id: ParticipantId::new(id),
            display_name: display_name.to_string(),
            seed: None,
            in_game_id: None,
        }
    }

    /// Attach a requested seed
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Attach an in-game handle
    pub fn with_in_game_id(mut self, in_game_id: &str) -> Self {
        self.in_game_id = Some(in_game_id.to_string());
        self
    }
}

/// How seeds are derived when the roster is frozen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingPolicy {
    /// Use the seeds carried by participants, or registration order if none are
    #[default]
    Registration,
    /// Participant ids listed strongest first
    Explicit(Vec<ParticipantId>),
    /// Reproducible shuffle driven by the given RNG seed
    Shuffled { rng_seed: u64 },
}

/// A participant with its final seed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededParticipant {
    pub seed: u32,
    pub participant: Participant,
}

/// Frozen roster ordered by seed (index 0 is seed 1)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededRoster {
    entries: Vec<SeededParticipant>,
}

impl SeededRoster {
    /// Freeze participants in the given order, assigning seeds 1..N
    pub fn from_ordered(participants: Vec<Participant>) -> Self {
        let entries = participants
            .into_iter()
            .enumerate()
            .map(|(idx, participant)| SeededParticipant {
                seed: idx as u32 + 1,
                participant,
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SeededParticipant] {
        &self.entries
    }

    /// Participant ids in seed order
    pub fn ids(&self) -> Vec<ParticipantId> {
        self.entries
            .iter()
            .map(|entry| entry.participant.id.clone())
            .collect()
    }

    /// Get the participant holding a seed (1-indexed)
    pub fn by_seed(&self, seed: u32) -> Option<&SeededParticipant> {
        if seed == 0 {
            return None;
        }
        self.entries.get(seed as usize - 1)
    }

    /// Get the seed of a participant
    pub fn seed_of(&self, id: &ParticipantId) -> Option<u32> {
        self.entries
            .iter()
            .find(|entry| &entry.participant.id == id)
            .map(|entry| entry.seed)
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.seed_of(id).is_some()
    }

    /// Display name for a participant, falling back to its id
    pub fn display_name<'a>(&'a self, id: &'a ParticipantId) -> &'a str {
        self.entries
            .iter()
            .find(|entry| &entry.participant.id == id)
            .map(|entry| entry.participant.display_name.as_str())
            .unwrap_or(id.as_str())
    }

    /// Swap the participants holding two seeds, keeping seed numbers in place
    pub(crate) fn swap_seeds(&mut self, a: u32, b: u32) {
        let (a, b) = (a as usize - 1, b as usize - 1);
        let first = self.entries[a].participant.clone();
        self.entries[a].participant = self.entries[b].participant.clone();
        self.entries[b].participant = first;
    }
}
