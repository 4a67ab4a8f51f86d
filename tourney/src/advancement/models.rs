//! Result submission and standings models.

use serde::{Deserialize, Serialize};

use crate::bracket::models::MatchId;
use crate::roster::models::ParticipantId;

/// A reported match outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSubmission {
    pub match_id: MatchId,
    pub winner: ParticipantId,
    /// Scores in slot order (side A, side B)
    #[serde(default)]
    pub scores: Option<(u32, u32)>,
    /// Bracket version the reporter was looking at
    pub expected_version: u64,
}

impl ResultSubmission {
    pub fn new(match_id: MatchId, winner: &str, expected_version: u64) -> Self {
        Self {
            match_id,
            winner: ParticipantId::new(winner),
            scores: None,
            expected_version,
        }
    }

    pub fn with_scores(mut self, a: u32, b: u32) -> Self {
        self.scores = Some((a, b));
        self
    }
}

/// One participant's line in the standings table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub participant: ParticipantId,
    pub seed: u32,
    pub played: u32,
    pub wins: u32,
    pub losses: u32,
    pub score_for: u32,
    pub score_against: u32,
}

impl Standing {
    pub fn new(participant: ParticipantId, seed: u32) -> Self {
        Self {
            participant,
            seed,
            played: 0,
            wins: 0,
            losses: 0,
            score_for: 0,
            score_against: 0,
        }
    }

    /// Score differential (for minus against)
    pub fn differential(&self) -> i64 {
        i64::from(self.score_for) - i64::from(self.score_against)
    }
}
