//! Bracket data models: formats, slots, matches and the match arena.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::errors::BracketError;
use crate::roster::models::{ParticipantId, SeededRoster};

/// Tournament format, fixed when the tournament is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    SingleElimination,
    DoubleElimination,
    RoundRobin,
}

impl Format {
    /// Smallest roster the format accepts
    pub fn min_participants(&self) -> usize {
        match self {
            Format::SingleElimination | Format::DoubleElimination => 2,
            Format::RoundRobin => 3,
        }
    }

    pub fn is_elimination(&self) -> bool {
        !matches!(self, Format::RoundRobin)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::SingleElimination => write!(f, "single elimination"),
            Format::DoubleElimination => write!(f, "double elimination"),
            Format::RoundRobin => write!(f, "round robin"),
        }
    }
}

impl FromStr for Format {
    type Err = BracketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "single_elimination" | "single" | "se" | "pojedyncza_eliminacja" => {
                Ok(Format::SingleElimination)
            }
            "double_elimination" | "double" | "de" | "podwójna_eliminacja" => {
                Ok(Format::DoubleElimination)
            }
            "round_robin" | "rr" | "każdy_z_każdym" => Ok(Format::RoundRobin),
            _ => Err(BracketError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Part of the bracket a match belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Winners,
    Losers,
    GrandFinal,
    /// Round-robin group play
    Group,
}

impl Section {
    /// Tie-break rank used when ordering matches of the same round
    pub fn rank(&self) -> u8 {
        match self {
            Section::Winners | Section::Group => 0,
            Section::Losers => 1,
            Section::GrandFinal => 2,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Winners => write!(f, "Winners"),
            Section::Losers => write!(f, "Losers"),
            Section::GrandFinal => write!(f, "Grand Final"),
            Section::Group => write!(f, "Group"),
        }
    }
}

/// Match identifier, 1-based and dense in arena order
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct MatchId(pub usize);

impl MatchId {
    /// Position in the match arena
    pub fn index(self) -> Option<usize> {
        self.0.checked_sub(1)
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

/// Where a slot is filled from
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    WinnerOf(MatchId),
    LoserOf(MatchId),
}

impl Feed {
    pub fn source(&self) -> MatchId {
        match self {
            Feed::WinnerOf(id) | Feed::LoserOf(id) => *id,
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feed::WinnerOf(id) => write!(f, "winner of {id}"),
            Feed::LoserOf(id) => write!(f, "loser of {id}"),
        }
    }
}

/// Occupant of one side of a match
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Participant(ParticipantId),
    Bye,
    /// Waiting on the match named by the side's feed
    #[default]
    Tbd,
}

impl Slot {
    pub fn participant(&self) -> Option<&ParticipantId> {
        match self {
            Slot::Participant(id) => Some(id),
            _ => None,
        }
    }

    /// Whether the occupant is settled (a participant or a bye)
    pub fn is_known(&self) -> bool {
        !matches!(self, Slot::Tbd)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Participant(id) => write!(f, "{id}"),
            Slot::Bye => write!(f, "BYE"),
            Slot::Tbd => write!(f, "TBD"),
        }
    }
}

/// Outcome of a played match
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MatchResult {
    pub winner: ParticipantId,
    pub loser: ParticipantId,
    /// Scores in slot order (side A, side B)
    pub scores: Option<(u32, u32)>,
}

/// How a match was resolved
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Played(MatchResult),
    /// One side was a bye; the other advanced without play
    Bye { advanced: ParticipantId },
    /// Both sides were byes; a bye moves on
    Void,
    /// Conditional match whose condition never occurred
    NotRequired,
}

impl Resolution {
    pub fn winner(&self) -> Option<&ParticipantId> {
        match self {
            Resolution::Played(result) => Some(&result.winner),
            Resolution::Bye { advanced } => Some(advanced),
            Resolution::Void | Resolution::NotRequired => None,
        }
    }

    pub fn loser(&self) -> Option<&ParticipantId> {
        match self {
            Resolution::Played(result) => Some(&result.loser),
            _ => None,
        }
    }

    /// Resolved without anyone playing
    pub fn is_automatic(&self) -> bool {
        !matches!(self, Resolution::Played(_))
    }
}

/// Match lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Pending,
    Resolved,
}

/// A single pairing in the bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub section: Section,
    /// Round number within the section (1-indexed)
    pub round: u32,
    /// Position within the round (0-indexed, top to bottom)
    pub position: u32,
    pub slots: [Slot; 2],
    pub feeds: [Option<Feed>; 2],
    /// Exists only if its condition occurs (grand final reset)
    pub conditional: bool,
    pub resolution: Option<Resolution>,
    /// Bracket version at which this match last changed
    pub updated_at: u64,
}

impl Match {
    pub fn status(&self) -> MatchStatus {
        if self.resolution.is_some() {
            MatchStatus::Resolved
        } else {
            MatchStatus::Pending
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    /// Resolved by a bye, a void pairing, or a skipped condition
    pub fn is_automatic(&self) -> bool {
        self.resolution
            .as_ref()
            .is_some_and(Resolution::is_automatic)
    }

    /// Pending with two participants in place
    pub fn is_ready(&self) -> bool {
        !self.is_resolved() && self.participants().is_some()
    }

    /// Both occupants, if both slots hold participants
    pub fn participants(&self) -> Option<(&ParticipantId, &ParticipantId)> {
        match (&self.slots[0], &self.slots[1]) {
            (Slot::Participant(a), Slot::Participant(b)) => Some((a, b)),
            _ => None,
        }
    }

    /// Matches this one depends on
    pub fn dependencies(&self) -> impl Iterator<Item = MatchId> + '_ {
        self.feeds.iter().flatten().map(Feed::source)
    }

    pub fn involves(&self, participant: &ParticipantId) -> bool {
        self.slots.iter().any(|slot| slot.participant() == Some(participant))
    }

    pub fn winner(&self) -> Option<&ParticipantId> {
        self.resolution.as_ref().and_then(Resolution::winner)
    }

    pub fn loser(&self) -> Option<&ParticipantId> {
        self.resolution.as_ref().and_then(Resolution::loser)
    }
}

/// Ordered group of matches played together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub section: Section,
    pub number: u32,
    pub matches: Vec<MatchId>,
    /// Participant sitting out (round robin with an odd roster)
    pub bye: Option<ParticipantId>,
}

/// Two participants that must not meet in round 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingBan {
    pub a: ParticipantId,
    pub b: ParticipantId,
}

impl PairingBan {
    pub fn new(a: &str, b: &str) -> Self {
        Self {
            a: ParticipantId::new(a),
            b: ParticipantId::new(b),
        }
    }

    /// Whether the ban covers this unordered pair
    pub fn matches(&self, x: &ParticipantId, y: &ParticipantId) -> bool {
        (&self.a == x && &self.b == y) || (&self.a == y && &self.b == x)
    }
}

/// Audit entry for an explicit result correction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRecord {
    pub match_id: MatchId,
    pub previous: Option<Resolution>,
    pub replacement: Resolution,
    pub note: String,
    pub version: u64,
    pub recorded_at: DateTime<Utc>,
}

/// A generated bracket: arena of matches plus round structure
///
/// Matches are stored in topological order: every feed references a match
/// with a smaller id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    format: Format,
    roster: SeededRoster,
    /// Size of the elimination field including byes (0 for round robin)
    size: usize,
    pub(crate) matches: Vec<Match>,
    pub(crate) rounds: Vec<Round>,
    pub(crate) version: u64,
    pub(crate) audit: Vec<OverrideRecord>,
}

impl Bracket {
    pub(crate) fn new(format: Format, roster: SeededRoster, size: usize) -> Self {
        Self {
            format,
            roster,
            size,
            matches: Vec::new(),
            rounds: Vec::new(),
            version: 0,
            audit: Vec::new(),
        }
    }

    /// Append a match to the arena and return its id
    pub(crate) fn push_match(
        &mut self,
        section: Section,
        round: u32,
        position: u32,
        slots: [Slot; 2],
        feeds: [Option<Feed>; 2],
    ) -> MatchId {
        let id = MatchId(self.matches.len() + 1);
        self.matches.push(Match {
            id,
            section,
            round,
            position,
            slots,
            feeds,
            conditional: false,
            resolution: None,
            updated_at: self.version,
        });
        id
    }

    pub(crate) fn push_round(&mut self, section: Section, number: u32, matches: Vec<MatchId>) {
        self.rounds.push(Round {
            section,
            number,
            matches,
            bye: None,
        });
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn roster(&self) -> &SeededRoster {
        &self.roster
    }

    /// Elimination field size (next power of two), 0 for round robin
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn audit(&self) -> &[OverrideRecord] {
        &self.audit
    }

    pub fn get(&self, id: MatchId) -> Option<&Match> {
        id.index().and_then(|idx| self.matches.get(idx))
    }

    pub(crate) fn get_mut(&mut self, id: MatchId) -> Option<&mut Match> {
        id.index().and_then(|idx| self.matches.get_mut(idx))
    }

    /// Matches whose slots are fed by the given match
    pub fn dependents(&self, id: MatchId) -> Vec<MatchId> {
        self.matches
            .iter()
            .filter(|m| m.dependencies().any(|dep| dep == id))
            .map(|m| m.id)
            .collect()
    }

    /// Rounds of one section, in order
    pub fn rounds_in(&self, section: Section) -> impl Iterator<Item = &Round> {
        self.rounds.iter().filter(move |round| round.section == section)
    }

    pub fn matches_in(&self, section: Section) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(move |m| m.section == section)
    }

    /// Matches that need someone to actually play
    pub fn playable_matches(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(|m| !m.is_automatic())
    }

    /// Matches feeding nothing further (the final, or the grand-final pair)
    pub fn terminal_matches(&self) -> Vec<MatchId> {
        if self.format == Format::RoundRobin {
            return Vec::new();
        }
        self.matches
            .iter()
            .filter(|m| self.dependents(m.id).is_empty())
            .map(|m| m.id)
            .collect()
    }

    /// Participants placed directly into leaf slots (slots without a feed)
    pub fn leaf_participants(&self) -> Vec<&ParticipantId> {
        self.matches
            .iter()
            .flat_map(|m| {
                m.slots
                    .iter()
                    .zip(m.feeds.iter())
                    .filter(|(_, feed)| feed.is_none())
                    .filter_map(|(slot, _)| slot.participant())
            })
            .collect()
    }
}
