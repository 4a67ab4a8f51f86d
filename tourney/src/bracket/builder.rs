//! Bracket builder dispatch.
//!
//! Each format has its own builder type; [`BracketBuilder`] wraps them in one
//! enum and dispatches through [`BuildBracket`] without boxing.

use enum_dispatch::enum_dispatch;
use log::info;
use serde::{Deserialize, Serialize};

use super::double_elimination::DoubleEliminationBuilder;
use super::models::{Bracket, Format, PairingBan};
use super::round_robin::RoundRobinBuilder;
use super::single_elimination::SingleEliminationBuilder;
use crate::errors::{BracketError, BracketResult};
use crate::roster::models::{Participant, SeededRoster, SeedingPolicy};
use crate::roster::normalizer::normalize;

/// Options applied while building
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Seeding policy used when freezing the roster
    #[serde(default)]
    pub seeding: SeedingPolicy,
    /// Pairs that should not meet in round 1
    #[serde(default)]
    pub avoid_first_round: Vec<PairingBan>,
}

/// Builds a bracket skeleton from a frozen roster
#[enum_dispatch]
pub trait BuildBracket {
    /// Format produced by this builder
    fn format(&self) -> Format;

    /// Build the bracket; the roster size has already been checked
    fn construct(&self, roster: SeededRoster, options: &BuildOptions) -> Bracket;
}

/// One builder per supported format
#[enum_dispatch(BuildBracket)]
#[derive(Debug, Clone, Copy)]
pub enum BracketBuilder {
    SingleElimination(SingleEliminationBuilder),
    DoubleElimination(DoubleEliminationBuilder),
    RoundRobin(RoundRobinBuilder),
}

impl From<Format> for BracketBuilder {
    fn from(format: Format) -> Self {
        match format {
            Format::SingleElimination => SingleEliminationBuilder.into(),
            Format::DoubleElimination => DoubleEliminationBuilder.into(),
            Format::RoundRobin => RoundRobinBuilder.into(),
        }
    }
}

impl BracketBuilder {
    /// Build from an already seeded roster
    ///
    /// # Errors
    ///
    /// * `RosterTooSmall` - roster below the minimum for this format
    pub fn build(&self, roster: SeededRoster, options: &BuildOptions) -> BracketResult<Bracket> {
        let format = self.format();
        let needed = format.min_participants();
        if roster.len() < needed {
            return Err(BracketError::RosterTooSmall {
                format: format.to_string(),
                needed,
                current: roster.len(),
            });
        }

        let bracket = self.construct(roster, options);
        info!(
            "Built {format} bracket: {} participants, {} matches, {} rounds",
            bracket.roster().len(),
            bracket.matches().len(),
            bracket.rounds().len()
        );
        Ok(bracket)
    }
}

/// Normalize a roster and build the bracket for a format
///
/// # Errors
///
/// * `InvalidRoster` / `InvalidSeeding` - from roster normalization
/// * `RosterTooSmall` - roster below the format minimum
///
/// # Example
///
/// ```
/// use tourney::bracket::{BuildOptions, Format, build_bracket};
/// use tourney::roster::Participant;
///
/// let roster = vec![
///     Participant::new("a", "Alpha"),
///     Participant::new("b", "Bravo"),
///     Participant::new("c", "Charlie"),
///     Participant::new("d", "Delta"),
/// ];
/// let bracket = build_bracket(Format::SingleElimination, &roster, &BuildOptions::default()).unwrap();
/// assert_eq!(bracket.matches().len(), 3);
/// ```
pub fn build_bracket(
    format: Format,
    participants: &[Participant],
    options: &BuildOptions,
) -> BracketResult<Bracket> {
    let roster = normalize(format, participants, &options.seeding)?;
    BracketBuilder::from(format).build(roster, options)
}

/// Same as [`build_bracket`] but takes the format as a text label
///
/// # Errors
///
/// * `UnsupportedFormat` - unknown label
pub fn build_bracket_from_label(
    label: &str,
    participants: &[Participant],
    options: &BuildOptions,
) -> BracketResult<Bracket> {
    build_bracket(label.parse()?, participants, options)
}
