//! Single-elimination builder.

use super::builder::{BuildBracket, BuildOptions};
use super::models::{Bracket, Feed, Format, MatchId, Section, Slot};
use super::seeding::{bracket_size, first_round_pairs, separate_banned_pairs};
use crate::roster::models::SeededRoster;

/// Knockout bracket; byes go to the top seeds
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleEliminationBuilder;

impl BuildBracket for SingleEliminationBuilder {
    fn format(&self) -> Format {
        Format::SingleElimination
    }

    fn construct(&self, mut roster: SeededRoster, options: &BuildOptions) -> Bracket {
        separate_banned_pairs(&mut roster, &options.avoid_first_round);

        let size = bracket_size(roster.len());
        let mut bracket = Bracket::new(Format::SingleElimination, roster, size);
        push_winners_bracket(&mut bracket);
        bracket.rederive();
        bracket
    }
}

/// Lay out the winners bracket rounds and return their match ids
///
/// Round 1 places seeds by the standard order with byes for seeds beyond the
/// roster; every later match takes the winners of two adjacent matches.
pub(crate) fn push_winners_bracket(bracket: &mut Bracket) -> Vec<Vec<MatchId>> {
    let size = bracket.size();

    let mut first = Vec::with_capacity(size / 2);
    for (position, (a, b)) in first_round_pairs(size).into_iter().enumerate() {
        let slots = [leaf_slot(bracket, a), leaf_slot(bracket, b)];
        first.push(bracket.push_match(Section::Winners, 1, position as u32, slots, [None, None]));
    }
    bracket.push_round(Section::Winners, 1, first.clone());

    let mut rounds = vec![first];
    let mut number = 1;
    while rounds.last().is_some_and(|round| round.len() > 1) {
        number += 1;
        let previous = rounds.last().cloned().unwrap_or_default();
        let ids: Vec<MatchId> = previous
            .chunks(2)
            .enumerate()
            .map(|(position, pair)| {
                bracket.push_match(
                    Section::Winners,
                    number,
                    position as u32,
                    [Slot::Tbd, Slot::Tbd],
                    [Some(Feed::WinnerOf(pair[0])), Some(Feed::WinnerOf(pair[1]))],
                )
            })
            .collect();
        bracket.push_round(Section::Winners, number, ids.clone());
        rounds.push(ids);
    }

    rounds
}

/// Occupant of a round-1 line: the seeded participant, or a bye past the roster
fn leaf_slot(bracket: &Bracket, seed: u32) -> Slot {
    bracket
        .roster()
        .by_seed(seed)
        .map_or(Slot::Bye, |entry| Slot::Participant(entry.participant.id.clone()))
}
