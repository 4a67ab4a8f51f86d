//! Double-elimination builder.
//!
//! The winners bracket is the single-elimination layout. Losers of winners
//! round 1 meet each other in losers round 1; losers of every later winners
//! round drop into their own losers round against the survivors so far, and
//! a consolidation round halves the field between drops. Neighbouring drops
//! trade places, so the loser of a winners match enters the losers pool built
//! from the sibling subtree and never faces an earlier opponent in the round
//! they drop into. Later rematches are only possible once pools merge.

use super::builder::{BuildBracket, BuildOptions};
use super::models::{Bracket, Feed, Format, MatchId, Section, Slot};
use super::seeding::{bracket_size, separate_banned_pairs};
use super::single_elimination::push_winners_bracket;
use crate::roster::models::SeededRoster;

/// Winners and losers brackets joined by a grand final with a conditional reset
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleEliminationBuilder;

impl BuildBracket for DoubleEliminationBuilder {
    fn format(&self) -> Format {
        Format::DoubleElimination
    }

    fn construct(&self, mut roster: SeededRoster, options: &BuildOptions) -> Bracket {
        separate_banned_pairs(&mut roster, &options.avoid_first_round);

        let size = bracket_size(roster.len());
        let mut bracket = Bracket::new(Format::DoubleElimination, roster, size);
        let winners = push_winners_bracket(&mut bracket);
        let winners_final = winners
            .last()
            .and_then(|round| round.first())
            .copied()
            .unwrap_or(MatchId(1));

        let losers_champion = push_losers_bracket(&mut bracket, &winners)
            .map_or(Feed::LoserOf(winners_final), Feed::WinnerOf);

        let grand_final = bracket.push_match(
            Section::GrandFinal,
            1,
            0,
            [Slot::Tbd, Slot::Tbd],
            [Some(Feed::WinnerOf(winners_final)), Some(losers_champion)],
        );
        bracket.push_round(Section::GrandFinal, 1, vec![grand_final]);

        let reset = bracket.push_match(
            Section::GrandFinal,
            2,
            0,
            [Slot::Tbd, Slot::Tbd],
            [
                Some(Feed::WinnerOf(grand_final)),
                Some(Feed::LoserOf(grand_final)),
            ],
        );
        if let Some(entry) = bracket.get_mut(reset) {
            entry.conditional = true;
        }
        bracket.push_round(Section::GrandFinal, 2, vec![reset]);

        bracket.rederive();
        bracket
    }
}

/// Lay out the losers bracket; returns its final match, if the field has one
fn push_losers_bracket(bracket: &mut Bracket, winners: &[Vec<MatchId>]) -> Option<MatchId> {
    let first_losers = winners.first().filter(|round| round.len() > 1)?;

    let mut number = 1;
    let mut survivors = push_losers_round(
        bracket,
        number,
        first_losers
            .chunks(2)
            .map(|pair| [Feed::LoserOf(pair[0]), Feed::LoserOf(pair[1])])
            .collect(),
    );

    for dropping in winners.iter().skip(1) {
        let drops = crossed(dropping);

        number += 1;
        survivors = push_losers_round(
            bracket,
            number,
            survivors
                .iter()
                .zip(drops)
                .map(|(&survivor, drop)| [Feed::WinnerOf(survivor), Feed::LoserOf(drop)])
                .collect(),
        );

        if survivors.len() > 1 {
            number += 1;
            survivors = push_losers_round(
                bracket,
                number,
                survivors
                    .chunks(2)
                    .map(|pair| [Feed::WinnerOf(pair[0]), Feed::WinnerOf(pair[1])])
                    .collect(),
            );
        }
    }

    survivors.first().copied()
}

/// Swap each pair of neighbouring drops; a lone drop stays put
fn crossed(dropping: &[MatchId]) -> Vec<MatchId> {
    dropping
        .chunks(2)
        .flat_map(|pair| pair.iter().rev().copied())
        .collect()
}

fn push_losers_round(bracket: &mut Bracket, number: u32, feeds: Vec<[Feed; 2]>) -> Vec<MatchId> {
    let ids: Vec<MatchId> = feeds
        .into_iter()
        .enumerate()
        .map(|(position, [a, b])| {
            bracket.push_match(
                Section::Losers,
                number,
                position as u32,
                [Slot::Tbd, Slot::Tbd],
                [Some(a), Some(b)],
            )
        })
        .collect();
    bracket.push_round(Section::Losers, number, ids.clone());
    ids
}
