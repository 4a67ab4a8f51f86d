//! Round-robin builder using the circle method.

use log::{debug, warn};

use super::builder::{BuildBracket, BuildOptions};
use super::models::{Bracket, Format, PairingBan, Section, Slot};
use crate::roster::models::{ParticipantId, SeededRoster};

/// Everyone plays everyone once
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobinBuilder;

/// One round of pairings before it is written into the arena
#[derive(Debug, Clone)]
struct RoundPlan {
    pairs: Vec<(ParticipantId, ParticipantId)>,
    bye: Option<ParticipantId>,
}

impl BuildBracket for RoundRobinBuilder {
    fn format(&self) -> Format {
        Format::RoundRobin
    }

    fn construct(&self, roster: SeededRoster, options: &BuildOptions) -> Bracket {
        let mut plans = circle_rounds(&roster);
        open_without_bans(&mut plans, &options.avoid_first_round);

        let mut bracket = Bracket::new(Format::RoundRobin, roster, 0);
        for (idx, plan) in plans.into_iter().enumerate() {
            let number = idx as u32 + 1;
            let ids = plan
                .pairs
                .into_iter()
                .enumerate()
                .map(|(position, (a, b))| {
                    bracket.push_match(
                        Section::Group,
                        number,
                        position as u32,
                        [Slot::Participant(a), Slot::Participant(b)],
                        [None, None],
                    )
                })
                .collect();
            bracket.push_round(Section::Group, number, ids);
            if let Some(round) = bracket.rounds.last_mut() {
                round.bye = plan.bye;
            }
        }

        bracket
    }
}

/// Pairings for every round
///
/// The first participant stays fixed while the rest rotate one place per
/// round. An odd roster gets a phantom entry; whoever faces it sits out.
fn circle_rounds(roster: &SeededRoster) -> Vec<RoundPlan> {
    let mut circle: Vec<Option<ParticipantId>> = roster.ids().into_iter().map(Some).collect();
    if circle.len() % 2 == 1 {
        circle.push(None);
    }

    let n = circle.len();
    let mut plans = Vec::with_capacity(n - 1);
    for _ in 0..n - 1 {
        let mut pairs = Vec::with_capacity(n / 2);
        let mut bye = None;
        for i in 0..n / 2 {
            match (&circle[i], &circle[n - 1 - i]) {
                (Some(a), Some(b)) => pairs.push(by_seed(roster, a, b)),
                (Some(sitting_out), None) | (None, Some(sitting_out)) => {
                    bye = Some(sitting_out.clone());
                }
                (None, None) => {}
            }
        }
        plans.push(RoundPlan { pairs, bye });
        circle[1..].rotate_right(1);
    }

    debug!("Circle method produced {} rounds", plans.len());
    plans
}

/// Order a pair so the better seed takes side A
fn by_seed(
    roster: &SeededRoster,
    a: &ParticipantId,
    b: &ParticipantId,
) -> (ParticipantId, ParticipantId) {
    if roster.seed_of(a) <= roster.seed_of(b) {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

/// Rotate the round order so round 1 has no banned pairing
fn open_without_bans(plans: &mut [RoundPlan], bans: &[PairingBan]) {
    if bans.is_empty() {
        return;
    }
    let clean = plans.iter().position(|plan| {
        !plan
            .pairs
            .iter()
            .any(|(a, b)| bans.iter().any(|ban| ban.matches(a, b)))
    });
    match clean {
        Some(idx) => plans.rotate_left(idx),
        None => warn!("Every round pairs a banned couple; round 1 left as generated"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::builder::build_bracket;
    use crate::roster::models::Participant;
    use std::collections::HashSet;

    fn players(n: usize) -> Vec<Participant> {
        (1..=n)
            .map(|i| Participant::new(&format!("p{i}"), &format!("Player {i}")))
            .collect()
    }

    fn build(n: usize, options: &BuildOptions) -> Bracket {
        build_bracket(Format::RoundRobin, &players(n), options).unwrap()
    }

    #[test]
    fn test_three_players() {
        let bracket = build(3, &BuildOptions::default());
        assert_eq!(bracket.matches().len(), 3);
        assert_eq!(bracket.rounds().len(), 3);
        for round in bracket.rounds() {
            assert_eq!(round.matches.len(), 1);
            assert!(round.bye.is_some());
        }

        let pairs: HashSet<(String, String)> = bracket
            .matches()
            .iter()
            .map(|m| {
                let (a, b) = m.participants().unwrap();
                (a.to_string(), b.to_string())
            })
            .collect();
        let expected: HashSet<(String, String)> = [("p1", "p2"), ("p1", "p3"), ("p2", "p3")]
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();
        assert_eq!(pairs, expected);
    }

    #[test]
    fn test_even_roster_has_no_byes() {
        let bracket = build(6, &BuildOptions::default());
        assert_eq!(bracket.rounds().len(), 5);
        assert_eq!(bracket.matches().len(), 15);
        assert!(bracket.rounds().iter().all(|round| round.bye.is_none()));
        assert!(bracket.rounds().iter().all(|round| round.matches.len() == 3));
    }

    #[test]
    fn test_one_match_per_round_each() {
        for n in 3..=12 {
            let bracket = build(n, &BuildOptions::default());
            for round in bracket.rounds() {
                let mut seen = HashSet::new();
                for id in &round.matches {
                    let (a, b) = bracket.get(*id).unwrap().participants().unwrap();
                    assert!(seen.insert(a.clone()));
                    assert!(seen.insert(b.clone()));
                }
                if let Some(bye) = &round.bye {
                    assert!(!seen.contains(bye));
                }
            }
        }
    }

    #[test]
    fn test_bans_rotate_round_order() {
        let default = build(4, &BuildOptions::default());
        let first = default.get(default.rounds()[0].matches[0]).unwrap();
        let (a, b) = first.participants().unwrap();
        let ban = PairingBan {
            a: a.clone(),
            b: b.clone(),
        };

        let options = BuildOptions {
            avoid_first_round: vec![ban.clone()],
            ..Default::default()
        };
        let rotated = build(4, &options);
        assert_eq!(rotated.matches().len(), 6);
        for id in &rotated.rounds()[0].matches {
            let (x, y) = rotated.get(*id).unwrap().participants().unwrap();
            assert!(!ban.matches(x, y));
        }
    }
}
