//! Checks a bracket and its schedule against a constraint set.

use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::models::Violation;
use crate::bracket::models::{Bracket, Format, MatchId, Section};
use crate::roster::models::ParticipantId;
use crate::schedule::models::{Constraints, Schedule};

/// Report every broken constraint; an empty list means the pair is valid
///
/// All checks run to completion, nothing fails fast.
pub fn validate(bracket: &Bracket, schedule: &Schedule, constraints: &Constraints) -> Vec<Violation> {
    let mut violations = Vec::new();

    check_pairing_bans(bracket, constraints, &mut violations);
    check_placement(bracket, &mut violations);
    check_coverage(bracket, schedule, &mut violations);
    check_dependencies(bracket, schedule, &mut violations);
    check_venues(schedule, constraints, &mut violations);
    check_participant_slots(bracket, schedule, constraints.min_rest_slots, &mut violations);

    debug!(
        "Validated {} matches against {} schedule entries: {} violation(s)",
        bracket.matches().len(),
        schedule.len(),
        violations.len()
    );
    violations
}

fn push_once(violations: &mut Vec<Violation>, violation: Violation) {
    if !violations.contains(&violation) {
        violations.push(violation);
    }
}

fn check_pairing_bans(bracket: &Bracket, constraints: &Constraints, out: &mut Vec<Violation>) {
    if constraints.pairing_bans.is_empty() {
        return;
    }
    let opening = bracket
        .rounds()
        .iter()
        .filter(|round| round.number == 1 && matches!(round.section, Section::Winners | Section::Group));

    for round in opening {
        for &id in &round.matches {
            let Some((a, b)) = bracket.get(id).and_then(|m| m.participants()) else {
                continue;
            };
            if constraints.pairing_bans.iter().any(|ban| ban.matches(a, b)) {
                out.push(Violation::BannedPairing {
                    match_id: id,
                    a: a.clone(),
                    b: b.clone(),
                });
            }
        }
    }
}

/// Every roster member enters the bracket where the format says they must
///
/// Elimination: exactly one leaf slot each. Round robin: exactly once per
/// round, counting the round's bye.
fn check_placement(bracket: &Bracket, out: &mut Vec<Violation>) {
    let roster = bracket.roster();

    if bracket.format() == Format::RoundRobin {
        for round in bracket.rounds() {
            let mut seen: HashMap<&ParticipantId, usize> = HashMap::new();
            let players = round
                .matches
                .iter()
                .filter_map(|&id| bracket.get(id))
                .flat_map(|m| m.slots.iter().filter_map(|slot| slot.participant()))
                .chain(round.bye.iter());
            for participant in players {
                *seen.entry(participant).or_default() += 1;
            }
            tally_placements(roster.ids(), &seen, out);
        }
        return;
    }

    let mut seen: HashMap<&ParticipantId, usize> = HashMap::new();
    for participant in bracket.leaf_participants() {
        *seen.entry(participant).or_default() += 1;
    }
    tally_placements(roster.ids(), &seen, out);
}

fn tally_placements(
    roster: Vec<ParticipantId>,
    seen: &HashMap<&ParticipantId, usize>,
    out: &mut Vec<Violation>,
) {
    for id in &roster {
        match seen.get(id).copied().unwrap_or(0) {
            0 => push_once(out, Violation::MissingParticipant(id.clone())),
            1 => {}
            _ => push_once(out, Violation::DuplicateParticipant(id.clone())),
        }
    }
    for &id in seen.keys() {
        if !roster.contains(id) {
            push_once(out, Violation::UnknownParticipant(id.clone()));
        }
    }
}

fn check_coverage(bracket: &Bracket, schedule: &Schedule, out: &mut Vec<Violation>) {
    let mut listed = HashSet::new();
    for entry in schedule.iter() {
        if bracket.get(entry.match_id).is_none() {
            out.push(Violation::UnknownMatch(entry.match_id));
        } else if !listed.insert(entry.match_id) {
            push_once(out, Violation::DuplicateEntry(entry.match_id));
        }
    }
    for m in bracket.matches() {
        if !listed.contains(&m.id) {
            out.push(Violation::UnscheduledMatch(m.id));
        }
    }
}

/// Dependencies come first in the sequence and, when both are slotted, in
/// strictly earlier slots
fn check_dependencies(bracket: &Bracket, schedule: &Schedule, out: &mut Vec<Violation>) {
    for m in bracket.matches() {
        let Some(position) = schedule.position_of(m.id) else {
            continue;
        };
        let slot = schedule.slot_of(m.id).map(|slot| slot.index);
        for dependency in m.dependencies() {
            let Some(dep_position) = schedule.position_of(dependency) else {
                continue;
            };
            let dep_slot = schedule.slot_of(dependency).map(|slot| slot.index);
            let slotted_too_early = matches!((slot, dep_slot), (Some(s), Some(d)) if s <= d);
            if dep_position >= position || slotted_too_early {
                push_once(
                    out,
                    Violation::DependencyOrder {
                        match_id: m.id,
                        dependency,
                    },
                );
            }
        }
    }
}

fn check_venues(schedule: &Schedule, constraints: &Constraints, out: &mut Vec<Violation>) {
    let mut booked: HashMap<(u32, &str), MatchId> = HashMap::new();

    for entry in schedule.iter() {
        let Some(slot) = &entry.slot else {
            continue;
        };
        match constraints.venue(&slot.venue) {
            None => out.push(Violation::UnknownVenue {
                match_id: entry.match_id,
                venue: slot.venue.clone(),
            }),
            Some(venue) if !venue.is_available(slot.index) => {
                out.push(Violation::VenueUnavailable {
                    match_id: entry.match_id,
                    venue: slot.venue.clone(),
                    slot: slot.index,
                });
            }
            Some(_) => {}
        }

        if let Some(&first) = booked.get(&(slot.index, slot.venue.as_str())) {
            out.push(Violation::VenueDoubleBooked {
                venue: slot.venue.clone(),
                slot: slot.index,
                first,
                second: entry.match_id,
            });
        } else {
            booked.insert((slot.index, slot.venue.as_str()), entry.match_id);
        }
    }
}

/// Known participants play at most once per slot and get the required rest
fn check_participant_slots(
    bracket: &Bracket,
    schedule: &Schedule,
    min_rest: u32,
    out: &mut Vec<Violation>,
) {
    let mut timeline: BTreeMap<&ParticipantId, Vec<(u32, MatchId)>> = BTreeMap::new();
    for entry in schedule.iter() {
        let (Some(slot), Some(m)) = (&entry.slot, bracket.get(entry.match_id)) else {
            continue;
        };
        for participant in m.slots.iter().filter_map(|s| s.participant()) {
            timeline
                .entry(participant)
                .or_default()
                .push((slot.index, entry.match_id));
        }
    }

    for (participant, mut played) in timeline {
        played.sort_unstable();
        for pair in played.windows(2) {
            let (earlier, first) = pair[0];
            let (later, second) = pair[1];
            if earlier == later {
                out.push(Violation::ParticipantDoubleBooked {
                    participant: participant.clone(),
                    slot: earlier,
                    first,
                    second,
                });
            } else if later - earlier - 1 < min_rest {
                out.push(Violation::InsufficientRest {
                    participant: participant.clone(),
                    first,
                    second,
                    rest: later - earlier - 1,
                    required: min_rest,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::builder::{BuildOptions, build_bracket};
    use crate::bracket::models::PairingBan;
    use crate::config::SchedulerConfig;
    use crate::roster::models::Participant;
    use crate::schedule::models::{ScheduledMatch, TimeGrid, TimeSlot, Venue};
    use crate::schedule::scheduler::schedule_bracket;

    fn players(n: usize) -> Vec<Participant> {
        (1..=n)
            .map(|i| Participant::new(&format!("p{i}"), &format!("Player {i}")))
            .collect()
    }

    fn slotted(constraints: &Constraints, format: Format, n: usize) -> (Bracket, Schedule) {
        let bracket = build_bracket(format, &players(n), &BuildOptions::default()).unwrap();
        let schedule =
            schedule_bracket(&bracket, constraints, &SchedulerConfig::default()).unwrap();
        (bracket, schedule)
    }

    fn grid(slots: u32) -> Constraints {
        Constraints {
            venues: vec![Venue::new("a"), Venue::new("b")],
            time_grid: Some(TimeGrid::new(slots)),
            min_rest_slots: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_generated_schedules_are_valid() {
        for format in [
            Format::SingleElimination,
            Format::DoubleElimination,
            Format::RoundRobin,
        ] {
            let constraints = grid(40);
            let (bracket, schedule) = slotted(&constraints, format, 6);
            assert_eq!(validate(&bracket, &schedule, &constraints), Vec::new());
        }
    }

    #[test]
    fn test_reports_banned_round_one_pair() {
        let (bracket, schedule) = slotted(&Constraints::default(), Format::SingleElimination, 4);
        let constraints = Constraints {
            pairing_bans: vec![PairingBan::new("p1", "p4")],
            ..Default::default()
        };
        let violations = validate(&bracket, &schedule, &constraints);
        assert_eq!(
            violations,
            vec![Violation::BannedPairing {
                match_id: MatchId(1),
                a: "p1".into(),
                b: "p4".into(),
            }]
        );
    }

    #[test]
    fn test_reports_every_problem() {
        let constraints = grid(6);
        let (bracket, mut schedule) = slotted(&constraints, Format::SingleElimination, 4);

        // Move the final onto the first semifinal's slot and venue, then drop
        // the second semifinal
        let semi = schedule.slot_of(MatchId(1)).cloned().unwrap();
        let final_entry = schedule
            .entries
            .iter_mut()
            .find(|entry| entry.match_id == MatchId(3))
            .unwrap();
        final_entry.slot = Some(semi);
        final_entry.sequence = 0;
        schedule.entries.retain(|entry| entry.match_id != MatchId(2));
        schedule.entries.push(ScheduledMatch {
            sequence: 9,
            match_id: MatchId(42),
            slot: None,
        });

        let violations = validate(&bracket, &schedule, &constraints);
        assert!(violations.contains(&Violation::UnscheduledMatch(MatchId(2))));
        assert!(violations.contains(&Violation::UnknownMatch(MatchId(42))));
        assert!(violations.contains(&Violation::DependencyOrder {
            match_id: MatchId(3),
            dependency: MatchId(1),
        }));
        assert!(
            violations
                .iter()
                .any(|v| matches!(v, Violation::VenueDoubleBooked { .. }))
        );
    }

    #[test]
    fn test_reports_unavailable_and_unknown_venue() {
        let constraints = Constraints {
            venues: vec![Venue::new("a").unavailable_at(&[0])],
            time_grid: Some(TimeGrid::new(4)),
            ..Default::default()
        };
        let (bracket, _) = slotted(&constraints, Format::SingleElimination, 2);
        let schedule = Schedule {
            entries: vec![ScheduledMatch {
                sequence: 0,
                match_id: MatchId(1),
                slot: Some(TimeSlot {
                    index: 0,
                    venue: "a".to_string(),
                    starts_at: None,
                }),
            }],
            bracket_version: 0,
        };
        assert_eq!(
            validate(&bracket, &schedule, &constraints),
            vec![Violation::VenueUnavailable {
                match_id: MatchId(1),
                venue: "a".to_string(),
                slot: 0,
            }]
        );

        let elsewhere = Schedule {
            entries: vec![ScheduledMatch {
                sequence: 0,
                match_id: MatchId(1),
                slot: Some(TimeSlot {
                    index: 1,
                    venue: "annex".to_string(),
                    starts_at: None,
                }),
            }],
            bracket_version: 0,
        };
        assert_eq!(
            validate(&bracket, &elsewhere, &constraints),
            vec![Violation::UnknownVenue {
                match_id: MatchId(1),
                venue: "annex".to_string(),
            }]
        );
    }

    #[test]
    fn test_reports_rest_and_double_booking() {
        let constraints = Constraints {
            venues: vec![Venue::new("a"), Venue::new("b")],
            time_grid: Some(TimeGrid::new(10)),
            min_rest_slots: 2,
            ..Default::default()
        };
        let (bracket, _) = slotted(&constraints, Format::RoundRobin, 4);

        // Every round-1 and round-2 match packed into slots 0 and 1
        let entries = bracket
            .rounds()
            .iter()
            .flat_map(|round| round.matches.iter().copied())
            .enumerate()
            .map(|(sequence, match_id)| ScheduledMatch {
                sequence,
                match_id,
                slot: Some(TimeSlot {
                    index: sequence as u32 / 2,
                    venue: if sequence % 2 == 0 { "a" } else { "b" }.to_string(),
                    starts_at: None,
                }),
            })
            .collect();
        let schedule = Schedule {
            entries,
            bracket_version: 0,
        };

        let violations = validate(&bracket, &schedule, &constraints);
        assert!(
            violations
                .iter()
                .any(|v| matches!(v, Violation::InsufficientRest { rest: 0, required: 2, .. }))
        );
        assert!(
            !violations
                .iter()
                .any(|v| matches!(v, Violation::ParticipantDoubleBooked { .. }))
        );
    }

    #[test]
    fn test_round_robin_placement() {
        let (bracket, schedule) = slotted(&Constraints::default(), Format::RoundRobin, 5);
        assert!(validate(&bracket, &schedule, &Constraints::default()).is_empty());
    }
}
