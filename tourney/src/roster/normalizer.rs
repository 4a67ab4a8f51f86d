//! Roster normalization: dedupe, validate and seed participants.

use log::{debug, warn};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use std::collections::HashSet;

use super::models::{Participant, ParticipantId, SeededRoster, SeedingPolicy};
use crate::bracket::models::Format;
use crate::errors::{BracketError, BracketResult};

/// Freeze a raw registration list into a seeded roster
///
/// # Arguments
///
/// * `format` - Format the roster will be built for (sets the minimum size)
/// * `participants` - Participants in registration order
/// * `policy` - How seeds are derived
///
/// # Errors
///
/// * `InvalidRoster` - blank ids or names, or too few distinct participants
/// * `InvalidSeeding` - seeds that are not a permutation of 1..N
pub fn normalize(
    format: Format,
    participants: &[Participant],
    policy: &SeedingPolicy,
) -> BracketResult<SeededRoster> {
    let roster = dedupe(participants)?;

    let needed = format.min_participants();
    if roster.len() < needed {
        return Err(BracketError::InvalidRoster(format!(
            "{format} needs at least {needed} participants, got {}",
            roster.len()
        )));
    }

    let ordered = match policy {
        SeedingPolicy::Registration => order_by_requested_seed(roster)?,
        SeedingPolicy::Explicit(order) => order_explicitly(roster, order)?,
        SeedingPolicy::Shuffled { rng_seed } => {
            let mut shuffled = roster;
            let mut rng = StdRng::seed_from_u64(*rng_seed);
            shuffled.shuffle(&mut rng);
            shuffled
        }
    };

    debug!(
        "Normalized roster of {} for {format}: {:?}",
        ordered.len(),
        ordered.iter().map(|p| p.id.as_str()).collect::<Vec<_>>()
    );

    Ok(SeededRoster::from_ordered(ordered))
}

/// Trim ids and drop repeated ones, keeping the earliest registration
fn dedupe(participants: &[Participant]) -> BracketResult<Vec<Participant>> {
    let mut seen = HashSet::new();
    let mut roster = Vec::with_capacity(participants.len());

    for participant in participants {
        let id = ParticipantId::new(participant.id.as_str().trim());
        if id.as_str().is_empty() {
            return Err(BracketError::InvalidRoster(
                "participant id must not be blank".to_string(),
            ));
        }
        if participant.display_name.trim().is_empty() {
            return Err(BracketError::InvalidRoster(format!(
                "participant {} has a blank display name",
                participant.id
            )));
        }
        if !seen.insert(id.clone()) {
            warn!("Dropping duplicate registration for {id}");
            continue;
        }
        roster.push(Participant {
            id,
            ..participant.clone()
        });
    }

    Ok(roster)
}

fn order_by_requested_seed(roster: Vec<Participant>) -> BracketResult<Vec<Participant>> {
    let seeded = roster.iter().filter(|p| p.seed.is_some()).count();

    if seeded == 0 {
        return Ok(roster);
    }

    if seeded != roster.len() {
        return Err(BracketError::InvalidSeeding(format!(
            "{seeded} of {} participants carry a seed; seed all or none",
            roster.len()
        )));
    }

    let n = roster.len() as u32;
    let mut slots: Vec<Option<Participant>> = vec![None; roster.len()];
    for participant in roster {
        let seed = participant.seed.unwrap_or_default();
        if seed == 0 || seed > n {
            return Err(BracketError::InvalidSeeding(format!(
                "seed {seed} of {} is outside 1..={n}",
                participant.id
            )));
        }
        let slot = &mut slots[seed as usize - 1];
        if let Some(holder) = slot {
            return Err(BracketError::InvalidSeeding(format!(
                "seed {seed} assigned to both {} and {}",
                holder.id, participant.id
            )));
        }
        *slot = Some(participant);
    }

    // n distinct seeds in 1..=n fill every slot
    Ok(slots.into_iter().flatten().collect())
}

fn order_explicitly(
    roster: Vec<Participant>,
    order: &[ParticipantId],
) -> BracketResult<Vec<Participant>> {
    if order.len() != roster.len() {
        return Err(BracketError::InvalidSeeding(format!(
            "seeding list has {} entries for {} participants",
            order.len(),
            roster.len()
        )));
    }

    let mut remaining = roster;
    let mut ordered = Vec::with_capacity(remaining.len());
    for id in order {
        let idx = remaining
            .iter()
            .position(|p| p.id.as_str() == id.as_str().trim())
            .ok_or_else(|| {
                BracketError::InvalidSeeding(format!(
                    "{id} is listed twice or is not registered"
                ))
            })?;
        ordered.push(remaining.swap_remove(idx));
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(ids: &[&str]) -> Vec<Participant> {
        ids.iter().map(|id| Participant::new(id, &id.to_uppercase())).collect()
    }

    #[test]
    fn test_registration_order_is_default_seeding() {
        let seeded = normalize(
            Format::SingleElimination,
            &roster(&["c", "a", "b"]),
            &SeedingPolicy::Registration,
        )
        .unwrap();
        assert_eq!(
            seeded.ids(),
            vec![
                ParticipantId::new("c"),
                ParticipantId::new("a"),
                ParticipantId::new("b")
            ]
        );
    }

    #[test]
    fn test_requested_seeds_reorder() {
        let participants = vec![
            Participant::new("a", "A").with_seed(2),
            Participant::new("b", "B").with_seed(3),
            Participant::new("c", "C").with_seed(1),
        ];
        let seeded =
            normalize(Format::SingleElimination, &participants, &SeedingPolicy::Registration)
                .unwrap();
        assert_eq!(seeded.by_seed(1).unwrap().participant.id.as_str(), "c");
        assert_eq!(seeded.by_seed(3).unwrap().participant.id.as_str(), "b");
    }

    #[test]
    fn test_duplicate_seed_rejected() {
        let participants = vec![
            Participant::new("a", "A").with_seed(1),
            Participant::new("b", "B").with_seed(1),
        ];
        let err =
            normalize(Format::SingleElimination, &participants, &SeedingPolicy::Registration)
                .unwrap_err();
        assert!(matches!(err, BracketError::InvalidSeeding(_)));
    }

    #[test]
    fn test_seed_gap_rejected() {
        let participants = vec![
            Participant::new("a", "A").with_seed(1),
            Participant::new("b", "B").with_seed(3),
        ];
        let err =
            normalize(Format::SingleElimination, &participants, &SeedingPolicy::Registration)
                .unwrap_err();
        assert!(matches!(err, BracketError::InvalidSeeding(_)));
    }

    #[test]
    fn test_partial_seeds_rejected() {
        let participants = vec![
            Participant::new("a", "A").with_seed(1),
            Participant::new("b", "B"),
        ];
        let err =
            normalize(Format::SingleElimination, &participants, &SeedingPolicy::Registration)
                .unwrap_err();
        assert!(matches!(err, BracketError::InvalidSeeding(_)));
    }

    #[test]
    fn test_duplicates_dropped_before_size_check() {
        let err = normalize(
            Format::SingleElimination,
            &roster(&["a", "a"]),
            &SeedingPolicy::Registration,
        )
        .unwrap_err();
        assert!(matches!(err, BracketError::InvalidRoster(_)));

        let seeded = normalize(
            Format::SingleElimination,
            &roster(&["a", "b", "a"]),
            &SeedingPolicy::Registration,
        )
        .unwrap();
        assert_eq!(seeded.len(), 2);
    }

    #[test]
    fn test_ids_trimmed_before_dedupe() {
        let seeded = normalize(
            Format::SingleElimination,
            &roster(&["a", " a", "b\t"]),
            &SeedingPolicy::Registration,
        )
        .unwrap();
        assert_eq!(
            seeded.ids(),
            vec![ParticipantId::new("a"), ParticipantId::new("b")]
        );

        let explicit = SeedingPolicy::Explicit(vec![ParticipantId::new(" b"), ParticipantId::new("a")]);
        let seeded =
            normalize(Format::SingleElimination, &roster(&[" a ", "b"]), &explicit).unwrap();
        assert_eq!(seeded.by_seed(1).unwrap().participant.id.as_str(), "b");
        assert_eq!(seeded.by_seed(2).unwrap().participant.id.as_str(), "a");
    }

    #[test]
    fn test_round_robin_needs_three() {
        let err = normalize(
            Format::RoundRobin,
            &roster(&["a", "b"]),
            &SeedingPolicy::Registration,
        )
        .unwrap_err();
        assert!(matches!(err, BracketError::InvalidRoster(_)));
    }

    #[test]
    fn test_blank_name_rejected() {
        let participants = vec![Participant::new("a", " "), Participant::new("b", "B")];
        let err =
            normalize(Format::SingleElimination, &participants, &SeedingPolicy::Registration)
                .unwrap_err();
        assert!(matches!(err, BracketError::InvalidRoster(_)));
    }

    #[test]
    fn test_explicit_order() {
        let policy = SeedingPolicy::Explicit(vec!["b".into(), "c".into(), "a".into()]);
        let seeded =
            normalize(Format::DoubleElimination, &roster(&["a", "b", "c"]), &policy).unwrap();
        assert_eq!(seeded.by_seed(1).unwrap().participant.id.as_str(), "b");

        let bad = SeedingPolicy::Explicit(vec!["b".into(), "b".into(), "a".into()]);
        let err = normalize(Format::DoubleElimination, &roster(&["a", "b", "c"]), &bad)
            .unwrap_err();
        assert!(matches!(err, BracketError::InvalidSeeding(_)));

        let short = SeedingPolicy::Explicit(vec!["b".into()]);
        let err = normalize(Format::DoubleElimination, &roster(&["a", "b", "c"]), &short)
            .unwrap_err();
        assert!(matches!(err, BracketError::InvalidSeeding(_)));
    }

    #[test]
    fn test_shuffle_is_reproducible() {
        let participants = roster(&["a", "b", "c", "d", "e", "f", "g", "h"]);
        let policy = SeedingPolicy::Shuffled { rng_seed: 42 };
        let first = normalize(Format::SingleElimination, &participants, &policy).unwrap();
        let second = normalize(Format::SingleElimination, &participants, &policy).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 8);
    }
}
