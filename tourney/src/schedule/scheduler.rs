//! Match scheduler: dependency order plus bounded time-slot assignment.

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info, warn};
use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap, HashSet},
};

use super::models::{Constraints, Schedule, ScheduledMatch, TimeGrid, TimeSlot, Venue};
use crate::bracket::models::{Bracket, MatchId};
use crate::config::SchedulerConfig;
use crate::errors::{BracketError, BracketResult};
use crate::roster::models::ParticipantId;

/// Order and (optionally) time-slot every match of a bracket
///
/// Without a time grid the schedule is the dependency order alone. With a
/// grid, each match that has to be played gets a (slot, venue) pair found by
/// a depth-first search bounded by `config.max_search_steps`.
///
/// # Errors
///
/// * `SchedulingConflict` - no feasible assignment, or the step cap was hit
pub fn schedule_bracket(
    bracket: &Bracket,
    constraints: &Constraints,
    config: &SchedulerConfig,
) -> BracketResult<Schedule> {
    let order = topological_order(bracket)?;

    let entries = match &constraints.time_grid {
        None => order
            .iter()
            .enumerate()
            .map(|(sequence, &match_id)| ScheduledMatch {
                sequence,
                match_id,
                slot: None,
            })
            .collect(),
        Some(grid) => {
            let venues = constraints.effective_venues();
            let search = SlotSearch::new(
                bracket,
                &venues,
                grid.slots,
                constraints.min_rest_slots,
                config.max_search_steps,
            );
            let assigned = search.run(&order)?;
            sequence_by_slot(bracket, &order, &assigned, grid, &venues, config)?
        }
    };

    info!(
        "Scheduled {} matches (bracket version {})",
        bracket.matches().len(),
        bracket.version()
    );

    Ok(Schedule {
        entries,
        bracket_version: bracket.version(),
    })
}

/// Kahn's algorithm over feed edges
///
/// Ready matches are taken by round, then section, then position, then id.
pub fn topological_order(bracket: &Bracket) -> BracketResult<Vec<MatchId>> {
    let matches = bracket.matches();
    let mut indegree: HashMap<MatchId, usize> = HashMap::with_capacity(matches.len());
    let mut dependents: HashMap<MatchId, Vec<MatchId>> = HashMap::new();

    for m in matches {
        let deps: HashSet<MatchId> = m.dependencies().collect();
        indegree.insert(m.id, deps.len());
        for dep in deps {
            dependents.entry(dep).or_default().push(m.id);
        }
    }

    let key = |id: MatchId| {
        let m = bracket.get(id);
        Reverse((
            m.map_or(0, |m| m.round),
            m.map_or(0, |m| m.section.rank()),
            m.map_or(0, |m| m.position),
            id,
        ))
    };

    let mut ready: BinaryHeap<_> = indegree
        .iter()
        .filter(|&(_, &count)| count == 0)
        .map(|(&id, _)| key(id))
        .collect();

    let mut order = Vec::with_capacity(matches.len());
    while let Some(Reverse((_, _, _, id))) = ready.pop() {
        order.push(id);
        for &next in dependents.get(&id).into_iter().flatten() {
            if let Some(count) = indegree.get_mut(&next) {
                *count -= 1;
                if *count == 0 {
                    ready.push(key(next));
                }
            }
        }
    }

    if order.len() != matches.len() {
        return Err(BracketError::SchedulingConflict(
            "match dependencies contain a cycle".to_string(),
        ));
    }

    Ok(order)
}

/// Backtracking search for (slot, venue) pairs
struct SlotSearch<'a> {
    bracket: &'a Bracket,
    venues: &'a [Venue],
    slot_count: u32,
    min_rest: u32,
    max_steps: u64,
    steps: u64,
    assigned: HashMap<MatchId, (u32, usize)>,
    occupied: HashSet<(u32, usize)>,
    busy: HashMap<ParticipantId, Vec<u32>>,
}

impl<'a> SlotSearch<'a> {
    fn new(
        bracket: &'a Bracket,
        venues: &'a [Venue],
        slot_count: u32,
        min_rest: u32,
        max_steps: u64,
    ) -> Self {
        Self {
            bracket,
            venues,
            slot_count,
            min_rest,
            max_steps,
            steps: 0,
            assigned: HashMap::new(),
            occupied: HashSet::new(),
            busy: HashMap::new(),
        }
    }

    fn run(mut self, order: &[MatchId]) -> BracketResult<HashMap<MatchId, (u32, usize)>> {
        let targets: Vec<MatchId> = order
            .iter()
            .copied()
            .filter(|&id| self.bracket.needs_play(id))
            .collect();

        let capacity: usize = (0..self.slot_count)
            .map(|slot| self.venues.iter().filter(|v| v.is_available(slot)).count())
            .sum();
        if targets.len() > capacity {
            return Err(BracketError::SchedulingConflict(format!(
                "{} matches need a slot but only {capacity} slot/venue pairs are available",
                targets.len()
            )));
        }

        if self.place(&targets, 0)? {
            debug!("Slot search finished after {} steps", self.steps);
            Ok(self.assigned)
        } else {
            warn!("Slot search exhausted after {} steps", self.steps);
            Err(BracketError::SchedulingConflict(format!(
                "no assignment of {} matches fits {} slots with the given venues and rest",
                targets.len(),
                self.slot_count
            )))
        }
    }

    fn place(&mut self, targets: &[MatchId], next: usize) -> BracketResult<bool> {
        let Some(&id) = targets.get(next) else {
            return Ok(true);
        };

        let Some(earliest) = self.earliest_slot(id) else {
            return Ok(false);
        };
        for slot in earliest..self.slot_count {
            for venue in 0..self.venues.len() {
                self.steps += 1;
                if self.steps > self.max_steps {
                    return Err(BracketError::SchedulingConflict(format!(
                        "slot search gave up after {} steps",
                        self.max_steps
                    )));
                }

                if !self.fits(id, slot, venue) {
                    continue;
                }
                self.assign(id, slot, venue);
                if self.place(targets, next + 1)? {
                    return Ok(true);
                }
                self.unassign(id, slot, venue);
            }
        }

        Ok(false)
    }

    /// Latest slot at which a match's inputs become known
    ///
    /// Matches that never get played (byes, void pairings) have no slot of
    /// their own and pass on the readiness of their inputs.
    fn ready_after(&self, id: MatchId) -> Option<u32> {
        if let Some(&(slot, _)) = self.assigned.get(&id) {
            return Some(slot);
        }
        self.bracket
            .get(id)?
            .dependencies()
            .filter_map(|dep| self.ready_after(dep))
            .max()
    }

    /// First slot a match may use, or None when the rest requirement pushes
    /// it past any representable slot
    fn earliest_slot(&self, id: MatchId) -> Option<u32> {
        let m = self.bracket.get(id)?;
        let mut earliest = 0;
        for ready in m.dependencies().filter_map(|dep| self.ready_after(dep)) {
            let after_rest = ready.checked_add(1)?.checked_add(self.min_rest)?;
            earliest = earliest.max(after_rest);
        }
        Some(earliest)
    }

    fn fits(&self, id: MatchId, slot: u32, venue: usize) -> bool {
        if self.occupied.contains(&(slot, venue)) || !self.venues[venue].is_available(slot) {
            return false;
        }
        let Some(m) = self.bracket.get(id) else {
            return false;
        };
        m.slots
            .iter()
            .filter_map(|s| s.participant())
            .all(|participant| {
                self.busy.get(participant).is_none_or(|taken| {
                    taken.iter().all(|&other| other.abs_diff(slot) > self.min_rest)
                })
            })
    }

    fn assign(&mut self, id: MatchId, slot: u32, venue: usize) {
        self.assigned.insert(id, (slot, venue));
        self.occupied.insert((slot, venue));
        if let Some(m) = self.bracket.get(id) {
            for participant in m.slots.iter().filter_map(|s| s.participant()) {
                self.busy.entry(participant.clone()).or_default().push(slot);
            }
        }
    }

    fn unassign(&mut self, id: MatchId, slot: u32, venue: usize) {
        self.assigned.remove(&id);
        self.occupied.remove(&(slot, venue));
        if let Some(m) = self.bracket.get(id) {
            for participant in m.slots.iter().filter_map(|s| s.participant()) {
                if let Some(taken) = self.busy.get_mut(participant) {
                    if let Some(pos) = taken.iter().rposition(|&s| s == slot) {
                        taken.remove(pos);
                    }
                }
            }
        }
    }
}

/// Final order once slots are known
///
/// Played matches sort by (slot, venue). A match resolved without play sorts
/// right after the latest slotted match upstream of it, or first if there is
/// none, so the order still respects every dependency.
fn sequence_by_slot(
    bracket: &Bracket,
    order: &[MatchId],
    assigned: &HashMap<MatchId, (u32, usize)>,
    grid: &TimeGrid,
    venues: &[Venue],
    config: &SchedulerConfig,
) -> BracketResult<Vec<ScheduledMatch>> {
    let mut effective: HashMap<MatchId, Option<u32>> = HashMap::with_capacity(order.len());
    let mut keyed = Vec::with_capacity(order.len());

    for (topo, &id) in order.iter().enumerate() {
        let key = match assigned.get(&id) {
            Some(&(slot, venue)) => {
                effective.insert(id, Some(slot));
                (slot, 1u8, venue, topo)
            }
            None => {
                let upstream = bracket
                    .get(id)
                    .into_iter()
                    .flat_map(|m| m.dependencies())
                    .filter_map(|dep| effective.get(&dep).copied().flatten())
                    .max();
                effective.insert(id, upstream);
                match upstream {
                    Some(slot) => (slot, 2u8, 0, topo),
                    None => (0, 0u8, 0, topo),
                }
            }
        };
        keyed.push((key, id));
    }
    keyed.sort_by_key(|(key, _)| *key);

    let minutes = grid.slot_minutes.unwrap_or(config.default_slot_minutes);
    keyed
        .into_iter()
        .enumerate()
        .map(|(sequence, (_, match_id))| {
            let slot = match assigned.get(&match_id) {
                Some(&(index, venue)) => Some(TimeSlot {
                    index,
                    venue: venues[venue].id.clone(),
                    starts_at: grid
                        .start
                        .map(|start| slot_start(start, index, minutes))
                        .transpose()?,
                }),
                None => None,
            };
            Ok(ScheduledMatch {
                sequence,
                match_id,
                slot,
            })
        })
        .collect()
}

/// Wall-clock start of a slot
///
/// # Errors
///
/// * `SchedulingConflict` - the start time is not representable
fn slot_start(start: DateTime<Utc>, index: u32, minutes: u32) -> BracketResult<DateTime<Utc>> {
    i64::from(index)
        .checked_mul(i64::from(minutes))
        .and_then(TimeDelta::try_minutes)
        .and_then(|offset| start.checked_add_signed(offset))
        .ok_or_else(|| {
            BracketError::SchedulingConflict(format!(
                "slot {index} of {minutes} minutes starts past the supported calendar"
            ))
        })
}
