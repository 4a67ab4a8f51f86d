//! Result recording, overrides and bracket progress queries.

use chrono::Utc;
use log::{info, warn};
use std::collections::HashMap;

use super::models::{ResultSubmission, Standing};
use crate::bracket::models::{
    Bracket, Format, MatchId, MatchResult, OverrideRecord, Resolution, Section,
};
use crate::errors::{BracketError, BracketResult};
use crate::roster::models::ParticipantId;

/// Record the result of a pending match and advance the bracket
///
/// Checks run in order and the bracket is untouched when any of them fails.
/// On success the version is bumped, every downstream slot is re-derived,
/// bye matches and the conditional reset resolve automatically.
///
/// # Errors
///
/// * `MatchNotFound` - no match with that id
/// * `AlreadyResolved` - the match already has a result
/// * `ConcurrentModification` - `expected_version` is stale for this match
/// * `MatchNotReady` - a slot is still waiting on an earlier match
/// * `InvalidWinner` - winner is not one of the two occupants
pub fn record_result(
    bracket: &mut Bracket,
    submission: ResultSubmission,
) -> BracketResult<&Bracket> {
    let target = bracket
        .get(submission.match_id)
        .ok_or(BracketError::MatchNotFound(submission.match_id))?;
    if target.is_resolved() {
        return Err(BracketError::AlreadyResolved(submission.match_id));
    }
    check_version(bracket, submission.match_id, submission.expected_version)?;
    let result = played_result(bracket, &submission)?;

    let changed = apply(bracket, submission.match_id, Resolution::Played(result));
    info!(
        "Recorded {} won by {} (version {}, {} downstream change(s))",
        submission.match_id,
        submission.winner,
        bracket.version(),
        changed
    );
    Ok(bracket)
}

/// Replace the result of a match as an explicit correction
///
/// Works on pending and resolved matches alike. The previous resolution is
/// kept in the bracket's audit log together with the note.
///
/// # Errors
///
/// * `MatchNotFound`, `ConcurrentModification`, `MatchNotReady`,
///   `InvalidWinner` - as for [`record_result`]
/// * `OverrideBlocked` - a match downstream has already been played
pub fn override_result<'a>(
    bracket: &'a mut Bracket,
    submission: ResultSubmission,
    note: &str,
) -> BracketResult<&'a Bracket> {
    let previous = bracket
        .get(submission.match_id)
        .ok_or(BracketError::MatchNotFound(submission.match_id))?
        .resolution
        .clone();
    check_version(bracket, submission.match_id, submission.expected_version)?;
    let result = played_result(bracket, &submission)?;

    if let Some(dependent) = played_downstream(bracket, submission.match_id) {
        return Err(BracketError::OverrideBlocked {
            match_id: submission.match_id,
            dependent,
        });
    }

    let replacement = Resolution::Played(result);
    apply(bracket, submission.match_id, replacement.clone());
    bracket.audit.push(OverrideRecord {
        match_id: submission.match_id,
        previous,
        replacement,
        note: note.to_string(),
        version: bracket.version,
        recorded_at: Utc::now(),
    });
    warn!(
        "Result of {} overridden at version {}: {note}",
        submission.match_id, bracket.version
    );
    Ok(bracket)
}

/// Reject submissions prepared against an outdated view of this match
///
/// The submission is stale when the target or a match it feeds changed after
/// `expected`, or when `expected` is ahead of the bracket itself.
fn check_version(bracket: &Bracket, id: MatchId, expected: u64) -> BracketResult<()> {
    let current = bracket.version();
    let changed_at = std::iter::once(id)
        .chain(bracket.dependents(id))
        .filter_map(|m| bracket.get(m))
        .map(|m| m.updated_at)
        .max()
        .unwrap_or(0);

    if changed_at > expected || expected > current {
        return Err(BracketError::ConcurrentModification {
            expected,
            changed_at,
            current,
        });
    }
    Ok(())
}

fn played_result(bracket: &Bracket, submission: &ResultSubmission) -> BracketResult<MatchResult> {
    let id = submission.match_id;
    let (a, b) = bracket
        .get(id)
        .and_then(|m| m.participants())
        .ok_or(BracketError::MatchNotReady(id))?;

    let loser = if &submission.winner == a {
        b
    } else if &submission.winner == b {
        a
    } else {
        return Err(BracketError::InvalidWinner {
            match_id: id,
            winner: submission.winner.clone(),
        });
    };

    Ok(MatchResult {
        winner: submission.winner.clone(),
        loser: loser.clone(),
        scores: submission.scores,
    })
}

/// First played match reachable downstream of `id`
fn played_downstream(bracket: &Bracket, id: MatchId) -> Option<MatchId> {
    let mut frontier = bracket.dependents(id);
    while let Some(next) = frontier.pop() {
        let m = bracket.get(next)?;
        if matches!(m.resolution, Some(Resolution::Played(_))) {
            return Some(next);
        }
        frontier.extend(bracket.dependents(next));
    }
    None
}

/// Bump the version, set the resolution and re-derive; returns the number of
/// other matches that changed
fn apply(bracket: &mut Bracket, id: MatchId, resolution: Resolution) -> usize {
    bracket.version += 1;
    let version = bracket.version;
    if let Some(m) = bracket.get_mut(id) {
        m.resolution = Some(resolution);
        m.updated_at = version;
    }
    bracket.rederive().into_iter().filter(|&changed| changed != id).count()
}

impl Bracket {
    /// Every match has a resolution
    pub fn is_complete(&self) -> bool {
        self.matches.iter().all(|m| m.is_resolved())
    }

    /// Matches waiting for a result with both participants in place
    pub fn pending_matches(&self) -> Vec<MatchId> {
        self.matches
            .iter()
            .filter(|m| m.is_ready())
            .map(|m| m.id)
            .collect()
    }

    /// Tournament winner, once decided
    ///
    /// Elimination: winner of the last match actually played at the top of
    /// the bracket. Round robin: leader of the standings once every match is
    /// resolved.
    pub fn champion(&self) -> Option<&ParticipantId> {
        if self.format() == Format::RoundRobin {
            if !self.is_complete() {
                return None;
            }
            let leader = self.standings().into_iter().next()?;
            return self.roster().by_seed(leader.seed).map(|entry| &entry.participant.id);
        }

        let last = self
            .matches
            .iter()
            .rev()
            .find(|m| matches!(m.section, Section::GrandFinal | Section::Winners))?;
        match &last.resolution {
            Some(Resolution::NotRequired) => last
                .feeds
                .iter()
                .flatten()
                .find_map(|feed| self.get(feed.source()))
                .and_then(|first| first.winner()),
            Some(resolution) => resolution.winner(),
            None => None,
        }
    }

    /// Win/loss table over played matches
    ///
    /// Ordered by wins, then score differential, then seed.
    pub fn standings(&self) -> Vec<Standing> {
        let mut table: HashMap<&ParticipantId, Standing> = self
            .roster()
            .entries()
            .iter()
            .map(|entry| {
                (
                    &entry.participant.id,
                    Standing::new(entry.participant.id.clone(), entry.seed),
                )
            })
            .collect();

        for m in &self.matches {
            let Some(Resolution::Played(result)) = &m.resolution else {
                continue;
            };
            let (winner_score, loser_score) = match result.scores {
                Some((a, b)) if m.slots[0].participant() == Some(&result.winner) => (a, b),
                Some((a, b)) => (b, a),
                None => (0, 0),
            };
            if let Some(row) = table.get_mut(&result.winner) {
                row.played += 1;
                row.wins += 1;
                row.score_for += winner_score;
                row.score_against += loser_score;
            }
            if let Some(row) = table.get_mut(&result.loser) {
                row.played += 1;
                row.losses += 1;
                row.score_for += loser_score;
                row.score_against += winner_score;
            }
        }

        let mut rows: Vec<Standing> = table.into_values().collect();
        rows.sort_by(|a, b| {
            b.wins
                .cmp(&a.wins)
                .then_with(|| b.differential().cmp(&a.differential()))
                .then_with(|| a.seed.cmp(&b.seed))
        });
        rows
    }
}
