//! Plain-text rendering of brackets, schedules and standings.

use std::fmt::Write;

use tourney::{Bracket, Match, Resolution, Schedule, Section, Slot, Violation};

fn side(bracket: &Bracket, slot: &Slot) -> String {
    match slot {
        Slot::Participant(id) => bracket.roster().display_name(id).to_string(),
        other => other.to_string(),
    }
}

fn outcome(bracket: &Bracket, m: &Match) -> String {
    match &m.resolution {
        None if m.is_ready() => "ready".to_string(),
        None => "waiting".to_string(),
        Some(Resolution::Played(result)) => {
            let winner = bracket.roster().display_name(&result.winner);
            match result.scores {
                Some((a, b)) => format!("{winner} wins {a}:{b}"),
                None => format!("{winner} wins"),
            }
        }
        Some(Resolution::Bye { advanced }) => {
            format!("{} advances (bye)", bracket.roster().display_name(advanced))
        }
        Some(Resolution::Void) => "void".to_string(),
        Some(Resolution::NotRequired) => "not required".to_string(),
    }
}

/// Render every round of every section with match outcomes
pub fn render_bracket(bracket: &Bracket) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} bracket, {} participants (version {})",
        bracket.format(),
        bracket.roster().len(),
        bracket.version()
    );

    for section in [
        Section::Group,
        Section::Winners,
        Section::Losers,
        Section::GrandFinal,
    ] {
        let mut rounds = bracket.rounds_in(section).peekable();
        if rounds.peek().is_none() {
            continue;
        }
        let _ = writeln!(out, "\n{section}");
        for round in rounds {
            let _ = writeln!(out, "  Round {}", round.number);
            for id in &round.matches {
                let Some(m) = bracket.get(*id) else { continue };
                let _ = writeln!(
                    out,
                    "    {:<4} {} vs {}  [{}]",
                    m.id.to_string(),
                    side(bracket, &m.slots[0]),
                    side(bracket, &m.slots[1]),
                    outcome(bracket, m)
                );
            }
        }
    }

    if let Some(champion) = bracket.champion() {
        let _ = writeln!(out, "\nChampion: {}", bracket.roster().display_name(champion));
    }
    out
}

/// Render the schedule in sequence order
pub fn render_schedule(bracket: &Bracket, schedule: &Schedule) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Match schedule ({} slots used)", schedule.slots_used());

    for entry in schedule.iter() {
        let Some(m) = bracket.get(entry.match_id) else {
            continue;
        };
        let when = match &entry.slot {
            Some(slot) => match slot.starts_at {
                Some(start) => format!(
                    "slot {:>3} @ {} {}",
                    slot.index,
                    slot.venue,
                    start.format("%Y-%m-%d %H:%M")
                ),
                None => format!("slot {:>3} @ {}", slot.index, slot.venue),
            },
            None if !bracket.needs_play(m.id) => "no play".to_string(),
            None => "unslotted".to_string(),
        };
        let _ = writeln!(
            out,
            "  {:>3}. {:<4} {} R{:<2} {} vs {}  ({when})",
            entry.sequence + 1,
            m.id.to_string(),
            m.section,
            m.round,
            side(bracket, &m.slots[0]),
            side(bracket, &m.slots[1]),
        );
    }
    out
}

/// Render the standings table
pub fn render_standings(bracket: &Bracket) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<20} {:>4} {:>4} {:>4} {:>6}",
        "Rank", "Participant", "P", "W", "L", "Diff"
    );
    for (rank, standing) in bracket.standings().iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>4}  {:<20} {:>4} {:>4} {:>4} {:>+6}",
            rank + 1,
            bracket.roster().display_name(&standing.participant),
            standing.played,
            standing.wins,
            standing.losses,
            standing.differential()
        );
    }
    out
}

/// Render constraint violations, one per line
pub fn render_violations(violations: &[Violation]) -> String {
    if violations.is_empty() {
        return "No constraint violations\n".to_string();
    }
    let mut out = format!("{} constraint violation(s)\n", violations.len());
    for violation in violations {
        let _ = writeln!(out, "  [{}] {violation}", violation.kind());
    }
    out
}
