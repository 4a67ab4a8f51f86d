//! Double Elimination Example
//!
//! Builds a six-player double-elimination bracket, schedules it on two
//! courts and plays it out with the favourite winning every match.

use tourney::advancement::{ResultSubmission, record_result};
use tourney::{
    Constraints, Format, Participant, SchedulerConfig, TimeGrid, TournamentRequest, Venue,
    generate,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Double Elimination Example ===\n");

    let roster = ["Ada", "Brook", "Cass", "Dev", "Eli", "Fern"]
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            Participant::new(&name.to_lowercase(), name).with_seed(idx as u32 + 1)
        })
        .collect();
    let constraints = Constraints {
        venues: vec![Venue::new("court-1"), Venue::new("court-2")],
        time_grid: Some(TimeGrid::new(16)),
        min_rest_slots: 1,
        ..Default::default()
    };
    let request = TournamentRequest::new("Club Night", Format::DoubleElimination, roster)
        .with_constraints(constraints);

    let generated = generate(&request, &SchedulerConfig::default())?;
    println!("Fingerprint: {}", generated.fingerprint);
    println!("Violations: {}\n", generated.violations.len());

    println!("Schedule:");
    for entry in generated.schedule.iter() {
        let m = generated
            .bracket
            .get(entry.match_id)
            .ok_or("schedule names an unknown match")?;
        match &entry.slot {
            Some(slot) => println!(
                "  #{:<2} {} {} R{} on {} (slot {}): {} vs {}",
                entry.sequence, m.id, m.section, m.round, slot.venue, slot.index, m.slots[0], m.slots[1]
            ),
            None => println!(
                "  #{:<2} {} {} R{} resolved without play",
                entry.sequence, m.id, m.section, m.round
            ),
        }
    }

    let mut bracket = generated.bracket;
    while let Some(&id) = bracket.pending_matches().first() {
        let (a, b) = bracket
            .get(id)
            .and_then(|m| m.participants())
            .ok_or("pending match without participants")?;
        let roster = bracket.roster();
        let winner = (if roster.seed_of(a) < roster.seed_of(b) { a } else { b }).clone();
        let version = bracket.version();
        record_result(&mut bracket, ResultSubmission::new(id, winner.as_str(), version))?;
        println!("{id} won by {}", bracket.roster().display_name(&winner));
    }

    if let Some(champion) = bracket.champion() {
        println!("\nChampion: {}", bracket.roster().display_name(champion));
    }

    Ok(())
}
