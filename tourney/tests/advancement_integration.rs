//! Integration tests for result recording
//!
//! These tests play complete tournaments through the public API and verify
//! progression, concurrency checks and overrides along the way.

use tourney::advancement::{ResultSubmission, override_result, record_result};
use tourney::bracket::{Bracket, BuildOptions, Format, MatchId, Resolution, Section, build_bracket};
use tourney::roster::{Participant, ParticipantId};
use tourney::BracketError;

fn players(n: usize) -> Vec<Participant> {
    (1..=n)
        .map(|i| Participant::new(&format!("p{i}"), &format!("Player {i}")))
        .collect()
}

/// Play every pending match, better seed winning unless `upset` says otherwise
fn play_out(bracket: &mut Bracket, upset: impl Fn(MatchId) -> bool) {
    while let Some(&id) = bracket.pending_matches().first() {
        let m = bracket.get(id).unwrap();
        let (a, b) = m.participants().unwrap();
        let seed_a = bracket.roster().seed_of(a).unwrap();
        let seed_b = bracket.roster().seed_of(b).unwrap();
        let (favourite, underdog) = if seed_a < seed_b { (a, b) } else { (b, a) };
        let winner = (if upset(id) { underdog } else { favourite }).clone();

        let version = bracket.version();
        record_result(bracket, ResultSubmission::new(id, winner.as_str(), version)).unwrap();
    }
}

#[test]
fn test_favourites_win_single_elimination() {
    for n in 2..=24 {
        let mut bracket =
            build_bracket(Format::SingleElimination, &players(n), &BuildOptions::default())
                .unwrap();
        play_out(&mut bracket, |_| false);
        assert!(bracket.is_complete());
        assert_eq!(bracket.champion(), Some(&ParticipantId::new("p1")));
        assert_eq!(bracket.version() as usize, n - 1);
    }
}

#[test]
fn test_double_elimination_reset_only_when_losers_side_wins() {
    for n in 2..=16 {
        // Favourite wins everything: no reset
        let mut straight =
            build_bracket(Format::DoubleElimination, &players(n), &BuildOptions::default())
                .unwrap();
        play_out(&mut straight, |_| false);
        let reset = straight.matches_in(Section::GrandFinal).last().unwrap();
        assert_eq!(reset.resolution, Some(Resolution::NotRequired), "{n} players");
        assert_eq!(straight.champion(), Some(&ParticipantId::new("p1")));

        // Upset in the first grand final forces the reset
        let mut reset_played =
            build_bracket(Format::DoubleElimination, &players(n), &BuildOptions::default())
                .unwrap();
        let first_final = reset_played.matches_in(Section::GrandFinal).next().unwrap().id;
        play_out(&mut reset_played, |id| id == first_final);
        let reset = reset_played.matches_in(Section::GrandFinal).last().unwrap();
        assert!(
            matches!(reset.resolution, Some(Resolution::Played(_))),
            "{n} players"
        );
        assert!(reset_played.is_complete());
        assert!(reset_played.champion().is_some());
    }
}

#[test]
fn test_every_participant_loses_at_most_twice() {
    let mut bracket =
        build_bracket(Format::DoubleElimination, &players(11), &BuildOptions::default()).unwrap();
    play_out(&mut bracket, |id| id.0 % 3 == 0);
    assert!(bracket.is_complete());

    for standing in bracket.standings() {
        assert!(standing.losses <= 2, "{} lost {}", standing.participant, standing.losses);
    }
}

#[test]
fn test_round_robin_play_out() {
    let mut bracket =
        build_bracket(Format::RoundRobin, &players(5), &BuildOptions::default()).unwrap();
    play_out(&mut bracket, |_| false);

    let table = bracket.standings();
    let wins: Vec<u32> = table.iter().map(|row| row.wins).collect();
    assert_eq!(wins, vec![4, 3, 2, 1, 0]);
    assert_eq!(bracket.champion(), Some(&ParticipantId::new("p1")));
}

#[test]
fn test_idempotent_rejection() {
    let mut bracket =
        build_bracket(Format::SingleElimination, &players(4), &BuildOptions::default()).unwrap();
    let submission = ResultSubmission::new(MatchId(2), "p2", 0).with_scores(2, 0);
    record_result(&mut bracket, submission.clone()).unwrap();
    let after_first = bracket.clone();

    for _ in 0..3 {
        let err = record_result(&mut bracket, submission.clone()).unwrap_err();
        assert!(matches!(err, BracketError::AlreadyResolved(MatchId(2))));
    }
    assert_eq!(bracket, after_first);
}

#[test]
fn test_override_then_continue() {
    let mut bracket =
        build_bracket(Format::DoubleElimination, &players(4), &BuildOptions::default()).unwrap();
    record_result(&mut bracket, ResultSubmission::new(MatchId(1), "p1", 0)).unwrap();

    // p4 actually won; the losers bracket picks up p1 instead
    override_result(
        &mut bracket,
        ResultSubmission::new(MatchId(1), "p4", 1),
        "referee correction",
    )
    .unwrap();
    let losers_opening = bracket.matches_in(Section::Losers).next().unwrap();
    assert_eq!(losers_opening.slots[0].participant(), Some(&ParticipantId::new("p1")));

    play_out(&mut bracket, |_| false);
    assert!(bracket.is_complete());
    assert_eq!(bracket.audit().len(), 1);
}
