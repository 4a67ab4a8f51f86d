//! Seed placement for elimination brackets.

use log::{debug, info, warn};

use super::models::PairingBan;
use crate::roster::models::SeededRoster;

/// Smallest power of two that fits `participants`
pub fn bracket_size(participants: usize) -> usize {
    participants.max(1).next_power_of_two()
}

/// Number of elimination rounds for a field (ceil(log2 n))
pub fn round_count(participants: usize) -> u32 {
    bracket_size(participants).trailing_zeros()
}

/// Seed numbers in bracket-line order for a field of `size` (a power of two)
///
/// Built by repeatedly expanding every seed `s` into the pair
/// `(s, 2k + 1 - s)` where `2k` is the next field size. Round-1 pairs are
/// therefore `s` vs `size + 1 - s`, and the top `2^j` seeds always sit in
/// different `1/2^j` sections of the bracket.
///
/// ```
/// use tourney::bracket::seeding::standard_order;
///
/// assert_eq!(standard_order(8), vec![1, 8, 4, 5, 2, 7, 3, 6]);
/// ```
pub fn standard_order(size: usize) -> Vec<u32> {
    let mut order = vec![1u32];
    while order.len() < size {
        let next = order.len() as u32 * 2 + 1;
        order = order.iter().flat_map(|&seed| [seed, next - seed]).collect();
    }
    order
}

/// Round-1 seed pairs for a field of `size`
pub fn first_round_pairs(size: usize) -> Vec<(u32, u32)> {
    standard_order(size)
        .chunks(2)
        .map(|pair| (pair[0], pair[1]))
        .collect()
}

/// Reseed to keep banned pairs apart in round 1
///
/// Works by swapping the weaker seed of a banned pairing with the nearest
/// seed that also plays in round 1 (byes stay with the top seeds), keeping a
/// swap only if it lowers the number of banned pairings. A pairing no swap
/// can improve is skipped and the later ones are still tried. Passes repeat
/// until one makes no progress. Deterministic.
///
/// Returns the number of banned pairings left in round 1.
pub(crate) fn separate_banned_pairs(roster: &mut SeededRoster, bans: &[PairingBan]) -> usize {
    if bans.is_empty() {
        return 0;
    }

    let n = roster.len() as u32;
    let size = bracket_size(roster.len());
    let first_playing = (size as u32 - n) + 1;
    let pairs = first_round_pairs(size);

    let mut remaining = count_banned(roster, &pairs, bans);
    let mut progressed = true;

    while remaining > 0 && progressed {
        progressed = false;
        for &(strong, weak) in &pairs {
            if !banned(roster, strong, weak, bans) {
                continue;
            }

            let candidates = (1..n).flat_map(|d| [weak + d, weak.wrapping_sub(d)]);
            let mut improved = false;
            for candidate in candidates {
                if candidate < first_playing || candidate > n || candidate == strong {
                    continue;
                }
                roster.swap_seeds(weak, candidate);
                let after = count_banned(roster, &pairs, bans);
                if after < remaining {
                    info!("Reseeded {weak} <-> {candidate} to separate a banned pairing");
                    remaining = after;
                    improved = true;
                    break;
                }
                roster.swap_seeds(weak, candidate);
            }

            if improved {
                progressed = true;
            } else {
                debug!("Banned pairing {strong} vs {weak} cannot be improved, skipping");
            }
        }
    }

    if remaining > 0 {
        warn!("{remaining} banned pairing(s) could not be separated in round 1");
    }
    remaining
}

fn banned(roster: &SeededRoster, a: u32, b: u32, bans: &[PairingBan]) -> bool {
    match (roster.by_seed(a), roster.by_seed(b)) {
        (Some(x), Some(y)) => bans
            .iter()
            .any(|ban| ban.matches(&x.participant.id, &y.participant.id)),
        _ => false,
    }
}

fn count_banned(roster: &SeededRoster, pairs: &[(u32, u32)], bans: &[PairingBan]) -> usize {
    pairs
        .iter()
        .filter(|(a, b)| banned(roster, *a, *b, bans))
        .count()
}
