//! Slot derivation along feed edges.
//!
//! Every fed slot is a pure function of its source match's resolution, so the
//! whole bracket can be re-derived from resolutions alone. Automatic
//! resolutions (byes, void pairings, skipped resets) are recomputed on every
//! pass while played results are kept.

use log::debug;

use super::models::{Bracket, Feed, MatchId, Resolution, Slot};

impl Bracket {
    /// Current occupant produced by a feed
    pub fn feed_output(&self, feed: Feed) -> Slot {
        let Some(source) = self.get(feed.source()) else {
            return Slot::Tbd;
        };
        let Some(resolution) = &source.resolution else {
            return Slot::Tbd;
        };
        let produced = match feed {
            Feed::WinnerOf(_) => resolution.winner(),
            Feed::LoserOf(_) => resolution.loser(),
        };
        produced.map_or(Slot::Bye, |id| Slot::Participant(id.clone()))
    }

    /// Whether a match is, or will be, decided by actually playing it
    ///
    /// False for automatic resolutions and for pending matches with a side
    /// that can only ever hold a bye: a bye already in the slot, the loser of
    /// a match that is never played, or the winner of a bye-versus-bye match.
    pub fn needs_play(&self, id: MatchId) -> bool {
        let Some(m) = self.get(id) else {
            return false;
        };
        if m.is_resolved() {
            return !m.is_automatic();
        }
        !m.slots
            .iter()
            .zip(m.feeds)
            .any(|(slot, feed)| self.forced_bye(slot, feed))
    }

    fn forced_bye(&self, slot: &Slot, feed: Option<Feed>) -> bool {
        if *slot == Slot::Bye {
            return true;
        }
        if slot.is_known() {
            return false;
        }
        match feed {
            Some(Feed::LoserOf(source)) => self
                .get(source)
                .is_some_and(|m| !m.conditional && !self.needs_play(source)),
            Some(Feed::WinnerOf(source)) => self.get(source).is_some_and(|m| {
                !m.is_resolved()
                    && m.slots
                        .iter()
                        .zip(m.feeds)
                        .all(|(slot, feed)| self.forced_bye(slot, feed))
            }),
            None => false,
        }
    }

    /// Recompute fed slots and automatic resolutions in arena order
    ///
    /// Changed matches are stamped with the current bracket version. Returns
    /// the ids of every match that changed.
    pub(crate) fn rederive(&mut self) -> Vec<MatchId> {
        let mut changed = Vec::new();

        for idx in 0..self.matches.len() {
            let current = &self.matches[idx];
            let mut slots = current.slots.clone();
            for (slot, feed) in slots.iter_mut().zip(current.feeds) {
                if let Some(feed) = feed {
                    *slot = self.feed_output(feed);
                }
            }

            let resolution = match &current.resolution {
                Some(Resolution::Played(result)) => Some(Resolution::Played(result.clone())),
                _ if current.conditional => self.reset_resolution(idx),
                _ => automatic_resolution(&slots),
            };

            let version = self.version;
            let entry = &mut self.matches[idx];
            if entry.slots != slots || entry.resolution != resolution {
                debug!(
                    "{} now {} vs {} ({:?})",
                    entry.id, slots[0], slots[1], resolution
                );
                entry.slots = slots;
                entry.resolution = resolution;
                entry.updated_at = version;
                changed.push(entry.id);
            }
        }

        changed
    }

    /// A reset is skipped unless the side coming from the losers bracket won
    /// the first grand final
    fn reset_resolution(&self, idx: usize) -> Option<Resolution> {
        let first = self.matches[idx].feeds[0].and_then(|feed| self.get(feed.source()))?;
        match &first.resolution {
            None => None,
            Some(Resolution::Played(result))
                if first.slots[1].participant() == Some(&result.winner) =>
            {
                None
            }
            Some(_) => Some(Resolution::NotRequired),
        }
    }
}

fn automatic_resolution(slots: &[Slot; 2]) -> Option<Resolution> {
    match slots {
        [Slot::Participant(id), Slot::Bye] | [Slot::Bye, Slot::Participant(id)] => {
            Some(Resolution::Bye {
                advanced: id.clone(),
            })
        }
        [Slot::Bye, Slot::Bye] => Some(Resolution::Void),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::models::{Format, MatchResult, Section};
    use crate::roster::models::{Participant, SeededRoster};

    fn roster() -> SeededRoster {
        SeededRoster::from_ordered(vec![
            Participant::new("a", "A"),
            Participant::new("b", "B"),
            Participant::new("c", "C"),
        ])
    }

    #[test]
    fn test_bye_advances_into_next_round() {
        let mut bracket = Bracket::new(Format::SingleElimination, roster(), 4);
        let first = bracket.push_match(
            Section::Winners,
            1,
            0,
            [Slot::Participant("a".into()), Slot::Bye],
            [None, None],
        );
        let second = bracket.push_match(
            Section::Winners,
            1,
            1,
            [Slot::Participant("b".into()), Slot::Participant("c".into())],
            [None, None],
        );
        let last = bracket.push_match(
            Section::Winners,
            2,
            0,
            [Slot::Tbd, Slot::Tbd],
            [Some(Feed::WinnerOf(first)), Some(Feed::WinnerOf(second))],
        );

        let changed = bracket.rederive();
        assert_eq!(changed, vec![first, last]);
        assert!(bracket.get(first).unwrap().is_automatic());
        assert_eq!(
            bracket.get(last).unwrap().slots,
            [Slot::Participant("a".into()), Slot::Tbd]
        );

        // Second pass changes nothing
        assert!(bracket.rederive().is_empty());
    }

    #[test]
    fn test_loser_of_bye_is_bye() {
        let mut bracket = Bracket::new(Format::DoubleElimination, roster(), 4);
        let first = bracket.push_match(
            Section::Winners,
            1,
            0,
            [Slot::Participant("a".into()), Slot::Bye],
            [None, None],
        );
        let second = bracket.push_match(
            Section::Winners,
            1,
            1,
            [Slot::Participant("b".into()), Slot::Participant("c".into())],
            [None, None],
        );
        let losers = bracket.push_match(
            Section::Losers,
            1,
            0,
            [Slot::Tbd, Slot::Tbd],
            [Some(Feed::LoserOf(first)), Some(Feed::LoserOf(second))],
        );
        bracket.rederive();
        assert_eq!(bracket.get(losers).unwrap().slots, [Slot::Bye, Slot::Tbd]);

        bracket.matches[1].resolution = Some(Resolution::Played(MatchResult {
            winner: "b".into(),
            loser: "c".into(),
            scores: None,
        }));
        bracket.rederive();
        assert_eq!(
            bracket.get(losers).unwrap().resolution,
            Some(Resolution::Bye {
                advanced: "c".into()
            })
        );
    }
}
