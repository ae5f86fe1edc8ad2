use std::collections::BTreeSet;

use itertools::Itertools;

use crate::grid::{Position, RollMap};

/// A roll can be reached by a forklift when fewer than this many rolls
/// still surround it.
pub const ACCESS_THRESHOLD: usize = 4;

/// What a full peeling run took off the map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Peeling {
    /// Removed rolls, in the order they were taken.
    pub settled: Vec<Position>,
    /// How many rolls each executed round removed.
    pub rounds: Vec<usize>,
}

impl Peeling {
    pub fn count(&self) -> usize {
        self.settled.len()
    }
}

/// Whether the roll at `idx` would be taken given the rolls removed so far.
pub fn is_accessible(map: &RollMap, idx: usize) -> bool {
    map.live_neighbors(idx) < ACCESS_THRESHOLD
}

/// Removes accessible rolls until none are left.
///
/// Every roll starts on the frontier. Taking a roll puts its remaining
/// neighbours on the next frontier, since they are the only rolls whose
/// accessibility can change. Rolls already removed are skipped, so the same
/// roll reached twice in a round is harmless.
#[tracing::instrument(skip_all, fields(rolls = map.len()))]
pub fn peel(map: &mut RollMap) -> Peeling {
    tracing::debug!("before peeling:\n{map}");

    let mut peeling = Peeling::default();
    let mut frontier: BTreeSet<usize> = (0..map.len()).collect();

    while !frontier.is_empty() {
        let mut next = BTreeSet::new();
        let mut taken = 0;

        for idx in frontier {
            if map.rolls[idx].removed || !is_accessible(map, idx) {
                continue;
            }

            map.rolls[idx].removed = true;
            taken += 1;
            peeling.settled.push(map.rolls[idx].position());
            tracing::trace!(position = %map.rolls[idx].position(), "roll taken");

            next.extend(
                map.rolls[idx]
                    .neighbors
                    .iter()
                    .copied()
                    .filter(|&n| !map.rolls[n].removed),
            );
        }

        peeling.rounds.push(taken);
        tracing::debug!(round = peeling.rounds.len(), taken, queued = next.len());
        frontier = next;
    }

    tracing::debug!("after peeling:\n{map}");
    tracing::info!(
        removed = peeling.count(),
        rounds = %peeling.rounds.iter().join(", "),
        "peeling settled"
    );
    peeling
}
