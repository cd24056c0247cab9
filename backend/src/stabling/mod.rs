//! Stabling allocation
//!
//! Trains are laid up breadth-first across the depot: ordered by the
//! previous day's rank (unranked trains last, fleet order among equals), the
//! first `bays` trains take sequence 1 in bays 1..=bays, the next `bays`
//! trains take sequence 2, and so on. Shunting moves are `sequence - 1`.

use crate::models::Train;
use crate::orchestrator::config::StablingConfig;

/// Reorder key: ranked trains by rank, unranked (rank 0) after all of them
fn order_key(train: &Train) -> usize {
    match train.decision.rank {
        0 => usize::MAX,
        rank => rank,
    }
}

/// Assign bay positions and sequences for the whole fleet
///
/// The fleet size is checked against `bays * bay_capacity` at configuration
/// time; sequences beyond capacity cannot occur for a validated run.
pub fn allocate(trains: &mut [Train], config: &StablingConfig) {
    let bays = config.bays.max(1);
    let mut order: Vec<usize> = (0..trains.len()).collect();
    order.sort_by_key(|&i| order_key(&trains[i]));

    for (slot, &i) in order.iter().enumerate() {
        let bay = (slot % bays) as u32 + 1;
        let sequence = (slot / bays) as u32 + 1;
        trains[i].stabling.assign(bay, sequence);
    }
}
