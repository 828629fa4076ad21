// Cycle merger - Folds adjacent candidates into consolidated cycles
use crate::domain::charge::{ChargeCycle, MERGE_GAP, RawChargeCandidate};

/// Merges candidates (in start-time order) whose gap to the previous cycle
/// is at most [`MERGE_GAP`]. Each step produces a fresh cycle value instead of
/// mutating the previous one in place.
pub fn merge_candidates<I>(candidates: I) -> Vec<ChargeCycle>
where
    I: IntoIterator<Item = RawChargeCandidate>,
{
    candidates
        .into_iter()
        .fold(Vec::new(), |mut cycles: Vec<ChargeCycle>, candidate| {
            match cycles.pop() {
                Some(last) if last.gap_to(&candidate) <= MERGE_GAP => {
                    cycles.push(last.absorb(&candidate));
                }
                Some(last) => {
                    cycles.push(last);
                    cycles.push(ChargeCycle::from_candidate(&candidate));
                }
                None => cycles.push(ChargeCycle::from_candidate(&candidate)),
            }
            cycles
        })
}
