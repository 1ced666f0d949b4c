use crate::game::region::DifferenceRegion;
use rand::Rng;
use std::collections::BTreeSet;

/// Uniformly picks an index that is not yet in `found`.
pub fn pick_hint_candidate<R: Rng>(
    regions: &[DifferenceRegion],
    found: &BTreeSet<usize>,
    rng: &mut R,
) -> Option<usize> {
    let unfound: Vec<usize> = (0..regions.len()).filter(|i| !found.contains(i)).collect();
    if unfound.is_empty() {
        return None;
    }
    Some(unfound[rng.random_range(0..unfound.len())])
}
