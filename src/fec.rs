//! Functional-equivalence-class bookkeeping.
//!
//! A [`FecGroups`] registry partitions the constant gate and every reachable
//! and gate by simulation signature. Refinement only ever splits groups;
//! gates left alone in their group drop out of the registry for good.

use rustc_hash::FxHashMap;

use crate::{Aig, GateId};

/// Normalizes a signature so that a function and its complement collide.
///
/// Bit 0 is forced clear by complementing the whole word when set, so `sig`
/// and `!sig` share a key. Whether two groupmates are equal or complementary
/// is decided later from their raw signatures.
pub(crate) fn canonical(sig: u64) -> u64 {
    if sig & 1 == 1 { !sig } else { sig }
}

/// The registry of candidate equivalence groups.
///
/// Every group holds at least two gates; the head of a group is its
/// first member in topological order.
#[derive(Debug, Clone, Default)]
pub struct FecGroups {
    groups: Vec<Vec<GateId>>,
}

impl FecGroups {
    /// Starts from the coarsest partition: one group holding the constant
    /// gate and every and gate reachable from a primary output.
    pub fn init(aig: &Aig) -> Self {
        let mut all = vec![0];
        all.extend(aig.order().iter().copied().filter(|&id| aig.gate(id).is_and()));
        let groups = if all.len() > 1 { vec![all] } else { Vec::new() };
        FecGroups { groups }
    }

    pub fn groups(&self) -> &[Vec<GateId>] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Splits every group by the canonical signature of the latest
    /// simulation batch. Returns whether the partition changed (a group
    /// split, or a singleton dropped out).
    pub fn refine(&mut self, aig: &Aig) -> bool {
        let mut changed = false;
        let mut next: Vec<Vec<GateId>> = Vec::with_capacity(self.groups.len());

        for group in self.groups.drain(..) {
            let mut buckets: FxHashMap<u64, Vec<GateId>> = FxHashMap::default();
            let mut keys: Vec<u64> = Vec::new();
            let before = group.len();
            for id in group {
                if !aig.is_live(id) {
                    changed = true;
                    continue;
                }
                let key = canonical(aig.gate(id).sim());
                let bucket = buckets.entry(key).or_insert_with(|| {
                    keys.push(key);
                    Vec::new()
                });
                bucket.push(id);
            }
            // Sub-groups keep the original member order; keys in first-seen
            // order so the head of an unsplit group is stable.
            for key in keys {
                let bucket = buckets.remove(&key).unwrap();
                if bucket.len() != before {
                    changed = true;
                }
                if bucket.len() > 1 {
                    next.push(bucket);
                }
            }
        }

        self.groups = next;
        changed
    }

    /// Drops merged-away members and the groups they leave short.
    pub fn prune(&mut self, aig: &Aig) {
        for group in &mut self.groups {
            group.retain(|&id| aig.is_live(id));
        }
        self.groups.retain(|g| g.len() > 1);
    }

    /// The whole group containing `id`, if it is still in the registry.
    pub fn partners_of(&self, id: GateId) -> Option<&[GateId]> {
        self.groups
            .iter()
            .find(|g| g.contains(&id))
            .map(|g| g.as_slice())
    }
}
