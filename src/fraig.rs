//! Functional reduction: SAT-backed merging of equivalence candidates.
//!
//! [`Aig::fraig`] partitions the circuit by random simulation, then walks
//! the candidate groups pairing each gate against its group head. Proven
//! pairs are merged on the spot; refuted pairs hand their distinguishing
//! input assignment to a counter-example buffer, which periodically
//! resimulates to split the remaining groups further.

use crate::{
    Aig, GateId, Result,
    cnf::{ProofModel, ProofOutcome},
    fec::FecGroups,
};

/// Totals of one [`Aig::fraig`] pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FraigSummary {
    /// Gates merged away.
    pub merged: u64,
    /// SAT queries issued.
    pub sat_calls: u64,
    /// Queries answered "equivalent".
    pub proven: u64,
    /// Queries answered with a counter-example.
    pub refuted: u64,
    /// Simulation patterns evaluated (random and counter-example driven).
    pub patterns: u64,
}

/// Accumulates up to 64 counter-example assignments, one bit position each.
struct CexBuffer {
    words: Vec<u64>,
    count: usize,
}

impl CexBuffer {
    fn new(n_inputs: usize) -> Self {
        CexBuffer {
            words: vec![0; n_inputs],
            count: 0,
        }
    }

    fn push(&mut self, pattern: &[bool]) {
        debug_assert_eq!(pattern.len(), self.words.len());
        debug_assert!(self.count < 64);
        for (w, &b) in self.words.iter_mut().zip(pattern) {
            if b {
                *w |= 1 << self.count;
            }
        }
        self.count += 1;
    }

    fn len(&self) -> usize {
        self.count
    }

    /// Hands out the batch (unused bit positions replay pattern zero) and
    /// resets the buffer.
    fn take(&mut self) -> Option<Vec<u64>> {
        if self.count == 0 {
            return None;
        }
        self.count = 0;
        let empty = vec![0; self.words.len()];
        Some(std::mem::replace(&mut self.words, empty))
    }
}

impl Aig {
    /// One full functional-reduction pass.
    ///
    /// `seed` fixes the random patterns driving the initial partition, so a
    /// pass is reproducible. On return the candidate registry has been
    /// worked down to empty (or until neither merging nor refinement makes
    /// progress), the topological order is rebuilt and depths are current.
    pub fn fraig(&mut self, seed: u64) -> Result<FraigSummary> {
        self.rebuild_order();
        let mut summary = FraigSummary::default();
        let mut fecs = FecGroups::init(self);
        summary.patterns += self.random_sim(&mut fecs, seed) as u64;

        self.update_depths();
        let mut model = ProofModel::new(self);
        let batch = resim_batch(self.order.len());
        let mut cexs = CexBuffer::new(self.inputs.len());

        while !fecs.is_empty() {
            let groups = self.sorted_groups(&fecs);

            let mut merged_this_round = 0u64;
            let mut resimulated = false;
            'sweep: for group in groups {
                let sat_budget = 1.max(group.len() / 2);
                let mut sats = 0;
                let mut head = group[0];
                for &cand in &group[1..] {
                    if !self.is_live(cand) {
                        continue;
                    }
                    if !self.is_live(head) {
                        head = cand;
                        continue;
                    }
                    let complement = self.gate(head).sim() != self.gate(cand).sim();
                    summary.sat_calls += 1;
                    match model.prove(self, head, cand, complement)? {
                        ProofOutcome::Equivalent => {
                            summary.proven += 1;
                            // The shallower gate survives; redirecting the
                            // other way round could make a gate its own
                            // ancestor.
                            let (old, new) = if self.gate(head).depth() <= self.gate(cand).depth()
                            {
                                (cand, head)
                            } else {
                                (head, cand)
                            };
                            log::debug!(
                                "fraig: merging gate {old} into {}{new}",
                                if complement { "!" } else { "" }
                            );
                            self.merge(old, new, complement)?;
                            head = new;
                            summary.merged += 1;
                            merged_this_round += 1;
                        }
                        ProofOutcome::CounterExample(pattern) => {
                            summary.refuted += 1;
                            sats += 1;
                            cexs.push(&pattern);
                        }
                    }
                    if cexs.len() >= batch {
                        resimulated |= self.resimulate(&mut cexs, &mut fecs, &mut summary);
                        // The registry changed shape: rebuild the snapshot.
                        break 'sweep;
                    }
                    if sats >= sat_budget {
                        break;
                    }
                }
            }

            resimulated |= self.resimulate(&mut cexs, &mut fecs, &mut summary);
            fecs.prune(self);
            if merged_this_round == 0 && !resimulated {
                log::warn!("fraig: {} groups left unresolved", fecs.len());
                break;
            }
        }

        self.rebuild_order();
        self.update_depths();
        log::info!(
            "fraig: {} gates merged, {} sat calls ({} proven, {} refuted), {} patterns",
            summary.merged,
            summary.sat_calls,
            summary.proven,
            summary.refuted,
            summary.patterns
        );
        Ok(summary)
    }

    /// The registry snapshot, heaviest groups first (descending sum of
    /// member depths); the stable sort keeps arrival order among ties.
    fn sorted_groups(&self, fecs: &FecGroups) -> Vec<Vec<GateId>> {
        let mut groups = fecs.groups().to_vec();
        groups.sort_by_key(|g| std::cmp::Reverse(self.depth_sum(g)));
        groups
    }

    fn depth_sum(&self, group: &[GateId]) -> u64 {
        group
            .iter()
            .filter_map(|&id| self.get(id))
            .map(|g| g.depth())
            .sum()
    }

    /// Replays the buffered counter-examples and refines the partition.
    fn resimulate(
        &mut self,
        cexs: &mut CexBuffer,
        fecs: &mut FecGroups,
        summary: &mut FraigSummary,
    ) -> bool {
        match cexs.take() {
            None => false,
            Some(words) => {
                self.set_input_words(&words);
                self.simulate();
                summary.patterns += 64;
                fecs.prune(self);
                fecs.refine(self)
            }
        }
    }
}

/// Counter-examples buffered before a resimulation is forced.
fn resim_batch(n: usize) -> usize {
    64.min(10.max(((n as f64).sqrt() / 10.0).round() as usize))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::GateEdge;

    #[test]
    fn resim_batch_bounds() {
        assert_eq!(resim_batch(0), 10);
        assert_eq!(resim_batch(10_000), 10);
        assert_eq!(resim_batch(1_000_000), 64);
    }

    #[test]
    fn cex_buffer_packs_bits() {
        let mut buf = CexBuffer::new(2);
        buf.push(&[true, false]);
        buf.push(&[true, true]);
        assert_eq!(buf.len(), 2);
        let words = buf.take().unwrap();
        assert_eq!(words, vec![0b11, 0b10]);
        assert_eq!(buf.len(), 0);
        assert!(buf.take().is_none());
    }

    #[test]
    fn groups_ordered_heaviest_first_ties_by_arrival() {
        // Four depth-1 minterm gates and two depth-2 gates on top of them.
        let mut aig = Aig::new();
        aig.add_input(1, 2).unwrap();
        aig.add_input(2, 3).unwrap();
        aig.add_and(3, GateEdge::new(1, false), GateEdge::new(2, false), 4)
            .unwrap();
        aig.add_and(4, GateEdge::new(1, false), GateEdge::new(2, true), 5)
            .unwrap();
        aig.add_and(5, GateEdge::new(1, true), GateEdge::new(2, false), 6)
            .unwrap();
        aig.add_and(6, GateEdge::new(1, true), GateEdge::new(2, true), 7)
            .unwrap();
        aig.add_and(7, GateEdge::new(3, false), GateEdge::new(4, false), 8)
            .unwrap();
        aig.add_and(8, GateEdge::new(5, false), GateEdge::new(6, false), 9)
            .unwrap();
        aig.add_output(GateEdge::new(7, false), 10).unwrap();
        aig.add_output(GateEdge::new(8, false), 11).unwrap();
        aig.rebuild_order();
        aig.update_depths();

        // Signatures shaping three groups: {3,4} and {5,6} at depth sum 2,
        // {7,8} at depth sum 4, arriving in the order {3,4}, {7,8}, {5,6}.
        let mut fecs = FecGroups::init(&aig);
        for (id, sig) in [
            (0, 0),
            (3, 0b0010),
            (4, 0b0010),
            (5, 0b0100),
            (6, 0b0100),
            (7, 0b0110),
            (8, 0b0110),
        ] {
            aig.gate_mut(id).sim = sig;
        }
        fecs.refine(&aig);
        assert_eq!(
            fecs.groups().to_vec(),
            vec![vec![3, 4], vec![7, 8], vec![5, 6]]
        );

        // Heaviest first; the two equal-weight groups keep arrival order.
        let sorted = aig.sorted_groups(&fecs);
        assert_eq!(sorted, vec![vec![7, 8], vec![3, 4], vec![5, 6]]);
    }

    /// Two structurally different xor cones converge onto one.
    #[test]
    fn merges_equivalent_cones() {
        let mut aig = Aig::new();
        aig.add_input(1, 2).unwrap();
        aig.add_input(2, 3).unwrap();
        // xor as !(x & y) & !(!x & !y)
        aig.add_and(3, GateEdge::new(1, false), GateEdge::new(2, false), 4)
            .unwrap();
        aig.add_and(4, GateEdge::new(1, true), GateEdge::new(2, true), 5)
            .unwrap();
        aig.add_and(5, GateEdge::new(3, true), GateEdge::new(4, true), 6)
            .unwrap();
        // xor as (x & !y) | (!x & y), built as !(!(x & !y) & !(!x & y))
        aig.add_and(6, GateEdge::new(1, false), GateEdge::new(2, true), 7)
            .unwrap();
        aig.add_and(7, GateEdge::new(1, true), GateEdge::new(2, false), 8)
            .unwrap();
        aig.add_and(8, GateEdge::new(6, true), GateEdge::new(7, true), 9)
            .unwrap();
        aig.add_output(GateEdge::new(5, false), 10).unwrap();
        aig.add_output(GateEdge::new(8, true), 11).unwrap();

        let summary = aig.fraig(42).unwrap();

        // Gates 5 and 8 are complementary: one of them must be gone, and
        // both outputs now read the same gate.
        assert!(summary.merged >= 1);
        let po0 = aig.gate(aig.outputs()[0]).fanins()[0];
        let po1 = aig.gate(aig.outputs()[1]).fanins()[0];
        assert_eq!(po0.gate(), po1.gate());
        assert_eq!(po0.complement(), po1.complement());
        assert!(aig.check_integrity().is_ok());
    }

    /// A gate that is constant zero merges into the constant gate.
    #[test]
    fn merges_constant_gates() {
        let mut aig = Aig::new();
        aig.add_input(1, 2).unwrap();
        aig.add_input(2, 3).unwrap();
        aig.add_and(3, GateEdge::new(1, false), GateEdge::new(1, true), 4)
            .unwrap();
        aig.add_and(4, GateEdge::new(3, false), GateEdge::new(2, false), 5)
            .unwrap();
        aig.add_output(GateEdge::new(4, true), 6).unwrap();

        aig.fraig(7).unwrap();

        assert!(!aig.is_live(3));
        assert!(!aig.is_live(4));
        assert_eq!(
            aig.gate(aig.outputs()[0]).fanins()[0],
            GateEdge::new(0, true)
        );
        assert!(aig.check_integrity().is_ok());
    }
}
