//! Structural hashing: [`Aig::strash`] merges and gates that share the same
//! operand pair (operand order ignored) into the earliest-created one.

use rustc_hash::FxHashMap;

use crate::{Aig, GateId, Result};

impl Aig {
    /// Structural hashing of the whole circuit.
    ///
    /// And gates are visited in topological order, keyed by their unordered
    /// operand literal pair. The earliest-created gate (lowest id) with a
    /// given key survives; every duplicate is merged into it, never
    /// complemented since the functions are identical by construction.
    /// Merging a gate that was already hashed re-keys its consumers behind
    /// the scan, so passes repeat until one performs no merge: a fresh call
    /// on an already-hashed circuit merges nothing. Returns the total number
    /// of gates merged away.
    pub fn strash(&mut self) -> Result<usize> {
        let mut merged = 0;
        loop {
            self.rebuild_order();
            let mut table: FxHashMap<(u64, u64), GateId> = FxHashMap::default();
            let mut pass = 0;

            for id in self.order.clone() {
                let g = match self.get(id) {
                    Some(g) if g.is_and() => g,
                    _ => continue,
                };
                let (a, b) = (g.fanins[0].literal(), g.fanins[1].literal());
                let key = (a.min(b), a.max(b));
                match table.get(&key) {
                    None => {
                        table.insert(key, id);
                    }
                    Some(&seen) => {
                        let (old, new) = if seen < id { (id, seen) } else { (seen, id) };
                        table.insert(key, new);
                        log::debug!("strash: merging gate {old} into {new}");
                        self.merge(old, new, false)?;
                        pass += 1;
                    }
                }
            }

            merged += pass;
            if pass == 0 {
                break;
            }
        }
        log::info!("strash: merged {merged} gates");
        Ok(merged)
    }
}

#[cfg(test)]
mod test {
    use crate::{Aig, GateEdge};

    #[test]
    fn merges_duplicates_with_swapped_operands() {
        let mut aig = Aig::new();
        aig.add_input(1, 2).unwrap();
        aig.add_input(2, 3).unwrap();
        aig.add_and(3, GateEdge::new(1, false), GateEdge::new(2, true), 4)
            .unwrap();
        aig.add_and(4, GateEdge::new(2, true), GateEdge::new(1, false), 5)
            .unwrap();
        aig.add_and(5, GateEdge::new(3, false), GateEdge::new(4, false), 6)
            .unwrap();
        aig.add_output(GateEdge::new(5, false), 7).unwrap();

        assert_eq!(aig.strash().unwrap(), 1);
        assert!(aig.is_live(3));
        assert!(!aig.is_live(4));
        // Gate 5 now ands gate 3 with itself.
        assert_eq!(aig.gate(5).fanins()[0].gate(), 3);
        assert_eq!(aig.gate(5).fanins()[1].gate(), 3);
        assert!(aig.check_integrity().is_ok());
    }

    #[test]
    fn collapses_duplicate_chains_in_one_pass() {
        // Two copies of a two-level chain: merging the bottom pair makes the
        // top pair structurally identical in turn.
        let mut aig = Aig::new();
        aig.add_input(1, 2).unwrap();
        aig.add_input(2, 3).unwrap();
        aig.add_and(3, GateEdge::new(1, false), GateEdge::new(2, false), 4)
            .unwrap();
        aig.add_and(4, GateEdge::new(1, false), GateEdge::new(2, false), 5)
            .unwrap();
        aig.add_and(5, GateEdge::new(3, true), GateEdge::new(1, false), 6)
            .unwrap();
        aig.add_and(6, GateEdge::new(4, true), GateEdge::new(1, false), 7)
            .unwrap();
        aig.add_and(7, GateEdge::new(5, false), GateEdge::new(6, false), 8)
            .unwrap();
        aig.add_output(GateEdge::new(7, false), 9).unwrap();

        assert_eq!(aig.strash().unwrap(), 2);
        assert!(!aig.is_live(4));
        assert!(!aig.is_live(6));
        // The top gate ands the surviving copy with itself.
        assert_eq!(aig.gate(7).fanins()[0].gate(), 5);
        assert_eq!(aig.gate(7).fanins()[1].gate(), 5);
        assert!(aig.check_integrity().is_ok());
    }

    #[test]
    fn rekeyed_consumers_still_collapse() {
        // Gate 4 duplicates gate 3 but sits in the first output's cone, so
        // its consumer (gate 5) is hashed before 3 is even seen. Merging 4
        // into the lower id re-keys 5 behind the scan, making it a duplicate
        // of 6; everything must still be collapsed, and a second call must
        // merge nothing.
        let mut aig = Aig::new();
        aig.add_input(1, 2).unwrap();
        aig.add_input(2, 3).unwrap();
        aig.add_and(3, GateEdge::new(1, false), GateEdge::new(2, false), 4)
            .unwrap();
        aig.add_and(4, GateEdge::new(1, false), GateEdge::new(2, false), 5)
            .unwrap();
        aig.add_and(5, GateEdge::new(4, false), GateEdge::new(1, true), 6)
            .unwrap();
        aig.add_and(6, GateEdge::new(3, false), GateEdge::new(1, true), 7)
            .unwrap();
        aig.add_output(GateEdge::new(5, false), 8).unwrap();
        aig.add_output(GateEdge::new(6, false), 9).unwrap();
        aig.add_output(GateEdge::new(3, false), 10).unwrap();

        assert_eq!(aig.strash().unwrap(), 2);
        assert!(aig.is_live(3));
        assert!(aig.is_live(5));
        assert!(!aig.is_live(4));
        assert!(!aig.is_live(6));
        assert_eq!(aig.strash().unwrap(), 0);
        assert!(aig.check_integrity().is_ok());
    }

    #[test]
    fn idempotent() {
        let mut aig = Aig::from_str_ascii("aag 3 2 0 1 1\n2\n4\n6\n6 2 4\n").unwrap();
        assert_eq!(aig.strash().unwrap(), 0);
        assert_eq!(aig.strash().unwrap(), 0);
    }
}
