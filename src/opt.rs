//! Cheap local rewrites: [`Aig::optimize`] collapses trivial and gates,
//! [`Aig::sweep`] removes everything unreachable from the primary outputs.

use crate::{Aig, GateEdge, Result};

impl Aig {
    /// One constant-and-identity propagation pass in topological order.
    ///
    /// Four rules, applied per and gate:
    /// - an operand is constant true: the gate is the other operand;
    /// - an operand is constant false: the gate is constant false;
    /// - both operands are the same edge: the gate is that edge;
    /// - the operands are complementary: the gate is constant false.
    ///
    /// Rewrites propagate within the pass (a gate collapsed to a constant
    /// is seen as such by its consumers further down the order), so a single
    /// pass reaches a fixpoint over these rules. Returns the number of gates
    /// removed.
    pub fn optimize(&mut self) -> Result<usize> {
        self.rebuild_order();
        let mut removed = 0;

        for id in self.order.clone() {
            let g = match self.get(id) {
                Some(g) if g.is_and() => g,
                _ => continue,
            };
            let (f0, f1) = (g.fanins[0], g.fanins[1]);
            let replacement = if f0.is_const_true() {
                Some(f1)
            } else if f1.is_const_true() {
                Some(f0)
            } else if f0.is_const_false() || f1.is_const_false() {
                Some(GateEdge::new(0, false))
            } else if f0 == f1 {
                Some(f0)
            } else if f0.is_complement_of(&f1) {
                Some(GateEdge::new(0, false))
            } else {
                None
            };
            if let Some(edge) = replacement {
                log::debug!(
                    "optimize: gate {id} simplified to {}{}",
                    if edge.complement() { "!" } else { "" },
                    edge.gate()
                );
                self.merge(id, edge.gate(), edge.complement())?;
                removed += 1;
            }
        }

        if removed > 0 {
            self.rebuild_order();
        }
        log::info!("optimize: removed {removed} gates");
        Ok(removed)
    }

    /// Removes every and gate unreachable from a primary output, then every
    /// undefined placeholder nothing refers to anymore. Returns the number
    /// of gates removed.
    pub fn sweep(&mut self) -> usize {
        self.rebuild_order();
        let stamp = self.bump_stamp();
        for id in self.order.clone() {
            self.set_stamp(id, stamp);
        }

        let mut removed = 0;
        let dead: Vec<_> = self
            .live_gates()
            .filter(|g| g.is_and() && g.stamp != stamp)
            .map(|g| g.id())
            .collect();
        for id in dead {
            let fanins = self.gate(id).fanins.clone();
            for e in fanins {
                if let Some(f) = self.get_mut(e.gate()) {
                    f.remove_fanouts_of(id);
                }
            }
            log::debug!("sweep: removing dangling gate {id}");
            self.gates[id as usize] = None;
            removed += 1;
        }

        let orphans: Vec<_> = self
            .live_gates()
            .filter(|g| g.is_undef() && g.fanouts.is_empty())
            .map(|g| g.id())
            .collect();
        for id in orphans {
            log::debug!("sweep: removing unused placeholder {id}");
            self.gates[id as usize] = None;
            removed += 1;
        }

        log::info!("sweep: removed {removed} gates");
        removed
    }
}

#[cfg(test)]
mod test {
    use crate::{Aig, GateEdge};

    #[test]
    fn optimize_applies_all_rules() {
        let mut aig = Aig::new();
        aig.add_input(1, 2).unwrap();
        aig.add_input(2, 3).unwrap();
        // x & 1 = x
        aig.add_and(3, GateEdge::new(1, false), GateEdge::new(0, true), 4)
            .unwrap();
        // y & 0 = 0
        aig.add_and(4, GateEdge::new(2, false), GateEdge::new(0, false), 5)
            .unwrap();
        // g3 & g3 = g3 = x (cascade within the pass)
        aig.add_and(5, GateEdge::new(3, false), GateEdge::new(3, false), 6)
            .unwrap();
        // g4 & !g4 = 0
        aig.add_and(6, GateEdge::new(5, false), GateEdge::new(5, true), 7)
            .unwrap();
        aig.add_output(GateEdge::new(5, false), 8).unwrap();
        aig.add_output(GateEdge::new(6, false), 9).unwrap();
        aig.add_output(GateEdge::new(4, true), 10).unwrap();

        assert_eq!(aig.optimize().unwrap(), 4);
        // First output collapsed all the way to the input x.
        assert_eq!(
            aig.gate(aig.outputs()[0]).fanins()[0],
            GateEdge::new(1, false)
        );
        // Second output is constant false, third constant true.
        assert_eq!(
            aig.gate(aig.outputs()[1]).fanins()[0],
            GateEdge::new(0, false)
        );
        assert_eq!(
            aig.gate(aig.outputs()[2]).fanins()[0],
            GateEdge::new(0, true)
        );
        assert!(aig.check_integrity().is_ok());
    }

    #[test]
    fn optimize_fixpoint() {
        let mut aig = Aig::from_str_ascii("aag 3 2 0 1 1\n2\n4\n6\n6 2 4\n").unwrap();
        assert_eq!(aig.optimize().unwrap(), 0);
        assert_eq!(aig.optimize().unwrap(), 0);
    }

    #[test]
    fn sweep_removes_dangling_cones() {
        let mut aig = Aig::new();
        aig.add_input(1, 2).unwrap();
        aig.add_input(2, 3).unwrap();
        aig.add_and(3, GateEdge::new(1, false), GateEdge::new(2, false), 4)
            .unwrap();
        // A dangling two-gate cone over a floating fanin.
        aig.add_undef(5).unwrap();
        aig.add_and(4, GateEdge::new(1, false), GateEdge::new(5, false), 5)
            .unwrap();
        aig.add_and(6, GateEdge::new(4, true), GateEdge::new(2, false), 6)
            .unwrap();
        aig.add_output(GateEdge::new(3, false), 7).unwrap();

        assert_eq!(aig.sweep(), 3);
        assert!(aig.is_live(3));
        assert!(!aig.is_live(4));
        assert!(!aig.is_live(5));
        assert!(!aig.is_live(6));
        // Unused inputs are kept.
        assert!(aig.is_live(1));
        assert!(aig.is_live(2));
        assert!(aig.check_integrity().is_ok());
    }

    #[test]
    fn sweep_keeps_reachable_placeholders() {
        let mut aig = Aig::from_str_ascii("aag 4 1 0 1 1\n2\n6\n6 2 8\n").unwrap();
        assert_eq!(aig.sweep(), 0);
        // The floating fanin placeholder is still referenced by gate 3.
        assert!(aig.is_live(4));
    }
}
