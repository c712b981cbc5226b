//! Human-readable views of the circuit, returned as `String`s.

use rustc_hash::FxHashSet;

use crate::{Aig, AigError, GateId, GateKind, Result, fec::FecGroups};

impl Aig {
    /// Gate counts per kind.
    pub fn summary(&self) -> String {
        let mut pi = 0;
        let mut po = 0;
        let mut ands = 0;
        for g in self.live_gates() {
            match g.kind() {
                GateKind::Input => pi += 1,
                GateKind::Output => po += 1,
                GateKind::And => ands += 1,
                _ => (),
            }
        }
        let mut out = String::new();
        out.push_str("Circuit Statistics\n");
        out.push_str("==================\n");
        out.push_str(&format!("  PI   {pi:>7}\n"));
        out.push_str(&format!("  PO   {po:>7}\n"));
        out.push_str(&format!("  AIG  {ands:>7}\n"));
        out.push_str("------------------\n");
        out.push_str(&format!("  Total{:>7}\n", pi + po + ands));
        out
    }

    /// The circuit in topological order, one gate per line.
    ///
    /// Fanin edges print `!` when inverted and `*` when the operand is an
    /// undefined placeholder; symbols follow in parentheses.
    pub fn netlist(&self) -> String {
        let mut out = String::new();
        for (i, &id) in self.order.iter().enumerate() {
            let g = self.gate(id);
            let mut line = format!("[{i}] {:<5} {}", g.kind().type_str(), id);
            for e in g.fanins() {
                let target = self.gate(e.gate());
                line.push(' ');
                if e.complement() {
                    line.push('!');
                }
                if target.is_undef() {
                    line.push('*');
                }
                line.push_str(&e.gate().to_string());
            }
            if let Some(name) = g.symbol() {
                line.push_str(&format!(" ({name})"));
            }
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    pub fn report_inputs(&self) -> String {
        let ids: Vec<String> = self.inputs.iter().map(|id| id.to_string()).collect();
        format!("PIs of the circuit: {}\n", ids.join(" "))
    }

    pub fn report_outputs(&self) -> String {
        let ids: Vec<String> = self.outputs.iter().map(|id| id.to_string()).collect();
        format!("POs of the circuit: {}\n", ids.join(" "))
    }

    /// Floating-fanin gates and defined-but-unused gates, sorted by id.
    pub fn report_floating(&self) -> String {
        let mut floating: Vec<GateId> = self
            .live_gates()
            .filter(|g| g.fanins().iter().any(|e| self.gate(e.gate()).is_undef()))
            .map(|g| g.id())
            .collect();
        floating.sort_unstable();

        let mut unused: Vec<GateId> = self
            .live_gates()
            .filter(|g| g.fanouts().is_empty() && matches!(g.kind(), GateKind::Input | GateKind::And))
            .map(|g| g.id())
            .collect();
        unused.sort_unstable();

        let mut out = String::new();
        if !floating.is_empty() {
            let ids: Vec<String> = floating.iter().map(|id| id.to_string()).collect();
            out.push_str(&format!("Gates with floating fanin(s): {}\n", ids.join(" ")));
        }
        if !unused.is_empty() {
            let ids: Vec<String> = unused.iter().map(|id| id.to_string()).collect();
            out.push_str(&format!("Gates defined but not used  : {}\n", ids.join(" ")));
        }
        out
    }

    /// The candidate equivalence groups, `!` marking members whose raw
    /// signature is the complement of the group head's.
    pub fn report_fecs(&self, fecs: &FecGroups) -> String {
        let mut out = String::new();
        for (k, group) in fecs.groups().iter().enumerate() {
            let mut head_sim = None;
            let mut line = format!("[{k}]");
            for &id in group {
                let Some(g) = self.get(id) else { continue };
                let head = *head_sim.get_or_insert(g.sim());
                line.push(' ');
                if g.sim() != head {
                    line.push('!');
                }
                line.push_str(&id.to_string());
            }
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    /// Everything known about one gate: kind, symbol, source line, current
    /// equivalence groupmates and the latest simulation word.
    pub fn report_gate(&self, id: GateId, fecs: &FecGroups) -> Result<String> {
        let g = self.get(id).ok_or(AigError::GateDoesNotExist(id))?;
        let rule = "=".repeat(64);
        let mut out = format!("{rule}\n");
        let name = match g.symbol() {
            Some(s) => format!("\"{s}\""),
            None => String::new(),
        };
        out.push_str(&format!("= {}({}){}, line {}\n", g.kind().type_str(), id, name, g.line()));

        let mut partners = String::new();
        if let Some(group) = fecs.partners_of(id) {
            let my_sim = g.sim();
            for &p in group {
                let Some(partner) = self.get(p) else { continue };
                if p == id {
                    continue;
                }
                partners.push(' ');
                if partner.sim() != my_sim {
                    partners.push('!');
                }
                partners.push_str(&p.to_string());
            }
        }
        out.push_str(&format!("= FECs:{partners}\n"));
        out.push_str(&format!("= Value: {}\n", format_sim(g.sim())));
        out.push_str(&format!("{rule}\n"));
        Ok(out)
    }

    /// The fanin tree of `id` down to `levels`, two spaces of indent per
    /// level. A gate expanded once earlier prints `(*)` instead of its
    /// subtree again.
    pub fn report_fanin(&self, id: GateId, levels: usize) -> Result<String> {
        self.report_tree(id, levels, true)
    }

    /// The fanout tree of `id` up to `levels`, same conventions as
    /// [`Aig::report_fanin`].
    pub fn report_fanout(&self, id: GateId, levels: usize) -> Result<String> {
        self.report_tree(id, levels, false)
    }

    fn report_tree(&self, root: GateId, levels: usize, fanin: bool) -> Result<String> {
        if !self.is_live(root) {
            return Err(AigError::GateDoesNotExist(root));
        }
        let mut out = String::new();
        let mut expanded: FxHashSet<GateId> = FxHashSet::default();
        // (gate, edge inversion, remaining levels, indent)
        let mut stack: Vec<(GateId, bool, usize, usize)> = vec![(root, false, levels, 0)];
        while let Some((id, inverted, remaining, indent)) = stack.pop() {
            let g = self.gate(id);
            out.push_str(&"  ".repeat(indent));
            if inverted {
                out.push('!');
            }
            out.push_str(&format!("{} {}", g.kind().type_str(), id));

            let neighbors: Vec<(GateId, bool)> = if fanin {
                g.fanins().iter().map(|e| (e.gate(), e.complement())).collect()
            } else {
                // One entry per consuming edge, in consumer fanin order.
                let mut seen = FxHashSet::default();
                let mut list = Vec::new();
                for &c in g.fanouts() {
                    if !seen.insert(c) {
                        continue;
                    }
                    for e in self.gate(c).fanins() {
                        if e.gate() == id {
                            list.push((c, e.complement()));
                        }
                    }
                }
                list
            };

            if remaining == 0 || neighbors.is_empty() {
                out.push('\n');
                continue;
            }
            if !expanded.insert(id) {
                out.push_str(" (*)\n");
                continue;
            }
            out.push('\n');
            for (n, inv) in neighbors.into_iter().rev() {
                stack.push((n, inv, remaining - 1, indent + 1));
            }
        }
        Ok(out)
    }
}

/// The 64 bits of a simulation word, oldest pattern last, grouped by eight.
fn format_sim(sim: u64) -> String {
    let bits: String = (0..64).rev().map(|k| if sim >> k & 1 == 1 { '1' } else { '0' }).collect();
    bits.as_bytes()
        .chunks(8)
        .map(|c| std::str::from_utf8(c).unwrap())
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::GateEdge;

    fn sample() -> Aig {
        Aig::from_str_ascii("aag 4 2 0 1 2\n2\n4\n8\n6 2 4\n8 6 3\ni0 x\no0 out\n").unwrap()
    }

    #[test]
    fn summary_counts() {
        let aig = sample();
        let s = aig.summary();
        let count = |label: &str| {
            s.lines()
                .find(|l| l.trim_start().starts_with(label))
                .and_then(|l| l.split_whitespace().last())
                .unwrap()
                .to_string()
        };
        assert_eq!(count("PI"), "2");
        assert_eq!(count("PO"), "1");
        assert_eq!(count("AIG"), "2");
        assert_eq!(count("Total"), "5");
    }

    #[test]
    fn netlist_marks_inversions() {
        let mut aig = Aig::new();
        aig.add_input(1, 2).unwrap();
        aig.add_undef(2).unwrap();
        aig.add_and(3, GateEdge::new(1, true), GateEdge::new(2, false), 3)
            .unwrap();
        aig.add_output(GateEdge::new(3, false), 4).unwrap();
        aig.rebuild_order();

        let n = aig.netlist();
        assert!(n.contains("AIG   3 !1 *2"));
        assert!(n.contains("PI    1"));
    }

    #[test]
    fn floating_diagnostics() {
        // Gate 4 ands gate 3 with the undefined variable 4 (literal 9); the
        // second input y is defined but drives nothing.
        let aig = Aig::from_str_ascii("aag 5 2 0 1 2\n2\n4\n6\n6 2 2\n8 6 11\n").unwrap();
        let report = aig.report_floating();
        assert!(report.contains("floating fanin(s): 4\n"));
        assert!(report.contains("not used  : 2 4\n"));
    }

    #[test]
    fn gate_report_shows_fec_partners() {
        let mut aig = sample();
        let mut fecs = FecGroups::init(&aig);
        // Give 3 and 4 complementary signatures so they stay grouped.
        aig.gate_mut(3).sim = 0b0110;
        aig.gate_mut(4).sim = !0b0110;
        aig.gate_mut(0).sim = 1;
        fecs.refine(&aig);

        let report = aig.report_gate(3, &fecs).unwrap();
        assert!(report.contains("= AIG(3), line 5"));
        assert!(report.contains("= FECs: !4"));
        assert!(report.contains("00000000_00000000_00000000_00000000_00000000_00000000_00000000_00000110"));
        assert!(aig.report_gate(99, &fecs).is_err());
    }

    #[test]
    fn fanin_tree_marks_revisits() {
        // g4 = g3 & !g3 style sharing so gate 3 is expanded twice.
        let mut aig = Aig::new();
        aig.add_input(1, 2).unwrap();
        aig.add_input(2, 3).unwrap();
        aig.add_and(3, GateEdge::new(1, false), GateEdge::new(2, false), 4)
            .unwrap();
        aig.add_and(4, GateEdge::new(3, false), GateEdge::new(3, true), 5)
            .unwrap();
        aig.add_output(GateEdge::new(4, false), 6).unwrap();
        aig.rebuild_order();

        let tree = aig.report_fanin(4, 2).unwrap();
        let expected = "\
AIG 4
  AIG 3
    PI 1
    PI 2
  !AIG 3 (*)
";
        assert_eq!(tree, expected);

        let up = aig.report_fanout(3, 1).unwrap();
        assert!(up.starts_with("AIG 3\n"));
        assert!(up.contains("  AIG 4\n"));
        assert!(up.contains("  !AIG 4\n"));
    }
}
