//! Emitter for the ASCII AIGER subset (`aag`, combinational only).
//!
//! [`Aig::to_ascii`] serializes the whole circuit; [`Aig::write_gate`]
//! extracts the fanin cone of a single and gate as a standalone circuit.

use std::{fs::File, io::Write, path::Path};

use crate::{
    Aig, GateId, Result,
    aig::error::{AigError, ParseError},
};

impl Aig {
    /// Serializes the circuit back to `aag` text.
    ///
    /// Only and gates reachable from a primary output are emitted, in
    /// topological order, so the result is accepted by [`Aig::from_str_ascii`]
    /// without forward references. Captured symbol records are echoed as is.
    pub fn to_ascii(&self) -> String {
        let ands: Vec<GateId> = self
            .order
            .iter()
            .copied()
            .filter(|&id| self.gate(id).is_and())
            .collect();

        let mut out = format!(
            "aag {} {} 0 {} {}\n",
            self.max_var,
            self.inputs.len(),
            self.outputs.len(),
            ands.len()
        );
        for &id in &self.inputs {
            out.push_str(&format!("{}\n", 2 * id));
        }
        for &po in &self.outputs {
            out.push_str(&format!("{}\n", self.gate(po).fanins[0].literal()));
        }
        for &id in &ands {
            let g = self.gate(id);
            out.push_str(&format!(
                "{} {} {}\n",
                g.literal(),
                g.fanins[0].literal(),
                g.fanins[1].literal()
            ));
        }
        for line in &self.symbol_lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("c\n");
        out
    }

    /// Writes the circuit to an `.aag` file on disk.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut f = File::create(path.as_ref()).map_err(|e| ParseError::Io(e.to_string()))?;
        f.write_all(self.to_ascii().as_bytes())
            .map_err(|e| ParseError::Io(e.to_string()))?;
        Ok(())
    }

    /// Serializes the fanin cone of the and gate `root` as a standalone
    /// circuit with a single output.
    ///
    /// Primary inputs reached by the cone become the inputs of the extracted
    /// circuit (named symbols are kept); variable indices are preserved, so
    /// the header's variable count is the largest id in the cone.
    pub fn write_gate(&mut self, root: GateId) -> Result<String> {
        let kind = match self.get(root) {
            None => return Err(AigError::GateDoesNotExist(root)),
            Some(g) => g.kind,
        };
        if !matches!(kind, crate::GateKind::And) {
            return Err(AigError::BadGateKind(kind.type_str()));
        }

        // Post-order cone walk, stamping visited gates.
        let stamp = self.bump_stamp();
        let mut cone_inputs: Vec<GateId> = Vec::new();
        let mut cone_ands: Vec<GateId> = Vec::new();
        let mut stack: Vec<(GateId, bool)> = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                cone_ands.push(id);
                continue;
            }
            if self.is_stamped(id, stamp) {
                continue;
            }
            self.set_stamp(id, stamp);
            match self.gate(id).kind {
                crate::GateKind::Input => {
                    cone_inputs.push(id);
                    continue;
                }
                crate::GateKind::And => (),
                _ => continue,
            }
            stack.push((id, true));
            let fanins: Vec<GateId> = self.gate(id).fanins.iter().rev().map(|e| e.gate).collect();
            for f in fanins {
                if !self.is_stamped(f, stamp) {
                    stack.push((f, false));
                }
            }
        }
        cone_inputs.sort_unstable();

        let max_var = cone_ands
            .iter()
            .chain(cone_inputs.iter())
            .copied()
            .max()
            .unwrap_or(0);
        let mut out = format!("aag {} {} 0 1 {}\n", max_var, cone_inputs.len(), cone_ands.len());
        for &id in &cone_inputs {
            out.push_str(&format!("{}\n", 2 * id));
        }
        out.push_str(&format!("{}\n", 2 * root));
        for &id in &cone_ands {
            let g = self.gate(id);
            out.push_str(&format!(
                "{} {} {}\n",
                g.literal(),
                g.fanins[0].literal(),
                g.fanins[1].literal()
            ));
        }
        for (k, &id) in cone_inputs.iter().enumerate() {
            if let Some(name) = self.gate(id).symbol() {
                out.push_str(&format!("i{k} {name}\n"));
            }
        }
        out.push_str("c\n");
        Ok(out)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::GateEdge;

    const HALF_ADDER: &str = "\
aag 7 2 0 2 3
2
4
6
12
6 13 15
12 2 4
14 3 5
i0 x
i1 y
o0 s
o1 c
c
half adder comment
";

    #[test]
    fn round_trip_preserves_structure() {
        let aig = Aig::from_str_ascii(HALF_ADDER).unwrap();
        let text = aig.to_ascii();
        let again = Aig::from_str_ascii(&text).unwrap();

        assert_eq!(again.inputs(), aig.inputs());
        assert_eq!(again.outputs().len(), aig.outputs().len());
        for g in aig.live_gates().filter(|g| g.is_and()) {
            assert_eq!(again.gate(g.id()).fanins(), g.fanins());
        }
        // Symbols survive the round trip, the comment section does not.
        assert_eq!(again.gate(1).symbol(), Some("x"));
        assert!(text.ends_with("c\n"));
    }

    #[test]
    fn to_ascii_skips_dangling_ands() {
        let mut aig = Aig::new();
        aig.add_input(1, 2).unwrap();
        aig.add_and(2, GateEdge::new(1, false), GateEdge::new(1, true), 3)
            .unwrap();
        aig.add_and(3, GateEdge::new(1, false), GateEdge::new(1, false), 4)
            .unwrap();
        aig.add_output(GateEdge::new(2, false), 5).unwrap();
        aig.rebuild_order();

        let text = aig.to_ascii();
        assert!(text.starts_with("aag 3 1 0 1 1\n"));
        assert!(!text.contains("6 2 2"));
    }

    #[test]
    fn write_gate_extracts_cone() {
        let mut aig = Aig::from_str_ascii(HALF_ADDER).unwrap();
        // Gate 6 (var 6) is the sum xor, its cone covers everything.
        let text = aig.write_gate(3).unwrap();
        let cone = Aig::from_str_ascii(&text).unwrap();
        assert_eq!(cone.outputs().len(), 1);
        assert_eq!(cone.inputs(), &[1, 2]);
        assert_eq!(cone.gate(1).symbol(), Some("x"));

        assert!(aig.write_gate(1).is_err()); // not an and gate
        assert!(aig.write_gate(99).is_err());
    }
}
