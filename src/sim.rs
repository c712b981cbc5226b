//! Bit-parallel simulation: 64 input patterns per pass.
//!
//! Every gate carries the 64 results of the latest batch in its `sim` word.
//! [`Aig::random_sim`] drives the initial equivalence-class partition,
//! [`Aig::file_sim`] replays explicit pattern strings and can record a trace.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{Aig, GateEdge, GateKind, PatternError, Result, fec::FecGroups};

impl Aig {
    fn fanin_word(&self, e: GateEdge) -> u64 {
        let v = self.gate(e.gate).sim;
        if e.complement { !v } else { v }
    }

    /// Evaluates one 64-pattern batch over the current topological order.
    ///
    /// Input words must have been set beforehand; undefined placeholders
    /// contribute the all-zero word.
    pub fn simulate(&mut self) {
        for id in self.order.clone() {
            let word = match self.gate(id).kind {
                GateKind::Const0 | GateKind::Input | GateKind::Undef => continue,
                GateKind::Output => self.fanin_word(self.gate(id).fanins[0]),
                GateKind::And => {
                    let g = self.gate(id);
                    let (f0, f1) = (g.fanins[0], g.fanins[1]);
                    self.fanin_word(f0) & self.fanin_word(f1)
                }
            };
            self.gate_mut(id).sim = word;
        }
    }

    /// Sets one simulation word per primary input, in input order.
    pub(crate) fn set_input_words(&mut self, words: &[u64]) {
        debug_assert_eq!(words.len(), self.inputs.len());
        for (&id, &w) in self.inputs.clone().iter().zip(words) {
            self.gate_mut(id).sim = w;
        }
    }

    /// Random-pattern simulation refining `fecs` along the way.
    ///
    /// The round budget scales with circuit size: one round per gate for
    /// small circuits, roughly the square root of the gate count for large
    /// ones. Stops early the first time a round fails to change the
    /// partition. Returns the number of patterns simulated.
    pub fn random_sim(&mut self, fecs: &mut FecGroups, seed: u64) -> usize {
        let n = self.order.len();
        let rounds = if n < 100 {
            n.max(1)
        } else {
            10.max((n as f64).sqrt().round() as usize)
        };

        let mut rng = StdRng::seed_from_u64(seed);
        let mut simulated = 0;
        for _ in 0..rounds {
            let words: Vec<u64> = self.inputs.iter().map(|_| rng.r#gen()).collect();
            self.set_input_words(&words);
            self.simulate();
            simulated += 64;
            if !fecs.refine(self) {
                break;
            }
        }
        log::info!(
            "sim: {simulated} random patterns, {} candidate groups left",
            fecs.len()
        );
        simulated
    }

    /// Replays explicit patterns, one `0`/`1` string per primary input line.
    ///
    /// The whole batch is validated first: a wrong-width or non-binary
    /// pattern rejects everything and leaves simulation state untouched.
    /// When `trace` is given, one line per pattern is appended: the pattern,
    /// a space, then one character per primary output. Returns the number of
    /// patterns simulated.
    pub fn file_sim(
        &mut self,
        patterns: &str,
        fecs: &mut FecGroups,
        mut trace: Option<&mut String>,
    ) -> Result<usize> {
        let expected = self.inputs.len();
        let mut parsed: Vec<Vec<bool>> = Vec::new();
        for line in patterns.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            // Blank lines are skipped, so the pattern ordinal is counted,
            // not the line number.
            let index = parsed.len();
            if line.len() != expected {
                return Err(PatternError::LengthMismatch {
                    index,
                    found: line.len(),
                    expected,
                }
                .into());
            }
            let mut bits = Vec::with_capacity(expected);
            for c in line.chars() {
                match c {
                    '0' => bits.push(false),
                    '1' => bits.push(true),
                    _ => return Err(PatternError::NonBinary { index, found: c }.into()),
                }
            }
            parsed.push(bits);
        }

        for window in parsed.chunks(64) {
            let mut words = vec![0u64; expected];
            for (k, bits) in window.iter().enumerate() {
                for (i, &b) in bits.iter().enumerate() {
                    if b {
                        words[i] |= 1 << k;
                    }
                }
            }
            self.set_input_words(&words);
            self.simulate();
            fecs.refine(self);

            if let Some(out) = trace.as_mut() {
                for (k, bits) in window.iter().enumerate() {
                    for &b in bits {
                        out.push(if b { '1' } else { '0' });
                    }
                    out.push(' ');
                    for &po in &self.outputs {
                        let bit = self.gate(po).sim >> k & 1;
                        out.push(if bit == 1 { '1' } else { '0' });
                    }
                    out.push('\n');
                }
            }
        }
        log::info!("sim: {} file patterns simulated", parsed.len());
        Ok(parsed.len())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{AigError, GateEdge};

    /// s = x ^ y, c = x & y.
    fn half_adder() -> Aig {
        let mut aig = Aig::new();
        aig.add_input(1, 2).unwrap();
        aig.add_input(2, 3).unwrap();
        aig.add_and(3, GateEdge::new(1, false), GateEdge::new(2, false), 4)
            .unwrap();
        aig.add_and(4, GateEdge::new(1, true), GateEdge::new(2, true), 5)
            .unwrap();
        aig.add_and(5, GateEdge::new(3, true), GateEdge::new(4, true), 6)
            .unwrap();
        aig.add_output(GateEdge::new(5, false), 7).unwrap(); // sum
        aig.add_output(GateEdge::new(3, false), 8).unwrap(); // carry
        aig.rebuild_order();
        aig
    }

    #[test]
    fn simulate_truth_table() {
        let mut aig = half_adder();
        // Patterns 0..3: (x, y) = (0,0), (1,0), (0,1), (1,1).
        aig.set_input_words(&[0b1010, 0b1100]);
        aig.simulate();
        assert_eq!(aig.gate(3).sim() & 0b1111, 0b1000); // x & y
        assert_eq!(aig.gate(5).sim() & 0b1111, 0b0110); // x ^ y
        let sum = aig.outputs()[0];
        assert_eq!(aig.gate(sum).sim() & 0b1111, 0b0110);
    }

    #[test]
    fn random_sim_refines_partition() {
        let mut aig = half_adder();
        let mut fecs = FecGroups::init(&aig);
        assert_eq!(fecs.len(), 1);
        let simulated = aig.random_sim(&mut fecs, 0xf1ae);
        assert!(simulated >= 64);
        // The three and gates compute three distinct functions, none equal
        // or complementary to another or to the constant.
        assert!(fecs.is_empty());
    }

    #[test]
    fn single_and_truth_table() {
        let mut aig = Aig::from_str_ascii("aag 3 2 0 1 1\n2\n4\n6\n6 2 4\n").unwrap();
        let mut fecs = FecGroups::init(&aig);
        let mut trace = String::new();
        aig.file_sim("00\n01\n10\n11\n", &mut fecs, Some(&mut trace))
            .unwrap();
        assert_eq!(trace, "00 0\n01 0\n10 0\n11 1\n");
    }

    #[test]
    fn file_sim_with_trace() {
        let mut aig = half_adder();
        let mut fecs = FecGroups::init(&aig);
        let mut trace = String::new();
        let n = aig
            .file_sim("00\n10\n01\n11\n", &mut fecs, Some(&mut trace))
            .unwrap();
        assert_eq!(n, 4);
        // Outputs are (sum, carry).
        assert_eq!(trace, "00 00\n10 10\n01 10\n11 01\n");
    }

    #[test]
    fn file_sim_rejects_bad_batches() {
        let mut aig = half_adder();
        let mut fecs = FecGroups::init(&aig);
        aig.set_input_words(&[7, 7]);

        // Blank lines do not shift the reported pattern index.
        let err = aig.file_sim("00\n\n101\n", &mut fecs, None).unwrap_err();
        assert!(matches!(
            err,
            AigError::PatternError(PatternError::LengthMismatch {
                index: 1,
                found: 3,
                expected: 2
            })
        ));
        let err = aig.file_sim("00\n\n\n1x\n", &mut fecs, None).unwrap_err();
        assert!(matches!(
            err,
            AigError::PatternError(PatternError::NonBinary { index: 1, found: 'x' })
        ));
        // Rejected whole: input words untouched.
        assert_eq!(aig.gate(1).sim(), 7);
    }
}
