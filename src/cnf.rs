//! CNF encoding of the circuit for the SAT oracle.
//!
//! A [`ProofModel`] is built once from a topologically ordered circuit and
//! then queried many times: each query adds a one-shot XOR miter behind a
//! fresh indicator literal, solves under that assumption, and retires the
//! indicator afterwards so the solver state stays reusable.

use rustc_hash::{FxHashMap, FxHashSet};
use varisat::{ExtendFormula, Lit, Solver};

use crate::{Aig, AigError, GateEdge, GateId, GateKind, Result};

/// The answer to an equivalence query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofOutcome {
    /// The hypothesis holds for every input assignment.
    Equivalent,
    /// A distinguishing input assignment, one value per primary input in
    /// input order.
    CounterExample(Vec<bool>),
}

/// An incremental SAT model of the circuit.
///
/// Every reachable non-output gate gets a solver literal; and gates with two
/// encodable operands get the three Tseitin AND clauses. An and gate with an
/// undefined operand keeps its literal unconstrained. The model is valid as
/// long as queried gates and their fanin cones keep their structure; merges
/// of proven-equivalent gates do not invalidate it.
pub struct ProofModel<'s> {
    solver: Solver<'s>,
    lits: FxHashMap<GateId, Lit>,
}

impl ProofModel<'_> {
    /// Encodes the circuit's current topological order.
    pub fn new(aig: &Aig) -> Self {
        let mut solver = Solver::new();
        let mut lits: FxHashMap<GateId, Lit> = FxHashMap::default();

        let const_lit = solver.new_lit();
        solver.add_clause(&[!const_lit]);
        lits.insert(0, const_lit);

        for &id in aig.order() {
            let g = aig.gate(id);
            match g.kind() {
                GateKind::Input => {
                    lits.insert(id, solver.new_lit());
                }
                GateKind::And => {
                    let l = solver.new_lit();
                    lits.insert(id, l);
                    let a = edge_lit(&lits, g.fanins()[0]);
                    let b = edge_lit(&lits, g.fanins()[1]);
                    if let (Some(a), Some(b)) = (a, b) {
                        solver.add_clause(&[!l, a]);
                        solver.add_clause(&[!l, b]);
                        solver.add_clause(&[l, !a, !b]);
                    }
                }
                _ => (),
            }
        }

        log::debug!("cnf: encoded {} gates", lits.len());
        ProofModel { solver, lits }
    }

    /// Asks the oracle whether `a == b` (or `a == !b` when `complement`).
    ///
    /// `Equivalent` is definitive; `CounterExample` carries an input
    /// assignment under which the two sides differ.
    pub fn prove(
        &mut self,
        aig: &Aig,
        a: GateId,
        b: GateId,
        complement: bool,
    ) -> Result<ProofOutcome> {
        let la = self.gate_lit(a)?;
        let lb = self.gate_lit(b)?;
        let lb = if complement { !lb } else { lb };

        // One-shot XOR miter behind a fresh indicator.
        let ind = self.solver.new_lit();
        self.solver.add_clause(&[!ind, la, lb]);
        self.solver.add_clause(&[!ind, !la, !lb]);
        self.solver.assume(&[ind]);
        let sat = self
            .solver
            .solve()
            .map_err(|e| AigError::InvalidState(format!("solver failure: {e}")))?;

        let outcome = if !sat {
            ProofOutcome::Equivalent
        } else {
            let model = self
                .solver
                .model()
                .ok_or_else(|| AigError::InvalidState("sat without a model".to_string()))?;
            let assignment: FxHashSet<Lit> = model.into_iter().collect();
            let pattern = aig
                .inputs()
                .iter()
                .map(|id| match self.lits.get(id) {
                    Some(&l) => assignment.contains(&l),
                    None => false,
                })
                .collect();
            ProofOutcome::CounterExample(pattern)
        };

        self.solver.add_clause(&[!ind]);
        Ok(outcome)
    }

    fn gate_lit(&self, id: GateId) -> Result<Lit> {
        self.lits
            .get(&id)
            .copied()
            .ok_or(AigError::GateDoesNotExist(id))
    }
}

fn edge_lit(lits: &FxHashMap<GateId, Lit>, e: GateEdge) -> Option<Lit> {
    let l = *lits.get(&e.gate())?;
    Some(if e.complement() { !l } else { l })
}
