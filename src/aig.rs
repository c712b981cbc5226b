//! Module defining the [`Aig`] struct, as well as [`Gate`], [`GateEdge`] and some other relevant structs.
//!
//! To start reducing a circuit, check [`crate::strash`], [`crate::sim`] and [`crate::fraig`] docs.

pub mod edge;
pub mod error;
pub mod gate;
pub mod parser;
pub mod writer;

pub use edge::GateEdge;
pub use error::{AigError, ParseError, PatternError, Result};
pub use gate::{Gate, GateId, GateKind};

/// A whole combinational AIG.
///
/// Gates live in a dense arena indexed by their stable id. A removed gate
/// leaves a `None` tombstone behind; the slot is never reused, so a stale id
/// held by a caller reads as "absent" instead of resolving to an unrelated
/// gate. Primary outputs are gates of their own, placed above `max_var`, and
/// carry the output polarity on their single fanin edge.
///
/// The topological `order` is a cache: it is valid only right after
/// [`Aig::rebuild_order`] and must be treated as stale after any structural
/// mutation (merge, sweep, optimize).
#[derive(Debug, Clone)]
pub struct Aig {
    pub(crate) gates: Vec<Option<Gate>>,
    pub(crate) inputs: Vec<GateId>,
    pub(crate) outputs: Vec<GateId>,
    /// Topological evaluation order, primary outputs included.
    pub(crate) order: Vec<GateId>,
    /// Highest variable index declared by the source file (or seen so far).
    pub(crate) max_var: u64,
    /// Captured `i<k> name` / `o<k> name` records, echoed by the writer.
    pub(crate) symbol_lines: Vec<String>,
    /// Global traversal counter. A traversal bumps it once at entry and
    /// compare-and-stamps every visited gate: an O(1) reset of the visited
    /// set. Traversals never interleave.
    stamp: u64,
}

impl Aig {
    /// Create a brand new AIG (constant gate at id 0 included).
    pub fn new() -> Self {
        Aig {
            gates: vec![Some(Gate::new(0, GateKind::Const0, vec![], 0))],
            inputs: Vec::new(),
            outputs: Vec::new(),
            order: Vec::new(),
            max_var: 0,
            symbol_lines: Vec::new(),
            stamp: 0,
        }
    }

    /// Retrieves a gate from its id. A tombstoned slot reads as `None`.
    pub fn get(&self, id: GateId) -> Option<&Gate> {
        self.gates.get(id as usize)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: GateId) -> Option<&mut Gate> {
        self.gates.get_mut(id as usize)?.as_mut()
    }

    pub(crate) fn gate(&self, id: GateId) -> &Gate {
        self.get(id).expect("id resolved against a tombstone")
    }

    pub(crate) fn gate_mut(&mut self, id: GateId) -> &mut Gate {
        self.get_mut(id).expect("id resolved against a tombstone")
    }

    pub fn is_live(&self, id: GateId) -> bool {
        self.get(id).is_some()
    }

    pub fn inputs(&self) -> &[GateId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[GateId] {
        &self.outputs
    }

    /// The current topological order (stale after any structural mutation).
    pub fn order(&self) -> &[GateId] {
        &self.order
    }

    pub fn max_var(&self) -> u64 {
        self.max_var
    }

    /// Iterate over all live gates in ascending id order.
    pub fn live_gates(&self) -> impl Iterator<Item = &Gate> {
        self.gates.iter().filter_map(|g| g.as_ref())
    }

    fn ensure_slot(&mut self, id: GateId) {
        if self.gates.len() <= id as usize {
            self.gates.resize_with(id as usize + 1, || None);
        }
    }

    fn check_fresh(&self, id: GateId) -> Result<()> {
        if id == 0 {
            return Err(AigError::IdZeroButNotConst);
        }
        if self.is_live(id) {
            return Err(AigError::DuplicateId(id));
        }
        Ok(())
    }

    /// Create a new primary input gate.
    pub fn add_input(&mut self, id: GateId, line: u32) -> Result<GateId> {
        self.check_fresh(id)?;
        self.ensure_slot(id);
        self.gates[id as usize] = Some(Gate::new(id, GateKind::Input, vec![], line));
        self.inputs.push(id);
        self.max_var = self.max_var.max(id);
        Ok(id)
    }

    /// Create a new and gate. Both operands must already exist (an undefined
    /// placeholder counts, see [`Aig::add_undef`]).
    pub fn add_and(&mut self, id: GateId, fanin0: GateEdge, fanin1: GateEdge, line: u32) -> Result<GateId> {
        self.check_fresh(id)?;
        for e in [fanin0, fanin1] {
            if !self.is_live(e.gate) {
                return Err(AigError::GateDoesNotExist(e.gate));
            }
        }
        self.ensure_slot(id);
        self.gates[id as usize] = Some(Gate::new(id, GateKind::And, vec![fanin0, fanin1], line));
        self.gate_mut(fanin0.gate).fanouts.push(id);
        self.gate_mut(fanin1.gate).fanouts.push(id);
        self.max_var = self.max_var.max(id);
        Ok(id)
    }

    /// Create an undefined placeholder for a floating fanin.
    pub fn add_undef(&mut self, id: GateId) -> Result<GateId> {
        self.check_fresh(id)?;
        self.ensure_slot(id);
        self.gates[id as usize] = Some(Gate::new(id, GateKind::Undef, vec![], 0));
        Ok(id)
    }

    /// Create a primary output gate feeding from `fanin`. The output gate is
    /// placed in the arena above `max_var` and its id is returned.
    pub fn add_output(&mut self, fanin: GateEdge, line: u32) -> Result<GateId> {
        if !self.is_live(fanin.gate) {
            return Err(AigError::GateDoesNotExist(fanin.gate));
        }
        let id = (self.max_var + 1).max(self.gates.len() as u64);
        self.ensure_slot(id);
        self.gates[id as usize] = Some(Gate::new(id, GateKind::Output, vec![fanin], line));
        self.gate_mut(fanin.gate).fanouts.push(id);
        self.outputs.push(id);
        Ok(id)
    }

    /// Replace one fanin edge of a gate, keeping fanout registration exact.
    pub(crate) fn set_fanin(&mut self, id: GateId, index: usize, edge: GateEdge) -> Result<()> {
        if !self.is_live(edge.gate) {
            return Err(AigError::GateDoesNotExist(edge.gate));
        }
        let old = match self.get(id) {
            None => return Err(AigError::GateDoesNotExist(id)),
            Some(g) => *g
                .fanins
                .get(index)
                .ok_or(AigError::InvalidState(format!("gate {id} has no fanin {index}")))?,
        };
        self.gate_mut(old.gate).remove_fanout(id);
        self.gate_mut(id).fanins[index] = edge;
        self.gate_mut(edge.gate).fanouts.push(id);
        Ok(())
    }

    /// Bump the global traversal counter and return the fresh stamp value.
    pub(crate) fn bump_stamp(&mut self) -> u64 {
        self.stamp += 1;
        self.stamp
    }

    pub(crate) fn is_stamped(&self, id: GateId, stamp: u64) -> bool {
        self.gate(id).stamp == stamp
    }

    pub(crate) fn set_stamp(&mut self, id: GateId, stamp: u64) {
        self.gate_mut(id).stamp = stamp;
    }

    /// Rebuild the topological evaluation order by an iterative post-order
    /// walk from every primary output. Undefined placeholders are neither
    /// traversed nor appended. Must be rerun after any operation that
    /// changes operand lists.
    pub fn rebuild_order(&mut self) {
        let stamp = self.bump_stamp();
        let mut order = Vec::new();
        let mut stack: Vec<(GateId, bool)> = Vec::new();
        let starts = self.outputs.clone();

        for po in starts {
            stack.push((po, false));
            while let Some((id, expanded)) = stack.pop() {
                if expanded {
                    order.push(id);
                    continue;
                }
                if self.is_stamped(id, stamp) {
                    continue;
                }
                self.set_stamp(id, stamp);
                stack.push((id, true));
                // Reversed so fanin0 is visited first.
                let fanins: Vec<GateId> =
                    self.gate(id).fanins.iter().rev().map(|e| e.gate).collect();
                for f in fanins {
                    if !self.gate(f).is_undef() && !self.is_stamped(f, stamp) {
                        stack.push((f, false));
                    }
                }
            }
        }
        self.order = order;
    }

    /// Recompute every gate's depth (max distance from any primary input)
    /// over the current topological order.
    pub fn update_depths(&mut self) {
        for id in self.order.clone() {
            let depth = match self.gate(id).kind {
                GateKind::Const0 | GateKind::Input | GateKind::Undef => 0,
                GateKind::Output => self.fanin_depth(id, 0),
                GateKind::And => 1 + self.fanin_depth(id, 0).max(self.fanin_depth(id, 1)),
            };
            self.gate_mut(id).depth = depth;
        }
    }

    fn fanin_depth(&self, id: GateId, index: usize) -> u64 {
        let f = self.gate(id).fanins[index].gate;
        self.get(f).map_or(0, |g| g.depth)
    }

    /// Redirect every consumer edge of `old` onto `new` and tombstone `old`.
    ///
    /// If `complement` is true every redirected edge's inversion flag is
    /// toggled (preserving function when `old == !new`). `old`'s operand
    /// edges are severed and its fanout registration removed from each former
    /// operand; `new` inherits `old`'s entire fanout set. No reader can
    /// observe a half-redirected state: the whole rewiring happens under one
    /// `&mut self`.
    pub fn merge(&mut self, old: GateId, new: GateId, complement: bool) -> Result<()> {
        if old == new {
            return Err(AigError::InvalidState(format!("merging gate {old} into itself")));
        }
        if !self.is_live(new) {
            return Err(AigError::GateDoesNotExist(new));
        }
        let kind = match self.get(old) {
            None => return Err(AigError::GateDoesNotExist(old)),
            Some(g) => g.kind,
        };
        if kind != GateKind::And {
            return Err(AigError::BadGateKind(kind.type_str()));
        }

        // Sever old from its operands' fanout lists.
        let fanins = self.gate(old).fanins.clone();
        for e in fanins {
            if e.gate != old {
                if let Some(g) = self.get_mut(e.gate) {
                    g.remove_fanouts_of(old);
                }
            }
        }

        // Redirect every consumer edge, toggling polarity if requested.
        let consumers = std::mem::take(&mut self.gate_mut(old).fanouts);
        let mut unique = consumers.clone();
        unique.sort_unstable();
        unique.dedup();
        for c in unique {
            if c == old || !self.is_live(c) {
                continue;
            }
            let mut redirected = 0;
            for e in &mut self.gate_mut(c).fanins {
                if e.gate == old {
                    e.gate = new;
                    if complement {
                        e.complement = !e.complement;
                    }
                    redirected += 1;
                }
            }
            for _ in 0..redirected {
                self.gate_mut(new).fanouts.push(c);
            }
        }

        self.gates[old as usize] = None;
        Ok(())
    }

    /// Checking that the AIG structure is correct.
    /// This function was written for debug purposes, as the library is
    /// supposed to maintain integrity at any moment.
    pub fn check_integrity(&self) -> Result<()> {
        match self.get(0) {
            Some(g) if g.is_const() => (),
            _ => return Err(AigError::InvalidState("constant gate missing at id 0".to_string())),
        }
        for g in self.live_gates() {
            if self.gates[g.id as usize].as_ref().map(|x| x.id) != Some(g.id) {
                return Err(AigError::InvalidState("incoherent gate id".to_string()));
            }
            if g.fanins.len() != g.kind.fanin_len() {
                return Err(AigError::InvalidState(format!(
                    "gate {} has {} fanins, expected {}",
                    g.id,
                    g.fanins.len(),
                    g.kind.fanin_len()
                )));
            }
            for e in &g.fanins {
                let f = self
                    .get(e.gate)
                    .ok_or(AigError::InvalidState(format!(
                        "gate {} has an edge to tombstoned id {}",
                        g.id, e.gate
                    )))?;
                let expected = g.fanins.iter().filter(|x| x.gate == e.gate).count();
                let registered = f.fanouts.iter().filter(|&&x| x == g.id).count();
                if registered != expected {
                    return Err(AigError::InvalidState(format!(
                        "gate {} registered {} times in fanouts of {}, expected {}",
                        g.id, registered, e.gate, expected
                    )));
                }
            }
            for &f in &g.fanouts {
                let consumer = self.get(f).ok_or(AigError::InvalidState(format!(
                    "fanout {} of gate {} is no longer in the AIG",
                    f, g.id
                )))?;
                if !consumer.fanins.iter().any(|e| e.gate == g.id) {
                    return Err(AigError::InvalidState(format!(
                        "gate {} lists consumer {} which does not use it",
                        g.id, f
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for Aig {
    fn default() -> Self {
        Aig::new()
    }
}
