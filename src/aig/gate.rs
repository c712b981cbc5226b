use super::GateEdge;

/// A gate id.
///
/// The constant node has id 0 by convention. The id doubles as the AIGER
/// literal divided by two, and stays stable for the whole life of the gate:
/// a removed gate leaves a tombstone in the arena, its slot is never reused.
pub type GateId = u64;

/// The closed set of gate kinds.
///
/// `Undef` is the placeholder created for a fanin literal whose variable was
/// never defined; it is never simulated, never traversed and never gets CNF
/// clauses, it only exists so floating-fanin diagnostics have something to
/// point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    Const0,
    Input,
    Output,
    And,
    Undef,
}

impl GateKind {
    /// The number of fanin edges this kind carries.
    pub fn fanin_len(self) -> usize {
        match self {
            GateKind::Const0 | GateKind::Input | GateKind::Undef => 0,
            GateKind::Output => 1,
            GateKind::And => 2,
        }
    }

    pub fn type_str(self) -> &'static str {
        match self {
            GateKind::Const0 => "CONST",
            GateKind::Input => "PI",
            GateKind::Output => "PO",
            GateKind::And => "AIG",
            GateKind::Undef => "UNDEF",
        }
    }
}

/// A gate of the graph.
///
/// Fanouts are derived bookkeeping, one entry per consuming edge: a gate
/// using the same operand twice appears twice in the operand's fanout list.
/// They are rebuilt atomically whenever an operand edge changes, never an
/// ownership edge.
#[derive(Debug, Clone)]
pub struct Gate {
    pub(crate) id: GateId,
    pub(crate) kind: GateKind,
    pub(crate) fanins: Vec<GateEdge>,
    pub(crate) fanouts: Vec<GateId>,
    /// Latest batch of 64 parallel simulation results.
    pub(crate) sim: u64,
    pub(crate) symbol: Option<String>,
    /// Source line of the defining record, diagnostic only.
    pub(crate) line: u32,
    /// Max distance from any primary input, a sort key for the prover.
    pub(crate) depth: u64,
    /// Compared against the circuit's monotonic traversal counter.
    pub(crate) stamp: u64,
}

impl Gate {
    pub(crate) fn new(id: GateId, kind: GateKind, fanins: Vec<GateEdge>, line: u32) -> Self {
        debug_assert_eq!(fanins.len(), kind.fanin_len());
        Gate {
            id,
            kind,
            fanins,
            fanouts: Vec::new(),
            sim: 0,
            symbol: None,
            line,
            depth: 0,
            stamp: 0,
        }
    }

    pub fn id(&self) -> GateId {
        self.id
    }

    pub fn kind(&self) -> GateKind {
        self.kind
    }

    pub fn is_and(&self) -> bool {
        self.kind == GateKind::And
    }

    pub fn is_input(&self) -> bool {
        self.kind == GateKind::Input
    }

    pub fn is_output(&self) -> bool {
        self.kind == GateKind::Output
    }

    pub fn is_const(&self) -> bool {
        self.kind == GateKind::Const0
    }

    pub fn is_undef(&self) -> bool {
        self.kind == GateKind::Undef
    }

    pub fn fanins(&self) -> &[GateEdge] {
        &self.fanins
    }

    pub fn fanouts(&self) -> &[GateId] {
        &self.fanouts
    }

    pub fn sim(&self) -> u64 {
        self.sim
    }

    pub fn depth(&self) -> u64 {
        self.depth
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// The AIGER literal of the gate itself (never complemented).
    pub fn literal(&self) -> u64 {
        2 * self.id
    }

    pub(crate) fn remove_fanout(&mut self, consumer: GateId) {
        if let Some(pos) = self.fanouts.iter().position(|&f| f == consumer) {
            self.fanouts.swap_remove(pos);
        }
    }

    pub(crate) fn remove_fanouts_of(&mut self, consumer: GateId) {
        self.fanouts.retain(|&f| f != consumer);
    }
}
