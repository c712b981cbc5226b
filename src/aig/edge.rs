//! A [`GateEdge`] points at a [`Gate`] and can be complemented (indicates the presence of an inverter).
//!
//! [`Gate`]: crate::Gate

use std::ops::Not;

use crate::GateId;

/// A directed fanin edge.
///
/// The edge carries an inverter according to the value of `complement`.
/// Edges store the target's stable id, not a reference: the owning [`Aig`]
/// arena is the only place ids are resolved.
///
/// [`Aig`]: crate::Aig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GateEdge {
    pub(crate) gate: GateId,
    pub(crate) complement: bool,
}

impl Not for GateEdge {
    type Output = Self;

    fn not(mut self) -> Self::Output {
        self.complement = !self.complement;
        self
    }
}

impl GateEdge {
    pub fn new(gate: GateId, complement: bool) -> Self {
        GateEdge { gate, complement }
    }

    /// Decodes an AIGER literal (`2 * id`, `+1` if complemented).
    pub fn from_literal(literal: u64) -> Self {
        GateEdge {
            gate: literal >> 1,
            complement: literal & 1 != 0,
        }
    }

    /// Re-derives the AIGER literal.
    pub fn literal(&self) -> u64 {
        2 * self.gate + self.complement as u64
    }

    pub fn gate(&self) -> GateId {
        self.gate
    }

    pub fn complement(&self) -> bool {
        self.complement
    }

    pub fn is_const_false(&self) -> bool {
        self.gate == 0 && !self.complement
    }

    pub fn is_const_true(&self) -> bool {
        self.gate == 0 && self.complement
    }

    pub fn is_complement_of(&self, other: &GateEdge) -> bool {
        self.gate == other.gate && self.complement ^ other.complement
    }
}
