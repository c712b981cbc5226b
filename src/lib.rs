pub mod aig;
pub mod cnf;
pub mod fec;
pub mod fraig;
pub mod opt;
pub mod report;
pub mod sim;
pub mod strash;

// Re-exporting symbols and modules.
pub use aig::{
    Aig, AigError, Gate, GateEdge, GateId, GateKind, ParseError, PatternError, Result,
};
pub use cnf::{ProofModel, ProofOutcome};
pub use fec::FecGroups;
pub use fraig::FraigSummary;
