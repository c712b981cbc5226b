use thiserror::Error;

use super::GateId;

/// The result of an AIG operation.
pub type Result<T> = std::result::Result<T, AigError>;

/// Error returned when an AIG operation failed.
#[derive(Debug, Error)]
pub enum AigError {
    /// The gate with given id does not exist (never did, or was merged away).
    #[error("gate with id={0} does not exist")]
    GateDoesNotExist(GateId),

    /// The id 0 is reserved for the constant gate only.
    #[error("id=0 is for the constant gate only")]
    IdZeroButNotConst,

    /// A different gate with the given id already exists.
    #[error("a different gate with id={0} already exists")]
    DuplicateId(GateId),

    /// Invalid operation for the gate's kind (eg merging an input away).
    #[error("operation not supported on a {0} gate")]
    BadGateKind(&'static str),

    /// The AIG has reached an invalid state. This should never happen:
    /// every mutation is supposed to leave fanins, fanouts and the arena
    /// consistent with one another.
    #[error("the AIG has reached an invalid state - this should not happen - error: {0}")]
    InvalidState(String),

    /// Just forwarding a [`ParseError`].
    #[error("{0}")]
    ParseError(#[from] ParseError),

    /// Just forwarding a [`PatternError`].
    #[error("{0}")]
    PatternError(#[from] PatternError),
}

/// Error returned when loading a circuit file failed.
///
/// Every variant identifies the offending line; a failed load retains no
/// partial circuit.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: expected header \"aag M I L O A\", got \"{found}\"")]
    BadHeader { line: u32, found: String },

    #[error("line {line}: missing {field}")]
    MissingField { line: u32, field: &'static str },

    #[error("line {line}: illegal {field} \"{found}\"")]
    BadNumber {
        line: u32,
        field: &'static str,
        found: String,
    },

    #[error("line {line}: number of variables {max_var} is too small")]
    TooFewVariables { line: u32, max_var: u64 },

    #[error("line {line}: latches are not supported")]
    LatchesUnsupported { line: u32 },

    #[error("line {line}: literal {literal} exceeds maximum valid id")]
    LiteralOutOfRange { line: u32, literal: u64 },

    #[error("line {line}: literal {literal} must not be complemented here")]
    OddLiteral { line: u32, literal: u64 },

    #[error("line {line}: literal {literal} redefined, previously defined as {prev_kind} in line {prev_line}")]
    Redefined {
        line: u32,
        literal: u64,
        prev_kind: &'static str,
        prev_line: u32,
    },

    #[error("line {line}: illegal symbol record \"{found}\"")]
    BadSymbol { line: u32, found: String },

    #[error("io error: {0}")]
    Io(String),
}

/// Error returned when a simulation pattern batch is rejected.
///
/// The whole batch is dropped, no partial simulation takes place.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error(
        "pattern {index}: length {found} does not match the number of inputs ({expected}) in the circuit"
    )]
    LengthMismatch {
        index: usize,
        found: usize,
        expected: usize,
    },

    #[error("pattern {index}: contains a non-0/1 character ('{found}')")]
    NonBinary { index: usize, found: char },
}
