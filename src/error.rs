//! Error types for every pipeline stage.

use std::io;

use thiserror::Error;

/// What went wrong on a particular input line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("missing `p <tag> <vars> <clauses>` header")]
    MissingHeader,
    #[error("malformed header `{0}`")]
    MalformedHeader(String),
    #[error("duplicate header")]
    DuplicateHeader,
    #[error("invalid integer `{0}`")]
    InvalidInteger(String),
    #[error("line is not terminated by `0`")]
    MissingTerminator,
    #[error("literal {lit} is out of range for {num_vars} declared variables")]
    LiteralOutOfRange { lit: i64, num_vars: u32 },
    #[error("cardinality bound must be positive, got {0}")]
    NonPositiveBound(i64),
    #[error("cardinality constraint has no bound")]
    MissingBound,
}

/// Malformed KNF input. Fatal: no partial formula is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    /// 1-based line number (0 when the input ended prematurely).
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: usize, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }
}

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("ordering is not a bijection over 1..={num_vars}: {reason}")]
    NotABijection { num_vars: u32, reason: String },
    #[error("community detection completed no iterations")]
    NoIterations,
    #[error("community detection timed out after {0:?} before any iteration completed")]
    TimeoutExhausted(std::time::Duration),
    #[error("external ordering `{program}` failed: {reason}")]
    External { program: String, reason: String },
    #[error("unknown ordering strategy `{0}`")]
    UnknownStrategy(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("unknown encoding scheme `{0}`")]
    UnknownScheme(String),
    #[error("constraint #{index} requires {bound} of only {len} literals")]
    BoundExceedsLiterals { index: usize, bound: u32, len: usize },
    #[error("auxiliary variables exceed the largest id {0}")]
    VariablesExhausted(u32),
}

/// Top-level error, tagged with the stage that produced it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("parse: {0}")]
    Parse(#[from] ParseError),
    #[error("order: {0}")]
    Order(#[from] OrderError),
    #[error("encode: {0}")]
    Encode(#[from] EncodeError),
    #[error("{stage}: I/O error on `{path}`")]
    Io {
        stage: &'static str,
        path: String,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub fn io(stage: &'static str, path: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            stage,
            path: path.into(),
            source,
        }
    }
}
