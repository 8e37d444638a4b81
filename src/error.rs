use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Invalid arguments passed at the boundary of permutations and partitions.
/// The refinement algorithms themselves have no failure path.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum Error {
    #[error("not a permutation of 0..{len}: {values:?}")]
    InvalidPermutation { len: usize, values: Vec<usize> },

    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("empty partition string")]
    EmptyPartitionString,

    #[error("partition string '{input}' is not enclosed in brackets")]
    UnbracketedPartitionString { input: String },

    #[error("invalid partition element '{element}' in '{input}'")]
    InvalidPartitionElement { input: String, element: String },

    #[error("element {element} occurs more than once in '{input}'")]
    DuplicatePartitionElement { input: String, element: usize },
}
