use thiserror::Error;

/// Structural and lookup failures raised while building, translating or
/// emitting an encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("clause literal cannot be 0")]
    ZeroLiteral,
    #[error("negated literal {0} cannot be used as a key")]
    NegatedKey(String),
    #[error("comments cannot contain line breaks: {0:?}")]
    CommentLineBreak(String),
    #[error("maximum variable count of {0} reached")]
    VariableCapacity(usize),
    #[error("variable {0} was never allocated")]
    UnknownVariable(u8),
    #[error("coordinate {value} on axis {axis} exceeds size {size}")]
    CoordinateOutOfRange {
        axis: usize,
        value: usize,
        size: usize,
    },
    #[error("expected {expected} coordinates, got {got}")]
    ArityMismatch { expected: usize, got: usize },
    #[error("literal index does not fit in 32 bits")]
    IndexOverflow,
    #[error("literal {0} was never registered with the encoding")]
    UnregisteredLiteral(String),
    #[error("literal {0} already has a translation")]
    DuplicateKey(String),
    #[error("value {0} is already assigned to another literal")]
    DuplicateValue(i32),
    #[error("translation value must be >= 1, got {0}")]
    NonPositiveValue(i32),
    #[error("no literal is assigned to value {0}")]
    UnknownValue(i32),
    #[error("index {0} has no coordinates in this family")]
    UnknownIndex(u32),
    #[error("index {0} lies outside the prefixed view")]
    PrefixMismatch(u32),
    #[error("family of variable {0} belongs to a different encoding")]
    ForeignFamily(u8),
    #[error("can't emit CNF with {0} soft clauses, use WCNF instead")]
    SoftClausesInCnf(usize),
}
