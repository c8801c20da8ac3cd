use thiserror::Error;

/// Structural errors raised when an evidence vector and the knowledge base
/// disagree about the declared variable schema. Both indicate a
/// misconfiguration (e.g. an operator-supplied knowledge base that diverges
/// from the compiled evidence schema), never a property of the email itself.
#[derive(Debug, Error)]
pub enum SpamlensError {
    /// A variable name outside the knowledge base's declared structure.
    #[error("unknown evidence variable: {0}")]
    UnknownVariable(String),

    /// The evidence vector does not cover a variable the knowledge base
    /// declares. The extractor guarantees full coverage, so hitting this
    /// means a caller bypassed the extractor or loaded a divergent table.
    #[error("evidence vector is missing declared variable: {0}")]
    IncompleteEvidence(String),

    /// An observed state with no row in the variable's probability table.
    #[error("state {state} out of range for variable {variable} (cardinality {cardinality})")]
    StateOutOfRange {
        variable: String,
        state: u8,
        cardinality: usize,
    },
}
