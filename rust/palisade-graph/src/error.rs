use thiserror::Error;

use crate::Node;

/// Convenience alias for results produced by the base model
pub type GraphResult<T> = Result<T, GraphError>;

/// The common error type used by this crate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// A required property had no matching statement
    #[error("Property {property} not found on {subject}")]
    PropertyNotFound {
        /// The resource that was queried
        subject: Node,
        /// The property that was required
        property: Node,
    },

    /// A positional access fell outside of the populated range
    #[error("Index {index} is out of bounds (size {size})")]
    IndexOutOfBounds {
        /// The requested position
        index: usize,
        /// The number of entries at the time of the request
        size: usize,
    },

    /// A read was attempted against the empty list
    #[error("Attempted to {0} the empty list")]
    EmptyList(String),

    /// A mutation was attempted against the shared empty list terminator
    #[error("The empty list cannot be modified (attempted to {0})")]
    EmptyListUpdate(String),

    /// An alternative container has no default (first) member
    #[error("Alt container {0} has no default member")]
    AltHasNoDefault(Node),

    /// A required element was requested from an exhausted enumeration
    #[error("Enumeration has no more elements")]
    EmptyEnumeration,

    /// A node was used where a resource (URI or blank node) was expected
    #[error("Node {0} is not a resource")]
    NotAResource(Node),

    /// A node was used where a literal was expected
    #[error("Node {0} is not a literal")]
    NotALiteral(Node),

    /// A literal could not be interpreted as the requested primitive type
    #[error("Literal \"{lexical}\" cannot be read as {expected}")]
    InvalidLiteral {
        /// The lexical form that failed to convert
        lexical: String,
        /// The name of the requested type
        expected: String,
    },

    /// A list did not have the expected cell structure
    #[error("Malformed list at {cell}: {reason}")]
    InvalidList {
        /// The cell at which the problem was detected
        cell: Node,
        /// A description of the problem
        reason: String,
    },

    /// A transaction was begun, committed or aborted out of order
    #[error("Transaction failed: {0}")]
    Transaction(String),
}
