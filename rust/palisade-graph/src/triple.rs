use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::Node;

/// A single statement in the graph: the subject, predicate and object of a
/// fact. When used as a pattern, any position holding [`Node::Any`] matches
/// every node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// The resource the statement is about
    pub subject: Node,
    /// The property being asserted
    pub predicate: Node,
    /// The value of the property
    pub object: Node,
}

impl Triple {
    /// The pattern that matches every triple
    pub const ANY: Triple = Triple {
        subject: Node::Any,
        predicate: Node::Any,
        object: Node::Any,
    };

    /// Construct a new triple (or pattern)
    pub fn new(subject: Node, predicate: Node, object: Node) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// Returns true if this triple satisfies the given pattern
    pub fn matches(&self, pattern: &Triple) -> bool {
        self.subject.matches(&pattern.subject)
            && self.predicate.matches(&pattern.predicate)
            && self.object.matches(&pattern.object)
    }

    /// True when no position is a wildcard
    pub fn is_concrete(&self) -> bool {
        !(self.subject.is_any() || self.predicate.is_any() || self.object.is_any())
    }

    /// A copy of this triple with a different object
    pub fn with_object(&self, object: Node) -> Triple {
        Triple::new(self.subject.clone(), self.predicate.clone(), object)
    }

    /// A copy of this triple with a different subject
    pub fn with_subject(&self, subject: Node) -> Triple {
        Triple::new(subject, self.predicate.clone(), self.object.clone())
    }
}

impl Display for Triple {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_matches_partial_patterns() {
        let triple = Triple::new(
            Node::uri("http://example.com/s"),
            Node::uri("http://example.com/p"),
            Node::literal("o"),
        );

        assert!(triple.matches(&Triple::ANY));
        assert!(triple.matches(&Triple::new(
            Node::Any,
            Node::uri("http://example.com/p"),
            Node::Any
        )));
        assert!(!triple.matches(&Triple::new(
            Node::Any,
            Node::uri("http://example.com/q"),
            Node::Any
        )));
        assert!(triple.is_concrete());
        assert!(!Triple::ANY.is_concrete());
    }
}
