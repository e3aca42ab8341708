use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::{GraphError, GraphResult};

const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

/// The label of a blank node. Freshly minted labels are ULIDs, so they sort
/// roughly by creation time and never collide within a process.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlankId(String);

impl BlankId {
    /// Mint a new, unique blank node label
    pub fn new() -> Self {
        Self(Ulid::new().to_string())
    }

    /// The raw label
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BlankId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for BlankId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// The datatype of a [`Literal`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Datatype {
    /// A plain string
    String,
    /// A string tagged with a language
    LangString,
    /// `true` or `false`
    Boolean,
    /// A signed 64-bit integer
    Integer,
    /// A 64-bit float
    Double,
    /// A single character
    Char,
    /// Any other datatype, named by its URI
    Custom(String),
}

impl Datatype {
    /// The URI that names this datatype
    pub fn uri(&self) -> String {
        match self {
            Datatype::String => format!("{XSD}string"),
            Datatype::LangString => RDF_LANG_STRING.to_owned(),
            Datatype::Boolean => format!("{XSD}boolean"),
            Datatype::Integer => format!("{XSD}long"),
            Datatype::Double => format!("{XSD}double"),
            Datatype::Char => format!("{XSD}char"),
            Datatype::Custom(uri) => uri.clone(),
        }
    }
}

/// A literal value: a lexical form plus a datatype and, for language
/// strings, a language tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Literal {
    lexical: String,
    language: Option<String>,
    datatype: Datatype,
}

impl Literal {
    /// A plain string literal
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            lexical: value.into(),
            language: None,
            datatype: Datatype::String,
        }
    }

    /// A string literal tagged with a language
    pub fn lang(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: value.into(),
            language: Some(language.into()),
            datatype: Datatype::LangString,
        }
    }

    /// A literal with an explicit datatype. The lexical form is not validated
    /// until one of the `as_*` accessors is used.
    pub fn typed(lexical: impl Into<String>, datatype: Datatype) -> Self {
        Self {
            lexical: lexical.into(),
            language: None,
            datatype,
        }
    }

    /// The lexical (string) form of this literal
    pub fn lexical_form(&self) -> &str {
        &self.lexical
    }

    /// The language tag, if this is a language string
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// The datatype of this literal
    pub fn datatype(&self) -> &Datatype {
        &self.datatype
    }

    /// Interpret the lexical form as a boolean
    pub fn as_bool(&self) -> GraphResult<bool> {
        match self.lexical.as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(self.invalid("boolean")),
        }
    }

    /// Interpret the lexical form as an integer
    pub fn as_i64(&self) -> GraphResult<i64> {
        self.lexical
            .trim()
            .parse()
            .map_err(|_| self.invalid("integer"))
    }

    /// Interpret the lexical form as a float
    pub fn as_f64(&self) -> GraphResult<f64> {
        self.lexical
            .trim()
            .parse()
            .map_err(|_| self.invalid("double"))
    }

    /// Interpret the lexical form as a single character
    pub fn as_char(&self) -> GraphResult<char> {
        let mut chars = self.lexical.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(self.invalid("char")),
        }
    }

    fn invalid(&self, expected: &str) -> GraphError {
        GraphError::InvalidLiteral {
            lexical: self.lexical.clone(),
            expected: expected.to_owned(),
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (&self.language, &self.datatype) {
            (Some(language), _) => write!(f, "\"{}\"@{language}", self.lexical),
            (None, Datatype::String) => write!(f, "\"{}\"", self.lexical),
            (None, datatype) => write!(f, "\"{}\"^^<{}>", self.lexical, datatype.uri()),
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::string(value)
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::string(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::typed(value.to_string(), Datatype::Boolean)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::typed(value.to_string(), Datatype::Integer)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::from(i64::from(value))
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::typed(value.to_string(), Datatype::Double)
    }
}

impl From<char> for Literal {
    fn from(value: char) -> Self {
        Literal::typed(value.to_string(), Datatype::Char)
    }
}

/// A node in the graph. [`Node::Any`] only ever appears in patterns, where it
/// matches every node in its position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Node {
    /// The pattern wildcard
    Any,
    /// A resource named by a URI
    Uri(String),
    /// An anonymous resource
    Blank(BlankId),
    /// A literal value
    Literal(Literal),
}

impl Node {
    /// A node for the given URI
    pub fn uri(uri: impl Into<String>) -> Self {
        Node::Uri(uri.into())
    }

    /// A node for a freshly minted blank label
    pub fn blank() -> Self {
        Node::Blank(BlankId::new())
    }

    /// A literal node for any value that converts into a [`Literal`]
    pub fn literal(literal: impl Into<Literal>) -> Self {
        Node::Literal(literal.into())
    }

    /// True for the pattern wildcard
    pub fn is_any(&self) -> bool {
        matches!(self, Node::Any)
    }

    /// True for URI nodes
    pub fn is_uri(&self) -> bool {
        matches!(self, Node::Uri(_))
    }

    /// True for blank nodes
    pub fn is_blank(&self) -> bool {
        matches!(self, Node::Blank(_))
    }

    /// True for literal nodes
    pub fn is_literal(&self) -> bool {
        matches!(self, Node::Literal(_))
    }

    /// True for nodes that may appear as the subject of a statement
    pub fn is_resource(&self) -> bool {
        self.is_uri() || self.is_blank()
    }

    /// The URI of this node, if it is named by one
    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Node::Uri(uri) => Some(uri),
            _ => None,
        }
    }

    /// The literal carried by this node, if any
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Node::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    /// Returns true if this node satisfies the given pattern node
    pub fn matches(&self, pattern: &Node) -> bool {
        pattern.is_any() || self == pattern
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Any => write!(f, "ANY"),
            Node::Uri(uri) => write!(f, "<{uri}>"),
            Node::Blank(id) => write!(f, "_:{}", id.as_str()),
            Node::Literal(literal) => write!(f, "{literal}"),
        }
    }
}

impl From<Literal> for Node {
    fn from(value: Literal) -> Self {
        Node::Literal(value)
    }
}

impl From<BlankId> for Node {
    fn from(value: BlankId) -> Self {
        Node::Blank(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_converts_primitives_through_literals() -> anyhow::Result<()> {
        assert!(Literal::from(true).as_bool()?);
        assert_eq!(Literal::from(42i64).as_i64()?, 42);
        assert_eq!(Literal::from(1.5f64).as_f64()?, 1.5);
        assert_eq!(Literal::from('x').as_char()?, 'x');
        assert_eq!(Literal::from("hi").lexical_form(), "hi");
        Ok(())
    }

    #[test]
    fn it_rejects_malformed_lexical_forms() {
        let literal = Literal::string("not a number");
        assert!(matches!(
            literal.as_i64(),
            Err(GraphError::InvalidLiteral { .. })
        ));
        assert!(literal.as_char().is_err());
    }

    #[test]
    fn wildcards_match_everything() {
        let node = Node::uri("http://example.com/a");
        assert!(node.matches(&Node::Any));
        assert!(node.matches(&Node::uri("http://example.com/a")));
        assert!(!node.matches(&Node::uri("http://example.com/b")));
        assert!(!Node::Any.matches(&node));
    }

    #[test]
    fn blank_nodes_are_unique() {
        assert_ne!(Node::blank(), Node::blank());
    }
}
