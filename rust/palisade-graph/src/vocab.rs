//! Well-known RDF vocabulary used by containers, lists and reification.

use crate::Node;

/// The RDF syntax namespace
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// A node in the RDF namespace with the given local name
pub fn rdf(local: &str) -> Node {
    Node::Uri(format!("{RDF}{local}"))
}

/// `rdf:type`
pub fn rdf_type() -> Node {
    rdf("type")
}

/// `rdf:first`, the value of a list cell
pub fn first() -> Node {
    rdf("first")
}

/// `rdf:rest`, the link to the next list cell
pub fn rest() -> Node {
    rdf("rest")
}

/// `rdf:nil`, the empty list
pub fn nil() -> Node {
    rdf("nil")
}

/// `rdf:List`
pub fn list() -> Node {
    rdf("List")
}

/// `rdf:Bag`
pub fn bag() -> Node {
    rdf("Bag")
}

/// `rdf:Seq`
pub fn seq() -> Node {
    rdf("Seq")
}

/// `rdf:Alt`
pub fn alt() -> Node {
    rdf("Alt")
}

/// `rdf:Statement`
pub fn statement() -> Node {
    rdf("Statement")
}

/// `rdf:subject`
pub fn subject() -> Node {
    rdf("subject")
}

/// `rdf:predicate`
pub fn predicate() -> Node {
    rdf("predicate")
}

/// `rdf:object`
pub fn object() -> Node {
    rdf("object")
}

/// The ordinal membership property `rdf:_n`
pub fn li(index: u32) -> Node {
    Node::Uri(format!("{RDF}_{index}"))
}

/// If the node is an ordinal membership property, its (1-based) index
pub fn ordinal(node: &Node) -> Option<u32> {
    let local = node.as_uri()?.strip_prefix(RDF)?.strip_prefix('_')?;
    if local.starts_with('0') || local.starts_with('+') {
        return None;
    }
    local.parse().ok().filter(|index| *index > 0)
}
