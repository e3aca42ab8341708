#![warn(missing_docs)]

//! This package provides a typed object layer over a mutable triple store.
//!
//! A [`Graph`] is a transactional set of [`Triple`]s that notifies
//! registered listeners of changes. [`MemoryGraph`] is the in-memory
//! implementation. A [`Model`] wraps a graph and hands out typed handles:
//!
//! - [`Resource`]: a URI or blank node, with property accessors
//! - [`Statement`]: a triple bound to its model
//! - [`Container`]: a bag, sequence or alternative whose members are
//!   attached through ordinal properties
//! - [`List`]: a linked list of three-triple cells ending in `rdf:nil`
//! - [`ReifiedStatement`]: a resource that describes a triple
//!
//! ```
//! use palisade_graph::{Model, Node};
//!
//! # fn main() -> Result<(), palisade_graph::GraphError> {
//! let model = Model::memory();
//! let alice = model.create_resource("http://example.com/alice");
//! alice.add_property(&Node::uri("http://example.com/name"), Node::literal("Alice"))?;
//!
//! assert_eq!(model.size(), 1);
//! # Ok(())
//! # }
//! ```

mod container;
mod enumeration;
mod error;
mod graph;
mod list;
mod memory;
mod model;
mod node;
mod prefix;
mod reification;
mod resource;
mod statement;
mod triple;
pub mod vocab;

pub use container::*;
pub use enumeration::*;
pub use error::*;
pub use graph::*;
pub use list::*;
pub use memory::*;
pub use model::*;
pub use node::*;
pub use prefix::*;
pub use reification::*;
pub use resource::*;
pub use statement::*;
pub use triple::*;
