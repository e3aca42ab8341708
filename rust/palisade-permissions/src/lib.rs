#![warn(missing_docs)]

//! This package provides secured views over a [`palisade_graph::Model`].
//!
//! A [`SecuredModel`] offers the same operations as the model it wraps, on
//! behalf of a single [`Principal`]. Every decision is delegated to a
//! [`PolicyOracle`] supplied by the embedding application:
//!
//! - Reads only ever reveal triples the oracle permits. Depending on the
//!   [`ReadMode`] a refused read either raises [`AccessDenied::Read`] or is
//!   answered as though the content were absent.
//! - Writes are planned in full and authorized before anything is written,
//!   so a refused write (which always raises) leaves the model unchanged.
//! - Enumerations are lazy [`SecuredIter`]s that check each element as it
//!   is reached.
//!
//! Everything a secured model hands out ([`SecuredResource`],
//! [`SecuredStatement`], [`SecuredBag`], [`SecuredSeq`], [`SecuredAlt`],
//! [`SecuredList`], [`SecuredReifiedStatement`]) shares its
//! [`SecurityContext`] and applies the same rules. Every wrapper implements
//! [`SecuredItem`], which gives access to the base element and to `can_*`
//! probes that ask the oracle without raising.

mod checks;
mod container;
mod context;
mod error;
mod item;
mod iter;
mod list;
mod listener;
mod model;
mod node;
mod oracle;
mod reification;
mod resource;
mod statement;

pub use checks::*;
pub use container::*;
pub use context::*;
pub use error::*;
pub use item::*;
pub use iter::*;
pub use list::*;
pub use listener::*;
pub use model::*;
pub use node::*;
pub use oracle::*;
pub use reification::*;
pub use resource::*;
pub use statement::*;

#[cfg(any(test, feature = "helpers"))]
pub mod helpers;
