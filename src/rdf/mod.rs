//! RDF support for the repository client
//!
//! Resource metadata travels as Turtle and is held in memory as a
//! [`ResourceGraph`] of oxrdf triples scoped to one resource. Metadata
//! edits are staged as [`RdfChange`] values and applied with
//! [`apply_changes`] during a read-modify-write flush.

mod changes;
mod graph;
pub mod turtle;
pub mod vocab;

pub use changes::{apply_changes, RdfChange};
pub use graph::{build_graph, dc_graph, ResourceGraph};
