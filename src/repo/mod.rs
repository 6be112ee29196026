//! Repository connection, path translation and authenticated transport

mod paths;
mod repository;
mod transport;

pub use paths::{path_concat, PathMap};
pub use repository::{CreateOptions, Repository};
pub use transport::{Method, ON_BEHALF_OF, SLUG};

/// Media type used for RDF metadata exchange with the server
pub const RDF_MIME: &str = "text/turtle";
