//! Resource handles and typed variants
//!
//! A fetched resource materializes as a [`Resource`] handle whose
//! [`ResourceKind`] is chosen by the [`TypeRegistry`]; WebAC kinds get
//! their protocol behavior through the [`Acl`] and [`Authorization`]
//! views. Binary payload creation lives in [`BinarySource`] /
//! [`BinaryOptions`].

mod binary;
mod handle;
mod registry;
pub mod relations;
mod webac;

pub use binary::{guess_mime, BinaryOptions, BinarySource, DEFAULT_MIME};
pub use handle::Resource;
pub use registry::{classify, ResourceKind, TypeRegistry};
pub use webac::{AccessMode, Acl, AclMap, Authorization};
