//! Core types and traits for the Respawn pooling framework.
//!
//! This is the leaf crate with zero dependencies. It defines the
//! strongly-typed identifiers, placement aliases, error types, lifecycle
//! events, and the collaborator traits through which the pool core talks
//! to its host scene graph.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod traits;

pub use error::{ReplaceError, SpawnError};
pub use id::{
    AllocatorId, ContainerId, DomainId, Generation, InstanceId, Orientation, Position, TemplateId,
    NO_ROTATION, ORIGIN,
};
pub use traits::{Domains, Host, Lifecycle, RecordSource};
