//! Per-domain registries and the process-scoped registry set.
//!
//! A [`Registry`] owns one [`SlotAllocator`](respawn_pool::SlotAllocator)
//! per template within its domain, plus the instance-record table that
//! binds live instances back to their allocators. [`Pools`] is the
//! explicitly constructed set of all live registries — the despawn
//! fallback path scans it instead of consulting ambient global state.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod pools;
pub mod registry;
mod walk;

pub use pools::Pools;
pub use registry::Registry;
