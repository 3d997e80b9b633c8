//! Generational slot allocation for recyclable instances.
//!
//! The expensive thing this crate avoids is destroy-and-recreate churn:
//! a [`SlotAllocator`] keeps despawned instances parked on a free list
//! and hands them back out on the next spawn, stamping every recycling
//! event with a per-slot generation counter. A [`Handle`] snapshots that
//! counter and can therefore tell — with one integer comparison and no
//! locks — whether the instance it was minted for is still the one
//! occupying the slot.
//!
//! # Despawn is logically immediate, physically deferred
//!
//! `despawn()` bumps the slot's generation synchronously (every
//! outstanding handle goes invalid before the call returns) but the
//! active→free migration happens at the next `tick()`, so code
//! enumerating active instances during the current tick never observes
//! destructive removal mid-iteration.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod allocator;
pub mod handle;
pub mod record;

pub use allocator::{SlotAllocator, TickReport};
pub use handle::Handle;
pub use record::InstanceRecord;
