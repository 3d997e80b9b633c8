//! Respawn: generational object pooling with recycling-aware weak handles.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Respawn sub-crates. For most users, adding `respawn` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use respawn::prelude::*;
//! use std::collections::HashMap;
//!
//! // A minimal host: instances are entries in a map, templates always
//! // instantiate, and there is no hierarchy.
//! struct World {
//!     next: u64,
//!     live: HashMap<InstanceId, bool>,
//! }
//!
//! impl Host for World {
//!     fn instantiate(
//!         &mut self,
//!         _template: TemplateId,
//!         _position: Position,
//!         _orientation: Orientation,
//!         _container: Option<ContainerId>,
//!     ) -> Option<InstanceId> {
//!         self.next += 1;
//!         let id = InstanceId(self.next);
//!         self.live.insert(id, true);
//!         Some(id)
//!     }
//!     fn exists(&self, instance: InstanceId) -> bool {
//!         self.live.contains_key(&instance)
//!     }
//!     fn children(&self, _instance: InstanceId) -> Vec<InstanceId> {
//!         Vec::new()
//!     }
//!     fn parent(&self, _instance: InstanceId) -> Option<InstanceId> {
//!         None
//!     }
//!     fn place(&mut self, _instance: InstanceId, _position: Position, _orientation: Orientation) {}
//!     fn set_active(&mut self, instance: InstanceId, active: bool) {
//!         if let Some(flag) = self.live.get_mut(&instance) {
//!             *flag = active;
//!         }
//!     }
//!     fn reparent(
//!         &mut self,
//!         _instance: InstanceId,
//!         _container: Option<ContainerId>,
//!         _keep_world_transform: bool,
//!     ) {
//!     }
//!     fn destroy(&mut self, instance: InstanceId) {
//!         self.live.remove(&instance);
//!     }
//! }
//!
//! impl Domains for World {
//!     fn holding(&mut self, _domain: DomainId, _template: TemplateId) -> ContainerId {
//!         ContainerId(1)
//!     }
//!     fn is_persistent(&self, _domain: DomainId) -> bool {
//!         false
//!     }
//!     fn migrate(&mut self, _instance: InstanceId, _domain: DomainId) {}
//! }
//!
//! let mut world = World { next: 0, live: HashMap::new() };
//! let mut pools = Pools::new();
//!
//! // Spawn mints a generation-checked handle.
//! let handle = pools
//!     .spawn(&mut world, DomainId(0), TemplateId(1), ORIGIN, NO_ROTATION, None)
//!     .unwrap();
//! let spawned = handle.resolve(&pools, &world).unwrap();
//!
//! // Despawn invalidates the handle immediately; the instance is parked
//! // for reuse at the next tick rather than destroyed.
//! pools.despawn(&mut world, &handle);
//! assert!(!handle.is_valid(&pools, &world));
//! pools.tick(&mut world);
//!
//! // The next spawn recycles the same physical instance, and the old
//! // handle still refuses to resolve to the new occupant.
//! let again = pools
//!     .spawn(&mut world, DomainId(0), TemplateId(1), ORIGIN, NO_ROTATION, None)
//!     .unwrap();
//! assert_eq!(again.raw(), spawned);
//! assert!(again.is_valid(&pools, &world));
//! assert!(!handle.is_valid(&pools, &world));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `respawn-core` | IDs, errors, and the collaborator traits |
//! | [`pool`] | `respawn-pool` | Slot allocators, instance records, handles |
//! | [`registry`] | `respawn-registry` | Per-domain registries and [`registry::Pools`] |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, errors, and collaborator traits (`respawn-core`).
///
/// Contains the ID newtypes, [`types::SpawnError`] and
/// [`types::ReplaceError`], and the [`types::Host`], [`types::Domains`],
/// and [`types::RecordSource`] traits.
pub use respawn_core as types;

/// Slot allocation and handles (`respawn-pool`).
///
/// [`pool::SlotAllocator`] manages one template's active/free/pending
/// slot state; [`pool::Handle`] is the generation-checked weak
/// reference.
pub use respawn_pool as pool;

/// Per-domain registries and the process-scoped set (`respawn-registry`).
///
/// [`registry::Registry`] routes templates to allocators within one
/// domain; [`registry::Pools`] holds every live registry and drives
/// cross-domain despawn routing.
pub use respawn_registry as registry;

/// Common imports for typical Respawn usage.
///
/// ```rust
/// use respawn::prelude::*;
/// ```
pub mod prelude {
    // IDs and placements
    pub use respawn_core::{
        AllocatorId, ContainerId, DomainId, Generation, InstanceId, Orientation, Position,
        TemplateId, NO_ROTATION, ORIGIN,
    };

    // Collaborator traits and lifecycle events
    pub use respawn_core::{Domains, Host, Lifecycle, RecordSource};

    // Errors
    pub use respawn_core::{ReplaceError, SpawnError};

    // Pool layer
    pub use respawn_pool::{Handle, SlotAllocator, TickReport};

    // Registry layer
    pub use respawn_registry::{Pools, Registry};
}
