//! Collaborator traits between the pool core and its host.
//!
//! The pool never touches a scene graph directly. Everything it needs
//! from the outside world — instantiation, hierarchy enumeration,
//! activation, reparenting, destruction — goes through [`Host`], and
//! everything domain-scoped (holding containers, persistence, cross-
//! domain migration) goes through [`Domains`]. [`RecordSource`] is the
//! narrow read-only surface handles resolve against, decoupling them
//! from any concrete registry type.

use std::fmt;

use crate::id::{
    AllocatorId, ContainerId, DomainId, Generation, InstanceId, Orientation, Position, TemplateId,
};

/// Lifecycle event delivered to an instance through its host.
///
/// Replaces the original design's loosely-typed broadcast notifications:
/// delivery is an explicit call on [`Host::deliver`], whose default
/// implementation is the no-receiver case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// The instance is about to be deactivated by a despawn. Delivered
    /// synchronously, before the generation bump.
    AboutToDespawn,
    /// The instance was recycled from the free list (its generation is
    /// nonzero). Delivered on the tick after the spawn, batched with
    /// pending-release processing.
    Reactivated,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AboutToDespawn => write!(f, "about-to-despawn"),
            Self::Reactivated => write!(f, "reactivated"),
        }
    }
}

/// Host scene-graph capabilities the pool core requires.
///
/// All mutation happens on the single logical thread that owns the pool;
/// implementations need no internal synchronization.
pub trait Host {
    /// Create a fresh instance of `template` at the given placement,
    /// parented into `container` (or detached at the domain root).
    ///
    /// Returns `None` if the template cannot be instantiated. The
    /// returned instance may already be dead ([`exists`](Host::exists)
    /// is `false`) if its construction logic destroyed it — the pool
    /// tolerates this and simply never tracks such instances.
    fn instantiate(
        &mut self,
        template: TemplateId,
        position: Position,
        orientation: Orientation,
        container: Option<ContainerId>,
    ) -> Option<InstanceId>;

    /// Whether `instance` still exists in the host.
    ///
    /// Instances destroyed behind the pool's back report `false` here;
    /// the pool treats them like any other stale slot.
    fn exists(&self, instance: InstanceId) -> bool;

    /// The direct children of `instance`, in hierarchy order.
    fn children(&self, instance: InstanceId) -> Vec<InstanceId>;

    /// The parent instance of `instance`, if it is attached to one.
    fn parent(&self, instance: InstanceId) -> Option<InstanceId>;

    /// Move `instance` to a new world-space placement.
    fn place(&mut self, instance: InstanceId, position: Position, orientation: Orientation);

    /// Activate or deactivate `instance`.
    fn set_active(&mut self, instance: InstanceId, active: bool);

    /// Reattach `instance` under `container` (or detach it to the domain
    /// root). `keep_world_transform` preserves the instance's world-space
    /// placement across the move.
    fn reparent(
        &mut self,
        instance: InstanceId,
        container: Option<ContainerId>,
        keep_world_transform: bool,
    );

    /// Destroy `instance` unconditionally. Must tolerate instances that
    /// are already gone.
    fn destroy(&mut self, instance: InstanceId);

    /// Deliver a lifecycle event to `instance`.
    ///
    /// The default implementation drops the event: hosts with no
    /// interested receivers need not override it.
    fn deliver(&mut self, _instance: InstanceId, _event: Lifecycle) {}

    /// Reset transient simulated state (velocity, collision suppression)
    /// on a recycled instance. Optional; defaults to a no-op for hosts
    /// without a physics collaborator.
    fn reset_motion(&mut self, _instance: InstanceId) {}

    /// Restore default visibility/ownership flags on a recycled
    /// instance. Optional; defaults to a no-op.
    fn restore_defaults(&mut self, _instance: InstanceId) {}
}

/// Domain-scoped capabilities: holding containers, persistence, and
/// cross-domain migration.
pub trait Domains {
    /// The inert holding container for despawned `template` instances in
    /// `domain`, created on first use.
    fn holding(&mut self, domain: DomainId, template: TemplateId) -> ContainerId;

    /// Whether `domain` is persistent/global (survives domain unloads).
    ///
    /// Freshly instantiated, unparented instances are migrated into
    /// their owning domain only when it is not persistent; persistent
    /// domains pin their objects at instantiation.
    fn is_persistent(&self, domain: DomainId) -> bool;

    /// Move `instance` across the domain boundary into `domain`.
    fn migrate(&mut self, instance: InstanceId, domain: DomainId);
}

/// Read-only lookup surface for handle resolution.
///
/// Implemented by the per-domain registry and by the process-scoped
/// registry set. Handles resolve through `&dyn`-compatible lookups
/// rather than referencing a registry type directly, so a handle minted
/// in one domain can be resolved against the whole set.
pub trait RecordSource {
    /// The allocator owning `instance`, if it is pool-managed.
    ///
    /// Absence means "not pool-managed", not "invalid": such instances
    /// are valid for exactly as long as they exist.
    fn owner_of(&self, instance: InstanceId) -> Option<AllocatorId>;

    /// The current generation of `instance`'s slot within `allocator`.
    ///
    /// Always fetched fresh from the allocator's counter table — never
    /// cached — so every record and handle observing the slot agrees.
    fn generation_of(&self, allocator: AllocatorId, instance: InstanceId) -> Option<Generation>;
}
