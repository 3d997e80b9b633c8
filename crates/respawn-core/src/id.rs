//! Strongly-typed identifiers and placement aliases.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies a spawnable blueprint within the host.
///
/// Templates are opaque to the pool core: the host assigns the numeric
/// key and maps it back to whatever it instantiates from (a prefab, an
/// archetype, a serialized description). The core only requires that
/// equal keys denote the same blueprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(pub u64);

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TemplateId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies one spawned instance within the host.
///
/// Instance identities are never reused by a conforming host: once an
/// instance is destroyed, its ID stays dead. Handle resolution relies
/// on this to distinguish "destroyed" from "recycled".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for InstanceId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies an attachment point in the host scene graph.
///
/// Spawned instances are parented into a container; despawned instances
/// are parked in a per-template holding container owned by the domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub u64);

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ContainerId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies a domain: the scoped universe (e.g. a scene) that owns one
/// registry and its allocators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainId(pub u32);

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for DomainId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Counter for unique [`AllocatorId`] allocation.
static ALLOCATOR_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for a slot allocator.
///
/// Allocated from a monotonic atomic counter via [`AllocatorId::next`].
/// Allocators are routed by template key for spawning, but instance
/// records must keep pointing at the allocator that owns their slot even
/// after a template replace reroutes the key, so records address
/// allocators by this ID rather than by template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AllocatorId(u64);

impl AllocatorId {
    /// Allocate a fresh, unique allocator ID.
    ///
    /// Each call returns an ID that has never been returned before
    /// within this process. Thread-safe.
    pub fn next() -> Self {
        Self(ALLOCATOR_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for AllocatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-slot recycling counter.
///
/// Incremented by exactly one each time the slot is despawned, never on
/// spawn. A handle captured against an older value can never resolve
/// again. 64 bits is wide enough that wraparound within one process
/// lifetime is not a practical concern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(pub u64);

impl Generation {
    /// The generation of a slot that has never been despawned.
    pub const FIRST: Generation = Generation(0);

    /// The generation after one more despawn of this slot.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Generation {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// A world-space position handed through to the host on spawn.
///
/// The core never computes with placements; they are opaque payload
/// forwarded to [`Host::instantiate`](crate::traits::Host::instantiate)
/// and [`Host::place`](crate::traits::Host::place).
pub type Position = [f32; 3];

/// A world-space orientation (quaternion, `[x, y, z, w]`) handed through
/// to the host on spawn.
pub type Orientation = [f32; 4];

/// The zero position.
pub const ORIGIN: Position = [0.0, 0.0, 0.0];

/// The identity orientation.
pub const NO_ROTATION: Orientation = [0.0, 0.0, 0.0, 1.0];
