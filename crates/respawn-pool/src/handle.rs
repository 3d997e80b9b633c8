//! Generational weak handles.
//!
//! A [`Handle`] captures `{target identity, owning domain, generation
//! snapshot}` at construction and resolves to its instance only while
//! the slot's current generation still equals the snapshot. Staleness
//! detection costs one integer comparison per resolve; no per-access
//! bookkeeping is attached to the instance itself.

use std::cell::Cell;
use std::fmt;
use std::hash::{Hash, Hasher};

use respawn_core::{AllocatorId, DomainId, Generation, Host, InstanceId, RecordSource};

/// Runtime resolution state. Transitions are one-way:
/// `Unresolved → {Unpooled, Bound} → Stale`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BindState {
    /// No record seen yet; the first resolve attempts one late-binding
    /// lookup (registration can race handle construction).
    Unresolved,
    /// No record exists: the target is not pool-managed and the handle
    /// is fresh for exactly as long as the target exists.
    Unpooled,
    /// Bound to the allocator owning the target's slot.
    Bound(AllocatorId),
    /// Permanently invalid. A stale handle never re-resolves, even if
    /// the same identity is respawned later; a new handle must be
    /// constructed for the new occupant.
    Stale,
}

/// Weak, generation-checked reference to a spawned instance.
///
/// Works for non-pooled instances too: those carry a sentinel snapshot
/// that is always considered fresh, and stay valid while the instance
/// exists.
///
/// # Equality and hashing
///
/// Two handles are equal iff they target the same identity *and*
/// captured the same generation snapshot — a stale handle never equals a
/// fresh handle to the recycled slot's current occupant. Both equality
/// and the hash are fixed at construction, so resolution state changes
/// never move a handle between hash buckets.
#[derive(Clone, Debug)]
pub struct Handle {
    target: InstanceId,
    domain: Option<DomainId>,
    /// Generation snapshot captured at construction. `None` is the
    /// sentinel for "no record existed yet": either the target is not
    /// pool-managed, or its first registration raced this handle — in
    /// which case the slot has necessarily never been despawned, so the
    /// snapshot it would have captured is [`Generation::FIRST`].
    captured: Option<Generation>,
    state: Cell<BindState>,
}

impl Handle {
    /// Handle for a freshly spawned, registered instance. Minted by the
    /// registry at spawn time.
    pub fn bound(
        target: InstanceId,
        domain: Option<DomainId>,
        allocator: AllocatorId,
        snapshot: Generation,
    ) -> Self {
        Self {
            target,
            domain,
            captured: Some(snapshot),
            state: Cell::new(BindState::Bound(allocator)),
        }
    }

    /// Handle for an arbitrary live instance, pooled or not.
    ///
    /// If `source` already has a record for `target`, its generation is
    /// captured now; otherwise binding is deferred to the first resolve.
    pub fn from_raw<S: RecordSource + ?Sized>(
        target: InstanceId,
        domain: Option<DomainId>,
        source: &S,
    ) -> Self {
        match source.owner_of(target) {
            Some(allocator) => match source.generation_of(allocator, target) {
                Some(generation) => Self::bound(target, domain, allocator, generation),
                // Owned but no longer counted: the slot is already gone.
                None => Self {
                    target,
                    domain,
                    captured: None,
                    state: Cell::new(BindState::Stale),
                },
            },
            None => Self {
                target,
                domain,
                captured: None,
                state: Cell::new(BindState::Unresolved),
            },
        }
    }

    /// The cached raw identity, regardless of validity.
    pub fn raw(&self) -> InstanceId {
        self.target
    }

    /// The domain of the registry this handle was minted by, if known.
    /// Used to route despawns to the owning registry first.
    pub fn domain(&self) -> Option<DomainId> {
        self.domain
    }

    /// The generation snapshot captured at construction, or `None` for
    /// the always-fresh sentinel.
    pub fn captured_generation(&self) -> Option<Generation> {
        self.captured
    }

    /// Resolve to the live instance, or `None` if the slot has been
    /// recycled or the instance no longer exists.
    ///
    /// A failed generation comparison poisons the handle permanently:
    /// it forgets its binding and every later resolve returns `None`
    /// without consulting `source` again.
    pub fn resolve<S, H>(&self, source: &S, host: &H) -> Option<InstanceId>
    where
        S: RecordSource + ?Sized,
        H: Host + ?Sized,
    {
        match self.state.get() {
            BindState::Stale => None,
            BindState::Unpooled => {
                if host.exists(self.target) {
                    Some(self.target)
                } else {
                    self.state.set(BindState::Stale);
                    None
                }
            }
            BindState::Unresolved => match source.owner_of(self.target) {
                Some(allocator) => {
                    self.state.set(BindState::Bound(allocator));
                    self.check(allocator, source, host)
                }
                None => {
                    self.state.set(BindState::Unpooled);
                    if host.exists(self.target) {
                        Some(self.target)
                    } else {
                        self.state.set(BindState::Stale);
                        None
                    }
                }
            },
            BindState::Bound(allocator) => self.check(allocator, source, host),
        }
    }

    /// Whether this handle currently resolves to a live instance.
    pub fn is_valid<S, H>(&self, source: &S, host: &H) -> bool
    where
        S: RecordSource + ?Sized,
        H: Host + ?Sized,
    {
        self.resolve(source, host).is_some()
    }

    /// Whether this handle currently resolves to exactly `instance`.
    ///
    /// This is the handle/raw-reference equality of the resolution
    /// contract: true iff the handle is valid and targets `instance`.
    pub fn targets<S, H>(&self, instance: InstanceId, source: &S, host: &H) -> bool
    where
        S: RecordSource + ?Sized,
        H: Host + ?Sized,
    {
        self.resolve(source, host) == Some(instance)
    }

    fn check<S, H>(&self, allocator: AllocatorId, source: &S, host: &H) -> Option<InstanceId>
    where
        S: RecordSource + ?Sized,
        H: Host + ?Sized,
    {
        let expected = self.captured.unwrap_or(Generation::FIRST);
        if host.exists(self.target)
            && source.generation_of(allocator, self.target) == Some(expected)
        {
            Some(self.target)
        } else {
            self.state.set(BindState::Stale);
            None
        }
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target && self.captured == other.captured
    }
}

impl Eq for Handle {}

impl Hash for Handle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target.hash(state);
        self.captured.hash(state);
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.captured {
            Some(generation) => write!(f, "Handle({}@{generation})", self.target),
            None => write!(f, "Handle({})", self.target),
        }
    }
}
