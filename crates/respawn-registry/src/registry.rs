//! One registry per domain: template-to-allocator routing, the
//! instance-record table, and template replacement.

use indexmap::IndexMap;

use respawn_core::{
    AllocatorId, ContainerId, DomainId, Domains, Generation, Host, InstanceId, Orientation,
    Position, RecordSource, ReplaceError, SpawnError, TemplateId,
};
use respawn_pool::{Handle, InstanceRecord, SlotAllocator, TickReport};

use crate::walk::post_order;

/// Per-domain pool registry.
///
/// Owns one [`SlotAllocator`] per template spawned in this domain and
/// the record table binding every live pool-managed instance back to
/// its allocator. Allocators are addressed by [`AllocatorId`], with the
/// template key as a reroutable alias on top: [`replace`](Self::replace)
/// moves the alias to a different allocator while the displaced one
/// keeps serving the records of its surviving instances.
#[derive(Debug)]
pub struct Registry {
    domain: DomainId,
    allocators: IndexMap<AllocatorId, SlotAllocator>,
    /// Template alias → currently serving allocator.
    by_template: IndexMap<TemplateId, AllocatorId>,
    /// Allocators displaced by `replace`, keyed by the template they
    /// spawn from so `revert` (and a replace back) can reinstate them.
    overridden: IndexMap<TemplateId, AllocatorId>,
    records: IndexMap<InstanceId, InstanceRecord>,
    /// Tick self-suspension: set on any mutating call, cleared once a
    /// sweep finds no allocator with pending work.
    armed: bool,
}

impl Registry {
    /// Empty registry for `domain`.
    pub fn new(domain: DomainId) -> Self {
        Self {
            domain,
            allocators: IndexMap::new(),
            by_template: IndexMap::new(),
            overridden: IndexMap::new(),
            records: IndexMap::new(),
            armed: false,
        }
    }

    /// The domain this registry serves.
    pub fn domain(&self) -> DomainId {
        self.domain
    }

    /// Whether this registry tracks `instance`.
    pub fn owns(&self, instance: InstanceId) -> bool {
        self.records.contains_key(&instance)
    }

    /// The record for `instance`, if pool-managed here.
    pub fn record(&self, instance: InstanceId) -> Option<&InstanceRecord> {
        self.records.get(&instance)
    }

    /// The allocator currently serving `template`, if any.
    pub fn allocator(&self, template: TemplateId) -> Option<&SlotAllocator> {
        self.by_template
            .get(&template)
            .and_then(|id| self.allocators.get(id))
    }

    /// Whether the next tick would be a no-op.
    pub fn is_idle(&self) -> bool {
        !self.armed
    }

    fn allocator_mut(&mut self, id: AllocatorId) -> &mut SlotAllocator {
        self.allocators
            .get_mut(&id)
            .expect("allocator ids are never removed")
    }

    /// Route `template` to its allocator, creating one (and its holding
    /// container) on first use.
    fn route<H: Host + Domains + ?Sized>(
        &mut self,
        host: &mut H,
        template: TemplateId,
    ) -> AllocatorId {
        if let Some(&id) = self.by_template.get(&template) {
            return id;
        }
        let holding = host.holding(self.domain, template);
        let allocator = SlotAllocator::new(template, self.domain, holding);
        let id = allocator.id();
        self.allocators.insert(id, allocator);
        self.by_template.insert(template, id);
        id
    }

    // ── Spawning ─────────────────────────────────────────────────

    /// Spawn an instance of `template`, recycling a parked one when
    /// possible, and mint a handle to it.
    ///
    /// A record is created on first registration and persists across
    /// despawn/respawn of the slot. If construction destroys the
    /// instance before registration (the host is allowed to do that),
    /// no record is created and the returned handle never resolves.
    pub fn spawn<H: Host + Domains>(
        &mut self,
        host: &mut H,
        template: TemplateId,
        position: Position,
        orientation: Orientation,
        container: Option<ContainerId>,
    ) -> Result<Handle, SpawnError> {
        self.armed = true;
        let id = self.route(host, template);
        let instance = self
            .allocator_mut(id)
            .spawn(host, position, orientation, container)
            .map_err(|err| {
                log::error!("spawn failed in domain {}: {err}", self.domain);
                err
            })?;

        if host.exists(instance) {
            self.records
                .entry(instance)
                .or_insert_with(|| InstanceRecord::new(instance, id));
            let snapshot = self
                .generation_of(id, instance)
                .unwrap_or(Generation::FIRST);
            Ok(Handle::bound(instance, Some(self.domain), id, snapshot))
        } else {
            // Construction destroyed the instance before registration.
            Ok(Handle::from_raw(instance, Some(self.domain), self))
        }
    }

    /// Ensure `template`'s allocator holds at least `count` instances
    /// across its free and active lists.
    pub fn preallocate<H: Host + Domains>(
        &mut self,
        host: &mut H,
        template: TemplateId,
        count: usize,
    ) -> Result<(), SpawnError> {
        let id = self.route(host, template);
        self.allocator_mut(id).preallocate(host, count)
    }

    /// Hand an externally constructed instance to `template`'s free
    /// list. Returns `false` if the instance does not exist or is
    /// already tracked.
    pub fn adopt<H: Host + Domains>(
        &mut self,
        host: &mut H,
        template: TemplateId,
        instance: InstanceId,
    ) -> bool {
        let id = self.route(host, template);
        self.allocator_mut(id).adopt(host, instance)
    }

    // ── Despawning ───────────────────────────────────────────────

    /// Despawn `instance` alone, no hierarchy walk. Returns `false` if
    /// this registry does not own it; already-queued and destroyed
    /// instances still count as owned (the call is an idempotent no-op).
    pub fn despawn_direct<H: Host>(&mut self, host: &mut H, instance: InstanceId) -> bool {
        let Some(record) = self.records.get(&instance) else {
            return false;
        };
        let id = record.allocator();
        self.allocator_mut(id).despawn(host, instance);
        self.armed = true;
        true
    }

    /// Despawn `instance` and every pool-managed descendant owned by
    /// this registry, descendants first. Returns `false` if the root
    /// itself is not owned here (owned descendants are still despawned).
    pub fn despawn<H: Host>(&mut self, host: &mut H, instance: InstanceId) -> bool {
        let order = post_order(host, instance);
        let mut root_owned = false;
        for node in order {
            let owned = self.despawn_direct(host, node);
            if node == instance {
                root_owned = owned;
            }
        }
        root_owned
    }

    /// Despawn every active instance of every allocator, the displaced
    /// ones included.
    pub fn despawn_all<H: Host>(&mut self, host: &mut H) {
        for allocator in self.allocators.values_mut() {
            allocator.despawn_all(host);
        }
        self.armed = true;
    }

    // ── Tick ─────────────────────────────────────────────────────

    /// Drain every allocator's pending work, then suspend until the
    /// next mutating call re-arms the registry.
    pub fn tick<H: Host>(&mut self, host: &mut H) -> TickReport {
        if !self.armed {
            return TickReport::default();
        }
        let mut report = TickReport::default();
        for allocator in self.allocators.values_mut() {
            report.absorb(allocator.tick(host));
        }
        self.armed = self
            .allocators
            .values()
            .any(SlotAllocator::has_pending_work);
        report
    }

    // ── Template replacement ─────────────────────────────────────

    /// Reroute `template` to spawn `new_template` from now on.
    ///
    /// Active instances of the outgoing allocator are despawned (no
    /// hierarchy cascade), the outgoing allocator is stashed keyed by
    /// the template it actually spawns, and the incoming one — a
    /// previously stashed allocator for `new_template` if one exists,
    /// otherwise a fresh allocator preallocated to the outgoing
    /// capacity — takes over the alias. Replacing a template with
    /// itself is a no-op; replacing an unknown template is an error
    /// with no state changed.
    pub fn replace<H: Host + Domains>(
        &mut self,
        host: &mut H,
        template: TemplateId,
        new_template: TemplateId,
    ) -> Result<(), ReplaceError> {
        let Some(&outgoing) = self.by_template.get(&template) else {
            log::error!(
                "cannot replace {template} in domain {}: no allocator exists",
                self.domain
            );
            return Err(ReplaceError::UnknownTemplate { template });
        };
        let serving = self.allocator_mut(outgoing).template();
        if serving == new_template {
            log::info!(
                "{template} already served by {new_template} in domain {}",
                self.domain
            );
            return Ok(());
        }
        log::debug!(
            "replacing {template} (serving {serving}) with {new_template} in domain {}",
            self.domain
        );

        // Capacity to carry over, measured before the despawns queue up.
        let capacity = {
            let a = self.allocator_mut(outgoing);
            a.active_count() + a.free_count()
        };
        self.allocator_mut(outgoing).despawn_all(host);
        self.armed = true;

        let incoming = if let Some(id) = self.overridden.shift_remove(&new_template) {
            id
        } else {
            let holding = host.holding(self.domain, new_template);
            let allocator = SlotAllocator::new(new_template, self.domain, holding);
            let id = allocator.id();
            self.allocators.insert(id, allocator);
            self.allocator_mut(id)
                .preallocate(host, capacity)
                .map_err(|source| ReplaceError::Preallocate { source })?;
            id
        };

        self.overridden.insert(serving, outgoing);
        self.by_template.insert(template, incoming);
        Ok(())
    }

    /// Undo [`replace`](Self::replace): route `template` back to an
    /// allocator spawning `template` itself.
    pub fn revert<H: Host + Domains>(
        &mut self,
        host: &mut H,
        template: TemplateId,
    ) -> Result<(), ReplaceError> {
        self.replace(host, template, template)
    }

    // ── Maintenance ──────────────────────────────────────────────

    /// Destroy `template`'s free instances and rebuild them from the
    /// (presumably mutated) template. No-op for an unrouted template.
    pub fn rebuild<H: Host>(
        &mut self,
        host: &mut H,
        template: TemplateId,
    ) -> Result<(), SpawnError> {
        let Some(&id) = self.by_template.get(&template) else {
            return Ok(());
        };
        let destroyed = self.allocator_mut(id).rebuild(host)?;
        for instance in destroyed {
            self.records.swap_remove(&instance);
        }
        Ok(())
    }

    /// Destroy every parked instance across all allocators, dropping
    /// their records. Active instances are untouched.
    pub fn clear<H: Host>(&mut self, host: &mut H) {
        let mut freed = Vec::new();
        for allocator in self.allocators.values_mut() {
            freed.extend(allocator.clear(host));
        }
        for instance in freed {
            self.records.swap_remove(&instance);
        }
    }
}

impl RecordSource for Registry {
    fn owner_of(&self, instance: InstanceId) -> Option<AllocatorId> {
        self.records.get(&instance).map(InstanceRecord::allocator)
    }

    fn generation_of(&self, allocator: AllocatorId, instance: InstanceId) -> Option<Generation> {
        self.allocators
            .get(&allocator)
            .and_then(|a| a.generation_of(instance))
    }
}
