//! The process-scoped set of live registries.
//!
//! [`Pools`] is explicitly constructed and passed where needed; there is
//! no ambient global instance. It routes operations to the owning
//! domain's registry, and for despawns whose owner is unknown it scans
//! every registry before falling back to outright destruction.

use indexmap::IndexMap;

use respawn_core::{
    AllocatorId, ContainerId, DomainId, Domains, Generation, Host, InstanceId, Orientation,
    Position, RecordSource, ReplaceError, SpawnError, TemplateId,
};
use respawn_pool::{Handle, TickReport};

use crate::registry::Registry;
use crate::walk::post_order;

/// All live registries, keyed by domain.
#[derive(Debug, Default)]
pub struct Pools {
    registries: IndexMap<DomainId, Registry>,
}

impl Pools {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry for `domain`, creating it on first use.
    pub fn get_or_create(&mut self, domain: DomainId) -> &mut Registry {
        self.registries
            .entry(domain)
            .or_insert_with(|| Registry::new(domain))
    }

    /// The registry for `domain`, if one exists.
    pub fn registry(&self, domain: DomainId) -> Option<&Registry> {
        self.registries.get(&domain)
    }

    /// Mutable access to the registry for `domain`, if one exists.
    pub fn registry_mut(&mut self, domain: DomainId) -> Option<&mut Registry> {
        self.registries.get_mut(&domain)
    }

    /// Drop `domain`'s registry and all its bookkeeping. The host is
    /// expected to have destroyed (or to be about to destroy) the
    /// domain's instances wholesale; nothing is despawned here.
    pub fn teardown(&mut self, domain: DomainId) -> bool {
        self.registries.shift_remove(&domain).is_some()
    }

    // ── Routing ──────────────────────────────────────────────────

    /// Spawn `template` in `domain`.
    pub fn spawn<H: Host + Domains>(
        &mut self,
        host: &mut H,
        domain: DomainId,
        template: TemplateId,
        position: Position,
        orientation: Orientation,
        container: Option<ContainerId>,
    ) -> Result<Handle, SpawnError> {
        self.get_or_create(domain)
            .spawn(host, template, position, orientation, container)
    }

    /// Preallocate `count` instances of `template` in `domain`.
    pub fn preallocate<H: Host + Domains>(
        &mut self,
        host: &mut H,
        domain: DomainId,
        template: TemplateId,
        count: usize,
    ) -> Result<(), SpawnError> {
        self.get_or_create(domain).preallocate(host, template, count)
    }

    /// Reroute `template` in `domain`; see [`Registry::replace`].
    pub fn replace<H: Host + Domains>(
        &mut self,
        host: &mut H,
        domain: DomainId,
        template: TemplateId,
        new_template: TemplateId,
    ) -> Result<(), ReplaceError> {
        match self.registries.get_mut(&domain) {
            Some(registry) => registry.replace(host, template, new_template),
            None => Err(ReplaceError::UnknownTemplate { template }),
        }
    }

    /// Undo a replacement in `domain`; see [`Registry::revert`].
    pub fn revert<H: Host + Domains>(
        &mut self,
        host: &mut H,
        domain: DomainId,
        template: TemplateId,
    ) -> Result<(), ReplaceError> {
        self.replace(host, domain, template, template)
    }

    /// Tick every registry, summing what the sweeps did.
    pub fn tick<H: Host>(&mut self, host: &mut H) -> TickReport {
        let mut report = TickReport::default();
        for registry in self.registries.values_mut() {
            report.absorb(registry.tick(host));
        }
        report
    }

    // ── Despawning ───────────────────────────────────────────────

    /// Despawn through a handle. An invalid handle is a no-op returning
    /// `false`: whatever it once pointed at is already gone or recycled,
    /// and must not be confused with the slot's current occupant.
    pub fn despawn<H: Host>(&mut self, host: &mut H, handle: &Handle) -> bool {
        let Some(instance) = handle.resolve(&*self, host) else {
            return false;
        };
        self.despawn_instance(host, instance, handle.domain())
    }

    /// Despawn `instance` and its hierarchy, descendants first.
    ///
    /// Every node is offered to the `preferred` domain's registry first,
    /// then to each other registry in turn; pool-managed nodes are
    /// despawned by their owner, unmanaged descendants are left in
    /// place. If no registry recognizes the root it is destroyed
    /// outright — by then its pooled descendants have already been
    /// parked out of the hierarchy, so they survive. Returns whether the
    /// root was pool-managed.
    pub fn despawn_instance<H: Host>(
        &mut self,
        host: &mut H,
        instance: InstanceId,
        preferred: Option<DomainId>,
    ) -> bool {
        let order = post_order(host, instance);
        let mut root_owned = false;
        for node in order {
            let owned = self.offer_despawn(host, node, preferred);
            if node == instance {
                root_owned = owned;
            }
        }
        if !root_owned {
            log::warn!("no registry recognizes instance {instance}; destroying it");
            host.destroy(instance);
        }
        root_owned
    }

    /// Offer one node to the registries, preferred domain first.
    fn offer_despawn<H: Host>(
        &mut self,
        host: &mut H,
        instance: InstanceId,
        preferred: Option<DomainId>,
    ) -> bool {
        if let Some(domain) = preferred {
            if let Some(registry) = self.registries.get_mut(&domain) {
                if registry.despawn_direct(host, instance) {
                    return true;
                }
            }
        }
        for (&domain, registry) in self.registries.iter_mut() {
            if Some(domain) == preferred {
                continue;
            }
            if registry.despawn_direct(host, instance) {
                return true;
            }
        }
        false
    }

    // ── Handles ──────────────────────────────────────────────────

    /// Mint a handle to an arbitrary live instance, pooled or not.
    pub fn handle_of(&self, instance: InstanceId) -> Handle {
        let domain = self
            .registries
            .iter()
            .find(|(_, registry)| registry.owns(instance))
            .map(|(&domain, _)| domain);
        Handle::from_raw(instance, domain, self)
    }

    /// Walk up from `instance` to the nearest pool-managed ancestor
    /// (itself included) and mint a handle to it.
    ///
    /// With `include_unpooled`, an instance with no pooled ancestor
    /// still gets a handle — an unpooled one, valid while the instance
    /// exists. Without it, `None`.
    pub fn find_owner<H: Host + ?Sized>(
        &self,
        host: &H,
        instance: InstanceId,
        include_unpooled: bool,
    ) -> Option<Handle> {
        let mut current = Some(instance);
        while let Some(node) = current {
            if self.owner_of(node).is_some() {
                return Some(self.handle_of(node));
            }
            current = host.parent(node);
        }
        include_unpooled.then(|| self.handle_of(instance))
    }
}

impl RecordSource for Pools {
    fn owner_of(&self, instance: InstanceId) -> Option<AllocatorId> {
        self.registries
            .values()
            .find_map(|registry| registry.owner_of(instance))
    }

    fn generation_of(&self, allocator: AllocatorId, instance: InstanceId) -> Option<Generation> {
        self.registries
            .values()
            .find_map(|registry| registry.generation_of(allocator, instance))
    }
}
