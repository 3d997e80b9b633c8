//! Test utilities and mock types for Respawn development.
//!
//! Provides [`MockHost`], an in-memory scene graph implementing the
//! [`Host`] and [`Domains`] collaborator traits, with scripting knobs
//! for the failure modes the pool must tolerate: uninstantiable
//! templates, instances that self-destruct during construction, and
//! external destruction behind the pool's back.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::collections::HashSet;

use indexmap::IndexMap;

use respawn_core::{
    ContainerId, DomainId, Domains, Host, InstanceId, Lifecycle, Orientation, Position, TemplateId,
};

/// One instance in the mock scene graph.
#[derive(Clone, Debug)]
pub struct MockInstance {
    pub template: TemplateId,
    pub position: Position,
    pub orientation: Orientation,
    /// Container the instance is attached to, if any.
    pub container: Option<ContainerId>,
    /// Parent instance, if attached to one (mutually exclusive with
    /// `container` in this mock).
    pub parent: Option<InstanceId>,
    /// Domain the instance has been migrated into, if any.
    pub domain: Option<DomainId>,
    pub active: bool,
    pub alive: bool,
    /// Times `reset_motion` was called on this instance.
    pub motion_resets: u32,
    /// Times `restore_defaults` was called on this instance.
    pub defaults_restored: u32,
}

/// Mock implementation of [`Host`] and [`Domains`].
///
/// Instance and container IDs are allocated from monotonic counters and
/// never reused, matching the identity contract the pool relies on.
pub struct MockHost {
    next_instance: u64,
    next_container: u64,
    pub instances: IndexMap<InstanceId, MockInstance>,
    /// Lifecycle events delivered, in order.
    pub delivered: Vec<(InstanceId, Lifecycle)>,
    /// Migrations performed, in order.
    pub migrations: Vec<(InstanceId, DomainId)>,
    /// Templates `instantiate` refuses to build.
    failing: HashSet<TemplateId>,
    /// Templates whose instances destroy themselves during construction.
    dying: HashSet<TemplateId>,
    /// Domains reported as persistent.
    persistent: HashSet<DomainId>,
    holdings: IndexMap<(DomainId, TemplateId), ContainerId>,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            next_instance: 1,
            next_container: 1,
            instances: IndexMap::new(),
            delivered: Vec::new(),
            migrations: Vec::new(),
            failing: HashSet::new(),
            dying: HashSet::new(),
            persistent: HashSet::new(),
            holdings: IndexMap::new(),
        }
    }

    /// Make `instantiate` return `None` for `template`.
    pub fn fail_template(&mut self, template: TemplateId) {
        self.failing.insert(template);
    }

    /// Make instances of `template` self-destruct during construction:
    /// `instantiate` returns an ID whose instance is already dead.
    pub fn die_on_construction(&mut self, template: TemplateId) {
        self.dying.insert(template);
    }

    /// Report `domain` as persistent/global.
    pub fn mark_persistent(&mut self, domain: DomainId) {
        self.persistent.insert(domain);
    }

    /// Destroy `instance` and its descendants without telling the pool,
    /// modelling destruction by means other than despawn.
    pub fn destroy_external(&mut self, instance: InstanceId) {
        self.kill_recursive(instance);
    }

    /// Attach `child` under `parent` in the instance hierarchy.
    pub fn attach(&mut self, parent: InstanceId, child: InstanceId) {
        if let Some(m) = self.instances.get_mut(&child) {
            m.parent = Some(parent);
            m.container = None;
        }
    }

    /// Create a live instance outside any pool (for adoption and
    /// unpooled-handle tests).
    pub fn create_raw(&mut self, template: TemplateId) -> InstanceId {
        let id = InstanceId(self.next_instance);
        self.next_instance += 1;
        self.instances.insert(
            id,
            MockInstance {
                template,
                position: respawn_core::ORIGIN,
                orientation: respawn_core::NO_ROTATION,
                container: None,
                parent: None,
                domain: None,
                active: true,
                alive: true,
                motion_resets: 0,
                defaults_restored: 0,
            },
        );
        id
    }

    /// Panicking accessor for an instance the test knows exists.
    pub fn instance(&self, id: InstanceId) -> &MockInstance {
        self.instances.get(&id).expect("instance not in mock host")
    }

    /// Number of live, active instances.
    pub fn live_active_count(&self) -> usize {
        self.instances.values().filter(|m| m.alive && m.active).count()
    }

    fn kill_recursive(&mut self, instance: InstanceId) {
        let kids: Vec<InstanceId> = self
            .instances
            .iter()
            .filter(|(_, m)| m.parent == Some(instance))
            .map(|(&id, _)| id)
            .collect();
        for kid in kids {
            self.kill_recursive(kid);
        }
        if let Some(m) = self.instances.get_mut(&instance) {
            m.alive = false;
            m.active = false;
        }
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for MockHost {
    fn instantiate(
        &mut self,
        template: TemplateId,
        position: Position,
        orientation: Orientation,
        container: Option<ContainerId>,
    ) -> Option<InstanceId> {
        if self.failing.contains(&template) {
            return None;
        }
        let id = InstanceId(self.next_instance);
        self.next_instance += 1;
        let alive = !self.dying.contains(&template);
        self.instances.insert(
            id,
            MockInstance {
                template,
                position,
                orientation,
                container,
                parent: None,
                domain: None,
                active: alive,
                alive,
                motion_resets: 0,
                defaults_restored: 0,
            },
        );
        Some(id)
    }

    fn exists(&self, instance: InstanceId) -> bool {
        self.instances.get(&instance).is_some_and(|m| m.alive)
    }

    fn children(&self, instance: InstanceId) -> Vec<InstanceId> {
        self.instances
            .iter()
            .filter(|(_, m)| m.alive && m.parent == Some(instance))
            .map(|(&id, _)| id)
            .collect()
    }

    fn parent(&self, instance: InstanceId) -> Option<InstanceId> {
        self.instances.get(&instance).and_then(|m| m.parent)
    }

    fn place(&mut self, instance: InstanceId, position: Position, orientation: Orientation) {
        if let Some(m) = self.instances.get_mut(&instance) {
            m.position = position;
            m.orientation = orientation;
        }
    }

    fn set_active(&mut self, instance: InstanceId, active: bool) {
        if let Some(m) = self.instances.get_mut(&instance) {
            if m.alive {
                m.active = active;
            }
        }
    }

    fn reparent(
        &mut self,
        instance: InstanceId,
        container: Option<ContainerId>,
        _keep_world_transform: bool,
    ) {
        if let Some(m) = self.instances.get_mut(&instance) {
            m.container = container;
            m.parent = None;
        }
    }

    fn destroy(&mut self, instance: InstanceId) {
        self.kill_recursive(instance);
    }

    fn deliver(&mut self, instance: InstanceId, event: Lifecycle) {
        if self.exists(instance) {
            self.delivered.push((instance, event));
        }
    }

    fn reset_motion(&mut self, instance: InstanceId) {
        if let Some(m) = self.instances.get_mut(&instance) {
            m.motion_resets += 1;
        }
    }

    fn restore_defaults(&mut self, instance: InstanceId) {
        if let Some(m) = self.instances.get_mut(&instance) {
            m.defaults_restored += 1;
        }
    }
}

impl Domains for MockHost {
    fn holding(&mut self, domain: DomainId, template: TemplateId) -> ContainerId {
        if let Some(&c) = self.holdings.get(&(domain, template)) {
            return c;
        }
        let c = ContainerId(self.next_container);
        self.next_container += 1;
        self.holdings.insert((domain, template), c);
        c
    }

    fn is_persistent(&self, domain: DomainId) -> bool {
        self.persistent.contains(&domain)
    }

    fn migrate(&mut self, instance: InstanceId, domain: DomainId) {
        self.migrations.push((instance, domain));
        if let Some(m) = self.instances.get_mut(&instance) {
            m.domain = Some(domain);
        }
    }
}
