//! Per-template slot allocator: free/active lists, the pending-release
//! queue, and the generation counter table.
//!
//! One [`SlotAllocator`] manages every instance ever spawned from one
//! template. Despawned instances are deactivated and parked in the
//! domain's holding container immediately, but only migrate from the
//! active list to the free list when [`tick()`](SlotAllocator::tick)
//! drains the pending-release queue at the next frame boundary.

use std::collections::VecDeque;

use indexmap::IndexMap;

use respawn_core::{
    AllocatorId, ContainerId, DomainId, Domains, Generation, Host, InstanceId, Lifecycle,
    Orientation, Position, SpawnError, TemplateId, NO_ROTATION, ORIGIN,
};

// ── TickReport ───────────────────────────────────────────────────

/// What one `tick()` sweep did.
///
/// Summed across allocators by the registry layer; useful for telemetry
/// and for tests asserting on deferred-release behaviour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Slots physically migrated from active to free.
    pub released: usize,
    /// Reactivation notifications delivered.
    pub reactivated: usize,
}

impl TickReport {
    /// Fold another report into this one.
    pub fn absorb(&mut self, other: TickReport) {
        self.released += other.released;
        self.reactivated += other.reactivated;
    }
}

// ── SlotAllocator ────────────────────────────────────────────────

/// Per-template manager of active/free/pending-release slot state.
///
/// The free list is a stack: the most recently released slot is the
/// first candidate for reuse. The pending-release queue is strictly
/// FIFO by despawn submission order.
///
/// Allocators are identified by a process-unique [`AllocatorId`] rather
/// than by their template, because template replacement reroutes the
/// template key to a different allocator while instances of the old one
/// are still live.
#[derive(Debug)]
pub struct SlotAllocator {
    id: AllocatorId,
    template: TemplateId,
    domain: DomainId,
    holding: ContainerId,
    active: Vec<InstanceId>,
    free: Vec<InstanceId>,
    pending_release: VecDeque<InstanceId>,
    /// Instances recycled this tick whose reactivation notification is
    /// still owed.
    reactivated: Vec<InstanceId>,
    /// Per-slot generation counters. Entries live as long as the slot:
    /// they survive despawn and reuse, and are dropped only when the
    /// instance itself is destroyed.
    generations: IndexMap<InstanceId, Generation>,
}

impl SlotAllocator {
    /// Create an empty allocator for `template`, parking despawned
    /// instances in `holding` within `domain`.
    pub fn new(template: TemplateId, domain: DomainId, holding: ContainerId) -> Self {
        Self {
            id: AllocatorId::next(),
            template,
            domain,
            holding,
            active: Vec::new(),
            free: Vec::new(),
            pending_release: VecDeque::new(),
            reactivated: Vec::new(),
            generations: IndexMap::new(),
        }
    }

    /// This allocator's process-unique identity.
    pub fn id(&self) -> AllocatorId {
        self.id
    }

    /// The template this allocator spawns from.
    pub fn template(&self) -> TemplateId {
        self.template
    }

    /// The domain this allocator belongs to.
    pub fn domain(&self) -> DomainId {
        self.domain
    }

    /// In-use instances. Includes instances queued for release until the
    /// next tick processes them: despawn is logically immediate but
    /// physically deferred.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Instances parked and available for reuse.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Instances queued for release this tick.
    pub fn pending_count(&self) -> usize {
        self.pending_release.len()
    }

    /// The in-use instances, release-queued ones included.
    pub fn active(&self) -> &[InstanceId] {
        &self.active
    }

    /// Current generation of `instance`'s slot, if this allocator tracks
    /// it.
    pub fn generation_of(&self, instance: InstanceId) -> Option<Generation> {
        self.generations.get(&instance).copied()
    }

    /// Whether the next tick has anything to do here.
    pub fn has_pending_work(&self) -> bool {
        !self.pending_release.is_empty() || !self.reactivated.is_empty()
    }

    /// Spawn an instance, recycling from the free list when possible.
    ///
    /// Recycled instances get their transient state reset, are
    /// reparented into `container`, reactivated, and — if their slot has
    /// been despawned before — queued for a [`Lifecycle::Reactivated`]
    /// notification on the next tick. When the free list is empty a
    /// fresh instance is built from the template; if it ends up
    /// unparented it is migrated into this allocator's domain unless the
    /// domain is persistent.
    pub fn spawn<H: Host + Domains>(
        &mut self,
        host: &mut H,
        position: Position,
        orientation: Orientation,
        container: Option<ContainerId>,
    ) -> Result<InstanceId, SpawnError> {
        // Drop free entries destroyed behind our back, counters included.
        let generations = &mut self.generations;
        self.free.retain(|&instance| {
            if host.exists(instance) {
                true
            } else {
                generations.swap_remove(&instance);
                false
            }
        });

        let instance = if let Some(instance) = self.free.pop() {
            host.place(instance, position, orientation);
            host.reset_motion(instance);
            host.reparent(instance, container, true);
            host.set_active(instance, true);
            host.restore_defaults(instance);

            let generation = self
                .generations
                .get(&instance)
                .copied()
                .unwrap_or(Generation::FIRST);
            if generation > Generation::FIRST {
                self.reactivated.push(instance);
            }
            instance
        } else {
            let instance = host
                .instantiate(self.template, position, orientation, container)
                .ok_or(SpawnError::InvalidTemplate {
                    template: self.template,
                })?;
            self.generations.insert(instance, Generation::FIRST);
            if container.is_none() && !host.is_persistent(self.domain) {
                host.migrate(instance, self.domain);
            }
            instance
        };

        self.active.push(instance);
        Ok(instance)
    }

    /// Queue `instance` for release.
    ///
    /// Idempotent: re-despawning a queued or already-released instance,
    /// or despawning one that no longer exists, is a no-op returning
    /// `false`. Only instances currently on the active list are
    /// accepted, so a slot can never end up on the free list twice.
    ///
    /// An accepted instance receives [`Lifecycle::AboutToDespawn`], is
    /// deactivated and parked in the holding container, and its slot's
    /// generation is bumped — which alone invalidates every outstanding
    /// handle, before this call returns. The active→free migration
    /// happens at the next tick.
    pub fn despawn<H: Host>(&mut self, host: &mut H, instance: InstanceId) -> bool {
        if !self.active.contains(&instance)
            || self.pending_release.contains(&instance)
            || !host.exists(instance)
        {
            return false;
        }

        host.deliver(instance, Lifecycle::AboutToDespawn);
        host.set_active(instance, false);
        host.reparent(instance, Some(self.holding), false);

        let slot = self.generations.entry(instance).or_insert(Generation::FIRST);
        *slot = slot.next();

        self.pending_release.push_back(instance);
        true
    }

    /// Despawn every active instance.
    pub fn despawn_all<H: Host>(&mut self, host: &mut H) {
        // Externally destroyed instances can linger on the active list;
        // despawn would refuse them and tick would never migrate them.
        self.active.retain(|&instance| host.exists(instance));
        for instance in self.active.clone() {
            self.despawn(host, instance);
        }
    }

    /// Process the pending-release queue (strictly FIFO), then deliver
    /// the reactivation notifications owed from this tick's spawns.
    pub fn tick<H: Host>(&mut self, host: &mut H) -> TickReport {
        let mut report = TickReport::default();

        while let Some(instance) = self.pending_release.pop_front() {
            if let Some(pos) = self.active.iter().position(|&i| i == instance) {
                self.active.remove(pos);
            }
            if !host.exists(instance) {
                self.generations.swap_remove(&instance);
                continue;
            }
            host.reset_motion(instance);
            self.free.push(instance);
            report.released += 1;
        }

        for instance in std::mem::take(&mut self.reactivated) {
            if host.exists(instance) {
                host.deliver(instance, Lifecycle::Reactivated);
                report.reactivated += 1;
            }
        }

        report
    }

    /// Ensure `free + active >= count` by building inert instances into
    /// the free list.
    pub fn preallocate<H: Host>(&mut self, host: &mut H, count: usize) -> Result<(), SpawnError> {
        let have = self.free.len() + self.active.len();
        for _ in have..count {
            let instance = host
                .instantiate(self.template, ORIGIN, NO_ROTATION, Some(self.holding))
                .ok_or(SpawnError::InvalidTemplate {
                    template: self.template,
                })?;
            host.set_active(instance, false);
            self.generations.insert(instance, Generation::FIRST);
            self.free.push(instance);
        }
        Ok(())
    }

    /// Seed the free list with an externally constructed instance at
    /// generation zero. Returns `false` if the instance does not exist.
    pub fn adopt<H: Host>(&mut self, host: &mut H, instance: InstanceId) -> bool {
        if !host.exists(instance) || self.generations.contains_key(&instance) {
            return false;
        }
        host.set_active(instance, false);
        host.reparent(instance, Some(self.holding), false);
        self.generations.insert(instance, Generation::FIRST);
        self.free.push(instance);
        true
    }

    /// Destroy all free instances, then preallocate back to the prior
    /// free count. Used after the host mutates the template.
    ///
    /// Returns the destroyed instances so the owning registry can drop
    /// their records.
    pub fn rebuild<H: Host>(&mut self, host: &mut H) -> Result<Vec<InstanceId>, SpawnError> {
        let prior = self.free.len();
        let destroyed = self.clear(host);
        self.preallocate(host, prior)?;
        Ok(destroyed)
    }

    /// Destroy all free instances and drop their generation counters.
    /// Active instances are unaffected.
    ///
    /// Returns the destroyed instances so the owning registry can drop
    /// their records.
    pub fn clear<H: Host>(&mut self, host: &mut H) -> Vec<InstanceId> {
        let freed: Vec<InstanceId> = self.free.drain(..).collect();
        for &instance in &freed {
            host.destroy(instance);
            self.generations.swap_remove(&instance);
        }
        freed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use respawn_test_utils::MockHost;

    const TEMPLATE: TemplateId = TemplateId(1);
    const DOMAIN: DomainId = DomainId(0);

    fn make_allocator(host: &mut MockHost) -> SlotAllocator {
        let holding = host.holding(DOMAIN, TEMPLATE);
        SlotAllocator::new(TEMPLATE, DOMAIN, holding)
    }

    #[test]
    fn preallocate_builds_inert_instances() {
        let mut host = MockHost::new();
        let mut alloc = make_allocator(&mut host);

        alloc.preallocate(&mut host, 3).unwrap();

        assert_eq!(alloc.free_count(), 3);
        assert_eq!(alloc.active_count(), 0);
        for (_, m) in &host.instances {
            assert!(!m.active);
            assert!(m.alive);
        }
    }

    #[test]
    fn preallocate_counts_existing_instances() {
        let mut host = MockHost::new();
        let mut alloc = make_allocator(&mut host);

        alloc.preallocate(&mut host, 2).unwrap();
        alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        alloc.preallocate(&mut host, 2).unwrap();

        // free(1) + active(1) already satisfies the target.
        assert_eq!(alloc.free_count() + alloc.active_count(), 2);
    }

    #[test]
    fn spawn_recycles_most_recent_release_first() {
        let mut host = MockHost::new();
        let mut alloc = make_allocator(&mut host);

        let a = alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        let b = alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        alloc.despawn(&mut host, a);
        alloc.despawn(&mut host, b);
        alloc.tick(&mut host);

        // Release order was a then b; the stack hands b back first.
        assert_eq!(
            alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap(),
            b
        );
        assert_eq!(
            alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap(),
            a
        );
    }

    #[test]
    fn spawn_instantiates_when_free_list_empty() {
        let mut host = MockHost::new();
        let mut alloc = make_allocator(&mut host);

        let i = alloc
            .spawn(&mut host, [1.0, 2.0, 3.0], NO_ROTATION, None)
            .unwrap();

        assert_eq!(alloc.active_count(), 1);
        assert_eq!(alloc.generation_of(i), Some(Generation::FIRST));
        assert_eq!(host.instance(i).position, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn spawn_reports_uninstantiable_template() {
        let mut host = MockHost::new();
        host.fail_template(TEMPLATE);
        let mut alloc = make_allocator(&mut host);

        let err = alloc
            .spawn(&mut host, ORIGIN, NO_ROTATION, None)
            .unwrap_err();
        assert_eq!(err, SpawnError::InvalidTemplate { template: TEMPLATE });
        assert_eq!(alloc.active_count(), 0);
    }

    #[test]
    fn spawn_discards_externally_destroyed_free_entries() {
        let mut host = MockHost::new();
        let mut alloc = make_allocator(&mut host);

        alloc.preallocate(&mut host, 2).unwrap();
        let doomed = *host.instances.keys().last().unwrap();
        host.destroy_external(doomed);

        let i = alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();

        assert_ne!(i, doomed);
        assert_eq!(alloc.free_count(), 0);
        assert_eq!(alloc.generation_of(doomed), None);
    }

    #[test]
    fn spawn_resets_recycled_instance_state() {
        let mut host = MockHost::new();
        let mut alloc = make_allocator(&mut host);

        let i = alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        alloc.despawn(&mut host, i);
        alloc.tick(&mut host);
        alloc
            .spawn(&mut host, [5.0, 0.0, 0.0], NO_ROTATION, None)
            .unwrap();

        let m = host.instance(i);
        assert!(m.active);
        assert_eq!(m.position, [5.0, 0.0, 0.0]);
        // Once on despawn-tick, once on respawn.
        assert_eq!(m.motion_resets, 2);
        assert_eq!(m.defaults_restored, 1);
    }

    #[test]
    fn despawn_is_deferred_until_tick() {
        let mut host = MockHost::new();
        let mut alloc = make_allocator(&mut host);

        let i = alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        assert!(alloc.despawn(&mut host, i));

        // Logically despawned: inactive, parked, generation bumped...
        assert!(!host.instance(i).active);
        assert_eq!(alloc.generation_of(i), Some(Generation(1)));
        // ...but still reported active until the tick sweep.
        assert_eq!(alloc.active_count(), 1);
        assert_eq!(alloc.free_count(), 0);

        let report = alloc.tick(&mut host);
        assert_eq!(report.released, 1);
        assert_eq!(alloc.active_count(), 0);
        assert_eq!(alloc.free_count(), 1);
    }

    #[test]
    fn despawn_is_idempotent() {
        let mut host = MockHost::new();
        let mut alloc = make_allocator(&mut host);

        let i = alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        assert!(alloc.despawn(&mut host, i));
        assert!(!alloc.despawn(&mut host, i));

        // Exactly one generation bump and one queue entry.
        assert_eq!(alloc.generation_of(i), Some(Generation(1)));
        assert_eq!(alloc.pending_count(), 1);
    }

    #[test]
    fn despawn_of_released_instance_keeps_free_list_unique() {
        let mut host = MockHost::new();
        let mut alloc = make_allocator(&mut host);

        let i = alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        alloc.despawn(&mut host, i);
        alloc.tick(&mut host);

        // The slot already migrated to the free list; a second despawn
        // must be refused, not re-queued.
        assert!(!alloc.despawn(&mut host, i));
        alloc.tick(&mut host);

        assert_eq!(alloc.free_count(), 1);
        assert_eq!(alloc.active_count(), 0);
        // No extra generation bump either.
        assert_eq!(alloc.generation_of(i), Some(Generation(1)));

        // One physical instance, one slot: a single spawn drains the
        // free list completely.
        assert_eq!(
            alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap(),
            i
        );
        assert_eq!(alloc.free_count(), 0);
        assert_eq!(alloc.active_count(), 1);
    }

    #[test]
    fn despawn_of_destroyed_instance_is_guarded_noop() {
        let mut host = MockHost::new();
        let mut alloc = make_allocator(&mut host);

        let i = alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        host.destroy_external(i);

        assert!(!alloc.despawn(&mut host, i));
        assert_eq!(alloc.pending_count(), 0);
    }

    #[test]
    fn generation_increments_only_on_despawn() {
        let mut host = MockHost::new();
        let mut alloc = make_allocator(&mut host);

        let i = alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        assert_eq!(alloc.generation_of(i), Some(Generation(0)));

        alloc.despawn(&mut host, i);
        alloc.tick(&mut host);
        assert_eq!(alloc.generation_of(i), Some(Generation(1)));

        // Respawning the same slot does not bump the counter.
        let again = alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        assert_eq!(again, i);
        assert_eq!(alloc.generation_of(i), Some(Generation(1)));
    }

    #[test]
    fn pending_release_processed_fifo() {
        let mut host = MockHost::new();
        let mut alloc = make_allocator(&mut host);

        let a = alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        let b = alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        let c = alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        alloc.despawn(&mut host, b);
        alloc.despawn(&mut host, a);
        alloc.despawn(&mut host, c);
        alloc.tick(&mut host);

        // Freed in submission order b, a, c; the stack top is the last.
        assert_eq!(
            alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap(),
            c
        );
    }

    #[test]
    fn reactivation_notification_is_batched_to_next_tick() {
        let mut host = MockHost::new();
        let mut alloc = make_allocator(&mut host);

        let i = alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        // First spawn of a fresh instance: no reactivation owed.
        alloc.tick(&mut host);
        assert!(host.delivered.is_empty());

        alloc.despawn(&mut host, i);
        alloc.tick(&mut host);
        host.delivered.clear();

        alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        // Not delivered synchronously with the spawn.
        assert!(host.delivered.is_empty());

        let report = alloc.tick(&mut host);
        assert_eq!(report.reactivated, 1);
        assert_eq!(host.delivered, vec![(i, Lifecycle::Reactivated)]);

        // One-time: the next tick owes nothing.
        let report = alloc.tick(&mut host);
        assert_eq!(report.reactivated, 0);
    }

    #[test]
    fn about_to_despawn_is_delivered_synchronously() {
        let mut host = MockHost::new();
        let mut alloc = make_allocator(&mut host);

        let i = alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        alloc.despawn(&mut host, i);

        assert_eq!(host.delivered, vec![(i, Lifecycle::AboutToDespawn)]);
    }

    #[test]
    fn despawn_all_covers_every_active_instance() {
        let mut host = MockHost::new();
        let mut alloc = make_allocator(&mut host);

        for _ in 0..3 {
            alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        }
        alloc.despawn_all(&mut host);
        alloc.tick(&mut host);

        assert_eq!(alloc.active_count(), 0);
        assert_eq!(alloc.free_count(), 3);
    }

    #[test]
    fn despawn_all_drops_externally_destroyed_actives() {
        let mut host = MockHost::new();
        let mut alloc = make_allocator(&mut host);

        let a = alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        host.destroy_external(a);

        alloc.despawn_all(&mut host);
        alloc.tick(&mut host);

        assert_eq!(alloc.active_count(), 0);
        assert_eq!(alloc.free_count(), 1);
    }

    #[test]
    fn clear_destroys_free_but_not_active() {
        let mut host = MockHost::new();
        let mut alloc = make_allocator(&mut host);

        alloc.preallocate(&mut host, 2).unwrap();
        let live = alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();

        let freed = alloc.clear(&mut host);

        assert_eq!(freed.len(), 1);
        assert_eq!(alloc.free_count(), 0);
        assert_eq!(alloc.active_count(), 1);
        assert!(host.exists(live));
        assert!(!host.exists(freed[0]));
        assert_eq!(alloc.generation_of(freed[0]), None);
    }

    #[test]
    fn rebuild_replaces_free_instances() {
        let mut host = MockHost::new();
        let mut alloc = make_allocator(&mut host);

        alloc.preallocate(&mut host, 3).unwrap();
        alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        let old_free = alloc.free_count();

        let destroyed = alloc.rebuild(&mut host).unwrap();

        assert_eq!(destroyed.len(), old_free);
        for i in destroyed {
            assert!(!host.exists(i));
        }
        // Topped back up to the prior free count, net of actives.
        assert_eq!(alloc.free_count() + alloc.active_count(), old_free);
        assert_eq!(alloc.active_count(), 1);
    }

    #[test]
    fn adopt_seeds_free_list_at_generation_zero() {
        let mut host = MockHost::new();
        let mut alloc = make_allocator(&mut host);

        let stray = host.create_raw(TEMPLATE);
        assert!(alloc.adopt(&mut host, stray));
        assert!(!alloc.adopt(&mut host, stray));

        assert_eq!(alloc.free_count(), 1);
        assert_eq!(alloc.generation_of(stray), Some(Generation::FIRST));
        assert!(!host.instance(stray).active);

        // Adopted instances come back out of the free list like any
        // other, with no reactivation owed.
        let i = alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        assert_eq!(i, stray);
        alloc.tick(&mut host);
        assert!(host.delivered.is_empty());
    }

    #[test]
    fn unparented_spawn_migrates_into_domain() {
        let mut host = MockHost::new();
        let mut alloc = make_allocator(&mut host);

        let i = alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        assert_eq!(host.migrations, vec![(i, DOMAIN)]);
    }

    #[test]
    fn parented_spawn_does_not_migrate() {
        let mut host = MockHost::new();
        let mut alloc = make_allocator(&mut host);
        let container = host.holding(DOMAIN, TemplateId(99));

        alloc
            .spawn(&mut host, ORIGIN, NO_ROTATION, Some(container))
            .unwrap();
        assert!(host.migrations.is_empty());
    }

    #[test]
    fn persistent_domain_spawn_does_not_migrate() {
        let mut host = MockHost::new();
        host.mark_persistent(DOMAIN);
        let mut alloc = make_allocator(&mut host);

        alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
        assert!(host.migrations.is_empty());
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        /// One step of a randomized allocator workout.
        #[derive(Clone, Copy, Debug)]
        enum Op {
            Spawn,
            /// Despawn the n-th active instance (mod the active count).
            Despawn(usize),
            Tick,
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                Just(Op::Spawn),
                (0usize..8).prop_map(Op::Despawn),
                Just(Op::Tick),
            ]
        }

        proptest! {
            #[test]
            fn counts_are_conserved(ops in proptest::collection::vec(op_strategy(), 1..60)) {
                let mut host = MockHost::new();
                let mut alloc = make_allocator(&mut host);
                let mut created = 0usize;

                for op in ops {
                    match op {
                        Op::Spawn => {
                            let before = alloc.free_count();
                            alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
                            if before == 0 {
                                created += 1;
                            }
                        }
                        Op::Despawn(n) => {
                            if alloc.active_count() > 0 {
                                let i = alloc.active()[n % alloc.active_count()];
                                alloc.despawn(&mut host, i);
                            }
                        }
                        Op::Tick => {
                            alloc.tick(&mut host);
                        }
                    }
                    // Absent external destruction, every instance ever
                    // created is either active or free.
                    prop_assert_eq!(alloc.active_count() + alloc.free_count(), created);
                }
            }

            #[test]
            fn generations_never_decrease(ops in proptest::collection::vec(op_strategy(), 1..60)) {
                let mut host = MockHost::new();
                let mut alloc = make_allocator(&mut host);
                let mut seen: std::collections::HashMap<InstanceId, Generation> =
                    std::collections::HashMap::new();

                for op in ops {
                    match op {
                        Op::Spawn => {
                            alloc.spawn(&mut host, ORIGIN, NO_ROTATION, None).unwrap();
                        }
                        Op::Despawn(n) => {
                            if alloc.active_count() > 0 {
                                let i = alloc.active()[n % alloc.active_count()];
                                alloc.despawn(&mut host, i);
                            }
                        }
                        Op::Tick => {
                            alloc.tick(&mut host);
                        }
                    }
                    for (&instance, &generation) in seen.iter() {
                        if let Some(current) = alloc.generation_of(instance) {
                            prop_assert!(current >= generation);
                        }
                    }
                    for &instance in alloc.active() {
                        if let Some(g) = alloc.generation_of(instance) {
                            seen.insert(instance, g);
                        }
                    }
                }
            }
        }
    }
}
