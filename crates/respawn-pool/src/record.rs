//! Instance records: the binding between a live instance and the
//! allocator that owns its slot.

use respawn_core::{AllocatorId, Generation, InstanceId, RecordSource};

/// Immutable `{instance, allocator}` pair.
///
/// The record never stores a generation of its own — the current value
/// is always fetched from the owning allocator's counter table, so two
/// records (or a record and a handle) observing the same slot can never
/// disagree. Absence of a record for an instance means "not
/// pool-managed", not "invalid".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstanceRecord {
    instance: InstanceId,
    allocator: AllocatorId,
}

impl InstanceRecord {
    /// Bind `instance` to the allocator owning its slot.
    pub fn new(instance: InstanceId, allocator: AllocatorId) -> Self {
        Self {
            instance,
            allocator,
        }
    }

    /// The recorded instance.
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    /// The allocator owning the instance's slot.
    pub fn allocator(&self) -> AllocatorId {
        self.allocator
    }

    /// The slot's current generation, fetched fresh from the allocator.
    ///
    /// `None` if the allocator no longer tracks the slot (the instance
    /// was destroyed).
    pub fn current_generation<S: RecordSource + ?Sized>(&self, source: &S) -> Option<Generation> {
        source.generation_of(self.allocator, self.instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SingleSlot {
        allocator: AllocatorId,
        instance: InstanceId,
        generation: Generation,
    }

    impl RecordSource for SingleSlot {
        fn owner_of(&self, instance: InstanceId) -> Option<AllocatorId> {
            (instance == self.instance).then_some(self.allocator)
        }

        fn generation_of(
            &self,
            allocator: AllocatorId,
            instance: InstanceId,
        ) -> Option<Generation> {
            (allocator == self.allocator && instance == self.instance).then_some(self.generation)
        }
    }

    #[test]
    fn generation_is_always_fetched_fresh() {
        let allocator = AllocatorId::next();
        let instance = InstanceId(7);
        let record = InstanceRecord::new(instance, allocator);

        let mut slot = SingleSlot {
            allocator,
            instance,
            generation: Generation(0),
        };
        assert_eq!(record.current_generation(&slot), Some(Generation(0)));

        slot.generation = Generation(3);
        assert_eq!(record.current_generation(&slot), Some(Generation(3)));
    }

    #[test]
    fn unknown_allocator_yields_none() {
        let record = InstanceRecord::new(InstanceId(1), AllocatorId::next());
        let slot = SingleSlot {
            allocator: AllocatorId::next(),
            instance: InstanceId(1),
            generation: Generation(0),
        };
        assert_eq!(record.current_generation(&slot), None);
    }
}
