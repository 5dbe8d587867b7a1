use bevy::prelude::*;
use std::collections::VecDeque;

/// A decaying request to press blades down within `radius` of `position`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlattenEntry {
    pub position: Vec3,
    pub radius: f32,
    pub weight: f32,
    /// Seconds remaining.
    pub lifetime: f32,
    /// Lifetime at registration, used by the kernel to fade the impression out.
    pub max_lifetime: f32,
}

impl FlattenEntry {
    /// Placeholder that keeps the snapshot non-empty. Zero radius and weight,
    /// so it never influences a blade.
    pub const SENTINEL: Self = Self {
        position: Vec3::ZERO,
        radius: 0.0,
        weight: 0.0,
        lifetime: -1.0,
        max_lifetime: -1.0,
    };

    pub fn new(position: Vec3, radius: f32, weight: f32, lifetime: f32) -> Self {
        Self {
            position,
            radius,
            weight,
            lifetime,
            max_lifetime: lifetime,
        }
    }
}

/// Bounded, insertion-ordered set of live flatten entries.
///
/// Overflow evicts the oldest registration (FIFO), never the one closest to
/// expiring. Capacity is supplied on every mutation so a changed limit takes
/// effect the next time the registry is touched.
#[derive(Debug, Clone, Default)]
pub struct FlattenRegistry {
    entries: VecDeque<FlattenEntry>,
}

impl FlattenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live entries, sentinel excluded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlattenEntry> {
        self.entries.iter()
    }

    pub fn register(&mut self, entry: FlattenEntry, capacity: usize) {
        if capacity == 0 {
            self.entries.clear();
            return;
        }
        self.evict_to(capacity - 1);
        self.entries.push_back(entry);
    }

    /// Ages every entry by `delta` seconds exactly once and drops the ones
    /// whose remaining lifetime reached zero.
    pub fn tick(&mut self, delta: f32, capacity: usize) {
        self.entries.retain_mut(|entry| {
            entry.lifetime -= delta;
            entry.lifetime > 0.0
        });
        self.evict_to(capacity);
    }

    /// Entries to upload this frame. Never empty: a registry with no live
    /// entries yields a single sentinel.
    pub fn snapshot(&self) -> Vec<FlattenEntry> {
        if self.entries.is_empty() {
            return vec![FlattenEntry::SENTINEL];
        }
        self.entries.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn evict_to(&mut self, limit: usize) {
        while self.entries.len() > limit {
            self.entries.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn tagged(id: usize, lifetime: f32) -> FlattenEntry {
        // weight doubles as an identifier
        FlattenEntry::new(Vec3::ZERO, 1.0, id as f32, lifetime)
    }

    fn ids(registry: &FlattenRegistry) -> Vec<usize> {
        registry.iter().map(|e| e.weight as usize).collect()
    }

    #[test]
    fn size_never_exceeds_capacity() {
        let mut registry = FlattenRegistry::new();
        for i in 0..100 {
            registry.register(tagged(i, 1.0), 25);
            assert!(registry.len() <= 25);
        }
        assert_eq!(registry.len(), 25);
        assert_eq!(ids(&registry), (75..100).collect::<Vec<_>>());
    }

    #[test]
    fn overflow_evicts_oldest_not_shortest_lived() {
        let mut registry = FlattenRegistry::new();
        // Entry #0 has by far the longest remaining lifetime.
        registry.register(tagged(0, 100.0), 25);
        for i in 1..25 {
            registry.register(tagged(i, 0.1), 25);
        }
        assert_eq!(registry.len(), 25);

        registry.register(tagged(25, 0.1), 25);

        let ids = ids(&registry);
        assert_eq!(ids.len(), 25);
        assert_eq!(ids[0], 1);
        assert!(!ids.contains(&0));
        assert_eq!(*ids.last().unwrap(), 25);
    }

    #[test]
    fn eviction_order_is_insertion_order() {
        let mut registry = FlattenRegistry::new();
        for i in 0..3 {
            registry.register(tagged(i, 1.0), 3);
        }
        registry.register(tagged(3, 1.0), 3);
        assert_eq!(ids(&registry), vec![1, 2, 3]);
        registry.register(tagged(4, 1.0), 3);
        assert_eq!(ids(&registry), vec![2, 3, 4]);
    }

    #[test]
    fn tick_decays_then_removes() {
        let mut registry = FlattenRegistry::new();
        registry.register(tagged(0, 1.0), 25);

        registry.tick(0.4, 25);
        assert_eq!(registry.len(), 1);
        assert!((registry.iter().next().unwrap().lifetime - 0.6).abs() < EPSILON);

        registry.tick(0.4, 25);
        assert_eq!(registry.len(), 1);
        assert!((registry.iter().next().unwrap().lifetime - 0.2).abs() < EPSILON);

        registry.tick(0.4, 25);
        assert!(registry.is_empty());
    }

    #[test]
    fn tick_removes_when_delta_equals_lifetime() {
        let mut registry = FlattenRegistry::new();
        registry.register(tagged(0, 0.5), 25);
        registry.tick(0.5, 25);
        assert!(registry.is_empty());
    }

    #[test]
    fn tick_ages_every_entry_including_the_first() {
        let mut registry = FlattenRegistry::new();
        registry.register(tagged(0, 1.0), 25);
        registry.register(tagged(1, 2.0), 25);
        registry.tick(0.25, 25);

        let lifetimes: Vec<f32> = registry.iter().map(|e| e.lifetime).collect();
        assert!((lifetimes[0] - 0.75).abs() < EPSILON);
        assert!((lifetimes[1] - 1.75).abs() < EPSILON);
        // max lifetime is untouched
        assert_eq!(registry.iter().next().unwrap().max_lifetime, 1.0);
    }

    #[test]
    fn empty_registry_snapshots_a_sentinel() {
        let mut registry = FlattenRegistry::new();
        assert_eq!(registry.snapshot(), vec![FlattenEntry::SENTINEL]);

        registry.register(tagged(7, 0.1), 25);
        assert_eq!(registry.snapshot().len(), 1);
        assert_eq!(registry.snapshot()[0].weight, 7.0);

        registry.tick(1.0, 25);
        assert_eq!(registry.snapshot(), vec![FlattenEntry::SENTINEL]);
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn lowered_capacity_applies_on_next_mutation() {
        let mut registry = FlattenRegistry::new();
        for i in 0..10 {
            registry.register(tagged(i, 5.0), 10);
        }
        registry.register(tagged(10, 5.0), 4);
        assert_eq!(ids(&registry), vec![7, 8, 9, 10]);

        registry.tick(0.0, 2);
        assert_eq!(ids(&registry), vec![9, 10]);
    }

    #[test]
    fn zero_capacity_holds_nothing() {
        let mut registry = FlattenRegistry::new();
        registry.register(tagged(0, 1.0), 0);
        assert!(registry.is_empty());
    }
}
