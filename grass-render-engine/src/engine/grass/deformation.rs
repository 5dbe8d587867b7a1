use bevy::prelude::*;
use constants::render_settings::{
    DEFAULT_TRAMPLE_IMPRESSION, DEFAULT_TRAMPLE_RADIUS, DEFAULT_TRAMPLE_WEIGHT,
    TRAMPLE_LIFETIME_SCALE,
};

/// Fire-and-forget request to flatten grass around a world position.
///
/// Without a `target` the request goes to whichever field currently holds
/// the [`GrassDeformationSink`]. Requests nobody can take are dropped.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct FlattenRequest {
    pub position: Vec3,
    pub radius: f32,
    pub weight: f32,
    pub lifetime: f32,
    pub target: Option<Entity>,
}

impl FlattenRequest {
    pub fn new(position: Vec3, radius: f32, weight: f32, lifetime: f32) -> Self {
        Self {
            position,
            radius,
            weight,
            lifetime,
            target: None,
        }
    }

    pub fn targeting(mut self, field: Entity) -> Self {
        self.target = Some(field);
        self
    }
}

/// The field that receives untargeted flatten requests: the most recently
/// enabled one.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct GrassDeformationSink {
    active: Option<Entity>,
}

impl GrassDeformationSink {
    pub fn active(&self) -> Option<Entity> {
        self.active
    }

    pub fn activate(&mut self, field: Entity) {
        self.active = Some(field);
    }

    /// Clears the sink if `field` holds it.
    pub fn release(&mut self, field: Entity) {
        if self.active == Some(field) {
            self.active = None;
        }
    }

    pub fn resolve(&self, request: &FlattenRequest) -> Option<Entity> {
        request.target.or(self.active)
    }
}

/// Presses grass down around its owner, or around `position_override` when
/// set, every frame.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
#[require(Transform)]
pub struct Trampler {
    pub radius: f32,
    pub weight: f32,
    /// How long an impression lingers, scaled by [`TRAMPLE_LIFETIME_SCALE`].
    pub impression: f32,
    /// Entity whose position is stamped instead of the owner's.
    pub position_override: Option<Entity>,
    /// Field to flatten instead of the active sink.
    pub target: Option<Entity>,
}

impl Default for Trampler {
    fn default() -> Self {
        Self {
            radius: DEFAULT_TRAMPLE_RADIUS,
            weight: DEFAULT_TRAMPLE_WEIGHT,
            impression: DEFAULT_TRAMPLE_IMPRESSION,
            position_override: None,
            target: None,
        }
    }
}

impl Trampler {
    pub fn lifetime(&self) -> f32 {
        self.impression * TRAMPLE_LIFETIME_SCALE
    }

    pub fn request_at(&self, position: Vec3) -> FlattenRequest {
        FlattenRequest {
            position,
            radius: self.radius,
            weight: self.weight,
            lifetime: self.lifetime(),
            target: self.target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trampler_lifetime_scales_impression() {
        let trampler = Trampler::default();
        assert!((trampler.lifetime() - 4.0).abs() < 1e-6);

        let request = trampler.request_at(Vec3::X);
        assert_eq!(request.radius, 2.3);
        assert_eq!(request.weight, 1.0);
        assert_eq!(request.target, None);
    }

    #[test]
    fn explicit_target_wins_over_sink() {
        let mut world = World::new();
        let active = world.spawn_empty().id();
        let other = world.spawn_empty().id();

        let mut sink = GrassDeformationSink::default();
        let request = FlattenRequest::new(Vec3::ZERO, 1.0, 1.0, 1.0);
        assert_eq!(sink.resolve(&request), None);

        sink.activate(active);
        assert_eq!(sink.resolve(&request), Some(active));
        assert_eq!(sink.resolve(&request.targeting(other)), Some(other));

        sink.release(other);
        assert_eq!(sink.active(), Some(active));
        sink.release(active);
        assert_eq!(sink.active(), None);
    }
}
