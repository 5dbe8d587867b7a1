use bevy::prelude::*;

/// Axis-aligned box stored as center and half-size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrassBounds {
    pub center: Vec3,
    pub extents: Vec3,
}

impl GrassBounds {
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            extents: (max - min) * 0.5,
        }
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.extents
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.extents
    }

    /// Grows the box by `amount` on every side.
    pub fn expanded(self, amount: f32) -> Self {
        Self {
            center: self.center,
            extents: self.extents + Vec3::splat(amount),
        }
    }
}

/// Local-space culling volume of a grass field.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundsTracker {
    local: Option<GrassBounds>,
}

impl BoundsTracker {
    /// Encloses every position, then pads by `margin` so expanded blades stay
    /// inside. An empty position set clears the bounds.
    pub fn recompute(&mut self, positions: impl IntoIterator<Item = Vec3>, margin: f32) {
        let mut positions = positions.into_iter();
        let Some(first) = positions.next() else {
            self.local = None;
            return;
        };

        let (min, max) = positions.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        self.local = Some(GrassBounds::from_min_max(min, max).expanded(margin));
    }

    pub fn local(&self) -> Option<GrassBounds> {
        self.local
    }

    /// World-space bounds: the center goes through the owner's transform,
    /// extents are carried over as-is.
    // TODO: extents ignore rotation and scale of the owner; rotated or scaled
    // fields can be culled while still on screen.
    pub fn world(&self, transform: &GlobalTransform) -> Option<GrassBounds> {
        self.local.map(|local| GrassBounds {
            center: transform.transform_point(local.center),
            extents: local.extents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encloses_points_and_pads_by_margin() {
        let mut tracker = BoundsTracker::default();
        tracker.recompute(
            [
                Vec3::new(1.0, 0.0, 2.0),
                Vec3::new(3.0, 1.0, -2.0),
                Vec3::new(2.0, 0.5, 0.0),
            ],
            2.3,
        );

        let local = tracker.local().unwrap();
        assert_eq!(local.center, Vec3::new(2.0, 0.5, 0.0));
        assert!(local.min().abs_diff_eq(Vec3::new(-1.3, -2.3, -4.3), 1e-5));
        assert!(local.max().abs_diff_eq(Vec3::new(5.3, 3.3, 4.3), 1e-5));
    }

    #[test]
    fn does_not_include_the_origin_implicitly() {
        let mut tracker = BoundsTracker::default();
        tracker.recompute([Vec3::splat(10.0), Vec3::splat(12.0)], 0.0);
        let local = tracker.local().unwrap();
        assert_eq!(local.min(), Vec3::splat(10.0));
        assert_eq!(local.max(), Vec3::splat(12.0));
    }

    #[test]
    fn empty_positions_clear_bounds() {
        let mut tracker = BoundsTracker::default();
        tracker.recompute([Vec3::ONE], 1.0);
        assert!(tracker.local().is_some());
        tracker.recompute(std::iter::empty(), 1.0);
        assert!(tracker.local().is_none());
        assert!(tracker.world(&GlobalTransform::IDENTITY).is_none());
    }

    #[test]
    fn world_bounds_move_center_and_keep_extents() {
        let mut tracker = BoundsTracker::default();
        tracker.recompute([Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 1.0)], 0.5);

        let transform = GlobalTransform::from(
            Transform::from_xyz(10.0, 2.0, -4.0)
                .with_rotation(Quat::from_rotation_y(0.7))
                .with_scale(Vec3::splat(3.0)),
        );
        let world = tracker.world(&transform).unwrap();

        assert!(world.center.abs_diff_eq(Vec3::new(10.0, 2.0, -4.0), 1e-5));
        assert_eq!(world.extents, tracker.local().unwrap().extents);
    }
}
