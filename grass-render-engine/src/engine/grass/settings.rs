use bevy::prelude::*;
use constants::procedural_shader::{MAXIMUM_CROSS_COUNT, MAXIMUM_SEGMENTS};
use constants::render_settings::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::assets::wind_noise::DefaultWindNoise;

/// Numeric grass configuration. Every field falls back to its default when
/// missing from a settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrassSettings {
    // Form
    pub max_segments: u32,
    pub max_bend_angle: f32,
    pub blade_curvature: f32,
    pub blade_height: f32,
    pub blade_height_variance: f32,
    pub blade_width: f32,
    pub blade_width_variance: f32,
    pub blade_shape: BladeShape,

    // Wind
    pub wind_scale: f32,
    pub wind_speed: f32,
    pub wind_amount: f32,

    // LOD
    pub lod_distance: f32,
    pub clip_distance: f32,
    pub clip_offset: f32,

    // Flatten
    pub max_flatten_calculations: usize,
}

impl Default for GrassSettings {
    fn default() -> Self {
        Self {
            max_segments: DEFAULT_MAX_SEGMENTS,
            max_bend_angle: DEFAULT_MAX_BEND_ANGLE,
            blade_curvature: DEFAULT_BLADE_CURVATURE,
            blade_height: DEFAULT_BLADE_HEIGHT,
            blade_height_variance: DEFAULT_BLADE_HEIGHT_VARIANCE,
            blade_width: DEFAULT_BLADE_WIDTH,
            blade_width_variance: DEFAULT_BLADE_WIDTH_VARIANCE,
            blade_shape: BladeShape::Blade,
            wind_scale: DEFAULT_WIND_SCALE,
            wind_speed: DEFAULT_WIND_SPEED,
            wind_amount: DEFAULT_WIND_AMOUNT,
            lod_distance: DEFAULT_LOD_DISTANCE,
            clip_distance: DEFAULT_CLIP_DISTANCE,
            clip_offset: DEFAULT_CLIP_OFFSET,
            max_flatten_calculations: DEFAULT_MAX_FLATTEN_CALCULATIONS,
        }
    }
}

impl GrassSettings {
    /// How far a blade can reach beyond its root point.
    pub fn expansion_margin(&self) -> f32 {
        (self.blade_height + self.blade_height_variance)
            .max(self.blade_width + self.blade_width_variance)
    }

    /// Segment count the kernel actually builds: `max_segments` clamped to
    /// `1..=MAXIMUM_SEGMENTS`.
    pub fn segments(&self) -> u32 {
        self.max_segments.clamp(1, MAXIMUM_SEGMENTS)
    }
}

/// Geometry generated per source vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BladeShape {
    /// Bent, tapered multi-segment blade.
    #[default]
    Blade,
    /// `cross_count` upright quads rotated around the root.
    Cross { cross_count: u32 },
}

impl BladeShape {
    pub fn cross_count(&self) -> u32 {
        match *self {
            BladeShape::Blade => 0,
            BladeShape::Cross { cross_count } => cross_count.clamp(1, MAXIMUM_CROSS_COUNT),
        }
    }
}

/// Whether the field is being edited or running in an interactive session.
///
/// In authoring mode every tick performs a full rebuild so edits show up
/// immediately. Runtime mode builds once and rebuilds only when sizing
/// changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrassMode {
    Authoring,
    #[default]
    Runtime,
}

/// Unmet dependency that suppresses all GPU work for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrassIssue {
    MissingKernel,
    MissingMaterial,
    MissingWindTexture,
}

impl fmt::Display for GrassIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrassIssue::MissingKernel => write!(f, "expansion compute kernel is not set"),
            GrassIssue::MissingMaterial => write!(f, "blade material shader is not set"),
            GrassIssue::MissingWindTexture => write!(f, "wind noise texture is not set"),
        }
    }
}

/// Asset and entity references a field needs before it can render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrassResources {
    pub kernel: Option<Handle<Shader>>,
    pub material: Option<Handle<Shader>>,
    pub wind_noise: Option<Handle<Image>>,
    /// Camera used for LOD and clipping at runtime. Falls back to the
    /// lowest-order active 3D camera.
    pub override_lod_camera: Option<Entity>,
}

impl GrassResources {
    pub fn issues(&self) -> Vec<GrassIssue> {
        let mut issues = Vec::new();
        if self.kernel.is_none() {
            issues.push(GrassIssue::MissingKernel);
        }
        if self.material.is_none() {
            issues.push(GrassIssue::MissingMaterial);
        }
        if self.wind_noise.is_none() {
            issues.push(GrassIssue::MissingWindTexture);
        }
        issues
    }

    pub fn has_issues(&self) -> bool {
        self.kernel.is_none() || self.material.is_none() || self.wind_noise.is_none()
    }

    /// Fills in the generated wind noise when no texture was assigned.
    pub fn try_set_default(&mut self, default_noise: &DefaultWindNoise) {
        if self.wind_noise.is_none() {
            self.wind_noise = Some(default_noise.image.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> GrassResources {
        GrassResources {
            kernel: Some(Handle::default()),
            material: Some(Handle::default()),
            wind_noise: Some(Handle::default()),
            override_lod_camera: None,
        }
    }

    #[test]
    fn missing_wind_texture_is_always_an_issue() {
        let mut resources = complete();
        assert!(!resources.has_issues());

        resources.wind_noise = None;
        assert!(resources.has_issues());
        assert_eq!(resources.issues(), vec![GrassIssue::MissingWindTexture]);
    }

    #[test]
    fn issues_are_listed_in_dependency_order() {
        let resources = GrassResources::default();
        assert_eq!(
            resources.issues(),
            vec![
                GrassIssue::MissingKernel,
                GrassIssue::MissingMaterial,
                GrassIssue::MissingWindTexture,
            ]
        );
    }

    #[test]
    fn expansion_margin_takes_the_larger_extent() {
        let settings = GrassSettings {
            blade_height: 2.0,
            blade_height_variance: 0.3,
            blade_width: 0.4,
            blade_width_variance: 0.1,
            ..default()
        };
        assert!((settings.expansion_margin() - 2.3).abs() < 1e-6);

        let wide = GrassSettings {
            blade_height: 0.5,
            blade_height_variance: 0.0,
            blade_width: 3.0,
            blade_width_variance: 0.5,
            ..default()
        };
        assert!((wide.expansion_margin() - 3.5).abs() < 1e-6);
    }

    #[test]
    fn settings_file_fields_fall_back_to_defaults() {
        let settings: GrassSettings =
            serde_json::from_str(r#"{ "max_segments": 4, "wind_amount": 1.5 }"#).unwrap();
        assert_eq!(settings.max_segments, 4);
        assert_eq!(settings.wind_amount, 1.5);
        assert_eq!(settings.lod_distance, DEFAULT_LOD_DISTANCE);
        assert_eq!(settings.max_flatten_calculations, 25);
        assert_eq!(settings.blade_shape, BladeShape::Blade);
    }

    #[test]
    fn cross_shape_parses_and_clamps() {
        let settings: GrassSettings =
            serde_json::from_str(r#"{ "blade_shape": { "kind": "cross", "cross_count": 9 } }"#)
                .unwrap();
        assert_eq!(settings.blade_shape, BladeShape::Cross { cross_count: 9 });
        assert_eq!(settings.blade_shape.cross_count(), MAXIMUM_CROSS_COUNT);
    }
}
