use bevy::prelude::*;
use bevy::render::Extract;
use std::collections::HashMap;

use crate::engine::compute::expansion_dispatch::ExpansionFrame;
use crate::engine::grass::bounds_tracker::GrassBounds;
use crate::engine::grass::field::{GrassField, GrassLifecycle};
use crate::engine::grass::settings::{GrassMode, GrassResources, GrassSettings};
use crate::engine::grass::vertex_store::SourceVertex;

/// Render-world copy of one enabled grass field.
pub struct ExtractedGrassField {
    /// Only present on the frame a new generation is first seen; the render
    /// world rebuilds its buffers from it.
    pub vertices: Option<Vec<SourceVertex>>,
    pub settings: GrassSettings,
    pub resources: GrassResources,
    pub world_bounds: Option<GrassBounds>,
    pub frame: ExpansionFrame,
}

/// Enabled grass fields keyed by their main-world entity. Fields missing
/// from this map have their GPU resources released.
#[derive(Resource, Default)]
pub struct ExtractedGrassFields(pub HashMap<Entity, ExtractedGrassField>);

/// Picks the camera driving LOD: the field's override if set, otherwise the
/// active 3D camera with the lowest order.
pub fn lod_camera_position(
    override_camera: Option<Entity>,
    transforms: &Query<&GlobalTransform>,
    cameras: &Query<(&Camera, &GlobalTransform), With<Camera3d>>,
) -> Option<Vec3> {
    if let Some(entity) = override_camera {
        if let Ok(transform) = transforms.get(entity) {
            return Some(transform.translation());
        }
    }

    cameras
        .iter()
        .filter(|(camera, _)| camera.is_active)
        .min_by_key(|(camera, _)| camera.order)
        .map(|(_, transform)| transform.translation())
}

/// Copies every enabled field into the render world. Vertex data is sent
/// only when a field's generation changes.
pub fn extract_grass_fields(
    mut commands: Commands,
    fields: Extract<Query<(Entity, &GrassField, &GlobalTransform)>>,
    transforms: Extract<Query<&GlobalTransform>>,
    cameras: Extract<Query<(&Camera, &GlobalTransform), With<Camera3d>>>,
    time: Extract<Res<Time>>,
    mut sent_generations: Local<HashMap<Entity, u64>>,
) {
    let mut extracted = HashMap::new();

    for (entity, field, transform) in fields.iter() {
        if field.lifecycle() != GrassLifecycle::Enabled {
            continue;
        }

        let generation = field.generation();
        let vertices = (sent_generations.get(&entity) != Some(&generation))
            .then(|| field.vertices().to_vec());
        sent_generations.insert(entity, generation);

        let lod_camera = match field.mode() {
            GrassMode::Runtime => lod_camera_position(
                field.resources().override_lod_camera,
                &transforms,
                &cameras,
            ),
            GrassMode::Authoring => None,
        };

        extracted.insert(
            entity,
            ExtractedGrassField {
                vertices,
                settings: field.settings().clone(),
                resources: field.resources().clone(),
                world_bounds: field.world_bounds(transform),
                frame: ExpansionFrame {
                    world_from_local: transform.compute_matrix(),
                    elapsed: time.elapsed_secs(),
                    delta: time.delta_secs(),
                    lod_camera,
                    flatten_entries: field.flatten_snapshot(),
                },
            },
        );
    }

    sent_generations.retain(|entity, _| extracted.contains_key(entity));
    commands.insert_resource(ExtractedGrassFields(extracted));
}
