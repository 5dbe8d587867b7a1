use bevy::prelude::*;

use crate::engine::assets::wind_noise::DefaultWindNoise;
use crate::engine::grass::deformation::GrassDeformationSink;
use crate::engine::grass::field::GrassField;
use crate::engine::grass::settings::GrassMode;

/// Gives authoring fields the generated wind noise when none was assigned.
pub fn assign_default_wind_noise(
    default_noise: Option<Res<DefaultWindNoise>>,
    mut fields: Query<&mut GrassField>,
) {
    let Some(default_noise) = default_noise else {
        return;
    };

    for mut field in &mut fields {
        if field.mode() == GrassMode::Authoring && field.resources().wind_noise.is_none() {
            field.use_default_wind_noise(&default_noise);
        }
    }
}

/// Only one field is expected per scene; extra ones still render but only
/// the most recently enabled receives untargeted deformation.
pub fn warn_duplicate_fields(
    added: Query<Entity, Added<GrassField>>,
    fields: Query<(), With<GrassField>>,
) {
    let count = fields.iter().count();
    if count <= 1 {
        return;
    }
    for entity in &added {
        warn!(
            "Multiple grass fields in the scene ({}); {} takes over untargeted flatten requests",
            count, entity
        );
    }
}

/// Hands the deformation sink to newly enabled fields and takes it back
/// from disabled or despawned ones.
pub fn update_deformation_sink(
    mut sink: ResMut<GrassDeformationSink>,
    mut fields: Query<(Entity, &mut GrassField)>,
    mut removed: RemovedComponents<GrassField>,
) {
    for entity in removed.read() {
        sink.release(entity);
    }

    for (entity, mut field) in &mut fields {
        if !field.is_enabled() {
            sink.release(entity);
            continue;
        }
        if field.bypass_change_detection().take_activation() {
            debug!("Grass field {} is now the deformation sink", entity);
            sink.activate(entity);
        }
    }
}

pub fn tick_grass_fields(time: Res<Time>, mut fields: Query<&mut GrassField>) {
    let delta = time.delta_secs();
    for mut field in &mut fields {
        field.tick(delta);
    }
}
