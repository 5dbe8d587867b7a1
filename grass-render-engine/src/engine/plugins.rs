use bevy::prelude::*;

use crate::engine::assets::grass_shaders::GrassShaders;
use crate::engine::assets::settings_asset::GrassSettingsPlugin;
use crate::engine::assets::wind_noise::DefaultWindNoise;
use crate::engine::grass::deformation::{FlattenRequest, GrassDeformationSink};
use crate::engine::render::indirect_renderer::GrassRenderPlugin;
use crate::engine::systems::deformation::{emit_trample_requests, route_flatten_requests};
use crate::engine::systems::field_lifecycle::{
    assign_default_wind_noise, tick_grass_fields, update_deformation_sink, warn_duplicate_fields,
};

/// Ordering of the main-world grass systems within `Update`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GrassSystems {
    /// Settings, resources and sink ownership.
    Configure,
    /// Rebuild decisions and flatten decay.
    Tick,
    /// Trampler emission and flatten request delivery.
    Route,
}

/// Main-world grass logic. Needs nothing beyond `Time`, so it runs under
/// `MinimalPlugins`.
pub struct GrassFieldPlugin;

impl Plugin for GrassFieldPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<FlattenRequest>()
            .init_resource::<GrassDeformationSink>()
            .configure_sets(
                Update,
                (
                    GrassSystems::Configure,
                    GrassSystems::Tick,
                    GrassSystems::Route,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    (
                        warn_duplicate_fields,
                        assign_default_wind_noise,
                        update_deformation_sink,
                    )
                        .chain()
                        .in_set(GrassSystems::Configure),
                    tick_grass_fields.in_set(GrassSystems::Tick),
                    (emit_trample_requests, route_flatten_requests)
                        .chain()
                        .in_set(GrassSystems::Route),
                ),
            );
    }
}

/// Everything needed to author and render grass in a full bevy app.
pub struct GrassPlugin;

impl Plugin for GrassPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((GrassFieldPlugin, GrassSettingsPlugin, GrassRenderPlugin))
            .init_resource::<DefaultWindNoise>()
            .init_resource::<GrassShaders>();
    }
}
