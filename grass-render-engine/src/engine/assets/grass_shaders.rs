use bevy::prelude::*;

use crate::engine::grass::settings::GrassResources;

const EXPANSION_SHADER_PATH: &str = "shaders/grass_expansion.wgsl";
const BLADE_SHADER_PATH: &str = "shaders/grass_blades.wgsl";

/// Bundled expansion kernel and blade material.
#[derive(Resource, Debug, Clone)]
pub struct GrassShaders {
    pub kernel: Handle<Shader>,
    pub material: Handle<Shader>,
}

impl FromWorld for GrassShaders {
    fn from_world(world: &mut World) -> Self {
        let asset_server = world.resource::<AssetServer>();
        Self {
            kernel: asset_server.load(EXPANSION_SHADER_PATH),
            material: asset_server.load(BLADE_SHADER_PATH),
        }
    }
}

impl GrassShaders {
    /// Resources using the bundled shaders and no wind texture yet.
    pub fn resources(&self) -> GrassResources {
        GrassResources {
            kernel: Some(self.kernel.clone()),
            material: Some(self.material.clone()),
            ..default()
        }
    }
}
