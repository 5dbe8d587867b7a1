use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;

use crate::engine::assets::grass_shaders::GrassShaders;
use crate::engine::assets::wind_noise::DefaultWindNoise;
use crate::engine::core::window_config::create_window_config;
use crate::engine::grass::deformation::Trampler;
use crate::engine::grass::field::GrassField;
use crate::engine::grass::settings::GrassMode;
use crate::engine::grass::vertex_store::SourceVertex;
use crate::engine::plugins::GrassPlugin;

const GROUND_SIZE: f32 = 60.0;
const BLADE_COUNT: u32 = 40_000;

#[derive(Component)]
struct FpsText;

/// Circles its entity around the origin.
#[derive(Component)]
struct Orbit {
    radius: f32,
    speed: f32,
}

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        .add_plugins(GrassPlugin)
        .add_systems(Startup, setup)
        .add_systems(Update, orbit_system);

    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(Update, fps_text_update_system);
    }

    app
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    shaders: Res<GrassShaders>,
    default_noise: Res<DefaultWindNoise>,
) {
    spawn_lighting(&mut commands);
    spawn_camera(&mut commands);

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(GROUND_SIZE, GROUND_SIZE))),
        MeshMaterial3d(materials.add(Color::srgb(0.18, 0.12, 0.06))),
    ));

    let mut resources = shaders.resources();
    resources.try_set_default(&default_noise);
    let field = commands
        .spawn((
            Name::new("Grass"),
            GrassField::new(GrassMode::Runtime)
                .with_resources(resources)
                .with_vertices(scatter_vertices(BLADE_COUNT, GROUND_SIZE)),
        ))
        .id();
    info!("Spawned grass field {} with {} points", field, BLADE_COUNT);

    commands.spawn((
        Name::new("Trampler"),
        Mesh3d(meshes.add(Sphere::new(0.6))),
        MeshMaterial3d(materials.add(Color::srgb(0.8, 0.2, 0.2))),
        Transform::from_xyz(12.0, 0.6, 0.0),
        Trampler::default(),
        Orbit {
            radius: 12.0,
            speed: 0.4,
        },
    ));

    #[cfg(not(target_arch = "wasm32"))]
    {
        create_native_overlays(&mut commands);
    }
}

/// Evenly spread, jittered points over a `size` square centred on the origin.
fn scatter_vertices(count: u32, size: f32) -> Vec<SourceVertex> {
    let half = size * 0.5;
    (0..count)
        .map(|i| {
            let x = scatter_hash(i, 0x9e37) * size - half;
            let z = scatter_hash(i, 0x85eb) * size - half;
            SourceVertex::new(Vec3::new(x, 0.0, z), Vec3::Y)
        })
        .collect()
}

fn scatter_hash(index: u32, seed: u32) -> f32 {
    let mut h = index.wrapping_mul(0x27d4_eb2d) ^ seed.wrapping_mul(0x1656_67b1);
    h ^= h >> 15;
    h = h.wrapping_mul(0x2c1b_3c6d);
    h ^= h >> 12;
    h as f32 / u32::MAX as f32
}

fn orbit_system(time: Res<Time>, mut orbiters: Query<(&Orbit, &mut Transform)>) {
    let t = time.elapsed_secs();
    for (orbit, mut transform) in &mut orbiters {
        let angle = t * orbit.speed;
        transform.translation.x = angle.cos() * orbit.radius;
        transform.translation.z = angle.sin() * orbit.radius;
    }
}

fn fps_text_update_system(
    diagnostics: Res<DiagnosticsStore>,
    mut overlays: Query<&mut Text, With<FpsText>>,
) {
    let Some(fps) = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed())
    else {
        return;
    };
    for mut text in &mut overlays {
        text.0 = format!("FPS: {fps:.1}");
    }
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
}

fn spawn_camera(commands: &mut Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(-18.0, 12.0, 24.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn create_native_overlays(commands: &mut Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("FPS: "),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(1., 0., 0.)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                FpsText,
            ));
        });
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
