use bevy::prelude::*;
use grass_render_engine::engine::assets::wind_noise::DefaultWindNoise;
use grass_render_engine::engine::grass::deformation::{
    FlattenRequest, GrassDeformationSink, Trampler,
};
use grass_render_engine::engine::grass::field::{GrassField, GrassLifecycle};
use grass_render_engine::engine::grass::settings::{GrassMode, GrassResources};
use grass_render_engine::engine::grass::vertex_store::SourceVertex;
use grass_render_engine::engine::plugins::GrassFieldPlugin;

fn test_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, GrassFieldPlugin));
    app
}

fn complete_resources() -> GrassResources {
    GrassResources {
        kernel: Some(Handle::default()),
        material: Some(Handle::default()),
        wind_noise: Some(Handle::default()),
        override_lod_camera: None,
    }
}

fn patch(count: usize) -> Vec<SourceVertex> {
    (0..count)
        .map(|i| SourceVertex::new(Vec3::new(i as f32, 0.0, 0.0), Vec3::Y))
        .collect()
}

fn spawn_field(app: &mut App, mode: GrassMode) -> Entity {
    app.world_mut()
        .spawn(
            GrassField::new(mode)
                .with_resources(complete_resources())
                .with_vertices(patch(16)),
        )
        .id()
}

fn field(app: &App, entity: Entity) -> &GrassField {
    app.world().get::<GrassField>(entity).unwrap()
}

fn flatten_count(app: &App, entity: Entity) -> usize {
    field(app, entity)
        .flatten_registry()
        .map_or(0, |registry| registry.len())
}

fn sink(app: &App) -> Option<Entity> {
    app.world().resource::<GrassDeformationSink>().active()
}

#[test]
fn runtime_field_enables_once() {
    let mut app = test_app();
    let entity = spawn_field(&mut app, GrassMode::Runtime);

    app.update();
    assert_eq!(field(&app, entity).lifecycle(), GrassLifecycle::Enabled);
    assert_eq!(field(&app, entity).generation(), 1);
    assert_eq!(sink(&app), Some(entity));

    app.update();
    app.update();
    assert_eq!(field(&app, entity).generation(), 1);
}

#[test]
fn authoring_field_rebuilds_every_frame() {
    let mut app = test_app();
    let entity = spawn_field(&mut app, GrassMode::Authoring);

    for _ in 0..3 {
        app.update();
    }
    assert_eq!(field(&app, entity).generation(), 3);
    assert_eq!(field(&app, entity).lifecycle(), GrassLifecycle::Enabled);
}

#[test]
fn untargeted_requests_reach_the_active_field() {
    let mut app = test_app();
    let entity = spawn_field(&mut app, GrassMode::Runtime);
    app.update();

    app.world_mut()
        .send_event(FlattenRequest::new(Vec3::ZERO, 2.0, 1.0, 3.0));
    app.update();

    assert_eq!(flatten_count(&app, entity), 1);
}

#[test]
fn requests_without_a_sink_are_dropped() {
    let mut app = test_app();
    app.world_mut()
        .send_event(FlattenRequest::new(Vec3::ZERO, 2.0, 1.0, 3.0));
    app.update();

    assert_eq!(sink(&app), None);
}

#[test]
fn most_recent_field_takes_the_sink_and_targets_bypass_it() {
    let mut app = test_app();
    let first = spawn_field(&mut app, GrassMode::Runtime);
    app.update();
    let second = spawn_field(&mut app, GrassMode::Runtime);
    app.update();
    assert_eq!(sink(&app), Some(second));

    app.world_mut()
        .send_event(FlattenRequest::new(Vec3::ZERO, 2.0, 1.0, 3.0).targeting(first));
    app.update();

    assert_eq!(flatten_count(&app, first), 1);
    assert_eq!(flatten_count(&app, second), 0);
}

#[test]
fn trampler_flattens_every_frame() {
    let mut app = test_app();
    let entity = spawn_field(&mut app, GrassMode::Runtime);
    let position = Vec3::new(3.0, 0.0, 1.0);
    app.world_mut().spawn((
        Trampler::default(),
        Transform::from_translation(position),
        GlobalTransform::from_translation(position),
    ));

    app.update();
    app.update();

    let registry = field(&app, entity).flatten_registry().unwrap();
    assert_eq!(registry.len(), 2);
    let newest = registry.iter().last().unwrap();
    assert_eq!(newest.position, position);
    assert_eq!(newest.radius, 2.3);
    assert_eq!(newest.max_lifetime, 4.0);
}

#[test]
fn trampler_stamps_at_its_position_override() {
    let mut app = test_app();
    let entity = spawn_field(&mut app, GrassMode::Runtime);
    let foot = Vec3::new(-4.0, 0.0, 6.0);
    let override_entity = app
        .world_mut()
        .spawn((Transform::from_translation(foot), GlobalTransform::from_translation(foot)))
        .id();
    let own = Vec3::new(1.0, 0.0, 1.0);
    app.world_mut().spawn((
        Trampler {
            position_override: Some(override_entity),
            ..default()
        },
        Transform::from_translation(own),
        GlobalTransform::from_translation(own),
    ));

    app.update();

    let registry = field(&app, entity).flatten_registry().unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.iter().next().unwrap().position, foot);

    app.world_mut().despawn(override_entity);
    app.update();

    let registry = field(&app, entity).flatten_registry().unwrap();
    assert_eq!(registry.iter().last().unwrap().position, own);
}

#[test]
fn missing_resources_keep_field_disabled() {
    let mut app = test_app();
    let entity = app
        .world_mut()
        .spawn(GrassField::new(GrassMode::Runtime).with_vertices(patch(4)))
        .id();

    app.update();
    app.world_mut()
        .send_event(FlattenRequest::new(Vec3::ZERO, 2.0, 1.0, 3.0));
    app.update();

    let grass = field(&app, entity);
    assert_eq!(grass.lifecycle(), GrassLifecycle::Disabled);
    assert_eq!(grass.generation(), 0);
    assert!(grass.flatten_registry().is_none());
}

#[test]
fn clearing_vertices_stops_the_field() {
    let mut app = test_app();
    let entity = spawn_field(&mut app, GrassMode::Runtime);
    app.update();

    app.world_mut()
        .get_mut::<GrassField>(entity)
        .unwrap()
        .reset_vertices();
    app.update();

    assert_eq!(field(&app, entity).lifecycle(), GrassLifecycle::Disabled);
}

#[test]
fn disabling_releases_the_sink_and_registry() {
    let mut app = test_app();
    let entity = spawn_field(&mut app, GrassMode::Runtime);
    app.update();

    app.world_mut()
        .get_mut::<GrassField>(entity)
        .unwrap()
        .disable();
    app.update();

    assert_eq!(sink(&app), None);
    assert!(field(&app, entity).flatten_registry().is_none());
    assert_eq!(field(&app, entity).lifecycle(), GrassLifecycle::Disabled);

    app.world_mut()
        .get_mut::<GrassField>(entity)
        .unwrap()
        .enable();
    app.update();
    assert_eq!(sink(&app), Some(entity));
    assert_eq!(field(&app, entity).lifecycle(), GrassLifecycle::Enabled);
}

#[test]
fn despawned_field_releases_the_sink() {
    let mut app = test_app();
    let entity = spawn_field(&mut app, GrassMode::Runtime);
    app.update();

    app.world_mut().despawn(entity);
    app.update();

    assert_eq!(sink(&app), None);
}

#[test]
fn authoring_fields_fall_back_to_default_wind_noise() {
    let mut app = test_app();
    app.insert_resource(DefaultWindNoise {
        image: Handle::default(),
    });
    let without_wind = GrassResources {
        wind_noise: None,
        ..complete_resources()
    };
    let authoring = app
        .world_mut()
        .spawn(
            GrassField::new(GrassMode::Authoring)
                .with_resources(without_wind.clone())
                .with_vertices(patch(4)),
        )
        .id();
    let runtime = app
        .world_mut()
        .spawn(
            GrassField::new(GrassMode::Runtime)
                .with_resources(without_wind)
                .with_vertices(patch(4)),
        )
        .id();

    app.update();

    assert!(field(&app, authoring).resources().wind_noise.is_some());
    assert_eq!(field(&app, authoring).lifecycle(), GrassLifecycle::Enabled);
    assert!(field(&app, runtime).resources().wind_noise.is_none());
    assert_eq!(field(&app, runtime).lifecycle(), GrassLifecycle::Disabled);
}
