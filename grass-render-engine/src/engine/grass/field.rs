use bevy::prelude::*;

use super::bounds_tracker::{BoundsTracker, GrassBounds};
use super::flatten_registry::{FlattenEntry, FlattenRegistry};
use super::settings::{BladeShape, GrassIssue, GrassMode, GrassResources, GrassSettings};
use super::vertex_store::{SourceVertex, VertexStore};
use crate::engine::assets::wind_noise::DefaultWindNoise;

/// Per-field lifecycle. `Enabling` and `Disabling` are transient and only
/// observable while a rebuild is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrassLifecycle {
    #[default]
    Disabled,
    Enabling,
    Enabled,
    Disabling,
}

/// Everything that forces a full GPU reallocation when it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LayoutKey {
    vertex_count: usize,
    max_segments: u32,
    blade_shape: BladeShape,
}

/// A procedurally expanded grass patch.
///
/// Owns the authored point cloud and the flatten registry, and decides when
/// the render world must (re)build GPU buffers. Each successful build bumps
/// [`GrassField::generation`]; the render world rebuilds whenever it sees a
/// new generation and tears everything down while the field is not
/// [`GrassLifecycle::Enabled`].
#[derive(Component, Debug, Clone)]
#[require(Transform)]
pub struct GrassField {
    vertices: VertexStore,
    settings: GrassSettings,
    resources: GrassResources,
    mode: GrassMode,
    flatten: Option<FlattenRegistry>,
    state: GrassLifecycle,
    enabled: bool,
    activation_pending: bool,
    refresh_requested: bool,
    built_layout: Option<LayoutKey>,
    generation: u64,
    bounds: BoundsTracker,
    refusal_logged: bool,
}

impl Default for GrassField {
    fn default() -> Self {
        Self::new(GrassMode::default())
    }
}

impl GrassField {
    pub fn new(mode: GrassMode) -> Self {
        Self {
            vertices: VertexStore::new(),
            settings: GrassSettings::default(),
            resources: GrassResources::default(),
            mode,
            flatten: None,
            state: GrassLifecycle::Disabled,
            enabled: true,
            activation_pending: true,
            refresh_requested: true,
            built_layout: None,
            generation: 0,
            bounds: BoundsTracker::default(),
            refusal_logged: false,
        }
    }

    pub fn with_settings(mut self, settings: GrassSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_resources(mut self, resources: GrassResources) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_vertices(mut self, vertices: impl IntoIterator<Item = SourceVertex>) -> Self {
        self.vertices.extend(vertices);
        self
    }

    // Authoring

    pub fn vertices(&self) -> &[SourceVertex] {
        self.vertices.as_slice()
    }

    pub fn add_vertex(&mut self, vertex: SourceVertex) {
        self.vertices.push(vertex);
        self.refresh_requested = true;
    }

    pub fn add_vertices(&mut self, vertices: impl IntoIterator<Item = SourceVertex>) {
        self.vertices.extend(vertices);
        self.refresh_requested = true;
    }

    /// Removes the vertices at `indices`; returns how many were removed.
    pub fn remove_vertices_at(&mut self, indices: &[usize]) -> usize {
        let removed = self.vertices.remove_at(indices);
        self.refresh_requested |= removed > 0;
        removed
    }

    pub fn remove_vertices_where(&mut self, predicate: impl FnMut(&SourceVertex) -> bool) -> usize {
        let removed = self.vertices.remove_where(predicate);
        self.refresh_requested |= removed > 0;
        removed
    }

    /// Removes every stored vertex equal to one of `vertices`.
    pub fn remove_vertices(&mut self, vertices: &[SourceVertex]) -> usize {
        let removed = self.vertices.remove_matching(vertices);
        self.refresh_requested |= removed > 0;
        removed
    }

    pub fn reset_vertices(&mut self) {
        self.vertices.clear();
        self.refresh_requested = true;
    }

    // Configuration

    pub fn settings(&self) -> &GrassSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: GrassSettings) {
        if self.settings != settings {
            self.settings = settings;
            self.refresh_requested = true;
        }
    }

    pub fn resources(&self) -> &GrassResources {
        &self.resources
    }

    pub fn set_resources(&mut self, resources: GrassResources) {
        if self.resources != resources {
            self.resources = resources;
            self.refresh_requested = true;
            self.refusal_logged = false;
        }
    }

    /// Assigns the generated wind noise if no texture is set.
    pub fn use_default_wind_noise(&mut self, default_noise: &DefaultWindNoise) {
        if self.resources.wind_noise.is_none() {
            self.resources.try_set_default(default_noise);
            self.refresh_requested = true;
            self.refusal_logged = false;
        }
    }

    pub fn mode(&self) -> GrassMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: GrassMode) {
        self.mode = mode;
    }

    pub fn has_issues(&self) -> bool {
        self.resources.has_issues()
    }

    pub fn issues(&self) -> Vec<GrassIssue> {
        self.resources.issues()
    }

    // Lifecycle

    pub fn lifecycle(&self) -> GrassLifecycle {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Incremented on every successful build.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn enable(&mut self) {
        if !self.enabled {
            self.enabled = true;
            self.activation_pending = true;
            self.refresh_requested = true;
        }
    }

    /// Tears the field down and drops its flatten registry. Safe to call
    /// repeatedly.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.activation_pending = false;
        self.teardown();
        self.flatten = None;
    }

    /// Rebuild on the next tick regardless of mode.
    pub fn force_refresh(&mut self) {
        self.refresh_requested = true;
    }

    /// True once after [`GrassField::enable`] (or spawn); used to hand the
    /// deformation sink to the most recently enabled field.
    pub fn take_activation(&mut self) -> bool {
        std::mem::take(&mut self.activation_pending)
    }

    /// Advances the field by one frame: rebuilds when required, then ages
    /// the flatten registry.
    pub fn tick(&mut self, delta: f32) {
        if !self.enabled {
            self.teardown();
            return;
        }

        let rebuild = match self.mode {
            GrassMode::Authoring => true,
            GrassMode::Runtime => {
                self.refresh_requested
                    || self.state != GrassLifecycle::Enabled
                    || self.built_layout != Some(self.layout_key())
            }
        };
        if rebuild {
            self.rebuild();
        }

        if self.state != GrassLifecycle::Enabled {
            return;
        }

        let capacity = self.settings.max_flatten_calculations;
        self.flatten
            .get_or_insert_with(FlattenRegistry::new)
            .tick(delta, capacity);
    }

    fn rebuild(&mut self) {
        if self.state == GrassLifecycle::Enabled {
            self.state = GrassLifecycle::Disabling;
            self.teardown();
        }
        self.refresh_requested = false;
        self.state = GrassLifecycle::Enabling;

        let issues = self.resources.issues();
        if !issues.is_empty() {
            if !self.refusal_logged {
                let listed: Vec<String> = issues.iter().map(ToString::to_string).collect();
                warn!("Grass field not enabled: {}", listed.join(", "));
                self.refusal_logged = true;
            }
            self.state = GrassLifecycle::Disabled;
            return;
        }
        if self.vertices.is_empty() {
            self.state = GrassLifecycle::Disabled;
            return;
        }
        self.refusal_logged = false;

        self.bounds
            .recompute(self.vertices.positions(), self.settings.expansion_margin());
        self.built_layout = Some(self.layout_key());
        self.generation += 1;
        self.state = GrassLifecycle::Enabled;

        match self.mode {
            GrassMode::Authoring => debug!(
                "Grass field rebuilt: {} vertices (generation {})",
                self.vertices.len(),
                self.generation
            ),
            GrassMode::Runtime => info!(
                "Grass field enabled: {} vertices, {} segments",
                self.vertices.len(),
                self.settings.segments()
            ),
        }
    }

    fn teardown(&mut self) {
        if self.built_layout.take().is_some() {
            debug!("Grass field torn down");
        }
        self.bounds = BoundsTracker::default();
        self.state = GrassLifecycle::Disabled;
    }

    fn layout_key(&self) -> LayoutKey {
        LayoutKey {
            vertex_count: self.vertices.len(),
            max_segments: self.settings.segments(),
            blade_shape: self.settings.blade_shape,
        }
    }

    // Deformation

    /// Queues a flatten event. Dropped when the registry has not been
    /// created yet (field never ticked while enabled).
    pub fn register_flatten(&mut self, position: Vec3, radius: f32, weight: f32, lifetime: f32) {
        let capacity = self.settings.max_flatten_calculations;
        if let Some(registry) = self.flatten.as_mut() {
            registry.register(FlattenEntry::new(position, radius, weight, lifetime), capacity);
        }
    }

    pub fn flatten_registry(&self) -> Option<&FlattenRegistry> {
        self.flatten.as_ref()
    }

    /// Entries to upload this frame, never empty.
    pub fn flatten_snapshot(&self) -> Vec<FlattenEntry> {
        match &self.flatten {
            Some(registry) => registry.snapshot(),
            None => vec![FlattenEntry::SENTINEL],
        }
    }

    // Bounds

    pub fn local_bounds(&self) -> Option<GrassBounds> {
        self.bounds.local()
    }

    pub fn world_bounds(&self, transform: &GlobalTransform) -> Option<GrassBounds> {
        self.bounds.world(transform)
    }
}
