use bevy::prelude::*;
use bevy::render::{
    render_asset::RenderAssets,
    render_resource::PipelineCache,
    renderer::{RenderDevice, RenderQueue},
    texture::GpuImage,
};
use std::collections::HashMap;

use super::buffer_lifecycle::BufferLifecycleManager;
use super::expansion_dispatch::dispatch_expansion;
use super::render_backend::{GrassKernels, GrassPipelines, RenderGrassGpu, RenderGrassResources};
use crate::engine::render::extraction::ExtractedGrassFields;

pub type RenderGrassManager = BufferLifecycleManager<RenderGrassResources>;

/// GPU state of every grass field, keyed by main-world entity.
#[derive(Resource, Default)]
pub struct GrassGpuFields(pub HashMap<Entity, RenderGrassManager>);

/// Rebuilds buffers for fields whose generation changed and releases those
/// that are no longer enabled.
pub fn prepare_grass_buffers(
    extracted: Res<ExtractedGrassFields>,
    mut gpu_fields: ResMut<GrassGpuFields>,
    render_device: Res<RenderDevice>,
    render_queue: Res<RenderQueue>,
    pipeline_cache: Res<PipelineCache>,
    pipelines: Res<GrassPipelines>,
    mut kernels: ResMut<GrassKernels>,
    gpu_images: Res<RenderAssets<GpuImage>>,
) {
    gpu_fields.0.retain(|entity, manager| {
        let keep = extracted.0.contains_key(entity);
        if !keep {
            manager.teardown();
            info!("Grass field {:?} released", entity);
        }
        keep
    });

    let mut gpu = RenderGrassGpu {
        render_device: &render_device,
        render_queue: &render_queue,
        pipeline_cache: &pipeline_cache,
        pipelines: &pipelines,
        kernels: &mut kernels,
        gpu_images: &gpu_images,
    };

    for (entity, field) in &extracted.0 {
        let Some(vertices) = &field.vertices else {
            continue;
        };

        let manager = gpu_fields.0.entry(*entity).or_default();
        manager.force_refresh(&mut gpu, vertices, &field.settings, &field.resources);
    }
}

/// Runs the per-frame expansion protocol for every built field.
pub fn run_grass_expansion(
    extracted: Res<ExtractedGrassFields>,
    gpu_fields: Res<GrassGpuFields>,
    render_device: Res<RenderDevice>,
    render_queue: Res<RenderQueue>,
    pipeline_cache: Res<PipelineCache>,
    pipelines: Res<GrassPipelines>,
    mut kernels: ResMut<GrassKernels>,
    gpu_images: Res<RenderAssets<GpuImage>>,
) {
    let mut gpu = RenderGrassGpu {
        render_device: &render_device,
        render_queue: &render_queue,
        pipeline_cache: &pipeline_cache,
        pipelines: &pipelines,
        kernels: &mut kernels,
        gpu_images: &gpu_images,
    };

    for (entity, manager) in &gpu_fields.0 {
        let Some(field) = extracted.0.get(entity) else {
            continue;
        };
        if !dispatch_expansion(&mut gpu, manager, &field.frame) {
            debug!("Grass expansion for {:?} skipped, kernel inputs not ready", entity);
        }
    }
}
