use bevy::core_pipeline::core_3d::CORE_3D_DEPTH_FORMAT;
use bevy::core_pipeline::core_3d::graph::{Core3d, Node3d};
use bevy::ecs::query::QueryItem;
use bevy::image::BevyDefault;
use bevy::math::Affine3A;
use bevy::prelude::*;
use bevy::render::primitives::{Aabb, Frustum};
use bevy::render::render_graph::{
    NodeRunError, RenderGraphApp, RenderGraphContext, RenderLabel, ViewNode, ViewNodeRunner,
};
use bevy::render::render_resource::{
    BindGroup, BindGroupEntries, BufferInitDescriptor, BufferUsages, CachedRenderPipelineId,
    ColorTargetState, ColorWrites, CompareFunction, DepthBiasState, DepthStencilState,
    FragmentState, LoadOp, MultisampleState, Operations, PipelineCache, PrimitiveState,
    PrimitiveTopology, RenderPassDepthStencilAttachment, RenderPassDescriptor,
    RenderPipelineDescriptor, SpecializedRenderPipeline, SpecializedRenderPipelines, StencilState,
    StoreOp, TextureFormat, VertexState,
};
use bevy::render::renderer::{RenderContext, RenderDevice};
use bevy::render::view::{ExtractedView, Msaa, ViewDepthTexture, ViewTarget};
use bevy::render::{ExtractSchedule, Render, RenderApp, RenderSet};
use bytemuck::{Pod, Zeroable};

use super::extraction::{ExtractedGrassFields, extract_grass_fields};
use crate::engine::compute::expansion_systems::{
    GrassGpuFields, prepare_grass_buffers, run_grass_expansion,
};
use crate::engine::compute::render_backend::{GrassKernels, GrassPipelines};
use crate::engine::grass::bounds_tracker::GrassBounds;

/// Render-world half of the grass renderer: extraction, buffer preparation,
/// expansion dispatch and the indirect draw node.
pub struct GrassRenderPlugin;

impl Plugin for GrassRenderPlugin {
    fn build(&self, app: &mut App) {
        let Some(render_app) = app.get_sub_app_mut(RenderApp) else {
            return;
        };

        render_app
            .init_resource::<ExtractedGrassFields>()
            .init_resource::<GrassGpuFields>()
            .init_resource::<GrassKernels>()
            .init_resource::<SpecializedRenderPipelines<GrassPipelines>>()
            .add_systems(ExtractSchedule, extract_grass_fields)
            .add_systems(
                Render,
                (
                    queue_grass_pipelines.in_set(RenderSet::Queue),
                    (prepare_grass_buffers, run_grass_expansion)
                        .chain()
                        .in_set(RenderSet::PrepareResources),
                    prepare_grass_view_bind_groups.in_set(RenderSet::PrepareBindGroups),
                ),
            )
            .add_render_graph_node::<ViewNodeRunner<GrassRenderNode>>(Core3d, GrassRenderLabel)
            .add_render_graph_edges(
                Core3d,
                (
                    Node3d::MainOpaquePass,
                    GrassRenderLabel,
                    Node3d::MainTransparentPass,
                ),
            );
    }

    fn finish(&self, app: &mut App) {
        let Some(render_app) = app.get_sub_app_mut(RenderApp) else {
            return;
        };

        render_app.init_resource::<GrassPipelines>();
    }
}

#[derive(Debug, Hash, PartialEq, Eq, Clone, RenderLabel)]
pub struct GrassRenderLabel;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GrassPipelineKey {
    pub shader: Handle<Shader>,
    pub hdr: bool,
    pub msaa_samples: u32,
}

impl SpecializedRenderPipeline for GrassPipelines {
    type Key = GrassPipelineKey;

    fn specialize(&self, key: Self::Key) -> RenderPipelineDescriptor {
        let format = if key.hdr {
            ViewTarget::TEXTURE_FORMAT_HDR
        } else {
            TextureFormat::bevy_default()
        };

        RenderPipelineDescriptor {
            label: Some("grass_blades_pipeline".into()),
            layout: vec![
                // @group(0) - view
                self.view_layout.clone(),
                // @group(1) - expanded triangles + frame uniform
                self.material_layout.clone(),
            ],
            push_constant_ranges: vec![],
            // No vertex buffers: triangles are read from storage by vertex index.
            vertex: VertexState {
                shader: key.shader.clone(),
                entry_point: "vertex".into(),
                shader_defs: vec![],
                buffers: vec![],
            },
            fragment: Some(FragmentState {
                shader: key.shader,
                entry_point: "fragment".into(),
                shader_defs: vec![],
                targets: vec![Some(ColorTargetState {
                    format,
                    blend: None,
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                cull_mode: None, // Blades are visible from both sides.
                ..default()
            },
            depth_stencil: Some(DepthStencilState {
                format: CORE_3D_DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: CompareFunction::Greater,
                stencil: StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: MultisampleState {
                count: key.msaa_samples,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            zero_initialize_workgroup_memory: false,
        }
    }
}

/// Grass fields to draw in a view, with the pipeline for each.
#[derive(Component, Default)]
pub struct ViewGrassDraws(pub Vec<(Entity, CachedRenderPipelineId)>);

/// `@group(0)` of the blade shader for one view.
#[derive(Component)]
pub struct GrassViewBindGroup(pub BindGroup);

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct GrassViewUniform {
    clip_from_world: [[f32; 4]; 4], // 0
    camera_position: [f32; 4],      // 64
}

fn queue_grass_pipelines(
    mut commands: Commands,
    views: Query<(Entity, &ExtractedView, &Msaa)>,
    extracted: Res<ExtractedGrassFields>,
    pipelines: Res<GrassPipelines>,
    mut specialized: ResMut<SpecializedRenderPipelines<GrassPipelines>>,
    pipeline_cache: Res<PipelineCache>,
) {
    for (view_entity, view, msaa) in &views {
        let mut draws = Vec::with_capacity(extracted.0.len());

        for (entity, field) in &extracted.0 {
            let Some(shader) = &field.resources.material else {
                continue;
            };
            let key = GrassPipelineKey {
                shader: shader.clone(),
                hdr: view.hdr,
                msaa_samples: msaa.samples(),
            };
            draws.push((
                *entity,
                specialized.specialize(&pipeline_cache, &pipelines, key),
            ));
        }

        commands.entity(view_entity).insert(ViewGrassDraws(draws));
    }
}

fn prepare_grass_view_bind_groups(
    mut commands: Commands,
    views: Query<(Entity, &ExtractedView), With<ViewGrassDraws>>,
    render_device: Res<RenderDevice>,
    pipelines: Res<GrassPipelines>,
) {
    for (view_entity, view) in &views {
        let clip_from_world = view.clip_from_world.unwrap_or_else(|| {
            view.clip_from_view * view.world_from_view.compute_matrix().inverse()
        });
        let uniform = GrassViewUniform {
            clip_from_world: clip_from_world.to_cols_array_2d(),
            camera_position: view.world_from_view.translation().extend(1.0).to_array(),
        };

        let buffer = render_device.create_buffer_with_data(&BufferInitDescriptor {
            label: Some("grass_view_uniform"),
            contents: bytemuck::bytes_of(&uniform),
            usage: BufferUsages::UNIFORM,
        });
        let bind_group = render_device.create_bind_group(
            "grass_view_bind_group",
            &pipelines.view_layout,
            &BindGroupEntries::single(buffer.as_entire_binding()),
        );

        commands
            .entity(view_entity)
            .insert(GrassViewBindGroup(bind_group));
    }
}

/// Whether `bounds` can be seen; fields without bounds are always drawn.
fn is_visible(frustum: Option<&Frustum>, bounds: Option<GrassBounds>) -> bool {
    let (Some(frustum), Some(bounds)) = (frustum, bounds) else {
        return true;
    };
    let aabb = Aabb {
        center: bounds.center.into(),
        half_extents: bounds.extents.into(),
    };
    frustum.intersects_obb(&aabb, &Affine3A::IDENTITY, true, true)
}

/// Draws every built grass field in the view with one indirect call each.
/// The vertex count comes from the arguments the expansion kernel wrote.
#[derive(Default)]
struct GrassRenderNode;

impl ViewNode for GrassRenderNode {
    type ViewQuery = (
        &'static ViewTarget,
        &'static ViewGrassDraws,
        &'static GrassViewBindGroup,
        Option<&'static ViewDepthTexture>,
        Option<&'static Frustum>,
    );

    fn run(
        &self,
        _graph: &mut RenderGraphContext,
        render_context: &mut RenderContext,
        (target, draws, view_bind_group, depth, frustum): QueryItem<Self::ViewQuery>,
        world: &World,
    ) -> Result<(), NodeRunError> {
        if draws.0.is_empty() {
            return Ok(());
        }

        let gpu_fields = world.resource::<GrassGpuFields>();
        let extracted = world.resource::<ExtractedGrassFields>();
        let pipeline_cache = world.resource::<PipelineCache>();

        let depth_stencil_attachment = depth.map(|depth_texture| RenderPassDepthStencilAttachment {
            view: depth_texture.view(),
            depth_ops: Some(Operations {
                load: LoadOp::Load, // Depth from the main opaque pass.
                store: StoreOp::Store,
            }),
            stencil_ops: None,
        });

        let mut render_pass = render_context.begin_tracked_render_pass(RenderPassDescriptor {
            label: Some("grass_render_pass"),
            color_attachments: &[Some(target.get_color_attachment())],
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        render_pass.set_bind_group(0, &view_bind_group.0, &[]);

        for (entity, pipeline_id) in &draws.0 {
            let Some(pipeline) = pipeline_cache.get_render_pipeline(*pipeline_id) else {
                continue;
            };
            let Some(buffers) = gpu_fields.0.get(entity).and_then(|field| field.buffers()) else {
                continue;
            };
            let bounds = extracted.0.get(entity).and_then(|field| field.world_bounds);
            if !is_visible(frustum, bounds) {
                continue;
            }

            render_pass.set_render_pipeline(pipeline);
            render_pass.set_bind_group(1, &buffers.material.bind_group, &[]);
            render_pass.draw_indirect(&buffers.indirect_args, 0);
        }

        Ok(())
    }
}
