use bevy::prelude::*;
use bevy::render::{
    render_asset::RenderAssets,
    render_resource::{
        AddressMode, BindGroup, BindGroupEntries, BindGroupLayout, BindGroupLayoutEntry,
        BindingType, Buffer, BufferBindingType, BufferDescriptor, BufferInitDescriptor,
        BufferUsages, CachedComputePipelineId, CommandEncoderDescriptor, ComputePassDescriptor,
        ComputePipelineDescriptor, FilterMode, PipelineCache, Sampler, SamplerBindingType,
        SamplerDescriptor, ShaderDefVal, ShaderStages, TextureSampleType, TextureViewDimension,
    },
    renderer::{RenderDevice, RenderQueue},
    texture::GpuImage,
};
use constants::procedural_shader::{GRASS_WORKGROUP_SIZE, MAXIMUM_SEGMENTS};
use std::collections::HashMap;

use super::buffer_lifecycle::{GrassGpu, GrassGpuBuffers, GrassGpuResources};
use crate::engine::grass::settings::BladeShape;

/// Handle types of the wgpu-backed implementation.
pub struct RenderGrassResources;

impl GrassGpuResources for RenderGrassResources {
    type Buffer = Buffer;
    type Kernel = GrassKernel;
    type Material = GrassMaterial;
}

pub struct GrassKernel {
    pub pipeline: CachedComputePipelineId,
    pub wind_noise: Handle<Image>,
    pub group_size: u32,
}

/// Bind group exposing the draw buffer and frame uniform to the blade
/// shader at `@group(1)`.
pub struct GrassMaterial {
    pub bind_group: BindGroup,
}

/// Bind group layouts shared by every grass field.
///
/// - `expansion_layout`: compute `@group(0)`, bindings 0-8
/// - `view_layout`: blade shader `@group(0)`, view uniform
/// - `material_layout`: blade shader `@group(1)`, triangles + frame uniform
#[derive(Resource)]
pub struct GrassPipelines {
    pub expansion_layout: BindGroupLayout,
    pub view_layout: BindGroupLayout,
    pub material_layout: BindGroupLayout,
    pub wind_sampler: Sampler,
}

impl FromWorld for GrassPipelines {
    fn from_world(world: &mut World) -> Self {
        let render_device = world.resource::<RenderDevice>();

        Self {
            expansion_layout: create_expansion_bind_group_layout(render_device),
            view_layout: create_view_bind_group_layout(render_device),
            material_layout: create_material_bind_group_layout(render_device),
            wind_sampler: render_device.create_sampler(&SamplerDescriptor {
                label: Some("grass_wind_sampler"),
                address_mode_u: AddressMode::Repeat,
                address_mode_v: AddressMode::Repeat,
                mag_filter: FilterMode::Linear,
                min_filter: FilterMode::Linear,
                ..default()
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct KernelKey {
    shader: AssetId<Shader>,
    cross_count: u32,
}

/// Compute pipelines already queued, so rebuilding a field every frame in
/// authoring mode does not queue a fresh compilation each time.
#[derive(Resource, Default)]
pub struct GrassKernels {
    pipelines: HashMap<KernelKey, CachedComputePipelineId>,
}

/// [`GrassGpu`] on top of the render world's device and queue.
pub struct RenderGrassGpu<'a> {
    pub render_device: &'a RenderDevice,
    pub render_queue: &'a RenderQueue,
    pub pipeline_cache: &'a PipelineCache,
    pub pipelines: &'a GrassPipelines,
    pub kernels: &'a mut GrassKernels,
    pub gpu_images: &'a RenderAssets<GpuImage>,
}

impl RenderGrassGpu<'_> {
    fn init_buffer(&self, label: &'static str, contents: &[u8], usage: BufferUsages) -> Buffer {
        self.render_device
            .create_buffer_with_data(&BufferInitDescriptor {
                label: Some(label),
                contents,
                usage,
            })
    }
}

impl GrassGpu for RenderGrassGpu<'_> {
    type Resources = RenderGrassResources;

    fn create_storage_buffer(&mut self, label: &'static str, contents: &[u8]) -> Buffer {
        self.init_buffer(label, contents, BufferUsages::STORAGE)
    }

    fn create_append_buffer(&mut self, label: &'static str, size: u64) -> Buffer {
        self.render_device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size,
            usage: BufferUsages::STORAGE,
            mapped_at_creation: false,
        })
    }

    fn create_counter_buffer(&mut self, label: &'static str) -> Buffer {
        self.init_buffer(
            label,
            bytemuck::bytes_of(&0u32),
            BufferUsages::STORAGE | BufferUsages::COPY_DST,
        )
    }

    fn create_indirect_buffer(&mut self, label: &'static str, contents: &[u8]) -> Buffer {
        self.init_buffer(
            label,
            contents,
            BufferUsages::STORAGE | BufferUsages::INDIRECT | BufferUsages::COPY_DST,
        )
    }

    fn create_uniform_buffer(&mut self, label: &'static str, contents: &[u8]) -> Buffer {
        self.init_buffer(
            label,
            contents,
            BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        )
    }

    fn write_buffer(&mut self, buffer: &Buffer, contents: &[u8]) {
        self.render_queue.write_buffer(buffer, 0, contents);
    }

    fn instantiate_kernel(
        &mut self,
        shader: &Handle<Shader>,
        wind_noise: &Handle<Image>,
        blade_shape: BladeShape,
    ) -> GrassKernel {
        let key = KernelKey {
            shader: shader.id(),
            cross_count: blade_shape.cross_count(),
        };

        let pipeline_cache = self.pipeline_cache;
        let expansion_layout = &self.pipelines.expansion_layout;
        let pipeline = *self.kernels.pipelines.entry(key).or_insert_with(|| {
            let mut shader_defs = vec![
                ShaderDefVal::UInt("WORKGROUP_SIZE".into(), GRASS_WORKGROUP_SIZE),
                ShaderDefVal::UInt("MAX_SEGMENTS".into(), MAXIMUM_SEGMENTS),
            ];
            if let BladeShape::Cross { .. } = blade_shape {
                shader_defs.push("CROSS_BLADES".into());
            }
            info!("Queueing grass expansion kernel ({:?})", blade_shape);

            pipeline_cache.queue_compute_pipeline(ComputePipelineDescriptor {
                label: Some("grass_expansion".into()),
                layout: vec![expansion_layout.clone()],
                push_constant_ranges: Vec::new(),
                shader: shader.clone(),
                shader_defs,
                entry_point: "main".into(),
                zero_initialize_workgroup_memory: false,
            })
        });

        GrassKernel {
            pipeline,
            wind_noise: wind_noise.clone(),
            group_size: GRASS_WORKGROUP_SIZE,
        }
    }

    fn kernel_group_size(&self, kernel: &GrassKernel) -> u32 {
        kernel.group_size
    }

    fn instantiate_material(
        &mut self,
        draw_triangles: &Buffer,
        frame: &Buffer,
    ) -> GrassMaterial {
        let bind_group = self.render_device.create_bind_group(
            "grass_material_bind_group",
            &self.pipelines.material_layout,
            &BindGroupEntries::sequential((
                draw_triangles.as_entire_binding(),
                frame.as_entire_binding(),
            )),
        );

        GrassMaterial { bind_group }
    }

    fn dispatch(
        &mut self,
        buffers: &GrassGpuBuffers<RenderGrassResources>,
        flatten_entries: &Buffer,
        groups: UVec3,
    ) -> bool {
        let Some(pipeline) = self
            .pipeline_cache
            .get_compute_pipeline(buffers.kernel.pipeline)
        else {
            return false;
        };
        let Some(wind_noise) = self.gpu_images.get(&buffers.kernel.wind_noise) else {
            return false;
        };

        let bind_group = self.render_device.create_bind_group(
            "grass_expansion_bind_group",
            &self.pipelines.expansion_layout,
            &BindGroupEntries::sequential((
                buffers.source_vertices.as_entire_binding(),
                buffers.draw_triangles.as_entire_binding(),
                buffers.triangle_counter.as_entire_binding(),
                buffers.indirect_args.as_entire_binding(),
                buffers.params.as_entire_binding(),
                buffers.frame.as_entire_binding(),
                flatten_entries.as_entire_binding(),
                &wind_noise.texture_view,
                &self.pipelines.wind_sampler,
            )),
        );

        let mut encoder = self
            .render_device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("grass_expansion_encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor {
                label: Some("grass_expansion"),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups.x, groups.y, groups.z);
        }
        self.render_queue.submit([encoder.finish()]);
        true
    }
}

fn storage_entry(binding: u32, visibility: ShaderStages, read_only: bool) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_entry(binding: u32, visibility: ShaderStages) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// 0: source vertices (read)
/// 1: draw triangles (append)
/// 2: triangle counter (atomic)
/// 3: indirect args (atomic vertex count)
/// 4: blade params
/// 5: frame uniform
/// 6: flatten entries (read)
/// 7-8: wind noise texture and sampler
fn create_expansion_bind_group_layout(render_device: &RenderDevice) -> BindGroupLayout {
    render_device.create_bind_group_layout(
        "grass_expansion_layout",
        &[
            storage_entry(0, ShaderStages::COMPUTE, true),
            storage_entry(1, ShaderStages::COMPUTE, false),
            storage_entry(2, ShaderStages::COMPUTE, false),
            storage_entry(3, ShaderStages::COMPUTE, false),
            uniform_entry(4, ShaderStages::COMPUTE),
            uniform_entry(5, ShaderStages::COMPUTE),
            storage_entry(6, ShaderStages::COMPUTE, true),
            BindGroupLayoutEntry {
                binding: 7,
                visibility: ShaderStages::COMPUTE,
                ty: BindingType::Texture {
                    sample_type: TextureSampleType::Float { filterable: true },
                    view_dimension: TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 8,
                visibility: ShaderStages::COMPUTE,
                ty: BindingType::Sampler(SamplerBindingType::Filtering),
                count: None,
            },
        ],
    )
}

fn create_view_bind_group_layout(render_device: &RenderDevice) -> BindGroupLayout {
    render_device.create_bind_group_layout(
        "grass_view_layout",
        &[uniform_entry(0, ShaderStages::VERTEX_FRAGMENT)],
    )
}

fn create_material_bind_group_layout(render_device: &RenderDevice) -> BindGroupLayout {
    render_device.create_bind_group_layout(
        "grass_material_layout",
        &[
            storage_entry(0, ShaderStages::VERTEX, true),
            uniform_entry(1, ShaderStages::VERTEX_FRAGMENT),
        ],
    )
}
