use bevy::prelude::*;
use bytemuck::{Zeroable, bytes_of, cast_slice};
use constants::procedural_shader::INDIRECT_ARGS_RESET;

use crate::engine::grass::buffer_layout::{
    GpuSourceVertex, GrassBufferLayout, GrassFrameUniform, GrassParamsUniform,
};
use crate::engine::grass::settings::{BladeShape, GrassResources, GrassSettings};
use crate::engine::grass::vertex_store::SourceVertex;

/// Handle types a GPU backend hands out. Kept separate from [`GrassGpu`] so
/// managers can be stored without borrowing the backend.
pub trait GrassGpuResources: 'static {
    type Buffer;
    type Kernel;
    type Material;
}

/// The GPU operations grass needs: buffer creation and upload, kernel and
/// material instantiation, and the expansion dispatch.
pub trait GrassGpu {
    type Resources: GrassGpuResources;

    /// Storage buffer initialised from `contents`, never written again.
    fn create_storage_buffer(
        &mut self,
        label: &'static str,
        contents: &[u8],
    ) -> <Self::Resources as GrassGpuResources>::Buffer;

    /// Zeroed storage buffer the kernel appends triangles into.
    fn create_append_buffer(
        &mut self,
        label: &'static str,
        size: u64,
    ) -> <Self::Resources as GrassGpuResources>::Buffer;

    /// Single `u32` atomic counter.
    fn create_counter_buffer(
        &mut self,
        label: &'static str,
    ) -> <Self::Resources as GrassGpuResources>::Buffer;

    /// Four `u32` indirect draw arguments, usable as both storage and
    /// indirect buffer.
    fn create_indirect_buffer(
        &mut self,
        label: &'static str,
        contents: &[u8],
    ) -> <Self::Resources as GrassGpuResources>::Buffer;

    fn create_uniform_buffer(
        &mut self,
        label: &'static str,
        contents: &[u8],
    ) -> <Self::Resources as GrassGpuResources>::Buffer;

    fn write_buffer(
        &mut self,
        buffer: &<Self::Resources as GrassGpuResources>::Buffer,
        contents: &[u8],
    );

    fn instantiate_kernel(
        &mut self,
        shader: &Handle<Shader>,
        wind_noise: &Handle<Image>,
        blade_shape: BladeShape,
    ) -> <Self::Resources as GrassGpuResources>::Kernel;

    /// Threads per workgroup along X the kernel was compiled with.
    fn kernel_group_size(&self, kernel: &<Self::Resources as GrassGpuResources>::Kernel) -> u32;

    /// Binds the draw buffer and frame uniform for the blade shader.
    fn instantiate_material(
        &mut self,
        draw_triangles: &<Self::Resources as GrassGpuResources>::Buffer,
        frame: &<Self::Resources as GrassGpuResources>::Buffer,
    ) -> <Self::Resources as GrassGpuResources>::Material;

    /// Runs the expansion kernel. Returns false without doing anything when
    /// the kernel or one of its inputs is not ready yet.
    fn dispatch(
        &mut self,
        buffers: &GrassGpuBuffers<Self::Resources>,
        flatten_entries: &<Self::Resources as GrassGpuResources>::Buffer,
        groups: UVec3,
    ) -> bool;
}

/// Everything allocated for one built field. Dropping it releases all of it.
pub struct GrassGpuBuffers<R: GrassGpuResources> {
    pub layout: GrassBufferLayout,
    pub source_vertices: R::Buffer,
    pub draw_triangles: R::Buffer,
    pub triangle_counter: R::Buffer,
    pub indirect_args: R::Buffer,
    pub params: R::Buffer,
    pub frame: R::Buffer,
    pub kernel: R::Kernel,
    pub material: R::Material,
}

/// Owns the GPU side of one grass field.
///
/// Initialisation always starts from a clean slate, so calling it again is
/// a rebuild. Teardown is a no-op on an uninitialised manager.
pub struct BufferLifecycleManager<R: GrassGpuResources> {
    buffers: Option<GrassGpuBuffers<R>>,
}

impl<R: GrassGpuResources> Default for BufferLifecycleManager<R> {
    fn default() -> Self {
        Self { buffers: None }
    }
}

impl<R: GrassGpuResources> BufferLifecycleManager<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.buffers.is_some()
    }

    pub fn buffers(&self) -> Option<&GrassGpuBuffers<R>> {
        self.buffers.as_ref()
    }

    pub fn layout(&self) -> Option<&GrassBufferLayout> {
        self.buffers.as_ref().map(|buffers| &buffers.layout)
    }

    /// Allocates and uploads every buffer for `vertices`.
    ///
    /// Refuses, leaving nothing allocated, when a required resource is
    /// missing or there are no vertices.
    pub fn initialize<G: GrassGpu<Resources = R>>(
        &mut self,
        gpu: &mut G,
        vertices: &[SourceVertex],
        settings: &GrassSettings,
        resources: &GrassResources,
    ) -> bool {
        self.teardown();

        let (Some(kernel_shader), Some(_), Some(wind_noise)) = (
            resources.kernel.as_ref(),
            resources.material.as_ref(),
            resources.wind_noise.as_ref(),
        ) else {
            return false;
        };
        if vertices.is_empty() {
            return false;
        }

        let kernel = gpu.instantiate_kernel(kernel_shader, wind_noise, settings.blade_shape);
        let layout =
            GrassBufferLayout::new(vertices.len(), settings, gpu.kernel_group_size(&kernel));

        let gpu_vertices: Vec<GpuSourceVertex> =
            vertices.iter().map(GpuSourceVertex::from).collect();
        let source_vertices =
            gpu.create_storage_buffer("grass_source_vertices", cast_slice(&gpu_vertices));
        let draw_triangles =
            gpu.create_append_buffer("grass_draw_triangles", layout.draw_buffer_size());
        let triangle_counter = gpu.create_counter_buffer("grass_triangle_counter");
        let indirect_args =
            gpu.create_indirect_buffer("grass_indirect_args", cast_slice(&INDIRECT_ARGS_RESET));
        let params = gpu.create_uniform_buffer(
            "grass_params",
            bytes_of(&GrassParamsUniform::new(settings, &layout)),
        );
        let frame = gpu.create_uniform_buffer("grass_frame", bytes_of(&GrassFrameUniform::zeroed()));
        let material = gpu.instantiate_material(&draw_triangles, &frame);

        debug!(
            "Grass buffers allocated: {} vertices, {} triangles capacity, {:?} groups",
            layout.vertex_count, layout.draw_capacity, layout.dispatch_groups
        );

        self.buffers = Some(GrassGpuBuffers {
            layout,
            source_vertices,
            draw_triangles,
            triangle_counter,
            indirect_args,
            params,
            frame,
            kernel,
            material,
        });
        true
    }

    /// Releases every buffer, the kernel and the material.
    pub fn teardown(&mut self) {
        if self.buffers.take().is_some() {
            debug!("Grass buffers released");
        }
    }

    pub fn force_refresh<G: GrassGpu<Resources = R>>(
        &mut self,
        gpu: &mut G,
        vertices: &[SourceVertex],
        settings: &GrassSettings,
        resources: &GrassResources,
    ) -> bool {
        self.teardown();
        self.initialize(gpu, vertices, settings, resources)
    }
}
