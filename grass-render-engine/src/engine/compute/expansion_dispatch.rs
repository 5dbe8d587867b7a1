use bevy::prelude::*;
use bytemuck::{bytes_of, cast_slice};
use constants::procedural_shader::INDIRECT_ARGS_RESET;

use super::buffer_lifecycle::{BufferLifecycleManager, GrassGpu};
use crate::engine::grass::buffer_layout::{GpuFlattenEntry, GrassFrameUniform};
use crate::engine::grass::flatten_registry::FlattenEntry;

/// Per-frame inputs to the expansion kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionFrame {
    pub world_from_local: Mat4,
    /// Seconds since startup.
    pub elapsed: f32,
    pub delta: f32,
    /// Camera driving LOD and clipping. `None` disables both.
    pub lod_camera: Option<Vec3>,
    pub flatten_entries: Vec<FlattenEntry>,
}

impl ExpansionFrame {
    pub fn uniform(&self, flatten_count: u32) -> GrassFrameUniform {
        let (camera, lod_disabled) = match self.lod_camera {
            Some(position) => (position, 0.0),
            None => (Vec3::ZERO, 1.0),
        };

        GrassFrameUniform {
            world_from_local: self.world_from_local.to_cols_array_2d(),
            time: [self.elapsed, self.delta, 0.0, 0.0],
            camera_position: camera.extend(lod_disabled).to_array(),
            flatten_count,
            _padding: [0; 3],
        }
    }
}

/// Resets the append counter and indirect arguments, uploads this frame's
/// uniforms and flatten snapshot, then dispatches the expansion kernel.
///
/// The flatten buffer lives only for the duration of this call; queue
/// submission order keeps it valid for the dispatch that reads it.
/// Returns whether a dispatch was issued.
pub fn dispatch_expansion<G: GrassGpu>(
    gpu: &mut G,
    manager: &BufferLifecycleManager<G::Resources>,
    frame: &ExpansionFrame,
) -> bool {
    let Some(buffers) = manager.buffers() else {
        return false;
    };

    gpu.write_buffer(&buffers.triangle_counter, bytes_of(&0u32));
    gpu.write_buffer(&buffers.indirect_args, cast_slice(&INDIRECT_ARGS_RESET));

    let mut flatten: Vec<GpuFlattenEntry> =
        frame.flatten_entries.iter().map(GpuFlattenEntry::from).collect();
    if flatten.is_empty() {
        flatten.push(GpuFlattenEntry::from(&FlattenEntry::SENTINEL));
    }
    let uniform = frame.uniform(flatten.len() as u32);
    gpu.write_buffer(&buffers.frame, bytes_of(&uniform));

    let flatten_buffer = gpu.create_storage_buffer("grass_flatten_entries", cast_slice(&flatten));
    let dispatched = gpu.dispatch(buffers, &flatten_buffer, buffers.layout.dispatch_groups);
    drop(flatten_buffer);

    dispatched
}
