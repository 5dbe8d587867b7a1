//! GPU-side layouts and the sizing rules every grass buffer is allocated from.

use bevy::prelude::*;
use bytemuck::{Pod, Zeroable};
use constants::procedural_shader::{
    DRAW_TRIANGLE_STRIDE, FLATTEN_ENTRY_STRIDE, INDIRECT_ARGS_STRIDE, MAXIMUM_SEGMENTS,
    SOURCE_VERTEX_STRIDE,
};

use super::flatten_registry::FlattenEntry;
use super::settings::{BladeShape, GrassSettings};
use super::vertex_store::SourceVertex;

/// Triangles one blade of `max_segments` emits at full detail:
/// two per segment below the tip plus a single tip triangle. Segments are
/// clamped to `1..=MAXIMUM_SEGMENTS` like the kernel clamps them.
pub fn max_blade_triangles(max_segments: u32) -> u32 {
    (max_segments.clamp(1, MAXIMUM_SEGMENTS) - 1) * 2 + 1
}

/// Buffer sizes and dispatch shape derived from vertex count and settings.
/// Any change to these values requires a full reallocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrassBufferLayout {
    pub vertex_count: u32,
    pub max_segments: u32,
    pub triangles_per_vertex: u32,
    /// Worst-case triangle count of the draw buffer.
    pub draw_capacity: u64,
    pub dispatch_groups: UVec3,
}

impl GrassBufferLayout {
    pub fn new(vertex_count: usize, settings: &GrassSettings, group_size_x: u32) -> Self {
        let vertex_count = vertex_count as u32;
        let triangles_per_vertex = match settings.blade_shape {
            BladeShape::Blade => max_blade_triangles(settings.segments()),
            shape @ BladeShape::Cross { .. } => shape.cross_count() * 2,
        };

        Self {
            vertex_count,
            max_segments: settings.segments(),
            triangles_per_vertex,
            draw_capacity: vertex_count as u64 * triangles_per_vertex as u64,
            dispatch_groups: UVec3::new(vertex_count.div_ceil(group_size_x.max(1)), 1, 1),
        }
    }

    pub fn source_buffer_size(&self) -> u64 {
        self.vertex_count as u64 * SOURCE_VERTEX_STRIDE
    }

    pub fn draw_buffer_size(&self) -> u64 {
        self.draw_capacity * DRAW_TRIANGLE_STRIDE
    }

    pub fn indirect_buffer_size(&self) -> u64 {
        INDIRECT_ARGS_STRIDE
    }

    pub fn flatten_buffer_size(entry_count: usize) -> u64 {
        entry_count as u64 * FLATTEN_ENTRY_STRIDE
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuSourceVertex {
    pub position: [f32; 4],
    pub normal: [f32; 4],
}

impl From<&SourceVertex> for GpuSourceVertex {
    fn from(vertex: &SourceVertex) -> Self {
        Self {
            position: vertex.position.extend(1.0).to_array(),
            normal: vertex.normal.normalize_or(Vec3::Y).extend(0.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuFlattenEntry {
    pub position: [f32; 3],
    pub radius: f32,
    pub weight: f32,
    pub max_lifetime: f32,
    pub lifetime: f32,
    pub _padding: f32,
}

impl From<&FlattenEntry> for GpuFlattenEntry {
    fn from(entry: &FlattenEntry) -> Self {
        Self {
            position: entry.position.to_array(),
            radius: entry.radius,
            weight: entry.weight,
            max_lifetime: entry.max_lifetime,
            lifetime: entry.lifetime,
            _padding: 0.0,
        }
    }
}

/// One triangle as written by the kernel; `w` of each vertex is the
/// normalized height along the blade.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuDrawTriangle {
    pub normal: [f32; 4],
    pub vertices: [[f32; 4]; 3],
}

/// Blade shape and wind parameters, written once per build.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GrassParamsUniform {
    pub max_segments: u32,         // 0
    pub num_source_vertices: u32,  // 4
    pub cross_count: u32,          // 8
    pub _padding: u32,             // 12
    pub max_bend_angle: f32,       // 16
    pub blade_curvature: f32,      // 20
    pub blade_height: f32,         // 24
    pub blade_height_variance: f32, // 28
    pub blade_width: f32,          // 32
    pub blade_width_variance: f32, // 36
    pub wind_scale: f32,           // 40
    pub wind_speed: f32,           // 44
    pub wind_amount: f32,          // 48
    pub lod_distance: f32,         // 52
    pub clip_distance: f32,        // 56
    pub clip_offset: f32,          // 60
}

impl GrassParamsUniform {
    pub fn new(settings: &GrassSettings, layout: &GrassBufferLayout) -> Self {
        Self {
            max_segments: layout.max_segments,
            num_source_vertices: layout.vertex_count,
            cross_count: settings.blade_shape.cross_count(),
            _padding: 0,
            max_bend_angle: settings.max_bend_angle,
            blade_curvature: settings.blade_curvature,
            blade_height: settings.blade_height,
            blade_height_variance: settings.blade_height_variance,
            blade_width: settings.blade_width,
            blade_width_variance: settings.blade_width_variance,
            wind_scale: settings.wind_scale,
            wind_speed: settings.wind_speed,
            wind_amount: settings.wind_amount,
            lod_distance: settings.lod_distance,
            clip_distance: settings.clip_distance,
            clip_offset: settings.clip_offset,
        }
    }
}

/// Values that change every frame. `camera_position.w` is 0 when LOD is
/// driven by a real camera and 1 when LOD is disabled (authoring preview).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GrassFrameUniform {
    pub world_from_local: [[f32; 4]; 4], // 0
    pub time: [f32; 4],                  // 64
    pub camera_position: [f32; 4],      // 80
    pub flatten_count: u32,              // 96
    pub _padding: [u32; 3],              // 100 (→ 112)
}
