/// Threads per workgroup along X in the expansion kernel.
/// Injected into the WGSL as the `WORKGROUP_SIZE` shader def.
pub const GRASS_WORKGROUP_SIZE: u32 = 64;

/// Bytes per source vertex on the GPU: position vec4 + normal vec4.
pub const SOURCE_VERTEX_STRIDE: u64 = 4 * (4 + 4);

/// Bytes per emitted triangle: face normal vec4 + 3 vertices of (xyz, height).
pub const DRAW_TRIANGLE_STRIDE: u64 = 4 * (4 + 4 * 3);

/// Bytes per flatten entry: position, radius, weight, max lifetime, lifetime, pad.
pub const FLATTEN_ENTRY_STRIDE: u64 = 4 * (3 + 1 + 1 + 1 + 1 + 1);

/// Indirect draw arguments: vertex count, instance count, first vertex, first instance.
pub const INDIRECT_ARGS_STRIDE: u64 = 4 * 4;

/// Written to the indirect argument block before every dispatch.
/// Vertex count is filled in by the kernel, instance count is always one.
pub const INDIRECT_ARGS_RESET: [u32; 4] = [0, 1, 0, 0];

/// Upper bound for crossing planes in the cross-blade variant.
pub const MAXIMUM_CROSS_COUNT: u32 = 5;

/// Most segments a blade can have. Injected into the WGSL as the
/// `MAX_SEGMENTS` shader def; larger settings are clamped to it.
pub const MAXIMUM_SEGMENTS: u32 = 32;
