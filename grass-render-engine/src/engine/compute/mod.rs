//! GPU-side grass: buffer ownership, the per-frame expansion protocol and
//! the render-world systems that drive them.

/// `GrassGpu` backend seam and the per-field buffer lifecycle manager.
///
/// Allocation is sized from vertex count and blade settings; teardown is
/// safe from any state.
pub mod buffer_lifecycle;

/// Counter reset, uniform upload and kernel dispatch for one frame.
pub mod expansion_dispatch;

/// Render-world systems rebuilding buffers and dispatching each frame.
pub mod expansion_systems;

/// wgpu implementation of the backend seam plus shared bind group layouts.
pub mod render_backend;

#[cfg(test)]
pub(crate) mod recording_gpu;
