//! Render-world half of the grass renderer.
//!
//! Fields are extracted each frame, their buffers rebuilt when the main world
//! reports a new generation, expanded on the GPU, then drawn with one
//! indirect call per field after the main opaque pass.

/// Main world to render world copy of enabled grass fields.
pub mod extraction;

/// Pipeline specialisation, view bindings and the indirect draw node.
pub mod indirect_renderer;
