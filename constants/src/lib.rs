//! Shared numeric defaults and GPU layout constants for the grass renderer.

/// Compute kernel dispatch sizing and GPU buffer strides.
pub mod procedural_shader;

/// Default grass settings values used when a settings field is absent.
pub mod render_settings;
