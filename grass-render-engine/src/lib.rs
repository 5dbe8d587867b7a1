//! GPU procedural grass for bevy.
//!
//! Sparse authored points are expanded every frame by a compute kernel into
//! wind-animated blades, drawn with one indirect call per field and pressed
//! down locally by decaying flatten events.

pub mod engine;
