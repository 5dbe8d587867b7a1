//! Main-world systems driving grass fields each frame.
//!
//! Field ticking, deformation routing and the small housekeeping systems
//! around them (default wind noise, duplicate field warnings).

/// Trampler emission and flatten request routing.
pub mod deformation;

/// Per-frame field ticking and deformation sink ownership.
pub mod field_lifecycle;
