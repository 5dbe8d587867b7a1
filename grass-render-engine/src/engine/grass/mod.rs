//! Main-world grass model: authored points, settings, lifecycle and
//! deformation bookkeeping. Nothing here touches the GPU.

/// Bounding volume of the expanded blades in local and world space.
pub mod bounds_tracker;

/// GPU struct layouts and buffer sizing rules.
pub mod buffer_layout;

/// Flatten requests, the trampler emitter and the active-field sink.
pub mod deformation;

/// `GrassField` component and its enable/rebuild/disable state machine.
pub mod field;

/// Bounded FIFO registry of decaying flatten entries.
pub mod flatten_registry;

/// Numeric settings, asset references and unmet-dependency reporting.
pub mod settings;

/// Authored point cloud.
pub mod vertex_store;
