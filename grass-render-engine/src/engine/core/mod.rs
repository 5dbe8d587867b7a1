//! Demo application setup for native and WASM targets.

/// Builds the demo app: plugins, scene, grass field and trampler.
pub mod app_setup;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;
