//! Assets consumed by grass fields: settings files, shaders and wind noise.

/// Bundled expansion kernel and blade shader handles.
pub mod grass_shaders;

/// JSON settings asset and the system applying it to fields.
pub mod settings_asset;

/// Generated tileable wind noise used when a field has no wind texture.
pub mod wind_noise;
