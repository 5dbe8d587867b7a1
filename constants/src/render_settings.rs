pub const DEFAULT_MAX_SEGMENTS: u32 = 8;
pub const DEFAULT_MAX_BEND_ANGLE: f32 = 0.1;
pub const DEFAULT_BLADE_CURVATURE: f32 = 1.0;
pub const DEFAULT_BLADE_HEIGHT: f32 = 2.0;
pub const DEFAULT_BLADE_HEIGHT_VARIANCE: f32 = 0.3;
pub const DEFAULT_BLADE_WIDTH: f32 = 0.4;
pub const DEFAULT_BLADE_WIDTH_VARIANCE: f32 = 0.1;

pub const DEFAULT_WIND_SCALE: f32 = 0.01;
pub const DEFAULT_WIND_SPEED: f32 = 0.05;
pub const DEFAULT_WIND_AMOUNT: f32 = 0.5;

pub const DEFAULT_LOD_DISTANCE: f32 = 15.0;
pub const DEFAULT_CLIP_DISTANCE: f32 = 100.0;
pub const DEFAULT_CLIP_OFFSET: f32 = 3.0;

/// Capacity of the flatten registry before FIFO eviction kicks in.
pub const DEFAULT_MAX_FLATTEN_CALCULATIONS: usize = 25;

/// Trampler defaults; lifetime of a registration is `impression * TRAMPLE_LIFETIME_SCALE`.
pub const DEFAULT_TRAMPLE_RADIUS: f32 = 2.3;
pub const DEFAULT_TRAMPLE_WEIGHT: f32 = 1.0;
pub const DEFAULT_TRAMPLE_IMPRESSION: f32 = 0.4;
pub const TRAMPLE_LIFETIME_SCALE: f32 = 10.0;

/// Side length of the generated default wind noise texture, in pixels.
pub const WIND_NOISE_SIZE: u32 = 256;
/// Noise lattice cell size in pixels; must divide `WIND_NOISE_SIZE` for tiling.
pub const WIND_NOISE_CELL: u32 = 32;
