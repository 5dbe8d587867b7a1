pub mod assets;
pub mod compute;
pub mod core;
pub mod grass;
pub mod plugins;
pub mod render;
pub mod systems;
