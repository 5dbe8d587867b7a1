use bevy::math::FloatExt;
use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use constants::render_settings::{WIND_NOISE_CELL, WIND_NOISE_SIZE};

/// Generated wind texture assigned to fields that have none.
#[derive(Resource, Debug, Clone)]
pub struct DefaultWindNoise {
    pub image: Handle<Image>,
}

impl FromWorld for DefaultWindNoise {
    fn from_world(world: &mut World) -> Self {
        let data = generate_wind_noise(WIND_NOISE_SIZE, WIND_NOISE_CELL);
        let image = Image::new(
            Extent3d {
                width: WIND_NOISE_SIZE,
                height: WIND_NOISE_SIZE,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            data,
            TextureFormat::Rgba8Unorm,
            RenderAssetUsages::RENDER_WORLD,
        );

        Self {
            image: world.resource_mut::<Assets<Image>>().add(image),
        }
    }
}

// Integer hash, wrapping so large lattice coordinates never overflow.
fn hash(x: i32, y: i32, seed: i32) -> f32 {
    let mut n = x.wrapping_add(y.wrapping_mul(57)).wrapping_add(seed.wrapping_mul(131));
    n = (n << 13) ^ n;
    let nn = n
        .wrapping_mul(n.wrapping_mul(n).wrapping_mul(15731).wrapping_add(789221))
        .wrapping_add(1376312589)
        & 0x7fffffff;
    nn as f32 / 2147483647.0
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Smoothed value noise in `[0, 1]` whose lattice repeats every `period`
/// cells, so the texture tiles seamlessly.
pub fn tileable_value_noise(x: f32, y: f32, cell: f32, period: i32, seed: i32) -> f32 {
    let fx = x / cell;
    let fy = y / cell;
    let x0 = fx.floor() as i32;
    let y0 = fy.floor() as i32;
    let sx = smoothstep(fx - x0 as f32);
    let sy = smoothstep(fy - y0 as f32);

    let lattice = |lx: i32, ly: i32| hash(lx.rem_euclid(period), ly.rem_euclid(period), seed);

    let n0 = lattice(x0, y0).lerp(lattice(x0 + 1, y0), sx);
    let n1 = lattice(x0, y0 + 1).lerp(lattice(x0 + 1, y0 + 1), sx);
    n0.lerp(n1, sy)
}

/// RGBA8 pixels: red and green hold independent noise used as the wind
/// direction, blue is unused and alpha is opaque.
pub fn generate_wind_noise(size: u32, cell: u32) -> Vec<u8> {
    let cell = cell.clamp(1, size.max(1));
    let period = (size / cell).max(1) as i32;
    let mut data = Vec::with_capacity((size * size * 4) as usize);

    for y in 0..size {
        for x in 0..size {
            let (fx, fy) = (x as f32, y as f32);
            let r = tileable_value_noise(fx, fy, cell as f32, period, 0);
            let g = tileable_value_noise(fx, fy, cell as f32, period, 1);
            data.extend_from_slice(&[(r * 255.0) as u8, (g * 255.0) as u8, 0, 255]);
        }
    }
    data
}
