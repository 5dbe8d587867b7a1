use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::engine::grass::field::GrassField;
use crate::engine::grass::settings::GrassSettings;

/// `*.grass.json` file holding a [`GrassSettings`] object.
#[derive(Asset, TypePath, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrassSettingsAsset(pub GrassSettings);

/// Drives a field's settings from a settings file, re-applied on hot reload.
#[derive(Component, Debug, Clone)]
#[require(GrassField)]
pub struct GrassSettingsSource(pub Handle<GrassSettingsAsset>);

pub struct GrassSettingsPlugin;

impl Plugin for GrassSettingsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(JsonAssetPlugin::<GrassSettingsAsset>::new(&["grass.json"]))
            .add_systems(
                Update,
                apply_grass_settings.in_set(crate::engine::plugins::GrassSystems::Configure),
            );
    }
}

/// Copies loaded or modified settings onto every field using them and
/// forces a rebuild.
pub fn apply_grass_settings(
    mut events: EventReader<AssetEvent<GrassSettingsAsset>>,
    settings_assets: Res<Assets<GrassSettingsAsset>>,
    mut fields: Query<(Ref<GrassSettingsSource>, &mut GrassField)>,
) {
    let changed: HashSet<AssetId<GrassSettingsAsset>> = events
        .read()
        .filter_map(|event| match event {
            AssetEvent::Added { id } | AssetEvent::Modified { id } => Some(*id),
            _ => None,
        })
        .collect();

    for (source, mut field) in &mut fields {
        if !source.is_added() && !changed.contains(&source.0.id()) {
            continue;
        }
        let Some(asset) = settings_assets.get(&source.0) else {
            continue;
        };

        info!("Applying grass settings from {:?}", source.0.path());
        field.set_settings(asset.0.clone());
        field.force_refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::grass::settings::BladeShape;

    #[test]
    fn settings_file_is_a_plain_settings_object() {
        let asset: GrassSettingsAsset = serde_json::from_str(
            r#"{ "max_segments": 5, "blade_shape": { "kind": "cross", "cross_count": 3 } }"#,
        )
        .unwrap();
        assert_eq!(asset.0.max_segments, 5);
        assert_eq!(asset.0.blade_shape, BladeShape::Cross { cross_count: 3 });
    }

    #[test]
    fn bundled_default_file_parses() {
        let text = include_str!("../../../assets/config/default.grass.json");
        let asset: GrassSettingsAsset = serde_json::from_str(text).unwrap();
        let defaults = GrassSettings::default();
        assert_eq!(asset.0.max_segments, defaults.max_segments);
        assert_eq!(asset.0.max_flatten_calculations, defaults.max_flatten_calculations);
        assert_eq!(asset.0.blade_shape, defaults.blade_shape);
        assert!((asset.0.lod_distance - defaults.lod_distance).abs() < 1e-6);
        assert!((asset.0.wind_scale - defaults.wind_scale).abs() < 1e-6);
    }
}
