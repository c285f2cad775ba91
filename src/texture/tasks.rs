//! Off-frame texture loading.
//!
//! Fetch and decode run on the IO task pool. Finished loads are stored in the
//! session [`TextureResolver`] and then swapped into each waiting material
//! with a single handle assignment, so a body renders its base color until
//! its imagery is ready.

use std::collections::HashMap;

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::tasks::{IoTaskPool, Task, block_on, futures_lite::future};

use super::{TextureImage, TextureRequest, TextureResolver, load_texture};
use crate::scene::SceneAssets;

/// Marks an entity whose `StandardMaterial` should receive a resolved
/// texture.
#[derive(Component, Debug, Clone)]
pub struct TextureTarget {
    pub request: TextureRequest,
    /// Set once the material points at the resolved image.
    pub applied: bool,
    /// Reset the material tint to white so the image shows unmodified.
    pub clear_tint: bool,
}

impl TextureTarget {
    pub fn new(request: TextureRequest) -> Self {
        Self {
            request,
            applied: false,
            clear_tint: true,
        }
    }

    /// Keep the material's base color as a multiplier over the image.
    pub fn tinted(mut self) -> Self {
        self.clear_tint = false;
        self
    }
}

/// Loads currently running on the IO task pool.
#[derive(Resource, Default)]
pub struct PendingTextures {
    tasks: Vec<(String, Task<TextureImage>)>,
}

impl PendingTextures {
    pub fn in_flight(&self, key: &str) -> bool {
        self.tasks.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// GPU images created for the mounted scene, one per texture key.
///
/// The images themselves are owned by the scene ledger; this map only lets
/// several materials share one image.
#[derive(Resource, Default, Debug)]
pub struct SceneTextures {
    handles: HashMap<String, Handle<Image>>,
}

impl SceneTextures {
    pub fn get(&self, key: &str) -> Option<&Handle<Image>> {
        self.handles.get(key)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }
}

/// Convert a decoded image into a Bevy texture.
pub fn to_bevy_image(texture: &TextureImage) -> Image {
    Image::new(
        Extent3d {
            width: texture.width,
            height: texture.height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        texture.rgba.clone(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    )
}

/// Start a background load for every waiting target whose key is neither
/// cached nor already in flight.
pub fn request_textures(
    targets: Query<&TextureTarget>,
    resolver: Res<TextureResolver>,
    mut pending: ResMut<PendingTextures>,
) {
    let pool = IoTaskPool::get();
    for target in targets.iter().filter(|t| !t.applied) {
        let key = &target.request.key;
        if resolver.cached(key).is_some() || pending.in_flight(key) {
            continue;
        }
        let source = resolver.source();
        let request = target.request.clone();
        debug!("Fetching texture {}", request.key);
        let task = pool.spawn(async move { load_texture(source.as_ref(), &request) });
        pending.tasks.push((key.clone(), task));
    }
}

/// Move finished loads into the session cache.
pub fn poll_texture_tasks(mut pending: ResMut<PendingTextures>, mut resolver: ResMut<TextureResolver>) {
    pending.tasks.retain_mut(|(key, task)| match block_on(future::poll_once(task)) {
        Some(image) => {
            if image.is_fallback() {
                debug!("Texture {key} resolved to procedural fallback");
            } else {
                info!("Texture {key} loaded ({}x{})", image.width, image.height);
            }
            resolver.store(key, image);
            false
        }
        None => true,
    });
}

/// Point each waiting material at its resolved image.
pub fn apply_resolved_textures(
    mut targets: Query<(&mut TextureTarget, &MeshMaterial3d<StandardMaterial>)>,
    resolver: Res<TextureResolver>,
    mut scene_textures: ResMut<SceneTextures>,
    mut assets: SceneAssets,
) {
    for (mut target, material) in targets.iter_mut().filter(|(t, _)| !t.applied) {
        let Some(texture) = resolver.cached(&target.request.key) else {
            continue;
        };

        let key = target.request.key.clone();
        let handle = match scene_textures.get(&key) {
            Some(handle) => handle.clone(),
            None => {
                let handle = assets.image(to_bevy_image(&texture));
                scene_textures.handles.insert(key, handle.clone());
                handle
            }
        };

        if let Some(mut standard) = assets.materials.get_mut(&material.0) {
            standard.base_color_texture = Some(handle);
            if target.clear_tint {
                standard.base_color = Color::WHITE.with_alpha(standard.base_color.alpha());
            }
        }
        target.applied = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::recipes;

    #[test]
    fn bevy_image_matches_source_dimensions() {
        let texture = recipes::synthesize("Saturn:rings");
        let image = to_bevy_image(&texture);
        assert_eq!(image.width(), texture.width);
        assert_eq!(image.height(), texture.height);
        assert_eq!(image.texture_descriptor.format, TextureFormat::Rgba8UnormSrgb);
    }

    #[test]
    fn targets_start_unapplied_and_untinted() {
        let target = TextureTarget::new(TextureRequest::new("Earth", Some("planets/earth.jpg")));
        assert!(!target.applied);
        assert!(target.clear_tint);
        assert!(!target.tinted().clear_tint);
    }
}
