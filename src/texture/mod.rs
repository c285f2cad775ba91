//! Texture resolution with a session cache and procedural fallback.
//!
//! A body's texture is fetched through a [`TextureSource`] and decoded with
//! `image`. Any failure degrades to a deterministic fallback from
//! [`recipes`], so rendering never blocks on or fails because of imagery.

pub mod recipes;
mod tasks;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use bevy::prelude::*;

use crate::config::OrreryConfig;

pub use tasks::{PendingTextures, SceneTextures, TextureTarget, apply_resolved_textures, poll_texture_tasks, request_textures, to_bevy_image};

/// Errors raised while fetching or decoding a texture.
#[derive(thiserror::Error, Debug)]
pub enum TextureError {
    #[error("no texture location declared for {0}")]
    NoLocation(String),

    #[error("failed to read {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {location}: {source}")]
    Decode {
        location: String,
        #[source]
        source: image::ImageError,
    },

    #[error("texture fetching disabled")]
    Disabled,
}

/// Where a resolved image came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureOrigin {
    Decoded,
    Fallback,
}

/// Decoded RGBA8 image, independent of any GPU resource.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    pub origin: TextureOrigin,
}

impl TextureImage {
    pub fn is_fallback(&self) -> bool {
        self.origin == TextureOrigin::Fallback
    }
}

/// A texture to resolve: cache key plus optional external location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureRequest {
    /// Body name, or `Body:layer` for secondary layers.
    pub key: String,
    pub location: Option<String>,
}

impl TextureRequest {
    pub fn new(key: impl Into<String>, location: Option<&str>) -> Self {
        Self {
            key: key.into(),
            location: location.map(str::to_owned),
        }
    }
}

/// Provider of raw image bytes.
pub trait TextureSource: Send + Sync + 'static {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, TextureError>;
}

/// Reads texture files relative to a root directory.
#[derive(Clone, Debug)]
pub struct FileTextureSource {
    pub root: PathBuf,
}

impl FileTextureSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TextureSource for FileTextureSource {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, TextureError> {
        std::fs::read(self.root.join(location)).map_err(|source| TextureError::Io {
            location: location.to_owned(),
            source,
        })
    }
}

/// Source used when texture loading is switched off.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledTextureSource;

impl TextureSource for DisabledTextureSource {
    fn fetch(&self, _location: &str) -> Result<Vec<u8>, TextureError> {
        Err(TextureError::Disabled)
    }
}

/// Fetch and decode one texture.
pub fn fetch_texture(source: &dyn TextureSource, request: &TextureRequest) -> Result<TextureImage, TextureError> {
    let location = request
        .location
        .as_deref()
        .ok_or_else(|| TextureError::NoLocation(request.key.clone()))?;
    let bytes = source.fetch(location)?;
    let decoded = image::load_from_memory(&bytes).map_err(|source| TextureError::Decode {
        location: location.to_owned(),
        source,
    })?;
    let rgba = decoded.to_rgba8();
    Ok(TextureImage {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
        origin: TextureOrigin::Decoded,
    })
}

/// Fetch a texture, falling back to its procedural recipe on any failure.
///
/// Never fails; the failure is logged instead.
pub fn load_texture(source: &dyn TextureSource, request: &TextureRequest) -> TextureImage {
    match fetch_texture(source, request) {
        Ok(image) => image,
        Err(TextureError::NoLocation(_)) => recipes::synthesize(&request.key),
        Err(err) => {
            warn!("Texture for {} unavailable ({err}), using procedural fallback", request.key);
            recipes::synthesize(&request.key)
        }
    }
}

/// Session-wide texture cache.
///
/// Survives scene teardown so remounting never refetches.
#[derive(Resource)]
pub struct TextureResolver {
    source: Arc<dyn TextureSource>,
    cache: HashMap<String, Arc<TextureImage>>,
}

impl TextureResolver {
    pub fn new(source: impl TextureSource) -> Self {
        Self {
            source: Arc::new(source),
            cache: HashMap::new(),
        }
    }

    /// Shared handle to the source, for fetches running off the frame.
    pub fn source(&self) -> Arc<dyn TextureSource> {
        Arc::clone(&self.source)
    }

    pub fn cached(&self, key: &str) -> Option<Arc<TextureImage>> {
        self.cache.get(key).cloned()
    }

    /// Resolve synchronously: cached result or fetch-and-store.
    pub fn resolve(&mut self, request: &TextureRequest) -> Arc<TextureImage> {
        if let Some(image) = self.cached(&request.key) {
            return image;
        }
        let image = load_texture(self.source.as_ref(), request);
        self.store(&request.key, image)
    }

    /// Insert a finished load. The first stored image for a key wins, so
    /// concurrent loads of the same key still yield one shared result.
    pub fn store(&mut self, key: &str, image: TextureImage) -> Arc<TextureImage> {
        Arc::clone(
            self.cache
                .entry(key.to_owned())
                .or_insert_with(|| Arc::new(image)),
        )
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl FromWorld for TextureResolver {
    /// Read files under the configured texture root, or nothing at all when
    /// loading is switched off.
    fn from_world(world: &mut World) -> Self {
        let config = world.get_resource_or_init::<OrreryConfig>();
        if config.load_textures {
            Self::new(FileTextureSource::new(config.texture_root.clone()))
        } else {
            Self::new(DisabledTextureSource)
        }
    }
}
