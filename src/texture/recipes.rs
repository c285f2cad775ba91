//! Procedural fallback textures.
//!
//! Each texture key maps to a small recipe: latitude gradient stops, a band
//! pattern, speckle density and an optional noise-driven alpha channel. Output
//! depends only on the recipe, so the same key always yields the same pixels.

use crate::catalog::Hex;

use super::{TextureImage, TextureOrigin};

/// Fallback image width in pixels (equirectangular, 2:1).
pub const FALLBACK_WIDTH: u32 = 256;
/// Fallback image height in pixels.
pub const FALLBACK_HEIGHT: u32 = 128;

/// How the alpha channel of a fallback image is produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AlphaProfile {
    Opaque,
    /// Value noise thresholded into soft patches (cloud cover).
    Patchy { coverage: f32 },
    /// Alpha follows the band pattern along u (ring gaps).
    Banded,
}

/// Recipe for one fallback texture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FallbackRecipe {
    /// Gradient stops along latitude (`v`), positions ascending in `0..=1`.
    pub stops: &'static [(f32, Hex)],
    /// Number of latitude bands.
    pub bands: f32,
    /// Band contrast, 0 disables banding.
    pub band_strength: f32,
    /// Fraction of pixels that receive a speckle.
    pub speckle: f32,
    pub alpha: AlphaProfile,
    pub seed: u32,
}

const GENERIC: FallbackRecipe = FallbackRecipe {
    stops: &[(0.0, Hex(0x555555)), (1.0, Hex(0x999999))],
    bands: 0.0,
    band_strength: 0.0,
    speckle: 0.1,
    alpha: AlphaProfile::Opaque,
    seed: 1,
};

/// Recipe table keyed by body name or `Body:layer` key.
pub fn recipe_for(key: &str) -> FallbackRecipe {
    match key {
        "Mercury" => FallbackRecipe {
            stops: &[(0.0, Hex(0x6E6A66)), (0.5, Hex(0x8C8680)), (1.0, Hex(0x5F5B57))],
            bands: 0.0,
            band_strength: 0.0,
            speckle: 0.35,
            alpha: AlphaProfile::Opaque,
            seed: 11,
        },
        "Venus" => FallbackRecipe {
            stops: &[(0.0, Hex(0xE8B04A)), (0.5, Hex(0xFFC649)), (1.0, Hex(0xD9A040))],
            bands: 9.0,
            band_strength: 0.12,
            speckle: 0.05,
            alpha: AlphaProfile::Opaque,
            seed: 23,
        },
        "Earth" => FallbackRecipe {
            stops: &[
                (0.0, Hex(0xF0F4FF)),
                (0.12, Hex(0x2E5BFF)),
                (0.45, Hex(0x2F7A3A)),
                (0.55, Hex(0x1F4FD0)),
                (0.88, Hex(0x2E5BFF)),
                (1.0, Hex(0xF0F4FF)),
            ],
            bands: 0.0,
            band_strength: 0.0,
            speckle: 0.2,
            alpha: AlphaProfile::Opaque,
            seed: 37,
        },
        "Mars" => FallbackRecipe {
            stops: &[
                (0.0, Hex(0xE8D8D0)),
                (0.1, Hex(0xB5503C)),
                (0.5, Hex(0xCD5C5C)),
                (0.9, Hex(0xA4452F)),
                (1.0, Hex(0xE8D8D0)),
            ],
            bands: 0.0,
            band_strength: 0.0,
            speckle: 0.3,
            alpha: AlphaProfile::Opaque,
            seed: 41,
        },
        "Jupiter" => FallbackRecipe {
            stops: &[(0.0, Hex(0xB08B63)), (0.5, Hex(0xD4A373)), (1.0, Hex(0xA8825C))],
            bands: 14.0,
            band_strength: 0.35,
            speckle: 0.02,
            alpha: AlphaProfile::Opaque,
            seed: 53,
        },
        "Saturn" => FallbackRecipe {
            stops: &[(0.0, Hex(0xD9BC8C)), (0.5, Hex(0xFAD5A5)), (1.0, Hex(0xCFB283))],
            bands: 10.0,
            band_strength: 0.18,
            speckle: 0.02,
            alpha: AlphaProfile::Opaque,
            seed: 59,
        },
        "Earth:clouds" => FallbackRecipe {
            stops: &[(0.0, Hex(0xFFFFFF)), (1.0, Hex(0xFFFFFF))],
            bands: 0.0,
            band_strength: 0.0,
            speckle: 0.0,
            alpha: AlphaProfile::Patchy { coverage: 0.45 },
            seed: 61,
        },
        "Saturn:rings" => FallbackRecipe {
            stops: &[(0.0, Hex(0xC9B08A)), (1.0, Hex(0xEFE0C4))],
            bands: 24.0,
            band_strength: 0.5,
            speckle: 0.0,
            alpha: AlphaProfile::Banded,
            seed: 67,
        },
        _ => GENERIC,
    }
}

/// Render the fallback image for `key`.
pub fn synthesize(key: &str) -> TextureImage {
    let recipe = recipe_for(key);
    let (w, h) = (FALLBACK_WIDTH, FALLBACK_HEIGHT);
    let mut rgba = Vec::with_capacity((w * h * 4) as usize);

    for y in 0..h {
        let v = y as f32 / (h - 1) as f32;
        let base = gradient(recipe.stops, v);
        let band = band_factor(&recipe, v);

        for x in 0..w {
            let u = x as f32 / (w - 1) as f32;
            let mut shade = band;
            if recipe.speckle > 0.0 && hash(x, y, recipe.seed) < recipe.speckle {
                shade *= 0.85 + 0.3 * hash(y, x, recipe.seed ^ 0xA5A5);
            }

            let alpha = match recipe.alpha {
                AlphaProfile::Opaque => 1.0,
                AlphaProfile::Patchy { coverage } => {
                    let n = value_noise(u * 12.0, v * 6.0, recipe.seed) * 0.65
                        + value_noise(u * 32.0, v * 16.0, recipe.seed ^ 0x55) * 0.35;
                    smoothstep(1.0 - coverage - 0.1, 1.0 - coverage + 0.1, n)
                }
                AlphaProfile::Banded => band_factor(&recipe, u).clamp(0.0, 1.0),
            };

            rgba.extend_from_slice(&[
                to_byte(base[0] * shade),
                to_byte(base[1] * shade),
                to_byte(base[2] * shade),
                to_byte(alpha),
            ]);
        }
    }

    TextureImage {
        width: w,
        height: h,
        rgba,
        origin: TextureOrigin::Fallback,
    }
}

fn band_factor(recipe: &FallbackRecipe, t: f32) -> f32 {
    if recipe.bands <= 0.0 || recipe.band_strength <= 0.0 {
        return 1.0;
    }
    1.0 - recipe.band_strength * 0.5 * (1.0 + (t * recipe.bands * std::f32::consts::PI).sin())
}

fn gradient(stops: &[(f32, Hex)], t: f32) -> [f32; 3] {
    let Some(&(first_pos, first)) = stops.first() else {
        return [0.5, 0.5, 0.5];
    };
    if t <= first_pos {
        return first.to_rgb();
    }
    for pair in stops.windows(2) {
        let (p0, c0) = pair[0];
        let (p1, c1) = pair[1];
        if t <= p1 {
            let k = if p1 > p0 { (t - p0) / (p1 - p0) } else { 0.0 };
            let (a, b) = (c0.to_rgb(), c1.to_rgb());
            return [
                a[0] + (b[0] - a[0]) * k,
                a[1] + (b[1] - a[1]) * k,
                a[2] + (b[2] - a[2]) * k,
            ];
        }
    }
    stops[stops.len() - 1].1.to_rgb()
}

/// Integer hash to `0.0..=1.0`.
fn hash(x: u32, y: u32, seed: u32) -> f32 {
    let mut h = x.wrapping_mul(0x8DA6_B343) ^ y.wrapping_mul(0xD816_3841) ^ seed.wrapping_mul(0xCB1A_B31F);
    h ^= h >> 13;
    h = h.wrapping_mul(0x5BD1_E995);
    h ^= h >> 15;
    (h & 0xFFFF) as f32 / 65535.0
}

/// Bilinear value noise on an integer lattice, wrapping horizontally.
fn value_noise(x: f32, y: f32, seed: u32) -> f32 {
    let (x0, y0) = (x.floor(), y.floor());
    let (fx, fy) = (x - x0, y - y0);
    let (ix, iy) = (x0 as u32, y0 as u32);
    let period = 64;
    let corner = |dx: u32, dy: u32| hash((ix + dx) % period, iy + dy, seed);

    let top = corner(0, 0) + (corner(1, 0) - corner(0, 0)) * fx;
    let bottom = corner(0, 1) + (corner(1, 1) - corner(0, 1)) * fx;
    top + (bottom - top) * fy
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
