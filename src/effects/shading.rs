//! CPU reference of the effect layer shading terms.
//!
//! `assets/shaders/effect_layer.wgsl` evaluates the same formulas on the GPU.
//! Keeping them here lets the terms be tested without a render device.

use bevy::prelude::*;

/// Slow brightness pulse applied to atmospheres.
pub fn atmosphere_pulse(time: f32) -> f32 {
    0.95 + 0.05 * (2.0 * time).sin()
}

/// Rim glow of an atmosphere shell.
///
/// `normal_dot_view` is the cosine between surface normal and view
/// direction; the glow peaks at the silhouette. Back faces of the shell
/// (negative cosine) glow like front faces.
pub fn atmosphere_intensity(normal_dot_view: f32, opacity: f32, time: f32) -> f32 {
    let rim = (0.8 - normal_dot_view.abs()).max(0.0);
    rim * rim * opacity * atmosphere_pulse(time)
}

pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Night-side weight: 0 on the lit hemisphere, `intensity` on the dark one,
/// with a soft terminator.
pub fn night_lights_weight(normal: Vec3, sun_direction: Vec3, intensity: f32) -> f32 {
    smoothstep(-0.2, 0.2, -normal.dot(sun_direction)) * intensity
}

/// Mix factor between the aurora's primary and secondary colors at
/// horizontal texture coordinate `u`.
pub fn aurora_mix(u: f32, time: f32) -> f32 {
    0.5 + 0.5 * (10.0 * u + 2.0 * time).sin()
}

/// Aurora brightness over time.
pub fn aurora_intensity(time: f32) -> f32 {
    0.5 + 0.3 * (3.0 * time).sin()
}

/// Storm swirl at `uv`; zero outside the `inner..outer` band around the
/// center.
pub fn storm_swirl(uv: Vec2, center: Vec2, inner: f32, outer: f32, time: f32) -> f32 {
    let d = uv.distance(center);
    if d <= inner || d >= outer {
        return 0.0;
    }
    0.5 + 0.5 * (50.0 * d - 2.0 * time).sin()
}

/// Corona shell flicker for a shell with signed animation `speed`.
pub fn corona_flicker(time: f32, speed: f32) -> f32 {
    0.85 + 0.15 * (time * speed * 3.0).sin()
}

/// Sun core brightness modulation from two drifting waves.
pub fn sun_surface(uv: Vec2, time: f32) -> f32 {
    let wave = (uv.x * 40.0 + time).sin() * (uv.y * 40.0 - time * 0.7).cos();
    0.85 + 0.15 * wave
}

/// Weights of the three nebula colors at `uv`; always sum to 1.
pub fn nebula_weights(uv: Vec2, time: f32) -> [f32; 3] {
    let a = 0.5 + 0.5 * (uv.x * 6.0 + time * 0.05).sin();
    let b = 0.5 + 0.5 * (uv.y * 4.0 - time * 0.03).cos();
    let w0 = a * (1.0 - b);
    let w1 = (1.0 - a) * b;
    let w2 = 1.0 - w0 - w1;
    [w0, w1, w2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn atmosphere_peaks_at_silhouette() {
        let facing = atmosphere_intensity(1.0, 0.8, 0.0);
        let edge = atmosphere_intensity(0.0, 0.8, 0.0);
        assert_eq!(facing, 0.0);
        assert_relative_eq!(edge, 0.64 * 0.8 * 0.95, epsilon = 1e-6);
    }

    #[test]
    fn atmosphere_back_faces_mirror_front_faces() {
        assert_eq!(atmosphere_intensity(-1.0, 0.8, 0.0), 0.0);
        for cos in [0.1, 0.4, 0.7] {
            assert_relative_eq!(
                atmosphere_intensity(-cos, 0.8, 1.3),
                atmosphere_intensity(cos, 0.8, 1.3),
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn pulse_stays_within_five_percent() {
        for i in 0..1000 {
            let p = atmosphere_pulse(i as f32 * 0.01);
            assert!((0.9..=1.0).contains(&p));
        }
    }

    #[test]
    fn night_lights_only_on_dark_side() {
        let sun = Vec3::X;
        assert_eq!(night_lights_weight(Vec3::X, sun, 0.5), 0.0);
        assert_relative_eq!(night_lights_weight(Vec3::NEG_X, sun, 0.5), 0.5);
        assert_relative_eq!(night_lights_weight(Vec3::Y, sun, 0.5), 0.25);
    }

    #[test]
    fn storm_is_confined_to_its_band() {
        let center = Vec2::new(0.4, 0.5);
        assert_eq!(storm_swirl(center, center, 0.02, 0.1, 0.0), 0.0);
        assert_eq!(storm_swirl(Vec2::new(0.9, 0.5), center, 0.02, 0.1, 0.0), 0.0);
        let inside = storm_swirl(Vec2::new(0.45, 0.5), center, 0.02, 0.1, 0.0);
        assert!((0.0..=1.0).contains(&inside));
    }

    #[test]
    fn nebula_weights_sum_to_one() {
        for i in 0..50 {
            let uv = Vec2::new(i as f32 / 50.0, 1.0 - i as f32 / 50.0);
            let w = nebula_weights(uv, i as f32);
            assert_relative_eq!(w.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
            assert!(w.iter().all(|x| *x >= -1e-6));
        }
    }

    #[test]
    fn aurora_mix_is_a_blend_factor() {
        for i in 0..100 {
            let m = aurora_mix(i as f32 * 0.013, i as f32 * 0.1);
            assert!((0.0..=1.0).contains(&m));
        }
    }
}
