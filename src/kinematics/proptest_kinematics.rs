//! Property-based tests for orbital motion.

use proptest::prelude::*;
use std::f64::consts::TAU;

use super::{moon_offset, orbital_position};
use crate::catalog::{CelestialBodyDescriptor, MoonDescriptor, describe_bodies};

fn circular(distance: f32, speed: f32, wobble: f32) -> CelestialBodyDescriptor {
    CelestialBodyDescriptor {
        distance,
        speed,
        wobble,
        eccentricity: 0.0,
        ..describe_bodies()[0]
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Circular orbits keep their radius in the ecliptic plane and the
    /// vertical wobble never exceeds its amplitude.
    #[test]
    fn prop_circular_orbit_keeps_radius(
        distance in 1.0f32..2000.0,
        speed in 0.001f32..10.0,
        wobble in 0.0f32..25.0,
        time in 0.0f64..10_000.0,
    ) {
        let body = circular(distance, speed, wobble);
        let p = orbital_position(&body, time);
        let planar = (p.x * p.x + p.z * p.z).sqrt();
        prop_assert!((planar - distance).abs() <= distance * 1e-5 + 1e-4, "planar {} vs {}", planar, distance);
        prop_assert!(p.y.abs() <= wobble + 1e-4);
    }

    /// Position repeats after one period.
    #[test]
    fn prop_orbit_is_periodic(
        distance in 1.0f32..500.0,
        speed in 0.01f32..10.0,
        time in 0.0f64..100.0,
    ) {
        let body = circular(distance, speed, 2.0);
        let a = orbital_position(&body, time);
        let b = orbital_position(&body, time + TAU / speed as f64);
        prop_assert!(a.distance(b) <= distance * 1e-4 + 1e-3, "{} vs {}", a, b);
    }

    /// Eccentric orbits stay inside the bounding box of their ellipse.
    #[test]
    fn prop_eccentric_orbit_stays_in_ellipse(
        distance in 10.0f32..1000.0,
        eccentricity in 0.0f32..0.95,
        time in 0.0f64..1000.0,
    ) {
        let body = CelestialBodyDescriptor {
            eccentricity,
            ..circular(distance, 1.0, 0.0)
        };
        let p = orbital_position(&body, time);
        let b = distance * (1.0 - eccentricity);
        let e = (p.x / distance).powi(2) + (p.z / b).powi(2);
        prop_assert!((e - 1.0).abs() < 1e-3, "ellipse residual {}", e);
    }

    /// Moons circle their parent at their declared distance.
    #[test]
    fn prop_moon_offset_has_fixed_length(
        distance in 1.0f32..200.0,
        speed in 0.01f32..10.0,
        time in 0.0f64..1000.0,
    ) {
        let moon = MoonDescriptor { name: "test", radius: 1.0, distance, speed };
        let offset = moon_offset(&moon, time);
        prop_assert!((offset.length() - distance).abs() <= distance * 1e-5 + 1e-4);
        prop_assert_eq!(offset.y, 0.0);
    }
}
