//! Catalog data for the sun, planets and comet.
//! Values are presentation-scaled, not physical.

use super::{BeltDescriptor, CelestialBodyDescriptor, CoronaLayer, Feature, Hex, MoonDescriptor, SunDescriptor};

/// Display name of the comet (shown in the status panel).
pub const COMET_NAME: &str = "Halley-X7";

/// Vertical oscillation amplitude shared by all planets.
pub const PLANET_WOBBLE: f32 = 2.0;

const TEXTURE_BASE: &str = "planets";

pub const SUN: SunDescriptor = SunDescriptor {
    radius: 20.0,
    rotation: 0.001,
    light_color: Hex(0xFFFFEE),
    light_intensity: 4.0e9,
    light_range: 1500.0,
    corona: &[
        CoronaLayer { radius: 25.0, opacity: 0.4, speed: 1.0 },
        CoronaLayer { radius: 30.0, opacity: 0.3, speed: -0.8 },
        CoronaLayer { radius: 40.0, opacity: 0.2, speed: 1.2 },
        CoronaLayer { radius: 55.0, opacity: 0.1, speed: -0.6 },
    ],
    flare_particles: 100,
    flare_bound: 50.0,
    flare_color: Hex(0xFFAA00),
};

pub const ASTEROID_BELT: BeltDescriptor = BeltDescriptor {
    inner: 150.0,
    outer: 180.0,
    thickness: 10.0,
    count: 2000,
    size: (0.1, 0.6),
    angular_speed: (0.001, 0.003),
    tumble: 0.005,
    tint: Hex(0xCC9966),
    roughness: 0.8,
    metalness: 0.6,
};

const JUPITER_MOONS: &[MoonDescriptor] = &[
    MoonDescriptor { name: "Io", radius: 1.8, distance: 45.0, speed: 5.0 },
    MoonDescriptor { name: "Europa", radius: 1.5, distance: 50.0, speed: 3.0 },
    MoonDescriptor { name: "Ganymede", radius: 2.6, distance: 58.0, speed: 2.0 },
    MoonDescriptor { name: "Callisto", radius: 2.4, distance: 65.0, speed: 1.5 },
];

const AURORA: Feature = Feature::Aurora {
    primary: Hex(0x00FF00),
    secondary: Hex(0x0000FF),
};

static BODIES: [CelestialBodyDescriptor; 7] = [
    CelestialBodyDescriptor {
        name: "Mercury",
        radius: 2.4,
        distance: 40.0,
        speed: 4.15,
        rotation: 0.003,
        tilt: 0.01,
        color: Hex(0x8C8680),
        emissive: Hex::BLACK,
        roughness: 0.8,
        metalness: 0.9,
        route: Some("/mercury"),
        description: Some("Real-time health vitals"),
        texture: Some("planets/mercury.jpg"),
        eccentricity: 0.0,
        wobble: PLANET_WOBBLE,
        features: &[],
    },
    CelestialBodyDescriptor {
        name: "Venus",
        radius: 6.0,
        distance: 60.0,
        speed: 1.62,
        rotation: -0.001,
        tilt: 177.4,
        color: Hex(0xFFC649),
        emissive: Hex(0x332211),
        roughness: 0.7,
        metalness: 0.3,
        route: Some("/venus"),
        description: Some("Fitness tracking"),
        texture: Some("planets/venus_atmosphere.jpg"),
        eccentricity: 0.0,
        wobble: PLANET_WOBBLE,
        features: &[Feature::Atmosphere { color: Hex(0xFFD4A3), opacity: 0.8 }],
    },
    CelestialBodyDescriptor {
        name: "Earth",
        radius: 6.3,
        distance: 85.0,
        speed: 1.0,
        rotation: 0.005,
        tilt: 23.5,
        color: Hex(0x2E5BFF),
        emissive: Hex(0x001122),
        roughness: 0.5,
        metalness: 0.2,
        route: Some("/earth"),
        description: Some("Time management"),
        texture: Some("planets/earth_atmos_2048.jpg"),
        eccentricity: 0.0,
        wobble: PLANET_WOBBLE,
        features: &[
            Feature::Atmosphere { color: Hex(0x4499FF), opacity: 0.3 },
            Feature::Clouds {
                opacity: 0.4,
                spin_ratio: 1.5,
                texture: Some("planets/earth_clouds_1024.png"),
            },
            AURORA,
            Feature::NightLights { color: Hex(0xFFE6B3), intensity: 0.5 },
        ],
    },
    CelestialBodyDescriptor {
        name: "Mars",
        radius: 3.4,
        distance: 115.0,
        speed: 0.53,
        rotation: 0.005,
        tilt: 25.2,
        color: Hex(0xCD5C5C),
        emissive: Hex(0x110000),
        roughness: 0.9,
        metalness: 0.7,
        route: Some("/mars"),
        description: Some("Goals & habits"),
        texture: Some("planets/mars_1k_color.jpg"),
        eccentricity: 0.0,
        wobble: PLANET_WOBBLE,
        features: &[Feature::Atmosphere { color: Hex(0xFF8866), opacity: 0.1 }],
    },
    CelestialBodyDescriptor {
        name: "Jupiter",
        radius: 35.0,
        distance: 200.0,
        speed: 0.084,
        rotation: 0.01,
        tilt: 3.1,
        color: Hex(0xD4A373),
        emissive: Hex(0x111100),
        roughness: 0.6,
        metalness: 0.1,
        route: Some("/jupiter"),
        description: Some("Financial system"),
        texture: Some("planets/jupiter.jpg"),
        eccentricity: 0.0,
        wobble: PLANET_WOBBLE,
        features: &[
            Feature::Atmosphere { color: Hex(0xFFDDCC), opacity: 0.2 },
            AURORA,
            Feature::Storm { center_uv: [0.4, 0.5], inner: 0.02, outer: 0.1 },
            Feature::Moons(JUPITER_MOONS),
        ],
    },
    CelestialBodyDescriptor {
        name: "Saturn",
        radius: 29.0,
        distance: 300.0,
        speed: 0.034,
        rotation: 0.009,
        tilt: 26.7,
        color: Hex(0xFAD5A5),
        emissive: Hex(0x111100),
        roughness: 0.7,
        metalness: 0.1,
        route: Some("/saturn"),
        description: Some("Long-term planning"),
        texture: Some("planets/saturn.jpg"),
        eccentricity: 0.0,
        wobble: PLANET_WOBBLE,
        features: &[
            Feature::Atmosphere { color: Hex(0xFFEEDD), opacity: 0.15 },
            AURORA,
            Feature::Rings {
                inner: 35.0,
                outer: 80.0,
                particles: 5000,
                texture: Some("planets/saturn_ring_alpha.png"),
            },
        ],
    },
    CelestialBodyDescriptor {
        name: COMET_NAME,
        radius: 1.0,
        distance: 400.0,
        speed: 2.0,
        rotation: 0.0,
        tilt: 0.0,
        color: Hex(0xCCDDFF),
        emissive: Hex(0xCCDDFF),
        roughness: 1.0,
        metalness: 0.0,
        route: None,
        description: None,
        texture: None,
        eccentricity: 0.8,
        wobble: 20.0,
        features: &[Feature::Tail { length: 50.0, particles: 1000 }],
    },
];

/// All bodies in presentation order, innermost first.
pub fn describe_bodies() -> &'static [CelestialBodyDescriptor] {
    &BODIES
}

/// Look up a body by name.
pub fn find_body(name: &str) -> Option<&'static CelestialBodyDescriptor> {
    BODIES.iter().find(|b| b.name == name)
}

/// Texture key for a body's secondary layer (clouds, rings).
pub fn layer_texture_key(body: &str, layer: &str) -> String {
    format!("{body}:{layer}")
}

/// Directory prefix used by catalog texture locations.
pub fn texture_base() -> &'static str {
    TEXTURE_BASE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FeatureKind;

    #[test]
    fn catalog_is_stable_across_calls() {
        let a = describe_bodies();
        let b = describe_bodies();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.len(), 7);
    }

    #[test]
    fn distances_strictly_increase_in_presentation_order() {
        let bodies = describe_bodies();
        for pair in bodies.windows(2) {
            assert!(
                pair[1].distance > pair[0].distance,
                "{} must orbit outside {}",
                pair[1].name,
                pair[0].name
            );
        }
    }

    #[test]
    fn radii_and_distances_are_positive() {
        for body in describe_bodies() {
            assert!(body.radius > 0.0, "{} radius", body.name);
            assert!(body.distance > 0.0, "{} distance", body.name);
            assert!(body.speed > 0.0, "{} speed", body.name);
            assert!((0.0..1.0).contains(&body.eccentricity), "{} eccentricity", body.name);
        }
    }

    #[test]
    fn routes_are_unique() {
        let mut routes: Vec<_> = describe_bodies().iter().filter_map(|b| b.route).collect();
        let total = routes.len();
        routes.sort_unstable();
        routes.dedup();
        assert_eq!(routes.len(), total);
        assert_eq!(total, 6);
    }

    #[test]
    fn only_the_comet_has_a_tail() {
        let tails: Vec<_> = describe_bodies()
            .iter()
            .filter(|b| b.has(FeatureKind::Tail))
            .map(|b| b.name)
            .collect();
        assert_eq!(tails, [COMET_NAME]);
    }

    #[test]
    fn texture_locations_share_base_directory() {
        for body in describe_bodies() {
            if let Some(path) = body.texture {
                assert!(path.starts_with(texture_base()), "{path}");
            }
        }
    }

    #[test]
    fn belt_sits_between_mars_and_jupiter() {
        let mars = find_body("Mars").unwrap();
        let jupiter = find_body("Jupiter").unwrap();
        assert!(ASTEROID_BELT.inner > mars.distance);
        assert!(ASTEROID_BELT.outer < jupiter.distance);
    }

    #[test]
    fn rings_lie_outside_the_planet() {
        let saturn = find_body("Saturn").unwrap();
        let Some(Feature::Rings { inner, outer, .. }) = saturn.feature(FeatureKind::Rings) else {
            panic!("saturn should have rings");
        };
        assert!(*inner > saturn.radius);
        assert!(outer > inner);
    }
}
