//! Fixed-capacity particle fields.
//!
//! Used for star layers, the asteroid belt, ring ice, solar flares and the
//! comet tail. A field's capacity is fixed at construction: stepping only
//! rewrites existing slots, and particles that leave their emitter's bound are
//! respawned in place.

use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::{PI, TAU};

/// Stellar temperature palette with cumulative probabilities.
///
/// Blue supergiants, blue-white, white, yellow-white, yellow, orange, red.
pub const STAR_PALETTE: [(f32, [f32; 3]); 7] = [
    (0.05, [0.7, 0.7, 1.0]),
    (0.15, [0.9, 0.9, 1.0]),
    (0.35, [1.0, 1.0, 0.95]),
    (0.65, [1.0, 1.0, 0.8]),
    (0.85, [1.0, 0.9, 0.7]),
    (0.95, [1.0, 0.8, 0.6]),
    (1.0, [1.0, 0.6, 0.6]),
];

/// Pick a star color from a uniform sample in `0.0..1.0`.
pub fn star_color(sample: f32) -> [f32; 3] {
    STAR_PALETTE
        .iter()
        .find(|(cumulative, _)| sample < *cumulative)
        .map(|(_, color)| *color)
        .unwrap_or(STAR_PALETTE[STAR_PALETTE.len() - 1].1)
}

/// One particle slot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    /// Position relative to the field's anchor.
    pub position: Vec3,
    /// Per-frame displacement for linear emitters.
    pub velocity: Vec3,
    /// Orbit phase for annulus emitters.
    pub phase: f32,
    /// Phase increment per frame for annulus emitters.
    pub angular_speed: f32,
    pub orbit_radius: f32,
    pub height: f32,
    /// Euler angles (XYZ) of the particle's solid, if any.
    pub orientation: Vec3,
    /// Euler angle increments per frame.
    pub spin: Vec3,
    pub size: f32,
    pub color: [f32; 4],
}

impl Particle {
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.orientation.x,
            self.orientation.y,
            self.orientation.z,
        )
    }
}

/// Where particles are born and when they are recycled.
#[derive(Clone, Debug, PartialEq)]
pub enum Emitter {
    /// Static spherical shell (starfield layers).
    Shell {
        distance: f32,
        size: f32,
    },
    /// Particles circling in a flat band (asteroid belt, ring ice).
    Annulus {
        inner: f32,
        outer: f32,
        /// Total vertical spread.
        thickness: f32,
        /// Range of per-frame phase increments.
        angular_speed: (f32, f32),
        /// Maximum absolute per-frame spin on each axis.
        spin: f32,
        /// Range of solid sizes.
        size: (f32, f32),
        /// Base color, darkened per particle.
        tint: [f32; 3],
    },
    /// Particles leaving a sphere surface, recycled beyond `bound`.
    Surface {
        radius: f32,
        bound: f32,
        color: [f32; 4],
    },
    /// Particles streaming from the anchor along the frame's flow direction,
    /// recycled beyond `length`.
    Trail {
        length: f32,
        /// Per-frame advection speed range along the flow.
        speed: (f32, f32),
        /// Lateral jitter relative to distance from the head.
        spread: f32,
        color: [f32; 3],
    },
}

/// A fixed-capacity set of particles and their emitter.
#[derive(Clone, Debug)]
pub struct ParticleField {
    particles: Vec<Particle>,
    emitter: Emitter,
}

impl ParticleField {
    /// Create a field of exactly `capacity` particles.
    pub fn new(emitter: Emitter, capacity: usize, rng: &mut impl Rng) -> Self {
        Self::with_flow(emitter, capacity, Vec3::X, rng)
    }

    /// Create a field whose trail particles start laid out along `flow`.
    pub fn with_flow(emitter: Emitter, capacity: usize, flow: Vec3, rng: &mut impl Rng) -> Self {
        let flow = flow.try_normalize().unwrap_or(Vec3::X);
        let mut field = Self {
            particles: vec![Particle::default(); capacity],
            emitter,
        };
        for slot in 0..capacity {
            let particle = field.seed(slot, capacity, flow, Spawn::Initial, rng);
            field.particles[slot] = particle;
        }
        field
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    pub fn positions(&self) -> Vec<[f32; 3]> {
        self.particles.iter().map(|p| p.position.to_array()).collect()
    }

    pub fn colors(&self) -> Vec<[f32; 4]> {
        self.particles.iter().map(|p| p.color).collect()
    }

    /// Whether a particle is still inside the emitter's recycling bound.
    pub fn in_bounds(&self, particle: &Particle) -> bool {
        match &self.emitter {
            Emitter::Shell { .. } | Emitter::Annulus { .. } => true,
            Emitter::Surface { bound, .. } => particle.position.length() <= *bound,
            Emitter::Trail { length, .. } => particle.position.length() <= *length,
        }
    }

    /// Advance every particle by one frame.
    ///
    /// `flow` is the unit direction trail particles are advected along
    /// (ignored by other emitters).
    pub fn step(&mut self, flow: Vec3, rng: &mut impl Rng) {
        let capacity = self.particles.len();
        for slot in 0..capacity {
            let mut particle = self.particles[slot];
            match &self.emitter {
                Emitter::Shell { .. } => continue,
                Emitter::Annulus { .. } => {
                    particle.phase += particle.angular_speed;
                    particle.position = annulus_position(particle.phase, particle.orbit_radius, particle.height);
                    particle.orientation += particle.spin;
                }
                Emitter::Surface { .. } => {
                    particle.position += particle.velocity;
                }
                Emitter::Trail {
                    spread, length, color, ..
                } => {
                    let along = particle.velocity.x;
                    let jitter = particle.velocity.y;
                    let lateral = flow.any_orthonormal_vector() * jitter * *spread;
                    particle.position += flow * along + lateral;
                    shade_trail(&mut particle, *length, *color);
                }
            }
            if !self.in_bounds(&particle) {
                particle = self.seed(slot, capacity, flow, Spawn::Recycled, rng);
            }
            self.particles[slot] = particle;
        }
    }

    /// Fresh particle for `slot`.
    fn seed(&self, slot: usize, capacity: usize, flow: Vec3, spawn: Spawn, rng: &mut impl Rng) -> Particle {
        match &self.emitter {
            Emitter::Shell { distance, size } => {
                let theta = TAU * rng.r#gen::<f32>();
                let phi = (2.0 * rng.r#gen::<f32>() - 1.0).acos();
                let r = distance * (0.8 + 0.4 * rng.r#gen::<f32>());
                let [cr, cg, cb] = star_color(rng.r#gen());
                Particle {
                    position: Vec3::new(
                        r * phi.sin() * theta.cos(),
                        r * phi.sin() * theta.sin(),
                        r * phi.cos(),
                    ),
                    size: size * (0.5 + rng.r#gen::<f32>()),
                    color: [cr, cg, cb, 1.0],
                    ..default()
                }
            }
            Emitter::Annulus {
                inner,
                outer,
                thickness,
                angular_speed,
                spin,
                size,
                tint,
            } => {
                let orbit_radius = inner + rng.r#gen::<f32>() * (outer - inner);
                let phase = rng.r#gen::<f32>() * TAU;
                let height = (rng.r#gen::<f32>() - 0.5) * thickness;
                let mut spin_sample = || (rng.r#gen::<f32>() - 0.5) * 2.0 * spin;
                let spin = Vec3::new(spin_sample(), spin_sample(), spin_sample());
                Particle {
                    position: annulus_position(phase, orbit_radius, height),
                    phase,
                    angular_speed: lerp(angular_speed.0, angular_speed.1, rng.r#gen()),
                    orbit_radius,
                    height,
                    orientation: Vec3::new(
                        rng.r#gen::<f32>() * PI,
                        rng.r#gen::<f32>() * PI,
                        rng.r#gen::<f32>() * PI,
                    ),
                    spin,
                    size: lerp(size.0, size.1, rng.r#gen()),
                    color: {
                        let shade = 0.6 + 0.4 * rng.r#gen::<f32>();
                        [tint[0] * shade, tint[1] * shade, tint[2] * shade, 1.0]
                    },
                    ..default()
                }
            }
            Emitter::Surface { radius, color, .. } => {
                let theta = rng.r#gen::<f32>() * TAU;
                let phi = rng.r#gen::<f32>() * PI;
                Particle {
                    position: Vec3::new(
                        radius * phi.sin() * theta.cos(),
                        radius * phi.sin() * theta.sin(),
                        radius * phi.cos(),
                    ),
                    velocity: Vec3::new(
                        (rng.r#gen::<f32>() - 0.5) * 0.5,
                        rng.r#gen::<f32>(),
                        (rng.r#gen::<f32>() - 0.5) * 0.5,
                    ),
                    size: 2.0,
                    color: *color,
                    ..default()
                }
            }
            Emitter::Trail {
                length,
                speed,
                color,
                ..
            } => {
                let distance = match spawn {
                    // Slots start spread along the tail so it is not empty
                    // on the first frame.
                    Spawn::Initial => slot as f32 / capacity.max(1) as f32 * length * rng.r#gen::<f32>(),
                    Spawn::Recycled => rng.r#gen::<f32>() * length * TRAIL_HEAD_FRACTION,
                };
                let mut particle = Particle {
                    position: flow * distance,
                    velocity: Vec3::new(
                        lerp(speed.0, speed.1, rng.r#gen()),
                        rng.r#gen::<f32>() - 0.5,
                        0.0,
                    ),
                    ..default()
                };
                shade_trail(&mut particle, *length, *color);
                particle
            }
        }
    }
}

/// Recycled trail particles respawn within this fraction of the length
/// from the head.
pub const TRAIL_HEAD_FRACTION: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Spawn {
    Initial,
    Recycled,
}

/// Fade a trail particle with its distance from the head.
fn shade_trail(particle: &mut Particle, length: f32, color: [f32; 3]) {
    let fade = (1.0 - particle.position.length() / length).clamp(0.0, 1.0);
    particle.size = fade * 2.0;
    particle.color = [color[0] * fade, color[1] * fade, color[2] * fade, 0.6];
}

fn annulus_position(phase: f32, radius: f32, height: f32) -> Vec3 {
    Vec3::new(phase.cos() * radius, height, phase.sin() * radius)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn flare_emitter() -> Emitter {
        Emitter::Surface {
            radius: 20.0,
            bound: 50.0,
            color: [1.0, 0.67, 0.0, 0.6],
        }
    }

    #[test]
    fn capacity_is_exact() {
        let field = ParticleField::new(flare_emitter(), 100, &mut rng());
        assert_eq!(field.len(), 100);
    }

    #[test]
    fn surface_particles_start_on_the_sphere() {
        let field = ParticleField::new(flare_emitter(), 100, &mut rng());
        for p in field.particles() {
            assert!((p.position.length() - 20.0).abs() < 1e-3);
        }
    }

    #[test]
    fn flares_recycle_and_keep_count() {
        let mut rng = rng();
        let mut field = ParticleField::new(flare_emitter(), 100, &mut rng);
        for _ in 0..2_000 {
            field.step(Vec3::ZERO, &mut rng);
            assert_eq!(field.len(), 100);
            assert!(field.particles().iter().all(|p| p.position.length() <= 50.0));
        }
    }

    #[test]
    fn annulus_particles_stay_in_band() {
        let mut rng = rng();
        let emitter = Emitter::Annulus {
            inner: 150.0,
            outer: 180.0,
            thickness: 10.0,
            angular_speed: (0.001, 0.003),
            spin: 0.005,
            size: (0.1, 0.6),
            tint: [0.8, 0.6, 0.4],
        };
        let mut field = ParticleField::new(emitter, 500, &mut rng);
        for _ in 0..500 {
            field.step(Vec3::ZERO, &mut rng);
        }
        for p in field.particles() {
            let planar = Vec2::new(p.position.x, p.position.z).length();
            assert!((150.0 - 1e-3..=180.0 + 1e-3).contains(&planar));
            assert!(p.position.y.abs() <= 5.0);
        }
    }

    #[test]
    fn trail_stays_within_length() {
        let mut rng = rng();
        let emitter = Emitter::Trail {
            length: 50.0,
            speed: (0.05, 0.3),
            spread: 0.05,
            color: [0.8, 0.87, 1.0],
        };
        let mut field = ParticleField::new(emitter, 1000, &mut rng);
        for _ in 0..1000 {
            field.step(Vec3::X, &mut rng);
        }
        assert_eq!(field.len(), 1000);
        assert!(field.particles().iter().all(|p| p.position.length() <= 50.0));
    }

    fn tail_emitter() -> Emitter {
        Emitter::Trail {
            length: 50.0,
            speed: (0.05, 0.3),
            spread: 0.05,
            color: [0.8, 0.87, 1.0],
        }
    }

    #[test]
    fn trail_starts_along_the_flow() {
        let flow = Vec3::new(0.6, 0.0, 0.8);
        let field = ParticleField::with_flow(tail_emitter(), 1000, flow, &mut rng());
        let mean = field.particles().iter().map(|p| p.position).sum::<Vec3>() / 1000.0;
        assert!(mean.dot(flow) > 0.0);
        assert!(field.particles().iter().all(|p| p.position.dot(flow) >= 0.0));
    }

    #[test]
    fn recycled_trail_particles_respawn_at_the_head() {
        let mut rng = rng();
        let mut field = ParticleField::with_flow(tail_emitter(), 200, Vec3::X, &mut rng);
        let head = 50.0 * TRAIL_HEAD_FRACTION;
        let mut recycled = 0;
        for _ in 0..400 {
            let before: Vec<f32> = field.particles().iter().map(|p| p.position.length()).collect();
            field.step(Vec3::X, &mut rng);
            for (old, p) in before.iter().zip(field.particles()) {
                if p.position.length() < *old {
                    recycled += 1;
                    assert!(p.position.length() <= head + 1e-3);
                    assert!(p.position.x >= 0.0);
                }
            }
        }
        assert!(recycled > 0);
    }

    #[test]
    fn trail_fades_away_from_the_head() {
        let field = ParticleField::with_flow(tail_emitter(), 500, Vec3::X, &mut rng());
        for p in field.particles() {
            let expected = 1.0 - p.position.length() / 50.0;
            assert!((p.size - expected * 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn shell_is_static() {
        let mut rng = rng();
        let mut field = ParticleField::new(Emitter::Shell { distance: 1000.0, size: 0.3 }, 50, &mut rng);
        let before = field.positions();
        field.step(Vec3::ZERO, &mut rng);
        assert_eq!(before, field.positions());
    }

    #[test]
    fn star_palette_covers_unit_interval() {
        assert_eq!(star_color(0.0), [0.7, 0.7, 1.0]);
        assert_eq!(star_color(0.5), [1.0, 1.0, 0.8]);
        assert_eq!(star_color(0.999), [1.0, 0.6, 0.6]);
        assert_eq!(star_color(1.0), [1.0, 0.6, 0.6]);
    }

    #[test]
    fn same_seed_same_field() {
        let a = ParticleField::new(flare_emitter(), 32, &mut rng());
        let b = ParticleField::new(flare_emitter(), 32, &mut rng());
        assert_eq!(a.positions(), b.positions());
    }
}
