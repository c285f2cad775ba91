//! Kinematics engine: orbital motion, spin and particle recycling.
//!
//! All positions derive from the fixed-step [`SimulationClock`], never from
//! wall-clock deltas, so a given frame count always yields the same scene.
//! Spin and particles advance once per frame.

#[cfg(test)]
mod proptest_kinematics;

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::catalog::{ASTEROID_BELT, BeltDescriptor, CelestialBodyDescriptor, MoonDescriptor, SUN, SunDescriptor};
use crate::effects::LayerSpec;
use crate::particles::{Emitter, ParticleField};
use crate::types::SimulationClock;

/// Self-rotation of every moon per frame, in radians.
pub const MOON_SPIN: f32 = 0.01;

/// Orbit angle of `body` at clock time `time`.
pub fn orbit_angle(speed: f32, time: f64) -> f64 {
    time * speed as f64
}

/// Position of `body` relative to the sun at clock time `time`.
///
/// Circular bodies keep `sqrt(x² + z²) == distance`; eccentric ones trace
/// an ellipse with semi-minor axis `distance * (1 - eccentricity)`. The
/// vertical offset is decorative and bounded by `wobble`.
pub fn orbital_position(body: &CelestialBodyDescriptor, time: f64) -> Vec3 {
    let angle = orbit_angle(body.speed, time);
    let a = body.distance as f64;
    let b = a * (1.0 - body.eccentricity as f64);
    Vec3::new(
        (angle.cos() * a) as f32,
        ((2.0 * angle).sin() * body.wobble as f64) as f32,
        (angle.sin() * b) as f32,
    )
}

/// Offset of a moon from its parent at clock time `time`.
pub fn moon_offset(moon: &MoonDescriptor, time: f64) -> Vec3 {
    let angle = orbit_angle(moon.speed, time);
    Vec3::new(
        (angle.cos() * moon.distance as f64) as f32,
        0.0,
        (angle.sin() * moon.distance as f64) as f32,
    )
}

/// Per-frame state of one catalog body.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyState {
    /// Index into the catalog slice.
    pub index: usize,
    pub position: Vec3,
    /// Accumulated self-rotation about the tilted axis.
    pub spin: f32,
    /// Accumulated rotation of the cloud shell, if the body has one.
    pub cloud_spin: f32,
    pub cloud_ratio: Option<f32>,
    /// Built without effect layers after a composition failure.
    pub degraded: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MoonState {
    /// Catalog index of the parent body.
    pub parent: usize,
    pub descriptor: MoonDescriptor,
    pub position: Vec3,
    pub spin: f32,
}

/// Which part of the scene a particle field belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldOwner {
    Flares,
    Belt,
    /// Ring ice around the body with this catalog index.
    Rings(usize),
    /// Tail of the body with this catalog index.
    Tail(usize),
}

#[derive(Clone, Debug)]
pub struct FieldState {
    pub owner: FieldOwner,
    pub field: ParticleField,
}

/// Everything that changes from frame to frame.
///
/// Inserted on mount and removed on teardown; systems and tests advance it
/// explicitly through [`SimulationState::advance_frame`].
#[derive(Resource, Debug)]
pub struct SimulationState {
    pub clock: SimulationClock,
    catalog: &'static [CelestialBodyDescriptor],
    pub bodies: Vec<BodyState>,
    pub moons: Vec<MoonState>,
    pub sun_spin: f32,
    pub fields: Vec<FieldState>,
    rng: StdRng,
}

impl SimulationState {
    /// Build the initial state.
    ///
    /// `plans[i]` holds the layers composed for `catalog[i]`, or `None` if
    /// the body was degraded. Only composed layers get moons and particle
    /// fields.
    pub fn new(catalog: &'static [CelestialBodyDescriptor], plans: &[Option<Vec<LayerSpec>>], step: f64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let clock = SimulationClock::new(step);
        let mut bodies = Vec::with_capacity(catalog.len());
        let mut moons = Vec::new();
        let mut fields = vec![
            FieldState {
                owner: FieldOwner::Flares,
                field: flare_field(&SUN, &mut rng),
            },
            FieldState {
                owner: FieldOwner::Belt,
                field: belt_field(&ASTEROID_BELT, &mut rng),
            },
        ];

        for (index, body) in catalog.iter().enumerate() {
            let plan = plans.get(index).and_then(Option::as_ref);
            let position = orbital_position(body, clock.elapsed);
            let mut cloud_ratio = None;

            for layer in plan.into_iter().flatten() {
                match layer {
                    LayerSpec::Clouds { spin_ratio, .. } => cloud_ratio = Some(*spin_ratio),
                    LayerSpec::Moons(list) => moons.extend(list.iter().map(|moon| MoonState {
                        parent: index,
                        descriptor: *moon,
                        position: position + moon_offset(moon, clock.elapsed),
                        spin: 0.0,
                    })),
                    LayerSpec::Rings {
                        inner,
                        outer,
                        particles,
                        ..
                    } => fields.push(FieldState {
                        owner: FieldOwner::Rings(index),
                        field: ring_field(*inner, *outer, *particles, &mut rng),
                    }),
                    LayerSpec::Tail { length, particles } => fields.push(FieldState {
                        owner: FieldOwner::Tail(index),
                        field: tail_field(*length, *particles, body, position, &mut rng),
                    }),
                    _ => {}
                }
            }

            bodies.push(BodyState {
                index,
                position,
                spin: 0.0,
                cloud_spin: 0.0,
                cloud_ratio,
                degraded: plan.is_none(),
            });
        }

        Self {
            clock,
            catalog,
            bodies,
            moons,
            sun_spin: 0.0,
            fields,
            rng,
        }
    }

    pub fn catalog(&self) -> &'static [CelestialBodyDescriptor] {
        self.catalog
    }

    pub fn descriptor(&self, index: usize) -> Option<&'static CelestialBodyDescriptor> {
        self.catalog.get(index)
    }

    pub fn body(&self, index: usize) -> Option<&BodyState> {
        self.bodies.get(index)
    }

    pub fn field(&self, owner: FieldOwner) -> Option<&ParticleField> {
        self.fields.iter().find(|f| f.owner == owner).map(|f| &f.field)
    }

    /// Unit direction from a body toward the sun.
    pub fn sun_direction(&self, index: usize) -> Vec3 {
        self.body(index)
            .map(|b| (-b.position).normalize_or_zero())
            .unwrap_or(Vec3::ZERO)
    }

    /// Advance the clock by one frame and move everything with it.
    pub fn advance_frame(&mut self) {
        self.clock.tick();
        self.step_kinematics();
    }

    /// Move bodies, moons and particles to the current clock time.
    ///
    /// Spin and particle motion are per-call increments, so this must run
    /// exactly once per clock tick.
    pub fn step_kinematics(&mut self) {
        let time = self.clock.elapsed;

        for state in &mut self.bodies {
            let body = &self.catalog[state.index];
            state.position = orbital_position(body, time);
            state.spin += body.rotation;
            if let Some(ratio) = state.cloud_ratio {
                state.cloud_spin += body.rotation * ratio;
            }
        }

        for moon in &mut self.moons {
            let parent = self.bodies[moon.parent].position;
            moon.position = parent + moon_offset(&moon.descriptor, time);
            moon.spin += MOON_SPIN;
        }

        self.sun_spin += SUN.rotation;

        for state in &mut self.fields {
            let flow = match state.owner {
                FieldOwner::Tail(index) => self.bodies[index].position.try_normalize().unwrap_or(Vec3::X),
                _ => Vec3::ZERO,
            };
            state.field.step(flow, &mut self.rng);
        }
    }

    /// Strip a body back to its minimal form: no moons, clouds or fields.
    pub fn degrade(&mut self, index: usize) {
        let Some(body) = self.bodies.get_mut(index) else {
            return;
        };
        body.degraded = true;
        body.cloud_ratio = None;
        body.cloud_spin = 0.0;
        self.moons.retain(|moon| moon.parent != index);
        self.fields
            .retain(|f| !matches!(f.owner, FieldOwner::Rings(i) | FieldOwner::Tail(i) if i == index));
    }

    pub fn advance_frames(&mut self, frames: u64) {
        for _ in 0..frames {
            self.advance_frame();
        }
    }
}

/// Clock stage: advance the clock by one fixed step.
pub fn tick_clock(mut state: ResMut<SimulationState>) {
    state.clock.tick();
}

/// Kinematics stage.
pub fn advance_kinematics(mut state: ResMut<SimulationState>) {
    state.step_kinematics();
}

fn flare_field(sun: &SunDescriptor, rng: &mut StdRng) -> ParticleField {
    let [r, g, b] = sun.flare_color.to_rgb();
    ParticleField::new(
        Emitter::Surface {
            radius: sun.radius,
            bound: sun.flare_bound,
            color: [r, g, b, 0.6],
        },
        sun.flare_particles,
        rng,
    )
}

fn belt_field(belt: &BeltDescriptor, rng: &mut StdRng) -> ParticleField {
    ParticleField::new(
        Emitter::Annulus {
            inner: belt.inner,
            outer: belt.outer,
            thickness: belt.thickness,
            angular_speed: belt.angular_speed,
            spin: belt.tumble,
            size: belt.size,
            tint: belt.tint.to_rgb(),
        },
        belt.count,
        rng,
    )
}

fn ring_field(inner: f32, outer: f32, particles: usize, rng: &mut StdRng) -> ParticleField {
    ParticleField::new(
        Emitter::Annulus {
            inner,
            outer,
            thickness: 0.5,
            angular_speed: (0.002, 0.004),
            spin: 0.0,
            size: (0.05, 0.2),
            tint: [0.95, 0.93, 0.88],
        },
        particles,
        rng,
    )
}

/// Tail streaming away from the sun as seen from `head`.
fn tail_field(
    length: f32,
    particles: usize,
    body: &CelestialBodyDescriptor,
    head: Vec3,
    rng: &mut StdRng,
) -> ParticleField {
    ParticleField::with_flow(
        Emitter::Trail {
            length,
            speed: (0.05, 0.3),
            spread: 0.05,
            color: body.color.to_rgb(),
        },
        particles,
        head,
        rng,
    )
}
