//! Asteroid belt: small tumbling solids sharing one mesh and a few shades.

use bevy::prelude::*;

use super::SceneAssets;
use crate::catalog::BeltDescriptor;
use crate::effects::CompositionError;
use crate::kinematics::{FieldOwner, SimulationState};

/// Number of material shades the belt's solids are spread across.
const SHADES: usize = 4;

/// Solid bound to a slot of the belt particle field.
#[derive(Component, Debug, Clone, Copy)]
pub struct AsteroidSlot(pub usize);

#[derive(Debug)]
pub struct BeltParts {
    pub root: Entity,
    pub count: usize,
}

fn shade(belt: &BeltDescriptor, step: usize) -> Color {
    let [r, g, b] = belt.tint.to_rgb();
    let k = 0.6 + 0.4 * step as f32 / (SHADES - 1) as f32;
    Color::srgb(r * k, g * k, b * k)
}

pub fn spawn_belt(
    commands: &mut Commands,
    assets: &mut SceneAssets,
    belt: &BeltDescriptor,
    state: &SimulationState,
) -> Result<BeltParts, CompositionError> {
    let root = commands
        .spawn((Transform::default(), Visibility::default(), Name::new("Asteroid belt")))
        .id();
    assets.ledger.track_root(root);

    let Some(field) = state.field(FieldOwner::Belt) else {
        return Ok(BeltParts { root, count: 0 });
    };

    let solid = Sphere::new(1.0).mesh().ico(0).map_err(|err| CompositionError::Mesh {
        body: "Asteroid belt",
        reason: err.to_string(),
    })?;
    let mesh = assets.mesh(solid);
    let shades: Vec<_> = (0..SHADES)
        .map(|step| {
            assets.material(StandardMaterial {
                base_color: shade(belt, step),
                perceptual_roughness: belt.roughness,
                metallic: belt.metalness,
                ..default()
            })
        })
        .collect();

    for (slot, particle) in field.particles().iter().enumerate() {
        commands.spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(shades[slot % SHADES].clone()),
            Transform {
                translation: particle.position,
                rotation: particle.rotation(),
                scale: Vec3::splat(particle.size),
            },
            AsteroidSlot(slot),
            ChildOf(root),
        ));
    }

    Ok(BeltParts {
        root,
        count: field.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ASTEROID_BELT;

    #[test]
    fn shades_darken_the_tint() {
        let [r, _, _] = ASTEROID_BELT.tint.to_rgb();
        let darkest = shade(&ASTEROID_BELT, 0).to_srgba();
        let brightest = shade(&ASTEROID_BELT, SHADES - 1).to_srgba();
        assert!((darkest.red - r * 0.6).abs() < 1e-5);
        assert!((brightest.red - r).abs() < 1e-5);
    }
}
