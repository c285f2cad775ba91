//! Ownership ledger for everything the scene creates.
//!
//! Every mesh, material, image and root entity spawned for the orrery is
//! recorded here at creation time, so teardown can release all of it in
//! one pass no matter how far composition got.

use std::collections::HashSet;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::catalog::FeatureKind;
use crate::effects::EffectMaterial;

/// Handles and root entities owned by the mounted scene.
#[derive(Resource, Default, Debug)]
pub struct ResourceLedger {
    meshes: Vec<Handle<Mesh>>,
    materials: Vec<Handle<StandardMaterial>>,
    effects: Vec<Handle<EffectMaterial>>,
    images: Vec<Handle<Image>>,
    /// Top-level entities; children go with their parents.
    roots: Vec<Entity>,
    /// Effect layers already built, keyed by owning body and layer kind.
    layers: HashSet<(&'static str, FeatureKind)>,
}

/// Ledger position to roll back to if a body fails midway.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LedgerMark {
    meshes: usize,
    materials: usize,
    effects: usize,
    images: usize,
    roots: usize,
}

impl ResourceLedger {
    pub fn mark(&self) -> LedgerMark {
        LedgerMark {
            meshes: self.meshes.len(),
            materials: self.materials.len(),
            effects: self.effects.len(),
            images: self.images.len(),
            roots: self.roots.len(),
        }
    }

    pub fn track_root(&mut self, entity: Entity) {
        self.roots.push(entity);
    }

    /// Reserve a (body, layer) slot. Returns `false` if it was already built.
    pub fn claim_layer(&mut self, body: &'static str, kind: FeatureKind) -> bool {
        self.layers.insert((body, kind))
    }

    pub fn has_layer(&self, body: &'static str, kind: FeatureKind) -> bool {
        self.layers.contains(&(body, kind))
    }

    pub fn roots(&self) -> &[Entity] {
        &self.roots
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len() + self.effects.len()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Total number of tracked items of every category.
    pub fn len(&self) -> usize {
        self.meshes.len()
            + self.materials.len()
            + self.effects.len()
            + self.images.len()
            + self.roots.len()
            + self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Asset stores plus the ledger, bundled so composition code can create
/// and register resources in one call.
#[derive(SystemParam)]
pub struct SceneAssets<'w> {
    pub meshes: ResMut<'w, Assets<Mesh>>,
    pub materials: ResMut<'w, Assets<StandardMaterial>>,
    pub effects: ResMut<'w, Assets<EffectMaterial>>,
    pub images: ResMut<'w, Assets<Image>>,
    pub ledger: ResMut<'w, ResourceLedger>,
}

impl SceneAssets<'_> {
    pub fn mesh(&mut self, mesh: impl Into<Mesh>) -> Handle<Mesh> {
        let handle = self.meshes.add(mesh);
        self.ledger.meshes.push(handle.clone());
        handle
    }

    pub fn material(&mut self, material: StandardMaterial) -> Handle<StandardMaterial> {
        let handle = self.materials.add(material);
        self.ledger.materials.push(handle.clone());
        handle
    }

    pub fn effect(&mut self, material: EffectMaterial) -> Handle<EffectMaterial> {
        let handle = self.effects.add(material);
        self.ledger.effects.push(handle.clone());
        handle
    }

    pub fn image(&mut self, image: Image) -> Handle<Image> {
        let handle = self.images.add(image);
        self.ledger.images.push(handle.clone());
        handle
    }

    /// Undo everything registered since `mark` and drop `body`'s layer
    /// claims. Returns the number of items released.
    pub fn rollback(&mut self, mark: LedgerMark, body: &'static str, commands: &mut Commands) -> usize {
        let ledger = &mut *self.ledger;
        let mut released = 0;

        for root in ledger.roots.drain(mark.roots.min(ledger.roots.len())..) {
            if let Ok(mut entity) = commands.get_entity(root) {
                entity.try_despawn();
            }
            released += 1;
        }
        for handle in ledger.meshes.drain(mark.meshes.min(ledger.meshes.len())..) {
            self.meshes.remove(&handle);
            released += 1;
        }
        for handle in ledger.materials.drain(mark.materials.min(ledger.materials.len())..) {
            self.materials.remove(&handle);
            released += 1;
        }
        for handle in ledger.effects.drain(mark.effects.min(ledger.effects.len())..) {
            self.effects.remove(&handle);
            released += 1;
        }
        for handle in ledger.images.drain(mark.images.min(ledger.images.len())..) {
            self.images.remove(&handle);
            released += 1;
        }
        let claims = ledger.layers.len();
        ledger.layers.retain(|(owner, _)| *owner != body);
        released + claims - ledger.layers.len()
    }

    /// Despawn every tracked root and remove every tracked asset.
    ///
    /// Safe to call on an empty or partially filled ledger. Returns the
    /// number of items released.
    pub fn release(&mut self, commands: &mut Commands) -> usize {
        let released = self.ledger.len();
        let ledger = &mut *self.ledger;

        for root in ledger.roots.drain(..) {
            if let Ok(mut entity) = commands.get_entity(root) {
                entity.try_despawn();
            }
        }
        for handle in ledger.meshes.drain(..) {
            self.meshes.remove(&handle);
        }
        for handle in ledger.materials.drain(..) {
            self.materials.remove(&handle);
        }
        for handle in ledger.effects.drain(..) {
            self.effects.remove(&handle);
        }
        for handle in ledger.images.drain(..) {
            self.images.remove(&handle);
        }
        ledger.layers.clear();

        released
    }
}
