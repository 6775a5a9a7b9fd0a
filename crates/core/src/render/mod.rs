use cgmath::Vector3;
use serde::Serialize;

use crate::{scene::FaceLabel, Element, Result, SceneDescriptor};

/// Rendering backend reached by the visualiser.
///
/// The core only hands over values and positions; building geometry,
/// materials and label textures is the sink's business.
pub trait SceneSink {
    /// Builds the static part of the scene. Called once before any sync.
    fn setup(&mut self, _descriptor: &SceneDescriptor) -> Result<()> {
        Ok(())
    }

    /// Edge length used for element cubes from now on.
    fn set_element_size(&mut self, size: f32);

    /// Brings the visible meshes in line with `elements`.
    fn sync_scene(&mut self, elements: &[Element]);

    /// Destroys every mesh and releases backend resources.
    fn teardown(&mut self);
}

pub type MeshId = u64;

/// Visual stand-in for one element: a cube plus a label on each z face.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementMesh {
    pub id: MeshId,
    pub value: i64,
    pub position: Vector3<f32>,
    pub size: f32,
    pub labels: [FaceLabel; 2],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SceneStats {
    pub created: u64,
    pub destroyed: u64,
}

/// In-memory scene that keeps one [`ElementMesh`] per element.
///
/// Syncing walks the new snapshot in order and reuses the next old mesh
/// with the same value, so appends, head removals and tail removals only
/// create or destroy the meshes that actually changed.
#[derive(Debug)]
pub struct SceneGraph {
    descriptor: Option<SceneDescriptor>,
    element_size: f32,
    meshes: Vec<ElementMesh>,
    next_id: MeshId,
    stats: SceneStats,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            descriptor: None,
            element_size: 1.0,
            meshes: Vec::new(),
            next_id: 0,
            stats: SceneStats::default(),
        }
    }

    pub fn descriptor(&self) -> Option<&SceneDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn meshes(&self) -> &[ElementMesh] {
        &self.meshes
    }

    pub fn stats(&self) -> SceneStats {
        self.stats
    }

    fn create(&mut self, element: &Element) -> ElementMesh {
        let id = self.next_id;
        self.next_id += 1;
        self.stats.created += 1;
        tracing::trace!(id, value = element.value, "mesh created");
        ElementMesh {
            id,
            value: element.value,
            position: element.position,
            size: self.element_size,
            labels: FaceLabel::pair(element.value, self.element_size),
        }
    }

    fn destroy(&mut self, mesh: ElementMesh) {
        self.stats.destroyed += 1;
        tracing::trace!(id = mesh.id, value = mesh.value, "mesh destroyed");
    }
}

impl SceneSink for SceneGraph {
    fn setup(&mut self, descriptor: &SceneDescriptor) -> Result<()> {
        self.descriptor = Some(descriptor.clone());
        Ok(())
    }

    fn set_element_size(&mut self, size: f32) {
        if self.element_size == size {
            return;
        }
        self.element_size = size;
        // Geometry depends on the size, so every cube is rebuilt.
        let stale = std::mem::take(&mut self.meshes);
        let elements: Vec<Element> = stale
            .iter()
            .map(|mesh| Element {
                value: mesh.value,
                position: mesh.position,
            })
            .collect();
        for mesh in stale {
            self.destroy(mesh);
        }
        for element in &elements {
            let mesh = self.create(element);
            self.meshes.push(mesh);
        }
    }

    fn sync_scene(&mut self, elements: &[Element]) {
        let mut old = std::mem::take(&mut self.meshes).into_iter();
        let mut pending: Vec<ElementMesh> = Vec::new();
        let mut synced = Vec::with_capacity(elements.len());

        for element in elements {
            // Pull old meshes forward until one with the same value turns up.
            let reused = loop {
                if let Some(index) = pending.iter().position(|m| m.value == element.value) {
                    let doomed: Vec<ElementMesh> = pending.drain(..index).collect();
                    for mesh in doomed {
                        self.destroy(mesh);
                    }
                    break Some(pending.remove(0));
                }
                match old.next() {
                    Some(mesh) => pending.push(mesh),
                    None => break None,
                }
            };

            let mesh = match reused {
                Some(mut mesh) => {
                    mesh.position = element.position;
                    mesh
                }
                None => self.create(element),
            };
            synced.push(mesh);
        }

        for mesh in pending.into_iter().chain(old) {
            self.destroy(mesh);
        }
        self.meshes = synced;
    }

    fn teardown(&mut self) {
        let meshes = std::mem::take(&mut self.meshes);
        for mesh in meshes {
            self.destroy(mesh);
        }
        self.descriptor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elements(values: &[i64]) -> Vec<Element> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| Element {
                value,
                position: Vector3::new(i as f32, 0.0, 0.0),
            })
            .collect()
    }

    fn ids(scene: &SceneGraph) -> Vec<MeshId> {
        scene.meshes().iter().map(|mesh| mesh.id).collect()
    }

    #[test]
    fn creates_one_mesh_per_element() {
        let mut scene = SceneGraph::new();
        scene.sync_scene(&elements(&[1, 2, 3]));

        assert_eq!(scene.meshes().len(), 3);
        assert_eq!(scene.stats(), SceneStats { created: 3, destroyed: 0 });
        assert!(scene.meshes().iter().all(|mesh| mesh.labels[0].text == mesh.value.to_string()));
    }

    #[test]
    fn head_removal_reuses_the_survivors() {
        let mut scene = SceneGraph::new();
        scene.sync_scene(&elements(&[1, 2, 3]));
        let before = ids(&scene);

        scene.sync_scene(&elements(&[2, 3]));

        assert_eq!(ids(&scene), before[1..].to_vec());
        assert_eq!(scene.stats(), SceneStats { created: 3, destroyed: 1 });
        assert_eq!(scene.meshes()[0].position, Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn append_and_tail_removal_touch_only_the_tail() {
        let mut scene = SceneGraph::new();
        scene.sync_scene(&elements(&[4, 4]));
        scene.sync_scene(&elements(&[4, 4, 9]));
        assert_eq!(scene.stats(), SceneStats { created: 3, destroyed: 0 });

        scene.sync_scene(&elements(&[4, 4]));
        assert_eq!(scene.stats(), SceneStats { created: 3, destroyed: 1 });
        assert_eq!(scene.meshes().len(), 2);
    }

    #[test]
    fn resizing_rebuilds_every_mesh() {
        let mut scene = SceneGraph::new();
        scene.sync_scene(&elements(&[1, 2]));
        scene.set_element_size(2.0);

        assert_eq!(scene.stats(), SceneStats { created: 4, destroyed: 2 });
        assert!(scene.meshes().iter().all(|mesh| mesh.size == 2.0));
    }

    #[test]
    fn teardown_destroys_everything() {
        let mut scene = SceneGraph::new();
        scene.setup(&SceneDescriptor::default()).unwrap();
        scene.sync_scene(&elements(&[1, 2, 3]));
        scene.teardown();

        assert!(scene.meshes().is_empty());
        assert!(scene.descriptor().is_none());
        assert_eq!(scene.stats().destroyed, 3);
    }
}
