//! Typed mesh descriptors handed out by asset providers.

use serde::{Deserialize, Serialize};

/// Surface material of a mesh.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialDesc {
    /// Human-readable name (e.g., "oak_bark").
    pub name: String,
    /// Base color in linear RGBA.
    pub base_color: [f32; 4],
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            name: String::from("default"),
            base_color: [0.8, 0.8, 0.8, 1.0],
        }
    }
}

/// A loaded mesh: geometry summary plus material, returned directly by the
/// provider so callers never inspect a generic scene graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshHandle {
    /// Asset id the mesh was requested by.
    pub id: String,
    /// Number of vertices.
    pub vertex_count: u32,
    /// Number of indices.
    pub index_count: u32,
    /// Radius of the bounding sphere around the mesh origin.
    pub bounding_radius: f32,
    /// Surface material.
    #[serde(default)]
    pub material: MaterialDesc,
}

impl MeshHandle {
    /// A unit-sized stand-in mesh for an id: a single quad with the default
    /// material.
    pub fn placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            vertex_count: 4,
            index_count: 6,
            bounding_radius: 1.0,
            material: MaterialDesc {
                name: id.to_string(),
                ..Default::default()
            },
        }
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> u32 {
        self.index_count / 3
    }
}
