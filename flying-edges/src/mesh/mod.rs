//! Indexed triangle meshes produced by contouring
//!
//! The resulting [`Mesh`] objects can be written out as STL files:
//!
//! ```
//! use flying_edges::{ContourValues, Settings, Volume, contour};
//!
//! let volume = Volume::from_fn([8, 8, 8], |i, j, k| {
//!     let p = [i, j, k].map(|v| v as f32 - 3.5);
//!     p.iter().map(|v| v * v).sum::<f32>().sqrt()
//! })?;
//! let values = ContourValues::from(2.5);
//! let mesh = contour(&volume, &values, &Settings::default())?;
//!
//! // Open a file to write, e.g.
//! // let mut f = std::fs::File::create("out.stl")?;
//! # let mut f = vec![];
//! mesh.write_stl(&mut f)?;
//! # Ok::<(), flying_edges::Error>(())
//! ```
mod output;

use crate::volume::PointData;

/// An indexed 3D mesh with optional per-point data
///
/// Every per-point array (if present) has one entry for each item in
/// [`self.vertices`](Self::vertices).
#[derive(Default, Debug)]
pub struct Mesh {
    /// Triangles, as indexes into [`self.vertices`](Self::vertices)
    pub triangles: Vec<nalgebra::Vector3<usize>>,
    /// Vertex positions
    pub vertices: Vec<nalgebra::Vector3<f32>>,
    /// Unit normals, pointing away from higher scalar values
    pub normals: Option<Vec<nalgebra::Vector3<f32>>>,
    /// Interpolated scalar gradients
    pub gradients: Option<Vec<nalgebra::Vector3<f32>>>,
    /// Contour value that generated each point
    pub scalars: Option<Vec<f32>>,
    /// Point attributes interpolated from the source volume
    pub attributes: Vec<PointData>,
}

impl Mesh {
    /// Builds a new mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether the mesh contains no points and no triangles
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.triangles.is_empty()
    }

    /// Looks up an interpolated attribute by name
    pub fn attribute(&self, name: &str) -> Option<&PointData> {
        self.attributes.iter().find(|a| a.name == name)
    }
}
