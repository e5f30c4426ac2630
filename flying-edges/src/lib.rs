//! Flying edges is a fast, parallel algorithm for extracting isosurfaces from
//! dense 3D volumes.
//!
//! A **volume** is a grid of scalar samples `v(x, y, z)`, evenly spaced along
//! each axis.  An **isosurface** (or contour) is the surface where the sampled
//! function equals a particular **contour value**; samples which are greater
//! than or equal to the contour value are considered to be above the surface,
//! and every other sample is below it.
//!
//! The output is a triangle mesh with the same topology as classic marching
//! cubes: one point per crossed grid edge, shared between every triangle
//! which touches that edge.  The algorithm is described in the
//! [`contour`](mod@crate::contour) module.
//!
//! # Volumes
//! Volumes are built from a flat sample buffer, indexed as
//! `v[x + nx * (y + ny * z)]`.  Samples may be any primitive numeric type:
//! ```
//! use flying_edges::{ScalarBuffer, ScalarType, Volume};
//!
//! let v = Volume::new([2, 2, 2], vec![0u8, 1, 2, 3, 4, 5, 6, 7])?;
//! assert_eq!(v.scalars().scalar_type(), ScalarType::U8);
//!
//! // Raw little-endian data can be decoded directly
//! let bytes: Vec<u8> =
//!     (0..8).flat_map(|i| (i as f32).to_le_bytes()).collect();
//! let buf = ScalarBuffer::from_le_bytes(ScalarType::F32, &bytes)?;
//! let v = Volume::new([2, 2, 2], buf)?;
//! # Ok::<(), flying_edges::Error>(())
//! ```
//!
//! Volumes may also be built by sampling a function on the grid, then placed
//! in world space with an origin and per-axis spacing:
//! ```
//! use flying_edges::Volume;
//! use nalgebra::Vector3;
//!
//! let v = Volume::from_fn([16, 16, 16], |i, j, k| (i + j + k) as f64)?
//!     .with_origin(Vector3::new(-1.0, -1.0, -1.0))
//!     .with_spacing(Vector3::new(0.125, 0.125, 0.125))?;
//! # Ok::<(), flying_edges::Error>(())
//! ```
//!
//! # Contouring
//! [`contour`](fn@crate::contour) builds a [`Mesh`] for one or more contour
//! values.  Optional per-point data (normals, gradients, scalars, and
//! interpolated attributes) and threading are selected through [`Settings`]:
//! ```
//! use flying_edges::{ContourValues, Settings, ThreadPool, Volume, contour};
//!
//! let v = Volume::from_fn([32, 32, 32], |i, j, k| {
//!     let p = [i, j, k].map(|c| c as f64 - 15.5);
//!     (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt()
//! })?;
//!
//! // Two nested spheres
//! let values = ContourValues::from([6.0, 12.0]);
//! let settings = Settings {
//!     compute_gradients: true,
//!     threads: Some(&ThreadPool::Global),
//!     ..Default::default()
//! };
//! let mesh = contour(&v, &values, &settings)?;
//! assert!(!mesh.triangles.is_empty());
//! assert_eq!(mesh.normals.as_ref().unwrap().len(), mesh.vertices.len());
//!
//! // Open a file to write, e.g.
//! // let mut f = std::fs::File::create("out.stl")?;
//! # let mut f = vec![];
//! mesh.write_stl(&mut f)?;
//! # Ok::<(), flying_edges::Error>(())
//! ```
#![warn(missing_docs)]

mod config;
mod error;
mod values;
mod volume;

pub mod contour;
pub mod mesh;

pub use config::{CancelToken, Settings, ThreadPool};
pub use contour::contour;
pub use error::Error;
pub use mesh::Mesh;
pub use values::ContourValues;
pub use volume::{PointData, Scalar, ScalarBuffer, ScalarType, Volume};
