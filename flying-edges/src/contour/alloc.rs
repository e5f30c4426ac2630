//! Pass 3: output layout and allocation
//!
//! Row summaries from every contour value are laid out back-to-back, value
//! by value and row by row.  Each row owns a contiguous block of point ids
//! (x-edge points, then y-edge points, then z-edge points) and a contiguous
//! block of triangles, so the output arrays can be split into disjoint
//! per-row slices and filled in parallel.
use super::analyze::RowSummary;
use crate::{Error, config::Settings, mesh::Mesh, volume::PointData};
use nalgebra::Vector3;

/// First point id for each edge direction owned by a row
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RowOffsets {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

/// Prefix sums over a list of row summaries
#[derive(Debug)]
pub struct Layout {
    pub offsets: Vec<RowOffsets>,
    /// Total number of output points
    pub points: usize,
    /// Total number of output triangles
    pub triangles: usize,
}

impl Layout {
    pub fn build(summaries: &[RowSummary]) -> Self {
        let mut points = 0;
        let mut triangles = 0;
        let offsets = summaries
            .iter()
            .map(|s| {
                let x = points;
                let y = x + s.x_points;
                let z = y + s.y_points;
                points += s.points();
                triangles += s.triangles;
                RowOffsets { x, y, z }
            })
            .collect();
        Self {
            offsets,
            points,
            triangles,
        }
    }
}

/// Allocates a vector of exactly `n` items, reporting failure as an error
fn zeroed<T: Clone>(n: usize, v: T) -> Result<Vec<T>, Error> {
    let mut out = Vec::new();
    out.try_reserve_exact(n)?;
    out.resize(n, v);
    Ok(out)
}

/// Allocates every output array at its final size
///
/// `attributes` are the source arrays to be interpolated; an output array is
/// built for each of them.
pub fn allocate(
    layout: &Layout,
    settings: &Settings,
    attributes: &[PointData],
) -> Result<Mesh, Error> {
    let n = layout.points;
    let vectors = |enabled: bool| {
        enabled.then(|| zeroed(n, Vector3::zeros())).transpose()
    };
    let attributes = attributes
        .iter()
        .map(|a| {
            let values = zeroed(n * a.components, 0.0)?;
            Ok(PointData::new(a.name.clone(), a.components, values))
        })
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(Mesh {
        triangles: zeroed(layout.triangles, Vector3::zeros())?,
        vertices: zeroed(n, Vector3::zeros())?,
        normals: vectors(settings.compute_normals)?,
        gradients: vectors(settings.compute_gradients)?,
        scalars: settings.compute_scalars.then(|| zeroed(n, 0.0)).transpose()?,
        attributes,
    })
}

/// Mutable views into the parts of a [`Mesh`] owned by a single row
///
/// Point arrays are indexed by local point slot; triangles by local triangle
/// slot.
pub struct RowOutput<'a> {
    pub vertices: &'a mut [Vector3<f32>],
    pub triangles: &'a mut [Vector3<usize>],
    pub normals: Option<&'a mut [Vector3<f32>]>,
    pub gradients: Option<&'a mut [Vector3<f32>]>,
    pub scalars: Option<&'a mut [f32]>,
    pub attributes: Vec<&'a mut [f32]>,
}

/// Splits `data` into consecutive chunks of `counts[i] * stride` items
fn split_rows<'a, T>(
    mut data: &'a mut [T],
    counts: impl Iterator<Item = usize>,
    stride: usize,
) -> std::vec::IntoIter<&'a mut [T]> {
    let out: Vec<_> = counts
        .map(|n| {
            let (head, tail) =
                std::mem::take(&mut data).split_at_mut(n * stride);
            data = tail;
            head
        })
        .collect();
    out.into_iter()
}

/// Splits every output array of `mesh` into per-row views
///
/// The mesh must have been allocated from a [`Layout`] built with the same
/// summaries.
pub fn split<'a>(
    mesh: &'a mut Mesh,
    summaries: &[RowSummary],
) -> Vec<RowOutput<'a>> {
    let points = || summaries.iter().map(|s| s.points());
    let vertices = split_rows(&mut mesh.vertices, points(), 1);
    let triangles = split_rows(
        &mut mesh.triangles,
        summaries.iter().map(|s| s.triangles),
        1,
    );
    let mut normals = mesh
        .normals
        .as_deref_mut()
        .map(|v| split_rows(v, points(), 1));
    let mut gradients = mesh
        .gradients
        .as_deref_mut()
        .map(|v| split_rows(v, points(), 1));
    let mut scalars = mesh
        .scalars
        .as_deref_mut()
        .map(|v| split_rows(v, points(), 1));
    let mut attributes: Vec<_> = mesh
        .attributes
        .iter_mut()
        .map(|a| split_rows(&mut a.values, points(), a.components))
        .collect();

    vertices
        .zip(triangles)
        .map(|(vertices, triangles)| RowOutput {
            vertices,
            triangles,
            normals: normals.as_mut().and_then(Iterator::next),
            gradients: gradients.as_mut().and_then(Iterator::next),
            scalars: scalars.as_mut().and_then(Iterator::next),
            attributes: attributes
                .iter_mut()
                .filter_map(Iterator::next)
                .collect(),
        })
        .collect()
}
