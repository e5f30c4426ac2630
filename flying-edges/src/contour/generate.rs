//! Pass 4: point and triangle generation
//!
//! Each row walks its trimmed range once, writing points on the edges it
//! owns and triangles for the voxel row it bounds.  Running counters track
//! how many crossings have been seen so far on each of the neighboring
//! edge sets, which turns voxel edges into global point ids without any
//! searching or locking.
use super::{
    alloc::{RowOffsets, RowOutput},
    analyze::{RowSummary, crosses_left, crosses_right},
    classify::Classification,
    table::CaseTable,
    types::VoxelCase,
};
use crate::volume::{Field, PointData, Scalar};
use nalgebra::Vector3;

/// Per-value state for generating output rows
pub struct Generator<'a, T> {
    pub field: &'a Field<'a, T>,
    pub class: &'a Classification,
    pub table: &'a CaseTable,
    pub origin: Vector3<f64>,
    pub spacing: Vector3<f64>,
    /// Source arrays, in the same order as [`RowOutput::attributes`]
    pub attributes: &'a [PointData],
}

impl<T: Scalar> Generator<'_, T> {
    /// Fills the output owned by a single row
    ///
    /// `offsets` are the row offsets for this contour value, indexed by row.
    pub fn row(
        &self,
        row: usize,
        s: &RowSummary,
        offsets: &[RowOffsets],
        out: &mut RowOutput,
    ) {
        if s.is_empty() {
            return;
        }
        let n = self.class.neighbors(row);
        let own = n.own();
        let nx = own.edges.len() + 1;
        let ny = self.field.dims()[1];
        let (j, k) = (row % ny, row / ny);
        let o = n.0.map(|r| r.map(|r| offsets[r.index]).unwrap_or_default());

        // Crossings seen so far on x-edges of each row, y-edges of rows 0
        // and 2, and z-edges of rows 0 and 1.  All of them are zero at `xl`.
        let mut cx = [0; 4];
        let mut cy = [0; 2];
        let mut cz = [0; 2];
        let mut tri = 0;
        let y_base = s.x_points;
        let z_base = s.x_points + s.y_points;

        for i in s.xl..s.xr {
            let e = n.at(i);
            let e0 = own.edges[i];
            let last = i + 2 == nx;

            if e0.is_crossing() {
                self.point([i, j, k], [i + 1, j, k], cx[0], out);
            }
            if let Some(e1) = e[1] {
                let here = crosses_left(e0, e1);
                let slot = y_base + cy[0];
                if here {
                    self.point([i, j, k], [i, j + 1, k], slot, out);
                }
                if last && crosses_right(e0, e1) {
                    let (a, b) = ([i + 1, j, k], [i + 1, j + 1, k]);
                    self.point(a, b, slot + here as usize, out);
                }
            }
            if let Some(e2) = e[2] {
                let here = crosses_left(e0, e2);
                let slot = z_base + cz[0];
                if here {
                    self.point([i, j, k], [i, j, k + 1], slot, out);
                }
                if last && crosses_right(e0, e2) {
                    let (a, b) = ([i + 1, j, k], [i + 1, j, k + 1]);
                    self.point(a, b, slot + here as usize, out);
                }
            }

            if let [Some(e0), Some(e1), Some(e2), Some(e3)] = e {
                let case = VoxelCase::new([e0, e1, e2, e3]);
                let tris = self.table.triangles(case);
                if !tris.is_empty() {
                    let cross = |a, b| crosses_left(a, b) as usize;
                    let y0 = o[0].y + cy[0];
                    let y2 = o[2].y + cy[1];
                    let z0 = o[0].z + cz[0];
                    let z1 = o[1].z + cz[1];
                    let ids = [
                        o[0].x + cx[0],
                        o[1].x + cx[1],
                        o[2].x + cx[2],
                        o[3].x + cx[3],
                        y0,
                        y0 + cross(e0, e1),
                        y2,
                        y2 + cross(e2, e3),
                        z0,
                        z0 + cross(e0, e2),
                        z1,
                        z1 + cross(e1, e3),
                    ];
                    for t in tris {
                        out.triangles[tri] =
                            Vector3::from(t.map(|edge| ids[edge.index()]));
                        tri += 1;
                    }
                }
            }

            for (c, r) in cx.iter_mut().zip(e) {
                *c += r.is_some_and(|r| r.is_crossing()) as usize;
            }
            let pair = |a: Option<_>, b: Option<_>| match (a, b) {
                (Some(a), Some(b)) => crosses_left(a, b) as usize,
                _ => 0,
            };
            cy[0] += pair(e[0], e[1]);
            cy[1] += pair(e[2], e[3]);
            cz[0] += pair(e[0], e[2]);
            cz[1] += pair(e[1], e[3]);
        }
        debug_assert_eq!(cx[0], s.x_points);
        debug_assert_eq!(tri, s.triangles);
    }

    /// Writes the point where the contour crosses the edge from grid sample
    /// `a` to grid sample `b`
    fn point(
        &self,
        a: [usize; 3],
        b: [usize; 3],
        slot: usize,
        out: &mut RowOutput,
    ) {
        let value = self.class.value();
        let sa = self.field.get(a[0], a[1], a[2]);
        let sb = self.field.get(b[0], b[1], b[2]);
        let t = (value - sa) / (sb - sa);

        let grid = |p: [usize; 3]| Vector3::from(p.map(|c| c as f64));
        let (pa, pb) = (grid(a), grid(b));
        let p = pa + (pb - pa) * t;
        out.vertices[slot] =
            (self.origin + self.spacing.component_mul(&p)).map(|c| c as f32);

        if out.normals.is_some() || out.gradients.is_some() {
            let ga = self.field.gradient(a[0], a[1], a[2], &self.spacing);
            let gb = self.field.gradient(b[0], b[1], b[2], &self.spacing);
            let g = ga + (gb - ga) * t;
            if let Some(normals) = out.normals.as_deref_mut() {
                normals[slot] = (-g)
                    .try_normalize(0.0)
                    .unwrap_or_else(Vector3::zeros)
                    .map(|c| c as f32);
            }
            if let Some(gradients) = out.gradients.as_deref_mut() {
                gradients[slot] = g.map(|c| c as f32);
            }
        }
        if let Some(scalars) = out.scalars.as_deref_mut() {
            scalars[slot] = value as f32;
        }

        let [nx, ny, _] = self.field.dims();
        let index = |p: [usize; 3]| p[0] + nx * (p[1] + ny * p[2]);
        let (ia, ib) = (index(a), index(b));
        let t = t as f32;
        for (src, dst) in self.attributes.iter().zip(out.attributes.iter_mut())
        {
            let c = src.components;
            let va = &src.values[ia * c..(ia + 1) * c];
            let vb = &src.values[ib * c..(ib + 1) * c];
            let dst = &mut dst[slot * c..(slot + 1) * c];
            for ((d, a), b) in dst.iter_mut().zip(va).zip(vb) {
                *d = a + (b - a) * t;
            }
        }
    }
}
