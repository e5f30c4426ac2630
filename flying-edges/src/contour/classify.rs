//! Pass 1: x-edge classification
use super::types::EdgeCase;
use crate::{
    config::ThreadPool,
    volume::{Field, Scalar},
};
use rayon::prelude::*;

/// Crossing statistics for a single row of x-edges
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EdgeRow {
    /// Number of crossed x-edges
    pub crossings: usize,
    /// Index of the first crossed edge, or `nx - 1` if none are crossed
    pub xl: usize,
    /// One past the last crossed edge, or `0` if none are crossed
    pub xr: usize,
}

impl EdgeRow {
    fn empty(edge_count: usize) -> Self {
        Self {
            crossings: 0,
            xl: edge_count,
            xr: 0,
        }
    }
}

/// Classified x-edges of the whole volume for one contour value
pub struct Classification {
    value: f64,
    dims: [usize; 3],
    /// Edge cases, `nx - 1` per row, rows ordered by `y + ny * z`
    cases: Vec<EdgeCase>,
    rows: Vec<EdgeRow>,
}

impl Classification {
    /// Classifies every x-edge in the field against `value`
    pub fn build<T: Scalar>(
        field: &Field<T>,
        value: f64,
        threads: Option<&ThreadPool>,
    ) -> Self {
        let dims = field.dims();
        let n = dims[0] - 1;
        let mut cases = vec![EdgeCase::BELOW; n * dims[1] * dims[2]];
        let f = |(row, out): (usize, &mut [EdgeCase])| {
            classify_row(field, value, row, out)
        };
        let rows: Vec<EdgeRow> = match threads {
            None => cases.chunks_mut(n).enumerate().map(f).collect(),
            Some(pool) => pool.run(|| {
                cases.par_chunks_mut(n).enumerate().map(f).collect()
            }),
        };
        Self {
            value,
            dims,
            cases,
            rows,
        }
    }

    /// Returns the contour value used for classification
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Returns the edge cases of the given row
    pub fn edges(&self, row: usize) -> &[EdgeCase] {
        let n = self.dims[0] - 1;
        &self.cases[row * n..(row + 1) * n]
    }

    /// Returns the total number of crossed x-edges
    pub fn crossings(&self) -> usize {
        self.rows.iter().map(|r| r.crossings).sum()
    }

    /// Collects the rows whose edges bound the edges owned by `row`
    pub(crate) fn neighbors(&self, row: usize) -> Neighbors<'_> {
        let [_, ny, nz] = self.dims;
        let (j, k) = (row % ny, row / ny);
        let has_y = j + 1 < ny;
        let has_z = k + 1 < nz;
        let ids = [
            Some(row),
            has_y.then_some(row + 1),
            has_z.then_some(row + ny),
            (has_y && has_z).then_some(row + ny + 1),
        ];
        Neighbors(ids.map(|r| {
            r.map(|index| NeighborRow {
                index,
                edges: self.edges(index),
                meta: self.rows[index],
            })
        }))
    }
}

/// One of the rows in a [`Neighbors`] group
#[derive(Copy, Clone)]
pub(crate) struct NeighborRow<'a> {
    pub index: usize,
    pub edges: &'a [EdgeCase],
    pub meta: EdgeRow,
}

/// Rows `(y, z)`, `(y + 1, z)`, `(y, z + 1)`, and `(y + 1, z + 1)`
///
/// Rows past the far side of the volume are `None`.  If all four are
/// present, the group bounds a row of voxels.
pub(crate) struct Neighbors<'a>(pub [Option<NeighborRow<'a>>; 4]);

impl<'a> Neighbors<'a> {
    /// Returns the row that owns this group
    pub fn own(&self) -> NeighborRow<'a> {
        // The first row is always present by construction
        self.0[0].unwrap_or_else(|| unreachable!("missing own row"))
    }

    /// Iterates over rows which are present
    pub fn present(&self) -> impl Iterator<Item = &NeighborRow<'a>> + Clone {
        self.0.iter().flatten()
    }

    /// Returns the edge case at position `i` in every row
    #[inline]
    pub fn at(&self, i: usize) -> [Option<EdgeCase>; 4] {
        self.0.map(|r| r.map(|r| r.edges[i]))
    }
}

fn classify_row<T: Scalar>(
    field: &Field<T>,
    value: f64,
    row: usize,
    out: &mut [EdgeCase],
) -> EdgeRow {
    let mut meta = EdgeRow::empty(out.len());
    let mut left = field.row_sample(row, 0) >= value;
    for (i, e) in out.iter_mut().enumerate() {
        let right = field.row_sample(row, i + 1) >= value;
        *e = EdgeCase::new(left, right);
        if left != right {
            if meta.crossings == 0 {
                meta.xl = i;
            }
            meta.crossings += 1;
            meta.xr = i + 1;
        }
        left = right;
    }
    meta
}
