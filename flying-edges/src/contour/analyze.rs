//! Pass 2: per-row trimming and output counting
//!
//! Every grid edge is owned by the row containing its lower endpoint: row
//! `(y, z)` owns its own x-edges, the y-edges leading to row `(y + 1, z)`, and
//! the z-edges leading to row `(y, z + 1)`.  Each row counts only the points
//! on edges it owns, so no crossing is counted twice, and the triangles of the
//! voxel row it bounds (if any).
use super::{
    classify::{Classification, Neighbors},
    table::CaseTable,
    types::{EdgeCase, VoxelCase},
};

/// Output counts and trimmed walk range for one grid row
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RowSummary {
    /// Start of the trimmed range along x
    pub xl: usize,
    /// End of the trimmed range (exclusive)
    ///
    /// When this is `nx - 1`, edges at the last sample (`x = nx - 1`) are
    /// included as well.
    pub xr: usize,
    /// Crossed x-edges owned by this row
    pub x_points: usize,
    /// Crossed y-edges owned by this row
    pub y_points: usize,
    /// Crossed z-edges owned by this row
    pub z_points: usize,
    /// Triangles generated by the voxel row starting at this row
    pub triangles: usize,
}

impl RowSummary {
    /// Total number of points owned by this row
    pub fn points(&self) -> usize {
        self.x_points + self.y_points + self.z_points
    }

    /// Checks whether this row produces no output at all
    pub fn is_empty(&self) -> bool {
        self.points() == 0 && self.triangles == 0
    }
}

/// Checks whether the contour crosses the edge between two rows at `x`
#[inline]
pub(crate) fn crosses_left(a: EdgeCase, b: EdgeCase) -> bool {
    a.left() != b.left()
}

/// Checks whether the contour crosses the edge between two rows at `x + 1`
#[inline]
pub(crate) fn crosses_right(a: EdgeCase, b: EdgeCase) -> bool {
    a.right() != b.right()
}

/// Computes the half-open range `[xl, xr)` which must be walked
///
/// Returns `None` if the rows are uniformly on one side of the contour.
///
/// Left of the smallest first crossing (and right of the largest last
/// crossing), every row is uniform, so edges between rows can only cross
/// there if the rows disagree at the trim position; in that case the range is
/// widened to the volume boundary.
pub(crate) fn trim(n: &Neighbors, nx: usize) -> Option<(usize, usize)> {
    let own = n.own();
    if n.present().all(|r| r.meta.crossings == 0) {
        let state = own.edges[0].left();
        return if n.present().all(|r| r.edges[0].left() == state) {
            None
        } else {
            Some((0, nx - 1))
        };
    }

    let uniform_at = |x: usize| {
        let state = own.edges[x].left();
        n.present().all(|r| r.edges[x].left() == state)
    };
    let mut xl = n.present().map(|r| r.meta.xl).min().unwrap_or(0);
    let mut xr = n.present().map(|r| r.meta.xr).max().unwrap_or(nx - 1);
    if xl > 0 && !uniform_at(xl) {
        xl = 0;
    }
    if xr < nx - 1 && !uniform_at(xr) {
        xr = nx - 1;
    }
    Some((xl, xr))
}

/// Analyzes a single grid row
pub fn analyze_row(
    class: &Classification,
    table: &CaseTable,
    row: usize,
) -> RowSummary {
    let n = class.neighbors(row);
    let own = n.own();
    let nx = own.edges.len() + 1;
    let Some((xl, xr)) = trim(&n, nx) else {
        return RowSummary::default();
    };

    let mut out = RowSummary {
        xl,
        xr,
        x_points: own.meta.crossings,
        ..Default::default()
    };
    for i in xl..xr {
        let e = n.at(i);
        let here = own.edges[i];
        let last = i + 2 == nx;
        if let Some(up) = e[1] {
            out.y_points += crosses_left(here, up) as usize;
            if last {
                out.y_points += crosses_right(here, up) as usize;
            }
        }
        if let Some(back) = e[2] {
            out.z_points += crosses_left(here, back) as usize;
            if last {
                out.z_points += crosses_right(here, back) as usize;
            }
        }
        if let [Some(e0), Some(e1), Some(e2), Some(e3)] = e {
            let case = VoxelCase::new([e0, e1, e2, e3]);
            out.triangles += table.triangle_count(case);
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        contour::{table::CASE_TABLE, types::CellMask},
        volume::Field,
    };
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn analyze(data: &[f32], dims: [usize; 3], iso: f64) -> Vec<RowSummary> {
        let field = Field::new(data, dims, 1, 0);
        let c = Classification::build(&field, iso, None);
        (0..dims[1] * dims[2])
            .map(|r| analyze_row(&c, &CASE_TABLE, r))
            .collect()
    }

    fn corner_mask(
        data: &[f32],
        dims: [usize; 3],
        (i, j, k): (usize, usize, usize),
        iso: f64,
    ) -> CellMask {
        let field = Field::new(data, dims, 1, 0);
        let mut v = [0.0; 8];
        for c in crate::contour::types::Corner::iter() {
            let [a, b, d] = c.offset();
            v[c.index()] = field.get(i + a, j + b, k + d);
        }
        CellMask::from_values(v, iso)
    }

    /// Fills a volume with random values in a narrow band, so that there are
    /// plenty of crossings, ties, and long uniform stretches
    fn random_volume(rng: &mut StdRng, dims: [usize; 3]) -> Vec<f32> {
        let n = dims.iter().product();
        let mut out = Vec::with_capacity(n);
        let mut v = 0.0;
        for _ in 0..n {
            if rng.gen_bool(0.3) {
                v = rng.gen_range(0..4) as f32;
            }
            out.push(v);
        }
        out
    }

    #[test]
    fn single_corner_above() {
        let mut data = [0.0f32; 8];
        data[0] = 1.0;
        let s = analyze(&data, [2, 2, 2], 0.5);
        assert_eq!(s[0].points(), 3);
        assert_eq!((s[0].x_points, s[0].y_points, s[0].z_points), (1, 1, 1));
        assert_eq!(s[0].triangles, 1);
        assert!(s[1..].iter().all(|s| s.is_empty()));
    }

    #[test]
    fn uniform_volumes_are_skipped() {
        for v in [0.0, 2.0] {
            let data = [v; 4 * 3 * 3];
            let s = analyze(&data, [4, 3, 3], 1.0);
            assert!(s.iter().all(|s| *s == RowSummary::default()));
        }
    }

    #[test]
    fn rows_without_x_crossings() {
        // A flat surface between z = 0 and z = 1 crosses no x-edges at all
        let dims = [5, 2, 2];
        let data: Vec<f32> = (0..20).map(|i| (i >= 10) as u8 as f32).collect();
        let s = analyze(&data, dims, 0.5);
        assert_eq!((s[0].xl, s[0].xr), (0, 4));
        assert_eq!(s[0].z_points, 5);
        assert_eq!(s[0].triangles, 8);
        assert_eq!(s[1].z_points, 5);
        assert_eq!(s[1].triangles, 0);
        assert!(s[2].is_empty() && s[3].is_empty());
    }

    #[test]
    fn trim_is_conservative() {
        let mut rng = StdRng::seed_from_u64(123);
        for _ in 0..20 {
            let dims = [
                rng.gen_range(2..12),
                rng.gen_range(2..6),
                rng.gen_range(2..6),
            ];
            let data = random_volume(&mut rng, dims);
            let iso = rng.gen_range(0..4) as f64;
            let s = analyze(&data, dims, iso);
            for k in 0..dims[2] - 1 {
                for j in 0..dims[1] - 1 {
                    let r = s[j + dims[1] * k];
                    for i in 0..dims[0] - 1 {
                        let m = corner_mask(&data, dims, (i, j, k), iso);
                        if !m.is_trivial() {
                            assert!(
                                (r.xl..r.xr).contains(&i),
                                "voxel {i} outside [{}, {})",
                                r.xl,
                                r.xr
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn packed_case_matches_corners() {
        let mut rng = StdRng::seed_from_u64(789);
        for _ in 0..20 {
            let dims = [
                rng.gen_range(2..8),
                rng.gen_range(2..5),
                rng.gen_range(2..5),
            ];
            let data = random_volume(&mut rng, dims);
            let iso = rng.gen_range(0..4) as f64;
            let field = Field::new(&data, dims, 1, 0);
            let c = Classification::build(&field, iso, None);
            for k in 0..dims[2] - 1 {
                for j in 0..dims[1] - 1 {
                    let n = c.neighbors(j + dims[1] * k);
                    for i in 0..dims[0] - 1 {
                        let [Some(e0), Some(e1), Some(e2), Some(e3)] = n.at(i)
                        else {
                            panic!("missing neighbor row");
                        };
                        let case = VoxelCase::new([e0, e1, e2, e3]);
                        let m = corner_mask(&data, dims, (i, j, k), iso);
                        assert_eq!(case, VoxelCase::from_mask(m));
                        assert_eq!(case.mask(), m);
                    }
                }
            }
        }
    }

    #[test]
    fn counts_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(456);
        for _ in 0..20 {
            let dims = [
                rng.gen_range(2..10),
                rng.gen_range(2..6),
                rng.gen_range(2..6),
            ];
            let data = random_volume(&mut rng, dims);
            let iso = rng.gen_range(0..8) as f64 * 0.5;
            let s = analyze(&data, dims, iso);
            let field = Field::new(&data, dims, 1, 0);
            let above = |i, j, k| field.get(i, j, k) >= iso;

            // Count every crossed edge in the grid, by axis
            let [nx, ny, nz] = dims;
            let mut edges = [0; 3];
            for k in 0..nz {
                for j in 0..ny {
                    for i in 0..nx {
                        let a = above(i, j, k);
                        let next =
                            [(i + 1, j, k), (i, j + 1, k), (i, j, k + 1)];
                        for (n, (x, y, z)) in next.into_iter().enumerate() {
                            if x < nx && y < ny && z < nz {
                                edges[n] += (a != above(x, y, z)) as usize;
                            }
                        }
                    }
                }
            }
            assert_eq!(edges[0], s.iter().map(|s| s.x_points).sum());
            assert_eq!(edges[1], s.iter().map(|s| s.y_points).sum());
            assert_eq!(edges[2], s.iter().map(|s| s.z_points).sum());

            let mut tris = 0;
            for k in 0..nz - 1 {
                for j in 0..ny - 1 {
                    for i in 0..nx - 1 {
                        let m = corner_mask(&data, dims, (i, j, k), iso);
                        let case = VoxelCase::from_mask(m);
                        tris += CASE_TABLE.triangle_count(case);
                    }
                }
            }
            assert_eq!(tris, s.iter().map(|s| s.triangles).sum());
        }
    }
}
