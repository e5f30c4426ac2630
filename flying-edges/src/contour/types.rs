//! Strongly-typed cases, corners and edges
//!
//! Users are unlikely to actually use types within this module; it's public
//! so that the packed case representation can be checked against a
//! corner-by-corner reference in integration tests.

/// Classification of a single x-edge against a contour value
///
/// Bit 0 is set if the left (lower `x`) sample is above the contour value;
/// bit 1 is set if the right sample is above it.  A sample which is exactly
/// equal to the contour value counts as above.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct EdgeCase(u8);

impl EdgeCase {
    /// Both samples are below the contour value
    pub const BELOW: Self = Self(0);
    /// Only the left sample is above the contour value
    pub const LEFT_ABOVE: Self = Self(1);
    /// Only the right sample is above the contour value
    pub const RIGHT_ABOVE: Self = Self(2);
    /// Both samples are above the contour value
    pub const BOTH_ABOVE: Self = Self(3);

    /// Builds an edge case from the state of its two samples
    #[inline]
    pub fn new(left: bool, right: bool) -> Self {
        Self(left as u8 | ((right as u8) << 1))
    }

    /// Checks whether the left sample is above the contour value
    #[inline]
    pub fn left(self) -> bool {
        self.0 & 1 != 0
    }

    /// Checks whether the right sample is above the contour value
    #[inline]
    pub fn right(self) -> bool {
        self.0 & 2 != 0
    }

    /// Checks whether the contour crosses this edge
    #[inline]
    pub fn is_crossing(self) -> bool {
        self == Self::LEFT_ABOVE || self == Self::RIGHT_ABOVE
    }

    /// Returns the raw two-bit value
    pub fn index(self) -> u8 {
        self.0
    }
}

/// Voxel corner, in the `[0, 8)` range
///
/// Corners use the classic marching cubes order: the bottom face (lower `z`)
/// counter-clockwise from the voxel origin, then the top face in the same
/// order.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Corner(u8);

const CORNER_OFFSETS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

impl Corner {
    /// Builds a new corner
    ///
    /// # Panics
    /// If `i >= 8`, which is not a valid corner index
    ///
    /// ```compile_fail
    /// # use flying_edges::contour::types::Corner;
    /// const C: Corner = Corner::new(8);
    /// ```
    pub const fn new(i: u8) -> Self {
        assert!(i < 8);
        Self(i)
    }

    /// Returns the value of this corner as an index
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterates over all 8 corners
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..8).map(Corner)
    }

    /// Returns the grid offset of this corner from the voxel origin
    pub fn offset(self) -> [usize; 3] {
        CORNER_OFFSETS[self.index()]
    }
}

/// A voxel edge, numbered by the grid row that owns it
///
/// - `0..4` are x-edges on rows `(y, z)`, `(y + 1, z)`, `(y, z + 1)`,
///   `(y + 1, z + 1)`
/// - `4..8` are y-edges at `(x, z)`, `(x + 1, z)`, `(x, z + 1)`,
///   `(x + 1, z + 1)`
/// - `8..12` are z-edges at `(x, y)`, `(x + 1, y)`, `(x, y + 1)`,
///   `(x + 1, y + 1)`
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Edge(u8);

const EDGE_CORNERS: [(u8, u8); 12] = [
    (0, 1),
    (3, 2),
    (4, 5),
    (7, 6),
    (0, 3),
    (1, 2),
    (4, 7),
    (5, 6),
    (0, 4),
    (1, 5),
    (3, 7),
    (2, 6),
];

impl Edge {
    /// Builds a new edge
    ///
    /// # Panics
    /// If `i >= 12`, since that's an invalid edge
    pub const fn new(i: u8) -> Self {
        assert!(i < 12);
        Self(i)
    }

    /// Converts from an edge to an index
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterates over all 12 edges
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..12).map(Edge)
    }

    /// Returns the axis along which this edge varies (0, 1, or 2)
    pub fn axis(self) -> usize {
        self.index() / 4
    }

    /// Returns a `(start, end)` tuple for the given edge
    ///
    /// The start always has the lower coordinate along [`Self::axis`].
    pub fn corners(self) -> (Corner, Corner) {
        let (a, b) = EDGE_CORNERS[self.index()];
        (Corner(a), Corner(b))
    }
}

/// Bitmask of which corners of a voxel are above the contour value
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CellMask(u8);

impl CellMask {
    /// Builds a new mask from raw bits (bit `i` is corner `i`)
    pub fn new(i: u8) -> Self {
        Self(i)
    }

    /// Classifies eight corner samples directly against a contour value
    pub fn from_values(values: [f64; 8], iso: f64) -> Self {
        Self(
            values
                .iter()
                .enumerate()
                .filter(|(_, v)| **v >= iso)
                .fold(0, |acc, (i, _)| acc | (1 << i)),
        )
    }

    /// Returns the bitmask as an index
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Checks whether the contour passes through this voxel
    pub fn is_trivial(self) -> bool {
        self.0 == 0 || self.0 == u8::MAX
    }

    /// Checks whether the contour crosses the given edge
    pub fn crosses(self, e: Edge) -> bool {
        let (a, b) = e.corners();
        (self & a) != (self & b)
    }
}

impl std::ops::BitAnd<Corner> for CellMask {
    type Output = bool;
    fn bitand(self, c: Corner) -> bool {
        (self.0 & (1 << c.index())) != 0
    }
}

/// Packed case index built from the four x-edges bounding a voxel
///
/// Edge cases for rows `(y, z)`, `(y + 1, z)`, `(y, z + 1)`, and
/// `(y + 1, z + 1)` land in bits `0-1`, `2-3`, `4-5`, and `6-7`.  Because each
/// edge case records both of its samples, this packs the state of all eight
/// corners; it differs from a [`CellMask`] only by the order of its bits.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct VoxelCase(u8);

/// Packed bit `i` holds the state of corner `PACKED_CORNERS[i]`
const PACKED_CORNERS: [u8; 8] = [0, 1, 3, 2, 4, 5, 7, 6];

impl VoxelCase {
    /// Packs the four bounding edge cases
    #[inline]
    pub fn new(e: [EdgeCase; 4]) -> Self {
        Self(e[0].0 | (e[1].0 << 2) | (e[2].0 << 4) | (e[3].0 << 6))
    }

    /// Builds a packed case from raw bits
    pub fn from_index(i: u8) -> Self {
        Self(i)
    }

    /// Returns the packed value as an index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Unpacks into a corner mask
    pub fn mask(self) -> CellMask {
        CellMask(permute(self.0))
    }

    /// Packs a corner mask
    pub fn from_mask(m: CellMask) -> Self {
        Self(permute(m.0))
    }
}

/// Swaps bits 2-3 and 6-7, which converts in both directions between packed
/// cases and corner masks
fn permute(b: u8) -> u8 {
    PACKED_CORNERS
        .iter()
        .enumerate()
        .filter(|(i, _)| b & (1 << i) != 0)
        .fold(0, |acc, (_, c)| acc | (1 << c))
}
