//! Dense scalar volumes sampled on a regular grid
use crate::Error;
use nalgebra::Vector3;
use num_traits::AsPrimitive;

/// Numeric sample type which the contouring kernel can be instantiated for
///
/// This is implemented for every primitive number type; samples are widened
/// to `f64` before being compared against a contour value.
pub trait Scalar: AsPrimitive<f64> + Send + Sync {}
impl<T: AsPrimitive<f64> + Send + Sync> Scalar for T {}

/// Declared type of a [`ScalarBuffer`]
#[derive(Copy, Clone, Debug, Eq, PartialEq, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
#[allow(missing_docs)]
pub enum ScalarType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

macro_rules! scalar_buffer {
    ($($variant:ident($t:ty)),* $(,)?) => {
        /// Flattened scalar samples, tagged with their numeric type
        ///
        /// Samples are indexed as `v[x + nx * (y + ny * z)]`, with
        /// `components` interleaved values per sample.
        #[derive(Clone, Debug, PartialEq)]
        pub enum ScalarBuffer {
            $(
                #[allow(missing_docs)]
                $variant(Vec<$t>),
            )*
        }

        $(
            impl From<Vec<$t>> for ScalarBuffer {
                fn from(v: Vec<$t>) -> Self {
                    ScalarBuffer::$variant(v)
                }
            }
        )*

        impl ScalarType {
            /// Size of a single value, in bytes
            pub fn size(self) -> usize {
                match self {
                    $(ScalarType::$variant => std::mem::size_of::<$t>(),)*
                }
            }
        }

        impl ScalarBuffer {
            /// Returns the number of values in the buffer
            pub fn len(&self) -> usize {
                match self {
                    $(ScalarBuffer::$variant(v) => v.len(),)*
                }
            }

            /// Returns the declared type of the buffer
            pub fn scalar_type(&self) -> ScalarType {
                match self {
                    $(ScalarBuffer::$variant(_) => ScalarType::$variant,)*
                }
            }

            /// Decodes a raw little-endian buffer of the given type
            pub fn from_le_bytes(
                ty: ScalarType,
                bytes: &[u8],
            ) -> Result<Self, Error> {
                let size = ty.size();
                if bytes.len() % size != 0 {
                    return Err(Error::BadByteCount(bytes.len(), size));
                }
                let out = match ty {
                    $(
                        ScalarType::$variant => ScalarBuffer::$variant(
                            bytes
                                .chunks_exact(size)
                                .map(|c| {
                                    let mut b =
                                        [0u8; std::mem::size_of::<$t>()];
                                    b.copy_from_slice(c);
                                    <$t>::from_le_bytes(b)
                                })
                                .collect(),
                        ),
                    )*
                };
                Ok(out)
            }
        }
    };
}

scalar_buffer!(
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
);

impl ScalarBuffer {
    /// Checks whether the buffer holds no values
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Named per-point data, with `components` values per point
///
/// On a [`Volume`], there is one tuple per grid sample; on a
/// [`Mesh`](crate::Mesh), there is one tuple per output vertex.
#[derive(Clone, Debug, PartialEq)]
pub struct PointData {
    /// Name of the array
    pub name: String,
    /// Number of values per point
    pub components: usize,
    /// Interleaved values
    pub values: Vec<f32>,
}

impl PointData {
    /// Builds a new named array
    pub fn new(
        name: impl Into<String>,
        components: usize,
        values: Vec<f32>,
    ) -> Self {
        Self {
            name: name.into(),
            components,
            values,
        }
    }

    /// Returns the number of tuples in the array
    pub fn len(&self) -> usize {
        self.values.len().checked_div(self.components).unwrap_or(0)
    }

    /// Checks whether the array is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A dense 3D scalar volume
///
/// The volume is immutable once built; all validation happens during
/// construction, so a `Volume` always describes at least one voxel.
#[derive(Clone, Debug)]
pub struct Volume {
    dims: [usize; 3],
    origin: Vector3<f64>,
    spacing: Vector3<f64>,
    components: usize,
    scalars: ScalarBuffer,
    attributes: Vec<PointData>,
}

impl Volume {
    /// Builds a single-component volume with unit spacing at the origin
    pub fn new(
        dims: [usize; 3],
        scalars: impl Into<ScalarBuffer>,
    ) -> Result<Self, Error> {
        Self::with_components(dims, 1, scalars)
    }

    /// Builds a volume with `components` interleaved values per sample
    pub fn with_components(
        dims: [usize; 3],
        components: usize,
        scalars: impl Into<ScalarBuffer>,
    ) -> Result<Self, Error> {
        let scalars = scalars.into();
        if dims.iter().any(|&d| d < 2) {
            return Err(Error::BadDimensions(dims));
        }
        if components == 0 {
            return Err(Error::ZeroComponents);
        }
        if scalars.is_empty() {
            return Err(Error::MissingScalars);
        }
        let expected = dims[0] * dims[1] * dims[2] * components;
        if scalars.len() != expected {
            return Err(Error::BadScalarCount(scalars.len(), expected));
        }
        Ok(Self {
            dims,
            origin: Vector3::zeros(),
            spacing: Vector3::repeat(1.0),
            components,
            scalars,
            attributes: vec![],
        })
    }

    /// Builds a single-component volume by evaluating `f(x, y, z)` at every
    /// grid index
    pub fn from_fn<T, F>(dims: [usize; 3], mut f: F) -> Result<Self, Error>
    where
        F: FnMut(usize, usize, usize) -> T,
        ScalarBuffer: From<Vec<T>>,
    {
        if dims.iter().any(|&d| d < 2) {
            return Err(Error::BadDimensions(dims));
        }
        let mut out = Vec::with_capacity(dims[0] * dims[1] * dims[2]);
        for k in 0..dims[2] {
            for j in 0..dims[1] {
                for i in 0..dims[0] {
                    out.push(f(i, j, k));
                }
            }
        }
        Self::new(dims, out)
    }

    /// Sets the world-space position of sample `(0, 0, 0)`
    pub fn with_origin(mut self, origin: Vector3<f64>) -> Self {
        self.origin = origin;
        self
    }

    /// Sets the world-space distance between samples on each axis
    pub fn with_spacing(
        mut self,
        spacing: Vector3<f64>,
    ) -> Result<Self, Error> {
        if spacing.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(Error::BadSpacing(spacing.into()));
        }
        self.spacing = spacing;
        Ok(self)
    }

    /// Attaches a per-sample attribute array
    pub fn with_attribute(mut self, data: PointData) -> Result<Self, Error> {
        let expected = self.point_count() * data.components;
        if data.components == 0 || data.values.len() != expected {
            return Err(Error::BadAttributeLength(
                data.name,
                data.values.len(),
                expected,
            ));
        }
        self.attributes.push(data);
        Ok(self)
    }

    /// Returns the number of samples along each axis
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Returns the world-space position of sample `(0, 0, 0)`
    pub fn origin(&self) -> Vector3<f64> {
        self.origin
    }

    /// Returns the world-space distance between samples on each axis
    pub fn spacing(&self) -> Vector3<f64> {
        self.spacing
    }

    /// Returns the number of interleaved values per sample
    pub fn components(&self) -> usize {
        self.components
    }

    /// Returns the raw scalar buffer
    pub fn scalars(&self) -> &ScalarBuffer {
        &self.scalars
    }

    /// Returns the attached point attributes
    pub fn attributes(&self) -> &[PointData] {
        &self.attributes
    }

    /// Returns the total number of grid samples
    pub fn point_count(&self) -> usize {
        self.dims.iter().product()
    }

    /// Returns the number of rows along the x axis, i.e. `ny * nz`
    pub fn row_count(&self) -> usize {
        self.dims[1] * self.dims[2]
    }

    /// Returns the flat sample index of grid position `(i, j, k)`
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.dims[0] * (j + self.dims[1] * k)
    }

    /// Returns the world-space position of grid position `(i, j, k)`
    pub fn position(&self, i: usize, j: usize, k: usize) -> Vector3<f64> {
        self.origin
            + self
                .spacing
                .component_mul(&Vector3::new(i as f64, j as f64, k as f64))
    }
}

/// Typed read-only view of one scalar component
#[derive(Copy, Clone)]
pub(crate) struct Field<'a, T> {
    data: &'a [T],
    dims: [usize; 3],
    stride: usize,
    component: usize,
}

impl<'a, T: Scalar> Field<'a, T> {
    pub fn new(
        data: &'a [T],
        dims: [usize; 3],
        stride: usize,
        component: usize,
    ) -> Self {
        debug_assert!(component < stride);
        debug_assert_eq!(data.len(), dims.iter().product::<usize>() * stride);
        Self {
            data,
            dims,
            stride,
            component,
        }
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Reads sample `i` of the given row, where `row = y + ny * z`
    #[inline]
    pub fn row_sample(&self, row: usize, i: usize) -> f64 {
        self.data[(i + self.dims[0] * row) * self.stride + self.component].as_()
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.row_sample(j + self.dims[1] * k, i)
    }

    /// Finite-difference gradient at a grid sample
    ///
    /// Central differences are used in the interior and one-sided differences
    /// on the volume boundary.
    pub fn gradient(
        &self,
        i: usize,
        j: usize,
        k: usize,
        spacing: &Vector3<f64>,
    ) -> Vector3<f64> {
        let [nx, ny, nz] = self.dims;
        Vector3::new(
            diff(i, nx, spacing.x, |a| self.get(a, j, k)),
            diff(j, ny, spacing.y, |b| self.get(i, b, k)),
            diff(k, nz, spacing.z, |c| self.get(i, j, c)),
        )
    }
}

fn diff(p: usize, n: usize, h: f64, f: impl Fn(usize) -> f64) -> f64 {
    if p == 0 {
        (f(1) - f(0)) / h
    } else if p == n - 1 {
        (f(p) - f(p - 1)) / h
    } else {
        (f(p + 1) - f(p - 1)) / (2.0 * h)
    }
}
