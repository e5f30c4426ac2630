use flying_edges::{
    CancelToken, ContourValues, Error, Mesh, PointData, ScalarBuffer,
    Settings, ThreadPool, Volume,
    contour::{
        contour,
        table::CASE_TABLE,
        types::{CellMask, Corner, VoxelCase},
    },
};
use nalgebra::Vector3;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::HashMap;

const CENTER: [f64; 3] = [9.3, 10.1, 8.7];

fn sphere_data(dims: [usize; 3]) -> Vec<f32> {
    let mut out = vec![];
    for k in 0..dims[2] {
        for j in 0..dims[1] {
            for i in 0..dims[0] {
                let d = [i, j, k]
                    .iter()
                    .zip(CENTER)
                    .map(|(p, c)| (*p as f64 - c).powi(2))
                    .sum::<f64>();
                out.push(d.sqrt() as f32);
            }
        }
    }
    out
}

fn sphere(dims: [usize; 3]) -> Volume {
    Volume::new(dims, sphere_data(dims)).unwrap()
}

fn samples(v: &Volume) -> &[f32] {
    match v.scalars() {
        ScalarBuffer::F32(d) => d,
        _ => panic!("expected f32 samples"),
    }
}

/// Classic voxel-by-voxel marching cubes, returning triangle positions
fn reference(v: &Volume, iso: f64) -> Vec<[Vector3<f64>; 3]> {
    let data = samples(v);
    let [nx, ny, nz] = v.dims();
    let sample = |p: [usize; 3]| data[v.index(p[0], p[1], p[2])] as f64;
    let mut out = vec![];
    for k in 0..nz - 1 {
        for j in 0..ny - 1 {
            for i in 0..nx - 1 {
                let corner = |c: Corner| {
                    let [a, b, d] = c.offset();
                    [i + a, j + b, k + d]
                };
                let mut values = [0.0; 8];
                for c in Corner::iter() {
                    values[c.index()] = sample(corner(c));
                }
                let mask = CellMask::from_values(values, iso);
                let case = VoxelCase::from_mask(mask);
                for tri in CASE_TABLE.triangles(case) {
                    out.push(tri.map(|e| {
                        let (a, b) = e.corners();
                        let (a, b) = (corner(a), corner(b));
                        let t = (iso - sample(a)) / (sample(b) - sample(a));
                        let pa = v.position(a[0], a[1], a[2]);
                        let pb = v.position(b[0], b[1], b[2]);
                        pa + (pb - pa) * t
                    }));
                }
            }
        }
    }
    out
}

/// Counts grid edges whose endpoints are on opposite sides of `iso`
fn crossed_edges(v: &Volume, iso: f64) -> usize {
    let data = samples(v);
    let [nx, ny, nz] = v.dims();
    let above = |i, j, k| data[v.index(i, j, k)] as f64 >= iso;
    let mut count = 0;
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let a = above(i, j, k);
                count += (i + 1 < nx && a != above(i + 1, j, k)) as usize;
                count += (j + 1 < ny && a != above(i, j + 1, k)) as usize;
                count += (k + 1 < nz && a != above(i, j, k + 1)) as usize;
            }
        }
    }
    count
}

/// Contours with default settings
fn extract(v: &Volume, iso: f64) -> Mesh {
    contour(v, &ContourValues::from(iso), &Settings::default()).unwrap()
}

fn check_against_reference(v: &Volume, mesh: &Mesh, iso: f64) {
    let expected = reference(v, iso);
    assert_eq!(mesh.triangles.len(), expected.len());
    for (t, e) in mesh.triangles.iter().zip(&expected) {
        for (i, p) in t.iter().zip(e) {
            let d = (mesh.vertices[*i].cast::<f64>() - p).norm();
            assert!(d < 1e-5, "vertex {i} is off by {d}");
        }
    }
    assert_eq!(mesh.vertices.len(), crossed_edges(v, iso));
}

#[test]
fn sphere_matches_reference() {
    let v = sphere([20, 21, 19]);
    for iso in [3.0f64, 6.5, 8.0] {
        let mesh = extract(&v, iso);
        check_against_reference(&v, &mesh, iso);
    }
}

#[test]
fn random_volumes_match_reference() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..30 {
        let dims = [
            rng.gen_range(2..9),
            rng.gen_range(2..7),
            rng.gen_range(2..7),
        ];
        let n = dims.iter().product::<usize>();
        let data: Vec<f32> =
            (0..n).map(|_| rng.gen_range(0..5) as f32).collect();
        let v = Volume::new(dims, data).unwrap();
        // Integer contour values produce plenty of exact ties
        let iso = rng.gen_range(0..10) as f64 * 0.5;
        let settings = Settings {
            threads: None,
            ..Default::default()
        };
        let mesh = contour(&v, &ContourValues::from(iso), &settings).unwrap();
        check_against_reference(&v, &mesh, iso);
    }
}

#[test]
fn sphere_is_closed() {
    let mesh = extract(&sphere([20, 21, 19]), 6.5);
    assert!(!mesh.triangles.is_empty());

    // Every directed edge appears once, and its reverse appears once
    let mut edges = HashMap::new();
    for t in &mesh.triangles {
        assert!(t.x != t.y && t.y != t.z && t.x != t.z);
        for (a, b) in [(t.x, t.y), (t.y, t.z), (t.z, t.x)] {
            *edges.entry((a, b)).or_insert(0) += 1;
        }
    }
    for (&(a, b), &n) in &edges {
        assert_eq!(n, 1, "edge {a} -> {b} is used {n} times");
        assert_eq!(edges.get(&(b, a)), Some(&1), "edge {a} -> {b} is open");
    }

    // Every point is used by at least one triangle
    let mut used = vec![false; mesh.vertices.len()];
    for t in &mesh.triangles {
        for i in t.iter() {
            used[*i] = true;
        }
    }
    assert!(used.iter().all(|u| *u));
}

#[test]
fn sphere_geometry() {
    let r = 6.5f64;
    let center = Vector3::from(CENTER.map(|c| c as f32));
    let mesh = extract(&sphere([20, 21, 19]), r);
    for v in &mesh.vertices {
        let d = (v - center).norm();
        assert!((d - r as f32).abs() < 0.1, "invalid vertex at {v:?}: {d}");
    }

    // Normals point from high to low values, i.e. towards the center
    let normals = mesh.normals.as_ref().unwrap();
    for (v, n) in mesh.vertices.iter().zip(normals) {
        assert!((n.norm() - 1.0).abs() < 1e-5);
        let inward = (center - v).normalize();
        assert!(n.dot(&inward) > 0.9, "bad normal {n:?} at {v:?}");
    }

    // Triangle winding agrees with point normals
    let mut agree = 0;
    for t in &mesh.triangles {
        let [a, b, c] = [t.x, t.y, t.z].map(|i| mesh.vertices[i]);
        let face = (b - a).cross(&(c - a));
        let n = normals[t.x] + normals[t.y] + normals[t.z];
        agree += (face.dot(&n) > 0.0) as usize;
    }
    assert!(agree * 100 >= mesh.triangles.len() * 99);

    let scalars = mesh.scalars.as_ref().unwrap();
    assert!(scalars.iter().all(|s| *s == 6.5));
}

#[test]
fn empty_surfaces() {
    let v = sphere([8, 8, 8]);
    for iso in [-1.0f64, 100.0] {
        let mesh = extract(&v, iso);
        assert!(mesh.is_empty());
        assert_eq!(mesh.normals.as_ref().map(Vec::len), Some(0));
    }

    // A constant volume equal to the contour value is entirely above it
    let v = Volume::new([3, 3, 3], vec![2.0f64; 27]).unwrap();
    let mesh = extract(&v, 2.0);
    assert!(mesh.is_empty());
}

#[test]
fn single_corner_scenario() {
    let mut data = vec![0.0f32; 8];
    data[0] = 1.0;
    let v = Volume::new([2, 2, 2], data).unwrap();
    let mesh = extract(&v, 0.5);
    assert_eq!(mesh.triangles.len(), 1);
    assert_eq!(mesh.vertices.len(), 3);
    let mut tri: Vec<_> = mesh.triangles[0].iter().cloned().collect();
    tri.sort();
    assert_eq!(tri, vec![0, 1, 2]);
    for p in &mesh.vertices {
        let mut c = [p.x, p.y, p.z];
        c.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(c, [0.0, 0.0, 0.5]);
    }
}

#[test]
fn deterministic_across_threads() {
    let v = sphere([24, 23, 25]);
    let values = ContourValues::from([4.0, 7.5]);
    let pools = [
        None,
        Some(ThreadPool::Global),
        Some(ThreadPool::Custom(
            rayon::ThreadPoolBuilder::new()
                .num_threads(1)
                .build()
                .unwrap(),
        )),
        Some(ThreadPool::Custom(
            rayon::ThreadPoolBuilder::new()
                .num_threads(4)
                .build()
                .unwrap(),
        )),
    ];
    let meshes: Vec<Mesh> = pools
        .iter()
        .map(|p| {
            let settings = Settings {
                threads: p.as_ref(),
                compute_gradients: true,
                ..Default::default()
            };
            contour(&v, &values, &settings).unwrap()
        })
        .collect();
    for m in &meshes[1..] {
        assert_eq!(m.triangles, meshes[0].triangles);
        assert_eq!(m.vertices, meshes[0].vertices);
        assert_eq!(m.normals, meshes[0].normals);
        assert_eq!(m.gradients, meshes[0].gradients);
        assert_eq!(m.scalars, meshes[0].scalars);
    }
}

#[test]
fn multiple_values_are_concatenated() {
    let v = sphere([16, 17, 18]);
    let settings = Settings::default();
    let a = contour(&v, &ContourValues::from(3.5), &settings).unwrap();
    let b = contour(&v, &ContourValues::from(6.0), &settings).unwrap();
    let both =
        contour(&v, &ContourValues::from([3.5, 6.0]), &settings).unwrap();

    let n = a.vertices.len();
    assert_eq!(both.vertices.len(), n + b.vertices.len());
    assert_eq!(both.vertices[..n], a.vertices[..]);
    assert_eq!(both.vertices[n..], b.vertices[..]);
    assert_eq!(both.triangles[..a.triangles.len()], a.triangles[..]);
    for (t, e) in both.triangles[a.triangles.len()..].iter().zip(&b.triangles)
    {
        assert_eq!(*t, e.add_scalar(n));
    }
    let scalars = both.scalars.unwrap();
    assert!(scalars[..n].iter().all(|s| *s == 3.5));
    assert!(scalars[n..].iter().all(|s| *s == 6.0));

    // Generated values match explicit ones
    let generated =
        contour(&v, &ContourValues::generate(2, 3.5, 6.0), &settings).unwrap();
    assert_eq!(generated.triangles, both.triangles);
}

#[test]
fn scalar_types_agree() {
    let dims = [12, 13, 11];
    let data: Vec<u8> = sphere_data(dims).iter().map(|d| *d as u8).collect();
    let as_f32: Vec<f32> = data.iter().map(|d| *d as f32).collect();
    let as_i64: Vec<i64> = data.iter().map(|d| *d as i64).collect();
    let values = ContourValues::from(6.5);
    let settings = Settings::default();

    let a = contour(&Volume::new(dims, data).unwrap(), &values, &settings);
    let b = contour(&Volume::new(dims, as_f32).unwrap(), &values, &settings);
    let c = contour(&Volume::new(dims, as_i64).unwrap(), &values, &settings);
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
    assert!(!a.is_empty());
    assert_eq!(a.vertices, b.vertices);
    assert_eq!(a.vertices, c.vertices);
    assert_eq!(a.triangles, b.triangles);
    assert_eq!(a.triangles, c.triangles);
}

#[test]
fn array_component_selection() {
    let dims = [10, 9, 11];
    let data = sphere_data(dims);
    let mut interleaved = vec![];
    for d in &data {
        interleaved.extend([-(*d), *d, 100.0]);
    }
    let single = Volume::new(dims, data).unwrap();
    let multi = Volume::with_components(dims, 3, interleaved).unwrap();
    let values = ContourValues::from(4.0);

    let expected = contour(&single, &values, &Settings::default()).unwrap();
    let settings = Settings {
        array_component: 1,
        ..Default::default()
    };
    let mesh = contour(&multi, &values, &settings).unwrap();
    assert_eq!(mesh.vertices, expected.vertices);
    assert_eq!(mesh.triangles, expected.triangles);
    assert_eq!(mesh.normals, expected.normals);

    // The third component is constant, so it produces no surface
    let settings = Settings {
        array_component: 2,
        ..Default::default()
    };
    assert!(contour(&multi, &values, &settings).unwrap().is_empty());

    let settings = Settings {
        array_component: 3,
        ..Default::default()
    };
    assert!(matches!(
        contour(&multi, &values, &settings),
        Err(Error::BadComponent(3, 3))
    ));
}

#[test]
fn attributes_are_interpolated() {
    let dims = [12, 12, 12];
    let v = sphere(dims);
    // Attribute is the world-space position of each sample
    let mut pos = vec![];
    for k in 0..dims[2] {
        for j in 0..dims[1] {
            for i in 0..dims[0] {
                pos.extend([i, j, k].map(|c| c as f32));
            }
        }
    }
    let v = v.with_attribute(PointData::new("position", 3, pos)).unwrap();
    let settings = Settings {
        interpolate_attributes: true,
        ..Default::default()
    };
    let mesh = contour(&v, &ContourValues::from(4.0), &settings).unwrap();
    let attr = mesh.attribute("position").unwrap();
    assert_eq!(attr.components, 3);
    assert_eq!(attr.len(), mesh.vertices.len());
    for (p, a) in mesh.vertices.iter().zip(attr.values.chunks_exact(3)) {
        for (x, y) in p.iter().zip(a) {
            assert!((x - y).abs() < 1e-5);
        }
    }

    // Attributes are left out unless requested
    let mesh = extract(&v, 4.0);
    assert!(mesh.attributes.is_empty());
}

#[test]
fn spacing_and_origin() {
    let dims = [12, 13, 14];
    let unit = sphere(dims);
    let scaled = sphere(dims)
        .with_origin(Vector3::new(1.0, -2.0, 3.0))
        .with_spacing(Vector3::new(0.5, 2.0, 0.25))
        .unwrap();
    let settings = Settings {
        compute_gradients: true,
        ..Default::default()
    };
    let a = contour(&unit, &ContourValues::from(5.0), &settings).unwrap();
    let b = contour(&scaled, &ContourValues::from(5.0), &settings).unwrap();
    assert_eq!(a.triangles, b.triangles);
    for (p, q) in a.vertices.iter().zip(&b.vertices) {
        let expected = Vector3::new(
            1.0 + p.x * 0.5,
            -2.0 + p.y * 2.0,
            3.0 + p.z * 0.25,
        );
        assert!((q - expected).norm() < 1e-4);
    }
    // Gradients are measured in world units
    for (g, h) in a
        .gradients
        .as_ref()
        .unwrap()
        .iter()
        .zip(b.gradients.as_ref().unwrap())
    {
        assert!((h.x - g.x / 0.5).abs() < 1e-4);
        assert!((h.y - g.y / 2.0).abs() < 1e-4);
        assert!((h.z - g.z / 0.25).abs() < 1e-4);
    }
}

#[test]
fn cancellation() {
    let v = sphere([16, 16, 16]);
    let cancel = CancelToken::new();
    cancel.cancel();
    let settings = Settings {
        cancel,
        ..Default::default()
    };
    assert!(matches!(
        contour(&v, &ContourValues::from(5.0), &settings),
        Err(Error::Cancelled)
    ));
}

#[test]
fn invalid_volumes() {
    assert!(matches!(
        Volume::new([1, 4, 4], vec![0.0f32; 16]),
        Err(Error::BadDimensions([1, 4, 4]))
    ));
    assert!(matches!(
        Volume::new([2, 2, 2], vec![0.0f32; 7]),
        Err(Error::BadScalarCount(7, 8))
    ));
    assert!(matches!(
        Volume::new([2, 2, 2], Vec::<f32>::new()),
        Err(Error::MissingScalars)
    ));
    assert!(matches!(
        Volume::with_components([2, 2, 2], 0, vec![0.0f32; 8]),
        Err(Error::ZeroComponents)
    ));
}

#[test]
fn stl_export() {
    let mesh = extract(&sphere([12, 12, 12]), 4.0);
    let mut out = vec![];
    mesh.write_stl(&mut out).unwrap();
    assert_eq!(out.len(), 84 + 50 * mesh.triangles.len());
    let count = u32::from_le_bytes(out[80..84].try_into().unwrap());
    assert_eq!(count as usize, mesh.triangles.len());
}
