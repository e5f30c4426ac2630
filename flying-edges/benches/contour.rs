use criterion::{
    BenchmarkId, Criterion, black_box, criterion_group, criterion_main,
};
use flying_edges::{ContourValues, Settings, ThreadPool, Volume, contour};

fn sphere(n: usize) -> Volume {
    let c = (n - 1) as f32 / 2.0;
    Volume::from_fn([n; 3], |i, j, k| {
        let p = [i, j, k].map(|v| v as f32 - c);
        (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt()
    })
    .unwrap()
}

pub fn sphere_thread_sweep(c: &mut Criterion) {
    let n = 128;
    let volume = &sphere(n);
    let values = &ContourValues::from(n as f64 / 3.0);

    let mut group = c.benchmark_group("speed vs threads (sphere, 128³)");
    for threads in [1, 2, 4, 8] {
        let pool = &Some(ThreadPool::Custom(
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .unwrap(),
        ));
        group.bench_function(BenchmarkId::new("contour", threads), move |b| {
            let settings = Settings {
                threads: pool.as_ref(),
                ..Default::default()
            };
            b.iter(|| black_box(contour(volume, values, &settings)))
        });
    }
    group.bench_function(BenchmarkId::new("contour", "serial"), |b| {
        let settings = Settings {
            threads: None,
            ..Default::default()
        };
        b.iter(|| black_box(contour(volume, values, &settings)))
    });
}

pub fn sphere_outputs(c: &mut Criterion) {
    let volume = &sphere(96);
    let values = &ContourValues::generate(4, 10.0, 40.0);

    let mut group = c.benchmark_group("per-point outputs (spheres, 96³)");
    for (name, normals, gradients) in [
        ("positions", false, false),
        ("normals", true, false),
        ("normals + gradients", true, true),
    ] {
        let settings = Settings {
            compute_normals: normals,
            compute_gradients: gradients,
            compute_scalars: false,
            ..Default::default()
        };
        group.bench_function(name, |b| {
            b.iter(|| black_box(contour(volume, values, &settings)))
        });
    }
}

criterion_group!(benches, sphere_thread_sweep, sphere_outputs);
criterion_main!(benches);
