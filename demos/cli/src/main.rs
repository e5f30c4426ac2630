use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use nalgebra::Vector3;
use strum::IntoEnumIterator;

use flying_edges::{
    ContourValues, Mesh, ScalarBuffer, ScalarType, Settings, ThreadPool,
    Volume,
};

/// Extracts isosurfaces from dense volumes
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    cmd: Command,

    #[clap(flatten)]
    settings: ContourSettings,
}

#[derive(Subcommand)]
enum Command {
    /// Contours a synthetic distance field centered in the volume
    Sphere {
        /// Number of samples along each axis
        #[clap(short, long, default_value_t = 64)]
        size: usize,
    },

    /// Contours a raw little-endian volume loaded from disk
    Raw {
        /// Input file
        #[clap(short, long)]
        input: PathBuf,

        /// Samples along each axis, as `nx ny nz`
        #[clap(short, long, num_args = 3, required = true)]
        dims: Vec<usize>,

        /// Sample type
        #[clap(long, value_parser = parse_type, default_value = "f32")]
        ty: ScalarType,

        /// Values per sample
        #[clap(long, default_value_t = 1)]
        components: usize,

        /// Grid spacing along each axis
        #[clap(long, num_args = 3)]
        spacing: Option<Vec<f64>>,
    },
}

#[derive(Parser)]
struct ContourSettings {
    /// Contour values
    #[clap(short, long, num_args = 1.., allow_negative_numbers = true)]
    values: Vec<f64>,

    /// Generates evenly spaced values, as `count start end`
    #[clap(
        short,
        long,
        num_args = 3,
        allow_negative_numbers = true,
        conflicts_with = "values"
    )]
    generate: Option<Vec<f64>>,

    /// Component to contour for multi-component data
    #[clap(short, long, default_value_t = 0)]
    component: usize,

    /// Skip computing normals
    #[clap(long)]
    no_normals: bool,

    /// Compute gradients
    #[clap(long)]
    gradients: bool,

    /// Name of a `.stl` file to write
    #[clap(short, long)]
    out: Option<PathBuf>,

    /// Number of threads to use (single-threaded if omitted)
    #[clap(short, long)]
    threads: Option<NonZeroUsize>,

    /// Number of times to contour (for benchmarking)
    #[clap(short = 'N', default_value_t = 1)]
    n: usize,
}

fn parse_type(s: &str) -> Result<ScalarType, String> {
    ScalarType::iter()
        .find(|t| t.to_string() == s)
        .ok_or_else(|| {
            let names: Vec<_> =
                ScalarType::iter().map(|t| t.to_string()).collect();
            format!("unknown type `{s}`; expected one of {}", names.join(", "))
        })
}

////////////////////////////////////////////////////////////////////////////////

fn sphere(size: usize) -> Result<Volume> {
    let c = (size.max(1) - 1) as f32 / 2.0;
    let v = Volume::from_fn([size; 3], |i, j, k| {
        let p = Vector3::new(i, j, k).map(|v| v as f32 - c);
        p.norm()
    })?;
    Ok(v)
}

fn raw(
    input: &PathBuf,
    dims: &[usize],
    ty: ScalarType,
    components: usize,
    spacing: Option<&[f64]>,
) -> Result<Volume> {
    let bytes = std::fs::read(input)?;
    let scalars = ScalarBuffer::from_le_bytes(ty, &bytes)?;
    let [nx, ny, nz] = dims else {
        bail!("expected three dimensions, got {dims:?}");
    };
    let mut v = Volume::with_components([*nx, *ny, *nz], components, scalars)?;
    if let Some(&[sx, sy, sz]) = spacing {
        v = v.with_spacing(Vector3::new(sx, sy, sz))?;
    }
    Ok(v)
}

fn run_contour(volume: &Volume, settings: &ContourSettings) -> Result<Mesh> {
    let values = match &settings.generate {
        Some(g) => ContourValues::generate(g[0] as usize, g[1], g[2]),
        None => ContourValues::from(settings.values.clone()),
    };
    if values.is_empty() {
        bail!("no contour values given; use --values or --generate");
    }
    let pool = settings
        .threads
        .map(|n| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(n.get())
                .build()
                .map(ThreadPool::Custom)
        })
        .transpose()?;
    let cfg = Settings {
        compute_normals: !settings.no_normals,
        compute_gradients: settings.gradients,
        array_component: settings.component,
        threads: pool.as_ref(),
        ..Default::default()
    };

    let mut mesh = Mesh::new();
    for _ in 0..settings.n {
        mesh = flying_edges::contour(volume, &values, &cfg)?;
    }
    Ok(mesh)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .init();

    let now = Instant::now();
    let args = Args::parse();
    let volume = match &args.cmd {
        Command::Sphere { size } => sphere(*size)?,
        Command::Raw {
            input,
            dims,
            ty,
            components,
            spacing,
        } => raw(input, dims, *ty, *components, spacing.as_deref())?,
    };
    info!(
        "Loaded {:?} volume ({}) in {:?}",
        volume.dims(),
        volume.scalars().scalar_type(),
        now.elapsed()
    );

    let settings = &args.settings;
    let start = Instant::now();
    let mesh = run_contour(&volume, settings)?;
    info!(
        "Contoured {}x at {:?} ms/iter",
        settings.n,
        start.elapsed().as_micros() as f64 / 1000.0 / (settings.n as f64)
    );
    info!(
        "Generated {} points and {} triangles",
        mesh.vertices.len(),
        mesh.triangles.len()
    );
    if let Some(out) = &settings.out {
        info!("Writing STL to {out:?}");
        mesh.write_stl(&mut std::fs::File::create(out)?)?;
    }
    Ok(())
}
