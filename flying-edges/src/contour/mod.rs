//! Isosurface extraction with the flying edges algorithm
//!
//! Flying edges is a marching cubes variant which is designed to be
//! parallel-friendly.  Instead of visiting every voxel and searching for
//! shared points, it makes four passes over the volume:
//!
//! 1. Every x-edge is classified against the contour value, and each row of
//!    x-edges records where its first and last crossing are
//! 2. Every grid row counts the points on the edges it owns and the
//!    triangles of the voxel row it bounds, skipping stretches of the row
//!    which can't contain any part of the surface
//! 3. A prefix sum over the row counts assigns every row a block of point
//!    ids and triangles; output arrays are allocated once, at their final size
//! 4. Every row fills in its own block
//!
//! Passes 1, 2, and 4 run independently per row, so they are spread across a
//! [`ThreadPool`](crate::ThreadPool).  Because every row writes into a fixed
//! block, the output is identical no matter how many threads are used.
//!
//! ```
//! use flying_edges::{ContourValues, Settings, Volume, contour};
//!
//! // A single sample above 0.5, in one corner of a 2×2×2 volume
//! let mut data = vec![0.0f32; 8];
//! data[0] = 1.0;
//! let volume = Volume::new([2, 2, 2], data)?;
//! let values = ContourValues::from(0.5);
//! let mesh = contour(&volume, &values, &Settings::default())?;
//! assert_eq!(mesh.vertices.len(), 3);
//! assert_eq!(mesh.triangles.len(), 1);
//! # Ok::<(), flying_edges::Error>(())
//! ```
mod alloc;
mod analyze;
mod classify;
mod generate;

pub mod table;
#[doc(hidden)]
pub mod types;

use crate::{
    Error,
    config::Settings,
    mesh::Mesh,
    values::ContourValues,
    volume::{Field, Scalar, ScalarBuffer, Volume},
};
use analyze::{RowSummary, analyze_row};
use classify::Classification;
use generate::Generator;
use log::debug;
use rayon::prelude::*;
use std::time::Instant;
use table::CASE_TABLE;

/// Extracts isosurfaces from a volume
///
/// One surface is generated per contour value; surfaces are concatenated in
/// the order of `values`, and points and triangles within each surface are
/// ordered by grid row, then by position along the row.
///
/// A volume which doesn't cross any contour value produces an empty mesh.
/// Errors are returned for an out-of-range `array_component`, for
/// cancellation, and if the output can't be allocated.
pub fn contour(
    volume: &Volume,
    values: &ContourValues,
    settings: &Settings,
) -> Result<Mesh, Error> {
    if settings.array_component >= volume.components() {
        return Err(Error::BadComponent(
            settings.array_component,
            volume.components(),
        ));
    }
    match volume.scalars() {
        ScalarBuffer::U8(v) => run(volume, v, values, settings),
        ScalarBuffer::I8(v) => run(volume, v, values, settings),
        ScalarBuffer::U16(v) => run(volume, v, values, settings),
        ScalarBuffer::I16(v) => run(volume, v, values, settings),
        ScalarBuffer::U32(v) => run(volume, v, values, settings),
        ScalarBuffer::I32(v) => run(volume, v, values, settings),
        ScalarBuffer::U64(v) => run(volume, v, values, settings),
        ScalarBuffer::I64(v) => run(volume, v, values, settings),
        ScalarBuffer::F32(v) => run(volume, v, values, settings),
        ScalarBuffer::F64(v) => run(volume, v, values, settings),
    }
}

fn check_cancel(settings: &Settings) -> Result<(), Error> {
    if settings.cancel.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}

/// Evaluates `f` for every row, in parallel if the settings allow it
///
/// Results are returned in row order.
fn map_rows<F, R>(
    rows: usize,
    settings: &Settings,
    f: F,
) -> Result<Vec<R>, Error>
where
    F: Fn(usize) -> R + Send + Sync,
    R: Send,
{
    let f = |row| -> Result<R, Error> {
        check_cancel(settings)?;
        Ok(f(row))
    };
    match settings.threads {
        None => (0..rows).map(f).collect(),
        Some(pool) => pool.run(|| (0..rows).into_par_iter().map(f).collect()),
    }
}

fn run<T: Scalar>(
    volume: &Volume,
    data: &[T],
    values: &ContourValues,
    settings: &Settings,
) -> Result<Mesh, Error> {
    let field = Field::new(
        data,
        volume.dims(),
        volume.components(),
        settings.array_component,
    );
    let rows = volume.row_count();
    let table = &*CASE_TABLE;

    // Passes 1 and 2, once per contour value
    let mut classes = Vec::with_capacity(values.len());
    let mut summaries: Vec<RowSummary> = vec![];
    for value in values.iter() {
        check_cancel(settings)?;
        let start = Instant::now();
        let class = Classification::build(&field, value, settings.threads);
        debug!(
            "classified x-edges for {value} in {:?} ({} crossings)",
            start.elapsed(),
            class.crossings()
        );
        check_cancel(settings)?;

        let start = Instant::now();
        let s = map_rows(rows, settings, |r| analyze_row(&class, table, r))?;
        debug!("analyzed {rows} rows for {value} in {:?}", start.elapsed());
        summaries.extend(s);
        classes.push(class);
    }
    check_cancel(settings)?;

    // Pass 3
    let start = Instant::now();
    let layout = alloc::Layout::build(&summaries);
    let attributes = if settings.interpolate_attributes {
        volume.attributes()
    } else {
        &[]
    };
    let mut mesh = alloc::allocate(&layout, settings, attributes)?;
    debug!(
        "allocated {} points and {} triangles in {:?}",
        layout.points,
        layout.triangles,
        start.elapsed()
    );
    if mesh.is_empty() {
        return Ok(mesh);
    }
    check_cancel(settings)?;

    // Pass 4
    let start = Instant::now();
    let generators: Vec<_> = classes
        .iter()
        .map(|class| Generator {
            field: &field,
            class,
            table,
            origin: volume.origin(),
            spacing: volume.spacing(),
            attributes,
        })
        .collect();
    let outputs = alloc::split(&mut mesh, &summaries);
    let f = |(i, mut out): (usize, alloc::RowOutput)| -> Result<(), Error> {
        check_cancel(settings)?;
        let (v, row) = (i / rows, i % rows);
        let offsets = &layout.offsets[v * rows..(v + 1) * rows];
        generators[v].row(row, &summaries[i], offsets, &mut out);
        Ok(())
    };
    match settings.threads {
        None => outputs.into_iter().enumerate().try_for_each(f)?,
        Some(pool) => pool.run(|| {
            outputs.into_par_iter().enumerate().try_for_each(f)
        })?,
    }
    debug!("generated output in {:?}", start.elapsed());

    Ok(mesh)
}
