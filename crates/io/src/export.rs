//! Export of dense flow fields as ASCII grids.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use nimbus_motion::DenseFlowField;

use crate::ascii_grid::{AsciiGrid, write_ascii_grid};
use crate::error::IoError;

/// Write the U (eastward) and V (northward) components of `flow` to
/// `<dir>/flow_u_<YYYYMMDDHHMM>.asc` and `<dir>/flow_v_<...>.asc`.
///
/// Returns the two paths written.
///
/// # Errors
///
/// Returns [`IoError::Io`] if either file cannot be written.
pub fn write_flow(
    dir: &Path,
    timestamp: NaiveDateTime,
    flow: &DenseFlowField,
    cellsize: f64,
) -> Result<(PathBuf, PathBuf), IoError> {
    let stamp = timestamp.format("%Y%m%d%H%M");
    let u_path = dir.join(format!("flow_u_{stamp}.asc"));
    let v_path = dir.join(format!("flow_v_{stamp}.asc"));
    write_ascii_grid(
        &u_path,
        &AsciiGrid::new(flow.u().clone()).with_cellsize(cellsize),
    )?;
    write_ascii_grid(
        &v_path,
        &AsciiGrid::new(flow.v_north()).with_cellsize(cellsize),
    )?;
    Ok((u_path, v_path))
}
