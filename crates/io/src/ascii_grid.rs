//! ESRI ASCII raster grids.

use std::fmt::Write as _;
use std::path::Path;

use ndarray::{Array2, s};

use crate::error::IoError;

/// Default no-data marker written to grids.
pub const DEFAULT_NODATA: f64 = -9999.0;

/// A raster read from or written to an ESRI ASCII grid.
///
/// Row 0 is the northernmost row, as in the file. Missing values are NaN
/// in [`AsciiGrid::data`].
#[derive(Debug, Clone, PartialEq)]
pub struct AsciiGrid {
    data: Array2<f64>,
    xll: f64,
    yll: f64,
    cellsize: f64,
    nodata: f64,
}

impl AsciiGrid {
    /// Grid anchored at the origin with unit cells.
    pub fn new(data: Array2<f64>) -> Self {
        Self {
            data,
            xll: 0.0,
            yll: 0.0,
            cellsize: 1.0,
            nodata: DEFAULT_NODATA,
        }
    }

    /// Sets the lower-left corner.
    pub fn with_origin(mut self, xll: f64, yll: f64) -> Self {
        self.xll = xll;
        self.yll = yll;
        self
    }

    /// Sets the cell size.
    pub fn with_cellsize(mut self, cellsize: f64) -> Self {
        self.cellsize = cellsize;
        self
    }

    /// Sets the no-data marker used when writing.
    pub fn with_nodata(mut self, nodata: f64) -> Self {
        self.nodata = nodata;
        self
    }

    /// Cell values, NaN where missing.
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Consume the grid, returning its values.
    pub fn into_data(self) -> Array2<f64> {
        self.data
    }

    /// Lower-left corner `(x, y)`.
    pub fn origin(&self) -> (f64, f64) {
        (self.xll, self.yll)
    }

    /// Cell size.
    pub fn cellsize(&self) -> f64 {
        self.cellsize
    }

    /// No-data marker.
    pub fn nodata(&self) -> f64 {
        self.nodata
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, IoError> {
    value.parse().map_err(|_| IoError::Grid {
        reason: format!("invalid value '{value}' for '{key}'"),
    })
}

/// Parse the text of an ESRI ASCII grid.
///
/// Header keys are case-insensitive; `xllcenter`/`yllcenter` are accepted
/// in place of the corner keys and `NODATA_value` is optional.
///
/// # Errors
///
/// Returns [`IoError::Grid`] for unknown or missing header keys, unparsable
/// values, or a cell count that does not match `nrows * ncols`.
pub fn parse_ascii_grid(text: &str) -> Result<AsciiGrid, IoError> {
    let grid_err = |reason: String| IoError::Grid { reason };
    let mut ncols: Option<usize> = None;
    let mut nrows: Option<usize> = None;
    let (mut xll, mut yll, mut cellsize) = (0.0, 0.0, 1.0);
    let mut nodata: Option<f64> = None;

    let mut lines = text.lines().peekable();
    while let Some(&line) = lines.peek() {
        let mut parts = line.split_whitespace();
        let Some(key) = parts.next() else {
            lines.next();
            continue;
        };
        if key.parse::<f64>().is_ok() {
            break;
        }
        let value = parts
            .next()
            .ok_or_else(|| grid_err(format!("header '{key}' has no value")))?;
        match key.to_ascii_lowercase().as_str() {
            "ncols" => ncols = Some(parse_num(key, value)?),
            "nrows" => nrows = Some(parse_num(key, value)?),
            "xllcorner" | "xllcenter" => xll = parse_num(key, value)?,
            "yllcorner" | "yllcenter" => yll = parse_num(key, value)?,
            "cellsize" => cellsize = parse_num(key, value)?,
            "nodata_value" => nodata = Some(parse_num(key, value)?),
            other => return Err(grid_err(format!("unknown header key '{other}'"))),
        }
        lines.next();
    }

    let ncols = ncols.ok_or_else(|| grid_err("missing ncols".to_string()))?;
    let nrows = nrows.ok_or_else(|| grid_err("missing nrows".to_string()))?;
    let nodata = nodata.unwrap_or(DEFAULT_NODATA);

    let values = lines
        .flat_map(str::split_whitespace)
        .map(|t| parse_num::<f64>("cell", t).map(|v| if v == nodata { f64::NAN } else { v }))
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() != nrows * ncols {
        return Err(grid_err(format!(
            "expected {} cells ({nrows} x {ncols}), found {}",
            nrows * ncols,
            values.len()
        )));
    }
    let data = Array2::from_shape_vec((nrows, ncols), values)
        .map_err(|e| grid_err(e.to_string()))?;

    Ok(AsciiGrid {
        data,
        xll,
        yll,
        cellsize,
        nodata,
    })
}

/// Read an ESRI ASCII grid from `path`.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file is missing, [`IoError::Io`]
/// if it cannot be read and [`IoError::Grid`] if it cannot be parsed.
pub fn read_ascii_grid(path: &Path) -> Result<AsciiGrid, IoError> {
    let text = std::fs::read_to_string(path).map_err(|e| IoError::io(path, e))?;
    parse_ascii_grid(&text)
}

/// Render a grid as ESRI ASCII text. Non-finite cells are written as the
/// no-data marker.
pub fn format_ascii_grid(grid: &AsciiGrid) -> String {
    let (nrows, ncols) = grid.data.dim();
    let mut out = String::with_capacity(nrows * ncols * 8 + 128);
    // Writing to a String cannot fail.
    let _ = writeln!(out, "ncols {ncols}");
    let _ = writeln!(out, "nrows {nrows}");
    let _ = writeln!(out, "xllcorner {}", grid.xll);
    let _ = writeln!(out, "yllcorner {}", grid.yll);
    let _ = writeln!(out, "cellsize {}", grid.cellsize);
    let _ = writeln!(out, "NODATA_value {}", grid.nodata);
    for row in grid.data.rows() {
        let line: Vec<String> = row
            .iter()
            .map(|v| {
                if v.is_finite() {
                    v.to_string()
                } else {
                    grid.nodata.to_string()
                }
            })
            .collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}

/// Write `grid` to `path` as an ESRI ASCII grid.
///
/// # Errors
///
/// Returns [`IoError::Io`] if the file cannot be written.
pub fn write_ascii_grid(path: &Path, grid: &AsciiGrid) -> Result<(), IoError> {
    std::fs::write(path, format_ascii_grid(grid)).map_err(|e| IoError::io(path, e))
}

/// Central `size` x `size` window of `field`.
///
/// # Errors
///
/// Returns [`IoError::DimensionMismatch`] if `field` is smaller than `size`
/// in either direction.
pub fn extract_middle_domain(field: &Array2<f64>, size: usize) -> Result<Array2<f64>, IoError> {
    let (rows, cols) = field.dim();
    for (name, got) in [("rows", rows), ("cols", cols)] {
        if got < size {
            return Err(IoError::DimensionMismatch {
                name: name.to_string(),
                expected: size,
                got,
            });
        }
    }
    let r0 = (rows - size) / 2;
    let c0 = (cols - size) / 2;
    Ok(field.slice(s![r0..r0 + size, c0..c0 + size]).to_owned())
}
