//! Boundary polygon files.
//!
//! Each polygon is a text file with two header lines followed by one vertex per
//! line: longitude, latitude and elevation, usually comma separated. Only the
//! longitude and latitude are kept.
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use indexmap::IndexMap;
use ndarray::{Array2, ArrayView2, Zip};

use crate::{discovery, error::BoundaryError};

/// Number of lines before the first vertex
pub const BOUNDARY_HEADER_LINES: usize = 2;

/// Polygons keyed by the stem of the file they were read from, e.g. "Fairbanks"
/// for `Fairbanks.txt`.
pub type BoundaryMap = IndexMap<String, BoundaryPolygon>;

/// A closed or open ring of (longitude, latitude) vertices.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundaryPolygon {
    lon: Vec<f64>,
    lat: Vec<f64>,
}

impl BoundaryPolygon {
    pub fn from_points<I: IntoIterator<Item = (f64, f64)>>(points: I) -> Self {
        let (lon, lat) = points.into_iter().unzip();
        Self { lon, lat }
    }

    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    /// Number of vertices
    pub fn len(&self) -> usize {
        self.lon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lon.is_empty()
    }

    /// Table shape as (rows, columns); there are always two columns.
    pub fn shape(&self) -> (usize, usize) {
        (self.len(), 2)
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.lon.iter().copied().zip(self.lat.iter().copied())
    }

    /// Even-odd ray casting test. Points exactly on an edge may land on either side.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let n = self.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = (self.lon[i], self.lat[i]);
            let (xj, yj) = (self.lon[j], self.lat[j]);
            if ((yi > lat) != (yj > lat)) && (lon < (xj - xi) * (lat - yi) / (yj - yi) + xi) {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

/// Mark which points of a 2D longitude/latitude grid fall inside `polygon`.
///
/// # Panics
/// If `lon2d` and `lat2d` do not have the same shape.
pub fn mask_with_polygon(
    lon2d: ArrayView2<f64>,
    lat2d: ArrayView2<f64>,
    polygon: &BoundaryPolygon,
) -> Array2<bool> {
    Zip::from(&lon2d)
        .and(&lat2d)
        .map_collect(|&lon, &lat| polygon.contains(lon, lat))
}

/// Read one boundary file.
pub fn read_boundary_file(path: &Path) -> Result<BoundaryPolygon, BoundaryError> {
    let f = File::open(path).map_err(|e| BoundaryError::CouldNotOpen {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut points = vec![];
    for (iline, line) in BufReader::new(f).lines().enumerate() {
        let line = line.map_err(|e| BoundaryError::CouldNotRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if iline < BOUNDARY_HEADER_LINES || line.trim().is_empty() {
            continue;
        }

        let point = parse_vertex(&line).map_err(|cause| BoundaryError::DataError {
            path: path.to_path_buf(),
            line: iline + 1,
            cause,
        })?;
        points.push(point);
    }

    Ok(BoundaryPolygon::from_points(points))
}

fn parse_vertex(line: &str) -> Result<(f64, f64), String> {
    let fields: Vec<&str> = if line.contains(',') {
        line.split(',').map(str::trim).collect()
    } else {
        line.split_ascii_whitespace().collect()
    };

    if fields.len() < 2 {
        return Err(format!(
            "expected longitude, latitude and elevation, found {} field(s)",
            fields.len()
        ));
    }

    let parse = |name: &str, s: &str| {
        s.parse::<f64>()
            .map_err(|_| format!("could not parse {name} '{s}' as a number"))
    };
    Ok((parse("longitude", fields[0])?, parse("latitude", fields[1])?))
}

/// Read every `*.txt` polygon in `dir`, keyed by file stem.
///
/// A file whose contents are not a polygon is skipped with a warning, so it
/// shows up later as a missing boundary. Failing to open or read a file is
/// still an error.
pub fn read_boundaries(dir: &Path) -> Result<BoundaryMap, BoundaryError> {
    let files = discovery::boundary_files(dir).map_err(|e| BoundaryError::BadDirectory {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut out = IndexMap::new();
    for f in files {
        let Some(stem) = f.file_stem() else {
            continue;
        };
        let stem = stem.to_string_lossy().into_owned();
        let poly = match read_boundary_file(&f) {
            Ok(poly) => poly,
            Err(e @ BoundaryError::DataError { .. }) => {
                log::warn!("Skipping boundary {stem}: {e}");
                continue;
            }
            Err(e) => return Err(e),
        };
        log::debug!("Read {} vertices for boundary {stem}", poly.len());
        out.insert(stem, poly);
    }
    Ok(out)
}

/// The first `n` lines of a file, without line endings. Fewer are returned if
/// the file is shorter.
pub fn head_lines(path: &Path, n: usize) -> Result<Vec<String>, BoundaryError> {
    let f = File::open(path).map_err(|e| BoundaryError::CouldNotOpen {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    BufReader::new(f)
        .lines()
        .take(n)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| BoundaryError::CouldNotRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}
