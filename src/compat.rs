//! Coarse check that a WRF grid and an IOAPI emissions grid line up.
//!
//! The comparison is deliberately rough: it only asks whether the Lambert
//! conformal parameters, the cell sizes and the grid counts agree within fixed
//! tolerances. It does not compare grid origins.
//!
//! | check     | WRF          | IOAPI    | tolerance          |
//! |-----------|--------------|----------|--------------------|
//! | `lat1_ok` | `TRUELAT1`   | `P_ALP`  | angle (0.25 deg)   |
//! | `lat2_ok` | `TRUELAT2`   | `P_BET`  | angle              |
//! | `lon_ok`  | `STAND_LON`  | `P_GAM`  | angle              |
//! | `dx_ok`   | `DX`         | `XCELL`  | cell size (100 m)  |
//! | `dy_ok`   | `DY`         | `YCELL`  | cell size          |
//! | `nx_ok`   | `west_east`  | `NCOLS`  | grid cells (5)     |
//! | `ny_ok`   | `south_north`| `NROWS`  | grid cells         |
//!
//! A check is only computed when its inputs are present, with one exception: the
//! three angle checks are computed whenever all three WRF angles are present, and
//! a missing IOAPI angle is taken to be equal to the WRF one. That makes a missing
//! IOAPI angle pass rather than fail. Whether that leniency is intended has not
//! been confirmed; changing it would change which grids are reported compatible,
//! so it is kept as is.
use std::fmt::Display;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::{
    dataset::{AttrValue, CoercionError},
    projection::ProjectionAttributes,
};

pub const DEFAULT_ANGLE_TOL_DEG: f64 = 0.25;
pub const DEFAULT_CELL_TOL: f64 = 100.0;
pub const DEFAULT_GRID_COUNT_TOL: u64 = 5;

/// Tolerances for [`grids_roughly_match`]. All comparisons are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// Allowed difference in the true latitudes and standard longitude, degrees
    pub angle: f64,
    /// Allowed difference in cell size, in the files' distance unit (meters)
    pub cell: f64,
    /// Allowed difference in the number of grid columns or rows
    pub grid_count: u64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            angle: DEFAULT_ANGLE_TOL_DEG,
            cell: DEFAULT_CELL_TOL,
            grid_count: DEFAULT_GRID_COUNT_TOL,
        }
    }
}

/// The individual checks, in the order they are computed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::AsRefStr,
)]
pub enum CheckName {
    #[strum(to_string = "lat1_ok")]
    Lat1,
    #[strum(to_string = "lat2_ok")]
    Lat2,
    #[strum(to_string = "lon_ok")]
    Lon,
    #[strum(to_string = "dx_ok")]
    Dx,
    #[strum(to_string = "dy_ok")]
    Dy,
    #[strum(to_string = "nx_ok")]
    Nx,
    #[strum(to_string = "ny_ok")]
    Ny,
}

/// Result of comparing two grids.
#[derive(Debug, Clone, PartialEq)]
pub struct CompatibilityVerdict {
    checks: IndexMap<CheckName, bool>,
    all_ok: bool,
    coercion_error: Option<CoercionError>,
}

impl CompatibilityVerdict {
    /// The outcome of one check, `None` if it could not be computed.
    pub fn check(&self, name: CheckName) -> Option<bool> {
        self.checks.get(&name).copied()
    }

    /// The computed checks, in computation order.
    pub fn checks(&self) -> impl Iterator<Item = (CheckName, bool)> + '_ {
        self.checks.iter().map(|(&k, &v)| (k, v))
    }

    /// True only if at least one check was computed and every computed check passed.
    pub fn all_ok(&self) -> bool {
        self.all_ok
    }

    /// If a value could not be converted to a number, the reason. The verdict is
    /// always incompatible in that case.
    pub fn coercion_error(&self) -> Option<&CoercionError> {
        self.coercion_error.as_ref()
    }
}

impl Display for CompatibilityVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self
            .checks()
            .map(|(k, v)| format!("{k}: {v}"))
            .chain(std::iter::once(format!("all_ok: {}", self.all_ok)))
            .join(", ");
        write!(f, "{{{inner}}}")
    }
}

/// Compare a WRF grid to an IOAPI grid. See the [module docs](self) for the checks.
///
/// This never fails: a value that cannot be interpreted as a number ends the
/// comparison with `all_ok` false, keeping whichever checks had already been
/// computed.
pub fn grids_roughly_match(
    wrf: &ProjectionAttributes,
    ioapi: &ProjectionAttributes,
    tol: &Tolerances,
) -> CompatibilityVerdict {
    let mut checks = IndexMap::new();
    match run_checks(wrf, ioapi, tol, &mut checks) {
        Ok(()) => {
            let all_ok = !checks.is_empty() && checks.values().all(|&ok| ok);
            CompatibilityVerdict {
                checks,
                all_ok,
                coercion_error: None,
            }
        }
        Err(e) => {
            log::debug!("Grid comparison stopped on a non-numeric value: {e}");
            CompatibilityVerdict {
                checks,
                all_ok: false,
                coercion_error: Some(e),
            }
        }
    }
}

fn run_checks(
    wrf: &ProjectionAttributes,
    ioapi: &ProjectionAttributes,
    tol: &Tolerances,
    checks: &mut IndexMap<CheckName, bool>,
) -> Result<(), CoercionError> {
    if let (Some(lat1), Some(lat2), Some(lon)) = (
        wrf.get("TRUELAT1"),
        wrf.get("TRUELAT2"),
        wrf.get("STAND_LON"),
    ) {
        checks.insert(CheckName::Lat1, angle_ok(lat1, ioapi.get("P_ALP"), tol)?);
        checks.insert(CheckName::Lat2, angle_ok(lat2, ioapi.get("P_BET"), tol)?);
        checks.insert(CheckName::Lon, angle_ok(lon, ioapi.get("P_GAM"), tol)?);
    }

    if let (Some(dx), Some(xcell)) = (wrf.get("DX"), ioapi.get("XCELL")) {
        checks.insert(CheckName::Dx, within(dx.to_f64()?, xcell.to_f64()?, tol.cell));
    }

    if let (Some(dy), Some(ycell)) = (wrf.get("DY"), ioapi.get("YCELL")) {
        checks.insert(CheckName::Dy, within(dy.to_f64()?, ycell.to_f64()?, tol.cell));
    }

    if let (Some(nx), Some(ncols)) = (wrf.get("west_east"), ioapi.get("NCOLS")) {
        checks.insert(CheckName::Nx, count_ok(nx, ncols, tol)?);
    }

    if let (Some(ny), Some(nrows)) = (wrf.get("south_north"), ioapi.get("NROWS")) {
        checks.insert(CheckName::Ny, count_ok(ny, nrows, tol)?);
    }

    Ok(())
}

/// A missing IOAPI angle compares as equal to the WRF angle.
fn angle_ok(
    wrf_val: &AttrValue,
    ioapi_val: Option<&AttrValue>,
    tol: &Tolerances,
) -> Result<bool, CoercionError> {
    let w = wrf_val.to_f64()?;
    let i = ioapi_val.unwrap_or(wrf_val).to_f64()?;
    Ok(within(w, i, tol.angle))
}

fn count_ok(a: &AttrValue, b: &AttrValue, tol: &Tolerances) -> Result<bool, CoercionError> {
    Ok(a.to_i64()?.abs_diff(b.to_i64()?) <= tol.grid_count)
}

fn within(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}
