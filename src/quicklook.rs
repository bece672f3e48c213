//! Array preparation for the emissions quicklook plot.
use ndarray::{s, Array2, ArrayD, ArrayView2, ArrayViewD, Axis, Ix2, Zip};

/// Name of the emissions time dimension
pub const TIME_DIM: &str = "time";
/// Name of the WRF time dimension
pub const WRF_TIME_DIM: &str = "Time";
/// Name of the emissions layer dimension, summed over when present
pub const LAYER_DIM: &str = "LAY";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum QuicklookError {
    #[error("Hour {hour} is out of range for a time dimension of length {ntimes}")]
    HourOutOfRange { hour: usize, ntimes: usize },
    #[error("Expected a 2D field after selecting the hour and summing layers, got dimensions {0:?}")]
    NotTwoDimensional(Vec<String>),
    #[error("Cannot crop a {from:?} grid to the larger shape {to:?}")]
    CropTooLarge { from: (usize, usize), to: (usize, usize) },
}

/// Select hour `hour` of an emissions variable and sum over [`LAYER_DIM`] if it
/// has one. `dims` are the variable's dimension names, in order.
pub fn emissions_at_hour(
    values: ArrayViewD<f64>,
    dims: &[String],
    hour: usize,
) -> Result<Array2<f64>, QuicklookError> {
    let (mut field, mut dims) = select_time(values.to_owned(), dims, TIME_DIM, hour)?;

    if let Some(ilay) = dims.iter().position(|d| d == LAYER_DIM) {
        field = field.sum_axis(Axis(ilay));
        dims.remove(ilay);
    }

    into_2d(field, dims)
}

/// The first time of a WRF coordinate variable such as `XLAT`.
pub fn wrf_coordinate(values: ArrayViewD<f64>, dims: &[String]) -> Result<Array2<f64>, QuicklookError> {
    let (field, dims) = select_time(values.to_owned(), dims, WRF_TIME_DIM, 0)?;
    into_2d(field, dims)
}

/// Index `time_dim` at `index`, if the variable has that dimension.
fn select_time(
    field: ArrayD<f64>,
    dims: &[String],
    time_dim: &str,
    index: usize,
) -> Result<(ArrayD<f64>, Vec<String>), QuicklookError> {
    let mut dims = dims.to_vec();
    let Some(itime) = dims.iter().position(|d| d == time_dim) else {
        return Ok((field, dims));
    };

    let ntimes = field.len_of(Axis(itime));
    if index >= ntimes {
        return Err(QuicklookError::HourOutOfRange { hour: index, ntimes });
    }
    dims.remove(itime);
    Ok((field.index_axis_move(Axis(itime), index), dims))
}

fn into_2d(field: ArrayD<f64>, dims: Vec<String>) -> Result<Array2<f64>, QuicklookError> {
    field
        .into_dimensionality::<Ix2>()
        .map_err(|_| QuicklookError::NotTwoDimensional(dims))
}

/// Take the centered `shape` window of `arr`, trimming evenly from each side
/// (the extra row or column, if any, comes off the end).
pub fn center_crop<T>(
    arr: ArrayView2<'_, T>,
    shape: (usize, usize),
) -> Result<ArrayView2<'_, T>, QuicklookError> {
    let (ny, nx) = arr.dim();
    let (ny_to, nx_to) = shape;
    if ny_to > ny || nx_to > nx {
        return Err(QuicklookError::CropTooLarge {
            from: (ny, nx),
            to: shape,
        });
    }

    let dy = (ny - ny_to) / 2;
    let dx = (nx - nx_to) / 2;
    Ok(arr.slice_move(s![dy..dy + ny_to, dx..dx + nx_to]))
}

/// Replace values outside `mask` with NaN.
pub fn apply_mask(data: ArrayView2<f64>, mask: ArrayView2<bool>) -> Array2<f64> {
    Zip::from(&data)
        .and(&mask)
        .map_collect(|&v, &inside| if inside { v } else { f64::NAN })
}

/// Longitude and latitude ranges, `((lon_min, lon_max), (lat_min, lat_max))`,
/// covered by the finite values of `data`. `None` if none are finite.
pub fn finite_extent(
    lon: ArrayView2<f64>,
    lat: ArrayView2<f64>,
    data: ArrayView2<f64>,
) -> Option<((f64, f64), (f64, f64))> {
    let mut extent: Option<((f64, f64), (f64, f64))> = None;
    Zip::from(&lon).and(&lat).and(&data).for_each(|&x, &y, &v| {
        if !v.is_finite() {
            return;
        }
        extent = Some(match extent {
            None => ((x, x), (y, y)),
            Some(((x0, x1), (y0, y1))) => ((x0.min(x), x1.max(x)), (y0.min(y), y1.max(y))),
        });
    });
    extent
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array, Array4};

    fn dims(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_emissions_at_hour_sums_layers() {
        // (time, LAY, y, x) = (2, 3, 2, 2), value = 10*t + l
        let arr = Array4::from_shape_fn((2, 3, 2, 2), |(t, l, _, _)| (10 * t + l) as f64);
        let field = emissions_at_hour(arr.view().into_dyn(), &dims(&["time", "LAY", "y", "x"]), 1).unwrap();
        assert_eq!(field.dim(), (2, 2));
        assert_eq!(field, Array2::from_elem((2, 2), 33.0));
    }

    #[test]
    fn test_emissions_without_layers() {
        let arr = Array::from_shape_fn((3, 2, 4), |(t, _, _)| t as f64);
        let field = emissions_at_hour(arr.view().into_dyn(), &dims(&["time", "y", "x"]), 0).unwrap();
        assert_eq!(field.dim(), (2, 4));
        assert_abs_diff_eq!(field.sum(), 0.0);
    }

    #[test]
    fn test_emissions_errors() {
        let arr = Array::<f64, _>::zeros((2, 1, 2, 2));
        let dnames = dims(&["time", "LAY", "y", "x"]);
        assert_eq!(
            emissions_at_hour(arr.view().into_dyn(), &dnames, 2).unwrap_err(),
            QuicklookError::HourOutOfRange { hour: 2, ntimes: 2 }
        );

        let arr = Array::<f64, _>::zeros((2, 2, 2));
        assert!(matches!(
            emissions_at_hour(arr.view().into_dyn(), &dims(&["z", "y", "x"]), 0),
            Err(QuicklookError::NotTwoDimensional(_))
        ));
    }

    #[test]
    fn test_wrf_coordinate() {
        let arr = Array::from_shape_fn((2, 2, 3), |(t, j, _)| 64.0 + t as f64 + 0.1 * j as f64);
        let xlat = wrf_coordinate(arr.view().into_dyn(), &dims(&["Time", "south_north", "west_east"])).unwrap();
        assert_eq!(xlat.dim(), (2, 3));
        assert_abs_diff_eq!(xlat[[1, 2]], 64.1, epsilon = 1e-12);
    }

    #[test]
    fn test_center_crop() {
        let arr = Array2::from_shape_fn((201, 201), |(i, j)| (i * 1000 + j) as f64);
        let cropped = center_crop(arr.view(), (199, 199)).unwrap();
        assert_eq!(cropped.dim(), (199, 199));
        assert_abs_diff_eq!(cropped[[0, 0]], 1001.0);

        let same = center_crop(arr.view(), (201, 201)).unwrap();
        assert_eq!(same, arr.view());

        assert!(center_crop(arr.view(), (202, 10)).is_err());
    }

    #[test]
    fn test_mask_and_extent() {
        let lon = array![[-148.0, -147.0], [-148.0, -147.0]];
        let lat = array![[64.0, 64.0], [65.0, 65.0]];
        let data = array![[1.0, 2.0], [3.0, f64::NAN]];
        let mask = array![[true, false], [true, true]];

        let masked = apply_mask(data.view(), mask.view());
        assert!(masked[[0, 1]].is_nan());
        assert_abs_diff_eq!(masked[[1, 0]], 3.0);

        let ((x0, x1), (y0, y1)) = finite_extent(lon.view(), lat.view(), masked.view()).unwrap();
        assert_abs_diff_eq!(x0, -148.0);
        assert_abs_diff_eq!(x1, -148.0);
        assert_abs_diff_eq!(y0, 64.0);
        assert_abs_diff_eq!(y1, 65.0);

        let all_nan = Array2::from_elem((2, 2), f64::NAN);
        assert!(finite_extent(lon.view(), lat.view(), all_nan.view()).is_none());
    }
}
