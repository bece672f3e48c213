//! Small on-disk fixtures shared by the unit tests.
use std::path::{Path, PathBuf};

pub(crate) const FAIRBANKS_POLYGON: &str =
    "Fairbanks North Star Borough\nlon,lat,z\n-147.9,64.7,0\n-147.5,64.7,0\n-147.5,65.0,0\n-147.9,65.0,0\n";

/// Write `contents` to `dir/name`, creating parent directories as needed.
pub(crate) fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let p = dir.join(name);
    if let Some(parent) = p.parent() {
        std::fs::create_dir_all(parent).expect("Creating test parent directory should not fail");
    }
    std::fs::write(&p, contents).expect("Writing test file should not fail");
    p
}

/// Write a small WRF-like output file with a 2 x 3 grid and one time.
#[cfg(feature = "netcdf")]
pub(crate) fn write_wrf_file(path: &Path) -> netcdf::Result<()> {
    let mut file = netcdf::create(path)?;
    file.add_attribute("TITLE", " OUTPUT FROM WRF V4.3 MODEL")?;
    file.add_attribute("TRUELAT1", 64.0f32)?;
    file.add_attribute("TRUELAT2", 65.5f32)?;
    file.add_attribute("STAND_LON", -147.0f32)?;
    file.add_attribute("DX", 1333.33f32)?;
    file.add_attribute("DY", 1333.33f32)?;
    file.add_attribute("MAP_PROJ", 1i32)?;

    file.add_dimension("Time", 1)?;
    file.add_dimension("DateStrLen", 19)?;
    file.add_dimension("south_north", 2)?;
    file.add_dimension("west_east", 3)?;

    let times = ndarray::Array2::from_shape_vec((1, 19), b"2022-02-01_00:00:00".to_vec())
        .expect("Times shape is fixed");
    let mut var = file.add_variable::<u8>("Times", &["Time", "DateStrLen"])?;
    var.put(times.view(), netcdf::Extents::All)?;

    let xlat = ndarray::Array3::from_shape_fn((1, 2, 3), |(_, j, _)| 64.8 + j as f32 * 0.1);
    let mut var = file.add_variable::<f32>("XLAT", &["Time", "south_north", "west_east"])?;
    var.put(xlat.view(), netcdf::Extents::All)?;

    let xlong = ndarray::Array3::from_shape_fn((1, 2, 3), |(_, _, i)| -147.8 + i as f32 * 0.1);
    let mut var = file.add_variable::<f32>("XLONG", &["Time", "south_north", "west_east"])?;
    var.put(xlong.view(), netcdf::Extents::All)?;
    Ok(())
}

/// Write a small IOAPI-like emissions file: 2 hours, 2 layers, 2 x 3 cells.
#[cfg(feature = "netcdf")]
pub(crate) fn write_ioapi_file(path: &Path) -> netcdf::Result<()> {
    let mut file = netcdf::create(path)?;
    file.add_attribute("P_ALP", 64.0f64)?;
    file.add_attribute("P_BET", 65.5f64)?;
    file.add_attribute("P_GAM", -147.0f64)?;
    file.add_attribute("XCELL", 1333.33f64)?;
    file.add_attribute("YCELL", 1333.33f64)?;
    file.add_attribute("NCOLS", 3i32)?;
    file.add_attribute("NROWS", 2i32)?;
    file.add_attribute("NLAYS", 2i32)?;
    file.add_attribute("GDNAM", "NAFA_TEST")?;

    file.add_dimension("time", 2)?;
    file.add_dimension("LAY", 2)?;
    file.add_dimension("y", 2)?;
    file.add_dimension("x", 3)?;

    let emiss = ndarray::Array4::from_shape_fn((2, 2, 2, 3), |(t, l, _, _)| (10 * t + l) as f32);
    let mut var = file.add_variable::<f32>("emiss", &["time", "LAY", "y", "x"])?;
    var.put(emiss.view(), netcdf::Extents::All)?;
    Ok(())
}
