use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use error_stack::ResultExt;
use nafa_rs::{
    boundaries,
    compat::{self, Tolerances},
    config::PathConfig,
    dataset::Dataset,
    discovery,
    logging::init_logging,
    projection::ProjectionAttributes,
    summary,
};

fn main() -> ExitCode {
    let clargs = Cli::parse();
    init_logging(clargs.verbosity.log_level_filter());
    if let Err(e) = main_inner(clargs) {
        eprintln!("ERROR: {e:?}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn main_inner(clargs: Cli) -> error_stack::Result<(), CliError> {
    let paths = PathConfig::load(&clargs.root).change_context(CliError::Config)?;
    println!("Paths: {paths:?}");

    let wrf_file = discovery::find_wrf_file(&paths.wrf_dir, paths.wrf_sample.as_deref())
        .change_context(CliError::Wrf)?;
    let ds_w = Dataset::open(&wrf_file).change_context(CliError::Wrf)?;
    let wrf_attrs = ProjectionAttributes::from_wrf(&ds_w);
    println!("\nWRF attrs: {wrf_attrs}");
    println!("WRF dims: {}", summary::format_dims(ds_w.dimensions()));

    let emis_file =
        discovery::find_emissions_file(&paths.emissions_dir, paths.emissions_sample.as_deref())
            .change_context(CliError::Emissions)?;
    let ds_e = Dataset::open(&emis_file).change_context(CliError::Emissions)?;
    let emi_attrs = ProjectionAttributes::from_ioapi(&ds_e);
    println!("\nEmissions attrs: {emi_attrs}");
    println!("Emissions dims: {}", summary::format_dims(ds_e.dimensions()));

    let tol = Tolerances {
        angle: clargs.angle_tol,
        cell: clargs.cell_tol,
        grid_count: clargs.grid_tol,
    };
    let verdict = compat::grids_roughly_match(&wrf_attrs, &emi_attrs, &tol);
    println!("\nGrid-compat verdict: {verdict}");
    if let Some(e) = verdict.coercion_error() {
        log::warn!("Grid comparison stopped early: {e}");
    }

    let polys = boundaries::read_boundaries(&paths.boundaries_dir)
        .change_context(CliError::Boundaries)?;
    println!("\nBoundaries:\n{}", summary::boundary_shape_table(&polys));
    Ok(())
}

/// Report the WRF and emissions projection attributes, a rough grid
/// compatibility verdict, and the boundary polygons found.
///
/// Unlike `check_data`, a missing WRF file, emissions file, or boundary
/// directory is an error here.
#[derive(Debug, Parser)]
struct Cli {
    /// Directory containing the path configuration file
    #[clap(short, long, default_value = ".")]
    root: PathBuf,

    /// Allowed difference in true latitudes and standard longitude, in degrees
    #[clap(long, default_value_t = compat::DEFAULT_ANGLE_TOL_DEG)]
    angle_tol: f64,

    /// Allowed difference in grid cell size, in meters
    #[clap(long, default_value_t = compat::DEFAULT_CELL_TOL)]
    cell_tol: f64,

    /// Allowed difference in the number of grid columns or rows
    #[clap(long, default_value_t = compat::DEFAULT_GRID_COUNT_TOL)]
    grid_tol: u64,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Could not load the path configuration")]
    Config,
    #[error("Could not open the WRF sample file")]
    Wrf,
    #[error("Could not open the emissions sample file")]
    Emissions,
    #[error("Could not read the boundary polygons")]
    Boundaries,
}
