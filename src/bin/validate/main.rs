use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use error_stack::ResultExt;
use nafa_rs::{
    boundaries,
    config::PathConfig,
    dataset::Dataset,
    discovery,
    logging::init_logging,
    registry::{self, DatasetKind, Registry},
    validate,
};

fn main() -> ExitCode {
    let clargs = Cli::parse();
    init_logging(clargs.verbosity.log_level_filter());
    match main_inner(clargs) {
        Ok(()) => {
            println!("validate: OK");
            ExitCode::SUCCESS
        }
        Err(Failure::Invalid(e)) => {
            println!("ERROR: {e}");
            ExitCode::FAILURE
        }
        Err(Failure::Setup(e)) => {
            eprintln!("ERROR: {e:?}");
            ExitCode::FAILURE
        }
    }
}

/// Validation failures are printed as a single line; anything that stops the
/// checks from running at all gets the full report.
enum Failure {
    Invalid(nafa_rs::error::ValidationError),
    Setup(error_stack::Report<CliError>),
}

impl From<error_stack::Report<CliError>> for Failure {
    fn from(value: error_stack::Report<CliError>) -> Self {
        Self::Setup(value)
    }
}

fn main_inner(clargs: Cli) -> Result<(), Failure> {
    let reg = Registry::from_yaml_file(&clargs.registry).change_context(CliError::Registry)?;
    let paths = PathConfig::load(&clargs.root).change_context(CliError::Config)?;

    let wrf_file = discovery::find_wrf_file(&paths.wrf_dir, paths.wrf_sample.as_deref())
        .change_context(CliError::Open(DatasetKind::Wrf))?;
    let ds_w = Dataset::open(&wrf_file).change_context(CliError::Open(DatasetKind::Wrf))?;
    validate::validate_dataset(DatasetKind::Wrf, &ds_w, reg.expectation(DatasetKind::Wrf))
        .map_err(Failure::Invalid)?;

    let emis_file =
        discovery::find_emissions_file(&paths.emissions_dir, paths.emissions_sample.as_deref())
            .change_context(CliError::Open(DatasetKind::Emissions))?;
    let ds_e =
        Dataset::open(&emis_file).change_context(CliError::Open(DatasetKind::Emissions))?;
    validate::validate_dataset(DatasetKind::Emissions, &ds_e, reg.expectation(DatasetKind::Emissions))
        .map_err(Failure::Invalid)?;

    let polys = boundaries::read_boundaries(&paths.boundaries_dir)
        .change_context(CliError::Boundaries)?;
    validate::validate_boundaries(reg.boundary_names(), &polys).map_err(Failure::Invalid)?;
    Ok(())
}

/// Check the sample WRF file, emissions file, and boundary polygons against
/// the dataset registry.
///
/// Stops at the first mismatch, printing it as `ERROR: <message>` and exiting
/// with status 1. Prints `validate: OK` if everything matches.
#[derive(Debug, Parser)]
struct Cli {
    /// Directory containing the path configuration file
    #[clap(short, long, default_value = ".")]
    root: PathBuf,

    /// The dataset registry to check against
    #[clap(long, default_value = registry::DEFAULT_REGISTRY_PATH)]
    registry: PathBuf,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Could not load the dataset registry")]
    Registry,
    #[error("Could not load the path configuration")]
    Config,
    #[error("Could not open the {0} sample file")]
    Open(DatasetKind),
    #[error("Could not read the boundary polygons")]
    Boundaries,
}
