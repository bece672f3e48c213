use std::{
    io::Write,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use error_stack::ResultExt;
use nafa_rs::{
    config::PathConfig,
    discovery::{self, FlexpartListing},
    logging::init_logging,
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
    let mut stdout = std::io::stdout().lock();

    summarize_wrf(&mut stdout, &paths).change_context(CliError::Output)?;
    summarize_emissions(&mut stdout, &paths).change_context(CliError::Output)?;
    summarize_boundaries(&mut stdout, &paths.boundaries_dir).change_context(CliError::Output)?;
    summarize_flexpart_runs(&mut stdout, &paths).change_context(CliError::Output)?;
    writeln!(stdout, "\nDone.").change_context(CliError::Output)?;
    Ok(())
}

/// Sanity check the campaign paths and data.
///
/// Reads `important_paths.yaml` (or `important_paths.txt`) from the given
/// directory, then prints a short summary of one WRF output file, one emissions
/// file, the first few boundary polygons, and the FLEXPART runs directory.
/// Missing data is reported but does not stop the program; only a missing or
/// invalid path configuration is an error.
#[derive(Debug, Parser)]
struct Cli {
    /// Directory containing the path configuration file
    #[clap(short, long, default_value = ".")]
    root: PathBuf,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Could not load the path configuration")]
    Config,
    #[error("Could not write the summary to stdout")]
    Output,
}

fn summarize_wrf<W: Write>(w: &mut W, paths: &PathConfig) -> std::io::Result<()> {
    writeln!(w, "\n[WRF]")?;
    writeln!(w, "dir: {}", paths.wrf_dir.display())?;
    let file = match discovery::find_wrf_file(&paths.wrf_dir, paths.wrf_sample.as_deref()) {
        Ok(f) => f,
        Err(e) => {
            log::debug!("{e}");
            return writeln!(w, "  (no wrfout files found)");
        }
    };
    writeln!(w, "file: {}", file.display())?;
    write_metadata(w, &file, FileKind::Wrf)
}

fn summarize_emissions<W: Write>(w: &mut W, paths: &PathConfig) -> std::io::Result<()> {
    writeln!(w, "\n[Emissions]")?;
    writeln!(w, "dir: {}", paths.emissions_dir.display())?;
    if !paths.emissions_dir.exists() {
        return writeln!(w, "  (dir missing)");
    }
    let file = match discovery::find_emissions_file(
        &paths.emissions_dir,
        paths.emissions_sample.as_deref(),
    ) {
        Ok(f) => f,
        Err(e) => {
            log::debug!("{e}");
            return writeln!(w, "  (no .nc found)");
        }
    };
    writeln!(w, "file: {}", file.display())?;
    write_metadata(w, &file, FileKind::Emissions)
}

fn summarize_boundaries<W: Write>(w: &mut W, dir: &Path) -> std::io::Result<()> {
    writeln!(w, "\n[Boundaries]")?;
    writeln!(w, "dir: {}", dir.display())?;
    summary::write_boundary_heads(w, dir)
}

fn summarize_flexpart_runs<W: Write>(w: &mut W, paths: &PathConfig) -> std::io::Result<()> {
    writeln!(w, "\n[FLEXPART runs]")?;
    writeln!(w, "dir: {}", paths.runs_dir.display())?;
    match FlexpartListing::scan(&paths.runs_dir, &paths.main_run_rel) {
        Ok(listing) => summary::write_flexpart_listing(w, listing.as_ref()),
        Err(e) => writeln!(w, "  ERROR listing runs: {e}"),
    }
}

#[derive(Debug, Clone, Copy, strum::Display)]
enum FileKind {
    #[strum(to_string = "WRF")]
    Wrf,
    #[strum(to_string = "emissions")]
    Emissions,
}

#[cfg(feature = "netcdf")]
fn write_metadata<W: Write>(w: &mut W, file: &Path, kind: FileKind) -> std::io::Result<()> {
    use nafa_rs::dataset::{read_char_rows, Dataset};

    let ds = match Dataset::open(file) {
        Ok(ds) => ds,
        Err(e) => return writeln!(w, "  ERROR opening {kind}: {e}"),
    };
    summary::write_dataset_summary(w, &ds)?;

    match kind {
        FileKind::Wrf if ds.has_variable("Times") => match read_char_rows(file, "Times", 3) {
            Ok(times) => writeln!(w, "Times sample (first 3): {}", summary::format_list(times)),
            Err(e) => writeln!(w, "  ERROR reading Times: {e}"),
        },
        FileKind::Wrf => Ok(()),
        FileKind::Emissions => summary::write_ioapi_attrs(w, &ds),
    }
}

#[cfg(not(feature = "netcdf"))]
fn write_metadata<W: Write>(w: &mut W, _file: &Path, kind: FileKind) -> std::io::Result<()> {
    log::debug!("Built without the netcdf feature, cannot open the {kind} file");
    writeln!(w, "  netCDF support not compiled in; skipping metadata open.")
}
