use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use error_stack::ResultExt;
use nafa_rs::{
    checksums::{self, DigestAlgorithm},
    logging::init_logging,
};

fn main() -> ExitCode {
    let clargs = Cli::parse();
    init_logging(clargs.verbosity.log_level_filter());
    if let Err(e) = driver(&clargs) {
        eprintln!("ERROR: {e:?}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn driver(clargs: &Cli) -> error_stack::Result<(), CliError> {
    let entries = checksums::read_manifest(&clargs.manifest)
        .change_context_lazy(|| CliError::Manifest(clargs.manifest.clone()))?;
    log::info!("Hashing {} sample file(s)", entries.len());

    let rows = checksums::hash_manifest(entries, clargs.algorithm)
        .change_context(CliError::Hashing)?;
    let n_missing = rows.iter().filter(|r| r.digest.is_none()).count();
    if n_missing > 0 {
        log::warn!("{n_missing} sample file(s) listed in the manifest do not exist");
    }

    checksums::write_checksums(&rows, clargs.algorithm, &clargs.output)
        .change_context_lazy(|| CliError::Output(clargs.output.clone()))?;
    println!("Wrote {}", clargs.output.display());
    Ok(())
}

/// Compute checksums of the files listed in the sample manifest.
///
/// The manifest has one `dataset<TAB>path<TAB>why` line per file. Files that
/// do not exist are recorded as MISSING rather than causing an error.
#[derive(Debug, Parser)]
struct Cli {
    /// The tab-separated sample manifest
    #[clap(short, long, default_value = checksums::DEFAULT_MANIFEST)]
    manifest: PathBuf,

    /// Where to write the checksum table
    #[clap(short, long, default_value = checksums::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Digest to compute, "md5" or "sha256"
    #[clap(short, long, default_value_t = DigestAlgorithm::Md5)]
    algorithm: DigestAlgorithm,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Could not read manifest {}", .0.display())]
    Manifest(PathBuf),
    #[error("Could not hash the sample files")]
    Hashing,
    #[error("Could not write checksums to {}", .0.display())]
    Output(PathBuf),
}
