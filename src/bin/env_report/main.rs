use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use error_stack::ResultExt;
use nafa_rs::{env_report::{self, EnvReport}, logging::init_logging};

fn main() -> ExitCode {
    let clargs = Cli::parse();
    init_logging(clargs.verbosity.log_level_filter());
    let report = EnvReport::collect();
    match report.write_json(&clargs.output).change_context_lazy(|| CliError(clargs.output.clone())) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("ERROR: {e:?}");
            ExitCode::FAILURE
        }
    }
}

/// Print and save a JSON description of this build: version, target platform,
/// and which optional features were compiled in.
#[derive(Debug, Parser)]
struct Cli {
    /// Where to write the JSON report
    #[clap(short, long, default_value = env_report::DEFAULT_OUTPUT)]
    output: PathBuf,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[derive(Debug, thiserror::Error)]
#[error("Could not write the environment report to {}", .0.display())]
struct CliError(PathBuf);
