//! Locating sample files in the configured campaign directories.
//!
//! All of the helpers here return paths in sorted order so that repeated runs
//! pick the same sample file.
use std::path::{Path, PathBuf};

use itertools::Itertools;

use crate::error::DiscoveryError;

/// WRF output files for the inner (d02) domain.
pub const WRF_PATTERN: &str = "wrfout_d02_*";

/// Emission sector subdirectories, searched in this order for a NetCDF file.
/// The final `.` searches the base directory itself.
pub const EMISSION_SUBDIRS: &[&str] = &[
    "onroad",
    "nonroad",
    "airports",
    "residential_gas",
    "residential_wood",
    ".",
];

pub const NETCDF_PATTERN: &str = "*.nc";
pub const BOUNDARY_PATTERN: &str = "*.txt";
pub const FLEXPART_OUTPUT_PATTERNS: &[&str] = &["flxout_*.nc", "partposit_*", "*.txt"];

/// Find files in `base` matching any of `patterns`.
///
/// The matches from all patterns are combined, de-duplicated, sorted, and the first
/// `limit` returned. If `base` does not exist, an empty list is returned rather than
/// an error. Entries that cannot be read while globbing are skipped.
pub fn pick_files(
    base: &Path,
    patterns: &[&str],
    limit: usize,
) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !base.exists() {
        return Ok(vec![]);
    }

    let escaped_base = glob::Pattern::escape(&base.to_string_lossy());
    let mut found = vec![];
    for pat in patterns {
        let full = format!("{escaped_base}/{pat}");
        let matches = glob::glob(&full).map_err(|e| DiscoveryError::BadPattern {
            pattern: full.clone(),
            reason: e.to_string(),
        })?;
        for entry in matches {
            match entry {
                Ok(p) => found.push(p),
                Err(e) => log::warn!("Skipping unreadable entry while globbing {full}: {e}"),
            }
        }
    }

    Ok(found.into_iter().sorted().dedup().take(limit).collect())
}

/// Return the first (sorted) file in `base` matching the first pattern that
/// matches anything.
pub fn pick_one(base: &Path, patterns: &[&str]) -> Result<Option<PathBuf>, DiscoveryError> {
    for &pat in patterns {
        if let Some(p) = pick_files(base, &[pat], 1)?.pop() {
            return Ok(Some(p));
        }
    }
    Ok(None)
}

/// Find the WRF file to inspect.
///
/// If `sample` names a file that exists in `wrf_dir`, that is used. Otherwise
/// (including when the sample name does not exist, which happens when the sample
/// is a link with colons in its name that did not survive a copy) the first
/// `wrfout_d02_*` file is used.
pub fn find_wrf_file(wrf_dir: &Path, sample: Option<&str>) -> Result<PathBuf, DiscoveryError> {
    if let Some(sample) = sample {
        let candidate = wrf_dir.join(sample);
        if candidate.exists() {
            return Ok(candidate);
        }
        log::info!(
            "WRF sample {} does not exist, searching for {WRF_PATTERN}",
            candidate.display()
        );
    }

    pick_one(wrf_dir, &[WRF_PATTERN])?.ok_or_else(|| DiscoveryError::MissingFile {
        pattern: WRF_PATTERN.to_string(),
        dir: wrf_dir.to_path_buf(),
    })
}

/// Find the emissions file to inspect.
///
/// If `sample` exists relative to `emis_dir` it is used, otherwise the first
/// NetCDF file in the first of [`EMISSION_SUBDIRS`] that contains one.
pub fn find_emissions_file(
    emis_dir: &Path,
    sample: Option<&str>,
) -> Result<PathBuf, DiscoveryError> {
    if let Some(sample) = sample {
        let candidate = emis_dir.join(sample);
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    for sub in EMISSION_SUBDIRS {
        if let Some(f) = pick_one(&emis_dir.join(sub), &[NETCDF_PATTERN])? {
            return Ok(f);
        }
    }

    Err(DiscoveryError::MissingFile {
        pattern: NETCDF_PATTERN.to_string(),
        dir: emis_dir.to_path_buf(),
    })
}

/// All boundary polygon files in `dir`, sorted.
pub fn boundary_files(dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    pick_files(dir, &[BOUNDARY_PATTERN], usize::MAX)
}

/// What is present under the FLEXPART runs root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlexpartListing {
    /// Names of the immediate subdirectories of the runs root, sorted
    pub subdirs: Vec<String>,
    /// A few example outputs from the main run, `None` if the main run directory
    /// does not exist.
    pub main_run_outputs: Option<Vec<String>>,
}

impl FlexpartListing {
    pub const MAX_OUTPUTS: usize = 5;

    /// Scan `runs_dir`, returning `Ok(None)` if it does not exist.
    pub fn scan(runs_dir: &Path, main_rel: &Path) -> std::io::Result<Option<Self>> {
        if !runs_dir.exists() {
            return Ok(None);
        }

        let mut subdirs = vec![];
        for entry in std::fs::read_dir(runs_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                subdirs.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        subdirs.sort();

        let main = runs_dir.join(main_rel);
        let main_run_outputs = if main.exists() {
            let outs = pick_files(&main, FLEXPART_OUTPUT_PATTERNS, Self::MAX_OUTPUTS)
                .map_err(std::io::Error::other)?;
            Some(outs.iter().map(|p| file_name_string(p)).collect())
        } else {
            None
        };

        Ok(Some(Self {
            subdirs,
            main_run_outputs,
        }))
    }
}

/// The final component of `p` as an owned string, or the whole path if it has none.
pub fn file_name_string(p: &Path) -> String {
    p.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| p.display().to_string())
}
