//! Common errors across the nafa-rs crate
use std::path::PathBuf;

/// Errors related to finding and reading the campaign path configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No important_paths.yaml or important_paths.txt found in {}", .0.display())]
    MissingConfiguration(PathBuf),
    #[error("Could not read configuration file {}: {reason}", path.display())]
    CouldNotRead { path: PathBuf, reason: String },
    #[error("Error parsing configuration file {}: {reason}", path.display())]
    ParseError { path: PathBuf, reason: String },
    #[error("Configuration file {} does not define the required key {key}", path.display())]
    MissingKey { path: PathBuf, key: &'static str },
}

/// Errors from locating sample files by naming pattern
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("No {pattern} file found in {}", dir.display())]
    MissingFile { pattern: String, dir: PathBuf },
    #[error("Invalid glob pattern {pattern}: {reason}")]
    BadPattern { pattern: String, reason: String },
}

/// Errors from opening a dataset and reading its metadata
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Could not open dataset {}: {reason}", path.display())]
    CouldNotOpen { path: PathBuf, reason: String },
    #[error("Could not read {what} from {}: {reason}", path.display())]
    CouldNotRead {
        path: PathBuf,
        what: String,
        reason: String,
    },
    #[error("Variable {var} not found in {}", path.display())]
    VariableNotFound { path: PathBuf, var: String },
}

/// Errors from reading boundary polygon text files
#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    #[error("Could not open boundary file {}: {reason}", path.display())]
    CouldNotOpen { path: PathBuf, reason: String },
    #[error("Could not read from {} because: {reason}", path.display())]
    CouldNotRead { path: PathBuf, reason: String },
    #[error("Error in data format of {} on line {line}: {cause}", path.display())]
    DataError {
        path: PathBuf,
        line: usize,
        cause: String,
    },
    #[error("Boundary directory {} could not be listed: {reason}", path.display())]
    BadDirectory { path: PathBuf, reason: String },
}

/// Errors from loading the dataset schema registry
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Could not read registry file {}: {reason}", path.display())]
    CouldNotRead { path: PathBuf, reason: String },
    #[error("Error parsing registry file {}: {reason}", path.display())]
    ParseError { path: PathBuf, reason: String },
}

/// A single validation failure. Validation stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{kind} dim mismatch {dim}: got {} expected {expected}", fmt_opt(.actual))]
    DimensionMismatch {
        kind: String,
        dim: String,
        expected: usize,
        actual: Option<usize>,
    },
    #[error("Missing {kind} var: {var}")]
    MissingVariable { kind: String, var: String },
    #[error("Boundary missing: {0}")]
    MissingBoundary(String),
}

fn fmt_opt(v: &Option<usize>) -> String {
    match v {
        Some(n) => n.to_string(),
        None => "nothing".to_string(),
    }
}

/// Errors from reading the sample manifest and hashing its files
#[derive(Debug, thiserror::Error)]
pub enum ChecksumError {
    #[error("Could not read manifest {}: {reason}", path.display())]
    CouldNotRead { path: PathBuf, reason: String },
    #[error("Manifest {} line {line} does not have three tab-separated fields", path.display())]
    BadManifestLine { path: PathBuf, line: usize },
    #[error("Error hashing {}: {reason}", path.display())]
    HashError { path: PathBuf, reason: String },
    #[error("Could not write checksums to {}: {reason}", path.display())]
    CouldNotWrite { path: PathBuf, reason: String },
}
