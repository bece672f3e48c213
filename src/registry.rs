//! The dataset schema registry.
//!
//! The registry is a YAML document (normally `docs/datasets.yaml`) describing what
//! the campaign's sample files must look like:
//!
//! ```yaml
//! wrf:
//!   dims: {Time: 1, south_north: 201, west_east: 201}
//!   required_vars: [XLAT, XLONG, U10, V10]
//! emissions:
//!   dims: {x: 199, y: 199, LAY: 1}
//!   var: emiss
//! boundaries:
//!   files: [Fairbanks.txt]
//! ```
//!
//! Dimensions are checked in the order written. `var` is shorthand for a single
//! required variable and may be combined with `required_vars`.
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::RegistryError;

pub const DEFAULT_REGISTRY_PATH: &str = "docs/datasets.yaml";

/// Which of the registry's dataset entries a check belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum DatasetKind {
    #[strum(to_string = "WRF")]
    Wrf,
    #[strum(to_string = "Emiss")]
    Emissions,
}

/// Expected dimension sizes and required variables for one kind of dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetSchemaExpectation {
    #[serde(default)]
    dims: IndexMap<String, usize>,
    #[serde(default)]
    required_vars: Vec<String>,
    #[serde(default)]
    var: Option<String>,
}

impl DatasetSchemaExpectation {
    pub fn new<D, V>(dims: D, required_vars: V) -> Self
    where
        D: IntoIterator<Item = (&'static str, usize)>,
        V: IntoIterator<Item = &'static str>,
    {
        Self {
            dims: dims.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            required_vars: required_vars.into_iter().map(|v| v.to_string()).collect(),
            var: None,
        }
    }

    /// Expected exact dimension sizes, in registry order.
    pub fn dims(&self) -> impl Iterator<Item = (&str, usize)> {
        self.dims.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Required variable names: `required_vars` followed by `var`, if given.
    pub fn required_vars(&self) -> impl Iterator<Item = &str> {
        self.required_vars
            .iter()
            .chain(self.var.iter())
            .map(|s| s.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoundaryExpectation {
    #[serde(default)]
    pub files: Vec<String>,
}

/// The whole registry document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub wrf: DatasetSchemaExpectation,
    #[serde(default)]
    pub emissions: DatasetSchemaExpectation,
    #[serde(default)]
    pub boundaries: BoundaryExpectation,
}

impl Registry {
    pub fn from_yaml_str(s: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(s)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, RegistryError> {
        let s = std::fs::read_to_string(path).map_err(|e| RegistryError::CouldNotRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_yaml_str(&s).map_err(|e| RegistryError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn expectation(&self, kind: DatasetKind) -> &DatasetSchemaExpectation {
        match kind {
            DatasetKind::Wrf => &self.wrf,
            DatasetKind::Emissions => &self.emissions,
        }
    }

    /// Names of the expected boundary polygons: each listed file name up to its
    /// first `.`, so `Fairbanks.txt` becomes `Fairbanks`.
    pub fn boundary_names(&self) -> impl Iterator<Item = &str> {
        self.boundaries
            .files
            .iter()
            .map(|f| f.split('.').next().unwrap_or(f))
    }
}
