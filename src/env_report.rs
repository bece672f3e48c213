//! A record of how this build of the programs was configured.
use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

pub const DEFAULT_OUTPUT: &str = "outputs/env_report.json";

#[derive(Debug, Clone, Serialize)]
pub struct EnvReport {
    pub package: &'static str,
    pub version: &'static str,
    pub os: &'static str,
    pub arch: &'static str,
    pub family: &'static str,
    /// Cargo features that affect which programs and file formats are available
    pub features: IndexMap<&'static str, bool>,
    pub generated: DateTime<Utc>,
}

impl EnvReport {
    pub fn collect() -> Self {
        let mut features = IndexMap::new();
        features.insert("netcdf", cfg!(feature = "netcdf"));
        features.insert("static", cfg!(feature = "static"));
        features.insert("plotting", cfg!(feature = "plotting"));

        Self {
            package: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            family: std::env::consts::FAMILY,
            features,
            generated: Utc::now(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the report as pretty JSON, creating the parent directory if needed.
    pub fn write_json(&self, path: &Path) -> std::io::Result<String> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, &json)?;
        Ok(json)
    }
}
