//! Campaign path configuration.
//!
//! The programs find their data through a small path document in the working
//! directory. The preferred form is `important_paths.yaml`:
//!
//! ```yaml
//! wrf:
//!   campaign_dir: /data/wrf/nafa8
//!   sample_file: wrfout_d02_2022-02-01_00:00:00
//! emissions:
//!   base_dir: /data/emissions/2022
//!   sample_file: onroad/emis_20220201.nc
//! flexpart:
//!   runs_dir: /data/flexpart/runs
//!   main_run: test_backward_CTC/first_trial
//! boundaries:
//!   dir: /data/boundaries
//! ```
//!
//! `sample_file` and `main_run` are optional. Any value may be overridden from the
//! environment with a `NAFA_` prefix and `__` between levels, e.g.
//! `NAFA_WRF__CAMPAIGN_DIR=/scratch/wrf`.
//!
//! If the YAML file is absent, `important_paths.txt` is read instead. That file
//! holds `KEY=VALUE` lines (blank lines and lines starting with `#` are ignored)
//! and must define `WRF_CAMPAIGN_DIR`, `EMISSION_DIR`, `FLEX_RUNS_DIR` and
//! `BOUNDARIES_DIR`. It has no way to name sample files.
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::Deserialize;

use crate::error::ConfigError;

pub const YAML_CONFIG_NAME: &str = "important_paths.yaml";
pub const TXT_CONFIG_NAME: &str = "important_paths.txt";
pub const ENV_PREFIX: &str = "NAFA_";
pub const DEFAULT_MAIN_RUN: &str = "test_backward_CTC/first_trial";

/// The four campaign locations every program works from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathConfig {
    pub wrf_dir: PathBuf,
    pub wrf_sample: Option<String>,
    pub emissions_dir: PathBuf,
    pub emissions_sample: Option<String>,
    pub runs_dir: PathBuf,
    pub main_run_rel: PathBuf,
    pub boundaries_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct YamlDoc {
    wrf: WrfSection,
    emissions: EmissionsSection,
    flexpart: FlexpartSection,
    boundaries: BoundariesSection,
}

#[derive(Debug, Deserialize)]
struct WrfSection {
    campaign_dir: PathBuf,
    #[serde(default)]
    sample_file: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmissionsSection {
    base_dir: PathBuf,
    #[serde(default)]
    sample_file: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FlexpartSection {
    runs_dir: PathBuf,
    #[serde(default)]
    main_run: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct BoundariesSection {
    dir: PathBuf,
}

impl From<YamlDoc> for PathConfig {
    fn from(doc: YamlDoc) -> Self {
        Self {
            wrf_dir: doc.wrf.campaign_dir,
            wrf_sample: doc.wrf.sample_file,
            emissions_dir: doc.emissions.base_dir,
            emissions_sample: doc.emissions.sample_file,
            runs_dir: doc.flexpart.runs_dir,
            main_run_rel: doc
                .flexpart
                .main_run
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MAIN_RUN)),
            boundaries_dir: doc.boundaries.dir,
        }
    }
}

impl PathConfig {
    /// Load the configuration from `root`, preferring the YAML document over the
    /// plain text one.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let yml = root.join(YAML_CONFIG_NAME);
        let txt = root.join(TXT_CONFIG_NAME);

        if yml.exists() {
            log::debug!("Reading path configuration from {}", yml.display());
            Self::from_yaml_file(&yml)
        } else if txt.exists() {
            log::debug!("Reading path configuration from {}", txt.display());
            Self::from_txt_file(&txt)
        } else {
            Err(ConfigError::MissingConfiguration(root.to_path_buf()))
        }
    }

    /// Load from the current working directory.
    pub fn load_from_cwd() -> Result<Self, ConfigError> {
        Self::load(Path::new("."))
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::from_figment(figment, path)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new().merge(Yaml::string(s));
        Self::from_figment(figment, Path::new("<string>"))
    }

    fn from_figment(figment: Figment, path: &Path) -> Result<Self, ConfigError> {
        let doc: YamlDoc = figment.extract().map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(doc.into())
    }

    pub fn from_txt_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::CouldNotRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_txt_str(&contents, path)
    }

    /// Parse the `KEY=VALUE` form. `path` is only used in error messages.
    pub fn from_txt_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw = parse_key_values(contents);
        let get = |key: &'static str| -> Result<PathBuf, ConfigError> {
            raw.get(key)
                .map(PathBuf::from)
                .ok_or_else(|| ConfigError::MissingKey {
                    path: path.to_path_buf(),
                    key,
                })
        };

        Ok(Self {
            wrf_dir: get("WRF_CAMPAIGN_DIR")?,
            wrf_sample: None,
            emissions_dir: get("EMISSION_DIR")?,
            emissions_sample: None,
            runs_dir: get("FLEX_RUNS_DIR")?,
            main_run_rel: PathBuf::from(DEFAULT_MAIN_RUN),
            boundaries_dir: get("BOUNDARIES_DIR")?,
        })
    }

    /// The main FLEXPART run directory, i.e. the runs root joined with the relative
    /// main run path.
    pub fn main_run_dir(&self) -> PathBuf {
        self.runs_dir.join(&self.main_run_rel)
    }
}

fn parse_key_values(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    static FULL_YAML: &str = r#"
wrf:
  campaign_dir: /data/wrf
  sample_file: wrfout_d02_2022-02-01_00:00:00
emissions:
  base_dir: /data/emis
flexpart:
  runs_dir: /data/flex
  main_run: backward/run1
boundaries:
  dir: /data/bounds
"#;

    #[test]
    fn test_yaml_config() {
        let cfg = PathConfig::from_yaml_str(FULL_YAML).unwrap();
        assert_eq!(cfg.wrf_dir, PathBuf::from("/data/wrf"));
        assert_eq!(
            cfg.wrf_sample.as_deref(),
            Some("wrfout_d02_2022-02-01_00:00:00")
        );
        assert_eq!(cfg.emissions_dir, PathBuf::from("/data/emis"));
        assert!(cfg.emissions_sample.is_none());
        assert_eq!(cfg.main_run_dir(), PathBuf::from("/data/flex/backward/run1"));
        assert_eq!(cfg.boundaries_dir, PathBuf::from("/data/bounds"));
    }

    #[test]
    fn test_yaml_default_main_run() {
        let s = FULL_YAML.replace("  main_run: backward/run1\n", "");
        let cfg = PathConfig::from_yaml_str(&s).unwrap();
        assert_eq!(cfg.main_run_rel, PathBuf::from(DEFAULT_MAIN_RUN));
    }

    #[test]
    fn test_yaml_missing_section() {
        let s = FULL_YAML.replace("boundaries:\n  dir: /data/bounds\n", "");
        let err = PathConfig::from_yaml_str(&s).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }), "got {err:?}");
    }

    #[test]
    fn test_txt_config() {
        let s = "# campaign paths\n\nWRF_CAMPAIGN_DIR = /data/wrf\nEMISSION_DIR=/data/emis\nFLEX_RUNS_DIR=/data/flex\nBOUNDARIES_DIR=/data/b=c\n";
        let cfg = PathConfig::from_txt_str(s, Path::new("important_paths.txt")).unwrap();
        assert_eq!(cfg.wrf_dir, PathBuf::from("/data/wrf"));
        assert_eq!(cfg.boundaries_dir, PathBuf::from("/data/b=c"));
        assert!(cfg.wrf_sample.is_none());
        assert_eq!(cfg.main_run_rel, PathBuf::from(DEFAULT_MAIN_RUN));
    }

    #[rstest]
    #[case("WRF_CAMPAIGN_DIR")]
    #[case("EMISSION_DIR")]
    #[case("FLEX_RUNS_DIR")]
    #[case("BOUNDARIES_DIR")]
    fn test_txt_missing_key(#[case] missing: &'static str) {
        let s: String = ["WRF_CAMPAIGN_DIR", "EMISSION_DIR", "FLEX_RUNS_DIR", "BOUNDARIES_DIR"]
            .iter()
            .filter(|&&k| k != missing)
            .map(|k| format!("{k}=/x\n"))
            .collect();
        let err = PathConfig::from_txt_str(&s, Path::new("p.txt")).unwrap_err();
        match err {
            ConfigError::MissingKey { key, .. } => assert_eq!(key, missing),
            e => panic!("Expected MissingKey, got {e:?}"),
        }
    }

    #[test]
    fn test_load_prefers_yaml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(YAML_CONFIG_NAME), FULL_YAML).unwrap();
        std::fs::write(
            dir.path().join(TXT_CONFIG_NAME),
            "WRF_CAMPAIGN_DIR=/other\nEMISSION_DIR=/o\nFLEX_RUNS_DIR=/o\nBOUNDARIES_DIR=/o\n",
        )
        .unwrap();
        let cfg = PathConfig::load(dir.path()).unwrap();
        assert_eq!(cfg.emissions_dir, PathBuf::from("/data/emis"));
    }

    #[test]
    fn test_load_falls_back_to_txt() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(TXT_CONFIG_NAME),
            "WRF_CAMPAIGN_DIR=/w\nEMISSION_DIR=/e\nFLEX_RUNS_DIR=/f\nBOUNDARIES_DIR=/b\n",
        )
        .unwrap();
        let cfg = PathConfig::load(dir.path()).unwrap();
        assert_eq!(cfg.runs_dir, PathBuf::from("/f"));
    }

    #[test]
    fn test_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = PathConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingConfiguration(_)));
    }
}
