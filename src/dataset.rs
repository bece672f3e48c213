//! In-memory view of a dataset's metadata.
//!
//! Every check in this crate works on a [`Dataset`]: the global attributes, the
//! dimension sizes and the variable names of one file. None of them need the
//! data arrays, so opening a file (with the `netcdf` feature) reads only the
//! metadata and closes it again before returning. The quicklook plot reads the
//! few arrays it needs separately with [`read_variable_f64`].
use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;

#[cfg(feature = "netcdf")]
use crate::error::DatasetError;

/// A global attribute value, in its native type.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Str(String),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
    Strs(Vec<String>),
}

/// Why an attribute value could not be used as a number.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoercionError {
    #[error("'{0}' is not a number")]
    NotNumeric(String),
    #[error("'{0}' is not an integer")]
    NotInteger(String),
    #[error("cannot convert non-finite value {0} to an integer")]
    NonFinite(f64),
    #[error("expected a single value, got {0} values")]
    NotScalar(usize),
}

impl AttrValue {
    /// Convert to a float. Strings are parsed after trimming whitespace and
    /// single-element lists are unwrapped.
    pub fn to_f64(&self) -> Result<f64, CoercionError> {
        match self {
            AttrValue::Int(i) => Ok(*i as f64),
            AttrValue::Float(f) => Ok(*f),
            AttrValue::Str(s) => parse_f64(s),
            AttrValue::Ints(v) => single(v).map(|i| *i as f64),
            AttrValue::Floats(v) => single(v).copied(),
            AttrValue::Strs(v) => single(v).and_then(|s| parse_f64(s)),
        }
    }

    /// Convert to an integer. Floats are truncated toward zero; strings must
    /// hold an integer literal.
    pub fn to_i64(&self) -> Result<i64, CoercionError> {
        match self {
            AttrValue::Int(i) => Ok(*i),
            AttrValue::Float(f) => truncate(*f),
            AttrValue::Str(s) => parse_i64(s),
            AttrValue::Ints(v) => single(v).copied(),
            AttrValue::Floats(v) => single(v).and_then(|f| truncate(*f)),
            AttrValue::Strs(v) => single(v).and_then(|s| parse_i64(s)),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let AttrValue::Str(s) = self {
            Some(s)
        } else {
            None
        }
    }
}

fn single<T>(v: &[T]) -> Result<&T, CoercionError> {
    match v {
        [x] => Ok(x),
        _ => Err(CoercionError::NotScalar(v.len())),
    }
}

fn parse_f64(s: &str) -> Result<f64, CoercionError> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| CoercionError::NotNumeric(s.to_string()))
}

fn parse_i64(s: &str) -> Result<i64, CoercionError> {
    s.trim()
        .parse::<i64>()
        .map_err(|_| CoercionError::NotInteger(s.to_string()))
}

fn truncate(f: f64) -> Result<i64, CoercionError> {
    if f.is_finite() {
        Ok(f.trunc() as i64)
    } else {
        Err(CoercionError::NonFinite(f))
    }
}

impl Display for AttrValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrValue::Int(i) => write!(f, "{i}"),
            AttrValue::Float(v) => write!(f, "{v:?}"),
            AttrValue::Str(s) => write!(f, "{s}"),
            AttrValue::Ints(v) => write!(f, "[{}]", v.iter().join(", ")),
            AttrValue::Floats(v) => write!(f, "[{}]", v.iter().map(|x| format!("{x:?}")).join(", ")),
            AttrValue::Strs(v) => write!(f, "[{}]", v.iter().join(", ")),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for AttrValue {
    fn from(value: f32) -> Self {
        Self::Float(value.into())
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<f64>> for AttrValue {
    fn from(value: Vec<f64>) -> Self {
        Self::Floats(value)
    }
}

impl From<Vec<i64>> for AttrValue {
    fn from(value: Vec<i64>) -> Self {
        Self::Ints(value)
    }
}

#[cfg(feature = "netcdf")]
impl From<netcdf::AttributeValue> for AttrValue {
    fn from(value: netcdf::AttributeValue) -> Self {
        use netcdf::AttributeValue as NcAttr;

        fn ints<T: Into<i64>>(v: Vec<T>) -> AttrValue {
            AttrValue::Ints(v.into_iter().map(Into::into).collect())
        }

        match value {
            NcAttr::Uchar(v) => Self::Int(v.into()),
            NcAttr::Uchars(v) => ints(v),
            NcAttr::Schar(v) => Self::Int(v.into()),
            NcAttr::Schars(v) => ints(v),
            NcAttr::Ushort(v) => Self::Int(v.into()),
            NcAttr::Ushorts(v) => ints(v),
            NcAttr::Short(v) => Self::Int(v.into()),
            NcAttr::Shorts(v) => ints(v),
            NcAttr::Uint(v) => Self::Int(v.into()),
            NcAttr::Uints(v) => ints(v),
            NcAttr::Int(v) => Self::Int(v.into()),
            NcAttr::Ints(v) => ints(v),
            NcAttr::Ulonglong(v) => i64::try_from(v)
                .map(Self::Int)
                .unwrap_or(Self::Float(v as f64)),
            NcAttr::Ulonglongs(v) => {
                Self::Floats(v.into_iter().map(|x| x as f64).collect())
            }
            NcAttr::Longlong(v) => Self::Int(v),
            NcAttr::Longlongs(v) => Self::Ints(v),
            NcAttr::Float(v) => Self::Float(v.into()),
            NcAttr::Floats(v) => Self::Floats(v.into_iter().map(f64::from).collect()),
            NcAttr::Double(v) => Self::Float(v),
            NcAttr::Doubles(v) => Self::Floats(v),
            NcAttr::Str(v) => Self::Str(v),
            NcAttr::Strs(v) => Self::Strs(v),
        }
    }
}

/// The metadata of one opened file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    path: Option<PathBuf>,
    attributes: IndexMap<String, AttrValue>,
    dimensions: IndexMap<String, usize>,
    variables: IndexSet<String>,
}

impl Dataset {
    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::default()
    }

    /// Read the global attributes, dimensions and variable names of a NetCDF file.
    #[cfg(feature = "netcdf")]
    pub fn open(path: &Path) -> Result<Self, DatasetError> {
        let file = netcdf::open(path).map_err(|e| DatasetError::CouldNotOpen {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut attributes = IndexMap::new();
        for attr in file.attributes() {
            let value = attr.value().map_err(|e| DatasetError::CouldNotRead {
                path: path.to_path_buf(),
                what: format!("attribute {}", attr.name()),
                reason: e.to_string(),
            })?;
            attributes.insert(attr.name().to_string(), AttrValue::from(value));
        }

        let dimensions = file
            .dimensions()
            .map(|d| (d.name().to_string(), d.len()))
            .collect();
        let variables = file.variables().map(|v| v.name().to_string()).collect();

        log::debug!("Read metadata from {}", path.display());
        Ok(Self {
            path: Some(path.to_path_buf()),
            attributes,
            dimensions,
            variables,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn attributes(&self) -> &IndexMap<String, AttrValue> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    pub fn dimensions(&self) -> &IndexMap<String, usize> {
        &self.dimensions
    }

    pub fn dimension(&self, name: &str) -> Option<usize> {
        self.dimensions.get(name).copied()
    }

    /// All variable names, coordinate variables included.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|s| s.as_str())
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains(name)
    }

    /// Variables that are not coordinate variables (i.e. whose name is not also a
    /// dimension name).
    pub fn data_variables(&self) -> impl Iterator<Item = &str> {
        self.variables()
            .filter(|v| !self.dimensions.contains_key(*v))
    }
}

#[derive(Debug, Default)]
pub struct DatasetBuilder {
    inner: Dataset,
}

impl DatasetBuilder {
    pub fn path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.inner.path = Some(path.into());
        self
    }

    pub fn attr<V: Into<AttrValue>>(mut self, name: &str, value: V) -> Self {
        self.inner.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn dim(mut self, name: &str, size: usize) -> Self {
        self.inner.dimensions.insert(name.to_string(), size);
        self
    }

    pub fn var(mut self, name: &str) -> Self {
        self.inner.variables.insert(name.to_string());
        self
    }

    pub fn build(self) -> Dataset {
        self.inner
    }
}

/// Read the first `n` rows of a character variable (e.g. WRF `Times`) as strings.
#[cfg(feature = "netcdf")]
pub fn read_char_rows(path: &Path, var_name: &str, n: usize) -> Result<Vec<String>, DatasetError> {
    let file = netcdf::open(path).map_err(|e| DatasetError::CouldNotOpen {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let var = file
        .variable(var_name)
        .ok_or_else(|| DatasetError::VariableNotFound {
            path: path.to_path_buf(),
            var: var_name.to_string(),
        })?;

    let chars = var
        .get::<u8, _>(netcdf::Extents::All)
        .map_err(|e| DatasetError::CouldNotRead {
            path: path.to_path_buf(),
            what: format!("variable {var_name}"),
            reason: e.to_string(),
        })?;

    let rows = if chars.ndim() < 2 {
        vec![bytes_to_string(chars.iter().copied())]
    } else {
        chars
            .outer_iter()
            .take(n)
            .map(|row| bytes_to_string(row.iter().copied()))
            .collect()
    };
    Ok(rows)
}

/// Read a whole numeric variable as `f64` along with its dimension names.
#[cfg(feature = "netcdf")]
pub fn read_variable_f64(
    path: &Path,
    var_name: &str,
) -> Result<(ndarray::ArrayD<f64>, Vec<String>), DatasetError> {
    let file = netcdf::open(path).map_err(|e| DatasetError::CouldNotOpen {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let var = file
        .variable(var_name)
        .ok_or_else(|| DatasetError::VariableNotFound {
            path: path.to_path_buf(),
            var: var_name.to_string(),
        })?;

    let dims = var.dimensions().iter().map(|d| d.name().to_string()).collect();
    let values = var
        .get::<f64, _>(netcdf::Extents::All)
        .map_err(|e| DatasetError::CouldNotRead {
            path: path.to_path_buf(),
            what: format!("variable {var_name}"),
            reason: e.to_string(),
        })?;
    Ok((values, dims))
}

#[cfg(feature = "netcdf")]
fn bytes_to_string<I: Iterator<Item = u8>>(bytes: I) -> String {
    let bytes: Vec<u8> = bytes.take_while(|&b| b != 0).collect();
    String::from_utf8_lossy(&bytes).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    #[case(AttrValue::Int(4000), 4000.0)]
    #[case(AttrValue::Float(64.1), 64.1)]
    #[case(AttrValue::Str(" 30.5 ".to_string()), 30.5)]
    #[case(AttrValue::Floats(vec![-150.0]), -150.0)]
    #[case(AttrValue::Strs(vec!["12".to_string()]), 12.0)]
    fn test_to_f64(#[case] value: AttrValue, #[case] expected: f64) {
        assert_abs_diff_eq!(value.to_f64().unwrap(), expected);
    }

    #[rstest]
    #[case(AttrValue::Int(199), 199)]
    #[case(AttrValue::Float(199.9), 199)]
    #[case(AttrValue::Float(-3.7), -3)]
    #[case(AttrValue::Str("201".to_string()), 201)]
    #[case(AttrValue::Ints(vec![5]), 5)]
    fn test_to_i64(#[case] value: AttrValue, #[case] expected: i64) {
        assert_eq!(value.to_i64().unwrap(), expected);
    }

    #[test]
    fn test_coercion_failures() {
        assert!(matches!(
            AttrValue::from("LAM_40N97W").to_f64(),
            Err(CoercionError::NotNumeric(_))
        ));
        assert!(matches!(
            AttrValue::from("199.5").to_i64(),
            Err(CoercionError::NotInteger(_))
        ));
        assert!(matches!(
            AttrValue::Float(f64::NAN).to_i64(),
            Err(CoercionError::NonFinite(_))
        ));
        assert!(matches!(
            AttrValue::Floats(vec![1.0, 2.0]).to_f64(),
            Err(CoercionError::NotScalar(2))
        ));
        assert!(matches!(
            AttrValue::Ints(vec![]).to_i64(),
            Err(CoercionError::NotScalar(0))
        ));
    }

    #[test]
    fn test_f32_widens_exactly() {
        assert_eq!(AttrValue::from(-150.0f32), AttrValue::Float(-150.0));
        assert_eq!(AttrValue::from(1000.01f32), AttrValue::Float(1000.010009765625));
        assert_ne!(AttrValue::from(64.1f32), AttrValue::Float(64.1));
    }

    #[test]
    fn test_display() {
        assert_eq!(AttrValue::Float(30.0).to_string(), "30.0");
        assert_eq!(AttrValue::Int(4000).to_string(), "4000");
        assert_eq!(AttrValue::from("LAM").to_string(), "LAM");
        assert_eq!(AttrValue::Floats(vec![1.0, 2.5]).to_string(), "[1.0, 2.5]");
    }

    #[test]
    fn test_builder_and_data_variables() {
        let ds = Dataset::builder()
            .path("wrfout_d02_test")
            .attr("DX", 4000.0)
            .dim("Time", 1)
            .dim("south_north", 201)
            .var("Times")
            .var("XLAT")
            .var("south_north")
            .build();

        assert_eq!(ds.path(), Some(Path::new("wrfout_d02_test")));
        assert_eq!(ds.dimension("south_north"), Some(201));
        assert_eq!(ds.dimension("west_east"), None);
        assert!(ds.has_variable("south_north"));
        assert!(!ds.has_variable("XLONG"));
        let data_vars: Vec<_> = ds.data_variables().collect();
        assert_eq!(data_vars, ["Times", "XLAT"]);
        assert_eq!(ds.attribute("DX"), Some(&AttrValue::Float(4000.0)));
    }

    #[cfg(feature = "netcdf")]
    #[test]
    fn test_open_wrf_netcdf() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("wrfout_d02_2022-02-01_00:00:00");
        crate::test_utils::write_wrf_file(&p).unwrap();

        let ds = Dataset::open(&p).unwrap();
        assert_eq!(ds.path(), Some(p.as_path()));
        let dims: Vec<_> = ds.dimensions().iter().map(|(k, &v)| (k.as_str(), v)).collect();
        assert_eq!(dims, [("Time", 1), ("DateStrLen", 19), ("south_north", 2), ("west_east", 3)]);
        assert_eq!(ds.attribute("TRUELAT1"), Some(&AttrValue::Float(64.0)));
        assert_eq!(ds.attribute("MAP_PROJ"), Some(&AttrValue::Int(1)));
        assert_eq!(ds.data_variables().collect::<Vec<_>>(), ["Times", "XLAT", "XLONG"]);

        let times = read_char_rows(&p, "Times", 3).unwrap();
        assert_eq!(times, ["2022-02-01_00:00:00"]);
    }

    #[cfg(feature = "netcdf")]
    #[test]
    fn test_read_variable() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("emis.nc");
        crate::test_utils::write_ioapi_file(&p).unwrap();

        let (values, dims) = read_variable_f64(&p, "emiss").unwrap();
        assert_eq!(dims, ["time", "LAY", "y", "x"]);
        assert_eq!(values.shape(), [2, 2, 2, 3]);
        assert_abs_diff_eq!(values[[1, 1, 0, 0]], 11.0);

        assert!(matches!(
            read_variable_f64(&p, "CO"),
            Err(DatasetError::VariableNotFound { .. })
        ));
    }
}
