//! Extraction of the Lambert conformal projection and grid-size attributes.
//!
//! WRF output and IOAPI emission files describe the same kind of grid with
//! different attribute names. This module pulls a fixed allow-list of those
//! attributes out of a [`Dataset`] for each schema. A key that the file does not
//! define is simply left out, so downstream code must treat absence as "unknown"
//! and never as zero.
use std::fmt::Display;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::dataset::{AttrValue, Dataset};

/// Global attributes kept from WRF files
pub const WRF_ATTR_KEYS: &[&str] = &[
    "TRUELAT1", "TRUELAT2", "STAND_LON", "CEN_LAT", "CEN_LON", "DX", "DY", "MAP_PROJ",
];

/// Dimensions kept from WRF files
pub const WRF_DIM_KEYS: &[&str] = &["west_east", "south_north"];

/// Global attributes kept from IOAPI files
pub const IOAPI_ATTR_KEYS: &[&str] = &[
    "P_ALP", "P_BET", "P_GAM", "XCELL", "YCELL", "XORIG", "YORIG", "NCOLS", "NROWS", "GDTYP",
    "GDNAM",
];

/// Dimensions kept from IOAPI files
pub const IOAPI_DIM_KEYS: &[&str] = &["x", "y", "time", "LAY"];

/// IOAPI attributes shown by the emissions summary, in print order. Unlike
/// [`IOAPI_ATTR_KEYS`] this includes `NLAYS`.
pub const IOAPI_SUMMARY_KEYS: &[&str] = &[
    "NCOLS", "NROWS", "NLAYS", "GDTYP", "P_ALP", "P_BET", "P_GAM", "XCELL", "YCELL", "XORIG",
    "YORIG", "GDNAM",
];

/// Which naming convention a set of projection attributes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum GridSchema {
    #[strum(to_string = "WRF")]
    Wrf,
    #[strum(to_string = "IOAPI")]
    Ioapi,
}

impl GridSchema {
    pub fn attr_keys(&self) -> &'static [&'static str] {
        match self {
            GridSchema::Wrf => WRF_ATTR_KEYS,
            GridSchema::Ioapi => IOAPI_ATTR_KEYS,
        }
    }

    pub fn dim_keys(&self) -> &'static [&'static str] {
        match self {
            GridSchema::Wrf => WRF_DIM_KEYS,
            GridSchema::Ioapi => IOAPI_DIM_KEYS,
        }
    }
}

/// The allow-listed projection attributes and grid dimensions of one dataset.
///
/// Attribute values are kept in their native type. Dimensions are stored as
/// [`AttrValue::Int`] alongside them, which mirrors how the two are compared: a
/// WRF dimension (`west_east`) is compared to an IOAPI attribute (`NCOLS`).
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionAttributes {
    schema: GridSchema,
    values: IndexMap<String, AttrValue>,
}

impl ProjectionAttributes {
    /// Extract the allow-listed keys of `schema` from an attribute mapping and a
    /// dimension size mapping. Attributes come first, in allow-list order,
    /// followed by dimensions.
    pub fn extract(
        schema: GridSchema,
        attrs: &IndexMap<String, AttrValue>,
        dims: &IndexMap<String, usize>,
    ) -> Self {
        let mut values = IndexMap::new();
        for &key in schema.attr_keys() {
            if let Some(v) = attrs.get(key) {
                values.insert(key.to_string(), v.clone());
            }
        }

        for &key in schema.dim_keys() {
            if let Some(&n) = dims.get(key) {
                values.insert(key.to_string(), AttrValue::Int(n as i64));
            }
        }

        Self { schema, values }
    }

    pub fn from_wrf(ds: &Dataset) -> Self {
        Self::extract(GridSchema::Wrf, ds.attributes(), ds.dimensions())
    }

    pub fn from_ioapi(ds: &Dataset) -> Self {
        Self::extract(GridSchema::Ioapi, ds.attributes(), ds.dimensions())
    }

    /// Build directly from key/value pairs, bypassing the allow-list.
    pub fn from_pairs<K, V, I>(schema: GridSchema, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<AttrValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { schema, values }
    }

    pub fn schema(&self) -> GridSchema {
        self.schema
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Display for ProjectionAttributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.iter().map(|(k, v)| format!("{k}: {v}")).join(", ");
        write!(f, "{{{inner}}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrf_dataset() -> Dataset {
        Dataset::builder()
            .attr("TITLE", " OUTPUT FROM WRF V4.3 MODEL")
            .attr("DX", 1333.33f32)
            .attr("TRUELAT1", 64.0f32)
            .attr("TRUELAT2", 65.5f32)
            .attr("STAND_LON", -147.0f32)
            .attr("MAP_PROJ", 1)
            .dim("Time", 1)
            .dim("south_north", 201)
            .dim("west_east", 201)
            .dim("bottom_top", 49)
            .build()
    }

    #[test]
    fn test_wrf_extraction() {
        let attrs = ProjectionAttributes::from_wrf(&wrf_dataset());
        assert_eq!(attrs.schema(), GridSchema::Wrf);
        let keys: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            ["TRUELAT1", "TRUELAT2", "STAND_LON", "DX", "MAP_PROJ", "west_east", "south_north"]
        );
        assert_eq!(attrs.get("west_east"), Some(&AttrValue::Int(201)));
        assert_eq!(attrs.get("MAP_PROJ"), Some(&AttrValue::Int(1)));
        assert!(!attrs.contains("DY"));
        assert!(!attrs.contains("TITLE"));
        assert!(!attrs.contains("bottom_top"));
    }

    #[test]
    fn test_ioapi_extraction() {
        let ds = Dataset::builder()
            .attr("P_ALP", 64.0)
            .attr("GDNAM", "NAFA_1km")
            .attr("NCOLS", 199)
            .attr("NLAYS", 1)
            .dim("time", 25)
            .dim("LAY", 1)
            .dim("y", 199)
            .dim("x", 199)
            .build();
        let attrs = ProjectionAttributes::from_ioapi(&ds);
        let keys: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["P_ALP", "NCOLS", "GDNAM", "x", "y", "time", "LAY"]);
        assert_eq!(attrs.get("GDNAM").and_then(|v| v.as_str()), Some("NAFA_1km"));
        assert!(!attrs.contains("NLAYS"));
    }

    #[test]
    fn test_empty_extraction() {
        let attrs = ProjectionAttributes::from_ioapi(&wrf_dataset());
        assert!(attrs.is_empty());
        assert_eq!(attrs.to_string(), "{}");
    }
}
