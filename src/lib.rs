//! Inspection and validation utilities for the NAFA8 campaign data: WRF
//! output, IOAPI emissions, FLEXPART runs and boundary polygons.
pub mod error;
pub mod logging;
pub mod config;
pub mod discovery;
pub mod dataset;
pub mod projection;
pub mod compat;
pub mod registry;
pub mod validate;
pub mod boundaries;
pub mod checksums;
pub mod summary;
pub mod quicklook;
pub mod env_report;

#[cfg(test)]
pub(crate) mod test_utils;
