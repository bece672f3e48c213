//! Text summaries printed by the inspection programs.
//!
//! These are best effort: they write what they can to any [`std::io::Write`]
//! and leave it to the caller to decide whether a failure matters.
use std::{io::Write, path::Path};

use indexmap::IndexMap;
use itertools::Itertools;

use crate::{
    boundaries::{self, BoundaryMap},
    dataset::Dataset,
    discovery::{self, FlexpartListing},
    projection::IOAPI_SUMMARY_KEYS,
};

/// How many data variables a dataset summary lists
pub const N_SUMMARY_VARS: usize = 10;
/// How many boundary files the boundary summary shows
pub const N_BOUNDARY_FILES: usize = 3;
/// How many lines of each boundary file the boundary summary shows
pub const N_HEAD_LINES: usize = 4;

/// Format a dimension mapping as `{name: size, ...}` in file order.
pub fn format_dims(dims: &IndexMap<String, usize>) -> String {
    let inner = dims.iter().map(|(k, v)| format!("{k}: {v}")).join(", ");
    format!("{{{inner}}}")
}

/// Format a list of strings as `[a, b, c]`.
pub fn format_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let inner = items.into_iter().map(|s| s.as_ref().to_string()).join(", ");
    format!("[{inner}]")
}

/// Write the `dims:` and `vars (first 10):` lines for a dataset.
pub fn write_dataset_summary<W: Write>(writer: &mut W, ds: &Dataset) -> std::io::Result<()> {
    writeln!(writer, "dims: {}", format_dims(ds.dimensions()))?;
    writeln!(
        writer,
        "vars (first {N_SUMMARY_VARS}): {}",
        format_list(ds.data_variables().take(N_SUMMARY_VARS))
    )
}

/// Write one `attr KEY: value` line for each IOAPI summary attribute the
/// dataset has.
pub fn write_ioapi_attrs<W: Write>(writer: &mut W, ds: &Dataset) -> std::io::Result<()> {
    for &key in IOAPI_SUMMARY_KEYS {
        if let Some(v) = ds.attribute(key) {
            writeln!(writer, "attr {key}: {v}")?;
        }
    }
    Ok(())
}

/// Write the heads of the first few boundary files in `dir`.
pub fn write_boundary_heads<W: Write>(writer: &mut W, dir: &Path) -> std::io::Result<()> {
    if !dir.exists() {
        return writeln!(writer, "  (dir missing)");
    }

    let files = match discovery::pick_files(dir, &[discovery::BOUNDARY_PATTERN], N_BOUNDARY_FILES) {
        Ok(files) => files,
        Err(e) => return writeln!(writer, "  ERROR listing boundaries: {e}"),
    };
    if files.is_empty() {
        return writeln!(writer, "  (no .txt polygons)");
    }

    for f in files {
        writeln!(writer, "file: {}", discovery::file_name_string(&f))?;
        match boundaries::head_lines(&f, N_HEAD_LINES) {
            Ok(lines) => writeln!(writer, "  head: {} ...", format_list(lines.iter().map(|l| l.trim())))?,
            Err(e) => writeln!(writer, "  ERROR reading: {e}")?,
        }
    }
    Ok(())
}

/// Write the FLEXPART runs listing; `None` means the runs root is missing.
pub fn write_flexpart_listing<W: Write>(
    writer: &mut W,
    listing: Option<&FlexpartListing>,
) -> std::io::Result<()> {
    let Some(listing) = listing else {
        return writeln!(writer, "  (dir missing)");
    };
    writeln!(writer, "subdirs: {}", format_list(&listing.subdirs))?;
    if let Some(outs) = &listing.main_run_outputs {
        writeln!(writer, "example outputs: {}", format_list(outs))?;
    }
    Ok(())
}

/// A blank-styled table of boundary names and their (rows, columns) shapes.
pub fn boundary_shape_table(polys: &BoundaryMap) -> tabled::Table {
    let mut builder = tabled::builder::Builder::default();
    builder.push_record(["boundary", "rows", "columns"]);
    for (name, poly) in polys {
        let (nrows, ncols) = poly.shape();
        builder.push_record([name.clone(), nrows.to_string(), ncols.to_string()]);
    }

    let mut table = builder.build();
    table
        .with(tabled::settings::style::Style::blank())
        .with(tabled::settings::Alignment::left());
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundaries::BoundaryPolygon;

    fn to_string<F: FnOnce(&mut Vec<u8>) -> std::io::Result<()>>(f: F) -> String {
        let mut buf = vec![];
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_dataset_summary() {
        let mut builder = Dataset::builder()
            .dim("time", 25)
            .dim("LAY", 1)
            .var("time")
            .attr("NCOLS", 199)
            .attr("XCELL", 1000.0)
            .attr("GDNAM", "NAFA_1km")
            .attr("EXEC_ID", "???");
        for i in 0..12 {
            builder = builder.var(&format!("v{i:02}"));
        }
        let ds = builder.build();

        let out = to_string(|w| write_dataset_summary(w, &ds));
        assert_eq!(
            out,
            "dims: {time: 25, LAY: 1}\nvars (first 10): [v00, v01, v02, v03, v04, v05, v06, v07, v08, v09]\n"
        );

        let out = to_string(|w| write_ioapi_attrs(w, &ds));
        assert_eq!(out, "attr NCOLS: 199\nattr XCELL: 1000.0\nattr GDNAM: NAFA_1km\n");
    }

    #[test]
    fn test_boundary_heads() {
        let dir = tempfile::tempdir().unwrap();
        let out = to_string(|w| write_boundary_heads(w, &dir.path().join("nope")));
        assert_eq!(out, "  (dir missing)\n");

        let out = to_string(|w| write_boundary_heads(w, dir.path()));
        assert_eq!(out, "  (no .txt polygons)\n");

        std::fs::write(
            dir.path().join("Fairbanks.txt"),
            "Fairbanks\nlon,lat,z\n-147.9,64.7,0\n-147.5,64.7,0\n-147.5,65.0,0\n",
        )
        .unwrap();
        let out = to_string(|w| write_boundary_heads(w, dir.path()));
        assert_eq!(
            out,
            "file: Fairbanks.txt\n  head: [Fairbanks, lon,lat,z, -147.9,64.7,0, -147.5,64.7,0] ...\n"
        );
    }

    #[test]
    fn test_flexpart_listing() {
        let out = to_string(|w| write_flexpart_listing(w, None));
        assert_eq!(out, "  (dir missing)\n");

        let listing = FlexpartListing {
            subdirs: vec!["test_backward_CTC".to_string()],
            main_run_outputs: Some(vec!["flxout_1.nc".to_string()]),
        };
        let out = to_string(|w| write_flexpart_listing(w, Some(&listing)));
        assert_eq!(out, "subdirs: [test_backward_CTC]\nexample outputs: [flxout_1.nc]\n");
    }

    #[test]
    fn test_shape_table() {
        let mut polys = BoundaryMap::new();
        polys.insert(
            "Fairbanks".to_string(),
            BoundaryPolygon::from_points([(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]),
        );
        let table = boundary_shape_table(&polys).to_string();
        assert!(table.contains("Fairbanks"));
        assert!(table.contains('3'));
    }
}
