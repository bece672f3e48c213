//! Checksums of the sample files listed in the sample manifest.
//!
//! The manifest (`samples/manifest.tsv`) has one tab-separated
//! `dataset<TAB>path<TAB>why` entry per line. Blank lines and lines starting
//! with `#` are skipped. The output TSV has the same three columns plus the
//! file digest, or `MISSING` for files that do not exist. The digest column is
//! named after the algorithm; MD5 is the default so that tables line up with
//! the campaign's existing `md5` checksum files.
use std::{
    fs::File,
    io::{BufRead, BufReader, Read, Write},
    path::{Path, PathBuf},
};

use md5::{Digest, Md5};
use ring::digest;

use crate::error::ChecksumError;

pub const DEFAULT_MANIFEST: &str = "samples/manifest.tsv";
pub const DEFAULT_OUTPUT: &str = "outputs/sample_checksums.tsv";
pub const MISSING: &str = "MISSING";
const CHUNK_SIZE: usize = 1 << 20;

/// Digest used for the checksum column; the name doubles as the column header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Md5,
    Sha256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub dataset: String,
    pub path: PathBuf,
    pub why: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumRow {
    pub entry: ManifestEntry,
    /// Lowercase hex digest, `None` if the file does not exist
    pub digest: Option<String>,
}

impl ChecksumRow {
    pub fn digest_str(&self) -> &str {
        self.digest.as_deref().unwrap_or(MISSING)
    }
}

pub fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>, ChecksumError> {
    let f = File::open(path).map_err(|e| ChecksumError::CouldNotRead {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_manifest(BufReader::new(f), path)
}

fn parse_manifest<R: BufRead>(reader: R, path: &Path) -> Result<Vec<ManifestEntry>, ChecksumError> {
    let mut entries = vec![];
    for (iline, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| ChecksumError::CouldNotRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        // The reason column may itself contain tabs
        let mut parts = line.trim().splitn(3, '\t');
        let (Some(dataset), Some(file), Some(why)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ChecksumError::BadManifestLine {
                path: path.to_path_buf(),
                line: iline + 1,
            });
        };
        entries.push(ManifestEntry {
            dataset: dataset.to_string(),
            path: PathBuf::from(file),
            why: why.to_string(),
        });
    }
    Ok(entries)
}

/// Digest of a file as lowercase hex, read in 1 MiB chunks.
pub fn hash_file(path: &Path, algorithm: DigestAlgorithm) -> Result<String, ChecksumError> {
    let hash_err = |e: std::io::Error| ChecksumError::HashError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut f = File::open(path).map_err(hash_err)?;
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut chunks = |update: &mut dyn FnMut(&[u8])| -> std::io::Result<()> {
        loop {
            let n = f.read(&mut buf)?;
            if n == 0 {
                return Ok(());
            }
            update(&buf[..n]);
        }
    };

    match algorithm {
        DigestAlgorithm::Md5 => {
            let mut hasher = Md5::new();
            chunks(&mut |b| hasher.update(b)).map_err(hash_err)?;
            Ok(hex::encode(hasher.finalize()))
        }
        DigestAlgorithm::Sha256 => {
            let mut ctx = digest::Context::new(&digest::SHA256);
            chunks(&mut |b| ctx.update(b)).map_err(hash_err)?;
            Ok(hex::encode(ctx.finish().as_ref()))
        }
    }
}

/// Hash every manifest entry. Paths that do not exist get no digest; any
/// other read failure is an error.
pub fn hash_manifest(
    entries: Vec<ManifestEntry>,
    algorithm: DigestAlgorithm,
) -> Result<Vec<ChecksumRow>, ChecksumError> {
    entries
        .into_iter()
        .map(|entry| {
            let digest = if entry.path.exists() {
                Some(hash_file(&entry.path, algorithm)?)
            } else {
                log::warn!("Sample file {} is missing", entry.path.display());
                None
            };
            Ok(ChecksumRow { entry, digest })
        })
        .collect()
}

pub fn write_checksum_table<W: Write>(
    writer: &mut W,
    rows: &[ChecksumRow],
    algorithm: DigestAlgorithm,
) -> std::io::Result<()> {
    writeln!(writer, "dataset\tfilepath\twhy\t{algorithm}")?;
    for row in rows {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            row.entry.dataset,
            row.entry.path.display(),
            row.entry.why,
            row.digest_str()
        )?;
    }
    Ok(())
}

/// Write the checksum table to `out`, creating its parent directory if needed.
pub fn write_checksums(
    rows: &[ChecksumRow],
    algorithm: DigestAlgorithm,
    out: &Path,
) -> Result<(), ChecksumError> {
    let write_err = |e: std::io::Error| ChecksumError::CouldNotWrite {
        path: out.to_path_buf(),
        reason: e.to_string(),
    };

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
    }
    let mut f = File::create(out).map_err(write_err)?;
    write_checksum_table(&mut f, rows, algorithm).map_err(write_err)
}
