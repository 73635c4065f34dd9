//! Report containers: CIMBL feeds arrive as a bare CSV, a zip holding the
//! CSV, or either of those wrapped in a PGP layer (`.asc`/`.gpg`).

use std::io::{Cursor, Read};
use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::debug;
use zip::ZipArchive;

/// Hands the pipeline the bytes of the innermost CSV for a report path,
/// whatever it is wrapped in.
pub trait ReportOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Vec<u8>>;
}

/// Filesystem-backed opener. Decryption goes through the system `gpg`
/// binary so the keyring setup of the operator applies unchanged.
#[derive(Debug, Default)]
pub struct FsOpener;

impl ReportOpener for FsOpener {
    fn open(&self, path: &Path) -> Result<Vec<u8>> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        let (data, name) = if name.ends_with(".asc") || name.ends_with(".gpg") {
            debug!("decrypting {}", path.display());
            let inner = name.rsplit_once('.').map(|(stem, _)| stem.to_string());
            (decrypt(path)?, inner.unwrap_or_default())
        } else {
            let data =
                std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            (data, name)
        };

        if name.ends_with(".zip") {
            debug!("extracting csv member from {}", path.display());
            return extract_csv(&data).with_context(|| format!("extracting {}", path.display()));
        }
        Ok(data)
    }
}

fn decrypt(path: &Path) -> Result<Vec<u8>> {
    let out = Command::new("gpg")
        .args(["--batch", "--quiet", "--decrypt"])
        .arg(path)
        .output()
        .context("running gpg")?;
    if !out.status.success() {
        bail!(
            "gpg failed for {}: {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        );
    }
    Ok(out.stdout)
}

/// First `.csv` member wins; an empty archive or one without a CSV is an
/// error for this source.
fn extract_csv(data: &[u8]) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(data)).context("opening zip")?;
    for i in 0..archive.len() {
        let mut member = archive.by_index(i)?;
        if member.name().to_ascii_lowercase().ends_with(".csv") {
            let mut buf = Vec::with_capacity(member.size() as usize);
            member.read_to_end(&mut buf)?;
            return Ok(buf);
        }
    }
    bail!("no csv member in archive");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn zip_with(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut w = ZipWriter::new(Cursor::new(Vec::new()));
        let opts =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, data) in members {
            w.start_file(*name, opts).unwrap();
            w.write_all(data).unwrap();
        }
        w.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_first_csv_member() {
        let data = zip_with(&[
            ("README", b"ignore me"),
            ("CIMBL-0666-CERTS.csv", b"type,value,to_ids\n"),
        ]);
        let csv = extract_csv(&data).unwrap();
        assert_eq!(csv, b"type,value,to_ids\n");
    }

    #[test]
    fn test_zip_without_csv_is_an_error() {
        let data = zip_with(&[("notes.txt", b"nope")]);
        assert!(extract_csv(&data).is_err());
    }

    #[test]
    fn test_empty_zip_is_an_error() {
        let data = zip_with(&[]);
        assert!(extract_csv(&data).is_err());
    }

    #[test]
    fn test_open_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CIMBL-0666-CERTS.csv");
        std::fs::write(&path, b"type,value,to_ids\n").unwrap();
        assert_eq!(FsOpener.open(&path).unwrap(), b"type,value,to_ids\n");
    }

    #[test]
    fn test_open_zip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CIMBL-0666-CERTS.zip");
        std::fs::write(
            &path,
            zip_with(&[("CIMBL-0666-CERTS.csv", b"type,value,to_ids\n")]),
        )
        .unwrap();
        assert_eq!(FsOpener.open(&path).unwrap(), b"type,value,to_ids\n");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(FsOpener.open(Path::new("/nonexistent/CIMBL-1-EU.csv")).is_err());
    }
}
