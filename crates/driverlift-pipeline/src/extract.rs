// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Package extractor: unpacks a driver archive and finds the description file
// for our driver among the ones it ships.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;
use zip::ZipArchive;

use driverlift_core::error::{DriverliftError, Result};
use driverlift_core::pattern::NameGlob;

/// Unpack `archive` into `dest_dir`.
///
/// `dest_dir` is deleted and recreated first, so leftovers from an earlier
/// failed run never mix with this package. Entries whose paths would land
/// outside `dest_dir` make the whole extraction fail. Returns the number of
/// archive entries.
pub fn extract(archive: &Path, dest_dir: &Path) -> Result<usize> {
    match fs::remove_dir_all(dest_dir) {
        Ok(()) => debug!(dir = %dest_dir.display(), "stale extraction directory removed"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    fs::create_dir_all(dest_dir)?;

    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file)
        .map_err(|e| DriverliftError::Extraction(format!("{}: {e}", archive.display())))?;
    let entries = zip.len();
    zip.extract(dest_dir)
        .map_err(|e| DriverliftError::Extraction(format!("{}: {e}", archive.display())))?;

    info!(archive = %archive.display(), entries, "package extracted");
    Ok(entries)
}

/// Read a description file as text.
///
/// These files come as UTF-16 (with a byte order mark) about as often as
/// UTF-8 or ANSI. UTF-16 is decoded; anything else is read as lossy UTF-8,
/// which is enough for ASCII keys and markers.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(decode_text(&bytes))
}

fn decode_text(bytes: &[u8]) -> String {
    match bytes {
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Find the description file for our driver under `dir`.
///
/// Walks `dir` in sorted order, keeps files whose name matches `pattern`,
/// and returns the first whose text contains `marker` (case-insensitive).
/// An empty marker accepts the first name match.
pub fn locate_description_file(dir: &Path, pattern: &NameGlob, marker: &str) -> Result<PathBuf> {
    let marker_lower = marker.to_lowercase();

    let candidates = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_str().is_some_and(|n| pattern.matches(n)));

    for entry in candidates {
        let text = match read_text(entry.path()) {
            Ok(text) => text,
            Err(e) => {
                debug!(file = %entry.path().display(), error = %e, "candidate unreadable");
                continue;
            }
        };
        if text.to_lowercase().contains(&marker_lower) {
            info!(file = %entry.path().display(), "description file located");
            return Ok(entry.into_path());
        }
        debug!(file = %entry.path().display(), "candidate lacks marker");
    }

    Err(DriverliftError::DescriptionNotFound {
        pattern: pattern.as_str().to_string(),
        marker: marker.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{driver_package, zip_bytes};

    fn utf16le_with_bom(text: &str) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn extract_replaces_stale_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let archive = dir.path().join("pkg.zip");
        fs::write(&archive, driver_package("Alpha", "2.0.0.0")).expect("write zip");
        let dest = dir.path().join("out");
        fs::create_dir_all(&dest).expect("mkdir");
        fs::write(dest.join("stale.inf"), b"Alpha leftover").expect("write stale");

        let entries = extract(&archive, &dest).expect("extract");
        assert_eq!(entries, 4);
        assert!(!dest.join("stale.inf").exists());
        assert!(dest.join("Driver/x64/Alpha.inf").is_file());
    }

    #[test]
    fn corrupt_archive_is_an_extraction_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let archive = dir.path().join("pkg.zip");
        fs::write(&archive, b"<html>captive portal</html>").expect("write");

        let err = extract(&archive, &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, DriverliftError::Extraction(_)));
    }

    #[test]
    fn missing_archive_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = extract(&dir.path().join("absent.zip"), &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, DriverliftError::Io(_)));
    }

    #[test]
    fn marker_picks_the_right_sibling() {
        let dir = tempfile::tempdir().expect("tempdir");
        let archive = dir.path().join("pkg.zip");
        fs::write(&archive, driver_package("Alpha", "2.0.0.0")).expect("write zip");
        let dest = dir.path().join("out");
        extract(&archive, &dest).expect("extract");

        let glob = NameGlob::parse("*.inf").expect("glob");
        let found = locate_description_file(&dest, &glob, "alpha").expect("located");
        assert_eq!(found, dest.join("Driver/x64/Alpha.inf"));
    }

    #[test]
    fn utf16_description_files_are_searched() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("OEMSETUP.INF"),
            utf16le_with_bom("[Version]\r\n\"Contoso Universal PCL6\"\r\n"),
        )
        .expect("write");

        let glob = NameGlob::parse("*.inf").expect("glob");
        let found =
            locate_description_file(dir.path(), &glob, "Contoso Universal PCL6").expect("located");
        assert_eq!(found, dir.path().join("OEMSETUP.INF"));
    }

    #[test]
    fn no_marker_match_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let archive = dir.path().join("pkg.zip");
        fs::write(
            &archive,
            zip_bytes(&[("a.inf", "Other Driver".as_bytes()), ("Alpha.txt", "Alpha".as_bytes())]),
        )
        .expect("write zip");
        let dest = dir.path().join("out");
        extract(&archive, &dest).expect("extract");

        let glob = NameGlob::parse("*.inf").expect("glob");
        let err = locate_description_file(&dest, &glob, "Alpha").unwrap_err();
        assert!(matches!(err, DriverliftError::DescriptionNotFound { .. }));
    }

    #[test]
    fn decodes_byte_order_marks() {
        assert_eq!(decode_text(&[0xEF, 0xBB, 0xBF, b'h', b'i']), "hi");
        assert_eq!(decode_text(&[0xFE, 0xFF, 0, b'h', 0, b'i']), "hi");
        assert_eq!(decode_text(&utf16le_with_bom("hi")), "hi");
        assert_eq!(decode_text(b"plain"), "plain");
    }
}
