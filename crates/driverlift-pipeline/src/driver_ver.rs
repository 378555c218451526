// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `DriverVer` extraction from description files.
//
// Purely informational: the result is logged, never used to decide anything.
// The directive looks like
//
//     DriverVer = 04/21/2023,61.315.1.25959   ; optional comment
//
// and belongs to the [Version] section.

use std::fmt;

use thiserror::Error;

use driverlift_core::version::DriverVersion;

/// Why `DriverVer` could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverVerError {
    #[error("no DriverVer directive in [Version] section")]
    Missing,

    #[error("malformed DriverVer value `{0}`")]
    Malformed(String),
}

/// Date and version a description file declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverVer {
    /// Release date as written (`mm/dd/yyyy`).
    pub date: String,
    pub version: DriverVersion,
}

impl fmt::Display for DriverVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.version, self.date)
    }
}

/// Pull `DriverVer` out of description file text.
pub fn parse_driver_ver(text: &str) -> Result<DriverVer, DriverVerError> {
    let mut in_version = false;

    for line in text.lines() {
        let line = strip_comment(line).trim();
        if line.starts_with('[') {
            in_version = line.eq_ignore_ascii_case("[version]");
            continue;
        }
        if !in_version {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case("driverver") {
            return parse_value(value.trim());
        }
    }

    Err(DriverVerError::Missing)
}

fn strip_comment(line: &str) -> &str {
    // ';' inside a quoted string is not a comment.
    let mut quoted = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ';' if !quoted => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_value(value: &str) -> Result<DriverVer, DriverVerError> {
    let malformed = || DriverVerError::Malformed(value.to_string());

    let (date, version) = value.split_once(',').ok_or_else(malformed)?;
    let date = date.trim();
    if date.split('/').count() != 3 || !date.chars().all(|c| c.is_ascii_digit() || c == '/') {
        return Err(malformed());
    }
    let version = version.trim().parse().map_err(|_| malformed())?;

    Ok(DriverVer {
        date: date.to_string(),
        version,
    })
}
