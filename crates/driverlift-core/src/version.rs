// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Four-component driver versions (major.minor.build.revision).
//
// Ordering is lexicographic over the tuple, which is what the derived `Ord`
// gives us given the field order below.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DriverliftError, Result};

/// A parsed driver file version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DriverVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub revision: u32,
}

impl DriverVersion {
    pub const fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }
}

impl FromStr for DriverVersion {
    type Err = DriverliftError;

    fn from_str(raw: &str) -> Result<Self> {
        let parse_err = || DriverliftError::VersionParse {
            raw: raw.to_string(),
        };

        let mut parts = [0u32; 4];
        let mut count = 0;
        for component in raw.trim().split('.') {
            let component = component.trim();
            // `u32::from_str` accepts a leading '+', which is not a version digit.
            if count == 4 || component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(parse_err());
            }
            parts[count] = component.parse().map_err(|_| parse_err())?;
            count += 1;
        }

        if count != 4 {
            return Err(parse_err());
        }

        Ok(Self::new(parts[0], parts[1], parts[2], parts[3]))
    }
}

impl fmt::Display for DriverVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl Serialize for DriverVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DriverVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Whether `installed` is at or above `minimum`.
///
/// Both sides must parse as four numeric components. A parse failure is
/// returned to the caller, which treats it as "needs upgrade".
pub fn is_at_least(installed: &str, minimum: &str) -> Result<bool> {
    let installed: DriverVersion = installed.parse()?;
    let minimum: DriverVersion = minimum.parse()?;
    Ok(installed >= minimum)
}
