// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.
//
// The driver catalogue lives in a JSON file deployed next to the binary. It
// is loaded once, validated, and handed to the orchestrator as an immutable
// list; nothing reads it from global state.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DriverliftError, Result};
use crate::pattern::{FileGlob, NameGlob};
use crate::types::DriverSpec;

/// Persistent upgrader settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Supported driver families, processed in this order.
    pub drivers: Vec<DriverSpec>,
    /// Append-only run log. Mirrored to the console.
    pub log_file: PathBuf,
    /// Parent of the per-driver scratch directories.
    pub scratch_dir: PathBuf,
    /// Download timeout. `None` waits indefinitely.
    pub download_timeout_secs: Option<u64>,
    /// Override for the OS driver repository searched for staged copies.
    pub driver_store_root: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            drivers: Vec::new(),
            log_file: std::env::temp_dir().join("driverlift.log"),
            scratch_dir: std::env::temp_dir().join("driverlift"),
            download_timeout_secs: None,
            driver_store_root: None,
        }
    }
}

impl AppConfig {
    /// Read and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DriverliftError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject catalogues the pipeline could not process sensibly.
    pub fn validate(&self) -> Result<()> {
        if self.drivers.is_empty() {
            return Err(DriverliftError::Config("no drivers configured".into()));
        }

        let mut seen = HashSet::new();
        for spec in &self.drivers {
            if spec.name.trim().is_empty() {
                return Err(DriverliftError::Config("driver with empty name".into()));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(DriverliftError::Config(format!(
                    "driver `{}` configured twice",
                    spec.name
                )));
            }
            if !(spec.url.starts_with("http://") || spec.url.starts_with("https://")) {
                return Err(DriverliftError::Config(format!(
                    "driver `{}`: url must be http(s), got `{}`",
                    spec.name, spec.url
                )));
            }
            NameGlob::parse(&spec.description_pattern)?;
            FileGlob::parse(&spec.version_file)?;
        }

        if self.download_timeout_secs == Some(0) {
            return Err(DriverliftError::Config(
                "download_timeout_secs must be positive; omit it to wait indefinitely".into(),
            ));
        }

        Ok(())
    }
}
