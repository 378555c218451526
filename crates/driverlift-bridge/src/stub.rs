// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for builds where the Windows print subsystem is unavailable.
//
// Every trait method returns `PlatformUnavailable`, except the inventory,
// which reports no registered drivers so that a default run ends with
// "nothing supported installed" instead of touching anything.

use std::path::{Path, PathBuf};

use driverlift_core::error::{DriverliftError, Result};

use crate::staging_output::StagingOutput;
use crate::traits::*;

/// No-op bridge returned on non-Windows platforms.
pub struct StubBridge;

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Unsupported platform (stub)"
    }
}

impl DriverInventory for StubBridge {
    fn registered_drivers(&self) -> Result<Vec<String>> {
        tracing::warn!("DriverInventory::registered_drivers called on stub bridge");
        Ok(Vec::new())
    }
}

impl FileVersionProbe for StubBridge {
    fn file_version(&self, _path: &Path) -> Result<String> {
        Err(DriverliftError::PlatformUnavailable)
    }
}

impl DriverStore for StubBridge {
    fn stage_package(&self, _description_file: &Path) -> Result<StagingOutput> {
        tracing::warn!("DriverStore::stage_package called on stub bridge");
        Err(DriverliftError::PlatformUnavailable)
    }

    fn repository_root(&self) -> Option<PathBuf> {
        None
    }
}

impl PrintDriverRegistry for StubBridge {
    fn is_registered(&self, _name: &str) -> Result<bool> {
        Err(DriverliftError::PlatformUnavailable)
    }

    fn register(&self, _name: &str, _description_file: &Path) -> Result<()> {
        tracing::warn!("PrintDriverRegistry::register called on stub bridge");
        Err(DriverliftError::PlatformUnavailable)
    }
}
