// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the operating system services the
// upgrade pipeline consumes.
//
// The pipeline only ever talks to these traits. Production code gets the
// implementation from `platform_bridge()`; tests substitute recording mocks.

use std::path::{Path, PathBuf};

use driverlift_core::error::Result;

use crate::staging_output::StagingOutput;

/// Unified bridge that groups every OS capability the pipeline needs.
pub trait PlatformBridge: DriverInventory + FileVersionProbe + DriverStore + PrintDriverRegistry {
    /// Human-readable platform name (e.g. "Windows (PowerShell + pnputil)").
    fn platform_name(&self) -> &str;
}

/// Read-only view of the print drivers registered on this machine.
pub trait DriverInventory {
    /// Names of every registered print driver. Order is unspecified and a
    /// name may appear once per architecture; callers dedupe.
    fn registered_drivers(&self) -> Result<Vec<String>>;
}

/// Reads embedded version metadata from binaries.
pub trait FileVersionProbe {
    /// Return the file's version as a dotted string, exactly as reported.
    /// Parsing is the caller's business.
    fn file_version(&self, path: &Path) -> Result<String>;
}

/// The OS driver store.
pub trait DriverStore {
    /// Stage and install the package described by `description_file`.
    ///
    /// Returns the tool's raw output; an `Err` means the tool could not be
    /// run at all. Whether staging succeeded is decided by
    /// [`StagingOutput::verdict`].
    fn stage_package(&self, description_file: &Path) -> Result<StagingOutput>;

    /// Directory holding staged packages, searched to find the staged copy
    /// of a description file. `None` when the platform has no such place.
    fn repository_root(&self) -> Option<PathBuf>;
}

/// Binds logical driver names to staged packages.
pub trait PrintDriverRegistry {
    /// Whether a driver named `name` is currently registered.
    fn is_registered(&self, name: &str) -> Result<bool>;

    /// Register (or re-register) `name` from `description_file`.
    fn register(&self, name: &str, description_file: &Path) -> Result<()>;
}
