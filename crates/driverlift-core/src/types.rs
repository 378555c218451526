// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Driverlift upgrade pipeline.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::version::DriverVersion;

/// One supported driver family, as declared in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverSpec {
    /// Logical print driver name, exactly as the print subsystem reports it.
    pub name: String,
    /// Where the driver package archive is downloaded from.
    pub url: String,
    /// File-name glob of the description file inside the archive (e.g. `*.inf`).
    pub description_pattern: String,
    /// Text the right description file must contain. Archives often ship
    /// several sibling variants; this picks ours.
    pub description_marker: String,
    /// Glob locating the installed version-bearing binary on disk.
    pub version_file: String,
    /// Known-good version. Anything older is upgraded.
    pub minimum_version: DriverVersion,
}

/// What the machine currently has for one configured driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledDriverInfo {
    pub name: String,
    /// The version-bearing file, if the glob resolved to one.
    pub file: Option<PathBuf>,
    /// Version string as read from the file metadata.
    pub raw_version: Option<String>,
    /// Parsed version; `None` when the file is missing or unreadable.
    pub version: Option<DriverVersion>,
}

impl InstalledDriverInfo {
    /// Registered, but no version-bearing file could be found.
    pub fn without_file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: None,
            raw_version: None,
            version: None,
        }
    }
}

/// Why a driver was picked for upgrading this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SelectionReason {
    /// Version checking was bypassed on the command line.
    VersionCheckSkipped,
    /// Registered, but the version-bearing file is missing.
    NoVersionFile,
    /// Installed version could not be read or parsed.
    UnreadableVersion { detail: String },
    /// Installed version is below the minimum.
    Outdated {
        installed: DriverVersion,
        minimum: DriverVersion,
    },
}

impl fmt::Display for SelectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VersionCheckSkipped => write!(f, "version check skipped"),
            Self::NoVersionFile => write!(f, "no version-bearing file found"),
            Self::UnreadableVersion { detail } => write!(f, "installed version unreadable ({detail})"),
            Self::Outdated { installed, minimum } => {
                write!(f, "installed {installed} is below minimum {minimum}")
            }
        }
    }
}

/// A driver selected for processing this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeTarget {
    pub spec: DriverSpec,
    pub reason: SelectionReason,
}

/// Pipeline stages that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Fetch,
    Extract,
    Locate,
    Stage,
    Register,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetch => "fetch",
            Self::Extract => "extract",
            Self::Locate => "locate",
            Self::Stage => "stage",
            Self::Register => "register",
        };
        f.write_str(name)
    }
}

/// Lifecycle states of a single target's pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Selected, nothing done yet.
    Pending,
    /// Archive is on disk.
    Fetched,
    /// Archive unpacked into a clean directory.
    Extracted,
    /// The right description file was found.
    DescriptionLocated,
    /// Package accepted by the driver store.
    Staged,
    /// Logical driver bound to the staged package.
    Registered,
    /// Scratch files removed. Terminal.
    CleanedUp,
    /// A stage failed. Absorbing until cleanup.
    Failed(Stage),
}

impl PipelineState {
    /// The state reached when `stage` succeeds.
    pub fn after(stage: Stage) -> Self {
        match stage {
            Stage::Fetch => Self::Fetched,
            Stage::Extract => Self::Extracted,
            Stage::Locate => Self::DescriptionLocated,
            Stage::Stage => Self::Staged,
            Stage::Register => Self::Registered,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::CleanedUp)
    }
}

/// Something went sideways but the pipeline carried on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Installed version string did not parse; the driver was upgraded anyway.
    InstalledVersionUnparsable { raw: String },
    /// `DriverVer` could not be read from the description file.
    DriverVerUnreadable { detail: String },
    /// The staged copy could not be found in the driver store; registration
    /// used the extracted file instead.
    StagedPathFallback { original: PathBuf },
    /// Registration reported an error, but the driver is registered.
    RegisteredDespiteError { detail: String },
    /// Removing scratch files failed.
    CleanupIncomplete { detail: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstalledVersionUnparsable { raw } => {
                write!(f, "installed version `{raw}` is unparsable")
            }
            Self::DriverVerUnreadable { detail } => write!(f, "DriverVer unreadable: {detail}"),
            Self::StagedPathFallback { original } => write!(
                f,
                "staged copy not found, registered from {}",
                original.display()
            ),
            Self::RegisteredDespiteError { detail } => {
                write!(f, "registration reported `{detail}` but driver is registered")
            }
            Self::CleanupIncomplete { detail } => write!(f, "cleanup incomplete: {detail}"),
        }
    }
}

/// A value plus the warnings raised while producing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warned<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Warned<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(value: T, warning: Warning) -> Self {
        Self {
            value,
            warnings: vec![warning],
        }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Final outcome recorded for one configured driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TargetOutcome {
    /// Installed version is at or above the minimum. Nothing fetched.
    SkippedUpToDate { installed: DriverVersion },
    /// The driver is not registered on this machine.
    SkippedNotInstalled,
    /// Staged and registered.
    Upgraded { description_file: PathBuf },
    /// Stopped at `stage`; cleanup still ran.
    Failed { stage: Stage, detail: String },
}

impl TargetOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for TargetOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkippedUpToDate { installed } => write!(f, "up to date ({installed})"),
            Self::SkippedNotInstalled => write!(f, "not installed"),
            Self::Upgraded { description_file } => {
                write!(f, "upgraded from {}", description_file.display())
            }
            Self::Failed { stage, detail } => write!(f, "failed at {stage}: {detail}"),
        }
    }
}
