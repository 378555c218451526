// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command line surface and exit status mapping.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use driverlift_core::AppConfig;
use driverlift_pipeline::{RunReport, RunStatus};

/// Configuration file looked up beside the executable by default.
const DEFAULT_CONFIG: &str = "driverlift.json";

/// Driverlift: unattended printer driver upgrader.
///
/// Compares installed print drivers against the configured minimum versions
/// and upgrades the outdated ones from their vendor packages.
#[derive(Parser, Debug)]
#[command(name = "driverlift", author, version)]
pub struct Cli {
    /// Upgrade every configured driver, installed version notwithstanding
    #[arg(long)]
    pub skip_version_check: bool,

    /// Driver catalogue and settings (defaults to driverlift.json beside the executable)
    #[arg(long, env = "DRIVERLIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Append-only run log; overrides the configured path
    #[arg(long, env = "DRIVERLIFT_LOG")]
    pub log_file: Option<PathBuf>,

    /// Parent directory for downloads and extracted packages
    #[arg(long)]
    pub scratch_dir: Option<PathBuf>,

    /// Exit non-zero when any driver failed to upgrade
    #[arg(long)]
    pub strict: bool,

    /// Print what would be upgraded, then stop
    #[arg(long)]
    pub plan: bool,

    /// Write the run report as JSON to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(|| {
            std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_CONFIG)))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG))
        })
    }

    /// Command line values win over the configuration file.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(log_file) = &self.log_file {
            config.log_file = log_file.clone();
        }
        if let Some(scratch_dir) = &self.scratch_dir {
            config.scratch_dir = scratch_dir.clone();
        }
    }
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Run finished. Per-driver failures only show in the log and report
    /// unless `--strict` is given.
    Success,
    /// None of the configured drivers is registered here.
    NothingSupported,
    /// Configuration or inventory error; nothing was attempted.
    RunError,
    /// `--strict` and at least one driver failed.
    TargetsFailed,
}

impl ExitStatus {
    pub fn from_report(report: &RunReport, strict: bool) -> Self {
        match report.status {
            RunStatus::NothingSupported => Self::NothingSupported,
            RunStatus::Completed if strict && report.has_failures() => Self::TargetsFailed,
            RunStatus::Completed => Self::Success,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::NothingSupported => 1,
            Self::RunError => 2,
            Self::TargetsFailed => 3,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}
