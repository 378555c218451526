// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run report: what happened to every configured driver, rendered as a
// plain-text summary for the log and as JSON for whoever deploys us.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;

use driverlift_core::error::Result;
use driverlift_core::types::{PipelineState, SelectionReason, TargetOutcome, Warning};

/// How the run as a whole ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every configured driver was decided on; targets were processed.
    Completed,
    /// None of the configured drivers is registered on this machine.
    NothingSupported,
}

/// Everything recorded about one configured driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetReport {
    pub name: String,
    /// Why it was selected; `None` if it was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SelectionReason>,
    pub outcome: TargetOutcome,
    /// States visited, in order. Empty for skipped drivers.
    pub states: Vec<PipelineState>,
    pub warnings: Vec<Warning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_sha256: Option<String>,
    /// `DriverVer` of the located description file, if readable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_ver: Option<String>,
}

impl TargetReport {
    /// Report for a driver that was not processed.
    pub fn skipped(name: impl Into<String>, outcome: TargetOutcome, warnings: Vec<Warning>) -> Self {
        Self {
            name: name.into(),
            reason: None,
            outcome,
            states: Vec::new(),
            warnings,
            archive_sha256: None,
            driver_ver: None,
        }
    }
}

/// Full record of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: RunStatus,
    pub platform: String,
    pub skip_version_check: bool,
    pub targets: Vec<TargetReport>,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        self.targets.iter().any(|t| t.outcome.is_failure())
    }

    pub fn upgraded(&self) -> usize {
        self.count(|o| matches!(o, TargetOutcome::Upgraded { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(TargetOutcome::is_failure)
    }

    fn count(&self, pred: impl Fn(&TargetOutcome) -> bool) -> usize {
        self.targets.iter().filter(|t| pred(&t.outcome)).count()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain-text summary, one block per driver.
    pub fn summary(&self) -> String {
        let mut text = String::from("Driverlift Run Report\n");
        let _ = writeln!(text, "Started: {}", self.started_at.format("%d %b %Y, %H:%M:%S UTC"));
        let _ = writeln!(text, "Platform: {}", self.platform);
        if self.skip_version_check {
            text.push_str("Version check: skipped\n");
        }
        text.push('\n');

        if self.status == RunStatus::NothingSupported {
            text.push_str("No configured driver is registered on this machine. Nothing to do.\n");
            return text;
        }

        for target in &self.targets {
            let _ = writeln!(text, "{}: {}", target.name, target.outcome);
            if let Some(reason) = &target.reason {
                let _ = writeln!(text, "  Selected: {reason}");
            }
            if let Some(ver) = &target.driver_ver {
                let _ = writeln!(text, "  Package DriverVer: {ver}");
            }
            for warning in &target.warnings {
                let _ = writeln!(text, "  Warning: {warning}");
            }
        }

        let _ = write!(
            text,
            "\n{} configured, {} upgraded, {} failed.\n",
            self.targets.len(),
            self.upgraded(),
            self.failed()
        );
        text
    }
}
