// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Staging tool output classification.
//
// FRAGILE: the driver store tool reports some failures only in its text
// output, so part of this verdict is substring matching on human-readable,
// possibly localized messages. Everything that sniffs text lives here so the
// heuristic can be changed and tested on its own. The exit code is consulted
// first whenever the tool provides one.

/// Exit codes the staging tool uses for success.
///
/// 259 is ERROR_NO_MORE_ITEMS: the package was added but no present device
/// uses it, which is normal for print-class packages and for re-runs.
/// 3010 is ERROR_SUCCESS_REBOOT_REQUIRED: the package is staged but a reboot
/// finishes the install.
const SUCCESS_CODES: &[i32] = &[0, 259, 3010];

/// Lower-cased fragments that mark a failed staging attempt. Device install
/// failures ("failed to install on any devices") are not among them; the
/// package is staged regardless.
const FAILURE_MARKERS: &[&str] = &[
    "failed to add",
    "adding the driver package failed",
    "error:",
    "access is denied",
    "is not recognized",
];

/// Raw output of one staging tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingOutput {
    /// Process exit code; `None` if the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Combined stdout and stderr.
    pub text: String,
}

/// What the staging output says happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagingVerdict {
    Staged { reboot_required: bool },
    Failed { reason: String },
}

impl StagingOutput {
    pub fn new(exit_code: Option<i32>, text: impl Into<String>) -> Self {
        Self {
            exit_code,
            text: text.into(),
        }
    }

    /// Classify the output.
    ///
    /// A non-success exit code fails regardless of text. A success code can
    /// still fail if the text carries a failure marker, because the tool
    /// exits 0 for some per-file failures.
    pub fn verdict(&self) -> StagingVerdict {
        match self.exit_code {
            Some(code) if !SUCCESS_CODES.contains(&code) => {
                return StagingVerdict::Failed {
                    reason: format!("exit code {code}: {}", self.first_line()),
                };
            }
            None => {
                return StagingVerdict::Failed {
                    reason: "staging tool terminated without an exit code".into(),
                };
            }
            Some(_) => {}
        }

        let lower = self.text.to_lowercase();
        if let Some(marker) = FAILURE_MARKERS.iter().find(|m| lower.contains(*m)) {
            let line = self
                .text
                .lines()
                .find(|l| l.to_lowercase().contains(marker))
                .unwrap_or_default()
                .trim();
            return StagingVerdict::Failed {
                reason: line.to_string(),
            };
        }

        StagingVerdict::Staged {
            reboot_required: self.exit_code == Some(3010),
        }
    }

    fn first_line(&self) -> &str {
        self.text
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("no output")
    }
}
