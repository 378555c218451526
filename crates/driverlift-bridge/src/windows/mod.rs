// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Windows platform bridge.
//
// Driver inventory, file versions and registration go through the
// PrintManagement PowerShell cmdlets; staging goes through `pnputil`.
//
// ## Architecture notes
//
// A 32-bit process on 64-bit Windows is redirected from System32 to SysWOW64,
// where there is no `pnputil.exe`. The `Sysnative` alias reaches the real
// System32 from such a process, so it is tried first.

#![cfg(windows)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::debug;

use driverlift_core::error::{DriverliftError, Result};

use crate::powershell;
use crate::staging_output::StagingOutput;
use crate::traits::*;

// ---------------------------------------------------------------------------
// Process helpers
// ---------------------------------------------------------------------------

fn system_root() -> PathBuf {
    std::env::var_os("SystemRoot")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(r"C:\Windows"))
}

fn pnputil_path() -> PathBuf {
    let sysnative = system_root().join("Sysnative").join("pnputil.exe");
    if sysnative.is_file() {
        sysnative
    } else {
        system_root().join("System32").join("pnputil.exe")
    }
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        text.push_str(&stderr);
    }
    text
}

/// Run a PowerShell script and return its stdout. A non-zero exit status is
/// an error carrying stderr.
fn run_powershell(script: &str) -> Result<String> {
    debug!(script, "running powershell");
    let output = Command::new("powershell.exe")
        .args([
            "-NoProfile",
            "-NonInteractive",
            "-ExecutionPolicy",
            "Bypass",
            "-Command",
            script,
        ])
        .output()
        .map_err(|e| DriverliftError::Bridge(format!("cannot start powershell: {e}")))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(DriverliftError::Bridge(format!(
            "powershell exited with {}: {}",
            output.status,
            stderr.trim()
        )))
    }
}

// ---------------------------------------------------------------------------
// Bridge
// ---------------------------------------------------------------------------

/// Bridge backed by PowerShell and pnputil.
pub struct WindowsBridge;

impl WindowsBridge {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformBridge for WindowsBridge {
    fn platform_name(&self) -> &str {
        "Windows (PowerShell + pnputil)"
    }
}

impl DriverInventory for WindowsBridge {
    fn registered_drivers(&self) -> Result<Vec<String>> {
        let stdout = run_powershell(powershell::list_drivers_script())
            .map_err(|e| DriverliftError::Inventory(e.to_string()))?;
        Ok(powershell::parse_name_list(&stdout))
    }
}

impl FileVersionProbe for WindowsBridge {
    fn file_version(&self, path: &Path) -> Result<String> {
        let stdout = run_powershell(&powershell::file_version_script(path))?;
        Ok(stdout.trim().to_string())
    }
}

impl DriverStore for WindowsBridge {
    fn stage_package(&self, description_file: &Path) -> Result<StagingOutput> {
        let tool = pnputil_path();
        debug!(tool = %tool.display(), file = %description_file.display(), "running pnputil");
        let output = Command::new(&tool)
            .arg("/add-driver")
            .arg(description_file)
            .arg("/install")
            .output()
            .map_err(|e| {
                DriverliftError::Bridge(format!("cannot start {}: {e}", tool.display()))
            })?;
        Ok(StagingOutput::new(
            output.status.code(),
            combined_output(&output),
        ))
    }

    fn repository_root(&self) -> Option<PathBuf> {
        Some(
            system_root()
                .join("System32")
                .join("DriverStore")
                .join("FileRepository"),
        )
    }
}

impl PrintDriverRegistry for WindowsBridge {
    fn is_registered(&self, name: &str) -> Result<bool> {
        let stdout = run_powershell(&powershell::is_registered_script(name))?;
        powershell::parse_bool(&stdout).ok_or_else(|| {
            DriverliftError::Bridge(format!("unexpected registration query output `{}`", stdout.trim()))
        })
    }

    fn register(&self, name: &str, description_file: &Path) -> Result<()> {
        run_powershell(&powershell::register_script(name, description_file))
            .map(|_| ())
            .map_err(|e| DriverliftError::Registration(e.to_string()))
    }
}
