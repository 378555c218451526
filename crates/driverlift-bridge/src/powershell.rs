// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Script building and output parsing for the PowerShell print-management
// cmdlets. Kept free of process spawning so it compiles and tests everywhere.

use std::collections::BTreeSet;
use std::path::Path;

/// Quote `value` as a single-quoted PowerShell literal.
///
/// Inside single quotes PowerShell expands nothing; the only special
/// character is the quote itself, which is escaped by doubling it.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub fn quote_path(path: &Path) -> String {
    quote(&path.to_string_lossy())
}

/// Lists the name of every registered print driver, one per line.
pub fn list_drivers_script() -> &'static str {
    "Get-PrinterDriver | ForEach-Object { $_.Name }"
}

/// Prints `True` or `False` depending on whether `name` is registered.
pub fn is_registered_script(name: &str) -> String {
    format!(
        "[bool](Get-PrinterDriver -Name {} -ErrorAction SilentlyContinue)",
        quote(name)
    )
}

/// Registers `name` from the given description file; fails the process on error.
pub fn register_script(name: &str, description_file: &Path) -> String {
    format!(
        "Add-PrinterDriver -Name {} -InfPath {} -ErrorAction Stop",
        quote(name),
        quote_path(description_file)
    )
}

/// Prints the four numeric file version parts of `path`, dot separated.
///
/// Uses the numeric parts rather than `FileVersion`, which is free text and
/// often carries a build-lab suffix.
pub fn file_version_script(path: &Path) -> String {
    format!(
        "$v = (Get-Item -LiteralPath {} -ErrorAction Stop).VersionInfo; \
         '{{0}}.{{1}}.{{2}}.{{3}}' -f $v.FileMajorPart, $v.FileMinorPart, $v.FileBuildPart, $v.FilePrivatePart",
        quote_path(path)
    )
}

/// Non-empty trimmed lines, deduplicated, in sorted order.
pub fn parse_name_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Parse a PowerShell boolean printed to stdout.
pub fn parse_bool(output: &str) -> Option<bool> {
    match output.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
