// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Driver stager: hands the description file to the driver store and works
// out where the store put its copy.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use driverlift_bridge::{DriverStore, StagingVerdict};
use driverlift_core::error::{DriverliftError, Result};
use driverlift_core::types::{Warned, Warning};

/// Depth of description files below the repository root
/// (`<root>/<package folder>/<file>`).
const REPOSITORY_DEPTH: usize = 2;

/// Stage `description_file` and return the path registration should use.
///
/// The staged copy is searched for under `repository`, or under the store's
/// own repository root when that is `None`. Staging failures are errors.
/// Failing to find the staged copy is not: the original path is returned
/// with a [`Warning::StagedPathFallback`].
pub fn stage<S>(store: &S, description_file: &Path, repository: Option<&Path>) -> Result<Warned<PathBuf>>
where
    S: DriverStore + ?Sized,
{
    let output = store.stage_package(description_file)?;
    for line in output.text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        info!(target: "driverlift::staging_output", "{line}");
    }

    match output.verdict() {
        StagingVerdict::Failed { reason } => return Err(DriverliftError::Staging(reason)),
        StagingVerdict::Staged { reboot_required } => {
            if reboot_required {
                warn!("driver staged; a reboot is required to finish installation");
            }
        }
    }

    let root = repository
        .map(Path::to_path_buf)
        .or_else(|| store.repository_root());
    let staged = description_file
        .file_name()
        .zip(root)
        .and_then(|(name, root)| find_staged_copy(&root, &name.to_string_lossy()));

    match staged {
        Some(path) => {
            info!(path = %path.display(), "staged copy located");
            Ok(Warned::clean(path))
        }
        None => {
            let err = DriverliftError::StagedPathNotFound(description_file.display().to_string());
            warn!(error = %err, "falling back to extracted description file");
            Ok(Warned::with_warning(
                description_file.to_path_buf(),
                Warning::StagedPathFallback {
                    original: description_file.to_path_buf(),
                },
            ))
        }
    }
}

/// Search the driver store repository for a file named `file_name`
/// (case-insensitive). Older staged versions may still be present, so the
/// match whose package folder was modified last wins; ties go to the first
/// in path order.
///
/// The folder is compared, not the file: the store copies files with their
/// vendor timestamps intact, so an older package can carry a newer file time.
/// The folder is created when the package is staged.
pub fn find_staged_copy(root: &Path, file_name: &str) -> Option<PathBuf> {
    if !root.is_dir() {
        debug!(root = %root.display(), "driver store repository missing");
        return None;
    }

    let mut best: Option<(SystemTime, PathBuf)> = None;
    let matches = WalkDir::new(root)
        .min_depth(REPOSITORY_DEPTH)
        .max_depth(REPOSITORY_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_string_lossy().eq_ignore_ascii_case(file_name));

    for entry in matches {
        let modified = entry
            .path()
            .parent()
            .and_then(|folder| folder.metadata().ok())
            .and_then(|m| m.modified().ok())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        if best.as_ref().is_none_or(|(t, _)| modified > *t) {
            best = Some((modified, entry.into_path()));
        }
    }

    best.map(|(_, path)| path)
}
