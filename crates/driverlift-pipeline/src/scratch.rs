// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-target scratch space.
//
// Every target gets its own archive path and extraction directory under the
// scratch root, named after the target so two targets never share a path.
// The names are sanitized and suffixed with a short digest of the full name,
// which keeps "A B" and "A_B" apart.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use driverlift_core::error::Result;

use crate::integrity::hash_bytes;

/// Longest sanitized name prefix kept in scratch paths.
const MAX_STEM: usize = 48;

/// Parent directory of all per-target scratch paths.
#[derive(Debug, Clone)]
pub struct ScratchArea {
    root: PathBuf,
}

impl ScratchArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scratch paths for one target. Nothing is created on disk yet.
    pub fn for_target(&self, name: &str) -> TargetScratch {
        let stem = scratch_stem(name);
        TargetScratch {
            archive: self.root.join(format!("{stem}.zip")),
            extract_dir: self.root.join(&stem),
            released: false,
        }
    }

    /// Remove the root if it is empty. Leaves it alone otherwise.
    pub fn release(&self) {
        match fs::remove_dir(&self.root) {
            Ok(()) => debug!(root = %self.root.display(), "scratch root removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => debug!(root = %self.root.display(), error = %e, "scratch root kept"),
        }
    }
}

/// Filesystem-safe, collision-free directory stem for `name`.
pub fn scratch_stem(name: &str) -> String {
    let mut stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .take(MAX_STEM)
        .collect();
    stem.push('-');
    stem.push_str(&hash_bytes(name.as_bytes())[..8]);
    stem
}

/// The archive and extraction directory belonging to one target.
///
/// [`TargetScratch::cleanup`] removes both and reports failures. If the
/// value is dropped without an explicit cleanup (an early return or a
/// panic), `Drop` removes them silently.
#[derive(Debug)]
pub struct TargetScratch {
    archive: PathBuf,
    extract_dir: PathBuf,
    released: bool,
}

impl TargetScratch {
    pub fn archive(&self) -> &Path {
        &self.archive
    }

    pub fn extract_dir(&self) -> &Path {
        &self.extract_dir
    }

    /// Make sure the archive's parent directory exists.
    pub fn prepare(&self) -> Result<()> {
        if let Some(parent) = self.archive.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Remove the archive and the extraction directory. Missing paths are
    /// fine; both removals are attempted even if the first fails.
    pub fn cleanup(&mut self) -> Result<()> {
        self.released = true;
        let archive = remove_path(&self.archive, false);
        let tree = remove_path(&self.extract_dir, true);
        archive.and(tree)
    }
}

impl Drop for TargetScratch {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = self.cleanup() {
                warn!(error = %e, "scratch cleanup on drop failed");
            }
        }
    }
}

fn remove_path(path: &Path, dir: bool) -> Result<()> {
    let result = if dir {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => {
            debug!(path = %path.display(), "removed");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
