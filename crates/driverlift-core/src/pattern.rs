// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Glob patterns used by driver specs.
//
// All matching is case-insensitive: the drivers live on a file system that
// is. Patterns and candidates are both lower-cased; wax's `(?i)` flag cannot
// sit in front of a leading `**`. Backslashes are accepted as path separators and normalized to '/'
// before wax sees them, so patterns cannot use backslash escapes.

use std::fmt;
use std::path::{Path, PathBuf};

use wax::{CandidatePath, Glob, Pattern};

use crate::error::{DriverliftError, Result};

/// Characters that make a path component a wildcard component.
const WILDCARDS: &[char] = &['*', '?', '[', '{', '<'];

fn compile(pattern: &str) -> Result<Glob<'static>> {
    Glob::new(&pattern.to_lowercase())
        .map(Glob::into_owned)
        .map_err(|e| DriverliftError::InvalidPattern {
            pattern: pattern.to_string(),
            detail: e.to_string(),
        })
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

/// Matches bare file names (no directory part), e.g. `*.inf`.
#[derive(Clone)]
pub struct NameGlob {
    source: String,
    glob: Glob<'static>,
}

impl NameGlob {
    pub fn parse(pattern: &str) -> Result<Self> {
        Ok(Self {
            source: pattern.to_string(),
            glob: compile(pattern)?,
        })
    }

    pub fn matches(&self, file_name: &str) -> bool {
        let candidate = file_name.to_lowercase();
        self.glob.is_match(CandidatePath::from(candidate.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for NameGlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NameGlob").field(&self.source).finish()
    }
}

/// An absolute file glob split into a literal search root and a pattern
/// relative to it.
///
/// `C:\Windows\System32\spool\drivers\*\3\CNUPCL6.DLL` becomes the root
/// `C:/Windows/System32/spool/drivers` and the pattern `*/3/CNUPCL6.DLL`.
/// A glob without wildcards searches its parent directory for the literal
/// file name.
#[derive(Clone)]
pub struct FileGlob {
    source: String,
    root: PathBuf,
    pattern: String,
    glob: Glob<'static>,
}

impl FileGlob {
    pub fn parse(expr: &str) -> Result<Self> {
        let normalized = normalize(expr.trim());
        let components: Vec<&str> = normalized.split('/').collect();
        if components.last().is_none_or(|c| c.is_empty()) {
            return Err(DriverliftError::InvalidPattern {
                pattern: expr.to_string(),
                detail: "glob must name a file".into(),
            });
        }

        let split = components
            .iter()
            .position(|c| c.contains(WILDCARDS))
            .unwrap_or(components.len() - 1);

        let mut root = components[..split].join("/");
        if root.is_empty() {
            root = if normalized.starts_with('/') { "/" } else { "." }.to_string();
        } else if root.ends_with(':') {
            // A bare drive letter means "current directory on that drive".
            root.push('/');
        }
        let pattern = components[split..].join("/");

        Ok(Self {
            source: expr.to_string(),
            root: PathBuf::from(root),
            glob: compile(&pattern)?,
            pattern,
        })
    }

    /// Directory the search starts from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Pattern applied to paths relative to [`Self::root`].
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Number of path components the pattern spans, or `None` when a `**`
    /// makes the depth unbounded.
    pub fn depth(&self) -> Option<usize> {
        if self.pattern.contains("**") {
            None
        } else {
            Some(self.pattern.split('/').count())
        }
    }

    /// Match a path relative to the root.
    pub fn matches_relative(&self, relative: &Path) -> bool {
        let candidate = normalize(&relative.to_string_lossy()).to_lowercase();
        self.glob.is_match(CandidatePath::from(candidate.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for FileGlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileGlob")
            .field("root", &self.root)
            .field("pattern", &self.pattern)
            .finish()
    }
}
