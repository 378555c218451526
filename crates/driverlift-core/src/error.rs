// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Driverlift.

use thiserror::Error;

/// How far the effects of an error reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureScope {
    /// Logged, then the pipeline carries on (possibly on a fallback path).
    NonFatal,
    /// Ends processing of the current driver only. Siblings are unaffected.
    Target,
    /// The run cannot start or continue at all.
    Run,
}

/// Top-level error type for all Driverlift operations.
#[derive(Debug, Error)]
pub enum DriverliftError {
    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid glob pattern `{pattern}`: {detail}")]
    InvalidPattern { pattern: String, detail: String },

    // -- Version detection --
    #[error("unparsable driver version `{raw}`: expected four numeric components")]
    VersionParse { raw: String },

    #[error("driver inventory query failed: {0}")]
    Inventory(String),

    // -- Package acquisition --
    #[error("download failed: {0}")]
    Network(String),

    #[error("archive extraction failed: {0}")]
    Extraction(String),

    #[error("no description file matching `{pattern}` containing `{marker}` found in package")]
    DescriptionNotFound { pattern: String, marker: String },

    // -- Driver store / print subsystem --
    #[error("driver staging failed: {0}")]
    Staging(String),

    #[error("staged copy of `{0}` not found in the driver store")]
    StagedPathNotFound(String),

    #[error("driver registration failed: {0}")]
    Registration(String),

    // -- Platform bridge --
    #[error("platform command failed: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DriverliftError {
    /// Classify this error by how much of the run it takes down.
    pub fn scope(&self) -> FailureScope {
        match self {
            Self::VersionParse { .. } | Self::StagedPathNotFound(_) => FailureScope::NonFatal,

            Self::Config(_) | Self::InvalidPattern { .. } | Self::Inventory(_) => {
                FailureScope::Run
            }

            Self::Network(_)
            | Self::Extraction(_)
            | Self::DescriptionNotFound { .. }
            | Self::Staging(_)
            | Self::Registration(_)
            | Self::Bridge(_)
            | Self::PlatformUnavailable
            | Self::Io(_)
            | Self::Serialization(_) => FailureScope::Target,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DriverliftError>;
