// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Artifact fetcher: downloads a driver package archive into scratch space.
//
// No retries here. A failed download fails the current target only; the
// scheduler that launches the whole run decides whether to try again later.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use driverlift_core::error::{DriverliftError, Result};

/// Retrieves a package archive.
pub trait ArtifactFetcher {
    /// Download `url` to `dest`, overwriting it. A partially written `dest`
    /// may remain on failure; the caller's cleanup removes it.
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Blocking HTTP(S) fetcher.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Build a fetcher. `timeout` of `None` waits indefinitely on a silent
    /// server; set one if the run must be bounded.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("driverlift/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| DriverliftError::Network(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl ArtifactFetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        info!(url, dest = %dest.display(), "download started");

        let mut response = self
            .client
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| DriverliftError::Network(format!("{url}: {e}")))?;

        debug!(status = %response.status(), length = ?response.content_length(), "response received");

        let mut out = BufWriter::new(File::create(dest)?);
        let written = response
            .copy_to(&mut out)
            .map_err(|e| DriverliftError::Network(format!("{url}: body read failed: {e}")))?;
        out.flush()?;

        info!(url, bytes = written, "download finished");
        Ok(())
    }
}
