// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Driver registrar: binds a logical driver name to a staged description file.

use std::path::Path;

use tracing::{info, warn};

use driverlift_bridge::PrintDriverRegistry;
use driverlift_core::error::{DriverliftError, Result};
use driverlift_core::types::{Warned, Warning};

/// Register `name` from `description_file`.
///
/// Registration is attempted even if the driver is already registered, since
/// that is how the new package replaces the old one. If the registry reports
/// an error but the driver turns out to be registered afterwards, the result
/// carries a [`Warning::RegisteredDespiteError`] instead of failing.
pub fn register<R>(registry: &R, name: &str, description_file: &Path) -> Result<Warned<()>>
where
    R: PrintDriverRegistry + ?Sized,
{
    match registry.is_registered(name) {
        Ok(before) => info!(driver = name, registered = before, "registration status before upgrade"),
        Err(e) => warn!(driver = name, error = %e, "cannot query registration status"),
    }

    let err = match registry.register(name, description_file) {
        Ok(()) => {
            info!(driver = name, file = %description_file.display(), "driver registered");
            return Ok(Warned::clean(()));
        }
        Err(e) => e,
    };

    let detail = match err {
        DriverliftError::Registration(detail) => detail,
        other => other.to_string(),
    };

    match registry.is_registered(name) {
        Ok(true) => {
            warn!(driver = name, error = %detail, "registration reported an error but driver is registered");
            Ok(Warned::with_warning((), Warning::RegisteredDespiteError { detail }))
        }
        Ok(false) => Err(DriverliftError::Registration(detail)),
        Err(requery) => Err(DriverliftError::Registration(format!(
            "{detail}; status re-query failed: {requery}"
        ))),
    }
}
