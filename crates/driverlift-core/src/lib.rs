// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Driverlift: Core types, configuration and error definitions shared across
// all crates.

pub mod config;
pub mod error;
pub mod pattern;
pub mod types;
pub mod version;

pub use config::AppConfig;
pub use error::{DriverliftError, FailureScope};
pub use types::*;
pub use version::{DriverVersion, is_at_least};
