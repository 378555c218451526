// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Driverlift: Operating system bridge abstractions.
//!
//! This crate defines the traits through which the upgrade pipeline talks to
//! the print subsystem and the driver store, and picks the implementation
//! for the target operating system.

pub mod powershell;
pub mod staging_output;
pub mod traits;

#[cfg(windows)]
pub mod windows;

#[cfg(not(windows))]
pub mod stub;

pub use staging_output::{StagingOutput, StagingVerdict};
pub use traits::*;

/// Retrieves the bridge implementation for the target operating system.
pub fn platform_bridge() -> Box<dyn traits::PlatformBridge> {
    #[cfg(windows)]
    {
        // Windows: PrintManagement cmdlets for inventory/registration, pnputil for staging.
        Box::new(windows::WindowsBridge::new())
    }
    #[cfg(not(windows))]
    {
        // Elsewhere: nothing is registered, nothing can be staged.
        Box::new(stub::StubBridge)
    }
}
