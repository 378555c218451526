// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Driverlift Pipeline: inventory, package fetch and extraction, driver store
// staging and registration, driven per driver by the `Upgrader`. OS access
// goes through the traits in `driverlift-bridge`.

pub mod driver_ver;
pub mod extract;
pub mod fetch;
pub mod integrity;
pub mod inventory;
pub mod orchestrator;
pub mod plan;
pub mod register;
pub mod report;
pub mod scratch;
pub mod stage;

#[cfg(test)]
mod test_support;

pub use fetch::{ArtifactFetcher, HttpFetcher};
pub use orchestrator::{RunOptions, Upgrader};
pub use plan::{Decision, Plan, PlanOutcome};
pub use report::{RunReport, RunStatus, TargetReport};
pub use scratch::ScratchArea;
