// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Upgrade orchestrator: decides which drivers to process, then drives each
// one through fetch -> extract -> locate -> stage -> register -> cleanup.
//
// Targets run one after another and share nothing but the scratch root.
// A failing stage ends that target only; cleanup runs regardless.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use driverlift_bridge::PlatformBridge;
use driverlift_core::error::{DriverliftError, Result};
use driverlift_core::pattern::NameGlob;
use driverlift_core::types::{
    DriverSpec, PipelineState, Stage, TargetOutcome, UpgradeTarget, Warning,
};

use crate::driver_ver::parse_driver_ver;
use crate::extract::{extract, locate_description_file, read_text};
use crate::fetch::ArtifactFetcher;
use crate::integrity::hash_file;
use crate::plan::{Decision, Plan, PlanOutcome, build_plan};
use crate::register::register;
use crate::report::{RunReport, RunStatus, TargetReport};
use crate::scratch::{ScratchArea, TargetScratch};
use crate::stage::stage;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Upgrade every configured driver without looking at installed versions.
    pub skip_version_check: bool,
}

/// A stage error tagged with the stage it came from.
#[derive(Debug)]
struct StageFailure {
    stage: Stage,
    error: DriverliftError,
}

fn at(stage: Stage) -> impl FnOnce(DriverliftError) -> StageFailure {
    move |error| StageFailure { stage, error }
}

/// Per-target bookkeeping while its pipeline runs.
#[derive(Debug)]
struct TargetRun {
    states: Vec<PipelineState>,
    warnings: Vec<Warning>,
    archive_sha256: Option<String>,
    driver_ver: Option<String>,
}

impl TargetRun {
    fn new(warnings: Vec<Warning>) -> Self {
        Self {
            states: vec![PipelineState::Pending],
            warnings,
            archive_sha256: None,
            driver_ver: None,
        }
    }

    fn advance(&mut self, completed: Stage) {
        let next = PipelineState::after(completed);
        debug!(state = ?next, "state reached");
        self.states.push(next);
    }
}

/// Runs the upgrade pipeline against one machine.
pub struct Upgrader<'a> {
    bridge: &'a dyn PlatformBridge,
    fetcher: &'a dyn ArtifactFetcher,
    scratch: ScratchArea,
    driver_store_root: Option<PathBuf>,
}

impl<'a> Upgrader<'a> {
    pub fn new(
        bridge: &'a dyn PlatformBridge,
        fetcher: &'a dyn ArtifactFetcher,
        scratch: ScratchArea,
    ) -> Self {
        Self {
            bridge,
            fetcher,
            scratch,
            driver_store_root: None,
        }
    }

    /// Search this directory for staged copies instead of the store's own
    /// repository root.
    pub fn with_driver_store_root(mut self, root: Option<PathBuf>) -> Self {
        self.driver_store_root = root;
        self
    }

    /// Decide what a run would do, without fetching or changing anything.
    pub fn plan(&self, specs: &[DriverSpec], options: RunOptions) -> Result<PlanOutcome> {
        build_plan(self.bridge, specs, options.skip_version_check)
    }

    /// Plan, then process every selected driver.
    ///
    /// Only run-level problems are errors: an inventory that cannot be
    /// queried. Everything that goes wrong for a single driver ends up in
    /// that driver's [`TargetReport`].
    pub fn run(&self, specs: &[DriverSpec], options: RunOptions) -> Result<RunReport> {
        let started_at = Utc::now();
        info!(
            platform = self.bridge.platform_name(),
            configured = specs.len(),
            skip_version_check = options.skip_version_check,
            "driver upgrade run started"
        );

        let (status, targets) = match self.plan(specs, options)? {
            PlanOutcome::NothingSupported => {
                warn!("none of the configured drivers is registered on this machine");
                (RunStatus::NothingSupported, Vec::new())
            }
            PlanOutcome::Ready(plan) => (RunStatus::Completed, self.execute(plan)),
        };

        let report = RunReport {
            started_at,
            finished_at: Utc::now(),
            status,
            platform: self.bridge.platform_name().to_string(),
            skip_version_check: options.skip_version_check,
            targets,
        };
        info!(
            upgraded = report.upgraded(),
            failed = report.failed(),
            "driver upgrade run finished"
        );
        Ok(report)
    }

    fn execute(&self, plan: Plan) -> Vec<TargetReport> {
        let any_upgrades = plan.upgrade_count() > 0;
        let reports = plan
            .entries
            .into_iter()
            .map(|entry| match entry.decision {
                Decision::Upgrade { reason, warnings } => self.process(
                    UpgradeTarget {
                        spec: entry.spec,
                        reason,
                    },
                    warnings,
                ),
                Decision::SkipUpToDate { installed } => TargetReport::skipped(
                    entry.spec.name,
                    TargetOutcome::SkippedUpToDate { installed },
                    Vec::new(),
                ),
                Decision::SkipNotInstalled => {
                    debug!(driver = %entry.spec.name, "not registered; skipped");
                    TargetReport::skipped(entry.spec.name, TargetOutcome::SkippedNotInstalled, Vec::new())
                }
            })
            .collect();

        if any_upgrades {
            self.scratch.release();
        }
        reports
    }

    #[instrument(skip_all, fields(driver = %target.spec.name))]
    fn process(&self, target: UpgradeTarget, warnings: Vec<Warning>) -> TargetReport {
        info!(reason = %target.reason, "upgrade started");
        let mut run = TargetRun::new(warnings);
        let mut scratch = self.scratch.for_target(&target.spec.name);

        let outcome = match self.pipeline(&target.spec, &scratch, &mut run) {
            Ok(description_file) => {
                info!(file = %description_file.display(), "driver upgraded");
                TargetOutcome::Upgraded { description_file }
            }
            Err(StageFailure { stage, error }) => {
                error!(%stage, error = %error, "upgrade failed");
                run.states.push(PipelineState::Failed(stage));
                TargetOutcome::Failed {
                    stage,
                    detail: error.to_string(),
                }
            }
        };

        if let Err(e) = scratch.cleanup() {
            warn!(error = %e, "scratch cleanup incomplete");
            run.warnings.push(Warning::CleanupIncomplete {
                detail: e.to_string(),
            });
        }
        run.states.push(PipelineState::CleanedUp);

        TargetReport {
            name: target.spec.name,
            reason: Some(target.reason),
            outcome,
            states: run.states,
            warnings: run.warnings,
            archive_sha256: run.archive_sha256,
            driver_ver: run.driver_ver,
        }
    }

    /// Stages in order. Returns the description file registration used.
    fn pipeline(
        &self,
        spec: &DriverSpec,
        scratch: &TargetScratch,
        run: &mut TargetRun,
    ) -> std::result::Result<PathBuf, StageFailure> {
        scratch.prepare().map_err(at(Stage::Fetch))?;
        self.fetcher
            .fetch(&spec.url, scratch.archive())
            .map_err(at(Stage::Fetch))?;
        run.advance(Stage::Fetch);
        run.archive_sha256 = log_digest(scratch.archive());

        extract(scratch.archive(), scratch.extract_dir()).map_err(at(Stage::Extract))?;
        run.advance(Stage::Extract);

        let pattern = NameGlob::parse(&spec.description_pattern).map_err(at(Stage::Locate))?;
        let description_file =
            locate_description_file(scratch.extract_dir(), &pattern, &spec.description_marker)
                .map_err(at(Stage::Locate))?;
        run.advance(Stage::Locate);
        record_driver_ver(&description_file, run);

        let staged = stage(
            self.bridge,
            &description_file,
            self.driver_store_root.as_deref(),
        )
        .map_err(at(Stage::Stage))?;
        run.warnings.extend(staged.warnings);
        run.advance(Stage::Stage);

        let registered = register(self.bridge, &spec.name, &staged.value).map_err(at(Stage::Register))?;
        run.warnings.extend(registered.warnings);
        run.advance(Stage::Register);

        Ok(staged.value)
    }
}

fn log_digest(archive: &Path) -> Option<String> {
    match hash_file(archive) {
        Ok((digest, bytes)) => {
            info!(sha256 = %digest, bytes, "archive downloaded");
            Some(digest)
        }
        Err(e) => {
            debug!(error = %e, "archive digest unavailable");
            None
        }
    }
}

fn record_driver_ver(description_file: &Path, run: &mut TargetRun) {
    let parsed = read_text(description_file)
        .map_err(|e| e.to_string())
        .and_then(|text| parse_driver_ver(&text).map_err(|e| e.to_string()));
    match parsed {
        Ok(driver_ver) => {
            info!(%driver_ver, "package DriverVer");
            run.driver_ver = Some(driver_ver.to_string());
        }
        Err(detail) => {
            warn!(%detail, "package DriverVer unreadable");
            run.warnings.push(Warning::DriverVerUnreadable { detail });
        }
    }
}
