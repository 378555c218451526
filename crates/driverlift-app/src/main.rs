// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Driverlift: unattended printer driver upgrader
//
// Entry point. Loads configuration, initialises logging, then runs the
// upgrade pipeline once over the configured driver catalogue.

mod cli;
mod logging;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use driverlift_bridge::platform_bridge;
use driverlift_core::AppConfig;
use driverlift_core::error::Result;
use driverlift_pipeline::{HttpFetcher, PlanOutcome, RunOptions, ScratchArea, Upgrader};

use cli::{Cli, ExitStatus};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config_path();

    let loaded = AppConfig::load(&config_path).map(|mut config| {
        cli.apply(&mut config);
        config
    });
    let log_file = match &loaded {
        Ok(config) => config.log_file.clone(),
        Err(_) => cli
            .log_file
            .clone()
            .unwrap_or_else(|| AppConfig::default().log_file),
    };
    logging::init(&log_file);

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!(config = %config_path.display(), error = %e, "configuration rejected");
            return ExitStatus::RunError.into();
        }
    };
    info!(
        config = %config_path.display(),
        drivers = config.drivers.len(),
        "Driverlift {} starting",
        env!("CARGO_PKG_VERSION")
    );

    match run(&cli, &config) {
        Ok(status) => status.into(),
        Err(e) => {
            error!(error = %e, "run aborted");
            ExitStatus::RunError.into()
        }
    }
}

fn run(cli: &Cli, config: &AppConfig) -> Result<ExitStatus> {
    let bridge = platform_bridge();
    let fetcher = HttpFetcher::new(config.download_timeout_secs.map(Duration::from_secs))?;
    let upgrader = Upgrader::new(
        bridge.as_ref(),
        &fetcher,
        ScratchArea::new(config.scratch_dir.clone()),
    )
    .with_driver_store_root(config.driver_store_root.clone());
    let options = RunOptions {
        skip_version_check: cli.skip_version_check,
    };

    if cli.plan {
        return Ok(match upgrader.plan(&config.drivers, options)? {
            PlanOutcome::NothingSupported => {
                println!("No configured driver is registered on this machine.");
                ExitStatus::NothingSupported
            }
            PlanOutcome::Ready(plan) => {
                println!("{plan}");
                ExitStatus::Success
            }
        });
    }

    let report = upgrader.run(&config.drivers, options)?;
    for line in report.summary().lines().filter(|l| !l.is_empty()) {
        info!(target: "driverlift::summary", "{line}");
    }

    // The run already happened; a report that cannot be written does not
    // change the exit status.
    if let Some(path) = &cli.report {
        let written = report
            .to_json()
            .and_then(|json| std::fs::write(path, json).map_err(Into::into));
        match written {
            Ok(()) => info!(path = %path.display(), "run report written"),
            Err(e) => error!(path = %path.display(), error = %e, "cannot write run report"),
        }
    }

    Ok(ExitStatus::from_report(&report, cli.strict))
}
