// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Upgrade decision policy: which configured drivers get processed this run.

use std::fmt;

use tracing::{info, warn};

use driverlift_bridge::{DriverInventory, FileVersionProbe};
use driverlift_core::error::Result;
use driverlift_core::types::{DriverSpec, InstalledDriverInfo, SelectionReason, Warning};
use driverlift_core::version::{DriverVersion, is_at_least};

use crate::inventory::list_installed;

/// What happens to one configured driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Upgrade {
        reason: SelectionReason,
        warnings: Vec<Warning>,
    },
    SkipUpToDate {
        installed: DriverVersion,
    },
    SkipNotInstalled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub spec: DriverSpec,
    pub decision: Decision,
}

/// Decisions for every configured driver, in catalogue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub skip_version_check: bool,
    pub entries: Vec<PlanEntry>,
}

impl Plan {
    pub fn upgrade_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.decision, Decision::Upgrade { .. }))
            .count()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            let name = &entry.spec.name;
            match &entry.decision {
                Decision::Upgrade { reason, .. } => {
                    writeln!(f, "upgrade  {name}: {reason} -> {}", entry.spec.url)?
                }
                Decision::SkipUpToDate { installed } => {
                    writeln!(f, "current  {name}: {installed} >= {}", entry.spec.minimum_version)?
                }
                Decision::SkipNotInstalled => writeln!(f, "absent   {name}")?,
            }
        }
        write!(f, "{} of {} to upgrade", self.upgrade_count(), self.entries.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    /// No configured driver is registered. The run stops here.
    NothingSupported,
    Ready(Plan),
}

/// Decide, without side effects, what to do with each configured driver.
///
/// With `skip_version_check` every spec is selected and the inventory is
/// never queried. An inventory query failure is returned as an error.
pub fn build_plan<B>(bridge: &B, specs: &[DriverSpec], skip_version_check: bool) -> Result<PlanOutcome>
where
    B: DriverInventory + FileVersionProbe + ?Sized,
{
    if skip_version_check {
        info!(count = specs.len(), "version check skipped; selecting every configured driver");
        let entries = specs
            .iter()
            .map(|spec| PlanEntry {
                spec: spec.clone(),
                decision: Decision::Upgrade {
                    reason: SelectionReason::VersionCheckSkipped,
                    warnings: Vec::new(),
                },
            })
            .collect();
        return Ok(PlanOutcome::Ready(Plan {
            skip_version_check,
            entries,
        }));
    }

    let installed = list_installed(bridge, specs)?;
    if installed.is_empty() {
        return Ok(PlanOutcome::NothingSupported);
    }

    let entries = specs
        .iter()
        .map(|spec| {
            let decision = match installed.get(&spec.name) {
                Some(info) => decide(spec, info),
                None => Decision::SkipNotInstalled,
            };
            PlanEntry {
                spec: spec.clone(),
                decision,
            }
        })
        .collect();

    Ok(PlanOutcome::Ready(Plan {
        skip_version_check,
        entries,
    }))
}

/// Policy for one registered driver. Anything short of a readable version
/// at or above the minimum selects it for upgrade.
pub fn decide(spec: &DriverSpec, info: &InstalledDriverInfo) -> Decision {
    let upgrade = |reason| Decision::Upgrade {
        reason,
        warnings: Vec::new(),
    };

    if info.file.is_none() {
        return upgrade(SelectionReason::NoVersionFile);
    }
    let Some(raw) = info.raw_version.as_deref() else {
        return upgrade(SelectionReason::UnreadableVersion {
            detail: "file version could not be read".into(),
        });
    };
    match (is_at_least(raw, &spec.minimum_version.to_string()), info.version) {
        (Ok(true), Some(installed)) => {
            info!(driver = %spec.name, %installed, minimum = %spec.minimum_version, "driver is current");
            Decision::SkipUpToDate { installed }
        }
        (Ok(false), Some(installed)) => upgrade(SelectionReason::Outdated {
            installed,
            minimum: spec.minimum_version,
        }),
        (verdict, _) => {
            let detail = verdict
                .err()
                .map_or_else(|| format!("`{raw}` is not a four-part version"), |e| e.to_string());
            warn!(driver = %spec.name, raw, "installed version unparsable; upgrading");
            Decision::Upgrade {
                reason: SelectionReason::UnreadableVersion { detail },
                warnings: vec![Warning::InstalledVersionUnparsable { raw: raw.to_string() }],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Call, MockBridge, spec_in};
    use std::path::PathBuf;

    fn info(file: bool, raw: Option<&str>) -> InstalledDriverInfo {
        InstalledDriverInfo {
            name: "Alpha".into(),
            file: file.then(|| PathBuf::from("DRIVER.DLL")),
            raw_version: raw.map(str::to_string),
            version: raw.and_then(|r| r.parse().ok()),
        }
    }

    fn spec(minimum: &str) -> DriverSpec {
        spec_in(std::path::Path::new("/nowhere"), "Alpha", minimum)
    }

    #[test]
    fn equal_version_is_current() {
        let d = decide(&spec("61.315.1.25959"), &info(true, Some("61.315.1.25959")));
        assert_eq!(
            d,
            Decision::SkipUpToDate {
                installed: DriverVersion::new(61, 315, 1, 25959)
            }
        );
    }

    #[test]
    fn older_version_is_outdated() {
        let d = decide(&spec("61.315.1.25959"), &info(true, Some("61.314.9.9999")));
        assert!(matches!(
            d,
            Decision::Upgrade {
                reason: SelectionReason::Outdated { .. },
                ..
            }
        ));
    }

    #[test]
    fn missing_file_fails_open() {
        let d = decide(&spec("1.0.0.0"), &info(false, None));
        assert!(matches!(
            d,
            Decision::Upgrade {
                reason: SelectionReason::NoVersionFile,
                ..
            }
        ));
    }

    #[test]
    fn unparsable_version_upgrades_with_warning() {
        let Decision::Upgrade { reason, warnings } = decide(&spec("1.0.0.0"), &info(true, Some("6.3"))) else {
            panic!("expected upgrade");
        };
        assert!(matches!(reason, SelectionReason::UnreadableVersion { .. }));
        assert_eq!(
            warnings,
            vec![Warning::InstalledVersionUnparsable { raw: "6.3".into() }]
        );
    }

    #[test]
    fn skip_flag_bypasses_inventory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bridge = MockBridge::new(&[]);
        let specs = vec![spec_in(dir.path(), "Alpha", "1.0.0.0"), spec_in(dir.path(), "Beta", "1.0.0.0")];

        let PlanOutcome::Ready(plan) = build_plan(&bridge, &specs, true).expect("plan") else {
            panic!("expected a plan");
        };
        assert_eq!(plan.upgrade_count(), 2);
        assert!(!bridge.calls().contains(&Call::Inventory));
    }

    #[test]
    fn nothing_registered_is_nothing_supported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bridge = MockBridge::new(&["Unrelated Driver"]);
        let specs = vec![spec_in(dir.path(), "Alpha", "1.0.0.0")];

        assert_eq!(
            build_plan(&bridge, &specs, false).expect("plan"),
            PlanOutcome::NothingSupported
        );
    }

    #[test]
    fn spooler_name_casing_does_not_hide_a_driver() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bridge = MockBridge::new(&["Contoso Universal PCL6"]);
        let specs = vec![spec_in(dir.path(), "Contoso universal PCL6", "1.0.0.0")];

        let PlanOutcome::Ready(plan) = build_plan(&bridge, &specs, false).expect("plan") else {
            panic!("expected a plan");
        };
        assert_eq!(plan.upgrade_count(), 1);
    }

    #[test]
    fn inventory_failure_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bridge = MockBridge::new(&["Alpha"]);
        bridge.fail_inventory();
        let specs = vec![spec_in(dir.path(), "Alpha", "1.0.0.0")];

        assert!(build_plan(&bridge, &specs, false).is_err());
    }

    #[test]
    fn plan_display_lists_every_driver() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bridge = MockBridge::new(&["Alpha", "Beta"]);
        bridge.install_version_file(dir.path(), "Alpha", "2.0.0.0");
        let specs = vec![
            spec_in(dir.path(), "Alpha", "2.0.0.0"),
            spec_in(dir.path(), "Beta", "2.0.0.0"),
            spec_in(dir.path(), "Gamma", "2.0.0.0"),
        ];

        let PlanOutcome::Ready(plan) = build_plan(&bridge, &specs, false).expect("plan") else {
            panic!("expected a plan");
        };
        let text = plan.to_string();
        assert!(text.contains("current  Alpha: 2.0.0.0 >= 2.0.0.0"));
        assert!(text.contains("upgrade  Beta: no version-bearing file found"));
        assert!(text.contains("absent   Gamma"));
        assert!(text.ends_with("1 of 3 to upgrade"));
    }
}
