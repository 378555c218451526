// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Driver inventory: which configured drivers are registered here, and what
// version their on-disk binary carries.
//
// Read-only. Nothing in this module changes machine state.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use driverlift_bridge::{DriverInventory, FileVersionProbe};
use driverlift_core::error::Result;
use driverlift_core::pattern::FileGlob;
use driverlift_core::types::{DriverSpec, InstalledDriverInfo};

/// Resolve a version-file glob to at most one file.
///
/// The walk is sorted by file name, so when the glob matches several files
/// (one per architecture folder, say) the first in path order wins.
/// Unreadable directories are skipped.
pub fn resolve_version_file(glob: &FileGlob) -> Option<PathBuf> {
    let root = glob.root();
    if !root.is_dir() {
        debug!(root = %root.display(), "version file search root missing");
        return None;
    }

    let mut walk = WalkDir::new(root).min_depth(1).sort_by_file_name();
    if let Some(depth) = glob.depth() {
        walk = walk.max_depth(depth);
    }

    walk.into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .find(|e| {
            e.path()
                .strip_prefix(root)
                .is_ok_and(|rel| glob.matches_relative(rel))
        })
        .map(walkdir::DirEntry::into_path)
}

/// Query the registered drivers and describe every configured one that is
/// registered. Drivers that are configured but not registered are absent
/// from the map.
///
/// Names compare case-insensitively, as the spooler does. The map is keyed
/// by the configured name.
pub fn list_installed<B>(bridge: &B, specs: &[DriverSpec]) -> Result<BTreeMap<String, InstalledDriverInfo>>
where
    B: DriverInventory + FileVersionProbe + ?Sized,
{
    let registered: HashSet<String> = bridge
        .registered_drivers()?
        .iter()
        .map(|name| name.to_lowercase())
        .collect();
    info!(count = registered.len(), "registered print drivers queried");

    let mut installed = BTreeMap::new();
    for spec in specs
        .iter()
        .filter(|s| registered.contains(&s.name.to_lowercase()))
    {
        let info = describe(bridge, spec);
        installed.insert(spec.name.clone(), info);
    }
    Ok(installed)
}

fn describe<B>(bridge: &B, spec: &DriverSpec) -> InstalledDriverInfo
where
    B: FileVersionProbe + ?Sized,
{
    let glob = match FileGlob::parse(&spec.version_file) {
        Ok(glob) => glob,
        Err(e) => {
            // Validated at load time; only reachable with hand-built specs.
            warn!(driver = %spec.name, error = %e, "version file glob invalid");
            return InstalledDriverInfo::without_file(&spec.name);
        }
    };

    let Some(file) = resolve_version_file(&glob) else {
        info!(driver = %spec.name, glob = glob.as_str(), "no version-bearing file found");
        return InstalledDriverInfo::without_file(&spec.name);
    };

    let raw_version = match bridge.file_version(&file) {
        Ok(raw) => Some(raw),
        Err(e) => {
            warn!(driver = %spec.name, file = %file.display(), error = %e, "cannot read file version");
            None
        }
    };
    let version = raw_version.as_deref().and_then(|raw| raw.parse().ok());

    info!(
        driver = %spec.name,
        file = %file.display(),
        version = raw_version.as_deref().unwrap_or("unknown"),
        "installed driver found"
    );

    InstalledDriverInfo {
        name: spec.name.clone(),
        file: Some(file),
        raw_version,
        version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockBridge, spec_in};
    use driverlift_core::version::DriverVersion;
    use std::fs;

    #[test]
    fn first_match_in_path_order_wins() {
        let dir = tempfile::tempdir().expect("tempdir");
        for arch in ["x64", "W32X86", "arm64"] {
            let folder = dir.path().join(arch).join("3");
            fs::create_dir_all(&folder).expect("mkdir");
            fs::write(folder.join("DRV.DLL"), b"x").expect("write");
        }
        let glob = FileGlob::parse(&format!("{}/*/3/drv.dll", dir.path().display())).expect("glob");

        let found = resolve_version_file(&glob).expect("found");
        assert_eq!(found, dir.path().join("W32X86/3/DRV.DLL"));
    }

    #[test]
    fn missing_root_resolves_to_none() {
        let glob = FileGlob::parse("/nonexistent/driverlift/*/DRV.DLL").expect("glob");
        assert!(resolve_version_file(&glob).is_none());
    }

    #[test]
    fn directories_never_match() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("x64/DRV.DLL")).expect("mkdir");
        let glob = FileGlob::parse(&format!("{}/*/DRV.DLL", dir.path().display())).expect("glob");
        assert!(resolve_version_file(&glob).is_none());
    }

    #[test]
    fn only_registered_specs_are_listed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = spec_in(dir.path(), "A", "1.0.0.0");
        let b = spec_in(dir.path(), "B", "1.0.0.0");
        let bridge = MockBridge::new(&["A", "Unrelated Driver"]);

        let installed = list_installed(&bridge, &[a, b]).expect("inventory");
        assert_eq!(installed.keys().collect::<Vec<_>>(), vec!["A"]);
        assert!(installed["A"].file.is_none());
    }

    #[test]
    fn registered_names_match_regardless_of_case() {
        let dir = tempfile::tempdir().expect("tempdir");
        let spec = spec_in(dir.path(), "Contoso universal PCL6", "1.0.0.0");
        let bridge = MockBridge::new(&["Contoso Universal PCL6"]);

        let installed = list_installed(&bridge, &[spec]).expect("inventory");
        assert_eq!(
            installed.keys().collect::<Vec<_>>(),
            vec!["Contoso universal PCL6"]
        );
    }

    #[test]
    fn version_is_read_from_resolved_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = spec_in(dir.path(), "A", "1.0.0.0");
        let bridge = MockBridge::new(&["A"]);
        bridge.install_version_file(dir.path(), "A", "61.315.1.25959");

        let installed = list_installed(&bridge, &[a]).expect("inventory");
        let info = &installed["A"];
        assert!(info.file.is_some());
        assert_eq!(info.version, Some(DriverVersion::new(61, 315, 1, 25959)));
    }

    #[test]
    fn unparsable_version_keeps_raw_string() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = spec_in(dir.path(), "A", "1.0.0.0");
        let bridge = MockBridge::new(&["A"]);
        bridge.install_version_file(dir.path(), "A", "6.1 (beta)");

        let installed = list_installed(&bridge, &[a]).expect("inventory");
        assert_eq!(installed["A"].raw_version.as_deref(), Some("6.1 (beta)"));
        assert_eq!(installed["A"].version, None);
    }

    #[test]
    fn inventory_failure_propagates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bridge = MockBridge::new(&["A"]);
        bridge.fail_inventory();
        assert!(list_installed(&bridge, &[spec_in(dir.path(), "A", "1.0.0.0")]).is_err());
    }
}
