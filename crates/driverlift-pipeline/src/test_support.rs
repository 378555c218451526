// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test doubles shared by the pipeline's unit tests: a recording bridge, a
// canned fetcher, and fixture package builders.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use driverlift_bridge::{
    DriverInventory, DriverStore, FileVersionProbe, PlatformBridge, PrintDriverRegistry,
    StagingOutput,
};
use driverlift_core::error::{DriverliftError, Result};
use driverlift_core::types::DriverSpec;

use crate::fetch::ArtifactFetcher;

/// Spec whose version file lives under `dir/versions/<name>/*/DRIVER.DLL`.
pub fn spec_in(dir: &Path, name: &str, minimum: &str) -> DriverSpec {
    DriverSpec {
        name: name.to_string(),
        url: format!("https://packages.test/{name}.zip"),
        description_pattern: "*.inf".into(),
        description_marker: name.to_string(),
        version_file: format!("{}/versions/{name}/*/DRIVER.DLL", dir.display()),
        minimum_version: minimum.parse().expect("fixture minimum version"),
    }
}

/// Build a ZIP archive in memory from `(path, contents)` pairs.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (path, contents) in entries {
        writer
            .start_file(*path, SimpleFileOptions::default())
            .expect("start zip entry");
        writer.write_all(contents).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// Description file text for `name` at `version`.
pub fn inf_text(name: &str, version: &str) -> String {
    format!(
        "; {name} driver package\r\n[Version]\r\nSignature=\"$Windows NT$\"\r\nClass=Printer\r\n\
         DriverVer = 04/21/2023,{version} ; shipped\r\n\r\n[Manufacturer]\r\n\"{name}\"=Models\r\n"
    )
}

/// A realistic package: the wanted description file, a sibling variant that
/// must not be picked, and some noise.
pub fn driver_package(name: &str, version: &str) -> Vec<u8> {
    let wanted = inf_text(name, version);
    let sibling = inf_text("Sibling Fax Driver", "1.0.0.0");
    let wanted_path = format!("Driver/x64/{name}.inf");
    zip_bytes(&[
        ("Driver/readme.txt", "see documentation".as_bytes()),
        ("Driver/x64/fax.inf", sibling.as_bytes()),
        (wanted_path.as_str(), wanted.as_bytes()),
        ("Driver/x64/driver.dll", "MZ".as_bytes()),
    ])
}

/// Everything the mock bridge was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Inventory,
    Stage(PathBuf),
    Register(String, PathBuf),
}

#[derive(Debug, Clone, Copy)]
pub enum RegisterFailure {
    /// Registration errors and the driver stays unregistered.
    Hard,
    /// Registration errors but the driver shows up registered afterwards.
    Phantom,
}

/// Recording bridge with injectable failures.
///
/// Staging copies the description file into `repository/<n>/` when a
/// repository is configured. A successful registration bumps the driver's
/// version file to `upgrade_version`, so a second run sees it as current.
pub struct MockBridge {
    registered: RefCell<HashSet<String>>,
    version_files: RefCell<HashMap<String, PathBuf>>,
    versions: RefCell<HashMap<PathBuf, String>>,
    repository: RefCell<Option<PathBuf>>,
    inventory_fails: Cell<bool>,
    staging_failures: RefCell<HashSet<String>>,
    register_failures: RefCell<HashMap<String, RegisterFailure>>,
    upgrade_version: RefCell<String>,
    calls: RefCell<Vec<Call>>,
}

impl MockBridge {
    pub fn new(registered: &[&str]) -> Self {
        Self {
            registered: RefCell::new(registered.iter().map(|s| s.to_string()).collect()),
            version_files: RefCell::new(HashMap::new()),
            versions: RefCell::new(HashMap::new()),
            repository: RefCell::new(None),
            inventory_fails: Cell::new(false),
            staging_failures: RefCell::new(HashSet::new()),
            register_failures: RefCell::new(HashMap::new()),
            upgrade_version: RefCell::new("99.0.0.0".into()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Create the version-bearing file matched by [`spec_in`] and report
    /// `version` for it.
    pub fn install_version_file(&self, dir: &Path, name: &str, version: &str) {
        let folder = dir.join("versions").join(name).join("x64");
        fs::create_dir_all(&folder).expect("create version folder");
        let file = folder.join("DRIVER.DLL");
        fs::write(&file, b"MZ").expect("write version file");
        self.version_files
            .borrow_mut()
            .insert(name.to_string(), file.clone());
        self.versions.borrow_mut().insert(file, version.to_string());
    }

    pub fn with_repository(&self, root: &Path) {
        *self.repository.borrow_mut() = Some(root.to_path_buf());
    }

    pub fn fail_inventory(&self) {
        self.inventory_fails.set(true);
    }

    /// Staging fails for description files containing `marker`.
    pub fn fail_staging_for(&self, marker: &str) {
        self.staging_failures.borrow_mut().insert(marker.to_string());
    }

    pub fn fail_register_for(&self, name: &str, failure: RegisterFailure) {
        self.register_failures
            .borrow_mut()
            .insert(name.to_string(), failure);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn stage_calls(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Stage(_)))
            .count()
    }

    fn mark_upgraded(&self, name: &str) {
        self.registered.borrow_mut().insert(name.to_string());
        if let Some(file) = self.version_files.borrow().get(name) {
            let version = self.upgrade_version.borrow().clone();
            self.versions.borrow_mut().insert(file.clone(), version);
        }
    }
}

impl PlatformBridge for MockBridge {
    fn platform_name(&self) -> &str {
        "mock"
    }
}

impl DriverInventory for MockBridge {
    fn registered_drivers(&self) -> Result<Vec<String>> {
        self.calls.borrow_mut().push(Call::Inventory);
        if self.inventory_fails.get() {
            return Err(DriverliftError::Inventory("print spooler unavailable".into()));
        }
        Ok(self.registered.borrow().iter().cloned().collect())
    }
}

impl FileVersionProbe for MockBridge {
    fn file_version(&self, path: &Path) -> Result<String> {
        self.versions
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| DriverliftError::Bridge(format!("no version for {}", path.display())))
    }
}

impl DriverStore for MockBridge {
    fn stage_package(&self, description_file: &Path) -> Result<StagingOutput> {
        self.calls
            .borrow_mut()
            .push(Call::Stage(description_file.to_path_buf()));

        let text = fs::read_to_string(description_file)?;
        if self
            .staging_failures
            .borrow()
            .iter()
            .any(|marker| text.contains(marker.as_str()))
        {
            return Ok(StagingOutput::new(
                Some(0),
                "Adding driver package:  x.inf\r\nFailed to add driver package: The third-party INF does not contain digital signature information.\r\n",
            ));
        }

        if let Some(repo) = self.repository.borrow().as_ref() {
            let n = self.stage_calls();
            let package_dir = repo.join(format!("pkg_{n}"));
            fs::create_dir_all(&package_dir)?;
            if let Some(file_name) = description_file.file_name() {
                fs::copy(description_file, package_dir.join(file_name))?;
            }
        }

        Ok(StagingOutput::new(
            Some(0),
            "Driver package added successfully.\r\nPublished Name: oem42.inf\r\n",
        ))
    }

    fn repository_root(&self) -> Option<PathBuf> {
        self.repository.borrow().clone()
    }
}

impl PrintDriverRegistry for MockBridge {
    fn is_registered(&self, name: &str) -> Result<bool> {
        Ok(self.registered.borrow().contains(name))
    }

    fn register(&self, name: &str, description_file: &Path) -> Result<()> {
        self.calls.borrow_mut().push(Call::Register(
            name.to_string(),
            description_file.to_path_buf(),
        ));

        let failure = self.register_failures.borrow().get(name).copied();
        match failure {
            Some(RegisterFailure::Hard) => Err(DriverliftError::Registration(
                "The specified driver does not exist in the driver store.".into(),
            )),
            Some(RegisterFailure::Phantom) => {
                self.mark_upgraded(name);
                Err(DriverliftError::Registration("RPC server unavailable".into()))
            }
            None => {
                self.mark_upgraded(name);
                Ok(())
            }
        }
    }
}

/// Fetcher serving canned bytes per URL.
#[derive(Default)]
pub struct MockFetcher {
    packages: RefCell<HashMap<String, Vec<u8>>>,
    failures: RefCell<HashSet<String>>,
    calls: RefCell<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: &str, bytes: Vec<u8>) {
        self.packages.borrow_mut().insert(url.to_string(), bytes);
    }

    pub fn fail(&self, url: &str) {
        self.failures.borrow_mut().insert(url.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl ArtifactFetcher for MockFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        self.calls.borrow_mut().push(url.to_string());
        if self.failures.borrow().contains(url) {
            return Err(DriverliftError::Network(format!("{url}: connection reset")));
        }
        let packages = self.packages.borrow();
        let bytes = packages
            .get(url)
            .ok_or_else(|| DriverliftError::Network(format!("{url}: HTTP status 404 Not Found")))?;
        fs::write(dest, bytes)?;
        Ok(())
    }
}
