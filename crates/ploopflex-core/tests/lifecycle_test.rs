//! End-to-end tests for the ploop volume lifecycle.
//!
//! These tests drive [`PloopDriver`] through every verb against an
//! in-process disk backend and mounter that record what they were asked to
//! do:
//! 1. Init
//! 2. Attach (validation, size conversion, idempotency)
//! 3. Mount (missing volume, already mounted, handle release)
//! 4. Unmount (failure keeps the mount point, success removes it)
//! 5. Detach

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use ploopflex_common::constants::DESCRIPTOR_FILE;
use ploopflex_common::error::{PloopError, Result};
use ploopflex_common::types::{Options, Status};
use ploopflex_core::backend::{CreateParams, DiskBackend, DiskVolume, MountParams};
use ploopflex_core::driver::{DETACH_FAILED, PloopDriver, REMOVE_FAILED, UNMOUNT_FAILED};
use ploopflex_core::filesystem::mount::Mounter;
use ploopflex_core::plugin::FlexVolume;

// ── Test doubles ─────────────────────────────────────────────────────

const FAKE_DEVICE: &str = "/dev/ploop27412";

#[derive(Debug, Default)]
struct Record {
    created: Vec<CreateParams>,
    mounts: Vec<MountParams>,
    detached: Vec<String>,
    unmounted: Vec<PathBuf>,
    mounted_device: Option<String>,
    opened: usize,
    closed: usize,
}

#[derive(Debug, Default, Clone, Copy)]
struct Faults {
    create: bool,
    mount: bool,
    anonymous_mount: bool,
    detach: bool,
    unmount: bool,
}

struct FakeBackend {
    record: Rc<RefCell<Record>>,
    faults: Faults,
}

struct FakeVolume<'a> {
    backend: &'a FakeBackend,
    descriptor: PathBuf,
}

fn backend_error(command: &str) -> PloopError {
    PloopError::Backend {
        command: command.into(),
        code: 1,
        stderr: "simulated failure".into(),
    }
}

impl DiskBackend for FakeBackend {
    fn create(&self, params: &CreateParams) -> Result<()> {
        if self.faults.create {
            return Err(backend_error("ploop init"));
        }
        let dir = params.file.parent().expect("image has a parent");
        std::fs::write(dir.join(DESCRIPTOR_FILE), "<Parallels_disk_image/>").expect("descriptor");
        std::fs::write(&params.file, b"").expect("image");
        self.record.borrow_mut().created.push(params.clone());
        Ok(())
    }

    fn open(&self, descriptor: &Path) -> Result<Box<dyn DiskVolume + '_>> {
        if !descriptor.exists() {
            return Err(PloopError::NotFound {
                kind: "ploop descriptor",
                id: descriptor.display().to_string(),
            });
        }
        self.record.borrow_mut().opened += 1;
        Ok(Box::new(FakeVolume {
            backend: self,
            descriptor: descriptor.to_path_buf(),
        }))
    }

    fn umount_by_device(&self, device: &str) -> Result<()> {
        if self.faults.detach {
            return Err(backend_error("ploop umount"));
        }
        let mut record = self.record.borrow_mut();
        record.detached.push(device.to_string());
        record.mounted_device = None;
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }
}

impl DiskVolume for FakeVolume<'_> {
    fn descriptor(&self) -> &Path {
        &self.descriptor
    }

    fn mounted_device(&self) -> Result<Option<String>> {
        Ok(self.backend.record.borrow().mounted_device.clone())
    }

    fn mount(&self, params: &MountParams) -> Result<Option<String>> {
        if self.backend.faults.mount {
            return Err(backend_error("ploop mount"));
        }
        let mut record = self.backend.record.borrow_mut();
        record.mounts.push(params.clone());
        if self.backend.faults.anonymous_mount {
            return Ok(None);
        }
        record.mounted_device = Some(FAKE_DEVICE.to_string());
        Ok(Some(FAKE_DEVICE.to_string()))
    }
}

impl Drop for FakeVolume<'_> {
    fn drop(&mut self) {
        self.backend.record.borrow_mut().closed += 1;
    }
}

struct FakeMounter {
    record: Rc<RefCell<Record>>,
    fail: bool,
}

impl Mounter for FakeMounter {
    fn unmount(&self, target: &Path) -> Result<()> {
        if self.fail {
            return Err(PloopError::Mount {
                path: target.to_path_buf(),
                message: "Device or resource busy".into(),
            });
        }
        self.record.borrow_mut().unmounted.push(target.to_path_buf());
        Ok(())
    }
}

fn driver_with(faults: Faults) -> (PloopDriver, Rc<RefCell<Record>>) {
    let record = Rc::new(RefCell::new(Record::default()));
    let driver = PloopDriver::new(
        Box::new(FakeBackend {
            record: Rc::clone(&record),
            faults,
        }),
        Box::new(FakeMounter {
            record: Rc::clone(&record),
            fail: faults.unmount,
        }),
    );
    (driver, record)
}

fn driver() -> (PloopDriver, Rc<RefCell<Record>>) {
    driver_with(Faults::default())
}

fn options(pairs: &[(&str, &str)]) -> Options {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn volume_options(root: &Path, id: &str, size: &str) -> Options {
    options(&[
        ("volumePath", root.to_str().expect("utf-8 path")),
        ("volumeId", id),
        ("size", size),
    ])
}

// ── Init ─────────────────────────────────────────────────────────────

#[test]
fn init_always_succeeds() {
    let (driver, record) = driver_with(Faults {
        create: true,
        mount: true,
        anonymous_mount: true,
        detach: true,
        unmount: true,
    });
    let resp = driver.init();
    assert_eq!(resp.status, Status::Success);
    assert_eq!(resp.message, "Ploop is available");
    assert_eq!(record.borrow().opened, 0);
}

// ── Attach ───────────────────────────────────────────────────────────

#[test]
fn attach_requires_volume_path() {
    let (driver, record) = driver();
    for size in ["", "1Gi", "garbage"] {
        let resp = driver.attach(&options(&[("volumeId", "abc"), ("size", size)]));
        assert_eq!(resp.status, Status::Failure);
        assert_eq!(resp.message, "Must specify a volume path");
    }
    assert!(record.borrow().created.is_empty());
}

#[test]
fn attach_requires_volume_id() {
    let (driver, _) = driver();
    let dir = tempfile::tempdir().expect("tempdir");
    let resp = driver.attach(&volume_options(dir.path(), "", "1Gi"));
    assert_eq!(resp.status, Status::Failure);
    assert_eq!(resp.message, "Must specify a volume id");
}

#[test]
fn attach_creates_volume_directory_and_image() {
    let (driver, record) = driver();
    let dir = tempfile::tempdir().expect("tempdir");
    let resp = driver.attach(&volume_options(dir.path(), "abc", "500Mi"));

    let image = dir.path().join("abc/abc");
    assert_eq!(resp.status, Status::Success);
    assert_eq!(resp.message, "Successfully attached the ploop volume");
    assert_eq!(resp.device.as_deref(), image.to_str());
    assert!(dir.path().join("abc").is_dir());

    let record = record.borrow();
    assert_eq!(
        record.created,
        vec![CreateParams {
            size_kb: 512_000,
            file: image,
        }]
    );
}

#[test]
fn attach_converts_gibibytes_to_kilobytes() {
    let (driver, record) = driver();
    let dir = tempfile::tempdir().expect("tempdir");
    let resp = driver.attach(&volume_options(dir.path(), "pv", "1Gi"));
    assert!(resp.is_success());
    assert_eq!(record.borrow().created[0].size_kb, 1_048_576);
}

#[test]
fn attach_is_idempotent() {
    let (driver, record) = driver();
    let dir = tempfile::tempdir().expect("tempdir");
    let opts = volume_options(dir.path(), "abc", "1Gi");

    let first = driver.attach(&opts);
    let second = driver.attach(&opts);

    assert!(first.is_success());
    assert!(second.is_success());
    assert_eq!(second.message, "Volume already exists");
    assert_eq!(first.device, second.device);
    assert_eq!(record.borrow().created.len(), 1);
}

#[test]
fn attach_existing_volume_ignores_size() {
    let (driver, record) = driver();
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(driver.attach(&volume_options(dir.path(), "abc", "1Gi")).is_success());

    let resp = driver.attach(&volume_options(dir.path(), "abc", "not-a-size"));
    assert!(resp.is_success());
    assert_eq!(record.borrow().created.len(), 1);
}

#[test]
fn attach_rejects_missing_size() {
    let (driver, record) = driver();
    let dir = tempfile::tempdir().expect("tempdir");
    let resp = driver.attach(&options(&[
        ("volumePath", dir.path().to_str().unwrap()),
        ("volumeId", "abc"),
    ]));
    assert_eq!(resp.status, Status::Failure);
    assert_eq!(resp.message, "Must specify a volume size");
    assert!(record.borrow().created.is_empty());
}

#[test]
fn attach_rejects_malformed_size_without_creating_anything() {
    let (driver, record) = driver();
    let dir = tempfile::tempdir().expect("tempdir");
    let resp = driver.attach(&volume_options(dir.path(), "abc", "ten gigs"));
    assert_eq!(resp.status, Status::Failure);
    assert!(resp.message.contains("ten gigs"), "{}", resp.message);
    assert!(!dir.path().join("abc").exists());
    assert!(record.borrow().created.is_empty());
}

#[test]
fn attach_reports_backend_error_and_keeps_directory() {
    let (driver, _) = driver_with(Faults {
        create: true,
        ..Faults::default()
    });
    let dir = tempfile::tempdir().expect("tempdir");
    let resp = driver.attach(&volume_options(dir.path(), "abc", "1Gi"));
    assert_eq!(resp.status, Status::Failure);
    assert!(resp.message.contains("simulated failure"));
    assert!(resp.device.is_none());
    assert!(dir.path().join("abc").is_dir());
}

#[test]
fn attach_reports_directory_error() {
    let (driver, _) = driver();
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("root");
    std::fs::write(&blocker, b"not a directory").expect("write");
    let resp = driver.attach(&volume_options(&blocker, "abc", "1Gi"));
    assert_eq!(resp.status, Status::Failure);
    assert!(resp.message.starts_with("I/O error"), "{}", resp.message);
}

// ── Mount ────────────────────────────────────────────────────────────

#[test]
fn mount_without_descriptor_fails_without_mounting() {
    let (driver, record) = driver();
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("pod/volume");
    let resp = driver.mount(&target, "/dev/ploop1", &volume_options(dir.path(), "abc", ""));

    assert_eq!(resp.status, Status::Failure);
    assert!(resp.message.contains("does not exist"), "{}", resp.message);
    assert_eq!(resp.device.as_deref(), Some("/dev/ploop1"));
    assert!(target.is_dir());
    let record = record.borrow();
    assert!(record.mounts.is_empty());
    assert_eq!(record.opened, 0);
}

#[test]
fn mount_requires_volume_options() {
    let (driver, _) = driver();
    let dir = tempfile::tempdir().expect("tempdir");
    let resp = driver.mount(&dir.path().join("mnt"), "dev", &options(&[("volumeId", "abc")]));
    assert_eq!(resp.status, Status::Failure);
    assert_eq!(resp.message, "Must specify a volume path");
}

#[test]
fn mount_twice_mounts_once() {
    let (driver, record) = driver();
    let dir = tempfile::tempdir().expect("tempdir");
    let opts = volume_options(dir.path(), "abc", "1Gi");
    let target = dir.path().join("pods/mnt");
    assert!(driver.attach(&opts).is_success());

    let first = driver.mount(&target, "ignored", &opts);
    assert_eq!(first.status, Status::Success);
    assert_eq!(first.message, "Successfully mounted the ploop volume");
    assert_eq!(first.device.as_deref(), Some(FAKE_DEVICE));

    let second = driver.mount(&target, "ignored", &opts);
    assert_eq!(second.status, Status::Success);
    assert_eq!(second.message, "Ploop volume already mounted");
    assert_eq!(second.device.as_deref(), Some(FAKE_DEVICE));

    let record = record.borrow();
    assert_eq!(record.mounts.len(), 1);
    assert_eq!(record.mounts[0].target, target);
    assert!(!record.mounts[0].readonly);
    assert_eq!(record.opened, 2);
    assert_eq!(record.closed, 2);
}

#[test]
fn mount_failure_releases_handle_and_echoes_device() {
    let (driver, record) = driver_with(Faults {
        mount: true,
        ..Faults::default()
    });
    let dir = tempfile::tempdir().expect("tempdir");
    let opts = volume_options(dir.path(), "abc", "1Gi");
    assert!(driver.attach(&opts).is_success());

    let resp = driver.mount(&dir.path().join("mnt"), "/dev/ploop9", &opts);
    assert_eq!(resp.status, Status::Failure);
    assert!(resp.message.contains("ploop mount"));
    assert_eq!(resp.device.as_deref(), Some("/dev/ploop9"));

    let record = record.borrow();
    assert_eq!(record.opened, 1);
    assert_eq!(record.closed, 1);
}

#[test]
fn mount_without_reported_device_succeeds_with_caller_device() {
    let (driver, record) = driver_with(Faults {
        anonymous_mount: true,
        ..Faults::default()
    });
    let dir = tempfile::tempdir().expect("tempdir");
    let opts = volume_options(dir.path(), "abc", "1Gi");
    assert!(driver.attach(&opts).is_success());

    let resp = driver.mount(&dir.path().join("mnt"), "/dev/ploop5", &opts);
    assert_eq!(resp.status, Status::Success);
    assert_eq!(resp.message, "Successfully mounted the ploop volume");
    assert_eq!(resp.device.as_deref(), Some("/dev/ploop5"));

    let record = record.borrow();
    assert_eq!(record.mounts.len(), 1);
    assert_eq!(record.opened, record.closed);
}

#[test]
fn mount_honours_readonly_option() {
    let (driver, record) = driver();
    let dir = tempfile::tempdir().expect("tempdir");
    let mut opts = volume_options(dir.path(), "abc", "1Gi");
    assert!(driver.attach(&opts).is_success());
    let _ = opts.insert("kubernetes.io/readwrite".into(), "ro".into());

    assert!(driver.mount(&dir.path().join("mnt"), "", &opts).is_success());
    assert!(record.borrow().mounts[0].readonly);
}

// ── Unmount ──────────────────────────────────────────────────────────

#[test]
fn unmount_failure_keeps_mount_point() {
    let (driver, _) = driver_with(Faults {
        unmount: true,
        ..Faults::default()
    });
    let dir = tempfile::tempdir().expect("tempdir");
    let mount = dir.path().join("mnt");
    std::fs::create_dir(&mount).expect("mkdir");

    let resp = driver.unmount(&mount);
    assert_eq!(resp.status, Status::Failure);
    assert!(resp.message.starts_with(UNMOUNT_FAILED), "{}", resp.message);
    assert!(resp.message.contains("Device or resource busy"));
    assert!(mount.is_dir());
}

#[test]
fn unmount_success_removes_mount_point() {
    let (driver, record) = driver();
    let dir = tempfile::tempdir().expect("tempdir");
    let mount = dir.path().join("mnt");
    std::fs::create_dir(&mount).expect("mkdir");

    let resp = driver.unmount(&mount);
    assert_eq!(resp.status, Status::Success);
    assert_eq!(resp.message, "Successfully unmounted the ploop volume");
    assert_eq!(resp.device.as_deref(), mount.to_str());
    assert!(!mount.exists());
    assert_eq!(record.borrow().unmounted, vec![mount]);
}

#[test]
fn unmount_reports_stale_directory() {
    let (driver, _) = driver();
    let dir = tempfile::tempdir().expect("tempdir");
    let mount = dir.path().join("mnt");
    std::fs::create_dir(&mount).expect("mkdir");
    std::fs::write(mount.join("leftover"), b"x").expect("write");

    let resp = driver.unmount(&mount);
    assert_eq!(resp.status, Status::Failure);
    assert!(resp.message.starts_with(REMOVE_FAILED), "{}", resp.message);
    assert!(mount.exists());
}

// ── Detach ───────────────────────────────────────────────────────────

#[test]
fn detach_releases_device() {
    let (driver, record) = driver();
    let resp = driver.detach(FAKE_DEVICE);
    assert_eq!(resp.status, Status::Success);
    assert_eq!(resp.message, "Successfully detached the ploop volume");
    assert_eq!(resp.device.as_deref(), Some(FAKE_DEVICE));
    assert_eq!(record.borrow().detached, vec![FAKE_DEVICE.to_string()]);
}

#[test]
fn detach_failure_keeps_cause() {
    let (driver, _) = driver_with(Faults {
        detach: true,
        ..Faults::default()
    });
    let resp = driver.detach(FAKE_DEVICE);
    assert_eq!(resp.status, Status::Failure);
    assert!(resp.message.starts_with(DETACH_FAILED));
    assert!(resp.message.contains("simulated failure"));
}

// ── Full lifecycle ───────────────────────────────────────────────────

#[test]
fn lifecycle_attach_mount_unmount_detach() {
    let (driver, record) = driver();
    let dir = tempfile::tempdir().expect("tempdir");
    let opts = volume_options(dir.path(), "data", "2Gi");
    let target = dir.path().join("pods/uid/volumes/data");

    let attached = driver.attach(&opts);
    assert!(attached.is_success());
    let mounted = driver.mount(&target, attached.device.as_deref().unwrap(), &opts);
    assert!(mounted.is_success());
    let device = mounted.device.clone().unwrap();

    assert!(driver.unmount(&target).is_success());
    assert!(!target.exists());
    assert!(driver.detach(&device).is_success());

    let record = record.borrow();
    assert_eq!(record.created[0].size_kb, 2 * 1_048_576);
    assert!(record.mounted_device.is_none());
    assert_eq!(record.opened, record.closed);
}
