//! Backend that drives the `ploop` command-line tool.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use ploopflex_common::config::{DriverConfig, ImageMode};
use ploopflex_common::constants::DEVICE_DIR;
use ploopflex_common::error::{PloopError, Result};

use super::{CreateParams, DiskBackend, DiskVolume, MountParams};

/// Runs `ploop` subcommands for image management.
#[derive(Debug, Clone)]
pub struct PloopCli {
    binary: PathBuf,
    fs_type: String,
    image_mode: ImageMode,
}

impl PloopCli {
    /// Creates a backend from the driver configuration.
    #[must_use]
    pub fn new(config: &DriverConfig) -> Self {
        Self {
            binary: config.ploop_binary.clone(),
            fs_type: config.fs_type.clone(),
            image_mode: config.image_mode,
        }
    }

    /// Resolves the tool through `PATH`, keeping the configured value when
    /// lookup fails so the spawn error names it.
    fn program(&self) -> PathBuf {
        which::which(&self.binary).unwrap_or_else(|_| self.binary.clone())
    }

    /// Runs `ploop` with `args` and returns its standard output.
    fn run(&self, args: &[OsString]) -> Result<String> {
        let program = self.program();
        let command = std::iter::once(program.display().to_string())
            .chain(args.iter().map(|a| a.to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ");
        tracing::debug!(%command, "running ploop");

        let output = Command::new(&program)
            .args(args)
            .output()
            .map_err(|e| PloopError::Io {
                path: program.clone(),
                source: e,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!(%command, code = ?output.status.code(), %stderr, "ploop failed");
            return Err(PloopError::Backend {
                command,
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl DiskBackend for PloopCli {
    fn create(&self, params: &CreateParams) -> Result<()> {
        let args: Vec<OsString> = vec![
            "init".into(),
            "-s".into(),
            format!("{}K", params.size_kb).into(),
            "-f".into(),
            self.image_mode.as_str().into(),
            "-t".into(),
            self.fs_type.as_str().into(),
            params.file.clone().into(),
        ];
        let _ = self.run(&args)?;
        tracing::info!(file = %params.file.display(), size_kb = params.size_kb, "ploop image created");
        Ok(())
    }

    fn open(&self, descriptor: &Path) -> Result<Box<dyn DiskVolume + '_>> {
        if !descriptor.is_file() {
            return Err(PloopError::NotFound {
                kind: "ploop descriptor",
                id: descriptor.display().to_string(),
            });
        }
        tracing::debug!(descriptor = %descriptor.display(), "ploop image opened");
        Ok(Box::new(PloopImage {
            cli: self,
            descriptor: descriptor.to_path_buf(),
        }))
    }

    fn umount_by_device(&self, device: &str) -> Result<()> {
        let _ = self.run(&[
            OsString::from("umount"),
            OsString::from("-d"),
            OsString::from(device),
        ])?;
        tracing::info!(device, "ploop device released");
        Ok(())
    }

    fn is_available(&self) -> bool {
        which::which(&self.binary).is_ok()
    }
}

/// An image opened through [`PloopCli`].
#[derive(Debug)]
struct PloopImage<'a> {
    cli: &'a PloopCli,
    descriptor: PathBuf,
}

impl DiskVolume for PloopImage<'_> {
    fn descriptor(&self) -> &Path {
        &self.descriptor
    }

    fn mounted_device(&self) -> Result<Option<String>> {
        let listing = self.cli.run(&[OsString::from("list")])?;
        let Some(volume_dir) = self.descriptor.parent() else {
            return Ok(None);
        };
        Ok(device_for_dir(&listing, &canonical_dir(volume_dir)))
    }

    fn mount(&self, params: &MountParams) -> Result<Option<String>> {
        let mut args: Vec<OsString> = vec!["mount".into()];
        if params.readonly {
            args.push("-r".into());
        }
        args.extend([
            OsString::from("-m"),
            params.target.clone().into_os_string(),
            self.descriptor.clone().into_os_string(),
        ]);
        let stdout = self.cli.run(&args)?;

        let device = device_from_mount_output(&stdout).or_else(|| {
            self.mounted_device().unwrap_or_else(|err| {
                tracing::warn!(error = %err, "device lookup after mount failed");
                None
            })
        });
        tracing::info!(?device, target = %params.target.display(), "ploop image mounted");
        Ok(device)
    }
}

impl Drop for PloopImage<'_> {
    fn drop(&mut self) {
        tracing::debug!(descriptor = %self.descriptor.display(), "ploop image closed");
    }
}

/// Normalizes `ploop12345` or `/dev/ploop12345` to a device path.
fn device_path(name: &str) -> String {
    if name.starts_with('/') {
        name.to_string()
    } else {
        format!("{DEVICE_DIR}/{name}")
    }
}

/// Resolves symlinks in `dir`, since `ploop list` prints canonical image
/// paths. Falls back to `dir` when it cannot be resolved.
fn canonical_dir(dir: &Path) -> PathBuf {
    std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
}

/// Finds the device in `ploop list` output whose image lives in `dir`.
///
/// Each line reads `<device> <image path>`.
fn device_for_dir(listing: &str, dir: &Path) -> Option<String> {
    listing.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        let device = fields.next()?;
        let image = Path::new(fields.next()?);
        (image.parent() == Some(dir)).then(|| device_path(device))
    })
}

/// Extracts the `dev=` token `ploop mount` prints when adding a delta.
fn device_from_mount_output(stdout: &str) -> Option<String> {
    stdout
        .split_whitespace()
        .find_map(|token| token.strip_prefix("dev="))
        .map(|dev| device_path(dev.trim_end_matches(',')))
}
