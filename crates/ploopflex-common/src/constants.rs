//! System-wide constants, default values, and environment variable names.

/// Binary name the kubelet invokes (`<vendor>~ploop/ploop`).
pub const BIN_NAME: &str = "ploop";

/// Descriptor file the ploop library writes next to every image.
pub const DESCRIPTOR_FILE: &str = "DiskDescriptor.xml";

/// Mode for a freshly created volume directory.
pub const VOLUME_DIR_MODE: u32 = 0o700;

/// Mode for a freshly created pod mount point.
pub const MOUNT_DIR_MODE: u32 = 0o755;

/// Default name of the ploop command-line tool, looked up on `PATH`.
pub const DEFAULT_PLOOP_BINARY: &str = "ploop";

/// Default filesystem created inside new images.
pub const DEFAULT_FS_TYPE: &str = "ext4";

/// Default tracing filter; the kubelet parses combined output, so logging
/// stays silent unless asked for.
pub const DEFAULT_LOG_FILTER: &str = "off";

/// Prefix of ploop block devices under `/dev`.
pub const DEVICE_DIR: &str = "/dev";

/// Environment variable overriding the ploop tool location.
pub const ENV_PLOOP_BINARY: &str = "PLOOP_FLEX_BINARY";

/// Environment variable selecting the filesystem for new images.
pub const ENV_FS_TYPE: &str = "PLOOP_FLEX_FS_TYPE";

/// Environment variable selecting the image allocation mode.
pub const ENV_IMAGE_MODE: &str = "PLOOP_FLEX_IMAGE_MODE";

/// Environment variable naming a log file.
pub const ENV_LOG_FILE: &str = "PLOOP_FLEX_LOG_FILE";

/// Environment variable holding the tracing filter directive.
pub const ENV_LOG_FILTER: &str = "PLOOP_FLEX_LOG";
