//! Domain primitive types used across the ploop flexvolume workspace.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Options map the kubelet passes as a JSON object.
pub type Options = BTreeMap<String, String>;

/// Option key naming the volume root directory.
pub const OPT_VOLUME_PATH: &str = "volumePath";

/// Option key naming the volume identifier.
pub const OPT_VOLUME_ID: &str = "volumeId";

/// Option key holding the human-readable volume size.
pub const OPT_SIZE: &str = "size";

/// Option key the kubelet sets to `ro` or `rw`.
pub const OPT_READWRITE: &str = "kubernetes.io/readwrite";

/// Returns the value of `key`, treating an absent key as empty.
#[must_use]
pub fn option<'a>(options: &'a Options, key: &str) -> &'a str {
    options.get(key).map_or("", String::as_str)
}

/// Identifier of a ploop volume below a volume root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VolumeId(String);

impl VolumeId {
    /// Creates a new volume ID from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VolumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a driver call as understood by the kubelet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// The verb completed.
    Success,
    /// The verb failed; the message says why.
    Failure,
    /// The driver does not implement the verb.
    #[serde(rename = "Not supported")]
    NotSupported,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::Failure => write!(f, "Failure"),
            Self::NotSupported => write!(f, "Not supported"),
        }
    }
}

/// Optional features advertised from `init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Whether the kubelet should call attach/detach.
    pub attach: bool,
}

/// JSON envelope printed for every verb.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Success, failure, or not supported.
    pub status: Status,
    /// Human-readable explanation.
    pub message: String,
    /// Device or path the verb acted on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Driver capabilities, only set by `init`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Capabilities>,
}

impl Response {
    /// A successful response without a device.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            device: None,
            capabilities: None,
        }
    }

    /// A failed response without a device.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: Status::Failure,
            message: message.into(),
            device: None,
            capabilities: None,
        }
    }

    /// The answer for verbs this driver does not implement.
    #[must_use]
    pub fn not_supported(message: impl Into<String>) -> Self {
        Self {
            status: Status::NotSupported,
            message: message.into(),
            device: None,
            capabilities: None,
        }
    }

    /// Attaches a device string to the response.
    #[must_use]
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Attaches capabilities to the response.
    #[must_use]
    pub const fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Returns true for `Status::Success`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}
