//! The seam between the sequencer and the browser's device/permission
//! surface.
//!
//! A real deployment implements [`DeviceHost`] over `getUserMedia`,
//! `getDisplayMedia`, the Fullscreen API, and the visibility/focus hooks;
//! tests implement it with scripted stubs. Absence of any underlying API
//! is a normal, expected condition and surfaces as
//! [`FailureKind::ApiUnavailable`] — never a panic.

use prk_schemas::DeviceInfo;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Failure taxonomy
// ---------------------------------------------------------------------------

/// Why a capability acquisition or probe failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// The user declined the device permission. Recoverable by
    /// re-prompting.
    PermissionDenied,
    /// The browser/platform lacks the needed feature.
    ApiUnavailable,
    /// The prompt/probe exceeded the configured `prompt_timeout`.
    Timeout,
    /// Wrapped underlying error message (stream invalidated, device
    /// unplugged, anything uncategorized).
    Unknown,
}

impl FailureKind {
    pub fn code(&self) -> &'static str {
        match self {
            FailureKind::PermissionDenied => "PERMISSION_DENIED",
            FailureKind::ApiUnavailable => "API_UNAVAILABLE",
            FailureKind::Timeout => "TIMEOUT",
            FailureKind::Unknown => "UNKNOWN",
        }
    }
}

/// A structured capability failure: machine-readable kind + the underlying
/// message. Step handlers convert every host error into one of these —
/// callers never see an uncaught rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityError {
    pub kind: FailureKind,
    pub message: String,
}

impl CapabilityError {
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::PermissionDenied,
            message: message.into(),
        }
    }

    pub fn api_unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::ApiUnavailable,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Timeout,
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Unknown,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.message)
    }
}

impl std::error::Error for CapabilityError {}

// ---------------------------------------------------------------------------
// Constraints
// ---------------------------------------------------------------------------

/// Video acquisition envelope passed to the camera request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub min_width: u32,
    pub min_height: u32,
    pub ideal_frame_rate: u32,
    pub min_frame_rate: u32,
}

impl VideoConstraints {
    /// Proctoring preview envelope: ideal 1280×720 @ 30fps, floor 640×480
    /// @ 15fps.
    pub fn proctoring_default() -> Self {
        Self {
            ideal_width: 1280,
            ideal_height: 720,
            min_width: 640,
            min_height: 480,
            ideal_frame_rate: 30,
            min_frame_rate: 15,
        }
    }
}

/// Audio acquisition settings passed to the microphone request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
    pub ideal_sample_rate: u32,
}

impl AudioConstraints {
    pub fn proctoring_default() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
            ideal_sample_rate: 44_100,
        }
    }
}

// ---------------------------------------------------------------------------
// Lockdown surface
// ---------------------------------------------------------------------------

/// The minimum API surface lockdown behavior needs from the host
/// environment. No permission prompt is involved; the browserLockdown
/// step only verifies presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockdownSurface {
    pub fullscreen_supported: bool,
    pub page_visibility: bool,
    pub focus_hooks: bool,
}

impl LockdownSurface {
    /// Every probed API present.
    pub fn complete() -> Self {
        Self {
            fullscreen_supported: true,
            page_visibility: true,
            focus_hooks: true,
        }
    }

    /// Names of the probed APIs that are absent, in a fixed order.
    pub fn missing_apis(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.fullscreen_supported {
            missing.push("fullscreen");
        }
        if !self.page_visibility {
            missing.push("pageVisibility");
        }
        if !self.focus_hooks {
            missing.push("focusHooks");
        }
        missing
    }
}

// ---------------------------------------------------------------------------
// Trait seams
// ---------------------------------------------------------------------------

/// A live camera or microphone stream held by the run.
///
/// `stop` must be idempotent. `settings` re-reads the *current* negotiated
/// track settings; it fails (rather than panicking) when the track was
/// externally revoked, which is how the `test_*` probes detect a dead
/// stream.
pub trait MediaStream {
    fn stop(&mut self);
    fn is_live(&self) -> bool;
    fn settings(&self) -> Result<DeviceInfo, CapabilityError>;
    fn label(&self) -> String;
}

impl std::fmt::Debug for dyn MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("label", &self.label())
            .field("live", &self.is_live())
            .finish()
    }
}

/// Browser device/permission operations the sequencer drives.
///
/// All acquisition is async because every call may suspend on a human
/// permission prompt. The whole setup flow is single-threaded and
/// cooperative — steps never run concurrently — so the futures carry no
/// `Send` bound.
#[allow(async_fn_in_trait)]
pub trait DeviceHost {
    /// Request a camera stream within the given envelope. On grant the
    /// stream stays alive (live preview affordance); the run takes
    /// ownership.
    async fn acquire_camera(
        &mut self,
        constraints: &VideoConstraints,
    ) -> Result<Box<dyn MediaStream>, CapabilityError>;

    /// Request a microphone stream. Kept alive like the camera stream for
    /// the level-check affordance.
    async fn acquire_microphone(
        &mut self,
        constraints: &AudioConstraints,
    ) -> Result<Box<dyn MediaStream>, CapabilityError>;

    /// Transient capability check: enter fullscreen, then immediately
    /// exit. Fails if the API is unavailable or the enter call rejects.
    async fn probe_fullscreen(&mut self) -> Result<(), CapabilityError>;

    /// Confirm screen capture support. Any display stream acquired for the
    /// probe is stopped before this returns — this check never keeps a
    /// live stream.
    async fn probe_screen_capture(&mut self) -> Result<(), CapabilityError>;

    /// Synchronous presence probe of the lockdown API surface.
    fn lockdown_surface(&self) -> LockdownSurface;
}
