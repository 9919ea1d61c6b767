//! Setup-plan derivation: which capability steps a flag set implies.

use prk_schemas::{CapabilityKind, ProctoringFlags};
use serde::{Deserialize, Serialize};

/// One unit of device-capability negotiation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupStep {
    pub kind: CapabilityKind,
    pub title: String,
    pub description: String,
    /// Failure of a required step blocks assessment start; failure of an
    /// optional step only degrades proctoring coverage.
    pub required: bool,
}

/// Derive the ordered step list for a run.
///
/// Computed once at run creation and never changed during a run. Order is
/// the fixed capability priority from [`CapabilityKind::ALL`]; a step is
/// included only if its underlying flag is enabled. Screen recording is
/// the one optional step: losing it degrades screen-sharing detection but
/// does not block the assessment.
pub fn derive_plan(flags: &ProctoringFlags) -> Vec<SetupStep> {
    CapabilityKind::ALL
        .iter()
        .filter_map(|kind| step_for(*kind, flags))
        .collect()
}

fn step_for(kind: CapabilityKind, flags: &ProctoringFlags) -> Option<SetupStep> {
    let (enabled, required, title, description) = match kind {
        CapabilityKind::Webcam => (
            flags.require_webcam,
            true,
            "Camera access",
            "Grant camera access so you stay visible during the assessment.",
        ),
        CapabilityKind::Microphone => (
            flags.require_microphone,
            true,
            "Microphone access",
            "Grant microphone access for audio monitoring.",
        ),
        CapabilityKind::Fullscreen => (
            flags.fullscreen_requirement,
            true,
            "Fullscreen mode",
            "The assessment runs in fullscreen; this checks your browser can enter it.",
        ),
        CapabilityKind::ScreenRecording => (
            flags.screen_sharing_detection,
            false,
            "Screen recording support",
            "Confirm the browser supports screen capture for screen-sharing detection.",
        ),
        CapabilityKind::BrowserLockdown => (
            flags.browser_lockdown,
            true,
            "Browser lockdown",
            "Verify the browser exposes the APIs lockdown mode relies on.",
        ),
    };
    enabled.then(|| SetupStep {
        kind,
        title: title.to_string(),
        description: description.to_string(),
        required,
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
