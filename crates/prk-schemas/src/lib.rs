//! Shared proctoring data model.
//!
//! Everything that crosses a crate or wire boundary lives here: the
//! proctoring tier, the 24 feature flags, the persisted
//! `proctoring_settings` payload, the five device capabilities, and the
//! device-info snapshots captured at grant time.
//!
//! Wire-name contract: flag fields and capability kinds serialize in
//! camelCase and must round-trip unchanged through the persisted
//! assessment configuration. Tests in this crate pin the exact key set.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ProctoringTier
// ---------------------------------------------------------------------------

/// A named bundle of monitoring strictness selected by an assessment author.
///
/// Totally ordered by feature containment: `None < Basic < Advanced < Ai`.
/// A higher tier's flag set is a strict superset of every lower tier's set;
/// the derived `Ord` is what [`FlagName::owner_tier`] membership tests are
/// compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProctoringTier {
    None,
    Basic,
    Advanced,
    Ai,
}

impl ProctoringTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProctoringTier::None => "none",
            ProctoringTier::Basic => "basic",
            ProctoringTier::Advanced => "advanced",
            ProctoringTier::Ai => "ai",
        }
    }
}

impl std::fmt::Display for ProctoringTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a tier string from config/persistence is not one of the
/// four recognized values.
///
/// **Callers MUST treat this as fatal to the operation.** Silently
/// defaulting an unknown tier masks misconfiguration; the tier domain is a
/// closed enumeration and anything else is a programming or data error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTier(pub String);

impl std::fmt::Display for UnknownTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown proctoring tier: {:?}", self.0)
    }
}

impl std::error::Error for UnknownTier {}

impl std::str::FromStr for ProctoringTier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(ProctoringTier::None),
            "basic" => Ok(ProctoringTier::Basic),
            "advanced" => Ok(ProctoringTier::Advanced),
            "ai" => Ok(ProctoringTier::Ai),
            other => Err(UnknownTier(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// FlagName
// ---------------------------------------------------------------------------

/// Every proctoring feature flag, each owned by exactly one tier.
///
/// Declaration order is the canonical order (Basic block, then Advanced,
/// then AI) and matches the field order of [`ProctoringFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlagName {
    // Basic
    BrowserLockdown,
    TabSwitchingDetection,
    CopyPasteDetection,
    RightClickDetection,
    FullscreenRequirement,
    KeyboardShortcutDetection,

    // Advanced
    RequireWebcam,
    RequireMicrophone,
    ScreenSharingDetection,
    MultipleDeviceDetection,
    PlagiarismDetection,
    FaceDetection,
    VoiceDetection,
    BackgroundNoiseDetection,
    EyeTrackingDetection,

    // AI
    BehavioralAnalysis,
    FacialRecognition,
    EmotionDetection,
    AttentionMonitoring,
    SuspiciousActivityDetection,
    AiPlagiarismDetection,
    VoiceAnalysis,
    GestureRecognition,
    RealTimeAlerts,
}

impl FlagName {
    /// All 24 flags in canonical order.
    pub const ALL: [FlagName; 24] = [
        FlagName::BrowserLockdown,
        FlagName::TabSwitchingDetection,
        FlagName::CopyPasteDetection,
        FlagName::RightClickDetection,
        FlagName::FullscreenRequirement,
        FlagName::KeyboardShortcutDetection,
        FlagName::RequireWebcam,
        FlagName::RequireMicrophone,
        FlagName::ScreenSharingDetection,
        FlagName::MultipleDeviceDetection,
        FlagName::PlagiarismDetection,
        FlagName::FaceDetection,
        FlagName::VoiceDetection,
        FlagName::BackgroundNoiseDetection,
        FlagName::EyeTrackingDetection,
        FlagName::BehavioralAnalysis,
        FlagName::FacialRecognition,
        FlagName::EmotionDetection,
        FlagName::AttentionMonitoring,
        FlagName::SuspiciousActivityDetection,
        FlagName::AiPlagiarismDetection,
        FlagName::VoiceAnalysis,
        FlagName::GestureRecognition,
        FlagName::RealTimeAlerts,
    ];

    /// The lowest tier that turns this flag on.
    ///
    /// Never returns [`ProctoringTier::None`]: the `none` tier owns no
    /// flags. Containment falls out of the total order — a flag is active
    /// at every tier ≥ its owner.
    pub fn owner_tier(&self) -> ProctoringTier {
        use FlagName::*;
        match self {
            BrowserLockdown | TabSwitchingDetection | CopyPasteDetection | RightClickDetection
            | FullscreenRequirement | KeyboardShortcutDetection => ProctoringTier::Basic,

            RequireWebcam | RequireMicrophone | ScreenSharingDetection
            | MultipleDeviceDetection | PlagiarismDetection | FaceDetection | VoiceDetection
            | BackgroundNoiseDetection | EyeTrackingDetection => ProctoringTier::Advanced,

            BehavioralAnalysis | FacialRecognition | EmotionDetection | AttentionMonitoring
            | SuspiciousActivityDetection | AiPlagiarismDetection | VoiceAnalysis
            | GestureRecognition | RealTimeAlerts => ProctoringTier::Ai,
        }
    }

    /// The camelCase wire name (identical to the serde field name in
    /// [`ProctoringFlags`]).
    pub fn as_str(&self) -> &'static str {
        use FlagName::*;
        match self {
            BrowserLockdown => "browserLockdown",
            TabSwitchingDetection => "tabSwitchingDetection",
            CopyPasteDetection => "copyPasteDetection",
            RightClickDetection => "rightClickDetection",
            FullscreenRequirement => "fullscreenRequirement",
            KeyboardShortcutDetection => "keyboardShortcutDetection",
            RequireWebcam => "requireWebcam",
            RequireMicrophone => "requireMicrophone",
            ScreenSharingDetection => "screenSharingDetection",
            MultipleDeviceDetection => "multipleDeviceDetection",
            PlagiarismDetection => "plagiarismDetection",
            FaceDetection => "faceDetection",
            VoiceDetection => "voiceDetection",
            BackgroundNoiseDetection => "backgroundNoiseDetection",
            EyeTrackingDetection => "eyeTrackingDetection",
            BehavioralAnalysis => "behavioralAnalysis",
            FacialRecognition => "facialRecognition",
            EmotionDetection => "emotionDetection",
            AttentionMonitoring => "attentionMonitoring",
            SuspiciousActivityDetection => "suspiciousActivityDetection",
            AiPlagiarismDetection => "aiPlagiarismDetection",
            VoiceAnalysis => "voiceAnalysis",
            GestureRecognition => "gestureRecognition",
            RealTimeAlerts => "realTimeAlerts",
        }
    }
}

impl std::fmt::Display for FlagName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ProctoringFlags
// ---------------------------------------------------------------------------

/// The complete 24-flag proctoring record.
///
/// Produced only by the policy resolver (`prk-policy`) so that the tier
/// containment invariant holds for every value in the system. Field order
/// matches [`FlagName::ALL`]; serde names are the camelCase wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProctoringFlags {
    // Basic
    pub browser_lockdown: bool,
    pub tab_switching_detection: bool,
    pub copy_paste_detection: bool,
    pub right_click_detection: bool,
    pub fullscreen_requirement: bool,
    pub keyboard_shortcut_detection: bool,

    // Advanced
    pub require_webcam: bool,
    pub require_microphone: bool,
    pub screen_sharing_detection: bool,
    pub multiple_device_detection: bool,
    pub plagiarism_detection: bool,
    pub face_detection: bool,
    pub voice_detection: bool,
    pub background_noise_detection: bool,
    pub eye_tracking_detection: bool,

    // AI
    pub behavioral_analysis: bool,
    pub facial_recognition: bool,
    pub emotion_detection: bool,
    pub attention_monitoring: bool,
    pub suspicious_activity_detection: bool,
    pub ai_plagiarism_detection: bool,
    pub voice_analysis: bool,
    pub gesture_recognition: bool,
    pub real_time_alerts: bool,
}

impl ProctoringFlags {
    /// All 24 flags false (the `none` bundle).
    pub fn all_false() -> Self {
        Self::default()
    }

    pub fn get(&self, flag: FlagName) -> bool {
        use FlagName::*;
        match flag {
            BrowserLockdown => self.browser_lockdown,
            TabSwitchingDetection => self.tab_switching_detection,
            CopyPasteDetection => self.copy_paste_detection,
            RightClickDetection => self.right_click_detection,
            FullscreenRequirement => self.fullscreen_requirement,
            KeyboardShortcutDetection => self.keyboard_shortcut_detection,
            RequireWebcam => self.require_webcam,
            RequireMicrophone => self.require_microphone,
            ScreenSharingDetection => self.screen_sharing_detection,
            MultipleDeviceDetection => self.multiple_device_detection,
            PlagiarismDetection => self.plagiarism_detection,
            FaceDetection => self.face_detection,
            VoiceDetection => self.voice_detection,
            BackgroundNoiseDetection => self.background_noise_detection,
            EyeTrackingDetection => self.eye_tracking_detection,
            BehavioralAnalysis => self.behavioral_analysis,
            FacialRecognition => self.facial_recognition,
            EmotionDetection => self.emotion_detection,
            AttentionMonitoring => self.attention_monitoring,
            SuspiciousActivityDetection => self.suspicious_activity_detection,
            AiPlagiarismDetection => self.ai_plagiarism_detection,
            VoiceAnalysis => self.voice_analysis,
            GestureRecognition => self.gesture_recognition,
            RealTimeAlerts => self.real_time_alerts,
        }
    }

    pub fn set(&mut self, flag: FlagName, value: bool) {
        use FlagName::*;
        match flag {
            BrowserLockdown => self.browser_lockdown = value,
            TabSwitchingDetection => self.tab_switching_detection = value,
            CopyPasteDetection => self.copy_paste_detection = value,
            RightClickDetection => self.right_click_detection = value,
            FullscreenRequirement => self.fullscreen_requirement = value,
            KeyboardShortcutDetection => self.keyboard_shortcut_detection = value,
            RequireWebcam => self.require_webcam = value,
            RequireMicrophone => self.require_microphone = value,
            ScreenSharingDetection => self.screen_sharing_detection = value,
            MultipleDeviceDetection => self.multiple_device_detection = value,
            PlagiarismDetection => self.plagiarism_detection = value,
            FaceDetection => self.face_detection = value,
            VoiceDetection => self.voice_detection = value,
            BackgroundNoiseDetection => self.background_noise_detection = value,
            EyeTrackingDetection => self.eye_tracking_detection = value,
            BehavioralAnalysis => self.behavioral_analysis = value,
            FacialRecognition => self.facial_recognition = value,
            EmotionDetection => self.emotion_detection = value,
            AttentionMonitoring => self.attention_monitoring = value,
            SuspiciousActivityDetection => self.suspicious_activity_detection = value,
            AiPlagiarismDetection => self.ai_plagiarism_detection = value,
            VoiceAnalysis => self.voice_analysis = value,
            GestureRecognition => self.gesture_recognition = value,
            RealTimeAlerts => self.real_time_alerts = value,
        }
    }

    /// Flags currently true, in canonical order.
    pub fn enabled(&self) -> Vec<FlagName> {
        FlagName::ALL.iter().copied().filter(|f| self.get(*f)).collect()
    }
}

// ---------------------------------------------------------------------------
// ProctoringSettings
// ---------------------------------------------------------------------------

/// The persisted `proctoring_settings` payload.
///
/// `max_tab_switches` is a user-supplied setting, NOT part of the resolved
/// flag record: tier changes replace `proctoring_type` + the flags
/// wholesale and must leave it untouched. `0` means unlimited; the value
/// is only meaningful while `tabSwitchingDetection` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProctoringSettings {
    pub proctoring_type: ProctoringTier,
    #[serde(flatten)]
    pub flags: ProctoringFlags,
    #[serde(rename = "maxTabSwitches")]
    pub max_tab_switches: u32,
}

impl ProctoringSettings {
    /// Proctoring off: tier `none`, all flags false, unlimited tab switches.
    pub fn disabled() -> Self {
        Self {
            proctoring_type: ProctoringTier::None,
            flags: ProctoringFlags::all_false(),
            max_tab_switches: 0,
        }
    }

    /// Replace the tier and its resolved bundle, preserving
    /// `max_tab_switches`. Callers resolve the bundle via `prk-policy`.
    pub fn apply_resolved(&mut self, tier: ProctoringTier, flags: ProctoringFlags) {
        self.proctoring_type = tier;
        self.flags = flags;
    }
}

// ---------------------------------------------------------------------------
// CapabilityKind
// ---------------------------------------------------------------------------

/// A device capability negotiated before a proctored assessment can begin.
///
/// Declaration order is the fixed setup priority: lockdown runs last
/// because it is cheapest, least likely to fail, and gates nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CapabilityKind {
    Webcam,
    Microphone,
    Fullscreen,
    ScreenRecording,
    BrowserLockdown,
}

impl CapabilityKind {
    /// All capabilities in setup priority order.
    pub const ALL: [CapabilityKind; 5] = [
        CapabilityKind::Webcam,
        CapabilityKind::Microphone,
        CapabilityKind::Fullscreen,
        CapabilityKind::ScreenRecording,
        CapabilityKind::BrowserLockdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityKind::Webcam => "webcam",
            CapabilityKind::Microphone => "microphone",
            CapabilityKind::Fullscreen => "fullscreen",
            CapabilityKind::ScreenRecording => "screenRecording",
            CapabilityKind::BrowserLockdown => "browserLockdown",
        }
    }
}

impl std::fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DeviceInfo
// ---------------------------------------------------------------------------

/// Capability metadata captured at grant time. Read-only snapshot owned by
/// the setup run; a later re-probe reads fresh settings from the live
/// stream rather than mutating this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "kind")]
pub enum DeviceInfo {
    /// Negotiated webcam settings.
    Video {
        width: u32,
        height: u32,
        frame_rate: u32,
        label: String,
    },
    /// Negotiated microphone settings.
    Audio {
        sample_rate: u32,
        channel_count: u16,
        label: String,
    },
}

impl DeviceInfo {
    pub fn label(&self) -> &str {
        match self {
            DeviceInfo::Video { label, .. } => label,
            DeviceInfo::Audio { label, .. } => label,
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
