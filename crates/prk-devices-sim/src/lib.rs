//! Scripted in-memory [`DeviceHost`] for scenario tests.
//!
//! Plays the role a real browser-API adapter plays in production: each
//! capability is scripted to grant, deny, report the API missing, or hang
//! like an unanswered permission prompt. Granted streams are observable
//! from outside through [`SimStreamHandle`]s — tests assert stop counts,
//! liveness, and can revoke a track externally the way an OS-level
//! permission withdrawal would.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use prk_schemas::{CapabilityKind, DeviceInfo};
use prk_setup::{
    AudioConstraints, CapabilityError, DeviceHost, LockdownSurface, MediaStream, VideoConstraints,
};

// ---------------------------------------------------------------------------
// Scripted outcomes
// ---------------------------------------------------------------------------

/// What the host does when a capability is requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedOutcome {
    Grant,
    /// User declined the permission prompt.
    Deny(String),
    /// Browser/platform lacks the feature.
    Unavailable(String),
    /// Never resolves — models a permission prompt the user ignores.
    /// Only meaningful together with a configured prompt timeout.
    Hang,
}

// ---------------------------------------------------------------------------
// Simulated streams
// ---------------------------------------------------------------------------

struct SimTrack {
    live: bool,
    stop_count: u32,
    info: DeviceInfo,
}

/// Test-side view of a granted stream. Cloneable; survives the stream
/// itself so stop counts remain observable after release.
#[derive(Clone)]
pub struct SimStreamHandle(Arc<Mutex<SimTrack>>);

impl SimStreamHandle {
    pub fn is_live(&self) -> bool {
        self.0.lock().unwrap().live
    }

    /// Times `stop` transitioned the track from live to ended. Idempotent
    /// stops and external revocation do not count.
    pub fn stop_count(&self) -> u32 {
        self.0.lock().unwrap().stop_count
    }

    /// End the track from outside, as an OS-level permission withdrawal
    /// would. The holder is not notified; it discovers the dead track on
    /// its next probe.
    pub fn revoke(&self) {
        self.0.lock().unwrap().live = false;
    }
}

struct SimStream(Arc<Mutex<SimTrack>>);

impl MediaStream for SimStream {
    fn stop(&mut self) {
        let mut track = self.0.lock().unwrap();
        if track.live {
            track.live = false;
            track.stop_count += 1;
        }
    }

    fn is_live(&self) -> bool {
        self.0.lock().unwrap().live
    }

    fn settings(&self) -> Result<DeviceInfo, CapabilityError> {
        let track = self.0.lock().unwrap();
        if track.live {
            Ok(track.info.clone())
        } else {
            Err(CapabilityError::unknown("track has been stopped"))
        }
    }

    fn label(&self) -> String {
        self.0.lock().unwrap().info.label().to_string()
    }
}

/// Handles to every stream the host has granted, keyed by capability.
#[derive(Clone, Default)]
pub struct SimStreamRegistry(Arc<Mutex<HashMap<CapabilityKind, SimStreamHandle>>>);

impl SimStreamRegistry {
    pub fn handle(&self, kind: CapabilityKind) -> Option<SimStreamHandle> {
        self.0.lock().unwrap().get(&kind).cloned()
    }

    fn register(&self, kind: CapabilityKind, handle: SimStreamHandle) {
        self.0.lock().unwrap().insert(kind, handle);
    }
}

// ---------------------------------------------------------------------------
// ScriptedHost
// ---------------------------------------------------------------------------

/// A [`DeviceHost`] whose per-capability behavior is scripted up front.
///
/// Defaults to granting everything at the requested ideal settings with a
/// complete lockdown surface. The browserLockdown step has no prompt; its
/// failure mode is scripted through [`with_lockdown_surface`][Self::with_lockdown_surface].
pub struct ScriptedHost {
    outcomes: HashMap<CapabilityKind, ScriptedOutcome>,
    lockdown: LockdownSurface,
    registry: SimStreamRegistry,
}

impl ScriptedHost {
    pub fn grant_all() -> Self {
        Self {
            outcomes: HashMap::new(),
            lockdown: LockdownSurface::complete(),
            registry: SimStreamRegistry::default(),
        }
    }

    pub fn with_outcome(mut self, kind: CapabilityKind, outcome: ScriptedOutcome) -> Self {
        self.outcomes.insert(kind, outcome);
        self
    }

    pub fn with_lockdown_surface(mut self, surface: LockdownSurface) -> Self {
        self.lockdown = surface;
        self
    }

    /// Clone of the stream registry; take one before moving the host into
    /// a sequencer.
    pub fn streams(&self) -> SimStreamRegistry {
        self.registry.clone()
    }

    fn outcome(&self, kind: CapabilityKind) -> ScriptedOutcome {
        self.outcomes
            .get(&kind)
            .cloned()
            .unwrap_or(ScriptedOutcome::Grant)
    }

    async fn scripted(&self, kind: CapabilityKind) -> Result<(), CapabilityError> {
        match self.outcome(kind) {
            ScriptedOutcome::Grant => Ok(()),
            ScriptedOutcome::Deny(msg) => Err(CapabilityError::permission_denied(msg)),
            ScriptedOutcome::Unavailable(msg) => Err(CapabilityError::api_unavailable(msg)),
            ScriptedOutcome::Hang => std::future::pending().await,
        }
    }

    fn grant_stream(&self, kind: CapabilityKind, info: DeviceInfo) -> Box<dyn MediaStream> {
        let track = Arc::new(Mutex::new(SimTrack {
            live: true,
            stop_count: 0,
            info,
        }));
        self.registry.register(kind, SimStreamHandle(track.clone()));
        Box::new(SimStream(track))
    }
}

impl DeviceHost for ScriptedHost {
    async fn acquire_camera(
        &mut self,
        constraints: &VideoConstraints,
    ) -> Result<Box<dyn MediaStream>, CapabilityError> {
        self.scripted(CapabilityKind::Webcam).await?;
        Ok(self.grant_stream(
            CapabilityKind::Webcam,
            DeviceInfo::Video {
                width: constraints.ideal_width,
                height: constraints.ideal_height,
                frame_rate: constraints.ideal_frame_rate,
                label: "Simulated Camera".to_string(),
            },
        ))
    }

    async fn acquire_microphone(
        &mut self,
        constraints: &AudioConstraints,
    ) -> Result<Box<dyn MediaStream>, CapabilityError> {
        self.scripted(CapabilityKind::Microphone).await?;
        Ok(self.grant_stream(
            CapabilityKind::Microphone,
            DeviceInfo::Audio {
                sample_rate: constraints.ideal_sample_rate,
                channel_count: 2,
                label: "Simulated Microphone".to_string(),
            },
        ))
    }

    async fn probe_fullscreen(&mut self) -> Result<(), CapabilityError> {
        self.scripted(CapabilityKind::Fullscreen).await
    }

    async fn probe_screen_capture(&mut self) -> Result<(), CapabilityError> {
        // A real host stops the display stream before returning; the sim
        // never creates one.
        self.scripted(CapabilityKind::ScreenRecording).await
    }

    fn lockdown_surface(&self) -> LockdownSurface {
        self.lockdown
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
