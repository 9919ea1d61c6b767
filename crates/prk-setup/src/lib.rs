//! Device Capability Setup Sequencer.
//!
//! Executes, in a fixed deterministic order, the device-capability
//! negotiations implied by a resolved proctoring flag set: webcam →
//! microphone → fullscreen → screenRecording → browserLockdown. Each step
//! acquires or probes one capability through the [`DeviceHost`] seam and
//! records a structured per-step result; the run-level state machine
//! decides abort vs continue.
//!
//! # State diagram
//!
//! ```text
//!               step ok            step ok
//! NotStarted ──► Running(0) ─────► Running(1) ─────► … ─────► Completed
//!                   │ settle delay     │
//!                   │ between steps    │ required step failed
//!                   │                  ▼
//!                   │              Aborted  (failing step + triple surfaced,
//!                   │                        no further steps attempted)
//!                   │
//!                   └─ optional step failed → failure recorded, warning
//!                      emitted, run continues to the next index
//! ```
//!
//! # Resource model
//!
//! Camera and microphone streams granted during a run are owned by that
//! run (no ambient shared handles). Exactly one run may hold device
//! streams at a time: starting a new run releases the previous run's
//! streams first. [`SetupSequencer::cleanup`] stops all held tracks, is
//! idempotent, and also fires on drop — leaked camera/microphone handles
//! are the primary hazard this crate exists to avoid.
//!
//! Everything is single-threaded and cooperative: every await boundary is
//! a capability-grant prompt or the inter-step settle delay, both of which
//! can be arbitrarily long because a human owns them. An optional prompt
//! timeout in [`SetupConfig`] converts an unanswered prompt into a
//! [`FailureKind::Timeout`] step failure.

mod config;
mod host;
mod plan;
mod run;
mod sequencer;

pub use config::SetupConfig;
pub use host::{
    AudioConstraints, CapabilityError, DeviceHost, FailureKind, LockdownSurface, MediaStream,
    VideoConstraints,
};
pub use plan::{derive_plan, SetupStep};
pub use run::{RunStatus, SetupEvent, SetupRun, StepFailure, StepOutcome};
pub use sequencer::{ProbeReport, SetupSequencer};
