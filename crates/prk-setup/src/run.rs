//! Run state: per-step outcomes, granted capabilities, owned streams.

use std::collections::{BTreeMap, BTreeSet};

use prk_schemas::{CapabilityKind, DeviceInfo};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::host::{FailureKind, MediaStream};
use crate::plan::SetupStep;

// ---------------------------------------------------------------------------
// Step results
// ---------------------------------------------------------------------------

/// The machine-readable `(step, kind, message)` triple callers render
/// actionable guidance from. The sequencer never masks which capability
/// failed or why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    pub step: CapabilityKind,
    pub kind: FailureKind,
    pub message: String,
}

impl std::fmt::Display for StepFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.step, self.kind.code(), self.message)
    }
}

impl std::error::Error for StepFailure {}

/// Outcome slot for one plan index. A later failure never rewrites an
/// earlier `Succeeded`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    Pending,
    Succeeded,
    Failed(StepFailure),
}

// ---------------------------------------------------------------------------
// Run status & events
// ---------------------------------------------------------------------------

/// Overall run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    NotStarted,
    Running,
    /// Every step attempted; no required step failed. **Terminal.**
    Completed,
    /// A required step failed; no further steps were attempted. **Terminal.**
    Aborted,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }
}

/// Progress events emitted while a run executes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SetupEvent {
    StepStarted {
        index: usize,
        step: CapabilityKind,
    },
    StepSucceeded {
        index: usize,
        step: CapabilityKind,
    },
    StepFailed {
        index: usize,
        failure: StepFailure,
        /// `true` when the step was required and the run is aborting.
        fatal: bool,
    },
    RunCompleted {
        granted: Vec<CapabilityKind>,
        device_info: BTreeMap<CapabilityKind, DeviceInfo>,
    },
    RunAborted {
        failure: StepFailure,
    },
}

// ---------------------------------------------------------------------------
// Owned streams
// ---------------------------------------------------------------------------

/// The camera/microphone streams a run holds. Release stops every track,
/// is idempotent, and also fires on drop so an unmounted host cannot leak
/// device handles.
#[derive(Default)]
pub(crate) struct StreamBag {
    pub(crate) camera: Option<Box<dyn MediaStream>>,
    pub(crate) microphone: Option<Box<dyn MediaStream>>,
}

impl StreamBag {
    pub(crate) fn release(&mut self) {
        if let Some(mut stream) = self.camera.take() {
            stream.stop();
        }
        if let Some(mut stream) = self.microphone.take() {
            stream.stop();
        }
    }
}

impl Drop for StreamBag {
    fn drop(&mut self) {
        self.release();
    }
}

// ---------------------------------------------------------------------------
// SetupRun
// ---------------------------------------------------------------------------

/// The mutable state of one sequencer execution.
///
/// Created when setup starts, mutated only by the sequencer, and reset on
/// cleanup or when the hosting context is torn down. The step list is
/// fixed at creation.
pub struct SetupRun {
    pub run_id: Uuid,
    pub plan: Vec<SetupStep>,
    /// Index of the step currently (or last) executed.
    pub current: usize,
    pub outcomes: Vec<StepOutcome>,
    pub status: RunStatus,
    /// Capability metadata captured at grant time, per capability.
    pub device_info: BTreeMap<CapabilityKind, DeviceInfo>,
    /// Capabilities whose step succeeded.
    pub granted: BTreeSet<CapabilityKind>,
    pub(crate) streams: StreamBag,
}

impl SetupRun {
    pub fn new(plan: Vec<SetupStep>) -> Self {
        let outcomes = vec![StepOutcome::Pending; plan.len()];
        Self {
            run_id: Uuid::new_v4(),
            plan,
            current: 0,
            outcomes,
            status: RunStatus::NotStarted,
            device_info: BTreeMap::new(),
            granted: BTreeSet::new(),
            streams: StreamBag::default(),
        }
    }

    pub(crate) fn record_success(&mut self, index: usize) {
        self.outcomes[index] = StepOutcome::Succeeded;
        self.granted.insert(self.plan[index].kind);
    }

    pub(crate) fn record_failure(&mut self, index: usize, failure: StepFailure) {
        self.outcomes[index] = StepOutcome::Failed(failure);
    }

    /// The first recorded failure, if any.
    pub fn first_failure(&self) -> Option<&StepFailure> {
        self.outcomes.iter().find_map(|o| match o {
            StepOutcome::Failed(f) => Some(f),
            _ => None,
        })
    }
}
