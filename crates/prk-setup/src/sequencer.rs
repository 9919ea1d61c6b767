//! The sequencer: drives the setup plan against a [`DeviceHost`].

use std::time::Duration;

use prk_schemas::{CapabilityKind, DeviceInfo, ProctoringFlags};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, warn};

use crate::config::SetupConfig;
use crate::host::{AudioConstraints, CapabilityError, DeviceHost, MediaStream, VideoConstraints};
use crate::plan::{derive_plan, SetupStep};
use crate::run::{RunStatus, SetupEvent, SetupRun, StepFailure};

// ---------------------------------------------------------------------------
// ProbeReport
// ---------------------------------------------------------------------------

/// Result of a `test_webcam` / `test_microphone` re-verification probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub working: bool,
    /// Current negotiated settings when the stream is readable.
    pub settings: Option<DeviceInfo>,
    /// Underlying error message when `working` is false.
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// SetupSequencer
// ---------------------------------------------------------------------------

/// Executes the capability steps implied by a resolved flag set, one at a
/// time, in fixed priority order.
///
/// See the crate docs for the state machine and resource model. The
/// sequencer owns the [`DeviceHost`] and the current [`SetupRun`]; the
/// run owns any granted camera/microphone streams, so dropping the
/// sequencer releases them.
pub struct SetupSequencer<H: DeviceHost> {
    host: H,
    config: SetupConfig,
    run: SetupRun,
    events: Option<UnboundedSender<SetupEvent>>,
}

impl<H: DeviceHost> SetupSequencer<H> {
    /// Build a sequencer for the given flag set. The step list is derived
    /// here, once, and does not change across runs of this sequencer.
    pub fn new(flags: &ProctoringFlags, host: H, config: SetupConfig) -> Self {
        Self {
            host,
            config,
            run: SetupRun::new(derive_plan(flags)),
            events: None,
        }
    }

    /// Install a progress-event sink. Send failures (receiver dropped) are
    /// ignored; the run state itself is authoritative.
    pub fn with_events(mut self, sender: UnboundedSender<SetupEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// The current run state.
    pub fn run_state(&self) -> &SetupRun {
        &self.run
    }

    /// Execute the full setup sequence.
    ///
    /// Starting a run while streams from a previous run are held releases
    /// them first — exactly one run may hold device streams at a time.
    /// Steps execute strictly in plan order; a required-step failure
    /// aborts immediately, an optional-step failure is recorded and the
    /// run continues. Returns the terminal status.
    pub async fn run(&mut self) -> RunStatus {
        // No overlap of device streams between runs.
        self.run.streams.release();
        let plan = self.run.plan.clone();
        self.run = SetupRun::new(plan);
        self.run.status = RunStatus::Running;

        let total = self.run.plan.len();
        for index in 0..total {
            self.run.current = index;
            let step = self.run.plan[index].clone();
            debug!(run_id = %self.run.run_id, step = %step.kind, index, "setup step started");
            self.emit(SetupEvent::StepStarted {
                index,
                step: step.kind,
            });

            match self.execute_step(&step).await {
                Ok(()) => {
                    self.run.record_success(index);
                    debug!(step = %step.kind, "setup step succeeded");
                    self.emit(SetupEvent::StepSucceeded {
                        index,
                        step: step.kind,
                    });
                }
                Err(failure) if step.required => {
                    error!(step = %failure.step, code = failure.kind.code(), message = %failure.message,
                        "required setup step failed; aborting run");
                    self.run.record_failure(index, failure.clone());
                    self.run.status = RunStatus::Aborted;
                    self.emit(SetupEvent::StepFailed {
                        index,
                        failure: failure.clone(),
                        fatal: true,
                    });
                    self.emit(SetupEvent::RunAborted { failure });
                    return RunStatus::Aborted;
                }
                Err(failure) => {
                    warn!(step = %failure.step, code = failure.kind.code(), message = %failure.message,
                        "optional setup step failed; continuing");
                    self.run.record_failure(index, failure.clone());
                    self.emit(SetupEvent::StepFailed {
                        index,
                        failure,
                        fatal: false,
                    });
                }
            }

            // Let device/UI state settle (e.g. a fullscreen toggle) before
            // the next prompt. Steps never overlap.
            if index + 1 < total {
                tokio::time::sleep(self.config.settle_delay).await;
            }
        }

        self.run.status = RunStatus::Completed;
        self.emit(SetupEvent::RunCompleted {
            granted: self.run.granted.iter().copied().collect(),
            device_info: self.run.device_info.clone(),
        });
        RunStatus::Completed
    }

    // One step, converted to a structured result. Host errors never
    // propagate raw: only the (step, kind, message) triple leaves here.
    async fn execute_step(&mut self, step: &SetupStep) -> Result<(), StepFailure> {
        let result = match step.kind {
            CapabilityKind::Webcam => self.acquire_webcam().await,
            CapabilityKind::Microphone => self.acquire_microphone().await,
            CapabilityKind::Fullscreen => {
                with_prompt_timeout(self.config.prompt_timeout, self.host.probe_fullscreen()).await
            }
            CapabilityKind::ScreenRecording => {
                with_prompt_timeout(self.config.prompt_timeout, self.host.probe_screen_capture())
                    .await
            }
            CapabilityKind::BrowserLockdown => self.verify_lockdown_surface(),
        };
        result.map_err(|err| StepFailure {
            step: step.kind,
            kind: err.kind,
            message: err.message,
        })
    }

    async fn acquire_webcam(&mut self) -> Result<(), CapabilityError> {
        let constraints = VideoConstraints::proctoring_default();
        let stream = with_prompt_timeout(
            self.config.prompt_timeout,
            self.host.acquire_camera(&constraints),
        )
        .await?;
        let info = stream.settings()?;
        // Replacing a held stream stops the old one first.
        if let Some(mut old) = self.run.streams.camera.replace(stream) {
            old.stop();
        }
        self.run.device_info.insert(CapabilityKind::Webcam, info);
        Ok(())
    }

    async fn acquire_microphone(&mut self) -> Result<(), CapabilityError> {
        let constraints = AudioConstraints::proctoring_default();
        let stream = with_prompt_timeout(
            self.config.prompt_timeout,
            self.host.acquire_microphone(&constraints),
        )
        .await?;
        let info = stream.settings()?;
        if let Some(mut old) = self.run.streams.microphone.replace(stream) {
            old.stop();
        }
        self.run.device_info.insert(CapabilityKind::Microphone, info);
        Ok(())
    }

    fn verify_lockdown_surface(&self) -> Result<(), CapabilityError> {
        let surface = self.host.lockdown_surface();
        let missing = surface.missing_apis();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CapabilityError::api_unavailable(format!(
                "missing lockdown APIs: {}",
                missing.join(", ")
            )))
        }
    }

    /// Re-verify the webcam from the already-acquired stream. Does not
    /// re-request permission; safe to call any number of times, including
    /// after the track was externally revoked or before any run.
    pub fn test_webcam(&self) -> ProbeReport {
        probe_stream(self.run.streams.camera.as_deref(), "webcam")
    }

    /// Re-verify the microphone. Same contract as [`test_webcam`][Self::test_webcam].
    pub fn test_microphone(&self) -> ProbeReport {
        probe_stream(self.run.streams.microphone.as_deref(), "microphone")
    }

    /// Stop and drop all held media streams.
    ///
    /// Idempotent; a no-op on a `NotStarted` run or after a previous
    /// cleanup. Also runs on drop. Cleanup is cooperative: it cannot
    /// abort an in-flight browser prompt, but once any pending grant
    /// resolves the stream is stopped and no further step is attempted.
    ///
    /// Run history (status, per-step outcomes, device info) is
    /// intentionally preserved so callers can still render what happened;
    /// only the device resources are released. The next [`run`][Self::run]
    /// call replaces the history wholesale.
    pub fn cleanup(&mut self) {
        self.run.streams.release();
    }

    fn emit(&self, event: SetupEvent) {
        if let Some(sender) = &self.events {
            let _ = sender.send(event);
        }
    }
}

fn probe_stream(stream: Option<&dyn MediaStream>, what: &str) -> ProbeReport {
    let Some(stream) = stream else {
        return ProbeReport {
            working: false,
            settings: None,
            message: Some(format!("{what} has not been acquired")),
        };
    };
    if !stream.is_live() {
        return ProbeReport {
            working: false,
            settings: None,
            message: Some(format!("{what} track has ended")),
        };
    }
    match stream.settings() {
        Ok(info) => ProbeReport {
            working: true,
            settings: Some(info),
            message: None,
        },
        Err(err) => ProbeReport {
            working: false,
            settings: None,
            message: Some(err.message),
        },
    }
}

async fn with_prompt_timeout<T>(
    timeout: Option<Duration>,
    fut: impl std::future::Future<Output = Result<T, CapabilityError>>,
) -> Result<T, CapabilityError> {
    match timeout {
        None => fut.await,
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(CapabilityError::timeout(format!(
                "no response within {limit:?}"
            ))),
        },
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::LockdownSurface;
    use crate::run::StepOutcome;

    // -- Stubs ---------------------------------------------------------------

    struct StubStream {
        live: bool,
        info: DeviceInfo,
    }

    impl MediaStream for StubStream {
        fn stop(&mut self) {
            self.live = false;
        }
        fn is_live(&self) -> bool {
            self.live
        }
        fn settings(&self) -> Result<DeviceInfo, CapabilityError> {
            if self.live {
                Ok(self.info.clone())
            } else {
                Err(CapabilityError::unknown("track ended"))
            }
        }
        fn label(&self) -> String {
            self.info.label().to_string()
        }
    }

    /// Host that grants everything at the ideal constraint values.
    struct GrantAllHost;

    impl DeviceHost for GrantAllHost {
        async fn acquire_camera(
            &mut self,
            constraints: &VideoConstraints,
        ) -> Result<Box<dyn MediaStream>, CapabilityError> {
            Ok(Box::new(StubStream {
                live: true,
                info: DeviceInfo::Video {
                    width: constraints.ideal_width,
                    height: constraints.ideal_height,
                    frame_rate: constraints.ideal_frame_rate,
                    label: "Stub Camera".to_string(),
                },
            }))
        }

        async fn acquire_microphone(
            &mut self,
            constraints: &AudioConstraints,
        ) -> Result<Box<dyn MediaStream>, CapabilityError> {
            Ok(Box::new(StubStream {
                live: true,
                info: DeviceInfo::Audio {
                    sample_rate: constraints.ideal_sample_rate,
                    channel_count: 1,
                    label: "Stub Microphone".to_string(),
                },
            }))
        }

        async fn probe_fullscreen(&mut self) -> Result<(), CapabilityError> {
            Ok(())
        }

        async fn probe_screen_capture(&mut self) -> Result<(), CapabilityError> {
            Ok(())
        }

        fn lockdown_surface(&self) -> LockdownSurface {
            LockdownSurface::complete()
        }
    }

    /// Host whose lockdown surface is incomplete; everything else grants.
    struct NoFocusHooksHost;

    impl DeviceHost for NoFocusHooksHost {
        async fn acquire_camera(
            &mut self,
            constraints: &VideoConstraints,
        ) -> Result<Box<dyn MediaStream>, CapabilityError> {
            GrantAllHost.acquire_camera(constraints).await
        }

        async fn acquire_microphone(
            &mut self,
            constraints: &AudioConstraints,
        ) -> Result<Box<dyn MediaStream>, CapabilityError> {
            GrantAllHost.acquire_microphone(constraints).await
        }

        async fn probe_fullscreen(&mut self) -> Result<(), CapabilityError> {
            Ok(())
        }

        async fn probe_screen_capture(&mut self) -> Result<(), CapabilityError> {
            Ok(())
        }

        fn lockdown_surface(&self) -> LockdownSurface {
            LockdownSurface {
                fullscreen_supported: true,
                page_visibility: true,
                focus_hooks: false,
            }
        }
    }

    fn full_flags() -> ProctoringFlags {
        let mut flags = ProctoringFlags::all_false();
        flags.require_webcam = true;
        flags.require_microphone = true;
        flags.fullscreen_requirement = true;
        flags.screen_sharing_detection = true;
        flags.browser_lockdown = true;
        flags
    }

    // -- Tests ---------------------------------------------------------------

    #[tokio::test]
    async fn grant_all_run_completes() {
        let mut seq = SetupSequencer::new(&full_flags(), GrantAllHost, SetupConfig::immediate());
        assert_eq!(seq.run().await, RunStatus::Completed);

        let run = seq.run_state();
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.granted.len(), 5);
        assert!(run.outcomes.iter().all(|o| *o == StepOutcome::Succeeded));
        assert!(run.device_info.contains_key(&CapabilityKind::Webcam));
        assert!(run.device_info.contains_key(&CapabilityKind::Microphone));
        // Transient probes record no device info.
        assert!(!run.device_info.contains_key(&CapabilityKind::Fullscreen));
    }

    #[tokio::test]
    async fn probes_report_working_after_completion() {
        let mut seq = SetupSequencer::new(&full_flags(), GrantAllHost, SetupConfig::immediate());
        seq.run().await;

        let cam = seq.test_webcam();
        assert!(cam.working);
        assert!(matches!(cam.settings, Some(DeviceInfo::Video { width: 1280, .. })));

        let mic = seq.test_microphone();
        assert!(mic.working);
        assert!(matches!(mic.settings, Some(DeviceInfo::Audio { sample_rate: 44_100, .. })));
    }

    #[tokio::test]
    async fn probes_before_any_run_report_not_working() {
        let seq = SetupSequencer::new(&full_flags(), GrantAllHost, SetupConfig::immediate());
        let report = seq.test_webcam();
        assert!(!report.working);
        assert!(report.message.unwrap().contains("not been acquired"));
    }

    #[tokio::test]
    async fn cleanup_before_start_is_noop() {
        let mut seq = SetupSequencer::new(&full_flags(), GrantAllHost, SetupConfig::immediate());
        seq.cleanup();
        seq.cleanup();
        assert_eq!(seq.run_state().status, RunStatus::NotStarted);
    }

    #[tokio::test]
    async fn missing_lockdown_api_aborts_with_api_unavailable() {
        let mut flags = ProctoringFlags::all_false();
        flags.browser_lockdown = true;

        let mut seq = SetupSequencer::new(&flags, NoFocusHooksHost, SetupConfig::immediate());
        assert_eq!(seq.run().await, RunStatus::Aborted);

        let failure = seq.run_state().first_failure().unwrap();
        assert_eq!(failure.step, CapabilityKind::BrowserLockdown);
        assert_eq!(failure.kind, crate::host::FailureKind::ApiUnavailable);
        assert!(failure.message.contains("focusHooks"));
    }

    #[tokio::test]
    async fn events_trace_the_run_in_order() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut seq = SetupSequencer::new(&full_flags(), GrantAllHost, SetupConfig::immediate())
            .with_events(tx);
        seq.run().await;

        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        // 5 steps × (started + succeeded) + completion.
        assert_eq!(events.len(), 11);
        assert!(matches!(
            events[0],
            SetupEvent::StepStarted { index: 0, step: CapabilityKind::Webcam }
        ));
        assert!(matches!(events.last().unwrap(), SetupEvent::RunCompleted { .. }));
    }
}
