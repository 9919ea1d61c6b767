use prk_devices_sim::{ScriptedHost, ScriptedOutcome};
use prk_schemas::{CapabilityKind, ProctoringFlags};
use prk_setup::{FailureKind, RunStatus, SetupConfig, SetupSequencer, StepOutcome};

fn advanced_style_flags() -> ProctoringFlags {
    let mut flags = ProctoringFlags::all_false();
    flags.require_webcam = true;
    flags.require_microphone = true;
    flags.fullscreen_requirement = true;
    flags.browser_lockdown = true;
    flags
}

#[tokio::test]
async fn scenario_webcam_denial_aborts_at_step_zero() {
    let host = ScriptedHost::grant_all().with_outcome(
        CapabilityKind::Webcam,
        ScriptedOutcome::Deny("user clicked Block".to_string()),
    );
    let registry = host.streams();

    let mut seq = SetupSequencer::new(&advanced_style_flags(), host, SetupConfig::immediate());
    assert_eq!(seq.run().await, RunStatus::Aborted);

    let run = seq.run_state();
    assert_eq!(run.current, 0, "run must stop at the failing step");

    // The failing triple names the capability, the kind, and the message.
    let failure = run.first_failure().unwrap();
    assert_eq!(failure.step, CapabilityKind::Webcam);
    assert_eq!(failure.kind, FailureKind::PermissionDenied);
    assert_eq!(failure.message, "user clicked Block");

    // No subsequent step was attempted.
    for outcome in &run.outcomes[1..] {
        assert_eq!(*outcome, StepOutcome::Pending);
    }
    assert!(run.granted.is_empty());
    assert!(
        registry.handle(CapabilityKind::Microphone).is_none(),
        "microphone must never have been requested"
    );
}

#[tokio::test]
async fn scenario_denial_mid_run_preserves_earlier_successes() {
    // Webcam grants, microphone (required) is denied at index 1.
    let host = ScriptedHost::grant_all().with_outcome(
        CapabilityKind::Microphone,
        ScriptedOutcome::Deny("denied".to_string()),
    );
    let registry = host.streams();

    let mut seq = SetupSequencer::new(&advanced_style_flags(), host, SetupConfig::immediate());
    assert_eq!(seq.run().await, RunStatus::Aborted);

    let run = seq.run_state();
    assert_eq!(run.current, 1);
    assert_eq!(run.outcomes[0], StepOutcome::Succeeded);
    assert!(run.granted.contains(&CapabilityKind::Webcam));
    assert!(run.device_info.contains_key(&CapabilityKind::Webcam));

    // The granted camera stream is still held (caller decides whether to
    // re-prompt or clean up).
    assert!(registry.handle(CapabilityKind::Webcam).unwrap().is_live());
}
