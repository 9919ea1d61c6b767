use std::time::Duration;

use prk_devices_sim::{ScriptedHost, ScriptedOutcome};
use prk_schemas::{CapabilityKind, ProctoringFlags};
use prk_setup::{FailureKind, RunStatus, SetupConfig, SetupSequencer, StepOutcome};

#[tokio::test]
async fn scenario_unanswered_prompt_times_out_and_aborts() {
    let mut flags = ProctoringFlags::all_false();
    flags.require_webcam = true;
    flags.require_microphone = true;
    flags.browser_lockdown = true;

    // The user never answers the microphone prompt.
    let host = ScriptedHost::grant_all()
        .with_outcome(CapabilityKind::Microphone, ScriptedOutcome::Hang);

    let config = SetupConfig {
        settle_delay: Duration::ZERO,
        prompt_timeout: Some(Duration::from_millis(25)),
    };
    let mut seq = SetupSequencer::new(&flags, host, config);
    assert_eq!(seq.run().await, RunStatus::Aborted);

    let run = seq.run_state();
    // The webcam succeeded before the hang and stays recorded.
    assert_eq!(run.outcomes[0], StepOutcome::Succeeded);
    assert!(run.granted.contains(&CapabilityKind::Webcam));

    // The hung prompt surfaced as a Timeout on the microphone step and,
    // being required, aborted the run before the lockdown step.
    let failure = run.first_failure().unwrap();
    assert_eq!(failure.step, CapabilityKind::Microphone);
    assert_eq!(failure.kind, FailureKind::Timeout);
    assert_eq!(*run.outcomes.last().unwrap(), StepOutcome::Pending);
}

#[tokio::test]
async fn scenario_no_timeout_configured_waits_out_a_grant() {
    // Defaults have no prompt timeout; a prompt that *does* resolve is
    // unaffected by the settle delay being nonzero.
    let mut flags = ProctoringFlags::all_false();
    flags.require_webcam = true;

    let config = SetupConfig {
        settle_delay: Duration::from_millis(1),
        prompt_timeout: None,
    };
    let mut seq = SetupSequencer::new(&flags, ScriptedHost::grant_all(), config);
    assert_eq!(seq.run().await, RunStatus::Completed);
}
