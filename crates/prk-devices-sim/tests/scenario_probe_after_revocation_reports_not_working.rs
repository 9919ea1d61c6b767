use prk_devices_sim::ScriptedHost;
use prk_schemas::{CapabilityKind, DeviceInfo, ProctoringFlags};
use prk_setup::{RunStatus, SetupConfig, SetupSequencer};

#[tokio::test]
async fn scenario_revoked_webcam_probe_is_safe() {
    let mut flags = ProctoringFlags::all_false();
    flags.require_webcam = true;
    flags.require_microphone = true;

    let host = ScriptedHost::grant_all();
    let registry = host.streams();

    let mut seq = SetupSequencer::new(&flags, host, SetupConfig::immediate());
    assert_eq!(seq.run().await, RunStatus::Completed);
    assert!(seq.test_webcam().working);

    // The OS withdraws camera permission behind our back.
    registry.handle(CapabilityKind::Webcam).unwrap().revoke();

    // Probe must report not-working with a message — never panic or error.
    let report = seq.test_webcam();
    assert!(!report.working);
    assert!(report.settings.is_none());
    assert!(report.message.unwrap().contains("ended"));

    // The microphone probe is unaffected and re-reads live settings.
    let mic = seq.test_microphone();
    assert!(mic.working);
    assert!(matches!(
        mic.settings,
        Some(DeviceInfo::Audio { sample_rate: 44_100, .. })
    ));

    // Probes are idempotent: asking again changes nothing.
    assert!(!seq.test_webcam().working);
    assert!(seq.test_microphone().working);
}
