use prk_devices_sim::ScriptedHost;
use prk_schemas::{CapabilityKind, ProctoringFlags};
use prk_setup::{RunStatus, SetupConfig, SetupSequencer};

fn media_flags() -> ProctoringFlags {
    let mut flags = ProctoringFlags::all_false();
    flags.require_webcam = true;
    flags.require_microphone = true;
    flags
}

#[tokio::test]
async fn scenario_cleanup_stops_each_track_exactly_once() {
    let host = ScriptedHost::grant_all();
    let registry = host.streams();

    let mut seq = SetupSequencer::new(&media_flags(), host, SetupConfig::immediate());
    assert_eq!(seq.run().await, RunStatus::Completed);

    let cam = registry.handle(CapabilityKind::Webcam).unwrap();
    let mic = registry.handle(CapabilityKind::Microphone).unwrap();
    assert!(cam.is_live() && mic.is_live());

    seq.cleanup();
    assert!(!cam.is_live() && !mic.is_live());
    assert_eq!(cam.stop_count(), 1);
    assert_eq!(mic.stop_count(), 1);

    // Second cleanup is a no-op, not an error.
    seq.cleanup();
    assert_eq!(cam.stop_count(), 1);
    assert_eq!(mic.stop_count(), 1);

    // Only the device resources are released; the run history stays
    // readable for the caller.
    let run = seq.run_state();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.granted.len(), 2);
    assert!(run.device_info.contains_key(&CapabilityKind::Webcam));
}

#[tokio::test]
async fn scenario_dropping_the_sequencer_releases_streams() {
    // The unmount path: no explicit cleanup call, streams must still stop.
    let host = ScriptedHost::grant_all();
    let registry = host.streams();

    {
        let mut seq = SetupSequencer::new(&media_flags(), host, SetupConfig::immediate());
        seq.run().await;
        assert!(registry.handle(CapabilityKind::Webcam).unwrap().is_live());
    }

    let cam = registry.handle(CapabilityKind::Webcam).unwrap();
    let mic = registry.handle(CapabilityKind::Microphone).unwrap();
    assert!(!cam.is_live() && !mic.is_live());
    assert_eq!(cam.stop_count(), 1);
    assert_eq!(mic.stop_count(), 1);
}

#[tokio::test]
async fn scenario_restart_releases_previous_runs_streams_first() {
    // Exactly one run may hold device streams at a time.
    let host = ScriptedHost::grant_all();
    let registry = host.streams();

    let mut seq = SetupSequencer::new(&media_flags(), host, SetupConfig::immediate());
    seq.run().await;
    let first_cam = registry.handle(CapabilityKind::Webcam).unwrap();
    assert!(first_cam.is_live());

    // Second run: the first run's streams are released before any new
    // acquisition, then replaced in the registry by the new grants.
    seq.run().await;
    assert!(!first_cam.is_live());
    assert_eq!(first_cam.stop_count(), 1);

    let second_cam = registry.handle(CapabilityKind::Webcam).unwrap();
    assert!(second_cam.is_live());
    assert!(seq.test_webcam().working);
}
