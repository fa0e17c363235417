// [tests/mirror/apps/server/checkpoint_roundtrip.test.rs]
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use prospector_core_math::prelude::SafePublicKey;
use prospector_server::checkpoint::{load_checkpoint, write_checkpoint};
use prospector_server::{AppState, MissionConfig, Partitioner};
use prospector_domain_models::WorkRange;

fn scalar(low_byte: u8) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[31] = low_byte;
    bytes
}

fn dist(low_byte: u8) -> [u8; 32] {
    scalar(low_byte)
}

fn make_state() -> Arc<AppState> {
    let target = SafePublicKey::from_scalar_times_generator(&scalar(11)).unwrap();
    let config = MissionConfig {
        interval_bits: 24,
        dp_bits: 18,
        target,
        wild_offset: scalar(5),
        grace_period_secs: 120,
        stats_interval_secs: 9999,
        checkpoint_interval_secs: 9999,
        checkpoint_path: None::<PathBuf>,
        result_path: None,
    };
    let partitioner = Partitioner::new(24, Duration::from_secs(120));
    Arc::new(AppState::new(config, partitioner))
}

#[test]
fn writing_then_loading_restores_every_stored_entry() {
    let dir = tempfile::tempdir().unwrap();
    let checkpoint_path = dir.path().join("search.checkpoint");

    let original = make_state();
    original.store.add([1u8; 32], dist(10), 2);
    original.store.add([2u8; 32], dist(20), 4);
    original.store.add([3u8; 32], dist(30), 5);

    write_checkpoint(&original, &checkpoint_path).unwrap();
    assert!(checkpoint_path.exists());

    let sidecar_path = checkpoint_path.with_extension("ranges.json");
    assert!(sidecar_path.exists());
    let ranges: Vec<WorkRange> =
        serde_json::from_slice(&std::fs::read(&sidecar_path).unwrap()).unwrap();
    assert!(ranges.is_empty(), "no client ever requested a range in this test");

    let resumed = make_state();
    load_checkpoint(&resumed, &checkpoint_path).unwrap();

    assert_eq!(resumed.store.total_added(), original.store.total_added());
    assert_eq!(resumed.store.occupied_bucket_count(), original.store.occupied_bucket_count());
}

#[test]
fn loading_a_checkpoint_for_a_different_target_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let checkpoint_path = dir.path().join("search.checkpoint");

    let original = make_state();
    original.store.add([1u8; 32], dist(10), 2);
    write_checkpoint(&original, &checkpoint_path).unwrap();

    let different_target = SafePublicKey::from_scalar_times_generator(&scalar(99)).unwrap();
    let config = MissionConfig {
        interval_bits: 24,
        dp_bits: 18,
        target: different_target,
        wild_offset: scalar(5),
        grace_period_secs: 120,
        stats_interval_secs: 9999,
        checkpoint_interval_secs: 9999,
        checkpoint_path: None::<PathBuf>,
        result_path: None,
    };
    let mismatched = Arc::new(AppState::new(config, Partitioner::new(24, Duration::from_secs(120))));

    assert!(load_checkpoint(&mismatched, &checkpoint_path).is_err());
}
