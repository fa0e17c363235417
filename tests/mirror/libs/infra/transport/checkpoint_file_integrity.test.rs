// [tests/mirror/libs/infra/transport/checkpoint_file_integrity.test.rs]
use prospector_infra_transport::checkpoint::{CheckpointBucket, CheckpointFile};
use prospector_infra_transport::DpEntry;

fn sample() -> CheckpointFile {
    CheckpointFile {
        interval_bits: 32,
        dp_bits: 8,
        target_x: [10u8; 32],
        target_y: [20u8; 32],
        wild_offset: [30u8; 32],
        buckets: vec![
            CheckpointBucket {
                bucket_index: 0,
                entries: vec![DpEntry { x: [1u8; 32], dist: [0u8; 32], k_idx: 2 }],
            },
            CheckpointBucket { bucket_index: 3, entries: vec![] },
        ],
    }
}

#[test]
fn encode_decode_preserves_every_field() {
    let checkpoint = sample();
    let bytes = checkpoint.encode().unwrap();
    let decoded = CheckpointFile::decode(&bytes).unwrap();
    assert_eq!(decoded, checkpoint);
}

#[test]
fn a_resumed_process_never_observes_a_half_written_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("server.checkpoint");
    let checkpoint = sample();

    checkpoint.write_atomically(&path).unwrap();
    let first_read = CheckpointFile::read_from(&path).unwrap();
    assert_eq!(first_read, checkpoint);

    // A second write to the same destination must also leave no partial
    // file behind, regardless of prior state.
    let mut updated = checkpoint.clone();
    updated.buckets.push(CheckpointBucket {
        bucket_index: 99,
        entries: vec![DpEntry { x: [9u8; 32], dist: [0u8; 32], k_idx: 4 }],
    });
    updated.write_atomically(&path).unwrap();

    let second_read = CheckpointFile::read_from(&path).unwrap();
    assert_eq!(second_read, updated);
    assert!(!path.with_extension("tmp").exists());
}
