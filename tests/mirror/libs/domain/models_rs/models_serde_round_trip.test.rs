// [tests/mirror/libs/domain/models_rs/models_serde_round_trip.test.rs]
use prospector_domain_models::{
    CheckpointBucket, CheckpointHeader, CheckpointManifest, ClientId, DistinguishedPointRecord,
    WorkRange,
};

#[test]
fn work_range_round_trips_through_json() {
    let range = WorkRange {
        start: [1u8; 32],
        end: [2u8; 32],
        assigned_to: Some(ClientId([9u8; 16])),
        completed_fraction: 0.5,
    };
    let encoded = serde_json::to_string(&range).unwrap();
    let decoded: WorkRange = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded.start, range.start);
    assert_eq!(decoded.assigned_to, range.assigned_to);
}

#[test]
fn distinguished_point_record_derives_herd_from_k_idx_parity() {
    let tame = DistinguishedPointRecord { x: [0u8; 32], dist: [0u8; 32], k_idx: 8 };
    let wild = DistinguishedPointRecord { x: [0u8; 32], dist: [0u8; 32], k_idx: 9 };
    assert!(tame.is_tame());
    assert!(!wild.is_tame());
}

#[test]
fn checkpoint_manifest_totals_entries_across_buckets() {
    let manifest = CheckpointManifest {
        header: CheckpointHeader {
            interval_bits: 24,
            dp_bits: 4,
            target_x: [0u8; 32],
            target_y: [0u8; 32],
            wild_offset: [0u8; 32],
        },
        ranges: vec![],
        buckets: vec![
            CheckpointBucket {
                bucket_index: 0,
                entries: vec![DistinguishedPointRecord { x: [1u8; 32], dist: [0u8; 32], k_idx: 2 }],
            },
            CheckpointBucket {
                bucket_index: 1,
                entries: vec![
                    DistinguishedPointRecord { x: [2u8; 32], dist: [0u8; 32], k_idx: 3 },
                    DistinguishedPointRecord { x: [3u8; 32], dist: [0u8; 32], k_idx: 5 },
                ],
            },
        ],
    };
    assert_eq!(manifest.total_entries(), 3);
}
