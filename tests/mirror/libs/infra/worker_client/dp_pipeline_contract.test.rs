// [tests/mirror/libs/infra/worker_client/dp_pipeline_contract.test.rs]
use std::time::Duration;

use prospector_infra_transport::DpEntry;
use prospector_infra_worker_client::DpPipeline;

fn entry(n: u8) -> DpEntry {
    DpEntry { x: [n; 32], dist: [0u8; 32], k_idx: n as u64 }
}

#[tokio::test]
async fn a_batch_of_five_arrives_in_full_on_the_next_pop() {
    let pipeline = DpPipeline::new();
    pipeline.push_batch((0..5).map(entry).collect()).await;

    let batch = pipeline
        .pop_batch(64, Duration::from_millis(100), Duration::from_millis(50))
        .await;

    assert_eq!(batch.len(), 5);
    assert_eq!(pipeline.total_pushed(), 5);
    assert_eq!(pipeline.total_popped(), 5);
}

#[tokio::test]
async fn batching_window_coalesces_staggered_arrivals_into_one_batch() {
    let pipeline = std::sync::Arc::new(DpPipeline::new());

    let producer = {
        let pipeline = pipeline.clone();
        tokio::spawn(async move {
            for i in 0..6u8 {
                pipeline.push_batch(vec![entry(i)]).await;
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
    };

    let batch = pipeline
        .pop_batch(64, Duration::from_millis(200), Duration::from_millis(50))
        .await;

    producer.await.unwrap();
    // Staggered at 10ms apart under a 50ms coalescing window: several
    // arrivals land in the same batch rather than one-by-one.
    assert!(batch.len() >= 2);
}

#[tokio::test]
async fn requesting_shutdown_drains_then_yields_empty_without_blocking() {
    let pipeline = DpPipeline::new();
    pipeline.push_batch(vec![entry(1), entry(2)]).await;
    pipeline.request_shutdown();

    let first = pipeline
        .pop_batch(64, Duration::from_millis(100), Duration::from_millis(10))
        .await;
    assert_eq!(first.len(), 2);

    let start = tokio::time::Instant::now();
    let second = pipeline
        .pop_batch(64, Duration::from_secs(5), Duration::from_millis(10))
        .await;
    assert!(second.is_empty());
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn conservation_holds_at_every_quiescent_point() {
    let pipeline = DpPipeline::new();

    pipeline.push_batch((0..20).map(entry).collect()).await;
    let first = pipeline
        .pop_batch(7, Duration::from_millis(50), Duration::from_millis(5))
        .await;
    assert_eq!(first.len(), 7);

    let depth = pipeline.queue_depth().await as u64;
    assert_eq!(pipeline.total_pushed(), pipeline.total_popped() + depth);

    let rest = pipeline
        .pop_batch(64, Duration::from_millis(50), Duration::from_millis(5))
        .await;
    assert_eq!(rest.len(), 13);
    assert_eq!(pipeline.total_pushed(), pipeline.total_popped());
}
