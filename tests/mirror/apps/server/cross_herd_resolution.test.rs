// [tests/mirror/apps/server/cross_herd_resolution.test.rs]
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use prospector_core_math::prelude::SafePublicKey;
use prospector_infra_transport::{
    decode_frame_header, decode_frame_payload, decode_server_hello, encode_client_hello,
    encode_frame, ClientHello, DpEntry, Message, SERVER_HELLO_SIZE,
};
use prospector_server::listener::run_accept_loop;
use prospector_server::{AppState, MissionConfig, Partitioner};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

fn scalar(low_byte: u8) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[31] = low_byte;
    bytes
}

async fn connect_and_hello(port: u16, client_id: [u8; 16]) -> TcpStream {
    tokio::time::sleep(Duration::from_millis(50)).await;
    let mut stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    let hello = ClientHello { client_id, interval_bits: 32 };
    stream.write_all(&encode_client_hello(&hello)).await.unwrap();
    let mut response = [0u8; SERVER_HELLO_SIZE];
    stream.read_exact(&mut response).await.unwrap();
    let decoded = decode_server_hello(&response).unwrap();
    assert!(decoded.accepted);
    stream
}

async fn send_dp(stream: &mut TcpStream, entry: DpEntry) {
    let frame = encode_frame(&Message::DpBatch(vec![entry])).unwrap();
    stream.write_all(&frame).await.unwrap();
    let (msg_type, length) = read_header(stream).await;
    let mut payload = vec![0u8; length as usize];
    stream.read_exact(&mut payload).await.unwrap();
    let message = decode_frame_payload(msg_type, &payload).unwrap();
    assert!(matches!(message, Message::DpAck { .. }));
}

async fn read_header(stream: &mut TcpStream) -> (u8, u32) {
    let mut header = [0u8; 5];
    stream.read_exact(&mut header).await.unwrap();
    decode_frame_header(&header).unwrap()
}

async fn expect_stop(stream: &mut TcpStream, expected_scalar: [u8; 32]) {
    let (msg_type, length) = read_header(stream).await;
    let mut payload = vec![0u8; length as usize];
    stream.read_exact(&mut payload).await.unwrap();
    let message = decode_frame_payload(msg_type, &payload).unwrap();
    match message {
        Message::Stop { found_key } => assert_eq!(found_key, expected_scalar),
        other => panic!("expected Stop, got {other:?}"),
    }
}

#[tokio::test]
async fn a_genuine_cross_herd_collision_recovers_the_key_and_stops_every_worker() {
    // secret = 40, wildOffset = 15: a tame at dist 30 and a wild at dist 5
    // collide on the same x and reconstruct exactly the target scalar.
    let secret_scalar = scalar(40);
    let wild_offset = scalar(15);
    let target = SafePublicKey::from_scalar_times_generator(&secret_scalar).unwrap();

    let config = MissionConfig {
        interval_bits: 32,
        dp_bits: 20,
        target,
        wild_offset,
        grace_period_secs: 120,
        stats_interval_secs: 9999,
        checkpoint_interval_secs: 9999,
        checkpoint_path: None::<PathBuf>,
        result_path: None,
    };
    let partitioner = Partitioner::new(32, Duration::from_secs(120));
    let state = Arc::new(AppState::new(config, partitioner));
    tokio::spawn(run_accept_loop(19501, Arc::clone(&state)));

    let mut tame_stream = connect_and_hello(19501, [1u8; 16]).await;
    let mut wild_stream = connect_and_hello(19501, [2u8; 16]).await;

    let shared_x = [9u8; 32];
    send_dp(&mut tame_stream, DpEntry { x: shared_x, dist: scalar(30), k_idx: 2 }).await;
    send_dp(&mut wild_stream, DpEntry { x: shared_x, dist: scalar(5), k_idx: 3 }).await;

    timeout(Duration::from_secs(2), expect_stop(&mut wild_stream, secret_scalar)).await.unwrap();
    timeout(Duration::from_secs(2), expect_stop(&mut tame_stream, secret_scalar)).await.unwrap();
    assert!(state.is_found());
}

#[tokio::test]
async fn a_spurious_x_alias_resets_only_the_submitting_kangaroo() {
    let target = SafePublicKey::from_scalar_times_generator(&scalar(40)).unwrap();
    let config = MissionConfig {
        interval_bits: 32,
        dp_bits: 20,
        target,
        wild_offset: scalar(99),
        grace_period_secs: 120,
        stats_interval_secs: 9999,
        checkpoint_interval_secs: 9999,
        checkpoint_path: None::<PathBuf>,
        result_path: None,
    };
    let partitioner = Partitioner::new(32, Duration::from_secs(120));
    let state = Arc::new(AppState::new(config, partitioner));
    tokio::spawn(run_accept_loop(19502, Arc::clone(&state)));

    let mut tame_stream = connect_and_hello(19502, [3u8; 16]).await;
    let mut wild_stream = connect_and_hello(19502, [4u8; 16]).await;

    let shared_x = [11u8; 32];
    send_dp(&mut tame_stream, DpEntry { x: shared_x, dist: scalar(1), k_idx: 2 }).await;
    send_dp(&mut wild_stream, DpEntry { x: shared_x, dist: scalar(1), k_idx: 3 }).await;

    let (msg_type, length) = read_header(&mut wild_stream).await;
    let mut payload = vec![0u8; length as usize];
    wild_stream.read_exact(&mut payload).await.unwrap();
    let message = decode_frame_payload(msg_type, &payload).unwrap();
    assert!(matches!(message, Message::ResetKangaroo { k_idx: 3 }));
    assert!(!state.is_found());
}
