// [tests/mirror/libs/infra/worker_client/uplink_handshake_and_recovery.test.rs]
use std::time::Duration;

use prospector_infra_transport::{encode_server_hello, DpEntry, Message, ServerHello};
use prospector_infra_worker_client::Uplink;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn accepting_server_hello() -> ServerHello {
    ServerHello {
        accepted: true,
        dp_bits: 22,
        target_x: [9u8; 32],
        target_y: [8u8; 32],
        wild_offset: [7u8; 32],
        range_start: [0u8; 32],
        range_end: [0xFFu8; 32],
    }
}

#[tokio::test]
async fn a_dp_batch_sent_after_handshake_arrives_byte_identical() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut hello_bytes = [0u8; prospector_infra_transport::CLIENT_HELLO_SIZE];
        socket.read_exact(&mut hello_bytes).await.unwrap();
        socket
            .write_all(&encode_server_hello(&accepting_server_hello()))
            .await
            .unwrap();

        let mut header = [0u8; 5];
        socket.read_exact(&mut header).await.unwrap();
        let (msg_type, length) =
            prospector_infra_transport::decode_frame_header(&header).unwrap();
        let mut payload = vec![0u8; length as usize];
        socket.read_exact(&mut payload).await.unwrap();
        prospector_infra_transport::decode_frame_payload(msg_type, &payload).unwrap()
    });

    let uplink = Uplink::new(addr.to_string(), [4u8; 16], 40);
    let (mut stream, server_hello) = uplink.connect().await.unwrap();
    assert_eq!(server_hello.dp_bits, 22);

    let batch = vec![
        DpEntry { x: [1u8; 32], dist: [0u8; 32], k_idx: 2 },
        DpEntry { x: [2u8; 32], dist: [0u8; 32], k_idx: 3 },
    ];
    Uplink::send_message(&mut stream, &Message::DpBatch(batch.clone()))
        .await
        .unwrap();

    let received = server.await.unwrap();
    assert_eq!(received, Message::DpBatch(batch));
}

#[tokio::test]
async fn recv_message_decodes_a_stop_frame_from_the_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut hello_bytes = [0u8; prospector_infra_transport::CLIENT_HELLO_SIZE];
        socket.read_exact(&mut hello_bytes).await.unwrap();
        socket
            .write_all(&encode_server_hello(&accepting_server_hello()))
            .await
            .unwrap();

        let frame =
            prospector_infra_transport::encode_frame(&Message::Stop { found_key: [0x42u8; 32] })
                .unwrap();
        socket.write_all(&frame).await.unwrap();
    });

    let uplink = Uplink::new(addr.to_string(), [1u8; 16], 40);
    let (mut stream, _) = uplink.connect().await.unwrap();
    let message = Uplink::recv_message(&mut stream).await.unwrap();
    assert_eq!(message, Message::Stop { found_key: [0x42u8; 32] });

    server.await.unwrap();
}

#[tokio::test]
async fn reconnect_succeeds_once_the_server_starts_listening() {
    // Reserve an address, then drop the listener so the first connect
    // attempt fails with connection-refused before the real server binds.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let uplink = Uplink::new(addr.to_string(), [3u8; 16], 40);

    let server = tokio::spawn(async move {
        // The server starts listening well inside the first 1s backoff
        // window, so the second connect attempt succeeds.
        tokio::time::sleep(Duration::from_millis(200)).await;
        let listener = TcpListener::bind(addr).await.unwrap();
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut hello_bytes = [0u8; prospector_infra_transport::CLIENT_HELLO_SIZE];
        socket.read_exact(&mut hello_bytes).await.unwrap();
        socket
            .write_all(&encode_server_hello(&accepting_server_hello()))
            .await
            .unwrap();
    });

    let (_, server_hello) = uplink.connect_with_backoff().await.unwrap();
    assert!(server_hello.accepted);

    server.await.unwrap();
}
