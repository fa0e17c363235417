// [tests/mirror/libs/infra/transport/wire_protocol_round_trip.test.rs]
use prospector_infra_transport::{
    decode_client_hello, decode_dp_entry, decode_frame_header, decode_frame_payload,
    decode_server_hello, encode_client_hello, encode_dp_entry, encode_frame, encode_server_hello,
    ClientHello, DpEntry, Message, ServerHello, TransportError, DP_ENTRY_WIRE_SIZE,
};

#[test]
fn handshake_round_trips_both_directions() {
    let client_hello = ClientHello { client_id: [3u8; 16], interval_bits: 40 };
    let decoded_client = decode_client_hello(&encode_client_hello(&client_hello)).unwrap();
    assert_eq!(decoded_client, client_hello);

    let server_hello = ServerHello {
        accepted: true,
        dp_bits: 18,
        target_x: [1u8; 32],
        target_y: [2u8; 32],
        wild_offset: [3u8; 32],
        range_start: [4u8; 32],
        range_end: [5u8; 32],
    };
    let decoded_server = decode_server_hello(&encode_server_hello(&server_hello)).unwrap();
    assert_eq!(decoded_server, server_hello);
}

#[test]
fn dp_entry_round_trip_yields_a_bit_identical_sixty_eight_bytes() {
    let entry = DpEntry { x: [0x42u8; 32], dist: [0u8; 32], k_idx: 99 };
    let encoded = encode_dp_entry(&entry).unwrap();
    assert_eq!(encoded.len(), 68);
    assert_eq!(decode_dp_entry(&encoded).unwrap(), entry);
}

#[test]
fn dp_batch_of_n_items_encodes_to_one_plus_four_plus_sixty_eight_n_bytes() {
    let entries: Vec<DpEntry> =
        (0..5).map(|i| DpEntry { x: [i as u8; 32], dist: [0u8; 32], k_idx: i }).collect();
    let frame = encode_frame(&Message::DpBatch(entries.clone())).unwrap();
    assert_eq!(frame.len(), 1 + 4 + 4 + DP_ENTRY_WIRE_SIZE * entries.len());
}

#[test]
fn truncated_frame_header_is_rejected() {
    let short = [0x01u8, 0x00];
    assert!(matches!(decode_frame_header(&short), Err(TransportError::Truncated { .. })));
}

#[test]
fn unknown_message_type_is_rejected() {
    let result = decode_frame_payload(0xEE, &[]);
    assert!(matches!(result, Err(TransportError::UnknownMessageType(0xEE))));
}

#[test]
fn reset_kangaroo_preserves_the_target_k_idx() {
    let message = Message::ResetKangaroo { k_idx: 0xFEED };
    let frame = encode_frame(&message).unwrap();
    let (msg_type, length) = decode_frame_header(&frame[0..5]).unwrap();
    let decoded = decode_frame_payload(msg_type, &frame[5..5 + length as usize]).unwrap();
    assert_eq!(decoded, message);
}
