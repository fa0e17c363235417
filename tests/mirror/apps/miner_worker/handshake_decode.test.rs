// [tests/mirror/apps/miner_worker/handshake_decode.test.rs]
use prospector_core_math::prelude::{subtract_u256_be, SafePublicKey};

fn scalar(low_byte: u8) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[31] = low_byte;
    bytes
}

// El motor reconstruye el punto objetivo del `ServerHello` anteponiendo el
// prefijo SEC1 sin comprimir 0x04 a los campos `target_x`/`target_y` de 32
// bytes cada uno; este es el mismo contrato que cubre esta prueba.
fn reconstruct_target(x: [u8; 32], y: [u8; 32]) -> SafePublicKey {
    let mut uncompressed = Vec::with_capacity(65);
    uncompressed.push(0x04);
    uncompressed.extend_from_slice(&x);
    uncompressed.extend_from_slice(&y);
    SafePublicKey::from_bytes(&uncompressed).unwrap()
}

#[test]
fn uncompressed_sec1_bytes_from_wire_fields_reconstruct_the_same_point() {
    let scalar_value = scalar(19);
    let expected = SafePublicKey::from_scalar_times_generator(&scalar_value).unwrap();
    let (x, y) = (expected.x_bytes(), expected.y_bytes());

    let reconstructed = reconstruct_target(x, y);
    assert_eq!((reconstructed.x_bytes(), reconstructed.y_bytes()), (x, y));
}

#[test]
fn interval_width_is_the_big_endian_difference_of_range_bounds() {
    let start = scalar(10);
    let end = scalar(50);
    let difference = subtract_u256_be(&end, &start).unwrap();

    let mut low = [0u8; 16];
    low.copy_from_slice(&difference[16..32]);
    assert_eq!(u128::from_be_bytes(low), 40);
}
