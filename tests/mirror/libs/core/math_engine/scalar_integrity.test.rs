// [tests/mirror/libs/core/math_engine/scalar_integrity.test.rs]
// Certificación de la reducción modulo n y la serialización de Scalar.

use prospector_core_math::scalar::{Scalar, SECP256K1_CURVE_ORDER_N};

fn order_bytes() -> [u8; 32] {
    let mut bytes = [0u8; 32];
    for (index, limb) in SECP256K1_CURVE_ORDER_N.iter().enumerate() {
        let start = (3 - index) * 8;
        bytes[start..start + 8].copy_from_slice(&limb.to_be_bytes());
    }
    bytes
}

#[test]
fn small_scalar_round_trips_through_bytes() {
    let mut bytes = [0u8; 32];
    bytes[31] = 42;
    let scalar = Scalar::from_u256_be(bytes).unwrap();
    assert_eq!(scalar.to_u256_be(), bytes);
}

#[test]
fn scalar_at_order_reduces_to_zero_and_is_rejected() {
    let bytes = order_bytes();
    let result = Scalar::from_u256_be(bytes);
    assert!(result.is_err(), "n mod n == 0 must be rejected as a private scalar");
}

#[test]
fn scalar_one_past_order_reduces_to_one() {
    let mut bytes = order_bytes();
    // bytes currently encodes n; add 1 to get n+1, which must reduce to 1.
    let mut carry = 1u16;
    for byte in bytes.iter_mut().rev() {
        let sum = *byte as u16 + carry;
        *byte = (sum & 0xFF) as u8;
        carry = sum >> 8;
    }
    let scalar = Scalar::from_u256_be(bytes).unwrap();
    let mut expected = [0u8; 32];
    expected[31] = 1;
    assert_eq!(scalar.to_u256_be(), expected);
}

#[test]
fn is_zero_detects_the_zero_scalar_before_rejection() {
    let zero = Scalar { private_scalar_limbs: [0; 4] };
    assert!(zero.is_zero());
}
