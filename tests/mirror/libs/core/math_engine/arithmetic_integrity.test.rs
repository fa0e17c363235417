// [tests/mirror/libs/core/math_engine/arithmetic_integrity.test.rs]
// Certificación de las rutinas u256 crudas usadas por la aritmética de
// distancia del motor de saltos.

use prospector_core_math::arithmetic::{
    add_u256_be, add_u64_to_u256_be, compare_u256_be, convert_limbs_u64_to_u256_be,
    convert_u128_to_u256_be, convert_u256_be_to_limbs_u64, subtract_u256_be,
};
use std::cmp::Ordering;

#[test]
fn add_u64_to_u256_be_accumulates_small_deltas() {
    let mut buffer = [0u8; 32];
    add_u64_to_u256_be(&mut buffer, 1).unwrap();
    add_u64_to_u256_be(&mut buffer, 2).unwrap();
    add_u64_to_u256_be(&mut buffer, 4).unwrap();
    assert_eq!(buffer[31], 7);
}

#[test]
fn add_u64_to_u256_be_rejects_overflow_at_the_top() {
    let mut buffer = [0xFFu8; 32];
    let result = add_u64_to_u256_be(&mut buffer, 1);
    assert!(result.is_err());
}

#[test]
fn compare_u256_be_is_lexicographic_most_significant_limb_first() {
    let low = convert_u128_to_u256_be(10);
    let high = convert_u128_to_u256_be(20);
    assert_eq!(compare_u256_be(&low, &high), Ordering::Less);
    assert_eq!(compare_u256_be(&high, &low), Ordering::Greater);
    assert_eq!(compare_u256_be(&low, &low), Ordering::Equal);
}

#[test]
fn add_then_subtract_round_trips() {
    let a = convert_u128_to_u256_be(1_000_000);
    let b = convert_u128_to_u256_be(337);
    let sum = add_u256_be(&a, &b).unwrap();
    let back = subtract_u256_be(&sum, &b).unwrap();
    assert_eq!(back, a);
}

#[test]
fn subtract_u256_be_rejects_underflow() {
    let a = convert_u128_to_u256_be(5);
    let b = convert_u128_to_u256_be(6);
    assert!(subtract_u256_be(&a, &b).is_err());
}

#[test]
fn limb_round_trip_preserves_big_endian_bytes() {
    let bytes = convert_u128_to_u256_be(u128::MAX);
    let limbs = convert_u256_be_to_limbs_u64(&bytes);
    let back = convert_limbs_u64_to_u256_be(&limbs);
    assert_eq!(bytes, back);
}
