// [tests/mirror/libs/core/math_engine/herd_manager_integrity.test.rs]
// Certificación del ciclo de vida del herd: paridad 50/50, posiciones
// iniciales correctas, y preservación de paridad en el reinicio.

use prospector_core_math::kangaroo::{Herd, HerdKind};
use prospector_core_math::public_key::SafePublicKey;

fn scalar(low_byte: u8) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[31] = low_byte;
    bytes
}

#[test]
fn tame_kangaroos_start_at_start_times_generator_with_dist_equal_to_start() {
    let start = scalar(17);
    let target = SafePublicKey::from_scalar_times_generator(&scalar(99)).unwrap();
    let herd = Herd::spawn(8, &start, &target, &scalar(40)).unwrap();

    let expected_pos = SafePublicKey::from_scalar_times_generator(&start).unwrap();
    for kangaroo in herd.kangaroos().iter().filter(|k| k.herd == HerdKind::Tame) {
        assert_eq!(kangaroo.pos.to_bytes(false), expected_pos.to_bytes(false));
        assert_eq!(kangaroo.dist, start);
    }
}

#[test]
fn wild_kangaroos_start_with_zero_distance() {
    let start = scalar(1);
    let target = SafePublicKey::from_scalar_times_generator(&scalar(55)).unwrap();
    let herd = Herd::spawn(8, &start, &target, &scalar(30)).unwrap();

    for kangaroo in herd.kangaroos().iter().filter(|k| k.herd == HerdKind::Wild) {
        assert_eq!(kangaroo.dist, [0u8; 32]);
    }
}

#[test]
fn odd_cohort_size_truncates_down_to_an_even_split() {
    let target = SafePublicKey::from_scalar_times_generator(&scalar(5)).unwrap();
    let herd = Herd::spawn(7, &scalar(1), &target, &scalar(1)).unwrap();
    assert_eq!(herd.len(), 6);
}

#[test]
fn reset_at_assigns_the_next_free_k_idx_of_the_same_parity() {
    let target = SafePublicKey::from_scalar_times_generator(&scalar(5)).unwrap();
    let mut herd = Herd::spawn(4, &scalar(1), &target, &scalar(1)).unwrap();

    let tame_slot = herd.kangaroos().iter().position(|k| k.herd == HerdKind::Tame).unwrap();
    let original_k_idx = herd.kangaroos()[tame_slot].k_idx;

    herd.reset_at(tame_slot);

    let reset_k_idx = herd.kangaroos()[tame_slot].k_idx;
    assert_ne!(reset_k_idx, original_k_idx);
    assert_eq!(reset_k_idx & 1, original_k_idx & 1);
}
