// [tests/mirror/libs/core/math_engine/walk_engine_properties.test.rs]
// Certificación del paso individual de la caminata: predicado de punto
// distinguido, acumulación de distancia, y disparo de rama muerta.

use prospector_core_math::kangaroo::{
    compute_safety_bound, is_distinguished, step, Herd, JumpTable, StepOutcome,
    DEFAULT_SAFETY_FACTOR,
};
use prospector_core_math::public_key::SafePublicKey;

fn scalar(low_byte: u8) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[31] = low_byte;
    bytes
}

#[test]
fn is_distinguished_matches_a_manual_mask_check() {
    let mut x = [0u8; 32];
    // 20 low bits zero, bit 20 set.
    x[31] = 0;
    x[30] = 0;
    x[29] = 0b0001_0000;
    assert!(is_distinguished(&x, 20));
    assert!(!is_distinguished(&x, 21));
}

#[test]
fn step_accumulates_the_selected_jump_delta() {
    let table = JumpTable::build().unwrap();
    let target = SafePublicKey::from_scalar_times_generator(&scalar(200)).unwrap();
    let mut herd = Herd::spawn(2, &scalar(1), &target, &scalar(50)).unwrap();
    let kangaroo = &mut herd.kangaroos_mut()[0];
    let dist_before = kangaroo.dist;
    let safety_bound = compute_safety_bound(1 << 40, DEFAULT_SAFETY_FACTOR);

    let outcome = step(kangaroo, &table, 0, &safety_bound).unwrap();

    assert_ne!(kangaroo.dist, dist_before, "distance must accumulate every step");
    match outcome {
        StepOutcome::Emitted(dp) => assert_eq!(dp.k_idx, kangaroo.k_idx),
        StepOutcome::Continued => {}
        StepOutcome::DeadBranch => panic!("a single step must not exceed the safety bound"),
    }
}

#[test]
fn dp_bits_zero_emits_a_distinguished_point_on_every_step() {
    let table = JumpTable::build().unwrap();
    let target = SafePublicKey::from_scalar_times_generator(&scalar(77)).unwrap();
    let mut herd = Herd::spawn(2, &scalar(3), &target, &scalar(9)).unwrap();
    let kangaroo = &mut herd.kangaroos_mut()[0];
    let safety_bound = compute_safety_bound(1 << 40, DEFAULT_SAFETY_FACTOR);

    let outcome = step(kangaroo, &table, 0, &safety_bound).unwrap();
    assert!(matches!(outcome, StepOutcome::Emitted(_)));
}

#[test]
fn distance_beyond_safety_bound_triggers_dead_branch() {
    let table = JumpTable::build().unwrap();
    let target = SafePublicKey::from_scalar_times_generator(&scalar(13)).unwrap();
    let mut herd = Herd::spawn(2, &scalar(1), &target, &scalar(2)).unwrap();
    let kangaroo = &mut herd.kangaroos_mut()[0];
    // Impossible-to-reach mask (full 256 bits) so no DP ever interrupts the
    // safety-bound check, paired with a safety bound of zero.
    let safety_bound = [0u8; 32];

    let outcome = step(kangaroo, &table, 255, &safety_bound).unwrap();
    assert!(matches!(outcome, StepOutcome::DeadBranch));
}
