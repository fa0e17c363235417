// [tests/mirror/libs/core/dp_store/bucket_collision_policy.test.rs]
// Certificación pública de la política de colisión expuesta por el store
// completo (en contraposición a `bucket.rs`'s internal unit tests, que
// certifican únicamente `HashBucket` en aislamiento).

use prospector_core_dpstore::{AddOutcome, DpStore};

fn x_with(top_byte: u8, low_byte: u8) -> [u8; 32] {
    let mut x = [0u8; 32];
    x[0] = top_byte;
    x[31] = low_byte;
    x
}

fn dist(value: u8) -> [u8; 32] {
    let mut d = [0u8; 32];
    d[31] = value;
    d
}

#[test]
fn reconnect_resend_of_the_same_dp_is_not_a_collision() {
    let store = DpStore::with_defaults();
    let x = x_with(4, 4);

    let first = store.add(x, dist(12), 2);
    let resent = store.add(x, dist(12), 2);

    assert!(matches!(first, AddOutcome::AddOk));
    assert!(matches!(resent, AddOutcome::SameHerdDuplicate));
    assert_eq!(store.total_added(), 1);
}

#[test]
fn same_herd_shorter_distance_coalesces_without_a_collision_event() {
    let store = DpStore::with_defaults();
    let x = x_with(9, 9);

    store.add(x, dist(50), 2); // tame
    let outcome = store.add(x, dist(30), 4); // tame, shorter

    assert!(matches!(outcome, AddOutcome::SameHerdDuplicate));
    assert_eq!(store.total_same_herd_collisions(), 1);
}

#[test]
fn tame_then_wild_on_the_same_x_is_the_winning_condition() {
    let store = DpStore::with_defaults();
    let x = x_with(1, 1);

    store.add(x, dist(10), 2); // tame (even k_idx)
    let outcome = store.add(x, dist(3), 5); // wild (odd k_idx)

    match outcome {
        AddOutcome::CrossHerdCollision { tame, wild } => {
            assert_eq!(tame.k_idx & 1, 0);
            assert_eq!(wild.k_idx & 1, 1);
        }
        other => panic!("expected CrossHerdCollision, got {other:?}"),
    }
}
