// [tests/mirror/libs/core/dp_store/resolver_recovery.test.rs]
// Certificación pública del resolver: recuperación de clave genuina y
// rechazo de un alias de hash espurio, ahora ejercitando el flujo
// completo store -> resolve en vez de construir `Entry` a mano.

use prospector_core_dpstore::{resolve, AddOutcome, DpStore, WrongCollision};
use prospector_core_math::public_key::SafePublicKey;

fn scalar(low_byte: u8) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[31] = low_byte;
    bytes
}

#[test]
fn store_collision_resolves_to_the_secret_scalar() {
    let secret = scalar(77);
    let wild_offset = scalar(20);
    let target = SafePublicKey::from_scalar_times_generator(&secret).unwrap();

    let store = DpStore::with_defaults();
    let x = scalar(123); // arbitrary shared x for this synthetic collision

    store.add(x, scalar(90), 2); // tame dist = 90
    let outcome = store.add(x, scalar(33), 5); // wild dist = 33; 90-33+20=77

    let (tame, wild) = match outcome {
        AddOutcome::CrossHerdCollision { tame, wild } => (tame, wild),
        other => panic!("expected CrossHerdCollision, got {other:?}"),
    };

    let recovered = resolve(&tame, &wild, &wild_offset, &target).unwrap();
    assert_eq!(recovered.scalar, secret);
}

#[test]
fn a_collision_that_does_not_reproduce_the_target_is_rejected() {
    let target = SafePublicKey::from_scalar_times_generator(&scalar(5)).unwrap();

    let store = DpStore::with_defaults();
    let x = scalar(200);
    store.add(x, scalar(1), 2);
    let outcome = store.add(x, scalar(1), 5);

    let (tame, wild) = match outcome {
        AddOutcome::CrossHerdCollision { tame, wild } => (tame, wild),
        other => panic!("expected CrossHerdCollision, got {other:?}"),
    };

    let result = resolve(&tame, &wild, &scalar(250), &target);
    assert!(matches!(result, Err(WrongCollision::DoesNotReproduceTarget)));
}
