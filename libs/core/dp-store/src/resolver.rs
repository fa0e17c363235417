// INICIO DEL ARCHIVO [libs/core/dp-store/src/resolver.rs]
//! =================================================================
//! APARATO: COLLISION RESOLVER (V1.0)
//! CLASIFICACIÓN: CORE STORE (ESTRATO L1)
//! RESPONSABILIDAD: RECUPERACIÓN DE LA CLAVE A PARTIR DE UNA COLISIÓN
//! =================================================================
//!
//! Dado un par de entradas (`tame`, `wild`) que comparten la misma
//! coordenada X pero pertenecen a herds opuestos, reconstruye el
//! escalar candidato `k = (T.dist - W.dist + wildOffset) mod n` y lo
//! verifica contra el punto objetivo antes de reportarlo como
//! recuperado. Una colisión de DP siempre produce un candidato, pero no
//! toda colisión candidata es la correcta: en un intervalo pequeño dos
//! kangaroos pueden coincidir en `x` por azar sin haberse encontrado en
//! el mismo punto real de la curva (hash aliasing del DP), de ahí la
//! verificación final contra `target`.

use prospector_core_math::arithmetic::{add_u256_be, compare_u256_be, convert_limbs_u64_to_u256_be, subtract_u256_be};
use prospector_core_math::errors::MathError;
use prospector_core_math::public_key::SafePublicKey;
use prospector_core_math::scalar::SECP256K1_CURVE_ORDER_N;
use thiserror::Error;

use crate::bucket::Entry;

/// Una clave privada recuperada y verificada contra el punto objetivo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveredKey {
    /// El escalar recuperado, big-endian, 32 bytes.
    pub scalar: [u8; 32],
}

/// La colisión candidata no reprodujo el punto objetivo: alias de hash del
/// DP, no un verdadero encuentro tame/wild.
#[derive(Debug, Error)]
pub enum WrongCollision {
    /// El candidato reconstruido, multiplicado por el generador, no coincide con `target`.
    #[error("reconstructed scalar does not reproduce the target point")]
    DoesNotReproduceTarget,
    /// El candidato se redujo a cero o a un valor rechazado por el motor de escalares.
    #[error("reconstructed scalar is degenerate: {0}")]
    DegenerateScalar(#[source] MathError),
    /// Fallo de aritmética de curva durante la verificación.
    #[error("elliptic curve verification failed: {0}")]
    VerificationFailed(#[source] MathError),
}

fn curve_order_bytes() -> [u8; 32] {
    convert_limbs_u64_to_u256_be(&SECP256K1_CURVE_ORDER_N)
}

/// Suma de 256 bits con acarreo de salida explícito (wrapping en 2^256).
fn add_u256_with_carry(a: &[u8; 32], b: &[u8; 32]) -> ([u8; 32], bool) {
    let mut result = [0u8; 32];
    let mut carry = 0u16;
    for i in (0..32).rev() {
        let sum = a[i] as u16 + b[i] as u16 + carry;
        result[i] = (sum & 0xFF) as u8;
        carry = sum >> 8;
    }
    (result, carry != 0)
}

/// `2^256 - n`, vía negación en complemento a dos (`!n + 1`). `n != 0`
/// así que esto nunca desborda.
fn two_pow_256_minus_order(order: &[u8; 32]) -> [u8; 32] {
    let mut inverted = [0u8; 32];
    for i in 0..32 {
        inverted[i] = !order[i];
    }
    let mut one = [0u8; 32];
    one[31] = 1;
    add_u256_with_carry(&inverted, &one).0
}

/// `(a + b) mod n`. Válido para cualquier `a, b < n`: la suma real cabe en
/// a lo sumo 257 bits (`2n < 2^257`), así que basta reducir una vez usando
/// `2^256 mod n = 2^256 - n` cuando hubo acarreo de salida, y una segunda
/// vez si el resultado aún iguala o excede `n`.
fn add_mod_n(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let order = curve_order_bytes();
    let (sum, carried) = add_u256_with_carry(a, b);

    let mut reduced = if carried {
        add_u256_with_carry(&sum, &two_pow_256_minus_order(&order)).0
    } else {
        sum
    };

    if compare_u256_be(&reduced, &order) != std::cmp::Ordering::Less {
        reduced = subtract_u256_be(&reduced, &order).expect("reduced >= order by construction");
    }
    reduced
}

fn sub_mod_n(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    match subtract_u256_be(a, b) {
        Ok(diff) => diff,
        Err(_) => {
            let order = curve_order_bytes();
            let complement = subtract_u256_be(&order, b).expect("b < order");
            add_u256_be(a, &complement).expect("a + (n - b) < 2n, fits 256 bits when a,b < n")
        }
    }
}

/// Reconstruye y verifica la clave privada a partir de una colisión
/// cruzada entre un kangaroo tame y uno wild.
///
/// `k = (tame.dist - wild.dist + wildOffset) mod n`, verificado contra
/// `target` antes de devolverse.
pub fn resolve(
    tame: &Entry,
    wild: &Entry,
    wild_offset: &[u8; 32],
    target: &SafePublicKey,
) -> Result<RecoveredKey, WrongCollision> {
    let delta = sub_mod_n(&tame.dist, &wild.dist);
    let candidate = add_mod_n(&delta, wild_offset);

    let recovered_point = SafePublicKey::from_scalar_times_generator(&candidate)
        .map_err(WrongCollision::DegenerateScalar)?;

    if recovered_point.to_bytes(false) == target.to_bytes(false) {
        Ok(RecoveredKey { scalar: candidate })
    } else {
        Err(WrongCollision::DoesNotReproduceTarget)
    }
}

// FIN DEL ARCHIVO [libs/core/dp-store/src/resolver.rs]
