// INICIO DEL ARCHIVO [libs/core/math-engine/src/kangaroo/walk.rs]
//! =================================================================
//! APARATO: WALK ENGINE (V1.0)
//! CLASIFICACIÓN: CORE MATH / KANGAROO (ESTRATO L1)
//! RESPONSABILIDAD: UN PASO DE LA CAMINATA PSEUDOALEATORIA
//! =================================================================
//!
//! Implementa los cinco pasos de `4.B` tal cual: selector, actualización
//! de punto, acumulación de distancia, predicado DP, y reflexión de
//! simetría opcional. La detección de rama muerta vive aquí también,
//! porque ambas comparten el mismo punto de observación (el estado del
//! kangaroo tras el salto).

use std::cmp::Ordering;

use crate::arithmetic::{add_u64_to_u256_be, compare_u256_be, convert_u128_to_u256_be};
use crate::errors::MathError;
use crate::kangaroo::herd::Kangaroo;
use crate::kangaroo::jump_table::JumpTable;

/// `USE_SYMMETRY` (Open Question #2 del diseño): la reflexión sobre el eje X
/// cuando `y` es impar cambia el tamaño del registro del kangaroo en la
/// implementación de referencia (KSIZE=12 vs 11) y no puede mezclarse en
/// tiempo de ejecución sobre el mismo cable. Este despliegue fija la
/// decisión en tiempo de compilación: deshabilitada. Cambiar este valor
/// invalida cualquier checkpoint guardado con el valor anterior.
pub const USE_SYMMETRY: bool = false;

/// Factor de seguridad por defecto para la detección de rama muerta:
/// una distancia que excede `2 * sqrt(width) * safetyFactor` sin producir
/// un DP que avance el store dispara un reinicio.
pub const DEFAULT_SAFETY_FACTOR: u32 = 64;

/// Un punto distinguido listo para publicarse en el DP store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistinguishedPoint {
    /// Coordenada X del punto, big-endian.
    pub x: [u8; 32],
    /// Distancia acumulada del kangaroo que lo emitió.
    pub dist: [u8; 32],
    /// Identificador del kangaroo; su paridad determina el herd.
    pub k_idx: u64,
}

/// Resultado de un único paso de la caminata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// El kangaroo avanzó sin producir un DP.
    Continued,
    /// Se emitió un punto distinguido.
    Emitted(DistinguishedPoint),
    /// Rama muerta detectada (DP repetido sin avance, o distancia excedida);
    /// el llamador debe reiniciar este kangaroo preservando su paridad.
    DeadBranch,
}

/// Calcula la cota de seguridad `2 * sqrt(width) * safetyFactor` como un
/// entero de 256 bits big-endian, lista para compararse contra `dist`.
#[must_use]
pub fn compute_safety_bound(width: u128, safety_factor: u32) -> [u8; 32] {
    let root = integer_sqrt_u128(width);
    let bound = root.saturating_mul(2).saturating_mul(safety_factor as u128);
    convert_u128_to_u256_be(bound)
}

fn integer_sqrt_u128(value: u128) -> u128 {
    if value < 2 {
        return value;
    }
    let mut low: u128 = 0;
    let mut high: u128 = value;
    while low < high {
        let mid = low + (high - low + 1) / 2;
        if mid.checked_mul(mid).map(|sq| sq <= value).unwrap_or(false) {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    low
}

/// Verdadero si `x & dpMask == 0`, con `dpMask` teniendo los `dp_bits` bits
/// bajos activados.
#[must_use]
pub fn is_distinguished(x: &[u8; 32], dp_bits: u32) -> bool {
    if dp_bits == 0 {
        return true;
    }
    let full_zero_bytes = (dp_bits / 8) as usize;
    let remaining_bits = dp_bits % 8;

    for offset in 0..full_zero_bytes {
        if x[31 - offset] != 0 {
            return false;
        }
    }

    if remaining_bits > 0 {
        let partial_byte = x[31 - full_zero_bytes];
        let mask = (1u8 << remaining_bits) - 1;
        if partial_byte & mask != 0 {
            return false;
        }
    }

    true
}

/// Ejecuta un paso de la caminata sobre `kangaroo`, per `4.B`:
/// 1. selector por los 5 bits bajos de X,
/// 2. suma de punto precomputado,
/// 3. acumulación de distancia,
/// 4. predicado de punto distinguido,
/// 5. reflexión de simetría opcional (`USE_SYMMETRY`).
///
/// Detecta rama muerta (mismo DP repetido por este kangaroo, o distancia
/// más allá de `safety_bound`) y lo señala vía `StepOutcome::DeadBranch`
/// en vez de reiniciar directamente: el reinicio necesita el contador de
/// `kIdx` libre que vive en [`crate::kangaroo::herd::Herd`].
pub fn step(
    kangaroo: &mut Kangaroo,
    table: &JumpTable,
    dp_bits: u32,
    safety_bound: &[u8; 32],
) -> Result<StepOutcome, MathError> {
    let current_x = kangaroo.pos.x_bytes();
    let jump = table.select(&current_x);

    kangaroo.pos = kangaroo.pos.combine(&jump.point)?;
    add_u64_to_u256_be(&mut kangaroo.dist, jump.delta)?;

    if USE_SYMMETRY && kangaroo.pos.y_is_odd() {
        kangaroo.pos = kangaroo.pos.negate();
    }

    let new_x = kangaroo.pos.x_bytes();

    if is_distinguished(&new_x, dp_bits) {
        if let Some((last_x, last_dist)) = kangaroo.last_dp {
            if last_x == new_x && last_dist == kangaroo.dist {
                return Ok(StepOutcome::DeadBranch);
            }
        }
        kangaroo.last_dp = Some((new_x, kangaroo.dist));
        return Ok(StepOutcome::Emitted(DistinguishedPoint {
            x: new_x,
            dist: kangaroo.dist,
            k_idx: kangaroo.k_idx,
        }));
    }

    if compare_u256_be(&kangaroo.dist, safety_bound) == Ordering::Greater {
        return Ok(StepOutcome::DeadBranch);
    }

    Ok(StepOutcome::Continued)
}

// FIN DEL ARCHIVO [libs/core/math-engine/src/kangaroo/walk.rs]
