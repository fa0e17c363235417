// INICIO DEL ARCHIVO [libs/core/math-engine/src/errors.rs]
//! =================================================================
//! APARATO: MATH ERROR TAXONOMY (V1.0)
//! CLASIFICACIÓN: CORE MATH (ESTRATO L1)
//! RESPONSABILIDAD: TAXONOMÍA DE FALLOS ARITMÉTICOS Y DE CURVA
//! =================================================================

use thiserror::Error;

/// Errores que puede producir el motor matemático de bajo nivel.
///
/// Cubre tanto fallos de formato (longitudes, escalares fuera de rango)
/// como fallos de la librería de curva elíptica subyacente.
#[derive(Debug, Error)]
pub enum MathError {
    /// Un buffer no cumple la longitud canónica esperada para un escalar o punto.
    #[error("invalid length: expected {expected} bytes, got {got}")]
    InvalidLength {
        /// Longitud en bytes que la operación requería.
        expected: usize,
        /// Longitud en bytes realmente recibida.
        got: usize,
    },

    /// Un valor u256/escalar viola una invariante de formato (cero, desbordamiento, etc).
    #[error("invalid key/scalar format: {0}")]
    InvalidKeyFormat(String),

    /// La librería `secp256k1` rechazó un punto o escalar.
    #[error("elliptic curve operation failed: {0}")]
    EllipticCurveError(#[from] secp256k1::Error),
}
// FIN DEL ARCHIVO [libs/core/math-engine/src/errors.rs]
