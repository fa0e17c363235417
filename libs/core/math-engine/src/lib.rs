// [libs/core/math-engine/src/lib.rs]
#![deny(missing_docs)]
// Las rutinas ADX/BMI2 en arithmetic.rs y scalar.rs requieren asm! inline.
#![allow(unsafe_code)]

/*!
 * =================================================================
 * APARATO: CORE MATH MASTER HUB (V38.0 - KANGAROO REALIGNED)
 * CLASIFICACIÓN: CORE MATH (ESTRATO L1)
 * RESPONSABILIDAD: ORQUESTACIÓN DE PRIMITIVAS Y DETECCIÓN DE SILICIO
 *
 * Motor matemático de bajo nivel para secp256k1: escalares modulo n,
 * claves públicas/privadas sobre la curva real (no una reimplementación
 * Jacobiana), y el motor de saltos de Pollard's Kangaroo construido
 * sobre esas primitivas.
 * =================================================================
 */

/// Operaciones aritméticas U256 crudas con acarreo paralelo (L1-Core).
pub mod arithmetic;
/// Singleton del contexto secp256k1 para pre-cómputo de tablas dinámicas.
pub mod context;
/// Catálogo de fallos criptográficos y matemáticos del sistema.
pub mod errors;
/// Motor de saltos pseudoaleatorios de Pollard sobre secp256k1.
pub mod kangaroo;
/// Gestión segura de escalares secretos (Private Keys).
pub mod private_key;
/// Gestión de puntos afines y serialización SEC1 (Public Keys).
pub mod public_key;
/// Aritmética modulo n (Orden de la curva secp256k1).
pub mod scalar;

/**
 * ESTRATO DE PROSPECCIÓN DE HARDWARE (SILICON AWARENESS)
 *
 * Permite al sistema interrogar las capacidades físicas del procesador
 * anfitrión para seleccionar la trayectoria de cómputo más eficiente.
 */
pub mod hardware {
    /**
     * Evalúa si la CPU soporta aceleración ADX y BMI2.
     *
     * Estas instrucciones permiten procesar dos cadenas de acarreo paralelas
     * (ADCX/ADOX), usadas por las rutinas u256 de `arithmetic` y `scalar`.
     */
    #[must_use]
    pub fn is_optimized_arithmetic_supported() -> bool {
        #[cfg(target_arch = "x86_64")]
        {
            std::is_x86_feature_detected!("adx") && std::is_x86_feature_detected!("bmi2")
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            false
        }
    }

    /// Evalúa el soporte para Advanced Vector Extensions 2, informativo
    /// para la telemetría de hardware del worker (§4.H).
    #[must_use]
    pub fn is_simd_accelerated_execution_supported() -> bool {
        #[cfg(target_arch = "x86_64")]
        {
            std::is_x86_feature_detected!("avx2")
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            false
        }
    }
}

/**
 * PRELUDIO MATEMÁTICO SOBERANO
 *
 * Única autoridad de importación autorizada para los estratos superiores
 * (dp-store, worker-client, miner-worker, server).
 */
pub mod prelude {
    // Aritmética U256 (ADX/ASM enabled)
    pub use crate::arithmetic::{
        add_u256_be, add_u64_to_u256_be, compare_u256_be, convert_limbs_u64_to_u256_be,
        convert_u128_to_u256_be, convert_u256_be_to_limbs_u64, fast_hex_encode, subtract_u256_be,
        U256_BYTE_SIZE,
    };

    // Primitivas de identidad criptográfica
    pub use crate::errors::MathError;
    pub use crate::private_key::SafePrivateKey;
    pub use crate::public_key::SafePublicKey;
    pub use crate::scalar::Scalar;

    // Motor de saltos (Pollard's Kangaroo)
    pub use crate::kangaroo::{
        compute_safety_bound, is_distinguished, step, DistinguishedPoint, Herd, HerdKind,
        JumpTable, JumpTableEntry, Kangaroo, StepOutcome, DEFAULT_SAFETY_FACTOR, JUMP_TABLE_SIZE,
        USE_SYMMETRY,
    };

    // Detección de silicio
    pub use crate::hardware::{
        is_optimized_arithmetic_supported, is_simd_accelerated_execution_supported,
    };
}
