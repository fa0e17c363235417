// [libs/domain/models-rs/src/dp.rs]
/*!
 * =================================================================
 * APARATO: DISTINGUISHED POINT RECORD (V1.0)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: FORMA SERIALIZABLE DE UN PUNTO DISTINGUIDO
 * =================================================================
 *
 * Este tipo es la representación de dominio de un DP que cruza la
 * frontera de un proceso (disco, red). El motor en memoria usa el
 * `Entry` de `prospector-core-dpstore`; este registro es su
 * contraparte serializable, independiente de cualquier mecanismo de
 * codificación concreto (el layout binario exacto de 68 bytes vive en
 * `prospector-infra-transport`).
 */

use serde::{Deserialize, Serialize};

/// Un punto distinguido, tal como se persiste o transmite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistinguishedPointRecord {
    /// Coordenada X completa, big-endian.
    pub x: [u8; 32],
    /// Distancia acumulada; conceptualmente ≤192 bits, almacenada en 32.
    pub dist: [u8; 32],
    /// Identificador del kangaroo de origen; su paridad codifica el herd.
    pub k_idx: u64,
}

impl DistinguishedPointRecord {
    /// Verdadero si `k_idx` corresponde a un kangaroo del herd TAME (par).
    #[must_use]
    pub fn is_tame(&self) -> bool {
        self.k_idx & 1 == 0
    }
}
