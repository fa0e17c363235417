// INICIO DEL ARCHIVO [libs/core/dp-store/src/errors.rs]
//! Errores de invariante del store, separados de `WrongCollision` (que es
//! un resultado de negocio esperado, no un fallo).

use thiserror::Error;

/// Violaciones de invariante del store que no deberían ocurrir bajo
/// operación normal.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Un checkpoint cargado desde disco contenía una cubeta con entradas
    /// fuera de orden o con una coordenada `x` que no pertenece a su índice
    /// de cubeta declarado.
    #[error("checkpoint bucket {bucket_index} is corrupt: {reason}")]
    CorruptCheckpointBucket {
        /// Índice de la cubeta afectada.
        bucket_index: u32,
        /// Descripción breve de la inconsistencia detectada.
        reason: String,
    },

    /// El store fue configurado con parámetros de sharding inválidos.
    #[error("invalid store configuration: {0}")]
    InvalidConfiguration(String),
}
// FIN DEL ARCHIVO [libs/core/dp-store/src/errors.rs]
