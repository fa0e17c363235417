// INICIO DEL ARCHIVO [libs/infra/worker-client/src/lib.rs]
/*!
 * =================================================================
 * APARATO: WORKER CLIENT LIBRARY BARREL
 * CLASIFICACIÓN: INFRASTRUCTURE LIB (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN PÚBLICA DEL ENLACE WORKER→SERVIDOR
 *
 * Centraliza la exportación de la tubería DP y del uplink TCP que
 * consume `apps/miner-worker`.
 * =================================================================
 */
#![deny(missing_docs)]

/// Catálogo de errores del enlace cliente-servidor.
pub mod errors;
/// Cola de desacople entre las líneas de cómputo y el emisor de red.
pub mod pipeline;
/// Túnel TCP crudo: handshake y envío/recepción de frames.
pub mod uplink;

pub use errors::ClientError;
pub use pipeline::{DpPipeline, DEFAULT_BATCHING_DELAY};
pub use uplink::Uplink;
// FIN DEL ARCHIVO [libs/infra/worker-client/src/lib.rs]
