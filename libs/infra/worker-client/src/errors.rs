// INICIO DEL ARCHIVO [libs/infra/worker-client/src/errors.rs]
//! =================================================================
//! APARATO: WORKER CLIENT ERRORS (V11.0 - RAW TCP UPLINK)
//! RESPONSABILIDAD: CATALOGACIÓN DE FALLOS DE COMUNICACIÓN
//! =================================================================

use thiserror::Error;

use prospector_infra_transport::TransportError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("NETWORK_UNREACHABLE: Failed to reach Command Center: {0}")]
    NetworkFault(#[from] std::io::Error),

    #[error("PROTOCOL_FAULT: malformed frame from Command Center: {0}")]
    ProtocolFault(#[from] TransportError),

    #[error("COMMAND_REJECTION: {0}")]
    ServerRejection(String),

    #[error("RECONNECT_EXHAUSTED: giving up after {attempts} failed attempts")]
    ReconnectExhausted { attempts: u32 },

    #[error("PIPELINE_SHUTDOWN: uplink stopped while a batch was in flight")]
    PipelineShutdown,
}
// FIN DEL ARCHIVO [libs/infra/worker-client/src/errors.rs]
