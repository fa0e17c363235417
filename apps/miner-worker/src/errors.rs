// [apps/miner-worker/src/errors.rs]
//! Catálogo de fallos del trabajador, alineado con los códigos de salida
//! de §6: 1 uso, 2 E/S, 3 protocolo, 4 apagado sin resultado.

use thiserror::Error;

/// Fallos que pueden abortar el arranque o la operación del worker.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Argumentos de línea de comandos inválidos.
    #[error("usage error: {0}")]
    Usage(String),

    /// Fallo de entrada/salida (socket, checkpoint local).
    #[error("I/O fault: {0}")]
    Io(#[from] std::io::Error),

    /// Violación del protocolo de cable (magia, versión, longitud).
    #[error("protocol fault: {0}")]
    Protocol(#[from] prospector_infra_transport::TransportError),

    /// Fallo del enlace con el servidor (handshake rechazado, reconexión agotada).
    #[error("uplink fault: {0}")]
    Uplink(#[from] prospector_infra_worker_client::ClientError),

    /// Fallo de la capa matemática (escalar/punto inválido).
    #[error("math fault: {0}")]
    Math(#[from] prospector_core_math::prelude::MathError),
}

impl WorkerError {
    /// El código de salida del proceso correspondiente a este fallo, per §6.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            WorkerError::Usage(_) => 1,
            WorkerError::Io(_) => 2,
            WorkerError::Protocol(_) => 3,
            WorkerError::Uplink(_) => 3,
            WorkerError::Math(_) => 2,
        }
    }
}
