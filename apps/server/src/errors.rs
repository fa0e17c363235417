// [apps/server/src/errors.rs]
//! Catálogo de fallos del servidor, alineado con los códigos de salida
//! de §6: 1 uso, 2 E/S, 3 protocolo, 4 apagado sin resultado.

use thiserror::Error;

/// Fallos que pueden abortar el arranque o la operación del servidor.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Argumentos de línea de comandos o archivo objetivo inválidos.
    #[error("usage error: {0}")]
    Usage(String),

    /// Fallo de entrada/salida (socket, archivo de checkpoint, resultado).
    #[error("I/O fault: {0}")]
    Io(#[from] std::io::Error),

    /// Violación del protocolo de cable (magia, versión, longitud).
    #[error("protocol fault: {0}")]
    Protocol(#[from] prospector_infra_transport::TransportError),

    /// Fallo de la capa matemática (escalar/punto inválido).
    #[error("math fault: {0}")]
    Math(#[from] prospector_core_math::prelude::MathError),
}

impl ServerError {
    /// El código de salida del proceso correspondiente a este fallo, per §6.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            ServerError::Usage(_) => 1,
            ServerError::Io(_) => 2,
            ServerError::Protocol(_) => 3,
            ServerError::Math(_) => 2,
        }
    }
}
