// [libs/infra/transport/src/errors.rs]
use thiserror::Error;

/// Fallos de decodificación del protocolo binario: corresponden al "Kind 2:
/// Protocol violation" — la conexión se cierra, nunca se reintenta con el
/// mismo buffer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// El campo MAGIC no coincidió con `0x4B414E47`.
    #[error("bad magic: expected {expected:#010x}, got {got:#010x}")]
    BadMagic {
        /// Valor esperado.
        expected: u32,
        /// Valor recibido.
        got: u32,
    },

    /// La versión de protocolo anunciada no es soportada.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u16),

    /// El buffer recibido es más corto de lo que el layout exige.
    #[error("truncated frame: needed at least {needed} bytes, got {got}")]
    Truncated {
        /// Bytes mínimos requeridos.
        needed: usize,
        /// Bytes disponibles.
        got: usize,
    },

    /// `LENGTH` no coincide con `4 + 68*COUNT` para un DP_BATCH.
    #[error("dp batch length mismatch: declared {declared}, expected {expected}")]
    DpBatchLengthMismatch {
        /// Longitud declarada en el frame.
        declared: u32,
        /// Longitud que el COUNT implica.
        expected: u32,
    },

    /// Byte de tipo de mensaje no reconocido.
    #[error("unknown message type: {0:#04x}")]
    UnknownMessageType(u8),

    /// Una distancia superó los 192 bits permitidos en el layout de 24 bytes.
    #[error("distance exceeds the 192-bit wire budget")]
    DistanceOverflow,

    /// Fallo de E/S subyacente durante lectura o escritura del socket/archivo.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
