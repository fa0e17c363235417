// [libs/infra/transport/src/lib.rs]
//! Codec binario del protocolo de distribución: handshake, frames de
//! estado estable, y el formato de archivo de checkpoint. Todas las
//! funciones aquí son puras (operan sobre buffers en memoria); la E/S de
//! socket/archivo asíncrona vive en las capas que las invocan.
#![deny(missing_docs)]

/// Handshake, frames de mensaje, y la entrada DP de 68 bytes.
pub mod codec;
/// Formato binario del archivo de checkpoint y su escritura atómica.
pub mod checkpoint;
/// Errores de decodificación del protocolo.
pub mod errors;

pub use checkpoint::{CheckpointBucket, CheckpointFile};
pub use codec::{
    decode_client_hello, decode_dp_entry, decode_frame_header, decode_frame_payload,
    decode_server_hello, encode_client_hello, encode_dp_entry, encode_frame, encode_server_hello,
    ClientHello, DpEntry, Message, ServerHello, CLIENT_HELLO_SIZE, DP_ENTRY_WIRE_SIZE, MAGIC,
    PROTOCOL_VERSION, SERVER_HELLO_SIZE,
};
pub use errors::TransportError;
