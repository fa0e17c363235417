// [libs/infra/transport/src/codec.rs]
/*!
 * =================================================================
 * APARATO: WIRE CODEC (V1.0)
 * CLASIFICACIÓN: INFRA TRANSPORT (ESTRATO L3)
 * RESPONSABILIDAD: CODIFICACIÓN/DECODIFICACIÓN DEL PROTOCOLO BINARIO
 * =================================================================
 *
 * Funciones puras de codificación sobre buffers en memoria; la E/S real
 * de socket (lectura/escritura asíncrona) vive en las capas que usan
 * este módulo (`prospector-infra-worker-client`, `prospector-server`).
 * Todo el protocolo es big-endian, como indica la cabecera del frame.
 */

use byteorder::{BigEndian, ByteOrder};

use crate::errors::TransportError;

/// Los cuatro bytes fijos de magia del protocolo: `b"KANG"` en ASCII.
pub const MAGIC: u32 = 0x4B41_4E47;

/// Versión de protocolo soportada por este codec.
pub const PROTOCOL_VERSION: u16 = 1;

/// Tamaño exacto de una entrada DP en el wire: `x(32) + dist(24) + kIdx(8) + pad(4)`.
pub const DP_ENTRY_WIRE_SIZE: usize = 68;

/// El saludo enviado por el cliente al conectar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientHello {
    /// Identificador de 16 bytes del cliente.
    pub client_id: [u8; 16],
    /// Ancho del intervalo de búsqueda que el cliente anuncia conocer, en bits.
    pub interval_bits: u8,
}

/// El saludo de respuesta del servidor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerHello {
    /// Verdadero si el servidor aceptó la conexión.
    pub accepted: bool,
    /// Dificultad de punto distinguido, en bits.
    pub dp_bits: u8,
    /// Coordenada X del punto objetivo.
    pub target_x: [u8; 32],
    /// Coordenada Y del punto objetivo.
    pub target_y: [u8; 32],
    /// Desplazamiento global de los herds wild.
    pub wild_offset: [u8; 32],
    /// Límite inferior del rango asignado.
    pub range_start: [u8; 32],
    /// Límite superior del rango asignado.
    pub range_end: [u8; 32],
}

/// Tamaño exacto en bytes del saludo del cliente (`MAGIC|VERSION|CLIENT_ID|N`).
pub const CLIENT_HELLO_SIZE: usize = 4 + 2 + 16 + 1;
/// Tamaño exacto en bytes del saludo del servidor.
pub const SERVER_HELLO_SIZE: usize = 4 + 2 + 1 + 1 + 32 + 32 + 32 + 32 + 32;

/// Codifica el saludo del cliente: `MAGIC|VERSION|CLIENT_ID|N`.
pub fn encode_client_hello(hello: &ClientHello) -> [u8; CLIENT_HELLO_SIZE] {
    let mut buffer = [0u8; CLIENT_HELLO_SIZE];
    BigEndian::write_u32(&mut buffer[0..4], MAGIC);
    BigEndian::write_u16(&mut buffer[4..6], PROTOCOL_VERSION);
    buffer[6..22].copy_from_slice(&hello.client_id);
    buffer[22] = hello.interval_bits;
    buffer
}

/// Decodifica el saludo del cliente, validando magia y versión.
pub fn decode_client_hello(bytes: &[u8]) -> Result<ClientHello, TransportError> {
    require_len(bytes, CLIENT_HELLO_SIZE)?;
    check_magic_and_version(&bytes[0..4], &bytes[4..6])?;
    let mut client_id = [0u8; 16];
    client_id.copy_from_slice(&bytes[6..22]);
    Ok(ClientHello { client_id, interval_bits: bytes[22] })
}

/// Codifica el saludo del servidor.
pub fn encode_server_hello(hello: &ServerHello) -> [u8; SERVER_HELLO_SIZE] {
    let mut buffer = [0u8; SERVER_HELLO_SIZE];
    BigEndian::write_u32(&mut buffer[0..4], MAGIC);
    BigEndian::write_u16(&mut buffer[4..6], PROTOCOL_VERSION);
    buffer[6] = u8::from(hello.accepted);
    buffer[7] = hello.dp_bits;
    buffer[8..40].copy_from_slice(&hello.target_x);
    buffer[40..72].copy_from_slice(&hello.target_y);
    buffer[72..104].copy_from_slice(&hello.wild_offset);
    buffer[104..136].copy_from_slice(&hello.range_start);
    buffer[136..168].copy_from_slice(&hello.range_end);
    buffer
}

/// Decodifica el saludo del servidor, validando magia y versión.
pub fn decode_server_hello(bytes: &[u8]) -> Result<ServerHello, TransportError> {
    require_len(bytes, SERVER_HELLO_SIZE)?;
    check_magic_and_version(&bytes[0..4], &bytes[4..6])?;

    let mut target_x = [0u8; 32];
    let mut target_y = [0u8; 32];
    let mut wild_offset = [0u8; 32];
    let mut range_start = [0u8; 32];
    let mut range_end = [0u8; 32];
    target_x.copy_from_slice(&bytes[8..40]);
    target_y.copy_from_slice(&bytes[40..72]);
    wild_offset.copy_from_slice(&bytes[72..104]);
    range_start.copy_from_slice(&bytes[104..136]);
    range_end.copy_from_slice(&bytes[136..168]);

    Ok(ServerHello {
        accepted: bytes[6] != 0,
        dp_bits: bytes[7],
        target_x,
        target_y,
        wild_offset,
        range_start,
        range_end,
    })
}

fn check_magic_and_version(magic_bytes: &[u8], version_bytes: &[u8]) -> Result<(), TransportError> {
    let magic = BigEndian::read_u32(magic_bytes);
    if magic != MAGIC {
        return Err(TransportError::BadMagic { expected: MAGIC, got: magic });
    }
    let version = BigEndian::read_u16(version_bytes);
    if version != PROTOCOL_VERSION {
        return Err(TransportError::UnsupportedVersion(version));
    }
    Ok(())
}

fn require_len(bytes: &[u8], needed: usize) -> Result<(), TransportError> {
    if bytes.len() < needed {
        return Err(TransportError::Truncated { needed, got: bytes.len() });
    }
    Ok(())
}

/// Una entrada DP tal como viaja en el wire: 68 bytes exactos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DpEntry {
    /// Coordenada X completa.
    pub x: [u8; 32],
    /// Distancia, representada en memoria a ancho completo (32 bytes) pero
    /// acotada conceptualmente a 192 bits.
    pub dist: [u8; 32],
    /// Identificador del kangaroo de origen.
    pub k_idx: u64,
}

/// Codifica una entrada DP a sus 68 bytes canónicos. `x` viaja como cuatro
/// limbs de 64 bits en orden big-endian (limb más significativo primero),
/// que es exactamente el layout byte-a-byte de `x`.
pub fn encode_dp_entry(entry: &DpEntry) -> Result<[u8; DP_ENTRY_WIRE_SIZE], TransportError> {
    if entry.dist[0..8] != [0u8; 8] {
        return Err(TransportError::DistanceOverflow);
    }
    let mut buffer = [0u8; DP_ENTRY_WIRE_SIZE];
    buffer[0..32].copy_from_slice(&entry.x);
    buffer[32..56].copy_from_slice(&entry.dist[8..32]);
    BigEndian::write_u64(&mut buffer[56..64], entry.k_idx);
    // buffer[64..68] permanece en cero: el relleno documentado por §6.
    Ok(buffer)
}

/// Decodifica una entrada DP desde sus 68 bytes canónicos.
pub fn decode_dp_entry(bytes: &[u8]) -> Result<DpEntry, TransportError> {
    require_len(bytes, DP_ENTRY_WIRE_SIZE)?;
    let mut x = [0u8; 32];
    x.copy_from_slice(&bytes[0..32]);
    let mut dist = [0u8; 32];
    dist[8..32].copy_from_slice(&bytes[32..56]);
    let k_idx = BigEndian::read_u64(&bytes[56..64]);
    Ok(DpEntry { x, dist, k_idx })
}

/// El conjunto cerrado de mensajes de estado estable, una vez completado el
/// handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// 0x01, cliente→servidor: una ráfaga de puntos distinguidos.
    DpBatch(Vec<DpEntry>),
    /// 0x02, servidor→cliente: confirmación de la última secuencia recibida.
    DpAck {
        /// Última secuencia confirmada.
        last_sequence: u64,
    },
    /// 0x03, ambas direcciones: sondeo de vida.
    Ping {
        /// Marca de tiempo del emisor, en milisegundos desde la época.
        timestamp: u64,
    },
    /// 0x04, servidor→cliente: reasignación de rango de trabajo.
    RangeReassign {
        /// Nuevo límite inferior.
        start: [u8; 32],
        /// Nuevo límite superior.
        end: [u8; 32],
    },
    /// 0x05, servidor→cliente: fuerza al cliente a resembrar este kangaroo.
    ResetKangaroo {
        /// Identificador del kangaroo a reiniciar.
        k_idx: u64,
    },
    /// 0x06, servidor→cliente: la clave fue hallada, detener todo.
    Stop {
        /// El escalar recuperado.
        found_key: [u8; 32],
    },
    /// 0x07, cliente→servidor: estadísticas del pipeline local.
    Stats {
        /// Total de DPs empujados al pipeline.
        pushed: u64,
        /// Total de DPs extraídos del pipeline.
        popped: u64,
        /// Total de pasos de caminata ejecutados.
        ops_count: u64,
    },
}

impl Message {
    /// El byte `MSG_TYPE` correspondiente a esta variante.
    #[must_use]
    pub fn message_type(&self) -> u8 {
        match self {
            Message::DpBatch(_) => 0x01,
            Message::DpAck { .. } => 0x02,
            Message::Ping { .. } => 0x03,
            Message::RangeReassign { .. } => 0x04,
            Message::ResetKangaroo { .. } => 0x05,
            Message::Stop { .. } => 0x06,
            Message::Stats { .. } => 0x07,
        }
    }

    /// Codifica únicamente el `PAYLOAD`, sin la cabecera de frame.
    pub fn encode_payload(&self) -> Result<Vec<u8>, TransportError> {
        let mut payload = Vec::new();
        match self {
            Message::DpBatch(entries) => {
                let mut count_bytes = [0u8; 4];
                BigEndian::write_u32(&mut count_bytes, entries.len() as u32);
                payload.extend_from_slice(&count_bytes);
                for entry in entries {
                    payload.extend_from_slice(&encode_dp_entry(entry)?);
                }
            }
            Message::DpAck { last_sequence } => {
                payload.extend_from_slice(&last_sequence.to_be_bytes());
            }
            Message::Ping { timestamp } => {
                payload.extend_from_slice(&timestamp.to_be_bytes());
            }
            Message::RangeReassign { start, end } => {
                payload.extend_from_slice(start);
                payload.extend_from_slice(end);
            }
            Message::ResetKangaroo { k_idx } => {
                payload.extend_from_slice(&k_idx.to_be_bytes());
            }
            Message::Stop { found_key } => {
                payload.extend_from_slice(found_key);
            }
            Message::Stats { pushed, popped, ops_count } => {
                payload.extend_from_slice(&pushed.to_be_bytes());
                payload.extend_from_slice(&popped.to_be_bytes());
                payload.extend_from_slice(&ops_count.to_be_bytes());
            }
        }
        Ok(payload)
    }

    /// Decodifica un `PAYLOAD` dado su `MSG_TYPE`.
    pub fn decode_payload(msg_type: u8, payload: &[u8]) -> Result<Self, TransportError> {
        match msg_type {
            0x01 => {
                require_len(payload, 4)?;
                let count = BigEndian::read_u32(&payload[0..4]) as usize;
                let expected_len = 4 + count * DP_ENTRY_WIRE_SIZE;
                require_len(payload, expected_len)?;
                let mut entries = Vec::with_capacity(count);
                for i in 0..count {
                    let start = 4 + i * DP_ENTRY_WIRE_SIZE;
                    let end = start + DP_ENTRY_WIRE_SIZE;
                    entries.push(decode_dp_entry(&payload[start..end])?);
                }
                Ok(Message::DpBatch(entries))
            }
            0x02 => {
                require_len(payload, 8)?;
                Ok(Message::DpAck { last_sequence: BigEndian::read_u64(&payload[0..8]) })
            }
            0x03 => {
                require_len(payload, 8)?;
                Ok(Message::Ping { timestamp: BigEndian::read_u64(&payload[0..8]) })
            }
            0x04 => {
                require_len(payload, 64)?;
                let mut start = [0u8; 32];
                let mut end = [0u8; 32];
                start.copy_from_slice(&payload[0..32]);
                end.copy_from_slice(&payload[32..64]);
                Ok(Message::RangeReassign { start, end })
            }
            0x05 => {
                require_len(payload, 8)?;
                Ok(Message::ResetKangaroo { k_idx: BigEndian::read_u64(&payload[0..8]) })
            }
            0x06 => {
                require_len(payload, 32)?;
                let mut found_key = [0u8; 32];
                found_key.copy_from_slice(&payload[0..32]);
                Ok(Message::Stop { found_key })
            }
            0x07 => {
                require_len(payload, 24)?;
                Ok(Message::Stats {
                    pushed: BigEndian::read_u64(&payload[0..8]),
                    popped: BigEndian::read_u64(&payload[8..16]),
                    ops_count: BigEndian::read_u64(&payload[16..24]),
                })
            }
            other => Err(TransportError::UnknownMessageType(other)),
        }
    }
}

/// Codifica un frame completo: `MSG_TYPE(1) | LENGTH(4) | PAYLOAD`.
pub fn encode_frame(message: &Message) -> Result<Vec<u8>, TransportError> {
    let payload = message.encode_payload()?;
    let mut frame = Vec::with_capacity(5 + payload.len());
    frame.push(message.message_type());
    let mut length_bytes = [0u8; 4];
    BigEndian::write_u32(&mut length_bytes, payload.len() as u32);
    frame.extend_from_slice(&length_bytes);
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Decodifica la cabecera de un frame (`MSG_TYPE`, `LENGTH`), sin consumir
/// el payload. Usado por el lector asíncrono para saber cuántos bytes más
/// esperar antes de invocar `decode_frame_payload`.
pub fn decode_frame_header(bytes: &[u8]) -> Result<(u8, u32), TransportError> {
    require_len(bytes, 5)?;
    let msg_type = bytes[0];
    let length = BigEndian::read_u32(&bytes[1..5]);
    if msg_type == 0x01 && length < 4 {
        return Err(TransportError::DpBatchLengthMismatch { declared: length, expected: 4 });
    }
    Ok((msg_type, length))
}

/// Decodifica un mensaje completo dado su `MSG_TYPE` y su `PAYLOAD` ya leído.
pub fn decode_frame_payload(msg_type: u8, payload: &[u8]) -> Result<Message, TransportError> {
    if msg_type == 0x01 {
        require_len(payload, 4)?;
        let count = BigEndian::read_u32(&payload[0..4]);
        let expected = 4 + DP_ENTRY_WIRE_SIZE as u32 * count;
        if payload.len() as u32 != expected {
            return Err(TransportError::DpBatchLengthMismatch {
                declared: payload.len() as u32,
                expected,
            });
        }
    }
    Message::decode_payload(msg_type, payload)
}
