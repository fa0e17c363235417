// [libs/infra/worker-client/src/uplink.rs]
/*!
 * =================================================================
 * APARATO: SOVEREIGN WORKER UPLINK
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: NEGOCIACIÓN Y TRANSPORTE TCP CRUDO HACIA EL SERVIDOR
 *
 * Reemplaza el antiguo túnel HTTP/reqwest por un socket TCP crudo que
 * habla el protocolo binario de `prospector-infra-transport`: handshake
 * de un solo round-trip, luego frames de mensaje en ambas direcciones.
 * Una falla de envío no descarta el lote en vuelo: el llamador reintenta
 * tras reconectar con backoff exponencial acotado.
 * =================================================================
 */

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{info, instrument, warn};

use prospector_infra_transport::{
    decode_frame_header, decode_frame_payload, decode_server_hello, encode_client_hello,
    encode_frame, ClientHello, Message, ServerHello, SERVER_HELLO_SIZE,
};

use crate::errors::ClientError;

/// Backoff inicial de reconexión.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
/// Techo del backoff de reconexión.
const MAX_BACKOFF: Duration = Duration::from_secs(30);
/// Intentos de reconexión consecutivos antes de rendirse (kind 1, N=10).
const MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Túnel TCP hacia el servidor: handshake más envío/recepción de frames,
/// con reconexión automática de backoff acotado sobre fallas de envío.
/// `Clone` es barato (una `String` y dos enteros) y permite que cada
/// intento de misión en `main` reconstruya un motor nuevo sin mover el
/// `Uplink` original, preservando el mismo `clientId` entre reintentos.
#[derive(Clone)]
pub struct Uplink {
    server_addr: String,
    client_id: [u8; 16],
    interval_bits: u8,
}

impl Uplink {
    /// Construye un uplink sin conectar todavía.
    pub fn new(server_addr: String, client_id: [u8; 16], interval_bits: u8) -> Self {
        Self { server_addr, client_id, interval_bits }
    }

    /// Conecta una vez, ejecuta el handshake, y retorna el socket junto con
    /// la respuesta del servidor. No reintenta: para eso ver
    /// [`Uplink::connect_with_backoff`].
    #[instrument(skip(self), fields(server = %self.server_addr))]
    pub async fn connect(&self) -> Result<(TcpStream, ServerHello), ClientError> {
        let mut stream = TcpStream::connect(&self.server_addr).await?;

        let hello = ClientHello { client_id: self.client_id, interval_bits: self.interval_bits };
        stream.write_all(&encode_client_hello(&hello)).await?;
        stream.flush().await?;

        let mut response = [0u8; SERVER_HELLO_SIZE];
        stream.read_exact(&mut response).await?;
        let server_hello = decode_server_hello(&response)?;

        if !server_hello.accepted {
            return Err(ClientError::ServerRejection(
                "server declined handshake (ACCEPTED=0)".into(),
            ));
        }

        info!("uplink handshake accepted, dp_bits={}", server_hello.dp_bits);
        Ok((stream, server_hello))
    }

    /// Como [`Uplink::connect`], pero reintenta con backoff exponencial
    /// (1 s → 30 s, acotado) hasta [`MAX_RECONNECT_ATTEMPTS`] fallos
    /// consecutivos, tras lo cual retorna `ReconnectExhausted`.
    #[instrument(skip(self), fields(server = %self.server_addr))]
    pub async fn connect_with_backoff(&self) -> Result<(TcpStream, ServerHello), ClientError> {
        let mut backoff = INITIAL_BACKOFF;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            match self.connect().await {
                Ok(result) => return Ok(result),
                Err(err) if attempts >= MAX_RECONNECT_ATTEMPTS => {
                    warn!("uplink giving up after {attempts} attempts: {err}");
                    return Err(ClientError::ReconnectExhausted { attempts });
                }
                Err(err) => {
                    warn!("uplink connect attempt {attempts} failed: {err}, retrying in {backoff:?}");
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
            }
        }
    }

    /// Escribe un mensaje como un frame completo sobre el socket dado.
    pub async fn send_message(stream: &mut TcpStream, message: &Message) -> Result<(), ClientError> {
        let frame = encode_frame(message)?;
        stream.write_all(&frame).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Lee exactamente un frame del socket y lo decodifica.
    pub async fn recv_message(stream: &mut TcpStream) -> Result<Message, ClientError> {
        let mut header = [0u8; 5];
        stream.read_exact(&mut header).await?;
        let (msg_type, length) = decode_frame_header(&header)?;

        let mut payload = vec![0u8; length as usize];
        stream.read_exact(&mut payload).await?;
        Ok(decode_frame_payload(msg_type, &payload)?)
    }
}
