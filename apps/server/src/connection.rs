// [apps/server/src/connection.rs]
//! Manejador de una conexión de worker: el handshake (§6), luego el
//! bucle de mensajes de estado estable hasta que el socket se cierra o
//! el motor alcanza `FOUND`. Cada conexión corre en su propia tarea de
//! Tokio (el equivalente async al "one worker thread per connection"
//! de §4.G sobre el runtime multi-hilo ya elegido para todo el
//! monorepo) y contiende únicamente por el lock del shard que toque en
//! cada `DpStore::add`.

use std::sync::Arc;

use prospector_core_dpstore::{resolve, AddOutcome};
use prospector_core_math::prelude::is_distinguished;
use prospector_domain_models::ClientId;
use prospector_infra_transport::{
    decode_client_hello, decode_frame_payload, encode_frame, encode_server_hello, Message,
    ServerHello, CLIENT_HELLO_SIZE,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, instrument, warn};

use crate::errors::ServerError;
use crate::state::AppState;

/// Atiende una conexión entrante de principio a fin. Los errores de E/S
/// o de protocolo simplemente terminan la tarea: el rango asignado no se
/// libera de inmediato (§4.J), sino que expira por gracia en el barrido
/// periódico del particionador.
#[instrument(skip(stream, state), fields(peer = %peer_label))]
pub async fn handle_connection(mut stream: TcpStream, state: Arc<AppState>, peer_label: String) {
    let client_id = match perform_handshake(&mut stream, &state).await {
        Ok(Some(client_id)) => client_id,
        Ok(None) => return, // handshake rechazado, ya respondido.
        Err(error) => {
            warn!(%error, "handshake failed, dropping connection");
            return;
        }
    };

    if let Err(error) = steady_state_loop(&mut stream, &state, client_id).await {
        debug!(%error, "connection loop ended");
    }
}

async fn perform_handshake(
    stream: &mut TcpStream,
    state: &Arc<AppState>,
) -> Result<Option<ClientId>, ServerError> {
    let mut hello_bytes = [0u8; CLIENT_HELLO_SIZE];
    stream.read_exact(&mut hello_bytes).await?;
    let client_hello = decode_client_hello(&hello_bytes)?;
    let client_id = ClientId(client_hello.client_id);

    if client_hello.interval_bits != state.config.interval_bits {
        let rejection = ServerHello {
            accepted: false,
            dp_bits: state.config.dp_bits,
            target_x: [0u8; 32],
            target_y: [0u8; 32],
            wild_offset: [0u8; 32],
            range_start: [0u8; 32],
            range_end: [0u8; 32],
        };
        stream.write_all(&encode_server_hello(&rejection)).await?;
        warn!(
            announced = client_hello.interval_bits,
            expected = state.config.interval_bits,
            "rejected client: interval width mismatch"
        );
        return Ok(None);
    }

    let Some(range) = state.partitioner.assign(client_id) else {
        let rejection = ServerHello {
            accepted: false,
            dp_bits: state.config.dp_bits,
            target_x: [0u8; 32],
            target_y: [0u8; 32],
            wild_offset: [0u8; 32],
            range_start: [0u8; 32],
            range_end: [0u8; 32],
        };
        stream.write_all(&encode_server_hello(&rejection)).await?;
        info!("rejected client: search interval fully carved, no range to assign");
        return Ok(None);
    };

    let accepted = ServerHello {
        accepted: true,
        dp_bits: state.config.dp_bits,
        target_x: state.config.target.x_bytes(),
        target_y: state.config.target.y_bytes(),
        wild_offset: state.config.wild_offset,
        range_start: range.start,
        range_end: range.end,
    };
    stream.write_all(&encode_server_hello(&accepted)).await?;
    info!(?client_id, "worker accepted and assigned a range");
    Ok(Some(client_id))
}

async fn steady_state_loop(
    stream: &mut TcpStream,
    state: &Arc<AppState>,
    client_id: ClientId,
) -> Result<(), ServerError> {
    let mut stop_rx = state.stop_broadcast.subscribe();

    // Un worker que se conectó después de que la clave ya fue hallada debe
    // enterarse de inmediato en vez de quedar sirviendo DPs inútiles.
    if let Some(found) = *state.found_key.lock().expect("found_key mutex poisoned") {
        stream.write_all(&encode_frame(&Message::Stop { found_key: found })?).await?;
        return Ok(());
    }

    loop {
        tokio::select! {
            biased;

            stop_signal = stop_rx.recv() => {
                if let Ok(found_key) = stop_signal {
                    let _ = stream.write_all(&encode_frame(&Message::Stop { found_key })?).await;
                }
                return Ok(());
            }

            header_result = read_frame_header(stream) => {
                let (msg_type, length) = header_result?;
                let mut payload = vec![0u8; length as usize];
                stream.read_exact(&mut payload).await?;
                let message = decode_frame_payload(msg_type, &payload)?;
                handle_message(stream, state, client_id, message).await?;
            }
        }
    }
}

async fn read_frame_header(stream: &mut TcpStream) -> Result<(u8, u32), ServerError> {
    let mut header = [0u8; 5];
    stream.read_exact(&mut header).await?;
    Ok(prospector_infra_transport::decode_frame_header(&header)?)
}

async fn handle_message(
    stream: &mut TcpStream,
    state: &Arc<AppState>,
    client_id: ClientId,
    message: Message,
) -> Result<(), ServerError> {
    match message {
        Message::DpBatch(entries) => {
            let count = entries.len() as u64;
            for entry in entries {
                handle_dp_entry(stream, state, entry).await?;
            }
            state.telemetry.dps_received.fetch_add(count, std::sync::atomic::Ordering::Relaxed);
            state.partitioner.mark_progress(client_id, 0.0);
            let ack = Message::DpAck { last_sequence: count };
            stream.write_all(&encode_frame(&ack)?).await?;
        }
        Message::Stats { pushed, popped, ops_count } => {
            state.telemetry.ops_reported.fetch_add(ops_count, std::sync::atomic::Ordering::Relaxed);
            debug!(pushed, popped, ops_count, ?client_id, "client pipeline stats");
            state.partitioner.mark_progress(client_id, 0.0);
        }
        Message::Ping { timestamp } => {
            stream.write_all(&encode_frame(&Message::Ping { timestamp })?).await?;
        }
        // Las siguientes variantes viajan únicamente servidor→cliente; un
        // cliente que las envíe viola el protocolo (§7 kind 2).
        Message::DpAck { .. }
        | Message::RangeReassign { .. }
        | Message::ResetKangaroo { .. }
        | Message::Stop { .. } => {
            return Err(ServerError::Protocol(
                prospector_infra_transport::TransportError::UnknownMessageType(message.message_type()),
            ));
        }
    }
    Ok(())
}

/// Una distancia es válida si cabe en 192 bits, es decir, si sus 8 bytes
/// más significativos (big-endian, sobre un ancho de almacenamiento de 32
/// bytes) están en cero.
fn dist_within_192_bits(dist: &[u8; 32]) -> bool {
    dist[..8].iter().all(|&byte| byte == 0)
}

async fn handle_dp_entry(
    stream: &mut TcpStream,
    state: &Arc<AppState>,
    entry: prospector_infra_transport::DpEntry,
) -> Result<(), ServerError> {
    if !is_distinguished(&entry.x, state.config.dp_bits as u32) || !dist_within_192_bits(&entry.dist) {
        warn!(k_idx = entry.k_idx, "rejecting corrupt DP: x/dpMask or dist bound violated");
        return Ok(());
    }

    let submitted_k_idx = entry.k_idx;
    let outcome = state.store.add(entry.x, entry.dist, entry.k_idx);
    let AddOutcome::CrossHerdCollision { tame, wild } = outcome else {
        return Ok(());
    };

    match resolve(&tame, &wild, &state.config.wild_offset, &state.config.target) {
        Ok(recovered) => {
            info!(scalar = %hex::encode(recovered.scalar), "private key recovered");
            state.announce_found(recovered.scalar);
        }
        Err(wrong_collision) => {
            // Colisión espuria (§4.E): reiniciamos el lado del par que esta
            // conexión acaba de enviar, que es el único extremo alcanzable
            // por este socket; el otro lado pudo originarse en un worker ya
            // desconectado.
            debug!(%wrong_collision, "cross-herd collision failed verification");
            if tame.k_idx == submitted_k_idx || wild.k_idx == submitted_k_idx {
                let reset = Message::ResetKangaroo { k_idx: submitted_k_idx };
                stream.write_all(&encode_frame(&reset)?).await?;
            }
        }
    }
    Ok(())
}
