// [apps/miner-worker/src/engine.rs]
//! Orquesta el ciclo de vida de una sesión del trabajador: handshake con
//! el servidor, arranque de M lanes de cómputo (§4.H), y el enrutamiento
//! de mensajes entrantes/salientes sobre el mismo socket. Un fallo de
//! lectura o escritura termina la sesión entera y se propaga a `main`,
//! que reintenta con el mismo `Uplink` (mismo `clientId`, de modo que el
//! particionador del servidor reconoce la reconexión y reemite el mismo
//! rango si la ventana de gracia no ha expirado).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use prospector_core_math::prelude::{subtract_u256_be, SafePublicKey, DEFAULT_SAFETY_FACTOR};
use prospector_infra_transport::{
    decode_frame_header, decode_frame_payload, encode_frame, DpEntry, Message,
};
use prospector_infra_worker_client::{DpPipeline, Uplink, DEFAULT_BATCHING_DELAY};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cpu_manager::{HardwareMonitor, THERMAL_CRITICAL_THRESHOLD_CELSIUS};
use crate::errors::WorkerError;
use crate::lanes::{run_lane, LaneConfig, LANE_KIDX_STRIDE};

/// Cuántos kangaroos posee cada lane (mitad tame, mitad wild).
const DEFAULT_COHORT_SIZE: usize = 64;
/// Cuántos DPs como máximo viajan en un único DP_BATCH saliente.
const MAX_DPS_PER_BATCH: usize = 256;
/// Tiempo que `pop_batch` espera por el primer DP antes de retornar vacío.
const POP_TIMEOUT: Duration = Duration::from_millis(500);
/// Período del reporte STATS al servidor (§6, MSG_TYPE 0x07).
const STATS_REPORT_INTERVAL: Duration = Duration::from_secs(10);
/// Período de muestreo de la telemetría de hardware del host.
const THERMAL_SAMPLE_INTERVAL: Duration = Duration::from_secs(5);

/// El motor del trabajador: negocia una misión y corre sus lanes hasta
/// `STOP` o hasta que el enlace se rompa.
pub struct MinerEngine {
    uplink: Uplink,
    lane_count: usize,
    running: Arc<AtomicBool>,
}

impl MinerEngine {
    /// Construye un motor sin conectar todavía.
    pub fn new(uplink: Uplink, lane_count: usize, running: Arc<AtomicBool>) -> Self {
        Self { uplink, lane_count: lane_count.max(1), running }
    }

    /// Conecta, arranca los lanes, y corre hasta que el servidor anuncie
    /// `STOP` (clave hallada) o el enlace se rompa. Retorna la clave
    /// recuperada cuando la hay.
    pub async fn run(&self) -> Result<Option<[u8; 32]>, WorkerError> {
        let (stream, hello) = self.uplink.connect_with_backoff().await?;
        info!(dp_bits = hello.dp_bits, lanes = self.lane_count, "handshake accepted, spinning up lanes");

        let target = decode_target_point(hello.target_x, hello.target_y)?;
        let interval_width = interval_width_as_u128(&hello.range_start, &hello.range_end);

        if let Some(core_ids) = core_affinity::get_core_ids() {
            info!(detected_cores = core_ids.len(), "silicon topology probed for lane pinning");
        }

        let pipeline = Arc::new(DpPipeline::new());
        let runtime_handle = tokio::runtime::Handle::current();
        let mut lane_handles = Vec::with_capacity(self.lane_count);
        let mut reset_senders: Vec<Sender<u64>> = Vec::with_capacity(self.lane_count);
        let throttle = Arc::new(AtomicBool::new(false));
        // Alcance de esta sesión únicamente: distinto de `self.running`
        // (que solo se limpia por una señal externa de apagado), para que
        // el fin de una sesión por error o `STOP` nunca le impida a
        // `main` reintentar la siguiente con un `running` intacto.
        let session_active = Arc::new(AtomicBool::new(true));

        for lane_index in 0..self.lane_count {
            let (reset_tx, reset_rx) = std::sync::mpsc::channel::<u64>();
            let config = LaneConfig {
                lane_index,
                cohort_size: DEFAULT_COHORT_SIZE,
                start: hello.range_start,
                target,
                wild_offset: hello.wild_offset,
                dp_bits: hello.dp_bits,
                safety_factor: DEFAULT_SAFETY_FACTOR,
                interval_width,
            };
            let lane_session_active = Arc::clone(&session_active);
            let lane_pipeline = Arc::clone(&pipeline);
            let handle = runtime_handle.clone();
            let lane_throttle = Arc::clone(&throttle);
            lane_handles.push(tokio::task::spawn_blocking(move || {
                run_lane(config, lane_session_active, lane_pipeline, handle, reset_rx, lane_throttle)
            }));
            reset_senders.push(reset_tx);
        }

        let thermal_task = tokio::spawn(run_thermal_monitor(Arc::clone(&throttle), Arc::clone(&session_active)));

        let (read_half, write_half) = stream.into_split();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<Message>();

        let stats_task = tokio::spawn(run_stats_reporter(Arc::clone(&pipeline), outbound_tx.clone()));
        let sender_task = tokio::spawn(run_batch_sender(Arc::clone(&pipeline), outbound_tx.clone()));
        drop(outbound_tx);

        let mut reader_fut = Box::pin(run_reader(read_half, reset_senders));
        let mut writer_fut = Box::pin(run_writer(write_half, outbound_rx));
        let mut shutdown_fut = Box::pin(wait_for_shutdown(Arc::clone(&self.running)));

        let result = tokio::select! {
            biased;
            () = &mut shutdown_fut => Ok(None),
            reader_result = &mut reader_fut => reader_result,
            writer_result = &mut writer_fut => writer_result.map(|()| None),
        };

        session_active.store(false, Ordering::SeqCst);
        pipeline.request_shutdown();
        stats_task.abort();
        sender_task.abort();
        thermal_task.abort();

        for handle in lane_handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(math_fault)) => warn!(%math_fault, "compute lane exited with a math fault"),
                Err(join_fault) => warn!(%join_fault, "compute lane task panicked"),
            }
        }

        result
    }
}

/// Resuelve en cuanto `running` se limpia externamente (p. ej. `Ctrl+C`),
/// dándole al `select!` principal una salida que no depende de que el
/// servidor cierre el socket o anuncie `STOP`.
async fn wait_for_shutdown(running: Arc<AtomicBool>) {
    let mut interval = tokio::time::interval(Duration::from_millis(100));
    while running.load(Ordering::Relaxed) {
        interval.tick().await;
    }
}

fn decode_target_point(x: [u8; 32], y: [u8; 32]) -> Result<SafePublicKey, WorkerError> {
    let mut uncompressed = Vec::with_capacity(65);
    uncompressed.push(0x04);
    uncompressed.extend_from_slice(&x);
    uncompressed.extend_from_slice(&y);
    Ok(SafePublicKey::from_bytes(&uncompressed)?)
}

/// Convierte `range_end - range_start` a un `u128`, saturando al máximo si
/// el ancho real excede 128 bits (la cota de seguridad solo necesita el
/// orden de magnitud del intervalo, no su valor exacto).
fn interval_width_as_u128(start: &[u8; 32], end: &[u8; 32]) -> u128 {
    let width_bytes = match subtract_u256_be(end, start) {
        Ok(bytes) => bytes,
        Err(_) => return u128::MAX,
    };
    if width_bytes[..16].iter().any(|byte| *byte != 0) {
        return u128::MAX;
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&width_bytes[16..32]);
    u128::from_be_bytes(low)
}

/// Drena el pipeline compartido y reenvía cada lote no vacío al canal de
/// salida. Corre concurrente a la lectura: no toca el socket directamente,
/// así que no compite por el acceso mutable exclusivo que exige escribir
/// sobre un `TcpStream` dividido.
async fn run_stats_reporter(pipeline: Arc<DpPipeline>, outbound_tx: mpsc::UnboundedSender<Message>) {
    let mut interval = tokio::time::interval(STATS_REPORT_INTERVAL);
    loop {
        interval.tick().await;
        let stats = Message::Stats {
            pushed: pipeline.total_pushed(),
            popped: pipeline.total_popped(),
            ops_count: pipeline.total_popped(),
        };
        if outbound_tx.send(stats).is_err() {
            return;
        }
    }
}

/// Muestrea la telemetría del host a intervalos regulares y activa `throttle`
/// mientras la temperatura reportada supere el umbral crítico, pausando los
/// lanes de cómputo hasta que el host se enfríe (§4.H).
async fn run_thermal_monitor(throttle: Arc<AtomicBool>, running: Arc<AtomicBool>) {
    let mut interval = tokio::time::interval(THERMAL_SAMPLE_INTERVAL);
    while running.load(Ordering::Relaxed) {
        interval.tick().await;
        let metrics = HardwareMonitor::capture_instantaneous_metrics();
        let hot = metrics.core_temperature_celsius >= THERMAL_CRITICAL_THRESHOLD_CELSIUS;
        if hot {
            warn!(
                temperature = metrics.core_temperature_celsius,
                synthetic = metrics.is_virtual_thermal_reading,
                "host above thermal threshold, pacing lanes"
            );
        } else {
            debug!(
                temperature = metrics.core_temperature_celsius,
                load = metrics.system_load_average,
                "thermal sample nominal"
            );
        }
        throttle.store(hot, Ordering::Relaxed);
    }
}

async fn run_batch_sender(pipeline: Arc<DpPipeline>, outbound_tx: mpsc::UnboundedSender<Message>) {
    loop {
        let batch: Vec<DpEntry> = pipeline
            .pop_batch(MAX_DPS_PER_BATCH, POP_TIMEOUT, DEFAULT_BATCHING_DELAY)
            .await;
        if batch.is_empty() {
            continue;
        }
        if outbound_tx.send(Message::DpBatch(batch)).is_err() {
            return;
        }
    }
}

/// La única tarea que posee la mitad de escritura del socket: serializa
/// todo tráfico saliente (STATS y DP_BATCH) a través de un único canal,
/// evitando que dos tareas concurrentes reclamen `&mut` sobre el mismo
/// `TcpStream` dividido.
async fn run_writer(
    mut write_half: OwnedWriteHalf,
    mut outbound_rx: mpsc::UnboundedReceiver<Message>,
) -> Result<(), WorkerError> {
    while let Some(message) = outbound_rx.recv().await {
        let frame = encode_frame(&message)?;
        write_half.write_all(&frame).await?;
        write_half.flush().await?;
    }
    Ok(())
}

/// La única tarea que posee la mitad de lectura del socket. Enruta
/// `RESET_KANGAROO` al lane dueño de la banda de `kIdx` indicada y
/// retorna en cuanto el servidor anuncia `STOP`.
async fn run_reader(
    mut read_half: OwnedReadHalf,
    reset_senders: Vec<Sender<u64>>,
) -> Result<Option<[u8; 32]>, WorkerError> {
    loop {
        let mut header = [0u8; 5];
        read_half.read_exact(&mut header).await?;
        let (msg_type, length) = decode_frame_header(&header)?;
        let mut payload = vec![0u8; length as usize];
        read_half.read_exact(&mut payload).await?;
        let message = decode_frame_payload(msg_type, &payload)?;

        match message {
            Message::Stop { found_key } => {
                info!(scalar = %hex::encode(found_key), "server signalled STOP");
                return Ok(Some(found_key));
            }
            Message::ResetKangaroo { k_idx } => {
                let lane_index = (k_idx / LANE_KIDX_STRIDE) as usize;
                match reset_senders.get(lane_index) {
                    Some(sender) => {
                        let _ = sender.send(k_idx);
                    }
                    None => warn!(k_idx, lane_index, "reset targets a lane this worker does not own"),
                }
            }
            Message::RangeReassign { start, end } => {
                warn!(
                    start = %hex::encode(start),
                    end = %hex::encode(end),
                    "range reassignment received mid-mission; lanes keep their already-committed cohort start"
                );
            }
            Message::DpAck { .. } | Message::Ping { .. } => {
                debug!("housekeeping message from server");
            }
            other => warn!(?other, "unexpected message from server, dropping"),
        }
    }
}
