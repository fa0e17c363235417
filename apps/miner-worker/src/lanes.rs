// [apps/miner-worker/src/lanes.rs]
//! Un lane de cómputo es un cohort de kangaroos propiedad exclusiva de un
//! hilo bloqueante (per §5: "one OS thread per compute lane", encarnado
//! aquí como `tokio::task::spawn_blocking`). Cada lane reserva su propia
//! banda de `kIdx` vía `Herd::spawn_with_namespace` para que un
//! `RESET_KANGAROO` recibido del servidor se pueda enrutar sin ambigüedad
//! al lane correcto (§4.H: "kangaroo cohorts are lane-private").

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use prospector_core_math::prelude::{
    compute_safety_bound, step, DistinguishedPoint, Herd, JumpTable, MathError, SafePublicKey,
    StepOutcome,
};
use prospector_infra_transport::DpEntry;
use prospector_infra_worker_client::DpPipeline;
use tokio::runtime::Handle;
use tracing::debug;

/// Separación de `kIdx` entre lanes: el lane `i` posee
/// `[i * LANE_KIDX_STRIDE, (i + 1) * LANE_KIDX_STRIDE)`, un rango lo
/// bastante amplio para que ningún lane agote su banda de reinicios
/// durante una misión real.
pub const LANE_KIDX_STRIDE: u64 = 1 << 32;

/// Cuántos DPs acumula un lane en su buffer local antes de forzar un
/// `push_batch` fuera de ciclo, en vez de esperar a agotar el cohort
/// completo de la iteración en curso.
const LOCAL_BUFFER_FLUSH_THRESHOLD: usize = 64;

/// Cota blanda de profundidad de la cola compartida (§7, kind 5: "resource
/// exhaustion"). Por encima de esta cota el lane aplica contrapresión
/// saltándose un paso de cómputo en vez de seguir acumulando DPs sin
/// drenar.
const SOFT_QUEUE_DEPTH_BOUND: usize = 1_000_000;

/// Cuánto pausa un lane en cada iteración externa mientras el monitor
/// térmico del host señala presión, generalizando el hook de pacing del
/// profesor (`THERMAL_CRITICAL_THRESHOLD_CELSIUS`) a un worker con varios
/// lanes en vez de un único bucle de minería.
const THERMAL_PACING_SLEEP: std::time::Duration = std::time::Duration::from_millis(200);

/// Parámetros de arranque de un lane. Se pasan por valor porque el cuerpo
/// del lane corre en un hilo bloqueante distinto del que lo construye.
pub struct LaneConfig {
    /// Índice del lane dentro del worker; determina su banda de `kIdx`.
    pub lane_index: usize,
    /// Cuántos kangaroos posee este lane (mitad tame, mitad wild).
    pub cohort_size: usize,
    /// Escalar de arranque de los tame, el límite inferior del rango asignado.
    pub start: [u8; 32],
    /// El punto objetivo `P`.
    pub target: SafePublicKey,
    /// Desplazamiento global de los herds wild.
    pub wild_offset: [u8; 32],
    /// Dificultad de punto distinguido, en bits.
    pub dp_bits: u8,
    /// Factor de seguridad para la detección de rama muerta.
    pub safety_factor: u32,
    /// Ancho del intervalo asignado, usado para calibrar la cota de seguridad.
    pub interval_width: u128,
}

/// Ejecuta el bucle de caminata de un lane hasta que `running` se limpie.
/// Bloqueante por diseño: se invoca exclusivamente desde dentro de
/// `tokio::task::spawn_blocking`. `reset_rx` recibe `kIdx`s de reinicio
/// forzado reenviados por la tarea async de lectura de mensajes, y se
/// consulta de forma no bloqueante en cada iteración para no demorar el
/// hot-loop matemático (§5: "Producer lanes: none [suspension points],
/// except the single mutex acquire on DP enqueue").
pub fn run_lane(
    config: LaneConfig,
    running: Arc<AtomicBool>,
    pipeline: Arc<DpPipeline>,
    runtime: Handle,
    reset_rx: Receiver<u64>,
    throttle: Arc<AtomicBool>,
) -> Result<(), MathError> {
    let jump_table = JumpTable::build()?;
    let k_idx_base = config.lane_index as u64 * LANE_KIDX_STRIDE;
    let mut herd = Herd::spawn_with_namespace(
        config.cohort_size,
        &config.start,
        &config.target,
        &config.wild_offset,
        k_idx_base,
    )?;
    let safety_bound = compute_safety_bound(config.interval_width, config.safety_factor);

    let mut local_buffer: Vec<DpEntry> = Vec::with_capacity(LOCAL_BUFFER_FLUSH_THRESHOLD);

    while running.load(Ordering::Relaxed) {
        if throttle.load(Ordering::Relaxed) {
            std::thread::sleep(THERMAL_PACING_SLEEP);
            continue;
        }

        if runtime.block_on(pipeline.queue_depth()) >= SOFT_QUEUE_DEPTH_BOUND {
            debug!(lane = config.lane_index, "shared pipeline saturated, skipping a compute step");
            std::thread::sleep(THERMAL_PACING_SLEEP);
            continue;
        }

        while let Ok(reset_k_idx) = reset_rx.try_recv() {
            if let Some(slot) = herd.kangaroos().iter().position(|k| k.k_idx == reset_k_idx) {
                debug!(lane = config.lane_index, k_idx = reset_k_idx, "forced reseed");
                herd.reset_at(slot);
            }
        }

        for slot in 0..herd.len() {
            let outcome = step(
                &mut herd.kangaroos_mut()[slot],
                &jump_table,
                config.dp_bits as u32,
                &safety_bound,
            )?;
            match outcome {
                StepOutcome::Continued => {}
                StepOutcome::Emitted(dp) => {
                    local_buffer.push(to_wire_entry(dp));
                    if local_buffer.len() >= LOCAL_BUFFER_FLUSH_THRESHOLD {
                        flush(&runtime, &pipeline, &mut local_buffer);
                    }
                }
                StepOutcome::DeadBranch => herd.reset_at(slot),
            }
        }
    }

    flush(&runtime, &pipeline, &mut local_buffer);
    Ok(())
}

fn flush(runtime: &Handle, pipeline: &Arc<DpPipeline>, buffer: &mut Vec<DpEntry>) {
    if buffer.is_empty() {
        return;
    }
    let drained = std::mem::take(buffer);
    let pipeline = Arc::clone(pipeline);
    runtime.block_on(pipeline.push_batch(drained));
}

fn to_wire_entry(dp: DistinguishedPoint) -> DpEntry {
    DpEntry { x: dp.x, dist: dp.dist, k_idx: dp.k_idx }
}
