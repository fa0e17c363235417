// [apps/miner-worker/src/main.rs]
/*!
 * =================================================================
 * APARATO: WORKER SHELL (V1.0)
 * CLASIFICACIÓN: APPLICATION LAYER (ENTRY POINT)
 * RESPONSABILIDAD: BOOTSTRAP DE CONFIGURACIÓN E IGNICIÓN DEL MOTOR
 * =================================================================
 *
 * Switchboard delgado: parsea la línea de comandos, resuelve un
 * `clientId` estable, y delega el resto a `prospector_miner_lib::engine`.
 * Una sesión que se corta por fallo de red o protocolo se reintenta a
 * granularidad de misión completa, reusando el mismo `Uplink` (§4.J):
 * el particionador del servidor reconoce la reconexión por `clientId`
 * y reemite el mismo rango si la ventana de gracia no ha expirado.
 * Códigos de salida por §6: 0 éxito, 1 uso, 2 E/S, 3 protocolo,
 * 4 apagado sin resultado.
 */

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use prospector_infra_worker_client::Uplink;
use prospector_miner_lib::engine::MinerEngine;
use prospector_miner_lib::errors::WorkerError;
use tracing::{info, warn};

/// Cuántos intentos de misión completa se reintentan antes de rendirse
/// definitivamente (cada intento ya agota su propio backoff de conexión
/// en `Uplink::connect_with_backoff`).
const MAX_MISSION_RETRIES: u32 = 5;

/// Trabajador de la búsqueda distribuida del logaritmo discreto sobre
/// secp256k1: negocia una misión con el servidor y corre lanes de
/// cómputo Pollard-kangaroo hasta que la clave se recupera o el
/// servidor anuncia `STOP`.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct WorkerArgs {
    /// Dirección del servidor (`host` o `host:port`; `17403` por defecto).
    #[arg(short = 'c', long = "connect", env = "PROSPECTOR_SERVER")]
    server_addr: String,

    /// Cantidad de lanes de cómputo (hilos de CPU). Por defecto, todos
    /// los núcleos detectados.
    #[arg(short = 't', long = "threads")]
    thread_count: Option<usize>,

    /// Habilita la búsqueda de kernels GPU (sin implementación en este
    /// árbol; fuera de alcance, preservada por simetría de interfaz).
    #[arg(long = "gpu")]
    gpu: bool,

    /// Índice del dispositivo GPU a usar cuando `--gpu` está presente.
    #[arg(long = "gpu-id", default_value_t = 0)]
    gpu_id: u32,

    /// Archivo donde persistir el `clientId` estable del nodo entre
    /// reinicios, de modo que una reconexión tras un crash recupere el
    /// mismo rango asignado en vez de que el servidor lo trate como un
    /// worker nuevo.
    #[arg(short = 'w', long = "identity", default_value = "worker-identity.bin")]
    identity_path: PathBuf,

    /// Ancho del intervalo de búsqueda en bits, anunciado en el
    /// handshake y validado contra la configuración del servidor.
    #[arg(short = 'n', long = "interval-bits", env = "PROSPECTOR_INTERVAL_BITS")]
    interval_bits: u8,

    /// Período de reescritura del archivo de identidad, en segundos
    /// (mantenido por simetría con la bandera homónima del servidor;
    /// el `clientId` en sí nunca cambia entre reescrituras).
    #[arg(long = "wi", default_value_t = 300)]
    identity_rewrite_interval_secs: u64,
}

fn load_or_create_client_id(path: &PathBuf) -> Result<[u8; 16], WorkerError> {
    if let Ok(bytes) = std::fs::read(path) {
        if bytes.len() == 16 {
            let mut client_id = [0u8; 16];
            client_id.copy_from_slice(&bytes);
            return Ok(client_id);
        }
        warn!(path = %path.display(), "identity file has unexpected length, regenerating");
    }

    let client_id: [u8; 16] = rand::random();
    std::fs::write(path, client_id)?;
    info!(path = %path.display(), "generated a new worker identity");
    Ok(client_id)
}

fn normalize_server_addr(raw: &str) -> String {
    if raw.contains(':') {
        raw.to_string()
    } else {
        format!("{raw}:17403")
    }
}

async fn run(args: WorkerArgs) -> Result<ExitCode, WorkerError> {
    let client_id = load_or_create_client_id(&args.identity_path)?;
    let server_addr = normalize_server_addr(&args.server_addr);
    let lane_count = args.thread_count.unwrap_or_else(num_cpus::get).max(1);

    if args.gpu {
        warn!(gpu_id = args.gpu_id, "GPU lanes were requested but this build carries no GPU kernel; falling back to CPU lanes only");
    }

    let uplink = Uplink::new(server_addr, client_id, args.interval_bits);
    let running = Arc::new(AtomicBool::new(true));

    let identity_rewrite_task = {
        let identity_path = args.identity_path.clone();
        let interval_secs = args.identity_rewrite_interval_secs;
        let running = Arc::clone(&running);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
            while running.load(Ordering::Relaxed) {
                interval.tick().await;
                if std::fs::write(&identity_path, client_id).is_err() {
                    warn!(path = %identity_path.display(), "failed to rewrite identity file");
                }
            }
        })
    };

    let shutdown_signal = {
        let running = Arc::clone(&running);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("shutdown requested, draining compute lanes");
                running.store(false, Ordering::SeqCst);
            }
        })
    };

    let mut attempts = 0u32;
    let outcome = loop {
        attempts += 1;
        let engine = MinerEngine::new(uplink.clone(), lane_count, Arc::clone(&running));
        match engine.run().await {
            Ok(found) => break Ok(found),
            Err(error) if !running.load(Ordering::Relaxed) => break Err(error),
            Err(error) if attempts >= MAX_MISSION_RETRIES => break Err(error),
            Err(error) => {
                warn!(%error, attempt = attempts, "mission session dropped, reconnecting with the same identity");
            }
        }
    };
    shutdown_signal.abort();
    identity_rewrite_task.abort();

    match outcome {
        Ok(Some(found_key)) => {
            info!(scalar = %hex::encode(found_key), "key recovered");
            Ok(ExitCode::from(0))
        }
        Ok(None) => {
            info!("shutting down without a result");
            Ok(ExitCode::from(4))
        }
        Err(error) => Err(error),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    prospector_shared_heimdall::init_tracing("prospector-miner");
    let args = WorkerArgs::parse();

    match run(args).await {
        Ok(code) => code,
        Err(error) => {
            tracing::error!(%error, "fatal error");
            ExitCode::from(error.exit_code() as u8)
        }
    }
}
