// [apps/server/src/main.rs]
/*!
 * =================================================================
 * APARATO: SERVER SHELL (V1.0)
 * CLASIFICACIÓN: APPLICATION LAYER (ENTRY POINT)
 * RESPONSABILIDAD: BOOTSTRAP DE CONFIGURACIÓN E IGNICIÓN DEL FRONTEND
 * =================================================================
 *
 * Switchboard delgado: parsea la línea de comandos y el archivo objetivo,
 * construye el `AppState`, y delega el resto a `prospector_server::*`.
 * Códigos de salida por §6: 0 éxito, 1 uso, 2 E/S, 3 protocolo,
 * 4 apagado sin resultado.
 */

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use clap::Parser;
use prospector_core_math::prelude::SafePublicKey;
use prospector_server::checkpoint::{load_checkpoint, run_checkpoint_loop, write_checkpoint};
use prospector_server::listener::run_accept_loop;
use prospector_server::partitioner::Partitioner;
use prospector_server::stats::run_stats_loop;
use prospector_server::state::{AppState, MissionConfig};
use prospector_server::ServerError;
use tracing::{info, warn};

/// Servidor de la búsqueda distribuida del logaritmo discreto sobre
/// secp256k1: acepta workers, encamina sus puntos distinguidos, y
/// persiste progreso.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct ServerArgs {
    /// Habilita el modo servidor (requerido; existe por simetría con el
    /// binario cliente, que comparte el mismo estilo de banderas, §6).
    #[arg(short = 's', long = "server")]
    server: bool,

    /// Puerto de escucha del frontend TCP.
    #[arg(short = 'p', long = "sp", default_value_t = 17403)]
    port: u16,

    /// Dificultad de punto distinguido, en bits.
    #[arg(short = 'd', long = "dp-bits", default_value_t = 20)]
    dp_bits: u8,

    /// Archivo de checkpoint a cargar al arrancar y a reescribir periódicamente.
    #[arg(short = 'w', long = "checkpoint")]
    checkpoint_path: Option<PathBuf>,

    /// Periodo de reescritura del checkpoint, en segundos.
    #[arg(long = "wi", default_value_t = 300)]
    checkpoint_interval_secs: u64,

    /// Ruta donde escribir la clave recuperada.
    #[arg(short = 'o', long = "out")]
    result_path: Option<PathBuf>,

    /// Ventana de gracia antes de reasignar el rango de un worker caído, en segundos.
    #[arg(long = "grace", default_value_t = 120)]
    grace_period_secs: u64,

    /// Periodo del log de estadísticas, en segundos.
    #[arg(long = "stats-interval", default_value_t = 10)]
    stats_interval_secs: u64,

    /// Archivo objetivo: una primera línea con `N` (ancho del intervalo en
    /// bits) y una segunda línea con el punto público `P` en hexadecimal
    /// SEC1 (comprimido o no).
    target_file: PathBuf,
}

fn parse_target_file(path: &PathBuf) -> Result<(u8, SafePublicKey), ServerError> {
    let contents = std::fs::read_to_string(path)?;
    let mut lines = contents.lines().map(str::trim).filter(|l| !l.is_empty());

    let interval_bits: u8 = lines
        .next()
        .ok_or_else(|| ServerError::Usage("target file is missing the interval width line".into()))?
        .parse()
        .map_err(|_| ServerError::Usage("interval width line is not a valid integer".into()))?;

    let public_key_hex = lines
        .next()
        .ok_or_else(|| ServerError::Usage("target file is missing the public key line".into()))?;
    let public_key_bytes = hex::decode(public_key_hex)
        .map_err(|_| ServerError::Usage("public key line is not valid hexadecimal".into()))?;
    let target = SafePublicKey::from_bytes(&public_key_bytes)?;

    Ok((interval_bits, target))
}

fn compute_wild_offset(interval_bits: u8) -> [u8; 32] {
    // Punto medio del intervalo: 2^(n-1), el desplazamiento estándar de
    // §3 ("WildOffset ... commonly 2^(n-1)").
    let midpoint_bit = interval_bits.saturating_sub(1);
    let mut offset = [0u8; 32];
    if midpoint_bit < 256 {
        let byte_index = 31 - (midpoint_bit / 8) as usize;
        offset[byte_index] = 1u8 << (midpoint_bit % 8);
    }
    offset
}

async fn run(args: ServerArgs) -> Result<ExitCode, ServerError> {
    if !args.server {
        return Err(ServerError::Usage("pass -s to enable server mode".into()));
    }

    let (interval_bits, target) = parse_target_file(&args.target_file)?;
    let wild_offset = compute_wild_offset(interval_bits);

    let partitioner = Partitioner::new(interval_bits, std::time::Duration::from_secs(args.grace_period_secs));

    let config = MissionConfig {
        interval_bits,
        dp_bits: args.dp_bits,
        target,
        wild_offset,
        grace_period_secs: args.grace_period_secs,
        stats_interval_secs: args.stats_interval_secs,
        checkpoint_interval_secs: args.checkpoint_interval_secs,
        checkpoint_path: args.checkpoint_path.clone(),
        result_path: args.result_path.clone(),
    };
    let state = Arc::new(AppState::new(config, partitioner));

    if let Some(checkpoint_path) = &args.checkpoint_path {
        if checkpoint_path.exists() {
            load_checkpoint(&state, checkpoint_path)?;
        }
    }

    let shutdown_signal = {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("shutdown requested, draining workers");
                state.running.store(false, Ordering::SeqCst);
            }
        })
    };

    let accept_task = tokio::spawn(run_accept_loop(args.port, Arc::clone(&state)));
    let stats_task = tokio::spawn(run_stats_loop(Arc::clone(&state)));
    let checkpoint_task = tokio::spawn(run_checkpoint_loop(Arc::clone(&state)));

    let accept_result = accept_task.await.expect("accept loop task panicked");
    state.running.store(false, Ordering::SeqCst);
    shutdown_signal.abort();
    stats_task.abort();
    checkpoint_task.abort();
    accept_result?;

    if let Some(checkpoint_path) = &args.checkpoint_path {
        write_checkpoint(&state, checkpoint_path)?;
    }

    if let Some(found) = *state.found_key.lock().expect("found_key mutex poisoned") {
        info!(scalar = %hex::encode(found), "key recovered, writing result");
        if let Some(result_path) = &args.result_path {
            std::fs::write(result_path, hex::encode(found))?;
        }
        return Ok(ExitCode::from(0));
    }

    info!("shutting down without a result");
    Ok(ExitCode::from(4))
}

#[tokio::main]
async fn main() -> ExitCode {
    prospector_shared_heimdall::init_tracing("prospector-server");
    let args = ServerArgs::parse();

    match run(args).await {
        Ok(code) => code,
        Err(error) => {
            tracing::error!(%error, "fatal error");
            ExitCode::from(error.exit_code() as u8)
        }
    }
}
