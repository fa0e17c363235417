// [apps/server/src/checkpoint.rs]
//! Persistencia periódica del estado del servidor (`-wi`). Traduce entre
//! el store en memoria y el formato binario de
//! `prospector_infra_transport::CheckpointFile` (§6), escrito
//! atómicamente por write-to-temp + rename. Las asignaciones de rango
//! viven en un archivo lateral JSON junto al checkpoint binario: el
//! formato de cable de §6 fija exactamente la cabecera y las cubetas del
//! DP store y no deja espacio para `WorkRange`, así que se persisten por
//! separado con el mismo `serde`/`serde_json` que ya trae el dominio.

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use prospector_infra_transport::{CheckpointBucket, CheckpointFile, DpEntry};
use tracing::{error, info};

use crate::errors::ServerError;
use crate::state::AppState;

fn ranges_sidecar_path(checkpoint_path: &Path) -> PathBuf {
    checkpoint_path.with_extension("ranges.json")
}

/// Construye el checkpoint binario actual a partir del store y lo escribe
/// atómicamente, junto con el sidecar de asignaciones de rango.
pub fn write_checkpoint(state: &AppState, destination: &Path) -> Result<(), ServerError> {
    let buckets = state
        .store
        .snapshot_non_empty_buckets()
        .into_iter()
        .map(|(bucket_index, entries)| CheckpointBucket {
            bucket_index,
            entries: entries
                .into_iter()
                .map(|entry| DpEntry { x: entry.x, dist: entry.dist, k_idx: entry.k_idx })
                .collect(),
        })
        .collect();

    let checkpoint = CheckpointFile {
        interval_bits: state.config.interval_bits,
        dp_bits: state.config.dp_bits,
        target_x: state.config.target.x_bytes(),
        target_y: state.config.target.y_bytes(),
        wild_offset: state.config.wild_offset,
        buckets,
    };
    checkpoint.write_atomically(destination)?;

    let ranges = state.partitioner.snapshot();
    let ranges_json = serde_json::to_vec_pretty(&ranges)
        .map_err(|e| ServerError::Usage(format!("failed to serialize work ranges: {e}")))?;
    std::fs::write(ranges_sidecar_path(destination), ranges_json)?;

    Ok(())
}

/// Carga un checkpoint previo, reinsertando cada cubeta en el store.
/// Las asignaciones de rango del sidecar NO se restauran como ocupadas:
/// el particionador las vuelve a repartir desde cero conforme los
/// workers reconectan, evitando reasignar a un `ClientId` que pudo no
/// volver jamás.
pub fn load_checkpoint(state: &AppState, source: &Path) -> Result<(), ServerError> {
    let checkpoint = CheckpointFile::read_from(source)?;

    if checkpoint.interval_bits != state.config.interval_bits
        || checkpoint.dp_bits != state.config.dp_bits
        || checkpoint.target_x != state.config.target.x_bytes()
        || checkpoint.wild_offset != state.config.wild_offset
    {
        return Err(ServerError::Usage(
            "checkpoint parameters do not match the current mission target".to_string(),
        ));
    }

    let mut restored_entries = 0usize;
    for bucket in checkpoint.buckets {
        restored_entries += bucket.entries.len();
        let entries = bucket
            .entries
            .into_iter()
            .map(|e| prospector_core_dpstore::Entry { x: e.x, dist: e.dist, k_idx: e.k_idx })
            .collect();
        state.store.restore(bucket.bucket_index, entries);
    }

    info!(restored_entries, path = %source.display(), "resumed from checkpoint");
    Ok(())
}

/// Tarea periódica de escritura de checkpoint (`-wi` segundos). No hace
/// nada si el servidor no recibió una ruta de checkpoint en la línea de
/// comandos.
pub async fn run_checkpoint_loop(state: Arc<AppState>) {
    let Some(destination) = state.config.checkpoint_path.clone() else {
        return;
    };
    let mut ticker = tokio::time::interval(Duration::from_secs(state.config.checkpoint_interval_secs));

    loop {
        ticker.tick().await;
        if !state.running.load(Ordering::Relaxed) || state.is_found() {
            return;
        }
        if let Err(error) = write_checkpoint(&state, &destination) {
            error!(%error, "periodic checkpoint write failed");
        } else {
            info!(path = %destination.display(), "checkpoint written");
        }
    }
}
