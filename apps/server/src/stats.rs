// [apps/server/src/stats.rs]
//! Tarea periódica de estadísticas y mantenimiento (§4.G: "Periodic
//! statistics (every 10 s)"). Estructurada como el ticker de
//! `_grounding_reference/reaper.rs.ref` (`tokio::spawn` envolviendo un
//! `tokio::time::interval`), generalizado de purga de telemetría a log
//! de totales del motor de búsqueda más el barrido de gracia del
//! particionador, que comparte el mismo ciclo de mantenimiento.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::state::AppState;

/// Lanza la tarea de estadísticas; retorna cuando `running` cae o el
/// motor alcanza `FOUND`.
pub async fn run_stats_loop(state: Arc<AppState>) {
    let mut ticker = tokio::time::interval(Duration::from_secs(state.config.stats_interval_secs));

    loop {
        ticker.tick().await;
        if !state.running.load(Ordering::Relaxed) || state.is_found() {
            return;
        }

        let dps_received = state.telemetry.dps_received.load(Ordering::Relaxed);
        let ops_reported = state.telemetry.ops_reported.load(Ordering::Relaxed);
        let total_added = state.store.total_added();
        let tame_added = state.store.total_tame_added();
        let wild_added = state.store.total_wild_added();
        let same_herd_collisions = state.store.total_same_herd_collisions();
        let occupied_buckets = state.store.occupied_bucket_count();
        let non_empty_shards =
            state.store.occupancy_histogram().iter().filter(|&&count| count > 0).count();

        info!(
            dps_received,
            ops_reported,
            total_added,
            tame_added,
            wild_added,
            same_herd_collisions,
            occupied_buckets,
            non_empty_shards,
            "search engine statistics"
        );

        let reclaimed = state.partitioner.sweep_expired();
        if reclaimed > 0 {
            info!(reclaimed, "reclaimed work ranges past grace period");
        }
    }
}
