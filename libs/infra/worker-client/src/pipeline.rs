// [libs/infra/worker-client/src/pipeline.rs]
/*!
 * =================================================================
 * APARATO: ASYNC DP PIPELINE
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: DESACOPLE PRODUCTOR/CONSUMIDOR DE PUNTOS DISTINGUIDOS
 *
 * Las líneas de cómputo empujan lotes de DPs bajo un único lock; el
 * emisor de red los drena con una ventana de coalescencia (`batchingDelay`)
 * para amortizar el costo de un FRAME por DP. `requestShutdown` hace que
 * `pop_batch` retorne vacío una vez drenada la cola, sin perder entradas
 * en tránsito.
 * =================================================================
 */

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, Notify};

use prospector_infra_transport::DpEntry;

/// Ventana de coalescencia por defecto para `pop_batch`.
pub const DEFAULT_BATCHING_DELAY: Duration = Duration::from_millis(50);

struct Inner {
    queue: Mutex<VecDeque<DpEntry>>,
    notify: Notify,
    shutting_down: AtomicBool,
    total_pushed: AtomicU64,
    total_popped: AtomicU64,
}

/// Cola FIFO protegida por lock que desacopla las líneas de cómputo
/// (productoras) del emisor de red (consumidor único).
pub struct DpPipeline {
    inner: Inner,
}

impl DpPipeline {
    /// Crea una tubería vacía.
    pub fn new() -> Self {
        Self {
            inner: Inner {
                queue: Mutex::new(VecDeque::new()),
                notify: Notify::new(),
                shutting_down: AtomicBool::new(false),
                total_pushed: AtomicU64::new(0),
                total_popped: AtomicU64::new(0),
            },
        }
    }

    /// Encola un lote de DPs bajo una única adquisición de lock y
    /// despierta al consumidor. No bloquea más allá de esa adquisición.
    pub async fn push_batch(&self, dps: Vec<DpEntry>) {
        if dps.is_empty() {
            return;
        }
        let count = dps.len() as u64;
        {
            let mut queue = self.inner.queue.lock().await;
            queue.extend(dps);
        }
        self.inner.total_pushed.fetch_add(count, Ordering::Relaxed);
        self.inner.notify.notify_waiters();
    }

    /// Espera hasta `timeout` por el primer elemento, drena hasta
    /// `max_count` elementos, y si el lote no está lleno espera hasta una
    /// vez más `batching_delay` para coalescer más llegadas, repitiendo
    /// hasta llenarse o hasta que la ventana transcurra sin nuevas
    /// llegadas. Retorna vacío (sin esperar) una vez que `request_shutdown`
    /// fue invocado y la cola está drenada.
    pub async fn pop_batch(
        &self,
        max_count: usize,
        timeout: Duration,
        batching_delay: Duration,
    ) -> Vec<DpEntry> {
        let mut batch = self.drain_up_to(max_count).await;
        if !batch.is_empty() || self.is_shutting_down() {
            self.record_popped(&batch);
            return batch;
        }

        if !self.wait_for_first_item(timeout).await {
            return batch;
        }
        batch.extend(self.drain_up_to(max_count - batch.len()).await);

        while batch.len() < max_count {
            if !self.wait_for_first_item(batching_delay).await {
                break;
            }
            let more = self.drain_up_to(max_count - batch.len()).await;
            if more.is_empty() {
                break;
            }
            batch.extend(more);
        }

        self.record_popped(&batch);
        batch
    }

    /// Marca la tubería para apagado: `pop_batch` deja de bloquear y
    /// retorna vacío tan pronto como la cola quede drenada.
    pub fn request_shutdown(&self) {
        self.inner.shutting_down.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Cantidad total de DPs encolados a lo largo de la vida de la tubería.
    pub fn total_pushed(&self) -> u64 {
        self.inner.total_pushed.load(Ordering::Relaxed)
    }

    /// Cantidad total de DPs drenados a lo largo de la vida de la tubería.
    pub fn total_popped(&self) -> u64 {
        self.inner.total_popped.load(Ordering::Relaxed)
    }

    /// Profundidad actual de la cola (para la invariante de conservación:
    /// `total_pushed == total_popped + queue_depth`).
    pub async fn queue_depth(&self) -> usize {
        self.inner.queue.lock().await.len()
    }

    fn is_shutting_down(&self) -> bool {
        self.inner.shutting_down.load(Ordering::SeqCst)
    }

    fn record_popped(&self, batch: &[DpEntry]) {
        if !batch.is_empty() {
            self.inner
                .total_popped
                .fetch_add(batch.len() as u64, Ordering::Relaxed);
        }
    }

    async fn drain_up_to(&self, max_count: usize) -> Vec<DpEntry> {
        if max_count == 0 {
            return Vec::new();
        }
        let mut queue = self.inner.queue.lock().await;
        let take = max_count.min(queue.len());
        queue.drain(..take).collect()
    }

    /// Espera hasta `window` por una notificación de nueva llegada o de
    /// apagado. Retorna `true` si hay motivo para volver a drenar.
    async fn wait_for_first_item(&self, window: Duration) -> bool {
        if self.is_shutting_down() {
            return !self.inner.queue.lock().await.is_empty();
        }
        if !self.inner.queue.lock().await.is_empty() {
            return true;
        }
        let notified = self.inner.notify.notified();
        let _ = tokio::time::timeout(window, notified).await;
        self.is_shutting_down() || !self.inner.queue.lock().await.is_empty()
    }
}

impl Default for DpPipeline {
    fn default() -> Self {
        Self::new()
    }
}
