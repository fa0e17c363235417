// [apps/server/src/partitioner.rs]
//! Particionador de trabajo (§4.F): talla el intervalo `[0, 2^n)` en
//! sub-rangos y los reparte entre los workers conectados. Sigue el mismo
//! patrón de cola única bajo un solo `Mutex` que el manejador de misiones
//! de referencia (`_grounding_reference/mission_control.rs.ref`:
//! `Mutex<VecDeque<WorkOrder>>` con `pull_assignment`/`rollback_mission`),
//! generalizado de una cola de misiones homogéneas a sub-rangos de ancho
//! fijo con reclamo por vencimiento de gracia.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use prospector_core_math::prelude::{add_u256_be, compare_u256_be};
use prospector_domain_models::{ClientId, WorkRange};
use std::sync::Mutex;

/// Trabajadores esperados por defecto al estimar el ancho de sub-rango.
/// Decisión de diseño (sin bandera CLI dedicada en §6): cuatro bits de
/// "overshoot" sobre un paralelismo esperado de 16 workers mantiene los
/// rangos lo bastante pequeños para repartirse entre reconexiones sin
/// fragmentar el intervalo en exceso para `n` pequeños.
const ASSUMED_WORKER_COUNT_LOG2: u8 = 4;
const OVERSHOOT_FACTOR_BITS: u8 = 2;

struct AssignedRange {
    range: WorkRange,
    last_seen: Instant,
}

struct Inner {
    /// Siguiente límite del intervalo aún no tallado en un sub-rango.
    next_cursor: [u8; 32],
    /// Límite superior del intervalo completo, `2^n`.
    interval_end: [u8; 32],
    /// Ancho fijo de cada sub-rango recién tallado.
    sub_range_width: [u8; 32],
    /// Rangos abandonados (gracia vencida) disponibles para reasignación,
    /// en orden FIFO — el mismo patrón de cola que `pull_assignment`.
    reclaimed: VecDeque<WorkRange>,
    /// Rangos actualmente en manos de un worker, por `ClientId`.
    assigned: HashMap<ClientId, AssignedRange>,
}

/// El particionador de rangos de trabajo del servidor.
pub struct Partitioner {
    inner: Mutex<Inner>,
    grace_period: Duration,
}

fn two_pow(bits: u8) -> [u8; 32] {
    let mut value = [0u8; 32];
    if bits < 256 {
        let byte_index = 31 - (bits / 8) as usize;
        value[byte_index] = 1u8 << (bits % 8);
    }
    value
}

impl Partitioner {
    /// Crea un particionador nuevo para un intervalo `[0, 2^interval_bits)`.
    #[must_use]
    pub fn new(interval_bits: u8, grace_period: Duration) -> Self {
        let sub_range_bits = interval_bits
            .saturating_sub(ASSUMED_WORKER_COUNT_LOG2)
            .saturating_sub(OVERSHOOT_FACTOR_BITS)
            .max(1);

        Self {
            inner: Mutex::new(Inner {
                next_cursor: [0u8; 32],
                interval_end: two_pow(interval_bits),
                sub_range_width: two_pow(sub_range_bits),
                reclaimed: VecDeque::new(),
                assigned: HashMap::new(),
            }),
            grace_period,
        }
    }

    /// Asigna (o reasigna) un rango a `client_id`. Un worker que reconecta
    /// antes de que su gracia venza recibe exactamente el mismo rango
    /// (§4.F: "reissue the range by workerId if still uncompleted");
    /// en caso contrario recibe un rango reclamado o uno recién tallado.
    pub fn assign(&self, client_id: ClientId) -> Option<WorkRange> {
        let mut inner = self.inner.lock().expect("partitioner mutex poisoned");

        if let Some(existing) = inner.assigned.get_mut(&client_id) {
            existing.last_seen = Instant::now();
            return Some(existing.range.clone());
        }

        let range = if let Some(reclaimed) = inner.reclaimed.pop_front() {
            reclaimed
        } else if compare_u256_be(&inner.next_cursor, &inner.interval_end) == std::cmp::Ordering::Less {
            let start = inner.next_cursor;
            let mut end = add_u256_be(&start, &inner.sub_range_width).unwrap_or(inner.interval_end);
            if compare_u256_be(&end, &inner.interval_end) != std::cmp::Ordering::Less {
                end = inner.interval_end;
            }
            inner.next_cursor = end;
            WorkRange::unassigned(start, end)
        } else {
            // El intervalo entero ya fue tallado y nada quedó por reclamar:
            // no hay trabajo nuevo que ofrecer a este worker.
            return None;
        };

        let mut assigned_range = range;
        assigned_range.assigned_to = Some(client_id);
        inner.assigned.insert(
            client_id,
            AssignedRange { range: assigned_range.clone(), last_seen: Instant::now() },
        );
        Some(assigned_range)
    }

    /// Registra progreso de `client_id`, refrescando su ventana de gracia.
    pub fn mark_progress(&self, client_id: ClientId, completed_fraction: f64) {
        let mut inner = self.inner.lock().expect("partitioner mutex poisoned");
        if let Some(existing) = inner.assigned.get_mut(&client_id) {
            existing.last_seen = Instant::now();
            existing.range.completed_fraction = completed_fraction;
        }
    }

    /// Recorre las asignaciones vivas y reclama aquellas cuya gracia venció
    /// sin progreso reportado, dejándolas disponibles para el próximo
    /// worker que pida trabajo (§5: "a worker that has not reported
    /// progress within T_grace loses its range").
    pub fn sweep_expired(&self) -> usize {
        let mut inner = self.inner.lock().expect("partitioner mutex poisoned");
        let grace_period = self.grace_period;
        let expired: Vec<ClientId> = inner
            .assigned
            .iter()
            .filter(|(_, assigned)| assigned.last_seen.elapsed() > grace_period)
            .map(|(client_id, _)| *client_id)
            .collect();

        let count = expired.len();
        for client_id in expired {
            if let Some(mut assigned) = inner.assigned.remove(&client_id) {
                assigned.range.assigned_to = None;
                inner.reclaimed.push_back(assigned.range);
            }
        }
        count
    }

    /// Instantánea de todos los rangos conocidos (asignados + reclamados),
    /// usada al escribir el checkpoint de asignaciones.
    pub fn snapshot(&self) -> Vec<WorkRange> {
        let inner = self.inner.lock().expect("partitioner mutex poisoned");
        let mut ranges: Vec<WorkRange> =
            inner.assigned.values().map(|a| a.range.clone()).collect();
        ranges.extend(inner.reclaimed.iter().cloned());
        ranges
    }
}
