// INICIO DEL ARCHIVO [libs/core/dp-store/src/store.rs]
//! =================================================================
//! APARATO: SHARDED DP STORE (V1.0)
//! CLASIFICACIÓN: CORE STORE (ESTRATO L1)
//! RESPONSABILIDAD: MAPA CONCURRENTE FINGERPRINT -> CUBETA
//! =================================================================
//!
//! Sharding por los bits altos del índice de cubeta, cada shard protegido
//! por su propio `RwLock`, siguiendo el patrón de
//! `prospector-core-probabilistic::sharded::ShardedFilter` (un
//! `Vec<RwLock<_>>` con ruteo determinista por índice y contadores
//! atómicos) generalizado de un filtro de Bloom de ancho fijo a cubetas
//! de tamaño variable.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::bucket::{BucketInsertOutcome, Entry, HashBucket};

/// Bits usados para seleccionar la cubeta dentro de `x` (H ≈ 18-22 per §3).
pub const DEFAULT_INDEX_BITS: u32 = 20;

/// Número de shards de primer nivel (potencia de dos, per la nota de diseño
/// "Concurrent hash table").
pub const DEFAULT_SHARD_COUNT: usize = 256;

/// Resultado cerrado y etiquetado de `Add`, per la nota de diseño
/// "Variant entry kinds": nunca códigos enteros sin tipar.
#[derive(Debug, Clone, Copy)]
pub enum AddOutcome {
    /// No había coincidencia de `x`; la entrada quedó insertada.
    AddOk,
    /// Coincidencia de `x` con el mismo herd (duplicado exacto o mismo-herd
    /// con distancias distintas; en ambos casos no hay evento de colisión).
    SameHerdDuplicate,
    /// Coincidencia de `x` con herd distinto: el evento ganador.
    CrossHerdCollision {
        /// La entrada del herd tame.
        tame: Entry,
        /// La entrada del herd wild.
        wild: Entry,
    },
}

struct Shard {
    buckets: RwLock<HashMap<u32, HashBucket>>,
    same_herd_collisions: AtomicU64,
    tame_added: AtomicU64,
    wild_added: AtomicU64,
}

impl Shard {
    fn new() -> Self {
        Self {
            buckets: RwLock::new(HashMap::new()),
            same_herd_collisions: AtomicU64::new(0),
            tame_added: AtomicU64::new(0),
            wild_added: AtomicU64::new(0),
        }
    }
}

/// El store de puntos distinguidos: un mapa concurrente, sharded, de
/// fingerprint (bits altos de `x`) a cubeta ordenada.
pub struct DpStore {
    shards: Vec<Shard>,
    index_bits: u32,
    shard_selector_shift: u32,
    total_added: AtomicU64,
}

impl DpStore {
    /// Construye un store con `shard_count` shards (debe ser potencia de
    /// dos) y `index_bits` bits de índice de cubeta.
    #[must_use]
    pub fn new(shard_count: usize, index_bits: u32) -> Self {
        assert!(shard_count.is_power_of_two(), "shard_count must be a power of two");
        assert!(index_bits > 0 && index_bits <= 32, "index_bits must fit a u32 bucket index");

        let shard_bits = shard_count.trailing_zeros();
        assert!(shard_bits <= index_bits, "cannot shard on more bits than the bucket index has");

        let mut shards = Vec::with_capacity(shard_count);
        shards.resize_with(shard_count, Shard::new);

        Self {
            shards,
            index_bits,
            shard_selector_shift: index_bits - shard_bits,
            total_added: AtomicU64::new(0),
        }
    }

    /// Construye un store con la configuración por defecto (256 shards, H=20).
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_SHARD_COUNT, DEFAULT_INDEX_BITS)
    }

    fn bucket_index(&self, x: &[u8; 32]) -> u32 {
        let top_bits = u32::from_be_bytes([x[0], x[1], x[2], x[3]]);
        top_bits >> (32 - self.index_bits)
    }

    fn shard_index(&self, bucket_idx: u32) -> usize {
        (bucket_idx >> self.shard_selector_shift) as usize
    }

    /// Inserta un punto distinguido. Thread-safe: como máximo un hilo
    /// mantiene el lock de un shard dado a la vez (§5).
    pub fn add(&self, x: [u8; 32], dist: [u8; 32], k_idx: u64) -> AddOutcome {
        let bucket_idx = self.bucket_index(&x);
        let shard = &self.shards[self.shard_index(bucket_idx)];
        let candidate = Entry { x, dist, k_idx };

        let mut buckets = shard.buckets.write().expect("dp store shard lock poisoned");
        let bucket = buckets.entry(bucket_idx).or_default();
        let outcome = bucket.insert(candidate);

        match outcome {
            BucketInsertOutcome::Inserted => {
                self.total_added.fetch_add(1, Ordering::Relaxed);
                match candidate.herd() {
                    crate::HerdKind::Tame => shard.tame_added.fetch_add(1, Ordering::Relaxed),
                    crate::HerdKind::Wild => shard.wild_added.fetch_add(1, Ordering::Relaxed),
                };
                AddOutcome::AddOk
            }
            BucketInsertOutcome::ExactDuplicate => AddOutcome::SameHerdDuplicate,
            BucketInsertOutcome::SameHerdCollision { .. } => {
                shard.same_herd_collisions.fetch_add(1, Ordering::Relaxed);
                AddOutcome::SameHerdDuplicate
            }
            BucketInsertOutcome::CrossHerdCollision { existing } => {
                let (tame, wild) = if existing.herd() == crate::HerdKind::Tame {
                    (existing, candidate)
                } else {
                    (candidate, existing)
                };
                AddOutcome::CrossHerdCollision { tame, wild }
            }
        }
    }

    /// Total de entradas nuevas insertadas (no reenvíos ni colisiones).
    #[must_use]
    pub fn total_added(&self) -> u64 {
        self.total_added.load(Ordering::Relaxed)
    }

    /// Suma de colisiones de mismo herd across todos los shards.
    #[must_use]
    pub fn total_same_herd_collisions(&self) -> u64 {
        self.shards.iter().map(|s| s.same_herd_collisions.load(Ordering::Relaxed)).sum()
    }

    /// Histograma de ocupación: número de cubetas no vacías por shard.
    #[must_use]
    pub fn occupied_bucket_count(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.buckets.read().expect("dp store shard lock poisoned").len())
            .sum()
    }

    /// Histograma de ocupación por shard, usado por el log de estadísticas
    /// periódico del servidor (§4.G): uno de los puntos de la tupla
    /// "totals" que la especificación del frontend pide reportar.
    #[must_use]
    pub fn occupancy_histogram(&self) -> Vec<usize> {
        self.shards
            .iter()
            .map(|s| s.buckets.read().expect("dp store shard lock poisoned").len())
            .collect()
    }

    /// Total de entradas TAME insertadas across todos los shards.
    #[must_use]
    pub fn total_tame_added(&self) -> u64 {
        self.shards.iter().map(|s| s.tame_added.load(Ordering::Relaxed)).sum()
    }

    /// Total de entradas WILD insertadas across todos los shards.
    #[must_use]
    pub fn total_wild_added(&self) -> u64 {
        self.shards.iter().map(|s| s.wild_added.load(Ordering::Relaxed)).sum()
    }

    /// Itera todas las entradas almacenadas agrupadas por índice de cubeta,
    /// en el orden que espera el escritor de checkpoint (§6): `(bucketIdx,
    /// entries)` para cada cubeta no vacía.
    pub fn snapshot_non_empty_buckets(&self) -> Vec<(u32, Vec<Entry>)> {
        let mut snapshot = Vec::new();
        for shard in &self.shards {
            let buckets = shard.buckets.read().expect("dp store shard lock poisoned");
            for (bucket_idx, bucket) in buckets.iter() {
                if !bucket.is_empty() {
                    snapshot.push((*bucket_idx, bucket.entries().to_vec()));
                }
            }
        }
        snapshot.sort_by_key(|(idx, _)| *idx);
        snapshot
    }

    /// Recarga entradas desde un checkpoint, reinsertándolas bucket por
    /// bucket. Usado al reanudar desde disco.
    pub fn restore(&self, bucket_idx: u32, entries: Vec<Entry>) {
        let shard = &self.shards[self.shard_index(bucket_idx)];
        let mut buckets = shard.buckets.write().expect("dp store shard lock poisoned");
        let bucket = buckets.entry(bucket_idx).or_default();
        for entry in entries {
            bucket.insert(entry);
        }
        self.total_added.fetch_add(bucket.len() as u64, Ordering::Relaxed);
    }
}

// FIN DEL ARCHIVO [libs/core/dp-store/src/store.rs]
