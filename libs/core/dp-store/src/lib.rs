// INICIO DEL ARCHIVO [libs/core/dp-store/src/lib.rs]
//! =================================================================
//! APARATO: DISTINGUISHED POINT STORE (V1.0)
//! CLASIFICACIÓN: CORE STORE (ESTRATO L1)
//! =================================================================
//!
//! Tabla hash concurrente, sharded, que recibe puntos distinguidos de
//! todos los workers conectados y detecta colisiones entre herds tame
//! y wild. El almacenamiento por cubeta y la resolución de colisiones
//! viven en módulos separados para que la política de concurrencia
//! (`store`) no se mezcle con la política de orden/igualdad (`bucket`)
//! ni con la aritmética de recuperación de clave (`resolver`).
#![deny(missing_docs)]

/// Orden dentro de una cubeta y política de colisión mismo-herd/herd-cruzado.
pub mod bucket;
/// Errores de invariante del store (distintos de una colisión espuria).
pub mod errors;
/// Reconstrucción y verificación del escalar a partir de una colisión.
pub mod resolver;
/// El store sharded concurrente y su API pública `add`.
pub mod store;

pub use bucket::{Entry, HashBucket};
pub use errors::StoreError;
pub use prospector_core_math::kangaroo::HerdKind;
pub use resolver::{resolve, RecoveredKey, WrongCollision};
pub use store::{AddOutcome, DpStore, DEFAULT_INDEX_BITS, DEFAULT_SHARD_COUNT};
// FIN DEL ARCHIVO [libs/core/dp-store/src/lib.rs]
