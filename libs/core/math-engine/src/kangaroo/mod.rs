// INICIO DEL ARCHIVO [libs/core/math-engine/src/kangaroo/mod.rs]
//! =================================================================
//! APARATO: KANGAROO ENGINE (V1.0)
//! CLASIFICACIÓN: CORE MATH (ESTRATO L1)
//! RESPONSABILIDAD: MOTOR DE SALTOS PSEUDOALEATORIOS SOBRE SECP256K1
//! =================================================================
//!
//! Agrupa los tres componentes de primer nivel del motor de búsqueda
//! distribuida: la tabla de saltos (`jump_table`), el paso de caminata
//! (`walk`) y el ciclo de vida de las poblaciones tame/wild (`herd`).

pub mod herd;
pub mod jump_table;
pub mod walk;

pub use herd::{Herd, HerdKind, Kangaroo};
pub use jump_table::{JumpTable, JumpTableEntry, JUMP_TABLE_SIZE};
pub use walk::{
    compute_safety_bound, is_distinguished, step, DistinguishedPoint, StepOutcome,
    DEFAULT_SAFETY_FACTOR, USE_SYMMETRY,
};
// FIN DEL ARCHIVO [libs/core/math-engine/src/kangaroo/mod.rs]
