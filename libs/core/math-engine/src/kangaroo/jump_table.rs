// INICIO DEL ARCHIVO [libs/core/math-engine/src/kangaroo/jump_table.rs]
//! =================================================================
//! APARATO: JUMP TABLE BUILDER (V1.0)
//! CLASIFICACIÓN: CORE MATH / KANGAROO (ESTRATO L1)
//! RESPONSABILIDAD: PRECÓMPUTO DE LOS 32 SALTOS DETERMINISTAS
//! =================================================================
//!
//! Construye la tabla fija de 32 saltos `g_i = 2^i · G`, `d_i = 2^i`,
//! `i = 0..31`. El selector de salto en cada paso del motor de caminata
//! toma los 5 bits bajos de la coordenada X actual, de modo que la
//! secuencia de saltos de un kangaroo es determinista a partir de su
//! posición inicial.

use crate::errors::MathError;
use crate::public_key::SafePublicKey;

/// Número de saltos precomputados. Mantiene la progresión media de salto
/// cerca de `2^16`, el punto dulce para un trabajo esperado de
/// `sqrt(pi * W / 2)` sobre un intervalo de ancho `W`.
pub const JUMP_TABLE_SIZE: usize = 32;

/// Una entrada precomputada: el punto `2^i · G` y su delta de distancia asociado.
#[derive(Debug, Clone, Copy)]
pub struct JumpTableEntry {
    /// El punto `2^i · G` a sumar a la posición del kangaroo.
    pub point: SafePublicKey,
    /// El delta de distancia `2^i` a acumular.
    pub delta: u64,
}

/// Tabla fija de 32 saltos, construida una sola vez por proceso.
#[derive(Debug, Clone)]
pub struct JumpTable {
    entries: [JumpTableEntry; JUMP_TABLE_SIZE],
}

impl JumpTable {
    /// Construye la tabla derivando cada `g_i = 2^i · G` mediante duplicación
    /// sucesiva del generador (evita 32 multiplicaciones escalares completas).
    pub fn build() -> Result<Self, MathError> {
        let mut scalar_bytes = [0u8; 32];
        scalar_bytes[31] = 1;
        let mut current_point = SafePublicKey::from_scalar_times_generator(&scalar_bytes)?;

        let mut entries: [Option<JumpTableEntry>; JUMP_TABLE_SIZE] = [None; JUMP_TABLE_SIZE];
        let mut delta: u64 = 1;

        for slot in entries.iter_mut() {
            *slot = Some(JumpTableEntry { point: current_point, delta });
            current_point = current_point.combine(&current_point)?;
            delta = delta
                .checked_shl(1)
                .ok_or_else(|| MathError::InvalidKeyFormat("JUMP_DELTA_OVERFLOW".to_string()))?;
        }

        let entries = entries.map(|slot| slot.expect("every jump table slot is initialized above"));
        Ok(Self { entries })
    }

    /// Selecciona la entrada de salto para una coordenada X dada: los 5 bits bajos.
    #[inline]
    #[must_use]
    pub fn select(&self, x: &[u8; 32]) -> &JumpTableEntry {
        let last_byte = x[31];
        let index = (last_byte & 0b0001_1111) as usize;
        &self.entries[index]
    }

    /// Acceso de solo lectura a las 32 entradas, usado por pruebas de propiedades.
    #[must_use]
    pub fn entries(&self) -> &[JumpTableEntry; JUMP_TABLE_SIZE] {
        &self.entries
    }
}

// FIN DEL ARCHIVO [libs/core/math-engine/src/kangaroo/jump_table.rs]
