// [libs/domain/models-rs/src/range.rs]
/*!
 * =================================================================
 * APARATO: WORK RANGE DOMAIN MODEL (V1.0)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO DE ASIGNACIÓN DE SUB-RANGOS DEL INTERVALO
 * =================================================================
 */

use serde::{Deserialize, Serialize};

/// Identificador de cliente de 16 bytes, tal como viaja en el handshake
/// `CLIENT_ID(16)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub [u8; 16]);

impl ClientId {
    /// Genera un identificador a partir de entropía del sistema.
    #[must_use]
    pub fn random() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }
}

/// Un sub-rango del intervalo de búsqueda `[0, 2^n)`, asignado a lo sumo a
/// un trabajador a la vez.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkRange {
    /// Límite inferior del rango, inclusivo.
    pub start: [u8; 32],
    /// Límite superior del rango, exclusivo.
    pub end: [u8; 32],
    /// Trabajador actualmente responsable de este rango, si lo hay.
    pub assigned_to: Option<ClientId>,
    /// Fracción estimada de progreso, `[0.0, 1.0]`.
    pub completed_fraction: f64,
}

impl WorkRange {
    /// Crea un rango recién tallado, sin asignar.
    #[must_use]
    pub fn unassigned(start: [u8; 32], end: [u8; 32]) -> Self {
        Self { start, end, assigned_to: None, completed_fraction: 0.0 }
    }

    /// Verdadero si el rango no tiene trabajador asignado actualmente.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.assigned_to.is_none()
    }
}
