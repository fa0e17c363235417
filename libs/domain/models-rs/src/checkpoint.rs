// [libs/domain/models-rs/src/checkpoint.rs]
/*!
 * =================================================================
 * APARATO: CHECKPOINT MANIFEST (V1.0)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO DE PERSISTENCIA DEL ESTADO DEL SERVIDOR
 * =================================================================
 *
 * Forma de dominio del archivo de checkpoint descrito en §6: cabecera
 * con los parámetros de la misión más el contenido íntegro de cada
 * cubeta no vacía del DP store. La codificación binaria exacta
 * (escritura atómica write-to-temp + rename) vive en
 * `prospector-infra-transport::checkpoint`; este tipo es su
 * contraparte en memoria.
 */

use serde::{Deserialize, Serialize};

use crate::dp::DistinguishedPointRecord;
use crate::range::WorkRange;

/// Cabecera con los parámetros fijos de la misión en curso.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointHeader {
    /// Ancho del intervalo de búsqueda, en bits.
    pub interval_bits: u8,
    /// Dificultad del punto distinguido, en bits.
    pub dp_bits: u8,
    /// Coordenada X del punto objetivo.
    pub target_x: [u8; 32],
    /// Coordenada Y del punto objetivo.
    pub target_y: [u8; 32],
    /// Desplazamiento global de los herds wild.
    pub wild_offset: [u8; 32],
}

/// Una cubeta completa del DP store, tal como se persiste.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointBucket {
    /// Índice de la cubeta dentro del store.
    pub bucket_index: u32,
    /// Entradas almacenadas en esta cubeta, en orden.
    pub entries: Vec<DistinguishedPointRecord>,
}

/// El manifiesto completo de un checkpoint del servidor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointManifest {
    /// Parámetros fijos de la misión.
    pub header: CheckpointHeader,
    /// Rangos de trabajo conocidos y su estado de asignación.
    pub ranges: Vec<WorkRange>,
    /// Cubetas no vacías del DP store.
    pub buckets: Vec<CheckpointBucket>,
}

impl CheckpointManifest {
    /// Número total de puntos distinguidos capturados en este checkpoint.
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.entries.len()).sum()
    }
}
