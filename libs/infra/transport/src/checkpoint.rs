// [libs/infra/transport/src/checkpoint.rs]
/*!
 * =================================================================
 * APARATO: CHECKPOINT FILE CODEC (V1.0)
 * CLASIFICACIÓN: INFRA TRANSPORT (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA ATÓMICA DEL ESTADO DEL SERVIDOR
 * =================================================================
 *
 * Formato: cabecera { MAGIC, VERSION, N, DP_BITS, P_x, P_y, WILD_OFFSET },
 * luego `bucket_count`(4), luego por cada cubeta no vacía
 * `(bucketIdx(4), entry_count(4), entries[])`. Cada entrada reutiliza el
 * layout de 68 bytes del wire (`codec::DpEntry`). Escrito atómicamente
 * mediante write-to-temp + rename para que un checkpoint a medio escribir
 * nunca sea observable por un proceso que reanuda.
 */

use std::fs;
use std::io::Write;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder};

use crate::codec::{decode_dp_entry, encode_dp_entry, DpEntry, MAGIC, PROTOCOL_VERSION};
use crate::errors::TransportError;

/// Una cubeta no vacía, tal como se persiste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointBucket {
    /// Índice de la cubeta.
    pub bucket_index: u32,
    /// Entradas almacenadas en la cubeta, en orden.
    pub entries: Vec<DpEntry>,
}

/// El archivo de checkpoint completo, decodificado en memoria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointFile {
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
    /// Cubetas no vacías del DP store.
    pub buckets: Vec<CheckpointBucket>,
}

impl CheckpointFile {
    /// Serializa el checkpoint completo a su representación binaria.
    pub fn encode(&self) -> Result<Vec<u8>, TransportError> {
        let mut out = Vec::new();
        let mut header = [0u8; 4 + 2 + 1 + 1];
        BigEndian::write_u32(&mut header[0..4], MAGIC);
        BigEndian::write_u16(&mut header[4..6], PROTOCOL_VERSION);
        header[6] = self.interval_bits;
        header[7] = self.dp_bits;
        out.extend_from_slice(&header);
        out.extend_from_slice(&self.target_x);
        out.extend_from_slice(&self.target_y);
        out.extend_from_slice(&self.wild_offset);

        let mut bucket_count_bytes = [0u8; 4];
        BigEndian::write_u32(&mut bucket_count_bytes, self.buckets.len() as u32);
        out.extend_from_slice(&bucket_count_bytes);

        for bucket in &self.buckets {
            let mut bucket_index_bytes = [0u8; 4];
            BigEndian::write_u32(&mut bucket_index_bytes, bucket.bucket_index);
            out.extend_from_slice(&bucket_index_bytes);

            let mut entry_count_bytes = [0u8; 4];
            BigEndian::write_u32(&mut entry_count_bytes, bucket.entries.len() as u32);
            out.extend_from_slice(&entry_count_bytes);

            for entry in &bucket.entries {
                out.extend_from_slice(&encode_dp_entry(entry)?);
            }
        }
        Ok(out)
    }

    /// Reconstruye el checkpoint desde su representación binaria.
    pub fn decode(bytes: &[u8]) -> Result<Self, TransportError> {
        require(bytes.len() >= 8 + 96 + 4, bytes.len())?;
        let magic = BigEndian::read_u32(&bytes[0..4]);
        if magic != MAGIC {
            return Err(TransportError::BadMagic { expected: MAGIC, got: magic });
        }
        let version = BigEndian::read_u16(&bytes[4..6]);
        if version != PROTOCOL_VERSION {
            return Err(TransportError::UnsupportedVersion(version));
        }
        let interval_bits = bytes[6];
        let dp_bits = bytes[7];

        let mut target_x = [0u8; 32];
        let mut target_y = [0u8; 32];
        let mut wild_offset = [0u8; 32];
        target_x.copy_from_slice(&bytes[8..40]);
        target_y.copy_from_slice(&bytes[40..72]);
        wild_offset.copy_from_slice(&bytes[72..104]);

        let bucket_count = BigEndian::read_u32(&bytes[104..108]) as usize;
        let mut cursor = 108usize;
        let mut buckets = Vec::with_capacity(bucket_count);

        for _ in 0..bucket_count {
            require(bytes.len() >= cursor + 8, bytes.len())?;
            let bucket_index = BigEndian::read_u32(&bytes[cursor..cursor + 4]);
            let entry_count = BigEndian::read_u32(&bytes[cursor + 4..cursor + 8]) as usize;
            cursor += 8;

            let mut entries = Vec::with_capacity(entry_count);
            for _ in 0..entry_count {
                require(bytes.len() >= cursor + 68, bytes.len())?;
                entries.push(decode_dp_entry(&bytes[cursor..cursor + 68])?);
                cursor += 68;
            }
            buckets.push(CheckpointBucket { bucket_index, entries });
        }

        Ok(Self { interval_bits, dp_bits, target_x, target_y, wild_offset, buckets })
    }

    /// Escribe el checkpoint atómicamente: vuelca a un archivo temporal en
    /// el mismo directorio y lo renombra sobre el destino final, de modo
    /// que un lector nunca observa un archivo a medio escribir.
    pub fn write_atomically(&self, destination: &Path) -> Result<(), TransportError> {
        let encoded = self.encode()?;
        let temp_path = destination.with_extension("tmp");
        {
            let mut temp_file = fs::File::create(&temp_path)?;
            temp_file.write_all(&encoded)?;
            temp_file.sync_all()?;
        }
        fs::rename(&temp_path, destination)?;
        Ok(())
    }

    /// Carga un checkpoint desde disco.
    pub fn read_from(path: &Path) -> Result<Self, TransportError> {
        let bytes = fs::read(path)?;
        Self::decode(&bytes)
    }
}

fn require(condition: bool, got: usize) -> Result<(), TransportError> {
    if condition {
        Ok(())
    } else {
        Err(TransportError::Truncated { needed: got + 1, got })
    }
}
