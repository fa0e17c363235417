// [apps/server/src/state.rs]
//! Estado compartido del servidor: el store de puntos distinguidos, el
//! particionador de rangos de trabajo, y los parámetros fijos de la
//! misión en curso. Construido una sola vez en `main` y repartido por
//! `Arc` a cada manejador de conexión — sin singletons de proceso (§5:
//! "no global mutable state is shared between workers beyond these").

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::{Arc, Mutex};

use prospector_core_dpstore::DpStore;
use prospector_core_math::prelude::SafePublicKey;
use tokio::sync::broadcast;

use crate::partitioner::Partitioner;

/// Parámetros fijos de la misión, derivados del archivo objetivo y de las
/// banderas de línea de comandos (§6).
pub struct MissionConfig {
    /// Ancho del intervalo de búsqueda `[0, 2^n)`, en bits.
    pub interval_bits: u8,
    /// Dificultad del punto distinguido, en bits (`-d`).
    pub dp_bits: u8,
    /// El punto objetivo `P`.
    pub target: SafePublicKey,
    /// Desplazamiento global de los herds wild (punto medio del intervalo).
    pub wild_offset: [u8; 32],
    /// Ventana de gracia antes de reasignar el rango de un worker caído.
    pub grace_period_secs: u64,
    /// Periodo de log de estadísticas (§4.G: cada 10 s por defecto).
    pub stats_interval_secs: u64,
    /// Periodo de escritura de checkpoint (`-wi`).
    pub checkpoint_interval_secs: u64,
    /// Ruta de checkpoint a cargar/escribir (`-w`), si se proporcionó.
    pub checkpoint_path: Option<PathBuf>,
    /// Ruta donde escribir la clave recuperada (`-o`), si se proporcionó.
    pub result_path: Option<PathBuf>,
}

/// Contadores de telemetría acumulados across todas las conexiones.
#[derive(Default)]
pub struct Telemetry {
    /// Total de DPs recibidos y encaminados al store.
    pub dps_received: AtomicU64,
    /// Total de operaciones de caminata reportadas por los clientes (§6 STATS).
    pub ops_reported: AtomicU64,
}

/// El estado vivo del servidor, compartido entre el bucle de aceptación,
/// cada manejador de conexión, y las tareas periódicas de estadísticas y
/// checkpoint.
pub struct AppState {
    /// El store de puntos distinguidos, sharded y concurrente.
    pub store: Arc<DpStore>,
    /// El particionador de rangos de trabajo.
    pub partitioner: Arc<Partitioner>,
    /// Parámetros fijos de la misión.
    pub config: MissionConfig,
    /// Bandera cooperativa de apagado, muestreada por toda tarea de larga vida.
    pub running: Arc<AtomicBool>,
    /// La clave recuperada, si el motor ya alcanzó el estado terminal `FOUND`.
    pub found_key: Arc<Mutex<Option<[u8; 32]>>>,
    /// Emisor de difusión usado para propagar `Message::Stop` a toda conexión activa.
    pub stop_broadcast: broadcast::Sender<[u8; 32]>,
    /// Contadores agregados, expuestos por la tarea de estadísticas.
    pub telemetry: Telemetry,
}

impl AppState {
    /// Construye el estado inicial del servidor para una misión dada.
    #[must_use]
    pub fn new(config: MissionConfig, partitioner: Partitioner) -> Self {
        let (stop_broadcast, _) = broadcast::channel(16);
        Self {
            store: Arc::new(DpStore::with_defaults()),
            partitioner: Arc::new(partitioner),
            config,
            running: Arc::new(AtomicBool::new(true)),
            found_key: Arc::new(Mutex::new(None)),
            stop_broadcast,
            telemetry: Telemetry::default(),
        }
    }

    /// Verdadero si el motor ya transicionó a `FOUND`.
    #[must_use]
    pub fn is_found(&self) -> bool {
        self.found_key.lock().expect("found_key mutex poisoned").is_some()
    }

    /// Marca la clave como encontrada y difunde `STOP` a toda conexión activa.
    /// Verdadero si esta llamada fue la que realizó la transición (idempotente:
    /// llamadas posteriores no reemiten la difusión).
    pub fn announce_found(&self, scalar: [u8; 32]) -> bool {
        let mut guard = self.found_key.lock().expect("found_key mutex poisoned");
        if guard.is_some() {
            return false;
        }
        *guard = Some(scalar);
        drop(guard);
        // Ignorado a propósito: sin receptores activos (todas las conexiones
        // ya cerradas) no hay nadie a quien notificar.
        let _ = self.stop_broadcast.send(scalar);
        true
    }
}
