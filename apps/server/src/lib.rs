// [apps/server/src/lib.rs]
//! Frontend del servidor de búsqueda distribuida (§4.G): acepta
//! conexiones de workers, encamina sus puntos distinguidos al store
//! compartido, reparte rangos de trabajo, y persiste progreso. El
//! binario en `main.rs` es un switchboard delgado de configuración y
//! señales; toda la lógica vive en los módulos de esta librería.
#![deny(missing_docs)]

/// Persistencia periódica del estado del motor.
pub mod checkpoint;
/// Manejador de una conexión de worker, de principio a fin.
pub mod connection;
/// Catálogo de fallos del servidor y sus códigos de salida.
pub mod errors;
/// Bucle de aceptación de conexiones.
pub mod listener;
/// Particionador de rangos de trabajo.
pub mod partitioner;
/// Tarea periódica de estadísticas y mantenimiento.
pub mod stats;
/// Estado compartido del servidor.
pub mod state;

pub use errors::ServerError;
pub use partitioner::Partitioner;
pub use state::{AppState, MissionConfig};
