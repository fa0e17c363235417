// [apps/server/src/listener.rs]
//! Bucle de aceptación del servidor (§4.G): un único `TcpListener`, una
//! tarea de Tokio por conexión entrante. Se detiene cuando la bandera
//! `running` cae o cuando el motor transiciona a `FOUND`.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::connection::handle_connection;
use crate::errors::ServerError;
use crate::state::AppState;

/// Escucha en `port` y despacha cada conexión aceptada a su propia tarea.
pub async fn run_accept_loop(port: u16, state: Arc<AppState>) -> Result<(), ServerError> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "server frontend listening");

    while state.running.load(Ordering::Relaxed) {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer_addr)) => {
                        let connection_state = Arc::clone(&state);
                        tokio::spawn(async move {
                            handle_connection(stream, connection_state, peer_addr.to_string()).await;
                        });
                    }
                    Err(io_error) => {
                        error!(%io_error, "accept loop fault");
                    }
                }
            }
            () = tokio::time::sleep(std::time::Duration::from_millis(500)) => {
                // Punto de muestreo periódico de `running`/`found` cuando no
                // llega ninguna conexión nueva, para no bloquear el apagado.
                if state.is_found() {
                    break;
                }
            }
        }
    }

    Ok(())
}
