//! # CRUD HTTP Server - Entry Point
//! src/main.rs
//!
//! Lee la configuración, inicializa el logging y atiende conexiones hasta
//! recibir Ctrl+C.

use crud_http_server::config::Config;
use crud_http_server::server::Server;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Crear configuración (CLI o variables de entorno)
    let config = Config::new();

    // RUST_LOG tiene prioridad sobre --log-level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_lowercase()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = config.validate() {
        error!("Configuración inválida: {}", e);
        std::process::exit(2);
    }

    info!(address = %config.address(), "Iniciando servidor");

    let server = match Server::bind(&config).await {
        Ok(server) => server,
        Err(e) => {
            error!("No se pudo abrir {}: {}", config.address(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run_until(shutdown_signal()).await {
        error!("Error fatal: {}", e);
        std::process::exit(1);
    }

    info!("Servidor apagado correctamente");
}

/// Se completa al recibir SIGINT (Ctrl+C)
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("No se pudo escuchar Ctrl+C: {}", e);
        // Sin señal no hay forma de apagar: seguir sirviendo
        std::future::pending::<()>().await;
    }
    info!("Señal recibida, apagando...");
}
