//! # CRUD HTTP Server
//! src/lib.rs
//!
//! Servidor HTTP/1.1 mínimo implementado desde cero sobre TCP: convierte
//! bytes en un request, lo rutea, y serializa la response de vuelta a
//! bytes, sin usar ninguna librería HTTP.
//!
//! ## Arquitectura
//!
//! ```text
//! Listener → RequestParser → Router → Handler ↔ ResourceStore
//!                                        ↓
//!                               ResponseSerializer → cerrar conexión
//! ```
//!
//! - `http`: Parsing de requests, serialización de responses, status codes
//! - `store`: Almacén en memoria con IDs posicionales
//! - `handlers`: Los endpoints (`/`, `/echo`, `/data`, `/data/:id`, OPTIONS)
//! - `router`: Tabla (método, path) → handler, con guardia de 500
//! - `server`: Listener TCP, una tarea por conexión
//! - `config`: Argumentos CLI y variables de entorno
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use crud_http_server::config::Config;
//! use crud_http_server::server::Server;
//!
//! # async fn run() -> std::io::Result<()> {
//! let config = Config::default();
//! let server = Server::bind(&config).await?;
//! server.run().await
//! # }
//! ```

pub mod config;
pub mod handlers;
pub mod http;
pub mod router;
pub mod server;
pub mod store;
