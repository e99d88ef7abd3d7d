//! # Handlers
//! src/handlers/mod.rs
//!
//! Cada handler recibe el request ya parseado y el almacén, y produce una
//! [`Response`](crate::http::Response). Los errores anticipados (body faltante,
//! JSON inválido, ID inválido, item inexistente) ya vienen convertidos en
//! respuestas 4xx. Lo que el handler no anticipa se propaga como
//! [`HandlerError`] y el router lo transforma en un 500.
//!
//! - `basic`: OPTIONS, `/` y `/echo`
//! - `data`: CRUD sobre `/data` y `/data/:id`

pub mod basic;
pub mod data;

use thiserror::Error;

use crate::http::Response;

pub use basic::{echo_handler, home_handler, options_handler};
pub use data::{create_handler, delete_handler, list_handler, read_handler, replace_handler};

/// Fallas no anticipadas por un handler
#[derive(Debug, Error)]
pub enum HandlerError {
    /// No se pudo serializar la respuesta
    #[error("{0}")]
    Serialization(#[from] serde_json::Error),

    /// Cualquier otra falla interna
    #[error("{0}")]
    Internal(String),
}

/// Resultado de un handler
pub type HandlerResult = Result<Response, HandlerError>;
