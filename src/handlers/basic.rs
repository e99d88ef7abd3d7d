//! # Handlers Básicos
//! src/handlers/basic.rs
//!
//! - OPTIONS (cualquier path): preflight CORS
//! - GET /: mensaje de bienvenida
//! - GET /echo?message=TEXT: devuelve el texto

use super::HandlerResult;
use crate::http::{Request, Response, StatusCode};
use crate::store::ResourceStore;

pub const WELCOME_MESSAGE: &str = "Welcome to your custom HTTP Server!";
pub const DEFAULT_ECHO_MESSAGE: &str = "Kuch toh bolo!";

/// Handler para OPTIONS
///
/// Los headers CORS ya los agrega el serializador, así que basta con un
/// 200 vacío. No se mira ningún otro campo del request.
pub fn options_handler(_req: &Request, _store: &ResourceStore) -> HandlerResult {
    Ok(Response::new(StatusCode::Ok))
}

/// Handler para GET /
pub fn home_handler(_req: &Request, _store: &ResourceStore) -> HandlerResult {
    Ok(Response::text(StatusCode::Ok, WELCOME_MESSAGE))
}

/// Handler para GET /echo?message=TEXT
///
/// Sin `message` (o con `message` vacío) responde el mensaje por defecto.
///
/// # Ejemplo de response
/// ```text
/// Echo: hola
/// ```
pub fn echo_handler(req: &Request, _store: &ResourceStore) -> HandlerResult {
    let message = req
        .query_param("message")
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_ECHO_MESSAGE);

    Ok(Response::text(StatusCode::Ok, &format!("Echo: {}", message)))
}
