//! # Módulo HTTP
//! src/http/mod.rs
//!
//! Este módulo implementa el subconjunto de HTTP/1.1 que habla el servidor,
//! desde cero y sin librerías de alto nivel:
//!
//! - Parsing de requests (request line, headers, body, query parameters)
//! - Serialización de responses con headers fijos y CORS
//! - Códigos de estado
//!
//! ## Lo que NO soporta
//!
//! - Conexiones persistentes (siempre `Connection: close`)
//! - Chunked transfer encoding
//! - Pipelining de requests

pub mod request;   // Parsing de HTTP requests
pub mod response;  // Construcción y serialización de responses
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use request::{Method, ParseError, Request, MAX_BODY_SIZE};
pub use response::Response;
pub use status::StatusCode;
