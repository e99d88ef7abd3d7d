//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! Este módulo proporciona una API para construir respuestas HTTP/1.1
//! y serializarlas a bytes para enviar al cliente.
//!
//! ## Formato de una respuesta
//!
//! Los headers fijos salen siempre en este orden, seguidos de los headers
//! extra que haya agregado el handler:
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Date: Mon, 19 Oct 2026 10:00:00 GMT\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 8\r\n
//! Connection: close\r\n
//! Access-Control-Allow-Origin: *\r\n
//! Access-Control-Allow-Methods: GET, POST, PUT, DELETE, OPTIONS\r\n
//! Access-Control-Allow-Headers: Content-Type\r\n
//! \r\n
//! Echo: hi
//! ```
//!
//! El servidor nunca mantiene la conexión abierta: después de escribir
//! estos bytes se cierra el socket.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use crud_http_server::http::{Response, StatusCode};
//!
//! let response = Response::text(StatusCode::Ok, "Hello");
//! let bytes = response.to_bytes();
//! assert!(bytes.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! ```

use std::time::SystemTime;

use super::StatusCode;

pub const CONTENT_TYPE_TEXT: &str = "text/plain";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Headers CORS que acompañan a toda respuesta
const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

/// Representa una respuesta HTTP completa
///
/// Se construye una vez por request y no se modifica después de enviarla.
#[derive(Debug, Clone)]
pub struct Response {
    /// Código de estado HTTP (200, 404, etc.)
    status: StatusCode,

    /// Valor del header Content-Type
    content_type: String,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,

    /// Headers adicionales, en el orden en que se agregaron
    extra_headers: Vec<(String, String)>,
}

impl Response {
    /// Crea una respuesta `text/plain` sin body
    ///
    /// # Ejemplo
    /// ```
    /// use crud_http_server::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok);
    /// assert!(response.body().is_empty());
    /// ```
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_TEXT.to_string(),
            body: Vec::new(),
            extra_headers: Vec::new(),
        }
    }

    /// Crea una respuesta de texto plano
    pub fn text(status: StatusCode, body: &str) -> Self {
        Self::new(status).with_body(body)
    }

    /// Crea una respuesta JSON a partir de un texto ya serializado
    ///
    /// # Ejemplo
    /// ```
    /// use crud_http_server::http::{Response, StatusCode};
    ///
    /// let response = Response::json(StatusCode::Created, "{}");
    /// assert_eq!(response.content_type(), "application/json");
    /// ```
    pub fn json(status: StatusCode, body: &str) -> Self {
        Self::new(status)
            .with_content_type(CONTENT_TYPE_JSON)
            .with_body(body)
    }

    /// Cambia el Content-Type
    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = content_type.to_string();
        self
    }

    /// Establece el cuerpo de la respuesta desde un string
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.as_bytes().to_vec();
        self
    }

    /// Agrega un header extra; sale después de los headers fijos
    ///
    /// # Ejemplo
    /// ```
    /// use crud_http_server::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok).with_header("X-Custom", "1");
    /// let text = String::from_utf8(response.to_bytes()).unwrap();
    /// assert!(text.contains("X-Custom: 1\r\n"));
    /// ```
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.extra_headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Convierte la respuesta a bytes usando la fecha actual en el header `Date`
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_bytes_at(SystemTime::now())
    }

    /// Convierte la respuesta a bytes con una fecha dada
    ///
    /// Genera:
    /// - Status line: `HTTP/1.1 200 OK\r\n`
    /// - Headers fijos, CORS y extras: `Name: Value\r\n`
    /// - Línea vacía: `\r\n`
    /// - Body
    pub fn to_bytes_at(&self, date: SystemTime) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {}\r\n", self.status);

        head.push_str(&format!("Date: {}\r\n", httpdate::fmt_http_date(date)));
        head.push_str(&format!("Content-Type: {}\r\n", self.content_type));
        // Largo en bytes, no en caracteres
        head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        head.push_str("Connection: close\r\n");

        for (name, value) in CORS_HEADERS {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }
        for (name, value) in &self.extra_headers {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }

        head.push_str("\r\n");

        let mut result = head.into_bytes();
        result.extend_from_slice(&self.body);
        result
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene el Content-Type
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body como texto (útil en logs y tests)
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Headers extra agregados por el handler
    pub fn extra_headers(&self) -> &[(String, String)] {
        &self.extra_headers
    }
}
