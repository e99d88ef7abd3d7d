//! # Parsing de Requests HTTP/1.1
//! src/http/request.rs
//!
//! Este módulo implementa el parser de requests desde cero: recibe los bytes
//! tal como llegaron del socket y produce un [`Request`] inmutable, o un
//! [`ParseError`] que ya sabe con qué status debe responderse.
//!
//! ## Formato de un Request
//!
//! ```text
//! POST /data?debug=1 HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 12\r\n
//! \r\n
//! {"name":"a"}
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD /path?query HTTP/x.y`
//! 2. **Headers**: Pares `Name: Value` (uno por línea, llaves en minúsculas)
//! 3. **Boundary line**: la primera línea vacía, separa headers del body
//! 4. **Body**: todo lo que sigue, re-unido con `\r\n`

use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

use super::StatusCode;

/// Tamaño máximo del body aceptado (1 MiB), validado contra el `Content-Length` declarado
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Método HTTP del request
///
/// Los métodos que no reconocemos no son un error de parsing: se guardan
/// tal cual (en mayúsculas) y el router termina respondiendo 404.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    OPTIONS,
    /// Cualquier otro token (ej: "PATCH", "HEAD")
    Other(String),
}

impl Method {
    /// Construye el método a partir del primer token de la request line
    ///
    /// El token se normaliza a mayúsculas, así "get" y "GET" son lo mismo.
    pub fn from_token(token: &str) -> Self {
        let upper = token.to_uppercase();
        match upper.as_str() {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "OPTIONS" => Method::OPTIONS,
            _ => Method::Other(upper),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::OPTIONS => "OPTIONS",
            Method::Other(token) => token,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errores terminales del parsing
///
/// El mensaje de `Display` es exactamente el texto que recibe el cliente.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Request vacío o solo espacios en blanco
    #[error("Empty request received")]
    EmptyRequest,

    /// No hay request line
    #[error("Invalid request format")]
    InvalidFormat,

    /// La request line no tiene al menos 3 tokens
    #[error("Invalid request line format")]
    InvalidRequestLine,

    /// El tercer token no empieza con `HTTP/`
    #[error("Invalid HTTP version")]
    InvalidHttpVersion(String),

    /// El `Content-Length` declarado supera el límite
    #[error("Request body too large. Maximum size: {limit} bytes")]
    BodyTooLarge { limit: usize },
}

impl ParseError {
    /// Status con el que se responde este error
    pub fn status(&self) -> StatusCode {
        match self {
            ParseError::BodyTooLarge { .. } => StatusCode::PayloadTooLarge,
            _ => StatusCode::BadRequest,
        }
    }
}

/// Diferencia entre el `Content-Length` declarado y el body recibido
///
/// No es fatal: se registra en el log y el request se procesa igual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthMismatch {
    pub declared: usize,
    pub actual: usize,
}

/// Representa un request HTTP parseado (inmutable)
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP
    method: Method,

    /// Path tal como llegó (ej: "/echo?message=hola")
    raw_path: String,

    /// Path sin query (ej: "/echo")
    path: String,

    /// Query parameters decodificados; ante llaves repetidas gana la última
    query_params: HashMap<String, String>,

    /// Headers con llave en minúsculas y valor sin espacios alrededor
    headers: HashMap<String, String>,

    /// Token de versión (ej: "HTTP/1.1")
    version: String,

    /// Body (puede ser vacío)
    body: String,

    /// Inconsistencia de Content-Length detectada, si la hubo
    length_mismatch: Option<LengthMismatch>,
}

impl Request {
    /// Parsea un request desde los bytes recibidos
    ///
    /// # Argumentos
    ///
    /// * `buffer` - Bytes del request completo (request line, headers y body)
    ///
    /// # Retorna
    ///
    /// * `Ok(Request)` - Request parseado exitosamente
    /// * `Err(ParseError)` - Falla terminal; `err.status()` indica el código a responder
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use crud_http_server::http::Request;
    ///
    /// let raw = b"GET /echo?message=hi HTTP/1.1\r\nHost: localhost\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.path(), "/echo");
    /// assert_eq!(request.query_param("message"), Some("hi"));
    /// assert_eq!(request.header("Host"), Some("localhost"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        // Las secuencias UTF-8 inválidas se reemplazan por U+FFFD
        let text = String::from_utf8_lossy(buffer);

        if text.trim().is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        let lines: Vec<&str> = text.split("\r\n").collect();

        if lines.is_empty() || lines[0].is_empty() {
            return Err(ParseError::InvalidFormat);
        }

        // 1. Request line
        let (method, raw_path, version) = Self::parse_request_line(lines[0])?;

        // 2. Headers hasta la boundary line
        let (headers, boundary) = Self::parse_headers(&lines);

        // 3. Body
        let body = Self::parse_body(&lines, boundary);

        // 4. Validar el tamaño declarado
        let declared = headers
            .get("content-length")
            .and_then(|value| parse_int_prefix(value))
            .unwrap_or(0);

        if declared > MAX_BODY_SIZE as i64 {
            return Err(ParseError::BodyTooLarge { limit: MAX_BODY_SIZE });
        }

        let length_mismatch = if declared > 0 && body.len() != declared as usize {
            let mismatch = LengthMismatch {
                declared: declared as usize,
                actual: body.len(),
            };
            warn!(
                declared = mismatch.declared,
                actual = mismatch.actual,
                "Content-Length mismatch"
            );
            Some(mismatch)
        } else {
            None
        };

        // 5. Separar path y query
        let (path, query_params) = Self::parse_path_and_query(&raw_path);

        Ok(Request {
            method,
            raw_path,
            path,
            query_params,
            headers,
            version,
            body,
            length_mismatch,
        })
    }

    /// Parsea la request line (primera línea del request)
    ///
    /// Se separa por espacios simples: dos espacios seguidos producen un token vacío.
    fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
        let parts: Vec<&str> = line.split(' ').collect();

        if parts.len() < 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        let method = Method::from_token(parts[0]);
        let raw_path = parts[1].to_string();
        let version = parts[2].to_string();

        if !version.starts_with("HTTP/") {
            return Err(ParseError::InvalidHttpVersion(version));
        }

        Ok((method, raw_path, version))
    }

    /// Parsea los headers a partir de la línea 1
    ///
    /// Retorna el mapa de headers y el índice de la boundary line (o `lines.len()`
    /// si el input terminó antes). Las líneas sin ':' se ignoran.
    fn parse_headers(lines: &[&str]) -> (HashMap<String, String>, usize) {
        let mut headers = HashMap::new();
        let mut index = 1;

        while index < lines.len() && !lines[index].is_empty() {
            let line = lines[index];

            if let Some(colon_pos) = line.find(':') {
                let name = line[..colon_pos].trim().to_lowercase();
                let value = line[colon_pos + 1..].trim().to_string();
                headers.insert(name, value);
            }

            index += 1;
        }

        (headers, index)
    }

    /// Todo lo que sigue a la boundary line, re-unido con `\r\n`
    fn parse_body(lines: &[&str], boundary: usize) -> String {
        if boundary + 1 < lines.len() {
            lines[boundary + 1..].join("\r\n")
        } else {
            String::new()
        }
    }

    /// Separa el path en el primer '?' y decodifica la query string
    ///
    /// Ejemplo: "/echo?message=hola+mundo"
    /// Retorna: ("/echo", {"message": "hola mundo"})
    fn parse_path_and_query(raw_path: &str) -> (String, HashMap<String, String>) {
        match raw_path.split_once('?') {
            Some((path, query)) => {
                // insert sobrescribe: la última ocurrencia gana
                let params = url::form_urlencoded::parse(query.as_bytes())
                    .into_owned()
                    .collect();
                (path.to_string(), params)
            }
            None => (raw_path.to_string(), HashMap::new()),
        }
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path original, incluyendo la query
    pub fn raw_path(&self) -> &str {
        &self.raw_path
    }

    /// Path limpio (sin `?query`)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Obtiene todos los query parameters
    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    /// Obtiene un query parameter específico
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(|s| s.as_str())
    }

    /// Obtiene todos los headers (llaves en minúsculas)
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header específico; el nombre no distingue mayúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|s| s.as_str())
    }

    /// Obtiene la versión HTTP declarada
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Obtiene el body del request
    pub fn body(&self) -> &[u8] {
        self.body.as_bytes()
    }

    /// Obtiene el body como texto
    pub fn body_str(&self) -> &str {
        &self.body
    }

    /// Inconsistencia entre `Content-Length` y el body real, si la hubo
    pub fn length_mismatch(&self) -> Option<LengthMismatch> {
        self.length_mismatch
    }
}

/// Parseo numérico tolerante: espacios iniciales, signo opcional y luego la
/// secuencia más larga de dígitos ASCII. "12abc" → 12, "abc" → None.
///
/// Valores que no caben en `i64` se saturan.
pub(crate) fn parse_int_prefix(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_get() {
        let raw = b"GET / HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.path(), "/");
        assert_eq!(request.version(), "HTTP/1.1");
        assert!(request.query_params().is_empty());
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_method_is_uppercased() {
        let request = Request::parse(b"delete /data/0 HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.method(), &Method::DELETE);
    }

    #[test]
    fn test_unknown_method_is_kept() {
        let request = Request::parse(b"patch /data/0 HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.method(), &Method::Other("PATCH".to_string()));
        assert_eq!(request.method().as_str(), "PATCH");
    }

    #[test]
    fn test_parse_with_query_params() {
        let raw = b"GET /echo?message=hello%20world&x=1 HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.raw_path(), "/echo?message=hello%20world&x=1");
        assert_eq!(request.path(), "/echo");
        assert_eq!(request.query_param("message"), Some("hello world"));
        assert_eq!(request.query_param("x"), Some("1"));
    }

    #[test]
    fn test_query_plus_and_last_wins() {
        let raw = b"GET /echo?message=a+b&message=second HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();
        assert_eq!(request.query_param("message"), Some("second"));

        let raw = b"GET /echo?message=a+b HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();
        assert_eq!(request.query_param("message"), Some("a b"));
    }

    #[test]
    fn test_headers_are_case_insensitive_and_trimmed() {
        let raw = b"GET / HTTP/1.1\r\nContent-Type:   application/json  \r\nX-Thing: a:b\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(request.header("x-thing"), Some("a:b"));
        assert!(request.headers().contains_key("content-type"));
    }

    #[test]
    fn test_header_without_colon_is_ignored() {
        let raw = b"GET / HTTP/1.1\r\nnot a header\r\nHost: x\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.header("host"), Some("x"));
    }

    #[test]
    fn test_body_joined_with_crlf() {
        let raw = b"POST /data HTTP/1.1\r\nContent-Type: application/json\r\n\r\n{\"a\":\r\n1}";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.body_str(), "{\"a\":\r\n1}");
        assert!(request.length_mismatch().is_none());
    }

    #[test]
    fn test_no_boundary_line_means_empty_body() {
        let request = Request::parse(b"GET / HTTP/1.1\r\nHost: x").unwrap();
        assert!(request.body().is_empty());
        assert_eq!(request.header("host"), Some("x"));
    }

    #[test]
    fn test_content_length_mismatch_is_recorded() {
        let raw = b"POST /data HTTP/1.1\r\nContent-Length: 50\r\n\r\n{}";
        let request = Request::parse(raw).unwrap();

        assert_eq!(
            request.length_mismatch(),
            Some(LengthMismatch { declared: 50, actual: 2 })
        );
    }

    #[test]
    fn test_content_length_counts_utf8_bytes() {
        let raw = "POST /data HTTP/1.1\r\nContent-Length: 2\r\n\r\nñ".as_bytes();
        let request = Request::parse(raw).unwrap();
        assert!(request.length_mismatch().is_none());
    }

    #[test]
    fn test_body_too_large() {
        let raw = b"POST /data HTTP/1.1\r\nContent-Length: 2000000\r\n\r\n{}";
        let result = Request::parse(raw);

        assert_eq!(result.unwrap_err(), ParseError::BodyTooLarge { limit: MAX_BODY_SIZE });
    }

    #[test]
    fn test_body_at_limit_is_accepted() {
        let raw = format!("POST /data HTTP/1.1\r\nContent-Length: {}\r\n\r\n", MAX_BODY_SIZE);
        assert!(Request::parse(raw.as_bytes()).is_ok());
    }

    #[test]
    fn test_invalid_content_length_counts_as_zero() {
        let raw = b"POST /data HTTP/1.1\r\nContent-Length: abc\r\n\r\n{}";
        let request = Request::parse(raw).unwrap();
        assert!(request.length_mismatch().is_none());
    }

    #[test]
    fn test_invalid_version() {
        let result = Request::parse(b"GET / FTP/1.0\r\n\r\n");
        assert!(matches!(result, Err(ParseError::InvalidHttpVersion(_))));
    }

    #[test]
    fn test_any_http_version_token_is_accepted() {
        let request = Request::parse(b"GET / HTTP/2.0\r\n\r\n").unwrap();
        assert_eq!(request.version(), "HTTP/2.0");
    }

    #[test]
    fn test_empty_request() {
        assert_eq!(Request::parse(b"").unwrap_err(), ParseError::EmptyRequest);
        assert_eq!(Request::parse(b"  \r\n ").unwrap_err(), ParseError::EmptyRequest);
    }

    #[test]
    fn test_first_line_empty() {
        let result = Request::parse(b"\r\nGET / HTTP/1.1\r\n\r\n");
        assert_eq!(result.unwrap_err(), ParseError::InvalidFormat);
    }

    #[test]
    fn test_invalid_request_line() {
        let result = Request::parse(b"GET\r\n\r\n");
        assert_eq!(result.unwrap_err(), ParseError::InvalidRequestLine);
    }

    #[test]
    fn test_error_messages_and_status() {
        assert_eq!(ParseError::EmptyRequest.to_string(), "Empty request received");
        assert_eq!(ParseError::InvalidFormat.to_string(), "Invalid request format");
        assert_eq!(
            ParseError::BodyTooLarge { limit: MAX_BODY_SIZE }.to_string(),
            "Request body too large. Maximum size: 1048576 bytes"
        );
        assert_eq!(ParseError::InvalidRequestLine.status(), StatusCode::BadRequest);
        assert_eq!(
            ParseError::BodyTooLarge { limit: 1 }.status(),
            StatusCode::PayloadTooLarge
        );
    }

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("42"), Some(42));
        assert_eq!(parse_int_prefix("  7abc"), Some(7));
        assert_eq!(parse_int_prefix("-3"), Some(-3));
        assert_eq!(parse_int_prefix("+5"), Some(5));
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("-"), None);
        assert_eq!(parse_int_prefix("99999999999999999999999"), Some(i64::MAX));
    }
}
