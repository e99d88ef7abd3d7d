//! # Handlers CRUD
//! src/handlers/data.rs
//!
//! Implementa los endpoints del almacén:
//! - POST /data
//! - GET /data
//! - GET /data/:id
//! - PUT /data/:id
//! - DELETE /data/:id
//!
//! Todas las respuestas JSON van indentadas con 2 espacios. Los errores
//! van en texto plano.

use serde::Serialize;
use serde_json::error::Category;
use serde_json::Value;

use super::HandlerResult;
use crate::http::request::parse_int_prefix;
use crate::http::response::CONTENT_TYPE_JSON;
use crate::http::{Request, Response, StatusCode};
use crate::store::{ResourceStore, StoredItem};

#[derive(Serialize)]
struct Created<'a> {
    status: &'static str,
    message: &'static str,
    id: usize,
    data: &'a StoredItem,
}

#[derive(Serialize)]
struct Updated<'a> {
    status: &'static str,
    message: &'static str,
    data: &'a StoredItem,
}

#[derive(Serialize)]
struct Deleted<'a> {
    status: &'static str,
    message: &'static str,
    deleted: &'a StoredItem,
}

/// Handler para POST /data
///
/// Valida body, Content-Type y que el JSON sea un objeto; luego lo agrega
/// al final del almacén.
///
/// # Ejemplo de response (201)
/// ```json
/// {
///   "status": "success",
///   "message": "Data saved successfully!",
///   "id": 0,
///   "data": {
///     "name": "a"
///   }
/// }
/// ```
pub fn create_handler(req: &Request, store: &ResourceStore) -> HandlerResult {
    if req.body_str().trim().is_empty() {
        return Ok(bad_request("Request body is required for POST"));
    }

    let content_type = req.header("content-type").unwrap_or("");
    if !content_type.contains(CONTENT_TYPE_JSON) {
        return Ok(bad_request("Content-Type must be application/json"));
    }

    let data = match parse_json_body(req.body_str(), "Invalid JSON format") {
        Ok(value) => value,
        Err(response) => return Ok(response),
    };

    if !data.is_object() {
        return Ok(bad_request("Data must be a valid JSON object"));
    }

    let id = store.append(data.clone());

    let body = serde_json::to_string_pretty(&Created {
        status: "success",
        message: "Data saved successfully!",
        id,
        data: &data,
    })?;

    Ok(Response::json(StatusCode::Created, &body))
}

/// Handler para GET /data
///
/// Retorna el almacén completo como arreglo.
pub fn list_handler(_req: &Request, store: &ResourceStore) -> HandlerResult {
    let body = store.to_pretty_json()?;
    Ok(Response::json(StatusCode::Ok, &body))
}

/// Handler para GET /data/:id
pub fn read_handler(req: &Request, store: &ResourceStore) -> HandlerResult {
    let index = match parse_item_id(req.path()) {
        Ok(index) => index,
        Err(response) => return Ok(response),
    };

    match store.get(index) {
        Some(item) => {
            let body = serde_json::to_string_pretty(&item)?;
            Ok(Response::json(StatusCode::Ok, &body))
        }
        None => Ok(not_found(&format!("Item with ID {} not found", index))),
    }
}

/// Handler para PUT /data/:id
///
/// Sobrescribe el item en su misma posición. A diferencia de POST no exige
/// Content-Type ni que el JSON sea un objeto.
pub fn replace_handler(req: &Request, store: &ResourceStore) -> HandlerResult {
    let index = match parse_item_id(req.path()) {
        Ok(index) => index,
        Err(response) => return Ok(response),
    };

    if req.body_str().trim().is_empty() {
        return Ok(bad_request("Request body is required for PUT"));
    }

    let missing = || not_found(&format!("Item with ID {} not found for update", index));

    if index >= store.len() {
        return Ok(missing());
    }

    let data = match parse_json_body(req.body_str(), "Invalid JSON data") {
        Ok(value) => value,
        Err(response) => return Ok(response),
    };

    // Otra conexión pudo borrar el item entre el chequeo y la escritura
    if store.replace(index, data.clone()).is_none() {
        return Ok(missing());
    }

    let body = serde_json::to_string_pretty(&Updated {
        status: "success",
        message: "Data updated!",
        data: &data,
    })?;

    Ok(Response::json(StatusCode::Ok, &body))
}

/// Handler para DELETE /data/:id
///
/// Los items posteriores bajan una posición, así que sus IDs cambian.
pub fn delete_handler(req: &Request, store: &ResourceStore) -> HandlerResult {
    let index = match parse_item_id(req.path()) {
        Ok(index) => index,
        Err(response) => return Ok(response),
    };

    let deleted = match store.remove(index) {
        Some(item) => item,
        None => {
            return Ok(not_found(&format!(
                "Item with ID {} not found for deletion",
                index
            )))
        }
    };

    let body = serde_json::to_string_pretty(&Deleted {
        status: "success",
        message: "Data deleted!",
        deleted: &deleted,
    })?;

    Ok(Response::json(StatusCode::Ok, &body))
}

/// Extrae el ID de un path `/data/:id`
///
/// Errores:
/// - más o menos de 3 segmentos → 400 de formato
/// - segmento no numérico o negativo → 400 de ID
fn parse_item_id(path: &str) -> Result<usize, Response> {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() != 3 {
        return Err(bad_request("Invalid path format. Use /data/:id"));
    }

    match parse_int_prefix(segments[2]) {
        Some(id) if id >= 0 => Ok(usize::try_from(id).unwrap_or(usize::MAX)),
        _ => Err(bad_request(
            "Invalid ID format. ID must be a non-negative number",
        )),
    }
}

/// Parsea el body como JSON
///
/// Un error de sintaxis (o un body truncado) es culpa del cliente: 400 con
/// `syntax_prefix`. Cualquier otra categoría de error es un 500.
fn parse_json_body(body: &str, syntax_prefix: &str) -> Result<Value, Response> {
    serde_json::from_str::<Value>(body).map_err(|e| match e.classify() {
        Category::Syntax | Category::Eof => bad_request(&format!("{}: {}", syntax_prefix, e)),
        _ => Response::text(
            StatusCode::InternalServerError,
            &format!("Server error: {}", e),
        ),
    })
}

fn bad_request(message: &str) -> Response {
    Response::text(StatusCode::BadRequest, message)
}

fn not_found(message: &str) -> Response {
    Response::text(StatusCode::NotFound, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(raw: &str) -> Request {
        Request::parse(raw.as_bytes()).unwrap()
    }

    fn post(body: &str) -> Request {
        request(&format!(
            "POST /data HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        ))
    }

    fn put(id: &str, body: &str) -> Request {
        request(&format!("PUT /data/{} HTTP/1.1\r\n\r\n{}", id, body))
    }

    fn body_json(response: &Response) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[test]
    fn test_create_returns_201_and_id() {
        let store = ResourceStore::new();
        let response = create_handler(&post(r#"{"name":"a"}"#), &store).unwrap();

        assert_eq!(response.status(), StatusCode::Created);
        assert_eq!(response.content_type(), "application/json");
        assert_eq!(
            body_json(&response),
            json!({
                "status": "success",
                "message": "Data saved successfully!",
                "id": 0,
                "data": {"name": "a"}
            })
        );

        let second = create_handler(&post(r#"{"name":"b"}"#), &store).unwrap();
        assert_eq!(body_json(&second)["id"], 1);
    }

    #[test]
    fn test_create_body_is_pretty_printed() {
        let store = ResourceStore::new();
        let response = create_handler(&post(r#"{"name":"a"}"#), &store).unwrap();

        let expected = "{\n  \"status\": \"success\",\n  \"message\": \"Data saved successfully!\",\n  \"id\": 0,\n  \"data\": {\n    \"name\": \"a\"\n  }\n}";
        assert_eq!(response.body_text(), expected);
    }

    #[test]
    fn test_create_requires_body() {
        let store = ResourceStore::new();
        let response = create_handler(&post("   "), &store).unwrap();

        assert_eq!(response.status(), StatusCode::BadRequest);
        assert_eq!(response.body_text(), "Request body is required for POST");
    }

    #[test]
    fn test_create_requires_json_content_type() {
        let store = ResourceStore::new();
        let req = request("POST /data HTTP/1.1\r\nContent-Type: text/plain\r\n\r\n{}");
        let response = create_handler(&req, &store).unwrap();

        assert_eq!(response.status(), StatusCode::BadRequest);
        assert_eq!(response.body_text(), "Content-Type must be application/json");
    }

    #[test]
    fn test_create_accepts_content_type_with_charset() {
        let store = ResourceStore::new();
        let req = request(
            "POST /data HTTP/1.1\r\nContent-Type: application/json; charset=utf-8\r\n\r\n{\"a\":1}",
        );
        let response = create_handler(&req, &store).unwrap();
        assert_eq!(response.status(), StatusCode::Created);
    }

    #[test]
    fn test_create_invalid_json_is_400() {
        let store = ResourceStore::new();
        for body in [r#"{"name":"#, "not json", "{,}", "[1,"] {
            let response = create_handler(&post(body), &store).unwrap();
            assert_eq!(response.status(), StatusCode::BadRequest, "body: {}", body);
            assert!(response.body_text().starts_with("Invalid JSON format: "));
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_rejects_non_objects() {
        let store = ResourceStore::new();
        for body in ["null", "42", "\"text\"", "[1, 2]", "true"] {
            let response = create_handler(&post(body), &store).unwrap();
            assert_eq!(response.status(), StatusCode::BadRequest, "body: {}", body);
            assert_eq!(response.body_text(), "Data must be a valid JSON object");
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_list_returns_whole_store() {
        let store = ResourceStore::new();
        let response = list_handler(&request("GET /data HTTP/1.1\r\n\r\n"), &store).unwrap();
        assert_eq!(response.body_text(), "[]");

        store.append(json!({"a": 1}));
        store.append(json!({"b": 2}));
        let response = list_handler(&request("GET /data HTTP/1.1\r\n\r\n"), &store).unwrap();
        assert_eq!(body_json(&response), json!([{"a": 1}, {"b": 2}]));
    }

    #[test]
    fn test_read_round_trip() {
        let store = ResourceStore::new();
        create_handler(&post(r#"{"name":"a","tags":["x","y"]}"#), &store).unwrap();

        let response = read_handler(&request("GET /data/0 HTTP/1.1\r\n\r\n"), &store).unwrap();

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(
            response.body_text(),
            serde_json::to_string_pretty(&json!({"name": "a", "tags": ["x", "y"]})).unwrap()
        );
    }

    #[test]
    fn test_read_out_of_range_is_404() {
        let store = ResourceStore::new();
        let response = read_handler(&request("GET /data/3 HTTP/1.1\r\n\r\n"), &store).unwrap();

        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(response.body_text(), "Item with ID 3 not found");
    }

    #[test]
    fn test_read_invalid_ids() {
        let store = ResourceStore::new();

        for path in ["/data/abc", "/data/-1", "/data/"] {
            let req = request(&format!("GET {} HTTP/1.1\r\n\r\n", path));
            let response = read_handler(&req, &store).unwrap();
            assert_eq!(response.status(), StatusCode::BadRequest, "path: {}", path);
            assert_eq!(
                response.body_text(),
                "Invalid ID format. ID must be a non-negative number"
            );
        }

        let req = request("GET /data/1/extra HTTP/1.1\r\n\r\n");
        let response = read_handler(&req, &store).unwrap();
        assert_eq!(response.body_text(), "Invalid path format. Use /data/:id");
    }

    #[test]
    fn test_read_huge_id_is_404() {
        let store = ResourceStore::new();
        let req = request("GET /data/99999999999999999999999 HTTP/1.1\r\n\r\n");
        let response = read_handler(&req, &store).unwrap();
        assert_eq!(response.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_replace_overwrites_in_place() {
        let store = ResourceStore::new();
        store.append(json!({"v": 0}));
        store.append(json!({"v": 1}));

        let response = replace_handler(&put("0", r#"{"v":"new"}"#), &store).unwrap();

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(
            body_json(&response),
            json!({"status": "success", "message": "Data updated!", "data": {"v": "new"}})
        );
        assert_eq!(store.snapshot(), vec![json!({"v": "new"}), json!({"v": 1})]);
    }

    #[test]
    fn test_replace_missing_item_is_404() {
        let store = ResourceStore::new();
        store.append(json!({"v": 0}));

        let response = replace_handler(&put("5", r#"{"v":1}"#), &store).unwrap();

        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(response.body_text(), "Item with ID 5 not found for update");
    }

    #[test]
    fn test_replace_requires_body() {
        let store = ResourceStore::new();
        store.append(json!({}));

        let response = replace_handler(&put("0", ""), &store).unwrap();

        assert_eq!(response.status(), StatusCode::BadRequest);
        assert_eq!(response.body_text(), "Request body is required for PUT");
    }

    #[test]
    fn test_replace_invalid_json_is_400() {
        let store = ResourceStore::new();
        store.append(json!({"v": 0}));

        let response = replace_handler(&put("0", "{oops"), &store).unwrap();

        assert_eq!(response.status(), StatusCode::BadRequest);
        assert!(response.body_text().starts_with("Invalid JSON data: "));
        assert_eq!(store.get(0), Some(json!({"v": 0})));
    }

    #[test]
    fn test_delete_returns_removed_item_and_shifts() {
        let store = ResourceStore::new();
        store.append(json!({"id": "A"}));
        store.append(json!({"id": "B"}));

        let req = request("DELETE /data/0 HTTP/1.1\r\n\r\n");
        let response = delete_handler(&req, &store).unwrap();

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(
            body_json(&response),
            json!({"status": "success", "message": "Data deleted!", "deleted": {"id": "A"}})
        );

        let response = read_handler(&request("GET /data/0 HTTP/1.1\r\n\r\n"), &store).unwrap();
        assert_eq!(body_json(&response), json!({"id": "B"}));
    }

    #[test]
    fn test_delete_missing_item_is_404() {
        let store = ResourceStore::new();
        let req = request("DELETE /data/0 HTTP/1.1\r\n\r\n");
        let response = delete_handler(&req, &store).unwrap();

        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(response.body_text(), "Item with ID 0 not found for deletion");
    }
}
