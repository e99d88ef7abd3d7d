//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Este módulo implementa el router que mapea (método, path) a handlers.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Handler(&Request, &ResourceStore) → Response
//! ```
//!
//! Las rutas se evalúan en el orden en que se registraron y gana la primera
//! que coincide. Si ninguna coincide se responde 404. Si el handler falla
//! de una forma que no anticipó (un `Err` o un panic), el router responde
//! 500 con el mensaje de la falla: un request malo nunca tumba el proceso.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::error;

use crate::handlers::{self, HandlerError, HandlerResult};
use crate::http::{Method, Request, Response, StatusCode};
use crate::store::ResourceStore;

/// Mensaje del 404 para rutas desconocidas
pub const NOT_FOUND_MESSAGE: &str = "Page nahi mila";

/// Tipo de función handler
///
/// Un handler recibe el Request y el almacén, y retorna una Response
pub type Handler = fn(&Request, &ResourceStore) -> HandlerResult;

/// Cómo compara una ruta el path limpio del request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// Cualquier path
    Any,
    /// Igualdad exacta
    Exact(String),
    /// El path empieza con el prefijo
    Prefix(String),
}

impl PathPattern {
    fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Any => true,
            PathPattern::Exact(expected) => path == expected,
            PathPattern::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }
}

struct Route {
    method: Method,
    pattern: PathPattern,
    handler: Handler,
}

/// Router que mapea (método, path) a handlers
pub struct Router {
    routes: Vec<Route>,
    store: Arc<ResourceStore>,
}

impl Router {
    /// Crea un router vacío sobre el almacén dado
    pub fn new(store: Arc<ResourceStore>) -> Self {
        Self {
            routes: Vec::new(),
            store,
        }
    }

    /// Router con todas las rutas del servidor, en orden de prioridad
    ///
    /// | Método  | Path        | Handler   |
    /// |---------|-------------|-----------|
    /// | OPTIONS | *           | preflight |
    /// | GET     | /           | bienvenida|
    /// | GET     | /echo       | echo      |
    /// | POST    | /data       | crear     |
    /// | GET     | /data       | listar    |
    /// | GET     | /data/...   | leer      |
    /// | PUT     | /data/...   | reemplazar|
    /// | DELETE  | /data/...   | borrar    |
    pub fn with_default_routes(store: Arc<ResourceStore>) -> Self {
        let mut router = Self::new(store);

        router.register(Method::OPTIONS, PathPattern::Any, handlers::options_handler);
        router.register(Method::GET, PathPattern::Exact("/".into()), handlers::home_handler);
        router.register(Method::GET, PathPattern::Exact("/echo".into()), handlers::echo_handler);
        router.register(Method::POST, PathPattern::Exact("/data".into()), handlers::create_handler);
        router.register(Method::GET, PathPattern::Exact("/data".into()), handlers::list_handler);
        router.register(Method::GET, PathPattern::Prefix("/data/".into()), handlers::read_handler);
        router.register(Method::PUT, PathPattern::Prefix("/data/".into()), handlers::replace_handler);
        router.register(
            Method::DELETE,
            PathPattern::Prefix("/data/".into()),
            handlers::delete_handler,
        );

        router
    }

    /// Registra una ruta al final de la tabla (menor prioridad)
    ///
    /// # Ejemplo
    /// ```
    /// use std::sync::Arc;
    /// use crud_http_server::handlers::HandlerResult;
    /// use crud_http_server::http::{Method, Request, Response, StatusCode};
    /// use crud_http_server::router::{PathPattern, Router};
    /// use crud_http_server::store::ResourceStore;
    ///
    /// fn ping(_req: &Request, _store: &ResourceStore) -> HandlerResult {
    ///     Ok(Response::text(StatusCode::Ok, "pong"))
    /// }
    ///
    /// let mut router = Router::new(Arc::new(ResourceStore::new()));
    /// router.register(Method::GET, PathPattern::Exact("/ping".into()), ping);
    ///
    /// let request = Request::parse(b"GET /ping HTTP/1.1\r\n\r\n").unwrap();
    /// assert_eq!(router.route(&request).body(), b"pong");
    /// ```
    pub fn register(&mut self, method: Method, pattern: PathPattern, handler: Handler) {
        self.routes.push(Route {
            method,
            pattern,
            handler,
        });
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    ///
    /// Nunca falla: cualquier error termina en una Response.
    pub fn route(&self, request: &Request) -> Response {
        let route = self
            .routes
            .iter()
            .find(|r| &r.method == request.method() && r.pattern.matches(request.path()));

        let route = match route {
            Some(route) => route,
            None => return Response::text(StatusCode::NotFound, NOT_FOUND_MESSAGE),
        };

        let store = self.store.as_ref();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (route.handler)(request, store)));

        let failure = match outcome {
            Ok(Ok(response)) => return response,
            Ok(Err(e)) => e,
            Err(payload) => HandlerError::Internal(panic_message(payload.as_ref())),
        };

        error!(
            method = %request.method(),
            path = request.path(),
            error = %failure,
            "handler failed"
        );
        Response::text(
            StatusCode::InternalServerError,
            &format!("Server mein kuch galat ho gaya: {}", failure),
        )
    }

    /// Almacén compartido por las rutas
    pub fn store(&self) -> &Arc<ResourceStore> {
        &self.store
    }
}

/// Extrae el texto de un panic (`panic!("...")` produce `&str` o `String`)
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
