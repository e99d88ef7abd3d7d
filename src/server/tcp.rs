//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Implementación del listener que maneja múltiples conexiones simultáneas.
//! Cada conexión se procesa en su propia tarea de tokio:
//!
//! ```text
//! accept → leer request completo → parsear → rutear → escribir → cerrar
//! ```
//!
//! La única suspensión ocurre en la lectura/escritura del socket; el parsing
//! y el handler corren de corrido, sin `.await` de por medio.
//!
//! ## Reensamblado
//!
//! Un request puede llegar partido en varios `read`. Se acumulan bytes hasta
//! tener el `\r\n\r\n` final de los headers más los bytes que declara
//! `Content-Length`, o hasta que el cliente cierre su lado de escritura.
//! Si el largo declarado supera el límite se deja de leer apenas terminan
//! los headers: el parser responde 413 sin esperar el body.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::config::Config;
use crate::http::request::parse_int_prefix;
use crate::http::{Request, Response, MAX_BODY_SIZE};
use crate::router::Router;
use crate::store::ResourceStore;

/// Tamaño de cada lectura del socket
const READ_CHUNK_SIZE: usize = 8192;

/// Espacio reservado para request line + headers
const MAX_HEADER_SIZE: usize = 8192;

/// Nunca se bufferean más bytes que esto por conexión
const MAX_REQUEST_SIZE: usize = MAX_BODY_SIZE + MAX_HEADER_SIZE;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Servidor HTTP/1.1 con almacén compartido
pub struct Server {
    listener: TcpListener,
    router: Arc<Router>,
}

impl Server {
    /// Hace bind en `config.address()` con un almacén vacío
    pub async fn bind(config: &Config) -> io::Result<Self> {
        Self::bind_with_store(config, Arc::new(ResourceStore::new())).await
    }

    /// Hace bind usando un almacén ya construido
    pub async fn bind_with_store(config: &Config, store: Arc<ResourceStore>) -> io::Result<Self> {
        let address = config.address();
        let listener = TcpListener::bind(&address).await?;

        Ok(Self {
            listener,
            router: Arc::new(Router::with_default_routes(store)),
        })
    }

    /// Dirección real del listener (útil con puerto 0)
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Almacén compartido por todas las conexiones
    pub fn store(&self) -> &Arc<ResourceStore> {
        self.router.store()
    }

    /// Acepta conexiones para siempre
    pub async fn run(self) -> io::Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Acepta conexiones hasta que `shutdown` se complete
    ///
    /// Las conexiones en curso siguen su tarea; solo se deja de aceptar nuevas.
    pub async fn run_until<F>(self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()>,
    {
        let address = self.local_addr()?;
        info!(%address, "Servidor escuchando");

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => self.spawn_connection(stream, peer),
                    Err(e) => error!(error = %e, "Error al aceptar conexión"),
                },
                _ = &mut shutdown => {
                    info!("Servidor detenido, no se aceptan más conexiones");
                    return Ok(());
                }
            }
        }
    }

    fn spawn_connection(&self, stream: TcpStream, peer: SocketAddr) {
        let router = Arc::clone(&self.router);
        let id = NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed);
        let span = info_span!("connection", id, %peer);

        tokio::spawn(
            async move {
                debug!("Nueva conexión");
                if let Err(e) = handle_connection(stream, &router).await {
                    error!(error = %e, "Error en la conexión");
                }
            }
            .instrument(span),
        );
    }
}

/// Atiende un único request y cierra la conexión
pub(crate) async fn handle_connection(mut stream: TcpStream, router: &Router) -> io::Result<()> {
    let start = Instant::now();

    let buffer = read_request(&mut stream).await?;

    if buffer.is_empty() {
        debug!("Conexión cerrada sin datos");
        return Ok(());
    }

    let response = match Request::parse(&buffer) {
        Ok(request) => {
            info!(method = %request.method(), path = request.raw_path(), "Request recibido");
            router.route(&request)
        }
        Err(e) => {
            warn!(error = %e, bytes = buffer.len(), "Request inválido");
            Response::text(e.status(), &e.to_string())
        }
    };

    stream.write_all(&response.to_bytes()).await?;
    stream.flush().await?;
    stream.shutdown().await?;

    info!(
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Response enviada"
    );

    Ok(())
}

/// Lee del socket hasta tener un request completo
///
/// Retorna vacío si el cliente cerró sin mandar nada.
pub(crate) async fn read_request<R>(reader: &mut R) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::with_capacity(READ_CHUNK_SIZE);
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    loop {
        let bytes_read = reader.read(&mut chunk).await?;
        if bytes_read == 0 {
            break;
        }

        buffer.extend_from_slice(&chunk[..bytes_read]);

        if request_complete(&buffer) || buffer.len() >= MAX_REQUEST_SIZE {
            break;
        }
    }

    Ok(buffer)
}

/// ¿Ya están los headers y todo el body declarado?
fn request_complete(buffer: &[u8]) -> bool {
    let header_end = match buffer.windows(4).position(|w| w == b"\r\n\r\n") {
        Some(pos) => pos + 4,
        None => return false,
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]);

    // Igual que el parser: si el header se repite, vale el último
    let declared = head
        .split("\r\n")
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .last()
        .and_then(|(_, value)| parse_int_prefix(value))
        .unwrap_or(0);

    if declared <= 0 || declared > MAX_BODY_SIZE as i64 {
        return true;
    }

    buffer.len() - header_end >= declared as usize
}
