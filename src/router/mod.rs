//! # Dispatcher de requests
//! src/router/mod.rs
//!
//! ```text
//! Request → Dispatcher ─┬─ /cgi-bin/exec?cmd=... → Orchestrator (chunked)
//!                       └─ cualquier otro path  → StaticFiles
//! ```
//!
//! Una conexión que no envía nada no recibe respuesta.

use crate::config::Config;
use crate::error::{GatewayError, Result};
use crate::exec::{default_stats, CommandInvocation, Orchestrator};
use crate::http::{url_decode, ParseError, Request, Response, StaticFiles, StatusCode};
use std::io::{self, BufRead, Write};
use tracing::{debug, info, warn};

/// Prefijo de la ruta de ejecución
pub const EXEC_PREFIX: &str = "/cgi-bin/exec?cmd=";

/// Tamaño máximo del encabezado de un request
const MAX_HEAD_BYTES: usize = 16 * 1024;

pub struct Dispatcher {
    orchestrator: Orchestrator,
    files: StaticFiles,
}

impl Dispatcher {
    pub fn new(orchestrator: Orchestrator, files: StaticFiles) -> Self {
        Self { orchestrator, files }
    }

    pub fn from_config(config: &Config) -> Self {
        let orchestrator = Orchestrator::new(default_stats(), config.sample_interval(), config.chart);
        Self::new(orchestrator, StaticFiles::new(&config.root))
    }

    /// Atiende un request completo: lee el encabezado de `reader` y escribe la respuesta en `writer`
    pub fn serve_client<R: BufRead, W: Write>(&self, reader: &mut R, writer: &mut W) -> Result<()> {
        let head = match read_request_head(reader)? {
            RequestHead::Received(head) => head,
            RequestHead::Closed => {
                debug!("connection closed without a request");
                return Ok(());
            }
            RequestHead::TimedOut => {
                info!("timed out waiting for the request head, closing");
                return Ok(());
            }
            RequestHead::TooLarge => {
                warn!(limit = MAX_HEAD_BYTES, "request head too large");
                return send(writer, &Response::error(StatusCode::BadRequest, "Request head too large"));
            }
        };

        match Request::parse(&head) {
            Ok(request) => self.dispatch(&request, writer),
            Err(ParseError::EmptyRequest) => Ok(()),
            Err(e) => {
                warn!(error = %e, "invalid request");
                let status = match e {
                    ParseError::UnsupportedMethod(_) => StatusCode::MethodNotAllowed,
                    _ => StatusCode::BadRequest,
                };
                send(writer, &Response::error(status, &format!("Invalid: {}", e)))
            }
        }
    }

    pub fn dispatch<W: Write>(&self, request: &Request, writer: &mut W) -> Result<()> {
        info!(method = request.method().as_str(), target = request.target(), "request");

        let Some(encoded) = exec_command(request.target()) else {
            let response = self.files.serve(request.path());
            return send(writer, &response);
        };

        let command = url_decode(encoded);
        match CommandInvocation::parse(&command) {
            Ok(invocation) => self.orchestrator.run(writer, &invocation).map(|_| ()),
            Err(GatewayError::EmptyCommand) => {
                send(writer, &Response::error(StatusCode::BadRequest, "Empty command"))
            }
            Err(e) => Err(e),
        }
    }
}

/// Parte codificada del comando (todo lo que sigue al prefijo)
pub fn exec_command(target: &str) -> Option<&str> {
    target.strip_prefix(EXEC_PREFIX)
}

/// Resultado de leer el encabezado
enum RequestHead {
    Received(Vec<u8>),
    /// EOF sin ningún byte
    Closed,
    /// Venció el timeout de lectura del socket
    TimedOut,
    TooLarge,
}

/// Lee líneas hasta la línea vacía (o EOF)
fn read_request_head<R: BufRead>(reader: &mut R) -> Result<RequestHead> {
    let mut head = Vec::new();

    loop {
        let start = head.len();
        let read = match reader.read_until(b'\n', &mut head) {
            Ok(read) => read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                return Ok(RequestHead::TimedOut);
            }
            Err(e) => return Err(e.into()),
        };
        if read == 0 {
            break;
        }

        let line = &head[start..];
        if line == b"\r\n" || line == b"\n" {
            break;
        }

        if head.len() > MAX_HEAD_BYTES {
            return Ok(RequestHead::TooLarge);
        }
    }

    Ok(if head.is_empty() {
        RequestHead::Closed
    } else {
        RequestHead::Received(head)
    })
}

fn send<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    if response.status().is_success() {
        debug!(status = %response.status(), bytes = response.body().len(), "response");
    } else {
        info!(status = %response.status(), "response");
    }

    writer
        .write_all(&response.to_bytes())
        .and_then(|()| writer.flush())
        .map_err(GatewayError::ClientDisconnected)
}
