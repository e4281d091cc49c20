//! # Construcción de Respuestas HTTP
//!
//! API para construir respuestas y convertirlas a bytes.
//!
//! Dos formas de respuesta:
//! - completa (`to_bytes`): headers + body con `Content-Length`, para archivos y errores;
//! - encabezado chunked (`head_bytes` sobre `Response::chunked`): el body lo
//!   escribe después un [`ChunkedWriter`](super::ChunkedWriter).
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/html\r\n
//! Transfer-Encoding: chunked\r\n
//! \r\n
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use exec_gateway::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "text/plain")
//!     .with_body_bytes(b"hello".to_vec());
//!
//! let bytes = response.to_bytes();
//! assert!(bytes.ends_with(b"\r\n\r\nhello"));
//! ```

use super::StatusCode;
use std::collections::HashMap;

pub const SERVER_NAME: &str = "exec-gateway/0.1";

/// Respuesta HTTP/1.1 (siempre `Connection: close`)
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,

    /// Usamos HashMap para evitar duplicados
    headers: HashMap<String, String>,

    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta con los headers comunes (`Server`, `Connection`)
    pub fn new(status: StatusCode) -> Self {
        let mut response = Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        };
        response.add_header("Server", SERVER_NAME);
        response.add_header("Connection", "close");
        response
    }

    /// Encabezado de una respuesta con cuerpo chunked
    pub fn chunked(content_type: &str) -> Self {
        Self::new(StatusCode::Ok)
            .with_header("Content-Type", content_type)
            .with_header("Transfer-Encoding", "chunked")
    }

    /// Agrega un header (si ya existe, se sobrescribe)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Establece el cuerpo y calcula `Content-Length`
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self.headers.insert("Content-Length".to_string(), self.body.len().to_string());
        self
    }

    /// Respuesta de error con un mensaje en texto plano
    ///
    /// # Ejemplo
    /// ```
    /// use exec_gateway::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::NotFound, "File not found: /x");
    /// assert_eq!(response.status(), StatusCode::NotFound);
    /// ```
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::new(status)
            .with_header("Content-Type", "text/plain")
            .with_body_bytes(format!("{}\n{}\n", status, message).into_bytes())
    }

    /// Status line + headers + línea vacía
    pub fn head_bytes(&self) -> Vec<u8> {
        let mut result = format!("HTTP/1.1 {}\r\n", self.status).into_bytes();

        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result
    }

    /// Respuesta completa lista para enviar por el socket
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = self.head_bytes();
        result.extend_from_slice(&self.body);
        result
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
