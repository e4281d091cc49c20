//! # Errores del Gateway
//! src/error.rs
//!
//! Tipo de error común a todo el crate y alias `Result`.

use crate::http::request::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid request: {0}")]
    Parse(#[from] ParseError),

    /// El comando decodificado no contiene ninguna palabra
    #[error("Empty command")]
    EmptyCommand,

    /// Falló una escritura hacia el cliente: la petición se abandona
    #[error("Client disconnected: {0}")]
    ClientDisconnected(std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
