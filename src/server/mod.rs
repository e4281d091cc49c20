//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! 1. Escucha en un puerto
//! 2. Acepta conexiones y las encola (`pool`)
//! 3. Un pool fijo de workers lee cada request y lo pasa al `Dispatcher`

pub mod pool;
pub mod tcp;

pub use pool::ConnectionQueue;
pub use tcp::{handle_connection, Server};
