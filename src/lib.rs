//! # Exec Gateway
//! src/lib.rs
//!
//! Servidor HTTP que sirve archivos estáticos o ejecuta un comando y
//! transmite su salida en vivo (chunked), seguida del código de salida y
//! de un reporte del uso de CPU y memoria del proceso.
//!
//! ## Arquitectura
//!
//! - `http`: parsing de requests, responses, archivos estáticos y codificación chunked
//! - `exec`: lanzamiento, muestreo de recursos, reporte y orquestación
//! - `router`: despacho de cada request a archivos o ejecución
//! - `server`: listener TCP y pool acotado de workers
//! - `config`, `logging`, `error`: configuración CLI/env, tracing y errores
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use exec_gateway::config::Config;
//! use exec_gateway::server::Server;
//!
//! let config = Config::default();
//! let server = Server::bind(&config).expect("bind");
//! server.run().expect("server");
//! ```

pub mod config;
pub mod error;
pub mod exec;
pub mod http;
pub mod logging;
pub mod router;
pub mod server;

pub use error::{GatewayError, Result};
