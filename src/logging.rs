//! # Logging
//! src/logging.rs
//!
//! Inicializa `tracing` + `tracing-subscriber`.
//!
//! Prioridad para el nivel:
//! 1. `--log-level` en la línea de comandos
//! 2. variable `GATEWAY_LOG` (sintaxis de `EnvFilter`, ej: "debug" o "exec_gateway=trace")
//! 3. `info`
//!
//! Los logs van a STDERR: en modo `--request-file` la respuesta HTTP sale por STDOUT.

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "GATEWAY_LOG";

/// Niveles aceptados por `--log-level`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Instala el subscriber global. Llamar una sola vez, desde `main`.
pub fn init_logging(cli_level: Option<LogLevel>) {
    let filter = build_filter(cli_level, std::env::var(LOG_ENV).ok().as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .init();
}

fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(level.as_str());
    }

    env_value
        .and_then(|value| EnvFilter::try_new(value.trim()).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
