//! # Configuración del Gateway
//! src/config.rs
//!
//! Configuración del gateway con soporte para argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./exec_gateway --port 8080 --chart --workers 16
//! ./exec_gateway --request-file get_request.txt > response.txt
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 HTTP_HOST=0.0.0.0 CHART=true ./exec_gateway
//! ```

use crate::logging::LogLevel;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Configuración del gateway
#[derive(Debug, Clone, Parser)]
#[command(name = "exec_gateway")]
#[command(about = "Gateway HTTP: archivos estáticos o salida en vivo de un comando con uso de recursos")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor (0 = puerto asignado por el SO)
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    /// Directorio raíz para los archivos estáticos
    #[arg(long, default_value = ".", env = "DOC_ROOT")]
    pub root: PathBuf,

    /// Incluir los datos del gráfico (JSON) en el reporte de recursos
    #[arg(long, env = "CHART")]
    pub chart: bool,

    // === Pool de conexiones ===
    /// Número de workers que atienden conexiones
    #[arg(long, default_value = "8", env = "WORKERS")]
    pub workers: usize,

    /// Conexiones aceptadas que pueden esperar un worker libre
    #[arg(long = "queue-capacity", default_value = "64", env = "QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    /// Tiempo máximo esperando el encabezado del request, en milisegundos
    #[arg(long = "read-timeout-ms", default_value = "10000", env = "READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    // === Muestreo ===
    /// Intervalo entre muestras de CPU/memoria, en milisegundos
    #[arg(long = "sample-interval-ms", default_value = "1000", env = "SAMPLE_INTERVAL_MS")]
    pub sample_interval_ms: u64,

    /// Atiende un único request leído de este archivo y escribe la respuesta en stdout
    #[arg(long = "request-file")]
    pub request_file: Option<PathBuf>,

    /// Nivel de log (si no se indica se usa GATEWAY_LOG, o info)
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevel>,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use exec_gateway::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("Workers must be >= 1".to_string());
        }
        if self.queue_capacity == 0 {
            return Err("Queue capacity must be >= 1".to_string());
        }
        if self.read_timeout_ms == 0 {
            return Err("Read timeout must be > 0".to_string());
        }
        if self.sample_interval_ms == 0 {
            return Err("Sample interval must be > 0".to_string());
        }
        if self.request_file.is_none() && !self.root.is_dir() {
            return Err(format!("Document root is not a directory: {}", self.root.display()));
        }

        Ok(())
    }

    /// Resume la configuración en el log
    pub fn log_summary(&self) {
        info!(address = %self.address(), root = %self.root.display(), "network");
        info!(
            workers = self.workers,
            queue_capacity = self.queue_capacity,
            read_timeout_ms = self.read_timeout_ms,
            "connection pool"
        );
        info!(
            interval_ms = self.sample_interval_ms,
            chart = self.chart,
            "resource sampling"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            root: PathBuf::from("."),
            chart: false,
            workers: 8,
            queue_capacity: 64,
            read_timeout_ms: 10_000,
            sample_interval_ms: 1000,
            request_file: None,
            log_level: None,
        }
    }
}
