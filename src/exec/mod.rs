//! # Ejecución de comandos
//!
//! Ruta `/cgi-bin/exec?cmd=...`: lanza el comando, transmite su salida
//! línea por línea y cierra con el código de salida y el reporte de recursos.
//!
//! - `launcher`: lanza el proceso y expone pid, salida y `wait`
//! - `stats`: acceso al registro de contabilidad del SO (`/proc/<pid>/stat`)
//! - `sampler`: una muestra de CPU/memoria por intervalo mientras el hijo vive
//! - `report`: tabla HTML y datos del gráfico
//! - `orchestrator`: une todo en una única respuesta chunked

pub mod launcher;
pub mod orchestrator;
pub mod report;
pub mod sampler;
pub mod stats;

pub use launcher::{ChildProcess, CommandInvocation};
pub use orchestrator::Orchestrator;
pub use report::ExecutionReport;
pub use sampler::{ResourceSample, ResourceSampler};
pub use stats::{default_stats, ProcessStats, ProcessUsage};
