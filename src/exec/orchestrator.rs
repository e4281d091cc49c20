//! # Orquestador de ejecución
//! src/exec/orchestrator.rs
//!
//! Coordina un request de ejecución de principio a fin:
//!
//! ```text
//! Idle -> HeadersSent -> Streaming -> AwaitingCompletion -> Closed
//!   headers +           una línea     wait() + "Exit code"    join(sampler) +
//!   HTML_START          = un chunk                            reporte + 0\r\n\r\n
//! ```
//!
//! Solo este thread escribe en el stream del cliente. El sampler corre en
//! paralelo y entrega sus muestras al hacer `join`, después del `wait()`.
//!
//! Si el cliente se desconecta mientras el comando sigue corriendo, el hijo
//! se mata y se cosecha; no se intenta ninguna otra escritura.

use super::launcher::{self, ChildProcess, CommandInvocation};
use super::report::{ExecutionReport, HTML_START};
use super::sampler::{ResourceSampler, SamplerHandle};
use super::stats::ProcessStats;
use crate::error::{GatewayError, Result};
use crate::http::{ChunkedWriter, Response};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tope de bytes por chunk de salida
pub const MAX_LINE_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct Orchestrator {
    sampler: ResourceSampler,
    chart: bool,
}

impl Orchestrator {
    pub fn new(stats: Arc<dyn ProcessStats>, sample_interval: Duration, chart: bool) -> Self {
        Self {
            sampler: ResourceSampler::new(stats, sample_interval),
            chart,
        }
    }

    /// Ejecuta `invocation` y transmite la respuesta completa a `out`.
    /// Devuelve el código de salida del comando.
    pub fn run<W: Write>(&self, out: &mut W, invocation: &CommandInvocation) -> Result<i32> {
        // Idle -> HeadersSent
        out.write_all(&Response::chunked("text/html").head_bytes())
            .map_err(GatewayError::ClientDisconnected)?;
        let mut chunks = ChunkedWriter::new(out);
        chunks
            .write_chunk(HTML_START.as_bytes())
            .map_err(GatewayError::ClientDisconnected)?;

        // HeadersSent -> Streaming
        let mut child = launcher::spawn(invocation);
        let sampler = self.sampler.spawn(child.pid());
        info!(command = %invocation, pid = ?child.pid(), "command started");

        if let Err(e) = stream_output(&mut child, &mut chunks) {
            warn!(command = %invocation, error = %e, "client gone while streaming, killing command");
            child.kill();
            abandon(child, sampler);
            return Err(GatewayError::ClientDisconnected(e));
        }

        // Streaming -> AwaitingCompletion
        let waited = child.wait();
        self.complete(chunks, invocation, waited, sampler)
    }

    /// AwaitingCompletion -> Closed. El sampler se espera siempre, aunque
    /// `wait()` haya fallado.
    fn complete<W: Write>(
        &self,
        mut chunks: ChunkedWriter<'_, W>,
        invocation: &CommandInvocation,
        waited: io::Result<i32>,
        sampler: SamplerHandle,
    ) -> Result<i32> {
        let exit_code = match waited {
            Ok(code) => code,
            Err(e) => {
                warn!(command = %invocation, error = %e, "could not wait for command");
                sampler.join();
                if let Err(write_error) = chunks.finish() {
                    debug!(error = %write_error, "could not close response");
                }
                return Err(e.into());
            }
        };
        info!(command = %invocation, exit_code, "command finished");

        let exit_line = format!("Exit code: {}\n", exit_code);
        let exit_written = chunks.write_chunk(exit_line.as_bytes());

        let samples = sampler.join();
        debug!(command = %invocation, samples = samples.len(), "sampler joined");
        exit_written.map_err(GatewayError::ClientDisconnected)?;

        let report = ExecutionReport::from_samples(&samples);
        chunks
            .write_chunk(report.render(self.chart).as_bytes())
            .map_err(GatewayError::ClientDisconnected)?;
        chunks.finish().map_err(GatewayError::ClientDisconnected)?;

        Ok(exit_code)
    }
}

/// Una línea de la salida del hijo = un chunk. Una línea más larga que
/// `MAX_LINE_BYTES` se parte en chunks de ese tamaño. Solo los errores de
/// escritura se propagan; un error leyendo del hijo cuenta como fin de la salida.
fn stream_output<W: Write>(child: &mut ChildProcess, chunks: &mut ChunkedWriter<'_, W>) -> io::Result<()> {
    let mut reader = BufReader::new(child.take_output());
    let mut line = Vec::new();

    loop {
        line.clear();
        match reader.by_ref().take(MAX_LINE_BYTES as u64).read_until(b'\n', &mut line) {
            Ok(0) => return Ok(()),
            Ok(_) => {
                // Sin salto al final y sin llegar al tope: EOF a mitad de línea
                if !line.ends_with(b"\n") && line.len() < MAX_LINE_BYTES {
                    line.push(b'\n');
                }
                chunks.write_chunk(&line)?;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(pid = ?child.pid(), error = %e, "failed reading command output");
                return Ok(());
            }
        }
    }
}

/// Cosecha el hijo y espera al sampler tras una desconexión
fn abandon(child: ChildProcess, sampler: SamplerHandle) {
    if let Err(e) = child.wait() {
        warn!(error = %e, "failed to reap killed command");
    }
    sampler.join();
}
