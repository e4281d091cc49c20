//! # Exec Gateway - Entry Point
//! src/main.rs
//!
//! Dos modos:
//! - servidor: escucha en `host:port` con un pool de workers
//! - `--request-file`: atiende un único request leído del archivo y
//!   escribe la respuesta en stdout

use exec_gateway::config::Config;
use exec_gateway::logging::init_logging;
use exec_gateway::router::Dispatcher;
use exec_gateway::server::Server;
use exec_gateway::{GatewayError, Result};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};

fn main() -> ExitCode {
    let config = Config::new();
    init_logging(config.log_level);

    if let Err(e) = config.validate() {
        error!(error = %GatewayError::Config(e), "invalid configuration");
        return ExitCode::from(1);
    }

    match &config.request_file {
        Some(path) => serve_request_file(&config, path),
        None => run_server(&config),
    }
}

fn serve_request_file(config: &Config, path: &Path) -> ExitCode {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            error!(path = %path.display(), error = %e, "cannot open request file");
            return ExitCode::from(2);
        }
    };

    let dispatcher = Dispatcher::from_config(config);
    let mut reader = BufReader::new(file);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match dispatcher.serve_client(&mut reader, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "request failed");
            ExitCode::from(1)
        }
    }
}

fn run_server(config: &Config) -> ExitCode {
    config.log_summary();

    match start(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fatal server error");
            ExitCode::from(1)
        }
    }
}

fn start(config: &Config) -> Result<()> {
    let server = Server::bind(config)?;
    info!(address = %server.local_addr()?, "exec gateway ready");
    server.run()?;
    Ok(())
}
