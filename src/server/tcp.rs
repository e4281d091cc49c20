//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Un thread acepta conexiones y las encola; un pool fijo de workers las
//! atiende. Con la cola llena la conexión se rechaza con 503 sin pasar
//! por el pool. Cada conexión tiene un timeout de lectura: un cliente que
//! no termina de enviar el encabezado no retiene a su worker.

use super::pool::ConnectionQueue;
use crate::config::Config;
use crate::error::{GatewayError, Result};
use crate::http::{Response, StatusCode};
use crate::router::Dispatcher;
use std::io::{self, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct Server {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    queue: Arc<ConnectionQueue<TcpStream>>,
    workers: usize,
    read_timeout: Duration,
}

impl Server {
    pub fn bind(config: &Config) -> io::Result<Self> {
        let address = config.address();
        let listener = TcpListener::bind(&address)?;
        info!(address = %listener.local_addr()?, "listening");

        Ok(Self {
            listener,
            dispatcher: Arc::new(Dispatcher::from_config(config)),
            queue: Arc::new(ConnectionQueue::new(config.queue_capacity)),
            workers: config.workers,
            read_timeout: config.read_timeout(),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Arranca los workers y acepta conexiones hasta que el listener falle
    pub fn run(self) -> io::Result<()> {
        for id in 0..self.workers {
            let queue = Arc::clone(&self.queue);
            let dispatcher = Arc::clone(&self.dispatcher);
            let read_timeout = self.read_timeout;
            thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || worker_loop(&queue, &dispatcher, read_timeout))?;
        }
        info!(workers = self.workers, queue_capacity = self.queue.capacity(), "worker pool started");

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let peer = peer_name(&stream);
                    debug!(peer = %peer, "connection accepted");

                    if let Err(stream) = self.queue.try_push(stream) {
                        warn!(peer = %peer, "queue full, rejecting connection");
                        reject(stream);
                    }
                }
                Err(e) => error!(error = %e, "accept failed"),
            }
        }

        Ok(())
    }
}

fn worker_loop(queue: &ConnectionQueue<TcpStream>, dispatcher: &Dispatcher, read_timeout: Duration) {
    loop {
        let stream = queue.pop();
        let peer = peer_name(&stream);

        match handle_connection(stream, dispatcher, read_timeout) {
            Ok(()) => debug!(peer = %peer, "connection closed"),
            Err(GatewayError::ClientDisconnected(e)) => {
                info!(peer = %peer, error = %e, "client disconnected")
            }
            Err(e) => error!(peer = %peer, error = %e, "connection failed"),
        }
    }
}

/// Atiende un request y cierra la conexión
pub fn handle_connection(stream: TcpStream, dispatcher: &Dispatcher, read_timeout: Duration) -> Result<()> {
    stream.set_read_timeout(Some(read_timeout))?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;
    dispatcher.serve_client(&mut reader, &mut writer)
}

fn reject(mut stream: TcpStream) {
    let response = Response::error(StatusCode::ServiceUnavailable, "Server busy, try again later");
    if let Err(e) = stream.write_all(&response.to_bytes()).and_then(|()| stream.flush()) {
        debug!(error = %e, "could not send 503");
    }
}

fn peer_name(stream: &TcpStream) -> String {
    stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::Shutdown;

    fn config(root: &std::path::Path, workers: usize, queue_capacity: usize) -> Config {
        Config {
            port: 0,
            root: root.to_path_buf(),
            workers,
            queue_capacity,
            sample_interval_ms: 50,
            read_timeout_ms: 300,
            ..Config::default()
        }
    }

    fn start(config: &Config) -> SocketAddr {
        let server = Server::bind(config).unwrap();
        let addr = server.local_addr().unwrap();
        thread::spawn(move || server.run());
        addr
    }

    fn get(addr: SocketAddr, target: &str) -> String {
        let mut client = TcpStream::connect(addr).unwrap();
        write!(client, "GET {} HTTP/1.1\r\nHost: test\r\n\r\n", target).unwrap();
        client.shutdown(Shutdown::Write).unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn test_handle_connection_static_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<p>hi</p>").unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let dispatcher = Dispatcher::from_config(&config(dir.path(), 1, 1));

        let t = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            handle_connection(stream, &dispatcher, Duration::from_secs(5)).unwrap();
        });

        let text = get(addr, "/index.html");
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Type: text/html"));
        assert!(text.ends_with("<p>hi</p>"));

        t.join().unwrap();
    }

    #[test]
    fn test_handle_connection_peer_closed_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let dispatcher = Dispatcher::from_config(&config(dir.path(), 1, 1));

        let t = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            handle_connection(stream, &dispatcher, Duration::from_secs(5)).unwrap();
        });

        drop(TcpStream::connect(addr).unwrap());
        t.join().unwrap();
    }

    #[test]
    fn test_workers_serve_concurrent_clients() {
        let dir = tempfile::tempdir().unwrap();
        let addr = start(&config(dir.path(), 4, 16));

        let clients: Vec<_> = (0..4)
            .map(|i| thread::spawn(move || get(addr, &format!("/cgi-bin/exec?cmd=echo+client{}", i))))
            .collect();

        for (i, client) in clients.into_iter().enumerate() {
            let text = client.join().unwrap();
            assert!(text.contains(&format!("client{}\n", i)));
            assert!(text.contains("Exit code: 0\n"));
        }
    }

    #[test]
    fn test_full_queue_gets_503() {
        let dir = tempfile::tempdir().unwrap();
        let addr = start(&config(dir.path(), 1, 1));

        // Ocupa al único worker: la respuesta ya empezó cuando llega el primer byte
        let mut busy = TcpStream::connect(addr).unwrap();
        busy.write_all(b"GET /cgi-bin/exec?cmd=sleep+2 HTTP/1.1\r\n\r\n").unwrap();
        let mut first = [0u8; 1];
        busy.read_exact(&mut first).unwrap();

        // Ocupa la cola
        let _queued = TcpStream::connect(addr).unwrap();
        thread::sleep(Duration::from_millis(100));

        // Sin enviar nada: el rechazo no lee el request
        let mut rejected = TcpStream::connect(addr).unwrap();
        let mut buf = Vec::new();
        rejected.read_to_end(&mut buf).unwrap();
        let text = String::from_utf8_lossy(&buf);
        assert!(text.starts_with("HTTP/1.1 503 Service Unavailable\r\n"));
    }

    #[test]
    fn test_idle_client_releases_worker() {
        let dir = tempfile::tempdir().unwrap();
        let addr = start(&config(dir.path(), 1, 4));

        // Envía media línea y se queda callado
        let mut idle = TcpStream::connect(addr).unwrap();
        idle.write_all(b"GET /x").unwrap();
        thread::sleep(Duration::from_millis(50));

        let mut client = TcpStream::connect(addr).unwrap();
        client.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        client.write_all(b"GET /cgi-bin/exec?cmd=echo+hi HTTP/1.1\r\n\r\n").unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        let text = String::from_utf8_lossy(&buf);
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Exit code: 0\n"));

        // El cliente inactivo fue cerrado sin respuesta
        let mut rest = Vec::new();
        idle.read_to_end(&mut rest).unwrap();
        assert!(rest.is_empty());
    }
}
