//! # Chunked Transfer Encoding
//! src/http/chunked.rs
//!
//! Cada llamada a `write_chunk` emite un frame completo y lo envía (flush):
//!
//! ```text
//! 5\r\n
//! hello\r\n
//! 0\r\n
//! \r\n
//! ```
//!
//! `finish` consume el writer: después del chunk final no se puede escribir nada más.

use std::io::{self, Write};

pub struct ChunkedWriter<'a, W: Write> {
    out: &'a mut W,
}

impl<'a, W: Write> ChunkedWriter<'a, W> {
    pub fn new(out: &'a mut W) -> Self {
        Self { out }
    }

    /// Escribe `payload` como un chunk. Un payload vacío no escribe nada:
    /// el único chunk de longitud 0 es el terminador.
    pub fn write_chunk(&mut self, payload: &[u8]) -> io::Result<()> {
        if payload.is_empty() {
            return Ok(());
        }

        write!(self.out, "{:x}\r\n", payload.len())?;
        self.out.write_all(payload)?;
        self.out.write_all(b"\r\n")?;
        self.out.flush()
    }

    /// Escribe el chunk terminador `0\r\n\r\n`
    pub fn finish(self) -> io::Result<()> {
        self.out.write_all(b"0\r\n\r\n")?;
        self.out.flush()
    }
}
