//! # Módulo HTTP
//!
//! Lo justo de HTTP/1.1 para el gateway:
//!
//! - Parsing del encabezado de un request y decodificación de URLs
//! - Construcción de responses (completas o con encabezado chunked)
//! - Framing de chunked transfer encoding
//! - Servidor de archivos estáticos
//!
//! ### Formato de la respuesta de un comando
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Transfer-Encoding: chunked\r\n
//! Content-Type: text/html\r\n
//! \r\n
//! 6\r\n
//! hello\n\r\n
//! 0\r\n
//! \r\n
//! ```
//!
//! No hay conexiones persistentes: toda respuesta lleva `Connection: close`.

pub mod chunked;
pub mod files;
pub mod request;
pub mod response;
pub mod status;

pub use chunked::ChunkedWriter;
pub use files::StaticFiles;
pub use request::{url_decode, Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
