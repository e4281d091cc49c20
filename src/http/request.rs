//! # Parsing de Requests HTTP
//! src/http/request.rs
//!
//! Parser mínimo del encabezado de un request.
//!
//! ## Formato
//!
//! ```text
//! GET /cgi-bin/exec?cmd=ls+-l HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! \r\n
//! ```
//!
//! 1. **Request Line**: `METHOD TARGET VERSION`
//! 2. **Headers**: Pares `Name: Value` (uno por línea)
//! 3. **Empty Line**: fin del encabezado. El gateway no lee body.

use std::collections::HashMap;
use thiserror::Error;

/// Métodos HTTP reconocidos. Solo GET se atiende.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
}

impl Method {
    fn parse(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
        }
    }
}

/// Request HTTP parseado
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,

    /// Target tal como llegó (path + query, sin decodificar)
    target: String,

    /// Parte del target antes de '?'
    path: String,

    /// Parte del target después de '?' (sin decodificar)
    query: Option<String>,

    headers: HashMap<String, String>,

    version: String,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid request line format")]
    InvalidRequestLine,

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("Invalid HTTP version: {0}")]
    InvalidHttpVersion(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Empty request")]
    EmptyRequest,
}

impl Request {
    /// Parsea el encabezado de un request desde bytes
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use exec_gateway::http::Request;
    ///
    /// let raw = b"GET /cgi-bin/exec?cmd=ls HTTP/1.1\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.path(), "/cgi-bin/exec");
    /// assert_eq!(request.query(), Some("cmd=ls"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        let request_str =
            std::str::from_utf8(buffer).map_err(|_| ParseError::InvalidRequestLine)?;

        if request_str.trim().is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        // Se aceptan tanto \r\n como \n sueltos
        let mut lines = request_str.lines();
        let request_line = lines.next().ok_or(ParseError::EmptyRequest)?;

        let (method, target, version) = Self::parse_request_line(request_line)?;
        let headers = Self::parse_headers(lines)?;

        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (target.clone(), None),
        };

        Ok(Request {
            method,
            target,
            path,
            query,
            headers,
            version,
        })
    }

    /// Formato: `GET /path?query HTTP/1.1`
    fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        if parts.len() != 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        let version = parts[2].to_string();
        if version != "HTTP/1.0" && version != "HTTP/1.1" {
            return Err(ParseError::InvalidHttpVersion(version));
        }

        let method = Method::parse(parts[0])?;

        Ok((method, parts[1].to_string(), version))
    }

    fn parse_headers<'a>(
        lines: impl Iterator<Item = &'a str>,
    ) -> Result<HashMap<String, String>, ParseError> {
        let mut headers = HashMap::new();

        for line in lines {
            // La línea vacía marca el fin de los headers
            if line.trim().is_empty() {
                break;
            }

            match line.split_once(':') {
                Some((name, value)) => {
                    headers.insert(name.trim().to_string(), value.trim().to_string());
                }
                None => return Err(ParseError::InvalidHeader(line.to_string())),
            }
        }

        Ok(headers)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Target completo sin decodificar
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Decodifica un valor URL-encoded: `+` pasa a espacio y `%XX` al byte XX.
///
/// Un `%` que no va seguido de dos dígitos hexadecimales se deja tal cual.
/// Los bytes resultantes que no sean UTF-8 válido se reemplazan.
///
/// # Ejemplo
/// ```
/// use exec_gateway::http::url_decode;
///
/// assert_eq!(url_decode("a+b%20c"), "a b c");
/// assert_eq!(url_decode("ls"), "ls");
/// ```
pub fn url_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                decoded.push(b' ');
                i += 1;
            }
            b'%' => match (bytes.get(i + 1).and_then(hex_value), bytes.get(i + 2).and_then(hex_value)) {
                (Some(high), Some(low)) => {
                    decoded.push(high << 4 | low);
                    i += 3;
                }
                _ => {
                    decoded.push(b'%');
                    i += 1;
                }
            },
            other => {
                decoded.push(other);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&decoded).into_owned()
}

fn hex_value(byte: &u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_get() {
        let raw = b"GET / HTTP/1.0\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.path(), "/");
        assert_eq!(request.query(), None);
        assert_eq!(request.version(), "HTTP/1.0");
    }

    #[test]
    fn test_parse_exec_target_kept_raw() {
        let raw = b"GET /cgi-bin/exec?cmd=ls+-l%20/tmp&x=1 HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.target(), "/cgi-bin/exec?cmd=ls+-l%20/tmp&x=1");
        assert_eq!(request.path(), "/cgi-bin/exec");
        assert_eq!(request.query(), Some("cmd=ls+-l%20/tmp&x=1"));
    }

    #[test]
    fn test_parse_with_headers() {
        let raw = b"GET / HTTP/1.1\r\nHost: localhost:8080\r\nUser-Agent: test\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.header("Host"), Some("localhost:8080"));
        assert_eq!(request.header("User-Agent"), Some("test"));
    }

    #[test]
    fn test_parse_bare_newlines() {
        let raw = b"GET /index.html HTTP/1.1\nHost: x\n\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.path(), "/index.html");
        assert_eq!(request.header("Host"), Some("x"));
    }

    #[test]
    fn test_unsupported_method() {
        let raw = b"POST / HTTP/1.1\r\n\r\n";
        let result = Request::parse(raw);

        assert_eq!(result.unwrap_err(), ParseError::UnsupportedMethod("POST".to_string()));
    }

    #[test]
    fn test_invalid_version() {
        let raw = b"GET / HTTP/2.0\r\n\r\n";
        let result = Request::parse(raw);

        assert!(matches!(result, Err(ParseError::InvalidHttpVersion(_))));
    }

    #[test]
    fn test_invalid_header() {
        let raw = b"GET / HTTP/1.1\r\nno-colon-here\r\n\r\n";
        let result = Request::parse(raw);

        assert!(matches!(result, Err(ParseError::InvalidHeader(_))));
    }

    #[test]
    fn test_empty_request() {
        assert!(matches!(Request::parse(b""), Err(ParseError::EmptyRequest)));
        assert!(matches!(Request::parse(b"\r\n"), Err(ParseError::EmptyRequest)));
    }

    #[test]
    fn test_invalid_request_line() {
        let raw = b"GET\r\n\r\n";
        let result = Request::parse(raw);

        assert!(matches!(result, Err(ParseError::InvalidRequestLine)));
    }

    #[test]
    fn test_url_decode_plus_and_percent() {
        assert_eq!(url_decode("a+b%20c"), "a b c");
        assert_eq!(url_decode("echo%20%22hi%22"), "echo \"hi\"");
        assert_eq!(url_decode("ls%2Fx%2fy"), "ls/x/y");
    }

    #[test]
    fn test_url_decode_plain_is_unchanged() {
        for plain in ["", "ls", "/usr/bin/env", "echo-hello_world.txt"] {
            assert_eq!(url_decode(plain), plain);
        }
    }

    #[test]
    fn test_url_decode_malformed_escape_kept() {
        assert_eq!(url_decode("100%"), "100%");
        assert_eq!(url_decode("%zz1"), "%zz1");
        assert_eq!(url_decode("%4"), "%4");
    }

    #[test]
    fn test_url_decode_multibyte() {
        assert_eq!(url_decode("caf%C3%A9"), "café");
    }
}
