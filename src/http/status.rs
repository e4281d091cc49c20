//! # Códigos de Estado HTTP
//!
//! Códigos que puede devolver el gateway. La ruta de ejecución siempre
//! responde `200 OK` (el fallo del comando viaja en el código de salida);
//! el resto sale de los archivos estáticos y de los errores de parsing.

/// Códigos de estado HTTP que usa el gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK - Archivo encontrado o comando lanzado
    Ok = 200,

    /// 400 Bad Request - Request malformado o comando vacío
    BadRequest = 400,

    /// 403 Forbidden - El path intenta salir del directorio raíz
    Forbidden = 403,

    /// 404 Not Found - Archivo inexistente
    NotFound = 404,

    /// 405 Method Not Allowed - Solo se acepta GET
    MethodNotAllowed = 405,

    /// 500 Internal Server Error - Error leyendo el archivo
    InternalServerError = 500,

    /// 503 Service Unavailable - Cola de conexiones llena
    ServiceUnavailable = 503,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use exec_gateway::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Texto de razón (reason phrase) asociado al código
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// Verifica si el código indica éxito (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.as_u16())
    }

    /// Verifica si el código indica error del servidor (5xx)
    ///
    /// # Ejemplo
    /// ```
    /// use exec_gateway::http::StatusCode;
    /// assert!(StatusCode::ServiceUnavailable.is_server_error());
    /// assert!(!StatusCode::NotFound.is_server_error());
    /// ```
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.as_u16())
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
