//! Errores del asistente y su traducción a respuestas HTTP.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ErrorAsistente {
    /// Excel inexistente, corrupto o sin las columnas esperadas.
    #[error("Error al cargar el Excel: {0}")]
    CargaDatos(String),

    /// Respuesta de decisión distinta de SI / NO.
    #[error("Por favor selecciona una opción (SI o NO). Recibido: '{0}'")]
    DecisionInvalida(String),

    /// Paso obligatorio enviado sin selección.
    #[error("Debes seleccionar al menos un valor de {0}.")]
    SeleccionVacia(String),

    /// Campo numérico del formulario que no se puede interpretar.
    #[error("Cantidad inválida para {campo}: '{valor}'")]
    CantidadInvalida { campo: String, valor: String },

    #[error("Estado del asistente inválido: {0}")]
    EstadoInvalido(String),

    #[error("Flujo desconocido: {0}")]
    FlujoDesconocido(String),

    #[error("Corrida desconocida: {0}")]
    CorridaDesconocida(String),

    /// El paso enviado no corresponde al paso en curso de la corrida.
    #[error("Paso fuera de secuencia: se esperaba {esperado}, se recibió {recibido}")]
    PasoFueraDeSecuencia { esperado: String, recibido: String },

    #[error("Error de configuración: {0}")]
    Configuracion(String),

    #[error("Error al generar el reporte: {0}")]
    Reporte(String),
}

impl ErrorAsistente {
    /// Errores atribuibles al usuario (reenviar el formulario los corrige).
    pub fn es_error_de_usuario(&self) -> bool {
        matches!(
            self,
            ErrorAsistente::DecisionInvalida(_)
                | ErrorAsistente::SeleccionVacia(_)
                | ErrorAsistente::CantidadInvalida { .. }
                | ErrorAsistente::EstadoInvalido(_)
                | ErrorAsistente::PasoFueraDeSecuencia { .. }
        )
    }
}

impl From<calamine::Error> for ErrorAsistente {
    fn from(e: calamine::Error) -> Self {
        ErrorAsistente::CargaDatos(e.to_string())
    }
}

impl ResponseError for ErrorAsistente {
    fn status_code(&self) -> StatusCode {
        match self {
            e if e.es_error_de_usuario() => StatusCode::BAD_REQUEST,
            ErrorAsistente::FlujoDesconocido(_) | ErrorAsistente::CorridaDesconocida(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(self.to_string())
    }
}
