//! Configuración del servidor a partir de variables de entorno (`.env`
//! incluido).
//!
//! - `MATERIALES_BIND`: dirección de escucha (por defecto `127.0.0.1:8080`)
//! - `MATERIALES_DIR`: directorio de catálogos Excel
//! - `MATERIALES_FLUJOS`: JSON opcional con la secuencia de flujos
//! - `MATERIALES_TTL_MINUTOS`: minutos de inactividad antes de descartar una corrida

use chrono::Duration;
use std::path::PathBuf;
use crate::error::ErrorAsistente;
use crate::excel::get_materiales_dir;
use crate::wizard::CatalogoFlujos;

pub const BIND_POR_DEFECTO: &str = "127.0.0.1:8080";
pub const TTL_MINUTOS_POR_DEFECTO: i64 = 120;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub materiales_dir: PathBuf,
    pub catalogo: CatalogoFlujos,
    pub ttl: Duration,
}

impl Config {
    pub fn desde_entorno() -> Result<Self, ErrorAsistente> {
        let _ = dotenv::dotenv();

        let bind = std::env::var("MATERIALES_BIND")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| BIND_POR_DEFECTO.to_string());

        let catalogo = match std::env::var("MATERIALES_FLUJOS") {
            Ok(p) if !p.trim().is_empty() => CatalogoFlujos::desde_archivo(p.trim())?,
            _ => CatalogoFlujos::por_defecto(),
        };

        let ttl_minutos = match std::env::var("MATERIALES_TTL_MINUTOS") {
            Ok(v) => v
                .trim()
                .parse::<i64>()
                .map_err(|e| ErrorAsistente::Configuracion(format!("MATERIALES_TTL_MINUTOS='{}': {}", v, e)))?,
            Err(_) => TTL_MINUTOS_POR_DEFECTO,
        };

        Ok(Config {
            bind,
            materiales_dir: get_materiales_dir(),
            catalogo,
            ttl: Duration::minutes(ttl_minutos.max(1)),
        })
    }
}
