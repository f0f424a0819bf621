//! Módulo `excel`: acceso a los catálogos de materiales.
//!
//! Submódulos:
//! - `io`: conversión de celdas y lectura de la primera hoja como `Tabla`
//!
//! Los catálogos se releen en cada paso del asistente; no hay caché.

/// Helpers de IO y lectura de Excel
mod io;

pub use io::{cell_to_string, exigir_columnas, filas_a_tabla, leer_tabla};

use std::fs;
use std::path::{Path, PathBuf};
use log::{debug, info, warn};
use crate::error::ErrorAsistente;
use crate::models::Tabla;

/// Directorio por defecto de los catálogos (relativo al CWD)
pub const MATERIALES_DIR: &str = "Materiales";

const EXTENSIONES: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

/// Resuelve el directorio de catálogos.
///
/// Orden: variable `MATERIALES_DIR` (si existe), luego candidatos relativos
/// al directorio de trabajo. Si nada existe se devuelve `Materiales` tal cual
/// y la lectura posterior reportará el archivo faltante.
pub fn get_materiales_dir() -> PathBuf {
    let _ = dotenv::dotenv();
    if let Ok(path) = std::env::var("MATERIALES_DIR") {
        let p = PathBuf::from(path);
        if p.exists() {
            debug!("usando MATERIALES_DIR: {:?}", p);
            return p;
        }
        warn!("MATERIALES_DIR apunta a {:?}, que no existe", p);
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let candidatos = [
        cwd.join(MATERIALES_DIR),
        cwd.join("src").join(MATERIALES_DIR),
        cwd.join("datafiles"),
    ];
    for candidato in candidatos {
        if candidato.is_dir() {
            debug!("catálogos encontrados en {:?}", candidato);
            return candidato;
        }
    }

    warn!("no se encontró directorio de catálogos; se usará {:?}", MATERIALES_DIR);
    PathBuf::from(MATERIALES_DIR)
}

fn es_archivo_temporal(nombre: &str) -> bool {
    nombre.starts_with('.') || nombre.starts_with('~') || nombre.ends_with('~')
}

/// Lista los catálogos disponibles (ordenados por nombre), ignorando
/// archivos ocultos y temporales de editores.
pub fn listar_datasets(dir: &Path) -> Result<Vec<String>, ErrorAsistente> {
    let read = fs::read_dir(dir)
        .map_err(|e| ErrorAsistente::CargaDatos(format!("{}: {}", dir.display(), e)))?;

    let mut nombres: Vec<String> = Vec::new();
    for entry in read.flatten() {
        let p = entry.path();
        if !p.is_file() { continue; }
        let nombre = match p.file_name().and_then(|s| s.to_str()) { Some(s) => s.to_string(), None => continue };
        if es_archivo_temporal(&nombre) { continue; }
        let ext = p.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()).unwrap_or_default();
        if EXTENSIONES.contains(&ext.as_str()) {
            nombres.push(nombre);
        }
    }
    nombres.sort();
    Ok(nombres)
}

/// Valida un nombre de archivo recibido del cliente (sin rutas ni `..`).
pub fn nombre_seguro(nombre: &str) -> Option<&str> {
    let nombre = nombre.trim();
    if nombre.is_empty() || nombre.contains("..") || nombre.contains('/') || nombre.contains('\\') {
        return None;
    }
    Some(nombre)
}

/// Carga un catálogo del directorio y verifica sus columnas obligatorias.
pub fn cargar_dataset(dir: &Path, archivo: &str, requeridas: &[&str]) -> Result<Tabla, ErrorAsistente> {
    let path = dir.join(archivo);
    let tabla = leer_tabla(&path)?;
    exigir_columnas(&tabla, archivo, requeridas)?;
    info!("catálogo {} cargado: {} filas", archivo, tabla.len());
    Ok(tabla)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nombre_seguro() {
        assert_eq!(nombre_seguro(" ajuste de medida(2).xlsx "), Some("ajuste de medida(2).xlsx"));
        assert_eq!(nombre_seguro("../secreto.xlsx"), None);
        assert_eq!(nombre_seguro("sub/archivo.xlsx"), None);
        assert_eq!(nombre_seguro("   "), None);
    }

    #[test]
    fn test_listar_datasets_ignora_temporales() {
        let dir = tempfile::tempdir().unwrap();
        for n in ["b.xlsx", "a.xls", "~$a.xlsx", ".oculto.xlsx", "notas.txt", "copia.xlsx~"] {
            std::fs::write(dir.path().join(n), b"x").unwrap();
        }
        let lista = listar_datasets(dir.path()).unwrap();
        assert_eq!(lista, vec!["a.xls".to_string(), "b.xlsx".to_string()]);
    }

    #[test]
    fn test_cargar_dataset_faltante() {
        let dir = tempfile::tempdir().unwrap();
        let err = cargar_dataset(dir.path(), "no_existe.xlsx", &["DIÁMETRO"]).unwrap_err();
        assert!(err.to_string().starts_with("Error al cargar el Excel:"));
    }
}
