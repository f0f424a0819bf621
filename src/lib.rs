// Biblioteca raíz del crate `materiales`.
// Asistente web por pasos que filtra catálogos Excel de materiales y
// acumula lo seleccionado en un reporte consolidado.
pub mod models;
pub mod error;
pub mod config;
pub mod excel;
pub mod algorithm;
pub mod wizard;
pub mod reporte;
pub mod vistas;
pub mod server_handlers;
pub mod server;

/// Ejecuta el servidor HTTP (reexport para facilitar uso desde `main`)
pub use server::{configurar_rutas, run_server};
pub use config::Config;
pub use error::ErrorAsistente;
