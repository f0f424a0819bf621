pub mod formulario;
pub mod asistente;
pub mod reporte;
pub mod datasets;
pub mod docs;

pub use asistente::*;
pub use reporte::*;
pub use datasets::*;
pub use docs::*;
