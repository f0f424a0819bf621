//! Algoritmos del asistente: extracción de opciones, selector en cascada,
//! evaluador de filtros, relleno de cantidades y proyección al esquema del
//! reporte.

pub mod opciones;
pub mod cascada;
pub mod filtro;
pub mod cantidad;
pub mod proyeccion;

pub use opciones::{extraer_opciones, opciones_o_placeholder};
pub use cascada::{
    combinaciones_desde_seleccion, opciones_dependientes, seleccion_comodin, seleccion_desde_formulario,
    todas_sin_opciones, validar_seleccion, Dimension, EsquemaCascada, ModoSeleccion, OpcionesPorValor,
    SeleccionValor,
};
pub use filtro::{filtrar, Combinacion};
pub use cantidad::{parse_cantidad, rellenar_cantidad};
pub use proyeccion::proyectar;

use log::debug;
use crate::models::{Tabla, COLUMNA_CANTIDAD};

/// Cantidad ingresada para un valor padre.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CantidadPorValor {
    pub valor: String,
    pub cantidad: f64,
}

/// Ejecuta la parte de datos de un flujo: filtra según la selección,
/// rellena cantidades vacías por valor padre y proyecta al esquema canónico.
pub fn resolver_flujo(
    tabla: &Tabla,
    esquema: &EsquemaCascada,
    selecciones: &[SeleccionValor],
    cantidades: &[CantidadPorValor],
) -> Tabla {
    let combinaciones = combinaciones_desde_seleccion(esquema, selecciones);
    let mut filtrada = filtrar(tabla, &combinaciones);
    debug!("{} combinaciones, {} de {} filas", combinaciones.len(), filtrada.len(), tabla.len());

    for c in cantidades {
        let seleccion = vec![(esquema.padre.clone(), c.valor.clone())];
        let n = rellenar_cantidad(&mut filtrada, COLUMNA_CANTIDAD, &seleccion, c.cantidad);
        debug!("cantidad {} asignada a {} filas de {}", c.cantidad, n, c.valor);
    }

    proyectar(&filtrada)
}
