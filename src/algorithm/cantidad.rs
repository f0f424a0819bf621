use crate::models::{Tabla, TODOS};

/// Formatea una cantidad igual que las celdas leídas del Excel (enteros sin
/// decimales).
pub fn formatear_cantidad(cantidad: f64) -> String {
    if cantidad.fract() == 0.0 {
        format!("{:.0}", cantidad)
    } else {
        format!("{}", cantidad)
    }
}

/// Interpreta la cantidad ingresada por el usuario. Vacío => `None`.
/// Acepta coma decimal.
pub fn parse_cantidad(texto: &str) -> Result<Option<f64>, std::num::ParseFloatError> {
    let t = texto.trim();
    if t.is_empty() {
        return Ok(None);
    }
    t.replace(',', ".").parse::<f64>().map(Some)
}

/// Rellena `columna` con `cantidad` en las filas cuya cantidad está vacía y
/// cuyas dimensiones coinciden con `seleccion` (valor igual o comodín).
/// Nunca sobrescribe una cantidad existente. Devuelve cuántas filas llenó.
pub fn rellenar_cantidad(tabla: &mut Tabla, columna: &str, seleccion: &[(String, String)], cantidad: f64) -> usize {
    if !tabla.tiene_columna(columna) {
        tabla.columnas.push(columna.to_string());
    }
    let valor = formatear_cantidad(cantidad);
    let mut llenadas = 0usize;
    for fila in tabla.filas.iter_mut() {
        if !fila.esta_vacia(columna) { continue; }
        let coincide = seleccion.iter().all(|(col, elegido)| match fila.valor(col) {
            Some(v) => v == elegido || v == TODOS,
            None => false,
        });
        if coincide {
            fila.set(columna, valor.clone());
            llenadas += 1;
        }
    }
    llenadas
}
