//! Extracción de opciones para los selectores del formulario.

use std::collections::BTreeSet;
use crate::models::{es_comodin, Tabla};

/// Valores distintos (no nulos) de `columna`, ordenados y sin el comodín.
/// Una columna inexistente produce una lista vacía.
pub fn extraer_opciones(tabla: &Tabla, columna: &str) -> Vec<String> {
    if !tabla.tiene_columna(columna) {
        return Vec::new();
    }
    let distintos: BTreeSet<&str> = tabla
        .filas
        .iter()
        .filter_map(|f| f.valor(columna))
        .filter(|v| !es_comodin(v))
        .collect();
    distintos.into_iter().map(|s| s.to_string()).collect()
}

/// Igual que `extraer_opciones`, pero nunca vacía: si no hay opciones (o la
/// columna no existe) devuelve `[placeholder]` para que siempre haya algo
/// que mostrar.
pub fn opciones_o_placeholder(tabla: &Tabla, columna: &str, placeholder: &str) -> Vec<String> {
    let opciones = extraer_opciones(tabla, columna);
    if opciones.is_empty() {
        vec![placeholder.to_string()]
    } else {
        opciones
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Fila, SELECCIONAR, TODOS};

    fn tabla() -> Tabla {
        Tabla::con_filas(
            &["DIÁMETRO", "TIPO"],
            vec![
                Fila::desde_pares([("DIÁMETRO", "3 1/2"), ("TIPO", "B")]),
                Fila::desde_pares([("DIÁMETRO", "2 7/8"), ("TIPO", "todos")]),
                Fila::desde_pares([("DIÁMETRO", "TODOS")]),
                Fila::desde_pares([("DIÁMETRO", "2 7/8"), ("TIPO", "A")]),
            ],
        )
    }

    #[test]
    fn test_extraer_opciones_ordenadas_sin_comodin() {
        let t = tabla();
        assert_eq!(extraer_opciones(&t, "DIÁMETRO"), vec!["2 7/8", "3 1/2"]);
        assert_eq!(extraer_opciones(&t, "TIPO"), vec!["A", "B"]);
    }

    #[test]
    fn test_extraer_opciones_idempotente() {
        let t = tabla();
        let primera = extraer_opciones(&t, "TIPO");
        let segunda = extraer_opciones(&t, "TIPO");
        assert_eq!(primera, segunda);
        assert!(!primera.iter().any(|o| o == TODOS));
    }

    #[test]
    fn test_placeholder_columna_ausente() {
        let t = tabla();
        assert_eq!(opciones_o_placeholder(&t, "TIPO DE CUPLA", SELECCIONAR), vec![SELECCIONAR]);
        let solo_comodin = t.donde("DIÁMETRO", "TODOS");
        assert_eq!(opciones_o_placeholder(&solo_comodin, "TIPO", TODOS), vec![TODOS]);
    }
}
