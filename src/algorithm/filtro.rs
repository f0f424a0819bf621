//! Evaluador de filtros sobre catálogos.
//!
//! Una `Combinacion` fija un valor elegido por columna. Una fila cumple la
//! combinación si en cada columna su valor es el elegido o el comodín
//! `TODOS` (AND entre columnas). Una fila entra al resultado si cumple al
//! menos una combinación (OR entre combinaciones).

use serde::{Deserialize, Serialize};
use crate::models::{Fila, Tabla, TODOS};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combinacion {
    pub condiciones: Vec<(String, String)>,
}

impl Combinacion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn con<K: Into<String>, V: Into<String>>(mut self, columna: K, valor: V) -> Self {
        self.condiciones.push((columna.into(), valor.into()));
        self
    }

    /// Evalúa la combinación sobre una fila. Sólo se consideran las columnas
    /// presentes en `columnas` (una columna que el catálogo no tiene no
    /// discrimina). Una celda nula nunca coincide.
    pub fn cumple(&self, fila: &Fila, columnas: &[String]) -> bool {
        self.condiciones.iter().all(|(col, elegido)| {
            if !columnas.iter().any(|c| c == col) {
                return true;
            }
            match fila.valor(col) {
                Some(v) => v == elegido || v == TODOS,
                None => false,
            }
        })
    }
}

/// Incluye una fila si cumple alguna de las combinaciones.
pub fn fila_incluida(fila: &Fila, columnas: &[String], combinaciones: &[Combinacion]) -> bool {
    combinaciones.iter().any(|c| c.cumple(fila, columnas))
}

/// Filtra la tabla conservando el orden original. Sin combinaciones el
/// resultado es vacío.
pub fn filtrar(tabla: &Tabla, combinaciones: &[Combinacion]) -> Tabla {
    Tabla {
        columnas: tabla.columnas.clone(),
        filas: tabla
            .filas
            .iter()
            .filter(|f| fila_incluida(f, &tabla.columnas, combinaciones))
            .cloned()
            .collect(),
    }
}

/// Producto cartesiano de listas de valores por columna. Cada elemento del
/// resultado es una combinación con un valor por columna.
pub fn producto(dimensiones: &[(String, Vec<String>)]) -> Vec<Combinacion> {
    let mut acc: Vec<Combinacion> = vec![Combinacion::new()];
    for (col, valores) in dimensiones {
        let mut siguiente = Vec::with_capacity(acc.len() * valores.len().max(1));
        for base in &acc {
            for v in valores {
                siguiente.push(base.clone().con(col.clone(), v.clone()));
            }
        }
        acc = siguiente;
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TODOS;

    fn escenario() -> Tabla {
        Tabla::con_filas(
            &["DIÁMETRO", "TIPO", "4.CANTIDAD"],
            vec![
                Fila::desde_pares([("DIÁMETRO", "2"), ("TIPO", "A")]),
                Fila::desde_pares([("DIÁMETRO", "2"), ("TIPO", "TODOS"), ("4.CANTIDAD", "5")]),
                Fila::desde_pares([("DIÁMETRO", "TODOS"), ("TIPO", "TODOS"), ("4.CANTIDAD", "1")]),
                Fila::desde_pares([("DIÁMETRO", "3"), ("TIPO", "A")]),
                Fila::desde_pares([("DIÁMETRO", "2"), ("TIPO", "B")]),
            ],
        )
    }

    #[test]
    fn test_escenario_comodin() {
        let combos = vec![Combinacion::new().con("DIÁMETRO", "2").con("TIPO", "A")];
        let r = filtrar(&escenario(), &combos);
        assert_eq!(r.len(), 3);
        assert_eq!(r.filas[0].valor("TIPO"), Some("A"));
        assert_eq!(r.filas[2].valor("DIÁMETRO"), Some(TODOS));
    }

    #[test]
    fn test_or_entre_combinaciones() {
        let combos = vec![
            Combinacion::new().con("DIÁMETRO", "3").con("TIPO", "A"),
            Combinacion::new().con("DIÁMETRO", "2").con("TIPO", "B"),
        ];
        let r = filtrar(&escenario(), &combos);
        // fila 2 (2/TODOS), fila 3 (TODOS/TODOS), fila 4 (3/A), fila 5 (2/B)
        assert_eq!(r.len(), 4);
        assert!(!r.filas.iter().any(|f| f.valor("DIÁMETRO") == Some("2") && f.valor("TIPO") == Some("A")));
    }

    #[test]
    fn test_elegido_comodin_exige_comodin() {
        let combos = vec![Combinacion::new().con("DIÁMETRO", "2").con("TIPO", TODOS)];
        let r = filtrar(&escenario(), &combos);
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn test_comodin_exacto() {
        let t = Tabla::con_filas(&["DIÁMETRO", "TIPO"], vec![Fila::desde_pares([("DIÁMETRO", "2"), ("TIPO", "todos")])]);
        let combos = vec![Combinacion::new().con("DIÁMETRO", "2").con("TIPO", "EU")];
        assert!(filtrar(&t, &combos).is_empty());
    }

    #[test]
    fn test_sin_combinaciones_vacio() {
        assert!(filtrar(&escenario(), &[]).is_empty());
    }

    #[test]
    fn test_columna_ausente_no_discrimina() {
        let combos = vec![Combinacion::new().con("DIÁMETRO", "3").con("GRADO DE ACERO", "J55")];
        let r = filtrar(&escenario(), &combos);
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn test_producto() {
        let dims = vec![
            ("TIPO".to_string(), vec!["A".to_string(), TODOS.to_string()]),
            ("GRADO DE ACERO".to_string(), vec!["J55".to_string()]),
        ];
        let combos = producto(&dims);
        assert_eq!(combos.len(), 2);
        assert_eq!(combos[1].condiciones, vec![
            ("TIPO".to_string(), TODOS.to_string()),
            ("GRADO DE ACERO".to_string(), "J55".to_string()),
        ]);
    }
}
