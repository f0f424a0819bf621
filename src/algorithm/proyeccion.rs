use crate::models::{Fila, Tabla, COLUMNAS_CANONICAS, RENOMBRES_CANONICOS};

fn nombre_canonico(columna: &str) -> &str {
    RENOMBRES_CANONICOS
        .iter()
        .find(|(origen, _)| *origen == columna)
        .map(|(_, destino)| *destino)
        .unwrap_or(columna)
}

/// Renombra los encabezados fuente a los canónicos y deja sólo las columnas
/// del esquema de salida que existan, en el orden del esquema. Las columnas
/// opcionales ausentes simplemente no aparecen.
pub fn proyectar(tabla: &Tabla) -> Tabla {
    let renombradas: Vec<(String, String)> = tabla
        .columnas
        .iter()
        .map(|c| (c.clone(), nombre_canonico(c).to_string()))
        .collect();

    let columnas: Vec<String> = COLUMNAS_CANONICAS
        .iter()
        .filter(|canon| renombradas.iter().any(|(_, r)| r == *canon))
        .map(|c| c.to_string())
        .collect();

    let filas = tabla
        .filas
        .iter()
        .map(|fila| {
            let mut nueva = Fila::new();
            for (origen, destino) in &renombradas {
                if !columnas.contains(destino) { continue; }
                if let Some(v) = fila.valor(origen) {
                    nueva.set(destino.clone(), v);
                }
            }
            nueva
        })
        .collect();

    Tabla { columnas, filas }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::COLUMNA_CANTIDAD;

    #[test]
    fn test_proyectar_renombra_y_ordena() {
        let t = Tabla::con_filas(
            &["5.CONDICIÓN", "DIÁMETRO", "1. Cód.SAP", COLUMNA_CANTIDAD, "2. MATERIAL", "3. Descripción"],
            vec![Fila::desde_pares([
                ("5.CONDICIÓN", "NUEVO"),
                ("DIÁMETRO", "2 7/8"),
                ("1. Cód.SAP", "100234"),
                (COLUMNA_CANTIDAD, "4"),
                ("2. MATERIAL", "CUPLA"),
                ("3. Descripción", "Cupla EU 2 7/8"),
            ])],
        );
        let p = proyectar(&t);
        assert_eq!(p.columnas, vec!["Cód.SAP", "MATERIAL", "Descripción", COLUMNA_CANTIDAD, "CONDICIÓN"]);
        assert_eq!(p.filas[0].valor("Cód.SAP"), Some("100234"));
        assert_eq!(p.filas[0].valor("CONDICIÓN"), Some("NUEVO"));
        assert!(p.filas[0].valor("DIÁMETRO").is_none());
    }

    #[test]
    fn test_proyectar_tolera_columnas_ausentes() {
        let t = Tabla::con_filas(
            &["1. Cód.SAP", "DIÁMETRO"],
            vec![Fila::desde_pares([("1. Cód.SAP", "100234"), ("DIÁMETRO", "2")])],
        );
        let p = proyectar(&t);
        assert_eq!(p.columnas, vec!["Cód.SAP"]);
        assert_eq!(p.len(), 1);
    }
}
