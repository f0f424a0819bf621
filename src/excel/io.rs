use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use crate::error::ErrorAsistente;
use crate::models::{Fila, Tabla};

/// Convierte un `Data` de calamine a String (versión genérica para celdas)
pub fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{:.0}", f)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => format!("{}", i),
        Data::Bool(b) => format!("{}", b),
        Data::Empty => String::new(),
        Data::Error(_) => String::new(),
        Data::DateTime(s) => s.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Convierte filas de strings (la primera es el encabezado) en una `Tabla`.
/// Los encabezados se recortan; las filas completamente vacías se omiten.
pub fn filas_a_tabla(rows: Vec<Vec<String>>) -> Tabla {
    let mut iter = rows.into_iter();
    let columnas: Vec<String> = match iter.next() {
        Some(h) => h.into_iter().map(|c| c.trim().to_string()).collect(),
        None => return Tabla::default(),
    };

    let mut tabla = Tabla::new(columnas);
    for row in iter {
        if row.iter().all(|c| c.trim().is_empty()) { continue; }
        let mut fila = Fila::new();
        for (idx, celda) in row.into_iter().enumerate() {
            match tabla.columnas.get(idx) {
                Some(col) if !col.is_empty() => fila.set(col.clone(), celda),
                _ => {}
            }
        }
        tabla.filas.push(fila);
    }
    tabla
}

/// Lee la primera hoja del archivo y la devuelve como `Tabla`.
pub fn leer_tabla<P: AsRef<Path>>(path: P) -> Result<Tabla, ErrorAsistente> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ErrorAsistente::CargaDatos(format!("{}: {}", path.display(), e)))?;

    let names = workbook.sheet_names().to_owned();
    let primera = match names.first() {
        Some(n) => n.clone(),
        None => return Err(ErrorAsistente::CargaDatos(format!("{}: el libro no tiene hojas", path.display()))),
    };

    let range = workbook.worksheet_range(&primera)?;
    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|r| r.iter().map(cell_to_string).collect())
        .collect();

    Ok(filas_a_tabla(rows))
}

/// Verifica que la tabla contenga todas las columnas requeridas.
pub fn exigir_columnas(tabla: &Tabla, origen: &str, requeridas: &[&str]) -> Result<(), ErrorAsistente> {
    let faltantes: Vec<&str> = requeridas.iter().copied().filter(|c| !tabla.tiene_columna(c)).collect();
    if faltantes.is_empty() {
        Ok(())
    } else {
        Err(ErrorAsistente::CargaDatos(format!("{}: faltan columnas: {}", origen, faltantes.join(", "))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_cell_to_string_float_entero() {
        assert_eq!(cell_to_string(&Data::Float(2.0)), "2");
        assert_eq!(cell_to_string(&Data::Float(2.375)), "2.375");
        assert_eq!(cell_to_string(&Data::Float(1e20)), "100000000000000000000");
        assert_eq!(cell_to_string(&Data::String("  J55 ".to_string())), "J55");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn test_filas_a_tabla_recorta_encabezados() {
        let t = filas_a_tabla(vec![
            s(&[" DIÁMETRO ", "TIPO", "4.CANTIDAD"]),
            s(&["2 7/8", " A ", ""]),
            s(&["", "", ""]),
            s(&["TODOS", "TODOS", "3"]),
        ]);
        assert_eq!(t.columnas, s(&["DIÁMETRO", "TIPO", "4.CANTIDAD"]));
        assert_eq!(t.len(), 2);
        assert_eq!(t.filas[0].valor("TIPO"), Some("A"));
        assert!(t.filas[0].esta_vacia("4.CANTIDAD"));
        assert_eq!(t.filas[1].valor("4.CANTIDAD"), Some("3"));
    }

    #[test]
    fn test_exigir_columnas() {
        let t = filas_a_tabla(vec![s(&["DIÁMETRO"])]);
        assert!(exigir_columnas(&t, "ajuste.xlsx", &["DIÁMETRO"]).is_ok());
        let err = exigir_columnas(&t, "ajuste.xlsx", &["DIÁMETRO", "TIPO"]).unwrap_err();
        assert_eq!(err.to_string(), "Error al cargar el Excel: ajuste.xlsx: faltan columnas: TIPO");
    }

    #[test]
    fn test_leer_tabla_inexistente() {
        let err = leer_tabla("/no/existe/ajuste.xlsx").unwrap_err();
        assert!(matches!(err, ErrorAsistente::CargaDatos(_)));
    }
}
