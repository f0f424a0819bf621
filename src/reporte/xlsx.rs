use std::io::Cursor;
use crate::error::ErrorAsistente;
use crate::models::ResultadoFlujo;
use crate::reporte::matriz;

const MAX_NOMBRE_HOJA: usize = 31;

fn nombre_hoja(indice: usize, flujo: &str) -> String {
    let limpio: String = flujo
        .chars()
        .map(|c| if "[]:*?/\\".contains(c) { ' ' } else { c })
        .collect();
    format!("{:02} {}", indice + 1, limpio).chars().take(MAX_NOMBRE_HOJA).collect()
}

/// Genera un libro con una hoja "Resumen" (flujo, filas) y una hoja por
/// cada resultado acumulado.
pub fn reporte_xlsx(acumulado: &[ResultadoFlujo]) -> Result<Vec<u8>, ErrorAsistente> {
    let mut book = umya_spreadsheet::new_file();

    let resumen = book
        .get_sheet_by_name_mut("Sheet1")
        .ok_or_else(|| ErrorAsistente::Reporte("libro sin hoja inicial".to_string()))?;
    resumen.set_name("Resumen");
    resumen.get_cell_mut((1, 1)).set_value("Flujo");
    resumen.get_cell_mut((2, 1)).set_value("Filas");
    for (i, r) in acumulado.iter().enumerate() {
        let fila = i as u32 + 2;
        resumen.get_cell_mut((1, fila)).set_value(r.flujo.clone());
        resumen.get_cell_mut((2, fila)).set_value(r.tabla.len().to_string());
    }

    for (i, r) in acumulado.iter().enumerate() {
        let hoja = book
            .new_sheet(nombre_hoja(i, &r.flujo))
            .map_err(|e| ErrorAsistente::Reporte(e.to_string()))?;
        for (c, col) in r.tabla.columnas.iter().enumerate() {
            hoja.get_cell_mut((c as u32 + 1, 1)).set_value(col.clone());
        }
        for (f, valores) in matriz(&r.tabla).into_iter().enumerate() {
            for (c, v) in valores.into_iter().enumerate() {
                if let Some(v) = v {
                    hoja.get_cell_mut((c as u32 + 1, f as u32 + 2)).set_value(v.to_string());
                }
            }
        }
    }

    let mut cursor = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut cursor)
        .map_err(|e| ErrorAsistente::Reporte(e.to_string()))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Reader, Xlsx};
    use crate::excel::cell_to_string;
    use crate::models::{Fila, Tabla};

    #[test]
    fn test_nombre_hoja() {
        assert_eq!(nombre_hoja(0, "FLUJO A"), "01 FLUJO A");
        assert_eq!(nombre_hoja(9, "a/b"), "10 a b");
        assert!(nombre_hoja(1, &"X".repeat(60)).chars().count() <= MAX_NOMBRE_HOJA);
    }

    #[test]
    fn test_reporte_xlsx_legible() {
        let acc = vec![ResultadoFlujo {
            flujo: "FLUJO A".to_string(),
            tabla: Tabla::con_filas(
                &["Cód.SAP", "MATERIAL"],
                vec![Fila::desde_pares([("Cód.SAP", "100234"), ("MATERIAL", "CUPLA")])],
            ),
        }];
        let bytes = reporte_xlsx(&acc).unwrap();
        let mut wb: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).unwrap();
        assert_eq!(wb.sheet_names(), vec!["Resumen".to_string(), "01 FLUJO A".to_string()]);
        let range = wb.worksheet_range("01 FLUJO A").unwrap();
        let filas: Vec<Vec<String>> = range.rows().map(|r| r.iter().map(cell_to_string).collect()).collect();
        assert_eq!(filas[0], vec!["Cód.SAP", "MATERIAL"]);
        assert_eq!(filas[1], vec!["100234", "CUPLA"]);
    }
}
