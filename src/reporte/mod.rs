//! Reporte consolidado (flujo H): HTML, JSON y Excel de los resultados
//! acumulados en una corrida.

mod xlsx;

pub use xlsx::reporte_xlsx;

use serde::Serialize;
use crate::models::{ResultadoFlujo, Tabla};
use crate::vistas::escapar;

#[derive(Debug, Serialize)]
pub struct SeccionReporte<'a> {
    pub flujo: &'a str,
    pub columnas: &'a [String],
    pub filas: Vec<Vec<Option<&'a str>>>,
}

/// Filas como matriz ordenada según las columnas de la tabla.
pub fn matriz(tabla: &Tabla) -> Vec<Vec<Option<&str>>> {
    tabla
        .filas
        .iter()
        .map(|f| tabla.columnas.iter().map(|c| f.valor(c)).collect())
        .collect()
}

pub fn reporte_json(acumulado: &[ResultadoFlujo]) -> Vec<SeccionReporte<'_>> {
    acumulado
        .iter()
        .map(|r| SeccionReporte { flujo: &r.flujo, columnas: &r.tabla.columnas, filas: matriz(&r.tabla) })
        .collect()
}

/// Tabla HTML simple (`table table-bordered`), sin índice.
pub fn tabla_html(tabla: &Tabla) -> String {
    let mut html = String::from("<table class=\"table table-bordered\">\n<thead><tr>");
    for c in &tabla.columnas {
        html.push_str(&format!("<th>{}</th>", escapar(c)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for fila in matriz(tabla) {
        html.push_str("<tr>");
        for v in fila {
            html.push_str(&format!("<td>{}</td>", escapar(v.unwrap_or(""))));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

/// Cuerpo del reporte: un encabezado por flujo seguido de su tabla, en el
/// orden en que se acumularon.
pub fn reporte_html(acumulado: &[ResultadoFlujo]) -> String {
    let mut html = String::from("<h1>Continuación: Flujo H</h1>\n");
    if acumulado.is_empty() {
        html.push_str("<p>No se seleccionaron materiales.</p>\n");
    }
    for r in acumulado {
        html.push_str(&format!("<h2>{}</h2>\n", escapar(&r.flujo)));
        html.push_str(&tabla_html(&r.tabla));
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Fila;

    fn acumulado() -> Vec<ResultadoFlujo> {
        vec![
            ResultadoFlujo {
                flujo: "FLUJO A".to_string(),
                tabla: Tabla::con_filas(
                    &["Cód.SAP", "Descripción"],
                    vec![Fila::desde_pares([("Cód.SAP", "100"), ("Descripción", "Cupla <2 7/8> & J55")])],
                ),
            },
            ResultadoFlujo { flujo: "FLUJO C".to_string(), tabla: Tabla::con_filas(&["Cód.SAP"], Vec::new()) },
        ]
    }

    #[test]
    fn test_reporte_html_orden_y_escape() {
        let html = reporte_html(&acumulado());
        let a = html.find("<h2>FLUJO A</h2>").unwrap();
        let c = html.find("<h2>FLUJO C</h2>").unwrap();
        assert!(a < c);
        assert!(html.contains("Cupla &lt;2 7/8&gt; &amp; J55"));
        assert!(html.contains("<table class=\"table table-bordered\">"));
    }

    #[test]
    fn test_reporte_json_celdas_vacias() {
        let acc = vec![ResultadoFlujo {
            flujo: "FLUJO B".to_string(),
            tabla: Tabla::con_filas(&["Cód.SAP", "4.CANTIDAD"], vec![Fila::desde_pares([("Cód.SAP", "7")])]),
        }];
        let v = serde_json::to_value(reporte_json(&acc)).unwrap();
        assert_eq!(v[0]["flujo"], "FLUJO B");
        assert_eq!(v[0]["filas"][0][0], "7");
        assert!(v[0]["filas"][0][1].is_null());
    }
}
