//! Páginas HTML mínimas de cada paso del asistente.

use uuid::Uuid;
use crate::algorithm::{ModoSeleccion, OpcionesPorValor};
use crate::models::{ResultadoFlujo, SELECCIONAR, TODOS};
use crate::reporte::reporte_html;
use crate::wizard::Flujo;

/// Escapa texto para insertarlo en HTML (contenido o atributos).
pub fn escapar(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn layout(titulo: &str, cuerpo: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"es\">\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}</body>\n</html>\n",
        escapar(titulo),
        cuerpo
    )
}

pub fn pagina_inicio() -> String {
    let cuerpo = "<h1>Asistente de materiales</h1>\n\
        <form method=\"post\" action=\"/corridas\"><button type=\"submit\">Comenzar</button></form>\n";
    layout("Asistente de materiales", cuerpo)
}

pub fn pagina_decision(corrida: &Uuid, flujo: &Flujo) -> String {
    let cuerpo = format!(
        "<h1>{titulo}</h1>\n<form method=\"post\" action=\"/corridas/{c}/flujos/{id}/decidir\">\n<p>{pregunta}</p>\n\
        <label><input type=\"radio\" name=\"ajuste\" value=\"SI\"> SI</label>\n\
        <label><input type=\"radio\" name=\"ajuste\" value=\"NO\"> NO</label>\n\
        <button type=\"submit\">Continuar</button>\n</form>\n",
        titulo = escapar(&flujo.titulo),
        c = corrida,
        id = escapar(&flujo.id),
        pregunta = escapar(&flujo.pregunta),
    );
    layout(&flujo.titulo, &cuerpo)
}

pub fn pagina_seleccion(corrida: &Uuid, flujo: &Flujo, padre: &str, opciones: &[String]) -> String {
    let mut cuerpo = format!(
        "<h1>{}: {}</h1>\n<form method=\"post\" action=\"/corridas/{}/flujos/{}/seleccion\">\n",
        escapar(&flujo.titulo),
        escapar(padre),
        corrida,
        escapar(&flujo.id)
    );
    for o in opciones {
        cuerpo.push_str(&format!(
            "<label><input type=\"checkbox\" name=\"valores\" value=\"{v}\"> {v}</label><br>\n",
            v = escapar(o)
        ));
    }
    cuerpo.push_str("<button type=\"submit\">Siguiente</button>\n</form>\n");
    layout(&flujo.titulo, &cuerpo)
}

fn selector(nombre: &str, modo: ModoSeleccion, opciones: &[String]) -> String {
    match modo {
        ModoSeleccion::Multiple => opciones
            .iter()
            .filter(|o| o.as_str() != TODOS)
            .map(|o| {
                format!(
                    "<label><input type=\"checkbox\" name=\"{n}\" value=\"{v}\"> {v}</label>\n",
                    n = escapar(nombre),
                    v = escapar(o)
                )
            })
            .collect(),
        ModoSeleccion::Simple => {
            let mut html = format!("<select name=\"{}\">\n<option value=\"{s}\">{s}</option>\n", escapar(nombre), s = SELECCIONAR);
            for o in opciones.iter().filter(|o| o.as_str() != SELECCIONAR) {
                html.push_str(&format!("<option value=\"{v}\">{v}</option>\n", v = escapar(o)));
            }
            html.push_str("</select>\n");
            html
        }
    }
}

pub fn pagina_filtros(corrida: &Uuid, flujo: &Flujo, token: &str, opciones: &[OpcionesPorValor]) -> String {
    let mut cuerpo = format!(
        "<h1>{}: filtros</h1>\n<form method=\"post\" action=\"/corridas/{}/flujos/{}/filtros?estado={}\">\n",
        escapar(&flujo.titulo),
        corrida,
        escapar(&flujo.id),
        escapar(token)
    );
    for op in opciones {
        cuerpo.push_str(&format!("<fieldset>\n<legend>{}</legend>\n", escapar(&op.valor)));
        for (dim, valores) in &op.dimensiones {
            cuerpo.push_str(&format!("<p>{}</p>\n", escapar(&dim.columna)));
            cuerpo.push_str(&selector(&dim.nombre_campo(&op.valor), dim.modo, valores));
        }
        if flujo.pide_cantidad {
            cuerpo.push_str(&format!(
                "<p>Cantidad</p>\n<input type=\"number\" step=\"any\" min=\"0\" name=\"cantidad_{}\">\n",
                escapar(&op.valor)
            ));
        }
        cuerpo.push_str("</fieldset>\n");
    }
    cuerpo.push_str("<button type=\"submit\">Confirmar</button>\n</form>\n");
    layout(&flujo.titulo, &cuerpo)
}

/// Flujo sin opciones dependientes: el formulario se confirma solo (POST)
/// con todas las dimensiones en comodín.
pub fn pagina_avance_automatico(corrida: &Uuid, flujo: &Flujo, token: &str) -> String {
    let cuerpo = format!(
        "<h1>{titulo}</h1>\n<p>No hay opciones adicionales para los valores elegidos.</p>\n\
        <form id=\"avance\" method=\"post\" action=\"/corridas/{c}/flujos/{id}/filtros?estado={tok}\">\n\
        <input type=\"hidden\" name=\"avance\" value=\"auto\">\n\
        <button type=\"submit\">Continuar</button>\n</form>\n\
        <script>document.getElementById(\"avance\").submit();</script>\n",
        titulo = escapar(&flujo.titulo),
        c = corrida,
        id = escapar(&flujo.id),
        tok = escapar(token),
    );
    layout(&flujo.titulo, &cuerpo)
}

pub fn pagina_reporte(corrida: &Uuid, acumulado: &[ResultadoFlujo]) -> String {
    let mut cuerpo = reporte_html(acumulado);
    cuerpo.push_str(&format!(
        "<p><a href=\"/corridas/{c}/reporte.xlsx\">Descargar Excel</a> | <a href=\"/corridas/{c}/reporte.json\">JSON</a></p>\n",
        c = corrida
    ));
    layout("Material de agregación", &cuerpo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::Dimension;

    #[test]
    fn test_escapar() {
        assert_eq!(escapar("3 1/2\" <EU> & 'x'"), "3 1/2&quot; &lt;EU&gt; &amp; &#39;x&#39;");
    }

    #[test]
    fn test_selector_simple_incluye_placeholder_una_vez() {
        let html = selector("acero_2", ModoSeleccion::Simple, &[SELECCIONAR.to_string()]);
        assert_eq!(html.matches("<option").count(), 1);
        let html = selector("acero_2", ModoSeleccion::Simple, &["J55".to_string(), "N80".to_string()]);
        assert_eq!(html.matches("<option").count(), 3);
    }

    #[test]
    fn test_pagina_filtros_campos() {
        let flujo = crate::wizard::CatalogoFlujos::por_defecto().get("B").unwrap().clone();
        let op = OpcionesPorValor {
            valor: "2 7/8".to_string(),
            dimensiones: vec![(Dimension::multiple("TIPO", "tipo"), vec!["EU".to_string()])],
        };
        let html = pagina_filtros(&Uuid::nil(), &flujo, "tok", &[op]);
        assert!(html.contains("name=\"tipo_2 7/8\" value=\"EU\""));
        assert!(html.contains("name=\"cantidad_2 7/8\""));
        assert!(html.contains("filtros?estado=tok"));
    }

    #[test]
    fn test_avance_automatico_confirma_por_post() {
        let flujo = crate::wizard::CatalogoFlujos::por_defecto().get("C").unwrap().clone();
        let html = pagina_avance_automatico(&Uuid::nil(), &flujo, "tok");
        assert!(html.contains("method=\"post\""));
        assert!(html.contains("/flujos/C/filtros?estado=tok"));
    }
}
