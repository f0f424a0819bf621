//! Selector en cascada: opciones de las dimensiones dependientes acotadas
//! por el valor elegido en la dimensión padre, y conversión de lo que el
//! usuario eligió en combinaciones para el filtro.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::algorithm::filtro::{producto, Combinacion};
use crate::algorithm::opciones::opciones_o_placeholder;
use crate::error::ErrorAsistente;
use crate::models::{es_comodin, Tabla, SELECCIONAR, TODOS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModoSeleccion {
    Simple,
    Multiple,
}

/// Dimension dependiente de un flujo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    /// Columna del catálogo
    pub columna: String,
    /// Prefijo del campo del formulario (`<campo>_<valor padre>`)
    pub campo: String,
    pub modo: ModoSeleccion,
    /// Si es true, exige una elección explícita cuando hay opciones reales.
    #[serde(default)]
    pub obligatoria: bool,
}

impl Dimension {
    pub fn simple(columna: &str, campo: &str) -> Self {
        Dimension { columna: columna.to_string(), campo: campo.to_string(), modo: ModoSeleccion::Simple, obligatoria: false }
    }

    pub fn multiple(columna: &str, campo: &str) -> Self {
        Dimension { columna: columna.to_string(), campo: campo.to_string(), modo: ModoSeleccion::Multiple, obligatoria: false }
    }

    pub fn obligatoria(mut self) -> Self {
        self.obligatoria = true;
        self
    }

    /// Placeholder que se muestra cuando la dimensión no tiene opciones.
    pub fn placeholder(&self) -> &'static str {
        match self.modo {
            ModoSeleccion::Multiple => TODOS,
            ModoSeleccion::Simple => SELECCIONAR,
        }
    }

    /// Nombre del campo del formulario para un valor padre.
    pub fn nombre_campo(&self, valor_padre: &str) -> String {
        format!("{}_{}", self.campo, valor_padre)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EsquemaCascada {
    /// Columna padre (p. ej. DIÁMETRO); se elige con selección múltiple.
    pub padre: String,
    #[serde(default)]
    pub dependientes: Vec<Dimension>,
}

impl EsquemaCascada {
    pub fn columnas(&self) -> Vec<&str> {
        std::iter::once(self.padre.as_str())
            .chain(self.dependientes.iter().map(|d| d.columna.as_str()))
            .collect()
    }
}

/// Opciones de cada dimensión dependiente para un valor padre.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpcionesPorValor {
    pub valor: String,
    pub dimensiones: Vec<(Dimension, Vec<String>)>,
}

fn es_placeholder(opciones: &[String]) -> bool {
    opciones.len() == 1 && (opciones[0] == TODOS || opciones[0] == SELECCIONAR)
}

impl OpcionesPorValor {
    pub fn sin_opciones(&self) -> bool {
        self.dimensiones.iter().all(|(_, ops)| es_placeholder(ops))
    }
}

/// Para cada valor padre elegido calcula las opciones de las dimensiones
/// dependientes, usando sólo las filas cuyo padre es exactamente ese valor.
pub fn opciones_dependientes(tabla: &Tabla, esquema: &EsquemaCascada, valores_padre: &[String]) -> Vec<OpcionesPorValor> {
    valores_padre
        .iter()
        .map(|valor| {
            let subset = tabla.donde(&esquema.padre, valor);
            let dimensiones = esquema
                .dependientes
                .iter()
                .map(|d| (d.clone(), opciones_o_placeholder(&subset, &d.columna, d.placeholder())))
                .collect();
            OpcionesPorValor { valor: valor.clone(), dimensiones }
        })
        .collect()
}

/// Ningún valor padre tiene opciones reales en sus dimensiones dependientes.
pub fn todas_sin_opciones(opciones: &[OpcionesPorValor]) -> bool {
    opciones.iter().all(|o| o.sin_opciones())
}

/// Lo que el usuario eligió para un valor padre: columna -> valores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeleccionValor {
    pub valor: String,
    #[serde(default)]
    pub elecciones: BTreeMap<String, Vec<String>>,
}

impl SeleccionValor {
    pub fn new(valor: &str) -> Self {
        SeleccionValor { valor: valor.to_string(), elecciones: BTreeMap::new() }
    }

    pub fn con(mut self, columna: &str, valores: &[&str]) -> Self {
        self.elecciones.insert(columna.to_string(), valores.iter().map(|v| v.to_string()).collect());
        self
    }

    /// Valores efectivamente elegidos para una columna (sin placeholders).
    pub fn elegidos(&self, columna: &str) -> Vec<String> {
        self.elecciones
            .get(columna)
            .map(|vs| {
                vs.iter()
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty() && *v != SELECCIONAR && !es_comodin(v))
                    .map(|v| v.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Construye la selección a partir de los campos enviados. `obtener`
/// devuelve todos los valores enviados para un nombre de campo.
pub fn seleccion_desde_formulario<F>(esquema: &EsquemaCascada, valores_padre: &[String], obtener: F) -> Vec<SeleccionValor>
where
    F: Fn(&str) -> Vec<String>,
{
    valores_padre
        .iter()
        .map(|valor| {
            let mut sel = SeleccionValor::new(valor);
            for d in &esquema.dependientes {
                let mut enviados = obtener(&d.nombre_campo(valor));
                if d.modo == ModoSeleccion::Simple {
                    enviados.truncate(1);
                }
                sel.elecciones.insert(d.columna.clone(), enviados);
            }
            sel
        })
        .collect()
}

/// Selección con todas las dimensiones en comodín (avance automático).
pub fn seleccion_comodin(valores_padre: &[String]) -> Vec<SeleccionValor> {
    valores_padre.iter().map(|v| SeleccionValor::new(v)).collect()
}

/// Verifica las dimensiones obligatorias: si el valor padre tiene opciones
/// reales para la dimensión, el usuario debe haber elegido alguna.
pub fn validar_seleccion(opciones: &[OpcionesPorValor], selecciones: &[SeleccionValor]) -> Result<(), ErrorAsistente> {
    for op in opciones {
        let sel = selecciones.iter().find(|s| s.valor == op.valor);
        for (dim, ops) in &op.dimensiones {
            if !dim.obligatoria || es_placeholder(ops) { continue; }
            let elegidos = sel.map(|s| s.elegidos(&dim.columna)).unwrap_or_default();
            if elegidos.is_empty() {
                return Err(ErrorAsistente::SeleccionVacia(format!("{} ({})", dim.columna, op.valor)));
            }
        }
    }
    Ok(())
}

/// Convierte la selección en combinaciones del filtro.
///
/// Por cada valor padre: el padre fija su valor; cada dimensión sin elección
/// queda en `TODOS` (la fila debe tener el comodín); una dimensión con
/// elecciones admite cada valor elegido y además `TODOS`.
pub fn combinaciones_desde_seleccion(esquema: &EsquemaCascada, selecciones: &[SeleccionValor]) -> Vec<Combinacion> {
    let mut combinaciones = Vec::new();
    for sel in selecciones {
        let mut dims: Vec<(String, Vec<String>)> = vec![(esquema.padre.clone(), vec![sel.valor.clone()])];
        for d in &esquema.dependientes {
            let mut valores = sel.elegidos(&d.columna);
            valores.push(TODOS.to_string());
            dims.push((d.columna.clone(), valores));
        }
        for c in producto(&dims) {
            if !combinaciones.contains(&c) {
                combinaciones.push(c);
            }
        }
    }
    combinaciones
}
