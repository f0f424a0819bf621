// Estructuras de datos principales

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Valor comodín de los catálogos: una fila con "TODOS" en una columna sirve
/// para cualquier selección de esa columna.
pub const TODOS: &str = "TODOS";

/// Placeholder de las dimensiones de selección simple que no tienen opciones
/// (o cuya columna no existe en el Excel).
pub const SELECCIONAR: &str = "Seleccionar";

/// Columna de cantidad en los catálogos fuente y en el reporte final.
pub const COLUMNA_CANTIDAD: &str = "4.CANTIDAD";

/// Renombres de encabezados fuente -> encabezados canónicos del reporte.
pub const RENOMBRES_CANONICOS: [(&str, &str); 4] = [
    ("1. Cód.SAP", "Cód.SAP"),
    ("2. MATERIAL", "MATERIAL"),
    ("3. Descripción", "Descripción"),
    ("5.CONDICIÓN", "CONDICIÓN"),
];

/// Columnas del reporte final, en orden.
pub const COLUMNAS_CANONICAS: [&str; 5] = ["Cód.SAP", "MATERIAL", "Descripción", COLUMNA_CANTIDAD, "CONDICIÓN"];

/// Compara un valor de celda con el comodín (sin distinguir mayúsculas).
pub fn es_comodin(valor: &str) -> bool {
    valor.trim().eq_ignore_ascii_case(TODOS)
}

/// Una fila del catálogo. Las celdas vacías no se guardan: una columna
/// ausente en `valores` equivale a un nulo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fila {
    pub valores: HashMap<String, String>,
}

impl Fila {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construye una fila a partir de pares (columna, valor); los valores
    /// vacíos se descartan.
    pub fn desde_pares<I, K, V>(pares: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut fila = Fila::new();
        for (k, v) in pares {
            fila.set(k, v);
        }
        fila
    }

    pub fn valor(&self, columna: &str) -> Option<&str> {
        self.valores.get(columna).map(|s| s.as_str())
    }

    pub fn set<K: Into<String>, V: Into<String>>(&mut self, columna: K, valor: V) {
        let valor = valor.into().trim().to_string();
        let columna = columna.into();
        if valor.is_empty() {
            self.valores.remove(&columna);
        } else {
            self.valores.insert(columna, valor);
        }
    }

    pub fn esta_vacia(&self, columna: &str) -> bool {
        self.valor(columna).is_none()
    }
}

/// Conjunto de filas con encabezados ordenados (la "hoja" leída del Excel).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tabla {
    pub columnas: Vec<String>,
    pub filas: Vec<Fila>,
}

impl Tabla {
    pub fn new(columnas: Vec<String>) -> Self {
        Tabla { columnas, filas: Vec::new() }
    }

    pub fn con_filas(columnas: &[&str], filas: Vec<Fila>) -> Self {
        Tabla {
            columnas: columnas.iter().map(|c| c.to_string()).collect(),
            filas,
        }
    }

    pub fn tiene_columna(&self, columna: &str) -> bool {
        self.columnas.iter().any(|c| c == columna)
    }

    pub fn len(&self) -> usize {
        self.filas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filas.is_empty()
    }

    /// Subtabla con las filas cuyo `columna` es exactamente `valor`.
    pub fn donde(&self, columna: &str, valor: &str) -> Tabla {
        Tabla {
            columnas: self.columnas.clone(),
            filas: self
                .filas
                .iter()
                .filter(|f| f.valor(columna) == Some(valor))
                .cloned()
                .collect(),
        }
    }
}

/// Resultado de un flujo terminado: etiqueta y filas ya proyectadas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultadoFlujo {
    pub flujo: String,
    pub tabla: Tabla,
}
