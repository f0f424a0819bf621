use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use crate::algorithm::{Dimension, EsquemaCascada};
use crate::error::ErrorAsistente;

/// Definición de un flujo del asistente (A..H).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flujo {
    pub id: String,
    pub titulo: String,
    /// Pregunta SI/NO con la que arranca el flujo.
    #[serde(default)]
    pub pregunta: String,
    /// Catálogo Excel del flujo (relativo al directorio de materiales).
    /// `None` sólo en el flujo terminal.
    #[serde(default)]
    pub archivo: Option<String>,
    #[serde(default)]
    pub esquema: Option<EsquemaCascada>,
    /// Pide una cantidad por valor padre para las filas sin cantidad.
    #[serde(default)]
    pub pide_cantidad: bool,
    /// Si ningún valor padre tiene opciones dependientes reales, el paso de
    /// filtros se envía solo con comodines.
    #[serde(default)]
    pub autoavanzar_sin_opciones: bool,
}

impl Flujo {
    /// Etiqueta con la que aparece en el reporte ("FLUJO A").
    pub fn etiqueta(&self) -> String {
        format!("FLUJO {}", self.id)
    }

    pub fn es_terminal(&self) -> bool {
        self.archivo.is_none()
    }

    /// Columnas que el catálogo debe tener.
    pub fn columnas_requeridas(&self) -> Vec<&str> {
        match &self.esquema {
            Some(e) => vec![e.padre.as_str()],
            None => Vec::new(),
        }
    }

    fn con_datos(id: &str, titulo: &str, pregunta: &str, archivo: &str, esquema: EsquemaCascada) -> Self {
        Flujo {
            id: id.to_string(),
            titulo: titulo.to_string(),
            pregunta: pregunta.to_string(),
            archivo: Some(archivo.to_string()),
            esquema: Some(esquema),
            pide_cantidad: false,
            autoavanzar_sin_opciones: false,
        }
    }

    fn con_cantidad(mut self) -> Self {
        self.pide_cantidad = true;
        self
    }

    fn autoavanzando(mut self) -> Self {
        self.autoavanzar_sin_opciones = true;
        self
    }
}

fn esquema(padre: &str, dependientes: Vec<Dimension>) -> EsquemaCascada {
    EsquemaCascada { padre: padre.to_string(), dependientes }
}

/// Secuencia ordenada de flujos; el último es el terminal (reporte).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogoFlujos {
    pub flujos: Vec<Flujo>,
}

impl Default for CatalogoFlujos {
    fn default() -> Self {
        Self::por_defecto()
    }
}

impl CatalogoFlujos {
    pub fn por_defecto() -> Self {
        let flujos = vec![
            Flujo::con_datos(
                "A",
                "Ajuste de medida",
                "¿Se requiere ajuste de medida?",
                "ajuste de medida(2).xlsx",
                esquema("DIÁMETRO", vec![
                    Dimension::multiple("TIPO", "tipo"),
                    Dimension::simple("GRADO DE ACERO", "acero"),
                    Dimension::simple("GRADO DE ACERO CUPLA", "acero_cup"),
                    Dimension::simple("TIPO DE CUPLA", "tipo_cup"),
                ]),
            ),
            Flujo::con_datos(
                "B",
                "Cambio de tubing",
                "¿Se requiere cambio de tubing?",
                "cambio de tubing.xlsx",
                esquema("DIÁMETRO", vec![
                    Dimension::multiple("TIPO", "tipo"),
                    Dimension::simple("GRADO DE ACERO", "acero"),
                ]),
            )
            .con_cantidad(),
            Flujo::con_datos(
                "C",
                "Instalación de packer",
                "¿Se instala packer?",
                "packer.xlsx",
                esquema("DIÁMETRO CSG", vec![
                    Dimension::simple("DIÁMETRO", "diametro"),
                    Dimension::multiple("TIPO", "tipo"),
                ]),
            )
            .autoavanzando(),
            Flujo::con_datos(
                "D",
                "Varillas de bombeo",
                "¿Se requieren varillas de bombeo?",
                "varillas de bombeo.xlsx",
                esquema("DIÁMETRO", vec![
                    Dimension::simple("GRADO DE ACERO", "acero").obligatoria(),
                    Dimension::simple("TIPO DE CUPLA", "tipo_cup"),
                ]),
            )
            .con_cantidad(),
            Flujo::con_datos(
                "E",
                "Bomba de profundidad",
                "¿Se cambia la bomba de profundidad?",
                "bomba.xlsx",
                esquema("DIÁMETRO", vec![Dimension::multiple("TIPO", "tipo").obligatoria()]),
            ),
            Flujo::con_datos(
                "F",
                "Cabezal de pozo",
                "¿Se interviene el cabezal de pozo?",
                "cabezal.xlsx",
                esquema("DIÁMETRO CSG", vec![Dimension::multiple("TIPO", "tipo")]),
            )
            .autoavanzando(),
            Flujo::con_datos(
                "G",
                "Accesorios de superficie",
                "¿Se requieren accesorios de superficie?",
                "accesorios.xlsx",
                esquema("TIPO", Vec::new()),
            )
            .con_cantidad(),
            Flujo {
                id: "H".to_string(),
                titulo: "Material de agregación".to_string(),
                pregunta: String::new(),
                archivo: None,
                esquema: None,
                pide_cantidad: false,
                autoavanzar_sin_opciones: false,
            },
        ];
        CatalogoFlujos { flujos }
    }

    /// Lee un catálogo de flujos desde JSON y lo valida.
    pub fn desde_archivo<P: AsRef<Path>>(path: P) -> Result<Self, ErrorAsistente> {
        let path = path.as_ref();
        let texto = std::fs::read_to_string(path)
            .map_err(|e| ErrorAsistente::Configuracion(format!("{}: {}", path.display(), e)))?;
        let catalogo: CatalogoFlujos = serde_json::from_str(&texto)
            .map_err(|e| ErrorAsistente::Configuracion(format!("{}: {}", path.display(), e)))?;
        catalogo.validar()?;
        Ok(catalogo)
    }

    /// Ids únicos, al menos un flujo, sólo el último es terminal y los
    /// demás tienen catálogo y esquema.
    pub fn validar(&self) -> Result<(), ErrorAsistente> {
        let ultimo = match self.flujos.last() {
            Some(f) => f,
            None => return Err(ErrorAsistente::Configuracion("no hay flujos definidos".to_string())),
        };
        if !ultimo.es_terminal() {
            return Err(ErrorAsistente::Configuracion(format!("el último flujo ({}) debe ser el reporte (sin archivo)", ultimo.id)));
        }
        let mut vistos = HashSet::new();
        for (i, f) in self.flujos.iter().enumerate() {
            if f.id.trim().is_empty() || !vistos.insert(f.id.as_str()) {
                return Err(ErrorAsistente::Configuracion(format!("id de flujo vacío o repetido: '{}'", f.id)));
            }
            let es_ultimo = i + 1 == self.flujos.len();
            if !es_ultimo && (f.es_terminal() || f.esquema.is_none()) {
                return Err(ErrorAsistente::Configuracion(format!("el flujo {} necesita archivo y esquema", f.id)));
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&Flujo, ErrorAsistente> {
        self.flujos
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| ErrorAsistente::FlujoDesconocido(id.to_string()))
    }

    pub fn primero(&self) -> Option<&Flujo> {
        self.flujos.first()
    }

    /// Flujo que sigue a `id` en la secuencia.
    pub fn siguiente(&self, id: &str) -> Option<&Flujo> {
        let pos = self.flujos.iter().position(|f| f.id == id)?;
        self.flujos.get(pos + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogo_por_defecto_valido() {
        let c = CatalogoFlujos::por_defecto();
        assert!(c.validar().is_ok());
        let ids: Vec<&str> = c.flujos.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C", "D", "E", "F", "G", "H"]);
        assert!(c.get("H").unwrap().es_terminal());
        assert_eq!(c.siguiente("A").unwrap().id, "B");
        assert!(c.siguiente("H").is_none());
        assert_eq!(c.get("A").unwrap().etiqueta(), "FLUJO A");
    }

    #[test]
    fn test_flujo_desconocido() {
        let c = CatalogoFlujos::por_defecto();
        assert!(matches!(c.get("Z"), Err(ErrorAsistente::FlujoDesconocido(_))));
    }

    #[test]
    fn test_validar_rechaza_sin_terminal() {
        let mut c = CatalogoFlujos::por_defecto();
        c.flujos.pop();
        assert!(c.validar().is_err());
    }

    #[test]
    fn test_desde_archivo_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flujos.json");
        let json = r#"{
            "flujos": [
                {
                    "id": "A",
                    "titulo": "Ajuste de medida",
                    "pregunta": "¿Se requiere ajuste de medida?",
                    "archivo": "ajuste.xlsx",
                    "esquema": {
                        "padre": "DIÁMETRO",
                        "dependientes": [{"columna": "TIPO", "campo": "tipo", "modo": "multiple"}]
                    }
                },
                {"id": "H", "titulo": "Reporte"}
            ]
        }"#;
        std::fs::write(&path, json).unwrap();
        let c = CatalogoFlujos::desde_archivo(&path).unwrap();
        assert_eq!(c.flujos.len(), 2);
        assert_eq!(c.get("A").unwrap().esquema.as_ref().unwrap().dependientes[0].columna, "TIPO");
        assert!(!c.get("A").unwrap().pide_cantidad);
    }
}
