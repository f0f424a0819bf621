//! Estado de un paso que viaja entre redirecciones como un único token
//! opaco (JSON en base64 URL-safe) en el parámetro `estado`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use crate::algorithm::SeleccionValor;
use crate::error::ErrorAsistente;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstadoPaso {
    pub flujo: String,
    /// Valores elegidos en la dimensión padre.
    pub valores_padre: Vec<String>,
    /// Elecciones de dimensiones dependientes ya confirmadas (si las hay).
    #[serde(default)]
    pub selecciones: Vec<SeleccionValor>,
}

impl EstadoPaso {
    pub fn new(flujo: &str, valores_padre: Vec<String>) -> Self {
        EstadoPaso { flujo: flujo.to_string(), valores_padre, selecciones: Vec::new() }
    }

    pub fn codificar(&self) -> Result<String, ErrorAsistente> {
        let bytes = serde_json::to_vec(self).map_err(|e| ErrorAsistente::EstadoInvalido(e.to_string()))?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn decodificar(token: &str) -> Result<Self, ErrorAsistente> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| ErrorAsistente::EstadoInvalido(format!("token: {}", e)))?;
        serde_json::from_slice(&bytes).map_err(|e| ErrorAsistente::EstadoInvalido(format!("contenido: {}", e)))
    }

    /// Decodifica y verifica que el token pertenezca al flujo indicado.
    pub fn decodificar_para(token: &str, flujo: &str) -> Result<Self, ErrorAsistente> {
        let estado = Self::decodificar(token)?;
        if estado.flujo != flujo {
            return Err(ErrorAsistente::EstadoInvalido(format!(
                "el token es del flujo {}, no del {}",
                estado.flujo, flujo
            )));
        }
        if estado.valores_padre.is_empty() {
            return Err(ErrorAsistente::EstadoInvalido("sin valores seleccionados".to_string()));
        }
        Ok(estado)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_con_caracteres_especiales() {
        let mut e = EstadoPaso::new("A", vec!["2 7/8".to_string(), "3 1/2\"".to_string()]);
        e.selecciones.push(SeleccionValor::new("2 7/8").con("TIPO", &["EU", "NU"]));
        let token = e.codificar().unwrap();
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(EstadoPaso::decodificar_para(&token, "A").unwrap(), e);
    }

    #[test]
    fn test_token_invalido() {
        assert!(matches!(EstadoPaso::decodificar("%%%"), Err(ErrorAsistente::EstadoInvalido(_))));
        let otro = EstadoPaso::new("B", vec!["2".to_string()]).codificar().unwrap();
        assert!(EstadoPaso::decodificar_para(&otro, "A").is_err());
        let vacio = EstadoPaso::new("A", Vec::new()).codificar().unwrap();
        assert!(EstadoPaso::decodificar_para(&vacio, "A").is_err());
    }
}
