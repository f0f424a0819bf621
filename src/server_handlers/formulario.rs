use actix_web::web;

/// Campos de un formulario `application/x-www-form-urlencoded`, conservando
/// claves repetidas (checkboxes de selección múltiple).
#[derive(Debug, Clone, Default)]
pub struct Formulario(pub Vec<(String, String)>);

impl From<web::Form<Vec<(String, String)>>> for Formulario {
    fn from(f: web::Form<Vec<(String, String)>>) -> Self {
        Formulario(f.into_inner())
    }
}

impl Formulario {
    /// Primer valor enviado para `campo`.
    pub fn get(&self, campo: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == campo).map(|(_, v)| v.as_str())
    }

    /// Todos los valores no vacíos enviados para `campo`, en orden.
    pub fn get_list(&self, campo: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(k, v)| k == campo && !v.trim().is_empty())
            .map(|(_, v)| v.trim().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_list_repetidos() {
        let f = Formulario(vec![
            ("tipo_2".to_string(), "EU".to_string()),
            ("acero_2".to_string(), "J55".to_string()),
            ("tipo_2".to_string(), " NU ".to_string()),
            ("tipo_2".to_string(), "".to_string()),
        ]);
        assert_eq!(f.get_list("tipo_2"), vec!["EU", "NU"]);
        assert_eq!(f.get("acero_2"), Some("J55"));
        assert_eq!(f.get("tipo_cup_2"), None);
    }
}
