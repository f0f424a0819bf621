use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;
use uuid::Uuid;
use crate::error::ErrorAsistente;
use crate::models::{ResultadoFlujo, Tabla};
use crate::wizard::flujos::CatalogoFlujos;

/// Respuesta del punto de decisión de un flujo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Si,
    No,
}

impl FromStr for Decision {
    type Err = ErrorAsistente;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SI" | "SÍ" => Ok(Decision::Si),
            "NO" => Ok(Decision::No),
            otro => Err(ErrorAsistente::DecisionInvalida(otro.to_string())),
        }
    }
}

/// Paso en curso de una corrida.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "paso", content = "flujo", rename_all = "snake_case")]
pub enum Paso {
    Decision(String),
    Seleccion(String),
    Filtros(String),
    Reporte,
}

impl Paso {
    pub fn flujo(&self) -> Option<&str> {
        match self {
            Paso::Decision(f) | Paso::Seleccion(f) | Paso::Filtros(f) => Some(f),
            Paso::Reporte => None,
        }
    }

    /// Ruta relativa a la corrida donde se atiende el paso.
    pub fn ruta(&self) -> String {
        match self {
            Paso::Decision(f) => format!("flujos/{}", f),
            Paso::Seleccion(f) => format!("flujos/{}/seleccion", f),
            Paso::Filtros(f) => format!("flujos/{}/filtros", f),
            Paso::Reporte => "reporte".to_string(),
        }
    }
}

/// Contexto de una ejecución del asistente: paso actual y resultados
/// acumulados (sólo se agregan, nunca se reordenan).
#[derive(Debug, Clone, Serialize)]
pub struct Corrida {
    pub id: Uuid,
    pub creada: DateTime<Utc>,
    pub actualizada: DateTime<Utc>,
    pub paso: Paso,
    acumulado: Vec<ResultadoFlujo>,
}

fn paso_inicial(catalogo: &CatalogoFlujos, flujo: Option<&str>) -> Paso {
    match flujo.and_then(|id| catalogo.get(id).ok()) {
        Some(f) if !f.es_terminal() => Paso::Decision(f.id.clone()),
        _ => Paso::Reporte,
    }
}

impl Corrida {
    pub fn nueva(catalogo: &CatalogoFlujos) -> Self {
        let ahora = Utc::now();
        Corrida {
            id: Uuid::new_v4(),
            creada: ahora,
            actualizada: ahora,
            paso: paso_inicial(catalogo, catalogo.primero().map(|f| f.id.as_str())),
            acumulado: Vec::new(),
        }
    }

    pub fn acumulado(&self) -> &[ResultadoFlujo] {
        &self.acumulado
    }

    /// Verifica que la acción corresponde al flujo en curso.
    fn exigir_flujo(&self, flujo: &str) -> Result<(), ErrorAsistente> {
        if self.paso.flujo() == Some(flujo) {
            Ok(())
        } else {
            Err(ErrorAsistente::PasoFueraDeSecuencia {
                esperado: self.paso.ruta(),
                recibido: format!("flujos/{}", flujo),
            })
        }
    }

    fn avanzar_desde(&mut self, catalogo: &CatalogoFlujos, flujo: &str) -> Paso {
        let siguiente = catalogo.siguiente(flujo).map(|f| f.id.as_str());
        self.paso = paso_inicial(catalogo, siguiente);
        self.actualizada = Utc::now();
        self.paso.clone()
    }

    /// Procesa la respuesta SI/NO del flujo. Una respuesta no reconocida o
    /// fuera de secuencia se rechaza sin modificar la corrida.
    pub fn decidir(&mut self, catalogo: &CatalogoFlujos, flujo: &str, respuesta: &str) -> Result<Paso, ErrorAsistente> {
        let decision = Decision::from_str(respuesta)?;
        self.exigir_flujo(flujo)?;
        catalogo.get(flujo)?;
        let paso = match decision {
            Decision::Si => {
                self.paso = Paso::Seleccion(flujo.to_string());
                self.actualizada = Utc::now();
                self.paso.clone()
            }
            Decision::No => self.avanzar_desde(catalogo, flujo),
        };
        debug!("corrida {}: flujo {} -> {:?}", self.id, flujo, paso);
        Ok(paso)
    }

    /// Marca que la selección padre del flujo está hecha. Sólo vale justo
    /// después de responder SI.
    pub fn a_filtros(&mut self, flujo: &str) -> Result<Paso, ErrorAsistente> {
        self.exigir_flujo(flujo)?;
        if !matches!(self.paso, Paso::Seleccion(_)) {
            return Err(ErrorAsistente::PasoFueraDeSecuencia { esperado: self.paso.ruta(), recibido: format!("flujos/{}/seleccion", flujo) });
        }
        self.paso = Paso::Filtros(flujo.to_string());
        self.actualizada = Utc::now();
        Ok(self.paso.clone())
    }

    /// Agrega el resultado del flujo al acumulado y avanza al siguiente.
    /// Exige que la selección padre ya esté registrada.
    pub fn registrar(&mut self, catalogo: &CatalogoFlujos, flujo: &str, tabla: Tabla) -> Result<Paso, ErrorAsistente> {
        self.exigir_flujo(flujo)?;
        if !matches!(self.paso, Paso::Filtros(_)) {
            return Err(ErrorAsistente::PasoFueraDeSecuencia { esperado: self.paso.ruta(), recibido: format!("flujos/{}/filtros", flujo) });
        }
        let etiqueta = catalogo.get(flujo)?.etiqueta();
        info!("corrida {}: {} agrega {} filas", self.id, etiqueta, tabla.len());
        self.acumulado.push(ResultadoFlujo { flujo: etiqueta, tabla });
        Ok(self.avanzar_desde(catalogo, flujo))
    }
}

/// Almacén de corridas en memoria, indexado por id. Cada usuario trabaja
/// sobre su propia corrida; ninguna comparte acumulado con otra.
#[derive(Debug)]
pub struct AlmacenCorridas {
    corridas: Mutex<HashMap<Uuid, Corrida>>,
    ttl: Duration,
}

impl Default for AlmacenCorridas {
    fn default() -> Self {
        Self::new(Duration::minutes(120))
    }
}

impl AlmacenCorridas {
    pub fn new(ttl: Duration) -> Self {
        AlmacenCorridas { corridas: Mutex::new(HashMap::new()), ttl }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Corrida>> {
        self.corridas.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Crea una corrida nueva y descarta las inactivas por más del TTL.
    pub fn crear(&self, catalogo: &CatalogoFlujos) -> Corrida {
        let corrida = Corrida::nueva(catalogo);
        let limite = Utc::now() - self.ttl;
        let mut guard = self.lock();
        let antes = guard.len();
        guard.retain(|_, c| c.actualizada >= limite);
        if guard.len() < antes {
            debug!("{} corridas expiradas descartadas", antes - guard.len());
        }
        guard.insert(corrida.id, corrida.clone());
        corrida
    }

    /// Corrida vigente con el bloqueo tomado. Una corrida vencida se
    /// descarta y se informa como desconocida.
    fn vigente<'a>(&self, guard: &'a mut HashMap<Uuid, Corrida>, id: &Uuid) -> Result<&'a mut Corrida, ErrorAsistente> {
        let limite = Utc::now() - self.ttl;
        if guard.get(id).is_some_and(|c| c.actualizada < limite) {
            guard.remove(id);
            info!("corrida {} expirada", id);
        }
        guard
            .get_mut(id)
            .ok_or_else(|| ErrorAsistente::CorridaDesconocida(id.to_string()))
    }

    pub fn obtener(&self, id: &Uuid) -> Result<Corrida, ErrorAsistente> {
        let mut guard = self.lock();
        self.vigente(&mut guard, id).map(|c| c.clone())
    }

    /// Ejecuta `f` sobre la corrida con el bloqueo tomado.
    pub fn con_corrida<T, F>(&self, id: &Uuid, f: F) -> Result<T, ErrorAsistente>
    where
        F: FnOnce(&mut Corrida) -> Result<T, ErrorAsistente>,
    {
        let mut guard = self.lock();
        f(self.vigente(&mut guard, id)?)
    }

    pub fn descartar(&self, id: &Uuid) -> bool {
        self.lock().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Fila;

    fn tabla(codigo: &str) -> Tabla {
        Tabla::con_filas(&["Cód.SAP"], vec![Fila::desde_pares([("Cód.SAP", codigo)])])
    }

    #[test]
    fn test_decision_parse() {
        assert_eq!(" si ".parse::<Decision>().unwrap(), Decision::Si);
        assert_eq!("SÍ".parse::<Decision>().unwrap(), Decision::Si);
        assert_eq!("NO".parse::<Decision>().unwrap(), Decision::No);
        assert!(matches!("QUIZAS".parse::<Decision>(), Err(ErrorAsistente::DecisionInvalida(_))));
    }

    #[test]
    fn test_decision_invalida_no_muta() {
        let cat = CatalogoFlujos::por_defecto();
        let mut c = Corrida::nueva(&cat);
        let antes = c.paso.clone();
        assert!(c.decidir(&cat, "A", "").is_err());
        assert!(c.decidir(&cat, "A", "TAL VEZ").is_err());
        assert_eq!(c.paso, antes);
        assert!(c.acumulado().is_empty());
    }

    #[test]
    fn test_secuencia_si_no() {
        let cat = CatalogoFlujos::por_defecto();
        let mut c = Corrida::nueva(&cat);
        assert_eq!(c.paso, Paso::Decision("A".into()));
        assert_eq!(c.decidir(&cat, "A", "SI").unwrap(), Paso::Seleccion("A".into()));
        assert_eq!(c.a_filtros("A").unwrap(), Paso::Filtros("A".into()));
        assert_eq!(c.registrar(&cat, "A", tabla("1")).unwrap(), Paso::Decision("B".into()));
        for f in ["B", "C", "D", "E", "F"] {
            c.decidir(&cat, f, "NO").unwrap();
        }
        assert_eq!(c.decidir(&cat, "G", "SI").unwrap(), Paso::Seleccion("G".into()));
        assert_eq!(c.a_filtros("G").unwrap(), Paso::Filtros("G".into()));
        assert_eq!(c.registrar(&cat, "G", tabla("2")).unwrap(), Paso::Reporte);
        let etiquetas: Vec<&str> = c.acumulado().iter().map(|r| r.flujo.as_str()).collect();
        assert_eq!(etiquetas, vec!["FLUJO A", "FLUJO G"]);
    }

    #[test]
    fn test_fuera_de_secuencia() {
        let cat = CatalogoFlujos::por_defecto();
        let mut c = Corrida::nueva(&cat);
        assert!(matches!(c.decidir(&cat, "B", "SI"), Err(ErrorAsistente::PasoFueraDeSecuencia { .. })));
        assert!(c.registrar(&cat, "A", tabla("1")).is_err());
        assert!(c.acumulado().is_empty());
    }

    #[test]
    fn test_no_se_saltea_la_seleccion() {
        let cat = CatalogoFlujos::por_defecto();
        let mut c = Corrida::nueva(&cat);
        c.decidir(&cat, "A", "SI").unwrap();
        assert!(matches!(c.registrar(&cat, "A", tabla("1")), Err(ErrorAsistente::PasoFueraDeSecuencia { .. })));
        assert_eq!(c.paso, Paso::Seleccion("A".into()));
        assert!(c.acumulado().is_empty());

        c.a_filtros("A").unwrap();
        assert!(c.a_filtros("A").is_err());
        assert_eq!(c.paso, Paso::Filtros("A".into()));
    }

    #[test]
    fn test_almacen_aisla_corridas() {
        let cat = CatalogoFlujos::por_defecto();
        let almacen = AlmacenCorridas::default();
        let a = almacen.crear(&cat);
        let b = almacen.crear(&cat);
        almacen.con_corrida(&a.id, |c| {
            c.decidir(&cat, "A", "SI")?;
            c.a_filtros("A")?;
            c.registrar(&cat, "A", tabla("1"))
        }).unwrap();
        assert_eq!(almacen.obtener(&a.id).unwrap().acumulado().len(), 1);
        assert!(almacen.obtener(&b.id).unwrap().acumulado().is_empty());
        assert!(almacen.descartar(&b.id));
        assert!(matches!(almacen.obtener(&b.id), Err(ErrorAsistente::CorridaDesconocida(_))));
    }

    #[test]
    fn test_almacen_expira() {
        let cat = CatalogoFlujos::por_defecto();
        let almacen = AlmacenCorridas::new(Duration::minutes(1));
        let vieja = almacen.crear(&cat);
        almacen.con_corrida(&vieja.id, |c| {
            c.actualizada = Utc::now() - Duration::minutes(5);
            Ok(())
        }).unwrap();
        let _nueva = almacen.crear(&cat);
        assert_eq!(almacen.len(), 1);
    }

    #[test]
    fn test_corrida_vencida_no_se_usa() {
        let cat = CatalogoFlujos::por_defecto();
        let almacen = AlmacenCorridas::new(Duration::minutes(10));
        let c = almacen.crear(&cat);
        almacen.con_corrida(&c.id, |c| {
            c.actualizada = Utc::now() - Duration::minutes(11);
            Ok(())
        }).unwrap();
        assert!(matches!(almacen.obtener(&c.id), Err(ErrorAsistente::CorridaDesconocida(_))));
        assert!(matches!(
            almacen.con_corrida(&c.id, |c| c.decidir(&cat, "A", "SI")),
            Err(ErrorAsistente::CorridaDesconocida(_))
        ));
        assert!(almacen.is_empty());
    }
}
