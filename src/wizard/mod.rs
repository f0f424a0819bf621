//! Asistente por pasos: definición de flujos, estado entre pasos,
//! secuenciador/acumulador y la orquestación de cada paso sobre los
//! catálogos.

pub mod flujos;
pub mod estado;
pub mod corrida;

pub use flujos::{CatalogoFlujos, Flujo};
pub use estado::EstadoPaso;
pub use corrida::{AlmacenCorridas, Corrida, Decision, Paso};

use log::{info, warn};
use std::path::PathBuf;
use uuid::Uuid;
use crate::algorithm::{
    self, opciones_dependientes, opciones_o_placeholder, validar_seleccion, CantidadPorValor, EsquemaCascada,
    OpcionesPorValor, SeleccionValor,
};
use crate::error::ErrorAsistente;
use crate::excel;
use crate::models::{Tabla, TODOS};

/// Servicio del asistente compartido por los handlers.
#[derive(Debug)]
pub struct Asistente {
    pub materiales_dir: PathBuf,
    pub catalogo: CatalogoFlujos,
    pub corridas: AlmacenCorridas,
}

impl Asistente {
    pub fn new(materiales_dir: PathBuf, catalogo: CatalogoFlujos, corridas: AlmacenCorridas) -> Self {
        Asistente { materiales_dir, catalogo, corridas }
    }

    /// Flujo no terminal con su esquema.
    pub fn flujo_con_datos(&self, id: &str) -> Result<(&Flujo, &EsquemaCascada), ErrorAsistente> {
        let flujo = self.catalogo.get(id)?;
        match &flujo.esquema {
            Some(e) if !flujo.es_terminal() => Ok((flujo, e)),
            _ => Err(ErrorAsistente::FlujoDesconocido(format!("{} no tiene catálogo", id))),
        }
    }

    /// Relee el catálogo del flujo (sin caché).
    pub fn cargar(&self, flujo: &Flujo) -> Result<Tabla, ErrorAsistente> {
        let archivo = flujo
            .archivo
            .as_deref()
            .ok_or_else(|| ErrorAsistente::FlujoDesconocido(format!("{} no tiene catálogo", flujo.id)))?;
        excel::cargar_dataset(&self.materiales_dir, archivo, &flujo.columnas_requeridas()).map_err(|e| {
            warn!("flujo {}: {}", flujo.id, e);
            e
        })
    }

    /// Opciones de la dimensión padre.
    pub fn opciones_padre(&self, id: &str) -> Result<Vec<String>, ErrorAsistente> {
        let (flujo, esquema) = self.flujo_con_datos(id)?;
        let tabla = self.cargar(flujo)?;
        Ok(opciones_o_placeholder(&tabla, &esquema.padre, TODOS))
    }

    /// Registra la selección padre y devuelve el token del paso de filtros.
    pub fn seleccionar_padre(&self, corrida: &Uuid, id: &str, valores: Vec<String>) -> Result<String, ErrorAsistente> {
        let (_, esquema) = self.flujo_con_datos(id)?;
        let valores: Vec<String> = valores
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if valores.is_empty() {
            return Err(ErrorAsistente::SeleccionVacia(esquema.padre.clone()));
        }
        self.corridas.con_corrida(corrida, |c| c.a_filtros(id))?;
        EstadoPaso::new(id, valores).codificar()
    }

    /// Opciones de las dimensiones dependientes para el estado recibido.
    pub fn opciones_filtros(&self, id: &str, estado: &EstadoPaso) -> Result<Vec<OpcionesPorValor>, ErrorAsistente> {
        let (flujo, esquema) = self.flujo_con_datos(id)?;
        let tabla = self.cargar(flujo)?;
        Ok(opciones_dependientes(&tabla, esquema, &estado.valores_padre))
    }

    /// Aplica la selección confirmada: filtra, rellena cantidades, proyecta
    /// y agrega el resultado a la corrida. Devuelve el paso siguiente.
    pub fn confirmar_filtros(
        &self,
        corrida: &Uuid,
        id: &str,
        estado: &EstadoPaso,
        selecciones: &[SeleccionValor],
        cantidades: &[CantidadPorValor],
    ) -> Result<Paso, ErrorAsistente> {
        let (flujo, esquema) = self.flujo_con_datos(id)?;
        let tabla = self.cargar(flujo)?;
        let opciones = opciones_dependientes(&tabla, esquema, &estado.valores_padre);
        validar_seleccion(&opciones, selecciones)?;

        let cantidades: &[CantidadPorValor] = if flujo.pide_cantidad { cantidades } else { &[] };
        let resultado = algorithm::resolver_flujo(&tabla, esquema, selecciones, cantidades);
        info!("flujo {}: {} filas seleccionadas", id, resultado.len());
        self.corridas.con_corrida(corrida, |c| c.registrar(&self.catalogo, id, resultado))
    }
}
