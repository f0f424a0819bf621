use actix_web::http::header;
use actix_web::{web, HttpResponse};
use log::info;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use crate::algorithm::{parse_cantidad, seleccion_comodin, seleccion_desde_formulario, todas_sin_opciones, CantidadPorValor};
use crate::error::ErrorAsistente;
use crate::server_handlers::formulario::Formulario;
use crate::vistas;
use crate::wizard::{Asistente, EstadoPaso, Paso};

#[derive(Debug, Deserialize)]
pub struct EstadoQuery {
    pub estado: String,
}

pub fn html(cuerpo: String) -> HttpResponse {
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(cuerpo)
}

fn redirigir_a(url: String) -> HttpResponse {
    HttpResponse::SeeOther().insert_header((header::LOCATION, url)).finish()
}

/// Redirige al paso indicado de la corrida. El paso de filtros necesita su
/// token, así que sin él se vuelve a la selección del mismo flujo.
pub fn redirigir(corrida: &Uuid, paso: &Paso) -> HttpResponse {
    let paso = match paso {
        Paso::Filtros(f) => Paso::Seleccion(f.clone()),
        otro => otro.clone(),
    };
    redirigir_a(format!("/corridas/{}/{}", corrida, paso.ruta()))
}

fn redirigir_filtros(corrida: &Uuid, flujo: &str, token: &str) -> HttpResponse {
    redirigir_a(format!("/corridas/{}/flujos/{}/filtros?estado={}", corrida, flujo, token))
}

pub async fn inicio_handler() -> HttpResponse {
    html(vistas::pagina_inicio())
}

/// POST /corridas
pub async fn crear_corrida_handler(asistente: web::Data<Asistente>) -> HttpResponse {
    let corrida = asistente.corridas.crear(&asistente.catalogo);
    info!("corrida {} creada", corrida.id);
    redirigir(&corrida.id, &corrida.paso)
}

/// GET /corridas/{id}: estado de la corrida (paso actual y flujos acumulados).
pub async fn corrida_handler(asistente: web::Data<Asistente>, path: web::Path<Uuid>) -> Result<HttpResponse, ErrorAsistente> {
    let corrida = asistente.corridas.obtener(&path.into_inner())?;
    let flujos: Vec<&str> = corrida.acumulado().iter().map(|r| r.flujo.as_str()).collect();
    Ok(HttpResponse::Ok().json(json!({
        "id": corrida.id,
        "creada": corrida.creada,
        "paso": corrida.paso,
        "acumulado": flujos,
    })))
}

/// DELETE /corridas/{id}
pub async fn descartar_corrida_handler(asistente: web::Data<Asistente>, path: web::Path<Uuid>) -> Result<HttpResponse, ErrorAsistente> {
    let id = path.into_inner();
    if asistente.corridas.descartar(&id) {
        Ok(HttpResponse::Ok().json(json!({"status": "deleted", "id": id})))
    } else {
        Err(ErrorAsistente::CorridaDesconocida(id.to_string()))
    }
}

/// GET /corridas/{id}/flujos/{flujo}: pregunta SI/NO del flujo.
pub async fn decision_handler(asistente: web::Data<Asistente>, path: web::Path<(Uuid, String)>) -> Result<HttpResponse, ErrorAsistente> {
    let (id, flujo_id) = path.into_inner();
    asistente.corridas.obtener(&id)?;
    let flujo = asistente.catalogo.get(&flujo_id)?;
    if flujo.es_terminal() {
        return Ok(redirigir(&id, &Paso::Reporte));
    }
    Ok(html(vistas::pagina_decision(&id, flujo)))
}

/// POST /corridas/{id}/flujos/{flujo}/decidir (campo `ajuste`)
pub async fn decidir_handler(
    asistente: web::Data<Asistente>,
    path: web::Path<(Uuid, String)>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, ErrorAsistente> {
    let (id, flujo_id) = path.into_inner();
    let form = Formulario::from(form);
    let respuesta = form.get("ajuste").unwrap_or("");
    let paso = asistente
        .corridas
        .con_corrida(&id, |c| c.decidir(&asistente.catalogo, &flujo_id, respuesta))?;
    Ok(redirigir(&id, &paso))
}

/// GET /corridas/{id}/flujos/{flujo}/seleccion: valores de la dimensión padre.
pub async fn seleccion_handler(asistente: web::Data<Asistente>, path: web::Path<(Uuid, String)>) -> Result<HttpResponse, ErrorAsistente> {
    let (id, flujo_id) = path.into_inner();
    asistente.corridas.obtener(&id)?;
    let (flujo, esquema) = asistente.flujo_con_datos(&flujo_id)?;
    let opciones = asistente.opciones_padre(&flujo_id)?;
    Ok(html(vistas::pagina_seleccion(&id, flujo, &esquema.padre, &opciones)))
}

/// POST /corridas/{id}/flujos/{flujo}/seleccion (lista `valores`)
pub async fn seleccion_post_handler(
    asistente: web::Data<Asistente>,
    path: web::Path<(Uuid, String)>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, ErrorAsistente> {
    let (id, flujo_id) = path.into_inner();
    let form = Formulario::from(form);
    let token = asistente.seleccionar_padre(&id, &flujo_id, form.get_list("valores"))?;
    Ok(redirigir_filtros(&id, &flujo_id, &token))
}

/// GET /corridas/{id}/flujos/{flujo}/filtros?estado=...
///
/// Si el flujo avanza solo y ningún valor tiene opciones dependientes, se
/// devuelve una página que confirma por POST con comodines. El GET nunca
/// modifica la corrida.
pub async fn filtros_handler(
    asistente: web::Data<Asistente>,
    path: web::Path<(Uuid, String)>,
    query: web::Query<EstadoQuery>,
) -> Result<HttpResponse, ErrorAsistente> {
    let (id, flujo_id) = path.into_inner();
    asistente.corridas.obtener(&id)?;
    let estado = EstadoPaso::decodificar_para(&query.estado, &flujo_id)?;
    let (flujo, _) = asistente.flujo_con_datos(&flujo_id)?;
    let opciones = asistente.opciones_filtros(&flujo_id, &estado)?;

    if flujo.autoavanzar_sin_opciones && todas_sin_opciones(&opciones) {
        info!("flujo {}: sin opciones dependientes, avance automático", flujo_id);
        return Ok(html(vistas::pagina_avance_automatico(&id, flujo, &query.estado)));
    }

    Ok(html(vistas::pagina_filtros(&id, flujo, &query.estado, &opciones)))
}

fn leer_cantidades(form: &Formulario, valores_padre: &[String]) -> Result<Vec<CantidadPorValor>, ErrorAsistente> {
    let mut cantidades = Vec::new();
    for valor in valores_padre {
        let campo = format!("cantidad_{}", valor);
        let texto = form.get(&campo).unwrap_or("");
        let cantidad = parse_cantidad(texto).map_err(|_| ErrorAsistente::CantidadInvalida {
            campo: valor.clone(),
            valor: texto.to_string(),
        })?;
        match cantidad {
            Some(c) if c < 0.0 || !c.is_finite() => {
                return Err(ErrorAsistente::CantidadInvalida { campo: valor.clone(), valor: texto.to_string() });
            }
            Some(c) => cantidades.push(CantidadPorValor { valor: valor.clone(), cantidad: c }),
            None => {}
        }
    }
    Ok(cantidades)
}

/// POST /corridas/{id}/flujos/{flujo}/filtros?estado=...
///
/// Con `avance=auto` (página de avance automático) todas las dimensiones
/// quedan en comodín.
pub async fn filtros_post_handler(
    asistente: web::Data<Asistente>,
    path: web::Path<(Uuid, String)>,
    query: web::Query<EstadoQuery>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, ErrorAsistente> {
    let (id, flujo_id) = path.into_inner();
    let form = Formulario::from(form);
    let estado = EstadoPaso::decodificar_para(&query.estado, &flujo_id)?;
    let (flujo, esquema) = asistente.flujo_con_datos(&flujo_id)?;

    let selecciones = if flujo.autoavanzar_sin_opciones && form.get("avance") == Some("auto") {
        seleccion_comodin(&estado.valores_padre)
    } else {
        seleccion_desde_formulario(esquema, &estado.valores_padre, |campo| form.get_list(campo))
    };
    let cantidades = leer_cantidades(&form, &estado.valores_padre)?;
    let paso = asistente.confirmar_filtros(&id, &flujo_id, &estado, &selecciones, &cantidades)?;
    Ok(redirigir(&id, &paso))
}
