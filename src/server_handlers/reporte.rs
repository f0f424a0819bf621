use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;
use crate::error::ErrorAsistente;
use crate::reporte::{reporte_json, reporte_xlsx};
use crate::server_handlers::asistente::html;
use crate::vistas;
use crate::wizard::Asistente;

/// GET /corridas/{id}/reporte
pub async fn reporte_handler(asistente: web::Data<Asistente>, path: web::Path<Uuid>) -> Result<HttpResponse, ErrorAsistente> {
    let id = path.into_inner();
    let corrida = asistente.corridas.obtener(&id)?;
    Ok(html(vistas::pagina_reporte(&id, corrida.acumulado())))
}

/// GET /corridas/{id}/reporte.json
pub async fn reporte_json_handler(asistente: web::Data<Asistente>, path: web::Path<Uuid>) -> Result<HttpResponse, ErrorAsistente> {
    let corrida = asistente.corridas.obtener(&path.into_inner())?;
    Ok(HttpResponse::Ok().json(json!({
        "corrida": corrida.id,
        "paso": corrida.paso,
        "resultados": reporte_json(corrida.acumulado()),
    })))
}

/// GET /corridas/{id}/reporte.xlsx
pub async fn reporte_xlsx_handler(asistente: web::Data<Asistente>, path: web::Path<Uuid>) -> Result<HttpResponse, ErrorAsistente> {
    let corrida = asistente.corridas.obtener(&path.into_inner())?;
    let bytes = reporte_xlsx(corrida.acumulado())?;
    let nombre = format!("materiales-{}.xlsx", corrida.creada.format("%Y%m%d-%H%M"));
    Ok(HttpResponse::Ok()
        .content_type("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
        .append_header((header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", nombre)))
        .body(bytes))
}
