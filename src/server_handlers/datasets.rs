use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::stream::StreamExt;
use log::{info, warn};
use serde_json::json;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;
use crate::error::ErrorAsistente;
use crate::excel::{listar_datasets, nombre_seguro};
use crate::wizard::Asistente;

/// GET /datasets: catálogos disponibles y el archivo que usa cada flujo.
pub async fn datasets_list_handler(asistente: web::Data<Asistente>) -> Result<HttpResponse, ErrorAsistente> {
    let disponibles = listar_datasets(&asistente.materiales_dir)?;
    let flujos: Vec<serde_json::Value> = asistente
        .catalogo
        .flujos
        .iter()
        .filter_map(|f| f.archivo.as_ref().map(|a| json!({
            "flujo": f.id,
            "archivo": a,
            "disponible": disponibles.iter().any(|d| d == a),
        })))
        .collect();
    Ok(HttpResponse::Ok().json(json!({
        "directorio": asistente.materiales_dir.to_string_lossy(),
        "datasets": disponibles,
        "flujos": flujos,
    })))
}

/// POST /datasets (multipart): guarda los archivos recibidos en el
/// directorio de catálogos. Un archivo que no llega completo no toca el
/// catálogo existente.
pub async fn datasets_upload_handler(asistente: web::Data<Asistente>, mut payload: Multipart) -> HttpResponse {
    let base = asistente.materiales_dir.clone();
    if let Err(e) = tokio::fs::create_dir_all(&base).await {
        return HttpResponse::InternalServerError().json(json!({"error": format!("failed to create datasets dir: {}", e)}));
    }

    let mut saved: Vec<String> = Vec::new();
    let mut failed: Vec<String> = Vec::new();
    while let Some(field_res) = payload.next().await {
        let mut field = match field_res {
            Ok(f) => f,
            Err(e) => {
                warn!("multipart field error: {}", e);
                break;
            }
        };

        let filename = match field.content_disposition().get_filename().and_then(nombre_seguro) {
            Some(n) => n.to_string(),
            None => {
                warn!("archivo subido sin nombre válido; se ignora");
                continue;
            }
        };

        // se escribe en un temporal oculto y sólo se reemplaza el catálogo
        // si el archivo llegó completo
        let destino = base.join(&filename);
        let temporal = base.join(format!(".{}.upload-{}", filename, Uuid::new_v4()));
        let mut f = match tokio::fs::File::create(&temporal).await {
            Ok(f) => f,
            Err(e) => {
                warn!("failed to create upload file {:?}: {}", temporal, e);
                continue;
            }
        };
        let mut completo = true;
        let mut flujo_roto = false;
        while let Some(chunk) = field.next().await {
            match chunk {
                Ok(bytes) => {
                    if let Err(e) = f.write_all(&bytes).await {
                        warn!("failed to write upload chunk: {}", e);
                        completo = false;
                        break;
                    }
                }
                Err(e) => {
                    warn!("upload stream error: {}", e);
                    completo = false;
                    flujo_roto = true;
                    break;
                }
            }
        }
        if completo {
            if let Err(e) = f.flush().await {
                warn!("failed to flush upload {:?}: {}", temporal, e);
                completo = false;
            }
        }
        drop(f);

        if completo {
            match tokio::fs::rename(&temporal, &destino).await {
                Ok(()) => {
                    info!("catálogo subido: {}", filename);
                    saved.push(filename);
                    continue;
                }
                Err(e) => warn!("failed to move upload into {:?}: {}", destino, e),
            }
        }
        if let Err(e) = tokio::fs::remove_file(&temporal).await {
            warn!("failed to remove partial upload {:?}: {}", temporal, e);
        }
        failed.push(filename);
        if flujo_roto {
            break;
        }
    }

    let status = if failed.is_empty() { "ok" } else { "partial" };
    HttpResponse::Ok().json(json!({"status": status, "saved": saved, "failed": failed}))
}

/// GET /datasets/descargar?name=...
pub async fn datasets_download_handler(
    asistente: web::Data<Asistente>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> HttpResponse {
    let name = match query.get("name").map(|n| n.as_str()).and_then(nombre_seguro) {
        Some(n) => n.to_string(),
        None => return HttpResponse::BadRequest().json(json!({"error": "missing or invalid name parameter"})),
    };

    let path = asistente.materiales_dir.join(&name);
    if !path.exists() {
        return HttpResponse::NotFound().json(json!({"error": "file not found"}));
    }

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let mime = match path.extension().and_then(std::ffi::OsStr::to_str) {
                Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                Some("xls") => "application/vnd.ms-excel",
                _ => "application/octet-stream",
            };
            HttpResponse::Ok()
                .content_type(mime)
                .append_header((actix_web::http::header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", name)))
                .body(bytes)
        }
        Err(e) => HttpResponse::InternalServerError().json(json!({"error": format!("failed to read file: {}", e)})),
    }
}
