use actix_web::{middleware, web, App, HttpServer};
use log::info;
use crate::config::Config;
use crate::server_handlers::*;
use crate::wizard::{AlmacenCorridas, Asistente};

/// Registra todas las rutas del asistente. Se usa tanto en `run_server`
/// como en los tests de integración.
pub fn configurar_rutas(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(inicio_handler))
        .route("/help", web::get().to(help_handler))
        .route("/datasets", web::get().to(datasets_list_handler))
        .route("/datasets", web::post().to(datasets_upload_handler))
        .route("/datasets/descargar", web::get().to(datasets_download_handler))
        .route("/corridas", web::post().to(crear_corrida_handler))
        .route("/corridas/{id}", web::get().to(corrida_handler))
        .route("/corridas/{id}", web::delete().to(descartar_corrida_handler))
        .route("/corridas/{id}/reporte", web::get().to(reporte_handler))
        .route("/corridas/{id}/reporte.json", web::get().to(reporte_json_handler))
        .route("/corridas/{id}/reporte.xlsx", web::get().to(reporte_xlsx_handler))
        .route("/corridas/{id}/flujos/{flujo}", web::get().to(decision_handler))
        .route("/corridas/{id}/flujos/{flujo}/decidir", web::post().to(decidir_handler))
        .route("/corridas/{id}/flujos/{flujo}/seleccion", web::get().to(seleccion_handler))
        .route("/corridas/{id}/flujos/{flujo}/seleccion", web::post().to(seleccion_post_handler))
        .route("/corridas/{id}/flujos/{flujo}/filtros", web::get().to(filtros_handler))
        .route("/corridas/{id}/flujos/{flujo}/filtros", web::post().to(filtros_post_handler));
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    info!("catálogos en {:?}", config.materiales_dir);
    info!("{} flujos configurados", config.catalogo.flujos.len());

    let asistente = web::Data::new(Asistente::new(
        config.materiales_dir.clone(),
        config.catalogo.clone(),
        AlmacenCorridas::new(config.ttl),
    ));

    HttpServer::new(move || {
        App::new()
            .app_data(asistente.clone())
            .wrap(middleware::Logger::default())
            .configure(configurar_rutas)
    })
    .bind(&config.bind)?
    .run()
    .await
}
