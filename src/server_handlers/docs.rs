use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use crate::wizard::Asistente;

pub async fn help_handler(asistente: web::Data<Asistente>) -> impl Responder {
    let help = json!({
        "description": "Asistente de materiales: cada flujo pregunta SI/NO, pide los valores de la dimensión padre, luego los filtros dependientes, y agrega las filas filtradas al reporte de la corrida.",
        "rutas": {
            "POST /corridas": "crea una corrida y redirige a la decisión del primer flujo",
            "GET /corridas/{id}": "estado de la corrida",
            "DELETE /corridas/{id}": "descarta la corrida",
            "GET /corridas/{id}/flujos/{flujo}": "pregunta SI/NO",
            "POST /corridas/{id}/flujos/{flujo}/decidir": "campo 'ajuste' = SI | NO",
            "GET|POST /corridas/{id}/flujos/{flujo}/seleccion": "lista 'valores' de la dimensión padre",
            "GET|POST /corridas/{id}/flujos/{flujo}/filtros?estado=...": "campos '<campo>_<valor>' y 'cantidad_<valor>'",
            "GET /corridas/{id}/reporte[.json|.xlsx]": "reporte consolidado",
            "GET|POST /datasets": "lista o sube catálogos Excel",
            "GET /datasets/descargar?name=...": "descarga un catálogo"
        },
        "comodin": crate::models::TODOS,
        "flujos": asistente.catalogo.flujos,
    });

    HttpResponse::Ok().json(help)
}
