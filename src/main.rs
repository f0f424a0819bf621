// --- Asistente de materiales - Archivo principal ---

use log::{error, info};
use materiales::{run_server, Config};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("=== Asistente de materiales ===");
    let config = match Config::desde_entorno() {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            return Err(std::io::Error::other(e));
        }
    };

    info!("Iniciando servidor en http://{}", config.bind);
    run_server(config).await
}
