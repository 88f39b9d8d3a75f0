use env_logger::Env;
use log::{error, info, warn};
use plate_console::api::ApiClient;
use plate_console::app;
use plate_console::config::Config;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("Starting plate-console");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };
    info!("Using backend at {}", config.api_url);

    match ApiClient::new(config.api_url.clone()).server_status().await {
        Ok(status) => info!("Backend status: {}", status),
        Err(e) => warn!("Backend not reachable yet: {}", e),
    }

    if let Err(e) = app::run(config).await {
        error!("Front end failed: {}", e);
        std::process::exit(1);
    }
    info!("Exiting main");
}
