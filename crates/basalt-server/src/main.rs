use basalt_common::Result;
use basalt_server::config::{ServerConfig, DEFAULT_CONFIG_PATH};
use basalt_server::Server;
use log::{info, warn, LevelFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_owned());
    let config = ServerConfig::load(&path)?;

    let level = basalt_logger::parse_level(&config.log_level);
    if let Err(e) = basalt_logger::init(level.unwrap_or(LevelFilter::Info)) {
        eprintln!("Failed to install logger: {}", e);
    }
    if level.is_none() {
        warn!("Unknown log level {:?}, using info", config.log_level);
    }
    info!("Basalt init");

    let server = Server::new(config)?;
    let listener = server.bind().await?;
    tokio::select! {
        _ = server.clone().serve(listener) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            server.shutdown().await;
        }
    }
    Ok(())
}
