use asset_server::{Config, Server, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 必须在读取配置之前加载
    dotenv::dotenv().ok();

    let config = Config::from_env();
    let _log_guard = setup_environment(&config);

    tracing::info!(
        port = config.http_port,
        work_dir = %config.work_dir,
        "asset-server starting"
    );

    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
