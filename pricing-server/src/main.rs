use pricing_server::common::init_logger_with_file;
use pricing_server::{Config, Server};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env();
    init_logger_with_file(
        &config.log_level,
        config.log_json || config.is_production(),
        config.log_dir.as_deref(),
    )?;

    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        "Starting pricing-server"
    );

    Server::new(config).run().await?;
    Ok(())
}
