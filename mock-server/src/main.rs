use mock_server::Config;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = Config::load()?;
    info!("Binding to {}", config.addr);
    let listener = TcpListener::bind(&config.addr).await?;
    info!("Mock server running on {}", listener.local_addr()?);

    mock_server::serve(listener, config).await?;

    info!("Mock server stopped");
    Ok(())
}
