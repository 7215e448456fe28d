use tracing_subscriber::EnvFilter;
use wolfpack::{TrustedIdentity, WolfpackServerBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("WOLFPACK_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let server = WolfpackServerBuilder::new()
        .bind(&addr)
        .build(TrustedIdentity)
        .await?;
    server.run().await?;
    Ok(())
}
