use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    eprintln!("🤰 Prenatal bot v{}", env!("CARGO_PKG_VERSION"));

    prenatal_bot::app::serve(
        |key| std::env::var(key).ok(),
        async {
            tokio::signal::ctrl_c().await.ok();
        },
    )
    .await
    .context("Prenatal bot failed")?;

    Ok(())
}
