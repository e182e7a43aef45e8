use std::sync::Arc;

use anyhow::Context;

use fintrack_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    fintrack_observability::init(config.log_format);

    let services = fintrack_api::app::services::AppServices::from_config(&config)
        .await
        .context("failed to initialize storage")?;

    if config.seed_demo {
        let outcome = services
            .seed_demo()
            .await
            .context("failed to seed demo account")?;
        tracing::info!(?outcome, "demo seeding finished");
    }

    let app = fintrack_api::app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        storage = ?config.storage,
        category_policy = ?config.category_policy,
        "listening"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
