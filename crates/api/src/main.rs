use std::sync::Arc;

use anyhow::Context;

use quillgate_infra::{ensure_bootstrap_admin, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    quillgate_observability::init(config.log_format);
    tracing::info!(?config, "starting");

    let services = Arc::new(quillgate_api::app::build_services(&config).await?);

    if let Some(admin) = &config.bootstrap_admin {
        ensure_bootstrap_admin(services.users.as_ref(), admin)
            .await
            .context("failed to seed bootstrap admin")?;
    }

    let app = quillgate_api::app::build_app(&config, services).context("invalid signing secret")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
