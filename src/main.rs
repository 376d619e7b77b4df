use adult_education::{
    app::{build_app, serve},
    config::AppConfig,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "adult_education=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    if config.jwt.ttl_minutes.is_none() {
        tracing::warn!("JWT_TTL_MINUTES unset; issued tokens never expire");
    }

    let app_state = AppState::init(config).await?;
    serve(build_app(app_state)).await
}
