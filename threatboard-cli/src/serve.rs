use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use threatboard::config::DevServerConfig;
use tokio::signal;

mod handlers;

pub struct ServeState {
    pub config: DevServerConfig,
    pub dist: PathBuf,
    pub http: reqwest::Client,
}

impl ServeState {
    pub fn new(config: DevServerConfig, dist: PathBuf) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.proxy.secure)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(ServeState { config, dist, http })
    }
}

pub fn router(state: Arc<ServeState>) -> Router {
    Router::new()
        .fallback(handlers::dispatch)
        .with_state(state)
}

pub async fn serve(config: DevServerConfig, dist: PathBuf) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    log::info!(
        "Serving {} on http://{}, proxying {} to {}",
        dist.display(),
        addr,
        config.proxy.prefix,
        config.proxy.target
    );
    if !dist.join("index.html").is_file() {
        log::warn!(
            "{} has no index.html; run `trunk build` in threatboard-web first",
            dist.display()
        );
    }
    let state = Arc::new(ServeState::new(config, dist)?);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
        })
        .await?;
    Ok(())
}
