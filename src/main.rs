//! Portfolio content service binary.
//! Boots the Axum HTTP server, wiring routes, shared state, and metrics.

use portfolio_content::{api, metrics::Metrics, AppState, SiteConfig};
use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    portfolio_content::init_tracing();

    let cfg = SiteConfig::load_default()?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        live = cfg.content.live_enabled,
        cache_ttl_secs = cfg.content.cache_ttl_secs,
        cooldown_secs = cfg.contact.cooldown_secs,
        "starting portfolio content service"
    );

    let state = AppState::from_config(&cfg)?;
    tracing::info!(sources = ?state.resolver.source_names(), "content chain ready");

    let mut router = api::create_router(state);
    match Metrics::init(cfg.content.cache_ttl_secs) {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => tracing::warn!(error = ?e, "metrics disabled"),
    }

    Ok(router.into())
}
