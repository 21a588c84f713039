// src/api.rs
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Path, State},
    http::{Extensions, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::clock::{Clock, SystemClock};
use crate::config::SiteConfig;
use crate::contact::{mailer, ContactAck, ContactRequest, ContactService, Mailer, RateLimiter};
use crate::content::{ContentKind, ContentResolver, ResolvedPayload};
use crate::error::AppError;
use crate::writing::{self, PostSummary, WritingPost};

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<ContentResolver>,
    pub contact: Arc<ContactService>,
    pub writing_dir: PathBuf,
}

impl AppState {
    /// Wire everything from config: default source chain, in-memory limiter,
    /// mail provider picked from the environment.
    pub fn from_config(cfg: &SiteConfig) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let mailer = mailer::mailer_from_env(&cfg.contact)?;
        Self::with_parts(cfg, clock, mailer)
    }

    /// Same wiring with an explicit clock and mailer (tests, tools).
    pub fn with_parts(
        cfg: &SiteConfig,
        clock: Arc<dyn Clock>,
        mailer: Arc<dyn Mailer>,
    ) -> anyhow::Result<Self> {
        let resolver = ContentResolver::from_config(cfg, clock.clone())?;
        let limiter = RateLimiter::in_memory(cfg.contact.cooldown_secs as i64);
        Ok(Self {
            resolver: Arc::new(resolver),
            contact: Arc::new(ContactService::new(limiter, mailer, clock)),
            writing_dir: cfg.content.writing_dir.clone(),
        })
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/linkedin", get(get_activity))
        .route("/api/profile", get(get_profile))
        .route("/api/contact", post(post_contact))
        .route("/api/writing", get(list_writing))
        .route("/api/writing/{slug}", get(get_writing))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn get_activity(State(state): State<AppState>) -> Json<ResolvedPayload> {
    Json(state.resolver.resolve(ContentKind::Activity).await)
}

async fn get_profile(State(state): State<AppState>) -> Json<ResolvedPayload> {
    Json(state.resolver.resolve(ContentKind::Profile).await)
}

async fn post_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    extensions: Extensions,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<ContactAck>, AppError> {
    let Json(body) = payload?;
    // Present only when the server was started with connect info
    let peer = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let client = client_id(&headers, peer);
    state.contact.submit(body, &client).await.map(Json)
}

async fn list_writing(State(state): State<AppState>) -> Result<Json<Vec<PostSummary>>, AppError> {
    let posts = writing::load_posts(&state.writing_dir).await?;
    Ok(Json(posts.into_iter().map(|p| p.summary).collect()))
}

async fn get_writing(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<WritingPost>, AppError> {
    writing::find_post(&state.writing_dir, &slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("post '{slug}'")))
}

/// First `x-forwarded-for` hop, then `x-real-ip`, then the socket peer,
/// else "unknown".
pub fn client_id(headers: &HeaderMap, peer: Option<IpAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    match forwarded.or_else(real_ip) {
        Some(v) => v.to_string(),
        None => peer.map_or_else(|| "unknown".to_string(), |ip| ip.to_string()),
    }
}
