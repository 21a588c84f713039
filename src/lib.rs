// src/lib.rs
// Public library surface for the server binary, tools and integration tests.

pub mod api;
pub mod clock;
pub mod config;
pub mod contact;
pub mod content;
pub mod error;
pub mod metrics;
pub mod writing;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::config::SiteConfig;
pub use crate::content::{ContentKind, ContentResolver, ResolvedPayload};
pub use crate::error::AppError;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Structured logging. `LOG_FORMAT=json` switches to JSON lines.
/// Safe to call more than once (later calls are no-ops).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("portfolio_content=info,contact=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}
