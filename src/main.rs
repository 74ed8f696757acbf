use std::sync::Arc;

use school_onboard::config::ServiceConfig;
use school_onboard::error::Result;
use school_onboard::onboarding::{
    HttpSubmissionBackend, LocalSubmissionBackend, OnboardingRouteState, SessionStore,
    SubmissionBackend, onboarding_routes,
};
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServiceConfig::from_env()?;

    eprintln!("🏫 School Onboard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://{}/api/onboarding", config.listen_addr());

    // ── Submission backend ──────────────────────────────────────────────
    let backend: Arc<dyn SubmissionBackend> = match config.submit_url {
        Some(ref url) => {
            eprintln!("   Submissions: {}", url);
            Arc::new(HttpSubmissionBackend::new(url.clone(), config.submit_timeout)?)
        }
        None => {
            eprintln!("   Submissions: local (ONBOARD_SUBMIT_URL not set)");
            Arc::new(LocalSubmissionBackend)
        }
    };

    // ── Server ──────────────────────────────────────────────────────────
    let state = OnboardingRouteState {
        sessions: SessionStore::new(),
        backend,
        dashboard_route: config.dashboard_route.clone(),
    };
    let app = onboarding_routes(state).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    tracing::info!(addr = %config.listen_addr(), "Onboarding server started");
    axum::serve(listener, app).await?;

    Ok(())
}
