use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sotd_core::pipeline::Orchestrator;

mod pages;

use pages::{Pages, GENERIC_FAILURE};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = sotd_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    if let Err(e) = settings.validate_required() {
        sentry_anyhow::capture_anyhow(&e);
        tracing::error!(error = %e, "missing required configuration; refusing to start");
        return Err(e);
    }

    let state = AppState {
        orchestrator: Arc::new(Orchestrator::from_settings(&settings)?),
        pages: Arc::new(Pages::load()?),
    };

    let app = Router::new()
        .route("/", get(index))
        .route("/stock", get(stock))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[derive(Clone)]
struct AppState {
    orchestrator: Arc<Orchestrator>,
    pages: Arc<Pages>,
}

async fn healthz() -> &'static str {
    "ok"
}

async fn index(State(state): State<AppState>) -> Response {
    match state.pages.index() {
        Ok(html) => Html(html).into_response(),
        Err(e) => render_failure(&state.pages, &e),
    }
}

async fn stock(State(state): State<AppState>) -> Response {
    let rec = match state.orchestrator.produce_recommendation().await {
        Ok(rec) => rec,
        Err(err) => {
            tracing::error!(stage = %err.stage, error = %err, "error generating stock recommendation");
            if let Some(diag) = err.llm_diagnostics() {
                tracing::error!(
                    provider = %diag.provider,
                    detail = %diag.detail,
                    raw_output = diag.raw_output.as_deref().unwrap_or(""),
                    "LLM provider response"
                );
            }
            sentry_anyhow::capture_anyhow(&anyhow::Error::new(err));
            return failure_page(&state.pages);
        }
    };

    match state.pages.stock(&rec) {
        Ok(html) => Html(html).into_response(),
        Err(e) => render_failure(&state.pages, &e),
    }
}

fn render_failure(pages: &Pages, err: &anyhow::Error) -> Response {
    sentry_anyhow::capture_anyhow(err);
    tracing::error!(error = %format!("{err:#}"), "page render failed");
    failure_page(pages)
}

fn failure_page(pages: &Pages) -> Response {
    let body = pages
        .error(GENERIC_FAILURE)
        .unwrap_or_else(|_| GENERIC_FAILURE.to_string());
    (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &sotd_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
