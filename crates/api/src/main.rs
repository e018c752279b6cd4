use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fingenie_core::domain::market::Period;
use fingenie_core::domain::profile::InvestmentProfile;
use fingenie_core::domain::record::AnalysisRecord;
use fingenie_core::domain::ticker::ResolvedTicker;
use fingenie_core::pipeline::PipelineOptions;
use fingenie_core::portfolio::{Holding, PortfolioSummary};
use fingenie_core::services::Services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = fingenie_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let pool: Option<PgPool> = match settings.require_database_url() {
        Ok(db_url) => match fingenie_core::storage::connect(db_url).await {
            Ok(pool) => Some(pool),
            Err(e) => {
                sentry_anyhow::capture_anyhow(&e);
                tracing::error!(error = %e, "analysis history unavailable; starting API without it");
                None
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "analysis history disabled");
            None
        }
    };

    let services = Services::from_settings(&settings)?;
    let state = AppState { pool, services };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/resolve", get(resolve))
        .route("/analyze", post(analyze))
        .route("/portfolio/summary", post(portfolio_summary))
        .route("/analyses/:ticker/latest", get(get_latest_analysis))
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

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    pool: Option<PgPool>,
    services: Services,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(ErrorBody { error: self.1 })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct ResolveQuery {
    q: String,
}

async fn resolve(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<ResolvedTicker>, ApiError> {
    let resolved = state
        .services
        .resolver()
        .resolve(&query.q)
        .await
        .map_err(|e| ApiError(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    Ok(Json(resolved))
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    query: String,
    #[serde(default)]
    period: Option<String>,
    #[serde(default)]
    profile: Option<String>,
}

async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisRecord>, ApiError> {
    let period = match req.period.as_deref() {
        Some(p) => p
            .parse::<Period>()
            .map_err(|e| ApiError(StatusCode::BAD_REQUEST, e.to_string()))?,
        None => Period::default(),
    };
    let profile = req
        .profile
        .as_deref()
        .map(InvestmentProfile::parse_lenient)
        .unwrap_or_default();

    let ticker = state
        .services
        .resolver()
        .resolve(&req.query)
        .await
        .map_err(|e| ApiError(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    let record = state
        .services
        .pipeline()
        .run(ticker, &PipelineOptions::full(period, profile))
        .await;

    if let Some(pool) = &state.pool {
        let provider = state.services.intelligence.provider().as_str();
        if let Err(e) = fingenie_core::storage::analyses::persist_record(pool, &record, provider).await {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "failed to persist analysis");
        }
    }

    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
struct PortfolioRequest {
    holdings: Vec<Holding>,
}

async fn portfolio_summary(
    State(state): State<AppState>,
    Json(req): Json<PortfolioRequest>,
) -> Json<PortfolioSummary> {
    Json(state.services.portfolio().aggregate(&req.holdings).await)
}

async fn get_latest_analysis(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<AnalysisRecord>, StatusCode> {
    let Some(pool) = &state.pool else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let ticker = ticker.trim().to_ascii_uppercase();
    let record = fingenie_core::storage::analyses::fetch_latest(pool, &ticker)
        .await
        .map_err(|e| {
            sentry_anyhow::capture_anyhow(&e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(record))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &fingenie_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
