use axum::{
    extract::{Path, Query, State},
    http::{Method, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Redirect, Response},
    routing::get,
    Router,
};
use hyper::Server;
use serde::Deserialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

use crate::auth::SessionGate;
use crate::config::ServerConfig;
use crate::dashboard::{DashboardBuilder, DashboardData};
use crate::types::{DetailRow, Region};

/// Shared, immutable state: the pipeline runs once before the server starts
pub struct AppState {
    pub data: DashboardData,
    pub dashboard: Value,
    pub gate: Box<dyn SessionGate>,
    pub login_url: String,
    pub logout_url: String,
}

impl AppState {
    pub fn new(data: DashboardData, gate: Box<dyn SessionGate>, config: &ServerConfig) -> Self {
        let dashboard = DashboardBuilder::new(&data).build();
        Self {
            data,
            dashboard,
            gate,
            login_url: config.login_url.clone(),
            logout_url: config.logout_url.clone(),
        }
    }
}

type SharedState = Arc<AppState>;

struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
struct DetailsFilter {
    region: Option<String>,
}

fn parse_region(raw: &str) -> Result<Region, ApiError> {
    raw.parse::<Region>().map_err(|e| ApiError {
        status: StatusCode::NOT_FOUND,
        message: e.to_string(),
    })
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "lumina-bi",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn summary(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.data.output.summary.clone())
}

async fn details(
    State(state): State<SharedState>,
    Query(filter): Query<DetailsFilter>,
) -> Result<Json<Vec<DetailRow>>, ApiError> {
    let rows = match filter.region.as_deref() {
        // Keeps the national detail ordering, unlike /api/regions/:region
        Some(raw) => {
            let region = parse_region(raw)?;
            state
                .data
                .output
                .details
                .iter()
                .filter(|row| row.region == region)
                .cloned()
                .collect()
        }
        None => state.data.output.details.clone(),
    };
    Ok(Json(rows))
}

async fn choropleth(State(state): State<SharedState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "settings": state.data.map,
        "data": state.data.output.choropleth,
    }))
}

async fn region(
    State(state): State<SharedState>,
    Path(raw): Path<String>,
) -> Result<Json<Vec<DetailRow>>, ApiError> {
    let region = parse_region(&raw)?;
    Ok(Json(state.data.output.region_details(region)))
}

async fn diagnostics(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.data.output.diagnostics.clone())
}

async fn dashboard(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.dashboard.clone())
}

async fn logout(State(state): State<SharedState>) -> impl IntoResponse {
    Redirect::to(&state.logout_url)
}

/// Redirect to the identity collaborator's login when there is no session
async fn require_session<B>(
    State(state): State<SharedState>,
    request: Request<B>,
    next: Next<B>,
) -> Response {
    if state.gate.is_authenticated(request.headers()) {
        next.run(request).await
    } else {
        debug!(path = %request.uri().path(), "No session, redirecting to login");
        Redirect::to(&state.login_url).into_response()
    }
}

/// Create the HTTP router with all routes
pub fn create_server(state: AppState) -> Router {
    let state: SharedState = Arc::new(state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    let api = Router::new()
        .route("/summary", get(summary))
        .route("/details", get(details))
        .route("/choropleth", get(choropleth))
        .route("/regions/:region", get(region))
        .route("/diagnostics", get(diagnostics))
        .route("/dashboard", get(dashboard))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/health", get(health))
        .route("/logout", get(logout))
        .nest("/api", api)
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
}

/// Start the HTTP server on the configured host and port
pub async fn start_server(state: AppState, config: &ServerConfig) -> anyhow::Result<()> {
    let app = create_server(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("HTTP server running on http://{}", addr);
    info!("Health check: http://{}/health", addr);
    info!("Dashboard document: http://{}/api/dashboard", addr);

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{CookieSessionGate, OpenGate};
    use crate::config::MapConfig;
    use crate::pipeline::processing::choropleth::MapSettings;
    use crate::pipeline::processing::StateLookup;
    use crate::pipeline::GeoPipeline;
    use crate::types::StateRecord;
    use axum::body::Body;
    use axum::http::header;
    use tower::ServiceExt;

    fn state(gate: Box<dyn SessionGate>) -> AppState {
        let records: Vec<StateRecord> = [
            ("São Paulo", 44_000_000.0),
            ("Rio de Janeiro", 17_000_000.0),
            ("Acre", 900_000.0),
            ("Atlantis", 1.0),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (name, population))| StateRecord {
            state_name: name.to_string(),
            population,
            source_row: i + 1,
        })
        .collect();

        let data = DashboardData {
            output: GeoPipeline::new(StateLookup::brazil()).run(&records),
            map: MapSettings::from_config(&MapConfig::default()),
            demographics: None,
        };
        AppState::new(data, gate, &ServerConfig::default())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json(create_server(state(Box::new(OpenGate))), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_summary_and_details() {
        let app = create_server(state(Box::new(OpenGate)));

        let (status, summary) = get_json(app.clone(), "/api/summary").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary[0]["region"], "Southeast");
        assert_eq!(summary[0]["state_count"], 2);

        let (_, details) = get_json(app.clone(), "/api/details?region=southeast").await;
        let names: Vec<_> = details
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["state_name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["São Paulo", "Rio de Janeiro"]);

        let (_, diagnostics) = get_json(app, "/api/diagnostics").await;
        assert_eq!(diagnostics[0]["state_name"], "Atlantis");
        assert_eq!(diagnostics[0]["kind"], "unknown_state");
    }

    #[tokio::test]
    async fn test_unknown_region_is_not_found() {
        let app = create_server(state(Box::new(OpenGate)));
        let (status, body) = get_json(app, "/api/regions/atlantis").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("atlantis"));
    }

    #[tokio::test]
    async fn test_missing_session_redirects_to_login() {
        let app = create_server(state(Box::new(CookieSessionGate::new("session"))));

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/api/summary").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            ServerConfig::default().login_url.as_str()
        );

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/summary")
                    .header(header::COOKIE, "session=abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_is_not_gated() {
        let app = create_server(state(Box::new(CookieSessionGate::new("session"))));
        let (status, _) = get_json(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
    }
}
