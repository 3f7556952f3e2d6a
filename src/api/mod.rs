use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::config::ScenarioFile;
use crate::core::{
    Comparison, EmergencyExpenses, RawField, RawScenarioParameters, ScenarioParameters,
    ScenarioProjection, format_amount, parse_expense_entry, project,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    name: Option<String>,
    #[serde(flatten)]
    params: RawScenarioParameters,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExpensePayload {
    year: RawField,
    amount: RawField,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExpenseResponse {
    year: u32,
    amount: f64,
    label: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router();

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "scenario comparison server listening");
    info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/api/defaults", get(defaults_handler))
        .route("/api/compare", post(compare_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route("/api/expenses/validate", post(validate_expense_handler))
        .fallback(not_found_handler)
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn defaults_handler() -> Response {
    json_response(StatusCode::OK, ScenarioFile::defaults())
}

async fn compare_handler(Json(payload): Json<ScenarioFile>) -> Response {
    compare_handler_impl(payload)
}

fn compare_handler_impl(payload: ScenarioFile) -> Response {
    info!(scenarios = payload.scenarios.len(), "compare request");
    match comparison_from_payload(payload) {
        Ok(comparison) => json_response(StatusCode::OK, comparison),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    let projection = projection_from_payload(payload);
    info!(
        scenario = %projection.name,
        years = projection.num_years,
        "project request"
    );
    json_response(StatusCode::OK, projection)
}

async fn validate_expense_handler(Json(payload): Json<ExpensePayload>) -> Response {
    validate_expense_impl(payload)
}

fn validate_expense_impl(payload: ExpensePayload) -> Response {
    info!("expense validation request");
    match expense_from_payload(payload) {
        Ok(expense) => json_response(StatusCode::OK, expense),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn comparison_from_payload(payload: ScenarioFile) -> Result<Comparison, String> {
    let set = payload.into_scenario_set().map_err(|e| {
        warn!(error = %e, "rejected scenario set");
        e.to_string()
    })?;
    debug!(scenarios = set.len(), "comparing scenarios");
    Ok(set.compare())
}

fn projection_from_payload(payload: ProjectPayload) -> ScenarioProjection {
    let params = ScenarioParameters::from(&payload.params);
    ScenarioProjection {
        name: payload.name.unwrap_or_else(|| "Scenario 1".to_string()),
        num_years: params.horizon(),
        results: project(&params, &EmergencyExpenses::new()),
    }
}

fn expense_from_payload(payload: ExpensePayload) -> Result<ExpenseResponse, String> {
    let raw_year = payload.year.as_text().unwrap_or_default();
    let raw_amount = payload.amount.as_text().unwrap_or_default();
    let (year, amount) = parse_expense_entry(&raw_year, &raw_amount).map_err(|e| {
        warn!(%raw_year, %raw_amount, error = %e, "rejected expense entry");
        e.to_string()
    })?;
    Ok(ExpenseResponse {
        year,
        amount,
        label: format_amount(amount),
    })
}
