use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

use api_shared::{
    HealthRes, HealthService, ListTemplatesRes, TemplateRes, TemplateService, TemplateSummary,
    ValidateReq, ValidateRes,
};
use intake_core::IntakeConfig;
use intake_core::constants::{DEFAULT_SPECIALTY_ENV, REST_ADDR_ENV, TEMPLATE_DIR_ENV};
use intake_templates::TemplateLibrary;

/// Application state shared across REST API handlers
#[derive(Clone)]
struct AppState {
    templates: TemplateService,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, list_templates, get_template, validate_responses),
    components(schemas(
        HealthRes,
        ListTemplatesRes,
        TemplateSummary,
        TemplateRes,
        ValidateReq,
        ValidateRes
    ))
)]
struct ApiDoc;

/// Main entry point for the intake forms service
///
/// Loads the template catalogue once and serves it read-only over REST.
///
/// # Environment Variables
/// - `INTAKE_TEMPLATE_DIR`: extra YAML templates to load on top of the built-in ones
/// - `INTAKE_DEFAULT_SPECIALTY`: specialty whose template is offered by default (default: "general")
/// - `INTAKE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
///
/// # Errors
/// Returns an error if the configuration or any template is invalid, or if the server address
/// cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("intake=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = IntakeConfig::from_env_values(
        std::env::var(TEMPLATE_DIR_ENV).ok(),
        std::env::var(DEFAULT_SPECIALTY_ENV).ok(),
        std::env::var(REST_ADDR_ENV).ok(),
    )?;

    let library = TemplateLibrary::load(&cfg)?;
    tracing::info!(templates = library.len(), "loaded form template catalogue");

    let default_key = library
        .for_specialty(cfg.default_specialty())
        .next()
        .map(|entry| entry.key.clone())
        .unwrap_or_else(|| cfg.default_specialty().to_owned());

    let state = AppState {
        templates: TemplateService::new(Arc::new(library), default_key),
    };

    tracing::info!("++ Starting intake REST on {}", cfg.rest_addr());

    let listener = tokio::net::TcpListener::bind(cfg.rest_addr()).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/templates", get(list_templates))
        .route("/templates/:key", get(get_template))
        .route("/templates/:key/validate", post(validate_responses))
        .route("/api-docs/openapi.json", get(openapi))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/templates",
    responses(
        (status = 200, description = "Available form templates", body = ListTemplatesRes)
    )
)]
/// List every template in the catalogue, ordered by key
async fn list_templates(State(state): State<AppState>) -> Json<ListTemplatesRes> {
    Json(state.templates.list())
}

#[utoipa::path(
    get,
    path = "/templates/{key}",
    params(("key" = String, Path, description = "Template key")),
    responses(
        (status = 200, description = "Template schema", body = TemplateRes),
        (status = 404, description = "Unknown template")
    )
)]
/// Fetch one template's full schema
async fn get_template(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<TemplateRes>, (StatusCode, &'static str)> {
    state
        .templates
        .get(&key)
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Unknown template"))
}

#[utoipa::path(
    post,
    path = "/templates/{key}/validate",
    params(("key" = String, Path, description = "Template key")),
    request_body = ValidateReq,
    responses(
        (status = 200, description = "Validation result", body = ValidateRes),
        (status = 404, description = "Unknown template")
    )
)]
/// Validate a set of answers against a template without storing them
///
/// Hidden conditional fields are skipped exactly as they are in a form session.
async fn validate_responses(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<ValidateReq>,
) -> Result<Json<ValidateRes>, (StatusCode, &'static str)> {
    let res = state
        .templates
        .validate(&key, &req.responses)
        .ok_or((StatusCode::NOT_FOUND, "Unknown template"))?;
    tracing::debug!(key = %key, valid = res.valid, "validated responses");
    Ok(Json(res))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let library = TemplateLibrary::builtin().expect("builtin templates");
        app(AppState {
            templates: TemplateService::new(Arc::new(library), "general"),
        })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["ok"], true);
    }

    #[tokio::test]
    async fn lists_and_fetches_templates() {
        let response = test_app()
            .oneshot(Request::get("/templates").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let json = body_json(response).await;
        assert_eq!(json["templates"].as_array().map(Vec::len), Some(3));

        let response = test_app()
            .oneshot(
                Request::get("/templates/psychology")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["schema"]["title"], "Psychology Intake");

        let response = test_app()
            .oneshot(
                Request::get("/templates/unknown")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn validate_returns_field_errors() {
        let request = Request::post("/templates/nutrition/validate")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"responses": {"weight_kg": 12}}"#))
            .expect("request");
        let response = test_app().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["valid"], false);
        assert!(
            json["errors"]["weight_kg"]
                .as_str()
                .is_some_and(|msg| msg.contains("must be at least 20"))
        );
    }
}
