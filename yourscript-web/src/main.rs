use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use yourscript::{Config, Error, ParseOptions, YourScript};

#[derive(Serialize, Deserialize)]
pub struct TranslateRequest {
    pub source: String,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translated: String,
    pub from: String,
    pub to: String,
}

#[derive(Serialize, Deserialize)]
pub struct SubsetsResponse {
    pub subsets: Vec<String>,
    pub from: String,
    pub to: String,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Clone)]
pub struct AppState {
    pub translator: Arc<YourScript>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config {
        lexems_folder: std::env::var_os("YOURSCRIPT_LEXEMS").map(PathBuf::from),
        ..Config::default()
    };
    let translator = YourScript::new(config)
        .map_err(|e| format!("Failed to load lexems: {}", e))?;
    info!(subsets = ?translator.lexems().subsets(), "Loaded lexems");

    let app = build_router(AppState {
        translator: Arc::new(translator),
    });

    let addr = std::env::var("YOURSCRIPT_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/translate", post(translate_source))
        .route("/api/subsets", get(list_subsets))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn list_subsets(State(state): State<AppState>) -> Json<SubsetsResponse> {
    let translator = &state.translator;
    Json(SubsetsResponse {
        subsets: translator
            .lexems()
            .subsets()
            .into_iter()
            .map(String::from)
            .collect(),
        from: translator.config().from.clone(),
        to: translator.config().to.clone(),
    })
}

async fn translate_source(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, (StatusCode, Json<ErrorResponse>)> {
    let options = ParseOptions {
        from: request.from,
        to: request.to,
    };
    let (from, to) = state.translator.resolve_subsets(&options);

    info!(from, to, bytes = request.source.len(), "Translating source");

    let translated = state
        .translator
        .translate_source(&request.source, from, to)
        .map_err(|e| {
            warn!(from, to, "Translation failed: {}", e);
            (
                error_status(&e),
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
        })?;

    Ok(Json(TranslateResponse {
        translated,
        from: from.to_string(),
        to: to.to_string(),
    }))
}

fn error_status(error: &Error) -> StatusCode {
    match error {
        Error::UnknownSubset { .. } => StatusCode::BAD_REQUEST,
        Error::UntranslatableKeyword { .. } | Error::Tokenize(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        let translator = YourScript::new(Config::default()).unwrap();
        build_router(AppState {
            translator: Arc::new(translator),
        })
    }

    async fn post_json(body: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/translate")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_translate_with_defaults() {
        let (status, body) = post_json(r#"{ "source": "if (x) { return 'if'; }" }"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["translated"], "whenever (x) { giveback 'if'; }");
        assert_eq!(body["from"], "javascript");
        assert_eq!(body["to"], "yourscript");
    }

    #[tokio::test]
    async fn test_translate_back() {
        let (status, body) = post_json(
            r#"{ "source": "whenever (x) giveback;", "from": "yourscript", "to": "javascript" }"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["translated"], "if (x) return;");
    }

    #[tokio::test]
    async fn test_response_reports_resolved_subsets() {
        let (status, body) = post_json(
            r#"{ "source": "while (x) /else/g.exec(y);", "from": "javascript", "to": "javascript" }"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["translated"], "while (x) /else/g.exec(y);");
        assert_eq!(body["from"], "javascript");
        assert_eq!(body["to"], "javascript");

        let (status, body) = post_json(r#"{ "source": "giveback;", "from": "yourscript" }"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["translated"], "giveback;");
        assert_eq!(body["from"], "yourscript");
        assert_eq!(body["to"], "yourscript");
    }

    #[tokio::test]
    async fn test_unknown_subset_is_bad_request() {
        let (status, body) = post_json(r#"{ "source": "if (x) {}", "to": "klingon" }"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unknown subset 'klingon'");
    }

    #[tokio::test]
    async fn test_unlexable_source_is_unprocessable() {
        let (status, body) = post_json(r#"{ "source": "if (x) { 'open" }"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("unterminated string"));
    }

    #[tokio::test]
    async fn test_list_subsets() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/subsets")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let body: SubsetsResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.subsets, vec!["javascript", "yourscript"]);
        assert_eq!(body.from, "javascript");
    }
}
