//! HTTP endpoints: the messaging webhook, health, and CSV export.

use std::sync::Arc;

use axum::extract::{Form, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::export;
use crate::intake::IntakeManager;
use crate::intake::prompts::TEST_WEBHOOK_OK;
use crate::store::Database;

use super::twiml;

const INDEX_TEXT: &str =
    "Chatbot Pré-Natal: /health, /whatsapp (POST), /whatsapp-test (POST), /export.csv";

const NOT_FOUND_HTML: &str = "<!doctype html>\n<html lang=\"pt-BR\">\
<head><meta charset=\"utf-8\"><title>404 - Página não encontrada</title></head>\
<body><h1>404</h1><p>Página não encontrada.</p>\
<p>Endpoints: <code>/health</code>, <code>/whatsapp</code>, <code>/export.csv</code></p>\
</body></html>";

/// Shared state for the webhook routes.
#[derive(Clone)]
pub struct AppState {
    pub intake: Arc<IntakeManager>,
    pub db: Arc<dyn Database>,
    /// Log inbound bodies at info instead of debug.
    pub debug_messages: bool,
}

/// Provider callback fields we use; everything else is ignored.
#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
}

impl InboundMessage {
    /// Sender phone without the channel prefix.
    pub fn phone(&self) -> &str {
        let from = self.from.trim();
        from.strip_prefix("whatsapp:").unwrap_or(from)
    }
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub sep: Option<String>,
}

fn log_inbound(state: &AppState, route: &'static str, msg: &InboundMessage) {
    if state.debug_messages {
        info!(route, from = msg.phone(), body = %msg.body, "Inbound message");
    } else {
        debug!(route, from = msg.phone(), body = %msg.body, "Inbound message");
    }
}

/// GET /
async fn index() -> &'static str {
    INDEX_TEXT
}

/// GET /health
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "ok": true,
        "time": chrono::Utc::now().to_rfc3339(),
    }))
}

/// POST /whatsapp
///
/// Runs the intake conversation and replies with TwiML.
async fn whatsapp(State(state): State<AppState>, Form(msg): Form<InboundMessage>) -> Response {
    log_inbound(&state, "whatsapp", &msg);
    let reply = state.intake.handle_message(msg.phone(), &msg.body).await;
    twiml::message(&reply)
}

/// POST /whatsapp-test
///
/// Always answers with a fixed message; for checking provider wiring.
async fn whatsapp_test(State(state): State<AppState>, Form(msg): Form<InboundMessage>) -> Response {
    log_inbound(&state, "whatsapp-test", &msg);
    twiml::message(TEST_WEBHOOK_OK)
}

/// GET /export.csv?sep=
async fn export_csv(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> Response {
    let delim = export::delimiter(params.sep.as_deref());
    let records = match state.db.list_responses().await {
        Ok(records) => records,
        Err(e) => {
            error!(error = %e, "Export failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Falha ao exportar os dados.")
                .into_response();
        }
    };
    info!(rows = records.len(), "CSV export");

    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", export::EXPORT_FILENAME),
            ),
        ],
        export::render_csv(&records, delim),
    )
        .into_response()
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(NOT_FOUND_HTML))
}

/// Build the application router.
pub fn app_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/whatsapp", post(whatsapp))
        .route("/whatsapp-test", post(whatsapp_test))
        .route("/export.csv", get(export_csv))
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faq::FaqService;
    use crate::store::LibSqlBackend;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn router() -> Router {
        let db: Arc<dyn Database> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let faq = Arc::new(FaqService::new(Arc::clone(&db), None));
        let intake = Arc::new(IntakeManager::new(Arc::clone(&db), faq));
        app_routes(AppState {
            intake,
            db,
            debug_messages: false,
        })
    }

    fn form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(resp: Response) -> String {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn phone_strips_channel_prefix() {
        let msg = InboundMessage {
            from: "whatsapp:+5511999990000".into(),
            body: String::new(),
        };
        assert_eq!(msg.phone(), "+5511999990000");
        let plain = InboundMessage {
            from: "+5511".into(),
            body: String::new(),
        };
        assert_eq!(plain.phone(), "+5511");
    }

    #[tokio::test]
    async fn webhook_replies_with_twiml() {
        let app = router().await;
        let resp = app
            .oneshot(form(
                "/whatsapp",
                "From=whatsapp%3A%2B5511999990000&Body=oi&MessageSid=SM1",
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/xml");
        let xml = body_text(resp).await;
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("Sou o assistente *Pré-Natal*"));
    }

    #[tokio::test]
    async fn webhook_rejects_missing_sender() {
        let app = router().await;
        let resp = app.oneshot(form("/whatsapp", "Body=oi")).await.unwrap();
        assert!(resp.status().is_client_error());
    }

    #[tokio::test]
    async fn test_webhook_always_ok() {
        let app = router().await;
        let resp = app
            .oneshot(form("/whatsapp-test", "From=whatsapp%3A%2B551&Body=qualquer"))
            .await
            .unwrap();
        let xml = body_text(resp).await;
        assert!(xml.contains("Webhook OK"));
    }

    #[tokio::test]
    async fn unknown_route_is_html_404() {
        let app = router().await;
        let resp = app
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(resp.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
    }

    #[tokio::test]
    async fn export_headers() {
        let app = router().await;
        let resp = app
            .oneshot(Request::get("/export.csv?sep=tab").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=prenatal_export.csv"
        );
        let csv = body_text(resp).await;
        assert!(csv.starts_with("\u{feff}id\tphone\trisk_level"));
    }
}
