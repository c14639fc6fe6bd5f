//! Wiring: builds the router from configuration and a database, and runs
//! the HTTP server.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::Result;
use crate::faq::FaqService;
use crate::intake::IntakeManager;
use crate::llm::create_summarizer;
use crate::store::{Database, LibSqlBackend};
use crate::webhook::{AppState, app_routes};

/// Build the HTTP application: summariser (if configured), knowledge-base
/// seed, intake manager and routes.
pub async fn build_app(config: &AppConfig, db: Arc<dyn Database>) -> Result<Router> {
    let summarizer = config.llm.as_ref().map(create_summarizer).transpose()?;

    let faq = Arc::new(FaqService::new(Arc::clone(&db), summarizer));
    match faq.seed_knowledge_base().await {
        Ok(0) => {}
        Ok(n) => info!(entries = n, "Knowledge base initialised"),
        Err(e) => warn!(error = %e, "Knowledge base seed failed; search disabled"),
    }

    let intake = Arc::new(IntakeManager::new(Arc::clone(&db), faq));
    Ok(app_routes(AppState {
        intake,
        db,
        debug_messages: config.debug_messages,
    }))
}

/// Load configuration through `lookup`, open the database and serve until
/// `shutdown` resolves.
pub async fn serve<F, S>(lookup: F, shutdown: S) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    S: Future<Output = ()> + Send + 'static,
{
    let config = AppConfig::from_lookup(lookup)?;
    info!(
        db = %config.db_path.display(),
        summaries = config.llm.as_ref().map(|l| l.backend.as_str()).unwrap_or("off"),
        "Starting prenatal bot"
    );

    let db: Arc<dyn Database> = Arc::new(LibSqlBackend::new_local(&config.db_path).await?);
    let app = build_app(&config, db).await?;

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(addr = %listener.local_addr()?, "HTTP server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, Error};

    fn lookup_from(pairs: Vec<(&'static str, String)>) -> impl Fn(&str) -> Option<String> {
        move |key| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.clone())
    }

    #[tokio::test]
    async fn serve_rejects_bad_port() {
        let err = serve(lookup_from(vec![("PORT", "abc".into())]), async {})
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidValue { ref key, .. }) if key == "PORT"));
    }

    #[tokio::test]
    async fn serve_reports_unopenable_database() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("plain-file");
        std::fs::write(&file, b"x").unwrap();
        let db_path = file.join("prenatal.db");

        let err = serve(
            lookup_from(vec![
                ("DB_PATH", db_path.display().to_string()),
                ("PORT", "0".into()),
            ]),
            async {},
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Database(_)));
    }

    #[tokio::test]
    async fn serve_stops_on_shutdown() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("prenatal.db");
        serve(
            lookup_from(vec![
                ("DB_PATH", db_path.display().to_string()),
                ("PORT", "0".into()),
            ]),
            async {},
        )
        .await
        .unwrap();
        assert!(db_path.exists());
    }
}
