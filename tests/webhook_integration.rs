//! Integration tests for the webhook HTTP surface.
//!
//! Each test spins up the full router on a random port backed by an on-disk
//! database in a temp dir, and drives it with form-encoded provider callbacks.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::time::timeout;

use prenatal_bot::app::build_app;
use prenatal_bot::config::AppConfig;
use prenatal_bot::store::{Database, LibSqlBackend};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(10);

const SENDER: &str = "whatsapp:+5511988887777";

struct TestServer {
    base: String,
    client: reqwest::Client,
    db: Arc<dyn Database>,
    _dir: tempfile::TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            db_path: dir.path().join("prenatal.db"),
            debug_messages: false,
            ..AppConfig::default()
        };
        let db: Arc<dyn Database> =
            Arc::new(LibSqlBackend::new_local(&config.db_path).await.unwrap());
        let app = build_app(&config, Arc::clone(&db)).await.unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start accepting connections.
        tokio::time::sleep(Duration::from_millis(50)).await;

        Self {
            base: format!("http://127.0.0.1:{port}"),
            client: reqwest::Client::new(),
            db,
            _dir: dir,
        }
    }

    /// Send a message as the provider would and return the TwiML body.
    async fn say(&self, body: &str) -> String {
        let resp = self
            .client
            .post(format!("{}/whatsapp", self.base))
            .form(&[("From", SENDER), ("Body", body), ("NumMedia", "0")])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "application/xml");
        resp.text().await.unwrap()
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.base))
            .send()
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn test_full_questionnaire_then_export() {
    timeout(TEST_TIMEOUT, async {
        let server = TestServer::start().await;

        assert!(server.say("Olá").await.contains("*ACEITO*"));
        assert!(server.say("ACEITO").await.contains("Consentimento registrado"));
        assert!(server.say("M.S.").await.contains("2) Qual sua *idade*"));
        assert!(server.say("36").await.contains("3) Informe a *data"));
        assert!(server.say("30").await.contains("4) Você apresenta"));
        assert!(server.say("7").await.contains("5) Possui alguma"));
        assert!(server.say("2").await.contains("6) Quantas"));
        assert!(server.say("5").await.contains("7) Você consegue"));
        assert!(server.say("14/9").await.contains("8) Informe seu *peso"));
        assert!(server.say("82,5").await.contains("9) Informe sua *altura"));
        assert!(server.say("1.62").await.contains("10) Você usa"));

        let result = server.say("2").await;
        assert!(result.contains("*Classificação:* PRIORITÁRIO"));
        assert!(result.contains("Faixa etária"));
        assert!(result.contains("Comorbidade"));
        assert!(result.contains("material educativo"));

        let pack = server.say("1").await;
        assert!(pack.contains("*Prioridade:* avaliação em breve"));
        assert!(pack.contains("Diabetes/risco"));

        let resp = server.get("/export.csv").await;
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()["content-disposition"],
            "attachment; filename=prenatal_export.csv"
        );
        let csv = resp.text().await.unwrap();
        let lines: Vec<&str> = csv.trim_start_matches('\u{feff}').lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("id;phone;risk_level;ga_weeks"));
        let row: Vec<&str> = lines[1].split(';').collect();
        assert_eq!(row[1], "+5511988887777");
        assert_eq!(row[2], "PRIORITÁRIO");
        assert_eq!(row[3], "30");
        assert_eq!(row[5], "M.S.");
        assert_eq!(row[7], "7");
        assert_eq!(row[8], "2");
        assert_eq!(&row[10..], ["140", "90", "82.5", "1.62", "31.4", "nao"]);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn test_opt_out_erases_stored_response() {
    timeout(TEST_TIMEOUT, async {
        let server = TestServer::start().await;
        server.say("oi").await;
        server.say("ACEITO").await;
        for answer in ["A.B.", "25", "20", "7", "4", "1", "PULAR", "PULAR", "PULAR", "2"] {
            server.say(answer).await;
        }
        assert_eq!(server.db.list_responses().await.unwrap().len(), 1);

        let reply = server.say("APAGAR").await;
        assert!(reply.contains("Seus dados foram apagados"));
        assert!(server.db.list_responses().await.unwrap().is_empty());

        let csv = server.get("/export.csv?sep=tab").await.text().await.unwrap();
        assert_eq!(csv.trim_start_matches('\u{feff}').lines().count(), 1);
        assert!(csv.contains("id\tphone\t"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn test_health_index_and_not_found() {
    timeout(TEST_TIMEOUT, async {
        let server = TestServer::start().await;

        let health: serde_json::Value = server.get("/health").await.json().await.unwrap();
        assert_eq!(health["ok"], true);
        assert!(health["time"].as_str().is_some());

        let index = server.get("/").await.text().await.unwrap();
        assert!(index.contains("/export.csv"));

        let missing = server.get("/does-not-exist").await;
        assert_eq!(missing.status(), 404);
        assert!(missing.text().await.unwrap().contains("404"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn test_webhook_test_endpoint() {
    timeout(TEST_TIMEOUT, async {
        let server = TestServer::start().await;
        let resp = server
            .client
            .post(format!("{}/whatsapp-test", server.base))
            .form(&[("From", SENDER), ("Body", "qualquer coisa")])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let xml = resp.text().await.unwrap();
        assert!(xml.contains("<Response><Message>✅ Webhook OK."));
        // Test endpoint never touches the session table
        assert!(server.db.get_session("+5511988887777").await.unwrap().is_none());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn test_faq_mid_questionnaire() {
    timeout(TEST_TIMEOUT, async {
        let server = TestServer::start().await;
        server.say("oi").await;
        server.say("ACEITO").await;

        let reply = server.say("? pressão alta").await;
        assert!(reply.contains("*Pressão na gravidez*"));
        assert!(reply.contains("*CONTINUAR*"));

        assert!(server.say("CONTINUAR").await.contains("1) Para preservar"));
        let menu = server.say("MENU").await;
        assert!(menu.contains("? primeira consulta"));
    })
    .await
    .expect("test timed out");
}
