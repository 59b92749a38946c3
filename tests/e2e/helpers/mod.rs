use replylens_backend::infrastructure::config::{AiProvider, Config, Environment, LogFormat};
use replylens_backend::infrastructure::db::{apply_schema, create_pool, DbPool};
use replylens_backend::infrastructure::http::build_app;
use serde_json::{json, Value};
use std::sync::Arc;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;
use uuid::Uuid;

pub mod fixtures;

use api_client::TestClient;
use assistant::ScriptedAssistant;
use fixtures::TestFixtures;

pub const ADMIN_EMAIL: &str = "admin@replylens.com";
pub const TEST_PASSWORD: &str = "secret123";

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0, // Will be assigned by the OS
        jwt_secret: "test-jwt-secret-key-for-testing-only".to_string(),
        jwt_expiration_hours: 1,
        environment: Environment::Development,
        log_format: LogFormat::Pretty,
        ai_provider: AiProvider::Gemini,
        gemini_api_key: Some("test-key".to_string()),
        gemini_vision_model: "vision-model".to_string(),
        gemini_text_model: "text-model".to_string(),
        openai_api_key: None,
        openai_model: "gpt-4o".to_string(),
        admin_email: ADMIN_EMAIL.to_string(),
        pro_price: 49000,
        interstitial_seconds: 30,
        flow_idle_minutes: 60,
        max_image_bytes: 64 * 1024,
    }
}

pub struct TestContext {
    pub client: TestClient,
    pub pool: Arc<DbPool>,
    pub config: Config,
    pub fixtures: TestFixtures,
}

impl TestContext {
    pub async fn with_config(config: Config) -> Self {
        let pool = create_pool(&config.database_url)
            .await
            .expect("Failed to create database pool");
        apply_schema(&pool).await.expect("Failed to apply schema");
        let pool = Arc::new(pool);

        let app = build_app(
            Arc::new(config.clone()),
            pool.clone(),
            Arc::new(ScriptedAssistant),
        );

        // Start server
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = TestClient::new(&base_url);
        let fixtures = TestFixtures::new(pool.clone());

        Self {
            client,
            pool,
            config,
            fixtures,
        }
    }

    /// Context whose free-tier interstitial lasts `seconds`
    pub async fn with_interstitial(seconds: i64) -> Self {
        let mut config = test_config();
        config.interstitial_seconds = seconds;
        Self::with_config(config).await
    }

    /// Sign up through the API and return the session
    pub async fn sign_up(&self, email: &str) -> TestUser {
        let response = self
            .client
            .post(
                "/auth/signup",
                &json!({ "email": email, "password": TEST_PASSWORD }),
            )
            .await
            .unwrap();
        response.assert_status(hyper::StatusCode::CREATED);
        TestUser::from_auth_body(response.body.as_ref().unwrap())
    }

    /// Sign in a user created through fixtures
    pub async fn sign_in(&self, email: &str) -> TestUser {
        let response = self
            .client
            .post(
                "/auth/signin",
                &json!({ "email": email, "password": TEST_PASSWORD }),
            )
            .await
            .unwrap();
        response.assert_status(hyper::StatusCode::OK);
        TestUser::from_auth_body(response.body.as_ref().unwrap())
    }

    /// Create a flow and drive it to the configure step
    pub async fn configured_flow(&self) -> String {
        let flow = self.client.post_empty("/api/flows").await.unwrap();
        let id = flow.body.as_ref().unwrap()["id"].as_str().unwrap().to_string();

        self.client
            .post(
                &format!("/api/flows/{}/image", id),
                &json!({ "image": assistant::CHAT_SCREENSHOT }),
            )
            .await
            .unwrap()
            .assert_status(hyper::StatusCode::OK);
        self.client
            .post_empty(&format!("/api/flows/{}/advance", id))
            .await
            .unwrap()
            .assert_status(hyper::StatusCode::OK);

        id
    }
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async { TestContext::with_config(test_config()).await }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // The in-memory database goes away with the pool
        }
    }
}

// Signed-in user as seen by the tests
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

impl TestUser {
    fn from_auth_body(body: &Value) -> Self {
        Self {
            id: body["user"]["id"]
                .as_str()
                .and_then(|id| Uuid::parse_str(id).ok())
                .expect("Missing user id"),
            email: body["user"]["email"]
                .as_str()
                .expect("Missing user email")
                .to_string(),
            token: body["token"].as_str().expect("Missing token").to_string(),
        }
    }
}
