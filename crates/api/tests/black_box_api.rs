use std::sync::Arc;

use fintrack_api::app::services::AppServices;
use fintrack_auth::{Argon2Hasher, User};
use fintrack_core::UserId;
use fintrack_infra::{AppConfig, CredentialStore, InMemoryStore, StorageBackend, StoreError};
use fintrack_ledger::CategoryPolicy;
use reqwest::StatusCode;
use serde_json::{Value, json};

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(cheap_services(CategoryPolicy::Advisory)).await
    }

    async fn spawn_with(services: AppServices) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = fintrack_api::app::build_app(Arc::new(services));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self.client.post(self.url(path)).json(&body).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn delete(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.delete(self.url(path)).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn register(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.post(
            "/register",
            json!({
                "name": "Alice",
                "email": email,
                "password": password,
                "confirmPassword": password,
            }),
        )
        .await
    }

    /// Register and log in; returns the user id.
    async fn signup(&self, email: &str) -> String {
        let (status, _) = self.register(email, "secret1").await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, user) = self
            .post("/login", json!({ "email": email, "password": "secret1" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        user["id"].as_str().unwrap().to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn cheap_hasher() -> Arc<Argon2Hasher> {
    Arc::new(Argon2Hasher::new(1024, 1, 1).unwrap())
}

fn cheap_services(policy: CategoryPolicy) -> AppServices {
    AppServices::in_memory(cheap_hasher(), policy)
}

fn coffee(amount: Value, date: &str) -> Value {
    json!({
        "description": "Coffee",
        "amount": amount,
        "type": "expense",
        "category": "Food",
        "date": date,
    })
}

#[tokio::test]
async fn register_login_create_list_delete() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.register("alice@example.com", "secret1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "message": "Registration successful" }));

    let (status, user) = srv
        .post("/login", json!({ "email": "alice@example.com", "password": "secret1" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["name"], "Alice");
    assert_eq!(user["email"], "alice@example.com");
    assert!(user.get("createdAt").is_some());
    assert!(user.get("passwordHash").is_none());
    let user_id = user["id"].as_str().unwrap();

    let (status, created) = srv
        .post(&format!("/transactions/{user_id}"), coffee(json!(4.5), "2025-09-02"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["userId"], user_id);
    assert_eq!(created["amount"], 4.5);
    assert_eq!(created["type"], "expense");
    assert_eq!(created["date"], "2025-09-02");
    let tx_id = created["id"].as_str().unwrap();

    let (status, list) = srv.get(&format!("/transactions/{user_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0], created);

    let (status, body) = srv
        .delete(&format!("/transactions/{user_id}?id={tx_id}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Transaction deleted successfully" }));

    let (status, body) = srv
        .delete(&format!("/transactions/{user_id}?id={tx_id}"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Transaction not found" }));

    let (_, list) = srv.get(&format!("/transactions/{user_id}")).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn duplicate_email_is_rejected_after_normalization() {
    let srv = TestServer::spawn().await;
    srv.register("alice@example.com", "secret1").await;

    let (status, body) = srv.register("  ALICE@Example.com ", "secret1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Email already registered" }));

    let (status, _) = srv
        .post("/login", json!({ "email": "Alice@Example.COM", "password": "secret1" }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn registration_rules_report_distinct_messages() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv
        .post("/register", json!({ "name": "A", "email": "a@b.com", "password": "secret1" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "All fields are required");

    let (_, body) = srv.register("not-an-email", "secret1").await;
    assert_eq!(body["error"], "Valid email is required");

    let (_, body) = srv
        .post(
            "/register",
            json!({ "name": "A", "email": "a@b.com", "password": "secret1", "confirmPassword": "secret2" }),
        )
        .await;
    assert_eq!(body["error"], "Passwords do not match");

    let (_, body) = srv.register("a@b.com", "abc").await;
    assert_eq!(body["error"], "Password must be at least 6 characters long");
}

#[tokio::test]
async fn login_errors_do_not_reveal_which_part_failed() {
    let srv = TestServer::spawn().await;
    srv.register("alice@example.com", "secret1").await;

    let (s1, wrong_pw) = srv
        .post("/login", json!({ "email": "alice@example.com", "password": "wrong!!" }))
        .await;
    let (s2, unknown) = srv
        .post("/login", json!({ "email": "bob@example.com", "password": "secret1" }))
        .await;
    assert_eq!(s1, StatusCode::BAD_REQUEST);
    assert_eq!(s2, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_pw, unknown);
    assert_eq!(wrong_pw["error"], "Invalid email or password");

    let (status, body) = srv.post("/login", json!({ "email": "alice@example.com" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email and password are required");
}

#[tokio::test]
async fn transactions_are_listed_newest_first() {
    let srv = TestServer::spawn().await;
    let user_id = srv.signup("alice@example.com").await;
    let path = format!("/transactions/{user_id}");

    for date in ["2025-09-01", "2025-08-25", "2025-09-02", "2025-09-01"] {
        let (status, _) = srv.post(&path, coffee(json!("10"), date)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, list) = srv.get(&path).await;
    let dates: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, ["2025-09-02", "2025-09-01", "2025-09-01", "2025-08-25"]);
}

#[tokio::test]
async fn transaction_validation_messages() {
    let srv = TestServer::spawn().await;
    let user_id = srv.signup("alice@example.com").await;
    let path = format!("/transactions/{user_id}");

    let cases = [
        (coffee(json!(0), "2025-09-02"), "All fields are required"),
        (coffee(json!("abc"), "2025-09-02"), "Invalid amount"),
        (coffee(json!(-5), "2025-09-02"), "Amount must be positive"),
        (coffee(json!("0"), "2025-09-02"), "Amount must be positive"),
        (coffee(json!(5), "09/02/2025"), "Invalid date format. Use YYYY-MM-DD"),
        (
            json!({ "description": "x", "amount": 5, "type": "transfer", "category": "Food", "date": "2025-09-02" }),
            "Type must be 'income' or 'expense'",
        ),
        (
            json!({ "description": "   ", "amount": 5, "type": "expense", "category": "Food", "date": "2025-09-02" }),
            "All fields are required",
        ),
    ];
    for (body, expected) in cases {
        let (status, res) = srv.post(&path, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{expected}");
        assert_eq!(res["error"], expected);
    }

    let (_, list) = srv.get(&path).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn unknown_user_is_checked_before_the_body() {
    let srv = TestServer::spawn().await;
    let missing = "0191e0c4-7a1b-7c3d-8e4f-123456789abc";

    let (status, body) = srv.get(&format!("/transactions/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "User not found" }));

    let (status, body) = srv
        .post(&format!("/transactions/{missing}"), json!({ "amount": "abc" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (status, _) = srv.delete("/transactions/not-a-uuid?id=x").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_requires_an_id_and_is_owner_scoped() {
    let srv = TestServer::spawn().await;
    let alice = srv.signup("alice@example.com").await;
    let bob = srv.signup("bob@example.com").await;

    let (_, tx) = srv
        .post(&format!("/transactions/{alice}"), coffee(json!(3), "2025-09-02"))
        .await;
    let tx_id = tx["id"].as_str().unwrap();

    let (status, body) = srv.delete(&format!("/transactions/{alice}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Transaction ID is required");

    let (status, body) = srv.delete(&format!("/transactions/{alice}?id=")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Transaction ID is required");

    let (status, _) = srv.delete(&format!("/transactions/{bob}?id={tx_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = srv.get(&format!("/transactions/{alice}")).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    let (_, list) = srv.get(&format!("/transactions/{bob}")).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn undecodable_body_is_a_validation_error() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/register"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Invalid request body" }));
}

#[tokio::test]
async fn health_categories_and_fallback() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "status": "ok", "message": "Backend is running", "database": "connected" })
    );

    let (status, body) = srv.get("/categories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["income"].as_array().unwrap().len(), 5);
    assert_eq!(body["expense"].as_array().unwrap().len(), 8);

    let (status, body) = srv.get("/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Endpoint not found" }));
}

#[tokio::test]
async fn enforced_category_policy() {
    let srv = TestServer::spawn_with(cheap_services(CategoryPolicy::Enforced)).await;
    let user_id = srv.signup("alice@example.com").await;

    let (status, body) = srv
        .post(
            &format!("/transactions/{user_id}"),
            json!({ "description": "Bonus", "amount": 100, "type": "income", "category": "Food", "date": "2025-09-02" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid category for type 'income'");
}

#[tokio::test]
async fn sqlite_backend_serves_the_seeded_demo_account() {
    let config = AppConfig {
        storage: StorageBackend::Sqlite,
        database_url: "sqlite::memory:".to_string(),
        ..AppConfig::default()
    };
    let services = AppServices::from_config_with_hasher(&config, cheap_hasher())
        .await
        .unwrap();
    services.seed_demo().await.unwrap();
    let srv = TestServer::spawn_with(services).await;

    let (status, user) = srv
        .post("/login", json!({ "email": "demo@financetracker.com", "password": "demo123" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["name"], "Demo User");

    let (_, list) = srv
        .get(&format!("/transactions/{}", user["id"].as_str().unwrap()))
        .await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 8);
    assert_eq!(list[0]["date"], "2025-09-02");
    assert_eq!(list[7]["description"], "Netflix Subscription");
}

#[tokio::test]
async fn demo_credentials_flow_round_trips_every_field() {
    let srv = TestServer::spawn().await;

    let (status, _) = srv
        .post(
            "/register",
            json!({
                "name": "Demo User",
                "email": "demo@financetracker.com",
                "password": "demo123",
                "confirmPassword": "demo123",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, user) = srv
        .post("/login", json!({ "email": "demo@financetracker.com", "password": "demo123" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let user_id = user["id"].as_str().unwrap();
    let path = format!("/transactions/{user_id}");

    let (status, created) = srv.post(&path, coffee(json!("25.00"), "2025-09-02")).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, list) = srv.get(&path).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    let listed = &list[0];
    assert_eq!(listed["id"], created["id"]);
    assert_eq!(listed["userId"], user_id);
    assert_eq!(listed["description"], "Coffee");
    assert_eq!(listed["amount"], 25.0);
    assert_eq!(listed["type"], "expense");
    assert_eq!(listed["category"], "Food");
    assert_eq!(listed["date"], "2025-09-02");
    assert_eq!(listed["timestamp"], created["timestamp"]);
}

#[tokio::test]
async fn whitespace_password_is_accepted() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.register("spaces@example.com", "      ").await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, _) = srv
        .post("/login", json!({ "email": "spaces@example.com", "password": "      " }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn undecodable_path_and_query_use_the_error_envelope() {
    let srv = TestServer::spawn().await;
    let user_id = srv.signup("alice@example.com").await;

    let (status, body) = srv.get("/transactions/%FF").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "User not found" }));

    let (status, body) = srv
        .delete(&format!("/transactions/{user_id}?id=a&id=b"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid request" }));
}

/// Account store whose ping always fails.
struct UnreachableStore(InMemoryStore);

#[async_trait::async_trait]
impl CredentialStore for UnreachableStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        self.0.insert_user(user).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.0.find_by_email(email).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        self.0.find_by_id(id).await
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError> {
        self.0.delete_user(id).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Backend("database is locked".to_string()))
    }
}

#[tokio::test]
async fn health_reports_an_unreachable_database_with_200() {
    let services = AppServices::new(
        Arc::new(UnreachableStore(InMemoryStore::new())),
        InMemoryStore::arc(),
        cheap_hasher(),
        CategoryPolicy::Advisory,
    );
    let srv = TestServer::spawn_with(services).await;

    let (status, body) = srv.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "Backend running but database error");
    assert!(body["error"].as_str().unwrap().contains("database is locked"));
    assert!(body.get("database").is_none());
}
