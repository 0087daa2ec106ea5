use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use fintrack_api::app::services::AppServices;
use fintrack_api::config::Config;
use fintrack_api::google::{IdentityVerifier, VerifyError};
use fintrack_auth::ExternalProfile;
use fintrack_store::{InMemoryAccountStore, InMemoryLedgerStore};

const JWT_SECRET: &str = "test-secret";

/// Stand-in for the Google tokeninfo endpoint: trusts the token's own
/// claims, as long as they carry a name.
struct StaticVerifier;

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, assertion: &str) -> Result<ExternalProfile, VerifyError> {
        let claims = fintrack_auth::decode_external(assertion)
            .map_err(|e| VerifyError::Rejected(e.to_string()))?;
        let name = claims
            .name
            .ok_or_else(|| VerifyError::Rejected("no name claim".into()))?;
        Ok(ExternalProfile {
            subject: claims.sub.unwrap_or_default(),
            name,
            email: claims.email,
            picture: claims.picture,
        })
    }
}

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
    // Dropped (and deleted) with the server.
    upload_dir: tempfile::TempDir,
}

impl TestServer {
    async fn spawn() -> Self {
        let upload_dir = tempfile::tempdir().expect("failed to create upload dir");

        // Same router as prod, but with in-memory stores, a stub identity
        // verifier, and an ephemeral port.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr: SocketAddr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let config = Config {
            listen: addr,
            jwt_secret: JWT_SECRET.to_string(),
            google_client_id: None,
            frontend_origin: "http://localhost:3000".to_string(),
            public_base_url: base_url.clone(),
            upload_dir: upload_dir.path().to_path_buf(),
            use_persistent_stores: false,
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_db: "fintrack-test".to_string(),
            log_level: "warn".to_string(),
        };

        let services = Arc::new(AppServices::new(
            Arc::new(InMemoryAccountStore::new()),
            Arc::new(InMemoryLedgerStore::new()),
            Arc::new(StaticVerifier),
            config,
        ));
        let app = fintrack_api::app::build_app(services);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            handle,
            upload_dir,
        }
    }

    fn api(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn cookie_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("failed to build client")
}

/// Session token for an arbitrary username, signed with the server's secret.
fn mint_session_token(username: &str) -> String {
    let claims = json!({ "username": username, "iat": chrono::Utc::now().timestamp() });
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

/// Google-style ID token; signed with an unrelated secret, which is fine
/// because the `googletoken` cookie path does not verify signatures.
fn mint_google_token(sub: &str, name: &str, email: Option<&str>) -> String {
    let claims = json!({ "sub": sub, "name": name, "email": email, "picture": null });
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"not-the-server-secret"),
    )
    .expect("failed to encode jwt")
}

async fn signup(client: &reqwest::Client, srv: &TestServer, username: &str, email: &str) {
    let res = client
        .post(srv.api("/signup"))
        .json(&json!({
            "username": username,
            "email": email,
            "password": "hunter22",
            "confirmPassword": "hunter22",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn signup_then_signin_round_trip() {
    let srv = TestServer::spawn().await;
    let client = cookie_client();

    signup(&client, &srv, "alice", "alice@example.com").await;

    let res = client
        .post(srv.api("/signin"))
        .json(&json!({ "email": "alice@example.com", "password": "hunter22" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["username"], "alice");
    assert!(body["token"].as_str().is_some());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn mismatched_confirmation_creates_no_account() {
    let srv = TestServer::spawn().await;
    let client = cookie_client();

    let res = client
        .post(srv.api("/signup"))
        .json(&json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "hunter22",
            "confirmPassword": "different",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // The account must not exist afterwards.
    let res = client
        .post(srv.api("/signin"))
        .json(&json!({ "email": "alice@example.com", "password": "hunter22" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Username not found");
}

#[tokio::test]
async fn duplicate_email_signup_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = cookie_client();

    signup(&client, &srv, "alice", "alice@example.com").await;

    let res = client
        .post(srv.api("/signup"))
        .json(&json!({
            "username": "impostor",
            "email": "alice@example.com",
            "password": "hunter22",
            "confirmPassword": "hunter22",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn protected_routes_require_a_cookie() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.api("/income")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_session_token_is_forbidden() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(srv.api("/income"))
        .header("Cookie", "token=not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn bad_signed_token_wins_over_valid_google_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let google = mint_google_token("g-1", "Alice", Some("alice@example.com"));
    let res = client
        .get(srv.api("/income"))
        .header("Cookie", format!("token=not-a-jwt; googletoken={google}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn create_then_list_income() {
    let srv = TestServer::spawn().await;
    let client = cookie_client();
    signup(&client, &srv, "alice", "alice@example.com").await;

    let res = client
        .post(srv.api("/income"))
        .json(&json!({
            "title": "Salary",
            "category": "Salary",
            "amount": 2500.0,
            "date": "2024-10-01",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    assert_eq!(created["amount"], json!(2500.0));

    let res = client.get(srv.api("/income")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let listed: serde_json::Value = res.json().await.unwrap();
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["title"], "Salary");
    assert_eq!(listed[0]["id"], created["id"]);
}

#[tokio::test]
async fn negative_amount_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = cookie_client();
    signup(&client, &srv, "alice", "alice@example.com").await;

    let res = client
        .post(srv.api("/income"))
        .json(&json!({ "title": "Oops", "category": "Misc", "amount": -5.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn expense_creation_requires_an_account_but_income_does_not() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Valid signature, but no such account exists.
    let token = mint_session_token("ghost");
    let cookie = format!("token={token}");
    let entry = json!({ "title": "Rent", "category": "Housing", "amount": 900.0 });

    let res = client
        .post(srv.api("/expense"))
        .header("Cookie", &cookie)
        .json(&entry)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(srv.api("/income"))
        .header("Cookie", &cookie)
        .json(&entry)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn march_filter_excludes_the_leap_day() {
    let srv = TestServer::spawn().await;
    let client = cookie_client();
    signup(&client, &srv, "alice", "alice@example.com").await;

    for (title, date) in [("Leap", "2024-02-29"), ("March", "2024-03-15")] {
        let res = client
            .post(srv.api("/income"))
            .json(&json!({ "title": title, "category": "Misc", "amount": 10.0, "date": date }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = client
        .get(srv.api("/filter/income"))
        .query(&[("month", "3"), ("year", "2024")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let listed: serde_json::Value = res.json().await.unwrap();
    let titles: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["March"]);
}

#[tokio::test]
async fn update_is_last_write_wins() {
    let srv = TestServer::spawn().await;
    let client = cookie_client();
    signup(&client, &srv, "alice", "alice@example.com").await;

    let res = client
        .post(srv.api("/expense"))
        .json(&json!({ "title": "Rent", "category": "Housing", "amount": 900.0 }))
        .send()
        .await
        .unwrap();
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let res = client
        .put(srv.api(&format!("/expense/{id}")))
        .json(&json!({ "amount": 950.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["amount"], json!(950.0));
    assert_eq!(updated["title"], "Rent");
}

#[tokio::test]
async fn delete_of_unknown_id_is_not_found() {
    let srv = TestServer::spawn().await;
    let client = cookie_client();
    signup(&client, &srv, "alice", "alice@example.com").await;

    let res = client
        .delete(srv.api(&format!("/income/{}", uuid::Uuid::now_v7())))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_id_is_a_bad_request() {
    let srv = TestServer::spawn().await;
    let client = cookie_client();
    signup(&client, &srv, "alice", "alice@example.com").await;

    let res = client
        .delete(srv.api("/income/not-a-uuid"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cross_user_delete_reads_as_missing() {
    let srv = TestServer::spawn().await;

    let alice = cookie_client();
    signup(&alice, &srv, "alice", "alice@example.com").await;
    let mallory = cookie_client();
    signup(&mallory, &srv, "mallory", "mallory@example.com").await;

    let res = alice
        .post(srv.api("/income"))
        .json(&json!({ "title": "Salary", "category": "Salary", "amount": 2500.0 }))
        .send()
        .await
        .unwrap();
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let res = mallory
        .delete(srv.api(&format!("/income/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Still visible to its owner.
    let res = alice.get(srv.api("/income")).send().await.unwrap();
    let listed: serde_json::Value = res.json().await.unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn summary_splits_by_kind() {
    let srv = TestServer::spawn().await;
    let client = cookie_client();
    signup(&client, &srv, "alice", "alice@example.com").await;

    for (path, title, amount) in [
        ("/income", "Salary", 2500.0),
        ("/expense", "Rent", 900.0),
        ("/expense", "Groceries", 120.0),
    ] {
        let res = client
            .post(srv.api(path))
            .json(&json!({
                "title": title,
                "category": "Misc",
                "amount": amount,
                "date": "2024-10-05",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = client
        .get(srv.api("/summary"))
        .query(&[("month", "10"), ("year", "2024")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["incomes"].as_array().unwrap().len(), 1);
    assert_eq!(body["expenses"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn google_login_provisions_exactly_one_account() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let token = mint_google_token("g-42", "Alice", Some("alice@example.com"));

    let mut ids = Vec::new();
    for _ in 0..2 {
        let res = client
            .post(srv.api("/auth/google-login"))
            .json(&json!({ "token": token }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["message"], "User authenticated successfully");
        ids.push(body["user"]["id"].as_str().unwrap().to_string());
    }
    assert_eq!(ids[0], ids[1]);
}

#[tokio::test]
async fn nameless_google_token_is_rejected_at_login() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let claims = json!({ "sub": "g-7", "email": "x@example.com" });
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"whatever"),
    )
    .unwrap();

    let res = client
        .post(srv.api("/auth/google-login"))
        .json(&json!({ "token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn getuser_resolves_google_identities_by_email() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let token = mint_google_token("g-9", "Alice", Some("alice@example.com"));
    let res = client
        .post(srv.api("/auth/google-login"))
        .json(&json!({ "token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(srv.api("/getuser"))
        .header("Cookie", format!("googletoken={token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    // Account JSON comes back unwrapped; consumers read fields directly.
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["username"], "Alice");
    assert_eq!(body["googleId"], "g-9");
    assert!(body.get("user").is_none());
}

#[tokio::test]
async fn logout_clears_the_session() {
    let srv = TestServer::spawn().await;
    let client = cookie_client();
    signup(&client, &srv, "alice", "alice@example.com").await;

    let res = client.get(srv.api("/getuser")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.delete(srv.api("/logout")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client.get(srv.api("/getuser")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn upload_records_and_serves_the_profile_image() {
    let srv = TestServer::spawn().await;
    let client = cookie_client();
    signup(&client, &srv, "alice", "alice@example.com").await;

    let part = reqwest::multipart::Part::bytes(vec![0x89, 0x50, 0x4e, 0x47])
        .file_name("avatar.png")
        .mime_str("image/png")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("profileImage", part);

    let res = client
        .post(srv.api("/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let url = body["url"].as_str().unwrap().to_string();
    assert!(url.ends_with(".png"));

    // The file landed in the upload dir and is served back.
    assert_eq!(std::fs::read_dir(srv.upload_dir.path()).unwrap().count(), 1);
    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.api("/getuser")).send().await.unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["profilePic"], url);
}
