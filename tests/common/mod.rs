#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`

use estate_admin::authz::AuthorizationGate;
use estate_admin::jwt::JwtConfig;
use estate_admin::{router, AppState};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
    _dir: TempDir,
}

pub async fn spawn() -> Result<TestApp> {
    let dir = tempfile::tempdir().context("failed to create tempdir")?;
    let db_path = dir.path().join("test.db");
    let pool = estate_admin::db::open_file(&db_path).await?;

    let state = AppState::new(pool.clone(), JwtConfig::new("test-secret", 1), AuthorizationGate::default());

    Ok(TestApp {
        app: router(state),
        pool,
        _dir: dir,
    })
}

impl TestApp {
    pub async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Option<String>, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let req = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let resp = self.app.clone().oneshot(req).await?;
        let status = resp.status();
        let location = resp
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = body::to_bytes(resp.into_body(), 10_485_760).await?;
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
        Ok((status, location, json))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let (status, _, body) = self
            .send("POST", "/auth/login", None, Some(serde_json::json!({"email": email, "password": password})))
            .await?;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        Ok(body.get("token").and_then(Value::as_str).context("missing token")?.to_string())
    }

    pub async fn admin_token(&self) -> Result<String> {
        estate_admin::db::users::ensure_admin(&self.pool, "Admin", ADMIN_EMAIL, PASSWORD).await?;
        self.login(ADMIN_EMAIL, PASSWORD).await
    }

    /// Create a user through the API as `creator`, returning (id, token).
    pub async fn user_with_role(&self, creator: &str, email: &str, role: &str) -> Result<(String, String)> {
        let (status, _, body) = self
            .send(
                "POST",
                "/users",
                Some(creator),
                Some(serde_json::json!({"name": email, "email": email, "password": PASSWORD, "role": role})),
            )
            .await?;
        assert_eq!(status, StatusCode::CREATED, "user create failed: {}", body);
        let id = body.get("id").and_then(Value::as_str).context("missing id")?.to_string();
        let token = self.login(email, PASSWORD).await?;
        Ok((id, token))
    }

    pub async fn seed_demo(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for listing in estate_admin::models::property::demo_catalog() {
            let property = estate_admin::db::properties::insert(&self.pool, &listing).await?;
            ids.push(property.id.to_string());
        }
        Ok(ids)
    }
}

pub fn titles(body: &Value) -> Vec<String> {
    body.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("title").and_then(Value::as_str).map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
