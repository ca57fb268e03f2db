mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn auth_edge_cases() -> Result<()> {
    let app = common::spawn().await?;

    // 1. Register with short password
    let (status, _, _) = app
        .send("POST", "/auth/register", None, Some(json!({
            "name": "Short Pass",
            "email": "short@example.com",
            "password": "short"
        })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "Should fail with bad request for short password");

    // 2. Register with valid user, always as a client
    let (status, _, body) = app
        .send("POST", "/auth/register", None, Some(json!({
            "name": "Valid User",
            "email": "Valid@Example.com",
            "password": "password123"
        })))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "CLIENT");
    assert_eq!(body["user"]["email"], "valid@example.com");

    // 3. Duplicate email, differing only in case
    let (status, _, _) = app
        .send("POST", "/auth/register", None, Some(json!({
            "name": "Again",
            "email": "VALID@example.com",
            "password": "password123"
        })))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    // 4. Login with wrong password
    let (status, _, _) = app
        .send("POST", "/auth/login", None, Some(json!({
            "email": "valid@example.com",
            "password": "wrongpassword"
        })))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "Should fail with unauthorized for wrong password");

    // 5. Login with non-existent email
    let (status, _, _) = app
        .send("POST", "/auth/login", None, Some(json!({
            "email": "nobody@example.com",
            "password": "password123"
        })))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "Should fail with unauthorized for non-existent user");

    // 6. Guarded route without token redirects to login
    let (status, location, body) = app.send("GET", "/properties", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "Should fail with unauthorized for missing token");
    assert_eq!(location.as_deref(), Some("/login"));
    assert_eq!(body["redirect_to"], "/login");

    // 7. Garbage token is treated like no session
    let (status, location, _) = app.send("GET", "/auth/me", Some("not-a-jwt"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(location.as_deref(), Some("/login"));

    // 8. Valid token reaches /auth/me
    let token = app.login("valid@example.com", "password123").await?;
    let (status, _, body) = app.send("GET", "/auth/me", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "CLIENT");

    Ok(())
}

#[tokio::test]
async fn malformed_stored_role_fails_closed() -> Result<()> {
    let app = common::spawn().await?;
    let admin = app.admin_token().await?;

    // Corrupt the stored role behind a live token.
    sqlx::query("UPDATE users SET role = 'SUPERUSER' WHERE email = ?")
        .bind(common::ADMIN_EMAIL)
        .execute(&app.pool)
        .await?;

    let (status, location, body) = app.send("GET", "/users", Some(&admin), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(location.as_deref(), Some("/login"));
    assert_eq!(body["error"], "denied");

    Ok(())
}

#[tokio::test]
async fn deleted_account_loses_session() -> Result<()> {
    let app = common::spawn().await?;
    let admin = app.admin_token().await?;
    let (client_id, client) = app.user_with_role(&admin, "gone@example.com", "CLIENT").await?;

    let (status, _, _) = app.send("DELETE", &format!("/users/{}", client_id), Some(&admin), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = app.send("GET", "/properties", Some(&client), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn corrupted_user_row_is_skipped_not_fatal() -> Result<()> {
    let app = common::spawn().await?;
    let admin = app.admin_token().await?;
    let (broken_id, _) = app.user_with_role(&admin, "broken@example.com", "CLIENT").await?;
    app.user_with_role(&admin, "fine@example.com", "CLIENT").await?;

    sqlx::query("UPDATE users SET role = 'SUPERUSER' WHERE email = ?")
        .bind("broken@example.com")
        .execute(&app.pool)
        .await?;

    let (status, _, body) = app.send("GET", "/users", Some(&admin), None).await?;
    assert_eq!(status, StatusCode::OK, "listing failed: {}", body);
    let emails: Vec<&str> = body
        .as_array()
        .map(|users| users.iter().filter_map(|u| u["email"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(emails, vec![common::ADMIN_EMAIL, "fine@example.com"]);

    let (status, _, body) = app.send("GET", "/users?role=client", Some(&admin), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["email"], "fine@example.com");

    let (status, _, body) = app.send("GET", "/reports/summary", Some(&admin), None).await?;
    assert_eq!(status, StatusCode::OK, "summary failed: {}", body);
    assert_eq!(body["users_by_role"]["CLIENT"], 1);

    let (status, _, body) = app
        .send(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "broken@example.com", "password": common::PASSWORD})),
        )
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(!body.to_string().contains("SUPERUSER"));

    let (status, _, body) = app.send("GET", &format!("/users/{}", broken_id), Some(&admin), None).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.to_string().contains("SUPERUSER"));
    assert!(!body.to_string().contains(&broken_id));

    Ok(())
}
