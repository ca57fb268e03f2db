mod common;

use anyhow::Result;
use axum::http::StatusCode;

#[tokio::test]
async fn summary_aggregates_filtered_catalogue() -> Result<()> {
    let app = common::spawn().await?;
    let admin = app.admin_token().await?;
    let (_, agent) = app.user_with_role(&admin, "agent@example.com", "AGENT").await?;
    let (_, client) = app.user_with_role(&admin, "client@example.com", "CLIENT").await?;
    app.seed_demo().await?;

    let (status, _, body) = app.send("GET", "/reports/summary", Some(&agent), None).await?;
    assert_eq!(status, StatusCode::OK, "summary failed: {}", body);
    assert_eq!(body["total_properties"], 3);
    assert_eq!(body["by_status"]["available"], 2);
    assert_eq!(body["by_type"]["house"], 1);
    assert_eq!(body["price"]["min"], 180000);
    assert_eq!(body["price"]["max"], 500000);
    assert_eq!(body["users_by_role"]["ADMIN"], 1);
    assert_eq!(body["users_by_role"]["AGENT"], 1);
    assert_eq!(body["users_by_role"]["CLIENT"], 1);

    let (_, _, body) = app
        .send("GET", "/reports/summary?location=Bogot%C3%A1", Some(&admin), None)
        .await?;
    assert_eq!(body["total_properties"], 2);
    assert_eq!(body["price"]["average"], 215000.0);

    let (_, _, body) = app
        .send("GET", "/reports/summary?minPrice=900000", Some(&admin), None)
        .await?;
    assert_eq!(body["total_properties"], 0);
    assert!(body["price"].is_null());

    let (status, location, _) = app.send("GET", "/reports/summary", Some(&client), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(location.as_deref(), Some("/login"));

    Ok(())
}
