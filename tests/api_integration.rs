mod common;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::titles;

#[tokio::test]
async fn property_catalogue_flow() -> Result<()> {
    let app = common::spawn().await?;
    let admin = app.admin_token().await?;
    let (_, agent) = app.user_with_role(&admin, "agent@example.com", "AGENT").await?;
    let (_, client) = app.user_with_role(&admin, "client@example.com", "CLIENT").await?;

    // -- admin creates the catalogue
    for listing in estate_admin::models::property::demo_catalog() {
        let body = json!({
            "title": listing.title,
            "description": listing.description,
            "location": listing.location,
            "price": listing.price,
            "bedrooms": listing.bedrooms,
            "property_type": listing.property_type,
            "status": listing.status,
        });
        let (status, _, res) = app.send("POST", "/properties", Some(&admin), Some(body)).await?;
        assert_eq!(status, StatusCode::CREATED, "property create failed: {}", res);
    }

    // -- every role can browse, in insertion order
    for token in [&admin, &agent, &client] {
        let (status, _, body) = app.send("GET", "/properties", Some(token), None).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            titles(&body),
            vec!["Casa en el Centro", "Apartamento en Zona Norte", "Villa campestre"]
        );
    }

    // -- query-string filters
    let (_, _, body) = app
        .send("GET", "/properties?search=CASA", Some(&client), None)
        .await?;
    assert_eq!(titles(&body), vec!["Casa en el Centro"]);

    let (_, _, body) = app
        .send("GET", "/properties?minPrice=150000&maxPrice=300000&search=%20%20", Some(&client), None)
        .await?;
    assert_eq!(titles(&body), vec!["Casa en el Centro", "Apartamento en Zona Norte"]);

    let (_, _, body) = app
        .send("GET", "/properties?minPrice=abc&type=villa", Some(&client), None)
        .await?;
    assert_eq!(titles(&body), vec!["Villa campestre"]);

    // -- JSON criteria with a location set
    let (status, _, body) = app
        .send(
            "POST",
            "/properties/search",
            Some(&agent),
            Some(json!({
                "location": ["Bogotá"],
                "minPrice": 150000,
                "maxPrice": 300000,
                "search": "apartamento"
            })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Apartamento en Zona Norte"]);
    let apartment_id = body[0]["id"].as_str().context("missing id")?.to_string();

    // -- only ADMIN manages listings
    let update = json!({"price": 175000, "status": "reserved"});
    for token in [&agent, &client] {
        let (status, location, _) = app
            .send("PUT", &format!("/properties/{}", apartment_id), Some(token), Some(update.clone()))
            .await?;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(location.as_deref(), Some("/login"));

        let (status, _, _) = app
            .send("DELETE", &format!("/properties/{}", apartment_id), Some(token), None)
            .await?;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let (status, _, body) = app
        .send("PUT", &format!("/properties/{}", apartment_id), Some(&admin), Some(update))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], 175000);
    assert_eq!(body["status"], "reserved");

    let (status, _, _) = app
        .send("DELETE", &format!("/properties/{}", apartment_id), Some(&admin), None)
        .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = app
        .send("GET", &format!("/properties/{}", apartment_id), Some(&client), None)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, _, body) = app.send("GET", "/properties", Some(&client), None).await?;
    assert_eq!(titles(&body), vec!["Casa en el Centro", "Villa campestre"]);

    Ok(())
}

#[tokio::test]
async fn invalid_listing_is_rejected() -> Result<()> {
    let app = common::spawn().await?;
    let admin = app.admin_token().await?;

    let (status, _, _) = app
        .send(
            "POST",
            "/properties",
            Some(&admin),
            Some(json!({"title": " ", "location": "Chía", "price": 1, "property_type": "house"})),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = app
        .send(
            "POST",
            "/properties",
            Some(&admin),
            Some(json!({"title": "Lote", "location": "Chía", "price": -5, "property_type": "land"})),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

fn find_user<'a>(list: &'a Value, email: &str) -> Option<&'a Value> {
    list.as_array()?.iter().find(|u| u["email"] == email)
}

#[tokio::test]
async fn user_management_permissions() -> Result<()> {
    let app = common::spawn().await?;
    let admin = app.admin_token().await?;
    let (agent_id, agent) = app.user_with_role(&admin, "agent@example.com", "AGENT").await?;
    let (other_agent_id, _) = app.user_with_role(&admin, "agent2@example.com", "AGENT").await?;
    let (client_id, client) = app.user_with_role(&admin, "client@example.com", "CLIENT").await?;

    // -- clients cannot reach user management at all
    let (status, location, body) = app.send("GET", "/users", Some(&client), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(location.as_deref(), Some("/login"));
    assert_eq!(body["redirect_to"], "/login");

    // -- agent list carries per-row actions
    let (status, _, list) = app.send("GET", "/users", Some(&agent), None).await?;
    assert_eq!(status, StatusCode::OK);
    let admin_row = find_user(&list, common::ADMIN_EMAIL).context("admin row")?;
    assert_eq!(admin_row["actions"], json!({"can_edit": false, "can_delete": false}));
    let agent_row = find_user(&list, "agent2@example.com").context("agent row")?;
    assert_eq!(agent_row["actions"], json!({"can_edit": false, "can_delete": false}));
    let client_row = find_user(&list, "client@example.com").context("client row")?;
    assert_eq!(client_row["actions"], json!({"can_edit": true, "can_delete": true}));

    // -- admin sees everything as editable
    let (_, _, list) = app.send("GET", "/users?role=AGENT", Some(&admin), None).await?;
    let rows = list.as_array().context("array")?;
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["actions"]["can_edit"] == true));

    // -- agent edits a client, not another agent
    let (status, _, body) = app
        .send("PUT", &format!("/users/{}", client_id), Some(&agent), Some(json!({"name": "Cliente Uno"})))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Cliente Uno");

    let (status, _, _) = app
        .send("PUT", &format!("/users/{}", other_agent_id), Some(&agent), Some(json!({"name": "Nope"})))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // -- agent cannot promote a client nor create staff
    let (status, _, _) = app
        .send("PUT", &format!("/users/{}", client_id), Some(&agent), Some(json!({"role": "ADMIN"})))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = app
        .send(
            "POST",
            "/users",
            Some(&agent),
            Some(json!({"name": "X", "email": "x@example.com", "password": "password123", "role": "AGENT"})),
        )
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, body) = app
        .send(
            "POST",
            "/users",
            Some(&agent),
            Some(json!({"name": "Nuevo", "email": "nuevo@example.com", "password": "password123", "role": "CLIENT"})),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "agent client create failed: {}", body);

    // -- agent deletes a client, not an agent
    let (status, _, _) = app
        .send("DELETE", &format!("/users/{}", other_agent_id), Some(&agent), None)
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = app
        .send("DELETE", &format!("/users/{}", client_id), Some(&agent), None)
        .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // -- role changes apply to live tokens: demoted agent loses access
    let (status, _, _) = app
        .send("PUT", &format!("/users/{}", agent_id), Some(&admin), Some(json!({"role": "CLIENT"})))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = app.send("GET", "/users", Some(&agent), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn demo_titles_are_detected_for_reseeding() -> Result<()> {
    let app = common::spawn().await?;
    let pool = &app.pool;
    let title = "Casa en el Centro";

    assert!(!estate_admin::db::properties::title_exists(pool, title).await?);
    app.seed_demo().await?;
    assert!(estate_admin::db::properties::title_exists(pool, title).await?);
    assert!(!estate_admin::db::properties::title_exists(pool, "casa en el centro").await?);

    Ok(())
}
