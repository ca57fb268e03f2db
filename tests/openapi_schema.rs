use serde_json::Value;

#[test]
fn openapi_documents_listing_fields_and_bearer_auth() -> anyhow::Result<()> {
    // Build the OpenAPI document the same way the server does
    let doc = estate_admin::docs::build_openapi(8000)?;
    let v = serde_json::to_value(&doc)?;

    let props = v
        .pointer("/components/schemas/Property/properties")
        .and_then(Value::as_object)
        .expect("components.schemas.Property.properties must exist");

    for k in ["title", "location", "price", "bedrooms", "property_type", "status"] {
        assert!(props.contains_key(k), "OpenAPI Property schema missing '{}'", k);
    }

    assert!(v.pointer("/components/securitySchemes/bearerAuth").is_some());
    assert!(v.pointer("/paths/~1properties~1search/post").is_some());
    assert!(v.pointer("/paths/~1users~1{id}/delete").is_some());

    Ok(())
}
