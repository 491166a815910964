//! Router tests against an in-memory database.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use tessera_core::VariantSummary;
use tessera_db::{Database, DbConfig};
use tessera_pricing_api::{build_router, ApiConfig, AppState};

struct TestApp {
    router: Router,
    state: AppState,
    token: String,
}

impl TestApp {
    async fn new() -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for (id, sku) in [("variant_1", "LIN-001-M"), ("variant_2", "LIN-001-L"), ("variant_3", "BEL-001-M")] {
            db.catalog()
                .upsert(&VariantSummary {
                    id: id.to_string(),
                    product_id: "prod_1".to_string(),
                    product_title: "Linen Shirt".to_string(),
                    title: format!("Size {}", id),
                    sku: Some(sku.to_string()),
                })
                .await
                .unwrap();
        }

        let config = ApiConfig {
            jwt_secret: "test-secret".to_string(),
            ..ApiConfig::default()
        };
        let (state, worker) = AppState::new(db, config);
        tokio::spawn(worker.run());

        let token = state.jwt.generate_token("user_1", "admin", 3600).unwrap();
        TestApp {
            router: build_router(state.clone()),
            state,
            token,
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.send_raw(method, uri, body, Some(&self.token)).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.router.clone().oneshot(request).await.unwrap()
    }
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new().await;
    let response = app.send_raw(Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn pricing_requires_admin_token() {
    let app = TestApp::new().await;

    let response = app.send_raw(Method::GET, "/pricing/variant_1", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .send_raw(Method::GET, "/pricing/variant_1", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let staff = app.state.jwt.generate_token("user_2", "staff", 3600).unwrap();
    let response = app
        .send_raw(Method::GET, "/pricing/variant_1", None, Some(&staff))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn set_get_and_delete_variant_prices() {
    let app = TestApp::new().await;
    let body = json!({"prices": [
        {"currency_code": "eur", "amount": 2999},
        {"currency_code": "usd", "amount": 3299}
    ]});

    let (status, created) = app.send(Method::POST, "/pricing/variant_1", Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["created"], 2);
    assert_eq!(created["updated"], 0);
    assert_eq!(created["prices"].as_array().unwrap().len(), 2);

    let (_, updated) = app.send(Method::POST, "/pricing/variant_1", Some(body)).await;
    assert_eq!(updated["created"], 0);
    assert_eq!(updated["updated"], 2);

    let (status, fetched) = app.send(Method::GET, "/pricing/variant_1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["count"], 2);
    assert!(fetched.get("record").is_none());
    let usd = fetched["prices"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["currency_code"] == "usd")
        .unwrap();
    assert_eq!(usd["formatted_amount"], "$32.99");

    let (_, with_record) = app
        .send(Method::GET, "/pricing/variant_1?include=record", None)
        .await;
    assert_eq!(with_record["record"]["variant_id"], "variant_1");

    let (status, deleted) = app.send(Method::DELETE, "/pricing/variant_1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["deleted"], true);
    assert_eq!(deleted["count"], 2);
}

#[tokio::test]
async fn rejects_invalid_price_input() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(Method::POST, "/pricing/variant_1", Some(json!({"prices": []})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");

    let (status, body) = app
        .send(
            Method::POST,
            "/pricing/variant_1",
            Some(json!({"prices": [
                {"currency_code": "eur", "amount": 100},
                {"currency_code": "zzz", "amount": -1}
            ]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"currency_code"));
    assert!(fields.contains(&"amount"));

    let (_, fetched) = app.send(Method::GET, "/pricing/variant_1", None).await;
    assert_eq!(fetched["count"], 0);
}

#[tokio::test]
async fn unknown_variant_is_not_found() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(
            Method::POST,
            "/pricing/variant_404",
            Some(json!({"prices": [{"currency_code": "eur", "amount": 100}]})),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn malformed_json_body_uses_error_shape() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/pricing/variant_1",
            Some(json!({"prices": [{"currency_code": "eur", "amount": "abc"}]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
    assert!(body["message"].as_str().unwrap().starts_with("Invalid request: "));

    let response = app
        .send_raw(Method::POST, "/pricing/calculate", None, Some(&app.token))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn recent_history_rejects_oversized_window() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(Method::GET, "/pricing/history?days=1000000000", None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "days");
}

#[tokio::test]
async fn calculate_respects_override_seam() {
    let app = TestApp::new().await;

    let (status, _) = app
        .send(
            Method::POST,
            "/pricing/calculate",
            Some(json!({"variant_id": "variant_1", "currency_code": "eur"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.send(
        Method::POST,
        "/pricing/variant_1",
        Some(json!({"prices": [{"currency_code": "eur", "amount": 2999}]})),
    )
    .await;
    let (status, _) = app
        .send(
            Method::POST,
            "/pricing/regional",
            Some(json!({"variant_id": "variant_1", "region_id": "reg_fr", "currency_code": "eur", "amount": 3499})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, base) = app
        .send(
            Method::POST,
            "/pricing/calculate",
            Some(json!({"variant_id": "variant_1", "currency_code": "EUR", "region_id": "reg_fr"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(base["price"]["amount"], 2999);

    let (_, effective) = app
        .send(
            Method::POST,
            "/pricing/calculate",
            Some(json!({
                "variant_id": "variant_1",
                "currency_code": "eur",
                "region_id": "reg_fr",
                "apply_overrides": true
            })),
        )
        .await;
    assert_eq!(effective["price"]["amount"], 3499);
    assert_eq!(effective["price"]["is_override"], true);
}

#[tokio::test]
async fn regional_override_lifecycle() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/pricing/regional", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "region_id");

    let (status, saved) = app
        .send(
            Method::POST,
            "/pricing/regional",
            Some(json!({"variant_id": "variant_2", "region_id": "reg_fr", "currency_code": "eur", "amount": 3499})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(saved["regional_price"]["amount"], 3499);
    assert_eq!(saved["regional_price"]["formatted_amount"], "34.99 €");

    let (_, scan) = app
        .send(Method::GET, "/pricing/regional?region_id=reg_fr", None)
        .await;
    assert_eq!(scan["count"], 1);

    let (_, one) = app
        .send(
            Method::GET,
            "/pricing/regional?region_id=reg_fr&variant_id=variant_1",
            None,
        )
        .await;
    assert_eq!(one["count"], 0);

    let delete = json!({"variant_id": "variant_2", "region_id": "reg_fr", "currency_code": "eur"});
    let (_, first) = app
        .send(Method::DELETE, "/pricing/regional", Some(delete.clone()))
        .await;
    assert_eq!(first["deleted"], true);
    let (_, second) = app.send(Method::DELETE, "/pricing/regional", Some(delete)).await;
    assert_eq!(second["deleted"], false);
}

#[tokio::test]
async fn history_hook_and_audit_trail() {
    let app = TestApp::new().await;

    app.send(
        Method::POST,
        "/pricing/variant_1",
        Some(json!({"prices": [{"currency_code": "eur", "amount": 2999}]})),
    )
    .await;
    app.send(
        Method::POST,
        "/pricing/variant_1",
        Some(json!({"prices": [{"currency_code": "eur", "amount": 3199}]})),
    )
    .await;

    let (status, _) = app
        .send(
            Method::POST,
            "/pricing/history",
            Some(json!({"variant_id": "variant_1", "currency_code": "eur"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::POST,
            "/pricing/history",
            Some(json!({
                "variant_id": "variant_2",
                "currency_code": "eur",
                "new_amount": 1500,
                "region_id": "reg_fr",
                "reason": "Manual correction"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    app.state.engine.history.flush().await.unwrap();

    let (status, body) = app
        .send(Method::GET, "/pricing/history?variant_id=variant_1", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let trail = &body["audit_trail"];
    assert_eq!(trail["total_changes"], 2);
    assert_eq!(trail["variant_title"], "Size variant_1");
    assert_eq!(trail["history"][0]["old_amount"], 2999);
    assert_eq!(trail["history"][0]["new_amount"], 3199);
    assert_eq!(trail["history"][0]["changed_by"], "user_1");
    assert_eq!(trail["history"][0]["reason"], "Price updated via admin dashboard");

    let (_, recent) = app.send(Method::GET, "/pricing/history", None).await;
    assert_eq!(recent["count"], 3);
    assert_eq!(recent["history"][0]["region_id"], "reg_fr");
    assert_eq!(recent["history"][0]["formatted_new_amount"], "15.00 €");
    assert!(recent["history"][0].get("formatted_old_amount").is_none());
}

#[tokio::test]
async fn bulk_update_reports_failures_per_variant() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(
            Method::POST,
            "/pricing/bulk",
            Some(json!({"updates": [
                {"variant_id": "variant_1", "prices": [{"currency_code": "eur", "amount": 2999}]},
                {"variant_id": "variant_404", "prices": [{"currency_code": "eur", "amount": 2999}]}
            ]})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], 1);
    assert_eq!(body["errors"][0]["variant_id"], "variant_404");
}

#[tokio::test]
async fn list_caps_the_page_size() {
    let app = TestApp::new().await;
    let (status, body) = app.send(Method::GET, "/pricing?limit=500", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["limit"], 100);
    assert_eq!(body["offset"], 0);
    assert_eq!(body["count"], 3);
}

#[tokio::test]
async fn import_reports_rows_and_export_is_an_attachment() {
    let app = TestApp::new().await;

    let (status, _) = app
        .send(Method::POST, "/pricing/import", Some(json!({"format": "text"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let csv = "variant_id,sku,currency_code,amount\nvariant_1,,eur,\n,LIN-001-L,usd,3299\n";
    let (status, body) = app
        .send(
            Method::POST,
            "/pricing/import",
            Some(json!({"csv_data": csv, "format": "text"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dry_run"], false);
    assert_eq!(body["result"]["successful"], 1);
    assert_eq!(body["result"]["failed"], 1);
    assert_eq!(body["result"]["errors"][0]["row"], 2);

    let response = app
        .send_raw(
            Method::GET,
            "/pricing/export?currency_code=usd",
            None,
            Some(&app.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"prices_export_"));
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("variant_2,LIN-001-L,Size variant_2,Linen Shirt,usd,3299,$32.99,,,"));
}
