use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use gatepass_server::auth::{AdminPolicy, MockAuth};
use gatepass_server::{create_routes, AppState};

const ADMIN: &str = "alice@gatepass.com";
const CLIENT: &str = "joao@cliente.com";
const PASSWORD: &str = "123456";

fn app() -> Router {
    create_routes(AppState::in_memory(MockAuth::new(), AdminPolicy::default()))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn sign_in(app: &Router, email: &str) -> (String, Value) {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/sign-in",
        None,
        Some(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "sign-in failed: {body}");
    let token = body["data"]["token"].as_str().unwrap().to_string();
    (token, body["data"]["user"].clone())
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        other => other.to_string().parse().unwrap(),
    }
}

async fn create_ticket(app: &Router, token: &str, event_name: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/tickets",
        Some(token),
        Some(json!({
            "event_name": event_name,
            "description": "  ",
            "event_date": "2026-12-05",
            "venue": "Allianz Parque",
            "price": "120.00",
            "quantity_available": 500
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "ticket creation failed: {body}");
    body["data"].clone()
}

#[tokio::test]
async fn health_reports_auth_mode() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["auth_mode"], "mock");
}

#[tokio::test]
async fn sign_in_rejects_wrong_password() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/sign-in",
        None,
        Some(json!({ "email": CLIENT, "password": "654321" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "AUTH_ERROR");
}

#[tokio::test]
async fn sign_in_derives_roles_from_email() {
    let app = app();

    let (_, admin) = sign_in(&app, ADMIN).await;
    assert_eq!(admin["is_admin"], true);
    assert_eq!(admin["approved"], true);

    let (_, client) = sign_in(&app, "JOAO@cliente.com").await;
    assert_eq!(client["email"], CLIENT);
    assert_eq!(client["is_admin"], false);
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = app();

    let (status, _) = send(&app, Method::GET, "/auth/session", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/shop/offer", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn clients_cannot_reach_admin_routes() {
    let app = app();
    let (token, _) = sign_in(&app, CLIENT).await;

    for uri in ["/admin/stats", "/admin/users", "/tickets", "/subscriptions", "/accesses"] {
        let (status, body) = send(&app, Method::GET, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["error"]["code"], "FORBIDDEN");
    }
}

#[tokio::test]
async fn quote_clamps_the_requested_quantity() {
    let app = app();
    let (token, _) = sign_in(&app, CLIENT).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/shop/quote",
        Some(&token),
        Some(json!({ "quantity": 250 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quantity"], 100);
    assert_eq!(decimal(&body["data"]["total"]), Decimal::new(9000, 0));

    let (_, body) = send(
        &app,
        Method::POST,
        "/shop/quote",
        Some(&token),
        Some(json!({ "quantity": -4 })),
    )
    .await;
    assert_eq!(body["data"]["quantity"], 1);

    let (_, body) = send(&app, Method::POST, "/shop/quote", Some(&token), Some(json!({}))).await;
    assert_eq!(body["data"]["quantity"], 1);
    let options = body["data"]["payment_options"].as_array().unwrap();
    assert_eq!(options.len(), 3);
    assert_eq!(decimal(&options[0]["amount_per_installment"]), Decimal::new(90, 0));
    assert_eq!(decimal(&options[1]["amount_per_installment"]), Decimal::new(4770, 2));
}

#[tokio::test]
async fn quote_reads_the_selector_like_a_form_field() {
    let app = app();
    let (token, _) = sign_in(&app, CLIENT).await;

    for (quantity, expected) in [
        (json!("abc"), 1),
        (json!(2.5), 2),
        (json!("7"), 7),
        (json!(1e30), 100),
        (json!(false), 1),
    ] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/shop/quote",
            Some(&token),
            Some(json!({ "quantity": quantity.clone() })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{quantity}: {body}");
        assert_eq!(body["data"]["quantity"], expected, "{quantity}");
    }
}

#[tokio::test]
async fn malformed_requests_get_the_error_envelope() {
    let app = app();
    let (token, _) = sign_in(&app, CLIENT).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/shop/checkout",
        Some(&token),
        Some(json!({ "payment_method": "pix" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/sign-in")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (admin, _) = sign_in(&app, ADMIN).await;
    let (status, body) = send(
        &app,
        Method::PATCH,
        "/tickets/not-a-uuid/status",
        Some(&admin),
        Some(json!({ "status": "inactive" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn checkout_in_installments_records_pending_charges() {
    let app = app();
    let (token, _) = sign_in(&app, CLIENT).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/shop/checkout",
        Some(&token),
        Some(json!({
            "quantity": 3,
            "payment_method": "credit_card",
            "installments": 3,
            "approval_code": " A1B2 "
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "3 ticket(s) - Total: R$ 270,00");

    let purchase = &body["data"]["purchase"];
    assert_eq!(purchase["installments"], 3);
    assert_eq!(purchase["approval_code"], "A1B2");
    assert_eq!(decimal(&purchase["total"]), Decimal::new(270, 0));
    assert_eq!(decimal(&purchase["amount_charged"]), Decimal::new(28620, 2));

    let charges = body["data"]["pending_charges"].as_array().unwrap();
    assert_eq!(charges.len(), 2);
    for charge in charges {
        assert_eq!(decimal(&charge["amount"]), Decimal::new(9540, 2));
        assert_eq!(charge["paid"], false);
    }

    let (status, body) = send(&app, Method::GET, "/shop/purchases", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn checkout_rejects_invalid_orders() {
    let app = app();
    let (token, _) = sign_in(&app, CLIENT).await;

    let cases = [
        json!({ "quantity": 0, "payment_method": "pix" }),
        json!({ "quantity": 101, "payment_method": "pix" }),
        json!({ "quantity": 2 }),
        json!({ "quantity": 2, "payment_method": "pix", "installments": 3 }),
        json!({ "quantity": 2, "payment_method": "credit_card", "installments": 4 }),
    ];
    for payload in cases {
        let (status, body) =
            send(&app, Method::POST, "/shop/checkout", Some(&token), Some(payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn plan_catalogue_flags_popular_and_best_value() {
    let app = app();
    let (token, _) = sign_in(&app, CLIENT).await;

    let (status, body) = send(&app, Method::GET, "/plans", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["most_popular"]["tickets"], 20);
    assert_eq!(data["most_popular"]["months"], 6);
    assert_eq!(data["best_value"]["tickets"], 50);
    assert_eq!(data["best_value"]["months"], 12);

    let groups = data["groups"].as_array().unwrap();
    let months: Vec<_> = groups.iter().map(|g| g["months"].as_u64().unwrap()).collect();
    assert_eq!(months, vec![3, 6, 12]);
    for group in groups {
        assert_eq!(group["plans"].as_array().unwrap().len(), 5);
    }

    let (status, body) = send(
        &app,
        Method::POST,
        "/plans/select",
        Some(&token),
        Some(json!({ "tickets": 20, "months": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["most_popular"], true);

    let (status, _) = send(
        &app,
        Method::POST,
        "/plans/select",
        Some(&token),
        Some(json!({ "tickets": 15, "months": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_manages_tickets() {
    let app = app();
    let (token, _) = sign_in(&app, ADMIN).await;

    let ticket = create_ticket(&app, &token, "  Rock in Rio  ").await;
    assert_eq!(ticket["event_name"], "Rock in Rio");
    assert_eq!(ticket["description"], Value::Null);
    assert_eq!(ticket["status"], "active");
    assert_eq!(ticket["quantity_sold"], 0);

    let (status, body) = send(&app, Method::GET, "/tickets", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let id = ticket["id"].as_str().unwrap();
    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/tickets/{id}/status"),
        Some(&token),
        Some(json!({ "status": "inactive" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "inactive");

    let (status, _) = send(
        &app,
        Method::POST,
        "/tickets",
        Some(&token),
        Some(json!({
            "event_name": "Show",
            "event_date": "2026-12-05",
            "venue": " ",
            "price": "10.00",
            "quantity_available": 0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_creates_subscriptions() {
    let app = app();
    let (token, _) = sign_in(&app, ADMIN).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/subscriptions",
        Some(&token),
        Some(json!({
            "plan_name": "Premium",
            "price": "199.90",
            "duration": "quarterly",
            "auto_renew": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let subscription = &body["data"];
    assert_eq!(subscription["status"], "active");
    assert_eq!(subscription["duration"], "quarterly");
    assert_eq!(subscription["expiring_soon"], false);
    assert_ne!(subscription["start_date"], subscription["end_date"]);

    let id = subscription["id"].as_str().unwrap();
    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/subscriptions/{id}/status"),
        Some(&token),
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/subscriptions/{id}/status"),
        Some(&token),
        Some(json!({ "status": "paused" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_registers_accesses() {
    let app = app();
    let (token, _) = sign_in(&app, ADMIN).await;
    let ticket = create_ticket(&app, &token, "Lollapalooza").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/accesses",
        Some(&token),
        Some(json!({ "ticket_id": ticket["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["status"], "pending");

    let (status, body) = send(&app, Method::GET, "/accesses", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["event_name"], "Lollapalooza");
    assert_eq!(entries[0]["venue"], "Allianz Parque");

    let (status, _) = send(
        &app,
        Method::POST,
        "/accesses",
        Some(&token),
        Some(json!({ "ticket_id": "00000000-0000-4000-8000-000000000000" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_count_every_collection() {
    let app = app();
    let (admin, _) = sign_in(&app, ADMIN).await;
    let (client, _) = sign_in(&app, CLIENT).await;

    let ticket = create_ticket(&app, &admin, "Tomorrowland").await;
    send(
        &app,
        Method::POST,
        "/accesses",
        Some(&admin),
        Some(json!({ "ticket_id": ticket["id"] })),
    )
    .await;
    send(
        &app,
        Method::POST,
        "/subscriptions",
        Some(&admin),
        Some(json!({ "plan_name": "Basic", "price": "49.90", "duration": "monthly" })),
    )
    .await;
    send(
        &app,
        Method::POST,
        "/shop/checkout",
        Some(&client),
        Some(json!({ "quantity": 1, "payment_method": "credit_card", "installments": 2 })),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/admin/stats", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({
            "total_users": 2,
            "total_tickets": 1,
            "total_subscriptions": 1,
            "total_accesses": 1,
            "total_pending_charges": 1
        })
    );
}

#[tokio::test]
async fn user_listing_includes_account_totals() {
    let app = app();
    let (admin, _) = sign_in(&app, ADMIN).await;
    let (client, _) = sign_in(&app, CLIENT).await;

    send(
        &app,
        Method::POST,
        "/shop/checkout",
        Some(&client),
        Some(json!({ "quantity": 3, "payment_method": "credit_card", "installments": 3 })),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/admin/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) =
        send(&app, Method::GET, "/admin/users?search=SILVA", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 1);

    let joao = &users[0];
    assert_eq!(joao["email"], CLIENT);
    assert_eq!(joao["tickets_purchased"], 3);
    assert_eq!(decimal(&joao["total_pending"]), Decimal::new(19080, 2));
    assert_eq!(decimal(&joao["total_paid"]), Decimal::new(9540, 2));
    assert_eq!(joao["days_overdue"], 0);
    assert_eq!(joao["needs_collection"], true);
}

#[tokio::test]
async fn revoked_clients_wait_for_approval() {
    let app = app();
    let (admin, _) = sign_in(&app, ADMIN).await;
    let (client, user) = sign_in(&app, CLIENT).await;
    let id = user["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/admin/users/{id}/revoke"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["approved"], false);

    let (status, _) = send(&app, Method::GET, "/shop/offer", Some(&client), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The session itself stays valid.
    let (status, body) = send(&app, Method::GET, "/auth/session", Some(&client), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["approved"], false);

    send(
        &app,
        Method::POST,
        &format!("/admin/users/{id}/approve"),
        Some(&admin),
        None,
    )
    .await;
    let (status, body) = send(&app, Method::GET, "/shop/offer", Some(&client), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["max_quantity"], 100);
}

#[tokio::test]
async fn sign_out_invalidates_the_token() {
    let app = app();
    let (token, _) = sign_in(&app, CLIENT).await;

    let (status, body) = send(&app, Method::POST, "/auth/sign-out", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Goodbye, João Silva!");

    let (status, _) = send(&app, Method::GET, "/auth/session", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn mock_mode_refuses_sign_up_and_resets() {
    let app = app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/sign-up",
        None,
        Some(json!({
            "email": "maria@cliente.com",
            "password": "abc123",
            "full_name": "Maria Souza",
            "phone": "+55 21 97777-7777"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/password-reset",
        None,
        Some(json!({ "email": CLIENT })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn sign_up_validates_before_reaching_the_provider() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/sign-up",
        None,
        Some(json!({
            "email": "not-an-email",
            "password": "short",
            "full_name": "Maria Souza",
            "phone": "+55 21 97777-7777"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}
