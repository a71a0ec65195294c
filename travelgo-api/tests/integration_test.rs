use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use travelgo_api::middleware::CustomerClaims;
use travelgo_api::{app, AppState, AuthConfig};
use travelgo_catalog::{InventoryManager, ServiceDirectory};
use travelgo_core::service::{BusService, HotelService, TrainService};
use travelgo_core::{ServiceKind, ServiceRef, ServiceSnapshot, UnitState};
use travelgo_order::{BookingOrchestrator, BookingPolicy, LedgerBook};
use travelgo_shared::{Money, OwnerId, ServiceId};

const SECRET: &str = "test-secret";
const BUS: ServiceRef = ServiceRef {
    kind: ServiceKind::Bus,
    id: ServiceId(1),
};

struct TestApp {
    router: Router,
    inventory: Arc<InventoryManager>,
}

async fn setup() -> TestApp {
    let directory = Arc::new(ServiceDirectory::new());
    directory
        .insert(ServiceSnapshot::Bus(BusService {
            id: ServiceId(1),
            name: "Night Rider".to_string(),
            from_city: "Bangalore".to_string(),
            to_city: "Chennai".to_string(),
            price: Money::from_cents(80000),
            travel_date: NaiveDate::from_ymd_opt(2026, 11, 2),
        }))
        .await;
    directory
        .insert(ServiceSnapshot::Train(TrainService {
            id: ServiceId(2),
            name: "Shatabdi".to_string(),
            origin: "Delhi".to_string(),
            destination: "Agra".to_string(),
            price: Money::from_cents(10000),
            travel_date: None,
        }))
        .await;
    directory
        .insert(ServiceSnapshot::Hotel(HotelService {
            id: ServiceId(3),
            name: "Lake View".to_string(),
            location: "Udaipur".to_string(),
            price_per_night: Money::from_cents(450000),
        }))
        .await;

    let inventory = Arc::new(InventoryManager::new());
    inventory.seed(BUS, ["1", "2", "3"]).await;

    let orchestrator = BookingOrchestrator::new(
        directory,
        inventory.clone(),
        Arc::new(LedgerBook::new()),
        BookingPolicy::default(),
    );

    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        auth: AuthConfig {
            secret: SECRET.to_string(),
        },
    };

    TestApp {
        router: app(state),
        inventory,
    }
}

fn token_for(owner: &str) -> String {
    let claims = CustomerClaims {
        sub: owner.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_booking(owner: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/bookings")
        .header("Authorization", format!("Bearer {}", token_for(owner)))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed(method: &str, uri: &str, owner: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token_for(owner)))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health_needs_no_token() {
    let app = setup().await;
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_or_bad_token_is_unauthorized() {
    let app = setup().await;

    let (status, body) = send(
        &app.router,
        Request::builder().uri("/v1/bookings").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");

    let (status, _) = send(
        &app.router,
        Request::builder()
            .uri("/v1/bookings")
            .header("Authorization", "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bus_booking_flow() {
    let app = setup().await;

    let (status, body) = send(
        &app.router,
        post_booking("alice", json!({"type": "bus", "service_id": 1, "seats": "1, 2"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    let booking_id = body["booking_id"].as_i64().unwrap();

    assert_eq!(
        app.inventory.state_of(BUS, "2").await,
        Some(UnitState::Booked(OwnerId::new("alice")))
    );

    let (status, body) = send(&app.router, authed("GET", "/v1/bookings", "alice")).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], booking_id);
    assert_eq!(entries[0]["service_type"], "bus");
    assert_eq!(entries[0]["total_price"], "1600.00");
    assert_eq!(entries[0]["details"]["seats"], "1, 2");
    assert_eq!(entries[0]["details"]["from"], "Bangalore");
    assert_eq!(entries[0]["details"]["date"], "2026-11-02");

    let (status, body) = send(&app.router, authed("GET", "/v1/bookings", "bob")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_taken_seat_is_conflict() {
    let app = setup().await;

    let (status, _) = send(
        &app.router,
        post_booking("alice", json!({"type": "bus", "service_id": 1, "seats": ["3"]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app.router,
        post_booking("bob", json!({"type": "bus", "service_id": 1, "seats": ["1", "3"]})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "CONFLICT");

    // Seat 1 was rolled back
    assert_eq!(app.inventory.state_of(BUS, "1").await, Some(UnitState::Free));
}

#[tokio::test]
async fn test_train_and_hotel_pricing() {
    let app = setup().await;

    let (status, _) = send(
        &app.router,
        post_booking(
            "alice",
            json!({"type": "train", "service_id": 2, "quantity": 2, "class": "AC Chair", "date": "2026-12-01"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app.router,
        post_booking("alice", json!({"type": "hotel", "service_id": 3, "date": "2026-12-05"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app.router, authed("GET", "/v1/bookings", "alice")).await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);

    let train = entries.iter().find(|e| e["service_type"] == "train").unwrap();
    assert_eq!(train["total_price"], "300.00");
    assert_eq!(train["details"]["details"], "2 ticket(s) in AC Chair");
    assert_eq!(train["details"]["date"], "2026-12-01");

    let hotel = entries.iter().find(|e| e["service_type"] == "hotel").unwrap();
    assert_eq!(hotel["total_price"], "4500.00");
    assert_eq!(hotel["details"]["to"], "N/A");
    assert_eq!(hotel["details"]["details"], "1 Night Stay");
}

#[tokio::test]
async fn test_invalid_requests() {
    let app = setup().await;

    let (status, body) = send(
        &app.router,
        post_booking("alice", json!({"type": "bus", "service_id": 1, "seats": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "INVALID_REQUEST");

    let (status, _) = send(
        &app.router,
        post_booking("alice", json!({"type": "bus", "service_id": 99, "seats": "1"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app.router,
        post_booking("alice", json!({"type": "spaceship", "service_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_body_gets_json_error() {
    let app = setup().await;

    let req = Request::builder()
        .method("POST")
        .uri("/v1/bookings")
        .header("Authorization", format!("Bearer {}", token_for("alice")))
        .header("Content-Type", "application/json")
        .body(Body::from("{\"type\": \"bus\", "))
        .unwrap();
    let (status, body) = send(&app.router, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["kind"], "INVALID_REQUEST");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_seat_number_with_comma_is_rejected() {
    let app = setup().await;

    let (status, body) = send(
        &app.router,
        post_booking("alice", json!({"type": "bus", "service_id": 1, "seats": ["1,2"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "INVALID_REQUEST");
    assert_eq!(app.inventory.state_of(BUS, "1").await, Some(UnitState::Free));
    assert_eq!(app.inventory.state_of(BUS, "2").await, Some(UnitState::Free));
}

#[tokio::test]
async fn test_cancel_checks_ownership_and_frees_seats() {
    let app = setup().await;

    let (_, body) = send(
        &app.router,
        post_booking("alice", json!({"type": "bus", "service_id": 1, "seats": "2"})),
    )
    .await;
    let uri = format!("/v1/bookings/{}", body["booking_id"].as_i64().unwrap());

    let (status, body) = send(&app.router, authed("DELETE", &uri, "mallory")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "FORBIDDEN");
    assert_eq!(
        app.inventory.state_of(BUS, "2").await,
        Some(UnitState::Booked(OwnerId::new("alice")))
    );

    let (status, body) = send(&app.router, authed("DELETE", &uri, "alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(app.inventory.state_of(BUS, "2").await, Some(UnitState::Free));

    let (status, _) = send(&app.router, authed("DELETE", &uri, "alice")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_seat_map() {
    let app = setup().await;
    send(
        &app.router,
        post_booking("alice", json!({"type": "bus", "service_id": 1, "seats": "2"})),
    )
    .await;

    let (status, body) = send(&app.router, authed("GET", "/v1/services/bus/1/seats", "bob")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], 2);
    assert_eq!(body["seats"][1]["seat_number"], "2");
    assert_eq!(body["seats"][1]["is_booked"], true);
    assert!(body["seats"][1].get("owner").is_none());

    let (status, _) = send(&app.router, authed("GET", "/v1/services/hotel/3/seats", "bob")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
