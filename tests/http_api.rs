use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

use proton_beaker::config::SimConfig;
use proton_beaker::server::{router, AppState};

fn app() -> Router {
    let sim = SimConfig {
        seed: Some(1),
        bind_probability: 0.0,
        release_probability: 0.0,
        spawn_per_step: 64,
        ..SimConfig::default()
    };
    router(AppState::new(sim, Duration::from_secs(600)))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn send_json(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, req).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn create(app: &Router) -> Value {
    let req = Request::post("/api/sessions").body(Body::empty()).unwrap();
    let (status, body) = send_json(app, req).await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
async fn serves_page_and_sprites() {
    let app = app();
    let (status, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("id=\"protonCount\""));
    assert!(html.contains("id=\"pH\""));

    let (status, body) = send(&app, get("/assets/proton.png")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..4], b"\x89PNG");

    let (status, _) = send(&app, get("/assets/hydroxide.png")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_setup_then_frames() {
    let app = app();
    let created = create(&app).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["views"]["slider"]["value"], 10);
    assert_eq!(created["views"]["slider"]["max"], 64);
    assert_eq!(created["views"]["ph"]["value"], "11.81");
    assert_eq!(created["sprites"]["proton"], "/assets/proton.png");
    assert_eq!(created["counters"]["protons"], 0);

    let (status, frame) = send_json(&app, get(&format!("/api/sessions/{id}/frame"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(frame["counters"]["protons"], 10);
    assert_eq!(frame["frame"]["particles"].as_array().unwrap().len(), 20);
    assert_eq!(frame["views"]["table"]["conjugate_base"]["count"], 10);

    let (_, health) = send_json(&app, get("/health")).await;
    assert_eq!(health["sessions"], 1);
}

#[tokio::test]
async fn edits_reconcile_or_are_ignored() {
    let app = app();
    let id = create(&app).await["id"].as_str().unwrap().to_string();
    send(&app, get(&format!("/api/sessions/{id}/frame"))).await;

    let edit_uri = format!("/api/sessions/{id}/edit");
    let (status, res) = send_json(&app, post_json(&edit_uri, json!({ "control": "slider", "value": "25" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res["accepted"], true);
    assert_eq!(res["request"], json!({ "action": "add", "count": 15 }));

    let (status, res) = send_json(&app, post_json(&edit_uri, json!({ "control": "ph", "value": "not a number" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res["accepted"], false);
    assert_eq!(res["request"], Value::Null);

    let (_, frame) = send_json(&app, get(&format!("/api/sessions/{id}/frame"))).await;
    assert_eq!(frame["counters"]["protons"], 25);
    assert_eq!(frame["views"]["slider"]["value"], 25);
}

#[tokio::test]
async fn unknown_and_closed_sessions_are_not_found() {
    let app = app();
    let missing = "00000000-0000-4000-8000-000000000000";
    let (status, body) = send_json(&app, get(&format!("/api/sessions/{missing}/frame"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));

    let id = create(&app).await["id"].as_str().unwrap().to_string();
    let req = Request::delete(format!("/api/sessions/{id}")).body(Body::empty()).unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get(&format!("/api/sessions/{id}/frame"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sessions_are_isolated() {
    let app = app();
    let a = create(&app).await["id"].as_str().unwrap().to_string();
    let b = create(&app).await["id"].as_str().unwrap().to_string();
    send(&app, get(&format!("/api/sessions/{a}/frame"))).await;
    send(&app, get(&format!("/api/sessions/{b}/frame"))).await;

    send(&app, post_json(&format!("/api/sessions/{a}/edit"), json!({ "control": "slider", "value": "50" }))).await;

    let (_, fa) = send_json(&app, get(&format!("/api/sessions/{a}/frame"))).await;
    let (_, fb) = send_json(&app, get(&format!("/api/sessions/{b}/frame"))).await;
    assert_eq!(fa["counters"]["protons"], 50);
    assert_eq!(fb["counters"]["protons"], 10);
}
