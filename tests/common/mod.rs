//! In-process fake of the learning-platform backend for integration tests.
//! Binds 127.0.0.1:0 and records every request it sees.
#![allow(dead_code)]

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

pub const INSTRUCTOR_TOKEN: &str = "tok-123";
pub const STUDENT_TOKEN: &str = "tok-s";

#[derive(Debug, Clone)]
pub struct Seen {
    pub method: &'static str,
    pub path: String,
    pub auth: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
pub struct Backend {
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Backend {
    fn record(&self, method: &'static str, path: String, headers: &HeaderMap, body: Option<Value>) {
        let auth = headers.get("authorization").and_then(|v| v.to_str().ok()).map(|s| s.to_string());
        self.seen.lock().push(Seen { method, path, auth, body });
    }

    pub fn seen(&self) -> Vec<Seen> { self.seen.lock().clone() }

    pub fn count(&self) -> usize { self.seen.lock().len() }

    pub fn last(&self) -> Option<Seen> { self.seen.lock().last().cloned() }
}

fn authorized(headers: &HeaderMap) -> bool {
    let Some(v) = headers.get("authorization").and_then(|v| v.to_str().ok()) else { return false; };
    matches!(v.strip_prefix("Bearer "), Some(INSTRUCTOR_TOKEN) | Some(STUDENT_TOKEN))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"message": "Not authorized, token failed"}))).into_response()
}

fn course(id: &str) -> Value {
    json!({"_id": id, "title": format!("Course {}", id), "description": "Soil and water", "category": "Farming"})
}

async fn login(State(b): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("POST", "/users/login".into(), &headers, Some(body.clone()));
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    match (email, password) {
        ("a@x.com", "pw") => Json(json!({
            "user": {"_id": "1", "name": "Ada", "email": "a@x.com", "role": "instructor"},
            "token": INSTRUCTOR_TOKEN,
        })).into_response(),
        ("s@x.com", "pw") => Json(json!({
            "user": {"_id": "2", "name": "Sam", "email": "s@x.com", "role": "student"},
            "token": STUDENT_TOKEN,
        })).into_response(),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({"message": "Invalid email or password"}))).into_response(),
    }
}

async fn register(State(b): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("POST", "/users/register".into(), &headers, Some(body.clone()));
    if body["email"] == "taken@x.com" {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "User already exists"}))).into_response();
    }
    (StatusCode::CREATED, Json(json!({"message": "User registered successfully"}))).into_response()
}

async fn list_courses(State(b): State<Backend>, headers: HeaderMap) -> Response {
    b.record("GET", "/courses".into(), &headers, None);
    if !authorized(&headers) { return unauthorized(); }
    Json(json!([course("c1"), course("c2")])).into_response()
}

async fn get_course(State(b): State<Backend>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    b.record("GET", format!("/courses/{}", id), &headers, None);
    if id == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "Course not found"}))).into_response();
    }
    Json(course(&id)).into_response()
}

async fn create_course(State(b): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("POST", "/courses".into(), &headers, Some(body.clone()));
    if !authorized(&headers) { return unauthorized(); }
    let mut created = body;
    created["_id"] = json!("c9");
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn update_course(State(b): State<Backend>, headers: HeaderMap, Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    b.record("PUT", format!("/courses/{}", id), &headers, Some(body.clone()));
    if !authorized(&headers) { return unauthorized(); }
    Json(body).into_response()
}

async fn delete_course(State(b): State<Backend>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    b.record("DELETE", format!("/courses/{}", id), &headers, None);
    if !authorized(&headers) { return unauthorized(); }
    StatusCode::NO_CONTENT.into_response()
}

async fn lessons_by_course(State(b): State<Backend>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    b.record("GET", format!("/lessons/course/{}", id), &headers, None);
    if !authorized(&headers) { return unauthorized(); }
    Json(json!([
        {"_id": "l1", "title": "Getting started", "content": "Hello", "courseId": id},
        {"_id": "l2", "title": "Compost", "content": "Layers", "videoUrl": "https://video/2"},
    ])).into_response()
}

async fn create_lesson(State(b): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("POST", "/lessons".into(), &headers, Some(body.clone()));
    if !authorized(&headers) { return unauthorized(); }
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn get_lesson(State(b): State<Backend>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    b.record("GET", format!("/lessons/{}", id), &headers, None);
    if !authorized(&headers) { return unauthorized(); }
    Json(json!({"_id": id, "title": "One", "content": "x"})).into_response()
}

async fn update_lesson(State(b): State<Backend>, headers: HeaderMap, Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    b.record("PUT", format!("/lessons/{}", id), &headers, Some(body.clone()));
    if !authorized(&headers) { return unauthorized(); }
    Json(body).into_response()
}

async fn delete_lesson(State(b): State<Backend>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    b.record("DELETE", format!("/lessons/{}", id), &headers, None);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "database unavailable"}))).into_response()
}

pub async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/users/login", post(login))
        .route("/users/register", post(register))
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/{id}", get(get_course).put(update_course).delete(delete_course))
        .route("/lessons", post(create_lesson))
        .route("/lessons/course/{id}", get(lessons_by_course))
        .route("/lessons/{id}", get(get_lesson).put(update_lesson).delete(delete_lesson))
        .with_state(backend.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (format!("http://{}", addr), backend)
}
