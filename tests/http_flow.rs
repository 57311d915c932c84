use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use biblecloud::catalog::Catalog;
use biblecloud::models::{Chapter, SessionUser};
use biblecloud::{auth, router, AppState, ReadStatus};
use http_body_util::BodyExt as _;
use tower::ServiceExt as _;

const EMAIL: &str = "ana@example.com";
const PASSWORD: &str = "secreto";

// ============================================================================
// Helpers
// ============================================================================

struct TestApp {
    state: Arc<AppState>,
    app: Router,
}

fn test_app() -> TestApp {
    let catalog_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("static")
        .join("bible_chapters.json");
    let catalog = Catalog::load(&catalog_path).unwrap();
    let db = sled::Config::new().temporary(true).open().unwrap();
    auth::create_user(&db, EMAIL, PASSWORD).unwrap();

    let state = Arc::new(AppState::with_parts(
        db,
        catalog,
        catalog_path,
        b"test-secret".to_vec(),
    ));
    TestApp {
        app: router(state.clone()),
        state,
    }
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn post_json(uri: &str, cookie: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, cookie)
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Log in and return the `name=value` cookie pair.
async fn login(app: &Router) -> String {
    let response = send(
        app,
        post_form("/login", None, "email=ana%40example.com&password=secreto"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn read_status(app: &Router, cookie: &str) -> ReadStatus {
    let response = send(app, get("/api/read-status", Some(cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    serde_json::from_str(&body_string(response).await).unwrap()
}

fn session_user(state: &AppState, cookie: &str) -> SessionUser {
    let token = cookie.split_once('=').unwrap().1;
    auth::verify_session(token, &state.secret).unwrap()
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn signed_out_pages_redirect_to_login() {
    let t = test_app();
    for uri in ["/", "/menu", "/chapter/genesis-1"] {
        let response = send(&t.app, get(uri, None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&response), "/login");
    }

    let response = send(&t.app, post_form("/chapter/genesis-1/read", None, "")).await;
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn signed_out_api_is_unauthorized() {
    let t = test_app();
    let response = send(&t.app, get("/api/read-status", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_errors_are_localized() {
    let t = test_app();

    let response = send(&t.app, post_form("/login", None, "email=ana%40example.com&password=nope")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Contraseña incorrecta"));

    let response = send(&t.app, post_form("/login", None, "email=nadie%40example.com&password=x")).await;
    assert!(body_string(response).await.contains("Usuario no encontrado"));

    let response = send(&t.app, post_form("/login", None, "email=ana&password=x")).await;
    assert!(body_string(response).await.contains("Formato de correo inválido"));
}

#[tokio::test]
async fn repeated_failures_lock_login() {
    let t = test_app();
    for _ in 0..5 {
        send(&t.app, post_form("/login", None, "email=ana%40example.com&password=nope")).await;
    }

    let response = send(&t.app, post_form("/login", None, "email=ana%40example.com&password=secreto")).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn login_page_redirects_when_signed_in() {
    let t = test_app();
    let cookie = login(&t.app).await;

    let response = send(&t.app, get("/login", Some(&cookie))).await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn logout_expires_cookie() {
    let t = test_app();
    let cookie = login(&t.app).await;

    let response = send(&t.app, get("/logout", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("biblecloud_session=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}

// ============================================================================
// Reading
// ============================================================================

#[tokio::test]
async fn list_shows_catalog_and_search() {
    let t = test_app();
    let cookie = login(&t.app).await;

    let response = send(&t.app, get("/", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("1189 capítulos · 0 leídos"));

    let response = send(&t.app, get("/?q=exo", Some(&cookie))).await;
    let html = body_string(response).await;
    assert!(html.contains("40 capítulos"));
    assert!(html.contains("Éxodo 2"));
    assert!(!html.contains("Génesis 1"));
}

#[tokio::test]
async fn mark_read_twice_keeps_history() {
    let t = test_app();
    let cookie = login(&t.app).await;

    let response = send(&t.app, post_form("/chapter/exodo-2/read", Some(&cookie), "q=exo")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/?q=exo#exodo-2");

    send(&t.app, post_form("/chapter/exodo-2/read", Some(&cookie), "q=")).await;

    let status = read_status(&t.app, &cookie).await;
    assert_eq!(status.len(), 1);

    let user = session_user(&t.state, &cookie);
    let chapter = t.state.catalog.get("exodo-2").unwrap();
    let record = t.state.reading.record(Some(&user), chapter).await.unwrap().unwrap();
    assert_eq!(record.all_timestamps.len(), 2);
    assert_eq!(record.latest_read_timestamp, record.all_timestamps[0]);
    assert!(record.all_timestamps[0] >= record.all_timestamps[1]);
    assert_eq!(status["exodo-2"].latest_read_timestamp, record.latest_read_timestamp);

    let html = body_string(send(&t.app, get("/", Some(&cookie))).await).await;
    assert!(html.contains("1 leídos"));
}

#[tokio::test]
async fn saving_notes_marks_chapter_read() {
    let t = test_app();
    let cookie = login(&t.app).await;

    let response = send(&t.app, post_form("/chapter/rut-1/notes", Some(&cookie), "notes=Noem%C3%AD+y+Rut")).await;
    assert_eq!(location(&response), "/chapter/rut-1?saved=1");

    let html = body_string(send(&t.app, get("/chapter/rut-1?saved=1", Some(&cookie))).await).await;
    assert!(html.contains("Notas guardadas!"));
    assert!(html.contains("Noemí y Rut"));

    let status = read_status(&t.app, &cookie).await;
    assert_eq!(status["rut-1"].notes, "Noemí y Rut");
}

#[tokio::test]
async fn mark_unread_requires_confirmation() {
    let t = test_app();
    let cookie = login(&t.app).await;
    send(&t.app, post_form("/chapter/juan-3/read", Some(&cookie), "")).await;

    // Confirm without a request is refused and nothing is deleted.
    let response = send(&t.app, post_form("/chapter/juan-3/unread/confirm", Some(&cookie), "")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(read_status(&t.app, &cookie).await.contains_key("juan-3"));

    let response = send(&t.app, post_form("/chapter/juan-3/unread", Some(&cookie), "")).await;
    assert_eq!(location(&response), "/chapter/juan-3");
    let html = body_string(send(&t.app, get("/chapter/juan-3", Some(&cookie))).await).await;
    assert!(html.contains("¿Seguro? Se borrará el historial y las notas."));

    let response = send(&t.app, post_form("/chapter/juan-3/unread/confirm", Some(&cookie), "")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(!read_status(&t.app, &cookie).await.contains_key("juan-3"));
}

#[tokio::test]
async fn cancel_keeps_record() {
    let t = test_app();
    let cookie = login(&t.app).await;
    send(&t.app, post_form("/chapter/juan-3/read", Some(&cookie), "")).await;

    send(&t.app, post_form("/chapter/juan-3/unread", Some(&cookie), "")).await;
    send(&t.app, post_form("/chapter/juan-3/unread/cancel", Some(&cookie), "")).await;

    let html = body_string(send(&t.app, get("/chapter/juan-3", Some(&cookie))).await).await;
    assert!(!html.contains("¿Seguro?"));
    let response = send(&t.app, post_form("/chapter/juan-3/unread/confirm", Some(&cookie), "")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(read_status(&t.app, &cookie).await.contains_key("juan-3"));
}

#[tokio::test]
async fn unknown_chapter_is_not_found() {
    let t = test_app();
    let cookie = login(&t.app).await;

    let response = send(&t.app, get("/chapter/tobias-1", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&t.app, post_form("/chapter/tobias-1/read", Some(&cookie), "")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// JSON API
// ============================================================================

#[tokio::test]
async fn api_chapters_filters() {
    let t = test_app();
    let response = send(&t.app, get("/api/chapters?q=abd%C3%ADas", None)).await;
    let chapters: Vec<Chapter> = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(chapters.len(), 1);
    assert_eq!(chapters[0].id, "abdias-1");
}

#[tokio::test]
async fn api_actions_return_reconciled_status() {
    let t = test_app();
    let cookie = login(&t.app).await;

    let response = send(&t.app, post_json("/api/chapter/salmos-23/read", &cookie, "")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let status: ReadStatus = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(status.contains_key("salmos-23"));

    let response = send(
        &t.app,
        post_json("/api/chapter/salmos-23/notes", &cookie, r#"{"notes":"El Señor es mi pastor"}"#),
    )
    .await;
    let status: ReadStatus = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(status["salmos-23"].notes, "El Señor es mi pastor");

    let response = send(&t.app, post_json("/api/chapter/salmos-23/unread", &cookie, r#"{"confirm":true}"#)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = send(&t.app, post_json("/api/chapter/salmos-23/unread", &cookie, r#"{"confirm":false}"#)).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = send(&t.app, post_json("/api/chapter/salmos-23/unread", &cookie, r#"{"confirm":true}"#)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let status: ReadStatus = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(!status.contains_key("salmos-23"));
}

#[tokio::test]
async fn static_catalog_is_served() {
    let t = test_app();
    let response = send(&t.app, get("/bible_chapters.json", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let chapters: Vec<Chapter> = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(chapters.len(), 1189);
}
