use std::any::Any;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Method, Request, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::warn;

use crate::{error::AppError, state::SharedState};

pub mod admin;
pub mod docs;
pub mod health;
pub mod public;

/// Every path below this prefix requires the admin credential.
const ADMIN_PATH_PREFIX: &str = "/api/admin/";
const ADMIN_AUTH_HEADER: &str = "x-admin-auth";
const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, X-Admin-Auth";

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(public::router())
        .merge(admin::router(state.config().max_upload_bytes))
        .merge(docs::router())
        .fallback(endpoint_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin_auth,
        ))
        .with_state(state)
}

/// Full application: routes plus the cross-cutting HTTP layers.
pub fn app(state: SharedState) -> Router<()> {
    router(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer())
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ))
        .layer(TraceLayer::new_for_http())
}

/// Any origin; OPTIONS requests are answered here with an empty 200.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(ADMIN_AUTH_HEADER),
        ])
}

/// Reject admin paths, known or not, unless the credential header matches.
async fn require_admin_auth(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if !req.uri().path().starts_with(ADMIN_PATH_PREFIX) {
        return Ok(next.run(req).await);
    }

    let authorized = req
        .headers()
        .get(ADMIN_AUTH_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == state.config().admin_token);

    if !authorized {
        warn!(path = %req.uri().path(), "rejected admin request");
        return Err(AppError::Unauthorized("unauthorized access".into()));
    }

    Ok(next.run(req).await)
}

async fn endpoint_not_found() -> AppError {
    AppError::NotFound("endpoint not found".into())
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".into());

    AppError::Internal(format!("handler panicked: {detail}")).into_response()
}

#[cfg(test)]
mod tests {
    use axum::{body::to_bytes, http::StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::{AppConfig, StorageBackend},
        state::AppState,
    };

    const BOUNDARY: &str = "mod-hub-boundary";
    const MIB: usize = 1024 * 1024;

    async fn test_app() -> Router {
        app(AppState::in_memory(AppConfig::default()).await)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn admin_json(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(ADMIN_AUTH_HEADER, "true")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn admin_get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(ADMIN_AUTH_HEADER, "true")
            .body(Body::empty())
            .unwrap()
    }

    fn post(uri: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    /// Multipart form whose parts are `(name, file name, content length)`.
    fn multipart(parts: &[(&str, Option<&str>, usize)]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, file_name, len) in parts {
            let disposition = match file_name {
                Some(file_name) => format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: image/png\r\n"
                ),
                None => format!("Content-Disposition: form-data; name=\"{name}\"\r\n"),
            };
            body.extend_from_slice(format!("--{BOUNDARY}\r\n{disposition}\r\n").as_bytes());
            body.extend(std::iter::repeat_n(b'x', *len));
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/api/admin/upload")
            .header(ADMIN_AUTH_HEADER, "true")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn upload(field: &str, file_name: &str) -> Request<Body> {
        multipart(&[(field, Some(file_name), 3)])
    }

    fn mod_body(name: &str) -> Value {
        json!({
            "name": name,
            "description": "d",
            "version": "1.0",
            "downloadUrl": "http://x",
        })
    }

    #[tokio::test]
    async fn create_mod_returns_enveloped_record() {
        let app = test_app().await;

        let (status, body) = send(
            &app,
            admin_json(Method::POST, "/api/admin/mods", mod_body("A")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "mod created");
        assert!(!body["data"]["mod"]["id"].as_str().unwrap().is_empty());
        assert_eq!(body["data"]["mod"]["downloads"], 0);
        assert_eq!(body["data"]["mod"]["featured"], false);
        assert_eq!(body["data"]["mod"]["image"], "");
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let app = test_app().await;

        let (status, body) = send(
            &app,
            admin_json(Method::POST, "/api/admin/mods", mod_body("")),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "mod name must not be empty");
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let app = test_app().await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/admin/mods")
            .header(ADMIN_AUTH_HEADER, "true")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn admin_routes_require_matching_header() {
        let app = test_app().await;

        let request = Request::builder()
            .uri("/api/admin/mods")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized access");

        let request = Request::builder()
            .uri("/api/admin/mods")
            .header(ADMIN_AUTH_HEADER, "false")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_admin_path_checks_auth_before_routing() {
        let app = test_app().await;

        let request = Request::builder()
            .uri("/api/admin/nothing")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, admin_get("/api/admin/nothing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "endpoint not found");
    }

    #[tokio::test]
    async fn unknown_download_id_answers_placeholder() {
        let app = test_app().await;

        let (status, body) = send(&app, post("/api/mods/doesnotexist/download")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["downloadUrl"], "#");
    }

    #[tokio::test]
    async fn downloads_show_up_in_stats_and_activities() {
        let app = test_app().await;
        let (_, created) = send(
            &app,
            admin_json(Method::POST, "/api/admin/mods", mod_body("A")),
        )
        .await;
        let id = created["data"]["mod"]["id"].as_str().unwrap().to_owned();

        let uri = format!("/api/mods/{id}/download");
        let (_, body) = send(&app, post(&uri)).await;
        assert_eq!(body["data"]["downloadUrl"], "http://x");
        send(&app, post(&uri)).await;

        let request = Request::builder()
            .uri("/api/stats")
            .body(Body::empty())
            .unwrap();
        let (status, stats) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["data"]["totalMods"], 1);
        assert_eq!(stats["data"]["totalDownloads"], 2);
        assert_eq!(stats["data"]["todayDownloads"], 2);

        let (_, admin_stats) = send(&app, admin_get("/api/admin/stats")).await;
        assert_eq!(admin_stats["data"], stats["data"]);

        let (_, activities) = send(&app, admin_get("/api/admin/activities")).await;
        let activities = activities["data"]["activities"].as_array().unwrap();
        assert_eq!(activities.len(), 3);
        assert_eq!(activities[0]["action"], "download");
        assert_eq!(activities[2]["action"], "create");
    }

    #[tokio::test]
    async fn featured_filter_only_applies_to_literal_true() {
        let app = test_app().await;
        let mut featured = mod_body("F");
        featured["featured"] = json!(true);
        send(&app, admin_json(Method::POST, "/api/admin/mods", featured)).await;
        send(
            &app,
            admin_json(Method::POST, "/api/admin/mods", mod_body("P")),
        )
        .await;

        let get = |uri: &str| {
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .unwrap()
        };
        let (_, body) = send(&app, get("/api/mods?featured=true")).await;
        assert_eq!(body["data"]["mods"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"]["mods"][0]["name"], "F");

        let (_, body) = send(&app, get("/api/mods?featured=yes")).await;
        assert_eq!(body["data"]["mods"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_and_delete_flow() {
        let app = test_app().await;
        let (_, created) = send(
            &app,
            admin_json(Method::POST, "/api/admin/mods", mod_body("A")),
        )
        .await;
        let id = created["data"]["mod"]["id"].as_str().unwrap().to_owned();
        let uri = format!("/api/admin/mods/{id}");

        let (status, body) = send(&app, admin_json(Method::PUT, &uri, mod_body("B"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "mod updated");
        assert_eq!(body["data"]["mod"]["name"], "B");
        assert_eq!(body["data"]["mod"]["id"], id.as_str());

        let delete = || {
            Request::builder()
                .method(Method::DELETE)
                .uri(&uri)
                .header(ADMIN_AUTH_HEADER, "true")
                .body(Body::empty())
                .unwrap()
        };
        let (status, body) = send(&app, delete()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "mod deleted");
        assert!(body.get("data").is_none());

        let (status, body) = send(&app, delete()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "mod not found");

        let (status, _) = send(&app, admin_json(Method::PUT, &uri, mod_body("C"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn upload_registers_image() {
        let app = test_app().await;

        let (status, body) = send(&app, upload("image", "cover.png")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "image uploaded");
        assert_eq!(body["data"]["image"]["name"], "cover.png");
        assert_eq!(body["data"]["image"]["size"], 0);

        let (_, listed) = send(&app, admin_get("/api/admin/images")).await;
        assert_eq!(listed["data"]["images"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upload_without_image_part_is_rejected() {
        let app = test_app().await;

        let (status, body) = send(&app, upload("attachment", "cover.png")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "no file uploaded");
    }

    #[tokio::test]
    async fn upload_accepts_files_over_default_body_limit() {
        let app = test_app().await;

        let (status, body) = send(&app, multipart(&[("image", Some("x.png"), 3 * MIB)])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["image"]["name"], "x.png");

        let form = multipart(&[("note", None, 3 * MIB), ("image", Some("small.png"), 16)]);
        let (status, body) = send(&app, form).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["image"]["name"], "small.png");
    }

    #[tokio::test]
    async fn upload_over_configured_limit_is_payload_too_large() {
        let config = AppConfig {
            max_upload_bytes: 1024,
            ..AppConfig::default()
        };
        let app = app(AppState::in_memory(config).await);

        let (status, body) = send(&app, multipart(&[("image", Some("x.png"), 4096)])).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["success"], false);

        let (_, listed) = send(&app, admin_get("/api/admin/images")).await;
        assert!(listed["data"]["images"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn mod_body_is_parsed_without_content_type() {
        let app = test_app().await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/admin/mods")
            .header(ADMIN_AUTH_HEADER, "true")
            .body(Body::from(mod_body("Plain").to_string()))
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["mod"]["name"], "Plain");
    }

    #[tokio::test]
    async fn unknown_path_and_wrong_method() {
        let app = test_app().await;

        let request = Request::builder()
            .uri("/nowhere")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "endpoint not found");

        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/api/mods")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "method not allowed");
    }

    #[tokio::test]
    async fn preflight_short_circuits_with_cors_headers() {
        let app = test_app().await;
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/admin/mods")
            .header(header::ORIGIN, "https://mods.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], ALLOWED_METHODS);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], ALLOWED_HEADERS);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn regular_responses_carry_cors_headers() {
        let app = test_app().await;
        let request = Request::builder()
            .uri("/nowhere")
            .header(header::ORIGIN, "https://mods.example")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], ALLOWED_METHODS);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], ALLOWED_HEADERS);
    }

    #[tokio::test]
    async fn banner_and_health_are_not_enveloped() {
        let app = test_app().await;
        let get = |uri: &str| {
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .unwrap()
        };

        let (status, body) = send(&app, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body.get("success").is_none());

        let (_, body) = send(&app, get("/healthcheck")).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn degraded_state_answers_service_unavailable() {
        let app = app(AppState::new(AppConfig::default(), StorageBackend::Memory));
        let request = Request::builder()
            .uri("/api/mods")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn panics_become_generic_internal_errors() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "internal server error");
    }
}
