//! Router-level tests against the memory store.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use comingsoon_site::config::SiteConfig;
use comingsoon_site::db::MemoryStore;
use comingsoon_site::state::AppState;

const TOKEN: &str = "route-test-admin-token-5f2c9a71";
const GOOGLEBOT: &str = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

fn app() -> Router {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(SiteConfig::for_memory(TOKEN), None, store.clone(), store);
    comingsoon_site::app(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-forwarded-for", "203.0.113.10")
        .body(Body::empty())
        .unwrap()
}

fn admin(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", "203.0.113.20")
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn subscribe_json(ip: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/subscribe")
        .header("x-forwarded-for", ip)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn json_body(response: Response) -> Value {
    serde_json::from_str(&text(response).await).unwrap()
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = app();

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "ok");

    let response = app.oneshot(get("/health/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_home_renders_defaults() {
    let response = app().oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert!(response.headers().contains_key(header::CONTENT_SECURITY_POLICY));
    let html = text(response).await;
    assert!(html.contains("<title>Coming Soon - IChanneTech</title>"));
    assert!(html.contains("data-countdown-target"));
    assert!(html.contains("<p>Lorem ipsum"));
}

#[tokio::test]
async fn test_subscribe_api_created_then_duplicate() {
    let app = app();

    let response = app
        .clone()
        .oneshot(subscribe_json(
            "198.51.100.1",
            &json!({"name": "Jane", "email": "jane@example.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(
        body["message"],
        "Thank you for subscribing! We'll keep you updated."
    );

    let response = app
        .oneshot(subscribe_json(
            "198.51.100.1",
            &json!({"name": "Janet", "email": "  JANE@Example.com "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "already_subscribed");
}

#[tokio::test]
async fn test_subscribe_api_validation() {
    let response = app()
        .oneshot(subscribe_json(
            "198.51.100.2",
            &json!({"name": "", "email": "not-an-email"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["code"], "validation");
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"email"));
}

#[tokio::test]
async fn test_subscribe_form_renders_result_page() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/subscribe")
        .header("x-forwarded-for", "198.51.100.3")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("name=Sam&email=sam%40example.com&phone="))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = text(response).await;
    assert!(html.contains("Thank you for subscribing!"));
}

#[tokio::test]
async fn test_subscribe_is_rate_limited_per_client() {
    let app = app();
    let mut statuses = Vec::new();
    for i in 0..8 {
        let response = app
            .clone()
            .oneshot(subscribe_json(
                "198.51.100.4",
                &json!({"name": "Flood", "email": format!("flood{i}@example.com")}),
            ))
            .await
            .unwrap();
        statuses.push(response.status());
    }

    assert_eq!(statuses[0], StatusCode::CREATED);
    assert!(statuses.contains(&StatusCode::TOO_MANY_REQUESTS));

    // Another client is unaffected
    let response = app
        .oneshot(subscribe_json(
            "198.51.100.5",
            &json!({"name": "Other", "email": "other@example.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_admin_requires_token() {
    let app = app();

    let response = app.clone().oneshot(get("/admin")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

    let response = app
        .clone()
        .oneshot(get("/api/admin/subscribers"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["code"], "unauthorized");

    let response = app
        .clone()
        .oneshot(admin(Method::GET, "/admin", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let basic = STANDARD.encode(format!("anyone:{TOKEN}"));
    let request = Request::builder()
        .uri("/admin/subscribers")
        .header(header::AUTHORIZATION, format!("Basic {basic}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_content_save_and_render() {
    let app = app();

    let response = app
        .clone()
        .oneshot(admin(
            Method::PUT,
            "/api/admin/content",
            Some(json!({"heading": "Launching in spring", "showCountdown": false})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["source"], "stored");
    assert_eq!(body["data"]["content"]["heading"], "Launching in spring");

    let response = app
        .clone()
        .oneshot(admin(Method::GET, "/api/admin/content", None))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["content"]["heading"], "Launching in spring");
    assert_eq!(body["content"]["subscribeButtonText"], "Subscribe");

    let html = text(app.oneshot(get("/")).await.unwrap()).await;
    assert!(html.contains("Launching in spring"));
    assert!(!html.contains("data-countdown-target"));
}

#[tokio::test]
async fn test_oversized_content_is_rejected_without_write() {
    let app = app();
    let huge = format!("data:image/png;base64,{}", "A".repeat(1_000_000));

    let response = app
        .clone()
        .oneshot(admin(
            Method::PUT,
            "/api/admin/content",
            Some(json!({"sideImageUrl": huge})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "too_large");

    let response = app
        .oneshot(admin(Method::GET, "/api/admin/content", None))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["source"], "defaults");
}

#[tokio::test]
async fn test_crawler_gets_route_seo() {
    let app = app();

    let response = app
        .clone()
        .oneshot(admin(
            Method::PUT,
            "/api/admin/seo/index",
            Some(json!({"title": "Launch Day", "description": "  "})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .uri("/")
        .header(header::USER_AGENT, GOOGLEBOT)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = text(response).await;
    assert!(html.contains("<title>Launch Day</title>"));
    assert!(html.contains(r#"<meta property="og:title" content="Launch Day""#));
    // Blank override fields fall back to the site-wide value
    assert!(html.contains("Our website is under construction. Subscribe to get notified"));

    let html = text(app.oneshot(get("/")).await.unwrap()).await;
    assert!(!html.contains("Launch Day"));
    assert!(!html.contains("og:title"));
}

#[tokio::test]
async fn test_seo_health_reports_selection() {
    let app = app();
    app.clone()
        .oneshot(admin(
            Method::PUT,
            "/api/admin/seo/about",
            Some(json!({"author": "Press Team"})),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(get("/seo-health?path=/About/"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["pathKey"], "about");
    assert_eq!(body["injectionEnabled"], true);
    assert_eq!(body["route"]["author"], "Press Team");
    assert_eq!(body["selected"]["author"], "Press Team");
    assert_eq!(body["selected"]["title"], "Coming Soon - IChanneTech");
}

#[tokio::test]
async fn test_og_image_headers() {
    let response = app()
        .oneshot(get("/og-image?title=Hello%20%26%20welcome&bg=%23000000"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "image/svg+xml; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=3600"
    );
    let svg = text(response).await;
    assert!(svg.contains("Hello &amp; welcome"));
    assert!(svg.contains("#000000"));
}

#[tokio::test]
async fn test_subscriber_admin_export_and_delete() {
    let app = app();
    for (ip, name, email) in [
        ("198.51.100.6", "Jane", "jane@example.com"),
        ("198.51.100.7", "Sam, Jr.", "sam@example.com"),
    ] {
        let response = app
            .clone()
            .oneshot(subscribe_json(ip, &json!({"name": name, "email": email})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(admin(Method::GET, "/admin/subscribers/export.csv", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_owned();
    assert!(disposition.starts_with("attachment; filename=\"subscribers-"));
    let csv = text(response).await;
    assert!(csv.starts_with("\"Name\",\"Email\",\"Phone\",\"Subscribed At\"\r\n"));
    assert!(csv.contains("\"Sam, Jr.\",\"sam@example.com\",\"\""));

    let response = app
        .clone()
        .oneshot(admin(Method::GET, "/api/admin/subscribers", None))
        .await
        .unwrap();
    let list = json_body(response).await;
    assert_eq!(list.as_array().unwrap().len(), 2);
    let id = list[0]["id"].as_str().unwrap().to_owned();

    let response = app
        .clone()
        .oneshot(admin(
            Method::DELETE,
            &format!("/api/admin/subscribers/{id}"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Deleting again is not an error
    let response = app
        .clone()
        .oneshot(admin(
            Method::DELETE,
            &format!("/api/admin/subscribers/{id}"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(admin(Method::GET, "/api/admin/subscribers", None))
        .await
        .unwrap();
    assert_eq!(json_body(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_admin_page_delete_redirects() {
    let app = app();
    app.clone()
        .oneshot(subscribe_json(
            "198.51.100.8",
            &json!({"name": "Jane", "email": "jane@example.com"}),
        ))
        .await
        .unwrap();
    let list = json_body(
        app.clone()
            .oneshot(admin(Method::GET, "/api/admin/subscribers", None))
            .await
            .unwrap(),
    )
    .await;
    let id = list[0]["id"].as_str().unwrap().to_owned();

    let response = app
        .oneshot(admin(
            Method::POST,
            &format!("/admin/subscribers/{id}/delete"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/admin/subscribers");
}

#[tokio::test]
async fn test_subscriber_stream_starts_with_snapshot() {
    let response = app()
        .oneshot(admin(Method::GET, "/api/admin/subscribers/stream", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );
    let frame = response.into_body().frame().await.unwrap().unwrap();
    let data = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
    assert!(data.contains("event: snapshot"));
    assert!(data.contains("data: []"));
}

#[tokio::test]
async fn test_subscribe_api_malformed_body() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/subscribe")
        .header("x-forwarded-for", "198.51.100.30")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name": "Jane", "email": "#))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "invalid_body");
}

#[tokio::test]
async fn test_admin_form_post_from_foreign_origin_is_refused() {
    let app = app();
    app.clone()
        .oneshot(subscribe_json(
            "198.51.100.31",
            &json!({"name": "Jane", "email": "jane@example.com"}),
        ))
        .await
        .unwrap();
    let list = json_body(
        app.clone()
            .oneshot(admin(Method::GET, "/api/admin/subscribers", None))
            .await
            .unwrap(),
    )
    .await;
    let id = list[0]["id"].as_str().unwrap().to_owned();
    let basic = STANDARD.encode(format!("admin:{TOKEN}"));

    let delete_from = |origin: &str| {
        Request::builder()
            .method(Method::POST)
            .uri(format!("/admin/subscribers/{id}/delete"))
            .header("x-forwarded-for", "203.0.113.21")
            .header(header::HOST, "soon.example.com")
            .header(header::ORIGIN, origin)
            .header(header::AUTHORIZATION, format!("Basic {basic}"))
            .body(Body::empty())
            .unwrap()
    };

    let response = app
        .clone()
        .oneshot(delete_from("https://attacker.example"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await["code"], "cross_origin");

    let remaining = json_body(
        app.clone()
            .oneshot(admin(Method::GET, "/api/admin/subscribers", None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(remaining.as_array().unwrap().len(), 1);

    let response = app
        .oneshot(delete_from("https://soon.example.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}
