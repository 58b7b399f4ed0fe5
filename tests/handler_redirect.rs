mod common;

use axum_test::TestServer;
use redirector::config::Config;
use redirector::domain::entities::Mapping;
use redirector::domain::template::ViewBag;
use redirector::routes::redirect_router;

async fn server_with(config: Config, mappings: &[Mapping]) -> (tempfile::TempDir, TestServer) {
    let (dir, store) = common::open_temp_store().await;
    common::seed(store.as_ref(), mappings).await;

    let state = common::create_test_state(store, &config);
    let server = TestServer::new(redirect_router(state)).unwrap();
    (dir, server)
}

#[tokio::test]
async fn test_redirect_temporary() {
    let (_dir, server) =
        server_with(common::test_config(), &[Mapping::new("/x", "/y", false)]).await;

    let response = server.get("/x").await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(response.header("location"), "/y");
    assert_eq!(response.header("x-content-type-options"), "nosniff");
    assert!(
        response
            .header("content-type")
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    assert!(response.text().contains("307 Temporary Redirect"));
}

#[tokio::test]
async fn test_redirect_permanent() {
    let (_dir, server) =
        server_with(common::test_config(), &[Mapping::new("/x", "/y", true)]).await;

    let response = server.get("/x").await;

    assert_eq!(response.status_code(), 308);
    assert_eq!(response.header("location"), "/y");
}

#[tokio::test]
async fn test_any_method_redirects() {
    let (_dir, server) =
        server_with(common::test_config(), &[Mapping::new("/x", "/y", false)]).await;

    assert_eq!(server.post("/x").await.status_code(), 307);
    assert_eq!(server.delete("/x").await.status_code(), 307);
}

#[tokio::test]
async fn test_redirect_not_found() {
    let (_dir, server) = server_with(common::test_config(), &[]).await;

    let response = server.get("/missing").await;

    response.assert_status_not_found();
    assert_eq!(response.header("x-content-type-options"), "nosniff");
    assert!(response.text().contains("404 Not Found"));
}

#[tokio::test]
async fn test_default_key_fallback() {
    let config = Config {
        default_key: Some("/default".to_string()),
        ..common::test_config()
    };
    let (_dir, server) = server_with(
        config,
        &[
            Mapping::new("/default", "/home", true),
            Mapping::new("/x", "/y", false),
        ],
    )
    .await;

    let fallback = server.get("/unmapped").await;
    assert_eq!(fallback.status_code(), 308);
    assert_eq!(fallback.header("location"), "/home");

    let mapped = server.get("/x").await;
    assert_eq!(mapped.status_code(), 307);
    assert_eq!(mapped.header("location"), "/y");
}

#[tokio::test]
async fn test_template_destination() {
    let config = Config {
        default_key: Some("/default".to_string()),
        view_bag: ViewBag::new().with("Env", "prod"),
        ..common::test_config()
    };
    let (_dir, server) = server_with(
        config,
        &[Mapping::new(
            "/default",
            "https://example.com/?from={{ .Key }}&env={{ .Env }}",
            false,
        )],
    )
    .await;

    let response = server.get("/old/page").await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(
        response.header("location"),
        "https://example.com/?from=/old/page&env=prod"
    );
}

#[tokio::test]
async fn test_broken_template_is_internal_error() {
    let (_dir, server) = server_with(
        common::test_config(),
        &[Mapping::new("/t", "/{{ .Missing }}", false)],
    )
    .await;

    let response = server.get("/t").await;

    assert_eq!(response.status_code(), 500);
    let body = response.text();
    assert!(body.contains("500 Internal Server Error"));
    assert!(!body.contains("Missing"));
}

#[tokio::test]
async fn test_destination_prefix() {
    let config = Config {
        destination_prefix: Some("https://example.com".to_string()),
        ..common::test_config()
    };
    let (_dir, server) = server_with(config, &[Mapping::new("/x", "/y", false)]).await;

    let response = server.get("/x").await;

    assert_eq!(response.header("location"), "https://example.com/y");
}

#[tokio::test]
async fn test_param_key_builder() {
    let config = Config {
        key_builder: "param:key".to_string(),
        ..common::test_config()
    };
    let (_dir, server) = server_with(config, &[Mapping::new("X", "/target", false)]).await;

    let found = server.get("/").add_query_param("key", "X").await;
    assert_eq!(found.status_code(), 307);
    assert_eq!(found.header("location"), "/target");

    server.get("/").await.assert_status_not_found();
}

#[tokio::test]
async fn test_param_key_builder_missing_uses_default() {
    let config = Config {
        key_builder: "param:key".to_string(),
        default_key: Some("/default".to_string()),
        ..common::test_config()
    };
    let (_dir, server) =
        server_with(config, &[Mapping::new("/default", "/home", false)]).await;

    let response = server.get("/").await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(response.header("location"), "/home");
}
