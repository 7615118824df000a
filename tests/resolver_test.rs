use mockito::Matcher;
use serde_json::json;

use linkclean_api::resolver::{ResolutionError, ResolverClient, ResolverConfig};

fn client_for(server: &mockito::ServerGuard) -> ResolverClient {
    ResolverClient::new(ResolverConfig::new(format!("{}/", server.url()))).unwrap()
}

fn resolution_body(original: &str, expanded: &str, chain: Vec<&str>) -> String {
    json!({
        "original": original,
        "expanded": expanded,
        "redirectChain": chain,
        "redirectCount": chain.len().saturating_sub(1),
        "title": "Destination",
        "timestamp": "2025-06-01T12:00:00Z",
    })
    .to_string()
}

#[tokio::test]
async fn test_resolve_success_cleans_expanded_url() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/")
        .match_query(Matcher::UrlEncoded(
            "url".into(),
            "https://short.example/a".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(resolution_body(
            "https://short.example/a",
            "https://dest.example/article?utm_source=share&utm_medium=social",
            vec!["https://short.example/a", "https://dest.example/article"],
        ))
        .create_async()
        .await;

    let client = client_for(&server);
    let resolved = client.resolve("https://short.example/a").await.unwrap();

    // The expanded destination comes back already stripped of tracking
    assert_eq!(resolved.expanded, "https://dest.example/article");
    assert_eq!(resolved.original, "https://short.example/a");
    assert_eq!(resolved.redirect_chain.len(), 2);
    assert_eq!(resolved.redirect_count, 1);
    assert_eq!(resolved.title, "Destination");
}

#[tokio::test]
async fn test_resolve_maps_non_success_to_status_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(502)
        .with_body("bad gateway")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.resolve("https://short.example/x").await.unwrap_err();

    match err {
        ResolutionError::Status { status, message } => {
            assert_eq!(status, 502);
            assert!(message.contains("bad gateway"));
        }
        other => panic!("expected Status error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_resolve_maps_undecodable_body_to_body_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("this is not json")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.resolve("https://short.example/x").await.unwrap_err();

    assert!(matches!(err, ResolutionError::Body(_)));
}

#[tokio::test]
async fn test_batch_preserves_input_order_and_isolates_failures() {
    let mut server = mockito::Server::new_async().await;

    let _ok_a = server
        .mock("GET", "/")
        .match_query(Matcher::UrlEncoded(
            "url".into(),
            "https://short.example/a".into(),
        ))
        .with_status(200)
        .with_body(resolution_body(
            "https://short.example/a",
            "https://dest.example/a",
            vec!["https://short.example/a", "https://dest.example/a"],
        ))
        .create_async()
        .await;

    let _broken_b = server
        .mock("GET", "/")
        .match_query(Matcher::UrlEncoded(
            "url".into(),
            "https://short.example/b".into(),
        ))
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let _ok_c = server
        .mock("GET", "/")
        .match_query(Matcher::UrlEncoded(
            "url".into(),
            "https://short.example/c".into(),
        ))
        .with_status(200)
        .with_body(resolution_body(
            "https://short.example/c",
            "https://dest.example/c",
            vec!["https://short.example/c", "https://dest.example/c"],
        ))
        .create_async()
        .await;

    let client = client_for(&server);
    let urls = vec![
        "https://short.example/a".to_string(),
        "https://short.example/b".to_string(),
        "https://short.example/c".to_string(),
    ];
    let outcomes = client.expand_urls(&urls).await;

    // One outcome per input, at the input's index
    assert_eq!(outcomes.len(), 3);
    for (outcome, url) in outcomes.iter().zip(&urls) {
        assert_eq!(&outcome.original, url);
    }

    // The failure in the middle never disturbs its siblings
    assert!(outcomes[0].is_resolved());
    assert!(!outcomes[1].is_resolved());
    assert!(outcomes[2].is_resolved());

    assert_eq!(outcomes[0].replacement(), "https://dest.example/a");
    assert_eq!(outcomes[1].replacement(), "https://short.example/b");
    assert!(outcomes[1].error.as_ref().unwrap().contains("500"));
    assert_eq!(outcomes[2].replacement(), "https://dest.example/c");
}

#[tokio::test]
async fn test_empty_batch_makes_no_network_call() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server);
    let outcomes = client.expand_urls(&[]).await;

    assert!(outcomes.is_empty());
    mock.assert_async().await;
}
