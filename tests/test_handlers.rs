mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{create_test_app, MockResourceClient};
use kubevision::models::{DeploymentInfo, NamespaceInfo, PodInfo, ResourceKind};

#[tokio::test]
async fn test_list_nodes_returns_upstream_items() {
    let app = create_test_app(Some(MockResourceClient::with_nodes(&["n1", "n2"])));

    let response = app.server.get("/node").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let nodes = body["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0]["name"], "n1");
    assert_eq!(nodes[0]["ready"], true);
    assert!(nodes[0].get("internalIp").is_some());
}

#[tokio::test]
async fn test_every_resource_endpoint_returns_empty_array() {
    let app = create_test_app(Some(MockResourceClient::default()));

    for kind in ResourceKind::ALL {
        let response = app.server.get(kind.path()).await;
        assert_eq!(response.status_code(), StatusCode::OK, "GET {}", kind.path());

        let body: Value = response.json();
        let object = body.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(object[kind.collection_key()], json!([]));
    }
}

#[tokio::test]
async fn test_namespaced_resources_are_serialized_in_camel_case() {
    let client = MockResourceClient {
        namespaces: vec![NamespaceInfo {
            name: "default".to_string(),
            status: "Active".to_string(),
            ..Default::default()
        }],
        deployments: vec![DeploymentInfo {
            name: "web".to_string(),
            namespace: "prod".to_string(),
            replicas: 3,
            ready_replicas: 2,
            ..Default::default()
        }],
        pods: vec![PodInfo {
            name: "web-1".to_string(),
            namespace: "prod".to_string(),
            phase: "Running".to_string(),
            pod_ip: Some("10.1.0.7".to_string()),
            ..Default::default()
        }],
        ..Default::default()
    };
    let app = create_test_app(Some(client));

    let body: Value = app.server.get("/namespace").await.json();
    assert_eq!(body["namespaces"][0]["status"], "Active");

    let body: Value = app.server.get("/deployment").await.json();
    assert_eq!(body["deployments"][0]["readyReplicas"], 2);

    let body: Value = app.server.get("/pod").await.json();
    assert_eq!(body["pods"][0]["podIp"], "10.1.0.7");
    assert_eq!(body["pods"][0]["phase"], "Running");
}

#[tokio::test]
async fn test_upstream_failure_is_reported_as_server_error() {
    let app = create_test_app(Some(MockResourceClient::failing()));

    let response = app.server.get("/pod").await;

    assert!(response.status_code().is_server_error());
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_missing_default_client_is_reported_as_server_error() {
    let app = create_test_app(None);

    let response = app.server.get("/node").await;

    assert!(response.status_code().is_server_error());
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

mod action_tests {
    use super::*;

    #[tokio::test]
    async fn test_delete_node_label_calls_upstream_once() {
        let app = create_test_app(Some(MockResourceClient::with_nodes(&["n1"])));

        let response = app
            .server
            .post("/action")
            .json(&json!({"deleteLabel": {"kind": "node", "name": "n1", "label": "env"}}))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(response.text().is_empty());
        let client = app.default_client.unwrap();
        assert_eq!(
            client.deleted_labels(),
            vec![("n1".to_string(), "env".to_string())]
        );
    }

    #[tokio::test]
    async fn test_delete_label_for_other_kinds_is_a_noop() {
        let app = create_test_app(Some(MockResourceClient::default()));

        let response = app
            .server
            .post("/action")
            .json(&json!({"deleteLabel": {"kind": "pod", "name": "web-1", "label": "env"}}))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(app.default_client.unwrap().deleted_labels().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_kind_needs_no_upstream() {
        // No default client: a no-op action must not try to resolve one
        let app = create_test_app(None);

        let response = app
            .server
            .post("/action")
            .json(&json!({"deleteLabel": {"kind": "daemonset", "name": "agent", "label": "tier"}}))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_action_without_known_key_is_a_noop() {
        let app = create_test_app(Some(MockResourceClient::default()));

        let response = app.server.post("/action").json(&json!({"restart": {}})).await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(app.default_client.unwrap().deleted_labels().is_empty());
    }

    #[tokio::test]
    async fn test_delete_label_upstream_failure() {
        let app = create_test_app(Some(MockResourceClient::failing()));

        let response = app
            .server
            .post("/action")
            .json(&json!({"deleteLabel": {"kind": "node", "name": "n1", "label": "env"}}))
            .await;

        assert!(response.status_code().is_server_error());
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let app = create_test_app(Some(MockResourceClient::default()));

        let response = app
            .server
            .post("/action")
            .text("invalid json")
            .content_type("application/json")
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_plain_text_body_is_parsed_as_json() {
        let app = create_test_app(Some(MockResourceClient::default()));

        let response = app
            .server
            .post("/action")
            .text(r#"{"deleteLabel": {"kind": "node", "name": "n1", "label": "env"}}"#)
            .content_type("text/plain;charset=UTF-8")
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(
            app.default_client.unwrap().deleted_labels(),
            vec![("n1".to_string(), "env".to_string())]
        );
    }
}

mod cors_tests {
    use super::*;

    fn assert_cors_headers(response: &axum_test::TestResponse) {
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-headers"], "*");
        assert_eq!(
            headers["access-control-allow-methods"],
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(headers["access-control-max-age"], "1000");
    }

    #[tokio::test]
    async fn test_options_on_registered_paths() {
        let app = create_test_app(Some(MockResourceClient::default()));

        for path in ["/node", "/namespace", "/pod", "/action", "/cluster", "/cluster/abc"] {
            let response = app.server.method(Method::OPTIONS, path).await;
            assert_eq!(response.status_code(), StatusCode::NO_CONTENT, "OPTIONS {}", path);
            assert_cors_headers(&response);
        }
    }

    #[tokio::test]
    async fn test_cors_headers_on_success_and_error() {
        let app = create_test_app(Some(MockResourceClient::default()));

        let response = app.server.get("/daemonset").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_cors_headers(&response);

        let response = app.server.delete("/cluster/missing").await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_cors_headers(&response);
    }

    #[tokio::test]
    async fn test_content_type_is_json() {
        let app = create_test_app(Some(MockResourceClient::default()));

        let response = app.server.get("/node").await;
        let content_type = response.headers()["content-type"].to_str().unwrap();
        assert!(content_type.contains("application/json"));
    }
}

mod routing_tests {
    use super::*;

    #[tokio::test]
    async fn test_method_not_allowed() {
        let app = create_test_app(Some(MockResourceClient::default()));

        let response = app.server.post("/node").await;

        assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_not_found() {
        let app = create_test_app(Some(MockResourceClient::default()));

        let response = app.server.get("/nonexistent").await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_test_app(None);

        let response = app.server.get("/health").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "kubevision");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["timestamp"].is_number());
    }
}
