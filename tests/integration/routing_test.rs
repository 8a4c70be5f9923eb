use super::common::TestProxy;
use reqwest::{Method, StatusCode};
use serde_json::Value;

#[test_log::test(tokio::test)]
async fn openai_model_is_forwarded_to_openai() {
    let proxy = TestProxy::start(None).await;
    let body = r#"{"model": "gpt-4o", "messages": []}"#;

    let response = proxy
        .request(Method::POST, "/v1/chat/completions?trace=1&a=%20b")
        .header("content-type", "application/json")
        .header("x-client", "integration")
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-upstream"], "openai");
    assert!(proxy.ollama.requests().is_empty());

    let seen = proxy.openai.only_request();
    assert_eq!(seen.method, Method::POST);
    assert_eq!(
        seen.uri.path_and_query().unwrap().as_str(),
        "/v1/chat/completions?trace=1&a=%20b"
    );
    assert_eq!(seen.body, body.as_bytes());
    assert_eq!(seen.headers["x-client"], "integration");
    assert_eq!(seen.headers["content-type"], "application/json");
}

#[tokio::test]
async fn local_model_is_forwarded_to_ollama() {
    let proxy = TestProxy::start(None).await;

    let response = proxy
        .request(Method::POST, "/api/chat")
        .body(r#"{"model": "llama3", "messages": []}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["upstream"], "ollama");
    assert!(proxy.openai.requests().is_empty());
    assert_eq!(proxy.ollama.only_request().uri.path(), "/api/chat");
}

#[tokio::test]
async fn body_is_forwarded_byte_for_byte() {
    let proxy = TestProxy::start(None).await;
    // field order, spacing and unknown fields must all survive inspection
    let body = "{\n  \"stream\" : true,\"model\":\"mistral\" , \"extra\": {\"k\": [1, 2.50]}\n}";

    proxy
        .request(Method::POST, "/v1/chat/completions")
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(proxy.ollama.only_request().body, body.as_bytes());
}

#[tokio::test]
async fn post_without_model_is_rejected_before_forwarding() {
    let proxy = TestProxy::start(None).await;

    for body in ["{}", r#"{"model": 7}"#, "[]", "not json", ""] {
        let response = proxy
            .request(Method::POST, "/v1/chat/completions")
            .body(body)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {:?}", body);
        let json: Value = response.json().await.unwrap();
        assert_eq!(json["error"]["type"], "bad_request");
    }

    assert_eq!(proxy.upstream_calls(), 0);
}

#[tokio::test]
async fn get_always_goes_to_ollama() {
    let proxy = TestProxy::start(None).await;

    let response = proxy
        .request(Method::GET, "/v1/models?x=1")
        .body(r#"{"model": "gpt-4o"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(proxy.openai.requests().is_empty());

    let seen = proxy.ollama.only_request();
    assert_eq!(seen.method, Method::GET);
    assert_eq!(seen.uri.path_and_query().unwrap().as_str(), "/v1/models?x=1");
}

#[tokio::test]
async fn root_path_and_encoded_segments_are_preserved() {
    let proxy = TestProxy::start(None).await;

    proxy.request(Method::GET, "/").send().await.unwrap();
    proxy
        .request(Method::GET, "/api/show/my%2Fmodel%20name/?q=%E2%9C%93&")
        .send()
        .await
        .unwrap();

    let seen: Vec<String> = proxy
        .ollama
        .requests()
        .iter()
        .map(|r| r.uri.path_and_query().unwrap().as_str().to_string())
        .collect();
    assert_eq!(seen, ["/", "/api/show/my%2Fmodel%20name/?q=%E2%9C%93&"]);
}

#[tokio::test]
async fn host_header_is_forced_to_ollama_even_for_openai() {
    let proxy = TestProxy::start(None).await;
    let ollama_host = proxy.ollama.addr.to_string();

    proxy
        .request(Method::POST, "/v1/chat/completions")
        .body(r#"{"model": "gpt-4o-mini"}"#)
        .send()
        .await
        .unwrap();
    proxy.request(Method::GET, "/api/tags").send().await.unwrap();

    assert_eq!(proxy.openai.only_request().host(), Some(ollama_host.as_str()));
    assert_eq!(proxy.ollama.only_request().host(), Some(ollama_host.as_str()));
}

#[tokio::test]
async fn host_header_can_follow_the_selected_target() {
    let proxy = TestProxy::start_with(None, |config| config.with_host_header_from_target(true)).await;

    proxy
        .request(Method::POST, "/v1/chat/completions")
        .body(r#"{"model": "gpt-4o-mini"}"#)
        .send()
        .await
        .unwrap();

    let openai_host = proxy.openai.addr.to_string();
    assert_eq!(proxy.openai.only_request().host(), Some(openai_host.as_str()));
}

#[tokio::test]
async fn custom_classifier_changes_routing() {
    let proxy = TestProxy::start_with(None, |config| {
        config.with_classifier(model_router_proxy::ModelClassifier::from_list("llama"))
    })
    .await;

    proxy
        .request(Method::POST, "/v1/chat/completions")
        .body(r#"{"model": "llama3"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(proxy.openai.requests().len(), 1);
    assert!(proxy.ollama.requests().is_empty());
}

#[tokio::test]
async fn unsupported_method_is_not_forwarded() {
    let proxy = TestProxy::start(None).await;

    let response = proxy
        .request(Method::DELETE, "/api/delete")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(proxy.upstream_calls(), 0);
}
