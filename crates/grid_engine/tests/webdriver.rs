use grid_engine::{ElementTarget, Page, PageError, RouterAttachment, WebDriverPage, WebDriverSettings};
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn page_for(server: &MockServer) -> WebDriverPage {
    WebDriverPage::new(WebDriverSettings::new(format!("{}/", server.uri()), "abc")).expect("client")
}

fn value(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "value": body }))
}

#[tokio::test]
async fn reads_address_and_title() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/session/abc/url"))
        .respond_with(value(json!("https://app.example.com/stock/about?cid=1")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/session/abc/title"))
        .respond_with(value(json!("$5.00 Widget Inc (WDGT)")))
        .mount(&server)
        .await;

    let page = page_for(&server).await;
    assert_eq!(
        page.current_url().await.unwrap(),
        "https://app.example.com/stock/about?cid=1"
    );
    assert_eq!(page.title().await.unwrap(), "$5.00 Widget Inc (WDGT)");
}

#[tokio::test]
async fn snapshot_executes_script_and_returns_markup() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/abc/execute/sync"))
        .and(body_string_contains("outerHTML"))
        .respond_with(value(json!("<html><body><table></table></body></html>")))
        .expect(1)
        .mount(&server)
        .await;

    let page = page_for(&server).await;
    assert_eq!(
        page.snapshot().await.unwrap(),
        "<html><body><table></table></body></html>"
    );
}

#[tokio::test]
async fn click_passes_selector_and_index() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/abc/execute/sync"))
        .and(body_partial_json(json!({ "args": [".v-list-item__title", 2] })))
        .respond_with(value(json!(true)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/abc/execute/sync"))
        .and(body_partial_json(json!({ "args": ["button", 9] })))
        .respond_with(value(json!(false)))
        .mount(&server)
        .await;

    let page = page_for(&server).await;
    page.click(&ElementTarget::new(".v-list-item__title", 2))
        .await
        .unwrap();
    let missing = page.click(&ElementTarget::new("button", 9)).await;
    assert!(matches!(
        missing,
        Err(PageError::ElementMissing { ref selector, index: 9 }) if selector == "button"
    ));
}

#[tokio::test]
async fn router_probe_distinguishes_absent_and_present() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/abc/execute/sync"))
        .and(body_string_contains("__vue__"))
        .respond_with(value(json!({ "hasPush": true, "current": "/stock/about" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/abc/execute/sync"))
        .and(body_string_contains("__vue_app__"))
        .respond_with(value(json!(null)))
        .mount(&server)
        .await;

    let page = page_for(&server).await;
    let attachments = RouterAttachment::defaults();

    let found = page.probe_router(&attachments[0]).await.unwrap().unwrap();
    assert!(found.has_push);
    assert_eq!(found.current_path.as_deref(), Some("/stock/about"));
    assert_eq!(page.probe_router(&attachments[1]).await.unwrap(), None);
}

#[tokio::test]
async fn webdriver_error_payloads_are_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/session/abc/url"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "value": { "error": "invalid session id", "message": "session deleted", "stacktrace": "" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/abc/execute/sync"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "value": { "error": "javascript error", "message": "NavigationDuplicated" }
        })))
        .mount(&server)
        .await;

    let page = page_for(&server).await;
    match page.current_url().await {
        Err(PageError::WebDriver { error, message }) => {
            assert_eq!(error, "invalid session id");
            assert_eq!(message, "session deleted");
        }
        other => panic!("unexpected {other:?}"),
    }

    let pushed = page
        .router_push(
            &RouterAttachment::defaults()[0],
            "/stock/financials",
            &[("tab".to_string(), "is".to_string())],
        )
        .await;
    assert!(matches!(pushed, Err(PageError::Script(ref m)) if m == "NavigationDuplicated"));
}

#[tokio::test]
async fn router_push_keeps_query_key_order_on_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/abc/execute/sync"))
        .and(body_string_contains(
            r#""args":["/stock/financials",[["cid","42"],["tid","7"],["tab","is"],["ref","abc"]]]"#,
        ))
        .and(body_string_contains("Object.fromEntries(arguments[1])"))
        .respond_with(value(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    let page = page_for(&server).await;
    page.router_push(
        &RouterAttachment::defaults()[0],
        "/stock/financials",
        &[
            ("cid".to_string(), "42".to_string()),
            ("tid".to_string(), "7".to_string()),
            ("tab".to_string(), "is".to_string()),
            ("ref".to_string(), "abc".to_string()),
        ],
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn non_json_body_is_a_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/session/abc/title"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let page = page_for(&server).await;
    assert!(matches!(page.title().await, Err(PageError::Protocol(_))));
}

#[tokio::test]
async fn clipboard_uses_async_script_and_reports_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/abc/execute/async"))
        .and(body_partial_json(json!({ "args": ["report"] })))
        .respond_with(value(json!(null)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/abc/execute/async"))
        .and(body_partial_json(json!({ "args": ["denied"] })))
        .respond_with(value(json!("NotAllowedError: Document is not focused.")))
        .mount(&server)
        .await;

    let page = page_for(&server).await;
    page.write_clipboard("report").await.unwrap();
    match page.write_clipboard("denied").await {
        Err(PageError::Clipboard(reason)) => assert!(reason.contains("not focused")),
        other => panic!("unexpected {other:?}"),
    }
}
