//! Full store lifecycle against the live mock store.
//!
//! # Design
//! Starts the mock store on a random port, then exercises every core client
//! operation over real HTTP using ureq. Validates that the core's request
//! building and response parsing work end-to-end with the actual server.

use todo_core::{ApiError, Credentials, HttpMethod, HttpResponse, Item, Query, Script, StoreClient};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation.
fn execute(req: todo_core::HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match req.method {
        HttpMethod::Get => {
            let mut builder = agent.get(&req.path);
            for (name, value) in &req.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder.call()
        }
        HttpMethod::Post => {
            let mut builder = agent.post(&req.path);
            for (name, value) in &req.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            match &req.body {
                Some(body) => builder.send(body.as_bytes()),
                None => builder.send_empty(),
            }
        }
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

/// Start the mock store on a random port and return its base URL.
fn start_store(credentials: Option<mock_store::Credentials>) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_store::run(listener, credentials).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn texts(client: &StoreClient, query: &Query) -> Vec<String> {
    let req = client.build_search(query, 100).unwrap();
    let resp = client.parse_search(execute(req)).unwrap();
    resp.items().map(|item| item.to_string()).collect()
}

#[test]
fn store_lifecycle() {
    let client = StoreClient::new(&start_store(None), "todo");

    // Step 1: search before anything was indexed, so the index does not exist.
    let req = client.build_search(&Query::MatchAll, 100).unwrap();
    let err = client.parse_search(execute(req)).unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.error_type(), Some("index_not_found_exception"));

    // Step 2: index two items.
    for text in ["buy milk", "walk dog"] {
        let req = client.build_index(&Item::new(text)).unwrap();
        let created = client.parse_index(execute(req)).unwrap();
        assert_eq!(created.index, "todo");
        assert_eq!(created.result, "created");
        assert!(!created.id.is_empty());
    }

    // Step 3: term search finds one, match-all finds both.
    assert_eq!(texts(&client, &Query::text("milk")), vec!["[ ] buy milk"]);
    assert_eq!(
        texts(&client, &Query::MatchAll),
        vec!["[ ] buy milk", "[ ] walk dog"]
    );

    // Step 4: check by term.
    let req = client
        .build_update_by_query(&Query::text("milk"), &Script::check())
        .unwrap();
    let updated = client.parse_update_by_query(execute(req)).unwrap();
    assert_eq!(updated.total, 1);
    assert_eq!(updated.updated, 1);
    assert!(updated.failures.is_empty());
    assert_eq!(
        texts(&client, &Query::MatchAll),
        vec!["[X] buy milk", "[ ] walk dog"]
    );

    // Step 5: check a term with no matches.
    let req = client
        .build_update_by_query(&Query::text("nothing"), &Script::check())
        .unwrap();
    let updated = client.parse_update_by_query(execute(req)).unwrap();
    assert_eq!(updated.total, 0);

    // Step 6: delete everything.
    let req = client.build_delete_by_query(&Query::MatchAll).unwrap();
    let deleted = client.parse_delete_by_query(execute(req)).unwrap();
    assert_eq!(deleted.deleted, 2);

    // Step 7: list. The index still exists but is empty.
    assert!(texts(&client, &Query::MatchAll).is_empty());
}

#[test]
fn authentication_is_enforced() {
    let url = start_store(Some(mock_store::Credentials::new("elastic", "changeme")));

    let anonymous = StoreClient::new(&url, "todo");
    let req = anonymous.build_index(&Item::new("x")).unwrap();
    let err = anonymous.parse_index(execute(req)).unwrap_err();
    match err {
        ApiError::Store { status, detail } => {
            assert_eq!(status, 401);
            assert_eq!(detail["type"], "security_exception");
        }
        other => panic!("expected store error, got {other:?}"),
    }

    let authed = StoreClient::new(&url, "todo").with_credentials(Credentials::new("elastic", "changeme"));
    let req = authed.build_index(&Item::new("x")).unwrap();
    assert!(authed.parse_index(execute(req)).is_ok());
}

#[test]
fn malformed_body_is_an_unstructured_error() {
    let client = StoreClient::new(&start_store(None), "todo");
    let mut req = client.build_index(&Item::new("x")).unwrap();
    req.body = Some("[1,2,3]".to_string());

    let err = client.parse_index(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::HttpError { status: 422, .. }), "{err:?}");
}
