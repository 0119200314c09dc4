//! End-to-end runs against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the scan operation
//! two ways: through `ApiClient::request` with the default reqwest transport,
//! and by a blocking ureq host that executes the built `HttpRequest` itself.
//! DTOs on each side are defined independently, so these runs catch drift.

use url::Url;
use vital_core::nutrition::{ErrorModel, ScanFood, ScanInput};
use vital_core::{
    create_api_client, ApiClient, ApiError, HttpMethod, HttpRequest, HttpResponse, ReqwestTransport,
    REQUEST_ID_HEADER,
};

async fn spawn_server() -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { mock_server::run(listener).await });
    addr
}

#[tokio::test]
async fn scan_round_trip() {
    let addr = spawn_server().await;
    let client = create_api_client(&format!("http://{addr}"));

    let input = ScanInput::new("aGVsbG8=").with_description("lunch");
    let scan = client.request::<ScanFood>(None, Some(&input)).await.unwrap();

    assert_eq!(scan.food_name, "Grilled Chicken Salad");
    assert_eq!(scan.macros.calories, 476);
    assert_eq!(scan.ingredients.len(), 6);
    assert_eq!(scan.ingredient_totals(), scan.macros);
}

#[tokio::test]
async fn validation_failure_carries_problem_details() {
    let addr = spawn_server().await;
    let client = create_api_client(&format!("http://{addr}/"));

    let err = client
        .request::<ScanFood>(None, Some(&ScanInput::new("")))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(422));
    let problem: ErrorModel = err.problem().unwrap();
    assert_eq!(problem.errors[0].location.as_deref(), Some("body.image_base64"));
}

#[tokio::test]
async fn relative_mode_resolves_against_origin() {
    let addr = spawn_server().await;
    let origin = Url::parse(&format!("http://{addr}")).unwrap();
    let client = ApiClient::with_transport("", ReqwestTransport::new().with_origin(origin));

    let scan = client
        .request::<ScanFood>(None, Some(&ScanInput::new("aGVsbG8=")))
        .await
        .unwrap();
    assert_eq!(scan.serving_size, "400g");
}

#[tokio::test]
async fn relative_mode_without_origin_fails_on_use() {
    let client = create_api_client("");
    let err = client
        .request::<ScanFood>(None, Some(&ScanInput::new("aGVsbG8=")))
        .await
        .unwrap_err();
    assert!(err.is_transport());
}

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Status codes are returned as data so the core decides what they mean.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Post, Some(body)) => agent
            .post(&req.url)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Post, None) => agent.post(&req.url).send_empty(),
        (HttpMethod::Get, _) => agent.get(&req.url).call(),
        (method, _) => panic!("host does not support {method}"),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
        .collect();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse { status, headers, body }
}

#[test]
fn host_driven_scan() {
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
            mock_server::run(listener).await
        })
        .unwrap();
    });

    let client = create_api_client(&format!("http://{addr}"));

    // Step 1: a valid scan.
    let req = client
        .build_request::<ScanFood>(None, Some(&ScanInput::new("aGVsbG8=")))
        .unwrap();
    let response = execute(req);
    assert!(response.header(REQUEST_ID_HEADER).is_some());
    let scan = client.parse_response::<ScanFood>(response).unwrap();
    assert_eq!(scan.confidence, 0.95);

    // Step 2: an empty image is a 422 with problem details.
    let req = client
        .build_request::<ScanFood>(None, Some(&ScanInput::new("")))
        .unwrap();
    let err = client.parse_response::<ScanFood>(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 422, .. }));

    // Step 3: a missing body never reaches the host.
    let err = client.build_request::<ScanFood>(None, None).unwrap_err();
    assert!(matches!(err, ApiError::MissingBody { .. }));
}
