//! # Gateway End-to-End
//!
//! Drives the complete axum router (tracing, body limit, dispatcher, request
//! gate) with `tower::ServiceExt::oneshot`.
//!
//! ## Scenarios
//!
//! - Valid signed request: 200, handler runs once, JSON body
//! - Any single-byte body mutation: 400, handler never runs
//! - Freshness boundary: 30s old passes, 31s old fails
//! - Certificate URL rules: 400 before any fetch
//! - Certificate host unreachable: 500
//! - Unknown path: 404, no authentication attempted

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use axum::Router;
    use chrono::Duration;
    use tower::ServiceExt;

    use skill_auth::testing::{
        intent_request_json, launch_request_json, reference_time, request_json, test_gate,
        test_pki, CountingFetcher, TEST_APP_ID, TEST_CERT_URL,
    };
    use skill_auth::{FetchError, CERT_CHAIN_URL_HEADER, SIGNATURE_HEADER};
    use skill_gateway::{
        EndpointRegistry, GatewayConfig, SkillEndpoint, SkillGatewayService,
        SKILL_RESPONSE_CONTENT_TYPE,
    };
    use skill_types::{RequestKind, SkillRequest, SkillResponse};

    const SKILL_PATH: &str = "/skills/hello";

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Harness {
        service: SkillGatewayService,
        fetcher: Arc<CountingFetcher>,
        handled: Arc<AtomicUsize>,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_fetcher(CountingFetcher::with_chain())
        }

        fn with_fetcher(fetcher: CountingFetcher) -> Self {
            let handled = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&handled);
            let registry = EndpointRegistry::new()
                .with_endpoint(SkillEndpoint::new(
                    "hello",
                    SKILL_PATH,
                    TEST_APP_ID,
                    move |_: &SkillEndpoint, req: &SkillRequest| {
                        counter.fetch_add(1, Ordering::SeqCst);
                        let response = SkillResponse::for_request(req);
                        match req.kind() {
                            Some(RequestKind::Launch) => {
                                response.with_speech("Ready.").end_session(false)
                            }
                            Some(RequestKind::Intent) => response
                                .with_speech("Hi there!")
                                .with_card("Hi there", "You asked me to say hello."),
                            _ => response,
                        }
                    },
                ))
                .expect("register endpoint");

            let fetcher = Arc::new(fetcher);
            let gate = test_gate(fetcher.clone());
            let service =
                SkillGatewayService::new(GatewayConfig::default(), registry, Arc::new(gate))
                    .expect("valid gateway config");

            Self {
                service,
                fetcher,
                handled,
            }
        }

        fn router(&self) -> Router {
            self.service.router()
        }

        fn handled(&self) -> usize {
            self.handled.load(Ordering::SeqCst)
        }

        async fn post(&self, cert_url: &str, signature: &str, body: Vec<u8>) -> Response {
            let request = Request::builder()
                .method(Method::POST)
                .uri(SKILL_PATH)
                .header(header::CONTENT_TYPE, "application/json")
                .header(CERT_CHAIN_URL_HEADER, cert_url)
                .header(SIGNATURE_HEADER, signature)
                .body(Body::from(body))
                .expect("request");
            self.router().oneshot(request).await.expect("infallible")
        }

        async fn post_signed(&self, body: &str) -> Response {
            let signature = test_pki().sign(body.as_bytes());
            self.post(TEST_CERT_URL, &signature, body.as_bytes().to_vec())
                .await
        }
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body")
            .to_vec()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(response).await).expect("json body")
    }

    // =============================================================================
    // ACCEPTED REQUESTS
    // =============================================================================

    #[tokio::test]
    async fn test_valid_intent_request() {
        let harness = Harness::new();
        let body = intent_request_json(TEST_APP_ID, "SayHello", reference_time());

        let response = harness.post_signed(&body).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            SKILL_RESPONSE_CONTENT_TYPE
        );

        let json = body_json(response).await;
        assert_eq!(json["version"], "1.0");
        assert_eq!(json["response"]["outputSpeech"]["type"], "PlainText");
        assert_eq!(json["response"]["outputSpeech"]["text"], "Hi there!");
        assert_eq!(json["response"]["card"]["type"], "Simple");
        assert_eq!(json["response"]["card"]["title"], "Hi there");
        assert_eq!(json["response"]["shouldEndSession"], true);

        assert_eq!(harness.handled(), 1);
        assert_eq!(harness.fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_launch_keeps_session_open() {
        let harness = Harness::new();
        let body = launch_request_json(TEST_APP_ID, reference_time());

        let response = harness.post_signed(&body).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["response"]["outputSpeech"]["text"], "Ready.");
        assert_eq!(json["response"]["shouldEndSession"], false);
    }

    #[tokio::test]
    async fn test_metrics_reflect_outcomes() {
        let harness = Harness::new();
        let body = launch_request_json(TEST_APP_ID, reference_time());

        harness.post_signed(&body).await;
        harness.post(TEST_CERT_URL, "bm90LWEtc2lnbmF0dXJl", body.clone().into_bytes()).await;

        let response = harness
            .router()
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["requests"]["total"], 2);
        assert_eq!(json["requests"]["accepted"], 1);
        assert_eq!(json["rejected"]["authentication_failure"], 1);
    }

    // =============================================================================
    // SIGNATURE
    // =============================================================================

    #[tokio::test]
    async fn test_single_byte_mutation_rejected() {
        let harness = Harness::new();
        let body = intent_request_json(TEST_APP_ID, "SayHello", reference_time());
        let signature = test_pki().sign(body.as_bytes());

        for index in [0, body.len() / 2, body.len() - 1] {
            let mut mutated = body.clone().into_bytes();
            mutated[index] ^= 0x01;

            let response = harness.post(TEST_CERT_URL, &signature, mutated).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "byte {index}");
        }
        assert_eq!(harness.handled(), 0);
    }

    #[tokio::test]
    async fn test_rejection_body_is_generic() {
        let harness = Harness::new();
        let body = launch_request_json(TEST_APP_ID, reference_time());

        let response = harness
            .post(TEST_CERT_URL, "%%%not-base64%%%", body.into_bytes())
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_bytes(response).await, b"Bad Request\n");
    }

    #[tokio::test]
    async fn test_missing_signature_header() {
        let harness = Harness::new();
        let body = launch_request_json(TEST_APP_ID, reference_time());
        let request = Request::post(SKILL_PATH)
            .header(CERT_CHAIN_URL_HEADER, TEST_CERT_URL)
            .body(Body::from(body))
            .unwrap();

        let response = harness.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(harness.fetcher.calls(), 0);
    }

    // =============================================================================
    // FRESHNESS
    // =============================================================================

    #[tokio::test]
    async fn test_freshness_window() {
        let harness = Harness::new();

        let at_limit = launch_request_json(TEST_APP_ID, reference_time() - Duration::seconds(30));
        assert_eq!(harness.post_signed(&at_limit).await.status(), StatusCode::OK);

        let stale = launch_request_json(TEST_APP_ID, reference_time() - Duration::seconds(31));
        assert_eq!(
            harness.post_signed(&stale).await.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(harness.handled(), 1);
    }

    // =============================================================================
    // IDENTITY
    // =============================================================================

    #[tokio::test]
    async fn test_wrong_application_id_rejected() {
        let harness = Harness::new();
        let body = launch_request_json("amzn1.ask.skill.someone-else", reference_time());

        let response = harness.post_signed(&body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(harness.handled(), 0);
    }

    #[tokio::test]
    async fn test_unrecognized_request_type_rejected() {
        let harness = Harness::new();
        let body = request_json("AudioPlayer.PlaybackStarted", TEST_APP_ID, reference_time());

        let response = harness.post_signed(&body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(harness.handled(), 0);
    }

    // =============================================================================
    // CERTIFICATE URL
    // =============================================================================

    #[tokio::test]
    async fn test_bad_certificate_urls_never_fetched() {
        let harness = Harness::new();
        let body = launch_request_json(TEST_APP_ID, reference_time());
        let signature = test_pki().sign(body.as_bytes());

        let bad_urls = [
            "http://s3.amazonaws.com/echo.api/echo-api-cert.pem",
            "https://notamazon.com/echo.api/echo-api-cert.pem",
            "https://evil.example.com/echo.api/echo-api-cert.pem",
            "https://s3.amazonaws.com/EcHo.aPi/echo-api-cert.pem",
            "https://s3.amazonaws.com/invalid.path/echo-api-cert.pem",
            "https://s3.amazonaws.com:563/echo.api/echo-api-cert.pem",
            "not a url",
        ];
        for url in bad_urls {
            let response = harness
                .post(url, &signature, body.clone().into_bytes())
                .await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{url}");
        }

        assert_eq!(harness.fetcher.calls(), 0);
        assert_eq!(harness.handled(), 0);
    }

    #[tokio::test]
    async fn test_equivalent_certificate_urls_accepted() {
        let harness = Harness::new();
        let body = launch_request_json(TEST_APP_ID, reference_time());
        let signature = test_pki().sign(body.as_bytes());

        for url in [
            "HTTPS://s3.amazonaws.com/echo.api/echo-api-cert.pem",
            "https://S3.AMAZONAWS.COM/echo.api/echo-api-cert.pem",
            "https://s3.amazonaws.com:443/echo.api/echo-api-cert.pem",
        ] {
            let response = harness
                .post(url, &signature, body.clone().into_bytes())
                .await;
            assert_eq!(response.status(), StatusCode::OK, "{url}");
        }
    }

    #[tokio::test]
    async fn test_unreachable_certificate_host_is_server_error() {
        let harness = Harness::with_fetcher(CountingFetcher::failing(FetchError::Network {
            url: TEST_CERT_URL.to_string(),
            reason: "timed out".to_string(),
        }));
        let body = launch_request_json(TEST_APP_ID, reference_time());

        let response = harness.post_signed(&body).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(harness.handled(), 0);
    }

    // =============================================================================
    // ROUTING
    // =============================================================================

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let harness = Harness::new();
        let body = launch_request_json(TEST_APP_ID, reference_time());
        let request = Request::post("/skills/goodbye")
            .header(CERT_CHAIN_URL_HEADER, TEST_CERT_URL)
            .header(SIGNATURE_HEADER, test_pki().sign(body.as_bytes()))
            .body(Body::from(body))
            .unwrap();

        let response = harness.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(harness.fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_get_on_skill_path_not_allowed() {
        let harness = Harness::new();
        let response = harness
            .router()
            .oneshot(Request::get(SKILL_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_health() {
        let harness = Harness::new();
        let response = harness
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");
    }
}
