//! # Request Gate Flows
//!
//! The request gate wired to the URL-keyed certificate cache, the way the
//! runtime assembles it:
//!
//! 1. **Cache reuse**: one inner fetch per certificate URL
//! 2. **Re-validation**: a cached bundle is still checked on every request
//! 3. **Concurrency**: parallel first requests all authenticate
//! 4. **Policy knobs**: signature scheme and future-skew bound

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use bytes::Bytes;
    use chrono::{DateTime, Utc};

    use skill_auth::testing::{
        intent_request_json, launch_request_json, reference_time, session_ended_request_json,
        test_pki, CountingFetcher, FixedTimeSource, TEST_APP_ID, TEST_CERT_URL,
    };
    use skill_auth::{
        AuthError, AuthPolicy, CachingFetcher, ChainError, FailureKind, FetchError,
        FreshnessError, InboundRequest, RequestAuthenticator, RequestGate, SignatureScheme,
    };
    use skill_types::SkillRequest;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    type CachedFetcher = CachingFetcher<CountingFetcher>;

    fn cached(inner: CountingFetcher) -> Arc<CachedFetcher> {
        Arc::new(CachingFetcher::new(inner))
    }

    fn gate_with(fetcher: Arc<CachedFetcher>, policy: AuthPolicy) -> RequestGate {
        RequestGate::new(fetcher, test_pki().trust_store(), policy)
            .with_clock(Arc::new(FixedTimeSource(reference_time())))
    }

    fn gate(fetcher: Arc<CachedFetcher>) -> RequestGate {
        gate_with(fetcher, AuthPolicy::default())
    }

    async fn submit(gate: &RequestGate, body: &str, signature: &str) -> Result<SkillRequest, AuthError> {
        gate.authenticate(
            InboundRequest::new(Some(TEST_CERT_URL), Some(signature), body.as_bytes()),
            TEST_APP_ID,
        )
        .await
    }

    async fn submit_signed(gate: &RequestGate, body: &str) -> Result<SkillRequest, AuthError> {
        submit(gate, body, &test_pki().sign(body.as_bytes())).await
    }

    fn at(offset_secs: i64) -> DateTime<Utc> {
        reference_time() + chrono::Duration::seconds(offset_secs)
    }

    // =============================================================================
    // CACHE
    // =============================================================================

    #[tokio::test]
    async fn test_repeated_requests_fetch_once() {
        let fetcher = cached(CountingFetcher::with_chain());
        let gate = gate(fetcher.clone());

        for intent in ["SayHello", "SayGoodbye", "SayHello"] {
            let body = intent_request_json(TEST_APP_ID, intent, reference_time());
            let request = submit_signed(&gate, &body).await.unwrap();
            assert_eq!(request.intent_name(), Some(intent));
        }

        assert_eq!(fetcher.inner().calls(), 1);
        assert_eq!(fetcher.misses(), 1);
        assert_eq!(fetcher.hits(), 2);
    }

    #[tokio::test]
    async fn test_equivalent_urls_share_one_entry() {
        let fetcher = cached(CountingFetcher::with_chain());
        let gate = gate(fetcher.clone());
        let body = launch_request_json(TEST_APP_ID, reference_time());
        let signature = test_pki().sign(body.as_bytes());

        for url in [
            TEST_CERT_URL,
            "HTTPS://S3.AMAZONAWS.COM/echo.api/echo-api-cert.pem",
            "https://s3.amazonaws.com:443/echo.api/echo-api-cert.pem",
            "https://s3.amazonaws.com/echo.api/../echo.api/echo-api-cert.pem",
        ] {
            let result = gate
                .authenticate(
                    InboundRequest::new(Some(url), Some(&signature), body.as_bytes()),
                    TEST_APP_ID,
                )
                .await;
            assert!(result.is_ok(), "{url}: {result:?}");
        }

        assert_eq!(fetcher.inner().calls(), 1);
        assert_eq!(fetcher.len(), 1);
    }

    #[tokio::test]
    async fn test_cached_expired_chain_rejected_every_time() {
        let bundle = Bytes::from(test_pki().expired_chain_pem());
        let fetcher = cached(CountingFetcher::new(bundle));
        let gate = gate(fetcher.clone());
        let body = launch_request_json(TEST_APP_ID, reference_time());

        for _ in 0..2 {
            let err = submit_signed(&gate, &body).await.unwrap_err();
            assert!(matches!(err, AuthError::Chain(ChainError::Expired { .. })));
            assert_eq!(err.kind(), FailureKind::AuthenticationFailure);
        }
        assert_eq!(fetcher.inner().calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failures_retry_network() {
        let fetcher = cached(CountingFetcher::failing(FetchError::Network {
            url: TEST_CERT_URL.to_string(),
            reason: "connection refused".to_string(),
        }));
        let gate = gate(fetcher.clone());
        let body = launch_request_json(TEST_APP_ID, reference_time());

        for _ in 0..2 {
            let err = submit_signed(&gate, &body).await.unwrap_err();
            assert_eq!(err.kind(), FailureKind::TransportFailure);
        }
        assert_eq!(fetcher.inner().calls(), 2);
        assert!(fetcher.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_share_cache() {
        let fetcher = cached(CountingFetcher::with_chain());
        let gate = Arc::new(gate(fetcher.clone()));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let gate = Arc::clone(&gate);
                tokio::spawn(async move {
                    let body = launch_request_json(TEST_APP_ID, at(-(i % 30)));
                    submit_signed(&gate, &body).await
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        // Racing first requests may each miss; the cache still holds one entry.
        let calls = fetcher.inner().calls();
        assert!((1..=16).contains(&calls), "inner fetches: {calls}");
        assert_eq!(fetcher.len(), 1);

        let body = launch_request_json(TEST_APP_ID, reference_time());
        submit_signed(&gate, &body).await.unwrap();
        assert_eq!(fetcher.inner().calls(), calls);
    }

    // =============================================================================
    // REQUEST KINDS
    // =============================================================================

    #[tokio::test]
    async fn test_all_request_kinds_authenticate() {
        let gate = gate(cached(CountingFetcher::with_chain()));

        let launch = launch_request_json(TEST_APP_ID, reference_time());
        assert!(submit_signed(&gate, &launch).await.unwrap().is_launch_request());

        let intent = intent_request_json(TEST_APP_ID, "SayHello", reference_time());
        assert!(submit_signed(&gate, &intent).await.unwrap().is_intent_request());

        let ended = session_ended_request_json(TEST_APP_ID, "USER_INITIATED", reference_time());
        let request = submit_signed(&gate, &ended).await.unwrap();
        assert!(request.is_session_ended_request());
        assert!(request.session_termination_was_user_initiated());
    }

    async fn chain_rejection(bundle: Vec<u8>) -> ChainError {
        let gate = gate(cached(CountingFetcher::new(Bytes::from(bundle))));
        let body = launch_request_json(TEST_APP_ID, reference_time());
        match submit_signed(&gate, &body).await {
            Err(AuthError::Chain(err)) => err,
            other => panic!("expected chain rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chain_failures_by_fixture() {
        let pki = test_pki();

        let err = chain_rejection(pki.future_chain_pem()).await;
        assert!(matches!(err, ChainError::NotYetValid { .. }));

        let err = chain_rejection(pki.wrong_identity_chain_pem()).await;
        assert!(matches!(err, ChainError::MissingSubjectAltName(_)));

        let err = chain_rejection(pki.untrusted_chain_pem()).await;
        assert!(matches!(err, ChainError::Untrusted(_)));

        let err = chain_rejection(pki.leaf_pem().as_bytes().to_vec()).await;
        assert_eq!(err, ChainError::TooShort(1));
    }

    // =============================================================================
    // POLICY
    // =============================================================================

    #[tokio::test]
    async fn test_sha256_scheme() {
        let policy = AuthPolicy {
            signature_scheme: SignatureScheme::RsaPkcs1v15Sha256,
            ..AuthPolicy::default()
        };
        let gate = gate_with(cached(CountingFetcher::with_chain()), policy);
        let body = launch_request_json(TEST_APP_ID, reference_time());

        let sha256 = test_pki().sign_with(body.as_bytes(), SignatureScheme::RsaPkcs1v15Sha256);
        assert!(submit(&gate, &body, &sha256).await.is_ok());

        let err = submit_signed(&gate, &body).await.unwrap_err();
        assert!(matches!(err, AuthError::Signature(_)));
    }

    #[tokio::test]
    async fn test_future_timestamps_accepted_by_default() {
        let gate = gate(cached(CountingFetcher::with_chain()));
        let body = launch_request_json(TEST_APP_ID, at(600));
        assert!(submit_signed(&gate, &body).await.is_ok());
    }

    #[tokio::test]
    async fn test_future_skew_bound_opt_in() {
        let policy = AuthPolicy {
            max_future_skew: Some(Duration::from_secs(60)),
            ..AuthPolicy::default()
        };
        let gate = gate_with(cached(CountingFetcher::with_chain()), policy);

        let near = launch_request_json(TEST_APP_ID, at(60));
        assert!(submit_signed(&gate, &near).await.is_ok());

        let far = launch_request_json(TEST_APP_ID, at(600));
        let err = submit_signed(&gate, &far).await.unwrap_err();
        assert!(matches!(err, AuthError::Timestamp(FreshnessError::InFuture { .. })));
    }
}
