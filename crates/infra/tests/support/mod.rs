//! Shared helpers for `datasync-infra` integration tests.
//!
//! The client under test is blocking, so the mock server lives on a tokio
//! runtime owned by the harness and the test thread itself stays outside
//! any async context.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use datasync_common::MockClock;
use datasync_domain::DatasetsConfig;
use datasync_infra::DatasetsClient;
use serde_json::{json, Value};
use tokio::runtime::{Builder, Runtime};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Install a test subscriber once so `tracing` output shows up in failures.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// A Datasets Service mock.
pub struct MockApi {
    // Dropped before the runtime it runs on.
    server: MockServer,
    runtime: Runtime,
}

impl MockApi {
    pub fn start() -> Self {
        init_tracing();
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("test runtime should build");
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn config(&self) -> DatasetsConfig {
        DatasetsConfig::new(self.uri(), "client", "secret")
    }

    /// Client with its own cache and a system clock.
    pub fn client(&self) -> DatasetsClient {
        DatasetsClient::new(&self.config()).expect("client should build")
    }

    /// Client whose token expiry follows `clock`.
    pub fn client_with_clock(&self, clock: &MockClock) -> DatasetsClient {
        DatasetsClient::with_clock(&self.config(), Arc::new(clock.clone()))
            .expect("client should build")
    }

    pub fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    /// Serve tokens `token-1`, `token-2`, ... valid for `expires_in` seconds.
    pub fn mount_tokens(&self, expires_in: u64) -> Arc<AtomicUsize> {
        let issued = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&issued);
        self.mount(
            Mock::given(method("POST")).and(path("/oauth/token")).respond_with(
                move |_req: &Request| -> ResponseTemplate {
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    ResponseTemplate::new(200).set_body_json(json!({
                        "access_token": format!("token-{n}"),
                        "expires_in": expires_in,
                        "token_type": "bearer",
                        "scope": "data"
                    }))
                },
            ),
        );
        issued
    }

    pub fn requests(&self) -> Vec<Request> {
        self.runtime.block_on(self.server.received_requests()).unwrap_or_default()
    }

    /// Received requests matching `method` and exact `path`.
    pub fn requests_to(&self, http_method: &str, url_path: &str) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|req| req.method.as_str() == http_method && req.url.path() == url_path)
            .collect()
    }
}

/// A dataset record as the service returns it.
pub fn dataset_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "rows": 0,
        "columns": 1,
        "owner": {"id": 1, "name": "Reporter"},
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-02T00:00:00Z"
    })
}

/// `count` dataset records named `<prefix>-<n>`.
pub fn dataset_page(prefix: &str, count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|n| dataset_json(&format!("{prefix}-{n}"), &format!("{prefix}-{n}")))
            .collect(),
    )
}

pub fn bearer(req: &Request) -> Option<String> {
    req.headers.get("authorization").and_then(|value| value.to_str().ok()).map(str::to_owned)
}
