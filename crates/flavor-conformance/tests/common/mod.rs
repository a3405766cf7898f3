// crates/flavor-conformance/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared fixtures, fake transports, and stub servers.
// Purpose: Provide reusable builders for flavor-conformance integration tests.
// Dependencies: flavor-conformance, serde_json, tiny_http
// ============================================================================

//! ## Overview
//! Provides flavor payload builders, an in-memory [`FakeTransport`], a
//! recording audit sink, and a `tiny_http` stub service.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::thread::JoinHandle;

use flavor_conformance::HttpTransport;
use flavor_conformance::RequestAuditEvent;
use flavor_conformance::ScenarioAuditEvent;
use flavor_conformance::SuiteAuditSink;
use flavor_conformance::TransportError;
use flavor_conformance::TransportResponse;
use flavor_conformance::derive_links;
use flavor_conformance::links::resource_id_from_value;
use reqwest::Method;
use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Management address used by in-memory tests.
pub const MANAGEMENT_URL: &str = "https://api.example.com/v1.1/";
/// UUID-style identifier used across fixtures.
pub const UUID_ID: &str = "52415800-8b69-11e0-9b19-734f6af67565";

// ============================================================================
// SECTION: Flavor Builders
// ============================================================================

/// Builds a conforming basic flavor.
pub fn basic_flavor(management_url: &str, id: &Value, name: &str) -> Value {
    let id_text = resource_id_from_value(id).expect("fixture id");
    let links = derive_links(management_url, &id_text).expect("fixture links").to_json();
    json!({
        "id": id,
        "name": name,
        "links": links,
    })
}

/// Builds a conforming detailed flavor.
pub fn detailed_flavor(management_url: &str, id: &Value, name: &str, ram: u64, disk: u64) -> Value {
    let mut flavor = basic_flavor(management_url, id, name);
    let object = flavor.as_object_mut().expect("fixture object");
    object.insert("ram".to_string(), json!(ram));
    object.insert("disk".to_string(), json!(disk));
    flavor
}

/// Conforming routes for a two-flavor service, keyed by relative path.
pub fn flavor_routes(management_url: &str) -> Vec<(String, u16, Value)> {
    let tiny_id = json!(1);
    let small_id = json!(UUID_ID);
    vec![
        (
            "/flavors".to_string(),
            200,
            json!({"flavors": [
                basic_flavor(management_url, &tiny_id, "m1.tiny"),
                basic_flavor(management_url, &small_id, "m1.small"),
            ]}),
        ),
        (
            "/flavors/detail".to_string(),
            200,
            json!({"flavors": [
                detailed_flavor(management_url, &tiny_id, "m1.tiny", 512, 0),
                detailed_flavor(management_url, &small_id, "m1.small", 2048, 20),
            ]}),
        ),
        (
            "/flavors/1".to_string(),
            200,
            json!({"flavor": detailed_flavor(management_url, &tiny_id, "m1.tiny", 512, 0)}),
        ),
        (
            format!("/flavors/{UUID_ID}"),
            200,
            json!({"flavor": detailed_flavor(management_url, &small_id, "m1.small", 2048, 20)}),
        ),
    ]
}

// ============================================================================
// SECTION: Fake Transport
// ============================================================================

/// In-memory transport with canned responses per path.
pub struct FakeTransport {
    /// Management address reported to callers.
    management_url: String,
    /// Canned outcomes keyed by relative path.
    routes: BTreeMap<String, Result<TransportResponse, TransportError>>,
    /// Paths requested, in order.
    calls: Mutex<Vec<String>>,
}

impl FakeTransport {
    /// Creates an empty transport; unknown paths answer 404.
    pub fn new(management_url: &str) -> Self {
        Self {
            management_url: management_url.to_string(),
            routes: BTreeMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Creates a transport serving the conforming two-flavor routes.
    pub fn conforming(management_url: &str) -> Self {
        flavor_routes(management_url)
            .into_iter()
            .fold(Self::new(management_url), |transport, (path, status, body)| {
                transport.with_json(&path, status, &body)
            })
    }

    /// Serves `body` as JSON at `path`.
    pub fn with_json(self, path: &str, status: u16, body: &Value) -> Self {
        self.with_raw(path, status, body.to_string().as_bytes())
    }

    /// Serves raw bytes at `path`.
    pub fn with_raw(mut self, path: &str, status: u16, body: &[u8]) -> Self {
        self.routes.insert(
            path.to_string(),
            Ok(TransportResponse {
                status,
                body: body.to_vec(),
            }),
        );
        self
    }

    /// Fails requests to `path` with `error`.
    pub fn with_error(mut self, path: &str, error: TransportError) -> Self {
        self.routes.insert(path.to_string(), Err(error));
        self
    }

    /// Returns the requested paths in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl HttpTransport for FakeTransport {
    fn request(&self, method: &Method, path: &str) -> Result<TransportResponse, TransportError> {
        assert_eq!(*method, Method::GET, "suite must only issue GET requests");
        self.calls.lock().unwrap().push(path.to_string());
        self.routes.get(path).cloned().unwrap_or_else(|| {
            Ok(TransportResponse {
                status: 404,
                body: br#"{"itemNotFound": {"code": 404}}"#.to_vec(),
            })
        })
    }

    fn management_url(&self) -> &str {
        &self.management_url
    }
}

// ============================================================================
// SECTION: Audit Capture
// ============================================================================

/// Audit sink that keeps every event in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Captured request events.
    pub requests: Mutex<Vec<RequestAuditEvent>>,
    /// Captured scenario events.
    pub scenarios: Mutex<Vec<ScenarioAuditEvent>>,
}

impl SuiteAuditSink for RecordingAuditSink {
    fn record_request(&self, event: &RequestAuditEvent) {
        self.requests.lock().unwrap().push(event.clone());
    }

    fn record_scenario(&self, event: &ScenarioAuditEvent) {
        self.scenarios.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Stub Server
// ============================================================================

/// A request observed by the stub server.
#[derive(Debug, Clone)]
pub struct ObservedRequest {
    /// Request method.
    pub method: String,
    /// Request path including the version prefix.
    pub path: String,
    /// Request headers as lowercase name/value pairs.
    pub headers: Vec<(String, String)>,
}

impl ObservedRequest {
    /// Returns the first value of `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers.iter().find(|(key, _)| *key == name).map(|(_, value)| value.as_str())
    }
}

/// `tiny_http` stub answering canned responses under `/v1.1`.
pub struct StubService {
    /// Shared server handle, used to unblock the worker on drop.
    server: Arc<Server>,
    /// Worker thread.
    handle: Option<JoinHandle<()>>,
    /// Version-qualified management address of the stub.
    management_url: String,
    /// Requests observed so far.
    observed: Arc<Mutex<Vec<ObservedRequest>>>,
}

impl StubService {
    /// Starts a stub whose routes are built from its own management address.
    pub fn start<F>(routes: F) -> Self
    where
        F: FnOnce(&str) -> Vec<(String, u16, Vec<u8>)>,
    {
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let addr = server.server_addr().to_ip().unwrap();
        let management_url = format!("http://{addr}/v1.1/");
        let table: BTreeMap<String, (u16, Vec<u8>)> = routes(&management_url)
            .into_iter()
            .map(|(path, status, body)| (format!("/v1.1{path}"), (status, body)))
            .collect();
        let observed = Arc::new(Mutex::new(Vec::new()));
        let worker_server = Arc::clone(&server);
        let worker_observed = Arc::clone(&observed);
        let handle = thread::spawn(move || {
            for request in worker_server.incoming_requests() {
                let path = request.url().to_string();
                worker_observed.lock().unwrap().push(ObservedRequest {
                    method: request.method().to_string(),
                    path: path.clone(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|header| {
                            (
                                header.field.as_str().as_str().to_ascii_lowercase(),
                                header.value.as_str().to_string(),
                            )
                        })
                        .collect(),
                });
                let (status, body) =
                    table.get(&path).cloned().unwrap_or_else(|| (404, b"{}".to_vec()));
                let content_type =
                    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
                let response =
                    Response::from_data(body).with_status_code(status).with_header(content_type);
                let _ = request.respond(response);
            }
        });
        Self {
            server,
            handle: Some(handle),
            management_url,
            observed,
        }
    }

    /// Starts a stub serving the conforming two-flavor routes.
    pub fn conforming() -> Self {
        Self::start(|management_url| {
            flavor_routes(management_url)
                .into_iter()
                .map(|(path, status, body)| (path, status, body.to_string().into_bytes()))
                .collect()
        })
    }

    /// Returns the version-qualified management address.
    pub fn management_url(&self) -> &str {
        &self.management_url
    }

    /// Returns the requests observed so far.
    pub fn observed(&self) -> Vec<ObservedRequest> {
        self.observed.lock().unwrap().clone()
    }
}

impl Drop for StubService {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
