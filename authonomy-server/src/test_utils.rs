use crate::api::authn_middleware::API_KEY_HEADER;
use crate::config::AuthonomyConfig;
use crate::create_app;
use crate::models::{AppDetails, ApplicationPolicyResponse, ApplicationResponse};
use crate::state::AppState;
use crate::store::{memory::InMemoryStore, Store};
use axum::body::Body;
use axum::Router;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use log::LevelFilter;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test fixture driving the full router against mocked identity service and provider.
///
/// ```rust
/// let fixture = TestFixture::new().await;
/// fixture
///     .add_identity_mock(Method::PUT, "/dids/key", json!({"did": {"id": "did:key:z6Mk"}}), StatusCode::OK, 1)
///     .await;
/// let response = fixture.post("/applications", &request).await;
/// response.assert_ok();
/// ```
pub struct TestFixture {
    pub app: Router,
    pub config: AuthonomyConfig,
    /// Shares its store with the router
    pub state: AppState,
    pub identity_mock: MockServer,
    pub provider_mock: MockServer,
}

impl TestFixture {
    pub async fn new() -> Self {
        let _ = env_logger::builder()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .try_init();

        let identity_mock = MockServer::start().await;
        let provider_mock = MockServer::start().await;
        let config = AuthonomyConfig::for_test_with_mocks(&identity_mock, &provider_mock);

        let state = AppState::with_store(config.clone(), Store::InMemory(InMemoryStore::new()))
            .expect("Failed to create test state");
        let app = create_app(state.clone()).await;

        Self {
            app,
            config,
            state,
            identity_mock,
            provider_mock,
        }
    }

    /// Request builder carrying the owner API key and a JSON content type
    pub fn request_builder(&self, method: Method, uri: impl AsRef<str>) -> http::request::Builder {
        self.request_builder_without_key(method, uri)
            .header(API_KEY_HEADER, &self.config.api_key)
    }

    pub fn request_builder_without_key(
        &self,
        method: Method,
        uri: impl AsRef<str>,
    ) -> http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri.as_ref())
            .header("Content-Type", "application/json")
    }

    pub async fn get(&self, uri: impl AsRef<str>) -> TestResponse {
        let request = self
            .request_builder(Method::GET, uri)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn get_without_key(&self, uri: impl AsRef<str>) -> TestResponse {
        self.get_with_headers(uri, &[]).await
    }

    /// GET without the API key, with extra headers
    pub async fn get_with_headers(
        &self,
        uri: impl AsRef<str>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = self.request_builder_without_key(Method::GET, uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(Body::empty()).expect("Failed to build request");
        self.send(request).await
    }

    pub async fn post<T: Serialize>(&self, uri: impl AsRef<str>, body: &T) -> TestResponse {
        self.post_with_headers(uri, body, &[]).await
    }

    /// POST with the API key and extra headers
    pub async fn post_with_headers<T: Serialize>(
        &self,
        uri: impl AsRef<str>,
        body: &T,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let json_body = serde_json::to_vec(body).expect("Failed to serialize body to JSON");
        let mut builder = self.request_builder(Method::POST, uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder
            .body(Body::from(json_body))
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn post_without_key<T: Serialize>(
        &self,
        uri: impl AsRef<str>,
        body: &T,
    ) -> TestResponse {
        let json_body = serde_json::to_vec(body).expect("Failed to serialize body to JSON");
        let request = self
            .request_builder_without_key(Method::POST, uri)
            .body(Body::from(json_body))
            .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        // Non-JSON and empty bodies read as an empty object
        let json = if !body.is_empty() {
            serde_json::from_slice(&body).unwrap_or_else(|_| json!({}))
        } else {
            json!({})
        };

        TestResponse { status, json }
    }

    pub async fn add_identity_mock(
        &self,
        method: Method,
        path: impl Into<String>,
        response_body: impl Serialize,
        status_code: StatusCode,
        expected_calls: u64,
    ) {
        Mock::given(matchers::method(method.as_str()))
            .and(matchers::path(path.into()))
            .respond_with(ResponseTemplate::new(status_code.as_u16()).set_body_json(response_body))
            .expect(expected_calls)
            .mount(&self.identity_mock)
            .await;
    }

    /// Register an application directly in the store
    pub async fn seed_application(&self, app_did: &str) {
        self.state
            .store
            .set_application(&ApplicationResponse {
                app_did: app_did.to_string(),
                app_name: "demo".to_string(),
                app_details: AppDetails {
                    description: "a demo application".to_string(),
                    email: "owner@example.com".to_string(),
                },
            })
            .await
            .expect("Failed to store application");
    }

    pub async fn seed_issued_policy(&self, app_did: &str, schema_id: &str) {
        self.state
            .store
            .set_issued_policy(&ApplicationPolicyResponse {
                application_did: app_did.to_string(),
                schema_id: schema_id.to_string(),
                issuer_did: "did:key:z6Mkissuer".to_string(),
                credential_id: "cred-app-policy".to_string(),
            })
            .await
            .expect("Failed to store issued policy");
    }
}

/// Unsigned VC-JWT issued by `issuer` whose subject holds `claims`
pub fn credential_jwt(issuer: &str, claims: Value) -> String {
    let header = json!({"alg": "EdDSA", "typ": "JWT", "kid": format!("{issuer}#key-1")});
    let payload = json!({
        "iss": issuer,
        "sub": "did:key:z6Mkuser",
        "iat": 1_700_000_000,
        "jti": "urn:uuid:3978344f-8596-4c3a-a978-8fcaba3903c5",
        "vc": {
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiableCredential"],
            "issuer": issuer,
            "issuanceDate": "2023-11-14T22:13:20Z",
            "credentialSubject": claims
        }
    });
    format!(
        "{}.{}.c2lnbmF0dXJl",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}

pub struct TestResponse {
    pub status: StatusCode,
    pub json: Value,
}

impl TestResponse {
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {} with body: {}",
            expected,
            self.status,
            serde_json::to_string_pretty(&self.json).unwrap_or_default()
        );
        self
    }

    pub fn assert_ok(&self) -> &Self {
        self.assert_status(StatusCode::OK)
    }

    pub fn json_as<T: DeserializeOwned>(&self) -> T {
        serde_json::from_value(self.json.clone()).expect("Failed to deserialize response JSON")
    }
}
