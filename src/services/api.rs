use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::config::{clean_url, AppConfig};
use crate::models::*;
use crate::services::storage::{LocalStorage, Storage, KEY_AUTH_TOKEN, KEY_USER_DATA};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication token not found")]
    MissingToken,
    #[error("Session expired. Please sign in again.")]
    Unauthorized,
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Deserialize)]
struct ServerMessage {
    message: Option<String>,
}

/// The `message` field of an error body, when the backend sent one.
pub fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ServerMessage>(body)
        .ok()
        .and_then(|m| m.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

/// A 2xx answer can still report failure in its envelope.
fn unwrap_envelope<T>(env: Envelope<T>) -> ApiResult<T> {
    if env.success {
        return Ok(env.data);
    }
    let message = Some(env.message.trim())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP error! status: {}", env.status_code));
    Err(ApiError::Http { status: env.status_code, message })
}

/// Thin wrapper over `reqwest` that attaches the stored bearer token to every
/// request and turns a 401 into a cleared session.
#[derive(Clone, Debug)]
pub struct ApiClient<S = LocalStorage> {
    base_url: String,
    storage: S,
    client: Client,
}

impl ApiClient<LocalStorage> {
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.base_url, LocalStorage)
    }

    /// Browser client pointed at the configured backend.
    pub fn default_client() -> Self {
        Self::from_config(&AppConfig::load())
    }
}

impl<S: Storage> ApiClient<S> {
    pub fn new(base_url: &str, storage: S) -> Self {
        Self {
            base_url: clean_url(base_url),
            storage,
            client: Client::new(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn token(&self) -> Option<String> {
        self.storage.get_item(KEY_AUTH_TOKEN).filter(|t| !t.is_empty())
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let req = self
            .client
            .request(method, url)
            .header("Content-Type", "application/json");
        match self.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    fn require_token(&self) -> ApiResult<()> {
        self.token().map(|_| ()).ok_or(ApiError::MissingToken)
    }

    fn clear_session(&self) {
        self.storage.remove_item(KEY_AUTH_TOKEN);
        self.storage.remove_item(KEY_USER_DATA);
    }

    async fn send(&self, req: RequestBuilder) -> ApiResult<Response> {
        self.dispatch(req, true).await
    }

    /// `session_bound` is false only for sign-in, where a 401 means bad
    /// credentials and the server's message is what the form shows.
    async fn dispatch(&self, req: RequestBuilder, session_bound: bool) -> ApiResult<Response> {
        let resp = req.send().await?;
        let status = resp.status();
        tracing::debug!(status = status.as_u16(), url = %resp.url(), "response");

        if status == StatusCode::UNAUTHORIZED && session_bound {
            tracing::warn!("401 from backend, clearing stored credentials");
            self.clear_session();
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = server_message(&body)
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
            return Err(ApiError::Http { status: status.as_u16(), message });
        }
        Ok(resp)
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> ApiResult<T> {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn data<T: DeserializeOwned>(resp: Response) -> ApiResult<T> {
        unwrap_envelope(Self::decode::<Envelope<T>>(resp).await?)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ApiResult<SignInData> {
        let req = self
            .request(Method::POST, &self.url("/auth/signin"))
            .json(&SignInRequest { email, password });
        Self::data(self.dispatch(req, false).await?).await
    }

    pub async fn logout(&self) -> ApiResult<()> {
        let req = self.request(Method::POST, &self.url("/auth/logout"));
        self.send(req).await?;
        Ok(())
    }

    pub async fn fetch_messages(&self, chat_id: &str) -> ApiResult<Vec<ChatMessage>> {
        self.require_token()?;
        let req = self
            .request(Method::GET, &self.url("/chat/fetch-msg"))
            .query(&[("chatId", chat_id)]);
        Self::data(self.send(req).await?).await
    }

    /// Sends a user message and returns the assistant's reply text.
    pub async fn generate(&self, chat_id: &str, message: &str) -> ApiResult<String> {
        self.require_token()?;
        let req = self
            .request(Method::POST, &self.url("/message/generate"))
            .json(&GenerateRequest { chat_id, message, role: Role::User });
        let data: GenerateData = Self::data(self.send(req).await?).await?;
        Ok(data.model_message)
    }

    pub async fn fetch_endpoints(&self, chat_id: &str) -> ApiResult<Vec<MockEndpoint>> {
        self.require_token()?;
        let req = self
            .request(Method::POST, &self.url("/mock/fetch-api"))
            .json(&FetchEndpointsRequest { chat_id });
        Self::data(self.send(req).await?).await
    }

    pub fn mock_url(&self, chat_id: &str, endpoint: &MockEndpoint) -> String {
        let path = endpoint.path.trim();
        let sep = if path.starts_with('/') { "" } else { "/" };
        format!("{}/mock/{}{}{}", self.base_url, chat_id, sep, path)
    }

    /// Calls the live mock for `endpoint`. Non-2xx answers are results, not
    /// errors: the point is to show what the mock returns.
    pub async fn test_endpoint(
        &self,
        chat_id: &str,
        endpoint: &MockEndpoint,
    ) -> ApiResult<EndpointTestResult> {
        let method = Method::from_bytes(endpoint.method.trim().to_uppercase().as_bytes())
            .map_err(|_| ApiError::Decode(format!("unsupported method {}", endpoint.method)))?;
        let carries_body = method == Method::POST || method == Method::PUT || method == Method::PATCH;

        let mut req = self.request(method, &self.mock_url(chat_id, endpoint));
        if carries_body {
            if let Some(body) = &endpoint.request_body {
                req = req.json(body);
            }
        }

        let resp = req.send().await?;
        let status = resp.status().as_u16();
        if status == StatusCode::UNAUTHORIZED.as_u16() {
            self.clear_session();
            return Err(ApiError::Unauthorized);
        }
        let body = resp.text().await?;
        Ok(EndpointTestResult { status, body })
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::services::storage::MemoryStorage;
    use mockito::Matcher;
    use serde_json::json;

    fn authed_store() -> MemoryStorage {
        MemoryStorage::with(&[
            (KEY_AUTH_TOKEN, "tok-1"),
            (KEY_USER_DATA, r#"{"fullName":"Jane","email":"jane@example.com"}"#),
        ])
    }

    #[test]
    fn extracts_server_messages() {
        assert_eq!(server_message(r#"{"message":"Invalid credentials"}"#).as_deref(), Some("Invalid credentials"));
        assert_eq!(server_message(r#"{"message":"  "}"#), None);
        assert_eq!(server_message("<html>oops</html>"), None);
    }

    #[test]
    fn builds_mock_urls() {
        let client = ApiClient::new("http://localhost:9000/v1/api/", MemoryStorage::default());
        let mut ep = MockEndpoint {
            id: "e1".into(),
            method: "GET".into(),
            path: "/api/users".into(),
            description: String::new(),
            request_body: None,
            response_body: json!({}),
            status_code: 200,
        };
        assert_eq!(client.mock_url("c1", &ep), "http://localhost:9000/v1/api/mock/c1/api/users");
        ep.path = "api/users".into();
        assert_eq!(client.mock_url("c1", &ep), "http://localhost:9000/v1/api/mock/c1/api/users");
    }

    #[tokio::test]
    async fn attaches_bearer_token_and_decodes_messages() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/chat/fetch-msg")
            .match_query(Matcher::UrlEncoded("chatId".into(), "c1".into()))
            .match_header("authorization", "Bearer tok-1")
            .with_status(200)
            .with_body(
                json!({
                    "statusCode": 200,
                    "data": [{
                        "id": "m1", "chatId": "c1", "content": "hi",
                        "role": "USER", "status": "COMPLETED",
                        "createdAt": "2024-01-15T10:30:00Z",
                        "updatedAt": "2024-01-15T10:30:00Z"
                    }],
                    "message": "ok",
                    "success": true
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), authed_store());
        let msgs = client.fetch_messages("c1").await.unwrap();

        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].content, "hi");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_clears_stored_credentials() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/message/generate")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;

        let store = authed_store();
        let client = ApiClient::new(&server.url(), store.clone());
        let err = client.generate("c1", "hello").await.unwrap_err();

        assert!(err.is_unauthorized());
        assert!(!store.contains(KEY_AUTH_TOKEN));
        assert!(!store.contains(KEY_USER_DATA));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_errors_prefer_the_server_message() {
        let mut server = mockito::Server::new_async().await;
        let _with_msg = server
            .mock("POST", "/auth/signin")
            .with_status(400)
            .with_body(r#"{"message":"Invalid credentials","success":false}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), MemoryStorage::default());
        let err = client.sign_in("a@b.c", "pw").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");

        let _bare = server
            .mock("POST", "/mock/fetch-api")
            .with_status(500)
            .with_body("")
            .create_async()
            .await;
        let client = ApiClient::new(&server.url(), authed_store());
        let err = client.fetch_endpoints("c1").await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP error! status: 500");
    }

    #[tokio::test]
    async fn rejected_sign_in_keeps_the_server_message() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/auth/signin")
            .with_status(401)
            .with_body(r#"{"message":"Invalid email or password","success":false}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), MemoryStorage::default());
        let err = client.sign_in("a@b.c", "wrong").await.unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 401, .. }));
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[tokio::test]
    async fn unsuccessful_envelope_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/mock/fetch-api")
            .with_status(200)
            .with_body(r#"{"statusCode":404,"data":[],"message":"Chat not found","success":false}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), authed_store());
        let err = client.fetch_endpoints("c1").await.unwrap_err();
        assert_eq!(err.to_string(), "Chat not found");
    }

    #[tokio::test]
    async fn authenticated_calls_need_a_token() {
        let client = ApiClient::new("http://127.0.0.1:1", MemoryStorage::default());
        let err = client.fetch_messages("c1").await.unwrap_err();
        assert!(matches!(err, ApiError::MissingToken));
    }

    #[tokio::test]
    async fn generate_posts_wire_body_and_returns_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/message/generate")
            .match_body(Matcher::Json(json!({ "chatId": "c1", "message": "users api", "role": "USER" })))
            .with_status(200)
            .with_body(r#"{"statusCode":200,"data":{"modelMessage":"Here you go"},"message":"","success":true}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), authed_store());
        let reply = client.generate("c1", "users api").await.unwrap();

        assert_eq!(reply, "Here you go");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn endpoint_test_reports_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/mock/c1/api/users")
            .match_body(Matcher::Json(json!({ "name": "New User" })))
            .with_status(422)
            .with_body(r#"{"error":"email required"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), authed_store());
        let ep = MockEndpoint {
            id: "e2".into(),
            method: "post".into(),
            path: "/api/users".into(),
            description: "Create a new user".into(),
            request_body: Some(json!({ "name": "New User" })),
            response_body: json!({}),
            status_code: 201,
        };
        let res = client.test_endpoint("c1", &ep).await.unwrap();

        assert_eq!(res.status, 422);
        assert!(res.body.contains("email required"));
    }
}
