use std::sync::{Arc, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};

/// Called when any request comes back 401, before the error reaches the caller.
pub trait UnauthorizedHandler: Send + Sync {
    fn on_unauthorized(&self);
}

/// Shared HTTP client used by every service module. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    transport: Arc<dyn Transport>,
    token: RwLock<Option<String>>,
    on_unauthorized: RwLock<Option<Arc<dyn UnauthorizedHandler>>>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                transport,
                token: RwLock::new(None),
                on_unauthorized: RwLock::new(None),
            }),
        }
    }

    pub fn set_unauthorized_handler(&self, handler: Arc<dyn UnauthorizedHandler>) {
        *self
            .inner
            .on_unauthorized
            .write()
            .unwrap_or_else(|e| e.into_inner()) = Some(handler);
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.inner.token.write().unwrap_or_else(|e| e.into_inner()) = token;
    }

    pub fn has_token(&self) -> bool {
        self.inner
            .token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    fn token(&self) -> Option<String> {
        self.inner
            .token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    // -- JSON helpers --

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get_with_query(path, &[]).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let mut req = HttpRequest::new(Method::Get, path);
        req.query = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        decode(&self.send(req).await?)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        decode(&self.send(with_body(Method::Post, path, body)?).await?)
    }

    /// POST without a meaningful response body (logout, link, RSVP).
    pub async fn post_empty<B: Serialize>(&self, path: &str, body: Option<&B>) -> Result<(), ApiError> {
        let req = match body {
            Some(body) => with_body(Method::Post, path, body)?,
            None => HttpRequest::new(Method::Post, path),
        };
        self.send(req).await.map(|_| ())
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        decode(&self.send(with_body(Method::Patch, path, body)?).await?)
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        decode(&self.send(with_body(Method::Put, path, body)?).await?)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(HttpRequest::new(Method::Delete, path))
            .await
            .map(|_| ())
    }

    /// Issue one request. A 401 tears the session down before the error is
    /// returned; any other non-2xx becomes [`ApiError::Status`].
    pub async fn send(&self, mut req: HttpRequest) -> Result<HttpResponse, ApiError> {
        req.bearer = self.token();
        let method = req.method;
        let target = req.target();
        debug!("--> {} {}", method, target);

        let resp = match self.inner.transport.send(req).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("<-- {} {} failed: {}", method, target, e);
                return Err(e);
            }
        };
        debug!("<-- {} {} {}", method, target, resp.status);

        if resp.status == 401 {
            warn!("{} {} unauthorized, clearing session", method, target);
            self.set_token(None);
            let handler = self
                .inner
                .on_unauthorized
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .clone();
            if let Some(handler) = handler {
                handler.on_unauthorized();
            }
            return Err(ApiError::Unauthorized);
        }

        if !resp.is_success() {
            let message = error_message(&resp.body);
            warn!("{} {} returned {}: {}", method, target, resp.status, message);
            return Err(ApiError::Status {
                status: resp.status,
                message,
            });
        }

        Ok(resp)
    }
}

fn with_body<B: Serialize>(method: Method, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
    let mut req = HttpRequest::new(method, path);
    req.body = Some(serde_json::to_value(body)?);
    Ok(req)
}

fn decode<T: DeserializeOwned>(resp: &HttpResponse) -> Result<T, ApiError> {
    // 204s decode as JSON null so `()` and `Option<_>` targets still work.
    let body = if resp.body.trim().is_empty() { "null" } else { &resp.body };
    serde_json::from_str(body).map_err(ApiError::from)
}

/// Pull `message`/`error` out of a JSON error body, else the first 200 chars.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["message", "error"] {
            if let Some(msg) = value.get(field).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    body.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockReply, MockTransport};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler(AtomicUsize);

    impl UnauthorizedHandler for CountingHandler {
        fn on_unauthorized(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn unauthorized_runs_handler_then_errors() {
        let mock = Arc::new(MockTransport::new());
        mock.on(Method::Get, "/auth/profile", MockReply::status(401));
        let api = ApiClient::new(mock.clone());
        let handler = Arc::new(CountingHandler(AtomicUsize::new(0)));
        api.set_unauthorized_handler(handler.clone());
        api.set_token(Some("t0k3n".into()));

        let err = api.get::<serde_json::Value>("/auth/profile").await.unwrap_err();
        assert_eq!(err, ApiError::Unauthorized);
        assert_eq!(handler.0.load(Ordering::SeqCst), 1);
        assert!(!api.has_token());
        assert_eq!(mock.requests()[0].bearer.as_deref(), Some("t0k3n"));
    }

    #[tokio::test]
    async fn error_status_carries_server_message() {
        let mock = Arc::new(MockTransport::new());
        mock.on(
            Method::Post,
            "/companies",
            MockReply::status(422).with_body(r#"{"message":"name already taken"}"#),
        );
        let api = ApiClient::new(mock.clone());

        let err = api
            .post::<_, serde_json::Value>("/companies", &serde_json::json!({ "name": "x" }))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Status { status: 422, message: "name already taken".into() }
        );
        // one attempt, no retry
        assert_eq!(mock.calls(Method::Post, "/companies"), 1);
    }

    #[tokio::test]
    async fn empty_body_decodes_as_unit() {
        let mock = Arc::new(MockTransport::new());
        mock.on(Method::Patch, "/events/1", MockReply::no_content());
        let api = ApiClient::new(mock);

        let out: Result<(), _> = api.patch("/events/1", &serde_json::json!({})).await;
        assert!(out.is_ok());
    }

    #[test]
    fn error_message_falls_back_to_raw_text() {
        assert_eq!(error_message(r#"{"error":"nope"}"#), "nope");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(&"x".repeat(500)).len(), 200);
    }
}
