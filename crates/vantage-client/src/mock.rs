//! In-memory [`Transport`] for tests and offline demos.
//!
//! Routes are keyed by method and [`HttpRequest::target`]. Each route holds a
//! queue of replies; the last reply repeats once the queue is down to one.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ApiError;
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};

#[derive(Debug, Clone)]
pub struct MockReply {
    status: u16,
    body: String,
    delay: Option<Duration>,
    network_error: bool,
}

impl MockReply {
    pub fn json<T: Serialize>(value: &T) -> Self {
        Self {
            status: 200,
            body: serde_json::to_string(value).unwrap_or_default(),
            delay: None,
            network_error: false,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            delay: None,
            network_error: false,
        }
    }

    pub fn no_content() -> Self {
        Self::status(204)
    }

    /// The call fails before any response is received.
    pub fn network_error() -> Self {
        Self {
            status: 0,
            body: String::new(),
            delay: None,
            network_error: true,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Hold the reply back; with a paused tokio clock this orders responses
    /// deterministically.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<MockReply>>>,
    log: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `method target`.
    pub fn on(&self, method: Method, target: &str, reply: MockReply) -> &Self {
        self.lock_routes()
            .entry((method, target.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    /// Drop any queued replies for the route and use `reply` from now on.
    pub fn replace(&self, method: Method, target: &str, reply: MockReply) -> &Self {
        self.lock_routes()
            .insert((method, target.to_string()), VecDeque::from([reply]));
        self
    }

    pub fn calls(&self, method: Method, target: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.target() == target)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.requests().len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn lock_routes(&self) -> std::sync::MutexGuard<'_, HashMap<(Method, String), VecDeque<MockReply>>> {
        self.routes.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_reply(&self, method: Method, target: &str) -> Option<MockReply> {
        let mut routes = self.lock_routes();
        let queue = routes.get_mut(&(method, target.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let target = req.target();
        let method = req.method;
        self.log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(req);

        let Some(reply) = self.next_reply(method, &target) else {
            return Ok(HttpResponse {
                status: 404,
                body: format!("no mock route for {} {}", method, target),
            });
        };

        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        if reply.network_error {
            return Err(ApiError::Network(format!("connection reset ({} {})", method, target)));
        }
        Ok(HttpResponse {
            status: reply.status,
            body: reply.body,
        })
    }
}
