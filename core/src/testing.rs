//! Scripted `Transport` for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::client::Client;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::session::Session;
use crate::types::TokenPair;

pub const BASE_URL: &str = "http://platform.test";

struct Route {
    method: HttpMethod,
    path: String,
    replies: VecDeque<(HttpResponse, Duration)>,
}

/// Replays canned responses keyed by method and URL suffix, and records
/// every request it sees. Unscripted requests get a 599.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, method: HttpMethod, path: &str, status: u16, body: Value) -> Self {
        self.on_delayed(method, path, status, body, Duration::ZERO)
    }

    pub fn on_delayed(self, method: HttpMethod, path: &str, status: u16, body: Value, delay: Duration) -> Self {
        {
            let mut routes = self.routes.lock().unwrap();
            let reply = (HttpResponse::new(status, body), delay);
            match routes.iter_mut().find(|r| r.method == method && r.path == path) {
                Some(route) => route.replies.push_back(reply),
                None => routes.push(Route {
                    method,
                    path: path.to_string(),
                    replies: VecDeque::from([reply]),
                }),
            }
        }
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last(&self) -> HttpRequest {
        self.requests().last().cloned().expect("no request recorded")
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.seen.lock().unwrap().push(request.clone());
        let reply = {
            let mut routes = self.routes.lock().unwrap();
            routes
                .iter_mut()
                .find(|r| r.method == request.method && request.url.ends_with(&r.path) && !r.replies.is_empty())
                .and_then(|r| r.replies.pop_front())
        };
        match reply {
            Some((response, delay)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(response)
            }
            None => Ok(HttpResponse::new(599, Value::String(format!("unscripted {}", request.url)))),
        }
    }
}

/// Client over `transport`, keeping a handle for assertions.
pub fn client(transport: ScriptedTransport) -> (Client, Arc<ScriptedTransport>) {
    let transport = Arc::new(transport);
    let client = Client::with_transport(BASE_URL, transport.clone());
    (client, transport)
}

/// Session over `transport` holding the pair `a1`/`r1`.
pub fn session(transport: ScriptedTransport) -> (Session, Arc<ScriptedTransport>) {
    let (client, transport) = client(transport);
    (Session::from_tokens(client, TokenPair::new("a1", "r1")), transport)
}

pub fn project_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "owner": {"id": 1, "first_name": "Alice"},
        "name": name,
        "created_at": "2024-05-01T12:00:00"
    })
}

pub fn section_json(id: i64, project: Value, name: &str) -> Value {
    json!({
        "id": id,
        "project": project,
        "name": name,
        "created_at": "2024-05-02T12:00:00"
    })
}

pub fn sentence_json(id: i64, section: Value, text: &str) -> Value {
    json!({
        "id": id,
        "section": section,
        "sentence": text,
        "created_at": "2024-05-03T12:00:00Z"
    })
}

pub fn translation_json(id: i64, sentence: Value, text: &str, voters: Option<Value>) -> Value {
    let mut body = json!({
        "id": id,
        "translator": {"id": 2, "first_name": "Bob"},
        "sentence": sentence,
        "translation": text,
        "is_approved": false,
        "created_at": "2024-05-04T12:00:00Z"
    });
    if let Some(voters) = voters {
        body["voters"] = voters;
    }
    body
}

pub fn page_json(count: u64, next: Option<u32>, previous: Option<u32>, results: Vec<Value>) -> Value {
    let link = |page: Option<u32>| page.map(|p| format!("{BASE_URL}/api/v1/items/?page={p}&page_size=25"));
    json!({
        "count": count,
        "next": link(next),
        "previous": link(previous),
        "results": results
    })
}
