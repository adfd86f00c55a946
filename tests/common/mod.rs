//! Shared test helpers: a scripted in-memory `Transport` and fixtures.

#![allow(dead_code)]

use freebox_exporter::collectors::CollectionContext;
use freebox_exporter::config::MetricsConfig;
use freebox_exporter::error::{ExporterError, Result};
use freebox_exporter::freebox::types::ApiVersion;
use freebox_exporter::freebox::{FreeboxApi, FreeboxClient, Session, Transport};
use futures_util::future::BoxFuture;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

pub const BASE_URL: &str = "https://fbx.example:4242/api/v10/";
pub const SESSION_TOKEN: &str = "session-token-1";

/// Canned answer of the fake Freebox
#[derive(Debug, Clone)]
pub enum Reply {
    Ok(Value),
    AuthRequired,
    InvalidToken,
    Api(&'static str),
    /// Never answers
    Hang,
}

impl Reply {
    async fn resolve(self, method: &str, url: &str) -> Result<Value> {
        match self {
            Reply::Hang => std::future::pending().await,
            Reply::Ok(value) => Ok(value),
            Reply::AuthRequired => Err(ExporterError::AuthRequired),
            Reply::InvalidToken => Err(ExporterError::InvalidToken),
            Reply::Api(code) => Err(ExporterError::Api {
                method: method.to_string(),
                url: url.to_string(),
                code: code.to_string(),
                message: "scripted failure".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub token: Option<String>,
    pub body: Option<Value>,
}

/// In-memory Freebox
///
/// Replies are queued per `METHOD path`; the last reply of a queue is
/// repeated forever. Unknown routes answer `not_found`.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Transport answering the login sequence
    pub fn with_login() -> Arc<Self> {
        let transport = Self::new();
        transport.on("GET", "login/", Reply::Ok(json!({"challenge": "abc123", "logged_in": false})));
        transport.on(
            "POST",
            "login/session/",
            Reply::Ok(json!({"session_token": SESSION_TOKEN})),
        );
        transport
    }

    pub fn on(&self, method: &str, path: &str, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .entry(format!("{method} {path}"))
            .or_default()
            .push_back(reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }

    fn answer(
        &self,
        method: &'static str,
        url: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Reply {
        let path = url.strip_prefix(BASE_URL).unwrap_or(url).to_string();
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.clone(),
            token: token.map(str::to_string),
            body: body.cloned(),
        });

        let mut routes = self.routes.lock().unwrap();
        let reply = match routes.get_mut(&format!("{method} {path}")) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        reply.unwrap_or(Reply::Api("not_found"))
    }
}

impl Transport for FakeTransport {
    fn get<'a>(
        &'a self,
        url: &'a str,
        session_token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Value>> {
        let reply = self.answer("GET", url, None, session_token);
        Box::pin(reply.resolve("GET", url))
    }

    fn post<'a>(
        &'a self,
        url: &'a str,
        body: Option<&'a Value>,
        session_token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Value>> {
        let reply = self.answer("POST", url, body, session_token);
        Box::pin(reply.resolve("POST", url))
    }
}

pub fn api_version() -> ApiVersion {
    ApiVersion {
        api_domain: "fbx.example".to_string(),
        uid: "23b86ec8091013d668829fe12791fdab".to_string(),
        https_available: true,
        https_port: 4242,
        device_name: "Freebox Server".to_string(),
        api_version: "10.2".to_string(),
        api_base_url: "/api/".to_string(),
        device_type: "FreeboxServer7,1".to_string(),
    }
}

pub fn freebox_api() -> FreeboxApi {
    FreeboxApi::negotiate(api_version(), 0).expect("valid api")
}

pub fn app_token() -> SecretString {
    SecretString::from("dyNYgfK0Ya6FWGqq83sBHa7TwzWo+pg4fDFUJHShcjVYzTfaRrZzm93p7OTAfH/0")
}

pub async fn open_session(transport: Arc<FakeTransport>) -> Session {
    Session::open(transport, freebox_api(), "fr.freebox.exporter", app_token())
        .await
        .expect("login")
}

pub async fn client(transport: Arc<FakeTransport>) -> Arc<FreeboxClient> {
    Arc::new(FreeboxClient::new(open_session(transport).await))
}

pub fn context(client: Arc<FreeboxClient>, host_details: bool) -> CollectionContext {
    CollectionContext {
        client,
        config: Arc::new(MetricsConfig {
            host_details,
            scrape_timeout_seconds: 30,
        }),
    }
}
