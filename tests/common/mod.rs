//! Shared fixtures for integration tests: a scripted in-process API server.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jobboard::api::{ApiClient, ApiError, PreparedRequest, RawResponse, Transport};
use jobboard::storage::{MemorySessionStorage, SessionStorage};
use jobboard::{AppContext, Store};
use reqwest::Method;

struct Route {
    method: Method,
    path: String,
    responses: VecDeque<RawResponse>,
}

/// Answers requests from scripted routes and records everything it receives.
///
/// A route keeps answering with its last response once the queue is down to one.
#[derive(Clone, Default)]
pub struct FakeServer {
    routes: Arc<Mutex<Vec<Route>>>,
    received: Arc<Mutex<Vec<PreparedRequest>>>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, method: Method, path: &str, status: u16, body: &str) -> &Self {
        let mut routes = self.routes.lock().unwrap();
        match routes.iter_mut().find(|r| r.method == method && r.path == path) {
            Some(route) => route.responses.push_back(RawResponse::new(status, body)),
            None => routes.push(Route {
                method,
                path: path.to_string(),
                responses: VecDeque::from([RawResponse::new(status, body)]),
            }),
        }
        self
    }

    pub fn received(&self) -> Vec<PreparedRequest> {
        self.received.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.received()
            .iter()
            .filter(|r| r.method == method && r.url.ends_with(path))
            .count()
    }
}

#[async_trait]
impl Transport for FakeServer {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, ApiError> {
        self.received.lock().unwrap().push(request.clone());

        let path = request
            .url
            .strip_prefix(BASE_URL)
            .unwrap_or(&request.url)
            .to_string();

        let mut routes = self.routes.lock().unwrap();
        let route = routes
            .iter_mut()
            .find(|r| r.method == request.method && r.path == path);

        match route {
            Some(route) if route.responses.len() > 1 => Ok(route.responses.pop_front().unwrap()),
            Some(route) => Ok(route.responses.front().cloned().unwrap()),
            None => Ok(RawResponse::new(404, r#"{"message":"Route not found"}"#)),
        }
    }
}

pub const BASE_URL: &str = "http://jobboard.test/api";

pub fn context(server: &FakeServer) -> AppContext<FakeServer> {
    context_with_storage(server, Arc::new(MemorySessionStorage::new()))
}

pub fn context_with_storage(server: &FakeServer, storage: Arc<dyn SessionStorage>) -> AppContext<FakeServer> {
    AppContext::new(ApiClient::new(BASE_URL, server.clone()), Store::new(), storage)
}

pub fn user_json(id: &str, role: &str, verification: Option<&str>) -> String {
    let verification = verification
        .map(|v| format!(r#","verificationStatus":"{v}""#))
        .unwrap_or_default();
    format!(r#"{{"_id":"{id}","name":"User {id}","email":"{id}@example.com","role":"{role}"{verification}}}"#)
}

pub fn session_json(id: &str, role: &str, verification: Option<&str>) -> String {
    format!(r#"{{"user":{},"token":"token-{id}"}}"#, user_json(id, role, verification))
}

pub fn job_json(id: &str, title: &str, recruiter: &str) -> String {
    format!(
        r#"{{"_id":"{id}","title":"{title}","description":"Write Rust services","requirements":["Rust"],"location":"Berlin","jobType":"full-time","recruiter":"{recruiter}","status":"open"}}"#
    )
}

pub fn application_json(id: &str, job_id: &str, status: &str) -> String {
    format!(r#"{{"_id":"{id}","jobId":"{job_id}","status":"{status}"}}"#)
}
