//! JSON HTTP API over the progression service
//!
//! Listens on `server.bind:server.port` (default 127.0.0.1:9878) and accepts:
//! - GET  /ping               - liveness
//! - POST /users              - register the calling user
//! - GET  /progression        - full progression snapshot
//! - POST /quests/progress    - update quest progress / toggle
//! - POST /quests/smart/claim - claim a calories/protein reward
//! - GET  /quests/status      - today's state of every quest
//! - GET  /quests/smart       - smart quest targets and progress
//!
//! Every route except /ping needs the caller's id in `X-User-Id`. When an
//! auth token is configured, `X-NQ-Token` must match it on every request.

mod handlers;
mod types;

pub use types::{QuestProgressRequest, SmartClaimRequest};

use std::io::{Cursor, Read};
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use tiny_http::{Header, Response, Server};
use tracing::{debug, error, info};

use crate::progression::ProgressionService;
use handlers::{
    handle_daily_status, handle_progression, handle_quest_progress, handle_register,
    handle_smart_claim, handle_smart_data,
};

const AUTH_HEADER: &str = "X-NQ-Token";
const USER_HEADER: &str = "X-User-Id";
const MAX_BODY_BYTES: usize = 64 * 1024; // 64 KiB
const MAX_USER_ID_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Ping,
    Register,
    Progression,
    QuestProgress,
    SmartClaim,
    DailyStatus,
    SmartData,
}

impl Route {
    fn resolve(method: &str, path: &str) -> Option<Self> {
        let path = path.trim_end_matches('/');
        let route = match (method, path) {
            ("GET", "/ping") => Self::Ping,
            ("POST", "/users") => Self::Register,
            ("GET", "/progression") => Self::Progression,
            ("POST", "/quests/progress") => Self::QuestProgress,
            ("POST", "/quests/smart/claim") => Self::SmartClaim,
            ("GET", "/quests/status") => Self::DailyStatus,
            ("GET", "/quests/smart") => Self::SmartData,
            _ => return None,
        };
        Some(route)
    }

    fn has_body(self) -> bool {
        matches!(self, Self::QuestProgress | Self::SmartClaim)
    }
}

/// Bound listener, not yet serving
pub struct ProgressionHttpServer {
    server: Arc<Server>,
    auth_token: Option<String>,
}

impl ProgressionHttpServer {
    /// Bind to `addr` ("host:port"; port 0 picks a free one)
    pub fn bind(addr: &str, auth_token: Option<String>) -> Result<Self> {
        let server = Server::http(addr)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Failed to start server on {}", addr))?;
        Ok(Self {
            server: Arc::new(server),
            auth_token: auth_token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Start `workers` threads pulling requests off the shared listener
    pub fn spawn(self, service: Arc<ProgressionService>, workers: usize) -> ServerHandle {
        let addr = self.local_addr();
        let workers = workers.max(1);
        info!(
            "[nq:http] Server listening on http://{} ({} workers, auth: {})",
            addr.map_or_else(|| "?".to_string(), |a| a.to_string()),
            workers,
            if self.auth_token.is_some() {
                "enabled"
            } else {
                "disabled"
            }
        );

        let auth_token: Arc<Option<String>> = Arc::new(self.auth_token);
        let threads = (0..workers)
            .map(|_| {
                let server = Arc::clone(&self.server);
                let service = Arc::clone(&service);
                let auth_token = Arc::clone(&auth_token);
                thread::spawn(move || {
                    for request in server.incoming_requests() {
                        handle_request(&service, auth_token.as_deref(), request);
                    }
                })
            })
            .collect();

        ServerHandle {
            server: self.server,
            threads,
            addr,
        }
    }
}

/// Running server; dropping it leaves the workers running
pub struct ServerHandle {
    server: Arc<Server>,
    threads: Vec<JoinHandle<()>>,
    addr: Option<SocketAddr>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.addr
    }

    /// Block until every worker exits
    pub fn join(self) {
        for thread in self.threads {
            if thread.join().is_err() {
                error!("[nq:http] Worker thread panicked");
            }
        }
    }

    /// Stop accepting requests and wait for in-flight ones to finish
    pub fn shutdown(self) {
        // Each unblock releases exactly one waiting worker
        for _ in &self.threads {
            self.server.unblock();
        }
        self.join();
    }
}

fn handle_request(
    service: &ProgressionService,
    auth_token: Option<&str>,
    mut request: tiny_http::Request,
) {
    let method = request.method().to_string();
    let url = request.url().to_string();
    let path = url.split('?').next().unwrap_or(url.as_str());

    if !is_authorized(&request, auth_token) {
        respond_json(request, 401, serde_json::json!({ "error": "unauthorized" }));
        return;
    }

    let Some(route) = Route::resolve(&method, path) else {
        respond_json(request, 404, serde_json::json!({ "error": "not_found" }));
        return;
    };

    if route == Route::Ping {
        respond_json(
            request,
            200,
            serde_json::json!({
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION"),
            }),
        );
        return;
    }

    let Some(user_id) = caller_id(&request) else {
        respond_json(
            request,
            401,
            serde_json::json!({ "error": "missing_user_id" }),
        );
        return;
    };
    debug!("[nq:http] {} {} user={}", method, path, user_id);

    let body = if route.has_body() {
        match read_request_body(&mut request) {
            Ok(body) => body,
            Err(response) => {
                let _ = request.respond(response);
                return;
            }
        }
    } else {
        String::new()
    };

    match route {
        Route::Register => handle_register(service, &user_id, request),
        Route::Progression => handle_progression(service, &user_id, request),
        Route::QuestProgress => handle_quest_progress(service, &user_id, &body, request),
        Route::SmartClaim => handle_smart_claim(service, &user_id, &body, request),
        Route::DailyStatus => handle_daily_status(service, &user_id, request),
        Route::SmartData => handle_smart_data(service, &user_id, request),
        Route::Ping => {}
    }
}

fn header_value<'a>(request: &'a tiny_http::Request, name: &'static str) -> Option<&'a str> {
    request
        .headers()
        .iter()
        .find(|h| h.field.equiv(name))
        .map(|h| h.value.as_str())
}

fn is_authorized(request: &tiny_http::Request, expected: Option<&str>) -> bool {
    let Some(expected) = expected else {
        return true;
    };
    header_value(request, AUTH_HEADER) == Some(expected)
}

fn caller_id(request: &tiny_http::Request) -> Option<String> {
    header_value(request, USER_HEADER)
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_USER_ID_LEN)
        .map(str::to_string)
}

fn json_response(status_code: u16, body: String) -> Response<Cursor<Vec<u8>>> {
    let response = Response::from_string(body).with_status_code(status_code);
    match Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

fn read_request_body(
    request: &mut tiny_http::Request,
) -> Result<String, Response<Cursor<Vec<u8>>>> {
    let mut body = String::new();
    let mut reader = request.as_reader().take((MAX_BODY_BYTES + 1) as u64);
    if let Err(e) = reader.read_to_string(&mut body) {
        error!("[nq:http] Failed to read body: {}", e);
        return Err(json_response(
            400,
            "{\"error\":\"bad_request\"}".to_string(),
        ));
    }

    if body.len() > MAX_BODY_BYTES {
        return Err(json_response(
            413,
            "{\"error\":\"payload_too_large\"}".to_string(),
        ));
    }

    Ok(body)
}

fn respond_json(request: tiny_http::Request, status_code: u16, value: serde_json::Value) {
    let body =
        serde_json::to_string(&value).unwrap_or_else(|_| "{\"error\":\"serialize\"}".to_string());
    let _ = request.respond(json_response(status_code, body));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_resolution() {
        assert_eq!(Route::resolve("GET", "/ping"), Some(Route::Ping));
        assert_eq!(
            Route::resolve("POST", "/quests/progress/"),
            Some(Route::QuestProgress)
        );
        assert_eq!(Route::resolve("GET", "/quests/progress"), None);
        assert_eq!(Route::resolve("DELETE", "/users"), None);
        assert!(Route::SmartClaim.has_body());
        assert!(!Route::Register.has_body());
    }
}
