//! REST client abstraction
//!
//! [`RestClient`] is the seam between the workflows and the network.
//! [`HttpClient`] talks to a real ECE / Elasticsearch / Kibana endpoint with
//! basic auth; [`FakeRestClient`] replays scripted responses for tests.

use crate::config::{ConfigError, Credentials, HttpSettings};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub use reqwest::Method;

/// Failure of a single REST call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{method} {url} timed out after {secs}s")]
    Timeout {
        method: String,
        url: String,
        secs: u64,
    },

    #[error("{method} {url}: not found")]
    NotFound { method: String, url: String },

    #[error("{method} {url} returned HTTP {status}: {body}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("{method} {url} failed: {message}")]
    Transport {
        method: String,
        url: String,
        message: String,
    },

    #[error("{method} {url} returned invalid JSON: {message}")]
    InvalidJson {
        method: String,
        url: String,
        message: String,
    },
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

/// Synchronous JSON REST client
pub trait RestClient {
    /// Send a request to `path` (relative to the base URL) and decode the
    /// JSON response. An empty body decodes to `Value::Null`.
    fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, ApiError>;

    fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::GET, path, None)
    }

    fn post(&self, path: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        self.request(Method::POST, path, body)
    }

    fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::DELETE, path, None)
    }
}

/// Real client using blocking reqwest
pub struct HttpClient {
    credentials: Credentials,
    timeout_secs: u64,
    client: reqwest::blocking::Client,
}

impl HttpClient {
    pub fn new(credentials: Credentials, settings: &HttpSettings) -> Result<Self, ConfigError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            credentials,
            timeout_secs: settings.timeout_secs,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.credentials.base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.credentials.base_url, path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

impl RestClient for HttpClient {
    fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let transport = |e: reqwest::Error| {
            if e.is_timeout() {
                ApiError::Timeout {
                    method: method.to_string(),
                    url: url.clone(),
                    secs: self.timeout_secs,
                }
            } else {
                ApiError::Transport {
                    method: method.to_string(),
                    url: url.clone(),
                    message: e.to_string(),
                }
            }
        };

        let mut request = self
            .client
            .request(method.clone(), &url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(CONTENT_TYPE, "application/json")
            .header("kbn-xsrf", "true");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().map_err(transport)?;
        let status = response.status();
        let text = response.text().map_err(transport)?;
        debug!("{} {} -> {}", method, url, status);

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound {
                method: method.to_string(),
                url,
            });
        }

        if !status.is_success() {
            return Err(ApiError::Status {
                method: method.to_string(),
                url,
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| ApiError::InvalidJson {
            method: method.to_string(),
            url,
            message: e.to_string(),
        })
    }
}

/// A request seen by [`FakeRestClient`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Fake client for testing
///
/// Answers calls with scripted responses in order and records every call.
pub struct FakeRestClient {
    responses: Mutex<VecDeque<Result<Value, ApiError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeRestClient {
    pub fn new(responses: Vec<Result<Value, ApiError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A 404 response for a scripted call
    pub fn not_found(path: &str) -> Result<Value, ApiError> {
        Err(ApiError::NotFound {
            method: "DELETE".to_string(),
            url: path.to_string(),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Paths of all recorded calls, prefixed with the method
    pub fn call_log(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|call| format!("{} {}", call.method, call.path))
            .collect()
    }
}

impl RestClient for FakeRestClient {
    fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                method: method.clone(),
                path: path.to_string(),
                body: body.cloned(),
            });

        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| {
                Err(ApiError::Transport {
                    method: method.to_string(),
                    url: path.to_string(),
                    message: "no scripted response left".to_string(),
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    fn local_client(base_url: String, timeout_secs: u64) -> HttpClient {
        let credentials = Credentials {
            username: "admin".into(),
            password: "pw".into(),
            base_url,
        };
        let settings = HttpSettings {
            timeout_secs,
            accept_invalid_certs: false,
        };
        HttpClient::new(credentials, &settings).unwrap()
    }

    /// Answer one request with `response` and hand back the request head
    fn serve_once(response: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            head.to_lowercase()
        });

        (base_url, handle)
    }

    #[test]
    fn test_silent_server_times_out() {
        // Connections queue in the backlog and never get an answer
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = local_client(format!("http://{}", listener.local_addr().unwrap()), 1);

        let err = client.get("/api/v1/deployments").unwrap_err();

        assert!(
            matches!(err, ApiError::Timeout { ref method, secs: 1, .. } if method == "GET"),
            "unexpected error: {:?}",
            err
        );
        drop(listener);
    }

    #[test]
    fn test_404_is_not_found_and_headers_are_sent() {
        let (base_url, server) =
            serve_once("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let client = local_client(base_url, 5);

        let err = client.delete("/_security/role/claims_user_role").unwrap_err();

        assert!(err.is_not_found(), "unexpected error: {:?}", err);
        assert!(matches!(err, ApiError::NotFound { ref method, .. } if method == "DELETE"));

        let head = server.join().unwrap();
        assert!(head.starts_with("delete /_security/role/claims_user_role "));
        assert!(head.contains("authorization: basic ywrtaw46chc="));
        assert!(head.contains("content-type: application/json"));
        assert!(head.contains("kbn-xsrf: true"));
    }

    #[test]
    fn test_server_error_keeps_status_and_body() {
        let (base_url, server) = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 4\r\nConnection: close\r\n\r\nboom",
        );
        let client = local_client(base_url, 5);

        let err = client.get("/api/v1/deployments").unwrap_err();

        assert!(
            matches!(err, ApiError::Status { status: 500, ref body, .. } if body == "boom"),
            "unexpected error: {:?}",
            err
        );
        server.join().unwrap();
    }

    #[test]
    fn test_empty_success_body_is_null() {
        let (base_url, server) =
            serve_once("HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let client = local_client(base_url, 5);

        let value = client.delete("/api/v1/deployments/d1").unwrap();

        assert_eq!(value, Value::Null);
        server.join().unwrap();
    }

    #[test]
    fn test_success_body_is_decoded() {
        let (base_url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 12\r\nConnection: close\r\n\r\n{\"id\":\"d-1\"}",
        );
        let client = local_client(base_url, 5);

        let value = client.get("/api/v1/deployments/d-1").unwrap();

        assert_eq!(value, json!({ "id": "d-1" }));
        server.join().unwrap();
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://ece.example.com:12443/", "/api/v1/deployments"),
            "https://ece.example.com:12443/api/v1/deployments"
        );
        assert_eq!(
            join_url("https://kb", "s/ops/api/saved_objects/index-pattern/logs-*"),
            "https://kb/s/ops/api/saved_objects/index-pattern/logs-*"
        );
    }

    #[test]
    fn test_http_client_builds() {
        let credentials = Credentials {
            username: "admin".into(),
            password: "pw".into(),
            base_url: "https://ece.example.com".into(),
        };
        let client = HttpClient::new(credentials, &HttpSettings::default()).unwrap();
        assert_eq!(client.base_url(), "https://ece.example.com");
    }

    #[test]
    fn test_fake_client_replays_in_order() {
        let client = FakeRestClient::new(vec![
            Ok(json!({"id": "one"})),
            Ok(json!({"id": "two"})),
        ]);

        assert_eq!(client.get("/a").unwrap()["id"], "one");
        assert_eq!(client.post("/b", Some(&json!({"x": 1}))).unwrap()["id"], "two");
        assert!(client.delete("/c").is_err());

        let calls = client.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].method, Method::POST);
        assert_eq!(calls[1].body, Some(json!({"x": 1})));
        assert_eq!(client.call_log()[2], "DELETE /c");
    }

    #[test]
    fn test_not_found_helper() {
        let err = FakeRestClient::not_found("/gone").unwrap_err();
        assert!(err.is_not_found());
        assert!(!ApiError::Timeout {
            method: "GET".into(),
            url: "/x".into(),
            secs: 30
        }
        .is_not_found());
    }
}
