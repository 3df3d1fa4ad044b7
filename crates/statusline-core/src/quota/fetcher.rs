//! The background fetch: one GET against the usage endpoint, persisted for
//! the next render.
//!
//! Runs inside the detached worker process. The lock taken by the scheduler
//! is released exactly once on every exit path.

use std::time::Duration;

use reqwest::header::{ACCEPT, USER_AGENT};
use tracing::{info, warn};

use super::cache::QuotaCache;
use super::error_record::ErrorRecord;
use super::errors::FetchError;
use super::lock::RefreshLock;
use super::types::QuotaSnapshot;
use crate::errors::StatusError;

const ANTHROPIC_BETA: &str = "oauth-2025-04-20";
const CLIENT_USER_AGENT: &str = "claude-code/2.1.12";

/// Raw HTTP result before any policy is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageResponse {
    pub status: u16,
    pub body: String,
}

/// Source of usage data. Transport failures map to `Connection` or `Timeout`.
pub trait UsageSource {
    fn fetch_usage(&self, token: &str) -> Result<UsageResponse, FetchError>;
}

/// Blocking HTTPS client for `GET /api/oauth/usage`.
#[derive(Debug, Clone)]
pub struct HttpUsageSource {
    endpoint: String,
    timeout: Duration,
}

impl HttpUsageSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

impl UsageSource for HttpUsageSource {
    fn fetch_usage(&self, token: &str) -> Result<UsageResponse, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| FetchError::ClientInit {
                message: e.to_string(),
            })?;

        let response = client
            .get(&self.endpoint)
            .bearer_auth(token)
            .header("anthropic-beta", ANTHROPIC_BETA)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .send()
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = response.text().map_err(transport_error)?;
        Ok(UsageResponse { status, body })
    }
}

fn transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Connection {
            message: e.to_string(),
        }
    }
}

/// What a fetch attempt did.
#[derive(Debug)]
pub enum FetchOutcome {
    /// New snapshot persisted and error marker cleared.
    Updated,
    /// 401: credentials not propagated yet. Nothing written; retried next cycle.
    CredentialsPending,
    /// Failure recorded to the error log.
    Failed(FetchError),
}

/// Perform one fetch and persist its result.
///
/// - 200 with a JSON object body: cache written, error marker cleared.
/// - 401: silent, neither cache nor error log touched.
/// - anything else: message appended to the error log.
///
/// The lock is released before returning in every case.
pub fn run_fetch(
    source: &dyn UsageSource,
    token: &str,
    cache: &QuotaCache,
    errors: &ErrorRecord,
    lock: &RefreshLock,
) -> FetchOutcome {
    let held = lock.adopt();
    info!(event = "core.fetch.started");

    let outcome = match fetch_and_store(source, token, cache) {
        Ok(true) => {
            errors.clear();
            info!(event = "core.fetch.completed");
            FetchOutcome::Updated
        }
        Ok(false) => {
            info!(event = "core.fetch.credentials_pending");
            FetchOutcome::CredentialsPending
        }
        Err(e) => {
            warn!(
                event = "core.fetch.failed",
                error = %e,
                error_code = e.error_code()
            );
            errors.record(&e.to_string());
            FetchOutcome::Failed(e)
        }
    };

    held.release();
    outcome
}

/// Returns `Ok(false)` for the silent 401 case.
fn fetch_and_store(
    source: &dyn UsageSource,
    token: &str,
    cache: &QuotaCache,
) -> Result<bool, FetchError> {
    let response = source.fetch_usage(token)?;

    match response.status {
        200 => {
            validate_body(&response.body)?;
            cache.write(&response.body)?;
            Ok(true)
        }
        401 => Ok(false),
        status => Err(FetchError::HttpStatus { status }),
    }
}

/// Only a JSON object that deserializes as a snapshot may reach the cache.
fn validate_body(body: &str) -> Result<(), FetchError> {
    let invalid = |message: String| FetchError::InvalidBody { message };
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| invalid(e.to_string()))?;
    if !value.is_object() {
        return Err(invalid("response body is not a JSON object".to_string()));
    }
    serde_json::from_value::<QuotaSnapshot>(value).map_err(|e| invalid(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use tempfile::TempDir;

    /// Scripted source returning a fixed result.
    struct StubSource(fn() -> Result<UsageResponse, FetchError>);

    impl UsageSource for StubSource {
        fn fetch_usage(&self, _token: &str) -> Result<UsageResponse, FetchError> {
            (self.0)()
        }
    }

    struct Fixture {
        _temp: TempDir,
        cache: QuotaCache,
        errors: ErrorRecord,
        lock: RefreshLock,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let cache = QuotaCache::new(temp.path().join("quota.json"));
            let errors = ErrorRecord::new(
                temp.path().join("error"),
                temp.path().join("status.log"),
                50,
            );
            let lock = RefreshLock::new(temp.path().join("quota.lock"));
            assert!(lock.try_acquire());
            Self {
                _temp: temp,
                cache,
                errors,
                lock,
            }
        }

        fn run(&self, source: fn() -> Result<UsageResponse, FetchError>) -> FetchOutcome {
            run_fetch(
                &StubSource(source),
                "token",
                &self.cache,
                &self.errors,
                &self.lock,
            )
        }
    }

    fn ok_body() -> Result<UsageResponse, FetchError> {
        Ok(UsageResponse {
            status: 200,
            body: r#"{"five_hour":{"utilization":72,"resets_at":"2026-01-01T10:00:00Z"},"seven_day":{"utilization":30,"resets_at":"2026-01-05T10:00:00Z"}}"#.to_string(),
        })
    }

    fn unauthorized() -> Result<UsageResponse, FetchError> {
        Ok(UsageResponse {
            status: 401,
            body: String::new(),
        })
    }

    fn server_error() -> Result<UsageResponse, FetchError> {
        Ok(UsageResponse {
            status: 503,
            body: "unavailable".to_string(),
        })
    }

    fn malformed_body() -> Result<UsageResponse, FetchError> {
        Ok(UsageResponse {
            status: 200,
            body: "<html>oops</html>".to_string(),
        })
    }

    fn array_body() -> Result<UsageResponse, FetchError> {
        Ok(UsageResponse {
            status: 200,
            body: "[]".to_string(),
        })
    }

    fn connection_refused() -> Result<UsageResponse, FetchError> {
        Err(FetchError::Connection {
            message: "connection refused".to_string(),
        })
    }

    fn timed_out() -> Result<UsageResponse, FetchError> {
        Err(FetchError::Timeout)
    }

    #[test]
    fn test_success_writes_cache_and_releases_lock() {
        let fx = Fixture::new();

        let outcome = fx.run(ok_body);

        assert!(matches!(outcome, FetchOutcome::Updated));
        assert!(!fx.lock.is_held());
        let snapshot = fx.cache.read().unwrap();
        assert_eq!(snapshot.five_hour_window().unwrap().utilization, Some(72.0));
        assert!(!fx.errors.has_error());
    }

    #[test]
    fn test_lock_released_on_every_failure_path() {
        let failures: [fn() -> Result<UsageResponse, FetchError>; 5] = [
            server_error,
            malformed_body,
            array_body,
            connection_refused,
            timed_out,
        ];
        let expected = [
            "HTTP 503",
            "Invalid JSON",
            "Invalid JSON",
            "Connection failed",
            "Timeout",
        ];

        for (source, message) in failures.into_iter().zip(expected) {
            let fx = Fixture::new();

            let outcome = fx.run(source);

            assert!(matches!(outcome, FetchOutcome::Failed(_)), "{message}");
            assert!(!fx.lock.is_held(), "lock leaked after '{message}'");
            assert!(fx.errors.has_error());
            assert!(fx.errors.entries()[0].ends_with(message));
            assert!(fx.cache.read().is_none(), "cache must not change on '{message}'");
        }
    }

    #[test]
    fn test_unauthorized_is_silent() {
        let fx = Fixture::new();

        let outcome = fx.run(unauthorized);

        assert!(matches!(outcome, FetchOutcome::CredentialsPending));
        assert!(!fx.lock.is_held());
        assert!(!fx.errors.has_error());
        assert!(fx.errors.entries().is_empty());
        assert!(fx.cache.age().is_none(), "401 must not touch the cache");
    }

    #[test]
    fn test_unauthorized_keeps_previous_cache_and_error_state() {
        let fx = Fixture::new();
        fx.run(timed_out);
        assert!(fx.lock.try_acquire());
        fx.run(ok_body);
        assert!(fx.lock.try_acquire());

        fx.run(unauthorized);

        assert!(fx.cache.read().is_some());
        assert!(!fx.errors.has_error());
        assert_eq!(fx.errors.entries().len(), 1);
    }

    #[test]
    fn test_success_after_failure_clears_error() {
        let fx = Fixture::new();
        fx.run(server_error);
        assert!(fx.errors.has_error());

        assert!(fx.lock.try_acquire());
        fx.run(ok_body);

        assert!(!fx.errors.has_error());
        assert!(!fx.lock.is_held());
    }

    /// Serve one canned HTTP response and report the raw request.
    fn serve_once(response: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).unwrap();
            tx.send(String::from_utf8_lossy(&request).into_owned()).unwrap();
        });

        (format!("http://{}/api/oauth/usage", addr), rx)
    }

    #[test]
    fn test_http_source_sends_bearer_and_headers() {
        let (url, requests) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}",
        );
        let source = HttpUsageSource::new(url, Duration::from_secs(5));

        let response = source.fetch_usage("secret-token").unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, "{}");
        let request = requests.recv().unwrap().to_lowercase();
        assert!(request.starts_with("get /api/oauth/usage"));
        assert!(request.contains("authorization: bearer secret-token"));
        assert!(request.contains("anthropic-beta: oauth-2025-04-20"));
        assert!(request.contains("accept: application/json"));
        assert!(request.contains("user-agent: claude-code/2.1.12"));
    }

    #[test]
    fn test_http_source_reports_status() {
        let (url, _requests) = serve_once(
            "HTTP/1.1 401 Unauthorized\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let source = HttpUsageSource::new(url, Duration::from_secs(5));

        let response = source.fetch_usage("token").unwrap();
        assert_eq!(response.status, 401);
    }

    #[test]
    fn test_http_source_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = HttpUsageSource::new(format!("http://{}/", addr), Duration::from_secs(5));
        let result = source.fetch_usage("token");
        assert!(matches!(result, Err(FetchError::Connection { .. })));
    }

    #[test]
    fn test_http_source_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (_stream, _) = listener.accept().unwrap();
            std::thread::sleep(Duration::from_secs(3));
        });

        let source =
            HttpUsageSource::new(format!("http://{}/", addr), Duration::from_millis(200));
        let result = source.fetch_usage("token");
        assert!(matches!(result, Err(FetchError::Timeout)));
    }
}
