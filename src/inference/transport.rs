//! The one outbound call the orchestrator makes, behind a trait.
//!
//! Production uses [`ReqwestTransport`] (blocking reqwest with a per-request
//! timeout). Tests substitute scripted fakes.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;

use crate::domain::NetworkErrorKind;
use crate::error::{AppError, EXIT_CONFIG};

/// Raw HTTP response: status and body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure before a status code was received (or while reading the body).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: NetworkErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: NetworkErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for TransportError {}

/// POST `body` to `url` with `headers`; one call per attempt.
pub trait Transport {
    fn send(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &[u8],
    ) -> Result<TransportResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &[u8],
    ) -> Result<TransportResponse, TransportError> {
        (**self).send(url, headers, body)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &[u8],
    ) -> Result<TransportResponse, TransportError> {
        (**self).send(url, headers, body)
    }
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Client whose every request (connect + body) is bounded by `timeout`.
    ///
    /// Redirects are not followed: a 3xx is the attempt's answer.
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|e| AppError::new(EXIT_CONFIG, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &[u8],
    ) -> Result<TransportResponse, TransportError> {
        let mut req = self.client.post(url);
        for (name, value) in headers {
            req = req.header(name.as_str(), value.as_str());
        }

        let resp = req.body(body.to_vec()).send().map_err(classify)?;
        let status = resp.status().as_u16();
        let bytes = resp.bytes().map_err(classify)?;

        Ok(TransportResponse::new(status, bytes.to_vec()))
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    let kind = if err.is_timeout() {
        NetworkErrorKind::Timeout
    } else if err.is_connect() {
        NetworkErrorKind::Connect
    } else {
        NetworkErrorKind::Other
    };
    TransportError::new(kind, err.to_string())
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Instant;

    use super::*;

    /// Loopback listener that serves `handle` for one connection.
    fn serve_once<F>(handle: F) -> String
    where
        F: FnOnce(std::net::TcpStream) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                handle(stream);
            }
        });
        format!("http://{addr}/predict")
    }

    #[test]
    fn success_range() {
        assert!(TransportResponse::new(200, "").is_success());
        assert!(TransportResponse::new(204, "").is_success());
        assert!(!TransportResponse::new(301, "").is_success());
        assert!(!TransportResponse::new(401, "").is_success());
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        // Port 9 on loopback (discard) is closed on any normal test host.
        let err = transport
            .send("http://127.0.0.1:9/predict", &[], b"{}")
            .unwrap_err();
        assert!(!err.message.is_empty());
    }

    #[test]
    fn silent_server_times_out() {
        let url = serve_once(|stream| {
            thread::sleep(Duration::from_secs(3));
            drop(stream);
        });
        let transport = ReqwestTransport::new(Duration::from_millis(300)).unwrap();

        let started = Instant::now();
        let err = transport.send(&url, &[], b"{}").unwrap_err();
        let elapsed = started.elapsed();

        assert_eq!(err.kind, NetworkErrorKind::Timeout);
        assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
    }

    #[test]
    fn redirects_are_reported_not_followed() {
        let url = serve_once(|mut stream| {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(
                b"HTTP/1.1 302 Found\r\n\
                  Location: http://127.0.0.1:9/elsewhere\r\n\
                  Content-Length: 0\r\n\
                  Connection: close\r\n\r\n",
            );
        });
        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();

        let resp = transport.send(&url, &[], b"{}").unwrap();
        assert_eq!(resp.status, 302);
        assert!(!resp.is_success());
    }
}
