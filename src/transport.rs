//! Blocking HTTP transport backed by `reqwest`

use std::string::String;
use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::Client;

use crate::fetch::{HttpTransport, Request, Response};

/// Errors raised by [`ReqwestTransport`]
#[derive(Debug)]
pub enum TransportError {
    /// The request method is not a valid HTTP token
    InvalidMethod(String),
    /// Connection, timeout or protocol failure
    Http(reqwest::Error),
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidMethod(method) => write!(f, "Invalid HTTP method: {method}"),
            Self::Http(e) => write!(f, "HTTP error: {e}"),
        }
    }
}

impl core::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::InvalidMethod(_) => None,
            Self::Http(e) => Some(e),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

/// [`HttpTransport`] over a reusable `reqwest` blocking client
///
/// The per-request timeout covers connect, send and the whole body read.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with a fresh connection pool
    ///
    /// # Errors
    ///
    /// Fails if the underlying client cannot be constructed.
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    type Error = TransportError;

    fn request(&mut self, request: &Request<'_>) -> Result<Response, Self::Error> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| TransportError::InvalidMethod(String::from(request.method)))?;

        let mut builder = self
            .client
            .request(method, request.url())
            .timeout(Duration::from_millis(u64::from(request.timeout_ms)));
        for header in request.headers {
            builder = builder.header(header.key, header.value);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.to_vec());
        }

        let response = builder.send()?;
        let status_code = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        Ok(Response { status_code, body })
    }
}
