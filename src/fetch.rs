//! Image download over a blocking HTTP transport
//!
//! [`fetch`] issues a single `GET`, accepts only status 200 and copies the
//! body into a caller-owned buffer. A body longer than the buffer is rejected
//! before anything is copied.
//!
//! The transport itself (connection, TLS, header parsing) sits behind
//! [`HttpTransport`]. With the `std` feature,
//! [`ReqwestTransport`](crate::transport::ReqwestTransport) provides one.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::error::Error;

/// Request method used for image downloads
pub const METHOD_GET: &str = "GET";

/// Header sent with every image request
pub const ACCEPT_OCTET_STREAM: Header<'static> = Header {
    key: "Accept",
    value: "application/octet-stream",
};

/// HTTP status accepted as success
pub const STATUS_OK: u16 = 200;

/// A request header
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header<'a> {
    /// Header name
    pub key: &'a str,
    /// Header value
    pub value: &'a str,
}

/// Request handed to the transport
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Request<'a> {
    /// Server host, optionally with `:port`
    pub host: &'a str,
    /// Request method
    pub method: &'a str,
    /// Request path
    pub path: &'a str,
    /// Extra headers
    pub headers: &'a [Header<'a>],
    /// Request body (empty for `GET`)
    pub body: &'a [u8],
    /// Timeout for the whole exchange in milliseconds
    pub timeout_ms: u32,
}

impl Request<'_> {
    /// `http://host/path` form of the request target
    pub fn url(&self) -> alloc::string::String {
        alloc::format!("http://{}{}", self.host, self.path)
    }
}

/// Response returned by the transport
///
/// Owned by [`fetch`] for the duration of one request and dropped on every
/// exit path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code
    pub status_code: u16,
    /// Response body
    pub body: Vec<u8>,
}

/// Blocking HTTP client
///
/// ## Implementing
///
/// Return `Err` only when no HTTP response was obtained. Non-200 statuses
/// are regular responses; [`fetch`] classifies them.
pub trait HttpTransport {
    /// Error type for transport failures
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Perform one request and return the full response
    fn request(&mut self, request: &Request<'_>) -> Result<Response, Self::Error>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &mut T {
    type Error = T::Error;

    fn request(&mut self, request: &Request<'_>) -> Result<Response, Self::Error> {
        (**self).request(request)
    }
}

/// Download `host` + `path` into `buffer`
///
/// Returns the number of bytes written, which is the full body length.
///
/// # Errors
///
/// - `Error::Transport` if no response was obtained
/// - `Error::ServerStatus` for any status other than 200
/// - `Error::CapacityExceeded` if the body is longer than `buffer`; `buffer` is left untouched
///
/// ## Example
///
/// ```
/// use http_image_display::fetch::{fetch, HttpTransport, Request, Response};
///
/// struct Fixed;
/// impl HttpTransport for Fixed {
///     type Error = ();
///     fn request(&mut self, _request: &Request<'_>) -> Result<Response, ()> {
///         Ok(Response { status_code: 200, body: vec![1, 2, 3] })
///     }
/// }
///
/// let mut buffer = [0u8; 8];
/// let written = fetch(&mut Fixed, "10.0.0.2", "/image.bin", 10_000, &mut buffer);
/// assert_eq!(written, Ok(3));
/// assert_eq!(&buffer[..3], &[1, 2, 3]);
/// ```
pub fn fetch<T: HttpTransport>(
    transport: &mut T,
    host: &str,
    path: &str,
    timeout_ms: u32,
    buffer: &mut [u8],
) -> Result<usize, Error> {
    let headers = [ACCEPT_OCTET_STREAM];
    let request = Request {
        host,
        method: METHOD_GET,
        path,
        headers: &headers,
        body: &[],
        timeout_ms,
    };

    log::debug!("Downloading image from {}", request.url());

    let response = transport.request(&request).map_err(|e| {
        log::error!("HTTP request failed: {:?}", e);
        Error::Transport
    })?;

    log::debug!("HTTP response status: {}", response.status_code);
    log::debug!("Response body length: {} bytes", response.body.len());

    if response.status_code != STATUS_OK {
        log::error!("HTTP server returned error: {}", response.status_code);
        return Err(Error::ServerStatus {
            status: response.status_code,
        });
    }

    let body_len = response.body.len();
    if body_len > buffer.len() {
        log::error!(
            "Downloaded data ({} bytes) exceeds buffer size ({} bytes)",
            body_len,
            buffer.len()
        );
        return Err(Error::CapacityExceeded {
            body_len,
            capacity: buffer.len(),
        });
    }

    buffer[..body_len].copy_from_slice(&response.body);
    log::debug!("Successfully downloaded {} bytes", body_len);
    Ok(body_len)
}
