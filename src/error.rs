//! Error types for the fetch-and-render pipeline
//!
//! This module defines error types for configuration building ([`BuilderError`])
//! and for the download/render cycle ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`Error`] - Runtime errors raised by the fetcher, the renderer or the link handler
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level SPI/GPIO errors of the panel driver
//!
//! Collaborator errors (HTTP transport, panel) are logged where they are mapped
//! into [`Error`]; the variant only records which stage failed.
//!
//! ## Example
//!
//! ```
//! use http_image_display::{Builder, BuilderError, Dimensions};
//!
//! // Missing dimensions
//! let result = Builder::new().host("10.0.0.2").path("/image.bin").build();
//! assert!(matches!(result, Err(BuilderError::MissingDimensions)));
//!
//! // Invalid dimensions
//! let result = Dimensions::new(500, 1000); // Width not byte-aligned
//! assert!(result.is_err());
//! ```

/// Maximum gate outputs (rows) supported by SSD1677 controller
///
/// NOTE: The 4.26" panel wires 480 of them.
pub const MAX_GATE_OUTPUTS: u16 = 680;

/// Maximum source outputs (columns) supported by SSD1677 controller
pub const MAX_SOURCE_OUTPUTS: u16 = 960;

/// Errors that can occur during one download-render cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// The HTTP transport could not complete the request
    ///
    /// Connection, DNS, timeout and I/O failures all land here.
    Transport,
    /// The server answered with a status other than 200
    ServerStatus {
        /// HTTP status code returned by the server
        status: u16,
    },
    /// The response body does not fit the destination buffer
    ///
    /// Nothing has been copied when this is returned.
    CapacityExceeded {
        /// Length of the response body in bytes
        body_len: usize,
        /// Capacity of the caller's buffer in bytes
        capacity: usize,
    },
    /// A frame-sized allocation failed
    ResourceExhausted {
        /// Number of bytes that were requested
        requested: usize,
    },
    /// The panel could not be brought up
    ///
    /// Either the control interface is already active or the hardware did not respond.
    PanelInit,
    /// A panel command failed after initialization
    PanelRender,
    /// A frame buffer is too small for the panel
    ///
    /// The provided buffer must be at least `dimensions.frame_size()` bytes.
    BufferTooSmall {
        /// Required buffer size in bytes
        required: usize,
        /// Provided buffer size in bytes
        provided: usize,
    },
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Transport => write!(f, "HTTP transport error"),
            Self::ServerStatus { status } => write!(f, "HTTP server returned status {status}"),
            Self::CapacityExceeded { body_len, capacity } => write!(
                f,
                "Downloaded data ({body_len} bytes) exceeds buffer size ({capacity} bytes)"
            ),
            Self::ResourceExhausted { requested } => {
                write!(f, "Failed to allocate {requested} bytes")
            }
            Self::PanelInit => write!(f, "e-Paper module initialization failed"),
            Self::PanelRender => write!(f, "e-Paper panel command failed"),
            Self::BufferTooSmall { required, provided } => write!(
                f,
                "Buffer too small: required {required} bytes, provided {provided}"
            ),
        }
    }
}

impl core::error::Error for Error {}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before the pipeline is created.
#[derive(Debug, PartialEq, Eq)]
pub enum BuilderError {
    /// Dimensions were not specified
    ///
    /// [`Builder::dimensions()`](crate::config::Builder::dimensions) must be called before building.
    MissingDimensions,
    /// Invalid dimensions provided
    ///
    /// See [`Dimensions::new()`](crate::config::Dimensions::new) for constraints.
    InvalidDimensions {
        /// Width in pixels (source outputs)
        width: u16,
        /// Height in pixels (gate outputs)
        height: u16,
    },
    /// The image server host is missing or empty
    MissingHost,
    /// The image path is missing or empty
    MissingPath,
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingDimensions => write!(f, "Dimensions must be specified"),
            Self::InvalidDimensions { width, height } => write!(
                f,
                "Invalid dimensions {width}x{height} (max {MAX_SOURCE_OUTPUTS}x{MAX_GATE_OUTPUTS}, width must be multiple of 8)"
            ),
            Self::MissingHost => write!(f, "Image host must be a non-empty string"),
            Self::MissingPath => write!(f, "Image path must be a non-empty string"),
        }
    }
}

impl core::error::Error for BuilderError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_capacity_message_names_both_sizes() {
        let err = Error::CapacityExceeded {
            body_len: 48_100,
            capacity: 48_000,
        };
        assert_eq!(
            err.to_string(),
            "Downloaded data (48100 bytes) exceeds buffer size (48000 bytes)"
        );
    }

    #[test]
    fn test_server_status_message() {
        let err = Error::ServerStatus { status: 404 };
        assert_eq!(err.to_string(), "HTTP server returned status 404");
    }
}
