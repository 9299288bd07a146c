//! Pipeline configuration types and builder

use alloc::string::String;

pub use crate::error::{BuilderError, MAX_GATE_OUTPUTS, MAX_SOURCE_OUTPUTS};

/// Default HTTP request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u32 = 10_000;

/// Width of the 4.26" panel in pixels
pub const PANEL_4IN26_WIDTH: u16 = 800;

/// Height of the 4.26" panel in pixels
pub const PANEL_4IN26_HEIGHT: u16 = 480;

/// Panel dimensions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    /// Width in pixels (source outputs, packed 8 per byte)
    pub width: u16,
    /// Height in pixels (gate outputs)
    pub height: u16,
}

impl Dimensions {
    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if:
    /// - width is 0, exceeds MAX_SOURCE_OUTPUTS or is not a multiple of 8
    /// - height is 0 or exceeds MAX_GATE_OUTPUTS
    pub fn new(width: u16, height: u16) -> Result<Self, BuilderError> {
        if width == 0 || width > MAX_SOURCE_OUTPUTS || width % 8 != 0 {
            return Err(BuilderError::InvalidDimensions { width, height });
        }
        if height == 0 || height > MAX_GATE_OUTPUTS {
            return Err(BuilderError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Bytes in one packed row
    pub fn row_bytes(&self) -> usize {
        self.width as usize / 8
    }

    /// Exact byte count of one full monochrome frame
    ///
    /// ```
    /// use http_image_display::Dimensions;
    ///
    /// let Ok(dims) = Dimensions::new(800, 480) else {
    ///     return;
    /// };
    /// assert_eq!(dims.frame_size(), 48_000);
    /// ```
    pub fn frame_size(&self) -> usize {
        self.row_bytes() * self.height as usize
    }
}

/// Canvas rotation relative to the panel's native orientation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    /// No rotation
    #[default]
    Rotate0,
    /// Rotate 90 degrees clockwise
    Rotate90,
    /// Rotate 180 degrees
    Rotate180,
    /// Rotate 270 degrees clockwise
    Rotate270,
}

/// Credentials handed to the network manager when joining a network
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetworkCredentials {
    /// Network name
    pub ssid: String,
    /// Passphrase (empty for open networks)
    pub password: String,
}

/// Pipeline configuration
///
/// Everything the link handler needs to run a cycle. Use [`Builder`] to create one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Panel dimensions; fixes the expected frame size
    pub dimensions: Dimensions,
    /// Rotation used for the diagnostic banner canvas
    pub rotation: Rotation,
    /// Image server host (name or address, optionally with `:port`)
    pub host: String,
    /// Request path of the raw frame, starting with `/`
    pub path: String,
    /// HTTP request timeout in milliseconds
    pub timeout_ms: u32,
    /// Network credentials, if the network manager needs them
    pub credentials: Option<NetworkCredentials>,
}

impl Config {
    /// Expected frame size in bytes for the configured panel
    pub fn frame_size(&self) -> usize {
        self.dimensions.frame_size()
    }

    /// Configuration for the 4.26" 800x480 panel
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingHost` / `BuilderError::MissingPath` for empty strings.
    pub fn panel_4in26(host: &str, path: &str) -> Result<Self, BuilderError> {
        Builder::new()
            .dimensions(Dimensions {
                width: PANEL_4IN26_WIDTH,
                height: PANEL_4IN26_HEIGHT,
            })
            .host(host)
            .path(path)
            .build()
    }
}

/// Builder for constructing pipeline configuration
///
/// # Example
///
/// ```rust
/// use http_image_display::{Builder, Dimensions, Rotation};
///
/// let dims = match Dimensions::new(800, 480) {
///     Ok(dims) => dims,
///     Err(_) => return,
/// };
/// let config = match Builder::new()
///     .dimensions(dims)
///     .host("74.82.197.217")
///     .path("/image.bin")
///     .rotation(Rotation::Rotate0)
///     .build()
/// {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// assert_eq!(config.timeout_ms, 10_000);
/// ```
#[must_use]
#[derive(Debug)]
pub struct Builder {
    dimensions: Option<Dimensions>,
    rotation: Rotation,
    host: String,
    path: String,
    timeout_ms: u32,
    credentials: Option<NetworkCredentials>,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            dimensions: None,
            rotation: Rotation::Rotate0,
            host: String::new(),
            path: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            credentials: None,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set panel dimensions (required)
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions = Some(dims);
        self
    }

    /// Set banner canvas rotation
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the image server host (required)
    pub fn host(mut self, host: &str) -> Self {
        self.host = String::from(host);
        self
    }

    /// Set the image request path (required)
    pub fn path(mut self, path: &str) -> Self {
        self.path = String::from(path);
        self
    }

    /// Set the HTTP request timeout
    pub fn timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set network credentials
    pub fn credentials(mut self, ssid: &str, password: &str) -> Self {
        self.credentials = Some(NetworkCredentials {
            ssid: String::from(ssid),
            password: String::from(password),
        });
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingDimensions` if dimensions were not set,
    /// `BuilderError::InvalidDimensions` if they were constructed by hand outside
    /// the controller limits, and `MissingHost` / `MissingPath` for empty strings.
    pub fn build(self) -> Result<Config, BuilderError> {
        let dims = self.dimensions.ok_or(BuilderError::MissingDimensions)?;
        let dimensions = Dimensions::new(dims.width, dims.height)?;
        if self.host.trim().is_empty() {
            return Err(BuilderError::MissingHost);
        }
        if self.path.trim().is_empty() {
            return Err(BuilderError::MissingPath);
        }
        Ok(Config {
            dimensions,
            rotation: self.rotation,
            host: self.host,
            path: self.path,
            timeout_ms: self.timeout_ms,
            credentials: self.credentials,
        })
    }
}
