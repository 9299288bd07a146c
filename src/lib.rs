//! Link-triggered HTTP image display for SSD1677 e-Paper panels
//!
//! When the network link comes up, download one raw 1-bpp frame over HTTP
//! and put it on the panel. If the download is not exactly one frame long,
//! show an "Image size error!" banner instead.
//!
//! ## Features
//!
//! - `no_std` + `alloc` core
//! - `embedded-hal` v1.0 SSD1677 driver for the 4.26" 800x480 panel
//! - Headless [`MemoryPanel`] for tests and host runs
//! - `embedded-graphics` canvas for diagnostics
//! - `std` feature: blocking `reqwest` transport
//! - `host` feature: the `http-image-display` and `image-converter` binaries
//!
//! ## Pipeline
//!
//! ```text
//! link status ─▶ EventBus ─▶ LinkHandler ─▶ fetch ─▶ Renderer ─▶ Panel
//! ```
//!
//! ## Usage
//!
//! ```
//! use http_image_display::fetch::{HttpTransport, Request, Response};
//! use http_image_display::events::{subscribe_link_handler, EventBus, LINK_STATUS_CHANGED};
//! use http_image_display::{Config, LinkHandler, LinkStatus, MemoryPanel};
//!
//! struct Server;
//! impl HttpTransport for Server {
//!     type Error = ();
//!     fn request(&mut self, _request: &Request<'_>) -> Result<Response, ()> {
//!         Ok(Response { status_code: 200, body: vec![0xFF; 48_000] })
//!     }
//! }
//!
//! let Ok(config) = Config::panel_4in26("74.82.197.217", "/image.bin") else {
//!     return;
//! };
//! let panel = MemoryPanel::new(config.dimensions);
//! let handler = LinkHandler::new(config, Server, panel);
//!
//! let mut bus = EventBus::new();
//! subscribe_link_handler(&mut bus, handler);
//! bus.publish(LINK_STATUS_CHANGED, LinkStatus::Up);
//! ```

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

/// Drawing target over a packed frame buffer
pub mod canvas;
/// Monochrome color type
pub mod color;
/// SSD1677 command definitions
pub mod command;
/// Configuration types and builder
pub mod config;
/// SSD1677 panel driver
pub mod driver;
/// Error types
pub mod error;
/// Link-status event dispatch
pub mod events;
/// HTTP image download
pub mod fetch;
/// Hardware interface abstraction
pub mod interface;
/// Link-status handling and the download/render cycle
pub mod link;
/// Panel abstraction and headless panel
pub mod panel;
/// Grayscale to 1-bpp conversion
pub mod raster;
/// Panel session sequencing
pub mod render;
/// Coordinate rotation utilities
pub mod rotation;
/// `reqwest` transport (requires `std` feature)
#[cfg(feature = "std")]
pub mod transport;

pub use canvas::Canvas;
pub use color::Color;
pub use config::{
    Builder, Config, DEFAULT_TIMEOUT_MS, Dimensions, MAX_GATE_OUTPUTS, MAX_SOURCE_OUTPUTS,
    NetworkCredentials, Rotation,
};
pub use driver::{DriverError, Epd4in26};
pub use error::{BuilderError, Error};
pub use events::EventBus;
pub use fetch::{HttpTransport, fetch};
pub use interface::InterfaceError;
pub use interface::{DEFAULT_BUSY_TIMEOUT_MS, DisplayInterface, Interface};
pub use link::{CycleOutcome, LinkHandler, LinkStatus};
pub use panel::{Fault, MemoryPanel, MemoryPanelError, Panel, PanelOp};
pub use render::{Phase, RenderOutcome, Renderer};

#[cfg(feature = "std")]
pub use transport::{ReqwestTransport, TransportError};
