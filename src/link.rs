//! Link-status driven download/render cycle
//!
//! [`LinkHandler`] is what the network manager calls on every link-status
//! notification. It remembers the previous status and runs exactly one
//! fetch-and-render cycle per transition into [`LinkStatus::Up`].
//!
//! ## Cycle
//!
//! 1. Allocate one frame (`Error::ResourceExhausted` on failure)
//! 2. [`fetch`] into it
//! 3. [`Renderer::render`] the downloaded bytes
//! 4. Release the frame
//!
//! The frame is a local owned buffer, so it is released on every return path.

use crate::config::Config;
use crate::error::Error;
use crate::fetch::{HttpTransport, fetch};
use crate::panel::Panel;
use crate::render::{RenderOutcome, Renderer, alloc_frame};

/// Network link status as reported by the network manager
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LinkStatus {
    /// No connectivity
    #[default]
    Down,
    /// Connectivity available
    Up,
}

impl LinkStatus {
    /// Whether the link is up
    pub fn is_up(self) -> bool {
        self == Self::Up
    }
}

impl From<bool> for LinkStatus {
    fn from(up: bool) -> Self {
        if up { Self::Up } else { Self::Down }
    }
}

/// Result of handling one notification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Repeated `Up` without an intervening `Down`; nothing was done
    Duplicate,
    /// The link is not up; status recorded, nothing else done
    LinkDown,
    /// A cycle ran to completion
    Rendered(RenderOutcome),
}

/// Orchestrates download and render on link transitions
///
/// Invocations are serialized by `&mut self`. Each handler owns its own
/// last-status memory, starting at [`LinkStatus::Down`], so the first `Up`
/// ever seen starts a cycle.
///
/// ## Example
///
/// ```
/// use http_image_display::fetch::{HttpTransport, Request, Response};
/// use http_image_display::{
///     Config, CycleOutcome, LinkHandler, LinkStatus, MemoryPanel, RenderOutcome,
/// };
///
/// struct Server;
/// impl HttpTransport for Server {
///     type Error = ();
///     fn request(&mut self, _request: &Request<'_>) -> Result<Response, ()> {
///         Ok(Response { status_code: 200, body: vec![0xFF; 48_000] })
///     }
/// }
///
/// let Ok(config) = Config::panel_4in26("74.82.197.217", "/image.bin") else {
///     return;
/// };
/// let panel = MemoryPanel::new(config.dimensions);
/// let mut handler = LinkHandler::new(config, Server, panel);
///
/// assert_eq!(
///     handler.on_link_status(LinkStatus::Up),
///     Ok(CycleOutcome::Rendered(RenderOutcome::Direct))
/// );
/// assert_eq!(handler.on_link_status(LinkStatus::Up), Ok(CycleOutcome::Duplicate));
/// ```
#[derive(Debug)]
pub struct LinkHandler<T, P>
where
    T: HttpTransport,
    P: Panel,
{
    config: Config,
    transport: T,
    renderer: Renderer<P>,
    last_status: LinkStatus,
}

impl<T, P> LinkHandler<T, P>
where
    T: HttpTransport,
    P: Panel,
{
    /// Create a handler
    ///
    /// The image buffer capacity is the panel's frame size.
    pub fn new(config: Config, transport: T, panel: P) -> Self {
        if panel.dimensions() != config.dimensions {
            log::warn!(
                "Panel is {:?} but configuration says {:?}; using the panel's frame size",
                panel.dimensions(),
                config.dimensions
            );
        }
        let renderer = Renderer::new(panel, config.rotation);
        Self {
            config,
            transport,
            renderer,
            last_status: LinkStatus::Down,
        }
    }

    /// Handle one link-status notification
    ///
    /// # Errors
    ///
    /// Returns the first error of the cycle: allocation, fetch or render.
    /// The remembered status is updated regardless.
    pub fn on_link_status(&mut self, status: LinkStatus) -> Result<CycleOutcome, Error> {
        if self.last_status == status && status == LinkStatus::Up {
            return Ok(CycleOutcome::Duplicate);
        }
        self.last_status = status;

        if !status.is_up() {
            log::debug!("Network is down, waiting for connection...");
            return Ok(CycleOutcome::LinkDown);
        }

        log::debug!("Network is up! Starting image download...");
        self.run_cycle()
    }

    fn run_cycle(&mut self) -> Result<CycleOutcome, Error> {
        let capacity = self.renderer.panel().dimensions().frame_size();
        let mut image = alloc_frame(capacity)?;

        let downloaded = fetch(
            &mut self.transport,
            &self.config.host,
            &self.config.path,
            self.config.timeout_ms,
            &mut image,
        )
        .inspect_err(|e| log::error!("Failed to download image: {}", e))?;

        let outcome = self
            .renderer
            .render(&image, downloaded)
            .inspect_err(|e| log::error!("Failed to display image: {}", e))?;

        Ok(CycleOutcome::Rendered(outcome))
    }

    /// Status seen by the last notification
    pub fn last_status(&self) -> LinkStatus {
        self.last_status
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Access the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Access the renderer and, through it, the panel
    pub fn renderer(&self) -> &Renderer<P> {
        &self.renderer
    }

    /// Access the renderer mutably
    pub fn renderer_mut(&mut self) -> &mut Renderer<P> {
        &mut self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::tests::MockTransport;
    use crate::panel::{Fault, MemoryPanel, PanelOp};
    use alloc::vec;
    use alloc::vec::Vec;

    const FRAME: usize = 48_000;

    fn handler(transport: MockTransport) -> LinkHandler<MockTransport, MemoryPanel> {
        let config = Config::panel_4in26("74.82.197.217", "/image.bin").unwrap();
        let panel = MemoryPanel::new(config.dimensions);
        LinkHandler::new(config, transport, panel)
    }

    fn displays(handler: &LinkHandler<MockTransport, MemoryPanel>) -> usize {
        handler
            .renderer()
            .panel()
            .ops()
            .iter()
            .filter(|op| matches!(op, PanelOp::Display { .. }))
            .count()
    }

    #[test]
    fn test_full_frame_is_rendered_directly() {
        let mut body = vec![0xFFu8; FRAME];
        body[123] = 0x00;
        let mut handler = handler(MockTransport::ok(200, body.clone()));

        assert_eq!(
            handler.on_link_status(LinkStatus::Up),
            Ok(CycleOutcome::Rendered(RenderOutcome::Direct))
        );
        assert_eq!(handler.renderer().panel().frame(), Some(body.as_slice()));
    }

    #[test]
    fn test_short_frame_renders_banner_and_succeeds() {
        let mut handler = handler(MockTransport::ok(200, vec![0u8; FRAME - 100]));
        assert_eq!(
            handler.on_link_status(LinkStatus::Up),
            Ok(CycleOutcome::Rendered(RenderOutcome::ErrorBanner))
        );
        assert_eq!(displays(&handler), 1);
    }

    #[test]
    fn test_not_found_skips_render() {
        let mut handler = handler(MockTransport::ok(404, Vec::new()));
        assert_eq!(
            handler.on_link_status(LinkStatus::Up),
            Err(Error::ServerStatus { status: 404 })
        );
        assert!(handler.renderer().panel().ops().is_empty());
    }

    #[test]
    fn test_oversized_body_skips_render() {
        let mut handler = handler(MockTransport::ok(200, vec![0u8; FRAME + 1]));
        assert_eq!(
            handler.on_link_status(LinkStatus::Up),
            Err(Error::CapacityExceeded {
                body_len: FRAME + 1,
                capacity: FRAME
            })
        );
        assert!(handler.renderer().panel().ops().is_empty());
    }

    #[test]
    fn test_transport_failure_is_reported() {
        let mut handler = handler(MockTransport::failing());
        assert_eq!(
            handler.on_link_status(LinkStatus::Up),
            Err(Error::Transport)
        );
        assert_eq!(handler.last_status(), LinkStatus::Up);
    }

    #[test]
    fn test_down_up_up_runs_one_cycle() {
        let mut handler = handler(MockTransport::ok(200, vec![0u8; FRAME]));

        assert_eq!(
            handler.on_link_status(LinkStatus::Down),
            Ok(CycleOutcome::LinkDown)
        );
        assert!(matches!(
            handler.on_link_status(LinkStatus::Up),
            Ok(CycleOutcome::Rendered(_))
        ));
        assert_eq!(
            handler.on_link_status(LinkStatus::Up),
            Ok(CycleOutcome::Duplicate)
        );

        assert_eq!(handler.transport().requests.len(), 1);
        assert_eq!(displays(&handler), 1);
    }

    #[test]
    fn test_flap_runs_a_cycle_per_up_edge() {
        let mut handler = handler(MockTransport::ok(200, vec![0u8; FRAME]));
        for status in [
            LinkStatus::Up,
            LinkStatus::Down,
            LinkStatus::Down,
            LinkStatus::Up,
        ] {
            let _ = handler.on_link_status(status);
        }
        assert_eq!(handler.transport().requests.len(), 2);
    }

    #[test]
    fn test_first_up_without_prior_down_runs_cycle() {
        let mut handler = handler(MockTransport::ok(200, vec![0u8; FRAME]));
        assert_eq!(handler.last_status(), LinkStatus::Down);
        assert!(matches!(
            handler.on_link_status(LinkStatus::Up),
            Ok(CycleOutcome::Rendered(_))
        ));
    }

    #[test]
    fn test_failed_cycle_still_dedups_next_up() {
        let mut handler = handler(MockTransport::failing());
        assert!(handler.on_link_status(LinkStatus::Up).is_err());
        assert_eq!(
            handler.on_link_status(LinkStatus::Up),
            Ok(CycleOutcome::Duplicate)
        );
        assert_eq!(handler.transport().requests.len(), 1);
    }

    #[test]
    fn test_render_failure_is_returned_and_panel_released() {
        let config = Config::panel_4in26("h", "/p").unwrap();
        let panel = MemoryPanel::new(config.dimensions).fail_at(Fault::Display);
        let mut handler =
            LinkHandler::new(config, MockTransport::ok(200, vec![0u8; FRAME]), panel);

        assert_eq!(
            handler.on_link_status(LinkStatus::Up),
            Err(Error::PanelRender)
        );
        assert!(!handler.renderer().panel().is_active());
    }

    #[test]
    fn test_independent_handlers_keep_separate_state() {
        let mut first = handler(MockTransport::ok(200, vec![0u8; FRAME]));
        let mut second = handler(MockTransport::ok(200, vec![0u8; FRAME]));

        let _ = first.on_link_status(LinkStatus::Up);
        assert_eq!(first.last_status(), LinkStatus::Up);
        assert_eq!(second.last_status(), LinkStatus::Down);
        assert!(matches!(
            second.on_link_status(LinkStatus::Up),
            Ok(CycleOutcome::Rendered(_))
        ));
    }

    #[test]
    fn test_link_status_from_bool() {
        assert_eq!(LinkStatus::from(true), LinkStatus::Up);
        assert_eq!(LinkStatus::from(false), LinkStatus::Down);
    }
}
