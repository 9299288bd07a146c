//! Frame rendering on the e-paper panel
//!
//! [`Renderer::render`] runs one complete panel session:
//!
//! ```text
//! Uninitialized -> Init -> Cleared -> Drawing -> Displayed -> Sleeping -> Shutdown
//! ```
//!
//! A payload of exactly one frame is pushed as-is. Anything else is replaced
//! by a white frame carrying [`SIZE_ERROR_TEXT`], so a bad download never
//! reaches the panel as raw data.
//!
//! All settle delays block the calling context through [`Panel::delay_ms`].

use alloc::vec::Vec;

use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::Rotation;
use crate::error::Error;
use crate::panel::Panel;

/// Settle time after the full clear, before any drawing
pub const PRE_DRAW_SETTLE_MS: u32 = 500;

/// Settle time after the frame refresh, before the sleep command
pub const POST_DISPLAY_SETTLE_MS: u32 = 2000;

/// Time given to the sleep command before the interface is torn down
pub const SLEEP_SETTLE_MS: u32 = 2000;

/// Diagnostic shown when the payload is not exactly one frame
pub const SIZE_ERROR_TEXT: &str = "Image size error!";

/// Top-left corner of [`SIZE_ERROR_TEXT`]
pub const SIZE_ERROR_ORIGIN: (i32, i32) = (10, 10);

/// Panel session phase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// No session started, or `module_init` failed
    #[default]
    Uninitialized,
    /// Control interface is up
    Init,
    /// Panel cleared
    Cleared,
    /// Frame being prepared and pushed
    Drawing,
    /// Frame refreshed on the panel
    Displayed,
    /// Sleep command issued
    Sleeping,
    /// Control interface torn down
    Shutdown,
}

/// What ended up on the panel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The downloaded frame was displayed
    Direct,
    /// The size-error banner was displayed instead
    ErrorBanner,
}

/// Allocate a zeroed frame-sized buffer without aborting on failure
///
/// # Errors
///
/// Returns `Error::ResourceExhausted` if the allocator refuses the request.
pub fn alloc_frame(len: usize) -> Result<Vec<u8>, Error> {
    let mut frame = Vec::new();
    if frame.try_reserve_exact(len).is_err() {
        log::error!("Failed to allocate {} byte frame buffer", len);
        return Err(Error::ResourceExhausted { requested: len });
    }
    frame.resize(len, 0);
    Ok(frame)
}

/// Source of the banner scratch frame, [`alloc_frame`] by default
pub type FrameAllocator = fn(usize) -> Result<Vec<u8>, Error>;

/// Drives a [`Panel`] through one render session per call
///
/// ## Example
///
/// ```
/// use http_image_display::{Dimensions, MemoryPanel, RenderOutcome, Renderer, Rotation};
///
/// let Ok(dims) = Dimensions::new(800, 480) else {
///     return;
/// };
/// let mut renderer = Renderer::new(MemoryPanel::new(dims), Rotation::Rotate0);
///
/// let frame = vec![0xFFu8; dims.frame_size()];
/// assert_eq!(renderer.render(&frame, frame.len()), Ok(RenderOutcome::Direct));
///
/// // Short payload: the diagnostic banner is shown instead
/// assert_eq!(renderer.render(&frame, 100), Ok(RenderOutcome::ErrorBanner));
/// ```
#[derive(Debug)]
pub struct Renderer<P>
where
    P: Panel,
{
    panel: P,
    rotation: Rotation,
    phase: Phase,
    alloc: FrameAllocator,
}

impl<P> Renderer<P>
where
    P: Panel,
{
    /// Create a renderer owning `panel`
    ///
    /// `rotation` only applies to the diagnostic banner; downloaded frames
    /// are pushed in native orientation.
    pub fn new(panel: P, rotation: Rotation) -> Self {
        Self {
            panel,
            rotation,
            phase: Phase::Uninitialized,
            alloc: alloc_frame,
        }
    }

    /// Use `alloc` for the banner scratch frame
    pub fn with_frame_allocator(mut self, alloc: FrameAllocator) -> Self {
        self.alloc = alloc;
        self
    }

    /// Render the first `actual_size` bytes of `buffer`
    ///
    /// The control interface is torn down before returning whenever
    /// `module_init` succeeded, including when a later step failed.
    ///
    /// # Errors
    ///
    /// - `Error::PanelInit` if the interface or controller cannot be brought up
    /// - `Error::PanelRender` if clear, display or sleep fails
    /// - `Error::ResourceExhausted` if the banner frame cannot be allocated
    pub fn render(&mut self, buffer: &[u8], actual_size: usize) -> Result<RenderOutcome, Error> {
        self.phase = Phase::Uninitialized;
        log::debug!("Initializing e-Paper display...");

        if let Err(e) = self.panel.module_init() {
            log::error!("e-Paper module initialization failed: {:?}", e);
            return Err(Error::PanelInit);
        }
        self.phase = Phase::Init;

        let result = self.session(buffer, actual_size);

        self.panel.module_exit();
        self.phase = Phase::Shutdown;
        result
    }

    fn session(&mut self, buffer: &[u8], actual_size: usize) -> Result<RenderOutcome, Error> {
        self.panel.init().map_err(|e| {
            log::error!("e-Paper init sequence failed: {:?}", e);
            Error::PanelInit
        })?;
        self.panel.clear().map_err(render_failed)?;
        self.phase = Phase::Cleared;
        self.panel.delay_ms(PRE_DRAW_SETTLE_MS);

        self.phase = Phase::Drawing;
        log::debug!("Displaying image on e-Paper...");
        let outcome = self.draw(buffer, actual_size)?;
        self.phase = Phase::Displayed;
        self.panel.delay_ms(POST_DISPLAY_SETTLE_MS);

        log::debug!("Putting e-Paper to sleep...");
        self.panel.sleep().map_err(render_failed)?;
        self.phase = Phase::Sleeping;
        self.panel.delay_ms(SLEEP_SETTLE_MS);

        Ok(outcome)
    }

    fn draw(&mut self, buffer: &[u8], actual_size: usize) -> Result<RenderOutcome, Error> {
        let dims = self.panel.dimensions();
        let expected = dims.frame_size();

        if actual_size == expected && buffer.len() >= expected {
            self.panel
                .display(&buffer[..expected])
                .map_err(render_failed)?;
            log::debug!("Image displayed successfully");
            return Ok(RenderOutcome::Direct);
        }

        log::warn!(
            "Image size mismatch: expected {} bytes, got {} bytes",
            expected,
            actual_size
        );

        let mut scratch = (self.alloc)(expected)?;
        let mut canvas = Canvas::new(scratch.as_mut_slice(), dims, self.rotation, Color::White)?;
        let (x, y) = SIZE_ERROR_ORIGIN;
        canvas.draw_text(x, y, SIZE_ERROR_TEXT, Color::Black, Color::White);

        self.panel.display(&scratch).map_err(render_failed)?;
        Ok(RenderOutcome::ErrorBanner)
    }

    /// Phase reached by the last session
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Access the underlying panel
    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// Access the underlying panel mutably
    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    /// Give the panel back
    pub fn into_panel(self) -> P {
        self.panel
    }
}

fn render_failed<E: core::fmt::Debug>(e: E) -> Error {
    log::error!("e-Paper panel command failed: {:?}", e);
    Error::PanelRender
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Dimensions;
    use crate::panel::{Fault, MemoryPanel, PanelOp};
    use alloc::vec;

    fn dims() -> Dimensions {
        Dimensions::new(800, 480).unwrap()
    }

    fn renderer() -> Renderer<MemoryPanel> {
        Renderer::new(MemoryPanel::new(dims()), Rotation::Rotate0)
    }

    fn session_ops(len: usize) -> Vec<PanelOp> {
        vec![
            PanelOp::ModuleInit,
            PanelOp::Init,
            PanelOp::Clear,
            PanelOp::Delay(PRE_DRAW_SETTLE_MS),
            PanelOp::Display { len },
            PanelOp::Delay(POST_DISPLAY_SETTLE_MS),
            PanelOp::Sleep,
            PanelOp::Delay(SLEEP_SETTLE_MS),
            PanelOp::ModuleExit,
        ]
    }

    #[test]
    fn test_full_frame_is_displayed_directly() {
        let mut renderer = renderer();
        let mut frame = vec![0u8; 48_000];
        frame[0] = 0x12;
        frame[47_999] = 0x34;

        assert_eq!(renderer.render(&frame, 48_000), Ok(RenderOutcome::Direct));
        assert_eq!(renderer.panel().ops(), session_ops(48_000).as_slice());
        assert_eq!(renderer.panel().frame(), Some(frame.as_slice()));
        assert_eq!(renderer.phase(), Phase::Shutdown);
    }

    #[test]
    fn test_short_payload_shows_banner() {
        let mut renderer = renderer();
        let payload = vec![0u8; 48_000];

        assert_eq!(
            renderer.render(&payload, 47_900),
            Ok(RenderOutcome::ErrorBanner)
        );
        assert_eq!(renderer.panel().ops(), session_ops(48_000).as_slice());

        let shown = renderer.panel().frame().unwrap();
        // Blank outside the text box, ink inside it
        assert_eq!(shown[0], 0xFF);
        assert_eq!(shown[47_999], 0xFF);
        let text_rows = &shown[10 * 100..30 * 100];
        assert!(text_rows.iter().any(|b| *b != 0xFF));
        assert!(shown[30 * 100..].iter().all(|b| *b == 0xFF));
    }

    #[test]
    fn test_oversized_size_claim_shows_banner() {
        let mut renderer = renderer();
        let payload = vec![0u8; 48_000];
        assert_eq!(
            renderer.render(&payload, 48_001),
            Ok(RenderOutcome::ErrorBanner)
        );
    }

    #[test]
    fn test_claimed_full_size_with_short_buffer_shows_banner() {
        let mut renderer = renderer();
        let payload = vec![0u8; 100];
        assert_eq!(
            renderer.render(&payload, 48_000),
            Ok(RenderOutcome::ErrorBanner)
        );
        assert_eq!(
            renderer.panel().ops()[4],
            PanelOp::Display { len: 48_000 }
        );
    }

    #[test]
    fn test_already_active_module_is_init_failure_without_teardown() {
        let mut panel = MemoryPanel::new(dims());
        panel.set_active(true);
        let mut renderer = Renderer::new(panel, Rotation::Rotate0);

        assert_eq!(renderer.render(&[], 0), Err(Error::PanelInit));
        assert_eq!(renderer.panel().ops(), &[PanelOp::ModuleInit]);
        assert_eq!(renderer.phase(), Phase::Uninitialized);
    }

    #[test]
    fn test_unresponsive_hardware_is_init_failure() {
        let panel = MemoryPanel::new(dims()).fail_at(Fault::ModuleInit);
        let mut renderer = Renderer::new(panel, Rotation::Rotate0);
        assert_eq!(renderer.render(&[], 0), Err(Error::PanelInit));
        assert!(!renderer.panel().is_active());
    }

    #[test]
    fn test_init_sequence_failure_still_shuts_down() {
        let panel = MemoryPanel::new(dims()).fail_at(Fault::Init);
        let mut renderer = Renderer::new(panel, Rotation::Rotate0);
        assert_eq!(renderer.render(&[], 0), Err(Error::PanelInit));
        assert_eq!(
            renderer.panel().ops(),
            &[PanelOp::ModuleInit, PanelOp::Init, PanelOp::ModuleExit]
        );
    }

    #[test]
    fn test_display_failure_skips_sleep_and_shuts_down() {
        let panel = MemoryPanel::new(dims()).fail_at(Fault::Display);
        let mut renderer = Renderer::new(panel, Rotation::Rotate0);
        let frame = vec![0u8; 48_000];

        assert_eq!(renderer.render(&frame, 48_000), Err(Error::PanelRender));
        let ops = renderer.panel().ops();
        assert!(!ops.contains(&PanelOp::Sleep));
        assert_eq!(ops.last(), Some(&PanelOp::ModuleExit));
        assert!(!renderer.panel().is_active());
        assert_eq!(renderer.phase(), Phase::Shutdown);
    }

    #[test]
    fn test_sleep_failure_is_render_failure() {
        let panel = MemoryPanel::new(dims()).fail_at(Fault::Sleep);
        let mut renderer = Renderer::new(panel, Rotation::Rotate0);
        let frame = vec![0u8; 48_000];
        assert_eq!(renderer.render(&frame, 48_000), Err(Error::PanelRender));
        assert_eq!(renderer.panel().ops().last(), Some(&PanelOp::ModuleExit));
    }

    #[test]
    fn test_renderer_is_reusable_across_sessions() {
        let mut renderer = renderer();
        let frame = vec![0u8; 48_000];
        assert!(renderer.render(&frame, 48_000).is_ok());
        assert!(renderer.render(&frame, 48_000).is_ok());
        assert_eq!(renderer.panel().ops().len(), 18);
    }

    #[test]
    fn test_alloc_frame_reports_exhaustion() {
        assert_eq!(
            alloc_frame(usize::MAX),
            Err(Error::ResourceExhausted {
                requested: usize::MAX
            })
        );
        assert_eq!(alloc_frame(16).map(|f| f.len()), Ok(16));
    }

    #[test]
    fn test_banner_allocation_failure_still_shuts_down() {
        fn refuse(len: usize) -> Result<Vec<u8>, Error> {
            Err(Error::ResourceExhausted { requested: len })
        }

        let mut renderer = renderer().with_frame_allocator(refuse);
        let payload = vec![0u8; 100];

        assert_eq!(
            renderer.render(&payload, payload.len()),
            Err(Error::ResourceExhausted { requested: 48_000 })
        );
        assert_eq!(
            renderer.panel().ops(),
            &[
                PanelOp::ModuleInit,
                PanelOp::Init,
                PanelOp::Clear,
                PanelOp::Delay(PRE_DRAW_SETTLE_MS),
                PanelOp::ModuleExit,
            ]
        );
        assert!(!renderer.panel().is_active());
        assert_eq!(renderer.phase(), Phase::Shutdown);
    }

    #[test]
    fn test_full_frame_skips_banner_allocation() {
        fn refuse(len: usize) -> Result<Vec<u8>, Error> {
            Err(Error::ResourceExhausted { requested: len })
        }

        let mut renderer = renderer().with_frame_allocator(refuse);
        let frame = vec![0u8; 48_000];
        assert_eq!(renderer.render(&frame, 48_000), Ok(RenderOutcome::Direct));
    }
}
