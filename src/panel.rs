//! Panel driver abstraction
//!
//! This module provides the [`Panel`] trait the renderer drives, and
//! [`MemoryPanel`], a headless implementation that records every call and
//! keeps the last frame it was given.
//!
//! ## Implementing
//!
//! For SSD1677 hardware use [`Epd4in26`](crate::driver::Epd4in26). Other
//! controllers only need to map the seven primitives below; the renderer
//! owns the ordering and the settle delays.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::config::Dimensions;

/// Primitive operations of an e-paper panel
///
/// Calls arrive strictly in the order `module_init`, `init`, `clear`,
/// `display`, `sleep`, `module_exit`, interleaved with `delay_ms`.
pub trait Panel {
    /// Error type for panel operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Native panel dimensions
    fn dimensions(&self) -> Dimensions;

    /// Bring up the control interface (GPIO, SPI)
    ///
    /// # Errors
    ///
    /// Fails if the interface is already active or the hardware does not respond.
    fn module_init(&mut self) -> Result<(), Self::Error>;

    /// Tear down the control interface
    fn module_exit(&mut self);

    /// Run the controller's power-on initialization sequence
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Clear the whole panel to white
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Push one full frame and refresh
    ///
    /// `frame` is exactly `dimensions().frame_size()` bytes.
    fn display(&mut self, frame: &[u8]) -> Result<(), Self::Error>;

    /// Enter low-power deep sleep
    fn sleep(&mut self) -> Result<(), Self::Error>;

    /// Block the calling context for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

/// Operation recorded by [`MemoryPanel`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelOp {
    /// `module_init` was called
    ModuleInit,
    /// `module_exit` was called
    ModuleExit,
    /// `init` was called
    Init,
    /// `clear` was called
    Clear,
    /// `display` was called with a frame of `len` bytes
    Display {
        /// Frame length in bytes
        len: usize,
    },
    /// `sleep` was called
    Sleep,
    /// `delay_ms` was called
    Delay(u32),
}

/// Stage at which [`MemoryPanel`] can be told to fail
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// `module_init` reports the hardware as unresponsive
    ModuleInit,
    /// `init` fails
    Init,
    /// `clear` fails
    Clear,
    /// `display` fails
    Display,
    /// `sleep` fails
    Sleep,
}

/// Errors reported by [`MemoryPanel`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryPanelError {
    /// `module_init` was called while the module was already active
    AlreadyActive,
    /// An operation was attempted before `module_init`
    NotActive,
    /// Injected failure
    Injected(Fault),
}

/// Headless panel keeping the last displayed frame in memory
///
/// ## Example
///
/// ```
/// use http_image_display::{Dimensions, MemoryPanel, Panel, PanelOp};
///
/// let Ok(dims) = Dimensions::new(16, 2) else {
///     return;
/// };
/// let mut panel = MemoryPanel::new(dims);
/// let _ = panel.module_init();
/// let _ = panel.display(&[0xAA; 4]);
/// panel.module_exit();
///
/// assert_eq!(panel.frame(), Some(&[0xAA; 4][..]));
/// assert_eq!(panel.ops()[1], PanelOp::Display { len: 4 });
/// ```
#[derive(Debug)]
pub struct MemoryPanel {
    dims: Dimensions,
    active: bool,
    frame: Option<Vec<u8>>,
    ops: Vec<PanelOp>,
    fault: Option<Fault>,
    #[cfg(feature = "std")]
    realtime: bool,
}

impl MemoryPanel {
    /// Create a panel with the given native dimensions
    pub fn new(dims: Dimensions) -> Self {
        Self {
            dims,
            active: false,
            frame: None,
            ops: Vec::new(),
            fault: None,
            #[cfg(feature = "std")]
            realtime: false,
        }
    }

    /// Make every call at `fault` fail
    pub fn fail_at(mut self, fault: Fault) -> Self {
        self.fault = Some(fault);
        self
    }

    /// Actually sleep in `delay_ms` instead of only recording the call
    #[cfg(feature = "std")]
    pub fn with_realtime_delays(mut self) -> Self {
        self.realtime = true;
        self
    }

    /// Pretend the control interface was left active by someone else
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Whether the control interface is currently up
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Last frame passed to `display`
    pub fn frame(&self) -> Option<&[u8]> {
        self.frame.as_deref()
    }

    /// Calls recorded so far
    pub fn ops(&self) -> &[PanelOp] {
        &self.ops
    }

    /// Drain the recorded calls
    pub fn take_ops(&mut self) -> Vec<PanelOp> {
        core::mem::take(&mut self.ops)
    }

    fn check(&self, stage: Fault) -> Result<(), MemoryPanelError> {
        if !self.active {
            return Err(MemoryPanelError::NotActive);
        }
        if self.fault == Some(stage) {
            return Err(MemoryPanelError::Injected(stage));
        }
        Ok(())
    }
}

impl Panel for MemoryPanel {
    type Error = MemoryPanelError;

    fn dimensions(&self) -> Dimensions {
        self.dims
    }

    fn module_init(&mut self) -> Result<(), Self::Error> {
        self.ops.push(PanelOp::ModuleInit);
        if self.active {
            return Err(MemoryPanelError::AlreadyActive);
        }
        if self.fault == Some(Fault::ModuleInit) {
            return Err(MemoryPanelError::Injected(Fault::ModuleInit));
        }
        self.active = true;
        Ok(())
    }

    fn module_exit(&mut self) {
        self.ops.push(PanelOp::ModuleExit);
        self.active = false;
    }

    fn init(&mut self) -> Result<(), Self::Error> {
        self.ops.push(PanelOp::Init);
        self.check(Fault::Init)
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.ops.push(PanelOp::Clear);
        self.check(Fault::Clear)?;
        self.frame = None;
        Ok(())
    }

    fn display(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        self.ops.push(PanelOp::Display { len: frame.len() });
        self.check(Fault::Display)?;
        self.frame = Some(frame.to_vec());
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), Self::Error> {
        self.ops.push(PanelOp::Sleep);
        self.check(Fault::Sleep)
    }

    fn delay_ms(&mut self, ms: u32) {
        self.ops.push(PanelOp::Delay(ms));
        #[cfg(feature = "std")]
        {
            if self.realtime {
                std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
            }
        }
    }
}
